//! # server-codegen
//!
//! Code emitters for api-chat: renders runnable tool-calling server source
//! (Node.js and Python) from a normalized endpoint catalog, plus the
//! dependency manifest and usage guide bundled as a flat text archive.

mod bundle;
mod ir;
pub mod node;
pub mod python;

pub use bundle::{Bundle, BundleFile};
pub use ir::{ParamIr, ServerIr, ToolIr};

use spec_compiler::{CodeTarget, CompileResult, Server, SpecNormalizer};

/// Compile a specification document into a fully populated `Server`:
/// normalization plus synchronous code generation for every target.
///
/// The returned server is in `Generating` status; callers confirm it with
/// `mark_ready` once the external confirmation step completes.
pub fn compile(spec_text: &str) -> CompileResult<Server> {
    let mut server = SpecNormalizer::parse(spec_text)?;
    render_code(&mut server);
    Ok(server)
}

/// Render source text for every target into `server.code`. Never fails for
/// a structurally valid server.
pub fn render_code(server: &mut Server) {
    let ir = ServerIr::build(server);
    server.code.insert(CodeTarget::Node, node::emit_server(&ir));
    server
        .code
        .insert(CodeTarget::Python, python::emit_server(&ir));
}
