//! Flat text-archive bundling of generated artifacts
//!
//! A bundle is the downloadable unit for one target language: server source,
//! dependency manifest, and usage guide, concatenated with
//! `=== <filename> ===` section separators.

use crate::ir::ServerIr;
use crate::{node, python};
use spec_compiler::{CodeTarget, Server};

/// One file inside a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleFile {
    pub name: String,
    pub content: String,
}

/// The generated artifact set for one target language
#[derive(Debug, Clone)]
pub struct Bundle {
    pub target: CodeTarget,
    pub files: Vec<BundleFile>,
}

impl Bundle {
    /// Assemble the bundle for one target from a compiled server.
    pub fn for_target(server: &Server, target: CodeTarget) -> Self {
        let ir = ServerIr::build(server);

        let source = server
            .code
            .get(&target)
            .cloned()
            .unwrap_or_else(|| match target {
                CodeTarget::Node => node::emit_server(&ir),
                CodeTarget::Python => python::emit_server(&ir),
            });

        let (manifest_name, manifest, readme) = match target {
            CodeTarget::Node => (
                "package.json",
                node::emit_manifest(&ir),
                node::emit_readme(&ir),
            ),
            CodeTarget::Python => (
                "pyproject.toml",
                python::emit_manifest(&ir),
                python::emit_readme(&ir),
            ),
        };

        Self {
            target,
            files: vec![
                BundleFile {
                    name: manifest_name.to_string(),
                    content: manifest,
                },
                BundleFile {
                    name: target.source_filename().to_string(),
                    content: source,
                },
                BundleFile {
                    name: "README.md".to_string(),
                    content: readme,
                },
            ],
        }
    }

    /// Render the flat archive text.
    pub fn render(&self) -> String {
        self.files
            .iter()
            .map(|file| format!("=== {} ===\n{}\n", file.name, file.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    const SPEC: &str = r#"
info:
  title: Bundle API
  version: "1.0.0"
paths:
  /ping:
    get:
      operationId: ping
      responses: {}
"#;

    #[test]
    fn test_node_bundle_files() {
        let server = compile(SPEC).unwrap();
        let bundle = Bundle::for_target(&server, CodeTarget::Node);

        let names: Vec<_> = bundle.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["package.json", "index.js", "README.md"]);
    }

    #[test]
    fn test_render_uses_section_separators() {
        let server = compile(SPEC).unwrap();
        let rendered = Bundle::for_target(&server, CodeTarget::Python).render();

        assert!(rendered.contains("=== pyproject.toml ==="));
        assert!(rendered.contains("=== server.py ==="));
        assert!(rendered.contains("=== README.md ==="));
    }

    #[test]
    fn test_manifest_is_valid_json_for_node() {
        let server = compile(SPEC).unwrap();
        let bundle = Bundle::for_target(&server, CodeTarget::Node);
        let manifest = &bundle.files[0].content;
        let parsed: serde_json::Value = serde_json::from_str(manifest).unwrap();
        assert_eq!(parsed["name"], "mcp-mcp_bundle_api");
        assert_eq!(parsed["dependencies"]["@modelcontextprotocol/sdk"], "^1.0.0");
    }
}
