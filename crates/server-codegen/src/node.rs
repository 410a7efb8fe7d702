//! Node.js tool-server renderer

use crate::ir::{ServerIr, ToolIr};
use serde_json::json;

/// Escape a string for inclusion in a single-quoted JS literal
fn js_str(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "")
}

/// Render the complete runnable server source (`index.js`).
pub fn emit_server(ir: &ServerIr) -> String {
    let tool_definitions = ir
        .tools
        .iter()
        .map(emit_tool_definition)
        .collect::<Vec<_>>()
        .join("\n\n");

    let dispatch_entries = ir
        .tools
        .iter()
        .map(|tool| {
            format!(
                "    case '{}':\n      return await handle_{}(args);",
                js_str(&tool.name),
                tool.id
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let tool_list = ir
        .tools
        .iter()
        .map(|tool| format!("      {}_tool", tool.id))
        .collect::<Vec<_>>()
        .join(",\n");

    let handlers = ir
        .tools
        .iter()
        .map(emit_handler)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"#!/usr/bin/env node

/**
 * MCP Server for {name}
 * Generated from Swagger/OpenAPI specification
 *
 * {description}
 */

import {{ Server }} from '@modelcontextprotocol/sdk/server/index.js';
import {{ StdioServerTransport }} from '@modelcontextprotocol/sdk/server/stdio.js';
import {{
  CallToolRequestSchema,
  ListToolsRequestSchema,
}} from '@modelcontextprotocol/sdk/types.js';

const BASE_URL = '{base_url}';
const server = new Server(
  {{
    name: '{server_id}',
    version: '{version}',
  }},
  {{
    capabilities: {{
      tools: {{}},
    }},
  }}
);

// Tool definitions
{tool_definitions}

// Tool handlers
server.setRequestHandler(CallToolRequestSchema, async (request) => {{
  const {{ name, arguments: args }} = request.params;

  switch (name) {{
{dispatch_entries}
    default:
      throw new Error(`Unknown tool: ${{name}}`);
  }}
}});

server.setRequestHandler(ListToolsRequestSchema, async () => {{
  return {{
    tools: [
{tool_list}
    ],
  }};
}});

{handlers}

async function main() {{
  const transport = new StdioServerTransport();
  await server.connect(transport);
  console.error('{server_id} MCP server running on stdio');
}}

main().catch((error) => {{
  console.error('Server error:', error);
  process.exit(1);
}});
"#,
        name = ir.server_name,
        description = ir.description.replace('\n', " "),
        base_url = js_str(&ir.base_url),
        server_id = ir.server_id,
        version = ir.version,
        tool_definitions = tool_definitions,
        dispatch_entries = dispatch_entries,
        tool_list = tool_list,
        handlers = handlers,
    )
}

fn emit_tool_definition(tool: &ToolIr) -> String {
    let properties = tool
        .params
        .iter()
        .map(|param| {
            let required_line = if param.required {
                ",\n      required: true"
            } else {
                ""
            };
            format!(
                "    {}: {{\n      type: '{}',\n      description: '{}'{}\n    }}",
                param.name,
                js_str(&param.param_type),
                js_str(&param.description),
                required_line
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    let required = tool
        .params
        .iter()
        .filter(|p| p.required)
        .map(|p| format!("'{}'", js_str(&p.name)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "const {id}_tool = {{\n  name: '{name}',\n  description: '{description}',\n  inputSchema: {{\n    type: 'object',\n    properties: {{\n{properties}\n    }},\n    required: [{required}]\n  }}\n}};",
        id = tool.id,
        name = js_str(&tool.name),
        description = js_str(&tool.description),
        properties = properties,
        required = required,
    )
}

fn emit_handler(tool: &ToolIr) -> String {
    let path_replacements = tool
        .path_params
        .iter()
        .map(|name| {
            // Absent argument leaves the literal token, same as the Python handler
            format!(
                "    if ('{name}' in args) {{\n      url = url.replace('{{{name}}}', encodeURIComponent(String(args.{name})));\n    }}",
                name = name
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let query_appends = tool
        .query_params
        .iter()
        .map(|name| {
            format!(
                "    if (args.{name} !== undefined) {{\n      queryParams.append('{name}', String(args.{name}));\n    }}",
                name = name
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body_block = if tool.has_body {
        "\n    if (args.body) {\n      options.body = JSON.stringify(args.body);\n    }\n"
    } else {
        ""
    };

    format!(
        r#"async function handle_{id}(args) {{
  try {{
    let url = BASE_URL + '{path}';

    // Replace path parameters
{path_replacements}

    // Add query parameters
    const queryParams = new URLSearchParams();
{query_appends}

    if (queryParams.toString()) {{
      url += '?' + queryParams.toString();
    }}

    const options = {{
      method: '{method}',
      headers: {{
        'Content-Type': 'application/json',
        'User-Agent': 'MCP-Server/1.0'
      }}
    }};
{body_block}
    const response = await fetch(url, options);
    // fetch bodies are single-read; buffer as text before attempting JSON
    const text = await response.text();
    let data;
    try {{
      data = JSON.parse(text);
    }} catch {{
      data = text;
    }}

    return {{
      content: [{{
        type: 'text',
        text: JSON.stringify({{
          status: response.status,
          statusText: response.statusText,
          data: data
        }}, null, 2)
      }}]
    }};
  }} catch (error) {{
    return {{
      content: [{{
        type: 'text',
        text: `Error calling {name}: ${{error.message}}`
      }}],
      isError: true
    }};
  }}
}}"#,
        id = tool.id,
        path = js_str(&tool.path),
        path_replacements = path_replacements,
        query_appends = query_appends,
        method = tool.method,
        body_block = body_block,
        name = js_str(&tool.name),
    )
}

/// Render the installable-package manifest (`package.json`).
pub fn emit_manifest(ir: &ServerIr) -> String {
    let package_name = format!("mcp-{}", ir.server_id.to_lowercase());
    let manifest = json!({
        "name": package_name,
        "version": ir.version,
        "description": ir.description,
        "main": "index.js",
        "type": "module",
        "scripts": {
            "start": "node index.js"
        },
        "dependencies": {
            "@modelcontextprotocol/sdk": "^1.0.0",
            "node-fetch": "^3.3.2"
        },
        "bin": {
            (package_name.clone()): "./index.js"
        }
    });
    serde_json::to_string_pretty(&manifest).expect("manifest serializes")
}

/// Render the usage guide (`README.md`).
pub fn emit_readme(ir: &ServerIr) -> String {
    let tool_docs = ir
        .tools
        .iter()
        .map(|tool| {
            let params = tool
                .params
                .iter()
                .map(|p| {
                    format!(
                        "  - `{}` ({}){}: {}",
                        p.name,
                        p.param_type,
                        if p.required { " *required*" } else { "" },
                        p.description
                    )
                })
                .collect::<Vec<_>>()
                .join("\n");

            format!(
                "### {name}\n\n{description}\n\n- **Method**: {method}\n- **Path**: {path}\n- **Parameters**:\n{params}",
                name = tool.name,
                description = tool.description,
                method = tool.method,
                path = tool.path,
                params = params,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "# {name} MCP Server\n\n{description}\n\n## Installation\n\n```bash\nnpm install\n```\n\n## Usage\n\n```bash\nnpm start\n```\n\n## Available Tools\n\n{tool_docs}\n\n## Configuration\n\nThe server calls `{base_url}`. Update BASE_URL in index.js if your API lives elsewhere.\n",
        name = ir.server_name,
        description = ir.description,
        tool_docs = tool_docs,
        base_url = ir.base_url,
    )
}
