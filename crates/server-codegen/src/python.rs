//! Python tool-server renderer
//!
//! Emits the same server semantics as the Node renderer on top of the `mcp`
//! Python SDK and `httpx`.

use crate::ir::{ServerIr, ToolIr};

/// Escape a string for inclusion in a double-quoted Python literal
fn py_str(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
}

/// Render the complete runnable server source (`server.py`).
pub fn emit_server(ir: &ServerIr) -> String {
    let tool_definitions = ir
        .tools
        .iter()
        .map(emit_tool_definition)
        .collect::<Vec<_>>()
        .join("\n");

    let handlers = ir
        .tools
        .iter()
        .map(emit_handler)
        .collect::<Vec<_>>()
        .join("\n\n");

    let dispatch_entries = ir
        .tools
        .iter()
        .map(|tool| format!("    \"{}\": handle_{},", py_str(&tool.name), tool.id))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"#!/usr/bin/env python3
"""MCP server for {name}.

Generated from Swagger/OpenAPI specification.

{description}
"""

import asyncio
import json

import httpx
import mcp.types as types
from mcp.server import Server
from mcp.server.stdio import stdio_server

BASE_URL = "{base_url}"

server = Server("{server_id}")

TOOLS = [
{tool_definitions}
]


@server.list_tools()
async def list_tools() -> list[types.Tool]:
    return TOOLS


@server.call_tool()
async def call_tool(name: str, arguments: dict | None) -> list[types.TextContent]:
    handler = HANDLERS.get(name)
    if handler is None:
        raise ValueError(f"Unknown tool: {{name}}")
    return await handler(arguments or {{}})


{handlers}


HANDLERS = {{
{dispatch_entries}
}}


async def main() -> None:
    async with stdio_server() as (read_stream, write_stream):
        await server.run(
            read_stream, write_stream, server.create_initialization_options()
        )


if __name__ == "__main__":
    asyncio.run(main())
"#,
        name = ir.server_name,
        description = ir.description.replace('\n', " "),
        base_url = py_str(&ir.base_url),
        server_id = ir.server_id,
        tool_definitions = tool_definitions,
        handlers = handlers,
        dispatch_entries = dispatch_entries,
    )
}

fn emit_tool_definition(tool: &ToolIr) -> String {
    let properties = tool
        .params
        .iter()
        .map(|param| {
            format!(
                "                \"{}\": {{\n                    \"type\": \"{}\",\n                    \"description\": \"{}\",\n                }},",
                py_str(&param.name),
                py_str(&param.param_type),
                py_str(&param.description),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let required = tool
        .params
        .iter()
        .filter(|p| p.required)
        .map(|p| format!("\"{}\"", py_str(&p.name)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"    types.Tool(
        name="{name}",
        description="{description}",
        inputSchema={{
            "type": "object",
            "properties": {{
{properties}
            }},
            "required": [{required}],
        }},
    ),"#,
        name = py_str(&tool.name),
        description = py_str(&tool.description),
        properties = properties,
        required = required,
    )
}

fn emit_handler(tool: &ToolIr) -> String {
    let path_replacements = tool
        .path_params
        .iter()
        .map(|name| {
            // Absent argument leaves the literal token, same as the Node handler
            format!(
                "        if \"{name}\" in args:\n            url = url.replace(\"{{{name}}}\", str(args[\"{name}\"]))",
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
                "        if args.get(\"{name}\") is not None:\n            params[\"{name}\"] = str(args[\"{name}\"])",
                name = name
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let body_argument = if tool.has_body {
        "\n        body = args.get(\"body\")"
    } else {
        ""
    };
    let json_kwarg = if tool.has_body { ", json=body" } else { "" };

    format!(
        r#"async def handle_{id}(args: dict) -> list[types.TextContent]:
    try:
        url = BASE_URL + "{path}"

        # Replace path parameters
{path_replacements}

        # Add query parameters
        params = {{}}
{query_appends}

        headers = {{
            "Content-Type": "application/json",
            "User-Agent": "MCP-Server/1.0",
        }}{body_argument}

        async with httpx.AsyncClient() as client:
            response = await client.request(
                "{method}", url, params=params, headers=headers{json_kwarg}
            )

        try:
            data = response.json()
        except ValueError:
            data = response.text

        payload = {{
            "status": response.status_code,
            "statusText": response.reason_phrase,
            "data": data,
        }}
        return [types.TextContent(type="text", text=json.dumps(payload, indent=2))]
    except Exception as exc:
        return [
            types.TextContent(type="text", text=f"Error calling {name}: {{exc}}")
        ]"#,
        id = tool.id,
        path = py_str(&tool.path),
        path_replacements = path_replacements,
        query_appends = query_appends,
        method = tool.method,
        body_argument = body_argument,
        json_kwarg = json_kwarg,
        name = py_str(&tool.name),
    )
}

/// Render the installable-package manifest (`pyproject.toml`).
pub fn emit_manifest(ir: &ServerIr) -> String {
    let package_name = format!("mcp-{}", ir.server_id.to_lowercase().replace('_', "-"));
    format!(
        r#"[project]
name = "{package_name}"
version = "{version}"
description = "{description}"
requires-python = ">=3.10"
dependencies = [
    "mcp>=1.0.0",
    "httpx>=0.27",
]

[project.scripts]
{package_name} = "server:main"
"#,
        package_name = package_name,
        version = ir.version,
        description = ir.description.replace('"', "'").replace('\n', " "),
    )
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
        "# {name} MCP Server\n\n{description}\n\n## Installation\n\n```bash\npip install .\n```\n\n## Usage\n\n```bash\npython server.py\n```\n\n## Available Tools\n\n{tool_docs}\n\n## Configuration\n\nThe server calls `{base_url}`. Update BASE_URL in server.py if your API lives elsewhere.\n",
        name = ir.server_name,
        description = ir.description,
        tool_docs = tool_docs,
        base_url = ir.base_url,
    )
}
