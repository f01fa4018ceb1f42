use clap::{ArgMatches, Command};
use ibmi_gateway::bridge::ExecutionBridge;
use ibmi_gateway::env::Environment;
use ibmi_gateway::error::Result;
use ibmi_gateway::mcp::McpServer;
use ibmi_gateway::session::Transport;
use ibmi_gateway::CmdExit;
use tracing::info;

pub fn command() -> Command {
    Command::new("mcp")
        .about("Start the MCP (Model Context Protocol) server for AI agent integration")
        .long_about(
            "Start a JSON-RPC 2.0 server over stdio that exposes the gateway as an MCP tool \
            server. Agents can run allowlisted CL commands and SQL queries, compile programs \
            and browse source members.\n\n\
            Configure in an MCP client:\n\
            {\"mcpServers\": {\"ibmi-gateway\": {\"command\": \"ibmi-gateway\", \"args\": [\"mcp\"]}}}",
        )
}

pub fn run(
    _matches: &ArgMatches,
    env: &dyn Environment,
    transport: &dyn Transport,
) -> Result<CmdExit> {
    let session_id = uuid::Uuid::new_v4().to_string();
    info!(%session_id, "starting ibmi-gateway MCP server");

    let bridge = ExecutionBridge::new(env, transport);
    let server = McpServer::new(&bridge, session_id);
    server.run_stdio()?;

    Ok(CmdExit {
        code: exitcode::OK,
        message: None,
    })
}
