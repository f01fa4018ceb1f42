pub mod check_cmd;
pub mod default;
pub mod exec_cmd;
pub mod mcp_cmd;
