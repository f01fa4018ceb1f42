mod cmd;

use std::process::exit;

use console::Style;
use ibmi_gateway::env::RealEnvironment;
use ibmi_gateway::session::SshTransport;

const DEFAULT_ERR_EXIT_CODE: i32 = 1;

fn main() {
    let app = cmd::default::command()
        .subcommand(cmd::check_cmd::command())
        .subcommand(cmd::exec_cmd::command())
        .subcommand(cmd::mcp_cmd::command());

    let matches = app.get_matches();

    // Pick up IBMI_* (and RUST_LOG) from a .env file next to the binary
    // before anything reads the environment.
    let _ = dotenvy::dotenv();

    let level = matches
        .get_one::<String>("log")
        .map_or("info", String::as_str);
    // Diagnostics go to stderr: stdout belongs to the MCP protocol when
    // serving.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let env = RealEnvironment;
    let transport = SshTransport;

    let res = match matches.subcommand() {
        Some(("check", subcommand_matches)) => cmd::check_cmd::run(subcommand_matches),
        Some(("exec", subcommand_matches)) => {
            cmd::exec_cmd::run(subcommand_matches, &env, &transport)
        }
        Some(("mcp", subcommand_matches)) => {
            cmd::mcp_cmd::run(subcommand_matches, &env, &transport)
        }
        _ => Ok(ibmi_gateway::CmdExit {
            code: exitcode::USAGE,
            message: Some("command not found".to_string()),
        }),
    };

    let exit_with = match res {
        Ok(cmd) => {
            if let Some(message) = cmd.message {
                let style = if exitcode::is_success(cmd.code) {
                    Style::new().green()
                } else {
                    Style::new().red()
                };
                eprintln!("{}", style.apply_to(message));
            }
            cmd.code
        }
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprintln!("{}", Style::new().red().apply_to(e.to_string()));
            DEFAULT_ERR_EXIT_CODE
        }
    };
    exit(exit_with)
}
