use clap::{Arg, ArgMatches, Command};
use ibmi_gateway::bridge::{render_error, ExecutionBridge};
use ibmi_gateway::env::Environment;
use ibmi_gateway::error::{Error, Result};
use ibmi_gateway::session::Transport;
use ibmi_gateway::CmdExit;

pub fn command() -> Command {
    Command::new("exec")
        .about("Validate and execute one CL command or SQL query on the remote system")
        .arg(
            Arg::new("command")
                .help("CL command or SQL query (e.g. 'WRKACTJOB')")
                .required(true),
        )
}

pub fn run(
    matches: &ArgMatches,
    env: &dyn Environment,
    transport: &dyn Transport,
) -> Result<CmdExit> {
    let Some(command) = matches.get_one::<String>("command") else {
        return Ok(CmdExit {
            code: exitcode::USAGE,
            message: Some("Provide a command. See: ibmi-gateway exec --help".to_string()),
        });
    };

    let bridge = ExecutionBridge::new(env, transport);
    match bridge.handle(command) {
        Ok(output) if !output.stderr.is_empty() => Ok(CmdExit {
            code: exitcode::SOFTWARE,
            message: Some(format!("Error: {}", output.stderr)),
        }),
        Ok(output) => Ok(CmdExit {
            code: exitcode::OK,
            message: Some(output.stdout),
        }),
        Err(err) => {
            let code = match err {
                Error::Security(_) => exitcode::NOPERM,
                Error::Config(_) => exitcode::CONFIG,
                _ => exitcode::UNAVAILABLE,
            };
            Ok(CmdExit {
                code,
                message: Some(render_error(&err)),
            })
        }
    }
}
