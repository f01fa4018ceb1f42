use clap::{Arg, ArgMatches, Command};
use ibmi_gateway::error::Result;
use ibmi_gateway::CmdExit;
use ibmi_gateway_core::{validate, Verdict};

pub fn command() -> Command {
    Command::new("check")
        .about("Dry-run a command against the validation policy (nothing is executed)")
        .arg(
            Arg::new("command")
                .help("CL command or SQL query to classify")
                .required(true),
        )
}

pub fn run(matches: &ArgMatches) -> Result<CmdExit> {
    let Some(command) = matches.get_one::<String>("command") else {
        return Ok(CmdExit {
            code: exitcode::USAGE,
            message: Some("Provide a command. See: ibmi-gateway check --help".to_string()),
        });
    };

    match validate(command) {
        Verdict::Allowed => Ok(CmdExit {
            code: exitcode::OK,
            message: Some(format!("Allowed: {command}")),
        }),
        Verdict::Rejected { reason } => Ok(CmdExit {
            code: exitcode::NOPERM,
            message: Some(format!(
                "Rejected ({reason})\n{}",
                ibmi_gateway_core::policy_message()
            )),
        }),
    }
}
