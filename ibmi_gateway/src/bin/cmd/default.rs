use clap::{crate_version, Arg, Command};

pub fn command() -> Command {
    Command::new("ibmi-gateway")
        .version(crate_version!())
        .about("Security-mediating gateway for IBM i CL commands and read-only SQL")
        .arg_required_else_help(true)
        .arg(
            Arg::new("log")
                .long("log")
                .help("Set logging level")
                .value_name("LEVEL")
                .value_parser(["off", "trace", "debug", "info", "warn", "error"])
                .default_value("info")
                .ignore_case(true)
                .global(true),
        )
}
