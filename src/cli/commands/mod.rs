pub mod logging;
pub mod poll;
pub mod secrets;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const CMD_SERVER: &str = "server";
pub const CMD_INVOKE: &str = "invoke";
pub const ARG_PORT: &str = "port";
pub const ARG_EVENT: &str = "event";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("auth0-provider")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CMD_SERVER)
                .about("Serve lifecycle events over HTTP (POST /events)")
                .arg(
                    Arg::new(ARG_PORT)
                        .short('p')
                        .long(ARG_PORT)
                        .help("Port to listen on")
                        .default_value("8080")
                        .env("AUTH0_PROVIDER_PORT")
                        .value_parser(clap::value_parser!(u16)),
                ),
        )
        .subcommand(
            Command::new(CMD_INVOKE)
                .about("Apply one lifecycle event and print the response")
                .arg(
                    Arg::new(ARG_EVENT)
                        .short('e')
                        .long(ARG_EVENT)
                        .help("Path to the event JSON, reads stdin when omitted")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                ),
        );

    let command = secrets::with_args(command);
    let command = poll::with_args(command);
    logging::with_args(command)
}
