//! Map parsed CLI arguments to an [`Action`].

use crate::cli::{
    actions::{invoke, server, Action},
    commands::{self, poll, secrets},
    globals::GlobalArgs,
};
use anyhow::{anyhow, Result};

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let globals = globals(matches)?;

    match matches.subcommand() {
        Some((commands::CMD_SERVER, sub)) => Ok(Action::Server(server::Args {
            port: sub
                .get_one::<u16>(commands::ARG_PORT)
                .copied()
                .unwrap_or(8080),
            globals,
        })),
        Some((commands::CMD_INVOKE, sub)) => Ok(Action::Invoke(invoke::Args {
            event: sub.get_one::<std::path::PathBuf>(commands::ARG_EVENT).cloned(),
            globals,
        })),
        Some((other, _)) => Err(anyhow!("unknown subcommand: {other}")),
        None => Err(anyhow!("missing subcommand")),
    }
}

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let secrets = secrets::Options::parse(matches)?;

    let mut globals = GlobalArgs::new(secrets.extension_url);
    globals.set_token(secrets.session_token);
    globals.poll = poll::parse(matches)?;

    Ok(globals)
}
