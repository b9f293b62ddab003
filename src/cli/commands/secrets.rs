use crate::secrets::DEFAULT_EXTENSION_PORT;
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_EXTENSION_PORT: &str = "secrets-extension-port";
pub const ARG_EXTENSION_URL: &str = "secrets-extension-url";
pub const ARG_SESSION_TOKEN: &str = "session-token";

#[derive(Debug, Clone)]
pub struct Options {
    /// Base URL of the secrets side-car.
    pub extension_url: String,
    pub session_token: SecretString,
}

impl Options {
    /// Parse secret store arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the extension URL is blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let extension_url = match matches.get_one::<String>(ARG_EXTENSION_URL) {
            Some(url) if url.trim().is_empty() => {
                return Err(anyhow::anyhow!("--{ARG_EXTENSION_URL} cannot be empty"));
            }
            Some(url) => url.trim().to_string(),
            None => {
                let port = matches
                    .get_one::<u16>(ARG_EXTENSION_PORT)
                    .copied()
                    .unwrap_or(DEFAULT_EXTENSION_PORT);
                format!("http://localhost:{port}")
            }
        };

        let session_token = matches
            .get_one::<String>(ARG_SESSION_TOKEN)
            .cloned()
            .unwrap_or_default();

        Ok(Self {
            extension_url,
            session_token: SecretString::from(session_token),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_EXTENSION_PORT)
                .long(ARG_EXTENSION_PORT)
                .help("Port of the local parameters and secrets extension")
                .env("PARAMETERS_SECRETS_EXTENSION_HTTP_PORT")
                .default_value("2773")
                .global(true)
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_EXTENSION_URL)
                .long(ARG_EXTENSION_URL)
                .help("Secrets extension base URL, overrides --secrets-extension-port")
                .env("AUTH0_PROVIDER_SECRETS_EXTENSION_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_SESSION_TOKEN)
                .long(ARG_SESSION_TOKEN)
                .help("Session token sent to the secrets extension")
                .env("AWS_SESSION_TOKEN")
                .hide_env_values(true)
                .global(true),
        )
}
