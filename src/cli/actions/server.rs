use crate::{
    api,
    cli::{actions::build_provider, globals::GlobalArgs},
};
use anyhow::Result;
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub globals: GlobalArgs,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    if args.globals.session_token.expose_secret().is_empty() {
        warn!("No session token set, the secrets extension will reject credential lookups");
    }

    let provider = Arc::new(build_provider(&args.globals).await?);

    api::serve(args.port, provider).await
}

fn log_startup_args(args: &Args) {
    let short_hash = crate::GIT_COMMIT_HASH.get(0..7).unwrap_or("unknown");
    let poll = args.globals.poll;

    info!(
        "{} {} ({}) listen=tcp:{} secrets_extension={} action_poll={}s..{}s action_build_timeout={}s",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_hash,
        args.port,
        args.globals.secrets_extension_url,
        poll.initial_interval.as_secs(),
        poll.max_interval.as_secs(),
        poll.timeout.as_secs(),
    );
}
