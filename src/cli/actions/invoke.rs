use crate::{
    api::ErrorBody,
    cli::{actions::build_provider, globals::GlobalArgs},
    provider::{Event, Provider},
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    /// Event file; stdin when `None`.
    pub event: Option<PathBuf>,
    pub globals: GlobalArgs,
}

/// Apply one event and print the response JSON on stdout.
///
/// A failed event prints `{"error", "kind"}` and returns the error.
/// # Errors
/// Returns an error if the event cannot be read or decoded, or the handler fails.
pub async fn execute(args: Args) -> Result<()> {
    let raw = read_event(args.event.as_ref()).await?;
    let event = parse_event(&raw)?;

    let provider = build_provider(&args.globals).await?;

    println!("{}", run(&provider, &event).await?);

    Ok(())
}

async fn read_event(path: Option<&PathBuf>) -> Result<String> {
    if let Some(path) = path {
        debug!("reading event from {}", path.display());
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read event file {}", path.display()));
    }

    let mut raw = String::new();
    tokio::io::stdin()
        .read_to_string(&mut raw)
        .await
        .context("Failed to read event from stdin")?;
    Ok(raw)
}

fn parse_event(raw: &str) -> Result<Event> {
    serde_json::from_str(raw).context("Event is not a valid lifecycle event")
}

/// Handle `event` and render the outcome as JSON.
///
/// # Errors
/// On failure the error payload is printed before the error is returned.
pub async fn run(provider: &Provider, event: &Event) -> Result<String> {
    match provider.handle(event).await {
        Ok(response) => Ok(serde_json::to_string(&response)?),
        Err(err) => {
            let body = ErrorBody {
                error: err.to_string(),
                kind: err.kind().to_string(),
            };
            println!("{}", serde_json::to_string(&body)?);
            Err(err.into())
        }
    }
}
