use crate::provider::PollPolicy;
use clap::{Arg, ArgMatches, Command};
use std::time::Duration;

pub const ARG_POLL_INTERVAL: &str = "action-poll-interval";
pub const ARG_POLL_MAX_INTERVAL: &str = "action-poll-max-interval";
pub const ARG_BUILD_TIMEOUT: &str = "action-build-timeout";

/// Parse the action build wait from matches.
///
/// # Errors
/// Returns an error if the maximum interval is shorter than the initial one.
pub fn parse(matches: &ArgMatches) -> anyhow::Result<PollPolicy> {
    let defaults = PollPolicy::default();
    let seconds = |id: &str, fallback: Duration| {
        matches
            .get_one::<u64>(id)
            .copied()
            .map_or(fallback, Duration::from_secs)
    };

    let policy = PollPolicy {
        initial_interval: seconds(ARG_POLL_INTERVAL, defaults.initial_interval),
        max_interval: seconds(ARG_POLL_MAX_INTERVAL, defaults.max_interval),
        timeout: seconds(ARG_BUILD_TIMEOUT, defaults.timeout),
    };

    if policy.max_interval < policy.initial_interval {
        return Err(anyhow::anyhow!(
            "--{ARG_POLL_MAX_INTERVAL} ({}s) must be at least --{ARG_POLL_INTERVAL} ({}s)",
            policy.max_interval.as_secs(),
            policy.initial_interval.as_secs()
        ));
    }

    Ok(policy)
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_POLL_INTERVAL)
                .long(ARG_POLL_INTERVAL)
                .help("Seconds between the first action build checks")
                .env("AUTH0_PROVIDER_ACTION_POLL_INTERVAL")
                .default_value("5")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_POLL_MAX_INTERVAL)
                .long(ARG_POLL_MAX_INTERVAL)
                .help("Upper bound in seconds for the backoff between build checks")
                .env("AUTH0_PROVIDER_ACTION_POLL_MAX_INTERVAL")
                .default_value("30")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_BUILD_TIMEOUT)
                .long(ARG_BUILD_TIMEOUT)
                .help("Seconds to wait for an action build before giving up")
                .env("AUTH0_PROVIDER_ACTION_BUILD_TIMEOUT")
                .default_value("600")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
