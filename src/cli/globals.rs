use crate::provider::PollPolicy;
use secrecy::SecretString;

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub secrets_extension_url: String,
    pub session_token: SecretString,
    pub poll: PollPolicy,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(secrets_extension_url: String) -> Self {
        Self {
            secrets_extension_url,
            session_token: SecretString::default(),
            poll: PollPolicy::default(),
        }
    }

    pub fn set_token(&mut self, token: SecretString) {
        self.session_token = token;
    }
}
