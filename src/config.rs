//! Authenticator configuration.

/// Configuration for the L402 authenticator.
#[derive(Clone, Debug)]
pub struct Config {
    /// Domain clients must sign in pre-authorization messages.
    pub domain: String,

    /// Location stamped into minted macaroons.
    pub location: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: "localhost:8080".to_string(),
            location: "localhost:8080".to_string(),
        }
    }
}
