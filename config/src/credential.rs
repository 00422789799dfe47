use serde::Deserialize;

/// Credential triple used by the transport to sign requests. The signing
/// itself happens outside this core.
#[derive(Deserialize)]
pub struct CredentialConfig {
    id: String,
    key: String,
    algorithm: String,
}

impl CredentialConfig {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }
}
