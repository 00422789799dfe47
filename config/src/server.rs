use serde::Deserialize;

#[derive(Deserialize)]
pub struct ServerConfig {
    url: String,
}

impl ServerConfig {
    pub fn url(&self) -> &str {
        &self.url
    }
}
