use std::fs::File;

use serde::Deserialize;

pub use credential::CredentialConfig;
pub use log::LogConfig;
pub use server::ServerConfig;
pub use style::{LayerStyleConfig, StyleConfig};

mod credential;
mod log;
mod server;
mod style;

#[derive(Deserialize)]
pub struct Config {
    log: LogConfig,
    server: ServerConfig,
    credential: Option<CredentialConfig>,
    #[serde(default)]
    style: StyleConfig,
}

impl Config {
    pub fn log(&self) -> &LogConfig {
        &self.log
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn credential(&self) -> &Option<CredentialConfig> {
        &self.credential
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

pub fn from_path(path: &str) -> Config {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => panic!("Failed to open config file '{path}': {err}"),
    };
    match serde_yaml::from_reader::<_, Config>(file) {
        Ok(config) => config,
        Err(err) => panic!("Failed to parse config file '{path}': {err}"),
    }
}
