use std::io::Read;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    /// eg. `https://cloud.example.com` or `https://example.com/nextcloud`
    pub server_url: String,
    pub user: String,

    /// Basic auth, may also come from the environment
    pub password: Option<String>,
    /// Bearer token, takes precedence over the password
    pub token: Option<String>,

    pub timeout_secs: Option<u64>,
}

pub fn read_config(config_file: PathBuf) -> Result<Config> {
    let mut file = std::fs::OpenOptions::new()
        .read(true)
        .open(config_file.as_path())?;

    let mut config = String::new();
    file.read_to_string(&mut config)?;

    Ok(toml::from_str(&config)?)
}
