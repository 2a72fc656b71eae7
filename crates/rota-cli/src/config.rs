use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use rota_core::scheduler::SweepConfig;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    /// Path to the SQLite database file.
    pub database_path: String,
    /// User all commands run as unless --user overrides it.
    pub user: String,
    pub sweep: SweepConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "rota.db".to_string(),
            user: "local".to_string(),
            sweep: SweepConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("rota.toml"))
            .merge(Env::prefixed("ROTA_"))
            .extract()
    }
}
