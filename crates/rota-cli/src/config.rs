use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use rota_core::calendar::ProjectionOptions;
use rota_core::models::FilterSet;
use serde::Deserialize;

use crate::timezone::detect_system_timezone;

/// Config file read from the working directory unless `ROTA_CONFIG` points elsewhere.
const CONFIG_FILE: &str = "rota.toml";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// JSON file holding the routine records
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// IANA timezone used to decide what "today" is
    #[serde(default = "detect_system_timezone")]
    pub default_timezone: String,
    /// Filters applied to `calendar` when none are given on the command line
    #[serde(default)]
    pub default_filters: FilterSet,
    #[serde(default)]
    pub projection: ProjectionOptions,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("routines.json")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            default_timezone: detect_system_timezone(),
            default_filters: FilterSet::default(),
            projection: ProjectionOptions::default(),
        }
    }
}

impl Config {
    /// Layers `rota.toml` under `ROTA_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `ROTA_PROJECTION__WEEK_START=monday`.
    pub fn new() -> Result<Self, figment::Error> {
        let file = std::env::var("ROTA_CONFIG").unwrap_or_else(|_| CONFIG_FILE.to_string());
        Self::figment(Toml::file(file)).extract()
    }

    fn figment(toml: figment::providers::Data<Toml>) -> Figment {
        Figment::new()
            .merge(toml)
            .merge(Env::prefixed("ROTA_").ignore(&["config"]).split("__"))
    }
}
