//! Engine configuration from the environment
use super::telemetry::{Geofence, PORT_OF_NEW_YORK};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

pub const DESTINATION_PORT_VAR: &str = "COYOTE_DESTINATION_PORT";
pub const DB_PATH_VAR: &str = "COYOTE_DB_PATH";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Coordinate string a GPS reading must equal to count as in port.
    pub destination_port: String,
    pub db_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            destination_port: PORT_OF_NEW_YORK.to_string(),
            db_path: PathBuf::from("coyote.db"),
        }
    }
}

impl EngineConfig {
    /// Reads `.env` if present, then the process environment.
    pub fn load() -> Self {
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; blank values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            destination_port: value(DESTINATION_PORT_VAR).unwrap_or(defaults.destination_port),
            db_path: value(DB_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
        }
    }

    pub fn geofence(&self) -> Geofence {
        Geofence::new(&self.destination_port)
    }
}
