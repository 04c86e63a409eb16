use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

fn default_increments() -> u32 {
    20
}

fn default_tick_log() -> String {
    "log".to_string()
}

/// Harness settings, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Starting position, percent of the range
    #[serde(default)]
    pub initial: u32,
    /// Number of steps from minimum to maximum
    #[serde(default = "default_increments")]
    pub increments: u32,
    /// Directory for the hourly tick logs
    #[serde(default = "default_tick_log")]
    pub tick_log: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            initial: 0,
            increments: default_increments(),
            tick_log: default_tick_log(),
        }
    }
}

impl Settings {
    pub fn load_from_path(path: &str) -> Result<Settings> {
        let f = File::open(path).with_context(|| format!("could not open settings {}", path))?;
        let reader = BufReader::new(f);
        let settings: Settings = serde_json::from_reader(reader)
            .with_context(|| format!("could not parse settings {}", path))?;
        Ok(settings.sanitize())
    }

    pub fn write_to_path(&self, path: &str) -> Result<()> {
        let f = File::create(path).with_context(|| format!("could not create settings {}", path))?;
        serde_json::to_writer_pretty(&f, self)?;
        Ok(())
    }

    /// Pull out-of-range values back into range.
    pub fn sanitize(mut self) -> Settings {
        if self.initial > 100 {
            self.initial = 100;
            warn!("Initial position set to {}%", self.initial);
        }
        if self.increments < 1 {
            // just off/on
            self.increments = 1;
            warn!("Increments set to {}", self.increments);
        } else if self.increments > 100 {
            self.increments = 100;
            warn!("Increments set to {}", self.increments);
        }
        self
    }
}
