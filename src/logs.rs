use std::{
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::prelude::*;
use serde::{Deserialize, Serialize};

use crate::queue::Tick;

/// One line of the tick log.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize, Serialize)]
pub struct TickLog {
    pub timestamp: i64,
    pub tick: Tick,
    pub position: i64,
}

// Append a tick to this hour's log file in `dir`
pub fn write_tick(dir: &Path, tick: Tick, position: i64) -> Result<PathBuf> {
    let now = Utc::now();
    fs::create_dir_all(dir).with_context(|| format!("could not create {}", dir.display()))?;
    let path = dir.join(filename(now));
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("could not open {}", path.display()))?;
    let line = TickLog {
        timestamp: now.timestamp(),
        tick,
        position,
    };
    writeln!(
        file,
        "{},{}",
        line.timestamp,
        serde_json::to_string(&TickEntry::from(line))?
    )?;
    Ok(path)
}

// Read back one log file
pub fn read_ticks(path: &Path) -> Result<Vec<TickLog>> {
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut logs: Vec<TickLog> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let (timestamp, entry) = line.split_once(',').context("invalid log format")?;
        let entry: TickEntry = serde_json::from_str(entry)?;
        logs.push(TickLog {
            timestamp: timestamp.parse()?,
            tick: entry.tick,
            position: entry.position,
        });
    }
    Ok(logs)
}

// The timestamp already leads the line
#[derive(Serialize, Deserialize)]
struct TickEntry {
    tick: Tick,
    position: i64,
}

impl From<TickLog> for TickEntry {
    fn from(log: TickLog) -> Self {
        TickEntry {
            tick: log.tick,
            position: log.position,
        }
    }
}

// File name for the hour of `at`
fn filename(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d-%H").to_string()
}
