use std::env;

use anyhow::{Context, Result};
use log::info;

use rotenc::{config::Settings, replay::replay, trace::Trace};

fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let trace_path = env::var("ROTENC_TRACE").context("ROTENC_TRACE path not set")?;
    let settings = match env::var("ROTENC_CONFIG") {
        Ok(path) => Settings::load_from_path(&path)?,
        Err(_) => Settings::default(),
    };
    info!("Settings {:?}", settings);

    let trace = Trace::load(&trace_path)?;
    info!("Replaying {} samples from {}", trace.len(), trace_path);

    let result = replay(&trace, &settings)?;
    info!(
        "Final position {} ({:.0}%) after {} ticks, decoder {:?}",
        result.counter.value,
        result.counter.fraction() * 100.0,
        result.ticks.len(),
        result.state
    );

    Ok(())
}
