//! Replay a recorded trace as if it came from the edge interrupts.
use std::{path::Path, thread};

use anyhow::{anyhow, Result};
use log::{debug, info, warn};

use crate::config::Settings;
use crate::counter::Counter;
use crate::logs::write_tick;
use crate::queue::{self, Tick};
use crate::rotary::{EncoderState, QuadratureDecoder};
use crate::source::Poller;
use crate::trace::Trace;

#[derive(Debug)]
pub struct Replay {
    /// Every tick the decoder produced, in order
    pub ticks: Vec<Tick>,
    pub counter: Counter,
    pub state: EncoderState,
}

/// Poll `trace` into the decoder queue and fold the ticks into a counter.
///
/// Ticks that move the counter are appended to the tick log under
/// `settings.tick_log`.
pub fn replay(trace: &Trace, settings: &Settings) -> Result<Replay> {
    let (notifier, task) = queue::spawn(QuadratureDecoder::new())?;

    // Stand-in for the edge interrupts, forward every change to the decoder
    let samples = trace.clone();
    let feeder = thread::spawn(move || -> Result<()> {
        let mut poller = Poller::new(samples.cursor());
        while !poller.source().is_exhausted() {
            if let Some(edge) = poller.poll()? {
                match poller.source().micros() {
                    Some(micros) => debug!("Edge on {:?} at {}us", edge.line, micros),
                    None => debug!("Edge on {:?}", edge.line),
                }
                notifier.notify(edge)?;
            }
        }
        Ok(())
    });

    let mut counter = Counter::from_settings(settings);
    let mut ticks = Vec::new();
    let log_dir = Path::new(&settings.tick_log);
    for tick in task.ticks().iter() {
        ticks.push(tick);
        if !counter.apply(tick.direction) {
            info!("{:?} ignored, position at {}", tick.direction, counter.value);
            continue;
        }
        info!(
            "Turning knob {:?}, position {} of {}",
            tick.direction, counter.value, counter.max
        );
        if let Err(e) = write_tick(log_dir, tick, counter.value) {
            warn!("Could not write tick log: {:#}", e);
        }
    }

    feeder
        .join()
        .map_err(|_| anyhow!("trace feeder panicked"))??;
    let (decoder, rest) = task.join()?;
    ticks.extend(rest);

    Ok(Replay {
        ticks,
        counter,
        state: decoder.state(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::read_ticks;
    use crate::rotary::Direction;
    use std::fs;

    fn settings(dir: &Path) -> Settings {
        Settings {
            tick_log: dir.to_str().unwrap().to_string(),
            ..Settings::default()
        }
    }

    fn directions(replay: &Replay) -> Vec<Direction> {
        replay.ticks.iter().map(|t| t.direction).collect()
    }

    #[test]
    fn replays_bundled_trace() {
        let dir = tempfile::tempdir().unwrap();
        let trace = Trace::parse(include_str!("../traces/detents.trace")).unwrap();
        let replay = replay(&trace, &settings(dir.path())).unwrap();

        assert_eq!(
            directions(&replay),
            vec![Direction::Positive, Direction::Positive, Direction::Negative]
        );
        assert_eq!(replay.counter.value, 1);
        assert_eq!(replay.state, EncoderState::Start);

        let mut logged = Vec::new();
        for entry in fs::read_dir(dir.path()).unwrap() {
            logged.extend(read_ticks(&entry.unwrap().path()).unwrap());
        }
        logged.sort_by_key(|log| log.timestamp);
        let positions: Vec<i64> = logged.iter().map(|log| log.position).collect();
        assert_eq!(positions, vec![1, 2, 1]);
    }

    #[test]
    fn ticks_at_the_bound_are_not_logged() {
        let dir = tempfile::tempdir().unwrap();
        // one negative click from position 0
        let trace = Trace::parse("11\n10\n00\n01\n11").unwrap();
        let replay = replay(&trace, &settings(dir.path())).unwrap();

        assert_eq!(directions(&replay), vec![Direction::Negative]);
        assert_eq!(replay.counter.value, 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn stops_on_empty_trace() {
        let dir = tempfile::tempdir().unwrap();
        let replay = replay(&Trace::default(), &settings(dir.path())).unwrap();
        assert!(replay.ticks.is_empty());
        assert_eq!(replay.state, EncoderState::Start);
    }

    #[test]
    fn partial_detent_leaves_decoder_mid_cycle() {
        let dir = tempfile::tempdir().unwrap();
        let trace = Trace::parse("11\n01\n00").unwrap();
        let replay = replay(&trace, &settings(dir.path())).unwrap();
        assert!(replay.ticks.is_empty());
        assert_eq!(replay.state, EncoderState::PositiveNext);
    }
}
