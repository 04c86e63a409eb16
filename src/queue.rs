//! Single-consumer edge queue.
//!
//! Edge callbacks only push the sampled levels into a channel. One thread
//! owns the decoder and drains it, so the state machine never runs
//! concurrently and ticks come out in the order edges were queued.
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::rotary::{Direction, PinPair, QuadratureDecoder};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Line {
    A,
    B,
}

/// Notification that `line` changed, with both levels sampled afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub line: Line,
    pub levels: PinPair,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub edge: Edge,
    pub direction: Direction,
}

/// Producer side, one clone per edge callback.
#[derive(Clone, Debug)]
pub struct EdgeNotifier {
    tx: Sender<Edge>,
}

impl EdgeNotifier {
    pub fn notify(&self, edge: Edge) -> Result<()> {
        self.tx
            .send(edge)
            .map_err(|_| anyhow!("decoder task has stopped"))
    }

    pub fn notify_levels(&self, line: Line, a: bool, b: bool) -> Result<()> {
        self.notify(Edge {
            line,
            levels: PinPair::new(a, b),
        })
    }
}

pub struct DecoderTask {
    handle: JoinHandle<QuadratureDecoder>,
    ticks: Receiver<Tick>,
}

impl DecoderTask {
    /// Ticks in decode order. `None` directions are not forwarded.
    pub fn ticks(&self) -> &Receiver<Tick> {
        &self.ticks
    }

    /// Wait for every notifier to be dropped and the queue to drain.
    ///
    /// Returns the decoder so the final state can be inspected, along with
    /// any ticks that were not yet received.
    pub fn join(self) -> Result<(QuadratureDecoder, Vec<Tick>)> {
        let decoder = self
            .handle
            .join()
            .map_err(|_| anyhow!("decoder task panicked"))?;
        let rest = self.ticks.try_iter().collect();
        Ok((decoder, rest))
    }
}

/// Start the consumer thread that owns `decoder`.
pub fn spawn(decoder: QuadratureDecoder) -> Result<(EdgeNotifier, DecoderTask)> {
    spawn_observed(decoder, |_, _| {})
}

/// Like `spawn`, with `observe` called for every dequeued edge, ticking or
/// not, on the consumer thread.
pub fn spawn_observed<F>(
    mut decoder: QuadratureDecoder,
    mut observe: F,
) -> Result<(EdgeNotifier, DecoderTask)>
where
    F: FnMut(Edge, Direction) + Send + 'static,
{
    let (edge_tx, edge_rx) = mpsc::channel::<Edge>();
    let (tick_tx, tick_rx) = mpsc::channel::<Tick>();

    let handle = thread::Builder::new()
        .name("rotenc-decoder".into())
        .spawn(move || {
            for edge in edge_rx {
                let direction = decoder.step(edge.levels);
                observe(edge, direction);
                if direction == Direction::None {
                    continue;
                }
                debug!("{:?} after edge on {:?}", direction, edge.line);
                // Nobody listening is fine, keep decoding.
                let _ = tick_tx.send(Tick { edge, direction });
            }
            decoder
        })
        .context("could not spawn decoder thread")?;

    Ok((
        EdgeNotifier { tx: edge_tx },
        DecoderTask {
            handle,
            ticks: tick_rx,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotary::EncoderState;

    #[test]
    fn decodes_queued_edges_in_order() {
        let (notifier, task) = spawn(QuadratureDecoder::new()).unwrap();
        // positive detent, then negative
        notifier.notify_levels(Line::A, false, true).unwrap();
        notifier.notify_levels(Line::B, false, false).unwrap();
        notifier.notify_levels(Line::A, true, false).unwrap();
        notifier.notify_levels(Line::B, true, true).unwrap();
        notifier.notify_levels(Line::B, true, false).unwrap();
        notifier.notify_levels(Line::A, false, false).unwrap();
        notifier.notify_levels(Line::B, false, true).unwrap();
        notifier.notify_levels(Line::A, true, true).unwrap();
        drop(notifier);

        let (decoder, ticks) = task.join().unwrap();
        assert_eq!(decoder.state(), EncoderState::Start);
        let directions: Vec<Direction> = ticks.iter().map(|t| t.direction).collect();
        assert_eq!(directions, vec![Direction::Positive, Direction::Negative]);
        assert_eq!(ticks[0].edge.line, Line::B);
        assert_eq!(ticks[1].edge.line, Line::A);
    }

    #[test]
    fn duplicate_notifications_do_not_tick() {
        let (notifier, task) = spawn(QuadratureDecoder::new()).unwrap();
        for _ in 0..5 {
            notifier.notify_levels(Line::A, true, true).unwrap();
        }
        drop(notifier);
        let (_, ticks) = task.join().unwrap();
        assert!(ticks.is_empty());
    }

    #[test]
    fn observer_sees_every_edge() {
        let (seen_tx, seen_rx) = mpsc::channel();
        let (notifier, task) = spawn_observed(QuadratureDecoder::new(), move |edge, direction| {
            seen_tx.send((edge.levels, direction)).unwrap();
        })
        .unwrap();
        notifier.notify_levels(Line::A, true, false).unwrap();
        notifier.notify_levels(Line::A, true, false).unwrap();
        drop(notifier);
        task.join().unwrap();

        let seen: Vec<_> = seen_rx.try_iter().collect();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(_, d)| *d == Direction::None));
    }

    #[test]
    fn notify_after_consumer_stopped_is_an_error() {
        let (notifier, task) = spawn_observed(QuadratureDecoder::new(), |_, _| {
            panic!("observer failed")
        })
        .unwrap();
        let survivor = notifier.clone();
        notifier.notify_levels(Line::A, true, true).unwrap();
        drop(notifier);

        // Once the consumer is gone the channel reports disconnection.
        let mut failed = false;
        for _ in 0..1_000 {
            if survivor.notify_levels(Line::B, true, true).is_err() {
                failed = true;
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
        assert!(failed);
        drop(survivor);
        assert!(task.join().is_err());
    }
}
