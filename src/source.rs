//! Where pin levels come from.
//!
//! The decoder never touches hardware. Anything that can report the current
//! level of both lines implements `LevelSource`: a GPIO driver, a simulator,
//! or a recorded trace.
use anyhow::Result;

use crate::queue::{Edge, Line};
use crate::rotary::PinPair;

pub trait LevelSource {
    /// Sample both lines now.
    fn read(&mut self) -> Result<PinPair>;
}

impl<S: LevelSource + ?Sized> LevelSource for &mut S {
    fn read(&mut self) -> Result<PinPair> {
        (**self).read()
    }
}

/// Polling harness that turns level samples into edge notifications.
pub struct Poller<S> {
    source: S,
    last: Option<PinPair>,
}

impl<S: LevelSource> Poller<S> {
    pub fn new(source: S) -> Self {
        Self { source, last: None }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Sample the source and report which line changed since the last poll.
    ///
    /// The first poll only records the levels. When both lines moved between
    /// polls the edge is attributed to line A; the decoder rejects that
    /// jump on its own.
    pub fn poll(&mut self) -> Result<Option<Edge>> {
        let levels = self.source.read()?;
        let last = match self.last.replace(levels) {
            Some(last) => last,
            None => return Ok(None),
        };
        let line = if levels.a != last.a {
            Line::A
        } else if levels.b != last.b {
            Line::B
        } else {
            return Ok(None);
        };
        Ok(Some(Edge { line, levels }))
    }
}
