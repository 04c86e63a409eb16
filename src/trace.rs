//! Recorded level traces.
//!
//! One sample per line, an optional timestamp in microseconds followed by
//! the A and B levels:
//!
//! ```text
//! # turn one click
//! 0     1 1
//! 1200  0 1
//! 1900  00
//! ```
use std::fs;

use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;

use crate::rotary::PinPair;
use crate::source::LevelSource;

lazy_static! {
    static ref SAMPLE: Regex =
        Regex::new(r"^(?:(?P<t>[0-9]+)\s+)?(?P<a>[01])\s*(?P<b>[01])$").unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    pub micros: Option<u64>,
    pub levels: PinPair,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    samples: Vec<Sample>,
}

impl Trace {
    pub fn parse(contents: &str) -> Result<Trace> {
        let mut samples = Vec::new();
        for (number, line) in contents.lines().enumerate() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }
            let caps = match SAMPLE.captures(line) {
                Some(caps) => caps,
                None => bail!("line {}: unrecognised sample {:?}", number + 1, line),
            };
            let micros = match caps.name("t") {
                Some(t) => Some(
                    t.as_str()
                        .parse::<u64>()
                        .with_context(|| format!("line {}: bad timestamp", number + 1))?,
                ),
                None => None,
            };
            samples.push(Sample {
                micros,
                levels: PinPair::new(&caps["a"] == "1", &caps["b"] == "1"),
            });
        }
        Ok(Trace { samples })
    }

    pub fn load(path: &str) -> Result<Trace> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("could not read trace {}", path))?;
        Trace::parse(&contents).with_context(|| format!("invalid trace {}", path))
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn cursor(&self) -> TraceCursor<'_> {
        TraceCursor {
            samples: &self.samples,
            at: 0,
        }
    }
}

/// Steps through a trace one sample per read, then keeps returning the last
/// sample like an idle line.
pub struct TraceCursor<'a> {
    samples: &'a [Sample],
    at: usize,
}

impl<'a> TraceCursor<'a> {
    pub fn is_exhausted(&self) -> bool {
        self.at >= self.samples.len()
    }

    /// Timestamp of the sample returned by the last read, if it had one.
    pub fn micros(&self) -> Option<u64> {
        self.at
            .checked_sub(1)
            .and_then(|i| self.samples.get(i))
            .and_then(|sample| sample.micros)
    }
}

impl<'a> LevelSource for TraceCursor<'a> {
    fn read(&mut self) -> Result<PinPair> {
        let samples = self.samples;
        let sample = match samples.get(self.at).or_else(|| samples.last()) {
            Some(sample) => sample,
            None => bail!("trace is empty"),
        };
        if self.at < samples.len() {
            self.at += 1;
        }
        Ok(sample.levels)
    }
}
