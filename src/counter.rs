use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::rotary::Direction;

/// Clamped position driven by ticks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

impl Counter {
    /// `value` is clamped into `min..=max`. Bounds are swapped if reversed.
    pub fn new(value: i64, min: i64, max: i64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            value: value.clamp(min, max),
            min,
            max,
        }
    }

    /// Index into `0..=increments`, starting at `initial` percent of the range.
    pub fn from_settings(settings: &Settings) -> Self {
        let increments = settings.increments as i64;
        Counter::new(increments * settings.initial as i64 / 100, 0, increments)
    }

    /// Returns whether the value moved.
    pub fn apply(&mut self, direction: Direction) -> bool {
        let next = self
            .value
            .saturating_add(direction.delta())
            .clamp(self.min, self.max);
        let moved = next != self.value;
        self.value = next;
        moved
    }

    /// Fraction of the range covered, 0.0 to 1.0.
    pub fn fraction(&self) -> f64 {
        if self.max == self.min {
            return 0.0;
        }
        // i128 so the span of a full i64 range fits
        let span = self.max as i128 - self.min as i128;
        (self.value as i128 - self.min as i128) as f64 / span as f64
    }
}
