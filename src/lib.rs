//! Rotary encoder decoding for the Raspberry Pi.
//!
//! `rotary` holds the full-step state machine. `shared` and `queue` are the
//! two ways of driving it from edge callbacks on both lines.

pub mod config;
pub mod counter;
pub mod logs;
pub mod queue;
pub mod replay;
pub mod rotary;
pub mod shared;
pub mod source;
pub mod trace;

pub use queue::{Edge, EdgeNotifier, Line, Tick};
pub use rotary::{Direction, EncoderState, PinPair, QuadratureDecoder};
pub use shared::SharedDecoder;
pub use source::{LevelSource, Poller};
