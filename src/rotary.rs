//! Full-step quadrature decoder.
//!
//! The encoder common is grounded and both lines are pulled up, so a detent
//! rests with A and B high. Turning one click walks the two-bit code
//! `(B << 1) | A` through all four phases and back to rest:
//!
//! ```text
//! positive: 11 -> 01 -> 00 -> 10 -> 11   (A falls first)
//! negative: 11 -> 10 -> 00 -> 01 -> 11   (B falls first)
//! ```
//!
//! A tick is only reported once the lines return to rest after a complete
//! cycle. Anything else, such as a contact bounce that flips both lines at
//! once, sends the state machine back to `Start` without a tick.

use serde::{Deserialize, Serialize};

use EncoderState::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Positive,
    Negative,
    None,
}

impl Direction {
    /// +1, -1 or 0
    pub fn delta(self) -> i64 {
        match self {
            Direction::Positive => 1,
            Direction::Negative => -1,
            Direction::None => 0,
        }
    }

    fn flag(self) -> u8 {
        match self {
            Direction::Positive => 0x20,
            Direction::Negative => 0x10,
            Direction::None => 0x00,
        }
    }
}

/// Position within one detent cycle.
///
/// The discriminants are the row numbers of the packed table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum EncoderState {
    Start = 0,
    NegativeFinal = 1,
    NegativeBegin = 2,
    NegativeNext = 3,
    PositiveBegin = 4,
    PositiveFinal = 5,
    PositiveNext = 6,
}

/// Instantaneous levels of both lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinPair {
    pub a: bool,
    pub b: bool,
}

impl PinPair {
    pub fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    /// Two-bit code, B in the high bit.
    pub fn code(self) -> usize {
        ((self.b as usize) << 1) | self.a as usize
    }

    pub fn from_code(code: usize) -> Self {
        Self {
            a: code & 0b01 != 0,
            b: code & 0b10 != 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: EncoderState,
    pub direction: Direction,
}

impl Transition {
    /// State in the low nibble, direction flag in the high nibble.
    pub fn packed(self) -> u8 {
        self.next as u8 | self.direction.flag()
    }
}

const fn to(next: EncoderState) -> Transition {
    Transition {
        next,
        direction: Direction::None,
    }
}

const fn emit(next: EncoderState, direction: Direction) -> Transition {
    Transition { next, direction }
}

/// Indexed by `[state][code]`, code columns are `00`, `01`, `10`, `11` as `BA`.
pub const TRANSITIONS: [[Transition; 4]; 7] = [
    // Start
    [to(Start), to(NegativeBegin), to(PositiveBegin), to(Start)],
    // NegativeFinal
    [
        to(NegativeNext),
        to(Start),
        to(NegativeFinal),
        emit(Start, Direction::Negative),
    ],
    // NegativeBegin
    [to(NegativeNext), to(NegativeBegin), to(Start), to(Start)],
    // NegativeNext
    [to(NegativeNext), to(NegativeBegin), to(NegativeFinal), to(Start)],
    // PositiveBegin
    [to(PositiveNext), to(Start), to(PositiveBegin), to(Start)],
    // PositiveFinal
    [
        to(PositiveNext),
        to(PositiveFinal),
        to(Start),
        emit(Start, Direction::Positive),
    ],
    // PositiveNext
    [to(PositiveNext), to(PositiveFinal), to(PositiveBegin), to(Start)],
];

/// Decodes one encoder. Each physical encoder needs its own instance.
#[derive(Debug)]
pub struct QuadratureDecoder {
    state: EncoderState,
}

impl Default for QuadratureDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadratureDecoder {
    pub fn new() -> Self {
        Self { state: Start }
    }

    pub fn state(&self) -> EncoderState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = Start;
    }

    /// Advance on the current levels of both lines.
    ///
    /// Either line's edge may trigger this, as long as both levels are
    /// sampled at call time. Calls with unchanged levels are harmless.
    pub fn evaluate(&mut self, a: bool, b: bool) -> Direction {
        self.step(PinPair::new(a, b))
    }

    pub fn step(&mut self, levels: PinPair) -> Direction {
        let transition = TRANSITIONS[self.state as usize][levels.code()];
        self.state = transition.next;
        transition.direction
    }
}
