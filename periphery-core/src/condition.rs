use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter heights tested in one session, in degrees of visual angle.
pub const LETTER_SIZES_DEG: [f64; 9] = [0.25, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0];

/// Direction of the stimulus relative to fixation.
///
/// Serialized as its 1-based number (Right = 1 .. Up = 4), which is the
/// value written to the result file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Up,
    ];

    /// Zero-based index into per-direction calibration tables.
    pub fn index(self) -> usize {
        match self {
            Direction::Right => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Up => 3,
        }
    }

    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1..=4 => Some(Self::ALL[number as usize - 1]),
            _ => None,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Down | Direction::Up)
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> u8 {
        direction.number()
    }
}

impl TryFrom<u8> for Direction {
    type Error = String;

    fn try_from(number: u8) -> Result<Self, Self::Error> {
        Direction::from_number(number).ok_or_else(|| format!("direction {number} is not in 1..=4"))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Up => "up",
        };
        f.write_str(name)
    }
}

/// One size × direction cell of the experiment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition {
    pub size_deg: f64,
    pub direction: Direction,
}

impl Condition {
    pub fn new(size_deg: f64, direction: Direction) -> Self {
        Self {
            size_deg,
            direction,
        }
    }
}
