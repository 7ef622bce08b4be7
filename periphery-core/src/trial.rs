use crate::condition::{Condition, Direction};
use crate::stimulus::ResponseKey;
use serde::{Deserialize, Serialize, Serializer};
use std::time::Duration;

/// What happened on one displayed stimulus.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub target: char,
    pub key: ResponseKey,
    pub correct: bool,
    pub reaction_time: Duration,
}

impl TrialOutcome {
    pub fn judge(target: char, key: ResponseKey, reaction_time: Duration) -> Self {
        Self {
            target,
            key,
            correct: key.matches_target(target),
            reaction_time,
        }
    }
}

/// Final eccentricity of one completed staircase, one row of the result file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "Direction")]
    pub direction: Direction,
    #[serde(rename = "Letter Height (degrees)", serialize_with = "whole_degrees")]
    pub size_deg: f64,
    #[serde(rename = "Eccentricity (degrees)", serialize_with = "whole_degrees")]
    pub angle_deg: f64,
}

/// Writes whole-degree values without a fractional part (`17`, not `17.0`).
fn whole_degrees<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

impl ResultRecord {
    /// Column names of the result file, in field order.
    pub const HEADER: [&'static str; 3] = [
        "Direction",
        "Letter Height (degrees)",
        "Eccentricity (degrees)",
    ];

    pub fn new(condition: Condition, angle_deg: f64) -> Self {
        Self {
            direction: condition.direction,
            size_deg: condition.size_deg,
            angle_deg,
        }
    }
}
