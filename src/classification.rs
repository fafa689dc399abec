use serde::Serialize;
use std::fmt;

/// Scores at or above this value are dogs.
pub const LABEL_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    Cat,
    Dog,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Cat => "Cat",
            Label::Dog => "Dog",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: Label,
    /// Always within `[0.5, 1.0]`, rounded to four decimals, ties to even.
    pub confidence: f64,
}

impl Prediction {
    /// Maps the sigmoid output of the network to a label.
    ///
    /// The score is clamped into `[0, 1]` first so a slightly out of range
    /// output cannot push the confidence past 1.
    pub fn from_score(score: f32) -> Self {
        let score = score.clamp(0.0, 1.0);
        let (label, confidence) = if score >= LABEL_THRESHOLD {
            (Label::Dog, score)
        } else {
            (Label::Cat, 1.0 - score)
        };

        Self {
            label,
            confidence: round_to(confidence as f64, 4),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
