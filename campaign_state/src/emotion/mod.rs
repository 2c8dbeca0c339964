//! Emotion codec - six-axis NPC emotional state and its compact string form.
//!
//! A code looks like `C50-A30-P50-H10-R50-J10`: one token per axis, each a
//! single axis letter followed by an integer in `[0, 100]`.

mod level;

pub use level::*;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Code of the default emotional state.
pub const DEFAULT_EMOTION_CODE: &str = "C50-A30-P50-H10-R50-J10";

pub const EMOTION_MIN: u8 = 0;
pub const EMOTION_MAX: u8 = 100;

/// The six emotion axes, in encoding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionAxis {
    Confiance,
    Amour,
    Peur,
    Haine,
    Respect,
    Jalousie,
}

impl EmotionAxis {
    pub const ALL: [EmotionAxis; 6] = [
        EmotionAxis::Confiance,
        EmotionAxis::Amour,
        EmotionAxis::Peur,
        EmotionAxis::Haine,
        EmotionAxis::Respect,
        EmotionAxis::Jalousie,
    ];

    /// The one-letter code used in emotion strings.
    pub fn letter(self) -> char {
        match self {
            EmotionAxis::Confiance => 'C',
            EmotionAxis::Amour => 'A',
            EmotionAxis::Peur => 'P',
            EmotionAxis::Haine => 'H',
            EmotionAxis::Respect => 'R',
            EmotionAxis::Jalousie => 'J',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        Self::ALL.into_iter().find(|axis| axis.letter() == letter)
    }

    pub fn name(self) -> &'static str {
        match self {
            EmotionAxis::Confiance => "confiance",
            EmotionAxis::Amour => "amour",
            EmotionAxis::Peur => "peur",
            EmotionAxis::Haine => "haine",
            EmotionAxis::Respect => "respect",
            EmotionAxis::Jalousie => "jalousie",
        }
    }
}

impl std::fmt::Display for EmotionAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown emotion axis: {0}")]
pub struct ParseAxisError(pub String);

impl FromStr for EmotionAxis {
    type Err = ParseAxisError;

    /// Accepts a full axis name (any case) or its single letter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|axis| {
                axis.name() == wanted || axis.letter().to_lowercase().eq(wanted.chars())
            })
            .ok_or_else(|| ParseAxisError(s.to_string()))
    }
}

/// Decoded emotional state, every axis within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmotionVector {
    pub confiance: u8,
    pub amour: u8,
    pub peur: u8,
    pub haine: u8,
    pub respect: u8,
    pub jalousie: u8,
}

impl Default for EmotionVector {
    fn default() -> Self {
        Self {
            confiance: 50,
            amour: 30,
            peur: 50,
            haine: 10,
            respect: 50,
            jalousie: 10,
        }
    }
}

impl EmotionVector {
    pub fn get(&self, axis: EmotionAxis) -> u8 {
        match axis {
            EmotionAxis::Confiance => self.confiance,
            EmotionAxis::Amour => self.amour,
            EmotionAxis::Peur => self.peur,
            EmotionAxis::Haine => self.haine,
            EmotionAxis::Respect => self.respect,
            EmotionAxis::Jalousie => self.jalousie,
        }
    }

    /// Set an axis, clamping the value into `[0, 100]`.
    pub fn set(&mut self, axis: EmotionAxis, value: i64) {
        let clamped = clamp_axis(value);
        let slot = match axis {
            EmotionAxis::Confiance => &mut self.confiance,
            EmotionAxis::Amour => &mut self.amour,
            EmotionAxis::Peur => &mut self.peur,
            EmotionAxis::Haine => &mut self.haine,
            EmotionAxis::Respect => &mut self.respect,
            EmotionAxis::Jalousie => &mut self.jalousie,
        };
        *slot = clamped;
    }

    /// Move an axis by `delta`, clamped. Returns the new value.
    pub fn shift(&mut self, axis: EmotionAxis, delta: i64) -> u8 {
        self.set(axis, i64::from(self.get(axis)).saturating_add(delta));
        self.get(axis)
    }

    /// Decode an emotion code. Never fails.
    ///
    /// A missing or empty code yields the default vector. Tokens with an
    /// unknown axis letter or no leading integer are skipped, and axes absent
    /// from the code keep their default value.
    pub fn decode(code: Option<&str>) -> Self {
        let mut out = Self::default();
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            return out;
        };

        for token in code.split('-') {
            let mut chars = token.chars();
            let Some(axis) = chars.next().and_then(EmotionAxis::from_letter) else {
                continue;
            };
            if let Some(value) = parse_leading_int(chars.as_str()) {
                out.set(axis, value);
            }
        }

        out
    }

    /// Encode in fixed `C-A-P-H-R-J` order.
    pub fn encode(&self) -> String {
        EmotionAxis::ALL
            .iter()
            .map(|axis| format!("{}{}", axis.letter(), self.get(*axis)))
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl std::fmt::Display for EmotionVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Persisted emotion code string, as stored on an NPC record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionCode(String);

impl EmotionCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn vector(&self) -> EmotionVector {
        EmotionVector::decode(Some(&self.0))
    }
}

impl Default for EmotionCode {
    fn default() -> Self {
        Self(DEFAULT_EMOTION_CODE.to_string())
    }
}

impl From<EmotionVector> for EmotionCode {
    fn from(vector: EmotionVector) -> Self {
        Self(vector.encode())
    }
}

impl std::fmt::Display for EmotionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn clamp_axis(value: i64) -> u8 {
    value.clamp(i64::from(EMOTION_MIN), i64::from(EMOTION_MAX)) as u8
}

/// Parse the integer prefix of `s` (after leading whitespace, optional sign).
/// Trailing garbage is ignored; `None` if there are no digits.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }

    seen.then_some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_and_missing_is_default() {
        let expected = EmotionVector {
            confiance: 50,
            amour: 30,
            peur: 50,
            haine: 10,
            respect: 50,
            jalousie: 10,
        };
        assert_eq!(EmotionVector::decode(None), expected);
        assert_eq!(EmotionVector::decode(Some("")), expected);
    }

    #[test]
    fn test_decode_full_code() {
        let v = EmotionVector::decode(Some("C75-A50-P30-H10-R60-J5"));
        assert_eq!(v.confiance, 75);
        assert_eq!(v.amour, 50);
        assert_eq!(v.peur, 30);
        assert_eq!(v.respect, 60);
        assert_eq!(v.jalousie, 5);
    }

    #[test]
    fn test_decode_clamps_and_skips_unknown() {
        let v = EmotionVector::decode(Some("C150-X40-P-5-Hfoo-R12abc"));
        assert_eq!(v.confiance, 100);
        // "P" has no digits, the following "5" token has no axis letter
        assert_eq!(v.peur, 50);
        assert_eq!(v.haine, 10);
        assert_eq!(v.respect, 12);
        assert_eq!(v.amour, 30);
    }

    #[test]
    fn test_decode_partial_keeps_defaults() {
        let v = EmotionVector::decode(Some("A90"));
        assert_eq!(v.amour, 90);
        assert_eq!(v.confiance, 50);
        assert_eq!(v.jalousie, 10);
    }

    #[test]
    fn test_encode_order() {
        assert_eq!(EmotionVector::default().encode(), DEFAULT_EMOTION_CODE);
    }

    #[test]
    fn test_decode_encode_inverse_for_in_range_vectors() {
        for value in [0u8, 1, 42, 99, 100] {
            let v = EmotionVector {
                confiance: value,
                amour: 100 - value,
                peur: value / 2,
                haine: value,
                respect: 7,
                jalousie: 100,
            };
            assert_eq!(EmotionVector::decode(Some(&v.encode())), v);
        }
    }

    #[test]
    fn test_reencode_is_idempotent() {
        let once = EmotionVector::decode(Some("J3-Z9-C200")).encode();
        let twice = EmotionVector::decode(Some(&once)).encode();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_shift_clamps() {
        let mut v = EmotionVector::default();
        assert_eq!(v.shift(EmotionAxis::Confiance, 80), 100);
        assert_eq!(v.shift(EmotionAxis::Haine, -50), 0);
    }

    #[test]
    fn test_axis_from_str() {
        assert_eq!("Confiance".parse::<EmotionAxis>(), Ok(EmotionAxis::Confiance));
        assert_eq!("j".parse::<EmotionAxis>(), Ok(EmotionAxis::Jalousie));
        assert!("colère".parse::<EmotionAxis>().is_err());
    }

    #[test]
    fn test_emotion_code_default() {
        assert_eq!(EmotionCode::default().vector(), EmotionVector::default());
    }
}
