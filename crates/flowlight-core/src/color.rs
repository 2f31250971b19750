//! Bulb colour codes.
//!
//! Notifications and the direct code route carry a single-letter code that
//! selects one of four colours. Anything that is not one of those letters
//! turns the bulb off.
//!
//! | code | colour |
//! |------|--------|
//! | `A`  | green  |
//! | `V`  | red    |
//! | `B`  | blue   |
//! | `R`  | white  |
//! | other | black (off) |

use std::fmt;

use serde::{Deserialize, Serialize};

/// A colour the bulb can be asked to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulbColor {
    /// Code `A`.
    Green,
    /// Code `V`.
    Red,
    /// Code `B`.
    Blue,
    /// Code `R`.
    White,
    /// Any unknown code; the bulb is switched off.
    Black,
}

impl BulbColor {
    /// The colours reachable from a known code, in test-sequence order.
    pub const SEQUENCE: [Self; 4] = [Self::Green, Self::Red, Self::Blue, Self::White];

    /// Resolve a colour from a code.
    ///
    /// Surrounding whitespace is ignored and the letter is case-insensitive.
    /// Empty strings, multi-character strings and unknown letters all map to
    /// [`BulbColor::Black`].
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "A" => Self::Green,
            "V" => Self::Red,
            "B" => Self::Blue,
            "R" => Self::White,
            _ => Self::Black,
        }
    }

    /// Lowercase colour name as reported by the API.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// Whether showing this colour blinks before holding.
    ///
    /// Only the four coded colours blink; black goes straight to off.
    #[must_use]
    pub const fn blinks(self) -> bool {
        !matches!(self, Self::Black)
    }

    /// Whether this colour means "switch the bulb off".
    #[must_use]
    pub const fn is_off(self) -> bool {
        matches!(self, Self::Black)
    }
}

impl fmt::Display for BulbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A normalised colour code together with the colour it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorCommand {
    /// The code, trimmed and upper-cased.
    pub code: String,
    /// The resolved colour.
    pub color: BulbColor,
}

impl ColorCommand {
    /// Normalise a raw code and resolve its colour.
    #[must_use]
    pub fn from_code(raw: &str) -> Self {
        Self {
            code: raw.trim().to_ascii_uppercase(),
            color: BulbColor::from_code(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_any_case() {
        for (lower, upper, color) in [
            ("a", "A", BulbColor::Green),
            ("v", "V", BulbColor::Red),
            ("b", "B", BulbColor::Blue),
            ("r", "R", BulbColor::White),
        ] {
            assert_eq!(BulbColor::from_code(lower), color);
            assert_eq!(BulbColor::from_code(upper), color);
        }
    }

    #[test]
    fn unknown_codes_are_black() {
        for code in ["", " ", "x", "Z", "AB", "green", "1"] {
            assert_eq!(BulbColor::from_code(code), BulbColor::Black, "code {code:?}");
        }
    }

    #[test]
    fn whitespace_is_ignored() {
        assert_eq!(BulbColor::from_code("  b\n"), BulbColor::Blue);
    }

    #[test]
    fn names() {
        assert_eq!(BulbColor::Green.name(), "green");
        assert_eq!(BulbColor::Red.to_string(), "red");
        assert_eq!(BulbColor::Black.name(), "black");
    }

    #[test]
    fn only_coded_colours_blink() {
        assert!(BulbColor::SEQUENCE.iter().all(|c| c.blinks()));
        assert!(!BulbColor::Black.blinks());
        assert!(BulbColor::Black.is_off());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&BulbColor::White).unwrap();
        assert_eq!(json, "\"white\"");
    }

    #[test]
    fn command_normalises_code() {
        let cmd = ColorCommand::from_code(" a ");
        assert_eq!(cmd.code, "A");
        assert_eq!(cmd.color, BulbColor::Green);

        let cmd = ColorCommand::from_code("q");
        assert_eq!(cmd.code, "Q");
        assert_eq!(cmd.color, BulbColor::Black);
    }
}
