use serde::{Deserialize, Deserializer, Serializer};

use crate::foundation::{
    core::Rgb8,
    error::{ReelError, ReelResult},
};

/// Parse `#RRGGBB` / `#RRGGBBAA` (leading `#` optional, case-insensitive).
///
/// Returns the color and its alpha byte (255 when the input has no alpha pair).
pub fn parse_hex(s: &str) -> ReelResult<(Rgb8, u8)> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);

    fn hex_byte(pair: &str) -> ReelResult<u8> {
        u8::from_str_radix(pair, 16)
            .map_err(|_| ReelError::validation(format!("invalid hex byte \"{pair}\"")))
    }

    if !s.is_ascii() {
        return Err(ReelError::validation("hex color must be ASCII"));
    }

    match s.len() {
        6 => Ok((
            Rgb8::new(hex_byte(&s[0..2])?, hex_byte(&s[2..4])?, hex_byte(&s[4..6])?),
            255,
        )),
        8 => Ok((
            Rgb8::new(hex_byte(&s[0..2])?, hex_byte(&s[2..4])?, hex_byte(&s[4..6])?),
            hex_byte(&s[6..8])?,
        )),
        _ => Err(ReelError::validation(
            "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
        )),
    }
}

pub fn to_hex(c: Rgb8) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

/// Serde adapter for [`Rgb8`] fields written as hex strings or `[r, g, b]` arrays.
pub(crate) mod hex_rgb {
    use super::*;

    pub(crate) fn serialize<S>(c: &Rgb8, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_hex(*c))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Rgb8, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Arr([u8; 3]),
            Obj { r: u8, g: u8, b: u8 },
        }

        match Repr::deserialize(deserializer)? {
            // Alpha is ignored here; brand colors are opaque.
            Repr::Hex(s) => parse_hex(&s)
                .map(|(c, _)| c)
                .map_err(serde::de::Error::custom),
            Repr::Arr([r, g, b]) => Ok(Rgb8::new(r, g, b)),
            Repr::Obj { r, g, b } => Ok(Rgb8::new(r, g, b)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/color.rs"]
mod tests;
