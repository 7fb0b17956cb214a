use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Point, Rect};

/// Straight (non-premultiplied) RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn with_alpha(self, a: u8) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, a)
    }

    pub fn opaque(self) -> Rgba8Premul {
        self.with_alpha(255)
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Fixed-size pixel surface description. Origin is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub background: Rgb8,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Rgb8) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::validation("canvas width/height must be > 0"));
        }
        Ok(Self {
            width,
            height,
            background,
        })
    }

    pub fn width_f(self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f(self) -> f64 {
        f64::from(self.height)
    }

    pub fn bounds(self) -> Rect {
        Rect::new(0.0, 0.0, self.width_f(), self.height_f())
    }
}

/// Vertical reference point used to position a text block on a canvas.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Top,
    Center,
    #[default]
    Bottom,
}

impl std::str::FromStr for Anchor {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "center" | "centre" | "middle" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            other => Err(ReelError::validation(format!(
                "unknown anchor '{other}' (expected top, center or bottom)"
            ))),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
