use crate::foundation::core::Rgb8;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    pub fn is_bold(self) -> bool {
        matches!(self, Self::Bold)
    }
}

/// Outline drawn around each glyph before the fill.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Stroke {
    pub color: Rgb8,
    pub width_px: f32,
}

/// Requested face, size and paint for a run of text.
///
/// `family` is a request, not a guarantee: metrics providers substitute their
/// default family when it cannot be resolved.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size_px: f32,
    #[serde(default)]
    pub weight: FontWeight,
    pub color: Rgb8,
    #[serde(default)]
    pub stroke: Option<Stroke>,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size_px: f32) -> Self {
        Self {
            family: family.into(),
            size_px,
            weight: FontWeight::Normal,
            color: Rgb8::BLACK,
            stroke: None,
        }
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_color(mut self, color: Rgb8) -> Self {
        self.color = color;
        self
    }

    pub fn with_stroke(mut self, stroke: Stroke) -> Self {
        self.stroke = Some(stroke);
        self
    }

    pub fn with_size(mut self, size_px: f32) -> Self {
        self.size_px = size_px;
        self
    }
}
