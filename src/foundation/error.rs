/// Convenience result type used across reelsmith.
pub type ReelResult<T> = Result<T, ReelError>;

/// Hard failures. Structurally impossible requests end up here; degraded-but-usable
/// outcomes are reported as [`Notice`] values instead.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// No segments, assets or pool entries were supplied.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// An overlay cannot fit inside the timeline even at its minimum duration.
    #[error(
        "overlay too long: minimum duration {floor_sec:.2}s exceeds timeline length {timeline_sec:.2}s"
    )]
    OverlayTooLong {
        /// Minimum overlay duration in seconds.
        floor_sec: f64,
        /// Composed timeline length in seconds.
        timeline_sec: f64,
    },

    /// Duration bounds that no composition can satisfy.
    #[error("invalid duration bounds: {0}")]
    InvalidBounds(String),

    /// Invalid user-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The font-metrics provider could not measure text.
    #[error("measurement error: {0}")]
    Measurement(String),

    /// Probing, decoding or encoding media failed.
    #[error("media error: {0}")]
    Media(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn empty_input(msg: impl Into<String>) -> Self {
        Self::EmptyInput(msg.into())
    }

    pub fn invalid_bounds(msg: impl Into<String>) -> Self {
        Self::InvalidBounds(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn measurement(msg: impl Into<String>) -> Self {
        Self::Measurement(msg.into())
    }

    pub fn media(msg: impl Into<String>) -> Self {
        Self::Media(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Usage errors are never worth retrying with the same input.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput(_)
                | Self::OverlayTooLong { .. }
                | Self::InvalidBounds(_)
                | Self::Validation(_)
        )
    }
}

/// Informational signals raised while composing. None of these abort the call.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Every candidate in a pool had been used; selection fell back to the full pool.
    PoolExhausted { pool_size: usize },
    /// The requested font family is unknown; a fallback family was used.
    UnresolvedFont {
        requested: String,
        substituted: String,
    },
    /// Metrics were unavailable; widths were estimated from a fixed advance.
    MeasurementFailure { reason: String },
    /// A line could not be shortened and was cut with an ellipsis.
    Truncated { original: String },
}

impl Notice {
    pub(crate) fn log(&self) {
        match self {
            Self::PoolExhausted { pool_size } => {
                tracing::info!(pool_size, "asset pool exhausted, reusing from full pool");
            }
            Self::UnresolvedFont {
                requested,
                substituted,
            } => {
                tracing::warn!(%requested, %substituted, "font family not found, using fallback");
            }
            Self::MeasurementFailure { reason } => {
                tracing::warn!(%reason, "text metrics unavailable, using fixed-advance estimate");
            }
            Self::Truncated { original } => {
                tracing::warn!(%original, "line truncated with ellipsis");
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
