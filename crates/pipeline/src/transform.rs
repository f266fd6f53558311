//! Offset and scale applied to every source value.

use nc2clm_calendar::FOLD_BANDS;

/// Linear transform `(raw + offset) * scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    offset: f32,
    scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl Transform {
    /// Creates a transform with an additive offset and a multiplicative
    /// scale.
    pub fn new(offset: f32, scale: f32) -> Self {
        Self { offset, scale }
    }

    /// Returns the additive offset.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Returns the multiplicative scale.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Transformed value of one source day.
    pub fn apply(&self, raw: f32) -> f32 {
        (raw + self.offset) * self.scale
    }

    /// Amount a folded leap day adds to each of the 28 February bands.
    ///
    /// Only the raw value is divided; the offset is applied in full to each
    /// share.
    pub fn fold_share(&self, raw: f32) -> f32 {
        (raw / FOLD_BANDS.len() as f32 + self.offset) * self.scale
    }
}
