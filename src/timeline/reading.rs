use crate::timeline::model::ReadingSpeed;

impl ReadingSpeed {
    /// On-screen time for `text` wrapped into `lines` lines.
    ///
    /// `max(words / wps, chars / cps) + extra_line_sec * (lines - 1)`, clamped to
    /// `[floor_sec, ceiling_sec]`.
    pub fn duration_for(&self, text: &str, lines: usize) -> f64 {
        let words = text.split_whitespace().count() as f64;
        let chars = text.chars().count() as f64;
        let base = (words / self.words_per_sec).max(chars / self.chars_per_sec);
        let extra = self.extra_line_sec * lines.saturating_sub(1) as f64;
        (base + extra).clamp(self.floor_sec, self.ceiling_sec.max(self.floor_sec))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/reading.rs"]
mod tests;
