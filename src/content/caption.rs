/// Caption copy for a generated post.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CaptionData {
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub cta: String,
}

impl CaptionData {
    /// Caption, call to action and hashtags separated by blank lines. Empty parts are
    /// left out.
    pub fn format(&self) -> String {
        let tags = self.hashtags.join(" ");
        let mut lines: Vec<&str> = Vec::new();
        if !self.caption.is_empty() {
            lines.extend([self.caption.as_str(), ""]);
        }
        if !self.cta.is_empty() {
            lines.extend([self.cta.as_str(), ""]);
        }
        if !tags.is_empty() {
            lines.push(&tags);
        }
        lines.join("\n")
    }
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/caption.rs"]
mod tests;
