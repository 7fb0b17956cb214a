use std::{collections::BTreeMap, path::Path};

use anyhow::Context as _;
use rand::{Rng, seq::SliceRandom};

use crate::foundation::error::ReelResult;

/// Returned when a book has no usable quotes at all.
pub const FALLBACK_QUOTE: &str = "Kombucha: Nature's probiotic powerhouse.";

/// Quotes shorter than this are treated as noise.
const MIN_QUOTE_CHARS: usize = 10;

/// Categorised quote collection parsed from a markdown-ish text file.
///
/// `## Name` starts a category; other `#` lines and `---` rules are ignored. Lines
/// before the first category are dropped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuoteBook {
    categories: BTreeMap<String, Vec<String>>,
    // insertion order of categories as they appear in the file
    order: Vec<String>,
}

impl QuoteBook {
    pub fn parse(text: &str) -> Self {
        let mut book = Self::default();
        let mut current: Option<String> = None;

        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if line.starts_with("##") && !line.starts_with("###") {
                let name = line.trim_start_matches('#').trim().to_owned();
                if !book.categories.contains_key(&name) {
                    book.order.push(name.clone());
                    book.categories.insert(name.clone(), Vec::new());
                }
                current = Some(name);
            } else if line.starts_with('#') || line.starts_with("---") {
                continue;
            } else if let Some(cat) = &current {
                let quote = line.trim_matches('"').trim_matches('\'');
                if quote.chars().count() <= MIN_QUOTE_CHARS {
                    continue;
                }
                if let Some(list) = book.categories.get_mut(cat) {
                    list.push(quote.to_owned());
                }
            }
        }
        tracing::debug!(
            categories = book.order.len(),
            quotes = book.len(),
            "parsed quote book"
        );
        book
    }

    /// A missing file is an empty book.
    pub fn load(path: &Path) -> ReelResult<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "quotes file not found");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read quotes '{}'", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn categories(&self) -> &[String] {
        &self.order
    }

    pub fn by_category(&self, category: &str) -> &[String] {
        self.categories.get(category).map_or(&[], Vec::as_slice)
    }

    /// Every quote in file order.
    pub fn all(&self) -> Vec<&str> {
        self.order
            .iter()
            .flat_map(|c| self.by_category(c))
            .map(String::as_str)
            .collect()
    }

    /// Case-insensitive substring search.
    pub fn search(&self, keyword: &str) -> Vec<&str> {
        let needle = keyword.to_lowercase();
        self.all()
            .into_iter()
            .filter(|q| q.to_lowercase().contains(&needle))
            .collect()
    }

    /// Uniform pick from `category`, or from every quote when the category is unknown.
    pub fn random<R: Rng + ?Sized>(&self, category: Option<&str>, rng: &mut R) -> &str {
        let pool: Vec<&str> = match category {
            Some(c) if self.categories.contains_key(c) => {
                self.by_category(c).iter().map(String::as_str).collect()
            }
            _ => self.all(),
        };
        pool.choose(rng).copied().unwrap_or(FALLBACK_QUOTE)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/quotes.rs"]
mod tests;
