const KEYWORDS: &[&str] = &[
    "kombucha",
    "benefit",
    "health",
    "probiotic",
    "antioxidant",
    "research",
    "study",
    "scientific",
    "improve",
    "reduce",
    "digest",
    "immune",
    "gut",
    "bacteria",
];

const MIN_SENTENCE_CHARS: usize = 20;

fn score(sentence: &str) -> usize {
    let lower = sentence.to_lowercase();
    KEYWORDS.iter().filter(|k| lower.contains(*k)).count()
}

/// Pick up to `max` sentences worth turning into overlay or caption copy.
///
/// Sentences mentioning health keywords come first, most keywords first, ties in
/// document order. Remaining slots are filled with the other sentences in order.
pub fn extract_key_points(text: &str, max: usize) -> Vec<String> {
    let sentences: Vec<&str> = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect();

    let mut scored: Vec<(usize, usize)> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| (score(s), i))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut picked: Vec<usize> = scored.into_iter().take(max).map(|(_, i)| i).collect();
    if picked.len() < max {
        let rest: Vec<usize> = (0..sentences.len())
            .filter(|i| !picked.contains(i))
            .take(max - picked.len())
            .collect();
        picked.extend(rest);
    }
    picked.into_iter().map(|i| sentences[i].to_owned()).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/content/key_points.rs"]
mod tests;
