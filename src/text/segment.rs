//! Clause-level chunking used before pixel packing.

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | ',')
}

/// Split a paragraph into clauses at sentence terminators and commas.
///
/// The terminator stays with the chunk it ends. A terminator only ends a chunk when
/// followed by whitespace or the end of input, so `3.5`, `e.g.x` and `?!` runs stay
/// intact. Chunks are trimmed and never empty.
pub fn chunks(paragraph: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut iter = paragraph.char_indices().peekable();

    while let Some((i, c)) = iter.next() {
        if !is_terminator(c) {
            continue;
        }
        let at_boundary = match iter.peek() {
            None => true,
            Some((_, next)) => next.is_whitespace(),
        };
        if at_boundary {
            let end = i + c.len_utf8();
            push_trimmed(&mut out, &paragraph[start..end]);
            start = end;
        }
    }
    push_trimmed(&mut out, &paragraph[start..]);
    out
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, s: &'a str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s);
    }
}

/// Hard paragraphs; `\r\n` is treated like `\n`.
pub fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|p| p.trim_end_matches('\r'))
}

#[cfg(test)]
#[path = "../../tests/unit/text/segment.rs"]
mod tests;
