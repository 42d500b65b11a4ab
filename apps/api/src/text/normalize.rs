//! Comparison-only text canonicalization. Never used to rewrite stored content.

/// Canonical form of a single character, before whitespace collapsing.
fn canonical_char(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
        '\u{2013}' | '\u{2014}' => '-',
        '\u{00A0}' => ' ',
        other => other,
    }
}

/// Unifies curly quotes and en/em dashes, turns non-breaking spaces into spaces,
/// collapses whitespace runs to one space, and trims both ends. Idempotent.
pub fn normalize(text: &str) -> String {
    normalize_with_map(text).0
}

/// Like [`normalize`], also returning for each normalized character the character
/// offset in `text` it came from. A collapsed whitespace run maps to its first char.
pub fn normalize_with_map(text: &str) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(text.len());
    let mut map = Vec::with_capacity(text.len());
    let mut pending_space: Option<usize> = None;

    for (idx, c) in text.chars().enumerate() {
        let c = canonical_char(c);
        if c.is_whitespace() {
            if !out.is_empty() && pending_space.is_none() {
                pending_space = Some(idx);
            }
            continue;
        }
        if let Some(space_idx) = pending_space.take() {
            out.push(' ');
            map.push(space_idx);
        }
        out.push(c);
        map.push(idx);
    }

    (out, map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unifies_quotes_and_dashes() {
        assert_eq!(
            normalize("\u{201C}Led\u{201D} the team\u{2019}s 2019\u{2013}2021 work \u{2014} done"),
            "\"Led\" the team's 2019-2021 work - done"
        );
    }

    #[test]
    fn test_collapses_and_trims_whitespace() {
        assert_eq!(normalize("  Built \t scalable\u{00A0}\u{00A0}APIs.\n"), "Built scalable APIs.");
    }

    #[test]
    fn test_is_idempotent() {
        let samples = [
            "  a\u{2014}b  c ",
            "\u{2018}quoted\u{2019}\n\nnext",
            "",
            "\u{00A0}",
            "plain",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_map_points_into_original() {
        let original = "  a  b\u{2019}";
        let (normalized, map) = normalize_with_map(original);
        assert_eq!(normalized, "a b'");
        assert_eq!(map, vec![2, 3, 5, 6]);
    }
}
