/// Extract `@username` mentions from a post body.
///
/// A mention starts with `@` at the beginning of the text or after
/// whitespace, and runs over letters, digits and underscores. Duplicates are
/// dropped, first occurrence order is kept.
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let at_boundary = prev.is_none_or(char::is_whitespace);
        prev = Some(c);
        if c != '@' || !at_boundary {
            continue;
        }
        let start = i + c.len_utf8();
        let mut end = start;
        while let Some(&(j, n)) = chars.peek() {
            if n.is_ascii_alphanumeric() || n == '_' {
                end = j + n.len_utf8();
                prev = Some(n);
                chars.next();
            } else {
                break;
            }
        }
        let name = &text[start..end];
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Mentions in `current` that `previous` did not already contain.
pub fn added_mentions(previous: Option<&str>, current: &str) -> Vec<String> {
    let known = previous.map(extract_mentions).unwrap_or_default();
    extract_mentions(current)
        .into_iter()
        .filter(|name| !known.contains(name))
        .collect()
}
