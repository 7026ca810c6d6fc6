//! Game name to directory name conversion.

/// Used when nothing of the name survives sanitizing.
pub const PLACEHOLDER: &str = "_";

/// Turns a human readable game name into a filesystem-safe slug.
///
/// Lowercases, maps whitespace and `~` to `-`, expands `&` to `-and-`, drops
/// everything else that is not alphanumeric and collapses runs of `-`.
/// Hyphens already in the name are kept, so slugs sanitize to themselves.
pub fn sanitize(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());

    for c in name.to_lowercase().chars() {
        match c {
            '&' => push_str_collapsed(&mut slug, "-and-"),
            '~' | '-' => push_collapsed(&mut slug, '-'),
            c if c.is_whitespace() => push_collapsed(&mut slug, '-'),
            c if c.is_alphanumeric() => slug.push(c),
            _ => {}
        }
    }

    if slug.is_empty() {
        return PLACEHOLDER.to_string();
    }
    slug
}

fn push_collapsed(slug: &mut String, c: char) {
    if c == '-' && slug.ends_with('-') {
        return;
    }
    slug.push(c);
}

fn push_str_collapsed(slug: &mut String, s: &str) {
    for c in s.chars() {
        push_collapsed(slug, c);
    }
}
