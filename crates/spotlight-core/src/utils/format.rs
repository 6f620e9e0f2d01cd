use std::cmp::Ordering;

/// Truncate a string to at most `max_len` characters, adding an ellipsis if needed.
/// Trailing whitespace left by the cut is dropped before the ellipsis.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len).collect();
        format!("{}...", truncated.trim_end())
    }
}

/// Case-insensitive substring test. `query` should already be lowercased.
pub fn contains_ignore_case(haystack: &str, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(query)
}

/// Case-insensitive ordering without allocating lowercase copies.
pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    let lhs = a.chars().flat_map(char::to_lowercase);
    let rhs = b.chars().flat_map(char::to_lowercase);
    lhs.cmp(rhs)
}

/// Capitalize the first letter of every space-separated word and lowercase the rest.
/// "jane DOE" becomes "Jane Doe". Runs of spaces are preserved.
pub fn title_case(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Build a URL-safe slug: lowercase, whitespace runs become a single dash,
/// and anything outside `[a-z0-9-]` is dropped.
pub fn slugify(s: &str) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut in_whitespace = false;
    for c in s.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
            slug.push(c);
        }
    }
    slug
}

/// Human label for a category tag: "mixed-media" becomes "Mixed Media".
pub fn category_label(category: &str) -> String {
    category
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Five-star display for a rating, e.g. 3.8 renders as "★★★☆☆".
pub fn star_rating(rating: f64) -> String {
    let filled = rating.floor().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
