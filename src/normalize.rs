use regex::Regex;

/// Rewrite an arbitrary column header into a canonical identifier: trimmed,
/// lowercased, everything but letters, digits and whitespace removed, and
/// whitespace runs collapsed into single underscores.
///
/// Total over all inputs and deterministic; the result contains only
/// lowercase ASCII letters, digits and interior underscores.
pub fn column_ident(name: &str) -> String {
    let specials = Regex::new(r"[^a-z0-9\s]").unwrap();
    let whitespace = Regex::new(r"\s+").unwrap();

    let lowered = name.trim().to_lowercase();
    let kept = specials.replace_all(&lowered, "");
    let joined = whitespace.replace_all(kept.trim(), "_");
    joined.trim_matches('_').to_string()
}
