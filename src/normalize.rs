//! Crop identity: canonical keys and letter-order signatures.

/// Case-folded, trimmed form of a crop name. Blank names have no key.
pub fn canonical_key(display_name: &str) -> Option<String> {
    let trimmed = display_name.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Characters of a canonical key sorted by code point. Keys that share a
/// signature are treated as the same crop (`jowar` / `jawor`).
pub fn equivalence_signature(key: &str) -> String {
    let mut chars: Vec<char> = key.chars().collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}
