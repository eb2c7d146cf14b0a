//! Model identifier normalization
//!
//! Folds the model identifiers observed in session logs to a canonical form
//! used as the pricing and grouping key.

/// Normalize a model identifier to canonical form.
///
/// Transformations:
/// - Trim surrounding whitespace, fold to lowercase
/// - Dots to hyphens: "claude-opus-4.1" → "claude-opus-4-1"
/// - Remove trailing date stamp: "claude-sonnet-4-20250514" → "claude-sonnet-4"
///
/// Identifiers that match none of these are returned as-is, so unrecognized
/// models survive verbatim instead of being rejected.
pub fn normalize_model_name(model: &str) -> String {
    let normalized = model.trim().to_ascii_lowercase().replace('.', "-");

    // Strip an -YYYYMMDD release suffix (8 digits, starting with 20)
    if let Some(suffix_start) = normalized.rfind('-') {
        let suffix = &normalized[suffix_start + 1..];
        if suffix.len() == 8
            && suffix.starts_with("20")
            && suffix.chars().all(|c| c.is_ascii_digit())
        {
            return normalized[..suffix_start].to_string();
        }
    }

    normalized
}
