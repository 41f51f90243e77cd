//! Street name text rules.

use streets_model::AcronymRule;

/// Apply each rule in order, replacing every literal occurrence.
///
/// Matching is plain substring replacement, so rules see the output of the
/// rules before them.
pub fn expand_acronyms(text: &str, rules: &[AcronymRule]) -> String {
    rules.iter().fold(text.to_string(), |acc, rule| {
        if rule.pattern.is_empty() || !acc.contains(&rule.pattern) {
            acc
        } else {
            acc.replace(&rule.pattern, &rule.replacement)
        }
    })
}

/// Prefix `name` with `street_type` unless it already starts with it.
///
/// Returns `None` when the name is unchanged: empty names, names that
/// already carry the prefix, and an empty type (every name starts with it).
/// The prefix check is exact, so case and accents must match.
pub fn merge_type_prefix(name: &str, street_type: &str) -> Option<String> {
    if name.is_empty() || name.starts_with(street_type) {
        return None;
    }
    Some(format!("{street_type} {name}"))
}
