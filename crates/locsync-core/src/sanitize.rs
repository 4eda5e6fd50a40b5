//! Value sanitization for Infoblox enumerations.
//!
//! Infoblox rejects list values longer than 64 characters. Longer values are
//! truncated rather than dropped, which can make two distinct names collide;
//! collisions are kept once and reported.

use log::warn;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

/// Maximum length, in characters, of an allowed value.
pub const MAX_VALUE_LEN: usize = 64;

/// Outcome of sanitizing a batch of raw values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Distinct sanitized values, sorted by string value.
    pub values: Vec<String>,
    /// Original values that had to be truncated.
    pub truncated: Vec<String>,
    /// Sanitized value -> every original that collapsed onto it (2 or more).
    pub collisions: BTreeMap<String, Vec<String>>,
}

impl SanitizeReport {
    pub fn has_collisions(&self) -> bool {
        !self.collisions.is_empty()
    }
}

/// Truncate a value to [`MAX_VALUE_LEN`] characters without logging.
pub fn truncate_value(value: &str) -> Cow<'_, str> {
    match value.char_indices().nth(MAX_VALUE_LEN) {
        Some((cut, _)) => Cow::Owned(value[..cut].to_string()),
        None => Cow::Borrowed(value),
    }
}

/// Sanitized form of a whole set, as it would be stored remotely.
pub fn sanitized_set<'a, I>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    values
        .into_iter()
        .map(|value| truncate_value(value).into_owned())
        .collect()
}

/// Truncate, deduplicate and sort raw values, logging every lossy step.
pub fn sanitize_values<I, S>(raw: I) -> SanitizeReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut mapping: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut truncated = Vec::new();
    for value in raw {
        let value = value.as_ref();
        let sanitized = truncate_value(value);
        if let Cow::Owned(_) = sanitized {
            warn!("value '{value}' exceeds {MAX_VALUE_LEN} characters and will be truncated");
            truncated.push(value.to_string());
        }
        mapping
            .entry(sanitized.into_owned())
            .or_default()
            .push(value.to_string());
    }

    let mut collisions = BTreeMap::new();
    for (sanitized, originals) in &mapping {
        if originals.len() > 1 {
            warn!(
                "duplicate sanitized value '{sanitized}' from original values: {originals:?}"
            );
            collisions.insert(sanitized.clone(), originals.clone());
        }
    }

    SanitizeReport {
        values: mapping.into_keys().collect(),
        truncated,
        collisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_values_up_to_the_limit() {
        let exact = "a".repeat(MAX_VALUE_LEN);
        assert_eq!(truncate_value(&exact), exact.as_str());
        assert!(matches!(truncate_value("US/NYC/HQ"), Cow::Borrowed("US/NYC/HQ")));
    }

    #[test]
    fn truncates_to_exactly_the_limit() {
        let long = format!("CZ/Praha/{}", "x".repeat(61));
        assert_eq!(long.chars().count(), 70);
        let cut = truncate_value(&long);
        assert_eq!(cut.chars().count(), MAX_VALUE_LEN);
        assert_eq!(cut, &long[..MAX_VALUE_LEN]);
    }

    /// Limits count characters, not bytes.
    #[test]
    fn truncation_respects_char_boundaries() {
        let long = "Č".repeat(70);
        let cut = truncate_value(&long);
        assert_eq!(cut.chars().count(), MAX_VALUE_LEN);
        assert_eq!(cut, "Č".repeat(MAX_VALUE_LEN));
    }

    #[test]
    fn sorts_and_reports_collisions() {
        let prefix = "p".repeat(MAX_VALUE_LEN);
        let first = format!("{prefix}-one");
        let second = format!("{prefix}-two");
        let report = sanitize_values([
            "US/NYC/HQ".to_string(),
            first.clone(),
            "US/LA/West".to_string(),
            second.clone(),
        ]);

        assert_eq!(
            report.values,
            vec!["US/LA/West".to_string(), "US/NYC/HQ".to_string(), prefix.clone()]
        );
        assert_eq!(report.truncated, vec![first.clone(), second.clone()]);
        assert!(report.has_collisions());
        assert_eq!(report.collisions.get(&prefix), Some(&vec![first, second]));
    }

    #[test]
    fn clean_input_has_no_findings() {
        let report = sanitize_values(["b", "a"]);
        assert_eq!(report.values, vec!["a".to_string(), "b".to_string()]);
        assert!(report.truncated.is_empty());
        assert!(!report.has_collisions());
    }
}
