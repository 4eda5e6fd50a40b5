//! Ordering helpers for `Country/City/Campus` location names.

use std::cmp::Ordering;

/// Compare two location names component by component.
///
/// `US/NYC/HQ` splits into `["US", "NYC", "HQ"]`; names are ordered by
/// country, then city, then campus, with shorter paths first on a tie.
pub fn compare_locations(left: &str, right: &str) -> Ordering {
    left.split('/').cmp(right.split('/'))
}

/// Return the names sorted in country/city/campus order.
pub fn sort_locations<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
    names.sort_by(|left, right| compare_locations(left, right));
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sorts_by_components() {
        let sorted = sort_locations(["US/NYC/HQ", "US/LA/West", "CZ/Prague/Campus A", "US"]);
        assert_eq!(
            sorted,
            vec!["CZ/Prague/Campus A", "US", "US/LA/West", "US/NYC/HQ"]
        );
    }

    /// Component order differs from plain string order when a separator
    /// competes with a character that sorts before `/`.
    #[test]
    fn component_order_differs_from_string_order() {
        assert_eq!(compare_locations("US/A-B/X", "US/A/X"), Ordering::Greater);
        assert!("US/A-B/X" < "US/A/X");
    }
}
