//! Reusable value splitting and type coercion primitives.
//!
//! These functions turn raw multi-line INI option values into typed,
//! structured data without losing inline or standalone comments:
//!
//! - [`split_comment`] / [`split_scalar`]: separate a single-line value from
//!   its trailing comment
//! - [`split_list`]: a (potentially dangling) list of values
//! - [`split_kv_pairs`]: a (potentially dangling) list of key-value pairs
//! - [`coerce_scalar`] / [`coerce_bool`]: heuristic string → scalar coercion
//!
//! A *dangling* value is spread across multiple physical lines with no
//! separator required on the first line; each line keeps its own comment.
//!
//! ## Examples
//!
//! ```rust
//! use ini2toml::transform::{split_list, identity, COMMENT_PREFIXES};
//!
//! let list = split_list("1, 2, 3 # nums", ',', identity, true, false, COMMENT_PREFIXES).unwrap();
//! assert_eq!(list.len(), 1);
//! assert_eq!(list.iter().next().unwrap().comment(), Some("nums"));
//! ```

use crate::repr::{Commented, CommentedKV, CommentedList, Scalar};
use crate::{Error, Result};

/// Default comment prefix characters for INI-style documents.
pub const COMMENT_PREFIXES: &[char] = &['#', ';'];

/// Identity coercion: keep the value as a string scalar.
pub fn identity(value: &str) -> Result<Scalar> {
    Ok(Scalar::Str(value.to_string()))
}

/// Returns `true` for the recognised "true" literals.
#[must_use]
pub fn is_true(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Returns `true` for the recognised "false" literals.
#[must_use]
pub fn is_false(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "false" | "0" | "no" | "off" | "none" | "null" | "nil"
    )
}

/// Returns `true` when `value` looks like a float literal: digits with at
/// most one `.` (optional sign, `_` separators allowed), or `inf`/`nan`.
#[must_use]
pub fn is_float(value: &str) -> bool {
    let lower = value.to_lowercase();
    let unsigned = lower.trim_start_matches(['+', '-']);
    let cleaned: String = unsigned.chars().filter(|c| *c != '.' && *c != '_').collect();
    let digits = !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit());
    (digits && value.matches('.').count() <= 1) || cleaned == "inf" || cleaned == "nan"
}

/// Coerces a boolean literal; fails with [`Error::CoercionFailure`] for
/// anything else.
///
/// # Examples
///
/// ```rust
/// use ini2toml::transform::coerce_bool;
/// use ini2toml::repr::Scalar;
///
/// assert_eq!(coerce_bool("Yes").unwrap(), Scalar::Bool(true));
/// assert!(coerce_bool("3").is_err());
/// ```
pub fn coerce_bool(value: &str) -> Result<Scalar> {
    if is_true(value) {
        Ok(Scalar::Bool(true))
    } else if is_false(value) {
        Ok(Scalar::Bool(false))
    } else {
        Err(Error::coercion(value, "boolean"))
    }
}

/// Tries to convert the given string to a scalar with a direct TOML
/// equivalent, in order: integer, float, boolean, else the input string.
///
/// The ordering is significant: an ambiguous literal like `"1"` resolves to
/// an integer, not a boolean. The guess is based on heuristics, so there is
/// no guarantee the output type matches the original author's intent.
///
/// # Examples
///
/// ```rust
/// use ini2toml::transform::coerce_scalar;
/// use ini2toml::repr::Scalar;
///
/// assert_eq!(coerce_scalar("3"), Scalar::Int(3));
/// assert_eq!(coerce_scalar("3.0"), Scalar::Float(3.0));
/// assert_eq!(coerce_scalar("yes"), Scalar::Bool(true));
/// assert_eq!(coerce_scalar("yesno"), Scalar::Str("yesno".into()));
/// ```
#[must_use]
pub fn coerce_scalar(value: &str) -> Scalar {
    let value = value.trim();
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(int) = value.parse::<i64>() {
            return Scalar::Int(int);
        }
    }
    if is_float(value) {
        let cleaned: String = value.chars().filter(|c| *c != '_').collect();
        if let Ok(float) = cleaned.parse::<f64>() {
            return Scalar::Float(float);
        }
    }
    if is_true(value) {
        return Scalar::Bool(true);
    }
    if is_false(value) {
        return Scalar::Bool(false);
    }
    Scalar::Str(value.to_string())
}

/// Lowercases and replaces `_` with `-` (the conventional TOML field style).
#[must_use]
pub fn kebab_case(field: &str) -> String {
    field.to_lowercase().replace('_', "-")
}

/// Strips the first matching prefix character (and surrounding whitespace)
/// from `text`.
#[must_use]
pub fn remove_prefixes<'a>(text: &'a str, prefixes: &[char]) -> &'a str {
    let text = text.trim();
    for prefix in prefixes {
        if let Some(rest) = text.strip_prefix(*prefix) {
            return rest.trim();
        }
    }
    text
}

fn strip_comment(text: &str, prefixes: &[char]) -> Option<String> {
    let stripped = remove_prefixes(text, prefixes);
    if text.trim().is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

/// Splits a raw value into `(value, comment)` at the earliest occurrence of
/// a comment prefix, coercing the value part with `coerce`.
///
/// A line consisting entirely of a comment yields the comment-only state.
/// Multi-line values are never split for inline comments (only per line, see
/// [`split_list`]) because the ambiguity between prefix characters and
/// content cannot be resolved heuristically across lines.
pub fn split_comment_with<T, F>(value: &str, coerce: F, prefixes: &[char]) -> Result<Commented<T>>
where
    F: Fn(&str) -> Result<T>,
{
    let value = value.trim();
    let occurrence = value.find(|c: char| prefixes.contains(&c));

    let (index, multiline) = match occurrence {
        Some(index) => (index, value.lines().count() > 1),
        None => return Ok(Commented::from_value(coerce(value)?)),
    };
    if multiline {
        return Ok(Commented::from_value(coerce(value)?));
    }
    if index == 0 {
        return Ok(Commented::new(None, strip_comment(value, prefixes)));
    }

    let (text, comment) = value.split_at(index);
    Ok(Commented::new(
        Some(coerce(text.trim())?),
        strip_comment(comment, prefixes),
    ))
}

/// [`split_comment_with`] keeping the value as a plain string scalar.
pub fn split_comment(value: &str, prefixes: &[char]) -> Result<Commented<Scalar>> {
    split_comment_with(value, identity, prefixes)
}

/// [`split_comment_with`] applying [`coerce_scalar`] to the value part.
pub fn split_scalar(value: &str, prefixes: &[char]) -> Result<Commented<Scalar>> {
    split_comment_with(value, |text| Ok(coerce_scalar(text)), prefixes)
}

/// Splits a value encoded as a (potentially dangling) list separated by
/// `sep`.
///
/// The value is first split into physical lines. When `subsplit_dangling`
/// is set (or the value fits a single line and `force_multiline` is not
/// requested), each line is further split on `sep`. Every element runs
/// through `coerce`; every line keeps its own trailing comment.
pub fn split_list<F>(
    value: &str,
    sep: char,
    coerce: F,
    subsplit_dangling: bool,
    force_multiline: bool,
    prefixes: &[char],
) -> Result<CommentedList<Scalar>>
where
    F: Fn(&str) -> Result<Scalar>,
{
    // A prefix equal to the separator could never be told apart from data.
    let prefixes: Vec<char> = prefixes.iter().copied().filter(|p| *p != sep).collect();

    let lines: Vec<&str> = value.trim().lines().collect();
    let split_each_line = subsplit_dangling || !(lines.len() > 1 || force_multiline);

    lines
        .iter()
        .map(|line| {
            split_comment_with(
                line,
                |text| split_elements(text, sep, split_each_line, &coerce),
                &prefixes,
            )
        })
        .collect::<Result<Vec<_>>>()
        .map(CommentedList::from)
}

fn split_elements<F>(text: &str, sep: char, subsplit: bool, coerce: &F) -> Result<Vec<Scalar>>
where
    F: Fn(&str) -> Result<Scalar>,
{
    if subsplit {
        text.split(sep)
            .map(str::trim)
            .filter(|element| !element.is_empty())
            .map(coerce)
            .collect()
    } else if text.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(vec![coerce(text)?])
    }
}

/// Splits a value encoded as a (potentially dangling) list of key-value
/// pairs.
///
/// Line splitting follows [`split_list`]; each element is then split once on
/// `key_sep` into a `(key, value)` pair, and `coerce` converts the value.
/// Elements lacking the key separator are dropped.
pub fn split_kv_pairs<F>(
    value: &str,
    key_sep: char,
    coerce: F,
    pair_sep: char,
    subsplit_dangling: bool,
    prefixes: &[char],
) -> Result<CommentedKV<Scalar>>
where
    F: Fn(&str) -> Result<Scalar>,
{
    let prefixes: Vec<char> = prefixes
        .iter()
        .copied()
        .filter(|p| *p != key_sep && *p != pair_sep)
        .collect();

    let lines: Vec<&str> = value.trim().lines().collect();
    let split_each_line = subsplit_dangling || lines.len() <= 1;

    lines
        .iter()
        .map(|line| {
            split_comment_with(
                line,
                |text| split_pairs(text, key_sep, pair_sep, split_each_line, &coerce),
                &prefixes,
            )
        })
        .collect::<Result<Vec<_>>>()
        .map(CommentedKV::from)
}

fn split_pairs<F>(
    text: &str,
    key_sep: char,
    pair_sep: char,
    subsplit: bool,
    coerce: &F,
) -> Result<Vec<(String, Scalar)>>
where
    F: Fn(&str) -> Result<Scalar>,
{
    let items: Vec<&str> = if subsplit {
        text.split(pair_sep).collect()
    } else {
        vec![text]
    };
    items
        .into_iter()
        .filter_map(|item| item.split_once(key_sep))
        .map(|(key, value)| Ok((key.trim().to_string(), coerce(value.trim())?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_scalar_ordering() {
        assert_eq!(coerce_scalar("3"), Scalar::Int(3));
        assert_eq!(coerce_scalar("3.0"), Scalar::Float(3.0));
        assert_eq!(coerce_scalar("yes"), Scalar::Bool(true));
        assert_eq!(coerce_scalar("off"), Scalar::Bool(false));
        assert_eq!(coerce_scalar("yesno"), Scalar::Str("yesno".into()));
        // "1" is ambiguous: integer wins over boolean
        assert_eq!(coerce_scalar("1"), Scalar::Int(1));
        assert_eq!(coerce_scalar("0"), Scalar::Int(0));
    }

    #[test]
    fn test_coerce_scalar_signs_and_special_floats() {
        // Signed numbers skip the pure-digit integer test
        assert_eq!(coerce_scalar("-3"), Scalar::Float(-3.0));
        assert_eq!(coerce_scalar("+1.5"), Scalar::Float(1.5));
        assert_eq!(coerce_scalar("inf"), Scalar::Float(f64::INFINITY));
        // underscores disqualify the pure-digit integer test
        assert_eq!(coerce_scalar("1_000"), Scalar::Float(1000.0));
        match coerce_scalar("nan") {
            Scalar::Float(f) => assert!(f.is_nan()),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_coerce_scalar_keeps_odd_strings() {
        assert_eq!(coerce_scalar("1.2.3"), Scalar::Str("1.2.3".into()));
        assert_eq!(coerce_scalar(""), Scalar::Str("".into()));
        assert_eq!(coerce_scalar("infinite"), Scalar::Str("infinite".into()));
    }

    #[test]
    fn test_coerce_bool() {
        assert_eq!(coerce_bool("TRUE").unwrap(), Scalar::Bool(true));
        assert_eq!(coerce_bool("nil").unwrap(), Scalar::Bool(false));
        assert!(matches!(
            coerce_bool("3"),
            Err(Error::CoercionFailure { .. })
        ));
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("My_Field_Name"), "my-field-name");
    }

    #[test]
    fn test_remove_prefixes() {
        assert_eq!(remove_prefixes("# hello", COMMENT_PREFIXES), "hello");
        assert_eq!(remove_prefixes(" ; hello", COMMENT_PREFIXES), "hello");
        assert_eq!(remove_prefixes("hello", COMMENT_PREFIXES), "hello");
    }

    #[test]
    fn test_split_comment_preserves_comment_text() {
        let c = split_comment("value # a comment", COMMENT_PREFIXES).unwrap();
        assert_eq!(c.value(), Some(&Scalar::Str("value".into())));
        assert_eq!(c.comment(), Some("a comment"));
    }

    #[test]
    fn test_split_comment_earliest_prefix_wins() {
        let c = split_comment("a ; first # second", COMMENT_PREFIXES).unwrap();
        assert_eq!(c.value(), Some(&Scalar::Str("a".into())));
        assert_eq!(c.comment(), Some("first # second"));
    }

    #[test]
    fn test_split_comment_comment_only() {
        let c = split_comment("# nothing here", COMMENT_PREFIXES).unwrap();
        assert!(c.is_comment_only());
        assert_eq!(c.comment(), Some("nothing here"));
    }

    #[test]
    fn test_split_comment_never_splits_multiline() {
        let c = split_comment("first # not a comment\nsecond", COMMENT_PREFIXES).unwrap();
        assert!(!c.is_comment_only());
        assert!(!c.has_comment());
        assert_eq!(
            c.value(),
            Some(&Scalar::Str("first # not a comment\nsecond".into()))
        );
    }

    #[test]
    fn test_split_scalar_coerces() {
        let c = split_scalar("42 # answer", COMMENT_PREFIXES).unwrap();
        assert_eq!(c.value(), Some(&Scalar::Int(42)));
        assert_eq!(c.comment(), Some("answer"));
    }

    #[test]
    fn test_split_list_single_line() {
        let list = split_list("1, 2, 3 # nums", ',', identity, true, false, COMMENT_PREFIXES)
            .unwrap();
        assert_eq!(list.len(), 1);
        let entry = list.iter().next().unwrap();
        assert_eq!(
            entry.value(),
            Some(&vec![
                Scalar::Str("1".into()),
                Scalar::Str("2".into()),
                Scalar::Str("3".into()),
            ])
        );
        assert_eq!(entry.comment(), Some("nums"));
    }

    #[test]
    fn test_split_list_dangling_keeps_line_comments() {
        let value = "\napple # fruit\n# only a comment\nbanana";
        let list = split_list(value, ',', identity, true, false, COMMENT_PREFIXES).unwrap();
        assert_eq!(list.len(), 3);

        let entries: Vec<_> = list.iter().collect();
        assert_eq!(entries[0].comment(), Some("fruit"));
        assert!(entries[1].is_comment_only());
        assert_eq!(entries[2].value(), Some(&vec![Scalar::Str("banana".into())]));
    }

    #[test]
    fn test_split_list_dangling_idempotence() {
        // A value already rendered one element per line, re-joined, must
        // reproduce the original element sequence.
        let elements = ["alpha", "beta", "gamma"];
        let joined = elements.join("\n");
        let list = split_list(&joined, ',', identity, true, false, COMMENT_PREFIXES).unwrap();
        let flat: Vec<String> = list
            .as_list()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(flat, elements);
    }

    #[test]
    fn test_split_list_no_subsplit() {
        let value = "a, with, commas\nkept whole";
        let list = split_list(value, ',', identity, false, false, COMMENT_PREFIXES).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.iter().next().unwrap().value(),
            Some(&vec![Scalar::Str("a, with, commas".into())])
        );
    }

    #[test]
    fn test_split_list_coercion_failure_bubbles() {
        let result = split_list("1, x", ',', coerce_bool, true, false, COMMENT_PREFIXES);
        assert!(matches!(result, Err(Error::CoercionFailure { .. })));
    }

    #[test]
    fn test_split_kv_pairs_single_line() {
        let kv = split_kv_pairs("a=1, b=2 # hi", '=', identity, ',', true, COMMENT_PREFIXES)
            .unwrap();
        assert_eq!(kv.len(), 1);
        let entry = kv.iter().next().unwrap();
        assert_eq!(
            entry.value(),
            Some(&vec![
                ("a".to_string(), Scalar::Str("1".into())),
                ("b".to_string(), Scalar::Str("2".into())),
            ])
        );
        assert_eq!(entry.comment(), Some("hi"));
    }

    #[test]
    fn test_split_kv_pairs_dangling() {
        let kv = split_kv_pairs("a=1\nb=2 # hi", '=', identity, ',', false, COMMENT_PREFIXES)
            .unwrap();
        assert_eq!(kv.len(), 2);
        let entries: Vec<_> = kv.iter().collect();
        assert_eq!(
            entries[0].value(),
            Some(&vec![("a".to_string(), Scalar::Str("1".into()))])
        );
        assert_eq!(entries[1].comment(), Some("hi"));
    }

    #[test]
    fn test_split_kv_pairs_drops_separator_free_elements() {
        let kv = split_kv_pairs("a=1, orphan, b=2", '=', identity, ',', true, COMMENT_PREFIXES)
            .unwrap();
        let map = kv.as_map();
        assert_eq!(map.len(), 2);
        assert!(!map.contains_key("orphan"));
    }

    #[test]
    fn test_is_float() {
        assert!(is_float("1.5"));
        assert!(is_float("-2."));
        assert!(is_float("1_000.5"));
        assert!(is_float("inf"));
        assert!(is_float("-nan"));
        assert!(!is_float("1.2.3"));
        assert!(!is_float("abc"));
        assert!(!is_float(""));
    }
}
