//! The `best_effort` profile: structure guessing for generic INI files.
//!
//! Without a dialect-specific profile there is no schema to consult, so the
//! value shapes are guessed from their text:
//!
//! - a multi-line value containing the key separator becomes key-value pairs
//! - any other multi-line value becomes a list
//! - a field whose name ends in `version` keeps its value as a string (so
//!   `version = 1.0` does not silently turn into a float)
//! - everything else goes through scalar coercion
//!
//! Section names containing `.`, `:` or `\` are split into compound keys, so
//! `[a.b]` nests instead of producing a table literally named `"a.b"`.
//!
//! Guessing can be wrong; when a value cannot be processed it is kept as the
//! original string and a warning is logged.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::repr::{IntermediateRepr, Item, Key};
use crate::transform::{
    coerce_scalar, split_comment, split_kv_pairs, split_list, split_scalar, COMMENT_PREFIXES,
};
use crate::translator::Translator;
use crate::Result;

static SECTION_SPLITTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.:\\]").expect("section splitter regex"));

const KEY_SEP: char = '=';
const PAIR_SEP: char = ',';
const LIST_SEP: char = ',';

/// Registers the `best_effort` profile.
pub fn activate(translator: &mut Translator) {
    let profile = translator.profile_mut("best_effort");
    profile.set_help_text("guess the structure of a generic INI file");
    profile.add_intermediate_processor(process_values);
}

/// Applies the structure guessing to every section of the tree.
pub fn process_values(mut doc: IntermediateRepr) -> IntermediateRepr {
    let keys: Vec<Key> = doc.keys().cloned().collect();
    for key in keys {
        let Some(name) = key.as_name().map(str::to_string) else {
            continue;
        };
        if let Some(Item::Table(section)) = doc.get_mut(&key) {
            process_section(section);
        } else {
            continue;
        }
        let parts: Vec<&str> = SECTION_SPLITTER.split(&name).collect();
        if parts.len() > 1 {
            if let Err(err) = doc.rename(&key, Key::compound(parts), false) {
                tracing::warn!(section = %name, %err, "keeping section name unsplit");
            }
        }
    }
    doc
}

fn process_section(section: &mut IntermediateRepr) {
    let keys: Vec<Key> = section.keys().cloned().collect();
    for key in keys {
        let Some(field) = key.as_name().map(str::to_string) else {
            continue;
        };
        let raw = match section.get(&key) {
            Some(Item::Raw(value)) => value.clone(),
            _ => continue,
        };
        match guess_item(&field, &raw) {
            Ok(item) => section.set(key, item),
            Err(err) => {
                tracing::warn!(field = %field, %err, "keeping value as a plain string");
            }
        }
    }
}

fn guess_item(field: &str, value: &str) -> Result<Item> {
    let coerce = |text: &str| Ok(coerce_scalar(text));
    if value.contains('\n') {
        if value.contains(KEY_SEP) {
            let pairs =
                split_kv_pairs(value, KEY_SEP, coerce, PAIR_SEP, true, COMMENT_PREFIXES)?;
            return Ok(Item::Pairs(pairs));
        }
        let list = split_list(value, LIST_SEP, coerce, true, false, COMMENT_PREFIXES)?;
        return Ok(Item::List(list));
    }
    if field.ends_with("version") {
        return Ok(Item::Commented(split_comment(value, COMMENT_PREFIXES)?));
    }
    Ok(Item::Commented(split_scalar(value, COMMENT_PREFIXES)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse, ParserOptions};
    use crate::repr::{Commented, Scalar};

    fn process(text: &str) -> IntermediateRepr {
        let doc = parse(text, &ParserOptions::default()).unwrap();
        process_values(doc)
    }

    fn field<'a>(doc: &'a IntermediateRepr, section: &str, name: &str) -> &'a Item {
        doc.get_named(section)
            .and_then(Item::as_table)
            .and_then(|table| table.get_named(name))
            .unwrap()
    }

    #[test]
    fn test_scalars_are_coerced() {
        let doc = process("[s]\nnum = 3\nflag = yes\nname = hello # hi\n");
        assert_eq!(
            field(&doc, "s", "num"),
            &Item::Commented(Commented::from_value(Scalar::Int(3)))
        );
        assert_eq!(
            field(&doc, "s", "flag"),
            &Item::Commented(Commented::from_value(Scalar::Bool(true)))
        );
        assert_eq!(
            field(&doc, "s", "name"),
            &Item::Commented(Commented::new(
                Some(Scalar::Str("hello".into())),
                Some("hi".into())
            ))
        );
    }

    #[test]
    fn test_version_fields_stay_strings() {
        let doc = process("[metadata]\nversion = 1.0\nmin_python_version = 3.8\n");
        assert_eq!(
            field(&doc, "metadata", "version"),
            &Item::Commented(Commented::from_value(Scalar::Str("1.0".into())))
        );
        assert_eq!(
            field(&doc, "metadata", "min_python_version"),
            &Item::Commented(Commented::from_value(Scalar::Str("3.8".into())))
        );
    }

    #[test]
    fn test_multiline_value_becomes_list() {
        let doc = process("[s]\ndeps =\n    alpha\n    beta # fast\n");
        match field(&doc, "s", "deps") {
            Item::List(list) => {
                assert_eq!(list.len(), 2);
                assert_eq!(
                    list.as_list(),
                    vec![Scalar::Str("alpha".into()), Scalar::Str("beta".into())]
                );
            }
            other => panic!("expected a list, got {:?}", other),
        }
    }

    #[test]
    fn test_multiline_value_with_key_sep_becomes_pairs() {
        let doc = process("[s]\nenv =\n    A=1\n    B=two\n");
        match field(&doc, "s", "env") {
            Item::Pairs(pairs) => {
                let map = pairs.as_map();
                assert_eq!(map.get("A"), Some(&Scalar::Int(1)));
                assert_eq!(map.get("B"), Some(&Scalar::Str("two".into())));
            }
            other => panic!("expected pairs, got {:?}", other),
        }
    }

    #[test]
    fn test_single_line_value_with_key_sep_stays_scalar() {
        let doc = process("[s]\nurl = http://example.com?a=b\n");
        assert_eq!(
            field(&doc, "s", "url"),
            &Item::Commented(Commented::from_value(Scalar::Str(
                "http://example.com?a=b".into()
            )))
        );
    }

    #[test]
    fn test_dotted_section_names_become_compound_keys() {
        let doc = process("[tool.pytest]\naddopts = -ra\n[a:b]\nx = 1\n");
        assert!(doc.contains_key(&Key::compound(["tool", "pytest"])));
        assert!(doc.contains_key(&Key::compound(["a", "b"])));
        assert!(!doc.contains_key(&Key::name("tool.pytest")));
    }

    #[test]
    fn test_end_to_end_through_convert() {
        let doc = process("[tool.opts]\nn = 2\nlist =\n    a\n    b\n");
        let toml = crate::collapse::convert(&doc).unwrap();
        assert_eq!(
            toml,
            "[tool.opts]\nn = 2\nlist = [\n    \"a\",\n    \"b\",\n]\n"
        );
    }
}
