//! Property-based tests - pragmatic checks over generated INI documents
//!
//! These complement the integration tests by verifying the structural
//! guarantees of the pipeline (valid TOML output, single terminating
//! newline, element-preserving splits) across a wide range of inputs.

use std::collections::BTreeMap;
use std::collections::HashMap;

use proptest::prelude::*;

use ini2toml::repr::Scalar;
use ini2toml::transform::{coerce_scalar, identity, split_list, COMMENT_PREFIXES};
use ini2toml::Translator;

type Document = BTreeMap<String, BTreeMap<String, String>>;

fn section_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

fn option_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 ]{0,11}"
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::btree_map(
        section_name(),
        prop::collection::btree_map(section_name(), option_value(), 1..5),
        1..4,
    )
}

fn to_ini(doc: &Document) -> String {
    let mut out = String::new();
    for (section, options) in doc {
        out.push_str(&format!("[{}]\n", section));
        for (key, value) in options {
            out.push_str(&format!("{} = {}\n", key, value));
        }
    }
    out
}

fn translate(ini: &str) -> String {
    Translator::with_builtin_plugins()
        .expect("plugin activation")
        .translate(ini, "best_effort", &HashMap::new())
        .expect("translation")
}

proptest! {
    #[test]
    fn prop_output_is_valid_toml(doc in document()) {
        let output = translate(&to_ini(&doc));
        prop_assert!(toml::from_str::<toml::Value>(&output).is_ok(), "not TOML: {}", output);
    }

    #[test]
    fn prop_output_ends_with_single_newline(doc in document()) {
        let output = translate(&to_ini(&doc));
        prop_assert!(output.ends_with('\n'));
        prop_assert!(!output.ends_with("\n\n"));
    }

    #[test]
    fn prop_every_section_survives(doc in document()) {
        let output = translate(&to_ini(&doc));
        let value: toml::Value = toml::from_str(&output).unwrap();
        for section in doc.keys() {
            prop_assert!(value.get(section).is_some(), "{} missing in {}", section, output);
        }
    }

    #[test]
    fn prop_coerce_digits_is_integer(n in any::<u32>()) {
        prop_assert_eq!(coerce_scalar(&n.to_string()), Scalar::Int(i64::from(n)));
    }

    #[test]
    fn prop_coerce_never_panics(s in "\\PC{0,20}") {
        let _ = coerce_scalar(&s);
    }

    #[test]
    fn prop_split_list_preserves_elements(
        elements in prop::collection::vec("[a-z]{1,8}", 1..8)
    ) {
        let joined = elements.join(", ");
        let list = split_list(&joined, ',', identity, true, false, COMMENT_PREFIXES).unwrap();
        let flat: Vec<String> = list.as_list().iter().map(ToString::to_string).collect();
        prop_assert_eq!(flat, elements);
    }
}
