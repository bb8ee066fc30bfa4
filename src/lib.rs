//! # ini2toml
//!
//! A format-preserving converter from INI/CFG configuration files to TOML.
//!
//! The conversion keeps what makes a config file readable: comments (both
//! standalone and inline), blank lines, and the order the author chose. The
//! input is parsed into an intermediate tree, reshaped by the processors of
//! a [`Profile`], and collapsed into TOML with deterministic layout
//! heuristics.
//!
//! ## Quick Start
//!
//! ```rust
//! use ini2toml::Translator;
//!
//! let ini = "\
//! [section] # the only one
//! number = 3
//! flag = yes
//!
//! ## a standalone comment
//! name = example
//! ";
//!
//! let translator = Translator::with_builtin_plugins().unwrap();
//! let toml = translator.translate(ini, "best_effort", &Default::default()).unwrap();
//!
//! assert_eq!(toml, "\
//! [section] # the only one
//! number = 3
//! flag = true
//!
//! ## a standalone comment
//! name = \"example\"
//! ");
//! ```
//!
//! ## Architecture
//!
//! - [`transform`]: value splitting and coercion primitives shared by every
//!   profile
//! - [`repr`]: the ordered, renameable intermediate document model
//! - [`parse`]: the INI parser adapter producing that model
//! - [`collapse`]: the serializer turning the model into TOML text
//! - [`profile`] / [`translator`]: named pipelines, augmentations and the
//!   registry driving a translation end to end
//! - [`plugins`]: the built-in `best_effort` profile and the
//!   profile-independent cleanup tasks
//!
//! ## Custom profiles
//!
//! Dialect-specific knowledge lives in profiles. Registering one is a matter
//! of asking the translator for it and attaching processors:
//!
//! ```rust
//! use ini2toml::{Translator, IntermediateRepr, Key};
//!
//! let mut translator = Translator::with_builtin_plugins().unwrap();
//! let profile = translator.profile_mut("renamer");
//! profile.add_intermediate_processor(|mut doc: IntermediateRepr| {
//!     let _ = doc.rename(&Key::name("old"), Key::name("new"), true);
//!     doc
//! });
//!
//! let toml = translator.translate("[old]\nx = 1\n", "renamer", &Default::default()).unwrap();
//! assert_eq!(toml, "[new]\nx = \"1\"\n");
//! ```
//!
//! ## Guarantees and limits
//!
//! The coercion heuristics guess types from text, so the output should be
//! reviewed when no dialect-specific profile exists. Structured values keep
//! their comments; malformed INI input fails with an error naming the line.

pub mod collapse;
pub mod error;
pub mod parse;
pub mod plugins;
pub mod profile;
pub mod repr;
pub mod transform;
pub mod translator;

pub use collapse::convert;
pub use error::{Error, Result};
pub use parse::{parse, ParserOptions};
pub use profile::{Profile, ProfileAugmentation};
pub use repr::{
    Commented, CommentedKV, CommentedList, HiddenKey, IntermediateRepr, Item, Key, Scalar,
};
pub use translator::{PluginFn, Translator};
