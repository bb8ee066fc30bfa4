//! The translator: profile registry and top-level translation pipeline.
//!
//! A [`Translator`] owns every registered [`Profile`] and
//! [`ProfileAugmentation`] and drives the full pipeline for one input:
//!
//! 1. look the profile up (unknown names are an error listing the known ones)
//! 2. clone it, so augmentations never leak between runs
//! 3. apply the active augmentations to the clone
//! 4. run the pre-processors over the INI text
//! 5. parse into the intermediate representation
//! 6. run the intermediate processors
//! 7. collapse to TOML and run the post-processors
//!
//! ## Examples
//!
//! ```rust
//! use ini2toml::Translator;
//!
//! let translator = Translator::with_builtin_plugins().unwrap();
//! let toml = translator
//!     .translate("[section]\nkey = value\n", "best_effort", &Default::default())
//!     .unwrap();
//! assert_eq!(toml, "[section]\nkey = \"value\"\n");
//! ```

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::collapse::convert;
use crate::parse::{parse, ParserOptions};
use crate::plugins;
use crate::profile::{Profile, ProfileAugmentation};
use crate::{Error, Result};

/// A plugin: a callback invoked once at translator construction, receiving
/// the translator to register profiles and augmentations on.
pub type PluginFn = Box<dyn FnOnce(&mut Translator) -> Result<()>>;

/// Registry of profiles and augmentations, and the entry point for running
/// translations.
#[derive(Debug, Default)]
pub struct Translator {
    profiles: IndexMap<String, Profile>,
    augmentations: IndexMap<String, ProfileAugmentation>,
    parser_options: ParserOptions,
}

impl Translator {
    /// Creates an empty translator with no profiles registered.
    pub fn new() -> Self {
        Translator {
            profiles: IndexMap::new(),
            augmentations: IndexMap::new(),
            parser_options: ParserOptions::default(),
        }
    }

    /// Creates a translator from an already-resolved list of plugin
    /// callbacks, invoking each once in order.
    ///
    /// The first failing plugin aborts construction.
    pub fn with_plugins(plugins: impl IntoIterator<Item = PluginFn>) -> Result<Self> {
        let mut translator = Translator::new();
        for plugin in plugins {
            plugin(&mut translator)?;
        }
        Ok(translator)
    }

    /// Creates a translator with the built-in plugins activated: the
    /// `best_effort` profile and the profile-independent tasks.
    pub fn with_builtin_plugins() -> Result<Self> {
        Self::with_plugins([Box::new(plugins::activate) as PluginFn])
    }

    /// Parser options used when the selected profile does not override them.
    pub fn set_parser_options(&mut self, options: ParserOptions) {
        self.parser_options = options;
    }

    /// Returns the profile registered under `name`, creating an empty one if
    /// necessary. This is how plugins claim a profile without caring whether
    /// another plugin touched it first.
    pub fn profile_mut(&mut self, name: &str) -> &mut Profile {
        self.profiles
            .entry(name.to_string())
            .or_insert_with(|| Profile::new(name))
    }

    #[must_use]
    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    #[must_use]
    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }

    #[must_use]
    pub fn augmentations(&self) -> impl Iterator<Item = &ProfileAugmentation> {
        self.augmentations.values()
    }

    /// Registers an augmentation that will extend every cloned profile right
    /// before it runs.
    ///
    /// The name must be a valid identifier (it doubles as a CLI flag), and
    /// registering the same name twice is an error: two plugins are then
    /// fighting over one toggle.
    pub fn augment_profiles(&mut self, augmentation: ProfileAugmentation) -> Result<()> {
        let name = augmentation.name().to_string();
        if !is_valid_identifier(&name) {
            return Err(Error::InvalidAugmentationName { name });
        }
        if self.augmentations.contains_key(&name) {
            return Err(Error::duplicate_registration(&name));
        }
        self.augmentations.insert(name, augmentation);
        Ok(())
    }

    /// Translates one INI document to TOML using the named profile.
    ///
    /// `active_augmentations` holds the user's explicit per-augmentation
    /// choices; augmentations not mentioned fall back to their default.
    pub fn translate(
        &self,
        ini: &str,
        profile_name: &str,
        active_augmentations: &HashMap<String, bool>,
    ) -> Result<String> {
        let profile = self.profiles.get(profile_name).ok_or_else(|| {
            Error::undefined_profile(profile_name, self.profile_names())
        })?;
        tracing::debug!(profile = profile_name, "starting translation");

        let mut profile = profile.clone();
        for augmentation in self.augmentations.values() {
            let choice = active_augmentations.get(augmentation.name()).copied();
            if augmentation.is_active(choice) {
                tracing::debug!(augmentation = augmentation.name(), "applying augmentation");
                augmentation.apply(&mut profile);
            }
        }

        let text = profile.apply_pre_processors(ini.to_string());
        let options = profile.parser_options().unwrap_or(&self.parser_options);
        let repr = parse(&text, options)?;
        let repr = profile.apply_intermediate_processors(repr);
        let toml = convert(&repr)?;
        Ok(profile.apply_post_processors(toml))
    }
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
