//! Profiles: named processor pipelines and their opt-in extensions.
//!
//! A [`Profile`] bundles everything needed to translate one dialect of INI
//! file: text processors running before parsing, tree processors running on
//! the intermediate representation, text processors running on the rendered
//! TOML, and optional parser syntax overrides.
//!
//! A [`ProfileAugmentation`] is a named, user-toggleable function that
//! extends every profile right before a translation runs. The translator
//! clones the registered profile first, so one run's augmentations never
//! leak into the next.

use std::fmt;
use std::sync::Arc;

use crate::parse::ParserOptions;
use crate::repr::IntermediateRepr;

/// Transforms raw text, before parsing or after rendering.
pub type TextProcessor = Arc<dyn Fn(String) -> String + Send + Sync>;

/// Transforms the intermediate tree between parsing and rendering.
pub type ReprProcessor = Arc<dyn Fn(IntermediateRepr) -> IntermediateRepr + Send + Sync>;

/// Extends a profile in place right before it runs.
pub type AugmentationFn = Arc<dyn Fn(&mut Profile) + Send + Sync>;

/// A named translation pipeline for one dialect of INI file.
#[derive(Clone)]
pub struct Profile {
    name: String,
    help_text: String,
    pre_processors: Vec<TextProcessor>,
    intermediate_processors: Vec<ReprProcessor>,
    post_processors: Vec<TextProcessor>,
    parser_options: Option<ParserOptions>,
}

impl Profile {
    pub fn new(name: impl Into<String>) -> Self {
        Profile {
            name: name.into(),
            help_text: String::new(),
            pre_processors: Vec::new(),
            intermediate_processors: Vec::new(),
            post_processors: Vec::new(),
            parser_options: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    pub fn set_help_text(&mut self, help_text: impl Into<String>) {
        self.help_text = help_text.into();
    }

    /// Parser syntax overrides for this dialect, if any.
    #[must_use]
    pub fn parser_options(&self) -> Option<&ParserOptions> {
        self.parser_options.as_ref()
    }

    pub fn set_parser_options(&mut self, options: ParserOptions) {
        self.parser_options = Some(options);
    }

    /// Registers a processor running on the INI text before parsing.
    pub fn add_pre_processor(
        &mut self,
        processor: impl Fn(String) -> String + Send + Sync + 'static,
    ) {
        self.pre_processors.push(Arc::new(processor));
    }

    /// Registers a processor running on the intermediate tree.
    pub fn add_intermediate_processor(
        &mut self,
        processor: impl Fn(IntermediateRepr) -> IntermediateRepr + Send + Sync + 'static,
    ) {
        self.intermediate_processors.push(Arc::new(processor));
    }

    /// Registers a processor running on the rendered TOML text.
    pub fn add_post_processor(
        &mut self,
        processor: impl Fn(String) -> String + Send + Sync + 'static,
    ) {
        self.post_processors.push(Arc::new(processor));
    }

    /// Runs all pre-processors over `text`, in registration order.
    #[must_use]
    pub fn apply_pre_processors(&self, text: String) -> String {
        self.pre_processors
            .iter()
            .fold(text, |text, processor| processor(text))
    }

    /// Runs all intermediate processors over `repr`, in registration order.
    #[must_use]
    pub fn apply_intermediate_processors(&self, repr: IntermediateRepr) -> IntermediateRepr {
        self.intermediate_processors
            .iter()
            .fold(repr, |repr, processor| processor(repr))
    }

    /// Runs all post-processors over `text`, in registration order.
    #[must_use]
    pub fn apply_post_processors(&self, text: String) -> String {
        self.post_processors
            .iter()
            .fold(text, |text, processor| processor(text))
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .field("help_text", &self.help_text)
            .field("pre_processors", &self.pre_processors.len())
            .field(
                "intermediate_processors",
                &self.intermediate_processors.len(),
            )
            .field("post_processors", &self.post_processors.len())
            .field("parser_options", &self.parser_options)
            .finish()
    }
}

/// A named, user-toggleable extension applied to every profile right before
/// a translation runs.
#[derive(Clone)]
pub struct ProfileAugmentation {
    name: String,
    help_text: String,
    active_by_default: bool,
    augmentation: AugmentationFn,
}

impl ProfileAugmentation {
    pub fn new(
        name: impl Into<String>,
        help_text: impl Into<String>,
        active_by_default: bool,
        augmentation: impl Fn(&mut Profile) + Send + Sync + 'static,
    ) -> Self {
        ProfileAugmentation {
            name: name.into(),
            help_text: help_text.into(),
            active_by_default,
            augmentation: Arc::new(augmentation),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn help_text(&self) -> &str {
        &self.help_text
    }

    #[inline]
    #[must_use]
    pub const fn active_by_default(&self) -> bool {
        self.active_by_default
    }

    /// Decides whether this augmentation runs: an explicit user choice wins,
    /// otherwise the default applies.
    #[inline]
    #[must_use]
    pub const fn is_active(&self, explicitly_active: Option<bool>) -> bool {
        match explicitly_active {
            Some(choice) => choice,
            None => self.active_by_default,
        }
    }

    /// Applies the augmentation to a (cloned) profile.
    pub fn apply(&self, profile: &mut Profile) {
        (self.augmentation)(profile);
    }
}

impl fmt::Debug for ProfileAugmentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileAugmentation")
            .field("name", &self.name)
            .field("active_by_default", &self.active_by_default)
            .finish()
    }
}
