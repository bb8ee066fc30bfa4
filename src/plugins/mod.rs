//! Built-in plugins.
//!
//! A plugin is a function receiving the [`Translator`] and registering
//! profiles or augmentations on it. The built-ins cover the generic case:
//! [`best_effort`] guesses the structure of arbitrary INI files, and
//! [`tasks`] registers the profile-independent cleanup passes.

pub mod best_effort;
pub mod tasks;

use crate::translator::Translator;
use crate::Result;

/// Activates every built-in plugin on `translator`.
pub fn activate(translator: &mut Translator) -> Result<()> {
    best_effort::activate(translator);
    tasks::activate(translator)?;
    Ok(())
}
