//! Error types for INI → TOML translation.
//!
//! This module provides the full error taxonomy of the crate:
//!
//! - **Registration errors**: an unknown profile was requested, or an
//!   augmentation name collides with an existing one
//! - **Structural errors**: the INI parser met a construct it cannot classify,
//!   or the serializer met a key shape it cannot place in the TOML tree
//! - **Coercion errors**: a string value could not be converted to the
//!   requested scalar type (recoverable — callers usually keep the string)
//! - **Document-model errors**: key contract violations on
//!   [`IntermediateRepr`](crate::IntermediateRepr) operations
//!
//! Only coercion failures are expected during normal operation; everything
//! else surfaces to the caller and aborts the translation.
//!
//! ## Examples
//!
//! ```rust
//! use ini2toml::{Translator, Error};
//!
//! let translator = Translator::with_builtin_plugins().unwrap();
//! let result = translator.translate("[a]\nx = 1\n", "no-such-profile", &Default::default());
//!
//! match result {
//!     Err(Error::UndefinedProfile { name, available }) => {
//!         assert_eq!(name, "no-such-profile");
//!         assert!(available.contains(&"best_effort".to_string()));
//!     }
//!     _ => panic!("expected an undefined-profile error"),
//! }
//! ```

use thiserror::Error;

/// Represents all possible errors produced while translating INI to TOML.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The requested profile is not registered with the translator.
    #[error("profile {name:?} is not registered (available: {})", available.join(", "))]
    UndefinedProfile {
        name: String,
        available: Vec<String>,
    },

    /// The INI source contains a construct the parser cannot classify.
    #[error("invalid construct at line {line}: {msg}")]
    InvalidStructure { line: usize, msg: String },

    /// A value could not be coerced into the requested scalar type.
    ///
    /// Processors applying coercion to a whole section are expected to catch
    /// this per field and keep the original string instead.
    #[error("{value:?} cannot be converted to {target}")]
    CoercionFailure {
        value: String,
        target: &'static str,
    },

    /// An augmentation with the same name is already registered.
    #[error("augmentation {name:?} is already registered; plugins seem to be in conflict")]
    DuplicateRegistration { name: String },

    /// Augmentation names must be valid identifiers.
    #[error("augmentation name {name:?} is not a valid identifier")]
    InvalidAugmentationName { name: String },

    /// The serializer met a key it cannot place in the TOML document.
    ///
    /// This indicates a bug in an intermediate processor, not bad user input.
    #[error("{key:?} is not a valid key in the intermediate TOML representation")]
    InvalidKey { key: String },

    /// A key that must not exist yet was already present.
    #[error("key {key:?} already exists")]
    DuplicateKey { key: String },

    /// A key that must exist was absent.
    #[error("key {key:?} does not exist")]
    MissingKey { key: String },

    /// IO error at the CLI boundary.
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Creates an undefined-profile error carrying the known profile names.
    pub fn undefined_profile(name: &str, available: Vec<String>) -> Self {
        Error::UndefinedProfile {
            name: name.to_string(),
            available,
        }
    }

    /// Creates a structural error with the 1-based source line number.
    pub fn invalid_structure(line: usize, msg: &str) -> Self {
        Error::InvalidStructure {
            line,
            msg: msg.to_string(),
        }
    }

    /// Creates a coercion failure for `value` towards the named target type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ini2toml::Error;
    ///
    /// let err = Error::coercion("3", "boolean");
    /// assert!(err.to_string().contains("boolean"));
    /// ```
    pub fn coercion(value: &str, target: &'static str) -> Self {
        Error::CoercionFailure {
            value: value.to_string(),
            target,
        }
    }

    /// Creates a duplicate-registration error for an augmentation name.
    pub fn duplicate_registration(name: &str) -> Self {
        Error::DuplicateRegistration {
            name: name.to_string(),
        }
    }

    /// Creates an invalid-key error from anything displayable.
    pub fn invalid_key(key: impl std::fmt::Display) -> Self {
        Error::InvalidKey {
            key: key.to_string(),
        }
    }

    /// Creates a duplicate-key error from anything displayable.
    pub fn duplicate_key(key: impl std::fmt::Display) -> Self {
        Error::DuplicateKey {
            key: key.to_string(),
        }
    }

    /// Creates a missing-key error from anything displayable.
    pub fn missing_key(key: impl std::fmt::Display) -> Self {
        Error::MissingKey {
            key: key.to_string(),
        }
    }

    /// Creates an I/O error for file reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
