//! INI parser adapter: builds the intermediate representation from source
//! text.
//!
//! The parser is deliberately layout-faithful rather than validating: it
//! preserves section order, per-section inline comments, raw option values
//! (including their inline comments, which are only separated later by the
//! [`transform`](crate::transform) primitives), and standalone comment/blank
//! lines as hidden keys.
//!
//! Indented non-blank lines continue the preceding option value, which is
//! how dangling multi-line values (lists, key-value blocks) reach the value
//! primitives as a single string. A construct that cannot be classified is
//! an [`Error::InvalidStructure`] — recovering from malformed input is a
//! non-goal.
//!
//! ## Examples
//!
//! ```rust
//! use ini2toml::parse::{parse, ParserOptions};
//!
//! let doc = parse("[server] # main\nhost = localhost\n", &ParserOptions::default()).unwrap();
//! let section = doc.get_named("server").and_then(|item| item.as_table()).unwrap();
//! assert_eq!(section.inline_comment(), Some("main"));
//! ```

use crate::repr::{IntermediateRepr, Item, Key};
use crate::transform::remove_prefixes;
use crate::{Error, Result};

/// Syntax options for parsing `.ini`/`.cfg` text.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Characters starting a comment (`#` and `;` by default).
    pub comment_prefixes: Vec<char>,
    /// Characters separating option keys from values (`=` and `:` by
    /// default).
    pub delimiters: Vec<char>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            comment_prefixes: vec!['#', ';'],
            delimiters: vec!['=', ':'],
        }
    }
}

/// One option being accumulated across continuation lines.
struct PendingOption {
    key: String,
    value: String,
    line: usize,
}

struct Parser<'a> {
    opts: &'a ParserOptions,
    root: IntermediateRepr,
    section: Option<(String, usize, IntermediateRepr)>,
    pending: Option<PendingOption>,
}

/// Parses INI text into an [`IntermediateRepr`] tree.
///
/// Every section becomes a nested node keyed by its name; every blank line
/// and standalone comment becomes a uniquely-identified hidden key so it can
/// be re-emitted at the same position.
pub fn parse(text: &str, opts: &ParserOptions) -> Result<IntermediateRepr> {
    let mut parser = Parser {
        opts,
        root: IntermediateRepr::new(),
        section: None,
        pending: None,
    };
    for (index, line) in text.lines().enumerate() {
        parser.feed(index + 1, line)?;
    }
    parser.finish()
}

impl Parser<'_> {
    fn feed(&mut self, lineno: usize, line: &str) -> Result<()> {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            self.flush_pending()?;
            self.target().set(Key::whitespace(), Item::Raw(line.to_string()));
            return Ok(());
        }

        let indented = line.starts_with([' ', '\t']);
        if indented && self.pending.is_some() {
            // Continuation of the previous option value. Comment-looking
            // lines stay inside the value so per-line comments survive until
            // the splitting primitives run.
            if let Some(pending) = self.pending.as_mut() {
                pending.value.push('\n');
                pending.value.push_str(trimmed);
            }
            return Ok(());
        }

        if trimmed.starts_with(|c| self.opts.comment_prefixes.contains(&c)) {
            self.flush_pending()?;
            let text = remove_prefixes(trimmed, &self.opts.comment_prefixes).to_string();
            self.target().set(Key::comment(), Item::Raw(text));
            return Ok(());
        }

        if trimmed.starts_with('[') && !indented {
            self.flush_pending()?;
            return self.start_section(lineno, trimmed);
        }

        if indented {
            return Err(Error::invalid_structure(lineno, "unexpected indented line"));
        }

        match trimmed.find(|c: char| self.opts.delimiters.contains(&c)) {
            Some(0) => Err(Error::invalid_structure(lineno, "option without a name")),
            Some(at) => {
                self.flush_pending()?;
                if self.section.is_none() {
                    return Err(Error::invalid_structure(
                        lineno,
                        "option found before any section header",
                    ));
                }
                let (key, rest) = trimmed.split_at(at);
                self.pending = Some(PendingOption {
                    key: key.trim().to_string(),
                    value: rest[1..].trim().to_string(),
                    line: lineno,
                });
                Ok(())
            }
            None => Err(Error::invalid_structure(
                lineno,
                "line is neither a section header, an option, nor a comment",
            )),
        }
    }

    fn start_section(&mut self, lineno: usize, trimmed: &str) -> Result<()> {
        let end = trimmed
            .find(']')
            .ok_or_else(|| Error::invalid_structure(lineno, "unclosed section header"))?;
        let name = trimmed[1..end].trim().to_string();
        if name.is_empty() {
            return Err(Error::invalid_structure(lineno, "empty section name"));
        }

        let mut section = IntermediateRepr::new();
        let rest = trimmed[end + 1..].trim();
        if !rest.is_empty() {
            if rest.starts_with(|c| self.opts.comment_prefixes.contains(&c)) {
                section.set_inline_comment(remove_prefixes(rest, &self.opts.comment_prefixes));
            } else {
                return Err(Error::invalid_structure(
                    lineno,
                    "unexpected text after section header",
                ));
            }
        }

        self.close_section()?;
        self.section = Some((name, lineno, section));
        Ok(())
    }

    /// The node new entries should land in: the open section, or the root
    /// (for comments and blank lines before the first header).
    fn target(&mut self) -> &mut IntermediateRepr {
        match self.section.as_mut() {
            Some((_, _, section)) => section,
            None => &mut self.root,
        }
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(pending) = self.pending.take() {
            let line = pending.line;
            let key = pending.key.clone();
            self.target()
                .append(Key::name(pending.key), Item::Raw(pending.value))
                .map_err(|_| {
                    Error::invalid_structure(line, &format!("duplicate option {:?}", key))
                })?;
        }
        Ok(())
    }

    fn close_section(&mut self) -> Result<()> {
        if let Some((name, lineno, section)) = self.section.take() {
            self.root
                .append(Key::name(name.clone()), Item::Table(section))
                .map_err(|_| {
                    Error::invalid_structure(lineno, &format!("duplicate section {:?}", name))
                })?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<IntermediateRepr> {
        self.flush_pending()?;
        self.close_section()?;
        Ok(self.root)
    }
}
