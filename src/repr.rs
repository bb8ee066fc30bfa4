//! Intermediate representation shared by every stage of the translation.
//!
//! The types in this module bridge two textual syntaxes with very different
//! layout rules. An INI document is parsed once into an [`IntermediateRepr`]
//! tree, mutated in place by the intermediate processors of a profile, and
//! finally collapsed into TOML by the [`collapse`](crate::collapse) engine.
//!
//! ## Core Types
//!
//! - [`Key`]: a plain name, a [`HiddenKey`] standing in for a blank or
//!   comment line, or a compound key describing a nested location that has
//!   not been physically split into nested tables yet
//! - [`IntermediateRepr`]: an ordered, renameable associative tree
//! - [`Commented`], [`CommentedList`], [`CommentedKV`]: values annotated with
//!   the comments found next to them in the source file
//! - [`Item`]: the closed union of every value kind the tree can hold
//! - [`Scalar`]: simple data types with a direct TOML correspondence
//!
//! ## Ordering
//!
//! Iteration order always equals insertion order (backed by [`IndexMap`])
//! unless explicitly changed through [`IntermediateRepr::rename`] or
//! [`IntermediateRepr::insert`]. This is what lets the serializer re-emit
//! comments and blank lines at the positions the original author chose.
//!
//! ## Examples
//!
//! ```rust
//! use ini2toml::repr::{IntermediateRepr, Item, Key};
//!
//! let mut section = IntermediateRepr::new();
//! section.append(Key::name("first"), Item::Raw("1".into())).unwrap();
//! section.append(Key::name("second"), Item::Raw("2".into())).unwrap();
//!
//! section.rename(&Key::name("first"), Key::name("renamed"), false).unwrap();
//! assert_eq!(section.index_of(&Key::name("renamed")), Some(0));
//! ```

use indexmap::IndexMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Error, Result};

static NEXT_HIDDEN_ID: AtomicU64 = AtomicU64::new(0);

fn next_hidden_id() -> u64 {
    NEXT_HIDDEN_ID.fetch_add(1, Ordering::Relaxed)
}

/// An opaque key marking the position of a blank line or a standalone
/// comment line, so it can be re-emitted later.
///
/// Each instance carries a process-unique id, keeping equality and hashing
/// trivial while guaranteeing two hidden keys never collide in a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HiddenKey {
    /// Placeholder for a blank line.
    Whitespace(u64),
    /// Placeholder for a standalone comment line.
    Comment(u64),
}

impl HiddenKey {
    /// Creates a fresh, unique placeholder for a blank line.
    pub fn whitespace() -> Self {
        HiddenKey::Whitespace(next_hidden_id())
    }

    /// Creates a fresh, unique placeholder for a comment line.
    pub fn comment() -> Self {
        HiddenKey::Comment(next_hidden_id())
    }

    /// Returns `true` if this key stands for a comment line.
    #[inline]
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(self, HiddenKey::Comment(_))
    }
}

impl fmt::Display for HiddenKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HiddenKey::Whitespace(_) => write!(f, "WhitespaceKey()"),
            HiddenKey::Comment(_) => write!(f, "CommentKey()"),
        }
    }
}

/// A key in an [`IntermediateRepr`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A plain option or section name.
    Name(String),
    /// A positional placeholder for a blank or comment line.
    Hidden(HiddenKey),
    /// An ordered tuple of names describing a nested location before the
    /// tree has been physically split into nested sub-tables.
    Compound(Vec<String>),
}

impl Key {
    /// Creates a plain name key.
    pub fn name(name: impl Into<String>) -> Self {
        Key::Name(name.into())
    }

    /// Creates a compound key from path segments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ini2toml::repr::Key;
    ///
    /// let key = Key::compound(["tool", "pytest"]);
    /// assert_eq!(key.to_string(), "tool.pytest");
    /// ```
    pub fn compound<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Key::Compound(parts.into_iter().map(Into::into).collect())
    }

    /// Creates a fresh blank-line placeholder key.
    pub fn whitespace() -> Self {
        Key::Hidden(HiddenKey::whitespace())
    }

    /// Creates a fresh comment-line placeholder key.
    pub fn comment() -> Self {
        Key::Hidden(HiddenKey::comment())
    }

    /// Returns `true` for whitespace/comment placeholder keys.
    #[inline]
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        matches!(self, Key::Hidden(_))
    }

    /// If this is a plain name key, returns the name.
    #[inline]
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Loose structural comparison: hidden keys compare by kind only.
    ///
    /// Two separately built trees can never share hidden-key ids, so tree
    /// equality uses this instead of `==`.
    fn same_shape(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::Hidden(HiddenKey::Whitespace(_)), Key::Hidden(HiddenKey::Whitespace(_))) => true,
            (Key::Hidden(HiddenKey::Comment(_)), Key::Hidden(HiddenKey::Comment(_))) => true,
            _ => self == other,
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => write!(f, "{}", name),
            Key::Hidden(hidden) => write!(f, "{}", hidden),
            Key::Compound(parts) => write!(f, "{}", parts.join(".")),
        }
    }
}

/// Simple data types with a direct TOML correspondence.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// If this is a string scalar, returns it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` if this is a string scalar.
    #[inline]
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Scalar::Str(_))
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Str(s) => write!(f, "{}", s),
        }
    }
}

/// A value of type `T` paired with an optional trailing comment.
///
/// "Comment-only" is a distinguished state used for lines inside a
/// multi-line value that consist entirely of a comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Commented<T> {
    value: Option<T>,
    comment: Option<String>,
}

impl<T> Commented<T> {
    pub fn new(value: Option<T>, comment: Option<String>) -> Self {
        Commented { value, comment }
    }

    /// Creates an annotated value without a comment.
    pub fn from_value(value: T) -> Self {
        Commented {
            value: Some(value),
            comment: None,
        }
    }

    /// Creates the comment-only state (no value at all).
    pub fn comment_only(comment: impl Into<String>) -> Self {
        Commented {
            value: None,
            comment: Some(comment.into()),
        }
    }

    /// Returns `true` when there is no value, only a comment.
    #[inline]
    #[must_use]
    pub const fn is_comment_only(&self) -> bool {
        self.value.is_none()
    }

    /// Returns `true` when a comment is attached.
    #[inline]
    #[must_use]
    pub fn has_comment(&self) -> bool {
        self.comment.as_deref().is_some_and(|c| !c.is_empty())
    }

    #[inline]
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the value, or `fallback` in the comment-only state.
    #[must_use]
    pub fn value_or(self, fallback: T) -> T {
        self.value.unwrap_or(fallback)
    }

    /// Applies `f` to the value while keeping the comment.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Commented<U> {
        Commented {
            value: self.value.map(f),
            comment: self.comment,
        }
    }

    /// Promotes a single annotated value to a one-entry [`CommentedList`].
    pub fn into_commented_list(self) -> CommentedList<T> {
        let values = match self.value {
            Some(value) => vec![value],
            None => Vec::new(),
        };
        CommentedList::from(vec![Commented::new(Some(values), self.comment)])
    }
}

impl<T> Default for Commented<T> {
    fn default() -> Self {
        Commented {
            value: None,
            comment: None,
        }
    }
}

/// An ordered sequence of annotated value groups — one entry per physical
/// source line — so that each line's comment survives independently.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentedList<T>(Vec<Commented<Vec<T>>>);

impl<T> CommentedList<T> {
    pub fn new() -> Self {
        CommentedList(Vec::new())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, entry: Commented<Vec<T>>) {
        self.0.push(entry);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Commented<Vec<T>>> {
        self.0.iter()
    }

    /// Inserts one line worth of values (skipped when both the values and
    /// the comment are empty). An out-of-range `index` appends.
    pub fn insert_line(
        &mut self,
        index: usize,
        values: impl IntoIterator<Item = T>,
        comment: Option<String>,
    ) {
        let values: Vec<T> = values.into_iter().collect();
        if !values.is_empty() || comment.is_some() {
            let index = index.min(self.0.len());
            self.0.insert(index, Commented::new(Some(values), comment));
        }
    }
}

impl<T: Clone> CommentedList<T> {
    /// Flattens all line entries into a plain element sequence, dropping the
    /// comments.
    #[must_use]
    pub fn as_list(&self) -> Vec<T> {
        self.0
            .iter()
            .flat_map(|entry| entry.value().into_iter().flatten().cloned())
            .collect()
    }
}

impl<T> From<Vec<Commented<Vec<T>>>> for CommentedList<T> {
    fn from(data: Vec<Commented<Vec<T>>>) -> Self {
        CommentedList(data)
    }
}

impl<T> FromIterator<Commented<Vec<T>>> for CommentedList<T> {
    fn from_iter<I: IntoIterator<Item = Commented<Vec<T>>>>(iter: I) -> Self {
        CommentedList(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for CommentedList<T> {
    type Item = Commented<Vec<T>>;
    type IntoIter = std::vec::IntoIter<Commented<Vec<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Like [`CommentedList`], but each element is a `(key, value)` pair.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentedKV<T>(Vec<Commented<Vec<(String, T)>>>);

impl<T> CommentedKV<T> {
    pub fn new() -> Self {
        CommentedKV(Vec::new())
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Commented<Vec<(String, T)>>> {
        self.0.iter()
    }

    /// Finds the `(line, column)` position of the first pair with the given
    /// key.
    #[must_use]
    pub fn find(&self, key: &str) -> Option<(usize, usize)> {
        for (i, row) in self.0.iter().enumerate() {
            if let Some(pairs) = row.value() {
                for (j, (k, _)) in pairs.iter().enumerate() {
                    if k == key {
                        return Some((i, j));
                    }
                }
            }
        }
        None
    }

    /// Inserts one line worth of pairs (skipped when both the pairs and the
    /// comment are empty). An out-of-range `index` appends.
    pub fn insert_line(
        &mut self,
        index: usize,
        values: impl IntoIterator<Item = (String, T)>,
        comment: Option<String>,
    ) -> &mut Self {
        let values: Vec<(String, T)> = values.into_iter().collect();
        if !values.is_empty() || comment.is_some() {
            let index = index.min(self.0.len());
            self.0.insert(index, Commented::new(Some(values), comment));
        }
        self
    }

    /// Iterates over the comments of every line that has one.
    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|entry| {
            entry
                .comment()
                .filter(|c| !c.is_empty())
        })
    }
}

impl<T: Clone> CommentedKV<T> {
    /// Flattens all lines into plain pairs. Later duplicates win, matching
    /// how an INI parser would interpret repeated keys.
    #[must_use]
    pub fn as_map(&self) -> IndexMap<String, T> {
        let mut out = IndexMap::new();
        for entry in &self.0 {
            if let Some(pairs) = entry.value() {
                for (k, v) in pairs {
                    out.insert(k.clone(), v.clone());
                }
            }
        }
        out
    }
}

impl CommentedKV<Scalar> {
    /// Promotes an option-equivalent value to a section-equivalent
    /// [`IntermediateRepr`], keeping per-line comments attached to the last
    /// key of each line (or as standalone comment entries).
    #[must_use]
    pub fn to_repr(&self) -> IntermediateRepr {
        let mut repr = IntermediateRepr::new();
        for row in &self.0 {
            let mut last: Option<(String, Scalar)> = None;
            if let Some(pairs) = row.value() {
                for (key, value) in pairs {
                    repr.set(Key::name(key.clone()), Item::Scalar(value.clone()));
                    last = Some((key.clone(), value.clone()));
                }
            }
            if row.has_comment() {
                let comment = row.comment().unwrap_or_default().to_string();
                match last {
                    Some((key, value)) => repr.set(
                        Key::name(key),
                        Item::Commented(Commented::new(Some(value), Some(comment))),
                    ),
                    None => repr.set(Key::comment(), Item::Raw(comment)),
                }
            }
        }
        repr
    }
}

impl<T> From<Vec<Commented<Vec<(String, T)>>>> for CommentedKV<T> {
    fn from(data: Vec<Commented<Vec<(String, T)>>>) -> Self {
        CommentedKV(data)
    }
}

impl<T> FromIterator<Commented<Vec<(String, T)>>> for CommentedKV<T> {
    fn from_iter<I: IntoIterator<Item = Commented<Vec<(String, T)>>>>(iter: I) -> Self {
        CommentedKV(iter.into_iter().collect())
    }
}

/// The closed union of every value kind an [`IntermediateRepr`] can hold.
///
/// The serializer matches on this exhaustively, so adding a variant is a
/// compile-time-checked change.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// An unprocessed string: a raw option value, the text of a standalone
    /// comment, or the text of a blank line.
    Raw(String),
    /// An already-coerced plain scalar.
    Scalar(Scalar),
    /// A comment-annotated scalar.
    Commented(Commented<Scalar>),
    /// A comment-annotated list.
    List(CommentedList<Scalar>),
    /// A comment-annotated key-value sequence.
    Pairs(CommentedKV<Scalar>),
    /// A nested document node.
    Table(IntermediateRepr),
    /// A plain sequence of already-collapsed values.
    Array(Vec<Item>),
    /// A plain mapping of already-collapsed values.
    Map(IndexMap<String, Item>),
}

impl Item {
    /// If this item is raw text, returns it.
    #[inline]
    #[must_use]
    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Item::Raw(s) => Some(s),
            _ => None,
        }
    }

    /// If this item is a nested node, returns it.
    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&IntermediateRepr> {
        match self {
            Item::Table(t) => Some(t),
            _ => None,
        }
    }

    /// If this item is a nested node, returns it mutably.
    #[inline]
    #[must_use]
    pub fn as_table_mut(&mut self) -> Option<&mut IntermediateRepr> {
        match self {
            Item::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Returns `true` for non-empty collection values. The collapse engine
    /// uses this to force block tables for nodes holding nested structure.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        match self {
            Item::List(l) => !l.is_empty(),
            Item::Pairs(p) => !p.is_empty(),
            Item::Table(t) => !t.is_empty(),
            Item::Array(a) => !a.is_empty(),
            Item::Map(m) => !m.is_empty(),
            Item::Raw(_) | Item::Scalar(_) | Item::Commented(_) => false,
        }
    }
}

impl From<Scalar> for Item {
    fn from(value: Scalar) -> Self {
        Item::Scalar(value)
    }
}

impl From<Commented<Scalar>> for Item {
    fn from(value: Commented<Scalar>) -> Self {
        Item::Commented(value)
    }
}

impl From<CommentedList<Scalar>> for Item {
    fn from(value: CommentedList<Scalar>) -> Self {
        Item::List(value)
    }
}

impl From<CommentedKV<Scalar>> for Item {
    fn from(value: CommentedKV<Scalar>) -> Self {
        Item::Pairs(value)
    }
}

impl From<IntermediateRepr> for Item {
    fn from(value: IntermediateRepr) -> Self {
        Item::Table(value)
    }
}

/// An ordered, renameable associative tree: the single in-memory
/// representation shared by every stage of the translation.
///
/// Backed by an [`IndexMap`], so every key always has a value and iteration
/// order equals insertion order.
#[derive(Debug, Clone, Default)]
pub struct IntermediateRepr {
    elements: IndexMap<Key, Item>,
    inline_comment: Option<String>,
}

impl IntermediateRepr {
    pub fn new() -> Self {
        IntermediateRepr::default()
    }

    /// Builds a node from `(key, item)` pairs, rejecting duplicate keys.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Key, Item)>) -> Result<Self> {
        let mut repr = IntermediateRepr::new();
        for (key, item) in pairs {
            repr.append(key, item)?;
        }
        Ok(repr)
    }

    /// The comment attached to the node itself (e.g. a comment on the same
    /// line as a section header).
    #[must_use]
    pub fn inline_comment(&self) -> Option<&str> {
        self.inline_comment.as_deref()
    }

    pub fn set_inline_comment(&mut self, comment: impl Into<String>) {
        self.inline_comment = Some(comment.into());
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &Key) -> bool {
        self.elements.contains_key(key)
    }

    #[must_use]
    pub fn get(&self, key: &Key) -> Option<&Item> {
        self.elements.get(key)
    }

    #[must_use]
    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Item> {
        self.elements.get_mut(key)
    }

    /// Convenience lookup by plain name.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&Item> {
        self.elements.get(&Key::name(name))
    }

    /// Finds the position of `key`.
    #[must_use]
    pub fn index_of(&self, key: &Key) -> Option<usize> {
        self.elements.get_index_of(key)
    }

    /// Appends at the end; fails if `key` already exists.
    pub fn append(&mut self, key: Key, item: Item) -> Result<()> {
        if self.elements.contains_key(&key) {
            return Err(Error::duplicate_key(&key));
        }
        self.elements.insert(key, item);
        Ok(())
    }

    /// Inserts or replaces, keeping the existing position on replacement.
    pub fn set(&mut self, key: Key, item: Item) {
        self.elements.insert(key, item);
    }

    /// Inserts at `position`; fails if `key` already exists.
    pub fn insert(&mut self, position: usize, key: Key, item: Item) -> Result<()> {
        if self.elements.contains_key(&key) {
            return Err(Error::duplicate_key(&key));
        }
        let position = position.min(self.elements.len());
        self.elements.shift_insert(position, key, item);
        Ok(())
    }

    /// Renames an existing key without changing its position.
    ///
    /// `new` cannot be already present, and renaming an absent key is an
    /// error unless `ignore_missing` is set.
    pub fn rename(&mut self, old: &Key, new: Key, ignore_missing: bool) -> Result<()> {
        if *old == new {
            return Ok(());
        }
        if self.elements.contains_key(&new) {
            return Err(Error::duplicate_key(&new));
        }
        let index = match self.elements.get_index_of(old) {
            Some(index) => index,
            None if ignore_missing => return Ok(()),
            None => return Err(Error::missing_key(old)),
        };
        if let Some((_, item)) = self.elements.shift_remove_index(index) {
            self.elements.shift_insert(index, new, item);
        }
        Ok(())
    }

    /// Removes `key` from both the element map and the order atomically.
    pub fn remove(&mut self, key: &Key) -> Option<Item> {
        self.elements.shift_remove(key)
    }

    /// Scans `existing` in order, removes every candidate present, and
    /// inserts `item` under `new_key` at the position of the first candidate
    /// found (or at the end when none existed).
    ///
    /// This is how multiple legacy aliases collapse into one canonical field
    /// without disturbing the surrounding layout. Returns the insertion
    /// index.
    pub fn replace_first_remove_others(
        &mut self,
        existing: &[Key],
        new_key: Key,
        item: Item,
    ) -> Result<usize> {
        let first = existing
            .iter()
            .filter_map(|key| self.elements.get_index_of(key))
            .min();
        let index = match first {
            Some(index) => {
                for key in existing {
                    self.elements.shift_remove(key);
                }
                index.min(self.elements.len())
            }
            None => self.elements.len(),
        };
        self.insert(index, new_key, item)?;
        Ok(index)
    }

    /// Looks a value up several levels deep, without requiring the section
    /// to have been split into real nested nodes yet: an exact compound key
    /// is tried first, then plain names are followed through nested tables.
    #[must_use]
    pub fn get_nested(&self, path: &[&str]) -> Option<&Item> {
        let (first, rest) = path.split_first()?;
        if rest.is_empty() {
            return self.get_named(first);
        }
        if let Some(item) = self.elements.get(&Key::compound(path.iter().copied())) {
            return Some(item);
        }
        match self.get_named(first) {
            Some(Item::Table(table)) => table.get_nested(rest),
            _ => None,
        }
    }

    /// Like [`get_nested`](Self::get_nested), with a fallback.
    #[must_use]
    pub fn get_nested_or<'a>(&'a self, path: &[&str], default: &'a Item) -> &'a Item {
        self.get_nested(path).unwrap_or(default)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, Item> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, Key, Item> {
        self.elements.iter_mut()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, Key, Item> {
        self.elements.keys()
    }
}

impl PartialEq for IntermediateRepr {
    /// Structural equality: hidden keys compare by kind, not by unique id,
    /// so two separately parsed trees with the same layout compare equal.
    fn eq(&self, other: &Self) -> bool {
        self.inline_comment == other.inline_comment
            && self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((k1, v1), (k2, v2))| k1.same_shape(k2) && v1 == v2)
    }
}

impl FromIterator<(Key, Item)> for IntermediateRepr {
    /// Collects pairs, later duplicates replacing earlier ones in place.
    fn from_iter<I: IntoIterator<Item = (Key, Item)>>(iter: I) -> Self {
        IntermediateRepr {
            elements: iter.into_iter().collect(),
            inline_comment: None,
        }
    }
}

impl<'a> IntoIterator for &'a IntermediateRepr {
    type Item = (&'a Key, &'a Item);
    type IntoIter = indexmap::map::Iter<'a, Key, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(s: &str) -> Item {
        Item::Raw(s.to_string())
    }

    fn sample() -> IntermediateRepr {
        IntermediateRepr::from_pairs([
            (Key::name("a"), raw("1")),
            (Key::name("b"), raw("2")),
            (Key::name("c"), raw("3")),
        ])
        .unwrap()
    }

    #[test]
    fn test_construction_rejects_duplicates() {
        let result = IntermediateRepr::from_pairs([
            (Key::name("a"), raw("1")),
            (Key::name("a"), raw("2")),
        ]);
        assert!(matches!(result, Err(Error::DuplicateKey { .. })));
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut repr = sample();
        repr.rename(&Key::name("b"), Key::name("renamed"), false).unwrap();

        let keys: Vec<String> = repr.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "renamed", "c"]);
        assert_eq!(repr.index_of(&Key::name("renamed")), Some(1));
        assert_eq!(repr.get_named("renamed"), Some(&raw("2")));
    }

    #[test]
    fn test_rename_to_existing_key_fails() {
        let mut repr = sample();
        let result = repr.rename(&Key::name("a"), Key::name("b"), false);
        assert!(matches!(result, Err(Error::DuplicateKey { .. })));
    }

    #[test]
    fn test_rename_missing_key() {
        let mut repr = sample();
        assert!(repr.rename(&Key::name("zzz"), Key::name("w"), false).is_err());
        assert!(repr.rename(&Key::name("zzz"), Key::name("w"), true).is_ok());
        assert_eq!(repr.len(), 3);
    }

    #[test]
    fn test_insert_at_position() {
        let mut repr = sample();
        repr.insert(1, Key::name("x"), raw("9")).unwrap();

        let keys: Vec<String> = repr.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "x", "b", "c"]);

        let result = repr.insert(0, Key::name("x"), raw("0"));
        assert!(matches!(result, Err(Error::DuplicateKey { .. })));
    }

    #[test]
    fn test_remove_is_atomic() {
        let mut repr = sample();
        assert_eq!(repr.remove(&Key::name("b")), Some(raw("2")));
        assert_eq!(repr.len(), 2);
        assert_eq!(repr.index_of(&Key::name("c")), Some(1));
        assert_eq!(repr.remove(&Key::name("b")), None);
    }

    #[test]
    fn test_replace_first_remove_others_merge_first_wins() {
        // Tree contains `b` and `c` but not `a`: `x` must land at `b`'s
        // former index and `c` must be gone.
        let mut repr = sample();
        let candidates = [Key::name("zzz"), Key::name("b"), Key::name("c")];
        let index = repr
            .replace_first_remove_others(&candidates, Key::name("x"), raw("v"))
            .unwrap();

        assert_eq!(index, 1);
        let keys: Vec<String> = repr.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["a", "x"]);
        assert_eq!(repr.get_named("x"), Some(&raw("v")));
    }

    #[test]
    fn test_replace_first_remove_others_appends_when_absent() {
        let mut repr = sample();
        let index = repr
            .replace_first_remove_others(&[Key::name("nope")], Key::name("x"), raw("v"))
            .unwrap();
        assert_eq!(index, 3);
        assert_eq!(repr.index_of(&Key::name("x")), Some(3));
    }

    #[test]
    fn test_get_nested() {
        let inner = IntermediateRepr::from_pairs([(Key::name("leaf"), raw("v"))]).unwrap();
        let mut repr = sample();
        repr.append(Key::name("table"), Item::Table(inner)).unwrap();
        repr.append(Key::compound(["x", "y"]), raw("compound")).unwrap();

        assert_eq!(repr.get_nested(&["a"]), Some(&raw("1")));
        assert_eq!(repr.get_nested(&["table", "leaf"]), Some(&raw("v")));
        assert_eq!(repr.get_nested(&["x", "y"]), Some(&raw("compound")));
        assert_eq!(repr.get_nested(&["table", "nope"]), None);

        let fallback = raw("fallback");
        assert_eq!(repr.get_nested_or(&["nope"], &fallback), &fallback);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = sample();
        let mut copy = original.clone();
        copy.set(Key::name("a"), raw("changed"));
        assert_eq!(original.get_named("a"), Some(&raw("1")));
    }

    #[test]
    fn test_structural_equality_ignores_hidden_ids() {
        let a = IntermediateRepr::from_pairs([
            (Key::comment(), raw("note")),
            (Key::name("k"), raw("v")),
        ])
        .unwrap();
        let b = IntermediateRepr::from_pairs([
            (Key::comment(), raw("note")),
            (Key::name("k"), raw("v")),
        ])
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_hidden_keys_are_unique() {
        assert_ne!(Key::whitespace(), Key::whitespace());
        assert_ne!(Key::comment(), Key::comment());
    }

    #[test]
    fn test_commented_basics() {
        let c: Commented<Scalar> = Commented::comment_only("just a note");
        assert!(c.is_comment_only());
        assert!(c.has_comment());
        assert_eq!(c.value_or(Scalar::from("fallback")), Scalar::from("fallback"));

        let c = Commented::from_value(Scalar::from(42i64));
        assert!(!c.is_comment_only());
        assert!(!c.has_comment());
    }

    #[test]
    fn test_commented_into_list() {
        let list = Commented::new(Some(Scalar::from("v")), Some("c".into())).into_commented_list();
        assert_eq!(list.len(), 1);
        assert_eq!(list.as_list(), vec![Scalar::from("v")]);
        assert_eq!(list.iter().next().unwrap().comment(), Some("c"));
    }

    #[test]
    fn test_commented_list_as_list_spans_lines() {
        let list: CommentedList<Scalar> = CommentedList::from(vec![
            Commented::new(Some(vec![Scalar::from("a"), Scalar::from("b")]), None),
            Commented::comment_only("skip me"),
            Commented::new(Some(vec![Scalar::from("c")]), None),
        ]);
        assert_eq!(
            list.as_list(),
            vec![Scalar::from("a"), Scalar::from("b"), Scalar::from("c")]
        );
    }

    #[test]
    fn test_insert_line_clamps_out_of_range_index() {
        let mut list: CommentedList<Scalar> = CommentedList::new();
        list.insert_line(5, [Scalar::from("a")], None);
        list.insert_line(99, [Scalar::from("b")], Some("note".into()));
        assert_eq!(list.len(), 2);
        assert_eq!(list.as_list(), vec![Scalar::from("a"), Scalar::from("b")]);

        let mut kv: CommentedKV<Scalar> = CommentedKV::new();
        kv.insert_line(7, [("k".to_string(), Scalar::from("v"))], None);
        assert_eq!(kv.find("k"), Some((0, 0)));
    }

    #[test]
    fn test_commented_kv_find_and_map() {
        let kv: CommentedKV<Scalar> = CommentedKV::from(vec![
            Commented::new(Some(vec![("a".to_string(), Scalar::from("1"))]), None),
            Commented::new(
                Some(vec![
                    ("b".to_string(), Scalar::from("2")),
                    ("a".to_string(), Scalar::from("override")),
                ]),
                Some("hi".into()),
            ),
        ]);

        assert_eq!(kv.find("b"), Some((1, 0)));
        assert_eq!(kv.find("nope"), None);

        let map = kv.as_map();
        assert_eq!(map.get("a"), Some(&Scalar::from("override")));
        assert_eq!(kv.comments().collect::<Vec<_>>(), vec!["hi"]);
    }

    #[test]
    fn test_commented_kv_to_repr() {
        let kv: CommentedKV<Scalar> = CommentedKV::from(vec![
            Commented::new(Some(vec![("a".to_string(), Scalar::from("1"))]), None),
            Commented::new(
                Some(vec![("b".to_string(), Scalar::from("2"))]),
                Some("hi".into()),
            ),
        ]);
        let repr = kv.to_repr();
        assert_eq!(repr.len(), 2);
        assert_eq!(repr.get_named("a"), Some(&Item::Scalar(Scalar::from("1"))));
        match repr.get_named("b") {
            Some(Item::Commented(c)) => {
                assert_eq!(c.value(), Some(&Scalar::from("2")));
                assert_eq!(c.comment(), Some("hi"));
            }
            other => panic!("unexpected item: {:?}", other),
        }
    }
}
