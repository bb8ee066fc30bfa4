//! Serializer: collapses an [`IntermediateRepr`] tree into TOML text.
//!
//! Collapsing happens in two phases. First every [`Item`] is lowered into a
//! small TOML document model ([`Node`] / [`TomlTable`]) where all layout
//! decisions have already been taken: inline vs block tables, single-line vs
//! multi-line arrays, dotted keys vs nested sections. Then the document model
//! is rendered to text in one pass.
//!
//! ## Layout heuristics
//!
//! The decisions are deterministic and only depend on the value itself:
//!
//! - a [`CommentedList`] becomes a multi-line array iff it holds more than
//!   one line entry; its per-line comments are re-emitted next to the
//!   elements of that line
//! - a [`CommentedKV`] becomes a block sub-table iff it holds more than one
//!   line entry, otherwise an inline table
//! - a plain map becomes a block table when any of its values is a non-empty
//!   collection, or when its inline rendering would reach [`LONG`]
//! - a plain list of maps becomes an array of tables when any element holds
//!   nested structure or too many elements render long
//! - a compound key is emitted as a dotted key only for short, flat,
//!   single-line values; anything else is restructured into nested sections
//!
//! Comments and blank lines recorded as hidden keys are re-emitted at the
//! position their key occupies in the tree.

use crate::repr::{
    Commented, CommentedKV, CommentedList, IntermediateRepr, Item, Key, Scalar,
};
use crate::{Error, Result};

/// A rendered line at or beyond this width is considered too long to stay
/// inline.
pub const LONG: usize = 120;

/// An array-of-tables element rendered longer than this counts as "long".
pub const INLINE_TABLE_LONG_ELEM: usize = 10;

/// More long elements than this force the array-of-tables representation.
pub const MAX_INLINE_TABLE_LONG_ELEM: usize = 5;

const INDENT: &str = "    ";

/// A value in the TOML document model, after all layout decisions.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Scalar(Scalar),
    Array(ArrayNode),
    InlineTable(Vec<(String, Node)>),
    Table(TomlTable),
    ArrayOfTables(Vec<TomlTable>),
}

#[derive(Debug, Clone, PartialEq)]
struct ArrayNode {
    lines: Vec<ArrayLine>,
    multiline: bool,
}

/// One physical line of a multi-line array (or the single line of an inline
/// one).
#[derive(Debug, Clone, PartialEq)]
struct ArrayLine {
    values: Vec<Node>,
    comment: Option<String>,
}

/// An entry in a table body, in emission order.
#[derive(Debug, Clone, PartialEq)]
enum TableEntry {
    KeyValue {
        key: Vec<String>,
        value: Node,
        comment: Option<String>,
    },
    Comment(String),
    Blank,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct TomlTable {
    body: Vec<TableEntry>,
    inline_comment: Option<String>,
    /// Synthesized while restructuring a compound key. Implicit tables whose
    /// body holds nothing but sub-tables are rendered without a header.
    implicit: bool,
}

/// Serializes the whole tree to TOML text, ending with exactly one newline.
pub fn convert(repr: &IntermediateRepr) -> Result<String> {
    let root = collapse_table(repr)?;
    let mut out = String::new();
    render_table(&root, &[], &mut out)?;
    let mut text = out.trim_end().to_string();
    text.push('\n');
    Ok(text)
}

fn collapse_table(repr: &IntermediateRepr) -> Result<TomlTable> {
    let mut table = TomlTable {
        body: Vec::new(),
        inline_comment: repr.inline_comment().map(str::to_string),
        implicit: false,
    };
    for (key, item) in repr {
        match key {
            Key::Hidden(hidden) => {
                if hidden.is_comment() {
                    let text = item
                        .as_raw()
                        .ok_or_else(|| Error::invalid_key(key))?;
                    table.body.push(TableEntry::Comment(text.to_string()));
                } else {
                    table.body.push(TableEntry::Blank);
                }
            }
            Key::Name(name) => {
                collapse_entry(&mut table, vec![name.clone()], item)?;
            }
            Key::Compound(parts) => {
                collapse_compound(&mut table, parts, item)?;
            }
        }
    }
    Ok(table)
}

fn collapse_entry(table: &mut TomlTable, key: Vec<String>, item: &Item) -> Result<()> {
    // Comment-only values degrade to a standalone comment at this position.
    if let Item::Commented(c) = item {
        if c.is_comment_only() {
            table
                .body
                .push(TableEntry::Comment(c.comment().unwrap_or("").to_string()));
            return Ok(());
        }
    }
    let (value, comment) = collapse_item(item)?;
    push_entry(table, key, value, comment);
    Ok(())
}

/// Lowers one item into a node plus the comment to hang off its entry.
fn collapse_item(item: &Item) -> Result<(Node, Option<String>)> {
    match item {
        Item::Raw(text) => Ok((Node::Scalar(Scalar::Str(text.clone())), None)),
        Item::Scalar(scalar) => Ok((Node::Scalar(scalar.clone()), None)),
        Item::Commented(commented) => Ok(collapse_commented(commented)),
        Item::List(list) => Ok(collapse_list(list)?),
        Item::Pairs(pairs) => collapse_pairs(pairs),
        Item::Table(repr) => Ok((Node::Table(collapse_table(repr)?), None)),
        Item::Array(items) => collapse_array(items),
        Item::Map(map) => {
            let mut pairs = Vec::with_capacity(map.len());
            for (key, value) in map {
                let (node, _) = collapse_item(value)?;
                pairs.push((key.clone(), node));
            }
            // Kind decides, not emptiness: an empty nested table still has
            // no inline rendering.
            if map.values().any(is_structured) {
                return Ok((Node::Table(inline_pairs_to_table(pairs)), None));
            }
            let inline = Node::InlineTable(pairs);
            if render_inline(&inline)?.len() >= LONG {
                if let Node::InlineTable(pairs) = inline {
                    return Ok((Node::Table(inline_pairs_to_table(pairs)), None));
                }
            }
            Ok((inline, None))
        }
    }
}

fn collapse_commented(commented: &Commented<Scalar>) -> (Node, Option<String>) {
    let value = commented
        .value()
        .cloned()
        .unwrap_or_else(|| Scalar::Str(String::new()));
    (
        Node::Scalar(value),
        commented.comment().map(str::to_string),
    )
}

/// A list stays on one line iff it came from a single source line; the
/// comment of that line moves onto the entry.
fn collapse_list(list: &CommentedList<Scalar>) -> Result<(Node, Option<String>)> {
    let multiline = list.len() > 1;
    let mut lines = Vec::with_capacity(list.len());
    for entry in list.iter() {
        lines.push(ArrayLine {
            values: entry
                .value()
                .into_iter()
                .flatten()
                .map(|scalar| Node::Scalar(scalar.clone()))
                .collect(),
            comment: entry.comment().map(str::to_string),
        });
    }
    if !multiline {
        let comment = lines.first().and_then(|line| line.comment.clone());
        let values = lines.into_iter().flat_map(|line| line.values).collect();
        return Ok((
            Node::Array(ArrayNode {
                lines: vec![ArrayLine {
                    values,
                    comment: None,
                }],
                multiline: false,
            }),
            comment,
        ));
    }
    Ok((Node::Array(ArrayNode { lines, multiline }), None))
}

/// A key-value sequence becomes a block sub-table iff it spans more than one
/// line entry; a single line stays an inline table.
fn collapse_pairs(pairs: &CommentedKV<Scalar>) -> Result<(Node, Option<String>)> {
    if pairs.len() > 1 {
        return Ok((Node::Table(collapse_table(&pairs.to_repr())?), None));
    }
    let line = pairs.iter().next();
    let inline = line
        .and_then(|entry| entry.value())
        .map(|values| {
            values
                .iter()
                .map(|(key, scalar)| (key.clone(), Node::Scalar(scalar.clone())))
                .collect()
        })
        .unwrap_or_default();
    let comment = line.and_then(|entry| entry.comment()).map(str::to_string);
    Ok((Node::InlineTable(inline), comment))
}

fn collapse_array(items: &[Item]) -> Result<(Node, Option<String>)> {
    let all_maps = !items.is_empty()
        && items
            .iter()
            .all(|item| matches!(item, Item::Map(_) | Item::Table(_) | Item::Pairs(_)));
    if all_maps && should_use_aot(items)? {
        let mut tables = Vec::with_capacity(items.len());
        for item in items {
            tables.push(match collapse_item(item)? {
                (Node::Table(table), _) => table,
                (Node::InlineTable(pairs), _) => inline_pairs_to_table(pairs),
                (other, _) => {
                    return Err(Error::invalid_key(format!(
                        "array-of-tables element collapsed to {:?}",
                        other
                    )))
                }
            });
        }
        return Ok((Node::ArrayOfTables(tables), None));
    }

    let mut values = Vec::with_capacity(items.len());
    for item in items {
        let (node, _) = collapse_item(item)?;
        values.push(node);
    }
    let mut node = Node::Array(ArrayNode {
        lines: vec![ArrayLine {
            values,
            comment: None,
        }],
        multiline: false,
    });
    let rendered = render_inline(&node)?;
    if rendered.len() >= LONG || rendered.contains('\n') {
        if let Node::Array(array) = &mut node {
            array.multiline = true;
            let values = std::mem::take(&mut array.lines[0].values);
            array.lines = values
                .into_iter()
                .map(|value| ArrayLine {
                    values: vec![value],
                    comment: None,
                })
                .collect();
        }
    }
    Ok((node, None))
}

fn should_use_aot(items: &[Item]) -> Result<bool> {
    let mut long = 0usize;
    for item in items {
        let nested = match item {
            Item::Map(map) => map.values().any(is_structured),
            Item::Table(repr) => repr.iter().any(|(_, item)| is_structured(item)),
            Item::Pairs(pairs) => pairs.len() > 1,
            _ => false,
        };
        if nested {
            return Ok(true);
        }
        let (node, _) = collapse_item(item)?;
        if node_is_inline(&node) && render_inline(&node)?.len() > INLINE_TABLE_LONG_ELEM {
            long += 1;
        }
    }
    Ok(long > MAX_INLINE_TABLE_LONG_ELEM)
}

fn inline_pairs_to_table(pairs: Vec<(String, Node)>) -> TomlTable {
    TomlTable {
        body: pairs
            .into_iter()
            .map(|(key, value)| TableEntry::KeyValue {
                key: vec![key],
                value,
                comment: None,
            })
            .collect(),
        inline_comment: None,
        implicit: false,
    }
}

/// A compound key renders dotted only for short, flat, single-line values;
/// otherwise the value is pushed down into nested tables.
fn collapse_compound(table: &mut TomlTable, parts: &[String], item: &Item) -> Result<()> {
    if parts.is_empty() {
        return Err(Error::invalid_key("empty compound key"));
    }
    if parts.len() == 1 {
        return collapse_entry(table, vec![parts[0].clone()], item);
    }

    if let Item::Commented(c) = item {
        if c.is_comment_only() {
            table
                .body
                .push(TableEntry::Comment(c.comment().unwrap_or("").to_string()));
            return Ok(());
        }
    }
    let (value, comment) = collapse_item(item)?;

    if node_is_inline(&value) {
        let rendered = render_inline(&value)?;
        let dotted_fits = !rendered.contains('\n')
            && render_key_path(parts).len() + 3 + rendered.len() < LONG
            && rendered.matches('=').count() <= 1
            && !has_nested_inline_table(&value);
        if dotted_fits {
            push_entry(table, parts.to_vec(), value, comment);
            return Ok(());
        }
    }

    // Build the chain bottom-up, then merge the head into the body.
    let mut node = value;
    let mut comment = comment;
    let mut key = parts[parts.len() - 1].clone();
    for part in parts[..parts.len() - 1].iter().rev().cloned() {
        let mut inner = TomlTable {
            implicit: true,
            ..TomlTable::default()
        };
        push_entry(&mut inner, vec![key], node, comment.take());
        node = Node::Table(inner);
        key = part;
    }
    push_entry(table, vec![key], node, comment);
    Ok(())
}

fn has_nested_inline_table(node: &Node) -> bool {
    match node {
        Node::InlineTable(pairs) => pairs
            .iter()
            .any(|(_, value)| matches!(value, Node::InlineTable(_))),
        _ => false,
    }
}

/// Adds an entry, merging table values into an existing sub-table of the
/// same name instead of duplicating the header.
fn push_entry(table: &mut TomlTable, key: Vec<String>, value: Node, comment: Option<String>) {
    if let Node::Table(new) = &value {
        for entry in table.body.iter_mut() {
            if let TableEntry::KeyValue {
                key: existing_key,
                value: Node::Table(existing),
                ..
            } = entry
            {
                if *existing_key == key {
                    existing.body.extend(new.body.iter().cloned());
                    return;
                }
            }
        }
    }
    table.body.push(TableEntry::KeyValue {
        key,
        value,
        comment,
    });
}

const fn node_is_inline(node: &Node) -> bool {
    !matches!(node, Node::Table(_) | Node::ArrayOfTables(_))
}

const fn is_structured(item: &Item) -> bool {
    matches!(
        item,
        Item::List(_) | Item::Pairs(_) | Item::Table(_) | Item::Array(_) | Item::Map(_)
    )
}

fn is_nested_entry(entry: &TableEntry) -> bool {
    matches!(
        entry,
        TableEntry::KeyValue {
            value: Node::Table(_) | Node::ArrayOfTables(_),
            ..
        }
    )
}

// ---------------------------------------------------------------------------
// Rendering

fn render_table(table: &TomlTable, path: &[String], out: &mut String) -> Result<()> {
    render_table_at(table, path, true, out)
}

fn render_table_at(
    table: &TomlTable,
    path: &[String],
    emit_header: bool,
    out: &mut String,
) -> Result<()> {
    let headerless = table.implicit && table.body.iter().all(is_nested_entry);
    if emit_header && !path.is_empty() && !headerless {
        out.push('[');
        out.push_str(&render_key_path_parts(path));
        out.push(']');
        if let Some(comment) = &table.inline_comment {
            push_comment(out, comment);
        }
        out.push('\n');
    }

    // Key-values must precede sub-table headers within a section.
    let (nested, inline): (Vec<_>, Vec<_>) =
        table.body.iter().partition(|entry| is_nested_entry(entry));

    for entry in inline {
        match entry {
            TableEntry::Blank => out.push('\n'),
            TableEntry::Comment(text) => {
                if text.is_empty() {
                    out.push('#');
                } else {
                    out.push_str("# ");
                    out.push_str(text);
                }
                out.push('\n');
            }
            TableEntry::KeyValue {
                key,
                value,
                comment,
            } => {
                out.push_str(&render_key_path(key));
                out.push_str(" = ");
                render_value(value, out)?;
                if let Some(comment) = comment {
                    push_comment(out, comment);
                }
                out.push('\n');
            }
        }
    }

    for entry in nested {
        if let TableEntry::KeyValue { key, value, .. } = entry {
            let child_path: Vec<String> = path.iter().chain(key.iter()).cloned().collect();
            match value {
                Node::Table(child) => render_table(child, &child_path, out)?,
                Node::ArrayOfTables(tables) => {
                    for child in tables {
                        out.push_str("[[");
                        out.push_str(&render_key_path_parts(&child_path));
                        out.push_str("]]\n");
                        render_table_at(child, &child_path, false, out)?;
                    }
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn render_value(node: &Node, out: &mut String) -> Result<()> {
    match node {
        Node::Array(array) if array.multiline => render_multiline_array(array, out),
        _ => {
            out.push_str(&render_inline(node)?);
            Ok(())
        }
    }
}

fn render_multiline_array(array: &ArrayNode, out: &mut String) -> Result<()> {
    out.push('[');
    out.push('\n');
    for line in &array.lines {
        out.push_str(INDENT);
        if line.values.is_empty() {
            if let Some(comment) = &line.comment {
                if comment.is_empty() {
                    out.push('#');
                } else {
                    out.push_str("# ");
                    out.push_str(comment);
                }
            }
        } else {
            let rendered: Result<Vec<String>> =
                line.values.iter().map(render_inline).collect();
            out.push_str(&rendered?.join(", "));
            out.push(',');
            if let Some(comment) = &line.comment {
                push_comment(out, comment);
            }
        }
        out.push('\n');
    }
    out.push(']');
    Ok(())
}

fn render_inline(node: &Node) -> Result<String> {
    match node {
        Node::Scalar(scalar) => Ok(render_scalar(scalar)),
        Node::Array(array) => {
            let values: Result<Vec<String>> = array
                .lines
                .iter()
                .flat_map(|line| line.values.iter())
                .map(render_inline)
                .collect();
            Ok(format!("[{}]", values?.join(", ")))
        }
        Node::InlineTable(pairs) => {
            let rendered: Result<Vec<String>> = pairs
                .iter()
                .map(|(key, value)| Ok(format!("{} = {}", render_key(key), render_inline(value)?)))
                .collect();
            Ok(format!("{{{}}}", rendered?.join(", ")))
        }
        Node::Table(_) | Node::ArrayOfTables(_) => Err(Error::invalid_key(
            "block table cannot be rendered inline",
        )),
    }
}

fn render_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(x) => render_float(*x),
        Scalar::Str(s) => render_string(s),
    }
}

/// Floats always carry a decimal point (or the `inf`/`nan` keywords), so the
/// value reads back as a float.
fn render_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    let rendered = x.to_string();
    if rendered.contains('.') {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

fn render_string(s: &str) -> String {
    if s.contains('\n') {
        let escaped = s.replace('\\', "\\\\").replace("\"\"\"", "\\\"\\\"\\\"");
        return format!("\"\"\"\n{}\"\"\"", escaped);
    }
    if (s.contains('"') || s.contains('\\'))
        && !s.contains('\'')
        && !s.chars().any(char::is_control)
    {
        return format!("'{}'", s);
    }
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn render_key(key: &str) -> String {
    if is_bare_key(key) {
        key.to_string()
    } else {
        render_string(key)
    }
}

fn render_key_path(parts: &[String]) -> String {
    render_key_path_parts(parts)
}

fn render_key_path_parts(parts: &[String]) -> String {
    parts
        .iter()
        .map(|part| render_key(part))
        .collect::<Vec<_>>()
        .join(".")
}

fn push_comment(out: &mut String, comment: &str) {
    if comment.is_empty() {
        out.push_str(" #");
    } else {
        out.push_str(" # ");
        out.push_str(comment);
    }
}
