//! Profile-independent cleanup tasks, registered as default-active
//! augmentations so users can switch each one off individually.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::profile::ProfileAugmentation;
use crate::translator::Translator;
use crate::Result;

static NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n?").expect("newline regex"));

/// Registers all cleanup tasks on `translator`.
pub fn activate(translator: &mut Translator) -> Result<()> {
    translator.augment_profiles(ProfileAugmentation::new(
        "normalise_newlines",
        "convert Windows/Mac line endings to Unix ones before parsing",
        true,
        |profile| profile.add_pre_processor(normalise_newlines),
    ))?;
    translator.augment_profiles(ProfileAugmentation::new(
        "remove_empty_table_headers",
        "drop TOML table headers with no entries underneath",
        true,
        |profile| profile.add_post_processor(remove_empty_table_headers),
    ))?;
    translator.augment_profiles(ProfileAugmentation::new(
        "ensure_terminating_newlines",
        "make sure the output ends with exactly one newline",
        true,
        |profile| profile.add_post_processor(ensure_terminating_newlines),
    ))?;
    Ok(())
}

/// Replaces `\r\n` and bare `\r` with `\n`.
#[must_use]
pub fn normalise_newlines(text: String) -> String {
    NEWLINES.replace_all(&text, "\n").into_owned()
}

/// Removes `[header]` lines with nothing but blank lines before the next
/// header (or the end of the document).
///
/// Dropping a header can make its parent empty in turn, so the scan repeats
/// until a fixpoint. Headers carrying an inline comment are kept: the
/// comment is information the user wrote.
#[must_use]
pub fn remove_empty_table_headers(text: String) -> String {
    let had_final_newline = text.ends_with('\n');
    let mut lines: Vec<&str> = text.lines().collect();

    let mut changed = true;
    while changed {
        changed = false;
        let mut index = 0;
        while index < lines.len() {
            if is_plain_header(lines[index]) {
                let mut next = index + 1;
                while next < lines.len() && lines[next].trim().is_empty() {
                    next += 1;
                }
                if next >= lines.len() || is_header(lines[next]) {
                    // Drop the header and the blank run that followed it.
                    lines.drain(index..next);
                    changed = true;
                    continue;
                }
            }
            index += 1;
        }
    }

    let mut out = lines.join("\n");
    if had_final_newline && !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Strips trailing blank lines, leaving exactly one final newline.
#[must_use]
pub fn ensure_terminating_newlines(text: String) -> String {
    let mut out = text.trim_end_matches('\n').to_string();
    out.push('\n');
    out
}

fn is_header(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('[') && trimmed.contains(']')
}

fn is_plain_header(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('[') && !trimmed.starts_with("[[") && trimmed.ends_with(']')
}
