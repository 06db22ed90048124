//! Three-way merge rules for trees and file contents.

/// What to do with one path during a three-way tree merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Resolution {
    /// Keep our side (blob id, or `None` for "stays deleted").
    Ours(Option<String>),
    /// Take their side.
    Theirs(Option<String>),
    /// Both sides changed the content; merge the text.
    Content,
    /// One side modified what the other deleted.
    ModifyDelete,
}

/// Decides a path from its blob ids in the base, ours and theirs trees.
pub(super) fn resolve_path(
    base: Option<&str>,
    ours: Option<&str>,
    theirs: Option<&str>,
) -> Resolution {
    if ours == theirs || base == theirs {
        return Resolution::Ours(ours.map(String::from));
    }
    if base == ours {
        return Resolution::Theirs(theirs.map(String::from));
    }
    if ours.is_none() || theirs.is_none() {
        return Resolution::ModifyDelete;
    }
    Resolution::Content
}

/// Result of merging two versions of a text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct TextMerge {
    pub text: String,
    pub conflicted: bool,
}

/// Line-level three-way merge.
///
/// When base, ours and theirs have the same number of lines, each line is
/// merged on its own and only lines changed on both sides conflict.
/// Otherwise the whole file is one conflict block.
pub(super) fn merge_text(base: &str, ours: &str, theirs: &str, label: &str) -> TextMerge {
    let base_lines: Vec<&str> = base.split_inclusive('\n').collect();
    let our_lines: Vec<&str> = ours.split_inclusive('\n').collect();
    let their_lines: Vec<&str> = theirs.split_inclusive('\n').collect();

    if base_lines.len() != our_lines.len() || base_lines.len() != their_lines.len() {
        let mut text = String::new();
        push_conflict(&mut text, &our_lines, &their_lines, label);
        return TextMerge {
            text,
            conflicted: true,
        };
    }

    let mut text = String::new();
    let mut conflicted = false;
    let mut pending_ours: Vec<&str> = Vec::new();
    let mut pending_theirs: Vec<&str> = Vec::new();

    for ((b, o), t) in base_lines.iter().zip(&our_lines).zip(&their_lines) {
        let merged = if o == t || b == t {
            Some(*o)
        } else if b == o {
            Some(*t)
        } else {
            None
        };
        match merged {
            Some(line) => {
                if !pending_ours.is_empty() {
                    push_conflict(&mut text, &pending_ours, &pending_theirs, label);
                    pending_ours.clear();
                    pending_theirs.clear();
                }
                text.push_str(line);
            }
            None => {
                conflicted = true;
                pending_ours.push(o);
                pending_theirs.push(t);
            }
        }
    }
    if !pending_ours.is_empty() {
        push_conflict(&mut text, &pending_ours, &pending_theirs, label);
    }

    TextMerge { text, conflicted }
}

fn push_conflict(out: &mut String, ours: &[&str], theirs: &[&str], label: &str) {
    out.push_str("<<<<<<< HEAD\n");
    push_lines(out, ours);
    out.push_str("=======\n");
    push_lines(out, theirs);
    out.push_str(">>>>>>> ");
    out.push_str(label);
    out.push('\n');
}

fn push_lines(out: &mut String, lines: &[&str]) {
    for line in lines {
        out.push_str(line);
        if !line.ends_with('\n') {
            out.push('\n');
        }
    }
}

/// True when the text carries all three conflict markers.
pub fn has_conflict_markers(text: &str) -> bool {
    text.contains("<<<<<<<") && text.contains("=======") && text.contains(">>>>>>>")
}
