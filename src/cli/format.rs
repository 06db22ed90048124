//! Output formatting for CLI display.

use crate::hints::split_hint;
use crate::mission::{RitualCommit, RitualState};
use crate::model::{ActivityConfig, Mission, ValidationResult};

/// Engine output with its hint block lifted out into a tip.
pub(super) fn format_output(output: &str) -> String {
    match split_hint(output) {
        (body, None) => body.to_string(),
        (body, Some(hint)) => {
            let tip = indent(hint);
            if body.is_empty() {
                format!("Tip:\n{tip}")
            } else {
                format!("{body}\n\nTip:\n{tip}")
            }
        }
    }
}

pub(super) fn format_mission(mission: &Mission, result: &ValidationResult) -> String {
    let mark = if result.ok { "[x]" } else { "[ ]" };
    let mut out = format!("{mark} {}\n{}", mission.title, indent(&mission.description));
    if result.ok {
        if let Some(message) = &result.message {
            out.push('\n');
            out.push_str(&indent(message));
        }
    } else {
        for error in &result.errors {
            out.push_str(&format!("\n    - {error}"));
        }
        if let Some(hint) = &mission.hint {
            out.push_str(&format!("\n    hint: {hint}"));
        }
    }
    out
}

pub(super) fn format_ritual(state: &RitualState, commits: &[RitualCommit]) -> String {
    let status = match state {
        RitualState::NoBranch => "no rescue branch yet".to_string(),
        RitualState::Gathering { missing } => format!("missing {}", missing.join(", ")),
        RitualState::Complete => "complete".to_string(),
    };
    let mut out = format!("Ritual: {status}");
    for c in commits {
        out.push_str(&format!("\n    {} {}  ({})", c.short_id, c.message, c.branch));
    }
    out
}

pub(super) fn format_activity(activity: &ActivityConfig, current: bool) -> String {
    let marker = if current { "*" } else { " " };
    format!("{marker} {:<8} {}", activity.id, activity.title)
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| format!("    {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hints::append_hint;

    fn mission() -> Mission {
        Mission {
            id: "m1".to_string(),
            title: "First commit".to_string(),
            description: "Commit index.html".to_string(),
            validator_key: "m1".to_string(),
            hint: Some("git add first".to_string()),
        }
    }

    #[test]
    fn hint_becomes_a_tip() {
        let out = append_hint("Initialized.", "A hint.");
        assert_eq!(format_output(&out), "Initialized.\n\nTip:\n    A hint.");
        assert_eq!(format_output("plain"), "plain");
        assert!(!format_output(&out).contains("[[HINT"));
    }

    #[test]
    fn failing_mission_lists_errors_and_hint() {
        let result = ValidationResult::fail("No commits yet.");
        assert_eq!(
            format_mission(&mission(), &result),
            "[ ] First commit\n    Commit index.html\n    - No commits yet.\n    hint: git add first"
        );
    }

    #[test]
    fn passing_mission_hides_the_hint() {
        let out = format_mission(&mission(), &ValidationResult::pass_with("Nice."));
        assert_eq!(out, "[x] First commit\n    Commit index.html\n    Nice.");
    }

    #[test]
    fn ritual_lists_commits() {
        let commits = [RitualCommit {
            short_id: "abc1234".to_string(),
            message: "clue:1".to_string(),
            branch: "rescue/chihiro".to_string(),
        }];
        let state = RitualState::Gathering {
            missing: vec!["clue:2".to_string(), "clue:3".to_string()],
        };
        assert_eq!(
            format_ritual(&state, &commits),
            "Ritual: missing clue:2, clue:3\n    abc1234 clue:1  (rescue/chihiro)"
        );
    }
}
