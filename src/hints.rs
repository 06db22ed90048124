//! One-time educational hints appended to a command's output.
//!
//! A hint block is wrapped in sentinel markers so the presentation can lift
//! it out of the output. Each command key gets its hint once per session;
//! the hint text itself may depend on how the command was used.

use crate::command::Command;

pub const HINT_START: &str = "[[HINT_START]]";
pub const HINT_END: &str = "[[HINT_END]]";

/// The hint for a command that just succeeded, if it has one.
///
/// `found_conflicts` refines the `git conflicts` hint.
pub fn hint_for(command: &Command, found_conflicts: bool) -> Option<&'static str> {
    let text = match command {
        Command::Init => {
            "git init creates the hidden .git folder where every commit, branch and \
             setting of the repository lives."
        }
        Command::Status => {
            "git status is your dashboard: staged changes go into the next commit, \
             unstaged and untracked ones do not."
        }
        Command::Add { .. } | Command::AddAll => {
            "git add copies the current content of a file into the staging area. \
             Changes made after adding must be added again."
        }
        Command::Commit { .. } => {
            "A commit is a snapshot of the staging area plus a message. Good messages \
             say what changed and why."
        }
        Command::Log { .. } => {
            "git log shows history newest first. The first 7 characters of an id are \
             enough to refer to a commit."
        }
        Command::BranchList => {
            "The * marks the branch you are on. A branch is just a movable name \
             pointing at a commit."
        }
        Command::BranchCreate { .. } => {
            "git branch creates the name but does not switch to it. Use git checkout \
             <name> to move there, or git checkout -b <name> to do both."
        }
        Command::Checkout { .. } | Command::CheckoutB { .. } => {
            "git checkout moves HEAD to another branch and updates your files to match \
             its latest commit."
        }
        Command::CheckoutCommit { .. } => {
            "In detached HEAD you can look around freely. Commits made here belong to \
             no branch until you create one."
        }
        Command::Merge { .. } => {
            "A fast-forward just moves the branch pointer. When both sides have new \
             commits, git records a merge commit with two parents."
        }
        Command::Conflicts if found_conflicts => {
            "Keep the lines you want, delete every <<<<<<< ======= >>>>>>> marker, \
             then git add the file and commit."
        }
        Command::Conflicts => {
            "git conflicts lists files that still contain conflict markers after a merge."
        }
        Command::Push { .. } => {
            "git push sends the history of a branch to the remote so others can see it."
        }
        Command::Pull { .. } => {
            "git pull brings commits from the remote into your branch. Pull before you \
             start working to avoid surprises."
        }
        Command::Clone { .. } => {
            "git clone copies a remote repository and sets it up as origin for you."
        }
        Command::RemoteAdd { .. } => {
            "A remote is a named URL. By convention the main one is called origin."
        }
        Command::RemoteRemove { .. } => {
            "Removing a remote only forgets its name and URL. Nothing on the remote is deleted."
        }
        Command::RemoteList => "git remote -v shows the URL used to fetch and to push.",
        Command::PagesPublish => {
            "Pages serves the files of your repository as a website."
        }
        Command::PagesRepublish => {
            "Republish after pushing new commits so the site shows the latest version."
        }
        Command::GithubCreate { .. } => {
            "The remote starts empty. Connect it with git remote add origin <url>, \
             then git push origin main."
        }
        Command::GithubStatus => {
            "The remote only knows what you pushed. Compare it with git log to see \
             what is still local."
        }
        Command::PrCreate { .. } | Command::PrList | Command::PrMerge { .. } => {
            "A pull request asks for one branch to be merged into another so the \
             change can be reviewed first."
        }
        Command::Help
        | Command::Ls
        | Command::Cat { .. }
        | Command::Touch { .. }
        | Command::Pwd
        | Command::Echo { .. } => return None,
    };
    Some(text)
}

/// Appends `hint` to `output` inside the sentinel markers.
pub fn append_hint(output: &str, hint: &str) -> String {
    format!("{output}\n\n{HINT_START}\n{hint}\n{HINT_END}")
}

/// Splits engine output into its body and the hint it carries, if any.
pub fn split_hint(output: &str) -> (&str, Option<&str>) {
    let Some(start) = output.find(HINT_START) else {
        return (output, None);
    };
    let body = output[..start].trim_end();
    let rest = &output[start + HINT_START.len()..];
    let hint = rest.find(HINT_END).map_or(rest, |end| &rest[..end]);
    (body, Some(hint.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_commands_have_no_hint() {
        assert!(hint_for(&Command::Ls, false).is_none());
        assert!(hint_for(&Command::Pwd, false).is_none());
    }

    #[test]
    fn variants_refine_the_hint() {
        let branch = hint_for(&Command::Checkout { name: "x".into() }, false).unwrap();
        let detached = hint_for(&Command::CheckoutCommit { id: "abc1234".into() }, false).unwrap();
        assert_ne!(branch, detached);
        assert_ne!(
            hint_for(&Command::Conflicts, true),
            hint_for(&Command::Conflicts, false)
        );
    }

    #[test]
    fn append_then_split() {
        let out = append_hint("Initialized.", "Hint text.");
        assert_eq!(out, "Initialized.\n\n[[HINT_START]]\nHint text.\n[[HINT_END]]");
        assert_eq!(split_hint(&out), ("Initialized.", Some("Hint text.")));
        assert_eq!(split_hint("plain"), ("plain", None));
    }
}
