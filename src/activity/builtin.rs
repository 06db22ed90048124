//! The activities that ship with the trainer.

use std::collections::BTreeSet;

use crate::model::{ActivityConfig, Mission, SeedFile};

const SHELL: [&str; 5] = ["help", "ls", "cat", "touch", "pwd"];

const LOCAL_GIT: [&str; 7] = [
    "git init",
    "git status",
    "git add",
    "git commit",
    "git log",
    "git branch",
    "git checkout",
];

const INDEX_HTML: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
  <meta charset=\"UTF-8\" />
  <title>Activity 3</title>
</head>
<body>
  <h1>Practicing Git</h1>
  <p>Complete the missions using the terminal.</p>
</body>
</html>
";

/// Every built-in activity, in menu order.
pub fn builtin_activities() -> Vec<ActivityConfig> {
    vec![
        local_basics(),
        hosted_remote(),
        html_and_pull_requests(),
        remotes_push_pull(),
        history_checkout(),
        clone_and_pages(),
        chihiro(),
    ]
}

fn allow(extra: &[&str]) -> Option<BTreeSet<String>> {
    Some(
        SHELL
            .iter()
            .chain(LOCAL_GIT.iter())
            .chain(extra.iter())
            .map(|k| (*k).to_string())
            .collect(),
    )
}

fn seed(path: &str, content: &str) -> SeedFile {
    SeedFile {
        path: path.to_string(),
        content: content.to_string(),
    }
}

fn mission(key: &str, title: &str, description: &str) -> Mission {
    Mission {
        id: key.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        validator_key: key.to_string(),
        hint: None,
    }
}

fn lines(commands: &[&str]) -> Vec<String> {
    commands.iter().map(|c| (*c).to_string()).collect()
}

// ── Shared missions ──

fn m1() -> Mission {
    mission(
        "m1",
        "Mission 1: Your first commit",
        "Create \"index.html\", stage it with git add and make a commit whose message \
         includes the phrase \"first commit\".",
    )
}

fn m2() -> Mission {
    mission(
        "m2",
        "Mission 2: Push to the simulated GitHub",
        "Create a simulated remote with github create and push your commits to it.",
    )
}

fn m3() -> Mission {
    mission(
        "m3",
        "Mission 3: Keep working and update the remote",
        "Make at least a second commit and push again. Local and remote must both \
         have at least 2 commits.",
    )
}

fn m4() -> Mission {
    mission(
        "m4",
        "Mission 4: The \"feature/login\" branch",
        "Create the branch \"feature/login\", commit on it and push it with \
         git push origin feature/login.",
    )
}

fn m6() -> Mission {
    mission(
        "m6",
        "Mission 6: Merge \"feature/login\" into \"main\"",
        "From main, merge feature/login so both branches point at the same commit.",
    )
}

// ── Activities ──

fn local_basics() -> ActivityConfig {
    ActivityConfig {
        id: "act-1".to_string(),
        title: "Activity 1: Local Git basics".to_string(),
        description: "Work with a local repository: initialize it, stage files and commit. \
                      No simulated GitHub and no editor."
            .to_string(),
        show_editor: false,
        allowed_commands: allow(&[]),
        seed_files: vec![seed("README.md", "Git Trainer project\n")],
        missions: vec![
            m1(),
            mission(
                "m14",
                "Mission 2: Keep committing",
                "Make at least three commits in total.",
            ),
        ],
        solution: lines(&[
            "git init",
            "touch index.html",
            "git add index.html",
            "git commit -m \"first commit\"",
            "touch styles.css",
            "git add styles.css",
            "git commit -m \"second commit\"",
            "touch app.js",
            "git add app.js",
            "git commit -m \"third commit\"",
        ]),
    }
}

fn hosted_remote() -> ActivityConfig {
    ActivityConfig {
        id: "act-2".to_string(),
        title: "Activity 2: Git and a simulated GitHub".to_string(),
        description: "Practice local Git together with a simulated GitHub: commits, pushes \
                      and branches."
            .to_string(),
        show_editor: false,
        allowed_commands: allow(&["git merge", "git push", "github create", "github status"]),
        seed_files: vec![seed("README.md", "Repository with a simulated remote\n")],
        missions: vec![m1(), m2(), m3(), m4(), m6()],
        solution: lines(&[
            "git init",
            "touch index.html",
            "git add index.html",
            "git commit -m \"first commit\"",
            "github create my-project",
            "git push origin main",
            "touch app.js",
            "git add app.js",
            "git commit -m \"second commit\"",
            "git push origin main",
            "git checkout -b feature/login",
            "touch login.html",
            "git add login.html",
            "git commit -m \"Add login page\"",
            "git push origin feature/login",
            "git checkout main",
            "git merge feature/login",
        ]),
    }
}

fn html_and_pull_requests() -> ActivityConfig {
    ActivityConfig {
        id: "act-3".to_string(),
        title: "Activity 3: Git, GitHub and HTML".to_string(),
        description: "On top of Git and the simulated GitHub, edit \"index.html\" and have \
                      its content checked."
            .to_string(),
        show_editor: true,
        allowed_commands: allow(&[
            "echo",
            "git merge",
            "git push",
            "git conflicts",
            "github create",
            "github status",
            "github pr",
        ]),
        seed_files: vec![
            seed("index.html", INDEX_HTML),
            seed("README.md", "Activity 3 with a starter page\n"),
        ],
        missions: vec![
            m1(),
            m2(),
            m3(),
            m4(),
            mission(
                "m5",
                "Mission 5: A home page about Git",
                "index.html must not be empty and must have an <h1> heading that \
                 mentions \"Git\".",
            ),
            m6(),
            mission(
                "m7",
                "Mission 7: Produce a merge conflict",
                "Change the same line of a file on two branches and merge them.",
            ),
            mission(
                "m8",
                "Mission 8: Resolve the merge conflict",
                "Remove the conflict markers, stage the file and commit to conclude \
                 the merge.",
            ),
            mission(
                "m9",
                "Mission 9: Your first pull request",
                "Open a pull request from a feature branch into main.",
            ),
        ],
        solution: lines(&[
            "git init",
            "echo \"<h1>Learning Git</h1>\" > index.html",
            "git add index.html",
            "git commit -m \"first commit\"",
            "github create my-site",
            "git push origin main",
            "touch notes.md",
            "git add notes.md",
            "git commit -m \"second commit\"",
            "git push origin main",
            "git checkout -b feature/login",
            "touch login.html",
            "git add login.html",
            "git commit -m \"Add login page\"",
            "git push origin feature/login",
            "git checkout main",
            "git merge feature/login",
            "git checkout -b conflict",
            "echo \"<h1>Git on the conflict branch</h1>\" > index.html",
            "git add index.html",
            "git commit -m \"Heading from conflict\"",
            "git checkout main",
            "echo \"<h1>Git on main</h1>\" > index.html",
            "git add index.html",
            "git commit -m \"Heading from main\"",
            "git merge conflict",
            "git conflicts",
            "echo \"<h1>Git, merged</h1>\" > index.html",
            "git add index.html",
            "git commit -m \"Resolve merge conflict\"",
            "github pr create feature/login main -t \"Login page\"",
        ]),
    }
}

fn remotes_push_pull() -> ActivityConfig {
    ActivityConfig {
        id: "act-4".to_string(),
        title: "Activity 4: Remotes, push and pull".to_string(),
        description: "Manage remotes: configure origin, inspect it and keep it in sync with \
                      push and pull."
            .to_string(),
        show_editor: false,
        allowed_commands: allow(&[
            "git merge",
            "git push",
            "git pull",
            "git remote",
            "github create",
            "github status",
        ]),
        seed_files: vec![seed("README.md", "# Project with a remote\n")],
        missions: vec![
            mission(
                "m10",
                "Mission 10: Configure origin",
                "Point the \"origin\" remote at your simulated repository with \
                 git remote add origin <url>.",
            ),
            mission(
                "m11",
                "Mission 11: First push",
                "Push your commits to the simulated remote.",
            ),
            mission(
                "m12",
                "Mission 12: Pull from the remote",
                "Make sure your local history contains every commit on the remote.",
            ),
            mission(
                "m13",
                "Mission 13: A descriptive commit message",
                "The latest commit message must mention a file it contains or its type \
                 (for example \"Add app.js\").",
            ),
        ],
        solution: lines(&[
            "git init",
            "git add README.md",
            "git commit -m \"Initial commit\"",
            "github create my-project",
            "git remote add origin https://github-sim.local/my-project.git",
            "git remote -v",
            "git push origin main",
            "git pull origin main",
            "touch app.js",
            "git add app.js",
            "git commit -m \"Add app.js with proper description\"",
            "git push origin main",
        ]),
    }
}

fn history_checkout() -> ActivityConfig {
    ActivityConfig {
        id: "act-5".to_string(),
        title: "Activity 5: History and commit checkout".to_string(),
        description: "Build a short history, travel back to an earlier commit and return \
                      to main."
            .to_string(),
        show_editor: true,
        allowed_commands: allow(&["echo"]),
        seed_files: Vec::new(),
        missions: vec![
            mission(
                "m14",
                "Mission 14: Three commits in a row",
                "Make at least three commits.",
            ),
            mission(
                "m15",
                "Mission 15: Check out an earlier commit",
                "Use git log to find an older commit and git checkout <hash> to move to it.",
            ),
            mission(
                "m16",
                "Mission 16: Back to main",
                "Return to the main branch with git checkout main.",
            ),
        ],
        solution: lines(&[
            "git init",
            "echo v1 > version.txt",
            "git add version.txt",
            "git commit -m \"v1\"",
            "echo v2 > version.txt",
            "git add version.txt",
            "git commit -m \"v2\"",
            "echo v3 > version.txt",
            "git add version.txt",
            "git commit -m \"v3\"",
            "git log",
            "# git checkout <hash of v1>",
            "git checkout main",
        ]),
    }
}

fn clone_and_pages() -> ActivityConfig {
    ActivityConfig {
        id: "act-6".to_string(),
        title: "Activity 6: Clone and Pages".to_string(),
        description: "Publish a site: push it, clone it back and deploy it with the \
                      simulated Pages service."
            .to_string(),
        show_editor: true,
        allowed_commands: allow(&[
            "echo",
            "git push",
            "git clone",
            "git pages",
            "github create",
            "github status",
        ]),
        seed_files: Vec::new(),
        missions: vec![
            mission(
                "m17",
                "Mission 17: Clone the remote",
                "Clone the simulated repository with git clone <url>.",
            ),
            mission(
                "m18",
                "Mission 18: Publish with Pages",
                "Publish the site with git pages publish.",
            ),
            mission(
                "m19",
                "Mission 19: Republish after a change",
                "Commit a change and update the deployment with git pages republish.",
            ),
        ],
        solution: lines(&[
            "git init",
            "echo \"<h1>My site</h1>\" > index.html",
            "git add index.html",
            "git commit -m \"Initial site\"",
            "github create my-site",
            "git push origin main",
            "git clone https://github-sim.local/my-site.git",
            "git pages publish",
            "echo \"body { color: teal; }\" > styles.css",
            "git add styles.css",
            "git commit -m \"Add styles\"",
            "git push origin main",
            "git pages republish",
        ]),
    }
}

fn chihiro() -> ActivityConfig {
    ActivityConfig {
        id: "chihiro".to_string(),
        title: "Chihiro's Lost Name".to_string(),
        description: "Chihiro has forgotten her name. Gather the three clues on a rescue \
                      branch to perform the ritual that brings it back."
            .to_string(),
        show_editor: false,
        allowed_commands: allow(&[]),
        seed_files: vec![seed(
            "README.md",
            "# Chihiro's Lost Name\n\nEvery clue you commit on a rescue/ branch brings her name closer.\n",
        )],
        missions: vec![
            Mission {
                hint: Some("git checkout -b rescue/chihiro".to_string()),
                ..mission(
                    "chihiro-m1",
                    "Open the rescue path",
                    "Create a branch whose name starts with \"rescue/\".",
                )
            },
            Mission {
                hint: Some("git commit --allow-empty -m \"clue:1\"".to_string()),
                ..mission(
                    "chihiro-m2",
                    "Gather the three clues",
                    "Commit \"clue:1\", \"clue:2\" and \"clue:3\" on any rescue/ branch, \
                     in any order.",
                )
            },
        ],
        solution: lines(&[
            "git init",
            "git checkout -b rescue/chihiro",
            "git commit --allow-empty -m \"clue:1\"",
            "git commit --allow-empty -m \"clue:2\"",
            "git commit --allow-empty -m \"clue:3\"",
            "# The ritual is complete once all three clues are on a rescue/ branch.",
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let activities = builtin_activities();
        let ids: BTreeSet<&str> = activities.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), activities.len());
    }

    #[test]
    fn every_allow_list_covers_the_shell() {
        for activity in builtin_activities() {
            for verb in SHELL {
                assert!(activity.allows(verb), "{} blocks {verb}", activity.id);
            }
        }
    }

    #[test]
    fn editor_activities_allow_echo() {
        for activity in builtin_activities() {
            assert_eq!(activity.show_editor, activity.allows("echo"), "{}", activity.id);
        }
    }

    #[test]
    fn local_basics_blocks_remote_commands() {
        let activity = local_basics();
        assert!(activity.allows("git commit"));
        assert!(!activity.allows("git push"));
        assert!(!activity.allows("github create"));
    }

    #[test]
    fn validator_keys_match_mission_ids() {
        for activity in builtin_activities() {
            for mission in &activity.missions {
                assert_eq!(mission.id, mission.validator_key);
            }
        }
    }

    #[test]
    fn local_basics_missions_need_no_remote() {
        let keys: Vec<String> = local_basics()
            .missions
            .into_iter()
            .map(|m| m.validator_key)
            .collect();
        assert_eq!(keys, ["m1", "m14"]);
    }
}
