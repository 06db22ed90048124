//! The learner's command language.
//!
//! An input line becomes a [`Command`] or a [`CommandError::Parse`] carrying
//! usage text and, for a mistyped subcommand, a suggestion. Parsing never
//! touches the repository.
//!
//! ```text
//! git init | status | add <path|.> | commit -m "<msg>" | log [ref]
//!     | branch [name] | checkout [-b] <name|hash> | merge <branch> | conflicts
//!     | push [remote] [branch] | pull [remote] [branch] | clone <url>
//!     | remote [-v | add <name> <url> | remove <name>] | pages <publish|republish>
//! github create <name> | status | pr <create <from> [to] [-t "<title>"] | list | merge <id>>
//! help | ls | cat <file> | touch <file> | pwd | echo <text> [> | >> <file>]
//! ```

mod suggest;
mod tokenize;

use crate::error::{CommandError, Result};

pub use suggest::{closest, levenshtein, suggest_compact};
pub use tokenize::tokenize;

use suggest::{GIT_SUBCOMMANDS, GITHUB_SUBCOMMANDS};

/// Shell verbs, gated under their own name.
pub const SHELL_VERBS: [&str; 6] = ["help", "ls", "cat", "touch", "pwd", "echo"];

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ── Shell ──
    Help,
    Ls,
    Cat { path: String },
    Touch { path: String },
    Pwd,
    /// Prints `text`, or writes it to `target` with a trailing newline.
    Echo {
        text: String,
        target: Option<Redirect>,
    },

    // ── Local repository ──
    Init,
    Status,
    Add { path: String },
    AddAll,
    Commit { message: String },
    Log { reference: Option<String> },
    BranchList,
    BranchCreate { name: String },
    Checkout { name: String },
    CheckoutB { name: String },
    CheckoutCommit { id: String },
    Merge { branch: String },
    Conflicts,

    // ── Remotes ──
    /// `branch` defaults to the current branch when omitted.
    Push { remote: String, branch: Option<String> },
    Pull { remote: String, branch: Option<String> },
    Clone { url: String },
    RemoteAdd { name: String, url: String },
    RemoteRemove { name: String },
    RemoteList,
    PagesPublish,
    PagesRepublish,

    // ── Simulated host ──
    GithubCreate { name: String },
    GithubStatus,
    PrCreate {
        from: String,
        to: String,
        title: Option<String>,
    },
    PrList,
    PrMerge { id: u64 },
}

impl Command {
    /// Commands that run before a repository exists.
    pub fn needs_repository(&self) -> bool {
        !matches!(
            self,
            Self::Help
                | Self::Ls
                | Self::Cat { .. }
                | Self::Touch { .. }
                | Self::Pwd
                | Self::Echo { .. }
                | Self::Init
                | Self::Clone { .. }
                | Self::GithubCreate { .. }
                | Self::GithubStatus
                | Self::PrCreate { .. }
                | Self::PrList
                | Self::PrMerge { .. }
        )
    }
}

/// Where `echo` writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: String,
    pub append: bool,
}

/// True for a checkout argument that names a commit rather than a branch:
/// 7 to 40 lowercase hex digits and no path separator.
pub fn is_commit_id_token(token: &str) -> bool {
    (7..=40).contains(&token.len())
        && !token.contains('/')
        && token.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// The allow-list key of an input line, `None` for unknown verbs.
///
/// Shell verbs map to themselves, `git <x>` to `"git <x>"`,
/// `github pr <action>` to `"github pr"` and `github <x>` to `"github <x>"`.
pub fn command_key(line: &str) -> Option<String> {
    let mut words = line.split_whitespace();
    let verb = words.next()?;
    if SHELL_VERBS.contains(&verb) {
        return Some(verb.to_string());
    }
    let sub = words.next()?;
    match verb {
        "git" => Some(format!("git {sub}")),
        "github" => Some(format!("github {sub}")),
        _ => None,
    }
}

/// Parses one input line.
pub fn parse(line: &str) -> Result<Command> {
    let tokens = tokenize(line);
    let words: Vec<&str> = tokens.iter().map(String::as_str).collect();
    match words.as_slice() {
        [] => Err(CommandError::parse("Type a command. Try: help")),
        ["git", rest @ ..] => parse_git(rest),
        ["github", rest @ ..] => parse_github(rest),
        [verb, rest @ ..] if SHELL_VERBS.contains(verb) => parse_shell(verb, rest),
        [verb, ..] => Err(CommandError::Parse(format!(
            "Command not found: {verb}\nType 'help' to see the available commands."
        ))),
    }
}

fn usage(text: &str) -> CommandError {
    CommandError::Parse(format!("usage: {text}"))
}

fn parse_shell(verb: &str, args: &[&str]) -> Result<Command> {
    match (verb, args) {
        ("help", _) => Ok(Command::Help),
        ("ls", _) => Ok(Command::Ls),
        ("pwd", _) => Ok(Command::Pwd),
        ("cat", [path, ..]) => Ok(Command::Cat {
            path: (*path).to_string(),
        }),
        ("cat", []) => Err(usage("cat <file>")),
        ("touch", [path, ..]) => Ok(Command::Touch {
            path: (*path).to_string(),
        }),
        ("touch", []) => Err(usage("touch <file>")),
        ("echo", args) => parse_echo(args),
        _ => Err(CommandError::Parse(format!("Command not found: {verb}"))),
    }
}

fn parse_echo(args: &[&str]) -> Result<Command> {
    let redirect = args
        .iter()
        .rposition(|a| *a == ">" || *a == ">>")
        .map(|i| (i, args[i] == ">>"));
    let Some((at, append)) = redirect else {
        return Ok(Command::Echo {
            text: args.join(" "),
            target: None,
        });
    };
    let Some(path) = args.get(at + 1) else {
        return Err(usage("echo <text> > <file>"));
    };
    Ok(Command::Echo {
        text: args[..at].join(" "),
        target: Some(Redirect {
            path: (*path).to_string(),
            append,
        }),
    })
}

fn parse_git(args: &[&str]) -> Result<Command> {
    let Some((&sub, rest)) = args.split_first() else {
        return Err(CommandError::parse(
            "usage: git <command>\nTry: git init, git status, git add <file>, git commit -m \"message\"",
        ));
    };
    match sub {
        "init" => Ok(Command::Init),
        "status" => Ok(Command::Status),
        "add" => match rest {
            ["."] | ["-A" | "--all", ..] => Ok(Command::AddAll),
            [path, ..] => Ok(Command::Add {
                path: (*path).to_string(),
            }),
            [] => Err(usage("git add <file>   (or: git add .)")),
        },
        "commit" => parse_commit(rest),
        "log" => Ok(Command::Log {
            reference: rest.first().map(|r| (*r).to_string()),
        }),
        "branch" => Ok(match rest.first() {
            None => Command::BranchList,
            Some(name) => Command::BranchCreate {
                name: (*name).to_string(),
            },
        }),
        "checkout" => parse_checkout(rest),
        "merge" => match rest.first() {
            Some(branch) => Ok(Command::Merge {
                branch: (*branch).to_string(),
            }),
            None => Err(usage("git merge <branch>")),
        },
        "conflicts" => Ok(Command::Conflicts),
        "push" | "pull" => {
            let remote = rest.first().map_or("origin", |r| *r).to_string();
            let branch = rest.get(1).map(|b| (*b).to_string());
            Ok(if sub == "push" {
                Command::Push { remote, branch }
            } else {
                Command::Pull { remote, branch }
            })
        }
        "clone" => match rest.first() {
            Some(url) => Ok(Command::Clone {
                url: (*url).to_string(),
            }),
            None => Err(usage("git clone <url>")),
        },
        "remote" => parse_remote(rest),
        "pages" => match rest.first() {
            Some(&"publish") => Ok(Command::PagesPublish),
            Some(&"republish") => Ok(Command::PagesRepublish),
            _ => Err(usage("git pages <publish|republish>")),
        },
        unknown => Err(unknown_subcommand("git", unknown, &GIT_SUBCOMMANDS)),
    }
}

/// `-m` takes the rest of the line; `--allow-empty` is accepted and ignored.
fn parse_commit(args: &[&str]) -> Result<Command> {
    let message_usage = || usage("git commit -m \"message\"");
    let at = args
        .iter()
        .position(|a| *a == "-m")
        .ok_or_else(message_usage)?;
    let message = args[at + 1..]
        .iter()
        .filter(|a| **a != "--allow-empty")
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if message.trim().is_empty() {
        return Err(message_usage());
    }
    Ok(Command::Commit { message })
}

fn parse_checkout(args: &[&str]) -> Result<Command> {
    match args {
        ["-b", name, ..] => Ok(Command::CheckoutB {
            name: (*name).to_string(),
        }),
        [name, ..] => {
            let name = (*name).to_string();
            if is_commit_id_token(&name) {
                Ok(Command::CheckoutCommit { id: name })
            } else {
                Ok(Command::Checkout { name })
            }
        }
        _ => Err(usage("git checkout <branch>   (or: git checkout -b <new-branch>)")),
    }
}

fn parse_remote(args: &[&str]) -> Result<Command> {
    match args {
        [] | ["-v", ..] => Ok(Command::RemoteList),
        ["add", name, url, ..] => Ok(Command::RemoteAdd {
            name: (*name).to_string(),
            url: (*url).to_string(),
        }),
        ["add", ..] => Err(usage("git remote add <name> <url>")),
        ["remove" | "rm", name, ..] => Ok(Command::RemoteRemove {
            name: (*name).to_string(),
        }),
        ["remove" | "rm"] => Err(usage("git remote remove <name>")),
        _ => Err(usage("git remote [-v | add <name> <url> | remove <name>]")),
    }
}

fn parse_github(args: &[&str]) -> Result<Command> {
    let Some((&sub, rest)) = args.split_first() else {
        return Err(CommandError::parse(
            "usage: github <command>\nFor example: github create my-repo, github status",
        ));
    };
    match sub {
        "create" => match rest.first() {
            Some(name) => Ok(Command::GithubCreate {
                name: (*name).to_string(),
            }),
            None => Err(usage("github create <repo-name>")),
        },
        "status" => Ok(Command::GithubStatus),
        "pr" => parse_pr(rest),
        unknown => Err(unknown_subcommand("github", unknown, &GITHUB_SUBCOMMANDS)),
    }
}

fn parse_pr(args: &[&str]) -> Result<Command> {
    match args {
        ["create", rest @ ..] => {
            let title_at = rest.iter().position(|a| *a == "-t");
            let positional = &rest[..title_at.unwrap_or(rest.len())];
            let Some(from) = positional.first() else {
                return Err(usage("github pr create <from> [to] [-t \"title\"]"));
            };
            let to = positional.get(1).map_or("main", |t| *t);
            let title = title_at
                .map(|i| rest[i + 1..].join(" "))
                .filter(|t| !t.trim().is_empty());
            Ok(Command::PrCreate {
                from: (*from).to_string(),
                to: to.to_string(),
                title,
            })
        }
        ["list", ..] => Ok(Command::PrList),
        ["merge", id, ..] => id.parse().map(|id| Command::PrMerge { id }).map_err(|_| {
            CommandError::Parse(format!("Pull request id must be a number, got '{id}'."))
        }),
        ["merge"] => Err(usage("github pr merge <id>")),
        [] => Err(CommandError::parse(
            "usage: github pr <command>\nFor example: github pr create <from> <to>, github pr list, github pr merge <id>",
        )),
        [other, ..] => Err(CommandError::Parse(format!(
            "Unsupported subcommand for 'github pr': {other}. Use: create, list, merge."
        ))),
    }
}

fn unknown_subcommand(verb: &str, sub: &str, known: &[&str]) -> CommandError {
    let mut message = format!("{verb}: '{sub}' is not a {verb} command.");
    if let Some(suggestion) = closest(sub, known) {
        message.push_str(&format!("\n\nDid you mean:\n    {verb} {suggestion}"));
    }
    CommandError::Parse(message)
}
