//! CLI interface for the trainer.
//!
//! One learner session lives in the state root and survives between
//! invocations. `play` drives it interactively; every other subcommand is
//! non-interactive: arguments in, text out.
//!
//! The session is picked up where it was left. Passing `--activity` with a
//! different id starts a new session for that activity.

mod format;

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::activity::{self, Registry};
use crate::config::Config;
use crate::mission::RitualState;
use crate::session::{FREE_PLAY, Session};
use crate::storage::Storage;

use format::{format_activity, format_mission, format_output, format_ritual};

/// Git Trainer: learn version control in a sandbox.
#[derive(Debug, Parser)]
#[command(name = "git-trainer", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Activity to play (see `git-trainer activities`).
    /// Switching to another activity starts a new session.
    #[arg(long, global = true)]
    activity: Option<String>,

    /// Directory holding the session database and custom activities.
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Host directory whose files seed a newly started session.
    #[arg(long, global = true)]
    seed_dir: Option<PathBuf>,

    /// Log engine activity to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: a first activity
  1. git-trainer --activity act-1 missions
  2. git-trainer run "git init" "touch index.html" "git add index.html"
  3. git-trainer run 'git commit -m "first commit"'
  4. git-trainer missions

Interactive:
  git-trainer --activity act-3 play"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive prompt. Type `exit` to leave.
    ///
    /// Newly completed missions are announced after every command.
    Play,

    /// Run command lines in order and print each output.
    Run {
        /// Lines to run, e.g. "git status".
        #[arg(required = true)]
        lines: Vec<String>,
    },

    /// Show the missions of the current activity and whether they pass.
    Missions,

    /// List the activities that can be played.
    Activities,

    /// Print the reference solution of the current activity.
    Solution,

    /// Discard the repository and start it over.
    ///
    /// The simulated remote and the hints already shown are kept unless
    /// `--all` is given.
    Reset {
        /// Forget the whole session, remote and hints included.
        #[arg(long)]
        all: bool,
    },
}

/// Run the CLI, returning an error message on failure.
pub fn run(cli: &Cli, config: &Config) -> Result<(), String> {
    let root = state_root(cli, config)?;
    let storage = Storage::open(&root).map_err(|e| format!("failed to open state: {e}"))?;
    let registry = Registry::load(&root)?;

    match &cli.command {
        Command::Play => {
            let mut session = open_session(cli, config, &storage, &registry)?;
            cmd_play(&storage, &mut session)
        }
        Command::Run { lines } => {
            let mut session = open_session(cli, config, &storage, &registry)?;
            cmd_run(&storage, &mut session, lines)
        }
        Command::Missions => {
            let session = open_session(cli, config, &storage, &registry)?;
            cmd_missions(&session);
            Ok(())
        }
        Command::Activities => {
            let current = storage
                .load_session()
                .map_err(|e| format!("failed to load session: {e}"))?
                .map(|r| r.activity_id);
            cmd_activities(&registry, current.as_deref());
            Ok(())
        }
        Command::Solution => {
            let session = open_session(cli, config, &storage, &registry)?;
            cmd_solution(&session)
        }
        Command::Reset { all: true } => cmd_reset_all(&storage),
        Command::Reset { all: false } => cmd_reset(config, &storage, &registry),
    }
}

/// `--state-dir`, then `state-dir` from the config, then `~/.git-trainer/`.
fn state_root(cli: &Cli, config: &Config) -> Result<PathBuf, String> {
    cli.state_dir
        .clone()
        .or_else(|| config.state_dir.clone())
        .or_else(Storage::default_root)
        .ok_or_else(|| "could not determine home directory".to_string())
}

/// The stored session, or a new one when none exists or another activity
/// was asked for.
fn open_session(
    cli: &Cli,
    config: &Config,
    storage: &Storage,
    registry: &Registry,
) -> Result<Session, String> {
    let requested = cli
        .activity
        .as_deref()
        .or(config.default_activity.as_deref());

    let stored = Session::restore(storage, registry, config.author())
        .map_err(|e| format!("failed to restore session: {e}"))?;
    if let Some(session) = stored {
        let same = requested.is_none_or(|id| id == session.record().activity_id);
        // Only an explicit --activity may replace a running session.
        if same || cli.activity.is_none() {
            return Ok(session);
        }
    }

    let mut session = Session::for_activity(registry, requested, config.author())
        .map_err(|e| e.to_string())?;
    if let Some(dir) = &cli.seed_dir {
        let seeds = activity::seed_files_from_dir(dir)?;
        let written = session.seed(&seeds).map_err(|e| e.to_string())?;
        info!(count = written.len(), dir = %dir.display(), "seeded from host directory");
    }
    storage
        .clear_all()
        .map_err(|e| format!("failed to clear previous session: {e}"))?;
    save(storage, &session)?;
    eprintln!("Started {}", describe_activity(&session));
    Ok(session)
}

fn save(storage: &Storage, session: &Session) -> Result<(), String> {
    session
        .save(storage)
        .map_err(|e| format!("failed to save session: {e}"))
}

fn describe_activity(session: &Session) -> String {
    session
        .activity()
        .map_or_else(|| "free play".to_string(), |a| a.title.clone())
}

fn cmd_play(storage: &Storage, session: &mut Session) -> Result<(), String> {
    println!("{}", describe_activity(session));
    println!("Type 'help' for commands, 'exit' to leave.");

    let prompt = session
        .activity()
        .map_or(FREE_PLAY, |a| a.id.as_str())
        .to_string();
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("{prompt} $ ");
        stdout
            .flush()
            .map_err(|e| format!("failed to write prompt: {e}"))?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| format!("failed to read input: {e}"))?;
        let line = line.trim();
        if read == 0 || line == "exit" || line == "quit" {
            break;
        }
        step(storage, session, line)?;
    }
    Ok(())
}

fn cmd_run(storage: &Storage, session: &mut Session, lines: &[String]) -> Result<(), String> {
    for line in lines {
        println!("$ {line}");
        step(storage, session, line)?;
    }
    Ok(())
}

/// Runs one line, prints its output and any missions it completed, and
/// saves the session.
fn step(storage: &Storage, session: &mut Session, line: &str) -> Result<(), String> {
    let before = session.completed_missions();
    let output = session.run(line);
    let formatted = format_output(&output);
    if !formatted.is_empty() {
        println!("{formatted}");
    }
    announce(session, &before);
    save(storage, session)
}

fn announce(session: &Session, before: &BTreeSet<String>) {
    let after = session.completed_missions();
    for mission in session.missions() {
        if after.contains(&mission.id) && !before.contains(&mission.id) {
            println!("Mission complete: {}", mission.title);
        }
    }
}

fn cmd_missions(session: &Session) {
    println!("{}", describe_activity(session));
    let results = session.evaluate_missions();
    if results.is_empty() {
        println!("No missions in free play.");
        return;
    }
    for (mission, result) in &results {
        println!("{}", format_mission(mission, result));
    }

    let ritual = results
        .iter()
        .any(|(m, _)| m.validator_key.starts_with("chihiro"));
    if ritual {
        let context = session.mission_context();
        let state = context.ritual_state();
        if state != RitualState::NoBranch {
            println!();
            println!("{}", format_ritual(&state, &context.ritual_commits()));
        }
    }
}

fn cmd_activities(registry: &Registry, current: Option<&str>) {
    for activity in registry.all() {
        println!(
            "{}",
            format_activity(activity, current == Some(activity.id.as_str()))
        );
    }
}

fn cmd_solution(session: &Session) -> Result<(), String> {
    let activity = session.activity().ok_or(
        "free play has no solution; start an activity with --activity <id>",
    )?;
    for line in &activity.solution {
        println!("{line}");
    }
    Ok(())
}

fn cmd_reset(config: &Config, storage: &Storage, registry: &Registry) -> Result<(), String> {
    let Some(mut session) = Session::restore(storage, registry, config.author())
        .map_err(|e| format!("failed to restore session: {e}"))?
    else {
        println!("Nothing to reset");
        return Ok(());
    };
    session
        .reset_repository()
        .map_err(|e| format!("failed to reset repository: {e}"))?;
    save(storage, &session)?;
    eprintln!("Repository reset; the simulated remote and hints were kept");
    Ok(())
}

fn cmd_reset_all(storage: &Storage) -> Result<(), String> {
    storage
        .clear_all()
        .map_err(|e| format!("failed to clear session: {e}"))?;
    eprintln!("Session cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("git-trainer").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = cli(&["run", "git init", "--activity", "act-2", "-v"]);
        assert_eq!(cli.activity.as_deref(), Some("act-2"));
        assert!(cli.verbose);
        let Command::Run { lines } = &cli.command else {
            panic!("expected run");
        };
        assert_eq!(lines, &["git init"]);
    }

    #[test]
    fn run_requires_a_line() {
        assert!(Cli::try_parse_from(["git-trainer", "run"]).is_err());
    }

    #[test]
    fn state_dir_flag_beats_config() {
        let config = Config {
            state_dir: Some(PathBuf::from("/from/config")),
            ..Config::default()
        };
        let flagged = cli(&["--state-dir", "/from/flag", "missions"]);
        assert_eq!(
            state_root(&flagged, &config).unwrap(),
            PathBuf::from("/from/flag")
        );
        let plain = cli(&["missions"]);
        assert_eq!(
            state_root(&plain, &config).unwrap(),
            PathBuf::from("/from/config")
        );
    }

    #[test]
    fn session_survives_between_invocations() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let registry = Registry::builtin();
        let config = Config::default();

        let first = cli(&["--activity", "act-1", "run", "git init"]);
        let mut session = open_session(&first, &config, &storage, &registry).unwrap();
        cmd_run(&storage, &mut session, &["git init".to_string()]).unwrap();

        // No --activity: the stored session is picked up.
        let again = cli(&["missions"]);
        let mut session = open_session(&again, &config, &storage, &registry).unwrap();
        assert_eq!(session.record().activity_id, "act-1");
        assert!(session.run("git status").starts_with("On branch main"));
    }

    #[test]
    fn other_activity_starts_a_new_session() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let registry = Registry::builtin();
        let config = Config::default();

        let first = cli(&["--activity", "act-1", "missions"]);
        let mut session = open_session(&first, &config, &storage, &registry).unwrap();
        cmd_run(&storage, &mut session, &["git init".to_string()]).unwrap();

        let switched = cli(&["--activity", "act-2", "missions"]);
        let mut session = open_session(&switched, &config, &storage, &registry).unwrap();
        assert_eq!(session.record().activity_id, "act-2");
        assert!(session.run("git status").contains("git init"));
    }

    #[test]
    fn config_default_activity_does_not_replace_a_session() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let registry = Registry::builtin();

        let first = cli(&["--activity", "act-1", "missions"]);
        open_session(&first, &Config::default(), &storage, &registry).unwrap();

        let config = Config {
            default_activity: Some("act-2".to_string()),
            ..Config::default()
        };
        let session = open_session(&cli(&["missions"]), &config, &storage, &registry).unwrap();
        assert_eq!(session.record().activity_id, "act-1");
    }

    #[test]
    fn seed_dir_applies_to_new_sessions() {
        let state = tempfile::TempDir::new().unwrap();
        let host = tempfile::TempDir::new().unwrap();
        std::fs::write(host.path().join("notes.md"), "from host\n").unwrap();
        let storage = Storage::open(state.path()).unwrap();
        let host_dir = host.path().to_str().unwrap();

        let args = cli(&["--seed-dir", host_dir, "missions"]);
        let mut session =
            open_session(&args, &Config::default(), &storage, &Registry::builtin()).unwrap();
        assert_eq!(session.run("cat notes.md"), "from host");
    }

    #[test]
    fn unknown_activity_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let args = cli(&["--activity", "nope", "missions"]);
        let Err(err) = open_session(&args, &Config::default(), &storage, &Registry::builtin())
        else {
            panic!("expected an error");
        };
        assert!(err.contains("nope"));
    }

    #[test]
    fn reset_keeps_the_remote() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let registry = Registry::builtin();
        let config = Config::default();

        let args = cli(&["--activity", "act-2", "missions"]);
        let mut session = open_session(&args, &config, &storage, &registry).unwrap();
        let lines: Vec<String> = ["git init", "github create demo"]
            .iter()
            .map(|l| (*l).to_string())
            .collect();
        cmd_run(&storage, &mut session, &lines).unwrap();

        cmd_reset(&config, &storage, &registry).unwrap();
        let session = Session::restore(&storage, &registry, config.author())
            .unwrap()
            .unwrap();
        assert!(session.remote().record().is_some());

        cmd_reset_all(&storage).unwrap();
        assert!(storage.load_session().unwrap().is_none());
    }
}
