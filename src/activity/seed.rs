//! Writing an activity's starter files into the repository.

use std::fs;
use std::path::Path;

use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::graph::META_DIR;
use crate::model::SeedFile;
use crate::vfs::{self, Vfs};

/// Where a seed path lands below `root`, or `None` when it must not be written:
/// blank paths, paths inside the metadata subtree and paths escaping `root`.
pub fn seed_target(root: &str, path: &str) -> Option<String> {
    let rel = path.trim().trim_start_matches('/');
    if rel.is_empty() {
        return None;
    }
    let target = Vfs::join(root, rel).ok()?;
    let inside = target.strip_prefix(root)?.strip_prefix('/')?;
    if inside.is_empty() || inside == META_DIR || inside.starts_with(&format!("{META_DIR}/")) {
        return None;
    }
    Some(target)
}

/// Writes each seed file under `root`, creating parent directories.
///
/// Refused paths are skipped with a warning. Returns the paths written.
pub fn apply_seed_files(fs: &mut Vfs, root: &str, seeds: &[SeedFile]) -> vfs::Result<Vec<String>> {
    let mut written = Vec::new();
    for seed in seeds {
        let Some(target) = seed_target(root, &seed.path) else {
            warn!(path = %seed.path, "seed file refused");
            continue;
        };
        if let Some((parent, _)) = target.rsplit_once('/') {
            if !parent.is_empty() {
                fs.mkdir_all(parent)?;
            }
        }
        fs.write_file(&target, seed.content.as_bytes())?;
        written.push(target);
    }
    debug!(count = written.len(), "seed files applied");
    Ok(written)
}

/// Turns the text files under a host directory into seed files.
///
/// Respects `.gitignore`. Dotfiles are kept, a `.git` directory is not, and
/// files that are not UTF-8 are skipped.
pub fn seed_files_from_dir(root: &Path) -> Result<Vec<SeedFile>, String> {
    if !root.is_dir() {
        return Err(format!("seed directory not found: {}", root.display()));
    }
    let walker = WalkBuilder::new(root)
        .hidden(false)
        .filter_entry(|entry| entry.file_name() != META_DIR)
        .sort_by_file_name(Ord::cmp)
        .build();

    let mut seeds = Vec::new();
    for entry in walker.flatten() {
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        match fs::read_to_string(entry.path()) {
            Ok(content) => seeds.push(SeedFile { path, content }),
            Err(e) => warn!(path = %entry.path().display(), error = %e, "skipping seed file"),
        }
    }
    Ok(seeds)
}
