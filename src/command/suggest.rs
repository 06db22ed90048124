//! "Did you mean" suggestions for mistyped commands.

/// Suggestions further away than this are not offered.
pub const MAX_SUGGESTION_DISTANCE: usize = 3;

pub const GIT_SUBCOMMANDS: [&str; 14] = [
    "init", "status", "add", "commit", "log", "branch", "checkout", "merge", "push", "pull",
    "remote", "clone", "pages", "conflicts",
];

pub const GITHUB_SUBCOMMANDS: [&str; 3] = ["create", "status", "pr"];

/// Edit distance between two strings, counted in characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0; b.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            row[j + 1] = (prev[j + 1] + 1).min(row[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

/// The closest candidate within [`MAX_SUGGESTION_DISTANCE`]. Ties go to the
/// candidate listed first.
pub fn closest<'a>(word: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let mut best: Option<(&str, usize)> = None;
    for &candidate in candidates {
        let d = levenshtein(word, candidate);
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((candidate, d));
        }
    }
    best.filter(|&(_, d)| d <= MAX_SUGGESTION_DISTANCE)
        .map(|(c, _)| c)
}

/// Suggests a full command for input with the space left out (`gitinit`).
///
/// The whole input is compared against every known `<verb> <sub>` with its
/// space removed. `github...` is checked before `git...` since it shares the
/// prefix.
pub fn suggest_compact(input: &str) -> Option<String> {
    let first = input.split_whitespace().next()?;
    if first == "git" || first == "github" {
        return None;
    }
    let (verb, subs): (&str, &[&str]) = if first.starts_with("github") {
        ("github", &GITHUB_SUBCOMMANDS[..])
    } else if first.starts_with("git") {
        ("git", &GIT_SUBCOMMANDS[..])
    } else {
        return None;
    };
    let compact: Vec<String> = subs.iter().map(|s| format!("{verb}{s}")).collect();
    let refs: Vec<&str> = compact.iter().map(String::as_str).collect();
    let hit = closest(input.trim(), &refs)?;
    let sub = &hit[verb.len()..];
    Some(format!("{verb} {sub}"))
}
