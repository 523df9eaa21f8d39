//! Issue key discovery from local git history.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::error::{DeploymentError, Result};

static ISSUE_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Z][A-Z0-9]+-\d+").expect("invalid issue key regex"));

/// Source of one-line-per-commit summaries.
pub trait CommitLog: Send + Sync {
    fn summaries(&self) -> Result<String>;
}

/// Runs `git log --oneline` over the full history reachable from HEAD.
#[derive(Clone, Debug, Default)]
pub struct GitCommitLog {
    dir: Option<PathBuf>,
}

impl GitCommitLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads history from the checkout at `dir` instead of the current directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }
}

impl CommitLog for GitCommitLog {
    fn summaries(&self) -> Result<String> {
        let mut command = Command::new("git");
        command.args(["log", "--oneline"]);
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .map_err(|err| DeploymentError::CommitLog(format!("failed to run git log: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeploymentError::CommitLog(format!(
                "git log exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Collects issue keys from commit summaries in first-seen order, without duplicates.
///
/// A candidate is dropped when it runs straight into another `-<digits>` group, so `REL-12-3`
/// yields nothing rather than a truncated key.
pub fn extract_issue_keys(log: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();

    for line in log.lines() {
        for found in ISSUE_KEY_REGEX.find_iter(line) {
            if continues_with_number(&line[found.end()..]) {
                continue;
            }
            let key = found.as_str();
            if seen.insert(key.to_string()) {
                keys.push(key.to_string());
            }
        }
    }

    debug!(count = keys.len(), "extracted issue keys from commit log");
    keys
}

fn continues_with_number(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('-') && chars.next().is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::{extract_issue_keys, CommitLog, GitCommitLog};
    use crate::error::DeploymentError;

    #[test]
    fn deduplicates_in_first_seen_order() {
        let log = "ABC-123 fix bug\nno key here\nABC-123 dup\nXY9-1 done\n";
        assert_eq!(extract_issue_keys(log), vec!["ABC-123", "XY9-1"]);
    }

    #[test]
    fn ignores_lowercase_and_single_letter_prefixes() {
        let log = "abc-123 lower\nA-1 too short\nfeat: nothing";
        assert!(extract_issue_keys(log).is_empty());
    }

    #[test]
    fn keeps_full_key_before_word_suffix() {
        assert_eq!(extract_issue_keys("a1b2c3d PROJ-4567-extra"), vec!["PROJ-4567"]);
    }

    #[test]
    fn rejects_key_followed_by_another_number_group() {
        let keys = extract_issue_keys("deadbee bump REL-12-3 and OPS-7");
        assert_eq!(keys, vec!["OPS-7"]);
        assert!(!keys.iter().any(|key| key.starts_with("REL-1")));
    }

    #[test]
    fn finds_multiple_keys_per_line() {
        let log = "0a1b2c3 Merge DEV-1, DEV-2 and OPS-10";
        assert_eq!(extract_issue_keys(log), vec!["DEV-1", "DEV-2", "OPS-10"]);
    }

    #[test]
    fn empty_log_yields_no_keys() {
        assert!(extract_issue_keys("").is_empty());
    }

    #[test]
    fn missing_checkout_is_reported_as_commit_log_error() {
        let log = GitCommitLog::in_dir("/definitely/not/a/checkout/for/jira-deployments");
        let err = log.summaries().unwrap_err();
        assert!(matches!(err, DeploymentError::CommitLog(_)));
    }
}
