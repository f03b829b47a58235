//! Comment-aware code block matching.

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::IssueKind;

#[derive(Error, Debug)]
pub enum PatternError {
    #[error("compiling regex {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// The code block to look for.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Plain substring.
    Literal(String),
    /// Regular expression, searched anywhere in a line.
    Regex(Regex),
}

impl Pattern {
    /// Build a pattern, compiling it when `is_regex` is set.
    pub fn new(code_block: &str, is_regex: bool) -> Result<Self, PatternError> {
        if !is_regex {
            return Ok(Pattern::Literal(code_block.to_string()));
        }
        Regex::new(code_block)
            .map(Pattern::Regex)
            .map_err(|source| PatternError::InvalidRegex {
                pattern: code_block.to_string(),
                source,
            })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Literal(s) => s,
            Pattern::Regex(re) => re.as_str(),
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, Pattern::Regex(_))
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            Pattern::Literal(s) => text.contains(s.as_str()),
            Pattern::Regex(re) => re.is_match(text),
        }
    }

    /// Whether the pattern occurs on at least one non-comment line.
    ///
    /// The whole text is tested first so clean functions exit early. After
    /// that only lines whose left-trimmed text does not start with `//` or
    /// `/*` count. Continuation lines of a block comment are not tracked.
    pub fn is_present(&self, function_text: &str) -> bool {
        if !self.matches(function_text) {
            return false;
        }

        let found = function_text
            .split('\n')
            .any(|line| !is_comment_line(line) && self.matches(line));

        if !found {
            tracing::debug!("code block {:?} only found in comments", self.as_str());
        }
        found
    }
}

/// Whether a line starts a `//` or `/*` comment.
pub fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with("/*")
}

/// One-shot form of [`Pattern::is_present`].
pub fn has_pattern(function_text: &str, code_block: &str, is_regex: bool) -> Result<bool, PatternError> {
    Ok(Pattern::new(code_block, is_regex)?.is_present(function_text))
}

/// Whether the code block is required or forbidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Require,
    Forbid,
}

impl Polarity {
    pub fn from_invert(invert: bool) -> Self {
        if invert {
            Polarity::Forbid
        } else {
            Polarity::Require
        }
    }

    pub fn passes(&self, present: bool) -> bool {
        match self {
            Polarity::Require => present,
            Polarity::Forbid => !present,
        }
    }

    /// Kind of issue a failing function produces.
    pub fn issue_kind(&self) -> IssueKind {
        match self {
            Polarity::Require => IssueKind::Missing,
            Polarity::Forbid => IssueKind::Forbidden,
        }
    }
}
