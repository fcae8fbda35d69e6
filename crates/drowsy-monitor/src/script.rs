//! Run-length sample scripts
//!
//! A script is a list of tokens separated by commas or whitespace. Each token
//! is `V` or `NxV`, where `V` is one of `0`/`1`, `o`/`c`, `open`/`closed` or
//! `false`/`true`. Example: `5x0, 95x1, 1x0`.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Upper bound on an expanded script (about 28 hours at 100ms)
pub const MAX_SCRIPT_SAMPLES: usize = 1_000_000;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(\d+)[x*])?(0|1|o|c|open|closed|false|true)$")
        .expect("TOKEN_RE regex should compile")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("script contains no samples")]
    Empty,

    #[error("token {index} ({token:?}) is not a sample or NxSAMPLE run")]
    InvalidToken { index: usize, token: String },

    #[error("token {index} ({token:?}) has an invalid repeat count")]
    InvalidCount { index: usize, token: String },

    #[error("token {index} ({token:?}) expands the script past {limit} samples")]
    TooLong {
        index: usize,
        token: String,
        limit: usize,
    },
}

/// Parse a single sample word (true = eyes closed)
pub fn parse_sample(word: &str) -> Option<bool> {
    match word.trim().to_ascii_lowercase().as_str() {
        "1" | "c" | "closed" | "true" => Some(true),
        "0" | "o" | "open" | "false" => Some(false),
        _ => None,
    }
}

/// Expand a run-length script into one sample per tick
pub fn parse_script(script: &str) -> Result<Vec<bool>, ScriptError> {
    let mut samples = Vec::new();

    let tokens = script
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty());

    for (index, token) in tokens.enumerate() {
        let caps = TOKEN_RE
            .captures(token)
            .ok_or_else(|| ScriptError::InvalidToken {
                index,
                token: token.to_string(),
            })?;

        let count = match caps.get(1) {
            Some(m) => m
                .as_str()
                .parse::<usize>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or_else(|| ScriptError::InvalidCount {
                    index,
                    token: token.to_string(),
                })?,
            None => 1,
        };

        let value = parse_sample(&caps[2]).ok_or_else(|| ScriptError::InvalidToken {
            index,
            token: token.to_string(),
        })?;

        let total = samples
            .len()
            .checked_add(count)
            .filter(|&n| n <= MAX_SCRIPT_SAMPLES)
            .ok_or_else(|| ScriptError::TooLong {
                index,
                token: token.to_string(),
                limit: MAX_SCRIPT_SAMPLES,
            })?;
        samples.resize(total, value);
    }

    if samples.is_empty() {
        return Err(ScriptError::Empty);
    }
    Ok(samples)
}
