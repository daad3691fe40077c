//! Parsing of the compact predecessor encoding.
//!
//! A predecessor field is a comma-separated list of tokens such as
//! `"4FS,5SS+3,6FF-1,7"`. Each token names a predecessor id, an optional
//! relationship type (default FS) and an optional signed lag in workdays
//! (default 0).

use pyo3::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)\s*(FS|SS|FF|SF)?\s*(?:([+-])\s*(\d+))?$")
        .expect("predecessor token pattern is valid")
});

/// Values the ingestion side uses for "no predecessors".
const PLACEHOLDERS: &[&str] = &["", "-", "\u{2013}", "\u{2014}"];

/// Relationship between a predecessor and its successor.
#[pyclass(eq, eq_int)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    /// Finish-to-Start
    FS,
    /// Start-to-Start
    SS,
    /// Finish-to-Finish
    FF,
    /// Start-to-Finish
    SF,
}

impl DependencyType {
    fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "FS" => Some(Self::FS),
            "SS" => Some(Self::SS),
            "FF" => Some(Self::FF),
            "SF" => Some(Self::SF),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::FS => "FS",
            Self::SS => "SS",
            Self::FF => "FF",
            Self::SF => "SF",
        }
    }
}

impl fmt::Display for DependencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single predecessor edge decoded from a predecessor field.
#[pyclass]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedPredecessor {
    #[pyo3(get)]
    pub ref_id: u32,
    #[pyo3(get)]
    pub dep_type: DependencyType,
    #[pyo3(get)]
    pub lag: i32,
}

impl ParsedPredecessor {
    pub fn new(ref_id: u32, dep_type: DependencyType, lag: i32) -> Self {
        Self {
            ref_id,
            dep_type,
            lag,
        }
    }
}

#[pymethods]
impl ParsedPredecessor {
    fn __repr__(&self) -> String {
        format!(
            "ParsedPredecessor(ref_id={}, dep_type={}, lag={})",
            self.ref_id, self.dep_type, self.lag
        )
    }

    fn __str__(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParsedPredecessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.ref_id, self.dep_type)?;
        if self.lag != 0 {
            write!(f, "{:+}", self.lag)?;
        }
        Ok(())
    }
}

/// A token the strict parser refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("Unrecognized predecessor token: {token:?}")]
    InvalidToken { token: String },
    #[error("Predecessor lag out of range in token: {token:?}")]
    InvalidLag { token: String },
}

fn parse_token(token: &str) -> Result<ParsedPredecessor, DependencyError> {
    let invalid = || DependencyError::InvalidToken {
        token: token.to_string(),
    };

    let caps = TOKEN_RE.captures(token).ok_or_else(invalid)?;
    let ref_id: u32 = caps[1].parse().map_err(|_| invalid())?;
    let dep_type = caps
        .get(2)
        .and_then(|m| DependencyType::from_code(m.as_str()))
        .unwrap_or(DependencyType::FS);

    let lag = match (caps.get(3), caps.get(4)) {
        (Some(sign), Some(digits)) => {
            let magnitude: i32 = digits
                .as_str()
                .parse()
                .map_err(|_| DependencyError::InvalidLag {
                    token: token.to_string(),
                })?;
            if sign.as_str() == "-" {
                -magnitude
            } else {
                magnitude
            }
        }
        _ => 0,
    };

    Ok(ParsedPredecessor::new(ref_id, dep_type, lag))
}

fn tokens(text: &str) -> impl Iterator<Item = &str> {
    let text = text.trim();
    let is_placeholder = PLACEHOLDERS.contains(&text);
    text.split(',')
        .map(str::trim)
        .filter(move |token| !is_placeholder && !token.is_empty())
}

/// Parse a predecessor field, silently dropping tokens that do not match the
/// grammar. Structural problems surface later in validation.
pub fn parse_predecessors(text: &str) -> Vec<ParsedPredecessor> {
    tokens(text).filter_map(|t| parse_token(t).ok()).collect()
}

/// Parse a predecessor field, reporting every malformed token.
///
/// Returns `Ok` only when all tokens parse.
pub fn parse_predecessors_strict(
    text: &str,
) -> Result<Vec<ParsedPredecessor>, Vec<DependencyError>> {
    let mut parsed = Vec::new();
    let mut errors = Vec::new();
    for token in tokens(text) {
        match parse_token(token) {
            Ok(p) => parsed.push(p),
            Err(e) => errors.push(e),
        }
    }
    if errors.is_empty() {
        Ok(parsed)
    } else {
        Err(errors)
    }
}
