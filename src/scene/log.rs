//! Custom event log ingestion.
//!
//! One event per line: `timestamp|user|type|path[|RRGGBB]` where type is
//! `A` (added), `M` (modified) or `D` (deleted). Blank lines and lines
//! starting with `#` are ignored.

use std::path::Path;

use nom::{
    bytes::complete::{take_till1, take_while_m_n},
    character::complete::{char, i64 as signed, one_of},
    combinator::{all_consuming, map_opt, opt},
    sequence::preceded,
    IResult, Parser,
};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VisError};
use crate::core::types::{colour_from_hex, Colour, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogAction {
    Add,
    Modify,
    Delete,
}

impl LogAction {
    fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(LogAction::Add),
            'M' => Some(LogAction::Modify),
            'D' => Some(LogAction::Delete),
            _ => None,
        }
    }
}

/// A single parsed log line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: Timestamp,
    pub user: String,
    pub action: LogAction,
    pub path: String,
    pub colour: Option<Colour>,
}

fn field(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c == '|').parse(input)
}

fn hex_colour(input: &str) -> IResult<&str, Colour> {
    map_opt(
        preceded(
            opt(char('#')),
            take_while_m_n(6, 6, |c: char| c.is_ascii_hexdigit()),
        ),
        colour_from_hex,
    )
    .parse(input)
}

fn entry(input: &str) -> IResult<&str, LogEntry> {
    let (rest, (timestamp, _, user, _, code, _, path, colour)) = (
        signed,
        char('|'),
        field,
        char('|'),
        one_of("AMD"),
        char('|'),
        field,
        opt(preceded(char('|'), hex_colour)),
    )
        .parse(input)?;

    let action = LogAction::from_code(code).unwrap_or(LogAction::Modify);
    Ok((
        rest,
        LogEntry {
            timestamp,
            user: user.trim().to_string(),
            action,
            path: path.trim().to_string(),
            colour,
        },
    ))
}

/// Parse one line. `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<LogEntry>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    let (_, entry) = all_consuming(entry)
        .parse(trimmed)
        .map_err(|e| VisError::LogParse {
            line: line_number,
            message: e.to_string(),
        })?;
    if entry.user.is_empty() || entry.path.is_empty() {
        return Err(VisError::LogParse {
            line: line_number,
            message: "user and path must not be blank".into(),
        });
    }
    Ok(Some(entry))
}

/// Parse a whole log. Line numbers in errors are 1-based.
pub fn parse_log(text: &str) -> Result<Vec<LogEntry>> {
    let mut entries = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if let Some(entry) = parse_line(line, i + 1)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

pub fn load_log(path: &Path) -> Result<Vec<LogEntry>> {
    let text = std::fs::read_to_string(path)?;
    let entries = parse_log(&text)?;
    tracing::info!(path = %path.display(), entries = entries.len(), "loaded event log");
    Ok(entries)
}
