//! Memory trace input: one `<op> <hex-address> <int>` record per line.

use crate::core::Access;
use anyhow::{Context, Result};
use log::debug;
use std::io::BufRead;

/// Accesses read from a trace, plus how many lines were rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedTrace {
    pub accesses: Vec<Access>,
    pub skipped: usize,
}

/// Parses one trace line. `None` for blank or malformed lines.
///
/// The op is `l` or `s`. The address is hex with an optional `0x` prefix and is
/// truncated to 32 bits. The trailing integer must be present but is ignored.
pub fn parse_line(line: &str) -> Option<Access> {
    let mut fields = line.split_whitespace();
    let op = fields.next()?;
    let address = parse_address(fields.next()?)?;
    fields.next()?.parse::<i64>().ok()?;
    match op {
        "l" => Some(Access::load(address)),
        "s" => Some(Access::store(address)),
        _ => None,
    }
}

fn parse_address(field: &str) -> Option<u32> {
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    u64::from_str_radix(digits, 16).ok().map(|a| a as u32)
}

/// Parses a whole trace held in memory.
pub fn parse_trace(text: &str) -> ParsedTrace {
    let mut parsed = ParsedTrace::default();
    for (lineno, line) in text.lines().enumerate() {
        collect(&mut parsed, lineno + 1, line);
    }
    parsed
}

/// Reads a trace from any buffered reader (a file or stdin).
pub fn read_trace<R: BufRead>(reader: R) -> Result<ParsedTrace> {
    let mut parsed = ParsedTrace::default();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read trace line {}", lineno + 1))?;
        collect(&mut parsed, lineno + 1, &line);
    }
    Ok(parsed)
}

fn collect(parsed: &mut ParsedTrace, lineno: usize, line: &str) {
    if line.trim().is_empty() {
        return;
    }
    match parse_line(line) {
        Some(access) => parsed.accesses.push(access),
        None => {
            debug!("skipping malformed trace line {}: {:?}", lineno, line);
            parsed.skipped += 1;
        }
    }
}
