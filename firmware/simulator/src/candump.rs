//! candump log parsing (`candump -l` format).
//!
//! ```text
//! (1700000000.125000) can0 5F2#0000FF0000000000
//! (1700000000.126000) can0 18DAF110#0102
//! (1700000000.127000) can0 545#R
//! ```
//!
//! Timestamps are rebased so the first frame lands at `start_ms`.

use embedded_can::{ExtendedId, Frame, Id, StandardId};
use gearview_common::RawFrame;
use thiserror::Error;

/// A frame and the simulated time it is released to the bus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedFrame {
    pub at_ms: u64,
    pub frame: RawFrame,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: expected `(timestamp) interface id#data`")]
    Malformed { line: usize },

    #[error("line {line}: bad timestamp `{text}`")]
    Timestamp { line: usize, text: String },

    #[error("line {line}: bad identifier `{text}`")]
    Identifier { line: usize, text: String },

    #[error("line {line}: bad payload `{text}`")]
    Payload { line: usize, text: String },
}

/// Parse a whole log. Blank lines and `#` comments are skipped.
pub fn parse_log(
    text: &str,
    start_ms: u64,
) -> Result<Vec<TimedFrame>, ParseError> {
    let mut frames = Vec::new();
    let mut first_us: Option<u64> = None;

    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (stamp_us, frame) = parse_line(line, idx + 1)?;
        let base = *first_us.get_or_insert(stamp_us);
        let at_ms = start_ms + stamp_us.saturating_sub(base) / 1000;
        frames.push(TimedFrame { at_ms, frame });
    }

    frames.sort_by_key(|f| f.at_ms);
    Ok(frames)
}

/// Parse one line into (timestamp in microseconds, frame).
fn parse_line(
    line: &str,
    line_no: usize,
) -> Result<(u64, RawFrame), ParseError> {
    let mut parts = line.split_whitespace();
    let (Some(stamp), Some(_iface), Some(body)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ParseError::Malformed { line: line_no });
    };

    let stamp_us = parse_timestamp(stamp).ok_or_else(|| ParseError::Timestamp {
        line: line_no,
        text: stamp.to_string(),
    })?;

    let (id_text, data_text) = body.split_once('#').ok_or(ParseError::Malformed { line: line_no })?;
    let id = parse_id(id_text).ok_or_else(|| ParseError::Identifier {
        line: line_no,
        text: id_text.to_string(),
    })?;

    let payload_err = || ParseError::Payload {
        line: line_no,
        text: data_text.to_string(),
    };

    let frame = if let Some(dlc) = data_text.strip_prefix('R') {
        let dlc = if dlc.is_empty() { 0 } else { dlc.parse().map_err(|_| payload_err())? };
        RawFrame::new_remote(id, dlc)
    } else {
        let bytes = parse_hex_bytes(data_text).ok_or_else(payload_err)?;
        RawFrame::new(id, &bytes)
    };

    frame.map(|f| (stamp_us, f)).ok_or_else(payload_err)
}

/// `(seconds.micros)` to microseconds, without going through floats.
fn parse_timestamp(text: &str) -> Option<u64> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let (secs, frac) = inner.split_once('.').unwrap_or((inner, "0"));
    let secs: u64 = secs.parse().ok()?;
    let mut micros: u64 = 0;
    for (i, c) in frac.chars().take(6).enumerate() {
        micros += u64::from(c.to_digit(10)?) * 10u64.pow(5 - i as u32);
    }
    secs.checked_mul(1_000_000)?.checked_add(micros)
}

/// Three hex digits are a standard id, eight an extended one.
fn parse_id(text: &str) -> Option<Id> {
    let value = u32::from_str_radix(text, 16).ok()?;
    match text.len() {
        3 => StandardId::new(u16::try_from(value).ok()?).map(Id::Standard),
        8 => ExtendedId::new(value).map(Id::Extended),
        _ => None,
    }
}

fn parse_hex_bytes(text: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text.bytes().filter(|b| *b != b'.').collect();
    if digits.len() % 2 != 0 || digits.len() > 16 || !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let hi = char::from(pair[0]).to_digit(16)?;
            let lo = char::from(pair[1]).to_digit(16)?;
            u8::try_from(hi << 4 | lo).ok()
        })
        .collect()
}
