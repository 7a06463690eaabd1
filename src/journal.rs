//! # Frame Journal
//!
//! Appends exchanged frames to a JSON-lines file, one object per line:
//!
//! ```text
//! {"timestamp":"2026-01-01T12:00:00.000Z","direction":"rx","label":"pong","opcode":1,"bytes":"aa0801..."}
//! ```

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Direction of a journaled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Tx,
    Rx,
}

#[derive(Debug, Serialize)]
struct JournalEntry<'a> {
    timestamp: String,
    direction: Direction,
    label: &'a str,
    opcode: Option<u8>,
    bytes: String,
}

/// JSON-lines writer for exchanged frames
pub struct FrameJournal {
    writer: Box<dyn Write + Send>,
}

impl std::fmt::Debug for FrameJournal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameJournal").finish_non_exhaustive()
    }
}

impl FrameJournal {
    /// Journal into an arbitrary writer
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }

    /// Open (or create) a journal file in append mode
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Append one frame
    ///
    /// The opcode is taken from the frame bytes when the frame is long
    /// enough to carry one.
    pub fn record(&mut self, direction: Direction, label: &str, frame: &[u8]) -> io::Result<()> {
        let entry = JournalEntry {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            direction,
            label,
            opcode: frame.get(6).copied(),
            bytes: hex::encode(frame),
        };

        let line = serde_json::to_string(&entry)?;
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encoder::build_ping_frame;
    use std::io::{BufRead, BufReader};
    use tempfile::NamedTempFile;

    #[test]
    fn test_record_writes_json_lines() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut journal = FrameJournal::open(temp_file.path()).unwrap();

        let frame = build_ping_frame();
        journal.record(Direction::Tx, "ping", &frame).unwrap();
        journal.record(Direction::Rx, "pong", &frame).unwrap();

        let lines: Vec<String> = BufReader::new(std::fs::File::open(temp_file.path()).unwrap())
            .lines()
            .map(|line| line.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["direction"], "tx");
        assert_eq!(first["label"], "ping");
        assert_eq!(first["opcode"], 1);
        assert_eq!(first["bytes"], hex::encode(&frame));
        assert!(first["timestamp"].as_str().unwrap().ends_with('Z'));

        let second: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(second["direction"], "rx");
    }

    #[test]
    fn test_record_short_frame_has_no_opcode() {
        let temp_file = NamedTempFile::new().unwrap();
        let mut journal = FrameJournal::open(temp_file.path()).unwrap();
        journal.record(Direction::Rx, "noise", &[0xAA, 0x00]).unwrap();

        let contents = std::fs::read_to_string(temp_file.path()).unwrap();
        let entry: serde_json::Value = serde_json::from_str(contents.trim()).unwrap();
        assert!(entry["opcode"].is_null());
    }

    #[test]
    fn test_open_appends() {
        let temp_file = NamedTempFile::new().unwrap();
        let frame = build_ping_frame();

        FrameJournal::open(temp_file.path()).unwrap().record(Direction::Tx, "a", &frame).unwrap();
        FrameJournal::open(temp_file.path()).unwrap().record(Direction::Tx, "b", &frame).unwrap();

        let contents = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
