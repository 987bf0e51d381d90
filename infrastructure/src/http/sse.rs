//! Incremental `text/event-stream` decoder.
//!
//! Bytes arrive in arbitrary chunks; [`SseDecoder`] buffers them and yields
//! one [`SseFrame`] per blank-line-terminated block:
//!
//! ```text
//! event: participant_chunk
//! data: {"participant":"Claude","text":"He"}
//!
//! ```
//!
//! Comment lines (starting with `:`) and the `id`/`retry` fields are
//! ignored. Multiple `data` lines are joined with `\n`. A block without an
//! `event` field is named `message`.
//!
//! A block that grows past [`MAX_PENDING_BYTES`] before its blank line
//! arrives is dropped, and decoding resumes after the next blank line.

/// Longest unterminated block the decoder holds on to.
pub const MAX_PENDING_BYTES: usize = 1024 * 1024;

/// One decoded server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Offset where the next blank-line search starts
    scanned: usize,
    /// Dropping the remainder of an oversized block
    skipping: bool,
    overflowed: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every frame it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(end) = find_blank_line(&self.buffer, self.scanned) {
            if self.skipping {
                self.skipping = false;
            } else if let Some(frame) =
                parse_block(&String::from_utf8_lossy(&self.buffer[start..end]))
            {
                frames.push(frame);
            }
            start = end + 2;
            self.scanned = start;
        }
        self.buffer.drain(..start);
        // the last byte may be the first half of a blank line
        self.scanned = self.buffer.len().saturating_sub(1);

        if !self.skipping && self.buffer.len() > MAX_PENDING_BYTES {
            self.skipping = true;
            self.overflowed = true;
        }
        if self.skipping {
            let keep_from = self.buffer.len().saturating_sub(1);
            self.buffer.drain(..keep_from);
            self.scanned = 0;
        }
        frames
    }

    /// Returns `true` once after a block was dropped for being too large.
    pub fn take_overflow(&mut self) -> bool {
        std::mem::take(&mut self.overflowed)
    }

    /// Flush a trailing block that was not terminated by a blank line.
    pub fn finish(&mut self) -> Option<SseFrame> {
        let block = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        if std::mem::take(&mut self.skipping) {
            return None;
        }
        parse_block(&String::from_utf8_lossy(&block))
    }
}

fn find_blank_line(buffer: &[u8], from: usize) -> Option<usize> {
    buffer
        .get(from..)?
        .windows(2)
        .position(|w| w == b"\n\n")
        .map(|pos| pos + from)
}

fn parse_block(block: &str) -> Option<SseFrame> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();

    for line in block.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if event.is_none() && data.is_empty() {
        return None;
    }
    Some(SseFrame {
        event: event.unwrap_or_else(|| "message".to_string()),
        data: data.join("\n"),
    })
}
