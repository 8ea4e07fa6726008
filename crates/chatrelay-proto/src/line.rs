//! Line-based codec for tokio.
//!
//! This module provides a codec that reads and writes newline-terminated
//! lines. Decoding strips the terminator (and a preceding `\r`, if any) and
//! keeps any trailing partial line buffered until more bytes arrive.

use std::fmt::{self, Write as _};
use std::io;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{self, ProtocolError};
use crate::DEFAULT_MAX_LINE_LEN;

/// Line-based codec that handles newline-terminated messages.
///
/// Lines are limited to [`DEFAULT_MAX_LINE_LEN`] bytes unless configured
/// otherwise. The limit applies to partial lines too, so a peer that never
/// sends a terminator cannot grow the read buffer without bound.
#[derive(Debug)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length, terminator included
    max_len: usize,
}

impl LineCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE_LEN)
    }

    /// Create a codec with a custom line limit.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// The configured line limit.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn strip_terminator(line: &[u8]) -> &[u8] {
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        line.strip_suffix(b"\r").unwrap_or(line)
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        // Look for newline starting from where we left off
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: line.len(),
                    limit: self.max_len,
                });
            }

            // Invalid byte sequences are replaced rather than rejected; one
            // garbled line must not cost the client its session.
            let data = String::from_utf8_lossy(Self::strip_terminator(&line)).into_owned();
            Ok(Some(data))
        } else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(ProtocolError::LineTooLong {
                    actual: src.len(),
                    limit: self.max_len,
                });
            }

            Ok(None)
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }

        // An unterminated tail at end of stream is not a command.
        src.clear();
        self.next_index = 0;
        Ok(None)
    }
}

impl<T: fmt::Display> Encoder<T> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: T, dst: &mut BytesMut) -> error::Result<()> {
        writeln!(dst, "{msg}")
            .map_err(|_| io::Error::other("failed to format outgoing line"))?;
        Ok(())
    }
}
