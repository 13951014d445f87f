use bytes::{Buf, BytesMut};

use crate::error::{Result, WireError};

/// Default maximum line length: 10 MiB.
///
/// OOCSI events are JSON text; the cap only exists to bound memory against
/// a stream that never sends a terminator.
pub const DEFAULT_MAX_LINE: usize = 10 * 1024 * 1024;

/// Decode one line from a buffer.
///
/// Lines are `\n`-terminated; a trailing `\r` is stripped so both `\n` and
/// `\r\n` framing are accepted. Returns `Ok(None)` if the buffer doesn't
/// contain a complete line yet. On success, consumes the line and its
/// terminator from the buffer.
pub fn decode_line(src: &mut BytesMut, max_len: usize) -> Result<Option<String>> {
    let Some(pos) = src.iter().position(|&b| b == b'\n') else {
        if src.len() > max_len {
            return Err(WireError::LineTooLong {
                len: src.len(),
                max: max_len,
            });
        }
        return Ok(None); // Need more data
    };

    if pos > max_len {
        return Err(WireError::LineTooLong {
            len: pos,
            max: max_len,
        });
    }

    let mut line = src.split_to(pos);
    src.advance(1); // terminator
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }

    Ok(Some(String::from_utf8(line.to_vec())?))
}

/// Configuration for the line codec.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Maximum line length in bytes. Default: 10 MiB.
    pub max_line_len: usize,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE,
        }
    }
}
