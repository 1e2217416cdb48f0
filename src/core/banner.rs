use crate::utils::error::{Result, StubError};
use std::io::Write;

/// Size of the output line buffer, newline included. Content that does not
/// fit is rejected, never truncated.
pub const LINE_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct LineBuffer {
    bytes: [u8; LINE_CAPACITY],
    len: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self {
            bytes: [0u8; LINE_CAPACITY],
            len: 0,
        }
    }

    pub fn push_str(&mut self, s: &str) -> Result<()> {
        let needed = self.len + s.len();
        if needed > LINE_CAPACITY {
            return Err(StubError::LineOverflow {
                needed,
                capacity: LINE_CAPACITY,
            });
        }
        self.bytes[self.len..needed].copy_from_slice(s.as_bytes());
        self.len = needed;
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        LINE_CAPACITY
    }

    /// Writes the buffered line and flushes. Write failures are returned to
    /// the caller instead of being dropped.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// The one line the stub emits: the version followed by a single newline.
pub fn version_line(version: &str) -> Result<LineBuffer> {
    let mut line = LineBuffer::new();
    line.push_str(version)?;
    line.push_str("\n")?;
    Ok(line)
}
