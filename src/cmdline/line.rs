//! Byte-to-line assembly for the console.

/// Longest accepted command line, terminator excluded.
pub const LINE_CAPACITY: usize = 64;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// What a terminator byte produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assembled {
    /// A complete line is available from [`LineBuffer::as_str`].
    Line,
    /// The line ran past [`LINE_CAPACITY`] and was thrown away.
    Overflow,
}

/// Accumulates printable bytes until `\r` or `\n`.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: heapless::String<LINE_CAPACITY>,
    overflowed: bool,
    complete: bool,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte.  Terminators on an empty line are ignored, so CR LF
    /// pairs and stray blank lines produce nothing.
    pub fn push(&mut self, byte: u8) -> Option<Assembled> {
        if self.complete {
            self.buf.clear();
            self.complete = false;
        }

        match byte {
            b'\r' | b'\n' => {
                if self.overflowed {
                    self.overflowed = false;
                    self.buf.clear();
                    return Some(Assembled::Overflow);
                }
                if self.buf.is_empty() {
                    return None;
                }
                self.complete = true;
                Some(Assembled::Line)
            }
            BACKSPACE | DELETE => {
                let _ = self.buf.pop();
                None
            }
            b'\t' | 0x20..=0x7E => {
                if !self.overflowed && self.buf.push(byte as char).is_err() {
                    self.overflowed = true;
                }
                None
            }
            _ => None,
        }
    }

    /// The line most recently completed (or the partial one in progress).
    pub fn as_str(&self) -> &str {
        self.buf.as_str()
    }
}
