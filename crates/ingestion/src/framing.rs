//! Byte-stream framing
//!
//! Splits a raw byte transport into frames. Both sensor protocols are
//! ASCII, so a frame is handed out as the bytes between its delimiters.

use std::io::{self, Read};

/// Frames larger than this are discarded as line noise
pub const MAX_FRAME_LEN: usize = 1024;

const READ_CHUNK: usize = 256;

/// How frames are delimited on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Everything up to a terminator byte (terminator excluded)
    Terminated { terminator: u8 },

    /// Bytes between a start and an end byte (both excluded)
    Delimited { start: u8, end: u8 },
}

impl Framing {
    /// Gas analyzer: carriage-return terminated
    pub const CARRIAGE_RETURN: Self = Self::Terminated { terminator: b'\r' };

    /// Sonic anemometer: STX ... ETX
    pub const STX_ETX: Self = Self::Delimited {
        start: 0x02,
        end: 0x03,
    };
}

/// Incremental frame reader over any byte transport
pub struct FrameReader<R> {
    reader: R,
    framing: Framing,
    pending: Vec<u8>,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R, framing: Framing) -> Self {
        Self {
            reader,
            framing,
            pending: Vec::with_capacity(MAX_FRAME_LEN),
        }
    }

    /// Read until one frame is complete
    ///
    /// Returns `Ok(None)` when the transport timed out without completing a frame.
    ///
    /// # Errors
    /// - `UnexpectedEof` when the transport is exhausted
    /// - `InvalidData` when an oversized frame was discarded
    /// - any other transport error
    pub fn next_frame(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(frame) = self.extract() {
                return Ok(Some(frame));
            }

            if self.pending.len() > MAX_FRAME_LEN {
                self.pending.clear();
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("no frame delimiter within {MAX_FRAME_LEN} bytes"),
                ));
            }

            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "transport closed",
                    ))
                }
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return Ok(None)
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Pop the next complete frame out of the pending buffer
    fn extract(&mut self) -> Option<Vec<u8>> {
        match self.framing {
            Framing::Terminated { terminator } => {
                let end = self.pending.iter().position(|b| *b == terminator)?;
                let frame = self.pending[..end].to_vec();
                self.pending.drain(..=end);
                Some(frame)
            }
            Framing::Delimited { start, end } => loop {
                let Some(close) = self.pending.iter().position(|b| *b == end) else {
                    // keep only the latest start byte onward
                    match self.pending.iter().rposition(|b| *b == start) {
                        Some(open) => {
                            self.pending.drain(..open);
                        }
                        None => self.pending.clear(),
                    }
                    return None;
                };
                // a start byte resets the frame, so take the last one before `close`
                match self.pending[..close].iter().rposition(|b| *b == start) {
                    Some(open) => {
                        let frame = self.pending[open + 1..close].to_vec();
                        self.pending.drain(..=close);
                        return Some(frame);
                    }
                    None => {
                        // orphan end byte
                        self.pending.drain(..=close);
                    }
                }
            },
        }
    }
}
