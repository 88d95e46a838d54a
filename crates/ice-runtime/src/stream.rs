//! Byte streams bound to a communicator.
//!
//! `create_*` input streams own their bytes. `wrap_*` input streams borrow
//! caller-owned bytes without copying. Streams that do not name an encoding
//! use the communicator's default encoding.
//!
//! Integers are little endian. Sizes use the compact form: a single byte
//! below 255, otherwise the byte 255 followed by a four-byte integer.

use std::borrow::Cow;

use thiserror::Error;

use crate::communicator::{Communicator, EncodingVersion};

const SIZE_ESCAPE: u8 = 255;

/// Errors raised by stream reads and size writes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// Fewer bytes remained than the read required.
    #[error("unexpected end of stream: needed {needed} byte(s), {remaining} remaining")]
    Truncated {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the stream.
        remaining: usize,
    },
    /// A decoded size was negative.
    #[error("invalid size {0}")]
    InvalidSize(i32),
    /// A string payload was not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidString,
    /// A length too large for the size encoding was written.
    #[error("size {0} exceeds the encodable maximum")]
    SizeOverflow(usize),
}

/// Builds an input stream that owns `bytes`.
pub fn create_input_stream(
    communicator: &Communicator,
    bytes: impl Into<Vec<u8>>,
) -> InputStream<'static> {
    create_input_stream_with_encoding(communicator, bytes, communicator.default_encoding())
}

/// Builds an input stream that owns `bytes` and reads with `encoding`.
pub fn create_input_stream_with_encoding(
    communicator: &Communicator,
    bytes: impl Into<Vec<u8>>,
    encoding: EncodingVersion,
) -> InputStream<'static> {
    InputStream::new(communicator, Cow::Owned(bytes.into()), encoding)
}

/// Builds an input stream over `bytes` without copying them.
pub fn wrap_input_stream<'a>(communicator: &Communicator, bytes: &'a [u8]) -> InputStream<'a> {
    wrap_input_stream_with_encoding(communicator, bytes, communicator.default_encoding())
}

/// Builds an input stream over `bytes` without copying them, reading with
/// `encoding`.
pub fn wrap_input_stream_with_encoding<'a>(
    communicator: &Communicator,
    bytes: &'a [u8],
    encoding: EncodingVersion,
) -> InputStream<'a> {
    InputStream::new(communicator, Cow::Borrowed(bytes), encoding)
}

/// Builds an empty output stream.
pub fn create_output_stream(communicator: &Communicator) -> OutputStream {
    create_output_stream_with_encoding(communicator, communicator.default_encoding())
}

/// Builds an empty output stream that writes with `encoding`.
pub fn create_output_stream_with_encoding(
    communicator: &Communicator,
    encoding: EncodingVersion,
) -> OutputStream {
    OutputStream {
        communicator: communicator.clone(),
        encoding,
        buffer: Vec::new(),
    }
}

/// Cursor over an encoded byte buffer.
#[derive(Debug)]
pub struct InputStream<'a> {
    communicator: Communicator,
    encoding: EncodingVersion,
    buffer: Cow<'a, [u8]>,
    position: usize,
}

impl<'a> InputStream<'a> {
    fn new(communicator: &Communicator, buffer: Cow<'a, [u8]>, encoding: EncodingVersion) -> Self {
        Self {
            communicator: communicator.clone(),
            encoding,
            buffer,
            position: 0,
        }
    }

    /// Communicator the stream is bound to.
    #[must_use]
    pub fn communicator(&self) -> &Communicator {
        &self.communicator
    }

    /// Encoding the stream reads with.
    #[must_use]
    pub fn encoding(&self) -> EncodingVersion {
        self.encoding
    }

    /// Returns `true` when the stream owns its buffer.
    #[must_use]
    pub fn is_owned(&self) -> bool {
        matches!(self.buffer, Cow::Owned(_))
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Reads one byte.
    pub fn read_byte(&mut self) -> Result<u8, StreamError> {
        let [byte] = self.take::<1>()?;
        Ok(byte)
    }

    /// Reads a boolean; any non-zero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool, StreamError> {
        Ok(self.read_byte()? != 0)
    }

    /// Reads a little-endian 32-bit integer.
    pub fn read_int(&mut self) -> Result<i32, StreamError> {
        Ok(i32::from_le_bytes(self.take::<4>()?))
    }

    /// Reads a compact size.
    pub fn read_size(&mut self) -> Result<usize, StreamError> {
        let first = self.read_byte()?;
        if first != SIZE_ESCAPE {
            return Ok(usize::from(first));
        }
        let size = self.read_int()?;
        usize::try_from(size).map_err(|_| StreamError::InvalidSize(size))
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8], StreamError> {
        let start = self.advance(len)?;
        Ok(&self.buffer[start..start + len])
    }

    /// Reads a size-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String, StreamError> {
        let len = self.read_size()?;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| StreamError::InvalidString)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], StreamError> {
        let start = self.advance(N)?;
        let mut bytes = [0; N];
        bytes.copy_from_slice(&self.buffer[start..start + N]);
        Ok(bytes)
    }

    // Moves the cursor past `len` bytes and returns where they start.
    fn advance(&mut self, len: usize) -> Result<usize, StreamError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(StreamError::Truncated {
                needed: len,
                remaining,
            });
        }
        let start = self.position;
        self.position += len;
        Ok(start)
    }
}

/// Growable encoded byte buffer.
#[derive(Debug)]
pub struct OutputStream {
    communicator: Communicator,
    encoding: EncodingVersion,
    buffer: Vec<u8>,
}

impl OutputStream {
    /// Communicator the stream is bound to.
    #[must_use]
    pub fn communicator(&self) -> &Communicator {
        &self.communicator
    }

    /// Encoding the stream writes with.
    #[must_use]
    pub fn encoding(&self) -> EncodingVersion {
        self.encoding
    }

    /// Bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` when nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Appends one byte.
    pub fn write_byte(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Appends a boolean as `0` or `1`.
    pub fn write_bool(&mut self, value: bool) {
        self.write_byte(u8::from(value));
    }

    /// Appends a little-endian 32-bit integer.
    pub fn write_int(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a compact size. Sizes above `i32::MAX` are rejected.
    pub fn write_size(&mut self, size: usize) -> Result<(), StreamError> {
        match u8::try_from(size) {
            Ok(small) if small != SIZE_ESCAPE => self.write_byte(small),
            _ => {
                let large = i32::try_from(size).map_err(|_| StreamError::SizeOverflow(size))?;
                self.write_byte(SIZE_ESCAPE);
                self.write_int(large);
            }
        }
        Ok(())
    }

    /// Writes raw bytes with no size prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Writes a size-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> Result<(), StreamError> {
        self.write_size(value.len())?;
        self.write_bytes(value.as_bytes());
        Ok(())
    }

    /// Consumes the stream and returns the encoded bytes.
    #[must_use]
    pub fn finished(self) -> Vec<u8> {
        self.buffer
    }
}
