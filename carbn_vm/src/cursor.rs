//! Bounds-checked byte cursor over a code slice.
//!
//! The cursor is the instruction pointer: it reads opcode bytes and
//! immediate operands sequentially and rejects any read that would run
//! past the end of the code. String payloads are copied out into owned
//! buffers; the code slice itself is never retained by a value.

use carbn_core::{VmError, VmResult};

/// A read cursor over bytecode.
#[derive(Debug, Clone)]
pub struct Cursor<'code> {
    code: &'code [u8],
    pos: usize,
}

impl<'code> Cursor<'code> {
    /// Create a cursor at offset 0.
    #[inline]
    #[must_use]
    pub fn new(code: &'code [u8]) -> Self {
        Self { code, pos: 0 }
    }

    /// Current byte offset.
    #[inline]
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// The full code slice. Not tied to the cursor borrow, so callers can
    /// carve out sub-slices (loop bodies) while still advancing the cursor.
    #[inline]
    #[must_use]
    pub const fn code(&self) -> &'code [u8] {
        self.code
    }

    /// Length of the code slice.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.code.len()
    }

    /// Whether the code slice is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Check whether the cursor has run off the end of the code.
    #[inline]
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.code.len()
    }

    /// Redirect the cursor to an absolute jump target.
    ///
    /// A target equal to the code length is allowed and ends execution;
    /// anything past that is an invalid jump.
    #[inline]
    pub fn jump(&mut self, target: u64) -> VmResult<()> {
        if target > self.code.len() as u64 {
            return Err(VmError::InvalidJump {
                target,
                limit: self.code.len(),
            });
        }
        self.pos = target as usize;
        Ok(())
    }

    /// Move to a known-valid offset (a previously saved cursor position).
    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        debug_assert!(pos <= self.code.len());
        self.pos = pos;
    }

    fn take(&mut self, count: usize) -> VmResult<&'code [u8]> {
        let code = self.code;
        let end = self.pos.checked_add(count).filter(|&end| end <= code.len());
        match end {
            Some(end) => {
                let bytes = &code[self.pos..end];
                self.pos = end;
                Ok(bytes)
            }
            None => Err(VmError::TruncatedCode {
                offset: self.pos,
                wanted: count,
            }),
        }
    }

    /// Read one byte.
    #[inline]
    pub fn read_u8(&mut self) -> VmResult<u8> {
        let bytes = self.take(1)?;
        Ok(bytes[0])
    }

    /// Read an 8-byte big-endian unsigned integer.
    #[inline]
    pub fn read_u64(&mut self) -> VmResult<u64> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_be_bytes(raw))
    }

    /// Read an 8-byte big-endian integer, reinterpreted as signed
    /// two's complement.
    #[inline]
    pub fn read_i64(&mut self) -> VmResult<i64> {
        Ok(self.read_u64()? as i64)
    }

    /// Read an 8-byte big-endian IEEE-754 double.
    #[inline]
    pub fn read_f64(&mut self) -> VmResult<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }

    /// Read a length-prefixed string: one length byte, then that many
    /// payload bytes, copied verbatim into a fresh owned buffer. The
    /// payload is opaque — non-UTF-8 bytes round-trip unchanged.
    pub fn read_str(&mut self) -> VmResult<Vec<u8>> {
        let len = self.read_u8()? as usize;
        let payload = self.take(len)?;
        Ok(payload.to_vec())
    }

    /// Read a length-prefixed variable name. Names are identifiers
    /// produced by the compiler, not program values; bytes outside UTF-8
    /// have no distinct identity as names.
    pub fn read_name(&mut self) -> VmResult<String> {
        let payload = self.read_str()?;
        Ok(String::from_utf8_lossy(&payload).into_owned())
    }

    /// Advance past `count` bytes without copying them.
    #[inline]
    pub fn skip(&mut self, count: usize) -> VmResult<()> {
        self.take(count).map(|_| ())
    }
}
