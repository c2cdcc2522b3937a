//! Byte cursors for packed uniform layouts
//!
//! A cursor pairs a byte slice with a running offset so parameters can pad
//! themselves to their alignment before writing or reading, mirroring the
//! layout the GPU-side struct declaration expects.

/// Write cursor over a packed byte region.
pub struct ByteCursor<'a> {
    buf: &'a mut [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Current byte offset from the start of the region.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Advance past any padding needed to reach `alignment`.
    pub fn align_to(&mut self, alignment: usize) {
        let rem = self.offset % alignment;
        if rem > 0 {
            self.offset += alignment - rem;
        }
    }

    /// Write `bytes` at the current offset and advance past them.
    pub fn write(&mut self, bytes: &[u8]) {
        let end = self.offset + bytes.len();
        self.buf[self.offset..end].copy_from_slice(bytes);
        self.offset = end;
    }

    /// Write `count` zero bytes and advance past them.
    pub fn write_zeros(&mut self, count: usize) {
        let end = self.offset + count;
        self.buf[self.offset..end].fill(0);
        self.offset = end;
    }
}

/// Read cursor over a packed byte region. Inverse of [`ByteCursor`].
pub struct ByteReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Advance past any padding needed to reach `alignment`.
    pub fn align_to(&mut self, alignment: usize) {
        let rem = self.offset % alignment;
        if rem > 0 {
            self.offset += alignment - rem;
        }
    }

    /// Return `count` bytes at the current offset and advance past them.
    pub fn read(&mut self, count: usize) -> &[u8] {
        let start = self.offset;
        self.offset += count;
        &self.buf[start..self.offset]
    }

    /// Advance `count` bytes without reading.
    pub fn skip(&mut self, count: usize) {
        self.offset += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_to() {
        let mut buf = [0u8; 32];
        let mut cursor = ByteCursor::new(&mut buf);
        cursor.write(&[1]);
        cursor.align_to(4);
        assert_eq!(cursor.offset(), 4);
        // Already aligned, no movement
        cursor.align_to(4);
        assert_eq!(cursor.offset(), 4);
    }

    #[test]
    fn test_write_advances() {
        let mut buf = [0u8; 8];
        let mut cursor = ByteCursor::new(&mut buf);
        cursor.write(&[0xAA, 0xBB]);
        assert_eq!(cursor.offset(), 2);
        assert_eq!(buf[0], 0xAA);
        assert_eq!(buf[1], 0xBB);
    }

    #[test]
    fn test_reader_mirrors_writer() {
        let mut buf = [0u8; 16];
        {
            let mut cursor = ByteCursor::new(&mut buf);
            cursor.write(&[7]);
            cursor.align_to(4);
            cursor.write(&42f32.to_ne_bytes());
        }
        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.read(1), &[7]);
        reader.align_to(4);
        assert_eq!(f32::from_ne_bytes(reader.read(4).try_into().unwrap()), 42.0);
    }
}
