// cursor.rs
//
// Copyright (c) 2024  Douglas Lau
//
//! Byte cursor over a seekable source
use crate::block::BlockKind;
use crate::error::{Error, Result};
use std::io::{self, Read, Seek, SeekFrom};

/// Byte cursor with separate consuming and non-consuming reads.
///
/// The cursor tracks its own offset, so every read or peek can be reported
/// with the position at which it happened.  Peeked bytes are held until
/// consumed, so peeking never seeks the source.
pub(crate) struct Cursor<R: Read + Seek> {
    /// Byte source
    reader: R,
    /// Offset of the next byte to read
    offset: u64,
    /// Bytes peeked but not yet consumed
    ahead: Vec<u8>,
}

impl<R: Read + Seek> Cursor<R> {
    /// Create a cursor over a source positioned at offset 0
    pub fn new(reader: R) -> Self {
        Cursor {
            reader,
            offset: 0,
            ahead: Vec::with_capacity(2),
        }
    }

    /// Get the offset of the next byte
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Move to an absolute offset
    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        if offset != self.offset {
            self.ahead.clear();
            self.reader.seek(SeekFrom::Start(offset))?;
            self.offset = offset;
        }
        Ok(())
    }

    /// Report a short read at the current offset.
    ///
    /// The source position is unknown after a failed read, so it is moved
    /// back to the current offset.
    fn truncated(&mut self, source: io::Error) -> Error {
        let offset = self.offset;
        self.ahead.clear();
        if let Err(e) = self.reader.seek(SeekFrom::Start(offset)) {
            warn!("rewind to {:#x} failed: {}", offset, e);
        }
        Error::Truncated { offset, source }
    }

    /// Fill a buffer, consuming the bytes
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = self.ahead.len().min(buf.len());
        buf[..n].copy_from_slice(&self.ahead[..n]);
        match self.reader.read_exact(&mut buf[n..]) {
            Ok(()) => {
                self.ahead.drain(..n);
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(source) => Err(self.truncated(source)),
        }
    }

    /// Read a fixed number of bytes
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0; N];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    /// Read a little-endian `u16`
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array::<2>()?))
    }

    /// Read a variable number of bytes
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }

    /// Read a fixed number of bytes without advancing
    pub fn peek<const N: usize>(&mut self) -> Result<[u8; N]> {
        let have = self.ahead.len();
        if have < N {
            self.ahead.resize(N, 0);
            if let Err(source) = self.reader.read_exact(&mut self.ahead[have..]) {
                return Err(self.truncated(source));
            }
        }
        let mut buf = [0; N];
        buf.copy_from_slice(&self.ahead[..N]);
        Ok(buf)
    }

    /// Classify the block at the current offset, without advancing
    pub fn classify(&mut self) -> Result<BlockKind> {
        let [code] = self.peek::<1>()?;
        if code == BlockKind::EXTENSION {
            let [code, label] = self.peek::<2>()?;
            Ok(BlockKind::from_bytes(code, Some(label)))
        } else {
            Ok(BlockKind::from_bytes(code, None))
        }
    }

    /// Check that the current block is the expected kind
    pub fn expect(&mut self, expected: BlockKind) -> Result<()> {
        let found = self.classify()?;
        if found == expected {
            Ok(())
        } else {
            let offset = self.offset;
            Err(Error::UnexpectedBlock {
                offset,
                expected,
                found,
            })
        }
    }

    /// Read a sequence of sub-blocks, concatenating their contents.
    ///
    /// Each sub-block is a length byte followed by that many bytes; a zero
    /// length terminates the sequence.  The cursor is left just past the
    /// terminator.
    pub fn read_sub_blocks(&mut self) -> Result<Vec<u8>> {
        let mut data = vec![];
        loop {
            let len = self.read_u8()?;
            if len == 0 {
                return Ok(data);
            }
            let start = data.len();
            data.resize(start + usize::from(len), 0);
            self.fill(&mut data[start..])?;
        }
    }

    /// Run a parse function, restoring the offset if it fails.
    pub fn restoring<T, F>(&mut self, parse: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let start = self.offset;
        let res = parse(self);
        if res.is_err() {
            if let Err(e) = self.seek_to(start) {
                warn!("restore to {:#x} failed: {}", start, e);
            }
        }
        res
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io;

    fn cursor(bytes: &[u8]) -> Cursor<io::Cursor<&[u8]>> {
        Cursor::new(io::Cursor::new(bytes))
    }

    /// Source which counts reads and seeks, optionally refusing to seek
    struct Counting<'a> {
        inner: io::Cursor<&'a [u8]>,
        read: usize,
        seeks: usize,
        seekable: bool,
    }

    impl<'a> Counting<'a> {
        fn new(bytes: &'a [u8], seekable: bool) -> Self {
            Counting {
                inner: io::Cursor::new(bytes),
                read: 0,
                seeks: 0,
                seekable,
            }
        }
    }

    impl Read for Counting<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.inner.read(buf)?;
            self.read += n;
            Ok(n)
        }
    }

    impl Seek for Counting<'_> {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.seeks += 1;
            if self.seekable {
                self.inner.seek(pos)
            } else {
                Err(io::Error::other("not seekable"))
            }
        }
    }

    #[test]
    fn peek_does_not_advance() -> Result<()> {
        let mut c = cursor(&[0x21, 0xF9, 0x04]);
        assert_eq!(c.peek::<2>()?, [0x21, 0xF9]);
        assert_eq!(c.offset(), 0);
        assert_eq!(c.peek::<1>()?, [0x21]);
        assert_eq!(c.read_u8()?, 0x21);
        assert_eq!(c.offset(), 1);
        assert_eq!(c.peek::<2>()?, [0xF9, 0x04]);
        assert_eq!(c.offset(), 1);
        Ok(())
    }

    #[test]
    fn peek_without_seeking() -> Result<()> {
        let bytes = [0x21, 0xFE, 0x02, b'h', b'i', 0x00, 0x3B];
        let mut c = Cursor::new(Counting::new(&bytes, true));
        assert_eq!(c.classify()?, BlockKind::Comment);
        c.expect(BlockKind::Comment)?;
        assert_eq!(c.read_array::<2>()?, [0x21, 0xFE]);
        assert_eq!(c.read_sub_blocks()?, b"hi");
        assert_eq!(c.classify()?, BlockKind::Trailer);
        assert_eq!(c.read_u8()?, 0x3B);
        assert_eq!(c.offset(), bytes.len() as u64);
        assert_eq!(c.reader.read, bytes.len());
        assert_eq!(c.reader.seeks, 0);
        Ok(())
    }

    #[test]
    fn truncated_when_rewind_fails() {
        let mut c = Cursor::new(Counting::new(&[0x34], false));
        assert!(matches!(c.read_u16(), Err(Error::Truncated { offset: 0, .. })));
        assert!(matches!(c.peek::<2>(), Err(Error::Truncated { offset: 0, .. })));
        assert_eq!(c.offset(), 0);
        assert_eq!(c.reader.seeks, 2);
    }

    #[test]
    fn classify_blocks() -> Result<()> {
        let cases: [(&[u8], BlockKind); 7] = [
            (&[0x21, 0xF9], BlockKind::GraphicControl),
            (&[0x21, 0xFF], BlockKind::Application),
            (&[0x21, 0xFE], BlockKind::Comment),
            (&[0x21, 0x01], BlockKind::PlainText),
            (&[0x2C, 0x00], BlockKind::ImageDesc),
            (&[0x3B], BlockKind::Trailer),
            (
                &[0x99, 0x00],
                BlockKind::Unknown {
                    code: 0x99,
                    label: None,
                },
            ),
        ];
        for (bytes, kind) in cases {
            let mut c = cursor(bytes);
            assert_eq!(c.classify()?, kind);
            assert_eq!(c.offset(), 0);
        }
        Ok(())
    }

    #[test]
    fn classify_at_end() {
        let mut c = cursor(&[]);
        assert!(matches!(c.classify(), Err(Error::Truncated { offset: 0, .. })));
        let mut c = cursor(&[0x21]);
        assert!(matches!(c.classify(), Err(Error::Truncated { offset: 0, .. })));
        assert_eq!(c.offset(), 0);
    }

    #[test]
    fn little_endian() -> Result<()> {
        let mut c = cursor(&[0x34, 0x12, 0xFF]);
        assert_eq!(c.read_u16()?, 0x1234);
        assert!(matches!(c.read_u16(), Err(Error::Truncated { offset: 2, .. })));
        assert_eq!(c.offset(), 2);
        Ok(())
    }

    #[test]
    fn sub_blocks() -> Result<()> {
        let mut bytes = vec![255];
        bytes.extend(std::iter::repeat(1).take(255));
        bytes.push(255);
        bytes.extend(std::iter::repeat(2).take(255));
        bytes.push(10);
        bytes.extend(std::iter::repeat(3).take(10));
        bytes.push(0);
        bytes.push(0x3B);
        let mut c = cursor(&bytes);
        let data = c.read_sub_blocks()?;
        assert_eq!(data.len(), 520);
        assert_eq!(data[0], 1);
        assert_eq!(data[255], 2);
        assert_eq!(data[519], 3);
        assert_eq!(c.offset(), 1 + 255 + 1 + 255 + 1 + 10 + 1);
        assert_eq!(c.read_u8()?, 0x3B);
        Ok(())
    }

    #[test]
    fn empty_sub_blocks() -> Result<()> {
        let mut c = cursor(&[0, 0x3B]);
        assert!(c.read_sub_blocks()?.is_empty());
        assert_eq!(c.offset(), 1);
        Ok(())
    }

    #[test]
    fn truncated_sub_blocks() {
        let mut c = cursor(&[4, 1, 2]);
        assert!(matches!(
            c.read_sub_blocks(),
            Err(Error::Truncated { offset: 1, .. })
        ));
    }

    #[test]
    fn restore_on_failure() -> Result<()> {
        let mut c = cursor(&[1, 2, 3, 4]);
        c.read_u8()?;
        let res: Result<()> = c.restoring(|c| {
            c.read_u16()?;
            c.read_u16()?;
            Ok(())
        });
        assert!(res.is_err());
        assert_eq!(c.offset(), 1);
        assert_eq!(c.read_u8()?, 2);
        Ok(())
    }

    #[test]
    fn expect_kind() {
        let mut c = cursor(&[0x21, 0xFE, 0x00]);
        assert!(c.expect(BlockKind::Comment).is_ok());
        assert!(matches!(
            c.expect(BlockKind::Application),
            Err(Error::UnexpectedBlock {
                offset: 0,
                expected: BlockKind::Application,
                found: BlockKind::Comment,
            })
        ));
    }
}
