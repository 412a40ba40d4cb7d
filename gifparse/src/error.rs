// error.rs
//
// Copyright (c) 2019-2024  Douglas Lau
//
use crate::block::BlockKind;
use std::fmt;
use std::io;

/// Errors encountered while parsing or rendering
#[derive(Debug)]
pub enum Error {
    /// A wrapped I/O error (seek failure).
    Io(io::Error),
    /// Byte source ended (or failed) before a block was complete.
    Truncated {
        /// Offset of the read which failed
        offset: u64,
        /// Underlying read error
        source: io::Error,
    },
    /// [Header](block/struct.Header.html) does not start with `GIF`.
    MalformedHeader([u8; 6]),
    /// GIF version not supported (87a or 89a only).
    UnsupportedVersion([u8; 3]),
    /// A block was parsed at a position holding a different block.
    UnexpectedBlock {
        /// Block start offset
        offset: u64,
        /// Block the parser was asked for
        expected: BlockKind,
        /// Block actually found
        found: BlockKind,
    },
    /// Fixed block size byte does not hold its literal value.
    InvalidBlockSize {
        /// Block containing the size byte
        block: BlockKind,
        /// Offset of the size byte
        offset: u64,
        /// Literal block size
        expected: u8,
        /// Block size found
        found: u8,
    },
    /// Fixed-size block is not followed by a zero terminator.
    InvalidBlockTerminator {
        /// Block missing its terminator
        block: BlockKind,
        /// Offset of the terminator byte
        offset: u64,
        /// Byte found in place of the terminator
        found: u8,
    },
    /// Block code (or extension label) is unknown.
    UnrecognizedBlock {
        /// Block start offset
        offset: u64,
        /// Block introducer byte
        code: u8,
        /// Extension label (for `0x21` introducers)
        label: Option<u8>,
    },
    /// Image larger than specified by
    /// [max_image_sz](struct.Decoder.html#method.max_image_sz).
    TooLargeImage {
        /// Image descriptor offset
        offset: u64,
        /// Image size in pixels
        size: usize,
    },
    /// LZW minimum code size outside of 2..=8.
    InvalidCodeSize(u8),
    /// Compressed LZW data invalid or corrupt.
    InvalidLzwData,
    /// Frame index past the last frame.
    FrameOutOfRange {
        /// Requested frame index
        index: usize,
        /// Number of frames
        count: usize,
    },
    /// Missing color table for a frame.
    MissingColorTable,
    /// Color index not within the frame's color table.
    InvalidColorIndex {
        /// Palette index found in the image data
        index: u8,
        /// Number of palette entries
        len: usize,
    },
    /// Frame has zero width or height.
    InvalidFrameDimensions,
    /// Resize target width of zero.
    InvalidTargetWidth,
}

/// Parser result type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => fmt::Display::fmt(err, fmt),
            Error::Truncated { offset, source } => {
                write!(fmt, "truncated at {offset:#x}: {source}")
            }
            Error::MalformedHeader(sig) => {
                write!(fmt, "malformed header: {:?}", String::from_utf8_lossy(sig))
            }
            Error::UnsupportedVersion(v) => {
                write!(fmt, "unsupported version: {:?}", String::from_utf8_lossy(v))
            }
            Error::UnexpectedBlock {
                offset,
                expected,
                found,
            } => write!(
                fmt,
                "expected {} at {offset:#x}, found {}",
                expected.name(),
                found.name()
            ),
            Error::InvalidBlockSize {
                block,
                offset,
                expected,
                found,
            } => write!(
                fmt,
                "{} block size at {offset:#x}: expected {expected}, found {found}",
                block.name()
            ),
            Error::InvalidBlockTerminator {
                block,
                offset,
                found,
            } => write!(
                fmt,
                "{} terminator at {offset:#x}: expected 0, found {found:#04x}",
                block.name()
            ),
            Error::UnrecognizedBlock {
                offset,
                code,
                label: Some(label),
            } => write!(
                fmt,
                "unrecognized block at {offset:#x}: {code:#04x} {label:#04x}"
            ),
            Error::UnrecognizedBlock { offset, code, .. } => {
                write!(fmt, "unrecognized block at {offset:#x}: {code:#04x}")
            }
            Error::TooLargeImage { offset, size } => {
                write!(fmt, "image at {offset:#x} too large: {size} pixels")
            }
            Error::FrameOutOfRange { index, count } => {
                write!(fmt, "frame {index} out of range ({count} frames)")
            }
            Error::InvalidColorIndex { index, len } => {
                write!(fmt, "color index {index} out of range ({len} colors)")
            }
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Truncated { ref source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
