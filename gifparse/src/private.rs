// private.rs
//
// Copyright (c) 2019-2024  Douglas Lau
//
//! Private module for top-level items
use crate::{
    block::{
        Application, ColorTable, Comment, Extension, GraphicRenderingBlock,
        Header, LogicalScreenDesc, TextRenderingBlock,
    },
    cursor::Cursor,
    decode, Result,
};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

/// Default maximum image size, in pixels
const MAX_IMAGE_SZ: usize = 1 << 25;

/// GIF file decoder
///
/// ## Example: Render the first frame of a GIF
/// ```
/// use gifparse::Decoder;
/// use std::io::Cursor;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// // ... open a `File` as "gif"
/// let gif = Decoder::new(Cursor::new(gif)).parse()?;
/// if gif.frame_count() > 0 {
///     let frame = gif.render_frame(0)?;
///     let raster = frame.to_rgba();
///     // ... work with raster
/// }
/// # Ok(())
/// # }
/// ```
pub struct Decoder<R: Read + Seek> {
    /// Reader for input data
    reader: R,
    /// Maximum image size, in pixels
    max_image_sz: Option<usize>,
    /// Name of the source file
    filename: Option<PathBuf>,
}

impl<R: Read + Seek> Decoder<BufReader<R>> {
    /// Create a new buffered GIF decoder.
    pub fn new(reader: R) -> Self {
        Self::new_unbuffered(BufReader::new(reader))
    }
}

impl<R: Read + Seek> Decoder<R> {
    /// Create a new unbuffered GIF decoder.
    pub fn new_unbuffered(reader: R) -> Self {
        Decoder {
            reader,
            max_image_sz: Some(MAX_IMAGE_SZ),
            filename: None,
        }
    }

    /// Set the maximum image size (in pixels) to allow for decoding.
    pub fn max_image_sz(mut self, max_image_sz: Option<usize>) -> Self {
        self.max_image_sz = max_image_sz;
        self
    }

    /// Set the file name recorded in the parsed GIF.
    pub fn filename<P: AsRef<Path>>(mut self, filename: P) -> Self {
        self.filename = Some(filename.as_ref().to_path_buf());
        self
    }

    /// Parse the whole data stream, up to the trailer.
    ///
    /// The reader must be positioned at the start of the GIF.
    pub fn parse(self) -> Result<ParsedGif> {
        let mut cursor = Cursor::new(self.reader);
        let mut gif = decode::parse_stream(&mut cursor, self.max_image_sz)?;
        gif.filename = self.filename;
        Ok(gif)
    }
}

/// Parse a GIF from a seekable reader, with default settings.
pub fn parse<R: Read + Seek>(reader: R) -> Result<ParsedGif> {
    Decoder::new(reader).parse()
}

/// Open and parse a GIF file.
pub fn open<P: AsRef<Path>>(path: P) -> Result<ParsedGif> {
    let path = path.as_ref();
    let file = File::open(path)?;
    Decoder::new(file).filename(path).parse()
}

/// A parsed GIF data stream.
///
/// Blocks are kept in file order within each sequence, and every block
/// records its starting offset.
#[derive(Debug, Clone)]
pub struct ParsedGif {
    pub(crate) filename: Option<PathBuf>,
    pub(crate) header: Header,
    pub(crate) screen_desc: LogicalScreenDesc,
    pub(crate) global_color_table: Option<ColorTable>,
    pub(crate) extensions: Vec<Extension>,
    pub(crate) frames: Vec<GraphicRenderingBlock>,
    pub(crate) text_blocks: Vec<TextRenderingBlock>,
    pub(crate) trailer_offset: u64,
}

impl ParsedGif {
    /// Get the file name, if opened from a file
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Get the header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Get the logical screen descriptor
    pub fn screen_desc(&self) -> &LogicalScreenDesc {
        &self.screen_desc
    }

    /// Get the global color table
    pub fn global_color_table(&self) -> Option<&ColorTable> {
        self.global_color_table.as_ref()
    }

    /// Get the application and comment extensions
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Get all application extensions
    pub fn applications(&self) -> impl Iterator<Item = &Application> {
        self.extensions.iter().filter_map(|ext| match ext {
            Extension::Application(b) => Some(b),
            _ => None,
        })
    }

    /// Get all comment extensions
    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.extensions.iter().filter_map(|ext| match ext {
            Extension::Comment(b) => Some(b),
            _ => None,
        })
    }

    /// Get the animation loop count (zero means loop forever)
    pub fn loop_count(&self) -> Option<u16> {
        self.applications().find_map(Application::loop_count)
    }

    /// Get the number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Get the frames (graphic rendering blocks)
    pub fn frames(&self) -> &[GraphicRenderingBlock] {
        &self.frames
    }

    /// Get the plain text blocks
    pub fn text_blocks(&self) -> &[TextRenderingBlock] {
        &self.text_blocks
    }

    /// Get the offset of the trailer
    pub fn trailer_offset(&self) -> u64 {
        self.trailer_offset
    }
}

impl fmt::Display for ParsedGif {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        if let Some(filename) = &self.filename {
            writeln!(fmt, "{}", filename.display())?;
        }
        writeln!(fmt, "Header @ 0x0: {}", self.header)?;
        write!(fmt, "{}", self.screen_desc)?;
        if let Some(tbl) = &self.global_color_table {
            write!(fmt, "Global {tbl}")?;
        }
        for ext in &self.extensions {
            write!(fmt, "{ext}")?;
        }
        for frame in &self.frames {
            write!(fmt, "{frame}")?;
        }
        for text in &self.text_blocks {
            write!(fmt, "{text}")?;
        }
        writeln!(fmt, "Trailer @ {:#x}", self.trailer_offset)
    }
}
