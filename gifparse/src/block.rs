// block.rs
//
// Copyright (c) 2019-2024  Douglas Lau
//
//! GIF blocks, as described in the GIF89a specification
use pix::rgb::SRgb8;
use std::borrow::Cow;
use std::fmt;

/// Number of bytes per color table entry
const CHANNELS: usize = 3;

/// Number of bytes shown at each end of a hex dump
const DUMP_BYTES: usize = 7;

/// Get the byte length of a color table from its size exponent.
///
/// The exponent is the 3-bit field from a packed byte; a table holds
/// `2^(exponent + 1)` RGB triplets.
pub fn color_table_size(exponent: u8) -> usize {
    CHANNELS * (2 << (exponent & 0b0111))
}

/// Block type, identified by its leading byte(s)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Graphic Control Extension (`0x21 0xF9`)
    GraphicControl,
    /// Application Extension (`0x21 0xFF`)
    Application,
    /// Comment Extension (`0x21 0xFE`)
    Comment,
    /// Plain Text Extension (`0x21 0x01`)
    PlainText,
    /// Image Descriptor (`0x2C`)
    ImageDesc,
    /// Trailer (`0x3B`)
    Trailer,
    /// Anything else
    Unknown {
        /// Leading byte
        code: u8,
        /// Extension label, when the leading byte is an introducer
        label: Option<u8>,
    },
}

impl BlockKind {
    /// Extension introducer
    pub(crate) const EXTENSION: u8 = b'!'; // 0x21
    /// Image separator
    pub(crate) const IMAGE_DESC: u8 = b','; // 0x2C
    /// GIF trailer
    pub(crate) const TRAILER: u8 = b';'; // 0x3B

    /// Classify a leading byte, plus the label byte of extensions.
    pub(crate) fn from_bytes(code: u8, label: Option<u8>) -> Self {
        use self::BlockKind::*;
        match (code, label) {
            (Self::EXTENSION, Some(0xF9)) => GraphicControl,
            (Self::EXTENSION, Some(0xFF)) => Application,
            (Self::EXTENSION, Some(0xFE)) => Comment,
            (Self::EXTENSION, Some(0x01)) => PlainText,
            (Self::IMAGE_DESC, _) => ImageDesc,
            (Self::TRAILER, _) => Trailer,
            _ => Unknown { code, label },
        }
    }

    /// Get the block name
    pub fn name(&self) -> &'static str {
        use self::BlockKind::*;
        match self {
            GraphicControl => "Graphic Control Extension",
            Application => "Application Extension",
            Comment => "Comment Extension",
            PlainText => "Plain Text Extension",
            ImageDesc => "Image Descriptor",
            Trailer => "Trailer",
            Unknown { .. } => "Unknown Block",
        }
    }
}

/// Set of blocks a block applies to
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BlockScope {
    /// Applies to nothing else
    NoScope,
    /// Applies to the next graphic rendering block
    GraphicRenderingBlock,
}

/// Color table flags, from a descriptor's packed byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTableConfig {
    present: bool,
    sorted: bool,
    exponent: u8,
}

impl ColorTableConfig {
    fn with_flags(present: bool, sorted: bool, exponent: u8) -> Self {
        let exponent = exponent & 0b0111;
        ColorTableConfig {
            present,
            sorted,
            exponent,
        }
    }
    /// Check if the table follows the descriptor
    pub fn is_present(&self) -> bool {
        self.present
    }
    /// Check if the table is sorted by decreasing importance
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }
    /// Get the 3-bit size exponent
    pub fn exponent(&self) -> u8 {
        self.exponent
    }
    /// Get the number of entries (zero when absent)
    pub fn len(&self) -> usize {
        if self.present {
            2 << self.exponent
        } else {
            0
        }
    }
    /// Check if there are no entries
    pub fn is_empty(&self) -> bool {
        !self.present
    }
    /// Get the table size in bytes (zero when absent)
    pub fn size_bytes(&self) -> usize {
        if self.present {
            color_table_size(self.exponent)
        } else {
            0
        }
    }
}

/// Method used to dispose of a frame before drawing the next one
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisposalMethod {
    /// No disposal specified
    Unspecified,
    /// Leave the frame in place
    DoNotDispose,
    /// Restore the area to the background color
    RestoreBackground,
    /// Restore the area to its previous contents
    RestorePrevious,
    /// Values 4-7
    Reserved(u8),
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        use self::DisposalMethod::*;
        match n & 0b0111 {
            0 => Unspecified,
            1 => DoNotDispose,
            2 => RestoreBackground,
            3 => RestorePrevious,
            _ => Reserved(n & 0b0111),
        }
    }
}

impl fmt::Display for DisposalMethod {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use self::DisposalMethod::*;
        match self {
            Unspecified => write!(fmt, "unspecified"),
            DoNotDispose => write!(fmt, "do not dispose"),
            RestoreBackground => write!(fmt, "restore background"),
            RestorePrevious => write!(fmt, "restore previous"),
            Reserved(n) => write!(fmt, "reserved ({n})"),
        }
    }
}

/// Header block (signature and version)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub(crate) version: [u8; 3],
}

impl Header {
    /// Block size in bytes
    pub(crate) const SIZE: usize = 6;

    /// Get the version (`87a` or `89a`)
    pub fn version(&self) -> [u8; 3] {
        self.version
    }
}

impl fmt::Display for Header {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "GIF{}", String::from_utf8_lossy(&self.version))
    }
}

/// Logical Screen Descriptor block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalScreenDesc {
    pub(crate) screen_width: u16,
    pub(crate) screen_height: u16,
    pub(crate) flags: u8,
    pub(crate) background_color_idx: u8, // index into global color table
    pub(crate) pixel_aspect_ratio: u8,
}

impl LogicalScreenDesc {
    /// Block size in bytes
    pub(crate) const SIZE: usize = 7;

    const COLOR_TABLE_PRESENT: u8  = 0b1000_0000;
    const COLOR_RESOLUTION: u8     = 0b0111_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0000_1000;
    const COLOR_TABLE_SIZE: u8     = 0b0000_0111;

    /// Get the screen width
    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }
    /// Get the screen height
    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }
    /// Get the packed fields
    pub fn flags(&self) -> u8 {
        self.flags
    }
    /// Check if a global color table follows
    pub fn has_global_color_table(&self) -> bool {
        self.flags & Self::COLOR_TABLE_PRESENT != 0
    }
    /// Get the raw color resolution field (bits per primary, minus 1)
    pub fn color_resolution_bits(&self) -> u8 {
        (self.flags & Self::COLOR_RESOLUTION) >> 4
    }
    /// Get the number of values per primary color of the original image
    pub fn color_resolution(&self) -> u16 {
        2 << self.color_resolution_bits()
    }
    /// Get the global color table config
    pub fn color_table_config(&self) -> ColorTableConfig {
        ColorTableConfig::with_flags(
            self.has_global_color_table(),
            self.flags & Self::COLOR_TABLE_ORDERING != 0,
            self.flags & Self::COLOR_TABLE_SIZE,
        )
    }
    /// Get the background color index
    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }
    /// Get the raw pixel aspect ratio byte
    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }
    /// Get the pixel aspect ratio (width / height)
    pub fn aspect_ratio(&self) -> f32 {
        match self.pixel_aspect_ratio {
            0 => 1.0,
            r => (f32::from(r) + 15.0) / 64.0,
        }
    }
}

impl fmt::Display for LogicalScreenDesc {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let config = self.color_table_config();
        writeln!(fmt, "Logical Screen Descriptor")?;
        writeln!(fmt, "  size: {}x{}", self.screen_width, self.screen_height)?;
        writeln!(fmt, "  global color table: {}", config.is_present())?;
        writeln!(fmt, "  color resolution: {}", self.color_resolution())?;
        writeln!(fmt, "  sorted: {}", config.is_sorted())?;
        writeln!(fmt, "  table size exponent: {}", config.exponent())?;
        writeln!(fmt, "  background color: {}", self.background_color_idx)?;
        writeln!(fmt, "  pixel aspect ratio: {}", self.pixel_aspect_ratio)
    }
}

/// Global or local color table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTable {
    pub(crate) offset: u64,
    pub(crate) colors: Vec<u8>,
}

impl ColorTable {
    /// Get the offset of the table
    pub fn offset(&self) -> u64 {
        self.offset
    }
    /// Get the number of colors
    pub fn len(&self) -> usize {
        self.colors.len() / CHANNELS
    }
    /// Check if the table has no colors
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
    /// Get the raw RGB bytes
    pub fn colors(&self) -> &[u8] {
        &self.colors
    }
    /// Get one color as an RGB triplet
    pub fn rgb(&self, idx: usize) -> Option<[u8; 3]> {
        let c = self.colors.get(idx * CHANNELS..(idx + 1) * CHANNELS)?;
        Some([c[0], c[1], c[2]])
    }
    /// Convert to a palette
    pub fn to_palette(&self) -> Vec<SRgb8> {
        self.colors
            .chunks_exact(CHANNELS)
            .map(|c| SRgb8::new(c[0], c[1], c[2]))
            .collect()
    }
}

impl fmt::Display for ColorTable {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let end = self.offset + self.colors.len() as u64;
        writeln!(fmt, "Color Table @ {:#x}..{:#x}", self.offset, end)?;
        for (i, c) in self.colors.chunks_exact(CHANNELS).enumerate() {
            writeln!(fmt, "  {i:3}: ({}, {}, {})", c[0], c[1], c[2])?;
        }
        Ok(())
    }
}

/// Graphic Control Extension block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphicControl {
    pub(crate) offset: u64,
    pub(crate) flags: u8,
    pub(crate) delay_time_cs: u16, // delay in centiseconds
    pub(crate) transparent_color_idx: u8,
}

impl GraphicControl {
    /// Block size literal
    pub(crate) const BLOCK_SIZE: u8 = 4;

    #[allow(dead_code)]
    const RESERVED: u8          = 0b1110_0000;
    const DISPOSAL_METHOD: u8   = 0b0001_1100;
    const USER_INPUT: u8        = 0b0000_0010;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    /// Get the offset of the block
    pub fn offset(&self) -> u64 {
        self.offset
    }
    /// Get the packed fields
    pub fn flags(&self) -> u8 {
        self.flags
    }
    /// Get the disposal method
    pub fn disposal_method(&self) -> DisposalMethod {
        ((self.flags & Self::DISPOSAL_METHOD) >> 2).into()
    }
    /// Check if user input is expected before continuing
    pub fn user_input(&self) -> bool {
        self.flags & Self::USER_INPUT != 0
    }
    /// Check if the transparency flag is set
    pub fn has_transparency(&self) -> bool {
        self.flags & Self::TRANSPARENT_COLOR != 0
    }
    /// Get the transparent color index, if the flag is set
    pub fn transparent_color(&self) -> Option<u8> {
        if self.has_transparency() {
            Some(self.transparent_color_idx)
        } else {
            None
        }
    }
    /// Get the raw transparent color index
    pub fn transparent_color_idx(&self) -> u8 {
        self.transparent_color_idx
    }
    /// Get the delay time in centiseconds
    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }
    /// Get the delay time in milliseconds
    pub fn delay_ms(&self) -> u32 {
        u32::from(self.delay_time_cs) * 10
    }
}

impl fmt::Display for GraphicControl {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        writeln!(fmt, "{} @ {:#x}", BlockKind::GraphicControl.name(), self.offset)?;
        writeln!(fmt, "  disposal: {}", self.disposal_method())?;
        writeln!(fmt, "  user input: {}", self.user_input())?;
        writeln!(fmt, "  delay: {} ms", self.delay_ms())?;
        match self.transparent_color() {
            Some(idx) => writeln!(fmt, "  transparent color: {idx}"),
            None => writeln!(fmt, "  transparent color: -"),
        }
    }
}

/// Application Extension block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Application {
    pub(crate) offset: u64,
    pub(crate) app_id: [u8; 8],
    pub(crate) auth_code: [u8; 3],
    pub(crate) app_data: Vec<u8>,
}

impl Application {
    /// Block size literal (identifier + authentication code)
    pub(crate) const BLOCK_SIZE: u8 = 11;

    /// Get the offset of the block
    pub fn offset(&self) -> u64 {
        self.offset
    }
    /// Get the application identifier
    pub fn app_id(&self) -> &[u8; 8] {
        &self.app_id
    }
    /// Get the authentication code
    pub fn auth_code(&self) -> &[u8; 3] {
        &self.auth_code
    }
    /// Get the reassembled application data
    pub fn app_data(&self) -> &[u8] {
        &self.app_data
    }
    fn is_looping(&self) -> bool {
        let id = (&self.app_id, &self.auth_code);
        id == (b"NETSCAPE", b"2.0") || id == (b"ANIMEXTS", b"1.0")
    }
    /// Get the animation loop count (zero means loop forever)
    pub fn loop_count(&self) -> Option<u16> {
        match self.app_data[..] {
            [1, lo, hi] if self.is_looping() => {
                Some(u16::from(hi) << 8 | u16::from(lo))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        writeln!(fmt, "{} @ {:#x}", BlockKind::Application.name(), self.offset)?;
        writeln!(
            fmt,
            "  application: {}{}",
            String::from_utf8_lossy(&self.app_id),
            String::from_utf8_lossy(&self.auth_code),
        )?;
        writeln!(fmt, "  data size: {}", self.app_data.len())?;
        if let Some(count) = self.loop_count() {
            writeln!(fmt, "  loop count: {count}")?;
        }
        Ok(())
    }
}

/// Comment Extension block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    pub(crate) offset: u64,
    pub(crate) data: Vec<u8>, // ascii only recommended
}

impl Comment {
    /// Get the offset of the block
    pub fn offset(&self) -> u64 {
        self.offset
    }
    /// Get the reassembled comment bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    /// Get the comment as text
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        writeln!(fmt, "{} @ {:#x}", BlockKind::Comment.name(), self.offset)?;
        writeln!(fmt, "  {}", self.text())
    }
}

/// Plain Text Extension block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlainText {
    pub(crate) offset: u64,
    pub(crate) grid_left: u16,
    pub(crate) grid_top: u16,
    pub(crate) grid_width: u16,
    pub(crate) grid_height: u16,
    pub(crate) cell_width: u8,
    pub(crate) cell_height: u8,
    pub(crate) fg_color_idx: u8,
    pub(crate) bg_color_idx: u8,
    pub(crate) text: Vec<u8>,
}

impl PlainText {
    /// Block size literal
    pub(crate) const BLOCK_SIZE: u8 = 12;

    /// Get the offset of the block
    pub fn offset(&self) -> u64 {
        self.offset
    }
    /// Get the text grid position (left, top)
    pub fn grid_position(&self) -> (u16, u16) {
        (self.grid_left, self.grid_top)
    }
    /// Get the text grid size (width, height)
    pub fn grid_size(&self) -> (u16, u16) {
        (self.grid_width, self.grid_height)
    }
    /// Get the character cell size (width, height)
    pub fn cell_size(&self) -> (u8, u8) {
        (self.cell_width, self.cell_height)
    }
    /// Get the foreground color index
    pub fn fg_color_idx(&self) -> u8 {
        self.fg_color_idx
    }
    /// Get the background color index
    pub fn bg_color_idx(&self) -> u8 {
        self.bg_color_idx
    }
    /// Get the reassembled text bytes
    pub fn text(&self) -> &[u8] {
        &self.text
    }
}

impl fmt::Display for PlainText {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        writeln!(fmt, "{} @ {:#x}", BlockKind::PlainText.name(), self.offset)?;
        writeln!(fmt, "  grid: {},{}", self.grid_left, self.grid_top)?;
        writeln!(fmt, "  grid size: {}x{}", self.grid_width, self.grid_height)?;
        writeln!(fmt, "  cell size: {}x{}", self.cell_width, self.cell_height)?;
        writeln!(fmt, "  colors: {} on {}", self.fg_color_idx, self.bg_color_idx)?;
        writeln!(fmt, "  {}", String::from_utf8_lossy(&self.text))
    }
}

/// Extension block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extension {
    /// Application extension
    Application(Application),
    /// Graphic control extension
    GraphicControl(GraphicControl),
    /// Comment extension
    Comment(Comment),
    /// Plain text extension
    PlainText(PlainText),
}

impl Extension {
    /// Get the block kind
    pub fn kind(&self) -> BlockKind {
        match self {
            Extension::Application(_) => BlockKind::Application,
            Extension::GraphicControl(_) => BlockKind::GraphicControl,
            Extension::Comment(_) => BlockKind::Comment,
            Extension::PlainText(_) => BlockKind::PlainText,
        }
    }
    /// Get the extension name
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
    /// Get the set of blocks the extension applies to
    pub fn scope(&self) -> BlockScope {
        match self {
            Extension::Application(_) | Extension::Comment(_) => {
                BlockScope::NoScope
            }
            Extension::GraphicControl(_) | Extension::PlainText(_) => {
                BlockScope::GraphicRenderingBlock
            }
        }
    }
    /// Get the offset of the block
    pub fn offset(&self) -> u64 {
        match self {
            Extension::Application(b) => b.offset,
            Extension::GraphicControl(b) => b.offset,
            Extension::Comment(b) => b.offset,
            Extension::PlainText(b) => b.offset,
        }
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Extension::Application(b) => fmt::Display::fmt(b, fmt),
            Extension::GraphicControl(b) => fmt::Display::fmt(b, fmt),
            Extension::Comment(b) => fmt::Display::fmt(b, fmt),
            Extension::PlainText(b) => fmt::Display::fmt(b, fmt),
        }
    }
}

impl From<Application> for Extension {
    fn from(b: Application) -> Self {
        Extension::Application(b)
    }
}

impl From<GraphicControl> for Extension {
    fn from(b: GraphicControl) -> Self {
        Extension::GraphicControl(b)
    }
}

impl From<Comment> for Extension {
    fn from(b: Comment) -> Self {
        Extension::Comment(b)
    }
}

impl From<PlainText> for Extension {
    fn from(b: PlainText) -> Self {
        Extension::PlainText(b)
    }
}

/// Image Descriptor block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDesc {
    pub(crate) offset: u64,
    pub(crate) left: u16,
    pub(crate) top: u16,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) flags: u8,
}

impl ImageDesc {
    /// Block size in bytes, including the separator
    pub(crate) const SIZE: usize = 10;

    const COLOR_TABLE_PRESENT: u8  = 0b1000_0000;
    const INTERLACED: u8           = 0b0100_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0010_0000;
    #[allow(dead_code)]
    const RESERVED: u8             = 0b0001_1000;
    const COLOR_TABLE_SIZE: u8     = 0b0000_0111;

    /// Get the offset of the block
    pub fn offset(&self) -> u64 {
        self.offset
    }
    /// Get the left position within the screen
    pub fn left(&self) -> u16 {
        self.left
    }
    /// Get the top position within the screen
    pub fn top(&self) -> u16 {
        self.top
    }
    /// Get the image width
    pub fn width(&self) -> u16 {
        self.width
    }
    /// Get the image height
    pub fn height(&self) -> u16 {
        self.height
    }
    /// Get the packed fields
    pub fn flags(&self) -> u8 {
        self.flags
    }
    /// Check if the image is interlaced
    pub fn interlaced(&self) -> bool {
        self.flags & Self::INTERLACED != 0
    }
    /// Get the local color table config
    pub fn color_table_config(&self) -> ColorTableConfig {
        ColorTableConfig::with_flags(
            self.flags & Self::COLOR_TABLE_PRESENT != 0,
            self.flags & Self::COLOR_TABLE_ORDERING != 0,
            self.flags & Self::COLOR_TABLE_SIZE,
        )
    }
    /// Get the image size in pixels
    pub fn image_sz(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

impl fmt::Display for ImageDesc {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let config = self.color_table_config();
        writeln!(fmt, "{} @ {:#x}", BlockKind::ImageDesc.name(), self.offset)?;
        writeln!(fmt, "  position: {},{}", self.left, self.top)?;
        writeln!(fmt, "  size: {}x{}", self.width, self.height)?;
        writeln!(fmt, "  local color table: {}", config.len())?;
        writeln!(fmt, "  interlaced: {}", self.interlaced())?;
        writeln!(fmt, "  sorted: {}", config.is_sorted())
    }
}

/// Table-Based Image Data block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub(crate) offset: u64,
    pub(crate) min_code_size: u8,
    pub(crate) data: Vec<u8>,
}

impl ImageData {
    /// Get the offset of the block
    pub fn offset(&self) -> u64 {
        self.offset
    }
    /// Get the LZW minimum code size
    pub fn min_code_size(&self) -> u8 {
        self.min_code_size
    }
    /// Get the reassembled (compressed) data
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for ImageData {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        writeln!(fmt, "Image Data @ {:#x}", self.offset)?;
        writeln!(fmt, "  lzw minimum code size: {}", self.min_code_size)?;
        writeln!(fmt, "  compressed size: {}", self.data.len())?;
        let len = self.data.len();
        if len > DUMP_BYTES * 2 {
            writeln!(
                fmt,
                "  data: {} .. {}",
                HexDump(&self.data[..DUMP_BYTES]),
                HexDump(&self.data[len - DUMP_BYTES..]),
            )
        } else {
            writeln!(fmt, "  data: {}", HexDump(&self.data))
        }
    }
}

/// Space-separated hex bytes
struct HexDump<'a>(&'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                write!(fmt, " ")?;
            }
            write!(fmt, "{b:02x}")?;
        }
        Ok(())
    }
}

/// One image, with the blocks which apply to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicRenderingBlock {
    /// Preceding control extension
    pub graphic_control_ext: Option<GraphicControl>,
    /// Image descriptor
    pub image_desc: ImageDesc,
    /// Local color table (authoritative when present)
    pub local_color_table: Option<ColorTable>,
    /// Compressed image data
    pub image_data: ImageData,
    /// Offset just past the image data terminator
    pub end: u64,
}

impl GraphicRenderingBlock {
    /// Get the offset of the first block (control extension or descriptor)
    pub fn offset(&self) -> u64 {
        match &self.graphic_control_ext {
            Some(gc) => gc.offset,
            None => self.image_desc.offset,
        }
    }
    /// Get the frame width
    pub fn width(&self) -> u16 {
        self.image_desc.width
    }
    /// Get the frame height
    pub fn height(&self) -> u16 {
        self.image_desc.height
    }
}

impl fmt::Display for GraphicRenderingBlock {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        writeln!(fmt, "Graphic Rendering Block @ {:#x}..{:#x}", self.offset(), self.end)?;
        if let Some(gc) = &self.graphic_control_ext {
            write!(fmt, "{gc}")?;
        }
        write!(fmt, "{}", self.image_desc)?;
        if let Some(tbl) = &self.local_color_table {
            write!(fmt, "{tbl}")?;
        }
        write!(fmt, "{}", self.image_data)
    }
}

/// Plain text, with the control extension which applies to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRenderingBlock {
    /// Preceding control extension
    pub graphic_control_ext: Option<GraphicControl>,
    /// Plain text extension
    pub plain_text: PlainText,
}

impl fmt::Display for TextRenderingBlock {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        if let Some(gc) = &self.graphic_control_ext {
            write!(fmt, "{gc}")?;
        }
        write!(fmt, "{}", self.plain_text)
    }
}
