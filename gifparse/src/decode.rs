// decode.rs
//
// Copyright (c) 2019-2024  Douglas Lau
//
//! GIF block parsers and stream orchestration
use crate::block::*;
use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::private::ParsedGif;
use std::io::{Read, Seek};

/// Read a fixed block size byte and check its literal value
fn check_block_size<R: Read + Seek>(
    c: &mut Cursor<R>,
    block: BlockKind,
    expected: u8,
) -> Result<()> {
    let offset = c.offset();
    let found = c.read_u8()?;
    if found == expected {
        Ok(())
    } else {
        Err(Error::InvalidBlockSize {
            block,
            offset,
            expected,
            found,
        })
    }
}

/// Read a block terminator and check that it is zero
fn check_terminator<R: Read + Seek>(
    c: &mut Cursor<R>,
    block: BlockKind,
) -> Result<()> {
    let offset = c.offset();
    match c.read_u8()? {
        0 => Ok(()),
        found => Err(Error::InvalidBlockTerminator {
            block,
            offset,
            found,
        }),
    }
}

/// Skip the introducer and label of an extension at the cursor
fn enter_extension<R: Read + Seek>(
    c: &mut Cursor<R>,
    kind: BlockKind,
) -> Result<u64> {
    c.expect(kind)?;
    let offset = c.offset();
    c.read_array::<2>()?;
    Ok(offset)
}

impl Header {
    /// Parse a header block
    pub(crate) fn parse<R: Read + Seek>(c: &mut Cursor<R>) -> Result<Self> {
        c.restoring(|c| {
            let buf = c.read_array::<{ Header::SIZE }>()?;
            if &buf[..3] != b"GIF" {
                return Err(Error::MalformedHeader(buf));
            }
            let version = [buf[3], buf[4], buf[5]];
            match &version {
                b"87a" | b"89a" => Ok(Header { version }),
                _ => Err(Error::UnsupportedVersion(version)),
            }
        })
    }
}

impl LogicalScreenDesc {
    /// Parse a logical screen descriptor block
    pub(crate) fn parse<R: Read + Seek>(c: &mut Cursor<R>) -> Result<Self> {
        let buf = c.read_array::<{ LogicalScreenDesc::SIZE }>()?;
        Ok(LogicalScreenDesc {
            screen_width: u16::from_le_bytes([buf[0], buf[1]]),
            screen_height: u16::from_le_bytes([buf[2], buf[3]]),
            flags: buf[4],
            background_color_idx: buf[5],
            pixel_aspect_ratio: buf[6],
        })
    }
}

impl ColorTable {
    /// Parse a color table with size from a descriptor
    pub(crate) fn parse<R: Read + Seek>(
        c: &mut Cursor<R>,
        config: ColorTableConfig,
    ) -> Result<Self> {
        let offset = c.offset();
        let colors = c.read_vec(config.size_bytes())?;
        debug!("Color Table @ {offset:#x}: {} colors", config.len());
        Ok(ColorTable { offset, colors })
    }
}

impl GraphicControl {
    /// Parse a graphic control extension
    pub(crate) fn parse<R: Read + Seek>(c: &mut Cursor<R>) -> Result<Self> {
        let kind = BlockKind::GraphicControl;
        c.restoring(|c| {
            let offset = enter_extension(c, kind)?;
            check_block_size(c, kind, Self::BLOCK_SIZE)?;
            let flags = c.read_u8()?;
            let delay_time_cs = c.read_u16()?;
            let transparent_color_idx = c.read_u8()?;
            check_terminator(c, kind)?;
            let gc = GraphicControl {
                offset,
                flags,
                delay_time_cs,
                transparent_color_idx,
            };
            if gc.transparent_color() == Some(0) {
                warn!("{} @ {offset:#x}: transparent color index 0", kind.name());
            }
            debug!("{} @ {offset:#x}", kind.name());
            Ok(gc)
        })
    }
}

impl Application {
    /// Parse an application extension
    pub(crate) fn parse<R: Read + Seek>(c: &mut Cursor<R>) -> Result<Self> {
        let kind = BlockKind::Application;
        c.restoring(|c| {
            let offset = enter_extension(c, kind)?;
            check_block_size(c, kind, Self::BLOCK_SIZE)?;
            let app_id = c.read_array::<8>()?;
            let auth_code = c.read_array::<3>()?;
            let app_data = c.read_sub_blocks()?;
            debug!(
                "{} @ {offset:#x}: {}, {} bytes",
                kind.name(),
                String::from_utf8_lossy(&app_id),
                app_data.len()
            );
            Ok(Application {
                offset,
                app_id,
                auth_code,
                app_data,
            })
        })
    }
}

impl Comment {
    /// Parse a comment extension
    pub(crate) fn parse<R: Read + Seek>(c: &mut Cursor<R>) -> Result<Self> {
        let kind = BlockKind::Comment;
        c.restoring(|c| {
            let offset = enter_extension(c, kind)?;
            let data = c.read_sub_blocks()?;
            debug!("{} @ {offset:#x}: {} bytes", kind.name(), data.len());
            Ok(Comment { offset, data })
        })
    }
}

impl PlainText {
    /// Parse a plain text extension
    pub(crate) fn parse<R: Read + Seek>(c: &mut Cursor<R>) -> Result<Self> {
        let kind = BlockKind::PlainText;
        c.restoring(|c| {
            let offset = enter_extension(c, kind)?;
            check_block_size(c, kind, Self::BLOCK_SIZE)?;
            let grid_left = c.read_u16()?;
            let grid_top = c.read_u16()?;
            let grid_width = c.read_u16()?;
            let grid_height = c.read_u16()?;
            let [cell_width, cell_height, fg_color_idx, bg_color_idx] =
                c.read_array::<4>()?;
            let text = c.read_sub_blocks()?;
            debug!("{} @ {offset:#x}: {} bytes", kind.name(), text.len());
            Ok(PlainText {
                offset,
                grid_left,
                grid_top,
                grid_width,
                grid_height,
                cell_width,
                cell_height,
                fg_color_idx,
                bg_color_idx,
                text,
            })
        })
    }
}

impl ImageDesc {
    /// Parse an image descriptor block
    pub(crate) fn parse<R: Read + Seek>(c: &mut Cursor<R>) -> Result<Self> {
        c.expect(BlockKind::ImageDesc)?;
        let offset = c.offset();
        let buf = c.read_array::<{ ImageDesc::SIZE }>()?;
        let desc = ImageDesc {
            offset,
            left: u16::from_le_bytes([buf[1], buf[2]]),
            top: u16::from_le_bytes([buf[3], buf[4]]),
            width: u16::from_le_bytes([buf[5], buf[6]]),
            height: u16::from_le_bytes([buf[7], buf[8]]),
            flags: buf[9],
        };
        debug!(
            "{} @ {offset:#x}: {}x{}",
            BlockKind::ImageDesc.name(),
            desc.width,
            desc.height
        );
        Ok(desc)
    }
}

impl ImageData {
    /// Parse a table-based image data block
    pub(crate) fn parse<R: Read + Seek>(c: &mut Cursor<R>) -> Result<Self> {
        let offset = c.offset();
        let min_code_size = c.read_u8()?;
        let data = c.read_sub_blocks()?;
        debug!("Image Data @ {offset:#x}: {} bytes", data.len());
        Ok(ImageData {
            offset,
            min_code_size,
            data,
        })
    }
}

impl GraphicRenderingBlock {
    /// Parse an image descriptor, its local color table and image data
    fn parse<R: Read + Seek>(
        c: &mut Cursor<R>,
        graphic_control_ext: Option<GraphicControl>,
        max_image_sz: Option<usize>,
    ) -> Result<Self> {
        let image_desc = ImageDesc::parse(c)?;
        let size = image_desc.image_sz();
        if let Some(max) = max_image_sz {
            if size > max {
                return Err(Error::TooLargeImage {
                    offset: image_desc.offset,
                    size,
                });
            }
        }
        let config = image_desc.color_table_config();
        let local_color_table = if config.is_present() {
            Some(ColorTable::parse(c, config)?)
        } else {
            None
        };
        let image_data = ImageData::parse(c)?;
        Ok(GraphicRenderingBlock {
            graphic_control_ext,
            image_desc,
            local_color_table,
            image_data,
            end: c.offset(),
        })
    }
}

/// Parse a complete GIF data stream, up to and including the trailer.
pub(crate) fn parse_stream<R: Read + Seek>(
    c: &mut Cursor<R>,
    max_image_sz: Option<usize>,
) -> Result<ParsedGif> {
    let header = Header::parse(c)?;
    debug!("Header: {header}");
    let screen_desc = LogicalScreenDesc::parse(c)?;
    debug!(
        "Logical Screen Descriptor: {}x{}",
        screen_desc.screen_width, screen_desc.screen_height
    );
    let config = screen_desc.color_table_config();
    let global_color_table = if config.is_present() {
        Some(ColorTable::parse(c, config)?)
    } else {
        None
    };
    let mut extensions = vec![];
    let mut frames = vec![];
    let mut text_blocks = vec![];
    let mut graphic_control: Option<GraphicControl> = None;
    let trailer_offset = loop {
        let offset = c.offset();
        match c.classify()? {
            BlockKind::GraphicControl => {
                let gc = GraphicControl::parse(c)?;
                if let Some(prev) = graphic_control.replace(gc) {
                    warn!(
                        "control extension @ {:#x} replaced @ {offset:#x}",
                        prev.offset
                    );
                }
            }
            BlockKind::ImageDesc => {
                let gc = graphic_control.take();
                let frame = GraphicRenderingBlock::parse(c, gc, max_image_sz)?;
                frames.push(frame);
            }
            BlockKind::Application => {
                extensions.push(Application::parse(c)?.into());
            }
            BlockKind::Comment => {
                extensions.push(Comment::parse(c)?.into());
            }
            BlockKind::PlainText => {
                let plain_text = PlainText::parse(c)?;
                text_blocks.push(TextRenderingBlock {
                    graphic_control_ext: graphic_control.take(),
                    plain_text,
                });
            }
            BlockKind::Trailer => {
                c.read_u8()?;
                debug!("Trailer @ {offset:#x}");
                break offset;
            }
            BlockKind::Unknown { code, label } => {
                return Err(Error::UnrecognizedBlock {
                    offset,
                    code,
                    label,
                });
            }
        }
    };
    if let Some(gc) = graphic_control {
        warn!("unused control extension @ {:#x}", gc.offset);
    }
    Ok(ParsedGif {
        filename: None,
        header,
        screen_desc,
        global_color_table,
        extensions,
        frames,
        text_blocks,
        trailer_offset,
    })
}
