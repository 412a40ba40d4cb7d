// render.rs
//
// Copyright (c) 2024  Douglas Lau
//
//! Frame rendering and downscaling
use crate::block::GraphicRenderingBlock;
use crate::error::{Error, Result};
use crate::lzw;
use crate::private::ParsedGif;
use pix::gray::{Gray, Gray8};
use pix::rgb::{Rgb, SRgb8, SRgba8};
use pix::Raster;

/// Number of channels resampled (red, green, blue)
const CHANNELS: usize = 3;

/// Catmull-Rom filter support, in source pixels
const CATMULL_ROM_SUPPORT: f32 = 2.0;

/// A rendered frame of palette indices.
///
/// Every index in the raster is valid for the palette.
pub struct IndexedFrame {
    width: u32,
    height: u32,
    raster: Raster<Gray8>,
    palette: Vec<SRgb8>,
}

impl IndexedFrame {
    /// Get the frame width
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the frame height
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the raster of palette indices
    pub fn raster(&self) -> &Raster<Gray8> {
        &self.raster
    }

    /// Get the resolved palette (local or global color table)
    pub fn palette(&self) -> &[SRgb8] {
        &self.palette
    }

    /// Get the palette index at one pixel
    pub fn index(&self, x: u32, y: u32) -> u8 {
        u8::from(Gray::value(self.raster.pixel(x as i32, y as i32)))
    }

    /// Get the color at one pixel
    pub fn color(&self, x: u32, y: u32) -> SRgb8 {
        self.palette[usize::from(self.index(x, y))]
    }

    /// Convert to an opaque true color raster
    pub fn to_rgba(&self) -> Raster<SRgba8> {
        let mut raster = Raster::with_clear(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let [r, g, b] = rgb_bytes(self.color(x, y));
                *raster.pixel_mut(x as i32, y as i32) = SRgba8::new(r, g, b, 255);
            }
        }
        raster
    }

    /// Get the colors as interleaved RGB samples
    fn samples(&self) -> Vec<f32> {
        let mut samples = Vec::with_capacity(self.pixel_count() * CHANNELS);
        for y in 0..self.height {
            for x in 0..self.width {
                let rgb = rgb_bytes(self.color(x, y));
                samples.extend(rgb.iter().map(|c| f32::from(*c)));
            }
        }
        samples
    }

    /// Get the number of pixels
    fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Resample to a smaller size with a separable Catmull-Rom filter
    fn downscale(&self, width: u32, height: u32) -> Raster<SRgba8> {
        let src_width = self.width as usize;
        let src_height = self.height as usize;
        let dst_width = width as usize;
        let samples = self.samples();
        // horizontal pass: dst_width x src_height
        let mut horiz = vec![0.0; dst_width * src_height * CHANNELS];
        let taps = filter_taps(self.width, width);
        for y in 0..src_height {
            let row = y * src_width;
            for (x, tap) in taps.iter().enumerate() {
                let dst = (y * dst_width + x) * CHANNELS;
                for (k, w) in tap.weights.iter().enumerate() {
                    let src = (row + tap.start + k) * CHANNELS;
                    for ch in 0..CHANNELS {
                        horiz[dst + ch] += samples[src + ch] * w;
                    }
                }
            }
        }
        // vertical pass: dst_width x dst_height
        let mut raster = Raster::with_clear(width, height);
        let taps = filter_taps(self.height, height);
        for (y, tap) in taps.iter().enumerate() {
            for x in 0..dst_width {
                let mut rgb = [0.0; CHANNELS];
                for (k, w) in tap.weights.iter().enumerate() {
                    let src = ((tap.start + k) * dst_width + x) * CHANNELS;
                    for (ch, v) in rgb.iter_mut().enumerate() {
                        *v += horiz[src + ch] * w;
                    }
                }
                let [r, g, b] = rgb.map(to_channel);
                *raster.pixel_mut(x as i32, y as i32) = SRgba8::new(r, g, b, 255);
            }
        }
        raster
    }
}

/// Get the channels of a color
fn rgb_bytes(rgb: SRgb8) -> [u8; CHANNELS] {
    [
        u8::from(Rgb::red(rgb)),
        u8::from(Rgb::green(rgb)),
        u8::from(Rgb::blue(rgb)),
    ]
}

/// Convert a filtered sample to an 8-bit channel
fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Mitchell-Netravali family of cubic splines
fn bc_cubic_spline(x: f32, b: f32, c: f32) -> f32 {
    let a = x.abs();
    let k = if a < 1.0 {
        (12.0 - 9.0 * b - 6.0 * c) * a.powi(3)
            + (-18.0 + 12.0 * b + 6.0 * c) * a.powi(2)
            + (6.0 - 2.0 * b)
    } else if a < 2.0 {
        (-b - 6.0 * c) * a.powi(3)
            + (6.0 * b + 30.0 * c) * a.powi(2)
            + (-12.0 * b - 48.0 * c) * a
            + (8.0 * b + 24.0 * c)
    } else {
        0.0
    };
    k / 6.0
}

/// Catmull-Rom kernel
fn catmull_rom(x: f32) -> f32 {
    bc_cubic_spline(x, 0.0, 0.5)
}

/// Source pixels and normalized weights for one output pixel
struct FilterTap {
    start: usize,
    weights: Vec<f32>,
}

/// Build the filter taps for resampling one axis
fn filter_taps(src_len: u32, dst_len: u32) -> Vec<FilterTap> {
    let ratio = src_len as f32 / dst_len as f32;
    // widen the kernel when downsampling
    let scale = ratio.max(1.0);
    let radius = (CATMULL_ROM_SUPPORT * scale).ceil();
    let last = i64::from(src_len) - 1;
    (0..dst_len)
        .map(|out| {
            let center = (out as f32 + 0.5) * ratio;
            let left = ((center - radius).ceil() as i64).clamp(0, last) as usize;
            let right = ((center + radius).floor() as i64).clamp(0, last) as usize;
            let mut weights: Vec<f32> = (left..=right)
                .map(|i| catmull_rom((i as f32 + 0.5 - center) / scale))
                .collect();
            let sum: f32 = weights.iter().sum();
            if sum != 0.0 {
                weights.iter_mut().for_each(|w| *w /= sum);
            }
            FilterTap {
                start: left,
                weights,
            }
        })
        .collect()
}

impl GraphicRenderingBlock {
    /// Decompress the image data into palette indices.
    ///
    /// The result is at most `width * height` bytes; it is shorter when the
    /// compressed data was truncated.
    pub fn decompress(&self) -> Result<Vec<u8>> {
        lzw::decompress(
            self.image_data.min_code_size(),
            self.image_data.data(),
            self.image_desc.image_sz(),
        )
    }
}

impl ParsedGif {
    /// Get one frame by index
    fn frame(&self, index: usize) -> Result<&GraphicRenderingBlock> {
        self.frames.get(index).ok_or(Error::FrameOutOfRange {
            index,
            count: self.frames.len(),
        })
    }

    /// Render one frame into a raster of palette indices.
    ///
    /// The local color table is used when present, otherwise the global
    /// color table.  Pixels past the end of truncated image data are left
    /// as index 0.
    pub fn render_frame(&self, index: usize) -> Result<IndexedFrame> {
        let frame = self.frame(index)?;
        let width = u32::from(frame.width());
        let height = u32::from(frame.height());
        if width == 0 || height == 0 {
            return Err(Error::InvalidFrameDimensions);
        }
        let table = frame
            .local_color_table
            .as_ref()
            .or(self.global_color_table.as_ref())
            .ok_or(Error::MissingColorTable)?;
        let palette = table.to_palette();
        let indices = frame.decompress()?;
        let len = palette.len();
        let mut raster = Raster::with_clear(width, height);
        let row = width as usize;
        for (h, idx) in indices.iter().copied().enumerate() {
            if usize::from(idx) >= len {
                return Err(Error::InvalidColorIndex { index: idx, len });
            }
            let x = (h % row) as i32;
            let y = (h / row) as i32;
            *raster.pixel_mut(x, y) = Gray8::new(idx);
        }
        let size = frame.image_desc.image_sz();
        if indices.len() < size {
            debug!("frame {index}: {} of {size} pixels decoded", indices.len());
        }
        Ok(IndexedFrame {
            width,
            height,
            raster,
            palette,
        })
    }

    /// Render one frame, downscaled to a target width.
    ///
    /// The aspect ratio is kept.  Frames no wider than `target_width` are
    /// rendered at their own size.
    pub fn render_resized(
        &self,
        index: usize,
        target_width: u32,
    ) -> Result<Raster<SRgba8>> {
        if target_width == 0 {
            return Err(Error::InvalidTargetWidth);
        }
        let frame = self.render_frame(index)?;
        if target_width >= frame.width {
            return Ok(frame.to_rgba());
        }
        let scale = f64::from(target_width) / f64::from(frame.width);
        let target_height = (f64::from(frame.height) * scale).round() as u32;
        let target_height = target_height.max(1);
        debug!(
            "frame {index}: {}x{} -> {target_width}x{target_height}",
            frame.width, frame.height
        );
        Ok(frame.downscale(target_width, target_height))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse;
    use std::io;

    const FOREGROUND: [u8; 3] = [0x20, 0x40, 0x60];

    /// Build a GIF with a 2-color global table and one frame
    fn single_frame(width: u16, height: u16, image: &[u8]) -> Vec<u8> {
        let [wl, wh] = width.to_le_bytes();
        let [hl, hh] = height.to_le_bytes();
        let mut bytes = b"GIF89a".to_vec();
        bytes.extend_from_slice(&[wl, wh, hl, hh, 0x80, 0x00, 0x00]);
        bytes.extend_from_slice(&FOREGROUND);
        bytes.extend_from_slice(&[0xFF, 0xFF, 0xFF]);
        bytes.extend_from_slice(&[0x2C, 0, 0, 0, 0, wl, wh, hl, hh]);
        bytes.extend_from_slice(image);
        bytes.push(0x3B);
        bytes
    }

    /// Sixteen pixels, all index 0
    fn uniform(width: u16, height: u16) -> Vec<u8> {
        single_frame(width, height, &[0x00, 0x02, 0x04, 0x84, 0x8F, 0x09, 0x05, 0x00])
    }

    fn render(bytes: &[u8]) -> Result<ParsedGif> {
        parse(io::Cursor::new(bytes))
    }

    #[rustfmt::skip]
    fn simple_1() -> Vec<u8> {
        vec![
            0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x0A, 0x00,
            0x0A, 0x00, 0x91, 0x00, 0x00, 0xFF, 0xFF, 0xFF,
            0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00,
            0x00, 0x21, 0xF9, 0x04, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x2C, 0x00, 0x00, 0x00, 0x00, 0x0A, 0x00,
            0x0A, 0x00, 0x00, 0x02, 0x16, 0x8C, 0x2D, 0x99,
            0x87, 0x2A, 0x1C, 0xDC, 0x33, 0xA0, 0x02, 0x75,
            0xEC, 0x95, 0xFA, 0xA8, 0xDE, 0x60, 0x8C, 0x04,
            0x91, 0x4C, 0x01, 0x00, 0x3B,
        ]
    }

    #[test]
    fn indexed_2x2() -> Result<()> {
        let bytes = single_frame(2, 2, &[0x00, 0x02, 0x03, 0x0C, 0x10, 0x05, 0x00]);
        let frame = render(&bytes)?.render_frame(0)?;
        assert_eq!((frame.width(), frame.height()), (2, 2));
        assert_eq!(frame.palette().len(), 2);
        assert_eq!(frame.index(0, 0), 1);
        assert_eq!(frame.index(1, 0), 0);
        assert_eq!(frame.index(0, 1), 0);
        assert_eq!(frame.index(1, 1), 1);
        let rgba = frame.to_rgba();
        assert_eq!(rgba.pixel(0, 0), SRgba8::new(0xFF, 0xFF, 0xFF, 0xFF));
        assert_eq!(rgba.pixel(1, 0), SRgba8::new(0x20, 0x40, 0x60, 0xFF));
        Ok(())
    }

    #[test]
    fn index_layout() -> Result<()> {
        let gif = render(&simple_1())?;
        let frame = gif.render_frame(0)?;
        let indices = gif.frames()[0].decompress()?;
        for (h, idx) in indices.iter().enumerate() {
            let (x, y) = ((h % 10) as u32, (h / 10) as u32);
            assert_eq!(frame.index(x, y), *idx);
        }
        assert_eq!(frame.color(3, 3), SRgb8::new(0xFF, 0xFF, 0xFF));
        assert_eq!(frame.color(0, 0), SRgb8::new(0xFF, 0, 0));
        assert_eq!(frame.color(9, 0), SRgb8::new(0, 0, 0xFF));
        Ok(())
    }

    #[test]
    fn no_upscale() -> Result<()> {
        let gif = render(&simple_1())?;
        let rgba = gif.render_frame(0)?.to_rgba();
        for target in [10, 11, 100] {
            let resized = gif.render_resized(0, target)?;
            assert_eq!(resized.width(), 10);
            assert_eq!(resized.height(), 10);
            assert_eq!(resized.pixels(), rgba.pixels());
        }
        Ok(())
    }

    #[test]
    fn downscale_ratio() -> Result<()> {
        let gif = render(&simple_1())?;
        for target in 1..10 {
            let resized = gif.render_resized(0, target)?;
            assert_eq!(resized.width(), target);
            assert_eq!(resized.height(), target);
        }
        let gif = render(&uniform(8, 2))?;
        for (target, height) in [(7, 2), (6, 2), (4, 1), (3, 1), (1, 1)] {
            let resized = gif.render_resized(0, target)?;
            assert_eq!((resized.width(), resized.height()), (target, height));
        }
        Ok(())
    }

    #[test]
    fn downscale_uniform() -> Result<()> {
        let gif = render(&uniform(4, 4))?;
        let resized = gif.render_resized(0, 2)?;
        assert_eq!((resized.width(), resized.height()), (2, 2));
        let [r, g, b] = FOREGROUND;
        for p in resized.pixels() {
            assert_eq!(*p, SRgba8::new(r, g, b, 0xFF));
        }
        Ok(())
    }

    #[test]
    fn invalid_target_width() -> Result<()> {
        let gif = render(&simple_1())?;
        assert!(matches!(
            gif.render_resized(0, 0),
            Err(Error::InvalidTargetWidth)
        ));
        Ok(())
    }

    #[test]
    fn frame_out_of_range() -> Result<()> {
        let gif = render(&simple_1())?;
        assert!(matches!(
            gif.render_frame(5),
            Err(Error::FrameOutOfRange { index: 5, count: 1 })
        ));
        assert!(matches!(
            gif.render_resized(1, 4),
            Err(Error::FrameOutOfRange { index: 1, count: 1 })
        ));
        Ok(())
    }

    #[test]
    fn missing_color_table() -> Result<()> {
        let mut bytes = single_frame(2, 2, &[0x00, 0x02, 0x03, 0x0C, 0x10, 0x05, 0x00]);
        // clear the global table flag and remove the table
        bytes[10] = 0x00;
        bytes.drain(13..19);
        let gif = render(&bytes)?;
        assert!(gif.global_color_table().is_none());
        assert!(matches!(gif.render_frame(0), Err(Error::MissingColorTable)));
        Ok(())
    }

    #[test]
    fn invalid_color_index() -> Result<()> {
        // one pixel of index 3
        let bytes = single_frame(1, 1, &[0x00, 0x02, 0x02, 0x5C, 0x01, 0x00]);
        let gif = render(&bytes)?;
        assert!(matches!(
            gif.render_frame(0),
            Err(Error::InvalidColorIndex { index: 3, len: 2 })
        ));
        Ok(())
    }

    #[test]
    fn local_color_table() -> Result<()> {
        // one pixel of index 3, with a 4-color local table
        let mut image = vec![0x81];
        image.extend_from_slice(&[0, 0, 0, 1, 1, 1, 2, 2, 2, 0x30, 0x31, 0x32]);
        image.extend_from_slice(&[0x02, 0x02, 0x5C, 0x01, 0x00]);
        let gif = render(&single_frame(1, 1, &image))?;
        let frame = gif.render_frame(0)?;
        assert_eq!(frame.palette().len(), 4);
        assert_eq!(frame.color(0, 0), SRgb8::new(0x30, 0x31, 0x32));
        Ok(())
    }

    #[test]
    fn invalid_frame_dimensions() -> Result<()> {
        let bytes = single_frame(0, 2, &[0x00, 0x02, 0x01, 0x05, 0x00]);
        let gif = render(&bytes)?;
        assert!(matches!(
            gif.render_frame(0),
            Err(Error::InvalidFrameDimensions)
        ));
        Ok(())
    }

    #[test]
    fn truncated_image_data() -> Result<()> {
        // clear, 0, 1, 1, 0 then no end code, in a 4x2 frame
        let bytes = single_frame(4, 2, &[0x00, 0x02, 0x02, 0x44, 0x02, 0x00]);
        let gif = render(&bytes)?;
        let frame = gif.render_frame(0)?;
        assert_eq!(frame.index(1, 0), 1);
        assert_eq!(frame.index(2, 0), 1);
        for x in 0..4 {
            assert_eq!(frame.index(x, 1), 0);
        }
        Ok(())
    }
}
