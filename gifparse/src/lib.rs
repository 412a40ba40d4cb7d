// lib.rs      gifparse crate.
//
// Copyright (c) 2019-2024  Douglas Lau
//
//! A block-level GIF parser and thumbnail renderer.
//!
//! A GIF is parsed in one forward pass into a [ParsedGif], which keeps every
//! block along with its byte offset.  Frames can then be rendered by index,
//! either as palette indices or downscaled to a target width.
//!
//! ## Example
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gif = gifparse::open("animation.gif")?;
//! for comment in gif.comments() {
//!     println!("comment: {}", comment.text());
//! }
//! let thumbnail = gif.render_resized(0, 64)?;
//! println!("{}x{}", thumbnail.width(), thumbnail.height());
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

pub mod block;
mod cursor;
mod decode;
mod error;
mod lzw;
mod private;
mod render;

pub use crate::error::{Error, Result};
pub use crate::private::{open, parse, Decoder, ParsedGif};
pub use crate::render::IndexedFrame;
