/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A streaming PNG and APNG encoder
//!
//! This crate produces the individual chunks of a PNG or animated PNG
//! stream. It does not own the output, the caller decides which chunks
//! go where and in which order, which makes it possible to interleave
//! frames, write custom ancillary chunks or stream to a socket.
//!
//! Pixel data is filtered and compressed on a background thread and
//! handed to the caller in bounded units, so encoding a huge image
//! never holds more than one unit of compressed output in memory.
//!
//! # Features
//! - Adaptive per-row filter selection
//! - 8 and 16 bit Luma, RGB and RGBA, and 8 bit paletted output
//! - Fast paths for images with contiguous storage
//! - APNG frame data with shared sequence numbering
//!
//! # Usage
//! Add the library to `Cargo.toml`
//!
//! ```toml
//! zune-apng="0.5"
//! ```
//!
//! #### Encode a still image
//!
//! ```
//! use zune_apng::{
//!     BitDepth, EncoderOptions, IendChunk, IhdrChunk, NrgbaImage, PngChunk, PngColor,
//!     PNG_SIGNATURE
//! };
//!
//! let image = NrgbaImage::new(100, 100);
//! let ihdr = IhdrChunk::new(100, 100, PngColor::RGBA, BitDepth::Eight).unwrap();
//!
//! let mut output = PNG_SIGNATURE.to_vec();
//! ihdr.write_to(&mut output).unwrap();
//! ihdr.image_data_encoder(image, EncoderOptions::default())
//!     .unwrap()
//!     .write_chunks_to(&mut output)
//!     .unwrap();
//! IendChunk.write_to(&mut output).unwrap();
//! ```
//!
//! #### Encode an animation
//!
//! Frame control chunks and frame data share one sequence, take
//! numbers from the same [`SequenceNumbers`] for both.
//!
//! ```
//! use zune_apng::{
//!     ActlChunk, BitDepth, EncoderOptions, FctlChunk, IendChunk, IhdrChunk, Nrgba8,
//!     NrgbaImage, PngChunk, PngColor, SequenceNumbers, PNG_SIGNATURE
//! };
//!
//! let (width, height) = (64, 64);
//! let ihdr = IhdrChunk::new(width, height, PngColor::RGBA, BitDepth::Eight).unwrap();
//! let frames = 3;
//!
//! let mut output = PNG_SIGNATURE.to_vec();
//! let mut sequence = SequenceNumbers::new();
//!
//! ihdr.write_to(&mut output).unwrap();
//! ActlChunk { num_frames: frames, num_plays: 0 }
//!     .write_to(&mut output)
//!     .unwrap();
//!
//! // the default image, not part of the animation
//! ihdr.image_data_encoder(NrgbaImage::new(64, 64), EncoderOptions::default())
//!     .unwrap()
//!     .write_chunks_to(&mut output)
//!     .unwrap();
//!
//! for i in 0..frames {
//!     let mut frame = NrgbaImage::new(64, 64);
//!     frame.fill(Nrgba8 { r: (i * 80) as u8, g: 0, b: 0, a: 255 });
//!
//!     FctlChunk {
//!         sequence_number: sequence.next(),
//!         width,
//!         height,
//!         delay_num: 1,
//!         delay_den: 10,
//!         ..Default::default()
//!     }
//!     .write_to(&mut output)
//!     .unwrap();
//!
//!     ihdr.frame_data_encoder(&mut sequence, frame, EncoderOptions::default())
//!         .unwrap()
//!         .write_chunks_to(&mut output)
//!         .unwrap();
//! }
//! IendChunk.write_to(&mut output).unwrap();
//! ```
//!
//! # Pulling units by hand
//!
//! [`ImageDataEncoder`] and [`FrameDataEncoder`] can also be driven one
//! chunk at a time with `advance`, `current` and `error`, see their
//! documentation.
//!
//! # Alternatives
//! - [png](https://crates.io/crates/png) crate
#![allow(clippy::op_ref, clippy::identity_op)]

pub use bytestream::{write_chunk, write_chunk_parts, write_u16_be, write_u32_be};
pub use chunks::{
    ActlChunk, FctlChunk, FdatChunk, IdatChunk, IendChunk, IhdrChunk, PlteChunk, PngChunk,
    TrnsChunk
};
pub use color::{Color, Gray16, Gray8, Nrgba16, Nrgba8, Rgba64, Rgba8};
pub use constants::{DEFAULT_UNIT_SIZE, PNG_SIGNATURE};
pub use crc::{calc_crc, calc_crc_parts};
pub use enums::*;
pub use error::{ApngEncodeErrors, ChunkWriteError};
pub use image::{
    Gray16Image, GrayImage, NativeRows, Nrgba16Image, NrgbaImage, PalettedImage, PixelSource,
    RgbaImage
};
pub use options::{CompressionLevel, EncoderOptions};
pub use sequence::SequenceNumbers;
pub use stream::{FrameDataEncoder, ImageDataEncoder};

mod bytestream;
mod chunks;
mod color;
mod constants;
mod crc;
mod enums;
pub mod error;
mod filters;
mod image;
mod options;
mod sequence;
mod stream;
mod transcode;
