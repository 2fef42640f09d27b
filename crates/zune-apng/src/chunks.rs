/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Chunks the encoder can write
//!
//! Every chunk implements [`PngChunk`] and writes itself as
//! `length - chunk type - [data] - crc`.
//!
//! Chunks should appear in this order
//! 1. [`PNG_SIGNATURE`](crate::PNG_SIGNATURE) (not a chunk)
//! 2. [`IhdrChunk`]
//! 3. [`PlteChunk`] and [`TrnsChunk`] for paletted images
//! 4. [`ActlChunk`] for animated images
//! 5. [`IdatChunk`]s
//! 6. For each animation frame, an [`FctlChunk`] followed by [`FdatChunk`]s
//! 7. [`IendChunk`]
use std::io::Write;

use crate::bytestream::{write_chunk, write_chunk_parts, write_u16_be, write_u32_be};
use crate::color::Color;
use crate::constants::{
    ACTL, ACTL_SIZE, FCTL, FCTL_SIZE, FDAT, IDAT, IEND, IHDR, IHDR_SIZE, PLTE, TRNS
};
use crate::enums::{
    BitDepth, BlendOp, CompressionMethod, DisposeOp, FilterMethod, InterlaceMethod, PixelLayout,
    PngColor
};
use crate::error::{ApngEncodeErrors, ChunkWriteError};

/// A chunk that can be serialized to a writer
pub trait PngChunk {
    /// Write the whole chunk, returning the number of bytes written
    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64, ChunkWriteError>;
}

/// The image header
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IhdrChunk {
    width:       u32,
    height:      u32,
    depth:       BitDepth,
    color:       PngColor,
    compression: CompressionMethod,
    filter:      FilterMethod,
    interlace:   InterlaceMethod
}

impl IhdrChunk {
    /// Create a non-interlaced header
    ///
    /// # Errors
    /// If width or height is zero
    pub fn new(
        width: u32, height: u32, color: PngColor, depth: BitDepth
    ) -> Result<IhdrChunk, ApngEncodeErrors> {
        if width == 0 || height == 0 {
            return Err(ApngEncodeErrors::ZeroDimensions);
        }
        Ok(IhdrChunk {
            width,
            height,
            depth,
            color,
            compression: CompressionMethod::Deflate,
            filter: FilterMethod::Adaptive,
            interlace: InterlaceMethod::Standard
        })
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn color(&self) -> PngColor {
        self.color
    }

    pub const fn depth(&self) -> BitDepth {
        self.depth
    }

    pub const fn interlace(&self) -> InterlaceMethod {
        self.interlace
    }

    /// The sample layout image data is encoded with
    ///
    /// # Errors
    /// If the color type and depth pair is not one the encoder supports
    pub fn layout(&self) -> Result<PixelLayout, ApngEncodeErrors> {
        PixelLayout::classify(self.color, self.depth)
            .ok_or(ApngEncodeErrors::UnsupportedLayout(self.color, self.depth))
    }

    pub fn to_bytes(&self) -> [u8; IHDR_SIZE] {
        let mut buf = [0; IHDR_SIZE];
        write_u32_be(&mut buf[0..4], self.width);
        write_u32_be(&mut buf[4..8], self.height);
        buf[8] = self.depth.to_int();
        buf[9] = self.color.to_int();
        buf[10] = self.compression.to_int();
        buf[11] = self.filter.to_int();
        buf[12] = self.interlace.to_int();
        buf
    }
}

impl PngChunk for IhdrChunk {
    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64, ChunkWriteError> {
        write_chunk(&IHDR, &self.to_bytes(), writer)
    }
}

/// The palette, write after IHDR and before any image data
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlteChunk {
    data: Vec<u8>
}

impl PlteChunk {
    /// Build the palette from colors, alpha is dropped after
    /// un-premultiplying
    pub fn from_palette<C: Color>(palette: &[C]) -> PlteChunk {
        let mut data = Vec::with_capacity(palette.len() * 3);

        for color in palette {
            let c = color.to_rgba64().to_nrgba8();
            data.extend_from_slice(&[c.r, c.g, c.b]);
        }
        PlteChunk { data }
    }

    /// The chunk payload, 3 bytes per entry
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl PngChunk for PlteChunk {
    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64, ChunkWriteError> {
        write_chunk(&PLTE, &self.data, writer)
    }
}

/// Palette transparency, write after PLTE and before any image data
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TrnsChunk {
    data: Vec<u8>
}

impl TrnsChunk {
    /// Build the alpha table from colors, one byte per palette entry
    pub fn from_palette<C: Color>(palette: &[C]) -> TrnsChunk {
        let data = palette
            .iter()
            .map(|color| color.to_rgba64().to_nrgba8().a)
            .collect();

        TrnsChunk { data }
    }

    /// The chunk payload, 1 byte per entry
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl PngChunk for TrnsChunk {
    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64, ChunkWriteError> {
        write_chunk(&TRNS, &self.data, writer)
    }
}

/// End of stream marker, the last chunk written
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct IendChunk;

impl PngChunk for IendChunk {
    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64, ChunkWriteError> {
        write_chunk(&IEND, &[], writer)
    }
}

/// Animation control, write before any image data
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ActlChunk {
    /// Number of frames
    pub num_frames: u32,
    /// Number of times to loop the animation, 0 loops forever
    pub num_plays:  u32
}

impl ActlChunk {
    pub fn to_bytes(&self) -> [u8; ACTL_SIZE] {
        let mut buf = [0; ACTL_SIZE];
        write_u32_be(&mut buf[0..4], self.num_frames);
        write_u32_be(&mut buf[4..8], self.num_plays);
        buf
    }
}

impl PngChunk for ActlChunk {
    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64, ChunkWriteError> {
        write_chunk(&ACTL, &self.to_bytes(), writer)
    }
}

/// Frame control, precedes the data of each animation frame
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct FctlChunk {
    /// Sequence number, see [`SequenceNumbers`](crate::SequenceNumbers)
    pub sequence_number: u32,
    pub width:           u32,
    pub height:          u32,
    pub x_offset:        u32,
    pub y_offset:        u32,
    /// Frame delay is `delay_num / delay_den` seconds
    pub delay_num:       u16,
    /// A denominator of 0 is treated as 100 by decoders
    pub delay_den:       u16,
    pub dispose_op:      DisposeOp,
    pub blend_op:        BlendOp
}

impl FctlChunk {
    pub fn to_bytes(&self) -> [u8; FCTL_SIZE] {
        let mut buf = [0; FCTL_SIZE];
        write_u32_be(&mut buf[0..4], self.sequence_number);
        write_u32_be(&mut buf[4..8], self.width);
        write_u32_be(&mut buf[8..12], self.height);
        write_u32_be(&mut buf[12..16], self.x_offset);
        write_u32_be(&mut buf[16..20], self.y_offset);
        write_u16_be(&mut buf[20..22], self.delay_num);
        write_u16_be(&mut buf[22..24], self.delay_den);
        buf[24] = self.dispose_op.to_int();
        buf[25] = self.blend_op.to_int();
        buf
    }
}

impl PngChunk for FctlChunk {
    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64, ChunkWriteError> {
        write_chunk(&FCTL, &self.to_bytes(), writer)
    }
}

/// One piece of the compressed image stream
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct IdatChunk<'a>(pub &'a [u8]);

impl<'a> PngChunk for IdatChunk<'a> {
    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64, ChunkWriteError> {
        write_chunk(&IDAT, self.0, writer)
    }
}

/// One piece of the compressed stream of an animation frame,
/// an IDAT payload prefixed with a sequence number
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FdatChunk<'a> {
    pub sequence_number: u32,
    pub data:            &'a [u8]
}

impl<'a> PngChunk for FdatChunk<'a> {
    fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<u64, ChunkWriteError> {
        let sequence = self.sequence_number.to_be_bytes();
        write_chunk_parts(&FDAT, &[&sequence[..], self.data], writer)
    }
}
