/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors possible during encoding
use core::fmt::{Debug, Display, Formatter};

use crate::enums::{BitDepth, PngColor};

/// A chunk could not be completely written to its destination.
///
/// `bytes_written` holds how much of the chunk reached the writer
/// before the failure, so callers can detect truncated output.
pub struct ChunkWriteError {
    pub bytes_written: u64,
    pub error:         std::io::Error
}

impl Debug for ChunkWriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(
            f,
            "Chunk write failed after {} bytes: {}",
            self.bytes_written, self.error
        )
    }
}

impl Display for ChunkWriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for ChunkWriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Errors encountered during encoding
pub enum ApngEncodeErrors {
    /// The color type and bit depth pair cannot be encoded.
    ///
    /// Supported pairs are 8 and 16 bit Luma, RGB and RGBA and
    /// 8 bit Palette
    UnsupportedLayout(PngColor, BitDepth),
    /// The image to encode has a zero width or height
    ZeroDimensions,
    /// A unit size of zero was configured
    InvalidUnitSize(usize),
    /// The background encoder could not be started
    CoderInit(std::io::Error),
    /// A palette layout was requested but the image does not carry
    /// palette indices
    NoPaletteIndex,
    /// The image could not provide a pixel
    PixelAccess(&'static str),
    /// Compressing or flushing image data failed
    IoErrors(std::io::Error),
    /// The background encoder thread panicked
    ProducerPanicked,
    /// The consumer went away before all data was produced
    Cancelled,
    /// Writing a chunk to the destination failed
    ChunkWrite(ChunkWriteError)
}

impl Debug for ApngEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            ApngEncodeErrors::UnsupportedLayout(color, depth) => {
                writeln!(
                    f,
                    "Cannot encode color type {color:?} with bit depth {}, supported are 8 and 16 bit Luma, RGB, RGBA and 8 bit Palette",
                    depth.to_int()
                )
            }
            ApngEncodeErrors::ZeroDimensions => {
                writeln!(f, "Image width or height cannot be zero")
            }
            ApngEncodeErrors::InvalidUnitSize(size) => {
                writeln!(f, "Invalid unit size {size}, it must be greater than zero")
            }
            ApngEncodeErrors::CoderInit(err) => {
                writeln!(f, "Could not start encoder thread: {err}")
            }
            ApngEncodeErrors::NoPaletteIndex => {
                writeln!(
                    f,
                    "Palette layout requested but image does not expose palette indices"
                )
            }
            ApngEncodeErrors::PixelAccess(reason) => {
                writeln!(f, "Could not read pixel: {reason}")
            }
            ApngEncodeErrors::IoErrors(err) => {
                writeln!(f, "I/O error {err}")
            }
            ApngEncodeErrors::ProducerPanicked => {
                writeln!(f, "Encoder thread panicked")
            }
            ApngEncodeErrors::Cancelled => {
                writeln!(f, "Encoding was cancelled")
            }
            ApngEncodeErrors::ChunkWrite(err) => {
                writeln!(f, "{err:?}")
            }
        }
    }
}

impl Display for ApngEncodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for ApngEncodeErrors {}

impl From<std::io::Error> for ApngEncodeErrors {
    fn from(value: std::io::Error) -> Self {
        ApngEncodeErrors::IoErrors(value)
    }
}

impl From<ChunkWriteError> for ApngEncodeErrors {
    fn from(value: ChunkWriteError) -> Self {
        ApngEncodeErrors::ChunkWrite(value)
    }
}
