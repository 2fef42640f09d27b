/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encoder options
use crate::constants::DEFAULT_UNIT_SIZE;

/// How much effort the zlib stream spends on making output small
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum CompressionLevel {
    /// zlib level 6
    #[default]
    Default,
    /// Stored zlib blocks, rows are not filtered either
    NoCompression,
    /// zlib level 1
    BestSpeed,
    /// zlib level 9
    BestCompression
}

impl CompressionLevel {
    pub fn to_flate2(self) -> flate2::Compression {
        match self {
            CompressionLevel::Default => flate2::Compression::new(6),
            CompressionLevel::NoCompression => flate2::Compression::none(),
            CompressionLevel::BestSpeed => flate2::Compression::fast(),
            CompressionLevel::BestCompression => flate2::Compression::best()
        }
    }

    /// Whether scanlines should go through adaptive filtering
    pub const fn filters_rows(self) -> bool {
        !matches!(self, CompressionLevel::NoCompression)
    }
}

/// Options respected by the image and frame data encoders
///
/// - compression: zlib effort, default [`CompressionLevel::Default`]
/// - unit_size: maximum IDAT payload handed out per chunk, default 32 KiB
#[derive(Copy, Clone, Debug)]
pub struct EncoderOptions {
    compression: CompressionLevel,
    unit_size:   usize
}

impl Default for EncoderOptions {
    fn default() -> Self {
        EncoderOptions {
            compression: CompressionLevel::Default,
            unit_size:   DEFAULT_UNIT_SIZE
        }
    }
}

impl EncoderOptions {
    pub fn new(compression: CompressionLevel) -> EncoderOptions {
        EncoderOptions {
            compression,
            ..Default::default()
        }
    }

    pub const fn compression(&self) -> CompressionLevel {
        self.compression
    }

    pub const fn unit_size(&self) -> usize {
        self.unit_size
    }

    pub fn set_compression(mut self, compression: CompressionLevel) -> Self {
        self.compression = compression;
        self
    }

    /// Set the maximum number of compressed bytes per chunk.
    ///
    /// A size of zero is rejected when the encoder is created
    pub fn set_unit_size(mut self, size: usize) -> Self {
        self.unit_size = size;
        self
    }
}

#[test]
fn test_option_defaults() {
    let options = EncoderOptions::default();
    assert_eq!(options.compression(), CompressionLevel::Default);
    assert_eq!(options.unit_size(), 32768);

    let options = options
        .set_compression(CompressionLevel::BestSpeed)
        .set_unit_size(100);
    assert_eq!(options.compression(), CompressionLevel::BestSpeed);
    assert_eq!(options.unit_size(), 100);
}

#[test]
fn test_no_compression_disables_filters() {
    assert!(!CompressionLevel::NoCompression.filters_rows());
    assert!(CompressionLevel::Default.filters_rows());
    assert_eq!(CompressionLevel::NoCompression.to_flate2().level(), 0);
    assert_eq!(CompressionLevel::BestCompression.to_flate2().level(), 9);
}
