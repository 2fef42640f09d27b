/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use zune_apng::{
    ApngEncodeErrors, BitDepth, EncoderOptions, GrayImage, IhdrChunk, NrgbaImage, PixelSource,
    PngChunk, PngColor, Rgba64, SequenceNumbers
};

/// Accepts `limit` bytes then fails
struct Limited {
    written: usize,
    limit:   usize
}

impl Write for Limited {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.written >= self.limit {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"));
        }
        let n = buf.len().min(self.limit - self.written);
        self.written += n;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Fails on one row, records whether the last row was ever read
struct BrokenRow {
    bad_row:      usize,
    reached_last: Arc<AtomicBool>
}

impl PixelSource for BrokenRow {
    fn dimensions(&self) -> (usize, usize) {
        (16, 64)
    }

    fn pixel(&self, _: usize, y: usize) -> Result<Rgba64, ApngEncodeErrors> {
        if y == self.bad_row {
            return Err(ApngEncodeErrors::PixelAccess("sensor offline"));
        }
        if y == 63 {
            self.reached_last.store(true, Ordering::Relaxed);
        }
        Ok(Rgba64::default())
    }
}

#[test]
fn test_unsupported_layouts() {
    let cases = [
        (PngColor::RGB, BitDepth::Four),
        (PngColor::Luma, BitDepth::One),
        (PngColor::Palette, BitDepth::Sixteen),
        (PngColor::LumaA, BitDepth::Eight),
        (PngColor::LumaA, BitDepth::Sixteen)
    ];
    for (color, depth) in cases {
        let ihdr = IhdrChunk::new(4, 4, color, depth).unwrap();
        // the header itself is still writable
        assert!(ihdr.write_to(&mut vec![]).is_ok());

        let result = ihdr.image_data_encoder(GrayImage::new(4, 4), EncoderOptions::default());
        assert!(
            matches!(result, Err(ApngEncodeErrors::UnsupportedLayout(c, d)) if c == color && d == depth),
            "{color:?} {depth:?}"
        );
    }
}

#[test]
fn test_zero_sized_header() {
    assert!(matches!(
        IhdrChunk::new(0, 10, PngColor::RGBA, BitDepth::Eight),
        Err(ApngEncodeErrors::ZeroDimensions)
    ));
}

#[test]
fn test_palette_without_indices() {
    let ihdr = IhdrChunk::new(4, 4, PngColor::Palette, BitDepth::Eight).unwrap();
    let mut encoder = ihdr
        .image_data_encoder(NrgbaImage::new(4, 4), EncoderOptions::default())
        .unwrap();

    assert!(!encoder.advance());
    assert!(matches!(
        encoder.error(),
        Some(ApngEncodeErrors::NoPaletteIndex)
    ));
    assert!(encoder.current().is_none());
}

#[test]
fn test_source_failure_stops_stream() {
    let reached_last = Arc::new(AtomicBool::new(false));
    let source = BrokenRow {
        bad_row:      10,
        reached_last: Arc::clone(&reached_last)
    };
    let ihdr = IhdrChunk::new(16, 64, PngColor::Luma, BitDepth::Eight).unwrap();
    let mut encoder = ihdr
        .image_data_encoder(source, EncoderOptions::default().set_unit_size(8))
        .unwrap();

    while encoder.advance() {
        assert!(encoder.current().is_some());
    }
    let err = encoder.error().unwrap();
    assert!(matches!(err, ApngEncodeErrors::PixelAccess("sensor offline")));
    assert!(err.to_string().contains("sensor offline"));
    assert!(!reached_last.load(Ordering::Relaxed));

    // terminal, no more units
    assert!(!encoder.advance());
}

#[test]
fn test_frame_source_failure() {
    let source = BrokenRow {
        bad_row:      0,
        reached_last: Arc::new(AtomicBool::new(false))
    };
    let ihdr = IhdrChunk::new(16, 64, PngColor::RGB, BitDepth::Eight).unwrap();
    let mut sequence = SequenceNumbers::new();

    let result = ihdr
        .frame_data_encoder(&mut sequence, source, EncoderOptions::default())
        .unwrap()
        .write_chunks_to(&mut vec![]);

    assert!(matches!(result, Err(ApngEncodeErrors::PixelAccess(_))));
    // nothing was retrieved, nothing consumed
    assert_eq!(sequence.peek(), 0);
}

#[test]
fn test_destination_failure() {
    let ihdr = IhdrChunk::new(32, 32, PngColor::Luma, BitDepth::Eight).unwrap();
    let mut pixels = vec![0_u8; 32 * 32];
    pixels
        .iter_mut()
        .enumerate()
        .for_each(|(i, px)| *px = (i * 13) as u8);

    let mut sink = Limited {
        written: 0,
        limit:   20
    };
    let result = ihdr
        .image_data_encoder(
            GrayImage::from_raw(32, 32, pixels).unwrap(),
            EncoderOptions::default()
        )
        .unwrap()
        .write_chunks_to(&mut sink);

    match result {
        Err(ApngEncodeErrors::ChunkWrite(err)) => assert_eq!(err.bytes_written, 20),
        other => panic!("unexpected result {other:?}")
    }
}

#[test]
fn test_early_drop_does_not_hang() {
    let ihdr = IhdrChunk::new(512, 512, PngColor::RGBA, BitDepth::Eight).unwrap();

    for _ in 0..10 {
        let mut encoder = ihdr
            .image_data_encoder(NrgbaImage::new(512, 512), EncoderOptions::default().set_unit_size(64))
            .unwrap();
        assert!(encoder.advance());
        drop(encoder);
    }
    // dropped before the first advance
    let encoder = ihdr
        .image_data_encoder(NrgbaImage::new(512, 512), EncoderOptions::default())
        .unwrap();
    drop(encoder);
}
