/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Conversion of source rows into png sample layouts
//!
//! Rows are written one byte into the destination, the first
//! byte belongs to the filter type.
use log::trace;

use crate::enums::PixelLayout;
use crate::error::ApngEncodeErrors;
use crate::image::{NativeRows, PixelSource};

/// Which way rows are read out of the source, decided once per image
#[derive(Copy, Clone, Debug)]
enum RowPath<'a> {
    /// Storage matches the layout byte for byte
    Copy { pixels: &'a [u8], stride: usize },
    /// 4 byte storage, keep the first three bytes of each pixel
    StripAlpha { pixels: &'a [u8], stride: usize },
    /// Go through `PixelSource::pixel` / `PixelSource::color_index`
    Generic
}

/// Extracts rows of a [`PixelSource`] in a png layout.
///
/// Layouts without an alpha channel drop the source alpha, the source
/// is assumed to be fully opaque and this is not verified.
pub(crate) struct RowTranscoder<'a, S: PixelSource + ?Sized> {
    source: &'a S,
    layout: PixelLayout,
    path:   RowPath<'a>,
    width:  usize,
    height: usize
}

impl<'a, S: PixelSource + ?Sized> RowTranscoder<'a, S> {
    pub fn new(source: &'a S, layout: PixelLayout) -> Result<Self, ApngEncodeErrors> {
        let (width, height) = source.dimensions();

        if width == 0 || height == 0 {
            return Err(ApngEncodeErrors::ZeroDimensions);
        }

        let path = match (layout, source.native_rows()) {
            (PixelLayout::Luma8, Some(NativeRows::Luma8 { pixels, stride }))
            | (PixelLayout::Palette8, Some(NativeRows::Indexed { pixels, stride }))
            | (PixelLayout::Rgba8, Some(NativeRows::Rgba8 { pixels, stride })) => {
                RowPath::Copy { pixels, stride }
            }
            (PixelLayout::Rgb8, Some(NativeRows::Rgba8 { pixels, stride }))
            | (PixelLayout::Rgb8, Some(NativeRows::Rgba8Premultiplied { pixels, stride })) => {
                RowPath::StripAlpha { pixels, stride }
            }
            _ => RowPath::Generic
        };

        if layout == PixelLayout::Palette8
            && matches!(path, RowPath::Generic)
            && !source.has_color_indices()
        {
            return Err(ApngEncodeErrors::NoPaletteIndex);
        }
        trace!("Transcoding {width}x{height} image to {layout:?} via {path:?}");

        Ok(RowTranscoder {
            source,
            layout,
            path,
            width,
            height
        })
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    /// Size of a transcoded row, without the filter byte
    pub const fn row_bytes(&self) -> usize {
        self.width * self.layout.bytes_per_pixel()
    }

    /// Transcode row `y` into `out[1..]`
    ///
    /// `out` must be `row_bytes() + 1` bytes long.
    pub fn transcode_row(&self, y: usize, out: &mut [u8]) -> Result<(), ApngEncodeErrors> {
        let out = &mut out[1..];
        let width = self.width;

        match self.path {
            RowPath::Copy { pixels, stride } => {
                let start = y * stride;
                let row = pixels
                    .get(start..start + out.len())
                    .ok_or(ApngEncodeErrors::PixelAccess("native row out of bounds"))?;
                out.copy_from_slice(row);
            }
            RowPath::StripAlpha { pixels, stride } => {
                let start = y * stride;
                let row = pixels
                    .get(start..start + width * 4)
                    .ok_or(ApngEncodeErrors::PixelAccess("native row out of bounds"))?;

                for (dst, src) in out.chunks_exact_mut(3).zip(row.chunks_exact(4)) {
                    dst.copy_from_slice(&src[..3]);
                }
            }
            RowPath::Generic => self.transcode_generic(y, out)?
        }
        Ok(())
    }

    fn transcode_generic(&self, y: usize, out: &mut [u8]) -> Result<(), ApngEncodeErrors> {
        let bpp = self.layout.bytes_per_pixel();
        let source = self.source;

        for (x, px) in out.chunks_exact_mut(bpp).enumerate() {
            match self.layout {
                PixelLayout::Palette8 => {
                    px[0] = source
                        .color_index(x, y)
                        .ok_or(ApngEncodeErrors::PixelAccess("no palette index for pixel"))?;
                }
                PixelLayout::Luma8 => {
                    px[0] = source.pixel(x, y)?.to_gray8().0;
                }
                PixelLayout::Rgb8 => {
                    let c = source.pixel(x, y)?;
                    px[0] = (c.r >> 8) as u8;
                    px[1] = (c.g >> 8) as u8;
                    px[2] = (c.b >> 8) as u8;
                }
                PixelLayout::Rgba8 => {
                    let c = source.pixel(x, y)?.to_nrgba8();
                    px.copy_from_slice(&[c.r, c.g, c.b, c.a]);
                }
                PixelLayout::Luma16 => {
                    let c = source.pixel(x, y)?.to_gray16();
                    px.copy_from_slice(&c.0.to_be_bytes());
                }
                PixelLayout::Rgb16 => {
                    let c = source.pixel(x, y)?;
                    px[0..2].copy_from_slice(&c.r.to_be_bytes());
                    px[2..4].copy_from_slice(&c.g.to_be_bytes());
                    px[4..6].copy_from_slice(&c.b.to_be_bytes());
                }
                PixelLayout::Rgba16 => {
                    let c = source.pixel(x, y)?.to_nrgba16();
                    px[0..2].copy_from_slice(&c.r.to_be_bytes());
                    px[2..4].copy_from_slice(&c.g.to_be_bytes());
                    px[4..6].copy_from_slice(&c.b.to_be_bytes());
                    px[6..8].copy_from_slice(&c.a.to_be_bytes());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Gray16, Nrgba16, Nrgba8, Rgba64, Rgba8};
    use crate::image::{Gray16Image, GrayImage, Nrgba16Image, NrgbaImage, PalettedImage, RgbaImage};

    /// Hides the native storage of a source so the generic path runs
    struct Opaque<'a, S: PixelSource>(&'a S);

    impl<'a, S: PixelSource> PixelSource for Opaque<'a, S> {
        fn dimensions(&self) -> (usize, usize) {
            self.0.dimensions()
        }
        fn pixel(&self, x: usize, y: usize) -> Result<Rgba64, ApngEncodeErrors> {
            self.0.pixel(x, y)
        }
        fn has_color_indices(&self) -> bool {
            self.0.has_color_indices()
        }
        fn color_index(&self, x: usize, y: usize) -> Option<u8> {
            self.0.color_index(x, y)
        }
    }

    fn row<S: PixelSource + ?Sized>(source: &S, layout: PixelLayout, y: usize) -> Vec<u8> {
        let transcoder = RowTranscoder::new(source, layout).unwrap();
        let mut out = vec![0xAA; transcoder.row_bytes() + 1];
        transcoder.transcode_row(y, &mut out).unwrap();
        // filter byte is untouched
        assert_eq!(out[0], 0xAA);
        out[1..].to_vec()
    }

    #[test]
    fn test_fast_and_generic_paths_agree() {
        let mut nrgba = NrgbaImage::new(3, 2);
        nrgba.set(
            0,
            1,
            Nrgba8 {
                r: 10,
                g: 20,
                b: 30,
                a: 255
            }
        );
        nrgba.set(
            2,
            1,
            Nrgba8 {
                r: 200,
                g: 100,
                b: 50,
                a: 255
            }
        );
        for layout in [PixelLayout::Rgba8, PixelLayout::Rgb8] {
            assert_eq!(row(&nrgba, layout, 1), row(&Opaque(&nrgba), layout, 1));
        }

        let gray = GrayImage::from_raw(4, 1, vec![0, 50, 128, 255]).unwrap();
        assert_eq!(row(&gray, PixelLayout::Luma8, 0), vec![0, 50, 128, 255]);
        assert_eq!(row(&Opaque(&gray), PixelLayout::Luma8, 0), vec![0, 50, 128, 255]);
    }

    #[test]
    fn test_rgb_strips_alpha() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.set(
            1,
            0,
            Rgba8 {
                r: 1,
                g: 2,
                b: 3,
                a: 255
            }
        );
        assert_eq!(row(&rgba, PixelLayout::Rgb8, 0), vec![0, 0, 0, 1, 2, 3]);
    }

    #[test]
    fn test_premultiplied_source_is_unpremultiplied() {
        // half transparent red, premultiplied
        let rgba = RgbaImage::from_raw(1, 1, vec![128, 0, 0, 128]).unwrap();
        assert_eq!(row(&rgba, PixelLayout::Rgba8, 0), vec![255, 0, 0, 128]);
    }

    #[test]
    fn test_sixteen_bit_is_big_endian() {
        let mut gray = Gray16Image::new(2, 1);
        gray.set(0, 0, Gray16(0x1234));
        gray.set(1, 0, Gray16(0xFFFF));
        assert_eq!(row(&gray, PixelLayout::Luma16, 0), vec![0x12, 0x34, 0xFF, 0xFF]);

        let mut rgba = Nrgba16Image::new(1, 1);
        rgba.set(
            0,
            0,
            Nrgba16 {
                r: 0x0102,
                g: 0x0304,
                b: 0x0506,
                a: 0xFFFF
            }
        );
        assert_eq!(
            row(&rgba, PixelLayout::Rgba16, 0),
            vec![1, 2, 3, 4, 5, 6, 0xFF, 0xFF]
        );
        assert_eq!(row(&rgba, PixelLayout::Rgb16, 0), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_eight_bit_to_sixteen_bit_widens() {
        let gray = GrayImage::from_raw(1, 1, vec![0xAB]).unwrap();
        assert_eq!(row(&gray, PixelLayout::Luma16, 0), vec![0xAB, 0xAB]);
    }

    #[test]
    fn test_palette_indices() {
        let palette = [Gray16(0), Gray16(0xFFFF)];
        let image = PalettedImage::from_raw(3, 1, vec![1, 0, 1], &palette).unwrap();
        assert_eq!(row(&image, PixelLayout::Palette8, 0), vec![1, 0, 1]);
        assert_eq!(row(&Opaque(&image), PixelLayout::Palette8, 0), vec![1, 0, 1]);
    }

    #[test]
    fn test_palette_without_indices_is_rejected() {
        let image = NrgbaImage::new(2, 2);
        assert!(matches!(
            RowTranscoder::new(&image, PixelLayout::Palette8),
            Err(ApngEncodeErrors::NoPaletteIndex)
        ));
    }

    #[test]
    fn test_zero_dimensions_are_rejected() {
        let image = GrayImage::new(0, 4);
        assert!(matches!(
            RowTranscoder::new(&image, PixelLayout::Luma8),
            Err(ApngEncodeErrors::ZeroDimensions)
        ));
    }
}
