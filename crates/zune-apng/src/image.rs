/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Pixel sources the encoder can read from
//!
//! The encoder reads images through the [`PixelSource`] trait, one pixel
//! at a time via [`PixelSource::pixel`]. Sources whose memory layout already
//! matches a png layout can expose it via [`PixelSource::native_rows`], in
//! which case whole rows are copied instead.
//!
//! A few owned buffers implementing the trait are provided
//! - [`GrayImage`]: 8 bit luma
//! - [`Gray16Image`]: 16 bit luma
//! - [`RgbaImage`]: 8 bit RGBA with premultiplied alpha
//! - [`NrgbaImage`]: 8 bit RGBA, alpha not premultiplied
//! - [`Nrgba16Image`]: 16 bit RGBA, alpha not premultiplied
//! - [`PalettedImage`]: 8 bit indices into a palette
use std::sync::Arc;

use crate::color::{Color, Gray16, Gray8, Nrgba16, Nrgba8, Rgba64, Rgba8};
use crate::error::ApngEncodeErrors;

/// Contiguous storage of a source, rows are `stride` bytes apart
/// and row `y` starts at `y * stride`
#[derive(Copy, Clone, Debug)]
pub enum NativeRows<'a> {
    /// One byte of luma per pixel
    Luma8 { pixels: &'a [u8], stride: usize },
    /// One palette index per pixel
    Indexed { pixels: &'a [u8], stride: usize },
    /// R,G,B,A bytes per pixel, color premultiplied by alpha
    Rgba8Premultiplied { pixels: &'a [u8], stride: usize },
    /// R,G,B,A bytes per pixel, alpha not premultiplied
    Rgba8 { pixels: &'a [u8], stride: usize }
}

/// A two dimensional image the encoder can read pixels from.
///
/// Implementors must return pixels for every `x < width` and `y < height`
pub trait PixelSource {
    /// Width and height of the image
    fn dimensions(&self) -> (usize, usize);

    /// Return the color at (x, y)
    ///
    /// Encoding to a layout without alpha drops the alpha channel
    /// returned here without checking that it is opaque.
    fn pixel(&self, x: usize, y: usize) -> Result<Rgba64, ApngEncodeErrors>;

    /// Whether [`color_index`](Self::color_index) is implemented
    fn has_color_indices(&self) -> bool {
        false
    }

    /// Return the palette index at (x, y) for paletted sources
    fn color_index(&self, _x: usize, _y: usize) -> Option<u8> {
        None
    }

    /// Expose contiguous storage if the source has one
    fn native_rows(&self) -> Option<NativeRows<'_>> {
        None
    }
}

impl<T: PixelSource + ?Sized> PixelSource for Arc<T> {
    fn dimensions(&self) -> (usize, usize) {
        (**self).dimensions()
    }
    fn pixel(&self, x: usize, y: usize) -> Result<Rgba64, ApngEncodeErrors> {
        (**self).pixel(x, y)
    }
    fn has_color_indices(&self) -> bool {
        (**self).has_color_indices()
    }
    fn color_index(&self, x: usize, y: usize) -> Option<u8> {
        (**self).color_index(x, y)
    }
    fn native_rows(&self) -> Option<NativeRows<'_>> {
        (**self).native_rows()
    }
}

impl<T: PixelSource + ?Sized> PixelSource for Box<T> {
    fn dimensions(&self) -> (usize, usize) {
        (**self).dimensions()
    }
    fn pixel(&self, x: usize, y: usize) -> Result<Rgba64, ApngEncodeErrors> {
        (**self).pixel(x, y)
    }
    fn has_color_indices(&self) -> bool {
        (**self).has_color_indices()
    }
    fn color_index(&self, x: usize, y: usize) -> Option<u8> {
        (**self).color_index(x, y)
    }
    fn native_rows(&self) -> Option<NativeRows<'_>> {
        (**self).native_rows()
    }
}

macro_rules! image_buffer {
    ($name:ident, $storage:ty, $channels:expr) => {
        impl $name {
            /// Create a new image with every sample set to zero
            pub fn new(width: usize, height: usize) -> $name {
                $name {
                    width,
                    height,
                    pixels: vec![0; width * height * $channels]
                }
            }

            #[doc = concat!("Wrap existing samples, ", stringify!($channels), " per pixel, row major.")]
            ///
            /// Returns `None` if the length does not match the dimensions
            pub fn from_raw(width: usize, height: usize, pixels: Vec<$storage>) -> Option<$name> {
                let expected = width.checked_mul(height)?.checked_mul($channels)?;
                if pixels.len() != expected {
                    return None;
                }
                Some($name {
                    width,
                    height,
                    pixels
                })
            }

            pub const fn width(&self) -> usize {
                self.width
            }

            pub const fn height(&self) -> usize {
                self.height
            }

            /// Raw samples, row major
            pub fn pixels(&self) -> &[$storage] {
                &self.pixels
            }

            #[inline]
            fn offset(&self, x: usize, y: usize) -> Result<usize, ApngEncodeErrors> {
                if x >= self.width || y >= self.height {
                    return Err(ApngEncodeErrors::PixelAccess("coordinates outside image"));
                }
                Ok((y * self.width + x) * $channels)
            }
        }
    };
}

/// An 8 bit grayscale image
#[derive(Clone, Debug)]
pub struct GrayImage {
    width:  usize,
    height: usize,
    pixels: Vec<u8>
}

image_buffer!(GrayImage, u8, 1);

impl GrayImage {
    pub fn set(&mut self, x: usize, y: usize, color: Gray8) {
        if let Ok(pos) = self.offset(x, y) {
            self.pixels[pos] = color.0;
        }
    }
}

impl PixelSource for GrayImage {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn pixel(&self, x: usize, y: usize) -> Result<Rgba64, ApngEncodeErrors> {
        let pos = self.offset(x, y)?;
        Ok(Gray8(self.pixels[pos]).to_rgba64())
    }

    fn native_rows(&self) -> Option<NativeRows<'_>> {
        Some(NativeRows::Luma8 {
            pixels: &self.pixels,
            stride: self.width
        })
    }
}

/// A 16 bit grayscale image, samples in native endian
#[derive(Clone, Debug)]
pub struct Gray16Image {
    width:  usize,
    height: usize,
    pixels: Vec<u16>
}

image_buffer!(Gray16Image, u16, 1);

impl Gray16Image {
    pub fn set(&mut self, x: usize, y: usize, color: Gray16) {
        if let Ok(pos) = self.offset(x, y) {
            self.pixels[pos] = color.0;
        }
    }
}

impl PixelSource for Gray16Image {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn pixel(&self, x: usize, y: usize) -> Result<Rgba64, ApngEncodeErrors> {
        let pos = self.offset(x, y)?;
        Ok(Gray16(self.pixels[pos]).to_rgba64())
    }
}

/// An 8 bit RGBA image whose color channels are premultiplied by alpha
#[derive(Clone, Debug)]
pub struct RgbaImage {
    width:  usize,
    height: usize,
    pixels: Vec<u8>
}

image_buffer!(RgbaImage, u8, 4);

impl RgbaImage {
    pub fn set(&mut self, x: usize, y: usize, color: Rgba8) {
        if let Ok(pos) = self.offset(x, y) {
            self.pixels[pos..pos + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }
}

impl PixelSource for RgbaImage {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn pixel(&self, x: usize, y: usize) -> Result<Rgba64, ApngEncodeErrors> {
        let pos = self.offset(x, y)?;
        let px = &self.pixels[pos..pos + 4];
        Ok(Rgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3]
        }
        .to_rgba64())
    }

    fn native_rows(&self) -> Option<NativeRows<'_>> {
        Some(NativeRows::Rgba8Premultiplied {
            pixels: &self.pixels,
            stride: self.width * 4
        })
    }
}

/// An 8 bit RGBA image, alpha not premultiplied
#[derive(Clone, Debug)]
pub struct NrgbaImage {
    width:  usize,
    height: usize,
    pixels: Vec<u8>
}

image_buffer!(NrgbaImage, u8, 4);

impl NrgbaImage {
    pub fn set(&mut self, x: usize, y: usize, color: Nrgba8) {
        if let Ok(pos) = self.offset(x, y) {
            self.pixels[pos..pos + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Set every pixel to `color`
    pub fn fill(&mut self, color: Nrgba8) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }
}

impl PixelSource for NrgbaImage {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn pixel(&self, x: usize, y: usize) -> Result<Rgba64, ApngEncodeErrors> {
        let pos = self.offset(x, y)?;
        let px = &self.pixels[pos..pos + 4];
        Ok(Nrgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3]
        }
        .to_rgba64())
    }

    fn native_rows(&self) -> Option<NativeRows<'_>> {
        Some(NativeRows::Rgba8 {
            pixels: &self.pixels,
            stride: self.width * 4
        })
    }
}

/// A 16 bit RGBA image, alpha not premultiplied, samples in native endian
#[derive(Clone, Debug)]
pub struct Nrgba16Image {
    width:  usize,
    height: usize,
    pixels: Vec<u16>
}

image_buffer!(Nrgba16Image, u16, 4);

impl Nrgba16Image {
    pub fn set(&mut self, x: usize, y: usize, color: Nrgba16) {
        if let Ok(pos) = self.offset(x, y) {
            self.pixels[pos..pos + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }
}

impl PixelSource for Nrgba16Image {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn pixel(&self, x: usize, y: usize) -> Result<Rgba64, ApngEncodeErrors> {
        let pos = self.offset(x, y)?;
        let px = &self.pixels[pos..pos + 4];
        Ok(Nrgba16 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3]
        }
        .to_rgba64())
    }
}

/// An image storing one 8 bit palette index per pixel
#[derive(Clone, Debug)]
pub struct PalettedImage {
    width:   usize,
    height:  usize,
    pixels:  Vec<u8>,
    palette: Vec<Rgba64>
}

impl PalettedImage {
    /// Create a new image with every index set to zero
    pub fn new<C: Color>(width: usize, height: usize, palette: &[C]) -> PalettedImage {
        PalettedImage {
            width,
            height,
            pixels: vec![0; width * height],
            palette: palette.iter().map(|c| c.to_rgba64()).collect()
        }
    }

    /// Wrap existing indices, one per pixel, row major.
    ///
    /// Returns `None` if the length does not match the dimensions
    pub fn from_raw<C: Color>(
        width: usize, height: usize, pixels: Vec<u8>, palette: &[C]
    ) -> Option<PalettedImage> {
        if pixels.len() != width.checked_mul(height)? {
            return None;
        }
        Some(PalettedImage {
            width,
            height,
            pixels,
            palette: palette.iter().map(|c| c.to_rgba64()).collect()
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub fn palette(&self) -> &[Rgba64] {
        &self.palette
    }

    pub fn set_index(&mut self, x: usize, y: usize, index: u8) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = index;
        }
    }
}

impl PixelSource for PalettedImage {
    fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn pixel(&self, x: usize, y: usize) -> Result<Rgba64, ApngEncodeErrors> {
        let index = self
            .color_index(x, y)
            .ok_or(ApngEncodeErrors::PixelAccess("coordinates outside image"))?;

        self.palette
            .get(usize::from(index))
            .copied()
            .ok_or(ApngEncodeErrors::PixelAccess("palette index outside palette"))
    }

    fn has_color_indices(&self) -> bool {
        true
    }

    fn color_index(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    fn native_rows(&self) -> Option<NativeRows<'_>> {
        Some(NativeRows::Indexed {
            pixels: &self.pixels,
            stride: self.width
        })
    }
}

#[test]
fn test_from_raw_checks_length() {
    assert!(GrayImage::from_raw(4, 4, vec![0; 16]).is_some());
    assert!(GrayImage::from_raw(4, 4, vec![0; 15]).is_none());
    assert!(NrgbaImage::from_raw(2, 3, vec![0; 24]).is_some());
    assert!(Nrgba16Image::from_raw(2, 3, vec![0; 23]).is_none());
    assert!(PalettedImage::from_raw(3, 3, vec![0; 9], &[Gray8(0)]).is_some());
}

#[test]
fn test_out_of_bounds_pixel_is_error() {
    let image = NrgbaImage::new(3, 3);
    assert!(image.pixel(2, 2).is_ok());
    assert!(image.pixel(3, 0).is_err());
    assert!(image.pixel(0, 3).is_err());
}

#[test]
fn test_paletted_lookup() {
    let palette = [
        Nrgba8 {
            r: 0,
            g: 0,
            b: 0,
            a: 255
        },
        Nrgba8 {
            r: 255,
            g: 0,
            b: 0,
            a: 255
        }
    ];
    let mut image = PalettedImage::new(2, 1, &palette);
    image.set_index(1, 0, 1);
    assert_eq!(image.color_index(1, 0), Some(1));
    assert_eq!(image.pixel(1, 0).unwrap().to_nrgba8(), palette[1]);

    // index 5 points past the palette
    image.set_index(0, 0, 5);
    assert!(image.pixel(0, 0).is_err());
}
