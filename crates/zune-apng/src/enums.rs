/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Enumerations written into png and apng chunks

/// Color type of an image as stored in the IHDR chunk
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngColor {
    Luma,
    RGB,
    Palette,
    LumaA,
    RGBA
}

impl PngColor {
    pub const fn to_int(self) -> u8 {
        match self {
            PngColor::Luma => 0,
            PngColor::RGB => 2,
            PngColor::Palette => 3,
            PngColor::LumaA => 4,
            PngColor::RGBA => 6
        }
    }

    pub const fn from_int(int: u8) -> Option<PngColor> {
        match int {
            0 => Some(Self::Luma),
            2 => Some(Self::RGB),
            3 => Some(Self::Palette),
            4 => Some(Self::LumaA),
            6 => Some(Self::RGBA),
            _ => None
        }
    }

    pub const fn num_components(self) -> usize {
        match self {
            PngColor::Luma | PngColor::Palette => 1,
            PngColor::LumaA => 2,
            PngColor::RGB => 3,
            PngColor::RGBA => 4
        }
    }
}

/// Bits per sample (or per palette index) as stored in the IHDR chunk
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BitDepth {
    One,
    Two,
    Four,
    Eight,
    Sixteen
}

impl BitDepth {
    pub const fn to_int(self) -> u8 {
        match self {
            BitDepth::One => 1,
            BitDepth::Two => 2,
            BitDepth::Four => 4,
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16
        }
    }

    pub const fn from_int(int: u8) -> Option<BitDepth> {
        match int {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            4 => Some(Self::Four),
            8 => Some(Self::Eight),
            16 => Some(Self::Sixteen),
            _ => None
        }
    }
}

/// Compression method, png defines only deflate
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum CompressionMethod {
    #[default]
    Deflate
}

impl CompressionMethod {
    pub const fn to_int(self) -> u8 {
        0
    }
}

/// Filter method, png defines only adaptive filtering with five filter types
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FilterMethod {
    #[default]
    Adaptive
}

impl FilterMethod {
    pub const fn to_int(self) -> u8 {
        0
    }
}

/// Interlace method.
///
/// The encoder writes pixel data top to bottom, so only `Standard`
/// describes what it produces.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum InterlaceMethod {
    #[default]
    Standard,
    Adam7
}

impl InterlaceMethod {
    pub const fn to_int(self) -> u8 {
        match self {
            InterlaceMethod::Standard => 0,
            InterlaceMethod::Adam7 => 1
        }
    }
}

/// What happens to a frame region after the frame is displayed
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum DisposeOp {
    /// Leave the output buffer as is
    #[default]
    None,
    /// Clear the frame region to fully transparent black
    Background,
    /// Revert the frame region to what it was before this frame
    Previous
}

impl DisposeOp {
    pub const fn to_int(self) -> u8 {
        match self {
            DisposeOp::None => 0,
            DisposeOp::Background => 1,
            DisposeOp::Previous => 2
        }
    }
}

/// How a frame is composited onto the output buffer
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum BlendOp {
    /// Overwrite the region, alpha included
    #[default]
    Source,
    /// Alpha-composite over the region
    Over
}

impl BlendOp {
    pub const fn to_int(self) -> u8 {
        match self {
            BlendOp::Source => 0,
            BlendOp::Over => 1
        }
    }
}

/// Per scanline filter type, stored as the first byte of each
/// filtered row
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FilterType {
    None,
    Sub,
    Up,
    Average,
    Paeth
}

impl FilterType {
    pub const fn to_int(self) -> u8 {
        match self {
            FilterType::None => 0,
            FilterType::Sub => 1,
            FilterType::Up => 2,
            FilterType::Average => 3,
            FilterType::Paeth => 4
        }
    }

    pub const fn from_int(int: u8) -> Option<FilterType> {
        match int {
            0 => Some(FilterType::None),
            1 => Some(FilterType::Sub),
            2 => Some(FilterType::Up),
            3 => Some(FilterType::Average),
            4 => Some(FilterType::Paeth),
            _ => None
        }
    }
}

/// The pixel layouts the encoder can produce.
///
/// Derived from a ([`PngColor`], [`BitDepth`]) pair, see [`PixelLayout::classify`]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PixelLayout {
    Luma8,
    Rgb8,
    Palette8,
    Rgba8,
    Luma16,
    Rgb16,
    Rgba16
}

impl PixelLayout {
    /// Return the layout for a color type and depth or `None` if
    /// the encoder cannot write that combination
    pub const fn classify(color: PngColor, depth: BitDepth) -> Option<PixelLayout> {
        match (color, depth) {
            (PngColor::Luma, BitDepth::Eight) => Some(PixelLayout::Luma8),
            (PngColor::RGB, BitDepth::Eight) => Some(PixelLayout::Rgb8),
            (PngColor::Palette, BitDepth::Eight) => Some(PixelLayout::Palette8),
            (PngColor::RGBA, BitDepth::Eight) => Some(PixelLayout::Rgba8),
            (PngColor::Luma, BitDepth::Sixteen) => Some(PixelLayout::Luma16),
            (PngColor::RGB, BitDepth::Sixteen) => Some(PixelLayout::Rgb16),
            (PngColor::RGBA, BitDepth::Sixteen) => Some(PixelLayout::Rgba16),
            _ => None
        }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Luma8 | PixelLayout::Palette8 => 1,
            PixelLayout::Luma16 => 2,
            PixelLayout::Rgb8 => 3,
            PixelLayout::Rgba8 => 4,
            PixelLayout::Rgb16 => 6,
            PixelLayout::Rgba16 => 8
        }
    }
}

#[test]
fn test_layout_classification() {
    assert_eq!(
        PixelLayout::classify(PngColor::RGBA, BitDepth::Eight),
        Some(PixelLayout::Rgba8)
    );
    assert_eq!(
        PixelLayout::classify(PngColor::Luma, BitDepth::Sixteen),
        Some(PixelLayout::Luma16)
    );
    // unsupported combinations
    assert_eq!(PixelLayout::classify(PngColor::RGB, BitDepth::Four), None);
    assert_eq!(PixelLayout::classify(PngColor::LumaA, BitDepth::Eight), None);
    assert_eq!(PixelLayout::classify(PngColor::Palette, BitDepth::Sixteen), None);
    assert_eq!(PixelLayout::classify(PngColor::Luma, BitDepth::One), None);
}

#[test]
fn test_bytes_per_pixel() {
    let expected = [
        (PixelLayout::Luma8, 1),
        (PixelLayout::Palette8, 1),
        (PixelLayout::Luma16, 2),
        (PixelLayout::Rgb8, 3),
        (PixelLayout::Rgba8, 4),
        (PixelLayout::Rgb16, 6),
        (PixelLayout::Rgba16, 8)
    ];
    for (layout, bpp) in expected {
        assert_eq!(layout.bytes_per_pixel(), bpp, "{layout:?}");
    }
}
