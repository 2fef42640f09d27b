/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Color samples and conversions between them
//!
//! Every color converts into [`Rgba64`], a 16 bit per channel
//! representation with premultiplied alpha. Encoders then convert
//! from it into what the target layout needs, png stores
//! non-premultiplied samples.

/// A 16 bit per channel color with alpha premultiplied into
/// the color channels.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Rgba64 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16
}

/// An 8 bit per channel color with premultiplied alpha
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8
}

/// An 8 bit per channel color, alpha not premultiplied
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Nrgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8
}

/// A 16 bit per channel color, alpha not premultiplied
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Nrgba16 {
    pub r: u16,
    pub g: u16,
    pub b: u16,
    pub a: u16
}

/// An opaque 8 bit gray value
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Gray8(pub u8);

/// An opaque 16 bit gray value
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Gray16(pub u16);

/// Anything that can be expressed as a premultiplied 16 bit color
pub trait Color: Copy {
    fn to_rgba64(self) -> Rgba64;
}

impl Color for Rgba64 {
    #[inline]
    fn to_rgba64(self) -> Rgba64 {
        self
    }
}

impl Color for Rgba8 {
    #[inline]
    fn to_rgba64(self) -> Rgba64 {
        Rgba64 {
            r: u16::from(self.r) * 0x101,
            g: u16::from(self.g) * 0x101,
            b: u16::from(self.b) * 0x101,
            a: u16::from(self.a) * 0x101
        }
    }
}

impl Color for Nrgba8 {
    #[inline]
    fn to_rgba64(self) -> Rgba64 {
        let a = u32::from(self.a) * 0x101;
        let premultiply = |c: u8| ((u32::from(c) * 0x101 * a) / 0xffff) as u16;

        Rgba64 {
            r: premultiply(self.r),
            g: premultiply(self.g),
            b: premultiply(self.b),
            a: a as u16
        }
    }
}

impl Color for Nrgba16 {
    #[inline]
    fn to_rgba64(self) -> Rgba64 {
        let a = u32::from(self.a);
        let premultiply = |c: u16| ((u32::from(c) * a) / 0xffff) as u16;

        Rgba64 {
            r: premultiply(self.r),
            g: premultiply(self.g),
            b: premultiply(self.b),
            a: self.a
        }
    }
}

impl Color for Gray8 {
    #[inline]
    fn to_rgba64(self) -> Rgba64 {
        let y = u16::from(self.0) * 0x101;
        Rgba64 {
            r: y,
            g: y,
            b: y,
            a: 0xffff
        }
    }
}

impl Color for Gray16 {
    #[inline]
    fn to_rgba64(self) -> Rgba64 {
        Rgba64 {
            r: self.0,
            g: self.0,
            b: self.0,
            a: 0xffff
        }
    }
}

impl Rgba64 {
    /// Undo alpha premultiplication keeping 16 bits per channel
    pub fn to_nrgba16(self) -> Nrgba16 {
        match self.a {
            0xffff => Nrgba16 {
                r: self.r,
                g: self.g,
                b: self.b,
                a: 0xffff
            },
            0 => Nrgba16::default(),
            a => {
                let a32 = u32::from(a);
                let unpremultiply = |c: u16| ((u32::from(c) * 0xffff) / a32).min(0xffff) as u16;

                Nrgba16 {
                    r: unpremultiply(self.r),
                    g: unpremultiply(self.g),
                    b: unpremultiply(self.b),
                    a
                }
            }
        }
    }

    /// Undo alpha premultiplication and keep the top 8 bits of each channel
    pub fn to_nrgba8(self) -> Nrgba8 {
        let c = self.to_nrgba16();
        Nrgba8 {
            r: (c.r >> 8) as u8,
            g: (c.g >> 8) as u8,
            b: (c.b >> 8) as u8,
            a: (c.a >> 8) as u8
        }
    }

    /// ITU-R BT.601 luma, the alpha channel is ignored
    pub fn to_gray16(self) -> Gray16 {
        Gray16((self.luma_fixed() >> 16) as u16)
    }

    /// ITU-R BT.601 luma, the alpha channel is ignored
    pub fn to_gray8(self) -> Gray8 {
        Gray8((self.luma_fixed() >> 24) as u8)
    }

    /// Luma scaled by 2^16 and rounded, the weights sum to 65536
    /// so the result always fits a u32
    #[inline]
    fn luma_fixed(self) -> u32 {
        19595 * u32::from(self.r) + 38470 * u32::from(self.g) + 7471 * u32::from(self.b) + (1 << 15)
    }
}

#[test]
fn test_premultiply_roundtrip() {
    let color = Nrgba8 {
        r: 255,
        g: 0,
        b: 0,
        a: 128
    };
    assert_eq!(color.to_rgba64().to_nrgba8(), color);

    let opaque = Nrgba8 {
        r: 12,
        g: 34,
        b: 56,
        a: 255
    };
    assert_eq!(opaque.to_rgba64().to_nrgba8(), opaque);
}

#[test]
fn test_transparent_is_black() {
    let color = Nrgba8 {
        r: 200,
        g: 100,
        b: 50,
        a: 0
    };
    assert_eq!(color.to_rgba64().to_nrgba8(), Nrgba8::default());
}

#[test]
fn test_gray_conversions() {
    let white = Gray8(255).to_rgba64();
    assert_eq!(white.to_gray8(), Gray8(255));
    assert_eq!(white.to_gray16(), Gray16(0xffff));

    let black = Gray16(0).to_rgba64();
    assert_eq!(black.to_gray8(), Gray8(0));

    for y in [1_u8, 17, 128, 254] {
        assert_eq!(Gray8(y).to_rgba64().to_gray8(), Gray8(y));
    }
}
