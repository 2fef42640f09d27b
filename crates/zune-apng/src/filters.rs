/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Adaptive scanline filtering
//!
//! Each scanline is filtered with all five png filter types and the one
//! whose output has the smallest sum of absolute values (bytes read as
//! signed) is kept. This is the heuristic libpng uses.

use crate::enums::FilterType;

/// Number of png filter types
pub(crate) const NUM_FILTERS: usize = 5;

/// Absolute value of a byte interpreted as an `i8`
#[inline(always)]
pub(crate) const fn abs8(d: u8) -> usize {
    if d < 128 {
        d as usize
    } else {
        256 - d as usize
    }
}

/// The paeth predictor, ties go to `a`, then `b`, then `c`
///
/// - a: left
/// - b: above
/// - c: upper left
#[inline(always)]
pub(crate) fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let (a16, b16, c16) = (i16::from(a), i16::from(b), i16::from(c));

    let pa = (b16 - c16).abs();
    let pb = (a16 - c16).abs();
    let pc = (a16 + b16 - 2 * c16).abs();

    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Choose a filter for the current scanline and apply it.
///
/// `rows[0]` holds the unfiltered scanline, `rows[1..5]` receive the
/// sub, up, average and paeth outputs. Byte 0 of every row is the
/// filter type and is not touched, `previous` is the unfiltered row above
/// (all zeroes for the first row) laid out the same way.
///
/// Candidates are tried as up, paeth, none, sub, average since the
/// first two win most often. A candidate stops as soon as its sum reaches
/// the best one so far and ties keep the earlier candidate, the result
/// therefore matches other encoders using the same order.
///
/// Returns the chosen filter, which is also the index into `rows`
/// holding the filtered scanline.
pub(crate) fn choose_and_apply_filter(
    rows: &mut [Vec<u8>; NUM_FILTERS], previous: &[u8], bpp: usize
) -> FilterType {
    let [none, sub, up, avg, paeth_row] = rows;

    let cdat0 = &none[1..];
    let cdat1 = &mut sub[1..];
    let cdat2 = &mut up[1..];
    let cdat3 = &mut avg[1..];
    let cdat4 = &mut paeth_row[1..];
    let pdat = &previous[1..];

    let n = cdat0.len();
    let bpp = bpp.min(n);

    // up
    let mut sum = 0;
    for i in 0..n {
        cdat2[i] = cdat0[i].wrapping_sub(pdat[i]);
        sum += abs8(cdat2[i]);
    }
    let mut best = sum;
    let mut filter = FilterType::Up;

    // paeth
    sum = 0;
    for i in 0..bpp {
        cdat4[i] = cdat0[i].wrapping_sub(pdat[i]);
        sum += abs8(cdat4[i]);
    }
    for i in bpp..n {
        cdat4[i] = cdat0[i].wrapping_sub(paeth(cdat0[i - bpp], pdat[i], pdat[i - bpp]));
        sum += abs8(cdat4[i]);
        if sum >= best {
            break;
        }
    }
    if sum < best {
        best = sum;
        filter = FilterType::Paeth;
    }

    // none
    sum = 0;
    for &byte in cdat0 {
        sum += abs8(byte);
        if sum >= best {
            break;
        }
    }
    if sum < best {
        best = sum;
        filter = FilterType::None;
    }

    // sub
    sum = 0;
    for i in 0..bpp {
        cdat1[i] = cdat0[i];
        sum += abs8(cdat1[i]);
    }
    for i in bpp..n {
        cdat1[i] = cdat0[i].wrapping_sub(cdat0[i - bpp]);
        sum += abs8(cdat1[i]);
        if sum >= best {
            break;
        }
    }
    if sum < best {
        best = sum;
        filter = FilterType::Sub;
    }

    // average
    sum = 0;
    for i in 0..bpp {
        cdat3[i] = cdat0[i].wrapping_sub(pdat[i] / 2);
        sum += abs8(cdat3[i]);
    }
    for i in bpp..n {
        let avg = ((u16::from(cdat0[i - bpp]) + u16::from(pdat[i])) / 2) as u8;
        cdat3[i] = cdat0[i].wrapping_sub(avg);
        sum += abs8(cdat3[i]);
        if sum >= best {
            break;
        }
    }
    if sum < best {
        filter = FilterType::Average;
    }

    filter
}
