/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// The eight bytes every png/apng stream starts with
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Number of compressed bytes collected before they are handed
/// to the consumer as one IDAT/fdAT payload.
pub const DEFAULT_UNIT_SIZE: usize = 1 << 15;

pub(crate) const IHDR: [u8; 4] = *b"IHDR";
pub(crate) const PLTE: [u8; 4] = *b"PLTE";
pub(crate) const TRNS: [u8; 4] = *b"tRNS";
pub(crate) const IDAT: [u8; 4] = *b"IDAT";
pub(crate) const IEND: [u8; 4] = *b"IEND";
pub(crate) const ACTL: [u8; 4] = *b"acTL";
pub(crate) const FCTL: [u8; 4] = *b"fcTL";
pub(crate) const FDAT: [u8; 4] = *b"fdAT";

/// IHDR payload length
pub(crate) const IHDR_SIZE: usize = 13;
/// acTL payload length
pub(crate) const ACTL_SIZE: usize = 8;
/// fcTL payload length
pub(crate) const FCTL_SIZE: usize = 26;
