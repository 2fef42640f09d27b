/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Chunk checksums

/// Calculate the crc of a chunk.
///
/// The checksum covers the chunk type followed by the chunk
/// payload, the length field is not included.
pub fn calc_crc(chunk_type: &[u8; 4], data: &[u8]) -> u32 {
    calc_crc_parts(chunk_type, &[data])
}

/// Calculate the crc of a chunk whose payload is split into
/// several consecutive slices
pub fn calc_crc_parts(chunk_type: &[u8; 4], parts: &[&[u8]]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

#[test]
fn test_iend_crc() {
    // every png ends with the same IEND crc
    assert_eq!(calc_crc(b"IEND", &[]), 0xAE42_6082);
}

#[test]
fn test_split_payload_crc() {
    let data = [1_u8, 2, 3, 4, 5, 6];
    assert_eq!(
        calc_crc(b"fdAT", &data),
        calc_crc_parts(b"fdAT", &[&data[..2], &data[2..2], &data[2..]])
    );
}

#[test]
fn test_crc_changes_on_corruption() {
    let mut data = vec![10_u8; 64];
    let before = calc_crc(b"IDAT", &data);
    data[31] ^= 1;
    assert_ne!(before, calc_crc(b"IDAT", &data));
}
