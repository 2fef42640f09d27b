/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Big endian integer writes and chunk framing
use std::io::{ErrorKind, Write};

use log::trace;

use crate::crc::calc_crc_parts;
use crate::error::ChunkWriteError;

/// Write `value` into the first two bytes of `buf`, most significant byte first
///
/// # Panics
/// If `buf` is shorter than two bytes
#[inline]
pub fn write_u16_be(buf: &mut [u8], value: u16) {
    buf[..2].copy_from_slice(&value.to_be_bytes());
}

/// Write `value` into the first four bytes of `buf`, most significant byte first
///
/// # Panics
/// If `buf` is shorter than four bytes
#[inline]
pub fn write_u32_be(buf: &mut [u8], value: u32) {
    buf[..4].copy_from_slice(&value.to_be_bytes());
}

/// Write all of `data`, keeping count of how many bytes actually
/// made it into the writer
fn write_counted<W: Write + ?Sized>(
    writer: &mut W, mut data: &[u8], written: &mut u64
) -> Result<(), std::io::Error> {
    while !data.is_empty() {
        match writer.write(data) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    ErrorKind::WriteZero,
                    "failed to write whole chunk"
                ));
            }
            Ok(n) => {
                *written += n as u64;
                data = &data[n..];
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e)
        }
    }
    Ok(())
}

/// Write a single chunk
///
/// The format is
///
/// length - chunk type - [data] - crc
///
/// where length is the length of data and crc covers the chunk type
/// and data.
///
/// The header, payload and crc are written one after another, on failure
/// the error carries the number of bytes the writer accepted.
///
/// # Returns
/// - Ok(size): Number of bytes written, always `12 + data.len()`
pub fn write_chunk<W: Write + ?Sized>(
    chunk_type: &[u8; 4], data: &[u8], writer: &mut W
) -> Result<u64, ChunkWriteError> {
    write_chunk_parts(chunk_type, &[data], writer)
}

/// Write a chunk whose payload is the concatenation of `parts`.
///
/// Same as [`write_chunk`] but avoids joining the payload
/// into one buffer first.
pub fn write_chunk_parts<W: Write + ?Sized>(
    chunk_type: &[u8; 4], parts: &[&[u8]], writer: &mut W
) -> Result<u64, ChunkWriteError> {
    let length: usize = parts.iter().map(|part| part.len()).sum();

    let mut header = [0_u8; 8];
    let mut footer = [0_u8; 4];

    write_u32_be(&mut header[..4], length as u32);
    header[4..].copy_from_slice(chunk_type);
    write_u32_be(&mut footer, calc_crc_parts(chunk_type, parts));

    let mut written = 0;

    let to_error = |error, written| ChunkWriteError {
        bytes_written: written,
        error
    };

    write_counted(writer, &header, &mut written).map_err(|e| to_error(e, written))?;

    for part in parts {
        write_counted(writer, part, &mut written).map_err(|e| to_error(e, written))?;
    }
    write_counted(writer, &footer, &mut written).map_err(|e| to_error(e, written))?;

    trace!(
        "Wrote {} chunk, {} bytes",
        String::from_utf8_lossy(chunk_type),
        written
    );
    Ok(written)
}
