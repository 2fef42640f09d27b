/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::io::Read;

use flate2::read::ZlibDecoder;
use nanorand::{Rng, WyRand};
use png::Transformations;
use zune_apng::{
    ActlChunk, BitDepth, BlendOp, DisposeOp, EncoderOptions, FctlChunk, IendChunk, IhdrChunk,
    NrgbaImage, PngChunk, PngColor, SequenceNumbers, PNG_SIGNATURE
};

struct Chunk {
    tag:     [u8; 4],
    payload: Vec<u8>
}

fn parse_chunks(data: &[u8]) -> Vec<Chunk> {
    assert_eq!(&data[..8], &PNG_SIGNATURE);
    let mut position = 8;
    let mut chunks = vec![];

    while position < data.len() {
        let length = u32::from_be_bytes(data[position..position + 4].try_into().unwrap()) as usize;
        let tag: [u8; 4] = data[position + 4..position + 8].try_into().unwrap();
        let payload = data[position + 8..position + 8 + length].to_vec();
        let crc = u32::from_be_bytes(
            data[position + 8 + length..position + 12 + length]
                .try_into()
                .unwrap()
        );
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&tag);
        hasher.update(&payload);
        assert_eq!(hasher.finalize(), crc);

        chunks.push(Chunk { tag, payload });
        position += 12 + length;
    }
    chunks
}

fn be32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes(bytes[..4].try_into().unwrap())
}

fn inflate(data: &[u8]) -> Vec<u8> {
    let mut out = vec![];
    ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
    out
}

/// Undo png filtering of `raw`, returning the pixels without filter bytes
fn unfilter(raw: &[u8], row_bytes: usize, bpp: usize) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::with_capacity(raw.len());
    let mut previous = vec![0_u8; row_bytes];

    for row in raw.chunks_exact(row_bytes + 1) {
        let filter = row[0];
        let mut current = row[1..].to_vec();

        for i in 0..row_bytes {
            let a = if i >= bpp { current[i - bpp] } else { 0 };
            let b = previous[i];
            let c = if i >= bpp { previous[i - bpp] } else { 0 };

            let predictor = match filter {
                0 => 0,
                1 => a,
                2 => b,
                3 => ((u16::from(a) + u16::from(b)) / 2) as u8,
                4 => {
                    let p = i16::from(a) + i16::from(b) - i16::from(c);
                    let (pa, pb, pc) = ((p - i16::from(a)).abs(), (p - i16::from(b)).abs(), (p - i16::from(c)).abs());
                    if pa <= pb && pa <= pc {
                        a
                    } else if pb <= pc {
                        b
                    } else {
                        c
                    }
                }
                _ => panic!("unknown filter {filter}")
            };
            current[i] = current[i].wrapping_add(predictor);
        }
        out.extend_from_slice(&current);
        previous = current;
    }
    out
}

fn random_frame(width: usize, height: usize, rand: &mut WyRand) -> NrgbaImage {
    let mut pixels = vec![0_u8; width * height * 4];
    rand.fill(&mut pixels);
    NrgbaImage::from_raw(width, height, pixels).unwrap()
}

/// Encode a default image followed by `frames` animation frames
fn encode_animation(
    width: u32, height: u32, frames: &[NrgbaImage], options: EncoderOptions
) -> Vec<u8> {
    let ihdr = IhdrChunk::new(width, height, PngColor::RGBA, BitDepth::Eight).unwrap();

    let mut output = PNG_SIGNATURE.to_vec();
    let mut sequence = SequenceNumbers::new();

    ihdr.write_to(&mut output).unwrap();
    ActlChunk {
        num_frames: frames.len() as u32,
        num_plays:  0
    }
    .write_to(&mut output)
    .unwrap();

    ihdr.image_data_encoder(
        NrgbaImage::new(width as usize, height as usize),
        options
    )
    .unwrap()
    .write_chunks_to(&mut output)
    .unwrap();

    for frame in frames {
        FctlChunk {
            sequence_number: sequence.next(),
            width: frame.width() as u32,
            height: frame.height() as u32,
            delay_num: 1,
            delay_den: 10,
            dispose_op: DisposeOp::Background,
            blend_op: BlendOp::Source,
            ..Default::default()
        }
        .write_to(&mut output)
        .unwrap();

        ihdr.frame_data_encoder(&mut sequence, frame.clone(), options)
            .unwrap()
            .write_chunks_to(&mut output)
            .unwrap();
    }
    IendChunk.write_to(&mut output).unwrap();
    output
}

#[test]
fn test_sequence_numbers_are_contiguous() {
    let mut rand = WyRand::new_seed(2023);
    let frames: Vec<NrgbaImage> = (0..10).map(|_| random_frame(20, 20, &mut rand)).collect();

    let options = EncoderOptions::default().set_unit_size(256);
    let encoded = encode_animation(20, 20, &frames, options);

    let chunks = parse_chunks(&encoded);
    let numbers: Vec<u32> = chunks
        .iter()
        .filter(|chunk| &chunk.tag == b"fcTL" || &chunk.tag == b"fdAT")
        .map(|chunk| be32(&chunk.payload))
        .collect();

    assert!(numbers.len() > 20, "expected several fdAT per frame");
    assert_eq!(numbers, (0..numbers.len() as u32).collect::<Vec<_>>());
}

#[test]
fn test_chunk_order() {
    let mut rand = WyRand::new_seed(5);
    let frames: Vec<NrgbaImage> = (0..3).map(|_| random_frame(8, 8, &mut rand)).collect();
    let encoded = encode_animation(8, 8, &frames, EncoderOptions::default());

    let tags: Vec<[u8; 4]> = parse_chunks(&encoded)
        .iter()
        .map(|chunk| chunk.tag)
        .collect();

    assert_eq!(&tags[0], b"IHDR");
    assert_eq!(&tags[1], b"acTL");
    assert_eq!(&tags[2], b"IDAT");
    assert_eq!(tags.last(), Some(b"IEND"));

    // every fdAT run is preceded by an fcTL
    let mut seen_fctl = 0;
    for window in tags.windows(2) {
        if &window[1] == b"fdAT" {
            assert!(&window[0] == b"fcTL" || &window[0] == b"fdAT");
        }
        if &window[1] == b"fcTL" {
            seen_fctl += 1;
        }
    }
    assert_eq!(seen_fctl, 3);
}

#[test]
fn test_control_chunk_payloads() {
    let mut rand = WyRand::new_seed(9);
    let frames = vec![random_frame(6, 4, &mut rand)];
    let chunks = parse_chunks(&encode_animation(10, 10, &frames, EncoderOptions::default()));

    let actl = chunks.iter().find(|chunk| &chunk.tag == b"acTL").unwrap();
    assert_eq!(actl.payload, [0, 0, 0, 1, 0, 0, 0, 0]);

    let fctl = chunks.iter().find(|chunk| &chunk.tag == b"fcTL").unwrap();
    assert_eq!(
        fctl.payload,
        [
            0, 0, 0, 0, // sequence
            0, 0, 0, 6, // width
            0, 0, 0, 4, // height
            0, 0, 0, 0, // x offset
            0, 0, 0, 0, // y offset
            0, 1, // delay numerator
            0, 10, // delay denominator
            1,  // dispose background
            0   // blend source
        ]
    );
}

#[test]
fn test_frame_data_round_trip() {
    let mut rand = WyRand::new_seed(77);
    let frames: Vec<NrgbaImage> = (0..4).map(|_| random_frame(13, 9, &mut rand)).collect();

    let options = EncoderOptions::default().set_unit_size(128);
    let chunks = parse_chunks(&encode_animation(13, 9, &frames, options));

    let mut decoded_frames: Vec<Vec<u8>> = vec![];
    let mut current: Option<Vec<u8>> = None;

    for chunk in &chunks {
        match &chunk.tag {
            b"fcTL" => {
                if let Some(data) = current.take() {
                    decoded_frames.push(data);
                }
                current = Some(vec![]);
            }
            b"fdAT" => current
                .as_mut()
                .expect("fdAT before fcTL")
                .extend_from_slice(&chunk.payload[4..]),
            _ => ()
        }
    }
    decoded_frames.extend(current);
    assert_eq!(decoded_frames.len(), frames.len());

    for (compressed, frame) in decoded_frames.iter().zip(&frames) {
        let raw = inflate(compressed);
        assert_eq!(raw.len(), 9 * (13 * 4 + 1));
        assert_eq!(unfilter(&raw, 13 * 4, 4), frame.pixels());
    }
}

#[test]
fn test_default_image_decodes() {
    let mut rand = WyRand::new_seed(1);
    let frames: Vec<NrgbaImage> = (0..2).map(|_| random_frame(16, 16, &mut rand)).collect();
    let encoded = encode_animation(16, 16, &frames, EncoderOptions::default());

    let mut decoder = png::Decoder::new(encoded.as_slice());
    decoder.set_transformations(Transformations::IDENTITY);
    let mut reader = decoder.read_info().unwrap();

    let animation = reader.info().animation_control.as_ref().unwrap();
    assert_eq!(animation.num_frames, 2);
    assert_eq!(animation.num_plays, 0);

    let mut buf = vec![0; reader.output_buffer_size()];
    reader.next_frame(&mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 0));
}
