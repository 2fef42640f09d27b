/*
 * Copyright (c) 2023.
 *
 * This software is free software; You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Streaming image data encoders
//!
//! Filtering and compression run on a background thread. Compressed
//! bytes are handed over in units of at most
//! [`unit_size`](EncoderOptions::unit_size) bytes, one at a time. The
//! thread blocks until the consumer takes a unit, so memory stays bounded
//! no matter how large the image is.
//!
//! Consumers pull units with `advance`, read them with `current`
//! and check `error` once `advance` returns false.
//!
//! Dropping an encoder before it is exhausted stops the background
//! thread and waits for it to exit.
use std::io::{ErrorKind, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};

use flate2::write::ZlibEncoder;
use log::{debug, error, trace, warn};

use crate::chunks::{FdatChunk, IdatChunk, IhdrChunk, PngChunk};
use crate::enums::{FilterType, PixelLayout};
use crate::error::ApngEncodeErrors;
use crate::filters::{choose_and_apply_filter, NUM_FILTERS};
use crate::image::PixelSource;
use crate::options::EncoderOptions;
use crate::sequence::SequenceNumbers;
use crate::transcode::RowTranscoder;

/// Message from the background thread
enum Unit {
    Data(Vec<u8>),
    Failed(ApngEncodeErrors)
}

/// Sink of the zlib stream, sends a unit to the consumer whenever
/// `unit_size` bytes have accumulated
struct UnitWriter {
    pending:   Vec<u8>,
    unit_size: usize,
    sender:    SyncSender<Unit>,
    units:     usize,
    abandoned: bool
}

impl UnitWriter {
    fn new(sender: SyncSender<Unit>, unit_size: usize) -> UnitWriter {
        UnitWriter {
            pending: Vec::with_capacity(unit_size),
            unit_size,
            sender,
            units: 0,
            abandoned: false
        }
    }

    /// Stop handing off units, the zlib stream is incomplete
    fn abandon(&mut self) {
        self.abandoned = true;
        self.pending.clear();
    }

    fn hand_off(&mut self) -> std::io::Result<()> {
        let unit = std::mem::replace(&mut self.pending, Vec::with_capacity(self.unit_size));

        trace!("Handing off unit {} of {} bytes", self.units, unit.len());

        if self.sender.send(Unit::Data(unit)).is_err() {
            warn!("Image data consumer went away after {} units", self.units);
            return Err(std::io::Error::new(
                ErrorKind::BrokenPipe,
                "image data consumer went away"
            ));
        }
        self.units += 1;
        Ok(())
    }

    /// Hand off the last, possibly short, unit
    fn finish(mut self) -> std::io::Result<usize> {
        if !self.pending.is_empty() && !self.abandoned {
            self.hand_off()?;
        }
        Ok(self.units)
    }
}

impl Write for UnitWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.abandoned {
            return Err(std::io::Error::new(
                ErrorKind::Other,
                "image data stream was abandoned"
            ));
        }
        let space = self.unit_size - self.pending.len();
        let n = space.min(buf.len());

        self.pending.extend_from_slice(&buf[..n]);

        if self.pending.len() == self.unit_size {
            self.hand_off()?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        // units only leave when full or on finish
        Ok(())
    }
}

/// Transcode, filter and compress every row of `image`
fn encode_rows<S: PixelSource>(
    image: &S, layout: PixelLayout, options: EncoderOptions, sender: SyncSender<Unit>,
    cancel: &AtomicBool
) -> Result<(), ApngEncodeErrors> {
    let transcoder = RowTranscoder::new(image, layout)?;

    let mut encoder = ZlibEncoder::new(
        UnitWriter::new(sender, options.unit_size()),
        options.compression().to_flate2()
    );

    if let Err(err) = compress_rows(&transcoder, layout, options, &mut encoder, cancel) {
        // dropping the encoder finishes the stream, keep the
        // truncated tail away from the consumer
        encoder.get_mut().abandon();
        return Err(err);
    }
    let units = encoder.finish()?.finish()?;

    debug!("Finished image data, {} rows in {units} units", transcoder.height());
    Ok(())
}

fn compress_rows<S: PixelSource + ?Sized, W: Write>(
    transcoder: &RowTranscoder<S>, layout: PixelLayout, options: EncoderOptions,
    encoder: &mut W, cancel: &AtomicBool
) -> Result<(), ApngEncodeErrors> {
    let bpp = layout.bytes_per_pixel();
    let row_len = transcoder.row_bytes() + 1;
    let apply_filter = options.compression().filters_rows();

    // rows[0] is the unfiltered scanline, rows[f] receives filter f,
    // byte 0 of each row is the filter type
    let mut rows: [Vec<u8>; NUM_FILTERS] = core::array::from_fn(|i| {
        let mut row = vec![0; row_len];
        row[0] = i as u8;
        row
    });
    let mut previous = vec![0; row_len];

    for y in 0..transcoder.height() {
        if cancel.load(Ordering::Acquire) {
            return Err(ApngEncodeErrors::Cancelled);
        }
        transcoder.transcode_row(y, &mut rows[0])?;

        let filter = if apply_filter {
            choose_and_apply_filter(&mut rows, &previous, bpp)
        } else {
            FilterType::None
        };

        encoder.write_all(&rows[usize::from(filter.to_int())])?;

        // the current row is the previous row of y + 1
        core::mem::swap(&mut previous, &mut rows[0]);
    }
    Ok(())
}

/// Body of the background thread
fn produce<S: PixelSource>(
    image: S, layout: PixelLayout, options: EncoderOptions, sender: SyncSender<Unit>,
    cancel: Arc<AtomicBool>
) {
    if let Err(err) = encode_rows(&image, layout, options, sender.clone(), &cancel) {
        if cancel.load(Ordering::Acquire) {
            debug!("Image data encoding cancelled");
            return;
        }
        error!("Image data encoding failed: {err}");
        // consumer may already be gone, nothing left to tell then
        let _ = sender.send(Unit::Failed(err));
    }
}

/// Encodes an image into a sequence of IDAT chunks
///
/// # Example
/// ```
/// use zune_apng::{
///     BitDepth, EncoderOptions, IhdrChunk, ImageDataEncoder, NrgbaImage, PngChunk, PngColor
/// };
///
/// let ihdr = IhdrChunk::new(16, 16, PngColor::RGBA, BitDepth::Eight).unwrap();
/// let image = NrgbaImage::new(16, 16);
///
/// let mut sink = vec![];
/// let mut encoder = ImageDataEncoder::new(&ihdr, image, EncoderOptions::default()).unwrap();
///
/// while encoder.advance() {
///     if let Some(chunk) = encoder.current() {
///         chunk.write_to(&mut sink).unwrap();
///     }
/// }
/// assert!(encoder.error().is_none());
/// ```
pub struct ImageDataEncoder {
    receiver: Option<Receiver<Unit>>,
    worker:   Option<JoinHandle<()>>,
    cancel:   Arc<AtomicBool>,
    current:  Option<Vec<u8>>,
    error:    Option<ApngEncodeErrors>
}

impl ImageDataEncoder {
    /// Start encoding `image` in the layout described by `header`
    ///
    /// The width and height of `image` are used for the rows, `header`
    /// only decides the layout, so one header can drive frames smaller
    /// than the canvas.
    ///
    /// # Errors
    /// Unsupported color type/depth pairs, empty images and a zero unit
    /// size fail here, before anything is started. Everything else is
    /// reported by [`error`](Self::error).
    pub fn new<S>(
        header: &IhdrChunk, image: S, options: EncoderOptions
    ) -> Result<ImageDataEncoder, ApngEncodeErrors>
    where
        S: PixelSource + Send + 'static
    {
        let layout = header.layout()?;

        if options.unit_size() == 0 {
            return Err(ApngEncodeErrors::InvalidUnitSize(0));
        }
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(ApngEncodeErrors::ZeroDimensions);
        }
        debug!(
            "Encoding {width}x{height} image as {layout:?}, compression {:?}",
            options.compression()
        );

        // zero capacity, a send completes only when the consumer receives
        let (sender, receiver) = sync_channel(0);
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        let spawned = Builder::new()
            .name("zune-apng-encoder".to_string())
            .spawn(move || produce(image, layout, options, sender, flag));

        let encoder = match spawned {
            Ok(worker) => ImageDataEncoder {
                receiver: Some(receiver),
                worker: Some(worker),
                cancel,
                current: None,
                error: None
            },
            Err(err) => {
                error!("Could not start encoder thread: {err}");
                ImageDataEncoder {
                    receiver: None,
                    worker: None,
                    cancel,
                    current: None,
                    error: Some(ApngEncodeErrors::CoderInit(err))
                }
            }
        };
        Ok(encoder)
    }

    /// Wait for the next unit.
    ///
    /// Returns true if a unit is available through [`current`](Self::current),
    /// false once the stream is exhausted or failed, check [`error`](Self::error)
    /// to tell them apart.
    pub fn advance(&mut self) -> bool {
        self.current = None;

        if self.error.is_some() {
            return false;
        }
        let Some(receiver) = &self.receiver else {
            return false;
        };

        match receiver.recv() {
            Ok(Unit::Data(data)) => {
                self.current = Some(data);
                true
            }
            Ok(Unit::Failed(err)) => {
                self.error = Some(err);
                self.join_worker();
                false
            }
            Err(_) => {
                // all senders dropped, the thread is done
                self.join_worker();
                false
            }
        }
    }

    /// The error that stopped encoding, if any
    pub fn error(&self) -> Option<&ApngEncodeErrors> {
        self.error.as_ref()
    }

    /// The unit returned by the last successful [`advance`](Self::advance)
    /// wrapped as an IDAT chunk
    pub fn current(&self) -> Option<IdatChunk<'_>> {
        self.current.as_deref().map(IdatChunk)
    }

    /// Pull every unit and write it as an IDAT chunk to `writer`
    ///
    /// # Returns
    /// - Ok(size): bytes written
    /// - Err: the first chunk write error or the encoding error, which
    ///   is moved out of the encoder
    pub fn write_chunks_to<W: Write + ?Sized>(
        &mut self, writer: &mut W
    ) -> Result<u64, ApngEncodeErrors> {
        let mut written = 0;

        while self.advance() {
            if let Some(chunk) = self.current() {
                written += chunk.write_to(writer)?;
            }
        }
        match self.error.take() {
            Some(err) => Err(err),
            None => Ok(written)
        }
    }

    fn join_worker(&mut self) {
        self.receiver = None;

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() && self.error.is_none() {
                self.error = Some(ApngEncodeErrors::ProducerPanicked);
            }
        }
    }
}

impl Drop for ImageDataEncoder {
    fn drop(&mut self) {
        if self.worker.is_none() {
            return;
        }
        trace!("Dropping image data encoder before exhaustion, cancelling");
        self.cancel.store(true, Ordering::Release);
        // wakes a thread blocked on hand off
        self.receiver = None;

        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Encodes an animation frame into a sequence of fdAT chunks
///
/// Each chunk takes the next number from the shared [`SequenceNumbers`]
/// when it is retrieved with [`current`](Self::current).
pub struct FrameDataEncoder<'s> {
    sequence: &'s mut SequenceNumbers,
    inner:    ImageDataEncoder
}

impl<'s> FrameDataEncoder<'s> {
    /// Start encoding `image` as frame data, see [`ImageDataEncoder::new`]
    pub fn new<S>(
        header: &IhdrChunk, sequence: &'s mut SequenceNumbers, image: S, options: EncoderOptions
    ) -> Result<FrameDataEncoder<'s>, ApngEncodeErrors>
    where
        S: PixelSource + Send + 'static
    {
        Ok(FrameDataEncoder {
            sequence,
            inner: ImageDataEncoder::new(header, image, options)?
        })
    }

    /// See [`ImageDataEncoder::advance`]
    pub fn advance(&mut self) -> bool {
        self.inner.advance()
    }

    /// See [`ImageDataEncoder::error`]
    pub fn error(&self) -> Option<&ApngEncodeErrors> {
        self.inner.error()
    }

    /// The current unit as an fdAT chunk.
    ///
    /// Every call that returns a chunk consumes a sequence number.
    pub fn current(&mut self) -> Option<FdatChunk<'_>> {
        let data = self.inner.current.as_deref()?;

        Some(FdatChunk {
            sequence_number: self.sequence.next(),
            data
        })
    }

    /// Pull every unit and write it as an fdAT chunk to `writer`,
    /// see [`ImageDataEncoder::write_chunks_to`]
    pub fn write_chunks_to<W: Write + ?Sized>(
        &mut self, writer: &mut W
    ) -> Result<u64, ApngEncodeErrors> {
        let mut written = 0;

        while self.advance() {
            if let Some(chunk) = self.current() {
                written += chunk.write_to(writer)?;
            }
        }
        match self.inner.error.take() {
            Some(err) => Err(err),
            None => Ok(written)
        }
    }
}

impl IhdrChunk {
    /// Shorthand for [`ImageDataEncoder::new`]
    pub fn image_data_encoder<S>(
        &self, image: S, options: EncoderOptions
    ) -> Result<ImageDataEncoder, ApngEncodeErrors>
    where
        S: PixelSource + Send + 'static
    {
        ImageDataEncoder::new(self, image, options)
    }

    /// Shorthand for [`FrameDataEncoder::new`]
    pub fn frame_data_encoder<'s, S>(
        &self, sequence: &'s mut SequenceNumbers, image: S, options: EncoderOptions
    ) -> Result<FrameDataEncoder<'s>, ApngEncodeErrors>
    where
        S: PixelSource + Send + 'static
    {
        FrameDataEncoder::new(self, sequence, image, options)
    }
}
