//! bridge.rs
//! The four call surfaces: checksum, compress, decompress, and their growing
//! convenience forms.
//!
//! Every function is generic over the source and destination view types, so
//! the heap/heap, fixed/fixed, fixed/heap and heap/fixed variants of each
//! operation are the same code. The release discipline is:
//!
//! | Region                          | Outcome          | Release |
//! | ------------------------------- | ---------------- | ------- |
//! | source (any op)                 | any              | Abort   |
//! | destination, compress/decompress | 0 bytes produced | Abort   |
//! | destination, compress/decompress | >0 bytes produced | Commit |
//!
//! Each call acquires its regions, hands the raw spans to a `NativeRunner`
//! for the libdeflate call itself, and releases. The `*_with` forms take the
//! runner explicitly; the plain forms run inline.

use std::ffi::c_void;

use libdeflate_sys::{libdeflate_adler32, libdeflate_crc32};
use log::{debug, trace};

use crate::buffer::{BufferView, FixedBuffer, RawSpan, Region, ReleaseMode};
use crate::config::BridgeConfig;
use crate::constants::MAX_REGION_LEN;
use crate::format::Format;
use crate::handle::{CompressorHandle, DecompressorHandle, NativeStatus};
use crate::result::DecompressOutcome;
use crate::types::{BridgeError, Result};

/// Executes the native part of a bridge call.
///
/// Only raw spans, the handle and plain values cross into `run`; the views
/// stay with the caller. A runtime with a global lock releases it here.
pub trait NativeRunner {
    fn run<T, F>(&self, f: F) -> T
    where
        F: FnOnce() -> T + Send,
        T: Send;
}

/// Runs on the calling thread, as is.
#[derive(Copy, Clone, Debug, Default)]
pub struct Inline;

impl NativeRunner for Inline {
    fn run<T, F>(&self, f: F) -> T
    where
        F: FnOnce() -> T + Send,
        T: Send,
    {
        f()
    }
}

#[derive(Copy, Clone)]
enum ChecksumKind {
    Crc32,
    Adler32,
}

fn checksum<V: BufferView, R: NativeRunner>(
    runner: &R,
    kind: ChecksumKind,
    seed: u32,
    src: &mut Region<V>,
) -> Result<u32> {
    let span = src.acquire()?;
    let value = runner.run(move || {
        let span: RawSpan = span;
        let ptr = span.ptr as *const c_void;
        // SAFETY: the span is readable for `len` bytes until the region is released.
        unsafe {
            match kind {
                ChecksumKind::Crc32 => libdeflate_crc32(seed, ptr, span.len),
                ChecksumKind::Adler32 => libdeflate_adler32(seed, ptr, span.len),
            }
        }
    });
    src.release(ReleaseMode::Abort);
    Ok(value)
}

/// Updates a running CRC32 with the bytes of `src`.
pub fn crc32<V: BufferView>(seed: u32, src: &mut Region<V>) -> Result<u32> {
    checksum(&Inline, ChecksumKind::Crc32, seed, src)
}

/// Updates a running Adler32 with the bytes of `src`.
pub fn adler32<V: BufferView>(seed: u32, src: &mut Region<V>) -> Result<u32> {
    checksum(&Inline, ChecksumKind::Adler32, seed, src)
}

pub fn crc32_with<V: BufferView, R: NativeRunner>(
    runner: &R,
    seed: u32,
    src: &mut Region<V>,
) -> Result<u32> {
    checksum(runner, ChecksumKind::Crc32, seed, src)
}

pub fn adler32_with<V: BufferView, R: NativeRunner>(
    runner: &R,
    seed: u32,
    src: &mut Region<V>,
) -> Result<u32> {
    checksum(runner, ChecksumKind::Adler32, seed, src)
}

fn release_destination<D: BufferView>(dst: &mut Region<D>, produced: usize) {
    let mode = if produced > 0 { ReleaseMode::Commit } else { ReleaseMode::Abort };
    trace!("releasing {} destination with {:?}", dst.view().origin(), mode);
    dst.release(mode);
}

/// Acquires both regions. Whatever was already acquired is released again on failure.
fn acquire_pair<S: BufferView, D: BufferView>(
    src: &mut Region<S>,
    dst: &mut Region<D>,
) -> Result<(RawSpan, RawSpan)> {
    if !dst.view().is_writable() {
        return Err(BridgeError::ReadOnlyDestination);
    }
    let input = src.acquire()?;
    let output = match dst.acquire() {
        Ok(output) => output,
        Err(e) => {
            src.release(ReleaseMode::Abort);
            return Err(e);
        }
    };
    if overlaps(input, output) {
        src.release(ReleaseMode::Abort);
        dst.release(ReleaseMode::Abort);
        return Err(BridgeError::OverlappingRegions);
    }
    Ok((input, output))
}

fn overlaps(a: RawSpan, b: RawSpan) -> bool {
    let (a_start, b_start) = (a.ptr as usize, b.ptr as usize);
    a.len > 0
        && b.len > 0
        && a_start < b_start.saturating_add(b.len)
        && b_start < a_start.saturating_add(a.len)
}

/// Compresses `src` into `dst` with the given framing.
///
/// Returns the number of bytes written, 0 if `dst` was too small.
pub fn compress<S: BufferView, D: BufferView>(
    handle: &mut CompressorHandle,
    src: &mut Region<S>,
    dst: &mut Region<D>,
    format: Format,
) -> Result<usize> {
    compress_with(&Inline, handle, src, dst, format)
}

pub fn compress_with<S: BufferView, D: BufferView, R: NativeRunner>(
    runner: &R,
    handle: &mut CompressorHandle,
    src: &mut Region<S>,
    dst: &mut Region<D>,
    format: Format,
) -> Result<usize> {
    let (input, output) = acquire_pair(src, dst)?;
    // SAFETY: both spans stay valid until released below and do not overlap.
    let written = runner.run(move || unsafe { handle.compress_raw(input, output, format) });
    src.release(ReleaseMode::Abort);
    release_destination(dst, written);
    trace!("{format} compress: {} -> {written} bytes (capacity {})", input.len, output.len);
    Ok(written)
}

/// Decompresses `src` into `dst` with the given framing.
///
/// Insufficient destination space is reported through the outcome, not as an
/// error. Input that is not valid for `format` is `BridgeError::MalformedInput`.
pub fn decompress<S: BufferView, D: BufferView>(
    handle: &mut DecompressorHandle,
    src: &mut Region<S>,
    dst: &mut Region<D>,
    format: Format,
) -> Result<DecompressOutcome> {
    decompress_with(&Inline, handle, src, dst, format)
}

pub fn decompress_with<S: BufferView, D: BufferView, R: NativeRunner>(
    runner: &R,
    handle: &mut DecompressorHandle,
    src: &mut Region<S>,
    dst: &mut Region<D>,
    format: Format,
) -> Result<DecompressOutcome> {
    let (input, output) = acquire_pair(src, dst)?;
    // SAFETY: as in `compress_with`.
    let (consumed, produced, status) =
        runner.run(move || unsafe { handle.decompress_raw(input, output, format) });
    src.release(ReleaseMode::Abort);

    if status == NativeStatus::BadInput {
        dst.release(ReleaseMode::Abort);
        debug!("{format} decompress rejected {} input bytes", input.len);
        return Err(BridgeError::MalformedInput { format });
    }
    release_destination(dst, produced);

    // Regions are at most MAX_REGION_LEN bytes, so both counts fit in 31 bits.
    Ok(DecompressOutcome {
        consumed: consumed as u32,
        produced: produced as u32,
        insufficient_space: status == NativeStatus::InsufficientSpace,
    })
}

/// Compresses `src` into a fresh vector sized by the context's exact bound.
pub fn compress_to_vec<S: BufferView>(
    handle: &mut CompressorHandle,
    src: &mut Region<S>,
    format: Format,
) -> Result<Vec<u8>> {
    compress_to_vec_with(&Inline, handle, src, format)
}

pub fn compress_to_vec_with<S: BufferView, R: NativeRunner>(
    runner: &R,
    handle: &mut CompressorHandle,
    src: &mut Region<S>,
    format: Format,
) -> Result<Vec<u8>> {
    let (_, in_len) = src.window()?;
    let bound = handle.compress_bound(format, in_len);
    if bound > MAX_REGION_LEN {
        return Err(BridgeError::OutputLimitExceeded { limit: MAX_REGION_LEN });
    }
    let mut out = vec![0u8; bound];
    let written = {
        let mut dst = Region::whole(FixedBuffer::from_mut_slice(&mut out));
        compress_with(runner, handle, src, &mut dst, format)?
    };
    out.truncate(written);
    Ok(out)
}

/// Decompresses `src` into a fresh vector, doubling the destination whenever
/// libdeflate reports insufficient space, up to `config.max_output_len`.
///
/// `size_hint` is the expected decompressed size when the caller knows it.
pub fn decompress_to_vec<S: BufferView>(
    handle: &mut DecompressorHandle,
    src: &mut Region<S>,
    format: Format,
    size_hint: Option<usize>,
    config: &BridgeConfig,
) -> Result<Vec<u8>> {
    decompress_to_vec_with(&Inline, handle, src, format, size_hint, config)
}

pub fn decompress_to_vec_with<S: BufferView, R: NativeRunner>(
    runner: &R,
    handle: &mut DecompressorHandle,
    src: &mut Region<S>,
    format: Format,
    size_hint: Option<usize>,
    config: &BridgeConfig,
) -> Result<Vec<u8>> {
    let limit = config.max_output_len.min(MAX_REGION_LEN);
    let (_, in_len) = src.window()?;
    let mut capacity = size_hint
        .unwrap_or_else(|| in_len.saturating_mul(config.initial_growth_factor))
        .clamp(1, limit.max(1));

    loop {
        let mut out = vec![0u8; capacity];
        let outcome = {
            let mut dst = Region::whole(FixedBuffer::from_mut_slice(&mut out));
            decompress_with(runner, handle, src, &mut dst, format)?
        };
        if outcome.is_complete() {
            out.truncate(outcome.produced as usize);
            return Ok(out);
        }
        if capacity >= limit {
            return Err(BridgeError::OutputLimitExceeded { limit });
        }
        capacity = capacity.saturating_mul(2).min(limit);
        debug!("{format} decompress out of space, growing destination to {capacity} bytes");
    }
}
