//! result.rs
//! Packs native outcomes into the single scalar each call surface returns.
//!
//! Summary:
//! - compress → `i32` byte count, `-1` when a buffer could not be acquired.
//! - decompress → `i64`: high 32 bits consumed, low 32 bits produced, with
//!   bit 31 of the low half flagging insufficient destination space.
//! - Malformed input is never encoded; it stays a typed `BridgeError`.

use crate::constants::{COMPRESS_ACQUISITION_FAILED, INSUFFICIENT_SPACE_FLAG, PRODUCED_MASK};
use crate::types::{BridgeError, Result};

/// What one decompress call did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DecompressOutcome {
    /// Bytes read from the source region.
    pub consumed: u32,
    /// Bytes written to the destination region.
    pub produced: u32,
    /// The destination was too small; retry with a larger one.
    pub insufficient_space: bool,
}

impl DecompressOutcome {
    pub fn pack(&self) -> i64 {
        let mut low = self.produced & PRODUCED_MASK;
        if self.insufficient_space {
            low |= INSUFFICIENT_SPACE_FLAG;
        }
        ((u64::from(self.consumed) << 32) | u64::from(low)) as i64
    }

    pub fn unpack(packed: i64) -> Self {
        let bits = packed as u64;
        let low = bits as u32;
        Self {
            consumed: (bits >> 32) as u32,
            produced: low & PRODUCED_MASK,
            insufficient_space: low & INSUFFICIENT_SPACE_FLAG != 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.insufficient_space
    }
}

/// Maps a compress result onto the `i32` call surface. Acquisition failure
/// becomes the `-1` sentinel; every other error is passed through.
pub fn encode_compress(result: Result<usize>) -> Result<i32> {
    match result {
        // Region lengths arrive as i32, so the written size always fits.
        Ok(written) => Ok(i32::try_from(written).unwrap_or(i32::MAX)),
        Err(BridgeError::AcquisitionFailure { .. }) => Ok(COMPRESS_ACQUISITION_FAILED),
        Err(e) => Err(e),
    }
}

pub fn encode_decompress(result: Result<DecompressOutcome>) -> Result<i64> {
    result.map(|outcome| outcome.pack())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferOrigin;
    use crate::format::Format;

    #[test]
    fn pack_places_consumed_in_high_half() {
        let outcome = DecompressOutcome { consumed: 31, produced: 11, insufficient_space: false };
        assert_eq!(outcome.pack(), (31i64 << 32) | 11);
        assert_eq!(DecompressOutcome::unpack(outcome.pack()), outcome);
    }

    #[test]
    fn insufficient_space_sets_top_bit_of_low_half() {
        let outcome = DecompressOutcome { consumed: 0, produced: 0, insufficient_space: true };
        assert_eq!(outcome.pack(), 0x8000_0000);
        let back = DecompressOutcome::unpack(outcome.pack());
        assert!(back.insufficient_space);
        assert_eq!(back.produced, 0);
    }

    #[test]
    fn compress_sentinel_only_for_acquisition_failure() {
        let failed = Err(BridgeError::AcquisitionFailure { origin: BufferOrigin::Heap, len: 4 });
        assert_eq!(encode_compress(failed), Ok(-1));
        assert_eq!(encode_compress(Ok(17)), Ok(17));
        assert_eq!(
            encode_compress(Err(BridgeError::ReadOnlyDestination)),
            Err(BridgeError::ReadOnlyDestination)
        );
    }

    #[test]
    fn malformed_input_is_not_encoded() {
        let err = BridgeError::MalformedInput { format: Format::Zlib };
        assert_eq!(encode_decompress(Err(err.clone())), Err(err));
    }
}
