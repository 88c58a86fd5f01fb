//! checksum.rs
//! Running CRC32 / Adler32 values over successive buffers.

use std::ffi::c_void;

use libdeflate_sys::{libdeflate_adler32, libdeflate_crc32};

use crate::bridge;
use crate::buffer::{BufferView, Region};
use crate::types::Result;

macro_rules! running_checksum {
    ($name:ident, $func:path, $native:path, $initial:expr) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub struct $name {
            value: u32,
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $name {
            pub const INITIAL: u32 = $initial;

            pub fn new() -> Self {
                Self { value: Self::INITIAL }
            }

            pub fn with_seed(seed: u32) -> Self {
                Self { value: seed }
            }

            /// Folds a borrowed slice in. Slices need no view, so this cannot fail.
            pub fn update(&mut self, bytes: &[u8]) {
                // SAFETY: `bytes` is readable for its whole length.
                self.value =
                    unsafe { $native(self.value, bytes.as_ptr() as *const c_void, bytes.len()) };
            }

            /// Updates from a region of any view kind; acquisition failures propagate.
            pub fn update_region<V: BufferView>(&mut self, region: &mut Region<V>) -> Result<()> {
                self.value = $func(self.value, region)?;
                Ok(())
            }

            pub fn value(&self) -> u32 {
                self.value
            }

            pub fn reset(&mut self) {
                self.value = Self::INITIAL;
            }
        }
    };
}

running_checksum!(Crc32, bridge::crc32, libdeflate_crc32, 0);
running_checksum!(Adler32, bridge::adler32, libdeflate_adler32, 1);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        let mut crc = Crc32::new();
        crc.update(b"123456789");
        assert_eq!(crc.value(), 0xCBF4_3926);

        let mut adler = Adler32::new();
        adler.update(b"Wikipedia");
        assert_eq!(adler.value(), 0x11E6_0398);
    }

    #[test]
    fn slice_and_region_updates_agree() {
        use crate::buffer::FixedBuffer;

        let data = b"The quick brown fox jumps over the lazy dog";
        let mut by_slice = Crc32::new();
        by_slice.update(&data[..10]);
        by_slice.update(&[]);
        by_slice.update(&data[10..]);

        let mut by_region = Crc32::new();
        by_region
            .update_region(&mut Region::whole(FixedBuffer::from_slice(data)))
            .unwrap();
        assert_eq!(by_slice.value(), by_region.value());
        assert_eq!(by_slice.value(), 0x414F_A339);
    }

    #[test]
    fn reset_restores_initial_value() {
        let mut adler = Adler32::new();
        adler.update(b"abc");
        adler.reset();
        assert_eq!(adler.value(), 1);
    }
}
