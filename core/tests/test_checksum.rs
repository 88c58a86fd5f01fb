// Checksum call surface: determinism, origin independence, chaining, and
// agreement with an independent CRC32 implementation.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use deflate_bridge_core::prelude::*;

    fn crc_fixed(seed: u32, bytes: &[u8]) -> u32 {
        crc32(seed, &mut Region::whole(FixedBuffer::from_slice(bytes))).unwrap()
    }

    fn crc_heap(seed: u32, bytes: &[u8]) -> u32 {
        crc32(seed, &mut Region::whole(HeapBuffer::new(bytes))).unwrap()
    }

    fn adler_fixed(seed: u32, bytes: &[u8]) -> u32 {
        adler32(seed, &mut Region::whole(FixedBuffer::from_slice(bytes))).unwrap()
    }

    fn adler_heap(seed: u32, bytes: &[u8]) -> u32 {
        adler32(seed, &mut Region::whole(HeapBuffer::new(bytes))).unwrap()
    }

    #[test]
    fn empty_input_returns_seed() {
        assert_eq!(crc_fixed(0, &[]), 0);
        assert_eq!(crc_heap(0xDEAD_BEEF, &[]), 0xDEAD_BEEF);
        assert_eq!(adler_fixed(1, &[]), 1);
    }

    #[test]
    fn region_offset_limits_the_checksummed_bytes() {
        let bytes = b"xx123456789yy";
        let mut region = Region::new(HeapBuffer::new(&bytes[..]), 2, 9);
        assert_eq!(crc32(0, &mut region).unwrap(), 0xCBF4_3926);
    }

    #[test]
    fn checksum_never_modifies_a_writable_heap_source() {
        let mut bytes = b"payload".to_vec();
        let _ = crc32(0, &mut Region::whole(HeapBuffer::new(&mut bytes))).unwrap();
        assert_eq!(bytes, b"payload");
    }

    #[test]
    fn acquisition_failure_skips_the_computation() {
        let bytes = vec![1u8; 32];
        let mut region = Region::whole(HeapBuffer::with_budget(bytes.as_slice(), Some(8)));
        assert!(matches!(
            crc32(0, &mut region),
            Err(BridgeError::AcquisitionFailure { len: 32, .. })
        ));
    }

    #[test]
    fn heap_staging_covers_only_the_region() {
        let bytes = vec![7u8; 1 << 20];
        let mut region = Region::new(HeapBuffer::with_budget(bytes.as_slice(), Some(4096)), 0, 8);
        assert_eq!(crc32(0, &mut region).unwrap(), crc32fast::hash(&bytes[..8]));

        // advancing through a large array stages one small window per call
        let mut running = 0;
        for offset in (0..1 << 20).step_by(1 << 16) {
            let mut region =
                Region::new(HeapBuffer::with_budget(bytes.as_slice(), Some(4096)), offset, 4096);
            running = crc32(running, &mut region).unwrap();
        }
        let expected: Vec<u8> = bytes
            .chunks(1 << 16)
            .flat_map(|chunk| chunk[..4096].iter().copied())
            .collect();
        assert_eq!(running, crc32fast::hash(&expected));
    }

    #[test]
    fn running_checksums_match_single_calls() {
        let mut crc = Crc32::new();
        crc.update(b"hello ");
        crc.update_region(&mut Region::whole(HeapBuffer::new(&b"world"[..]))).unwrap();
        assert_eq!(crc.value(), crc32fast::hash(b"hello world"));

        let mut adler = Adler32::new();
        adler.update(b"hello ");
        adler.update(b"world");
        assert_eq!(adler.value(), adler_fixed(1, b"hello world"));
    }

    proptest! {
        #[test]
        fn prop_crc32_matches_reference(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
            prop_assert_eq!(crc_fixed(0, &bytes), crc32fast::hash(&bytes));
        }

        #[test]
        fn prop_origin_independent(
            seed in any::<u32>(),
            bytes in proptest::collection::vec(any::<u8>(), 0..2048),
        ) {
            prop_assert_eq!(crc_fixed(seed, &bytes), crc_heap(seed, &bytes));
            prop_assert_eq!(adler_fixed(seed, &bytes), adler_heap(seed, &bytes));
            prop_assert_eq!(crc_fixed(seed, &bytes), crc_fixed(seed, &bytes));
        }

        #[test]
        fn prop_chaining_equals_concatenation(
            seed in any::<u32>(),
            a in proptest::collection::vec(any::<u8>(), 0..1024),
            b in proptest::collection::vec(any::<u8>(), 0..1024),
        ) {
            let joined: Vec<u8> = a.iter().chain(b.iter()).copied().collect();
            prop_assert_eq!(crc_fixed(crc_heap(seed, &a), &b), crc_fixed(seed, &joined));
            prop_assert_eq!(adler_fixed(adler_heap(1, &a), &b), adler_fixed(1, &joined));
        }
    }
}
