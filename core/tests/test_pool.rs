// Handle lifecycle, pooling, and "one handle, one thread" independence.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use deflate_bridge_core::prelude::*;

    fn payload(seed: u8) -> Vec<u8> {
        (0..50_000u32).map(|i| ((i / 7) as u8).wrapping_add(seed)).collect()
    }

    fn compress_with(handle: &mut CompressorHandle, input: &[u8]) -> Vec<u8> {
        compress_to_vec(handle, &mut Region::whole(FixedBuffer::from_slice(input)), Format::Zlib)
            .unwrap()
    }

    #[test]
    fn checkout_reuses_returned_handles() {
        let pool = HandlePool::new(2);
        let handle = pool.checkout_compressor(6).unwrap();
        assert_eq!(handle.level(), 6);
        assert_eq!(pool.idle_compressors(6), 0);

        pool.checkin_compressor(handle);
        assert_eq!(pool.idle_compressors(6), 1);
        assert_eq!(pool.idle_compressors(5), 0);

        let again = pool.checkout_compressor(6).unwrap();
        assert_eq!(pool.idle_compressors(6), 0);
        pool.checkin_compressor(again);
    }

    #[test]
    fn full_pool_frees_overflow() {
        let pool = HandlePool::new(1);
        let a = pool.checkout_decompressor().unwrap();
        let b = pool.checkout_decompressor().unwrap();
        pool.checkin_decompressor(a);
        pool.checkin_decompressor(b);
        assert_eq!(pool.idle_decompressors(), 1);
    }

    #[test]
    fn drain_frees_everything_idle() {
        let pool = HandlePool::new(4);
        for level in [1, 6, 12] {
            let handle = pool.checkout_compressor(level).unwrap();
            pool.checkin_compressor(handle);
        }
        let d = pool.checkout_decompressor().unwrap();
        pool.checkin_decompressor(d);

        assert_eq!(pool.drain(), 4);
        assert_eq!(pool.idle_compressors(6), 0);
        assert_eq!(pool.idle_decompressors(), 0);
    }

    #[test]
    fn pool_rejects_invalid_levels() {
        let pool = HandlePool::default();
        assert!(matches!(
            pool.checkout_compressor(40),
            Err(BridgeError::InvalidLevel { level: 40 })
        ));
    }

    #[test]
    fn distinct_handles_on_distinct_threads_match_sequential_results() {
        let inputs: Vec<Vec<u8>> = (0..4u8).map(payload).collect();

        let mut sequential_handle = CompressorHandle::create(6).unwrap();
        let sequential: Vec<Vec<u8>> =
            inputs.iter().map(|input| compress_with(&mut sequential_handle, input)).collect();
        sequential_handle.destroy();

        let pool = Arc::new(HandlePool::new(4));
        let workers: Vec<_> = inputs
            .iter()
            .cloned()
            .map(|input| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    let mut handle = pool.checkout_compressor(6).unwrap();
                    let out = compress_with(&mut handle, &input);
                    pool.checkin_compressor(handle);
                    out
                })
            })
            .collect();
        let parallel: Vec<Vec<u8>> = workers.into_iter().map(|w| w.join().unwrap()).collect();

        assert_eq!(parallel, sequential);
    }

    #[test]
    fn handles_move_between_threads() {
        let mut handle = DecompressorHandle::create().unwrap();
        let compressed = {
            let mut c = CompressorHandle::create(6).unwrap();
            let out = compress_with(&mut c, b"moved across threads");
            c.destroy();
            out
        };

        let restored = thread::spawn(move || {
            let out = decompress_to_vec(
                &mut handle,
                &mut Region::whole(FixedBuffer::from_slice(&compressed)),
                Format::Zlib,
                None,
                &BridgeConfig::default(),
            )
            .unwrap();
            handle.destroy();
            out
        })
        .join()
        .unwrap();

        assert_eq!(restored, b"moved across threads");
    }
}
