// Handle ownership: a slot releases its context only through an explicit
// call, never because the slot itself went away.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use deflate_bridge_core::prelude::*;
    use deflate_bridge_core::types::HandleKind;

    /// Stand-in context that counts how often it is destroyed.
    struct Counted(Arc<AtomicUsize>);

    impl NativeHandle for Counted {
        const KIND: HandleKind = HandleKind::Compressor;

        fn destroy(self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counted() -> (Counted, Arc<AtomicUsize>) {
        let destroyed = Arc::new(AtomicUsize::new(0));
        (Counted(Arc::clone(&destroyed)), destroyed)
    }

// # ✅ 1. Explicit destroy releases exactly once

    #[test]
    fn destroy_releases_once_and_empties_the_slot() {
        let (handle, destroyed) = counted();
        let mut slot = HandleSlot::new(handle);
        assert!(slot.is_live());

        slot.destroy();
        slot.destroy();
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
        assert!(!slot.is_live());
        assert!(matches!(
            slot.get_mut(),
            Err(BridgeError::HandleDestroyed { kind: HandleKind::Compressor })
        ));
    }

// # ❌ 2. Dropping a live slot never destroys the context

    #[test]
    fn dropping_a_live_slot_does_not_destroy() {
        let (handle, destroyed) = counted();
        let slot = HandleSlot::new(handle);
        drop(slot);
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);
    }

// # ✅ 3. take hands the context on without destroying it

    #[test]
    fn take_moves_the_handle_out() {
        let (handle, destroyed) = counted();
        let mut slot = HandleSlot::new(handle);
        let taken = slot.take().unwrap();
        drop(slot);
        assert_eq!(destroyed.load(Ordering::SeqCst), 0);

        taken.destroy();
        assert_eq!(destroyed.load(Ordering::SeqCst), 1);
    }

// # ✅ 4. Real contexts work through a slot

    #[test]
    fn compressor_in_a_slot_compresses_and_returns_to_a_pool() {
        let pool = HandlePool::new(2);
        let mut slot = HandleSlot::new(pool.checkout_compressor(6).unwrap());
        let out = {
            let handle = slot.get_mut().unwrap();
            compress_to_vec(handle, &mut Region::whole(FixedBuffer::from_slice(b"abcabcabc")), Format::Zlib)
                .unwrap()
        };
        assert!(!out.is_empty());

        pool.checkin_compressor(slot.take().unwrap());
        assert_eq!(pool.idle_compressors(6), 1);
        assert_eq!(pool.drain(), 1);
    }
}
