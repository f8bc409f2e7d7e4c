//! Epoch-reclaimed atomic cell holding an immutable snapshot.

use std::sync::atomic::Ordering;

use crossbeam_epoch::{self as epoch, Atomic, Owned};
use crossbeam_utils::CachePadded;

/// A single shared value replaced wholesale by compare-and-swap.
///
/// Writers build a new boxed value from the current one and swap it in;
/// readers pin an epoch and clone the value they see. Neither side blocks,
/// and a reader can never observe a value that is still being written.
/// Replaced values are reclaimed once no pinned reader can reach them.
///
/// [`close`](Self::close) swaps in null: every later read returns `None` and
/// every update in flight fails its CAS, so nothing lands after close.
///
/// # Example
///
/// ```
/// use input_pipeline::SnapshotCell;
///
/// let cell = SnapshotCell::new(1_u64);
/// assert_eq!(cell.update(|v| Some(v + 1)), Some(2));
/// assert_eq!(cell.load(), Some(2));
///
/// cell.close();
/// assert_eq!(cell.update(|v| Some(v + 1)), None);
/// assert_eq!(cell.load(), None);
/// ```
#[derive(Debug)]
pub struct SnapshotCell<T> {
    current: CachePadded<Atomic<T>>,
}

impl<T> SnapshotCell<T> {
    /// Creates an open cell holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            current: CachePadded::new(Atomic::new(value)),
        }
    }

    /// Reads the current value through `f` without cloning it.
    ///
    /// Returns `None` once the cell is closed.
    pub fn read_with<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = &epoch::pin();
        let shared = self.current.load(Ordering::Acquire, guard);
        // SAFETY: non-null pointers in the cell are only reclaimed through
        // `defer_destroy`, which waits for this guard to unpin.
        unsafe { shared.as_ref() }.map(f)
    }

    /// Replaces the value with `f(current)` and returns a copy of the new value.
    ///
    /// `f` may run more than once under contention and must be free of side
    /// effects. Returns `None` without writing if `f` returns `None` or the
    /// cell is closed.
    pub fn update<F>(&self, mut f: F) -> Option<T>
    where
        T: Clone,
        F: FnMut(&T) -> Option<T>,
    {
        let guard = &epoch::pin();
        loop {
            let current = self.current.load(Ordering::Acquire, guard);
            // SAFETY: see `read_with`.
            let value = unsafe { current.as_ref() }?;
            let next = f(value)?;
            let published = next.clone();

            if self
                .current
                .compare_exchange(
                    current,
                    Owned::new(next),
                    Ordering::AcqRel,
                    Ordering::Acquire,
                    guard,
                )
                .is_ok()
            {
                // SAFETY: `current` is unlinked; readers still holding it
                // are pinned and keep it alive until they unpin.
                unsafe { guard.defer_destroy(current) };
                return Some(published);
            }
        }
    }

    /// Replaces the value unconditionally. Returns false once closed.
    pub fn store(&self, value: T) -> bool {
        let guard = &epoch::pin();
        let mut next = Owned::new(value);
        loop {
            let current = self.current.load(Ordering::Acquire, guard);
            if current.is_null() {
                return false;
            }
            match self.current.compare_exchange(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(_) => {
                    // SAFETY: see `update`.
                    unsafe { guard.defer_destroy(current) };
                    return true;
                }
                Err(err) => next = err.new,
            }
        }
    }

    /// Closes the cell. Idempotent.
    pub fn close(&self) {
        let guard = &epoch::pin();
        let old = self.current.swap(epoch::Shared::null(), Ordering::AcqRel, guard);
        if !old.is_null() {
            // SAFETY: `old` is unlinked and only reachable by pinned readers.
            unsafe { guard.defer_destroy(old) };
        }
    }

    /// Returns true once [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        let guard = &epoch::pin();
        self.current.load(Ordering::Acquire, guard).is_null()
    }
}

impl<T: Clone> SnapshotCell<T> {
    /// Returns a copy of the current value, or `None` once closed.
    #[must_use]
    pub fn load(&self) -> Option<T> {
        self.read_with(T::clone)
    }
}

impl<T: Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Drop for SnapshotCell<T> {
    fn drop(&mut self) {
        // SAFETY: `&mut self` means no other thread can access the cell.
        unsafe {
            let guard = epoch::unprotected();
            let current = self.current.load(Ordering::Relaxed, guard);
            if !current.is_null() {
                drop(current.into_owned());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn load_and_update() {
        let cell = SnapshotCell::new(String::from("a"));
        assert_eq!(cell.load().as_deref(), Some("a"));

        let next = cell.update(|s| Some(format!("{s}b")));
        assert_eq!(next.as_deref(), Some("ab"));
        assert_eq!(cell.read_with(String::len), Some(2));
    }

    #[test]
    fn update_can_decline() {
        let cell = SnapshotCell::new(5_u32);
        assert_eq!(cell.update(|_| None), None);
        assert_eq!(cell.load(), Some(5));
    }

    #[test]
    fn close_is_final_and_idempotent() {
        let cell = SnapshotCell::new(vec![1, 2, 3]);
        assert!(!cell.is_closed());
        cell.close();
        cell.close();
        assert!(cell.is_closed());
        assert_eq!(cell.load(), None);
        assert_eq!(cell.update(|v| Some(v.clone())), None);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let cell = Arc::new(SnapshotCell::new(0_u64));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        cell.update(|v| Some(v + 1)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cell.load(), Some(4000));
    }

    #[test]
    fn store_respects_close() {
        let cell = SnapshotCell::new(1_i32);
        assert!(cell.store(7));
        assert_eq!(cell.load(), Some(7));
        cell.close();
        assert!(!cell.store(9));
        assert_eq!(cell.load(), None);
    }

    #[test]
    fn default_cell() {
        let cell: SnapshotCell<u8> = SnapshotCell::default();
        assert_eq!(cell.load(), Some(0));
    }
}
