use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use span_bitset::{AtomicBitSet, RelaxedBitSet};

/// Counts allocations and frees made by the current thread while tracking.
struct TrackingAlloc;

thread_local! {
    static TRACKING: Cell<bool> = const { Cell::new(false) };
    static ALLOCS: Cell<usize> = const { Cell::new(0) };
    static ALLOC_BYTES: Cell<usize> = const { Cell::new(0) };
    static FREES: Cell<usize> = const { Cell::new(0) };
    static LAST_FREED: Cell<usize> = const { Cell::new(0) };
}

unsafe impl GlobalAlloc for TrackingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if TRACKING.get() {
            ALLOCS.set(ALLOCS.get() + 1);
            ALLOC_BYTES.set(ALLOC_BYTES.get() + layout.size());
        }
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if TRACKING.get() {
            FREES.set(FREES.get() + 1);
            LAST_FREED.set(ptr as usize);
        }
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static GLOBAL: TrackingAlloc = TrackingAlloc;

#[derive(Debug, PartialEq)]
struct Counts {
    allocs: usize,
    alloc_bytes: usize,
    frees: usize,
}

fn tracked<R>(f: impl FnOnce() -> R) -> (R, Counts) {
    ALLOCS.set(0);
    ALLOC_BYTES.set(0);
    FREES.set(0);
    TRACKING.set(true);
    let result = f();
    TRACKING.set(false);
    let counts = Counts {
        allocs: ALLOCS.get(),
        alloc_bytes: ALLOC_BYTES.get(),
        frees: FREES.get(),
    };
    (result, counts)
}

fn pass_through(bitset: AtomicBitSet) -> AtomicBitSet {
    bitset
}

#[test]
fn new_allocates_words_once() {
    let (bitset, counts) = tracked(|| AtomicBitSet::new(200));
    assert_eq!(
        counts,
        Counts {
            allocs: 1,
            alloc_bytes: bitset.byte_count(),
            frees: 0,
        }
    );

    let (bitset, counts) = tracked(|| RelaxedBitSet::try_new(65).unwrap());
    assert_eq!(counts.allocs, 1);
    assert_eq!(counts.alloc_bytes, bitset.byte_count());
}

#[test]
fn from_bit_str_allocates_words_once() {
    let pattern = "10".repeat(70);
    let (bitset, counts) = tracked(|| AtomicBitSet::from_bit_str(&pattern));
    assert_eq!(
        counts,
        Counts {
            allocs: 1,
            alloc_bytes: bitset.byte_count(),
            frees: 0,
        }
    );
    assert_eq!(bitset.in_use_count(), 70);

    let (_, counts) = tracked(|| "0110".parse::<AtomicBitSet>().unwrap());
    assert_eq!(counts.allocs, 1);
}

#[test]
fn empty_bitset_allocates_nothing() {
    let (bitset, counts) = tracked(|| AtomicBitSet::new(0));
    assert_eq!(
        counts,
        Counts {
            allocs: 0,
            alloc_bytes: 0,
            frees: 0,
        }
    );

    let (_, counts) = tracked(|| drop(bitset));
    assert_eq!(counts.frees, 0);
}

#[test]
fn move_transfers_words_and_frees_once() {
    let bitset = AtomicBitSet::new(200);
    bitset.try_to_set(150);
    let words = bitset.as_ptr() as usize;

    let (moved, counts) = tracked(|| pass_through(bitset));
    assert_eq!(
        counts,
        Counts {
            allocs: 0,
            alloc_bytes: 0,
            frees: 0,
        }
    );
    assert_eq!(moved.as_ptr() as usize, words);
    assert!(moved.is_set(150));

    let (_, counts) = tracked(|| drop(moved));
    assert_eq!(counts.frees, 1);
    assert_eq!(counts.allocs, 0);
    assert_eq!(LAST_FREED.get(), words);
}
