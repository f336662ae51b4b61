use std::sync::Arc;
use std::thread;

use span_bitset::AtomicBitSet;

fn main() {
    let slots = Arc::new(AtomicBitSet::new(8));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let slots = Arc::clone(&slots);
            thread::spawn(move || slots.set_first_empty(0))
        })
        .collect();

    let mut claimed: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    claimed.sort_unstable();
    assert_eq!(claimed, [0, 1, 2, 3]);
}
