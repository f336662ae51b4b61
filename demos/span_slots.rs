use std::sync::Arc;
use std::thread;

use span_bitset::{AtomicBitSet, RelaxedBitSet};

const OBJECT_SIZE: usize = 48;
const SPAN_BYTES: usize = 4096;

fn compact(from: &AtomicBitSet, into: &RelaxedBitSet) -> Vec<(usize, usize)> {
    let mut moves = Vec::new();
    for live in from {
        if into.is_full() {
            break;
        }
        moves.push((live, into.set_first_empty(0)));
    }
    moves
}

fn main() {
    let slot_count = SPAN_BYTES / OBJECT_SIZE;
    let span = Arc::new(AtomicBitSet::new(slot_count));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let span = Arc::clone(&span);
            thread::spawn(move || (0..10).map(|_| span.set_first_empty(0)).collect::<Vec<_>>())
        })
        .collect();
    for handle in handles {
        let slots = handle.join().unwrap();
        println!("claimed {slots:?}");
    }

    for slot in (0..40).step_by(3) {
        span.unset(slot);
    }
    println!("{} of {} slots live", span.in_use_count(), span.bit_count());
    println!("{}", span.to_bit_string(40));

    let target = RelaxedBitSet::new(slot_count);
    for (from, to) in compact(&span, &target) {
        println!("move object at byte {} to byte {}", from * OBJECT_SIZE, to * OBJECT_SIZE);
    }
    println!("{target:?}");
}
