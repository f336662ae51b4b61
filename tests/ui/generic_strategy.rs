use span_bitset::{AtomicBitSet, BitSet, BitStrategy, RelaxedBitSet};

fn claim_all<S: BitStrategy>(slots: &BitSet<S>) -> Vec<usize> {
    let mut claimed = Vec::new();
    while !slots.is_full() {
        claimed.push(slots.set_first_empty(0));
    }
    claimed
}

fn main() {
    let atomic = AtomicBitSet::from_bit_str("0100");
    let relaxed = RelaxedBitSet::from_bit_str("0100");
    assert_eq!(claim_all(&atomic), [0, 2, 3]);
    assert_eq!(claim_all(&relaxed), [0, 2, 3]);
}
