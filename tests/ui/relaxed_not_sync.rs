use span_bitset::RelaxedBitSet;

fn assert_sync<T: Sync>() {}

fn main() {
    assert_sync::<RelaxedBitSet>();
}
