//! A fixed-size occupancy bitset for allocator spans.
//! `no_std` with `alloc`, no `unsafe`.
//!
//! One bit tracks one slot of a span of equally-sized objects: set means
//! allocated, clear means free. [`BitSet`] is the main struct in this
//! library. Its [features](#features) are listed below.
//!
//! # Examples
//! ```
//! use span_bitset::AtomicBitSet;
//!
//! let slots = AtomicBitSet::new(10);
//! assert_eq!(slots.set_first_empty(0), 0);
//! assert_eq!(slots.set_first_empty(0), 1);
//! assert!(slots.try_to_set(5));
//! assert_eq!(slots.in_use_count(), 3);
//! assert_eq!(slots.to_string(), "1100010000");
//!
//! let live: Vec<usize> = slots.iter().collect();
//! assert_eq!(live, [0, 1, 5]);
//! ```
//!
//! # Use Cases
//!
//! - Slab and span allocators tracking free slots
//! - Several threads claiming slots of one span without a lock
//! - Walking the live objects of a span, e.g. to relocate them
//! - Not a general bit vector: no resizing and no set algebra
//!
//! # Features
//!
//! - `#![no_std]` compatible, one heap allocation per bitset
//! - Bit mutation strategy chosen at compile time:
//!   - [`AtomicBitSet`] (compare-and-swap, shareable between threads)
//!   - [`RelaxedBitSet`] (plain writes, `Send` but not `Sync`)
//! - Claiming: `try_to_set`, `set_first_empty`
//! - Releasing: `unset`, `clear`
//! - Queries: `is_set`, `in_use_count`, `is_full`, `lowest_set_bit_at`
//! - Iteration over set bits: `iter()`
//! - `'0'`/`'1'` string form: `from_bit_str`, `FromStr`, `Display`,
//!   `to_bit_string`

#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![no_std]

extern crate alloc;

mod bitset;
mod error;
mod strategy;

pub use bitset::{AtomicBitSet, BitSet, RelaxedBitSet, SetBits, word_count};
pub use error::BitSetError;
pub use strategy::{BitStrategy, Synchronized, Unsynchronized, WORD_BITS};
