use core::cell::Cell;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Number of bits in one backing word.
pub const WORD_BITS: usize = usize::BITS as usize;

/// Returns the mask isolating `position` within a word.
#[inline]
pub(crate) const fn word_mask(position: u32) -> usize {
    1 << position
}

/// Returns a mask with the low `width` bits set.
///
/// `width` must be smaller than [`WORD_BITS`].
#[inline]
pub(crate) const fn low_mask(width: u32) -> usize {
    word_mask(width) - 1
}

/// Sets `position` in a word the caller holds exclusively.
///
/// Returns `true` if the bit was clear before.
#[inline]
pub(crate) fn relaxed_set(word: &mut usize, position: u32) -> bool {
    let old = *word;
    *word = old | word_mask(position);
    old & word_mask(position) == 0
}

/// How the bits of a [`BitSet`] are mutated.
///
/// A strategy picks the backing word type and the set/unset primitives. It is
/// chosen through the type parameter of [`BitSet`], so every call is resolved
/// at compile time.
///
/// Both `set_at` and `unset_at` return `true` iff the bit was clear before the
/// call. For `unset_at` this means "nothing was cleared", which mirrors the
/// set side instead of inverting it.
///
/// [`BitSet`]: crate::BitSet
pub trait BitStrategy {
    /// The storage type of one backing word.
    type Word;

    /// Creates a word holding `value`.
    fn new_word(value: usize) -> Self::Word;

    /// Reads a word without any synchronization guarantee beyond the word
    /// itself.
    fn load(word: &Self::Word) -> usize;

    /// Grants plain access to a word the caller owns exclusively.
    fn get_mut(word: &mut Self::Word) -> &mut usize;

    /// Sets `position` of `words[item]`.
    ///
    /// Returns `true` iff the bit was clear before.
    fn set_at(words: &[Self::Word], item: usize, position: u32) -> bool;

    /// Clears `position` of `words[item]`.
    ///
    /// Returns `true` iff the bit was clear before.
    fn unset_at(words: &[Self::Word], item: usize, position: u32) -> bool;
}

/// Compare-and-swap bit mutation, safe for concurrent callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Synchronized;

/// Plain read-modify-write bit mutation.
///
/// Words are `Cell`s, so a bitset using this strategy is `Send` but not
/// `Sync`; concurrent access is ruled out at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Unsynchronized;

impl Synchronized {
    #[inline]
    fn update(word: &AtomicUsize, apply: impl Fn(usize) -> usize) -> usize {
        let mut old = word.load(Ordering::Relaxed);
        loop {
            match word.compare_exchange_weak(
                old,
                apply(old),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(prev) => return prev,
                Err(current) => old = current,
            }
        }
    }
}

impl BitStrategy for Synchronized {
    type Word = AtomicUsize;

    #[inline]
    fn new_word(value: usize) -> AtomicUsize {
        AtomicUsize::new(value)
    }

    #[inline]
    fn load(word: &AtomicUsize) -> usize {
        word.load(Ordering::Acquire)
    }

    #[inline]
    fn get_mut(word: &mut AtomicUsize) -> &mut usize {
        word.get_mut()
    }

    #[inline]
    fn set_at(words: &[AtomicUsize], item: usize, position: u32) -> bool {
        let mask = word_mask(position);
        let old = Self::update(&words[item], |bits| bits | mask);
        old & mask == 0
    }

    #[inline]
    fn unset_at(words: &[AtomicUsize], item: usize, position: u32) -> bool {
        let mask = word_mask(position);
        let old = Self::update(&words[item], |bits| bits & !mask);
        old & mask == 0
    }
}

impl BitStrategy for Unsynchronized {
    type Word = Cell<usize>;

    #[inline]
    fn new_word(value: usize) -> Cell<usize> {
        Cell::new(value)
    }

    #[inline]
    fn load(word: &Cell<usize>) -> usize {
        word.get()
    }

    #[inline]
    fn get_mut(word: &mut Cell<usize>) -> &mut usize {
        word.get_mut()
    }

    #[inline]
    fn set_at(words: &[Cell<usize>], item: usize, position: u32) -> bool {
        let mask = word_mask(position);
        let old = words[item].get();
        words[item].set(old | mask);
        old & mask == 0
    }

    #[inline]
    fn unset_at(words: &[Cell<usize>], item: usize, position: u32) -> bool {
        let mask = word_mask(position);
        let old = words[item].get();
        words[item].set(old & !mask);
        old & mask == 0
    }
}
