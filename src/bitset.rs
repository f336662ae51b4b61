use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Debug, Display, Formatter, Write};
use core::iter::{FusedIterator, Iterator};
use core::str::FromStr;

use crate::error::BitSetError;
use crate::strategy::{
    BitStrategy, Synchronized, Unsynchronized, WORD_BITS, low_mask, relaxed_set, word_mask,
};

/// Computes the number of backing words needed to store `bit_count` bits.
///
/// # Examples
/// ```
/// use span_bitset::{WORD_BITS, word_count};
///
/// assert_eq!(word_count(0), 0);
/// assert_eq!(word_count(1), 1);
/// assert_eq!(word_count(WORD_BITS), 1);
/// assert_eq!(word_count(WORD_BITS + 1), 2);
/// ```
pub const fn word_count(bit_count: usize) -> usize {
    bit_count.div_ceil(WORD_BITS)
}

/// A fixed-size occupancy set with one bit per slot.
///
/// A set bit marks an allocated slot, a clear bit a free one. The number of
/// bits is fixed at construction; the bits live in an owned array of
/// machine words.
///
/// `S` selects how bits are mutated. With the default [`Synchronized`]
/// strategy every mutator takes `&self` and may race with other threads
/// claiming slots of the same set. [`Unsynchronized`] skips the atomics and
/// cannot be shared between threads.
///
/// Readers ([`is_set`], [`in_use_count`], iteration, string rendering) never
/// synchronize with concurrent mutators; callers that need a consistent view
/// have to pause them first.
///
/// [`is_set`]: BitSet::is_set
/// [`in_use_count`]: BitSet::in_use_count
pub struct BitSet<S: BitStrategy = Synchronized> {
    bit_count: usize,
    words: Box<[S::Word]>,
}

/// A bitset whose mutators are safe to call from several threads.
pub type AtomicBitSet = BitSet<Synchronized>;

/// A bitset for single-threaded use, without atomic operations.
pub type RelaxedBitSet = BitSet<Unsynchronized>;

impl<S: BitStrategy> BitSet<S> {
    /// Creates a bitset of `bit_count` bits, all clear.
    ///
    /// # Panics
    /// Panics if the backing words cannot be allocated. Use [`try_new`] to
    /// handle that case.
    ///
    /// # Examples
    /// ```
    /// use span_bitset::AtomicBitSet;
    ///
    /// let bitset = AtomicBitSet::new(100);
    /// assert_eq!(bitset.bit_count(), 100);
    /// assert_eq!(bitset.in_use_count(), 0);
    /// ```
    ///
    /// [`try_new`]: BitSet::try_new
    pub fn new(bit_count: usize) -> Self {
        match Self::try_new(bit_count) {
            Ok(bitset) => bitset,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a bitset of `bit_count` bits, all clear, reporting allocation
    /// failure instead of panicking.
    ///
    /// # Examples
    /// ```
    /// use span_bitset::{AtomicBitSet, BitSetError};
    ///
    /// assert!(AtomicBitSet::try_new(64).is_ok());
    /// assert!(matches!(
    ///     AtomicBitSet::try_new(usize::MAX),
    ///     Err(BitSetError::Alloc(_))
    /// ));
    /// ```
    pub fn try_new(bit_count: usize) -> Result<Self, BitSetError> {
        let len = word_count(bit_count);
        let mut words = Vec::new();
        if let Err(err) = words.try_reserve_exact(len) {
            log::debug!("failed to allocate {len} words for a {bit_count} bit set: {err}");
            return Err(err.into());
        }
        words.extend((0..len).map(|_| S::new_word(0)));
        Ok(Self {
            bit_count,
            words: words.into_boxed_slice(),
        })
    }

    /// Creates a bitset from a string of `'0'` and `'1'` characters, one bit
    /// per character, index 0 first.
    ///
    /// # Panics
    /// Panics if the string contains any other character. The [`FromStr`]
    /// implementation returns an error instead.
    ///
    /// # Examples
    /// ```
    /// use span_bitset::AtomicBitSet;
    ///
    /// let bitset = AtomicBitSet::from_bit_str("1011");
    /// assert_eq!(bitset.bit_count(), 4);
    /// assert!(bitset.is_set(0));
    /// assert!(!bitset.is_set(1));
    /// ```
    pub fn from_bit_str(s: &str) -> Self {
        match s.parse() {
            Ok(bitset) => bitset,
            Err(err) => panic!("{err} ({s:?})"),
        }
    }

    /// Number of usable bits.
    #[inline]
    pub fn bit_count(&self) -> usize {
        self.bit_count
    }

    /// Number of backing words.
    #[inline]
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Number of bytes used by the backing words, a multiple of the word size.
    ///
    /// # Examples
    /// ```
    /// use span_bitset::AtomicBitSet;
    ///
    /// let word_bytes = size_of::<usize>();
    /// assert_eq!(AtomicBitSet::new(1).byte_count(), word_bytes);
    /// assert_eq!(AtomicBitSet::new(usize::BITS as usize + 1).byte_count(), 2 * word_bytes);
    /// ```
    #[inline]
    pub fn byte_count(&self) -> usize {
        WORD_BITS / 8 * word_count(self.bit_count)
    }

    /// Pointer to the first backing word.
    ///
    /// Identifies the backing array; two non-empty bitsets never share one.
    #[inline]
    pub fn as_ptr(&self) -> *const S::Word {
        self.words.as_ptr()
    }

    /// Clears every bit.
    ///
    /// # Examples
    /// ```
    /// use span_bitset::AtomicBitSet;
    ///
    /// let mut bitset = AtomicBitSet::from_bit_str("0110");
    /// bitset.clear();
    /// assert_eq!(bitset.to_string(), "0000");
    /// ```
    pub fn clear(&mut self) {
        for word in self.words.iter_mut() {
            *S::get_mut(word) = 0;
        }
    }

    /// Sets the bit at `idx`.
    ///
    /// Returns `true` iff the bit went from clear to set. With the
    /// [`Synchronized`] strategy exactly one of several racing callers sees
    /// `true`.
    ///
    /// # Panics
    /// Panics if `idx >= bit_count()`.
    ///
    /// # Examples
    /// ```
    /// use span_bitset::AtomicBitSet;
    ///
    /// let bitset = AtomicBitSet::new(8);
    /// assert!(bitset.try_to_set(3));
    /// assert!(!bitset.try_to_set(3));
    /// ```
    #[inline]
    pub fn try_to_set(&self, idx: usize) -> bool {
        let (item, position) = self.item_position(idx);
        S::set_at(&self.words, item, position)
    }

    /// Clears the bit at `idx`.
    ///
    /// Returns `true` iff the bit was *already clear*, i.e. nothing was
    /// released. This mirrors [`try_to_set`] rather than inverting it, and
    /// slot-release code relying on the return value must read it that way.
    ///
    /// # Panics
    /// Panics if `idx >= bit_count()`.
    ///
    /// # Examples
    /// ```
    /// use span_bitset::AtomicBitSet;
    ///
    /// let bitset = AtomicBitSet::from_bit_str("10");
    /// assert!(!bitset.unset(0)); // was set
    /// assert!(bitset.unset(1)); // was already clear
    /// assert!(!bitset.is_set(0));
    /// ```
    ///
    /// [`try_to_set`]: BitSet::try_to_set
    #[inline]
    pub fn unset(&self, idx: usize) -> bool {
        let (item, position) = self.item_position(idx);
        S::unset_at(&self.words, item, position)
    }

    /// Returns `true` if the bit at `idx` is set.
    ///
    /// # Panics
    /// Panics if `idx >= bit_count()`.
    #[inline]
    pub fn is_set(&self, idx: usize) -> bool {
        let (item, position) = self.item_position(idx);
        S::load(&self.words[item]) & word_mask(position) != 0
    }

    /// Returns the number of set bits.
    ///
    /// # Examples
    /// ```
    /// use span_bitset::AtomicBitSet;
    ///
    /// assert_eq!(AtomicBitSet::from_bit_str("1011").in_use_count(), 3);
    /// ```
    pub fn in_use_count(&self) -> usize {
        self.words
            .iter()
            .map(|word| S::load(word).count_ones() as usize)
            .sum()
    }

    /// Returns `true` if every bit is set.
    ///
    /// Callers check this before [`set_first_empty`], which panics on a full
    /// set.
    ///
    /// [`set_first_empty`]: BitSet::set_first_empty
    pub fn is_full(&self) -> bool {
        self.in_use_count() == self.bit_count
    }

    /// Finds the lowest clear bit at or after `starting_at`, sets it and
    /// returns its index.
    ///
    /// Fully occupied words are skipped without inspecting their bits. If
    /// another thread claims the candidate first, the search resumes right
    /// after it in the same word instead of starting over.
    ///
    /// # Panics
    /// Panics if `starting_at >= bit_count()`, or if no clear bit exists at
    /// or after `starting_at`. Running out of slots breaks the caller's
    /// contract, so this is not reported as an error.
    ///
    /// # Examples
    /// ```
    /// use span_bitset::AtomicBitSet;
    ///
    /// let bitset = AtomicBitSet::from_bit_str("1101");
    /// assert_eq!(bitset.set_first_empty(0), 2);
    /// assert_eq!(bitset.to_string(), "1111");
    /// ```
    pub fn set_first_empty(&self, starting_at: usize) -> usize {
        let (start_item, mut offset) = self.item_position(starting_at);

        for item in start_item..self.words.len() {
            loop {
                let bits = S::load(&self.words[item]);
                if bits == usize::MAX {
                    break;
                }

                // positions below the search origin count as taken
                let unset_bits = !bits & !low_mask(offset);
                if unset_bits == 0 {
                    break;
                }

                let position = unset_bits.trailing_zeros();
                let idx = WORD_BITS * item + position as usize;
                if idx >= self.bit_count {
                    // only tail bits of the last word are left
                    break;
                }

                if S::set_at(&self.words, item, position) {
                    return idx;
                }

                log::trace!("lost the race for bit {idx}, retrying");
                offset = position + 1;
                if offset as usize == WORD_BITS {
                    break;
                }
            }
            offset = 0;
        }

        log::error!(
            "bitset of {} bits completely full from {starting_at} on",
            self.bit_count
        );
        panic!("bitset completely full");
    }

    /// Returns the index of the lowest set bit at or after `starting_at`, or
    /// `bit_count()` if there is none.
    ///
    /// # Examples
    /// ```
    /// use span_bitset::AtomicBitSet;
    ///
    /// let bitset = AtomicBitSet::from_bit_str("0100100");
    /// assert_eq!(bitset.lowest_set_bit_at(0), 1);
    /// assert_eq!(bitset.lowest_set_bit_at(2), 4);
    /// assert_eq!(bitset.lowest_set_bit_at(5), 7);
    /// ```
    pub fn lowest_set_bit_at(&self, starting_at: usize) -> usize {
        if starting_at >= self.bit_count {
            return self.bit_count;
        }

        let mut offset = (starting_at % WORD_BITS) as u32;
        for item in starting_at / WORD_BITS..self.words.len() {
            let bits = S::load(&self.words[item]) & !low_mask(offset);
            offset = 0;
            if bits == 0 {
                continue;
            }

            let idx = WORD_BITS * item + bits.trailing_zeros() as usize;
            return idx.min(self.bit_count);
        }

        self.bit_count
    }

    /// Returns a cursor over the indices of all set bits, in ascending
    /// order.
    ///
    /// # Examples
    /// ```
    /// use span_bitset::AtomicBitSet;
    ///
    /// let bitset = AtomicBitSet::from_bit_str("1011");
    /// let ones: Vec<usize> = bitset.iter().collect();
    /// assert_eq!(ones, [0, 2, 3]);
    /// ```
    #[inline]
    pub fn iter(&self) -> SetBits<'_, S> {
        SetBits {
            bitset: self,
            idx: self.lowest_set_bit_at(0),
        }
    }

    /// Returns the exhausted cursor, positioned on the sentinel
    /// `bit_count()`.
    ///
    /// Every cursor from [`iter`] compares equal to this once it has run
    /// out.
    ///
    /// [`iter`]: BitSet::iter
    #[inline]
    pub fn end(&self) -> SetBits<'_, S> {
        SetBits {
            bitset: self,
            idx: self.bit_count,
        }
    }

    /// Renders bits `[0, count)` as `'1'` and `'0'` characters, index 0
    /// first.
    ///
    /// # Panics
    /// Panics if `count > bit_count()`.
    ///
    /// # Examples
    /// ```
    /// use span_bitset::AtomicBitSet;
    ///
    /// let bitset = AtomicBitSet::from_bit_str("1011");
    /// assert_eq!(bitset.to_bit_string(2), "10");
    /// ```
    pub fn to_bit_string(&self, count: usize) -> String {
        assert!(count <= self.bit_count, "Bit count {count} out of bounds");
        (0..count)
            .map(|idx| if self.is_set(idx) { '1' } else { '0' })
            .collect()
    }

    #[inline]
    fn item_position(&self, idx: usize) -> (usize, u32) {
        assert!(idx < self.bit_count, "Bit index {idx} out of bounds");
        (idx / WORD_BITS, (idx % WORD_BITS) as u32)
    }

    fn set_exclusive(&mut self, idx: usize) {
        let (item, position) = self.item_position(idx);
        relaxed_set(S::get_mut(&mut self.words[item]), position);
    }
}

/// Parses a string of `'0'` and `'1'` characters, one bit per character.
///
/// # Examples
/// ```
/// use span_bitset::{AtomicBitSet, BitSetError};
///
/// let bitset: AtomicBitSet = "0110".parse().unwrap();
/// assert_eq!(bitset.in_use_count(), 2);
///
/// let err = "10x1".parse::<AtomicBitSet>().unwrap_err();
/// assert_eq!(err, BitSetError::InvalidChar { index: 2, found: 'x' });
/// ```
impl<S: BitStrategy> FromStr for BitSet<S> {
    type Err = BitSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bitset = Self::try_new(s.len())?;
        for (idx, c) in s.chars().enumerate() {
            match c {
                '0' => {}
                '1' => bitset.set_exclusive(idx),
                found => return Err(BitSetError::InvalidChar { index: idx, found }),
            }
        }
        Ok(bitset)
    }
}

impl<'bitset, S: BitStrategy> IntoIterator for &'bitset BitSet<S> {
    type Item = usize;
    type IntoIter = SetBits<'bitset, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders all bits as `'1'` and `'0'` characters, index 0 first.
impl<S: BitStrategy> Display for BitSet<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        for idx in 0..self.bit_count {
            f.write_char(if self.is_set(idx) { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl<S: BitStrategy> Debug for BitSet<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        if self.bit_count == 0 {
            return write!(f, "LSB -> <- MSB");
        }
        write!(f, "LSB -> ")?;
        for idx in 0..self.bit_count {
            if idx % WORD_BITS == 0 {
                write!(f, "{idx}: ")?;
            }
            f.write_char(if self.is_set(idx) { '1' } else { '0' })?;
            if idx % WORD_BITS == WORD_BITS - 1 && idx < self.bit_count - 1 {
                write!(f, " ")?;
            }
        }
        write!(f, " <- MSB")
    }
}

/// Cursor over the indices of set bits in a bitset.
///
/// Yields the positions of all set bits in ascending order. The cursor
/// borrows its bitset, so the bitset outlives it, but it does not guard
/// against other threads mutating bits while it walks.
///
/// Two cursors are equal if they walk the same backing array and sit on the
/// same index. Zero-length bitsets own no array and share one dangling
/// pointer, so cursors over two different empty bitsets compare equal.
///
/// Returned by [`BitSet::iter()`] and [`BitSet::end()`].
pub struct SetBits<'bitset, S: BitStrategy = Synchronized> {
    bitset: &'bitset BitSet<S>,
    idx: usize,
}

impl<S: BitStrategy> SetBits<'_, S> {
    /// The index the cursor sits on; `bit_count()` once exhausted.
    #[inline]
    pub fn index(&self) -> usize {
        self.idx
    }

    /// Returns `true` once the cursor has reached the sentinel.
    #[inline]
    pub fn is_end(&self) -> bool {
        self.idx >= self.bitset.bit_count
    }

    fn advance(&mut self) {
        let bit_count = self.bitset.bit_count;
        self.idx = if self.idx + 1 >= bit_count {
            bit_count
        } else {
            self.bitset.lowest_set_bit_at(self.idx + 1)
        };
    }
}

impl<S: BitStrategy> Iterator for SetBits<'_, S> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_end() {
            return None;
        }
        let current = self.idx;
        self.advance();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_end() {
            (0, Some(0))
        } else {
            (1, Some(self.bitset.bit_count - self.idx))
        }
    }
}

impl<S: BitStrategy> FusedIterator for SetBits<'_, S> {}

impl<S: BitStrategy> PartialEq for SetBits<'_, S> {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self.bitset.as_ptr(), other.bitset.as_ptr()) && self.idx == other.idx
    }
}

impl<S: BitStrategy> Eq for SetBits<'_, S> {}

impl<S: BitStrategy> Clone for SetBits<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: BitStrategy> Copy for SetBits<'_, S> {}

impl<S: BitStrategy> Debug for SetBits<'_, S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SetBits")
            .field("index", &self.idx)
            .field("bit_count", &self.bitset.bit_count)
            .finish()
    }
}
