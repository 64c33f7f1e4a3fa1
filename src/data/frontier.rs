//! Dense frontier bitsets over `u32` words.
//!
//! Units and host exchange frontiers as raw word arrays, so the bit helpers
//! are free functions over slices; [`Frontier`] is the owned host-side
//! buffer used to accumulate a round's frontier.

use crate::partitioning::NODE_ALIGN;

/// Whether bit `i` of `words` is set.
#[inline]
pub fn test_bit(words: &[u32], i: u32) -> bool {
    (words[(i / NODE_ALIGN) as usize] >> (i % NODE_ALIGN)) & 1 == 1
}

/// Set bit `i` of `words`.
#[inline]
pub fn set_bit(words: &mut [u32], i: u32) {
    words[(i / NODE_ALIGN) as usize] |= 1u32 << (i % NODE_ALIGN);
}

/// `dst |= src`, word by word over the shorter of the two.
#[inline]
pub fn or_words(dst: &mut [u32], src: &[u32]) {
    for (a, b) in dst.iter_mut().zip(src) {
        *a |= *b;
    }
}

/// Indices of all set bits, ascending.
pub fn iter_ones(words: &[u32]) -> impl Iterator<Item = u32> + '_ {
    words.iter().enumerate().flat_map(|(w, &word)| {
        let base = w as u32 * NODE_ALIGN;
        let mut rest = word;
        std::iter::from_fn(move || {
            if rest == 0 {
                return None;
            }
            let bit = rest.trailing_zeros();
            rest &= rest - 1;
            Some(base + bit)
        })
    })
}

/// Owned frontier bitset of a fixed number of words.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frontier {
    words: Vec<u32>,
}

impl Frontier {
    /// All-zero frontier of `len_words` words.
    pub fn with_words(len_words: usize) -> Self {
        Self {
            words: vec![0; len_words],
        }
    }

    /// Frontier holding only `node`.
    pub fn singleton(len_words: usize, node: u32) -> Self {
        let mut f = Self::with_words(len_words);
        f.set(node);
        f
    }

    #[inline]
    pub fn len_words(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn set(&mut self, node: u32) {
        set_bit(&mut self.words, node);
    }

    #[inline]
    pub fn get(&self, node: u32) -> bool {
        test_bit(&self.words, node)
    }

    /// OR `src` into the words starting at `offset`.
    pub fn or_at(&mut self, offset: usize, src: &[u32]) {
        or_words(&mut self.words[offset..offset + src.len()], src);
    }

    /// Overwrite the words starting at `offset` with `src`.
    pub fn copy_at(&mut self, offset: usize, src: &[u32]) {
        self.words[offset..offset + src.len()].copy_from_slice(src);
    }

    /// `len` words starting at `offset`.
    #[inline]
    pub fn slice(&self, offset: usize, len: usize) -> &[u32] {
        &self.words[offset..offset + len]
    }

    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    pub fn ones(&self) -> impl Iterator<Item = u32> + '_ {
        iter_ones(&self.words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_cross_word_boundaries() {
        let mut f = Frontier::with_words(3);
        for n in [0, 31, 32, 95] {
            f.set(n);
        }
        assert!(f.get(31) && f.get(32) && !f.get(33));
        assert_eq!(f.words(), &[0x8000_0001, 0x1, 0x8000_0000]);
        assert_eq!(f.ones().collect::<Vec<_>>(), vec![0, 31, 32, 95]);
        assert_eq!(f.count_ones(), 4);
    }

    #[test]
    fn or_and_copy_respect_offsets() {
        let mut f = Frontier::with_words(4);
        f.or_at(1, &[0b01, 0b10]);
        f.or_at(1, &[0b10]);
        assert_eq!(f.words(), &[0, 0b11, 0b10, 0]);
        f.copy_at(2, &[0b100, 0b1]);
        assert_eq!(f.slice(2, 2), &[0b100, 0b1]);
        f.clear();
        assert!(f.is_empty());
    }
}
