//! Dense bit matrix with whole-row XOR.
//!
//! Rows are packed into `u64` words. The sampler stores one row per qubit
//! with one column per shot, so a Clifford gate is a handful of row XORs
//! across every shot at once. The error-model extraction uses the same type
//! with one column per detector or observable.

use rand::Rng;

/// A `rows × cols` matrix of bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    rows: usize,
    cols: usize,
    words_per_row: usize,
    data: Vec<u64>,
}

impl BitMatrix {
    /// Create an all-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        let words_per_row = cols.div_ceil(64);
        Self {
            rows,
            cols,
            words_per_row,
            data: vec![0; rows * words_per_row],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    fn range(&self, row: usize) -> std::ops::Range<usize> {
        let start = row * self.words_per_row;
        start..start + self.words_per_row
    }

    /// Packed words of one row.
    pub fn row(&self, row: usize) -> &[u64] {
        &self.data[self.range(row)]
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        let word = self.data[row * self.words_per_row + col / 64];
        (word >> (col % 64)) & 1 == 1
    }

    pub fn flip(&mut self, row: usize, col: usize) {
        self.data[row * self.words_per_row + col / 64] ^= 1 << (col % 64);
    }

    pub fn clear_row(&mut self, row: usize) {
        let range = self.range(row);
        self.data[range].fill(0);
    }

    /// Overwrite a row with uniformly random bits. Bits past `cols` stay zero.
    pub fn randomize_row<R: Rng>(&mut self, row: usize, rng: &mut R) {
        let range = self.range(row);
        let words = &mut self.data[range];
        rng.fill(words);
        let tail = self.cols % 64;
        if let (Some(last), true) = (words.last_mut(), tail != 0) {
            *last &= (1u64 << tail) - 1;
        }
    }

    /// `self[dst] ^= self[src]`.
    pub fn xor_row(&mut self, src: usize, dst: usize) {
        if src == dst {
            self.clear_row(dst);
            return;
        }
        let w = self.words_per_row;
        for i in 0..w {
            let v = self.data[src * w + i];
            self.data[dst * w + i] ^= v;
        }
    }

    /// `self[dst] ^= other[src]`, for matrices with the same column count.
    pub fn xor_row_from(&mut self, other: &BitMatrix, src: usize, dst: usize) {
        debug_assert_eq!(self.words_per_row, other.words_per_row);
        let range = self.range(dst);
        for (d, s) in self.data[range].iter_mut().zip(other.row(src)) {
            *d ^= s;
        }
    }

    /// `self[dst] ^= words`.
    pub fn xor_words(&mut self, dst: usize, words: &[u64]) {
        let range = self.range(dst);
        for (d, s) in self.data[range].iter_mut().zip(words) {
            *d ^= s;
        }
    }

    /// `self[dst] = other[src]`.
    pub fn copy_row_from(&mut self, other: &BitMatrix, src: usize, dst: usize) {
        let range = self.range(dst);
        self.data[range].copy_from_slice(other.row(src));
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let w = self.words_per_row;
        for i in 0..w {
            self.data.swap(a * w + i, b * w + i);
        }
    }

    /// Swap row `row` of `self` with row `row` of `other`.
    pub fn swap_row_with(&mut self, other: &mut BitMatrix, row: usize) {
        let range = self.range(row);
        self.data[range.clone()].swap_with_slice(&mut other.data[range]);
    }

    /// Number of set bits in a row.
    pub fn count_ones(&self, row: usize) -> u64 {
        self.row(row).iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Column indices of the set bits in a row, ascending.
    pub fn ones(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        ones_in(self.row(row))
    }
}

/// Indices of the set bits of packed words, ascending.
pub fn ones_in(words: &[u64]) -> impl Iterator<Item = usize> + '_ {
    words.iter().enumerate().flat_map(|(i, &word)| {
        let mut bits = word;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let tz = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            Some(i * 64 + tz)
        })
    })
}
