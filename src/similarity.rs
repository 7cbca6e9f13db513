//! Text likeness scoring through character co-occurrence matrices.
//!
//! Every byte of a string falls into one of 20 buckets. The fingerprint of a
//! string is the 20 x 20 bit matrix of bucket pairs seen on adjacent bytes,
//! with the first byte paired to a virtual leading bucket 0. Repetitions are
//! not counted: `"xxx"` sets the (x, x) cell once.
//!
//! The score of a candidate against a reference is
//!
//! ```text
//! ((|A ∩ B| + 1) << 10) / (|A ∪ B| + 2 * |len(A) - len(B)| + 1)
//! ```
//!
//! where `|M|` is the number of set cells. Identical strings score 1024 and
//! two empty strings do too.

use crate::catalog::Catalog;
use crate::message::MessageType;

/// Minimum score at which two texts are taken to be the same message.
pub const TEXT_SIMILARITY_THRESHOLD: u32 = 190;

/// Score of two identical texts
pub const MAX_SIMILARITY_SCORE: u32 = 1024;

const BUCKETS: usize = 20;
const WORDS: usize = (BUCKETS * BUCKETS).div_ceil(64);

/// Bucket of each 7-bit value. Bytes above 0x7f reuse the entry of their
/// lower seven bits; upper and lower case letters share buckets.
#[rustfmt::skip]
const BUCKET_OF: [u8; 128] = [
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,
//      !   "   #   $   %   &   '   (   )   *   +   ,   -   .   /
    0,  2,  6,  7,  10, 12, 15, 19, 2,  6,  7,  10, 12, 15, 19, 0,
//  0   1   2   3   4   5   6   7   8   9   :   ;   <   =   >   ?
    1,  3,  4,  5,  8,  9,  11, 13, 14, 16, 2,  6,  7,  10, 12, 15,
//  @   A   B   C   D   E   F   G   H   I   J   K   L   M   N   O
    0,  0,  3,  4,  5,  0,  8,  9,  11, 0,  13, 14, 16, 17, 18, 0,
//  P   Q   R   S   T   U   V   W   X   Y   Z   [   \   ]   ^   _
    1,  2,  6,  7,  10, 0,  12, 15, 19, 0,  2,  6,  7,  10, 12, 15,
//  `   a   b   c   d   e   f   g   h   i   j   k   l   m   n   o
    0,  0,  3,  4,  5,  0,  8,  9,  11, 0,  13, 14, 16, 17, 18, 0,
//  p   q   r   s   t   u   v   w   x   y   z   {   |   }   ~
    1,  2,  6,  7,  10, 0,  12, 15, 19, 0,  2,  6,  7,  10, 12, 0,
];

/// Co-occurrence fingerprint of one string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CoMatrix {
    bits: [u64; WORDS],
}

impl CoMatrix {
    fn new(text: &str) -> Self {
        let mut matrix = CoMatrix { bits: [0; WORDS] };
        let mut prev = 0u8;
        for byte in text.bytes() {
            matrix.set(prev, byte);
            prev = byte;
        }
        matrix
    }

    fn set(&mut self, c: u8, d: u8) {
        let k = bucket(c) + BUCKETS * bucket(d);
        self.bits[k / 64] |= 1 << (k % 64);
    }

    fn worth(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    fn union(&self, other: &CoMatrix) -> CoMatrix {
        let mut bits = self.bits;
        for (b, o) in bits.iter_mut().zip(other.bits.iter()) {
            *b |= o;
        }
        CoMatrix { bits }
    }

    fn intersection(&self, other: &CoMatrix) -> CoMatrix {
        let mut bits = self.bits;
        for (b, o) in bits.iter_mut().zip(other.bits.iter()) {
            *b &= o;
        }
        CoMatrix { bits }
    }
}

fn bucket(byte: u8) -> usize {
    BUCKET_OF[(byte & 0x7f) as usize] as usize
}

/// Scores many candidates against one reference text.
#[derive(Debug, Clone)]
pub struct StringSimilarityMatcher {
    matrix: CoMatrix,
    length: usize,
}

impl StringSimilarityMatcher {
    pub fn new(reference: &str) -> Self {
        Self {
            matrix: CoMatrix::new(reference),
            length: reference.chars().count(),
        }
    }

    pub fn score(&self, candidate: &str) -> u32 {
        let target = CoMatrix::new(candidate);
        let delta = self.length.abs_diff(candidate.chars().count()) as u32;
        let shared = self.matrix.intersection(&target).worth();
        let total = self.matrix.union(&target).worth();
        ((shared + 1) << 10) / (total + (delta << 1) + 1)
    }
}

/// Likeness of `candidate` to `reference`; higher is more similar.
pub fn similarity_score(reference: &str, candidate: &str) -> u32 {
    StringSimilarityMatcher::new(reference).score(candidate)
}

/// A translation suggestion for a text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub source: String,
    pub comment: String,
    pub translation: String,
}

/// Up to `max_candidates` suggestions from finished, translated messages whose
/// source text scores at least [`TEXT_SIMILARITY_THRESHOLD`] against `text`.
///
/// Best scores come first; among equal scores the earlier message wins and
/// identical suggestions are listed once.
pub fn similar_text_candidates(
    catalog: &Catalog,
    text: &str,
    max_candidates: usize,
) -> Vec<Candidate> {
    if max_candidates == 0 {
        return Vec::new();
    }
    let matcher = StringSimilarityMatcher::new(text);
    let mut ranked: Vec<(u32, Candidate)> = Vec::new();

    for msg in catalog.messages() {
        if msg.message_type() == MessageType::Unfinished || msg.translation().is_empty() {
            continue;
        }
        let score = matcher.score(msg.source_text());
        if score < TEXT_SIMILARITY_THRESHOLD {
            continue;
        }
        if ranked.len() == max_candidates {
            match ranked.last() {
                Some((worst, _)) if score > *worst => {
                    ranked.pop();
                }
                _ => continue,
            }
        }

        let candidate = Candidate {
            source: msg.source_text().to_string(),
            comment: msg.comment().to_string(),
            translation: msg.translation().to_string(),
        };
        if ranked.iter().any(|(s, c)| *s == score && *c == candidate) {
            continue;
        }
        let pos = ranked
            .iter()
            .position(|(s, _)| score > *s)
            .unwrap_or(ranked.len());
        ranked.insert(pos, (score, candidate));
    }

    ranked.into_iter().map(|(_, c)| c).collect()
}
