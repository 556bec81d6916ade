//! Enumeration of latent hypotheses for one sequence.
//!
//! A hypothesis fixes the start `s`, whether the site carries a gap
//! `g`, and the gap position `h`. Under a hypothesis each sequence
//! position `i` is explained by one PSSM column `r` (0 = background).
//! The site window spans `K+1` positions: `K` motif columns plus one
//! extra slot. The extra slot sits right after the gap position when
//! the site is gapped, otherwise at the end of the window, and is
//! always explained by the background.

use crate::dataset::Dataset;
use crate::posterior::VariationalPosterior;
use ndarray::prelude::*;

/// Resolve the PSSM column of offset `j = i - s`
///
/// * `k` - motif width
/// * `j` - offset from the start of the site (may be negative)
/// * `gap_position` - `h` for a gapped site, `K-1` otherwise
pub fn resolve_column(k: usize, j: isize, gap_position: usize) -> usize {
    let r = if j < 0 || j > k as isize {
        0
    } else {
        let j = j as usize;
        if j == gap_position + 1 {
            0
        } else if j > gap_position {
            j
        } else {
            j + 1
        }
    };
    assert!(r <= k, "resolved column {} outside [0, {}]", r, k);
    r
}

/// Reading direction of a site window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Forward,
    Reverse,
}

/// Bijection between the `K+1` window offsets and the PSSM columns
/// `0..=K` for one gap configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    k: usize,
    gap_position: usize,
    orientation: Orientation,
}

impl ColumnMap {
    /// * `k` - motif width
    /// * `gap` - `Some(h)` with `h < K-1` for a gapped site
    pub fn new(k: usize, gap: Option<usize>, orientation: Orientation) -> Self {
        assert!(k >= 1, "motif width must be positive");
        let gap_position = match gap {
            Some(h) => {
                assert!(h + 1 < k, "gap position {} out of range for K = {}", h, k);
                h
            }
            None => k - 1,
        };
        Self {
            k,
            gap_position,
            orientation,
        }
    }

    fn forward_offset(&self, offset: usize) -> usize {
        match self.orientation {
            Orientation::Forward => offset,
            Orientation::Reverse => self.k - offset,
        }
    }

    /// Column explaining window `offset` (`0..=K`)
    pub fn column(&self, offset: usize) -> usize {
        assert!(offset <= self.k, "offset {} outside the window", offset);
        resolve_column(self.k, self.forward_offset(offset) as isize, self.gap_position)
    }

    /// Window offset explained by `column` (`0..=K`); column 0 is the
    /// extra background slot
    pub fn offset(&self, column: usize) -> usize {
        assert!(column <= self.k, "column {} outside [0, {}]", column, self.k);
        let forward = if column == 0 {
            self.gap_position + 1
        } else if column <= self.gap_position + 1 {
            column - 1
        } else {
            column
        };
        self.forward_offset(forward)
    }
}

/// One hypothesis-position pair with its variational weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combination {
    /// start of the site
    pub s: usize,
    pub q_s: f64,
    /// gap position slot
    pub h: usize,
    pub q_h: f64,
    /// 1 if the site is gapped
    pub g: usize,
    pub q_g: f64,
    /// sequence position
    pub i: usize,
    /// base at `i`
    pub x: usize,
    /// resolved PSSM column
    pub r: usize,
}

impl Combination {
    /// `q_s * q_h * q_g`
    pub fn weight(&self) -> f64 {
        self.q_s * self.q_h * self.q_g
    }
}

/// Enumerates the combinations of one sequence under the current
/// posterior. Cheap to copy; every call to [`iter`] starts over.
///
/// For an ungapped site the gap position does not matter, so a single
/// slot `h = K-1` with `q_h = 1` is produced. The same happens for a
/// gapped site when `K = 1` since there is nowhere to put the gap.
///
/// [`iter`]: CombinationGenerator::iter
#[derive(Debug, Clone, Copy)]
pub struct CombinationGenerator<'a> {
    k: usize,
    seq: &'a [u8],
    nu: &'a Array1<f64>,
    eta: &'a Array1<f64>,
    mu: f64,
}

impl<'a> CombinationGenerator<'a> {
    pub fn new(data: &'a Dataset, post: &'a VariationalPosterior, k: usize, n: usize) -> Self {
        Self {
            k,
            seq: data.sequence(n),
            nu: post.nu(n),
            eta: post.eta(),
            mu: post.mu()[n],
        }
    }

    pub fn num_starts(&self) -> usize {
        self.seq.len() - self.k
    }

    pub fn seq_len(&self) -> usize {
        self.seq.len()
    }

    fn gap_slots(self, g: usize) -> impl Iterator<Item = (usize, f64)> + 'a {
        let k = self.k;
        let eta = self.eta;
        let gapped = g == 1 && k > 1;
        let num_slots = if gapped { k - 1 } else { 1 };
        (0..num_slots).map(move |t| if gapped { (t, eta[t]) } else { (k - 1, 1.0) })
    }

    /// Lazily enumerate `(s, g, h, i)` in this nesting order
    ///
    /// * `only_sites` - restrict `i` to the window `s..=s+K`
    pub fn iter(&self, only_sites: bool) -> impl Iterator<Item = Combination> + 'a {
        let gen = *self;
        (0..gen.num_starts()).flat_map(move |s| {
            let q_s = gen.nu[s];
            (0..2_usize).flat_map(move |g| {
                let q_g = if g == 1 { gen.mu } else { 1.0 - gen.mu };
                gen.gap_slots(g).flat_map(move |(h, q_h)| {
                    let gap_position = if g == 1 { h } else { gen.k - 1 };
                    let positions = if only_sites {
                        s..(s + gen.k + 1)
                    } else {
                        0..gen.seq.len()
                    };
                    positions.map(move |i| Combination {
                        s,
                        q_s,
                        h,
                        q_h,
                        g,
                        q_g,
                        i,
                        x: gen.seq[i] as usize,
                        r: resolve_column(gen.k, i as isize - s as isize, gap_position),
                    })
                })
            })
        })
    }
}
