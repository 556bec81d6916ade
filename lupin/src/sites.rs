use crate::combinations::*;
use crate::dataset::Dataset;
use crate::dna::Dna;
use crate::hyper::Hyperparameters;
use crate::posterior::VariationalPosterior;
use matrix_util::traits::ProbabilityOps;

/// Deterministic MAP decoding of the latent variables
#[derive(Debug, Clone, PartialEq)]
pub struct MostLikely {
    /// argmax of `nu[n]`
    pub starts: Vec<usize>,
    /// `mu[n] > 0.5`
    pub has_gap: Vec<bool>,
    /// argmax of `eta`; `None` when `K = 1`
    pub gap_position: Option<usize>,
}

impl MostLikely {
    pub fn decode(post: &VariationalPosterior) -> Self {
        let nn = post.num_sequences();
        MostLikely {
            starts: (0..nn).map(|n| post.nu(n).argmax().unwrap_or(0)).collect(),
            has_gap: post.mu().iter().map(|&mu| mu > 0.5).collect(),
            gap_position: post.eta().argmax(),
        }
    }
}

/// The most likely site of one sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub sequence: usize,
    pub start: usize,
    pub has_gap: bool,
    /// Gap position of a gapped site; `None` for ungapped sites and
    /// whenever `K = 1`
    pub gap_position: Option<usize>,
    /// Posterior probability of a gap
    pub mu: f64,
    /// The `K+1` bases of the window
    pub bases: Vec<Dna>,
    /// PSSM column of each window base
    pub columns: Vec<usize>,
}

impl Site {
    pub fn width(&self) -> usize {
        self.columns.len() - 1
    }

    pub fn column_map(&self, orientation: Orientation) -> ColumnMap {
        ColumnMap::new(self.width(), self.gap_position, orientation)
    }

    /// Window bases paired with their columns. In reverse orientation
    /// the window is read from its far end on the complementary strand.
    pub fn aligned(&self, orientation: Orientation) -> Vec<(Dna, usize)> {
        let k = self.width();
        let map = self.column_map(orientation);
        (0..=k)
            .map(|p| {
                let base = match orientation {
                    Orientation::Forward => self.bases[p],
                    Orientation::Reverse => self.bases[k - p].complement(),
                };
                (base, map.column(p))
            })
            .collect()
    }

    /// Motif bases in upper case, the background slot in lower case
    pub fn render(&self, orientation: Orientation) -> String {
        self.aligned(orientation)
            .into_iter()
            .map(|(base, r)| {
                let c = base.to_byte() as char;
                if r == 0 {
                    c.to_ascii_lowercase()
                } else {
                    c
                }
            })
            .collect()
    }
}

/// Decode one site per sequence from the MAP start, gap indicator,
/// and gap position
pub fn decode_sites(
    data: &Dataset,
    hyper: &Hyperparameters,
    post: &VariationalPosterior,
) -> Vec<Site> {
    let k = hyper.width();
    let map = MostLikely::decode(post);

    (0..data.num_sequences())
        .map(|n| {
            let start = map.starts[n];
            let has_gap = map.has_gap[n];
            let gap_position = if has_gap { map.gap_position } else { None };
            let g = has_gap as usize;
            let h = gap_position.unwrap_or(k - 1);

            let gen = CombinationGenerator::new(data, post, k, n);
            let (bases, columns): (Vec<Dna>, Vec<usize>) = gen
                .iter(true)
                .filter(|c| c.s == start && c.g == g && c.h == h)
                .filter_map(|c| Dna::from_code(c.x as u8).map(|x| (x, c.r)))
                .unzip();

            Site {
                sequence: n,
                start,
                has_gap,
                gap_position,
                mu: post.mu()[n],
                bases,
                columns,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::prelude::*;

    fn pinned(
        k: usize,
        seqs: &[&str],
        eta: Array1<f64>,
        mu: Array1<f64>,
    ) -> (Dataset, Hyperparameters, VariationalPosterior) {
        let data = Dataset::from_strs(seqs).unwrap();
        let hyper = Hyperparameters::flat(k).unwrap();
        let nu: Vec<Array1<f64>> = (0..data.num_sequences())
            .map(|n| {
                let len = data.len_of(n) - k;
                // put most of the mass on the last start
                let mut x = Array1::from_elem(len, 0.1 / len as f64);
                x[len - 1] += 0.9;
                x
            })
            .collect();
        let post = VariationalPosterior::from_parts(
            &data,
            &hyper,
            Array2::from_elem((k + 1, 4), 1.0),
            [1.0, 1.0],
            eta,
            mu,
            nu,
        )
        .unwrap();
        (data, hyper, post)
    }

    #[test]
    fn test_most_likely() {
        let (_, _, post) = pinned(3, &["aacgtt", "ccgtta"], array![0.2, 0.8], array![0.7, 0.2]);
        let map = MostLikely::decode(&post);
        assert_eq!(map.starts, vec![2, 2]);
        assert_eq!(map.has_gap, vec![true, false]);
        assert_eq!(map.gap_position, Some(1));
    }

    #[test]
    fn test_decode_gapped_site() {
        let (data, hyper, post) =
            pinned(3, &["aacgtt", "ccgtta"], array![0.2, 0.8], array![0.7, 0.2]);
        let sites = decode_sites(&data, &hyper, &post);

        // "aacgtt", start 2, gap after the second column: c g [t] t
        let site = &sites[0];
        assert_eq!(site.columns, vec![1, 2, 0, 3]);
        assert_eq!(site.render(Orientation::Forward), "CGtT");
        assert_eq!(site.render(Orientation::Reverse), "AaCG");

        // "ccgtta", start 2, ungapped: g t t [a]
        let site = &sites[1];
        assert_eq!(site.gap_position, None);
        assert_eq!(site.columns, vec![1, 2, 3, 0]);
        assert_eq!(site.render(Orientation::Forward), "GTTa");
    }

    #[test]
    fn test_aligned_columns_follow_map() {
        let (data, hyper, post) = pinned(3, &["aacgtt"], array![0.9, 0.1], array![0.9]);
        let site = &decode_sites(&data, &hyper, &post)[0];
        for orientation in [Orientation::Forward, Orientation::Reverse] {
            let map = site.column_map(orientation);
            for (p, (_, r)) in site.aligned(orientation).into_iter().enumerate() {
                assert_eq!(map.offset(r), p);
            }
        }
    }
}
