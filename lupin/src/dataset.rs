use crate::dna::*;
use crate::error::*;
use log::info;
use matrix_util::common_io::read_data_lines;

/// Integer-coded DNA sequences, immutable once built
#[derive(Debug, Clone)]
pub struct Dataset {
    sequences: Vec<Box<[u8]>>,
}

impl Dataset {
    /// Build from sequences already coded as `0..4`
    pub fn new(sequences: Vec<Vec<u8>>) -> Result<Self> {
        if sequences.is_empty() {
            return config_err("no sequences");
        }
        for (n, seq) in sequences.iter().enumerate() {
            if let Some(&code) = seq.iter().find(|&&x| Dna::from_code(x).is_none()) {
                return config_err(format!("sequence {} has an invalid base code {}", n, code));
            }
        }
        Ok(Self {
            sequences: sequences.into_iter().map(Vec::into_boxed_slice).collect(),
        })
    }

    /// Decode text sequences over `{A,C,G,T}` (either case)
    pub fn from_strs<S: AsRef<str>>(sequences: &[S]) -> Result<Self> {
        let mut coded = Vec::with_capacity(sequences.len());
        for (n, seq) in sequences.iter().enumerate() {
            let seq = seq.as_ref();
            let codes: Option<Vec<u8>> = seq
                .bytes()
                .map(|b| Dna::from_byte(b).map(|x| x.code()))
                .collect();
            match codes {
                Some(codes) => coded.push(codes),
                None => {
                    return config_err(format!("sequence {} ({}) is not over ACGT", n, seq));
                }
            }
        }
        Self::new(coded)
    }

    /// Read one sequence per line from plain or gzipped files, in
    /// the order given. Empty lines and lines starting with `#` or `>`
    /// are skipped.
    pub fn from_files<S: AsRef<str>>(files: &[S]) -> anyhow::Result<Self> {
        let mut lines = vec![];
        for file in files {
            let file = file.as_ref();
            let found = read_data_lines(file, &['#', '>'])?;
            info!("read {} sequences from {}", found.len(), file);
            lines.extend(found);
        }
        let data = Self::from_strs(&lines)?;
        info!(
            "{} sequences in total (lengths {}..{})",
            data.num_sequences(),
            data.min_len(),
            data.max_len()
        );
        Ok(data)
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    pub fn sequence(&self, n: usize) -> &[u8] {
        &self.sequences[n]
    }

    pub fn len_of(&self, n: usize) -> usize {
        self.sequences[n].len()
    }

    pub fn min_len(&self) -> usize {
        self.sequences.iter().map(|s| s.len()).min().unwrap_or(0)
    }

    pub fn max_len(&self) -> usize {
        self.sequences.iter().map(|s| s.len()).max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.sequences.iter().map(|s| s.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_strs() {
        let data = Dataset::from_strs(&["acgt", "TTG"]).unwrap();
        assert_eq!(data.num_sequences(), 2);
        assert_eq!(data.sequence(0), &[0, 1, 2, 3]);
        assert_eq!(data.sequence(1), &[3, 3, 2]);
        assert_eq!((data.min_len(), data.max_len()), (3, 4));
    }

    #[test]
    fn test_reject_bad_input() {
        assert!(matches!(
            Dataset::from_strs(&["acgn"]),
            Err(ModelError::Configuration(_))
        ));
        assert!(Dataset::new(vec![]).is_err());
        assert!(Dataset::new(vec![vec![0, 1, 4]]).is_err());
    }
}
