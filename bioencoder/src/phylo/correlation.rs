//! Brownian-motion trait correlations between the tips of a rooted tree.
//!
//! Under a Brownian-motion model of trait evolution the covariance shared by
//! two tips is the variance accumulated along their common history, i.e. the
//! depth of their most recent common ancestor. Normalizing by the geometric
//! mean of the tip depths yields a correlation in `[0, 1]`.

use std::path::Path;

use crate::error::{BioEncoderError, BioEncoderResult};

use super::newick::{self, NewickNode};
use super::tree::{self, Tip};

/// Ordered tip labels and their pairwise Brownian-motion correlation matrix.
///
/// Computed once from a tree and immutable afterwards. Tips are sorted
/// lexicographically; that ordering defines the matrix index space and must
/// line up with the integer-to-label mapping of the external dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TipCorrelations {
    tips: Vec<String>,
    /// Row-major `n x n` matrix, symmetric with unit diagonal.
    matrix: Vec<f32>,
}

impl TipCorrelations {
    /// Build correlations from a Newick tree file.
    ///
    /// # Errors
    ///
    /// Returns `Err(BioEncoderError::TreeFileRead)` if the file cannot be
    /// read, plus any error of [`from_newick_str`](Self::from_newick_str).
    pub fn from_path(path: impl AsRef<Path>) -> BioEncoderResult<Self> {
        Self::from_root(&newick::parse_file(path.as_ref())?)
    }

    /// Build correlations from Newick text.
    ///
    /// # Errors
    ///
    /// Returns `Err(BioEncoderError::TreeParse)` for malformed input,
    /// `Err(BioEncoderError::DuplicateTipLabel)` if two leaves share a label,
    /// and `Err(BioEncoderError::NoCommonAncestor)` for a disconnected tree.
    pub fn from_newick_str(text: &str) -> BioEncoderResult<Self> {
        Self::from_root(&newick::parse(text)?)
    }

    fn from_root(root: &NewickNode) -> BioEncoderResult<Self> {
        let mut tips = tree::collect_tips(root)?;
        tips.sort_by(|a, b| a.label.cmp(&b.label));

        let n = tips.len();
        let mut matrix = vec![0.0_f32; n * n];
        for i in 0..n {
            matrix[i * n + i] = 1.0;
        }
        // symmetric relation: walk the upper triangle, mirror into the lower
        for i in 0..n {
            for j in (i + 1)..n {
                let corr = pair_correlation(&tips[i], &tips[j])?;
                matrix[i * n + j] = corr;
                matrix[j * n + i] = corr;
            }
        }

        Ok(Self {
            tips: tips.into_iter().map(|tip| tip.label).collect(),
            matrix,
        })
    }

    /// Number of tips.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tips.len()
    }

    /// Whether the tree had no tips.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tips.is_empty()
    }

    /// Lexicographically sorted tip labels, in matrix index order.
    #[must_use]
    pub fn tips(&self) -> &[String] {
        &self.tips
    }

    /// Correlation between tips `i` and `j`, or `None` if either index is
    /// out of range.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i < self.len() && j < self.len() {
            Some(self.matrix[i * self.len() + j])
        } else {
            None
        }
    }

    /// Matrix index of a tip label.
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.tips.binary_search_by(|tip| tip.as_str().cmp(label)).ok()
    }
}

fn pair_correlation(first: &Tip, second: &Tip) -> BioEncoderResult<f32> {
    let anc = tree::mrca(first, second).ok_or_else(|| BioEncoderError::NoCommonAncestor {
        first: first.label.clone(),
        second: second.label.clone(),
    })?;
    if anc.is_root {
        // tips that diverge at the root share no history by convention
        Ok(0.0)
    } else {
        Ok((anc.depth / (first.depth * second.depth).sqrt()) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tips_are_sorted_lexicographically() {
        let corr = TipCorrelations::from_newick_str("((D:1,B:1):1,(C:1,A:1):1);").unwrap();
        assert_eq!(corr.tips(), ["A", "B", "C", "D"]);
        assert_eq!(corr.index_of("C"), Some(2));
        assert_eq!(corr.index_of("E"), None);
    }

    #[test]
    fn basal_split_pairs_are_exactly_zero() {
        // (A,B) and (C,D) each share a recent ancestor; the splits meet only
        // at the root.
        let corr = TipCorrelations::from_newick_str("((A:1,B:1):1,(C:1,D:1):1);").unwrap();
        assert!(corr.get(0, 1).unwrap() > 0.0);
        assert!(corr.get(2, 3).unwrap() > 0.0);
        for (i, j) in [(0, 2), (0, 3), (1, 2), (1, 3)] {
            assert_eq!(corr.get(i, j), Some(0.0));
            assert_eq!(corr.get(j, i), Some(0.0));
        }
    }

    #[test]
    fn sibling_correlation_matches_the_depth_ratio() {
        // A and B sit at depth 2 with their ancestor at depth 1.
        let corr = TipCorrelations::from_newick_str("((A:1,B:1):1,(C:1,D:1):1);").unwrap();
        assert!((corr.get(0, 1).unwrap() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal_and_bounded_entries() {
        let corr = TipCorrelations::from_newick_str(
            "(((A:1,B:2):0.5,(C:0.5,D:1.5):1):0.25,(E:2,F:1):0.75);",
        )
        .unwrap();
        let n = corr.len();
        for i in 0..n {
            assert_eq!(corr.get(i, i), Some(1.0));
            for j in 0..n {
                let value = corr.get(i, j).unwrap();
                assert_eq!(corr.get(j, i), Some(value));
                assert!((0.0..=1.0).contains(&value), "corr({i},{j}) = {value}");
            }
        }
    }

    #[test]
    fn unbalanced_depths_use_the_geometric_mean() {
        // mrca depth 0.5, tip depths 1.5 and 2.5
        let corr = TipCorrelations::from_newick_str("((A:1,B:2):0.5,C:3);").unwrap();
        let expected = 0.5 / (1.5_f64 * 2.5).sqrt();
        assert!((f64::from(corr.get(0, 1).unwrap()) - expected).abs() < 1e-6);
        assert_eq!(corr.get(0, 2), Some(0.0));
    }

    #[test]
    fn duplicate_tip_labels_fail_construction() {
        assert!(matches!(
            TipCorrelations::from_newick_str("((A:1,B:1):1,(A:1,D:1):1);"),
            Err(BioEncoderError::DuplicateTipLabel { label }) if label == "A"
        ));
    }
}
