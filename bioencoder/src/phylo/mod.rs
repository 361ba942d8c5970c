//! Phylogenetic tree parsing and Brownian-motion tip correlations.
//!
//! A Newick tree is parsed once at loss construction time into an immutable
//! node tree, from which [`TipCorrelations`] derives the ordered tip list and
//! the symmetric correlation matrix consumed by the contrastive loss.

mod correlation;
mod newick;
mod tree;

pub use correlation::TipCorrelations;
pub use newick::NewickNode;
