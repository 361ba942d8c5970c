//! Training losses for BioEncoder-style representation learning on Burn.
//!
//! The crate provides a phylogeny-aware supervised contrastive loss: a
//! Brownian-motion correlation matrix derived once from a Newick tree serves
//! as a soft positive-pair mask, so samples from related taxa attract each
//! other in proportion to their shared evolutionary history. A label
//! smoothing loss and an explicit loss registry complete the training
//! surface; model definition, data loading and the training loop itself are
//! external collaborators.

pub mod error;
pub mod losses;
pub mod phylo;

mod tests;

pub use error::{BioEncoderError, BioEncoderResult};
pub use losses::{
    flatten_views, ClassificationLoss, ClassificationLossConfig, ContrastMode, LabelSmoothingLoss,
    LabelSmoothingLossConfig, Loss, LossEntry, LossRegistry, SupConLoss, SupConLossConfig,
};
pub use phylo::{NewickNode, TipCorrelations};
