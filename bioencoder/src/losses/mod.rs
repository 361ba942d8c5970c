//! Loss functions for BioEncoder training.
//!
//! The supervised contrastive loss follows the original PyTorch
//! implementation, extended with a phylogenetic soft mask when a tree is
//! configured. Label smoothing and plain cross entropy round out the losses
//! selectable through the [`LossRegistry`].

pub mod cross_entropy;
pub mod label_smoothing;
pub mod registry;
pub mod supcon;

pub use cross_entropy::{ClassificationLoss, ClassificationLossConfig};
pub use label_smoothing::{LabelSmoothingLoss, LabelSmoothingLossConfig};
pub use registry::{Loss, LossEntry, LossRegistry};
pub use supcon::{flatten_views, ContrastMode, SupConLoss, SupConLossConfig};
