//! Supervised contrastive loss with optional phylogenetic soft positives.
//!
//! Implements the loss of "Supervised Contrastive Learning"
//! (<https://arxiv.org/pdf/2004.11362.pdf>), degenerating to the SimCLR
//! unsupervised loss when neither labels nor a mask are given. When a
//! phylogenetic tree is configured, the binary same-label mask is replaced by
//! Brownian-motion correlations between the samples' taxa, so partially
//! related classes earn partial positive credit.

use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;

use burn::{
    module::Ignored,
    prelude::*,
    tensor::{backend::Backend, Tensor, TensorData},
};

use crate::error::{BioEncoderError, BioEncoderResult};
use crate::phylo::TipCorrelations;

/// Specifies which views act as anchors when computing the loss.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum ContrastMode {
    /// Every view of every sample is an anchor.
    All,
    /// Only the first view of each sample is an anchor.
    One,
}

impl FromStr for ContrastMode {
    type Err = BioEncoderError;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "all" => Ok(Self::All),
            "one" => Ok(Self::One),
            _ => Err(BioEncoderError::UnknownContrastMode {
                mode: mode.to_string(),
            }),
        }
    }
}

/// Configuration for the supervised contrastive loss.
#[derive(Config, Debug)]
pub struct SupConLossConfig {
    /// Temperature scaling applied to the anchor-contrast logits.
    #[config(default = 0.07)]
    pub temperature: f32,
    /// Which views act as anchors.
    #[config(default = "ContrastMode::All")]
    pub contrast_mode: ContrastMode,
    /// Base temperature normalizing the final loss scale.
    #[config(default = 0.07)]
    pub base_temperature: f32,
    /// Optional Newick tree file enabling phylogenetic soft masking.
    #[config(default = "None")]
    pub tree_path: Option<PathBuf>,
}

/// Supervised contrastive loss over a batch of multi-view embeddings.
#[derive(Module, Debug)]
pub struct SupConLoss<B: Backend> {
    pub temperature: f32,
    pub base_temperature: f32,
    pub contrast_mode: Ignored<ContrastMode>,
    /// Tip correlations derived from the configured tree, if any. Read-only
    /// after construction; concurrent forward calls share it safely.
    pub correlations: Ignored<Option<TipCorrelations>>,
    _phantom: PhantomData<B>,
}

impl SupConLossConfig {
    /// Validate the configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns `Err(BioEncoderError::InvalidConfiguration)` if either
    /// temperature is not strictly positive.
    pub fn validate(&self) -> BioEncoderResult<()> {
        if self.temperature <= 0.0 {
            return Err(BioEncoderError::InvalidConfiguration {
                reason: format!("temperature must be > 0, got {}", self.temperature),
            });
        }
        if self.base_temperature <= 0.0 {
            return Err(BioEncoderError::InvalidConfiguration {
                reason: format!(
                    "base_temperature must be > 0, got {}",
                    self.base_temperature
                ),
            });
        }
        Ok(())
    }

    /// Initialize the loss, parsing the tree file if one is configured.
    ///
    /// This is the single blocking I/O point; the resulting correlations are
    /// immutable, and a new instance must be constructed to pick up a
    /// different tree.
    ///
    /// # Errors
    ///
    /// Returns `Err(BioEncoderError::InvalidConfiguration)` for invalid
    /// parameters, and any tree construction error of
    /// [`TipCorrelations::from_path`].
    pub fn init<B: Backend>(&self) -> BioEncoderResult<SupConLoss<B>> {
        self.validate()?;
        let correlations = match &self.tree_path {
            Some(path) => Some(TipCorrelations::from_path(path)?),
            None => None,
        };
        Ok(SupConLoss {
            temperature: self.temperature,
            base_temperature: self.base_temperature,
            contrast_mode: Ignored(self.contrast_mode.clone()),
            correlations: Ignored(correlations),
            _phantom: PhantomData,
        })
    }
}

impl<B: Backend> SupConLoss<B> {
    /// Create a loss with default configuration and no tree.
    ///
    /// # Errors
    ///
    /// The default configuration is valid; this only exists to mirror the
    /// fallible [`SupConLossConfig::init`] path.
    pub fn new() -> BioEncoderResult<Self> {
        SupConLossConfig::new().init()
    }

    /// Tip correlations held by this loss, if a tree was configured.
    #[must_use]
    pub fn tip_correlations(&self) -> Option<&TipCorrelations> {
        self.correlations.0.as_ref()
    }

    /// Compute the loss for a batch of features shaped `[batch, views, dim]`.
    ///
    /// At most one of `labels` and `mask` may be supplied:
    /// - neither: identity mask, each sample its own sole positive (SimCLR);
    /// - `labels` with a tree configured: soft mask of Brownian-motion
    ///   correlations between the samples' taxa — label values index the
    ///   tree's sorted tip list (caller contract);
    /// - `labels` without a tree: binary same-label mask;
    /// - `mask`: used as-is, must be `[batch, batch]`.
    ///
    /// # Errors
    ///
    /// Returns `Err(BioEncoderError::ConflictingMaskArguments)` if both
    /// `labels` and `mask` are given, and
    /// `Err(BioEncoderError::InvalidTensorShape)` if the label count or mask
    /// dimensions do not match the batch, or a label is out of range for the
    /// correlation matrix.
    pub fn forward(
        &self,
        features: Tensor<B, 3>,
        labels: Option<&[usize]>,
        mask: Option<Tensor<B, 2>>,
    ) -> BioEncoderResult<Tensor<B, 1>> {
        let [batch_size, n_views, dim] = features.dims();
        let device = features.device();

        let mask = self.build_mask(batch_size, labels, mask, &device)?;

        // concatenate all views along the batch axis, view-major
        let contrast_count = n_views;
        let contrast_feature = features
            .clone()
            .swap_dims(0, 1)
            .reshape([batch_size * n_views, dim]);

        let (anchor_feature, anchor_count) = match self.contrast_mode.0 {
            ContrastMode::One => (
                features
                    .slice([0..batch_size, 0..1, 0..dim])
                    .reshape([batch_size, dim]),
                1,
            ),
            ContrastMode::All => (contrast_feature.clone(), contrast_count),
        };

        let anchor_dot_contrast = anchor_feature
            .matmul(contrast_feature.transpose())
            .div_scalar(self.temperature);
        // subtract the per-row maximum, detached, for numerical stability
        let logits_max = anchor_dot_contrast.clone().max_dim(1);
        let logits = anchor_dot_contrast - logits_max.detach();

        // tile the [batch, batch] mask over anchors and contrasts, then
        // remove self-contrast entries: a sample never scores against its
        // own exact view copy
        let total_anchor = batch_size * anchor_count;
        let total_contrast = batch_size * contrast_count;
        let mask = mask.repeat(&[anchor_count, contrast_count]);
        let logits_mask = Tensor::<B, 2>::ones([total_anchor, total_contrast], &device)
            - Tensor::<B, 2>::eye(total_contrast, &device)
                .slice([0..total_anchor, 0..total_contrast]);
        let mask = mask * logits_mask.clone();

        let exp_logits = logits.clone().exp() * logits_mask;
        let log_prob = logits - exp_logits.sum_dim(1).log();

        // soft positives contribute partial credit through the mask weights
        let mean_log_prob_pos = (mask.clone() * log_prob).sum_dim(1) / mask.sum_dim(1);

        let loss = mean_log_prob_pos.mul_scalar(-(self.temperature / self.base_temperature));
        Ok(loss.reshape([anchor_count, batch_size]).mean())
    }

    fn build_mask(
        &self,
        batch_size: usize,
        labels: Option<&[usize]>,
        mask: Option<Tensor<B, 2>>,
        device: &B::Device,
    ) -> BioEncoderResult<Tensor<B, 2>> {
        match (labels, mask) {
            (Some(_), Some(_)) => Err(BioEncoderError::ConflictingMaskArguments),
            (None, None) => Ok(Tensor::eye(batch_size, device)),
            (Some(labels), None) => {
                if labels.len() != batch_size {
                    return Err(BioEncoderError::InvalidTensorShape {
                        expected: format!("{batch_size} labels"),
                        actual: format!("{} labels", labels.len()),
                    });
                }
                match self.correlations.0.as_ref() {
                    Some(correlations) => {
                        Self::phylogenetic_mask(labels, correlations, device)
                    }
                    None => Ok(Self::same_label_mask(labels, device)),
                }
            }
            (None, Some(mask)) => {
                let dims = mask.dims();
                if dims != [batch_size, batch_size] {
                    return Err(BioEncoderError::InvalidTensorShape {
                        expected: format!("[{batch_size}, {batch_size}]"),
                        actual: format!("[{}, {}]", dims[0], dims[1]),
                    });
                }
                Ok(mask)
            }
        }
    }

    /// Soft mask: identity plus mirrored pairwise tip correlations.
    fn phylogenetic_mask(
        labels: &[usize],
        correlations: &TipCorrelations,
        device: &B::Device,
    ) -> BioEncoderResult<Tensor<B, 2>> {
        let n = labels.len();
        let mut values = vec![0.0_f32; n * n];
        for i in 0..n {
            values[i * n + i] = 1.0;
        }
        for i in 0..n {
            for j in (i + 1)..n {
                let corr = correlations.get(labels[i], labels[j]).ok_or_else(|| {
                    BioEncoderError::InvalidTensorShape {
                        expected: format!("label indices < {}", correlations.len()),
                        actual: format!("labels {} and {}", labels[i], labels[j]),
                    }
                })?;
                values[i * n + j] = corr;
                values[j * n + i] = corr;
            }
        }
        Ok(Tensor::from_data(TensorData::new(values, [n, n]), device))
    }

    /// Binary mask: 1 iff two samples carry the same label.
    fn same_label_mask(labels: &[usize], device: &B::Device) -> Tensor<B, 2> {
        let n = labels.len();
        let mut values = vec![0.0_f32; n * n];
        for i in 0..n {
            for j in 0..n {
                if labels[i] == labels[j] {
                    values[i * n + j] = 1.0;
                }
            }
        }
        Tensor::from_data(TensorData::new(values, [n, n]), device)
    }
}

/// Flatten trailing feature axes of a `[batch, views, ...]` tensor into one,
/// producing the `[batch, views, dim]` shape [`SupConLoss::forward`] expects.
///
/// # Errors
///
/// Returns `Err(BioEncoderError::InvalidTensorShape)` if the tensor has
/// fewer than three dimensions.
pub fn flatten_views<B: Backend, const D: usize>(
    features: Tensor<B, D>,
) -> BioEncoderResult<Tensor<B, 3>> {
    if D < 3 {
        return Err(BioEncoderError::InvalidTensorShape {
            expected: "[batch, views, ...] with at least 3 dimensions".to_string(),
            actual: format!("{D} dimensions"),
        });
    }
    Ok(features.flatten(2, D - 1))
}
