//! Label smoothing loss for classification heads.

use std::marker::PhantomData;

use burn::{
    prelude::*,
    tensor::{activation, backend::Backend, Int, Tensor},
};

use crate::error::{BioEncoderError, BioEncoderResult};

/// Configuration for Label Smoothing Loss.
#[derive(Config, Debug)]
pub struct LabelSmoothingLossConfig {
    /// Number of classes in the classification problem.
    pub classes: usize,
    /// Smoothing mass spread uniformly over the non-target classes.
    #[config(default = 0.0)]
    pub smoothing: f32,
    /// Axis of the class scores. Predictions are `[batch, classes]`, so this
    /// must be 1.
    #[config(default = 1)]
    pub dim: usize,
}

/// Cross entropy against a smoothed target distribution.
///
/// The true class receives `1 - smoothing` probability mass; the remaining
/// `smoothing` is spread uniformly over the other `classes - 1` classes.
/// With `smoothing = 0` this reduces to standard cross entropy.
#[derive(Module, Debug)]
pub struct LabelSmoothingLoss<B: Backend> {
    pub confidence: f32,
    pub smoothing: f32,
    pub classes: usize,
    pub dim: usize,
    _phantom: PhantomData<B>,
}

impl LabelSmoothingLossConfig {
    /// Validate the configuration parameters.
    ///
    /// # Errors
    ///
    /// Returns `Err(BioEncoderError::InvalidConfiguration)` if `classes < 2`,
    /// `smoothing` lies outside `[0, 1)`, or `dim` is not the class axis.
    pub fn validate(&self) -> BioEncoderResult<()> {
        if self.classes < 2 {
            return Err(BioEncoderError::InvalidConfiguration {
                reason: format!("classes must be >= 2, got {}", self.classes),
            });
        }
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(BioEncoderError::InvalidConfiguration {
                reason: format!("smoothing must be in [0, 1), got {}", self.smoothing),
            });
        }
        if self.dim != 1 {
            return Err(BioEncoderError::InvalidConfiguration {
                reason: format!(
                    "dim must be the class axis (1) of [batch, classes] predictions, got {}",
                    self.dim
                ),
            });
        }
        Ok(())
    }

    /// Initialize the loss with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `Err(BioEncoderError::InvalidConfiguration)` for invalid
    /// parameters.
    pub fn init<B: Backend>(&self) -> BioEncoderResult<LabelSmoothingLoss<B>> {
        self.validate()?;
        Ok(LabelSmoothingLoss {
            confidence: 1.0 - self.smoothing,
            smoothing: self.smoothing,
            classes: self.classes,
            dim: self.dim,
            _phantom: PhantomData,
        })
    }
}

impl<B: Backend> LabelSmoothingLoss<B> {
    /// Calculate the loss for predictions `[batch, classes]` against integer
    /// targets `[batch]`.
    ///
    /// The smoothed target distribution is built from the integer targets,
    /// which carry no gradient; it is a constant with respect to autodiff.
    ///
    /// # Errors
    ///
    /// Returns `Err(BioEncoderError::InvalidTensorShape)` if the batch sizes
    /// differ or the prediction class axis does not match the configured
    /// class count.
    pub fn forward(
        &self,
        pred: Tensor<B, 2>,
        target: Tensor<B, 1, Int>,
    ) -> BioEncoderResult<Tensor<B, 1>> {
        let [batch, classes] = pred.dims();
        let [target_batch] = target.dims();
        if batch != target_batch {
            return Err(BioEncoderError::InvalidTensorShape {
                expected: format!("matching batch sizes ({batch} predictions)"),
                actual: format!("{target_batch} targets"),
            });
        }
        if classes != self.classes {
            return Err(BioEncoderError::InvalidTensorShape {
                expected: format!("[{batch}, {}]", self.classes),
                actual: format!("[{batch}, {classes}]"),
            });
        }
        let device = pred.device();

        let log_prob = activation::log_softmax(pred, self.dim);

        // broadcast-compare targets against the class index row to build the
        // one-hot positions of the true classes
        let class_index: Tensor<B, 1, Int> = Tensor::arange(0..self.classes as i64, &device);
        let one_hot = target
            .unsqueeze_dim::<2>(1)
            .repeat_dim(1, classes)
            .equal(class_index.unsqueeze_dim::<2>(0).repeat_dim(0, batch))
            .float();

        let fill = self.smoothing / (self.classes as f32 - 1.0);
        let true_dist = one_hot.mul_scalar(self.confidence - fill).add_scalar(fill);

        Ok((true_dist * log_prob).sum_dim(self.dim).neg().mean())
    }
}
