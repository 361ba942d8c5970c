//! Plain cross entropy, kept so the registry can serve the canonical
//! `CrossEntropy` name.

use burn::{
    nn::loss::{CrossEntropyLoss, CrossEntropyLossConfig},
    prelude::*,
    tensor::{backend::Backend, Int, Tensor},
};

/// Configuration for the cross entropy classification loss.
#[derive(Config, Debug)]
pub struct ClassificationLossConfig {
    /// Scaling applied to the loss value.
    #[config(default = 1.0)]
    pub weight: f32,
}

/// Cross entropy over `[batch, classes]` logits and integer targets.
#[derive(Module, Debug)]
pub struct ClassificationLoss<B: Backend> {
    pub weight: f32,
    pub ce_loss: CrossEntropyLoss<B>,
}

impl ClassificationLossConfig {
    /// Initialize a new classification loss with the given configuration.
    pub fn init<B: Backend>(&self, device: &B::Device) -> ClassificationLoss<B> {
        ClassificationLoss {
            weight: self.weight,
            ce_loss: CrossEntropyLossConfig::new().init(device),
        }
    }
}

impl<B: Backend> ClassificationLoss<B> {
    /// Create a new classification loss with default configuration.
    pub fn new(device: &B::Device) -> Self {
        ClassificationLossConfig::new().init(device)
    }

    /// Calculate the loss for predictions `[batch, classes]` against integer
    /// targets `[batch]`.
    pub fn forward(&self, pred: Tensor<B, 2>, target: Tensor<B, 1, Int>) -> Tensor<B, 1> {
        self.ce_loss.forward(pred, target) * self.weight
    }
}
