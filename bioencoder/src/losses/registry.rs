//! Explicit loss registry.
//!
//! Maps canonical loss names to configured constructors. Unlike a
//! process-global table, a [`LossRegistry`] is an ordinary value constructed
//! by the training setup and passed to wherever a loss is selected by name,
//! so there is no hidden mutable state.

use std::collections::BTreeMap;

use burn::{prelude::*, tensor::backend::Backend};

use crate::error::{BioEncoderError, BioEncoderResult};

use super::{
    ClassificationLoss, ClassificationLossConfig, LabelSmoothingLoss, LabelSmoothingLossConfig,
    SupConLoss, SupConLossConfig,
};

/// A registered loss constructor: the configuration that will build it.
#[derive(Config, Debug)]
pub enum LossEntry {
    /// Supervised contrastive loss, optionally phylogeny-aware.
    SupCon(SupConLossConfig),
    /// Label smoothing cross entropy.
    LabelSmoothing(LabelSmoothingLossConfig),
    /// Plain cross entropy.
    CrossEntropy(ClassificationLossConfig),
}

/// An initialized loss, ready for the training loop.
#[derive(Debug, Clone)]
pub enum Loss<B: Backend> {
    SupCon(SupConLoss<B>),
    LabelSmoothing(LabelSmoothingLoss<B>),
    CrossEntropy(ClassificationLoss<B>),
}

/// Name-to-constructor mapping consulted when instantiating the loss
/// selected by the training configuration.
#[derive(Debug, Clone, Default)]
pub struct LossRegistry {
    entries: BTreeMap<String, LossEntry>,
}

impl LossRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the zero-argument constructible defaults,
    /// `SupCon` and `CrossEntropy`, registered under their canonical names.
    ///
    /// Losses needing dataset-specific parameters (`LabelSmoothing` requires
    /// the class count) are registered by the caller via
    /// [`register`](Self::register).
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("SupCon", LossEntry::SupCon(SupConLossConfig::new()));
        registry.register(
            "CrossEntropy",
            LossEntry::CrossEntropy(ClassificationLossConfig::new()),
        );
        registry
    }

    /// Register a loss under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, entry: LossEntry) {
        self.entries.insert(name.into(), entry);
    }

    /// Look up an entry. Absence of the key is the caller's lookup failure.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LossEntry> {
        self.entries.get(name)
    }

    /// Registered names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Initialize the loss registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns `Err(BioEncoderError::UnknownLossName)` for an unregistered
    /// name, plus any construction error of the selected loss (invalid
    /// configuration, tree parsing).
    pub fn init<B: Backend>(&self, name: &str, device: &B::Device) -> BioEncoderResult<Loss<B>> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| BioEncoderError::UnknownLossName {
                name: name.to_string(),
            })?;
        match entry {
            LossEntry::SupCon(config) => Ok(Loss::SupCon(config.init()?)),
            LossEntry::LabelSmoothing(config) => Ok(Loss::LabelSmoothing(config.init()?)),
            LossEntry::CrossEntropy(config) => Ok(Loss::CrossEntropy(config.init(device))),
        }
    }
}
