use thiserror::Error;

/// The error type for `bioencoder-burn` operations.
///
/// Every variant indicates a programming or configuration mistake, not a
/// transient condition: errors are raised synchronously at the point of
/// violation and propagate to the caller without internal recovery.
#[derive(Error, Debug)]
pub enum BioEncoderError {
    /// Error for when the tree file cannot be read from disk.
    #[error("Failed to read tree file `{path}`: {reason}")]
    TreeFileRead {
        /// Path of the tree file.
        path: String,
        /// The underlying I/O failure.
        reason: String,
    },

    /// Error for when the tree text is not valid Newick notation.
    #[error("Failed to parse Newick tree: {reason}")]
    TreeParse {
        /// What was wrong with the input.
        reason: String,
    },

    /// Error for when two leaves of the tree carry the same taxon label.
    #[error("Duplicate tip label found in the tree: {label}")]
    DuplicateTipLabel {
        /// The repeated label.
        label: String,
    },

    /// Error for when two tips share no ancestor, indicating a malformed or
    /// disconnected tree.
    #[error("Tips `{first}` and `{second}` do not share an ancestor in the tree")]
    NoCommonAncestor {
        /// Label of the first tip.
        first: String,
        /// Label of the second tip.
        second: String,
    },

    /// Error for when an input tensor or label sequence has an invalid shape.
    #[error("Invalid input tensor shape: expected {expected}, got {actual}")]
    InvalidTensorShape {
        /// The expected shape.
        expected: String,
        /// The actual shape.
        actual: String,
    },

    /// Error for when both `labels` and `mask` are supplied to the
    /// contrastive forward pass.
    #[error("Cannot define both `labels` and `mask`")]
    ConflictingMaskArguments,

    /// Error for when a contrast mode string is neither `all` nor `one`.
    #[error("Unknown contrast mode: {mode}")]
    UnknownContrastMode {
        /// The unrecognized mode string.
        mode: String,
    },

    /// Error for when a loss name is not present in the registry.
    #[error("Unknown loss name: {name}")]
    UnknownLossName {
        /// The name that was looked up.
        name: String,
    },

    /// Error for when loss construction parameters are logically invalid.
    #[error("Invalid loss configuration: {reason}")]
    InvalidConfiguration {
        /// The reason why the configuration is invalid.
        reason: String,
    },
}

/// A specialized `Result` type for `bioencoder-burn` operations.
pub type BioEncoderResult<T> = Result<T, BioEncoderError>;
