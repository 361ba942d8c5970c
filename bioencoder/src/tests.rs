#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use burn::backend::ndarray::NdArray;
    use burn::prelude::*;

    use crate::error::BioEncoderError;
    use crate::losses::{LabelSmoothingLossConfig, SupConLossConfig};

    type TestBackend = NdArray;

    /// Write Newick text to a unique temp file and return its path.
    fn tree_file(name: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bioencoder-{name}-{}.nwk", std::process::id()));
        std::fs::write(&path, text).unwrap();
        path
    }

    /// `[2, 2, 3]` batch: two samples, two identical one-hot views each.
    fn two_sample_features(device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 3> {
        Tensor::from_data(
            [
                [[1.0_f32, 0.0, 0.0], [1.0, 0.0, 0.0]],
                [[0.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            ],
            device,
        )
    }

    #[test]
    fn tree_configured_loss_builds_correlations_from_the_file() {
        let path = tree_file("basal", "((A:1,B:1):1,(C:1,D:1):1);");
        let loss = SupConLossConfig::new()
            .with_tree_path(Some(path.clone()))
            .init::<TestBackend>()
            .unwrap();

        let correlations = loss.tip_correlations().unwrap();
        assert_eq!(correlations.tips(), ["A", "B", "C", "D"]);
        assert_eq!(correlations.get(0, 3), Some(0.0));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn root_divergent_labels_behave_as_pure_negatives() {
        let device = Default::default();
        let path = tree_file("negatives", "((A:1,B:1):1,(C:1,D:1):1);");
        let loss = SupConLossConfig::new()
            .with_tree_path(Some(path.clone()))
            .init::<TestBackend>()
            .unwrap();

        // labels A and D diverge at the root: the soft mask collapses to the
        // identity, identical to the unsupervised case
        let with_labels = loss
            .forward(two_sample_features(&device), Some(&[0, 3]), None)
            .unwrap()
            .into_scalar();
        let unsupervised = loss
            .forward(two_sample_features(&device), None, None)
            .unwrap()
            .into_scalar();
        assert!((with_labels - unsupervised).abs() < 1e-6);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn correlated_labels_change_the_loss() {
        let device = Default::default();
        let path = tree_file("siblings", "((A:1,B:1):1,(C:1,D:1):1);");
        let loss = SupConLossConfig::new()
            .with_tree_path(Some(path.clone()))
            .init::<TestBackend>()
            .unwrap();

        // A and B share half their history; the mask gains off-diagonal mass
        let siblings = loss
            .forward(two_sample_features(&device), Some(&[0, 1]), None)
            .unwrap()
            .into_scalar();
        let unsupervised = loss
            .forward(two_sample_features(&device), None, None)
            .unwrap()
            .into_scalar();
        assert!(siblings.is_finite());
        assert!((siblings - unsupervised).abs() > 1e-6);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn out_of_range_labels_are_rejected() {
        let device = Default::default();
        let path = tree_file("range", "((A:1,B:1):1,(C:1,D:1):1);");
        let loss = SupConLossConfig::new()
            .with_tree_path(Some(path.clone()))
            .init::<TestBackend>()
            .unwrap();

        let result = loss.forward(two_sample_features(&device), Some(&[0, 9]), None);
        assert!(matches!(
            result,
            Err(BioEncoderError::InvalidTensorShape { .. })
        ));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn duplicate_tree_labels_fail_loss_construction() {
        let path = tree_file("duplicate", "((A:1,A:1):1,(C:1,D:1):1);");
        let result = SupConLossConfig::new()
            .with_tree_path(Some(path.clone()))
            .init::<TestBackend>();
        assert!(matches!(
            result,
            Err(BioEncoderError::DuplicateTipLabel { label }) if label == "A"
        ));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_tree_file_fails_loss_construction() {
        let result = SupConLossConfig::new()
            .with_tree_path(Some(PathBuf::from("/nonexistent/taxa.nwk")))
            .init::<TestBackend>();
        assert!(matches!(result, Err(BioEncoderError::TreeFileRead { .. })));
    }

    #[test]
    fn non_positive_temperatures_are_invalid() {
        match SupConLossConfig::new()
            .with_temperature(0.0)
            .init::<TestBackend>()
        {
            Err(BioEncoderError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("temperature"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }

        assert!(matches!(
            SupConLossConfig::new()
                .with_base_temperature(-1.0)
                .init::<TestBackend>(),
            Err(BioEncoderError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn label_smoothing_configuration_is_validated() {
        match LabelSmoothingLossConfig::new(1).init::<TestBackend>() {
            Err(BioEncoderError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("classes"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }

        assert!(matches!(
            LabelSmoothingLossConfig::new(3)
                .with_smoothing(1.0)
                .init::<TestBackend>(),
            Err(BioEncoderError::InvalidConfiguration { .. })
        ));

        assert!(matches!(
            LabelSmoothingLossConfig::new(3).with_dim(0).init::<TestBackend>(),
            Err(BioEncoderError::InvalidConfiguration { .. })
        ));
    }
}
