use crate::error::AnalyticsError;
use configuration::ClusteringSettings;
use smartcore::cluster::kmeans::{KMeans, KMeansParameters};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::collections::HashMap;

/// Assigns each row of `features` to one of `settings.k` clusters.
///
/// Labels are renumbered in order of first appearance, so the first row is
/// always in cluster 0. Every label is below `k`.
pub fn cluster_rows(
    features: &[Vec<f64>],
    settings: &ClusteringSettings,
) -> Result<Vec<usize>, AnalyticsError> {
    let rows = features.len();
    if rows == 0 {
        return Err(AnalyticsError::NotEnoughData(
            "clustering needs at least one row".to_string(),
        ));
    }
    let k = settings.k;
    if k == 0 || k > rows {
        return Err(AnalyticsError::InvalidParameter(
            "k".to_string(),
            format!("must be within 1..={} for {} rows, got {}", rows, rows, k),
        ));
    }
    let width = features[0].len();
    if width == 0 || features.iter().any(|row| row.len() != width) {
        return Err(AnalyticsError::Calculation(
            "feature rows must be non-empty and of equal length".to_string(),
        ));
    }
    if features.iter().flatten().any(|v| !v.is_finite()) {
        return Err(AnalyticsError::Calculation(
            "features contain a non-finite value".to_string(),
        ));
    }

    if k == 1 {
        return Ok(vec![0; rows]);
    }

    let data = if settings.standardize {
        standardize(features)
    } else {
        features.to_vec()
    };

    let x = DenseMatrix::from_2d_vec(&data)
        .map_err(|e| AnalyticsError::ModelFit(format!("Failed to create DenseMatrix: {}", e)))?;

    let params = KMeansParameters::default()
        .with_k(k)
        .with_max_iter(settings.max_iter);
    let model: KMeans<f64, i32, DenseMatrix<f64>, Vec<i32>> = KMeans::fit(&x, params)
        .map_err(|e| AnalyticsError::ModelFit(format!("k-means fit failed: {}", e)))?;
    let raw_labels = model
        .predict(&x)
        .map_err(|e| AnalyticsError::ModelFit(format!("k-means predict failed: {}", e)))?;

    tracing::debug!(k, rows, labels = ?raw_labels, "k-means fitted.");

    Ok(renumber(&raw_labels))
}

/// Z-scores each column, using the sample standard deviation.
fn standardize(features: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n_samples = features.len();
    let n_features = features[0].len();

    let mut means = vec![0.0; n_features];
    let mut stds = vec![1.0; n_features];

    for j in 0..n_features {
        means[j] = features.iter().map(|row| row[j]).sum::<f64>() / n_samples as f64;
        if n_samples > 1 {
            let sum_sq: f64 = features.iter().map(|row| (row[j] - means[j]).powi(2)).sum();
            let std = (sum_sq / (n_samples - 1) as f64).sqrt();
            // Constant columns would divide by zero.
            if std >= 1e-10 {
                stds[j] = std;
            }
        }
    }

    features
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(j, v)| (v - means[j]) / stds[j])
                .collect()
        })
        .collect()
}

fn renumber(labels: &[i32]) -> Vec<usize> {
    let mut mapping: HashMap<i32, usize> = HashMap::new();
    labels
        .iter()
        .map(|label| {
            let next = mapping.len();
            *mapping.entry(*label).or_insert(next)
        })
        .collect()
}
