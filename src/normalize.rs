//! Batch normalization of feature vectors.
//!
//! Two strategies make features contribute comparably to Euclidean distance:
//!
//! - [`MinMaxScaler`] rescales each feature into `[0, 1]` using the batch's
//!   per-feature minimum and maximum. Constant features map to `0.0`.
//! - [`TfIdfWeighting`] turns raw term counts into TF-IDF weights and
//!   L2-normalizes each row. Rows with zero norm stay all-zero.
//!
//! Parameters are fitted once over the whole batch and frozen; nothing is
//! kept between calls to [`VectorNormalizer::fit_transform`].

use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A feature vector after normalization.
pub type NormalizedVector = Vec<f32>;

/// Errors that can occur during normalization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("Empty batch provided for normalization\nSuggestion: Skip normalization when no entities were extracted")]
    EmptyBatch,

    #[error("Dimension mismatch: expected {expected}, found {found} at row {row}")]
    DimensionMismatch {
        expected: usize,
        found: usize,
        row: usize,
    },
}

/// Normalization strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Normalization {
    MinMax,
    TfIdf,
}

impl Normalization {
    /// Fit and apply the selected strategy in one step.
    pub fn fit_transform(
        &self,
        vectors: &[FeatureVector],
    ) -> Result<Vec<NormalizedVector>, NormalizeError> {
        match self {
            Self::MinMax => MinMaxScaler::default().fit_transform(vectors),
            Self::TfIdf => TfIdfWeighting::default().fit_transform(vectors),
        }
    }
}

impl std::fmt::Display for Normalization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MinMax => write!(f, "min_max"),
            Self::TfIdf => write!(f, "tf_idf"),
        }
    }
}

/// Common interface for batch normalizers.
pub trait VectorNormalizer {
    /// Fit parameters on `vectors` and return the normalized batch.
    fn fit_transform(
        &mut self,
        vectors: &[FeatureVector],
    ) -> Result<Vec<NormalizedVector>, NormalizeError>;
}

/// Checks that the batch is non-empty and rectangular, returning its dimension.
fn validate_batch(vectors: &[FeatureVector]) -> Result<usize, NormalizeError> {
    let dimension = vectors.first().ok_or(NormalizeError::EmptyBatch)?.len();
    for (row, vector) in vectors.iter().enumerate() {
        if vector.len() != dimension {
            return Err(NormalizeError::DimensionMismatch {
                expected: dimension,
                found: vector.len(),
                row,
            });
        }
    }
    Ok(dimension)
}

/// Per-feature min-max scaler.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MinMaxScaler {
    mins: Vec<f32>,
    maxs: Vec<f32>,
}

impl MinMaxScaler {
    /// Compute per-feature minima and maxima over the batch.
    pub fn fit(vectors: &[FeatureVector]) -> Result<Self, NormalizeError> {
        let dimension = validate_batch(vectors)?;
        let mut mins = vec![f32::INFINITY; dimension];
        let mut maxs = vec![f32::NEG_INFINITY; dimension];

        for vector in vectors {
            for (i, &value) in vector.iter().enumerate() {
                mins[i] = mins[i].min(value);
                maxs[i] = maxs[i].max(value);
            }
        }

        Ok(Self { mins, maxs })
    }

    /// Rescale one vector with the fitted parameters.
    ///
    /// Values are not clamped: a vector outside the fitted range maps
    /// outside `[0, 1]`.
    pub fn transform(&self, vector: &[f32]) -> NormalizedVector {
        vector
            .iter()
            .zip(self.mins.iter().zip(self.maxs.iter()))
            .map(|(&x, (&min, &max))| {
                let range = max - min;
                if range > 0.0 { (x - min) / range } else { 0.0 }
            })
            .collect()
    }

    pub fn mins(&self) -> &[f32] {
        &self.mins
    }

    pub fn maxs(&self) -> &[f32] {
        &self.maxs
    }
}

impl VectorNormalizer for MinMaxScaler {
    fn fit_transform(
        &mut self,
        vectors: &[FeatureVector],
    ) -> Result<Vec<NormalizedVector>, NormalizeError> {
        *self = Self::fit(vectors)?;
        Ok(vectors.iter().map(|v| self.transform(v)).collect())
    }
}

/// TF-IDF weighting with smoothed IDF and L2 row normalization.
///
/// Input rows are raw term counts over a shared vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TfIdfWeighting {
    idf: Vec<f32>,
}

impl TfIdfWeighting {
    /// Compute `idf = ln((N + 1) / (df + 1)) + 1` for every term.
    pub fn fit(vectors: &[FeatureVector]) -> Result<Self, NormalizeError> {
        let dimension = validate_batch(vectors)?;
        let n = vectors.len() as f64;
        let mut document_frequency = vec![0usize; dimension];

        for vector in vectors {
            for (df, &count) in document_frequency.iter_mut().zip(vector.iter()) {
                if count > 0.0 {
                    *df += 1;
                }
            }
        }

        let idf = document_frequency
            .into_iter()
            .map(|df| (((n + 1.0) / (df as f64 + 1.0)).ln() + 1.0) as f32)
            .collect();

        Ok(Self { idf })
    }

    /// Weight one row of raw counts and L2-normalize it.
    pub fn transform(&self, counts: &[f32]) -> NormalizedVector {
        let max_count = counts.iter().copied().fold(0.0f32, f32::max);
        if max_count <= 0.0 {
            return vec![0.0; counts.len()];
        }

        let mut weighted: Vec<f32> = counts
            .iter()
            .zip(self.idf.iter())
            .map(|(&count, &idf)| (count / max_count) * idf)
            .collect();

        l2_normalize(&mut weighted);
        weighted
    }

    pub fn idf(&self) -> &[f32] {
        &self.idf
    }
}

impl VectorNormalizer for TfIdfWeighting {
    fn fit_transform(
        &mut self,
        vectors: &[FeatureVector],
    ) -> Result<Vec<NormalizedVector>, NormalizeError> {
        *self = Self::fit(vectors)?;
        Ok(vectors.iter().map(|v| self.transform(v)).collect())
    }
}

/// Normalizes a vector in-place to unit length.
///
/// A zero vector is left as-is.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
