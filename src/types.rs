//! Error type, result alias and matrix comparison helpers shared by all modules.

use std::path::PathBuf;

use ndarray::ArrayView2;
use ndarray_linalg::error::LinalgError;
use ndarray_linalg::OperationNorm;
use num::Zero;
use thiserror::Error;

pub use ndarray_linalg::{Lapack, Scalar};

#[derive(Error, Debug)]
pub enum ImageCompressionError {
    #[error("Lapack Error: {0}")]
    LinalgError(#[from] LinalgError),
    #[error("SVD did not return singular vectors")]
    MissingSingularVectors,
    #[error("Non-finite value at row {row}, column {col}")]
    NonFiniteInput { row: usize, col: usize },
    #[error("Cannot decompose an empty {rows}x{cols} matrix")]
    EmptyMatrix { rows: usize, cols: usize },
    #[error("Could not decode image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Could not encode image {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No image format known for {path:?}")]
    UnsupportedFormat { path: PathBuf },
}

/// Coarse classification of an [`ImageCompressionError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reading, decoding, encoding or writing an image file failed.
    File,
    /// The decomposition failed or its input was not a finite, non-empty matrix.
    Numeric,
}

impl ImageCompressionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImageCompressionError::LinalgError(_)
            | ImageCompressionError::MissingSingularVectors
            | ImageCompressionError::NonFiniteInput { .. }
            | ImageCompressionError::EmptyMatrix { .. } => ErrorKind::Numeric,
            ImageCompressionError::Decode { .. }
            | ImageCompressionError::Encode { .. }
            | ImageCompressionError::Io { .. }
            | ImageCompressionError::UnsupportedFormat { .. } => ErrorKind::File,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImageCompressionError>;

pub trait RelDiff {
    type A: Scalar;

    /// Return the relative Frobenius norm difference of `first` and `second`.
    ///
    /// If `second` is the zero matrix the absolute difference is returned.
    fn rel_diff_fro(
        first: ArrayView2<Self::A>,
        second: ArrayView2<Self::A>,
    ) -> Result<<<Self as RelDiff>::A as Scalar>::Real>;
}

macro_rules! rel_diff_impl {
    ($scalar:ty) => {
        impl RelDiff for $scalar {
            type A = $scalar;
            fn rel_diff_fro(
                first: ArrayView2<Self::A>,
                second: ArrayView2<Self::A>,
            ) -> Result<<<Self as RelDiff>::A as Scalar>::Real> {
                let diff = first.to_owned() - &second;
                let diff_norm = diff.opnorm_fro()?;
                let second_norm = second.opnorm_fro()?;
                if second_norm.is_zero() {
                    Ok(diff_norm)
                } else {
                    Ok(diff_norm / second_norm)
                }
            }
        }
    };
}

rel_diff_impl!(f32);
rel_diff_impl!(f64);
