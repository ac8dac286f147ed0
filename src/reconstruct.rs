//! Rank k reconstruction of a single channel matrix.
//!
//! A channel is decomposed as $A = U\Sigma V^T$ and rebuilt from the leading
//! $k$ singular triplets, $A_k = U_k\Sigma_k V_k^T$. The rank is clamped into
//! $[1, \min(m, n)]$ without notifying the caller.

use crate::svd::{clamp_rank, SVDTraits, SVD};
use crate::types::{ImageCompressionError, Lapack, Result, Scalar};
use ndarray::{Array2, ArrayView2};
use tracing::debug;

pub trait ReconstructChannel
where
    Self: Scalar + Lapack,
{
    /// Return the rank `k` approximation of `channel`.
    ///
    /// Fails if `channel` has a zero dimension, contains a non-finite entry,
    /// or if the SVD does not converge.
    fn reconstruct(channel: ArrayView2<Self>, k: usize) -> Result<Array2<Self>>;
}

/// Return the rank `k` approximation of `channel`.
pub fn reconstruct_channel<A: ReconstructChannel>(
    channel: ArrayView2<A>,
    k: usize,
) -> Result<Array2<A>> {
    A::reconstruct(channel, k)
}

macro_rules! reconstruct_channel_impl {
    ($scalar:ty) => {
        impl ReconstructChannel for $scalar {
            fn reconstruct(channel: ArrayView2<Self>, k: usize) -> Result<Array2<Self>> {
                let (rows, cols) = channel.dim();
                if rows == 0 || cols == 0 {
                    return Err(ImageCompressionError::EmptyMatrix { rows, cols });
                }

                if let Some(((row, col), _)) =
                    channel.indexed_iter().find(|(_, item)| !item.is_finite())
                {
                    return Err(ImageCompressionError::NonFiniteInput { row, col });
                }

                let svd = SVD::<$scalar>::compute_from(channel)?;
                let rank = clamp_rank(k, svd.rank());

                debug!(rows, cols, requested = k, effective = rank, "reconstructing channel");

                Ok(svd.compress_rank(rank).to_mat())
            }
        }
    };
}

reconstruct_channel_impl!(f32);
reconstruct_channel_impl!(f64);
