//! Thin singular value decompositions and their rank k truncations.
//!
//! The thin SVD of a matrix $A\in\mathbb{R}^{m\times n}$ is $A = U\Sigma V^T$ with
//! $U\in\mathbb{R}^{m\times r}$ and $V^T\in\mathbb{R}^{r\times n}$ having orthonormal
//! columns and rows respectively, $r=\min(m, n)$, and $\Sigma$ a diagonal matrix
//! holding the singular values $\sigma_1\geq\sigma_2\geq\dots\geq\sigma_r\geq 0$.
//! Keeping only the first $k$ columns of $U$, singular values and rows of $V^T$ gives
//! the best rank $k$ approximation of $A$ in the Frobenius norm.

use crate::types::{ImageCompressionError, Result, Scalar};
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use ndarray_linalg::{JobSvd, SVDDCInto};

pub struct SVD<A: Scalar> {
    /// The U matrix
    pub u: Array2<A>,
    /// The array of singular values
    pub s: Array1<A::Real>,
    /// The vt matrix
    pub vt: Array2<A>,
}

/// Clamp a requested rank into `[1, max_rank]`.
///
/// For `max_rank == 0` the result is 1; callers must reject empty matrices first.
pub fn clamp_rank(rank: usize, max_rank: usize) -> usize {
    std::cmp::max(1, std::cmp::min(rank, max_rank))
}

pub trait SVDTraits {
    type A: Scalar;

    /// Number of rows
    fn nrows(&self) -> usize {
        self.get_u().nrows()
    }

    /// Number of columns
    fn ncols(&self) -> usize {
        self.get_vt().ncols()
    }

    /// Number of singular triplets held by the decomposition
    fn rank(&self) -> usize {
        self.get_s().len()
    }

    /// Convert the SVD back to a matrix
    fn to_mat(&self) -> Array2<Self::A> {
        let mut scaled_vt = self.get_vt().to_owned();

        Zip::from(scaled_vt.axis_iter_mut(Axis(0)))
            .and(self.get_s())
            .for_each(|mut row, &s_elem| {
                row.map_inplace(|item| *item *= <Self::A as Scalar>::from_real(s_elem))
            });

        self.get_u().dot(&scaled_vt)
    }

    /// Compress by giving a target rank. The rank is clamped into `[1, self.rank()]`.
    fn compress_rank(&self, max_rank: usize) -> SVD<Self::A> {
        let max_rank = clamp_rank(max_rank, self.rank());

        SVD {
            u: self.get_u().slice(s![.., 0..max_rank]).into_owned(),
            s: self.get_s().slice(s![0..max_rank]).into_owned(),
            vt: self.get_vt().slice(s![0..max_rank, ..]).into_owned(),
        }
    }

    /// Compute the thin SVD of a given array
    fn compute_from(arr: ArrayView2<Self::A>) -> Result<SVD<Self::A>>;

    /// Return the U matrix
    fn get_u(&self) -> ArrayView2<Self::A>;

    /// Return the singular values
    fn get_s(&self) -> ArrayView1<<Self::A as Scalar>::Real>;

    /// Return the Vt matrix
    fn get_vt(&self) -> ArrayView2<Self::A>;
}

macro_rules! svd_impl {
    ($scalar:ty) => {
        impl SVDTraits for SVD<$scalar> {
            type A = $scalar;

            fn compute_from(arr: ArrayView2<Self::A>) -> Result<SVD<Self::A>> {
                let (u, s, vt) = arr.to_owned().svddc_into(JobSvd::Some)?;

                match (u, vt) {
                    (Some(u), Some(vt)) => Ok(SVD { u, s, vt }),
                    _ => Err(ImageCompressionError::MissingSingularVectors),
                }
            }

            fn get_u(&self) -> ArrayView2<Self::A> {
                self.u.view()
            }

            fn get_s(&self) -> ArrayView1<<Self::A as Scalar>::Real> {
                self.s.view()
            }

            fn get_vt(&self) -> ArrayView2<Self::A> {
                self.vt.view()
            }
        }
    };
}

svd_impl!(f32);
svd_impl!(f64);
