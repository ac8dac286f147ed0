//! Generation of random test matrices and pixel planes

use ndarray::Array2;
use ndarray_linalg::{JobSvd, Lapack, SVDDCInto, Scalar};
use num::traits::cast::cast;
use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};

pub trait RandomMatrix
where
    Self: Scalar + Lapack,
{
    /// Generate a random Gaussian matrix.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
    /// * `rng`: The random number generator to use.
    fn random_gaussian<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<Self> {
        let mut mat = Array2::<Self>::zeros(dimension);
        let normal = Normal::new(0.0, 1.0).unwrap();
        mat.map_inplace(|item| *item = cast::<f64, Self>(normal.sample(rng)).unwrap());
        mat
    }

    /// Generate a random pixel plane with entries uniformly distributed in `[0, 255)`.
    fn random_pixels<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<Self> {
        let mut mat = Array2::<Self>::zeros(dimension);
        let uniform = Uniform::new(0.0, 255.0);
        mat.map_inplace(|item| *item = cast::<f64, Self>(uniform.sample(rng)).unwrap());
        mat
    }

    /// Generate a random matrix with orthogonal rows or columns.
    ///
    /// If m > n then the returned matrix has orthogonal columns. If n > m
    /// the returned matrix has orthogonal rows.
    fn random_orthogonal_matrix<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<Self> {
        let (m, n) = if dimension.1 > dimension.0 {
            (dimension.1, dimension.0)
        } else {
            dimension
        };

        let (u, _, _) = Self::random_gaussian((m, n), rng)
            .svddc_into(JobSvd::Some)
            .expect("`random_orthogonal_matrix`: SVD computation failed.");
        let u = u.unwrap();

        if dimension.1 > dimension.0 {
            u.t().to_owned()
        } else {
            u
        }
    }

    /// Generate a random approximate low-rank matrix.
    ///
    /// This function generates a random approximate low-rank matrix
    /// with singular values logarithmically distributed between
    /// 'sigma_max` and `sigma_min`.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
    /// * `sigma_max`: Maximum singular value.
    /// * `sigma_min`: Minimum singular value.
    /// * `rng`: The random number generator to use.
    fn random_approximate_low_rank_matrix<R: Rng>(
        dimension: (usize, usize),
        sigma_max: f64,
        sigma_min: f64,
        rng: &mut R,
    ) -> Array2<Self> {
        use ndarray::Array;

        assert!(
            sigma_min < sigma_max,
            "`sigma_min` must be smaller than `sigma_max`"
        );
        assert!(sigma_min > 0.0, "`sigma_min` must be positive.");

        let min_dim = std::cmp::min(dimension.0, dimension.1);

        let u = Self::random_orthogonal_matrix((dimension.0, min_dim), rng);
        let vt = Self::random_orthogonal_matrix((min_dim, dimension.1), rng);
        let singvals = Array::geomspace(sigma_min, sigma_max, min_dim)
            .unwrap()
            .map(|&item| cast::<f64, Self>(item).unwrap());
        let sigma = Array2::from_diag(&singvals);
        u.dot(&sigma.dot(&vt))
    }
}

impl RandomMatrix for f64 {}

impl RandomMatrix for f32 {}
