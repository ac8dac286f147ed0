//! Lossy image compression by rank k singular value decomposition.
//!
//! Every channel of an image is treated as a dense matrix and replaced by its best
//! rank k approximation $U_k\Sigma_k V_k^T$. The result is clipped, quantized to
//! 8 bit and written back as a full resolution image.
//!
//! ```no_run
//! use rusty_image_compression::*;
//!
//! let config = CompressionConfig::new("input.jpg", "compressed.png", 50);
//! let report = run(&config).unwrap();
//! println!("Storage ratio at the rank used: {:.3}", report.storage_ratio());
//! ```

pub mod config;
pub mod pipeline;
pub mod ratio;
pub mod reconstruct;
pub mod svd;
pub mod types;

#[cfg(test)]
pub(crate) mod random_matrix;

pub use config::CompressionConfig;
pub use pipeline::{
    compress_image, decode_channels, quantize, run, ColorMode, CompressionReport,
};
pub use ratio::estimate_storage_ratio;
pub use reconstruct::{reconstruct_channel, ReconstructChannel};
pub use svd::{clamp_rank, SVDTraits, SVD};
pub use types::{ErrorKind, ImageCompressionError, RelDiff, Result};
