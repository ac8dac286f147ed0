//! Storage estimate of a rank k representation.
//!
//! A raw $h\times w$ image with $c$ channels stores $hwc$ numbers. The rank $k$
//! factors of one channel need $hk$ numbers for $U_k$, $k$ for the singular values
//! and $kw$ for $V_k^T$, so the compressed form stores $c(hk + k + kw)$ numbers.

/// Ratio of stored numbers, compressed over original.
///
/// The rank is used as given. Values above 1 mean the factors are larger than
/// the raw pixel grid.
pub fn estimate_storage_ratio(height: usize, width: usize, rank: usize, is_color: bool) -> f64 {
    let channels = if is_color { 3 } else { 1 };
    let original = height * width * channels;
    let compressed = channels * (height * rank + rank + rank * width);

    compressed as f64 / original as f64
}
