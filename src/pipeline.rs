//! Image level driver around the channel reconstruction.
//!
//! An image is decoded into one (grayscale) or three (RGB) `f32` channel planes.
//! Every plane is reconstructed with the same rank, clipped to `[0, 255]`,
//! truncated to `u8` and the planes are stacked back in their original order.
//! Images that are neither 8 bit grayscale nor 8 bit RGB are converted to RGB first.

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageBuffer, ImageFormat, Luma, Rgb, RgbImage};
use ndarray::{Array2, ArrayView2};
use tracing::{debug, info};

use crate::config::CompressionConfig;
use crate::ratio::estimate_storage_ratio;
use crate::reconstruct::reconstruct_channel;
use crate::svd::clamp_rank;
use crate::types::{ImageCompressionError, RelDiff, Result};

/// Pixel layout of the decoded and of the written image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    /// One 8 bit intensity channel
    Luma,
    /// Red, green and blue 8 bit channels
    Rgb,
}

impl ColorMode {
    pub fn channel_count(&self) -> usize {
        match self {
            ColorMode::Luma => 1,
            ColorMode::Rgb => 3,
        }
    }

    pub fn is_color(&self) -> bool {
        *self == ColorMode::Rgb
    }
}

/// Summary of a finished compression run.
#[derive(Clone, Debug)]
pub struct CompressionReport {
    /// Path the compressed image was written to
    pub output: PathBuf,
    pub width: usize,
    pub height: usize,
    pub mode: ColorMode,
    /// Rank passed by the caller
    pub requested_rank: usize,
    /// Rank actually used after clamping into `[1, min(height, width)]`
    pub effective_rank: usize,
    /// Relative Frobenius error of each reconstructed channel, in channel order
    pub relative_errors: Vec<f64>,
}

impl CompressionReport {
    /// Storage ratio of the rank actually used.
    pub fn storage_ratio(&self) -> f64 {
        estimate_storage_ratio(
            self.height,
            self.width,
            self.effective_rank,
            self.mode.is_color(),
        )
    }
}

fn plane_from_interleaved(
    raw: &[u8],
    dimension: (usize, usize),
    stride: usize,
    offset: usize,
) -> Array2<f32> {
    let width = dimension.1;
    Array2::from_shape_fn(dimension, |(row, col)| {
        raw[(row * width + col) * stride + offset] as f32
    })
}

fn rgb_channels(rgb: &RgbImage) -> Vec<Array2<f32>> {
    let dimension = (rgb.height() as usize, rgb.width() as usize);
    (0..3)
        .map(|offset| plane_from_interleaved(rgb.as_raw(), dimension, 3, offset))
        .collect()
}

/// Split an image into `f32` channel planes of shape (height, width).
///
/// Grayscale and RGB images keep their mode; any other layout is converted to RGB.
pub fn decode_channels(img: DynamicImage) -> (ColorMode, Vec<Array2<f32>>) {
    match img {
        DynamicImage::ImageLuma8(gray) => {
            let dimension = (gray.height() as usize, gray.width() as usize);
            (
                ColorMode::Luma,
                vec![plane_from_interleaved(gray.as_raw(), dimension, 1, 0)],
            )
        }
        DynamicImage::ImageRgb8(rgb) => (ColorMode::Rgb, rgb_channels(&rgb)),
        other => {
            debug!(color = ?other.color(), "converting image to RGB");
            (ColorMode::Rgb, rgb_channels(&other.to_rgb8()))
        }
    }
}

/// Clip to `[0, 255]` and truncate toward zero. NaN maps to 0.
pub fn quantize_value(value: f32) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.max(0.0).min(255.0) as u8
    }
}

/// Quantize a reconstructed channel to 8 bit intensities.
pub fn quantize(channel: ArrayView2<f32>) -> Array2<u8> {
    channel.mapv(quantize_value)
}

/// Stack quantized planes back into an image of the given mode.
///
/// # Panics
///
/// If the number of planes does not match `mode` or the planes differ in shape.
pub(crate) fn encode_channels(mode: ColorMode, planes: &[Array2<u8>]) -> DynamicImage {
    assert_eq!(
        planes.len(),
        mode.channel_count(),
        "Expected one plane per channel."
    );
    let (height, width) = planes[0].dim();
    assert!(
        planes.iter().all(|plane| plane.dim() == (height, width)),
        "All planes must have the same shape."
    );

    let (width, height) = (width as u32, height as u32);
    match mode {
        ColorMode::Luma => {
            let gray: GrayImage = ImageBuffer::from_fn(width, height, |x, y| {
                Luma([planes[0][[y as usize, x as usize]]])
            });
            DynamicImage::ImageLuma8(gray)
        }
        ColorMode::Rgb => {
            let rgb: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
                let index = [y as usize, x as usize];
                Rgb([planes[0][index], planes[1][index], planes[2][index]])
            });
            DynamicImage::ImageRgb8(rgb)
        }
    }
}

fn partial_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!(".{}.partial", name))
}

/// Encode `img` next to `output` and move it into place, so that `output` is
/// either written completely or left untouched.
fn write_image(img: &DynamicImage, output: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(output).map_err(|_| ImageCompressionError::UnsupportedFormat {
            path: output.to_path_buf(),
        })?;

    let partial = partial_path(output);
    if let Err(source) = img.save_with_format(&partial, format) {
        let _ = fs::remove_file(&partial);
        return Err(ImageCompressionError::Encode {
            path: output.to_path_buf(),
            source,
        });
    }

    fs::rename(&partial, output).map_err(|source| {
        let _ = fs::remove_file(&partial);
        ImageCompressionError::Io {
            path: output.to_path_buf(),
            source,
        }
    })
}

/// Compress the image at `input` with rank `k` and write the result to `output`.
///
/// The output format follows the extension of `output`.
pub fn compress_image<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    k: usize,
) -> Result<CompressionReport> {
    let (input, output) = (input.as_ref(), output.as_ref());

    let img = image::open(input).map_err(|source| ImageCompressionError::Decode {
        path: input.to_path_buf(),
        source,
    })?;
    let (width, height) = (img.width() as usize, img.height() as usize);
    let (mode, channels) = decode_channels(img);

    debug!(
        path = %input.display(),
        width,
        height,
        ?mode,
        rank = k,
        "decoded image"
    );

    let mut planes = Vec::with_capacity(channels.len());
    let mut relative_errors = Vec::with_capacity(channels.len());
    for channel in channels.iter() {
        let reconstructed = reconstruct_channel(channel.view(), k)?;
        relative_errors.push(f32::rel_diff_fro(reconstructed.view(), channel.view())? as f64);
        planes.push(quantize(reconstructed.view()));
    }

    write_image(&encode_channels(mode, &planes), output)?;

    info!(path = %output.display(), "saved compressed image");
    println!("Saved compressed image to: {}", output.display());

    Ok(CompressionReport {
        output: output.to_path_buf(),
        width,
        height,
        mode,
        requested_rank: k,
        effective_rank: clamp_rank(k, std::cmp::min(width, height)),
        relative_errors,
    })
}

/// Compress as configured and report the estimated storage ratio.
///
/// The ratio is computed from the configured rank, not the clamped one.
pub fn run(config: &CompressionConfig) -> Result<CompressionReport> {
    let report = compress_image(&config.input, &config.output, config.rank)?;

    let ratio = estimate_storage_ratio(
        report.height,
        report.width,
        config.rank,
        report.mode.is_color(),
    );
    info!(
        ratio,
        effective_rank = report.effective_rank,
        errors = ?report.relative_errors,
        "compression finished"
    );
    println!(
        "Approx. stored numbers ratio (compressed/original): {:.3}",
        ratio
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{LumaA, Rgba, RgbaImage};
    use ndarray::arr2;

    #[test]
    fn test_quantize_clips_and_truncates() {
        let values = [-5.0, -0.5, 0.0, 12.7, 99.999, 254.9, 255.0, 255.5, 300.0, f32::NAN];
        let expected = [0u8, 0, 0, 12, 99, 254, 255, 255, 255, 0];

        for (&value, &expected) in values.iter().zip(expected.iter()) {
            assert_eq!(quantize_value(value), expected, "value {}", value);
        }
    }

    #[test]
    fn test_quantize_keeps_shape() {
        let channel = arr2(&[[-1.0f32, 128.4], [256.0, 3.9], [17.0, 0.2]]);
        assert_eq!(quantize(channel.view()), arr2(&[[0u8, 128], [255, 3], [17, 0]]));
    }

    #[test]
    fn test_decode_grayscale() {
        let gray = GrayImage::from_fn(3, 2, |x, y| Luma([(10 * y + x) as u8]));
        let (mode, channels) = decode_channels(DynamicImage::ImageLuma8(gray));

        assert_eq!(mode, ColorMode::Luma);
        assert_eq!(channels.len(), 1);
        assert_eq!(
            channels[0],
            arr2(&[[0.0f32, 1.0, 2.0], [10.0, 11.0, 12.0]])
        );
    }

    #[test]
    fn test_decode_rgb_keeps_channel_order() {
        let rgb = RgbImage::from_fn(2, 3, |x, y| Rgb([x as u8, y as u8, 200]));
        let (mode, channels) = decode_channels(DynamicImage::ImageRgb8(rgb));

        assert_eq!(mode, ColorMode::Rgb);
        assert_eq!(channels.len(), 3);
        for channel in channels.iter() {
            assert_eq!(channel.dim(), (3, 2));
        }
        assert_eq!(channels[0][[2, 1]], 1.0);
        assert_eq!(channels[1][[2, 1]], 2.0);
        assert_eq!(channels[2][[2, 1]], 200.0);
    }

    #[test]
    fn test_decode_converts_other_modes_to_rgb() {
        let rgba = RgbaImage::from_fn(2, 2, |_, _| Rgba([30, 60, 90, 128]));
        let (mode, channels) = decode_channels(DynamicImage::ImageRgba8(rgba));
        assert_eq!(mode, ColorMode::Rgb);
        assert_eq!(channels[0][[0, 0]], 30.0);
        assert_eq!(channels[1][[1, 1]], 60.0);
        assert_eq!(channels[2][[0, 1]], 90.0);

        let luma_alpha = ImageBuffer::from_fn(2, 2, |_, _| LumaA([77u8, 10]));
        let (mode, channels) = decode_channels(DynamicImage::ImageLumaA8(luma_alpha));
        assert_eq!(mode, ColorMode::Rgb);
        assert_eq!(channels.len(), 3);
        assert!(channels.iter().all(|channel| channel[[1, 0]] == 77.0));
    }

    #[test]
    fn test_encode_channels_round_trips_planes() {
        let red = arr2(&[[1u8, 2], [3, 4]]);
        let green = arr2(&[[5u8, 6], [7, 8]]);
        let blue = arr2(&[[9u8, 10], [11, 12]]);

        let img = encode_channels(ColorMode::Rgb, &[red.clone(), green, blue]).to_rgb8();
        assert_eq!(img.get_pixel(1, 0), &Rgb([2, 6, 10]));
        assert_eq!(img.get_pixel(0, 1), &Rgb([3, 7, 11]));

        let img = encode_channels(ColorMode::Luma, &[red]);
        assert_eq!(img.as_luma8().unwrap().get_pixel(1, 1), &Luma([4]));
    }

    #[test]
    #[should_panic]
    fn test_encode_channels_rejects_wrong_plane_count() {
        let plane = Array2::<u8>::zeros((2, 2));
        encode_channels(ColorMode::Rgb, &[plane]);
    }

    #[test]
    fn test_partial_path_is_a_hidden_sibling() {
        assert_eq!(
            partial_path(Path::new("out/compressed.png")),
            PathBuf::from("out/.compressed.png.partial")
        );
    }

    #[test]
    fn test_report_storage_ratio_uses_effective_rank() {
        let report = CompressionReport {
            output: PathBuf::from("compressed.png"),
            width: 100,
            height: 100,
            mode: ColorMode::Luma,
            requested_rank: 10,
            effective_rank: 10,
            relative_errors: vec![0.0],
        };
        assert!((report.storage_ratio() - 0.201).abs() < 1E-12);
    }
}
