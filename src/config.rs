//! Parameters of a single compression run.

use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressionConfig {
    /// Image to read
    pub input: PathBuf,
    /// Image to write. Its extension selects the output format.
    pub output: PathBuf,
    /// Number of singular triplets kept per channel
    pub rank: usize,
}

impl CompressionConfig {
    pub const DEFAULT_INPUT: &'static str = "input.jpg";
    pub const DEFAULT_OUTPUT: &'static str = "compressed.png";
    pub const DEFAULT_RANK: usize = 50;

    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input: P, output: Q, rank: usize) -> Self {
        CompressionConfig {
            input: input.into(),
            output: output.into(),
            rank,
        }
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        CompressionConfig::new(
            Self::DEFAULT_INPUT,
            Self::DEFAULT_OUTPUT,
            Self::DEFAULT_RANK,
        )
    }
}
