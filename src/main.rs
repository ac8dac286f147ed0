//! Command line driver.
//!
//! ```bash
//! rusty-image-compression --input photo.jpg --output photo_k20.png --rank 20
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use rusty_image_compression::{run, CompressionConfig};

#[derive(Parser, Debug)]
#[command(name = "rusty-image-compression")]
#[command(version)]
#[command(about = "Compress an image by rank k SVD approximation of its channels", long_about = None)]
struct Args {
    /// Image to compress
    #[arg(short, long, default_value = CompressionConfig::DEFAULT_INPUT)]
    input: PathBuf,

    /// Where to write the result. The extension selects the format.
    #[arg(short, long, default_value = CompressionConfig::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Number of singular values kept per channel
    #[arg(short = 'k', long, default_value_t = CompressionConfig::DEFAULT_RANK)]
    rank: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl From<Args> for CompressionConfig {
    fn from(args: Args) -> Self {
        CompressionConfig::new(args.input, args.output, args.rank)
    }
}

/// Unknown names fall back to the default `warn`.
fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let level = parse_level(&args.log_level);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    run(&CompressionConfig::from(args))?;

    Ok(())
}
