use std::path::PathBuf;

use clap::Parser;
use image::Rgba;
use pixcache::{CacheConfig, ImageContext, Pixmap, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Render every cached variant of an image file
#[derive(Parser)]
#[command(name = "pixcache", about = "Render derived pixmaps of an image through the cache")]
struct Cli {
    /// Image file to load
    input: PathBuf,

    /// Directory the rendered PNG files are written to
    #[arg(long, default_value = "pixcache-out")]
    out: PathBuf,

    /// JSON settings file; defaults are used when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target width in logical pixels (0 keeps the natural width)
    #[arg(long, default_value_t = 0)]
    width: i32,

    /// Target height in logical pixels (0 scales to width)
    #[arg(long, default_value_t = 0)]
    height: i32,

    /// Tint for the colored variants, as RRGGBBAA hex
    #[arg(long, default_value = "3060c080")]
    tint: String,

    /// Skip the local persistent cache
    #[arg(long)]
    no_storage: bool,
}

fn parse_tint(hex: &str) -> Option<Rgba<u8>> {
    if hex.len() != 8 {
        return None;
    }
    let value = u32::from_str_radix(hex, 16).ok()?;
    Some(Rgba(value.to_be_bytes()))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CacheConfig::load(path)?,
        None => CacheConfig::default(),
    };
    if cli.no_storage {
        config.storage_path = None;
    }
    let tint = parse_tint(&cli.tint).unwrap_or_else(|| {
        warn!("invalid tint {:?}, using opaque black", cli.tint);
        Rgba([0, 0, 0, 255])
    });

    let mut context = ImageContext::new(config)?;
    let key = context.image_from_file(&cli.input, None);
    if context.is_null(key) {
        warn!("{} cannot be loaded", cli.input.display());
        return Ok(());
    }

    std::fs::create_dir_all(&cli.out)?;
    let (w, h) = (cli.width, cli.height);
    let outer_w = if w > 0 { w + w / 4 } else { 0 };
    let outer_h = if h > 0 { h + h / 4 } else { outer_w };

    let variants: Vec<(&str, Pixmap)> = {
        let Some(mut image) = context.image(key) else {
            return Ok(());
        };
        let rendered = vec![
            ("plain", image.pix(w, h)),
            ("rounded", image.pix_rounded(w, h)),
            ("blurred", image.pix_blurred(w, h)),
            ("colored", image.pix_colored(tint, w, h)),
            ("blurred_colored", image.pix_blurred_colored(tint, w, h)),
            ("single", image.pix_single(w, h, outer_w, outer_h)),
            ("blurred_single", image.pix_blurred_single(w, h, outer_w, outer_h)),
        ];
        info!(
            "{} is {}x{} ({:?})",
            cli.input.display(),
            image.width(),
            image.height(),
            image.entity().format()
        );
        rendered
    };

    for (name, pix) in &variants {
        let path = cli.out.join(format!("{name}.png"));
        pix.save(&path)?;
        info!("wrote {} ({}x{})", path.display(), pix.width(), pix.height());
    }
    drop(variants);

    info!("acquired {} bytes", context.acquired_size());
    context.forget_all();
    info!("acquired {} bytes after forgetting", context.acquired_size());
    Ok(())
}
