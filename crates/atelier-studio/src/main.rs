//! Atelier studio: lays out a directory of images as a page and runs the
//! scroll-synchronized gallery over it.
//!
//! Drag or scroll to move, `H` toggles the fade, `Home` recenters, `Esc` quits.

mod app;
mod layout;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use winit::dpi::LogicalSize;

use atelier_engine::device::GpuInit;
use atelier_engine::logging::{LoggingConfig, init_logging};
use atelier_engine::paint::Color;
use atelier_engine::window::{Runtime, RuntimeConfig};
use atelier_gallery::prelude::*;

use app::StudioApp;
use layout::{LayoutKind, PageLayout};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

#[derive(Debug, Parser)]
#[command(name = "atelier-studio", version, about = "Scroll-synchronized GPU image gallery")]
struct Args {
    /// Directory of images to show.
    dir: PathBuf,

    /// Page arrangement.
    #[arg(long, value_enum, default_value_t = LayoutKind::Grid)]
    layout: LayoutKind,

    /// Per-frame scroll smoothing in (0, 1].
    #[arg(long, default_value_t = 0.1)]
    smoothing: f32,

    /// Wrap items around horizontally (infinite carousel). Locks vertical scroll.
    #[arg(long)]
    wrap: bool,

    /// Distance past the window edge (scene units) before an item wraps.
    #[arg(long, default_value_t = 0.0)]
    wrap_threshold: f32,

    /// Gap (px) between the last and the first item when wrapping.
    #[arg(long, default_value_t = 32.0)]
    wrap_gap: f32,

    /// Max per-item rotation in degrees; 0 disables the jitter.
    #[arg(long, default_value_t = 5.4)]
    jitter: f32,

    /// Seed for the rotation jitter.
    #[arg(long)]
    seed: Option<u64>,

    /// Fade duration in seconds.
    #[arg(long, default_value_t = 0.5)]
    fade: f32,

    /// Vertical field of view in degrees.
    #[arg(long, default_value_t = 45.0)]
    fov: f32,

    /// Background color as hex (`#rrggbb` or `#rrggbbaa`).
    #[arg(long, default_value = "#111114")]
    background: String,

    /// Log filter (`env_logger` syntax); falls back to RUST_LOG.
    #[arg(long)]
    log: Option<String>,
}

impl Args {
    fn gallery_config(&self) -> GalleryConfig {
        let axes = if self.wrap || self.layout == LayoutKind::Row {
            ScrollAxes::Horizontal
        } else {
            ScrollAxes::Both
        };

        let jitter = (self.jitter > 0.0).then(|| self.jitter.to_radians());
        let wrap = self.wrap.then(|| WrapPolicy::new(self.wrap_threshold, self.wrap_gap));

        let mut config = GalleryConfig::default()
            .smoothing(self.smoothing)
            .axes(axes)
            .rotation_jitter(jitter)
            .fade(FadeConfig::default().duration(self.fade))
            .wrap(wrap);
        if let Some(seed) = self.seed {
            config = config.seed(seed);
        }
        config
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(match &args.log {
        Some(filter) => LoggingConfig::with_filter(filter.clone()),
        None => LoggingConfig::default(),
    });

    let background = Color::from_hex(&args.background)
        .with_context(|| format!("invalid --background `{}`", args.background))?;

    let images = collect_images(&args.dir)?;
    log::info!("{} image(s) in {}", images.len(), args.dir.display());

    let elements: Vec<MediaElement> = images
        .iter()
        .enumerate()
        .map(|(i, path)| MediaElement::new(format!("media-{i}"), path.display().to_string()))
        .collect();

    let page = PageLayout::new(args.layout, elements.iter().map(|e| e.id.clone()));
    let loader = TextureLoader::with_default_workers(FileDecoder).context("failed to start decode workers")?;
    let gallery = GalleryGroup::new(elements, &loader, args.gallery_config());

    let app = StudioApp::new(loader, gallery, page, args.fov.to_radians(), background);

    let config = RuntimeConfig {
        title: "atelier studio".to_string(),
        initial_size: LogicalSize::new(1280.0, 800.0),
    };
    Runtime::run(config, GpuInit::default(), app)
}

/// Image files directly inside `dir`, sorted by name.
fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).with_context(|| format!("cannot read {}", dir.display()))?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry.with_context(|| format!("cannot list {}", dir.display()))?.path();
        let is_image = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
        if path.is_file() && is_image {
            images.push(path);
        }
    }
    images.sort();

    ensure!(!images.is_empty(), "no images found in {}", dir.display());
    Ok(images)
}
