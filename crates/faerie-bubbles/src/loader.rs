//! Background image decoding.
//!
//! A request decodes on its own thread and hands the pixels back over a
//! channel. The frame loop polls once per tick, so the texture is only ever
//! touched from the thread that owns the device.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{Context, Result};
use image::RgbaImage;

/// Decoded RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub source: PathBuf,
    pub pixels: RgbaImage,
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

#[derive(Debug)]
pub enum ImagePoll {
    Pending,
    Ready(LoadedImage),
    /// The load failed or was already delivered. Nothing more will arrive.
    Abandoned,
}

/// An in-flight image load.
pub struct ImageRequest {
    source: PathBuf,
    rx: Option<Receiver<LoadedImage>>,
}

impl ImageRequest {
    /// Starts decoding `url` on a worker thread.
    ///
    /// `url` is a filesystem path, optionally prefixed with `file://`.
    pub fn spawn(url: &str) -> Self {
        let source = resolve_url(url);
        let (tx, rx) = mpsc::sync_channel(1);

        let path = source.clone();
        let spawned = thread::Builder::new()
            .name("faerie-image-loader".into())
            .spawn(move || match load(&path) {
                Ok(image) => {
                    log::debug!(
                        "decoded {} ({}x{})",
                        path.display(),
                        image.width(),
                        image.height()
                    );
                    // The receiver may already be gone if the demo was torn down.
                    let _ = tx.send(image);
                }
                Err(e) => log::warn!("{e:#}; keeping placeholder texture"),
            });

        let rx = match spawned {
            Ok(_) => Some(rx),
            Err(e) => {
                log::warn!("cannot start image loader for {}: {e}", source.display());
                None
            }
        };

        Self { source, rx }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Non-blocking check for the decoded image.
    ///
    /// Returns `Ready` at most once.
    pub fn poll(&mut self) -> ImagePoll {
        let Some(rx) = self.rx.as_ref() else {
            return ImagePoll::Abandoned;
        };

        match rx.try_recv() {
            Ok(image) => {
                self.rx = None;
                ImagePoll::Ready(image)
            }
            Err(TryRecvError::Empty) => ImagePoll::Pending,
            Err(TryRecvError::Disconnected) => {
                self.rx = None;
                ImagePoll::Abandoned
            }
        }
    }
}

fn resolve_url(url: &str) -> PathBuf {
    PathBuf::from(url.strip_prefix("file://").unwrap_or(url))
}

/// Reads and decodes an image file into RGBA8.
pub fn load(path: &Path) -> Result<LoadedImage> {
    let decoded = image::ImageReader::open(path)
        .with_context(|| format!("failed to open image {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("failed to read image {}", path.display()))?
        .decode()
        .with_context(|| format!("failed to decode image {}", path.display()))?;

    Ok(LoadedImage {
        source: path.to_path_buf(),
        pixels: decoded.into_rgba8(),
    })
}
