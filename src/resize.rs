use dashmap::DashMap;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use indicatif::ProgressBar;
use log::error;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering::Relaxed};

use crate::error::{Error, Result};
use crate::types::ImageSize;
use crate::utils::create_io_thread_pool;

/// Outcome of resizing one batch of images
#[derive(Debug, Default)]
pub struct ResizeReport {
    pub resized: usize,
    /// Source path -> error message for every image that was skipped
    pub failures: Vec<(PathBuf, String)>,
}

impl ResizeReport {
    pub fn total(&self) -> usize {
        self.resized + self.failures.len()
    }
}

/// Resize every image in `image_paths` into `output_dir` using a pool of
/// `workers` threads.
///
/// Returns once every task has finished. An image that cannot be read,
/// decoded or written is logged and recorded in the report; the remaining
/// images are still processed. Only failing to build the pool is an error.
pub fn resize_images_in_parallel(
    image_paths: &[PathBuf],
    output_dir: &Path,
    size: ImageSize,
    workers: usize,
    pb: &ProgressBar,
) -> Result<ResizeReport> {
    let thread_pool = create_io_thread_pool(workers)?;
    let resized = AtomicUsize::new(0);
    let failures: DashMap<PathBuf, String> = DashMap::new();

    thread_pool.install(|| {
        image_paths.par_iter().for_each(|image_path| {
            match resize_image(image_path, output_dir, size) {
                Ok(_) => {
                    resized.fetch_add(1, Relaxed);
                }
                Err(e) => {
                    error!("Failed to resize {}: {}", image_path.display(), e);
                    failures.insert(image_path.clone(), e.to_string());
                }
            }
            pb.inc(1);
        });
    });

    let mut failures: Vec<(PathBuf, String)> = failures.into_iter().collect();
    failures.sort();

    Ok(ResizeReport {
        resized: resized.into_inner(),
        failures,
    })
}

/// Resize a single image to exactly `size` (the aspect ratio is not kept)
/// and save it in `output_dir` under its original file name.
pub fn resize_image(image_path: &Path, output_dir: &Path, size: ImageSize) -> Result<PathBuf> {
    let file_name = image_path
        .file_name()
        .ok_or_else(|| Error::InvalidFileName(image_path.to_path_buf()))?;
    let output_path = output_dir.join(file_name);

    let image = ImageReader::open(image_path)?
        .with_guessed_format()?
        .decode()?;
    let resized = resize_exact(&image, size);
    let resized = if is_jpeg(&output_path) {
        // JPEG has no alpha channel
        DynamicImage::ImageRgb8(resized.to_rgb8())
    } else {
        resized
    };
    resized.save(&output_path)?;

    Ok(output_path)
}

/// Stretch `image` to exactly `size` with a Lanczos filter
pub fn resize_exact(image: &DynamicImage, size: ImageSize) -> DynamicImage {
    image.resize_exact(size.width, size.height, FilterType::Lanczos3)
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg"))
        .unwrap_or(false)
}
