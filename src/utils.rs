use indicatif::{ProgressBar, ProgressStyle};
use jwalk::WalkDir;
use log::debug;
use std::fs;
use std::io::BufReader;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::CaptionDocument;

/// Read and parse the caption annotation document.
///
/// The document is deserialised straight from a buffered file stream; the
/// COCO caption files are large enough that reading them into a `String`
/// first doubles peak memory.
pub fn read_caption_document(path: &Path) -> Result<CaptionDocument> {
    if !path.exists() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }

    let file = fs::File::open(path).map_err(|source| Error::ReadDocument {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| Error::ParseDocument {
        path: path.to_path_buf(),
        source,
    })
}

/// List the names of the files directly inside `dir`, sorted
/// lexicographically. Symlinks count when they resolve to a file.
/// Subdirectories are not descended into.
pub fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(Error::MissingInput(dir.to_path_buf()));
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(dir).skip_hidden(false).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        if !entry.path().is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => names.push(name.to_string()),
            None => debug!("Skipping non UTF-8 file name in {}", dir.display()),
        }
    }
    names.sort();
    Ok(names)
}

/// Collapse a caption to one logical line: surrounding whitespace is
/// stripped and every embedded newline becomes a single space.
pub fn normalize_caption(raw: &str) -> String {
    raw.trim().replace('\n', " ")
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .progress_chars("#>-"),
    );
    pb
}

/// Create an output directory if it is missing. Existing directories and
/// their contents are left as they are.
pub fn create_output_directory(path: &Path) -> std::io::Result<std::path::PathBuf> {
    if path.exists() {
        debug!("Directory {:?} already exists, keeping its contents.", path);
    }
    fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}

/// Build a dedicated thread pool with a fixed number of workers
pub fn create_io_thread_pool(workers: usize) -> Result<rayon::ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("resize-worker-{}", i))
        .build()?;
    Ok(pool)
}
