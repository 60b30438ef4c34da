use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One of the three dataset partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    /// All splits in classification priority order
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    /// Directory name used for this split under the output root
    pub fn dir_name(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }

    /// Label shown on progress bars and in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Split::Train => "Train",
            Split::Val => "Val",
            Split::Test => "Test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

// One value per split
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SplitData<T> {
    pub train: T,
    pub val: T,
    pub test: T,
}

impl<T> SplitData<T> {
    pub fn get(&self, split: Split) -> &T {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    pub fn get_mut(&mut self, split: Split) -> &mut T {
        match split {
            Split::Train => &mut self.train,
            Split::Val => &mut self.val,
            Split::Test => &mut self.test,
        }
    }

    /// Iterate `(split, value)` pairs in priority order
    pub fn iter(&self) -> impl Iterator<Item = (Split, &T)> {
        Split::ALL.into_iter().map(move |split| (split, self.get(split)))
    }
}

/// Requested number of images per split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitCounts {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitCounts {
    pub fn get(&self, split: Split) -> usize {
        match split {
            Split::Train => self.train,
            Split::Val => self.val,
            Split::Test => self.test,
        }
    }
}

/// Target size of resized images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

// Entry of the `images` list of the caption document
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub id: u64,
    pub file_name: String,
}

// Entry of the `annotations` list of the caption document
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    pub image_id: u64,
    pub caption: String,
}

/// COCO caption annotation document. Fields other than `images` and
/// `annotations` (info, licenses, ...) are ignored.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CaptionDocument {
    pub images: Vec<ImageRecord>,
    pub annotations: Vec<AnnotationRecord>,
}

/// A caption attached to an image, normalised to a single line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionRecord {
    pub image_id: u64,
    pub text: String,
}

impl CaptionRecord {
    pub fn new(image_id: u64, raw: &str) -> Self {
        Self {
            image_id,
            text: crate::utils::normalize_caption(raw),
        }
    }
}

// Output locations of a single split
#[derive(Debug, Clone)]
pub struct SplitPaths {
    pub images_dir: PathBuf,
    pub captions_path: PathBuf,
}

// Struct to hold the output locations of the whole dataset
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub splits: SplitData<SplitPaths>,
    pub vocab_path: PathBuf,
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub images_listed: usize,
    pub images_resized: usize,
    pub resize_failures: usize,
    pub images_classified: usize,
    pub images_excluded: usize,
    pub caption_lines: SplitData<usize>,
    pub vocabulary_size: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Raw images listed: {}", self.images_listed);
        log::info!("Images resized: {}", self.images_resized);
        log::info!("Images classified into a split: {}", self.images_classified);
        for (split, lines) in self.caption_lines.iter() {
            log::info!("Caption lines ({}): {}", split, lines);
        }
        log::info!("Vocabulary size: {}", self.vocabulary_size);

        if self.images_excluded > 0 {
            log::info!(
                "Images outside every split directory (not captioned): {}",
                self.images_excluded
            );
        }
        if self.resize_failures > 0 {
            log::warn!("Images skipped after resize failure: {}", self.resize_failures);
        }
    }
}
