//! Image-caption dataset preparation
//!
//! This library partitions a directory of raw images into train/val/test
//! splits, resizes each split in parallel, writes per-split caption files
//! from a COCO caption document, and builds a frequency-filtered word
//! vocabulary for captioning models.

pub mod captions;
pub mod config;
pub mod dataset;
pub mod error;
pub mod io;
pub mod resize;
pub mod tokenizer;
pub mod types;
pub mod utils;
pub mod vocabulary;

// Re-export commonly used types and functions
pub use captions::{associate_captions, classify_captions, FrequencyCounter};
pub use config::Args;
pub use dataset::{process_dataset, split_images};
pub use error::{Error, Result};
pub use io::{load_vocabulary, save_vocabulary, setup_output_directories};
pub use tokenizer::{Tokenizer, WordTokenizer};
pub use types::{OutputDirs, ProcessingStats, Split, SplitData};
pub use vocabulary::Vocabulary;
