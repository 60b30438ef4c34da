use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::types::{ImageSize, SplitCounts};

pub const DEFAULT_IMAGE_DIR: &str = "./train2017";
pub const DEFAULT_CAPTION_JSON: &str = "./annotations/captions_train2017.json";
pub const DEFAULT_OUTPUT_DIR: &str = "./dataset";

pub const DEFAULT_NUM_TRAIN: usize = 32000;
pub const DEFAULT_NUM_VAL: usize = 4000;
pub const DEFAULT_NUM_TEST: usize = 2000;

pub const DEFAULT_WORD_THRESHOLD: usize = 4;
pub const DEFAULT_IMAGE_SIZE: u32 = 256;
pub const DEFAULT_WORKERS: usize = 4;

/// Layout below the output root
pub const IMAGES_DIR_NAME: &str = "images";
pub const CAPTIONS_FILE_NAME: &str = "captions.txt";
pub const VOCAB_FILE_NAME: &str = "vocab.json";

/// Command-line arguments for preparing an image-caption dataset.
///
/// Every flag defaults to the fixed pipeline configuration, so running the
/// binary with no arguments processes `./train2017` into `./dataset`.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Directory containing the raw images
    #[arg(long = "image_dir", default_value = DEFAULT_IMAGE_DIR)]
    pub image_dir: PathBuf,

    /// COCO-style caption annotation file
    #[arg(long = "caption_json", default_value = DEFAULT_CAPTION_JSON)]
    pub caption_json: PathBuf,

    /// Root directory for resized images, caption files and the vocabulary
    #[arg(long = "output_dir", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Number of images in the training split
    #[arg(long = "num_train", default_value_t = DEFAULT_NUM_TRAIN)]
    pub num_train: usize,

    /// Number of images in the validation split
    #[arg(long = "num_val", default_value_t = DEFAULT_NUM_VAL)]
    pub num_val: usize,

    /// Number of images in the test split
    #[arg(long = "num_test", default_value_t = DEFAULT_NUM_TEST)]
    pub num_test: usize,

    /// Minimum number of occurrences for a word to enter the vocabulary
    #[arg(long = "word_threshold", default_value_t = DEFAULT_WORD_THRESHOLD)]
    pub word_threshold: usize,

    /// Width of the resized images
    #[arg(long = "width", default_value_t = DEFAULT_IMAGE_SIZE, value_parser = validate_positive::<u32>)]
    pub width: u32,

    /// Height of the resized images
    #[arg(long = "height", default_value_t = DEFAULT_IMAGE_SIZE, value_parser = validate_positive::<u32>)]
    pub height: u32,

    /// Number of worker threads used for resizing
    #[arg(long = "workers", default_value_t = DEFAULT_WORKERS, value_parser = validate_positive::<usize>)]
    pub workers: usize,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            caption_json: PathBuf::from(DEFAULT_CAPTION_JSON),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            num_train: DEFAULT_NUM_TRAIN,
            num_val: DEFAULT_NUM_VAL,
            num_test: DEFAULT_NUM_TEST,
            word_threshold: DEFAULT_WORD_THRESHOLD,
            width: DEFAULT_IMAGE_SIZE,
            height: DEFAULT_IMAGE_SIZE,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl Args {
    pub fn split_counts(&self) -> SplitCounts {
        SplitCounts {
            train: self.num_train,
            val: self.num_val,
            test: self.num_test,
        }
    }

    pub fn image_size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }
}

// Accept only integers greater than zero
fn validate_positive<T>(s: &str) -> Result<T, String>
where
    T: FromStr + PartialOrd + Default,
{
    match T::from_str(s) {
        Ok(val) if val > T::default() => Ok(val),
        _ => Err("value must be an integer greater than 0".to_string()),
    }
}
