use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::captions::{
    associate_captions, classify_captions, load_split_listings, FrequencyCounter,
};
use crate::config::Args;
use crate::error::{Error, Result};
use crate::io::{save_vocabulary, write_caption_file};
use crate::resize::resize_images_in_parallel;
use crate::tokenizer::WordTokenizer;
use crate::types::{OutputDirs, ProcessingStats, Split, SplitCounts, SplitData};
use crate::utils::{create_progress_bar, list_file_names, read_caption_document};
use crate::vocabulary::Vocabulary;

/// Split a sorted listing into contiguous train, val and test slices.
///
/// Slices are taken in that order from the start of the listing. When the
/// listing is shorter than the requested total, later slices come out short
/// or empty.
pub fn split_images<T: Clone>(items: &[T], counts: &SplitCounts) -> SplitData<Vec<T>> {
    let mut rest = items;
    let mut take = |n: usize| {
        let (head, tail) = rest.split_at(n.min(rest.len()));
        rest = tail;
        head.to_vec()
    };

    let train = take(counts.train);
    let val = take(counts.val);
    let test = take(counts.test);
    SplitData { train, val, test }
}

/// Partition the raw image directory into per-split absolute source paths.
/// Membership depends only on the sorted file names and `counts`.
pub fn partition_image_dir(
    image_dir: &Path,
    counts: &SplitCounts,
) -> Result<(usize, SplitData<Vec<PathBuf>>)> {
    if !image_dir.is_dir() {
        return Err(Error::MissingInput(image_dir.to_path_buf()));
    }
    let image_dir = fs::canonicalize(image_dir)?;

    let file_names = list_file_names(&image_dir)?;
    info!("Found {} raw images in {}", file_names.len(), image_dir.display());

    let requested = counts.train + counts.val + counts.test;
    if file_names.len() < requested {
        warn!(
            "Only {} raw images for {} requested, later splits will be short",
            file_names.len(),
            requested
        );
    }

    let split = split_images(&file_names, counts);
    let to_paths = |names: &[String]| -> Vec<PathBuf> {
        names.iter().map(|name| image_dir.join(name)).collect()
    };
    let paths = SplitData {
        train: to_paths(&split.train),
        val: to_paths(&split.val),
        test: to_paths(&split.test),
    };
    Ok((file_names.len(), paths))
}

/// Main dataset processing pipeline
pub fn process_dataset(output_dirs: &OutputDirs, args: &Args) -> Result<ProcessingStats> {
    let mut stats = ProcessingStats::new();

    let (images_listed, partition) = partition_image_dir(&args.image_dir, &args.split_counts())?;
    stats.images_listed = images_listed;

    // Splits are resized one after another; each call returns only after its
    // pool has drained, so every directory is complete before it is listed.
    for split in Split::ALL {
        let image_paths = partition.get(split);
        if image_paths.is_empty() {
            info!("{}: no images assigned", split.label());
            continue;
        }

        let pb = create_progress_bar(image_paths.len() as u64, split.label());
        let report = resize_images_in_parallel(
            image_paths,
            &output_dirs.splits.get(split).images_dir,
            args.image_size(),
            args.workers,
            &pb,
        )?;
        pb.finish_with_message(format!("{} resizing complete", split.label()));

        stats.images_resized += report.resized;
        stats.resize_failures += report.failures.len();
        if !report.failures.is_empty() {
            warn!(
                "{}: {} of {} images failed to resize",
                split.label(),
                report.failures.len(),
                report.total()
            );
        }
    }

    info!("Reading captions from {}", args.caption_json.display());
    let document = read_caption_document(&args.caption_json)?;
    info!(
        "Caption document: {} images, {} annotations",
        document.images.len(),
        document.annotations.len()
    );
    let index = associate_captions(document);

    let image_dirs = SplitData {
        train: output_dirs.splits.train.images_dir.as_path(),
        val: output_dirs.splits.val.images_dir.as_path(),
        test: output_dirs.splits.test.images_dir.as_path(),
    };
    let listings = load_split_listings(&image_dirs)?;

    let mut counter = FrequencyCounter::new();
    let classified = classify_captions(&index, &listings, &WordTokenizer::new(), &mut counter);
    stats.images_classified = classified.images_classified;
    stats.images_excluded = classified.images_excluded;

    for (split, lines) in classified.lines.iter() {
        let path = &output_dirs.splits.get(split).captions_path;
        write_caption_file(path, lines)?;
        *stats.caption_lines.get_mut(split) = lines.len();
        info!("Wrote {} caption lines to {}", lines.len(), path.display());
    }

    info!(
        "Building vocabulary from {} distinct words (threshold {})",
        counter.len(),
        args.word_threshold
    );
    let vocab = Vocabulary::build(counter, args.word_threshold);
    stats.vocabulary_size = vocab.len();

    save_vocabulary(&output_dirs.vocab_path, &vocab, args.word_threshold)?;
    info!(
        "Saved vocabulary of {} words to {}",
        vocab.len(),
        output_dirs.vocab_path.display()
    );

    Ok(stats)
}
