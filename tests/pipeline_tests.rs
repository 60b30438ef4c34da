use std::fs;
use std::path::{Path, PathBuf};

use caption_prep::vocabulary::UNK_INDEX;
use caption_prep::{load_vocabulary, process_dataset, setup_output_directories, Args, Error};
use image::{GenericImageView, Rgb, RgbImage};
use tempfile::TempDir;

struct Fixture {
    _root: TempDir,
    image_dir: PathBuf,
    caption_json: PathBuf,
    output_dir: PathBuf,
}

const CAPTIONS: &str = r#"{
    "info": {"description": "test captions"},
    "images": [
        {"id": 1, "file_name": "a.png"},
        {"id": 2, "file_name": "b.png"},
        {"id": 3, "file_name": "c.png"},
        {"id": 4, "file_name": "d.png"},
        {"id": 5, "file_name": "e.png"},
        {"id": 6, "file_name": "f.png"}
    ],
    "annotations": [
        {"id": 10, "image_id": 1, "caption": "A dog runs.\nfast"},
        {"id": 11, "image_id": 3, "caption": "A dog in the rain"},
        {"id": 12, "image_id": 1, "caption": " A brown dog. "},
        {"id": 13, "image_id": 2, "caption": "A cat, sitting"},
        {"id": 14, "image_id": 4, "caption": "The dog sleeps."},
        {"id": 15, "image_id": 5, "caption": "A cat eats."},
        {"id": 16, "image_id": 6, "caption": "A dog dog dog"}
    ]
}"#;

fn write_image(path: &Path, width: u32, height: u32) {
    RgbImage::from_pixel(width, height, Rgb([30, 120, 200]))
        .save(path)
        .unwrap();
}

/// Raw directory with five images, `c.png` being unreadable
fn fixture() -> Fixture {
    let root = tempfile::tempdir().unwrap();
    let image_dir = root.path().join("raw");
    fs::create_dir(&image_dir).unwrap();
    write_image(&image_dir.join("a.png"), 40, 30);
    write_image(&image_dir.join("b.png"), 12, 90);
    fs::write(image_dir.join("c.png"), b"garbage").unwrap();
    write_image(&image_dir.join("d.png"), 8, 6);
    write_image(&image_dir.join("e.png"), 100, 100);

    let caption_json = root.path().join("captions.json");
    fs::write(&caption_json, CAPTIONS).unwrap();

    let output_dir = root.path().join("dataset");
    Fixture {
        image_dir,
        caption_json,
        output_dir,
        _root: root,
    }
}

fn args(fixture: &Fixture) -> Args {
    Args {
        image_dir: fixture.image_dir.clone(),
        caption_json: fixture.caption_json.clone(),
        output_dir: fixture.output_dir.clone(),
        num_train: 2,
        num_val: 2,
        num_test: 1,
        word_threshold: 2,
        width: 8,
        height: 6,
        workers: 2,
    }
}

fn dir_listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_full_pipeline() {
    let fixture = fixture();
    let args = args(&fixture);
    let output_dirs = setup_output_directories(&args.output_dir).unwrap();

    let stats = process_dataset(&output_dirs, &args).unwrap();

    // partition + resize
    assert_eq!(dir_listing(&output_dirs.splits.train.images_dir), vec!["a.png", "b.png"]);
    assert_eq!(dir_listing(&output_dirs.splits.val.images_dir), vec!["d.png"]);
    assert_eq!(dir_listing(&output_dirs.splits.test.images_dir), vec!["e.png"]);
    for (_, paths) in output_dirs.splits.iter() {
        for name in dir_listing(&paths.images_dir) {
            let resized = image::open(paths.images_dir.join(name)).unwrap();
            assert_eq!(resized.dimensions(), (8, 6));
        }
    }

    // caption files
    let read = |path: &Path| fs::read_to_string(path).unwrap();
    assert_eq!(
        read(&output_dirs.splits.train.captions_path),
        "a.png,A dog runs. fast\na.png,A brown dog.\nb.png,A cat, sitting\n"
    );
    assert_eq!(read(&output_dirs.splits.val.captions_path), "d.png,The dog sleeps.\n");
    assert_eq!(read(&output_dirs.splits.test.captions_path), "e.png,A cat eats.\n");

    // vocabulary
    let vocab = load_vocabulary(&output_dirs.vocab_path).unwrap().words;
    assert_eq!(
        vocab.words().collect::<Vec<_>>(),
        vec!["<pad>", "<start>", "<end>", "<unk>", "a", "dog", ".", "cat"]
    );
    assert_eq!(vocab.lookup("cat"), 7);
    assert_eq!(vocab.lookup("sleeps"), UNK_INDEX);
    assert_eq!(vocab.lookup("rain"), UNK_INDEX);

    // failures and exclusions are reported apart
    assert_eq!(stats.images_listed, 5);
    assert_eq!(stats.images_resized, 4);
    assert_eq!(stats.resize_failures, 1);
    assert_eq!(stats.images_classified, 4);
    assert_eq!(stats.images_excluded, 2);
    assert_eq!(stats.caption_lines.train, 3);
    assert_eq!(stats.vocabulary_size, 8);
}

#[test]
fn test_rerun_overwrites_outputs() {
    let fixture = fixture();
    let args = args(&fixture);
    let output_dirs = setup_output_directories(&args.output_dir).unwrap();

    process_dataset(&output_dirs, &args).unwrap();
    let first = fs::read_to_string(&output_dirs.splits.train.captions_path).unwrap();
    let first_vocab = load_vocabulary(&output_dirs.vocab_path).unwrap().words;

    let output_dirs = setup_output_directories(&args.output_dir).unwrap();
    process_dataset(&output_dirs, &args).unwrap();
    let second = fs::read_to_string(&output_dirs.splits.train.captions_path).unwrap();
    let second_vocab = load_vocabulary(&output_dirs.vocab_path).unwrap().words;

    assert_eq!(first, second);
    assert_eq!(first_vocab, second_vocab);
}

#[test]
fn test_leftover_files_in_split_dirs_are_classified() {
    let fixture = fixture();
    let args = args(&fixture);
    let output_dirs = setup_output_directories(&args.output_dir).unwrap();
    // left behind by an earlier run with other counts
    write_image(&output_dirs.splits.test.images_dir.join("f.png"), 8, 6);

    let stats = process_dataset(&output_dirs, &args).unwrap();

    let test_captions = fs::read_to_string(&output_dirs.splits.test.captions_path).unwrap();
    assert_eq!(test_captions, "e.png,A cat eats.\nf.png,A dog dog dog\n");
    assert_eq!(stats.images_excluded, 1);
}

#[test]
fn test_missing_image_dir_is_fatal() {
    let fixture = fixture();
    let mut args = args(&fixture);
    args.image_dir = fixture.image_dir.join("does-not-exist");
    let output_dirs = setup_output_directories(&args.output_dir).unwrap();

    let result = process_dataset(&output_dirs, &args);

    assert!(matches!(result, Err(Error::MissingInput(_))));
    assert!(!output_dirs.vocab_path.exists());
}

#[test]
fn test_malformed_caption_document_is_fatal() {
    let fixture = fixture();
    fs::write(&fixture.caption_json, "{\"images\": [}").unwrap();
    let args = args(&fixture);
    let output_dirs = setup_output_directories(&args.output_dir).unwrap();

    let result = process_dataset(&output_dirs, &args);

    assert!(matches!(result, Err(Error::ParseDocument { .. })));
    // resized images from the earlier stage stay on disk
    assert_eq!(dir_listing(&output_dirs.splits.train.images_dir), vec!["a.png", "b.png"]);
    assert!(!output_dirs.splits.train.captions_path.exists());
    assert!(!output_dirs.vocab_path.exists());
}
