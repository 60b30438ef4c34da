use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::config::{CAPTIONS_FILE_NAME, IMAGES_DIR_NAME, VOCAB_FILE_NAME};
use crate::error::{Error, Result};
use crate::types::{OutputDirs, Split, SplitData, SplitPaths};
use crate::utils::create_output_directory;
use crate::vocabulary::{Vocabulary, VocabularyFile};

/// Set up the directory structure for the dataset output.
///
/// Creates `<output_dir>/<split>/images` for every split. Directories that
/// already exist are reused with their contents.
pub fn setup_output_directories(output_dir: &Path) -> std::io::Result<OutputDirs> {
    let make_split = |split: Split| -> std::io::Result<SplitPaths> {
        let split_dir = output_dir.join(split.dir_name());
        let images_dir = create_output_directory(&split_dir.join(IMAGES_DIR_NAME))?;
        Ok(SplitPaths {
            images_dir,
            captions_path: split_dir.join(CAPTIONS_FILE_NAME),
        })
    };

    let splits = SplitData {
        train: make_split(Split::Train)?,
        val: make_split(Split::Val)?,
        test: make_split(Split::Test)?,
    };

    Ok(OutputDirs {
        splits,
        vocab_path: output_dir.join(VOCAB_FILE_NAME),
    })
}

/// Write caption lines to `path`, replacing any previous file
pub fn write_caption_file(path: &Path, lines: &[String]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writer.write_all(line.as_bytes())?;
    }
    writer.flush()
}

/// Persist the vocabulary as JSON, replacing any previous file
pub fn save_vocabulary(path: &Path, vocab: &Vocabulary, min_word_count: usize) -> Result<()> {
    let file = VocabularyFile::new(vocab.clone(), min_word_count);
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &file)?;
    writer.flush()?;
    Ok(())
}

/// Vocabulary file as read from disk, before the word list is checked
#[derive(Debug, Deserialize)]
struct StoredVocabularyFile {
    version: String,
    date_created: String,
    min_word_count: usize,
    words: Vec<String>,
}

/// Load a vocabulary written by [`save_vocabulary`].
///
/// A word list that does not start with the reserved tokens or repeats a
/// word fails with [`Error::InvalidVocabulary`].
pub fn load_vocabulary(path: &Path) -> Result<VocabularyFile> {
    if !path.exists() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    let stored: StoredVocabularyFile = serde_json::from_reader(reader)?;
    Ok(VocabularyFile {
        version: stored.version,
        date_created: stored.date_created,
        min_word_count: stored.min_word_count,
        words: Vocabulary::from_words(stored.words)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_setup_output_directories_layout() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dirs = setup_output_directories(temp_dir.path()).unwrap();

        for (split, paths) in dirs.splits.iter() {
            let expected = temp_dir.path().join(split.dir_name());
            assert!(paths.images_dir.is_dir());
            assert_eq!(paths.images_dir, expected.join("images"));
            assert_eq!(paths.captions_path, expected.join("captions.txt"));
        }
        assert_eq!(dirs.vocab_path, temp_dir.path().join("vocab.json"));
    }

    #[test]
    fn test_write_caption_file_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("captions.txt");

        let old = vec!["a.jpg,old one\n".to_string(), "a.jpg,old two\n".to_string()];
        write_caption_file(&path, &old).unwrap();
        write_caption_file(&path, &["img001.jpg,A dog runs. extra\n".to_string()]).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "img001.jpg,A dog runs. extra\n"
        );
    }

    #[test]
    fn test_vocabulary_file_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("vocab.json");

        let mut vocab = Vocabulary::new();
        vocab.add_word("dog");
        vocab.add_word("runs");
        save_vocabulary(&path, &vocab, 4).unwrap();

        let loaded = load_vocabulary(&path).unwrap();
        assert_eq!(loaded.min_word_count, 4);
        assert_eq!(loaded.words, vocab);
        for word in vocab.words() {
            assert_eq!(loaded.words.index_of(word), vocab.index_of(word));
        }
    }

    fn write_vocab_json(path: &Path, words: &str) {
        let json = format!(
            r#"{{"version": "0.1.0", "date_created": "2024-01-01", "min_word_count": 4,
                "words": {}}}"#,
            words
        );
        fs::write(path, json).unwrap();
    }

    #[test]
    fn test_load_vocabulary_rejects_misplaced_reserved_tokens() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("vocab.json");
        write_vocab_json(&path, r#"["dog", "<pad>", "<start>", "<end>", "<unk>"]"#);

        assert!(matches!(
            load_vocabulary(&path),
            Err(Error::InvalidVocabulary(_))
        ));
    }

    #[test]
    fn test_load_vocabulary_rejects_duplicate_words() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("vocab.json");
        write_vocab_json(&path, r#"["<pad>", "<start>", "<end>", "<unk>", "dog", "dog"]"#);

        assert!(matches!(
            load_vocabulary(&path),
            Err(Error::InvalidVocabulary(_))
        ));
    }

    #[test]
    fn test_load_vocabulary_malformed_json_is_json_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("vocab.json");
        fs::write(&path, r#"{"version": "0.1.0", "words": ["#).unwrap();

        assert!(matches!(load_vocabulary(&path), Err(Error::Json(_))));
    }
}
