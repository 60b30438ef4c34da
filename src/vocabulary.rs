use serde::{Deserialize, Serialize};
use indexmap::IndexSet;

use crate::captions::FrequencyCounter;
use crate::error::{Error, Result};

pub const PAD_TOKEN: &str = "<pad>";
pub const START_TOKEN: &str = "<start>";
pub const END_TOKEN: &str = "<end>";
pub const UNK_TOKEN: &str = "<unk>";

/// Reserved tokens, in index order
pub const RESERVED_TOKENS: [&str; 4] = [PAD_TOKEN, START_TOKEN, END_TOKEN, UNK_TOKEN];

pub const PAD_INDEX: usize = 0;
pub const START_INDEX: usize = 1;
pub const END_INDEX: usize = 2;
pub const UNK_INDEX: usize = 3;

/// Bidirectional word <-> index mapping.
///
/// Indices are dense and follow insertion order. The reserved tokens are
/// inserted on construction and always hold indices 0..=3. `add_word` is the
/// only mutator. Both lookup directions read the same ordered set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    words: IndexSet<String>,
}

impl Vocabulary {
    /// Create a vocabulary holding only the reserved tokens
    pub fn new() -> Self {
        let mut vocab = Self {
            words: IndexSet::with_capacity(RESERVED_TOKENS.len()),
        };
        for token in RESERVED_TOKENS {
            vocab.add_word(token);
        }
        vocab
    }

    /// Build a vocabulary from a word counter. Reserved tokens come first,
    /// then every word counted at least `min_word_count` times, in the
    /// counter's first-occurrence order.
    pub fn build(counter: FrequencyCounter, min_word_count: usize) -> Self {
        let mut vocab = Self::new();
        for (word, count) in counter.into_iter() {
            if count >= min_word_count {
                vocab.add_word(&word);
            }
        }
        vocab
    }

    /// Rebuild a vocabulary from its ordered word list
    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();

        let reserved_ok = words.len() >= RESERVED_TOKENS.len()
            && RESERVED_TOKENS
                .iter()
                .zip(words.iter())
                .all(|(expected, found)| expected == found);
        if !reserved_ok {
            return Err(Error::InvalidVocabulary(format!(
                "word list must start with {:?}",
                RESERVED_TOKENS
            )));
        }

        let mut set = IndexSet::with_capacity(words.len());
        for word in words {
            if set.contains(&word) {
                return Err(Error::InvalidVocabulary(format!("duplicate word {:?}", word)));
            }
            set.insert(word);
        }
        Ok(Self { words: set })
    }

    /// Insert `word` if it is new and return its index
    pub fn add_word(&mut self, word: &str) -> usize {
        match self.words.get_index_of(word) {
            Some(idx) => idx,
            None => self.words.insert_full(word.to_string()).0,
        }
    }

    /// Index of `word`, or the `<unk>` index when it is not in the vocabulary
    pub fn lookup(&self, word: &str) -> usize {
        self.index_of(word).unwrap_or(UNK_INDEX)
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.words.get_index_of(word)
    }

    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get_index(index).map(String::as_str)
    }

    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<usize> {
        tokens.iter().map(|t| self.lookup(t.as_ref())).collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    /// Words in index order
    pub fn words(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.words.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

// IndexSet equality ignores order, indices do not
impl PartialEq for Vocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.words().eq(other.words())
    }
}

impl Eq for Vocabulary {}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Vec<String>> for Vocabulary {
    type Error = Error;

    fn try_from(words: Vec<String>) -> Result<Self> {
        Self::from_words(words)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.words.into_iter().collect()
    }
}

/// On-disk form of the vocabulary. Loading goes through
/// [`crate::io::load_vocabulary`], which validates the word list.
#[derive(Debug, Clone, Serialize)]
pub struct VocabularyFile {
    pub version: String,
    pub date_created: String,
    pub min_word_count: usize,
    pub words: Vocabulary,
}

impl VocabularyFile {
    pub fn new(words: Vocabulary, min_word_count: usize) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            date_created: chrono::Utc::now().date_naive().to_string(),
            min_word_count,
            words,
        }
    }
}
