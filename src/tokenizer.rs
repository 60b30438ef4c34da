//! Word tokenization for captions
//!
//! The classifier only needs "text in, words out", so tokenization sits
//! behind the [`Tokenizer`] trait. [`WordTokenizer`] is the default English
//! word splitter: it separates punctuation from words and splits common
//! contractions (`don't` -> `do`, `n't`; `dog's` -> `dog`, `'s`).

use regex::Regex;
use std::sync::OnceLock;

/// Splits caption text into word tokens
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

// Contraction suffixes split off the end of a word
static CONTRACTION_RE: OnceLock<Regex> = OnceLock::new();

fn contraction_regex() -> &'static Regex {
    CONTRACTION_RE.get_or_init(|| {
        Regex::new(r"(?i)^(.+?)(n't|'s|'re|'ve|'ll|'d|'m)$").expect("contraction pattern is valid")
    })
}

/// Default word tokenizer
#[derive(Debug, Default, Clone, Copy)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        Self
    }

    fn push_word(word: &str, tokens: &mut Vec<String>) {
        if let Some(caps) = contraction_regex().captures(word) {
            tokens.push(caps[1].to_string());
            tokens.push(caps[2].to_string());
        } else {
            tokens.push(word.to_string());
        }
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();

        for chunk in text.split_whitespace() {
            // Peel punctuation off both ends; anything between stays one word
            let start = chunk
                .char_indices()
                .find(|(_, c)| c.is_alphanumeric())
                .map(|(i, _)| i);
            let Some(start) = start else {
                tokens.extend(chunk.chars().map(String::from));
                continue;
            };
            let end = chunk
                .char_indices()
                .rev()
                .find(|(_, c)| c.is_alphanumeric())
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(chunk.len());

            tokens.extend(chunk[..start].chars().map(String::from));
            Self::push_word(&chunk[start..end], &mut tokens);
            tokens.extend(chunk[end..].chars().map(String::from));
        }

        tokens
    }
}
