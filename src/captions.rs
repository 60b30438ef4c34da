//! Caption association, split classification and word counting

use indexmap::IndexMap;
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::Result;
use crate::tokenizer::Tokenizer;
use crate::types::{CaptionDocument, CaptionRecord, ImageRecord, Split, SplitData};
use crate::utils::list_file_names;

/// Word occurrence counter that iterates in first-occurrence order
#[derive(Debug, Default, Clone)]
pub struct FrequencyCounter {
    counts: IndexMap<String, usize>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, word: &str) {
        *self.counts.entry(word.to_string()).or_insert(0) += 1;
    }

    pub fn update<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.add(word.as_ref());
        }
    }

    pub fn get(&self, word: &str) -> usize {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(w, &c)| (w.as_str(), c))
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl IntoIterator for FrequencyCounter {
    type Item = (String, usize);
    type IntoIter = indexmap::map::IntoIter<String, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.into_iter()
    }
}

/// Image-id keyed view of the caption document
#[derive(Debug, Default, Clone)]
pub struct CaptionIndex {
    /// image id -> file name, in document order
    pub images: Vec<ImageRecord>,
    /// image id -> normalised captions, in document order
    pub captions: HashMap<u64, Vec<CaptionRecord>>,
}

impl CaptionIndex {
    pub fn captions_for(&self, image_id: u64) -> &[CaptionRecord] {
        self.captions
            .get(&image_id)
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }
}

/// Group the document's captions by image. A repeated image id keeps its
/// first position and the last file name given for it.
pub fn associate_captions(document: CaptionDocument) -> CaptionIndex {
    let mut images: Vec<ImageRecord> = Vec::with_capacity(document.images.len());
    let mut image_positions: HashMap<u64, usize> = HashMap::with_capacity(document.images.len());
    for image in document.images {
        match image_positions.get(&image.id) {
            Some(&pos) => images[pos].file_name = image.file_name,
            None => {
                image_positions.insert(image.id, images.len());
                images.push(image);
            }
        }
    }

    let mut captions: HashMap<u64, Vec<CaptionRecord>> = HashMap::new();
    for annotation in document.annotations {
        captions
            .entry(annotation.image_id)
            .or_default()
            .push(CaptionRecord::new(annotation.image_id, &annotation.caption));
    }

    CaptionIndex { images, captions }
}

/// Result of classifying captions into splits
#[derive(Debug, Default)]
pub struct ClassifiedCaptions {
    /// Caption file lines per split, each `"<file_name>,<caption>\n"`
    pub lines: SplitData<Vec<String>>,
    pub images_classified: usize,
    pub images_excluded: usize,
}

/// Format one caption file line. Captions are not escaped, so a comma in
/// the caption is indistinguishable from the field delimiter.
pub fn format_caption_line(file_name: &str, caption: &str) -> String {
    format!("{},{}\n", file_name, caption)
}

/// Load the file names present in each split's image directory
pub fn load_split_listings(image_dirs: &SplitData<&Path>) -> Result<SplitData<HashSet<String>>> {
    let mut listings = SplitData::<HashSet<String>>::default();
    for split in Split::ALL {
        let names = list_file_names(image_dirs.get(split))?;
        *listings.get_mut(split) = names.into_iter().collect();
    }
    Ok(listings)
}

/// Assign every image to the first split (train, val, test) whose directory
/// listing contains its file name, emit its caption lines into that split
/// and count the words of its captions into `counter`.
///
/// Images found in no listing produce no lines and no counts. Splits are
/// filled one after another, so the counter sees train captions first.
pub fn classify_captions<T: Tokenizer>(
    index: &CaptionIndex,
    listings: &SplitData<HashSet<String>>,
    tokenizer: &T,
    counter: &mut FrequencyCounter,
) -> ClassifiedCaptions {
    let mut members: SplitData<Vec<&ImageRecord>> = SplitData::default();
    let mut images_excluded = 0;

    for image in &index.images {
        let owner = Split::ALL
            .into_iter()
            .find(|&split| listings.get(split).contains(&image.file_name));
        match owner {
            Some(split) => members.get_mut(split).push(image),
            None => {
                debug!(
                    "Image {} ({}) is in no split directory, skipping its captions",
                    image.id, image.file_name
                );
                images_excluded += 1;
            }
        }
    }

    let mut lines: SplitData<Vec<String>> = SplitData::default();
    let mut images_classified = 0;
    for split in Split::ALL {
        let split_lines = lines.get_mut(split);
        for image in members.get(split) {
            images_classified += 1;
            for caption in index.captions_for(image.id) {
                split_lines.push(format_caption_line(&image.file_name, &caption.text));
                counter.update(tokenizer.tokenize(&caption.text.to_lowercase()));
            }
        }
        info!(
            "{}: {} images, {} caption lines",
            split.label(),
            members.get(split).len(),
            split_lines.len()
        );
    }

    ClassifiedCaptions {
        lines,
        images_classified,
        images_excluded,
    }
}
