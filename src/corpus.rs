//! Labeled article corpus
//!
//! Loads tab-separated article dumps for the two source categories, labels
//! them (fake = 1, satire = 0), and shuffles the combined corpus with a
//! seeded generator so every run sees the same ordering.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Label assigned to articles from the fake-news dump.
pub const LABEL_FAKE: u8 = 1;
/// Label assigned to articles from the satire dump.
pub const LABEL_SATIRE: u8 = 0;

/// One row of an article TSV. Missing fields read as empty strings.
#[derive(Debug, Deserialize)]
struct ArticleRow {
    // The csv crate does not apply `#[serde(default)]` to fields absent from
    // a short record; `Option` is how it represents missing fields.
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// A labeled article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// 1 for fake news, 0 for satire
    pub label: u8,
    pub title: String,
    pub body: String,
}

impl Article {
    /// The text used for classification.
    #[must_use]
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Title => &self.title,
            TextField::Body => &self.body,
        }
    }
}

/// Which article field feeds the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TextField {
    Title,
    Body,
}

impl std::fmt::Display for TextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Body => write!(f, "body"),
        }
    }
}

/// Per-class counts for a loaded corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorpusStats {
    pub n_fake: usize,
    pub n_satire: usize,
}

impl CorpusStats {
    #[must_use]
    pub fn total(&self) -> usize {
        self.n_fake + self.n_satire
    }
}

/// Read one TSV of articles and attach the given label.
pub fn load_articles(path: &Path, label: u8) -> Result<Vec<Article>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;

    let mut articles = Vec::new();
    for row in reader.deserialize() {
        let row: ArticleRow =
            row.map_err(|e| Error::Serialization(format!("{}: {e}", path.display())))?;
        articles.push(Article {
            label,
            title: row.title.unwrap_or_default(),
            body: row.body.unwrap_or_default(),
        });
    }
    Ok(articles)
}

/// Load both dumps, label them, and shuffle with the given seed.
pub fn build_corpus(fakes_path: &Path, satires_path: &Path, seed: u64) -> Result<Vec<Article>> {
    let mut corpus = load_articles(fakes_path, LABEL_FAKE)?;
    corpus.extend(load_articles(satires_path, LABEL_SATIRE)?);

    if corpus.is_empty() {
        return Err(Error::ConfigError(
            "corpus is empty: both article files contained no rows".to_string(),
        ));
    }

    shuffle(&mut corpus, seed);
    Ok(corpus)
}

/// Class counts for a labeled corpus.
#[must_use]
pub fn corpus_stats(corpus: &[Article]) -> CorpusStats {
    let n_fake = corpus.iter().filter(|a| a.label == LABEL_FAKE).count();
    CorpusStats {
        n_fake,
        n_satire: corpus.len() - n_fake,
    }
}

/// Fisher-Yates shuffle driven by a 64-bit LCG.
///
/// Deterministic for a given seed across platforms, which keeps fold
/// membership reproducible.
pub fn shuffle<T>(items: &mut [T], seed: u64) {
    let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        state
    };

    for i in (1..items.len()).rev() {
        let j = (next() % (i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}
