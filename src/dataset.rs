//! Reading the Jeopardy! question/answer dataset into [`Query`] records.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use scraper::Html;
use serde::Deserialize;
use serde_json::{json, Map};

use crate::models::Query;

/// One entry as stored in the dataset file.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub category: String,
    pub air_date: String,
    pub question: String,
    pub value: Option<String>,
    pub answer: String,
    pub round: String,
    pub show_number: String,
}

#[derive(Debug)]
pub struct Dataset {
    entries: Vec<Entry>,
}

impl Dataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Failed to parse dataset {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<Entry> = serde_json::from_str(raw)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at position `no`, as a query whose id is that position.
    pub fn query(&self, no: usize) -> Option<Query> {
        self.entries.get(no).map(|entry| entry.to_query(no))
    }

    /// Queries for entries in `first..last`; `last` is clamped to the size.
    pub fn queries(&self, first: usize, last: usize) -> impl Iterator<Item = Query> + '_ {
        let last = last.min(self.entries.len());
        (first..last).filter_map(move |no| self.query(no))
    }
}

impl Entry {
    pub fn to_query(&self, id: usize) -> Query {
        let question = clean_question(&self.question);
        let mut metadata = Map::new();
        metadata.insert("category".into(), json!(self.category));
        metadata.insert("air_date".into(), json!(self.air_date));
        metadata.insert("value".into(), json!(self.value));
        metadata.insert("answer".into(), json!(self.answer));
        metadata.insert("round".into(), json!(self.round));
        metadata.insert("show_number".into(), json!(self.show_number));

        Query::new(id, question)
            .with_tag(self.tag())
            .with_metadata(metadata)
    }

    /// `show_number_round_category_value`, e.g. `4999_doublejeopardy_authorsintheiryouth_800`.
    pub fn tag(&self) -> String {
        [
            Some(self.show_number.as_str()),
            Some(self.round.as_str()),
            Some(self.category.as_str()),
            self.value.as_deref(),
        ]
        .into_iter()
        .map(|part| part.map(tag_part).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("_")
    }
}

fn tag_part(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Questions are stored wrapped in quote characters and some carry inline
/// markup (`<a>`, `<i>`); keep only the text.
pub fn clean_question(raw: &str) -> String {
    let mut chars = raw.chars();
    chars.next();
    chars.next_back();
    let fragment = Html::parse_fragment(chars.as_str());
    fragment.root_element().text().collect()
}
