use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A search query and the identifiers used to correlate its output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub id: usize,
    /// The text submitted to the search box.
    pub text: String,
    /// Filesystem-safe label used in output file names.
    pub tag: String,
    /// Extra fields copied verbatim into the output record.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Query {
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            tag: String::new(),
            metadata: Map::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// One organic result parsed from a result page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: Option<String>,
    pub related_links: Option<Vec<String>>,
}

const RELATED_LINK_SEPARATOR: &str = ";";

/// Tab separated: title, url, snippet, related links joined by `;`.
impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let related = self
            .related_links
            .as_ref()
            .map(|links| links.join(RELATED_LINK_SEPARATOR))
            .unwrap_or_default();
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.title,
            self.url,
            self.snippet.as_deref().unwrap_or(""),
            related
        )
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("expected 4 tab separated fields with a title and url, got {0:?}")]
pub struct MalformedRecord(pub String);

impl FromStr for SearchResult {
    type Err = MalformedRecord;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split('\t').collect();
        let [title, url, snippet, related] = fields[..] else {
            return Err(MalformedRecord(line.to_string()));
        };
        if title.is_empty() || url.is_empty() {
            return Err(MalformedRecord(line.to_string()));
        }

        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Ok(SearchResult {
            title: title.to_string(),
            url: url.to_string(),
            snippet: non_empty(snippet),
            related_links: non_empty(related).map(|joined| {
                joined
                    .split(RELATED_LINK_SEPARATOR)
                    .map(str::to_string)
                    .collect()
            }),
        })
    }
}

/// Output record for one query: its metadata plus the ordered results.
#[derive(Debug, Serialize)]
pub struct QueryRecord<'a> {
    pub search_results: &'a [SearchResult],
    pub id: usize,
    pub question: &'a str,
    #[serde(flatten)]
    pub metadata: &'a Map<String, Value>,
}

impl<'a> QueryRecord<'a> {
    pub fn new(query: &'a Query, results: &'a [SearchResult]) -> Self {
        Self {
            search_results: results,
            id: query.id,
            question: &query.text,
            metadata: &query.metadata,
        }
    }
}
