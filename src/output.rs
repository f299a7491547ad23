use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::{Query, QueryRecord, SearchResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Tsv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Tsv => "tsv",
        }
    }
}

/// Receives the results of every query that produced any.
pub trait ResultSink {
    fn persist(&mut self, query: &Query, results: &[SearchResult]) -> Result<()>;
}

/// Writes one file per query into a folder.
#[derive(Debug, Clone)]
pub struct FileSink {
    folder: PathBuf,
    format: OutputFormat,
}

impl FileSink {
    /// Create the sink, creating `folder` if it does not exist yet.
    pub fn create(folder: impl Into<PathBuf>, format: OutputFormat) -> Result<Self> {
        let folder = folder.into();
        fs::create_dir_all(&folder)
            .with_context(|| format!("Failed to create output folder {}", folder.display()))?;
        Ok(Self { folder, format })
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn path_for(&self, query: &Query) -> PathBuf {
        self.folder.join(file_name(query, self.format))
    }
}

impl ResultSink for FileSink {
    fn persist(&mut self, query: &Query, results: &[SearchResult]) -> Result<()> {
        let formatted = match self.format {
            OutputFormat::Json => results_to_json(query, results)?,
            OutputFormat::Tsv => results_to_tsv(results),
        };
        let path = self.path_for(query);
        fs::write(&path, formatted)
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
        debug!("Saved {} results to {}", results.len(), path.display());
        Ok(())
    }
}

/// `{id:06}-{tag}.{ext}`, e.g. `000042-4680_jeopardy_history_200.json`.
pub fn file_name(query: &Query, format: OutputFormat) -> String {
    format!("{:06}-{}.{}", query.id, query.tag, format.extension())
}

pub fn results_to_json(query: &Query, results: &[SearchResult]) -> Result<String> {
    serde_json::to_string_pretty(&QueryRecord::new(query, results))
        .context("Failed to serialize search results")
}

pub fn results_to_tsv(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
