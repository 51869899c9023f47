//! Condition reference lookup.
//!
//! Matching is case-insensitive on trimmed input: an exact name wins, otherwise
//! the first name containing the query. Retrieval of the dataset goes through
//! [`ReferenceSource`]; failures are reported once and never retried here.

use async_trait::async_trait;
use strsim::jaro_winkler;
use thiserror::Error;

use crate::models::{ConditionReference, ReferenceDataset};

/// Dataset retrieval errors.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Http(String),

    #[error("Unexpected response status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to read reference dataset: {0}")]
    Io(String),

    #[error("Malformed reference dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Lookup errors.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Please enter a condition to search")]
    EmptyQuery,

    #[error("An error occurred while fetching data: {0}")]
    Fetch(#[from] FetchError),
}

pub type LookupResult<T> = Result<T, LookupError>;

/// Where the reference dataset comes from.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    /// Retrieve the whole dataset.
    async fn fetch(&self) -> FetchResult<ReferenceDataset>;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Dataset already in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    dataset: ReferenceDataset,
}

impl StaticSource {
    pub fn new(dataset: ReferenceDataset) -> Self {
        Self { dataset }
    }

    /// Parse a dataset document up front.
    pub fn from_json(json: &str) -> FetchResult<Self> {
        Ok(Self::new(ReferenceDataset::from_json(json)?))
    }
}

#[async_trait]
impl ReferenceSource for StaticSource {
    async fn fetch(&self) -> FetchResult<ReferenceDataset> {
        Ok(self.dataset.clone())
    }

    fn describe(&self) -> String {
        format!("static dataset ({} conditions)", self.dataset.conditions.len())
    }
}

/// Find a condition by name: exact match first, then first substring match.
pub fn find_condition<'a>(
    dataset: &'a ReferenceDataset,
    query: &str,
) -> Option<&'a ConditionReference> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    dataset
        .conditions
        .iter()
        .find(|c| c.name.to_lowercase() == query)
        .or_else(|| {
            dataset
                .conditions
                .iter()
                .find(|c| c.name.to_lowercase().contains(&query))
        })
}

/// Dataset names ordered by similarity to `query`, best first.
pub fn suggest_conditions(dataset: &ReferenceDataset, query: &str, limit: usize) -> Vec<String> {
    let query = query.trim().to_lowercase();
    let mut scored: Vec<(f64, &str)> = dataset
        .conditions
        .iter()
        .map(|c| (jaro_winkler(&query, &c.name.to_lowercase()), c.name.as_str()))
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    scored
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Suggestions offered to the host when a search finds nothing.
pub const SUGGESTION_LIMIT: usize = 3;

/// Outcome of a search: the match, or names to try instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSearch {
    pub found: Option<ConditionReference>,
    /// Empty whenever `found` is set.
    pub suggestions: Vec<String>,
}

/// [`find_condition`], falling back to up to `limit` suggestions on a miss.
pub fn search_condition(dataset: &ReferenceDataset, query: &str, limit: usize) -> ConditionSearch {
    match find_condition(dataset, query) {
        Some(found) => ConditionSearch {
            found: Some(found.clone()),
            suggestions: Vec::new(),
        },
        None => ConditionSearch {
            found: None,
            suggestions: suggest_conditions(dataset, query, limit),
        },
    }
}

/// Fetch the dataset and look up `query`.
///
/// An empty query is rejected before any retrieval.
pub async fn lookup_condition<S>(
    source: &S,
    query: &str,
) -> LookupResult<Option<ConditionReference>>
where
    S: ReferenceSource + ?Sized,
{
    if query.trim().is_empty() {
        return Err(LookupError::EmptyQuery);
    }

    tracing::debug!(source = %source.describe(), query, "Looking up condition");

    let dataset = source.fetch().await.map_err(|e| {
        tracing::warn!(source = %source.describe(), error = %e, "Reference fetch failed");
        e
    })?;

    Ok(find_condition(&dataset, query).cloned())
}
