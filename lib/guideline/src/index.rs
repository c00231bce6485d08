//! Guideline index
//!
//! Exact nearest-neighbor search over the embedded guideline corpus. The
//! corpus is small and static, so the index embeds it once at construction and
//! answers queries with a flat L2 scan; results are fully deterministic.

use crate::embedder::Embedder;
use crate::record::GuidelineRecord;
use nutrank_core::{Error, Result, Vector};
use ordered_float::OrderedFloat;
use std::sync::Arc;
use tracing::debug;

/// Default number of guidelines retrieved per request
pub const DEFAULT_TOP_K: usize = 3;

/// Immutable embedded guideline corpus
pub struct GuidelineIndex {
    records: Vec<GuidelineRecord>,
    embeddings: Vec<Vector>,
    embedder: Arc<dyn Embedder>,
}

impl GuidelineIndex {
    /// Embed the whole corpus.
    ///
    /// Fails on an empty corpus or on any embedding error; no partial index
    /// is ever returned.
    pub fn build(records: Vec<GuidelineRecord>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::ReferenceData("guideline corpus is empty".to_string()));
        }

        let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts)?;
        for embedding in &embeddings {
            if embedding.dim() != embedder.dim() {
                return Err(Error::InvalidDimension {
                    expected: embedder.dim(),
                    actual: embedding.dim(),
                });
            }
        }

        debug!("Built guideline index over {} records", records.len());
        Ok(Self {
            records,
            embeddings,
            embedder,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[GuidelineRecord] {
        &self.records
    }

    /// Up to `k` guidelines closest to the space-joined condition list.
    ///
    /// Ranked by ascending L2 distance, ties broken by corpus order. An empty
    /// condition list is not special-cased: the empty query embeds to the zero
    /// vector and the result is whatever lies closest to it. With unit-norm
    /// corpus embeddings every record is then (nearly) equidistant, so callers
    /// get an arbitrary but stable slice of the corpus.
    pub fn retrieve<S: AsRef<str>>(&self, conditions: &[S], k: usize) -> Result<Vec<&GuidelineRecord>> {
        let query = conditions
            .iter()
            .map(|c| c.as_ref())
            .collect::<Vec<_>>()
            .join(" ");
        let query_vec = self.embedder.embed(&query)?;
        if query_vec.dim() != self.embedder.dim() {
            return Err(Error::InvalidDimension {
                expected: self.embedder.dim(),
                actual: query_vec.dim(),
            });
        }

        let mut ranked: Vec<(OrderedFloat<f32>, usize)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(idx, embedding)| (OrderedFloat(embedding.l2_distance(&query_vec)), idx))
            .collect();
        ranked.sort();
        ranked.truncate(k);

        debug!(
            "Retrieved {} guidelines for query {:?}",
            ranked.len(),
            query
        );
        Ok(ranked.into_iter().map(|(_, idx)| &self.records[idx]).collect())
    }
}

impl std::fmt::Debug for GuidelineIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuidelineIndex")
            .field("records", &self.records.len())
            .field("dim", &self.embedder.dim())
            .finish()
    }
}
