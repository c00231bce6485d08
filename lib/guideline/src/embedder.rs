//! Text embedders
//!
//! Maps guideline text and condition queries to fixed-length vectors. The same
//! embedder must be used for the corpus and for queries.

use ahash::AHashMap;
use nutrank_core::{Result, Vector};
use parking_lot::RwLock;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// Default embedding dimension
pub const DEFAULT_EMBEDDING_DIM: usize = 256;

/// Deterministic text → vector mapping
pub trait Embedder: Send + Sync {
    /// Output dimension; every embedding has exactly this length
    fn dim(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vector>;

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vector>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Feature-hashing embedder over character trigrams and words.
///
/// Deterministic for identical input, unit-normalized. Blank text embeds to
/// the zero vector.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1) }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIM)
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        Ok(hash_text_to_vector(text, self.dim))
    }
}

/// Memoizes embeddings of repeated queries.
///
/// Condition lists repeat heavily across users, so the cache is shared by all
/// requests behind a read-mostly lock.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: RwLock<AHashMap<String, Vector>>,
    capacity: usize,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, capacity: usize) -> Self {
        Self {
            inner,
            cache: RwLock::new(AHashMap::new()),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

impl<E: Embedder> Embedder for CachedEmbedder<E> {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn embed(&self, text: &str) -> Result<Vector> {
        if let Some(hit) = self.cache.read().get(text) {
            return Ok(hit.clone());
        }

        let vector = self.inner.embed(text)?;
        let mut cache = self.cache.write();
        if cache.len() < self.capacity {
            cache.insert(text.to_string(), vector.clone());
        }
        Ok(vector)
    }
}

/// Hash a string to a fixed-size unit vector.
///
/// Character trigrams add 1.0 to their bucket and whole words add 2.0.
pub fn hash_text_to_vector(text: &str, dim: usize) -> Vector {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return Vector::zeros(dim);
    }

    let mut vector = vec![0.0f32; dim];
    for trigram in generate_trigrams(&normalized) {
        vector[bucket(&trigram, dim)] += 1.0;
    }

    for word in normalized.split_whitespace() {
        vector[bucket(word, dim)] += 2.0;
    }

    Vector::new(vector).normalized()
}

fn bucket<T: Hash + ?Sized>(value: &T, dim: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    (hasher.finish() as usize) % dim
}

/// Generate character trigrams from a string
fn generate_trigrams(s: &str) -> HashSet<String> {
    let padded = format!("  {}  ", s);
    let chars: Vec<char> = padded.chars().collect();

    if chars.len() < 3 {
        return HashSet::new();
    }

    chars.windows(3).map(|w| w.iter().collect::<String>()).collect()
}
