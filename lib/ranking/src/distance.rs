//! Similarity functions used by the ranker
//!
//! All functions return a similarity in [0.0, 1.0] where 1.0 means identical,
//! except `cosine_similarity`, which ranges over [-1.0, 1.0] in general but
//! stays non-negative on rectified inputs.

/// Calculate cosine similarity between two dense vectors
///
/// # Returns
/// 0.0 when either vector has zero norm or the lengths differ
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Region preference score
///
/// # Returns
/// * 1.0 on a case-insensitive exact match
/// * 0.8 when either name contains the other
/// * 0.2 when both are present and unrelated
/// * 0.5 when either side is absent
pub fn region_preference(candidate: Option<&str>, preferred: Option<&str>) -> f64 {
    let (candidate, preferred) = match (candidate, preferred) {
        (Some(c), Some(p)) if !c.trim().is_empty() && !p.trim().is_empty() => {
            (c.trim().to_lowercase(), p.trim().to_lowercase())
        }
        _ => return 0.5,
    };

    if candidate == preferred {
        1.0
    } else if candidate.contains(&preferred) || preferred.contains(&candidate) {
        0.8
    } else {
        0.2
    }
}

/// Population standard deviation (ddof = 0)
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
}
