//! Reference dataset
//!
//! The shared, read-only recipe population: schema, candidate rows and the
//! population statistics fit over all of them. Loaded once and shared by every
//! request.

use crate::candidate::{CandidateId, CandidateItem};
use crate::error::{Error, Result};
use crate::schema::NutrientSchema;
use crate::stats::PopulationStats;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

pub const ID_COLUMN: &str = "Recipe_id";
pub const TITLE_COLUMN: &str = "Recipe_title";
pub const REGION_COLUMN: &str = "Region";

/// Dietary category flag columns
pub const FLAG_COLUMNS: &[&str] = &[
    "vegan",
    "vegetarian",
    "pescetarian",
    "lacto_vegetarian",
    "ovo_vegetarian",
    "ovo_lacto_vegetarian",
];

#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    schema: NutrientSchema,
    candidates: Vec<CandidateItem>,
    stats: PopulationStats,
}

impl ReferenceDataset {
    /// Build from already-aligned candidates and fit population statistics
    pub fn new(schema: NutrientSchema, candidates: Vec<CandidateItem>) -> Result<Self> {
        for item in &candidates {
            schema.check_dim(item.nutrients.len())?;
        }
        let stats = PopulationStats::fit(
            candidates.iter().map(|c| c.nutrients.as_slice()),
            schema.len(),
        )?;

        Ok(Self { schema, candidates, stats })
    }

    /// Read a JSON array of recipe records from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::ReferenceData(format!("cannot read dataset {}: {}", path.display(), e))
        })?;
        let records: Vec<Map<String, Value>> = serde_json::from_str(&raw).map_err(|e| {
            Error::ReferenceData(format!("malformed dataset {}: {}", path.display(), e))
        })?;
        info!("Loaded {} recipe records from {:?}", records.len(), path);
        Self::from_records(&records)
    }

    /// Derive the schema from the records' numeric columns and build candidates.
    ///
    /// Every non-metadata column holding a number (or null) in any record is a
    /// nutrient; column order follows first appearance. Missing values are 0.
    pub fn from_records(records: &[Map<String, Value>]) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::ReferenceData("dataset contains no records".to_string()));
        }

        let mut columns: Vec<&str> = Vec::new();
        for record in records {
            for (key, value) in record {
                if (value.is_number() || value.is_null()) && !columns.contains(&key.as_str()) {
                    columns.push(key.as_str());
                }
            }
        }

        let mut excluded = vec![ID_COLUMN, TITLE_COLUMN, REGION_COLUMN];
        excluded.extend_from_slice(FLAG_COLUMNS);
        let schema = NutrientSchema::from_columns(columns, &excluded).map_err(|_| {
            Error::ReferenceData("dataset has no numeric nutrient columns".to_string())
        })?;
        debug!("Derived nutrient schema with {} columns", schema.len());

        let candidates = records
            .iter()
            .enumerate()
            .map(|(row, record)| candidate_from_record(&schema, row, record))
            .collect::<Result<Vec<_>>>()?;

        Self::new(schema, candidates)
    }

    #[inline]
    pub fn schema(&self) -> &NutrientSchema {
        &self.schema
    }

    #[inline]
    pub fn candidates(&self) -> &[CandidateItem] {
        &self.candidates
    }

    #[inline]
    pub fn stats(&self) -> &PopulationStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

fn candidate_from_record(
    schema: &NutrientSchema,
    row: usize,
    record: &Map<String, Value>,
) -> Result<CandidateItem> {
    let title = record
        .get(TITLE_COLUMN)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            Error::ReferenceData(format!("record {} is missing required column '{}'", row, TITLE_COLUMN))
        })?;

    let id = match record.get(ID_COLUMN) {
        Some(Value::Number(n)) => n
            .as_u64()
            .map(CandidateId::Integer)
            .unwrap_or_else(|| CandidateId::String(n.to_string())),
        Some(Value::String(s)) => CandidateId::String(s.clone()),
        _ => CandidateId::Integer(row as u64),
    };

    let nutrients = schema
        .iter()
        .map(|name| record.get(name).and_then(Value::as_f64).unwrap_or(0.0))
        .collect();

    let mut item = CandidateItem::new(id, title, nutrients);
    if let Some(region) = record.get(REGION_COLUMN).and_then(Value::as_str) {
        item = item.with_region(region);
    }
    for flag in FLAG_COLUMNS {
        let value = match record.get(*flag) {
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::Number(n)) => n.as_f64().map(|x| x != 0.0),
            _ => None,
        };
        if let Some(value) = value {
            item = item.with_flag(*flag, value);
        }
    }

    Ok(item)
}
