//! Ordered nutrient-keyed maps
//!
//! `NutrientMap` is the keyed form of a dense nutrient vector, used at the
//! edges of the pipeline (payloads, synthetic profiles). Conversion to a dense
//! vector is validated against a [`NutrientSchema`]: unknown keys are an error.

use crate::error::{Error, Result};
use crate::schema::NutrientSchema;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Insertion-ordered nutrient name → value map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutrientMap {
    entries: Vec<(String, f64)>,
}

impl NutrientMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zip a dense vector with the schema names
    pub fn from_dense(schema: &NutrientSchema, values: &[f64]) -> Result<Self> {
        schema.check_dim(values.len())?;
        Ok(Self {
            entries: schema
                .iter()
                .zip(values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        })
    }

    /// Insert or overwrite a value, keeping the original position on overwrite
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Dense vector in schema order.
    ///
    /// Every key must resolve to a schema nutrient, and every schema nutrient
    /// must be present; nothing is defaulted.
    pub fn to_dense(&self, schema: &NutrientSchema) -> Result<Vec<f64>> {
        let mut dense: Vec<Option<f64>> = vec![None; schema.len()];
        for (name, value) in &self.entries {
            let idx = schema
                .resolve(name)
                .ok_or_else(|| Error::UnknownNutrient(name.clone()))?;
            dense[idx] = Some(*value);
        }

        dense
            .into_iter()
            .zip(schema.iter())
            .map(|(value, name)| {
                value.ok_or_else(|| {
                    Error::InvalidUserInput(format!("missing value for nutrient '{}'", name))
                })
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for NutrientMap {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut map = NutrientMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl Serialize for NutrientMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NutrientMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct NutrientMapVisitor;

        impl<'de> Visitor<'de> for NutrientMapVisitor {
            type Value = NutrientMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of nutrient names to numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<NutrientMap, A::Error> {
                let mut map = NutrientMap::new();
                while let Some((name, value)) = access.next_entry::<String, f64>()? {
                    map.insert(name, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(NutrientMapVisitor)
    }
}
