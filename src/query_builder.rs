//! Fluent builder that assembles a CouchDB-style query document.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::combination::{Combination, CombinationItem, CombinationOperator};
use crate::condition::Condition;
use crate::config::BuilderConfig;
use crate::error::{BuildError, BuildResult};

/// The assembled query. Fields are declared in key order and the selector is
/// a sorted map, so rendering the same document always yields the same text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDocument {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    pub selector: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<Map<String, Value>>,
}

impl QueryDocument {
    pub fn to_json(&self) -> BuildResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> BuildResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> BuildResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Collects projection, selector, sort and paging state until `build` is called.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    config: BuilderConfig,
    fields: Vec<String>,
    doc_type: Option<String>,
    filters: BTreeMap<String, Value>,
    conditions: BTreeMap<String, Condition>,
    combinations: Vec<Combination>,
    sort: Vec<Map<String, Value>>,
    limit: Option<i64>,
    skip: Option<i64>,
    has_selector: bool,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            fields: Vec::new(),
            doc_type: None,
            filters: BTreeMap::new(),
            conditions: BTreeMap::new(),
            combinations: Vec::new(),
            sort: Vec::new(),
            limit: None,
            skip: None,
            has_selector: false,
        }
    }

    /// Creates a builder with the presets of `config` already applied.
    /// A preset doc type counts as selector content.
    pub fn from_config(config: &BuilderConfig) -> Self {
        let mut builder = Self::with_config(config.clone());
        if let Some(doc_type) = &config.default_doc_type {
            builder.set_doc_type(doc_type.clone());
        }
        builder.limit = config.default_limit;
        builder
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn has_selector(&self) -> bool {
        self.has_selector
    }

    /// Appends one projected field. Duplicates are kept.
    pub fn add_field(&mut self, field: impl Into<String>) -> &mut Self {
        self.fields.push(field.into());
        self
    }

    pub fn add_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Sets `field == value` in the selector, replacing an earlier filter on the same field.
    pub fn add_filter<V: Into<Value>>(&mut self, field: impl Into<String>, value: V) -> &mut Self {
        self.filters.insert(field.into(), value.into());
        self.has_selector = true;
        self
    }

    /// An empty name marks the selector as present but is never emitted.
    pub fn set_doc_type(&mut self, doc_type: impl Into<String>) -> &mut Self {
        self.doc_type = Some(doc_type.into());
        self.has_selector = true;
        self
    }

    /// Only one condition per field is kept; the last call wins.
    pub fn add_condition(&mut self, field: impl Into<String>, condition: Condition) -> &mut Self {
        self.conditions.insert(field.into(), condition);
        self.has_selector = true;
        self
    }

    pub fn set_limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn set_skip(&mut self, skip: i64) -> &mut Self {
        self.skip = Some(skip);
        self
    }

    /// Appends `{field: direction}` to the sort list. The direction is not validated.
    pub fn add_sort(&mut self, field: impl Into<String>, direction: &str) -> &mut Self {
        let direction = if self.config.lowercase_sort {
            direction.to_lowercase()
        } else {
            direction.to_string()
        };
        let mut entry = Map::new();
        entry.insert(field.into(), Value::String(direction));
        self.sort.push(entry);
        self
    }

    /// Adds a root-level group and returns it so nested groups can be chained on.
    pub fn add_combination<I, T>(&mut self, operator: CombinationOperator, items: I) -> &mut Combination
    where
        I: IntoIterator<Item = T>,
        T: Into<CombinationItem>,
    {
        self.combinations.push(Combination::from_items(operator, items));
        let last = self.combinations.len() - 1;
        &mut self.combinations[last]
    }

    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    /// Resolves a group by index path: root index first, then child indices.
    pub fn combination_mut(&mut self, path: &[usize]) -> Option<&mut Combination> {
        let (first, rest) = path.split_first()?;
        let mut node = self.combinations.get_mut(*first)?;
        for index in rest {
            node = node.child_mut(*index)?;
        }
        Some(node)
    }

    /// Assembles the document. Fails with `EmptySelector` if nothing was ever
    /// added to the selector.
    pub fn build(&self) -> BuildResult<QueryDocument> {
        if !self.has_selector {
            return Err(BuildError::EmptySelector);
        }

        let mut selector = Map::new();

        if let Some(doc_type) = self.doc_type.as_deref().filter(|d| !d.is_empty()) {
            selector.insert(
                self.config.doc_type_field.clone(),
                Value::String(doc_type.to_string()),
            );
        }

        for (field, value) in &self.filters {
            selector.insert(field.clone(), value.clone());
        }

        for (field, condition) in &self.conditions {
            selector.insert(field.clone(), serde_json::to_value(condition)?);
        }

        for combination in &self.combinations {
            let key = combination.operator().as_str();
            if selector.contains_key(key) {
                warn!("root combination {} replaces an earlier selector entry", key);
            }
            selector.insert(key.to_string(), Value::Array(combination.flatten()?));
        }

        debug!(
            "built query: {} selector keys, {} fields, {} sort entries",
            selector.len(),
            self.fields.len(),
            self.sort.len()
        );

        Ok(QueryDocument {
            fields: self.fields.clone(),
            limit: self.limit,
            selector,
            skip: self.skip,
            sort: self.sort.clone(),
        })
    }

    /// `build` followed by compact JSON rendering.
    pub fn build_json(&self) -> BuildResult<String> {
        self.build()?.to_json()
    }
}
