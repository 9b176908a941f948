//! Vocabulary backend over a JSON word file.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use lexibattle_cache::{BackendError, BackendResult, QueryBounds, QueryRequest, VocabularyBackend};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// Serves rows from memory, loaded from a JSON file.
///
/// The file is either an array of row objects, stored under the table name
/// passed to [`JsonFileBackend::load`], or an object mapping table names to
/// arrays of rows.
#[derive(Debug, Default)]
pub struct JsonFileBackend {
    tables: HashMap<String, Vec<Value>>,
}

impl JsonFileBackend {
    pub fn load(path: impl AsRef<Path>, default_table: &str) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read word file {}", path.display()))?;
        let document: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse word file {}", path.display()))?;
        Self::from_document(document, default_table)
    }

    pub fn from_document(document: Value, default_table: &str) -> Result<Self> {
        let mut backend = Self::default();
        match document {
            Value::Array(rows) => backend = backend.with_table(default_table, rows),
            Value::Object(tables) => {
                for (name, rows) in tables {
                    let Value::Array(rows) = rows else {
                        bail!("table '{name}' is not an array of rows");
                    };
                    backend = backend.with_table(name, rows);
                }
            }
            _ => bail!("word file must hold an array or an object of tables"),
        }
        Ok(backend)
    }

    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Value>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }

    fn table(&self, name: &str) -> BackendResult<&[Value]> {
        self.tables
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| BackendError::Query(format!("no such table '{name}'")))
    }
}

#[async_trait]
impl VocabularyBackend for JsonFileBackend {
    async fn query(&self, request: &QueryRequest) -> BackendResult<Vec<Value>> {
        let matching = self
            .table(&request.table)?
            .iter()
            .filter(|row| request.filters.iter().all(|f| f.matches(row)));

        let (skip, take) = match request.bounds {
            Some(QueryBounds::Limit(n)) => (0, n),
            Some(QueryBounds::Range(window)) => (window.offset, window.size),
            None => (0, usize::MAX),
        };

        Ok(matching
            .skip(skip)
            .take(take)
            .map(|row| project(row, &request.fields))
            .collect())
    }

    async fn count(&self, table: &str) -> BackendResult<usize> {
        Ok(self.table(table)?.len())
    }
}

fn project(row: &Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return row.clone();
    }
    let selected: Map<String, Value> = fields
        .iter()
        .filter_map(|field| row.get(field).map(|v| (field.clone(), v.clone())))
        .collect();
    Value::Object(selected)
}
