pub mod sqlite;

use crate::error::AskError;

/// Metadata for a single result column.
#[derive(Debug, Clone)]
pub struct ColumnMeta {
    pub name: String,
    pub type_name: String,
}

/// A single cell value from a query result.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Null,
}

impl CellValue {
    /// JSON form used in API responses. Blobs become lowercase hex.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Integer(i) => serde_json::Value::from(*i),
            CellValue::Real(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
            CellValue::Blob(bytes) => serde_json::Value::String(
                bytes.iter().map(|b| format!("{:02x}", b)).collect(),
            ),
            CellValue::Null => serde_json::Value::Null,
        }
    }
}

/// Materialized output of a query.
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<CellValue>>,
}

impl QueryResult {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Rows keyed by column name, in column order.
    ///
    /// Duplicate column names collapse onto the last value.
    pub fn row_maps(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                let mut map = serde_json::Map::new();
                for (i, col) in self.columns.iter().enumerate() {
                    let value = row.get(i).unwrap_or(&CellValue::Null);
                    map.insert(col.name.clone(), value.to_json());
                }
                map
            })
            .collect()
    }
}

/// A database that can run one statement and hand back every row.
pub trait Backend: Send + Sync {
    fn execute(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = Result<QueryResult, AskError>> + Send;
}
