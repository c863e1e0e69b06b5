use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Raw API response, handed from the fetcher to the transformer unchanged
pub type RawPayload = serde_json::Value;

/// Parameters for a single season averages request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub season: i32,
    pub player_ids: Vec<i64>,
}

impl QueryRequest {
    pub fn new(season: i32, player_ids: Vec<i64>) -> Self {
        Self { season, player_ids }
    }

    /// Query string pairs: `season` followed by one `player_ids[]` per player, in order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(self.player_ids.len() + 1);
        pairs.push(("season", self.season.to_string()));
        for id in &self.player_ids {
            pairs.push(("player_ids[]", id.to_string()));
        }
        pairs
    }
}

/// A single cell value
#[derive(Debug, Clone)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Null,
}

impl ScalarValue {
    /// Convert a JSON value; arrays and objects are not scalars
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Some(ScalarValue::Null),
            Value::Bool(b) => Some(ScalarValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(ScalarValue::Int(i)),
                None => n.as_f64().map(ScalarValue::Float),
            },
            Value::String(s) => Some(ScalarValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Column type this value maps to; `None` for nulls
    pub fn sql_type(&self) -> Option<SqlType> {
        match self {
            ScalarValue::Int(_) => Some(SqlType::Int),
            ScalarValue::Float(_) => Some(SqlType::Float),
            ScalarValue::Text(_) => Some(SqlType::Varchar),
            ScalarValue::Bool(_) => Some(SqlType::Boolean),
            ScalarValue::Null => None,
        }
    }
}

// Floats compare by bit pattern so duplicate detection is total.
impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScalarValue::Int(a), ScalarValue::Int(b)) => a == b,
            (ScalarValue::Float(a), ScalarValue::Float(b)) => a.to_bits() == b.to_bits(),
            (ScalarValue::Text(a), ScalarValue::Text(b)) => a == b,
            (ScalarValue::Bool(a), ScalarValue::Bool(b)) => a == b,
            (ScalarValue::Null, ScalarValue::Null) => true,
            _ => false,
        }
    }
}

impl Eq for ScalarValue {}

impl Hash for ScalarValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ScalarValue::Int(i) => i.hash(state),
            ScalarValue::Float(f) => f.to_bits().hash(state),
            ScalarValue::Text(s) => s.hash(state),
            ScalarValue::Bool(b) => b.hash(state),
            ScalarValue::Null => {}
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Int(i) => write!(f, "{}", i),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::Text(s) => f.write_str(s),
            ScalarValue::Bool(b) => write!(f, "{}", b),
            ScalarValue::Null => f.write_str("NULL"),
        }
    }
}

/// Warehouse column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlType {
    Int,
    Float,
    Varchar,
    Boolean,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Int => "INT",
            SqlType::Float => "FLOAT",
            SqlType::Varchar => "VARCHAR(50)",
            SqlType::Boolean => "BOOLEAN",
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Ordered column name to type mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: Vec<(String, SqlType)>,
}

impl ColumnSchema {
    pub fn new(columns: Vec<(String, SqlType)>) -> Self {
        Self { columns }
    }

    pub fn sql_type(&self, name: &str) -> Option<SqlType> {
        self.columns.iter().find(|(column, _)| column == name).map(|(_, ty)| *ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SqlType)> {
        self.columns.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `"<name> <type>"` definitions in column order
    pub fn column_definitions(&self) -> Vec<String> {
        self.iter().map(|(name, ty)| format!("{} {}", name, ty)).collect()
    }
}

/// One transformed row, positionally aligned with the table's columns
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row(pub Vec<ScalarValue>);

impl Row {
    pub fn values(&self) -> &[ScalarValue] {
        &self.0
    }
}

/// In-memory result of the transform stage
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonTable {
    columns: Vec<String>,
    schema: ColumnSchema,
    rows: Vec<Row>,
}

impl SeasonTable {
    pub(crate) fn new(columns: Vec<String>, schema: ColumnSchema, rows: Vec<Row>) -> Self {
        Self { columns, schema, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn schema(&self) -> &ColumnSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at `row` for the named column
    pub fn get(&self, row: usize, column: &str) -> Option<&ScalarValue> {
        let position = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row).and_then(|r| r.0.get(position))
    }
}
