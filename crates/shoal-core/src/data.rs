use std::fmt;

/// Opaque handle to one row of application data. The engine never owns
/// records; it resolves them through a [`DataAccessor`] on every query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub usize);

/// Integer column handle. Column traits (numeric / categorical) are queried
/// at use time; nothing about a column is cached across calls except derived
/// statistics a positioner keeps for its own instance lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ColumnId(pub usize);

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only query surface over the application's record storage.
///
/// Implementations must be `Send + Sync` so a snapshot can be handed to the
/// recompute worker thread.
pub trait DataAccessor: Send + Sync {
    fn column_count(&self) -> usize;
    fn row_count(&self) -> usize;

    fn is_numeric(&self, column: ColumnId) -> bool;
    fn is_category(&self, column: ColumnId) -> bool;

    /// Number of distinct categories of a categorical column; 0 otherwise.
    fn category_count(&self, column: ColumnId) -> usize;

    /// Numeric cell value; NaN for missing cells and non-numeric columns.
    fn numeric(&self, record: RecordId, column: ColumnId) -> f64;

    /// Category index of a cell; 0 for non-categorical columns.
    fn category_index(&self, record: RecordId, column: ColumnId) -> usize;
}

#[derive(Debug, Clone)]
enum ColumnData {
    Numeric(Vec<f64>),
    Category {
        indices: Vec<usize>,
        category_count: usize,
    },
    /// Free-text columns carry no ordinate; selecting one for a positioner
    /// is a configuration error.
    Text(Vec<String>),
}

/// Plain in-memory column store implementing [`DataAccessor`].
///
/// This is the reference implementation of the accessor semantics (NaN for
/// missing numeric cells, category indices as synthetic ordinates) and the
/// fixture used by tests and benches. Real applications adapt their own
/// storage instead.
#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    columns: Vec<ColumnData>,
    rows: usize,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_numeric(&mut self, values: Vec<f64>) -> ColumnId {
        self.rows = self.rows.max(values.len());
        self.columns.push(ColumnData::Numeric(values));
        ColumnId(self.columns.len() - 1)
    }

    pub fn push_category(&mut self, indices: Vec<usize>, category_count: usize) -> ColumnId {
        self.rows = self.rows.max(indices.len());
        self.columns.push(ColumnData::Category {
            indices,
            category_count,
        });
        ColumnId(self.columns.len() - 1)
    }

    pub fn push_text(&mut self, values: Vec<String>) -> ColumnId {
        self.rows = self.rows.max(values.len());
        self.columns.push(ColumnData::Text(values));
        ColumnId(self.columns.len() - 1)
    }

    pub fn text(&self, record: RecordId, column: ColumnId) -> Option<&str> {
        match self.columns.get(column.0)? {
            ColumnData::Text(values) => values.get(record.0).map(String::as_str),
            _ => None,
        }
    }
}

impl DataAccessor for MemoryTable {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn row_count(&self) -> usize {
        self.rows
    }

    fn is_numeric(&self, column: ColumnId) -> bool {
        matches!(self.columns.get(column.0), Some(ColumnData::Numeric(_)))
    }

    fn is_category(&self, column: ColumnId) -> bool {
        matches!(
            self.columns.get(column.0),
            Some(ColumnData::Category { .. })
        )
    }

    fn category_count(&self, column: ColumnId) -> usize {
        match self.columns.get(column.0) {
            Some(ColumnData::Category { category_count, .. }) => *category_count,
            _ => 0,
        }
    }

    fn numeric(&self, record: RecordId, column: ColumnId) -> f64 {
        match self.columns.get(column.0) {
            Some(ColumnData::Numeric(values)) => values.get(record.0).copied().unwrap_or(f64::NAN),
            _ => f64::NAN,
        }
    }

    fn category_index(&self, record: RecordId, column: ColumnId) -> usize {
        match self.columns.get(column.0) {
            Some(ColumnData::Category { indices, .. }) => {
                indices.get(record.0).copied().unwrap_or(0)
            }
            _ => 0,
        }
    }
}
