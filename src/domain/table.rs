//! In-memory dataset table.
//!
//! Loaded once from the downloaded CSV and then shared read-only with every
//! summary and plot producer. Columns are typed at load time: a column is
//! numeric when every present cell parses as a float, categorical otherwise.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Cell spellings treated as missing values
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Errors raised while loading a dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset has no columns")]
    NoColumns,

    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

/// Column storage, typed at load time
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

/// A named column of the dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.data, ColumnData::Numeric(_))
    }

    /// Number of present (non-missing) cells
    pub fn non_null_count(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.iter().filter(|v| v.is_some()).count(),
            ColumnData::Categorical(values) => values.iter().filter(|v| v.is_some()).count(),
        }
    }

    /// Present values of a numeric column; empty for categorical columns
    pub fn numeric_values(&self) -> Vec<f64> {
        match &self.data {
            ColumnData::Numeric(values) => values.iter().flatten().copied().collect(),
            ColumnData::Categorical(_) => Vec::new(),
        }
    }

    /// Numeric cell at `row`, `None` when missing or not numeric
    pub fn number_at(&self, row: usize) -> Option<f64> {
        match &self.data {
            ColumnData::Numeric(values) => values.get(row).copied().flatten(),
            ColumnData::Categorical(_) => None,
        }
    }

    /// Cell at `row` as a grouping key; numbers use their display form
    pub fn label_at(&self, row: usize) -> Option<String> {
        match &self.data {
            ColumnData::Numeric(values) => values.get(row).copied().flatten().map(format_number),
            ColumnData::Categorical(values) => values.get(row).cloned().flatten(),
        }
    }

    /// Display form of a cell, `NaN` when missing
    pub fn display_at(&self, row: usize) -> String {
        self.label_at(row).unwrap_or_else(|| "NaN".to_string())
    }

    /// pandas-style dtype name
    pub fn dtype(&self) -> &'static str {
        match &self.data {
            ColumnData::Numeric(values) => {
                let integral = values
                    .iter()
                    .all(|v| matches!(v, Some(x) if x.fract() == 0.0));
                if integral && !values.is_empty() {
                    "int64"
                } else {
                    "float64"
                }
            }
            ColumnData::Categorical(_) => "object",
        }
    }
}

/// Tabular dataset with typed columns
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Load a dataset from a CSV file
    pub fn from_path(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Load a dataset from CSV text with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(DatasetError::NoColumns);
        }

        let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        let mut rows = 0;
        for record in reader.records() {
            let record = record?;
            for (cells, field) in raw.iter_mut().zip(record.iter()) {
                cells.push(parse_cell(field));
            }
            rows += 1;
        }

        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, cells)| Column::new(name, infer_column(cells)))
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Look up a column, failing on unknown names
    pub fn require(&self, name: &str) -> Result<&Column, DatasetError> {
        self.column(name)
            .ok_or_else(|| DatasetError::UnknownColumn(name.to_string()))
    }

    /// Names of numeric columns, in dataset order
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_numeric())
            .map(Column::name)
            .collect()
    }

    /// Names of categorical columns, in dataset order
    pub fn categorical_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !c.is_numeric())
            .map(Column::name)
            .collect()
    }

    /// Present values of a numeric column
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>, DatasetError> {
        Ok(self.require(name)?.numeric_values())
    }

    /// Display form of one cell, `None` for an unknown column or row
    pub fn cell(&self, row: usize, name: &str) -> Option<String> {
        if row >= self.rows {
            return None;
        }
        self.column(name).map(|c| c.display_at(row))
    }
}

/// Find the first CSV file under `dir`, searching recursively
pub fn find_csv(dir: &Path) -> Option<PathBuf> {
    let pattern = format!(
        "{}/**/*.csv",
        glob::Pattern::escape(&dir.to_string_lossy())
    );
    let mut found: Vec<PathBuf> = glob::glob(&pattern)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    found.sort();
    found.into_iter().next()
}

/// Format a number the way the overview tables print it
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

fn parse_cell(field: &str) -> Option<String> {
    if MISSING_MARKERS.contains(&field) {
        None
    } else {
        Some(field.to_string())
    }
}

/// Numeric iff every present cell parses; a column with no rows is categorical
fn infer_column(cells: Vec<Option<String>>) -> ColumnData {
    if cells.is_empty() {
        return ColumnData::Categorical(cells);
    }

    let parsed: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            Some(text) => text.parse::<f64>().ok().map(Some),
            None => Some(None),
        })
        .collect();

    match parsed {
        Some(values) => ColumnData::Numeric(values),
        None => ColumnData::Categorical(cells),
    }
}
