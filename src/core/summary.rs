//! Summary statistics over a dataset.
//!
//! Produces the overview printed before plotting: the first rows, per-column
//! info, descriptive statistics of the numeric columns and the correlation
//! matrix shared with the heatmap renderer.

use std::fmt;

use crate::domain::{Dataset, DatasetError};

/// First `n` rows rendered as an aligned text table
pub fn head(dataset: &Dataset, n: usize) -> String {
    let rows = n.min(dataset.row_count());
    let mut header = vec![String::new()];
    header.extend(dataset.column_names().iter().map(|c| c.to_string()));

    let mut table = vec![header];
    for row in 0..rows {
        let mut line = vec![row.to_string()];
        line.extend(dataset.columns().iter().map(|c| c.display_at(row)));
        table.push(line);
    }

    render_table(&table)
}

/// Per-column overview, in the spirit of `DataFrame.info()`
#[derive(Debug, Clone, PartialEq)]
pub struct Info {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub non_null: usize,
    pub dtype: &'static str,
}

pub fn info(dataset: &Dataset) -> Info {
    Info {
        rows: dataset.row_count(),
        columns: dataset
            .columns()
            .iter()
            .map(|c| ColumnInfo {
                name: c.name().to_string(),
                non_null: c.non_null_count(),
                dtype: c.dtype(),
            })
            .collect(),
    }
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows == 0 {
            writeln!(f, "RangeIndex: 0 entries")?;
        } else {
            writeln!(f, "RangeIndex: {} entries, 0 to {}", self.rows, self.rows - 1)?;
        }
        writeln!(f, "Data columns (total {} columns):", self.columns.len())?;

        let mut table = vec![vec![
            " #".to_string(),
            "Column".to_string(),
            "Non-Null Count".to_string(),
            "Dtype".to_string(),
        ]];
        table.push(vec![
            "---".to_string(),
            "------".to_string(),
            "--------------".to_string(),
            "-----".to_string(),
        ]);
        for (i, column) in self.columns.iter().enumerate() {
            table.push(vec![
                format!(" {}", i),
                column.name.clone(),
                format!("{} non-null", column.non_null),
                column.dtype.to_string(),
            ]);
        }
        write!(f, "{}", render_left_table(&table))
    }
}

/// Descriptive statistics of one numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Statistics over present values; `NaN` where undefined
    pub fn from_values(name: impl Into<String>, values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            name: name.into(),
            count: sorted.len(),
            mean: mean(&sorted),
            std: sample_std(&sorted),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Statistics for every numeric column, in the spirit of `DataFrame.describe()`
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub columns: Vec<ColumnStats>,
}

pub fn describe(dataset: &Dataset) -> Describe {
    Describe {
        columns: dataset
            .columns()
            .iter()
            .filter(|c| c.is_numeric())
            .map(|c| ColumnStats::from_values(c.name(), &c.numeric_values()))
            .collect(),
    }
}

impl fmt::Display for Describe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut header = vec![String::new()];
        header.extend(self.columns.iter().map(|c| c.name.clone()));
        let mut table = vec![header];

        let rows: [(&str, fn(&ColumnStats) -> f64); 8] = [
            ("count", |s| s.count as f64),
            ("mean", |s| s.mean),
            ("std", |s| s.std),
            ("min", |s| s.min),
            ("25%", |s| s.q25),
            ("50%", |s| s.median),
            ("75%", |s| s.q75),
            ("max", |s| s.max),
        ];
        for (label, stat) in rows {
            let mut line = vec![label.to_string()];
            line.extend(self.columns.iter().map(|c| format!("{:.6}", stat(c))));
            table.push(line);
        }

        write!(f, "{}", render_table(&table))
    }
}

/// Symmetric matrix of Pearson coefficients
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Pairwise-complete Pearson correlation of the named numeric columns
pub fn correlation<S: AsRef<str>>(
    dataset: &Dataset,
    columns: &[S],
) -> Result<CorrelationMatrix, DatasetError> {
    let resolved = columns
        .iter()
        .map(|name| dataset.require(name.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let rows = dataset.row_count();
    let n = resolved.len();
    let mut values = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        for j in i..n {
            let pairs: Vec<(f64, f64)> = (0..rows)
                .filter_map(|r| Some((resolved[i].number_at(r)?, resolved[j].number_at(r)?)))
                .collect();
            let r = pearson(&pairs);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        values,
    })
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Standard deviation with one degree of freedom removed
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Linear-interpolated quantile of sorted values
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let pos = q * (len - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

/// Pearson coefficient; `NaN` with fewer than two pairs or zero variance
pub fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Right-aligned table, first column left-aligned
fn render_table(rows: &[Vec<String>]) -> String {
    let widths = column_widths(rows);
    let mut out = String::new();
    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if i == 0 {
                    format!("{:<width$}", cell, width = widths[i])
                } else {
                    format!("{:>width$}", cell, width = widths[i])
                }
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn render_left_table(rows: &[Vec<String>]) -> String {
    let widths = column_widths(rows);
    let mut out = String::new();
    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn column_widths(rows: &[Vec<String>]) -> Vec<usize> {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    (0..cols)
        .map(|i| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect()
}
