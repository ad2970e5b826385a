use anyhow::{bail, Result};
use gisfire_io::FeatureTable;

use super::dataset::{LabeledTable, IDENTIFIER_COLUMNS};

/// Absolute Pearson correlation between every pair of columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn header(&self) -> Vec<String> {
        std::iter::once("COLUMN".to_string())
            .chain(self.columns.iter().cloned())
            .collect()
    }

    pub fn to_records(&self) -> Vec<Vec<String>> {
        self.columns
            .iter()
            .zip(&self.values)
            .map(|(name, row)| {
                std::iter::once(name.clone())
                    .chain(row.iter().map(|v| format!("{v:.6}")))
                    .collect()
            })
            .collect()
    }
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        // Constant column.
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

/// Concatenate the example files, drop identifiers, `drop_columns` and rows
/// with missing cells, then correlate what is left.
pub fn correlation_matrix<S: AsRef<str>>(
    tables: &[&FeatureTable],
    drop_columns: &[S],
) -> Result<CorrelationMatrix> {
    let sources: Vec<(&FeatureTable, bool)> = tables.iter().map(|t| (*t, false)).collect();
    let mut table = LabeledTable::concat(&sources)?;
    let identifiers: Vec<&str> = IDENTIFIER_COLUMNS
        .into_iter()
        .filter(|id| table.columns.iter().any(|c| c == id))
        .collect();
    table.drop_columns(identifiers.as_slice())?;
    table.drop_columns(drop_columns)?;
    table.drop_incomplete_rows();
    if table.len() < 2 {
        bail!("need at least two complete rows, have {}", table.len());
    }

    let columns: Vec<Vec<f64>> = (0..table.columns.len())
        .map(|j| table.rows.iter().filter_map(|row| row[j]).collect())
        .collect();
    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b).abs()).collect())
        .collect();
    Ok(CorrelationMatrix {
        columns: table.columns,
        values,
    })
}
