use anyhow::{bail, Result};
use gisfire_io::FeatureTable;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Columns that identify an example and never reach the model.
pub const IDENTIFIER_COLUMNS: [&str; 2] = ["ID", "DATE"];

/// Every `step`-th row of `table`, starting with the first.
pub fn subsample(table: &FeatureTable, step: usize) -> FeatureTable {
    FeatureTable {
        columns: table.columns.clone(),
        rows: table.rows.iter().step_by(step.max(1)).cloned().collect(),
    }
}

/// Concatenated example files with a fire label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<f64>>>,
    pub labels: Vec<bool>,
}

impl LabeledTable {
    /// Stack `(table, fire)` sources in order. All tables must share one
    /// header.
    pub fn concat(sources: &[(&FeatureTable, bool)]) -> Result<Self> {
        let Some((first, _)) = sources.first() else {
            bail!("no example tables given");
        };
        let mut table = LabeledTable {
            columns: first.columns.clone(),
            rows: Vec::new(),
            labels: Vec::new(),
        };
        for (source, fire) in sources {
            if source.columns != table.columns {
                bail!(
                    "example files disagree on columns: {:?} vs {:?}",
                    table.columns,
                    source.columns
                );
            }
            table.rows.extend(source.rows.iter().cloned());
            table.labels.extend(std::iter::repeat(*fire).take(source.rows.len()));
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Result<usize> {
        match self.columns.iter().position(|c| c == name) {
            Some(index) => Ok(index),
            None => bail!("no column named {name}"),
        }
    }

    /// Remove the named columns. Every name must exist.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let mut keep = vec![true; self.columns.len()];
        for name in names {
            keep[self.column_index(name.as_ref())?] = false;
        }
        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
        Ok(())
    }

    /// Remove rows with any missing cell; returns how many went.
    pub fn drop_incomplete_rows(&mut self) -> usize {
        let before = self.rows.len();
        let mut labels = self.labels.iter();
        let mut kept_labels = Vec::with_capacity(before);
        self.rows.retain(|row| {
            let label = labels.next().copied().unwrap_or(false);
            let complete = row.iter().all(Option::is_some);
            if complete {
                kept_labels.push(label);
            }
            complete
        });
        self.labels = kept_labels;
        before - self.rows.len()
    }

    /// Replace the values of `name` by their rank among the distinct values,
    /// in ascending order.
    pub fn remap_dense(&mut self, name: &str) -> Result<()> {
        let index = self.column_index(name)?;
        let mut distinct: Vec<f64> = self.rows.iter().filter_map(|r| r[index]).collect();
        distinct.sort_by(f64::total_cmp);
        distinct.dedup();
        for row in &mut self.rows {
            if let Some(value) = row[index] {
                let rank = distinct
                    .binary_search_by(|probe| probe.total_cmp(&value))
                    .unwrap_or_default();
                row[index] = Some(rank as f64);
            }
        }
        Ok(())
    }

    /// Seeded shuffle split into `(train, test)`. The test part holds
    /// `ceil((1 - train_fraction) · n)` rows.
    pub fn split(self, train_fraction: f64, seed: u64) -> (LabeledTable, LabeledTable) {
        let n = self.rows.len();
        let test_size = (((1.0 - train_fraction) * n as f64) - 1e-9).ceil().max(0.0) as usize;
        let test_size = test_size.min(n);

        let mut order: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        order.shuffle(&mut rng);

        let pick = |indices: &[usize]| LabeledTable {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
        };
        let test = pick(&order[..test_size]);
        let train = pick(&order[test_size..]);
        (train, test)
    }

    /// Drop the identifier columns and unwrap the cells.
    ///
    /// Fails when a cell is still missing.
    pub fn into_samples(mut self) -> Result<Samples> {
        let present: Vec<&str> = IDENTIFIER_COLUMNS
            .into_iter()
            .filter(|id| self.columns.iter().any(|c| c == id))
            .collect();
        self.drop_columns(present.as_slice())?;

        let mut x = Vec::with_capacity(self.rows.len());
        for (n, row) in self.rows.into_iter().enumerate() {
            match row.into_iter().collect::<Option<Vec<f64>>>() {
                Some(values) => x.push(values),
                None => bail!("row {n} has missing values"),
            }
        }
        Ok(Samples {
            columns: self.columns,
            x,
            y: self.labels,
        })
    }
}

/// Dense model input.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Samples {
    pub columns: Vec<String>,
    pub x: Vec<Vec<f64>>,
    pub y: Vec<bool>,
}

impl Samples {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Rows in `range` and the rest, in order.
    pub fn hold_out(&self, range: std::ops::Range<usize>) -> (Samples, Samples) {
        let mut kept = Samples {
            columns: self.columns.clone(),
            ..Default::default()
        };
        let mut held = kept.clone();
        for (i, (x, y)) in self.x.iter().zip(&self.y).enumerate() {
            let target = if range.contains(&i) { &mut held } else { &mut kept };
            target.x.push(x.clone());
            target.y.push(*y);
        }
        (kept, held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: Vec<Vec<Option<f64>>>) -> FeatureTable {
        FeatureTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn concat_labels_by_source_and_checks_header() {
        let pos = table(&["ID", "A"], vec![vec![Some(1.0), Some(2.0)]]);
        let neg = table(&["ID", "A"], vec![vec![Some(2.0), Some(3.0)]; 2]);
        let joined = LabeledTable::concat(&[(&pos, true), (&neg, false)]).unwrap();
        assert_eq!(joined.labels, vec![true, false, false]);

        let other = table(&["ID", "B"], vec![]);
        assert!(LabeledTable::concat(&[(&pos, true), (&other, false)]).is_err());
    }

    #[test]
    fn subsample_keeps_every_step_th_row() {
        let t = table(&["A"], (0..7).map(|i| vec![Some(i as f64)]).collect());
        let every_third = subsample(&t, 3);
        assert_eq!(
            every_third.rows,
            vec![vec![Some(0.0)], vec![Some(3.0)], vec![Some(6.0)]]
        );
        assert_eq!(subsample(&t, 1).rows.len(), 7);
    }

    #[test]
    fn cleaning_drops_columns_then_incomplete_rows() {
        let t = table(
            &["ID", "A", "B"],
            vec![
                vec![Some(1.0), Some(1.0), None],
                vec![Some(2.0), None, Some(1.0)],
                vec![Some(3.0), Some(2.0), Some(5.0)],
            ],
        );
        let mut joined = LabeledTable::concat(&[(&t, false)]).unwrap();
        joined.labels = vec![true, false, true];
        joined.drop_columns(&["B"]).unwrap();
        assert_eq!(joined.columns, vec!["ID", "A"]);
        assert_eq!(joined.drop_incomplete_rows(), 1);
        assert_eq!(joined.rows, vec![vec![Some(1.0), Some(1.0)], vec![Some(3.0), Some(2.0)]]);
        assert_eq!(joined.labels, vec![true, true]);
        assert!(joined.drop_columns(&["NOPE"]).is_err());
    }

    #[test]
    fn land_cover_is_remapped_in_ascending_order() {
        let t = table(
            &["LAND_COVER"],
            vec![vec![Some(231.0)], vec![Some(112.0)], vec![Some(231.0)], vec![Some(211.0)]],
        );
        let mut joined = LabeledTable::concat(&[(&t, true)]).unwrap();
        joined.remap_dense("LAND_COVER").unwrap();
        let codes: Vec<f64> = joined.rows.iter().map(|r| r[0].unwrap()).collect();
        assert_eq!(codes, vec![2.0, 0.0, 2.0, 1.0]);
    }

    #[test]
    fn split_is_seeded_and_sized() {
        let t = table(&["ID"], (0..11).map(|i| vec![Some(i as f64)]).collect());
        let joined = LabeledTable::concat(&[(&t, true)]).unwrap();
        let (train, test) = joined.clone().split(0.8, 7);
        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 8);
        let (train_again, test_again) = joined.split(0.8, 7);
        assert_eq!(train, train_again);
        assert_eq!(test, test_again);

        let mut ids: Vec<f64> = train
            .rows
            .iter()
            .chain(&test.rows)
            .map(|r| r[0].unwrap())
            .collect();
        ids.sort_by(f64::total_cmp);
        assert_eq!(ids, (0..11).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn samples_lose_identifiers() {
        let t = table(
            &["ID", "DATE", "A"],
            vec![vec![Some(1.0), Some(1.5e9), Some(4.0)]],
        );
        let samples = LabeledTable::concat(&[(&t, true)])
            .unwrap()
            .into_samples()
            .unwrap();
        assert_eq!(samples.columns, vec!["A"]);
        assert_eq!(samples.x, vec![vec![4.0]]);
        assert_eq!(samples.y, vec![true]);
    }

    #[test]
    fn hold_out_partitions_rows() {
        let samples = Samples {
            columns: vec!["A".into()],
            x: (0..5).map(|i| vec![i as f64]).collect(),
            y: vec![true, false, true, false, true],
        };
        let (kept, held) = samples.hold_out(1..3);
        assert_eq!(held.x, vec![vec![1.0], vec![2.0]]);
        assert_eq!(kept.x, vec![vec![0.0], vec![3.0], vec![4.0]]);
        assert_eq!(kept.y, vec![true, false, true]);
    }
}
