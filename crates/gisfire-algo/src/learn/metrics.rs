use serde::Serialize;

/// Binary confusion matrix with fire as the positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Confusion {
    pub tn: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub tp: usize,
}

impl Confusion {
    pub fn from_labels(actual: &[bool], predicted: &[bool]) -> Self {
        let mut confusion = Confusion::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a, p) {
                (false, false) => confusion.tn += 1,
                (false, true) => confusion.fp += 1,
                (true, false) => confusion.fn_ += 1,
                (true, true) => confusion.tp += 1,
            }
        }
        confusion
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    pub fn scores(&self) -> Scores {
        Scores::from_counts(
            self.tn as f64,
            self.fp as f64,
            self.fn_ as f64,
            self.tp as f64,
        )
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Confusion counts (possibly fold averages) and the derived scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Scores {
    pub tn: f64,
    pub fp: f64,
    #[serde(rename = "fn")]
    pub fn_: f64,
    pub tp: f64,
    /// False negatives over all examples.
    pub fn_ratio: f64,
    pub precision: f64,
    pub recall: f64,
    pub f_score: f64,
}

impl Scores {
    fn from_counts(tn: f64, fp: f64, fn_: f64, tp: f64) -> Self {
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        Self {
            tn,
            fp,
            fn_,
            tp,
            fn_ratio: ratio(fn_, tn + fp + fn_ + tp),
            precision,
            recall,
            f_score: ratio(2.0 * precision * recall, precision + recall),
        }
    }

    /// Average over folds: counts are averaged, the false-negative ratio is
    /// taken from the averaged counts and the other scores are the mean of
    /// the per-fold scores.
    pub fn average(folds: &[Confusion]) -> Self {
        if folds.is_empty() {
            return Self::default();
        }
        let n = folds.len() as f64;
        let mean = |f: fn(&Confusion) -> usize| folds.iter().map(|c| f(c) as f64).sum::<f64>() / n;
        let mut averaged = Self::from_counts(
            mean(|c| c.tn),
            mean(|c| c.fp),
            mean(|c| c.fn_),
            mean(|c| c.tp),
        );
        let per_fold: Vec<Scores> = folds.iter().map(Confusion::scores).collect();
        averaged.precision = per_fold.iter().map(|s| s.precision).sum::<f64>() / n;
        averaged.recall = per_fold.iter().map(|s| s.recall).sum::<f64>() / n;
        averaged.f_score = per_fold.iter().map(|s| s.f_score).sum::<f64>() / n;
        averaged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confusion_counts_each_cell() {
        let actual = [true, true, false, false, true];
        let predicted = [true, false, false, true, true];
        let c = Confusion::from_labels(&actual, &predicted);
        assert_eq!(
            c,
            Confusion {
                tn: 1,
                fp: 1,
                fn_: 1,
                tp: 2
            }
        );
        let s = c.scores();
        assert!((s.precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((s.recall - 2.0 / 3.0).abs() < 1e-12);
        assert!((s.f_score - 2.0 / 3.0).abs() < 1e-12);
        assert!((s.fn_ratio - 0.2).abs() < 1e-12);
    }

    #[test]
    fn empty_denominators_score_zero() {
        let c = Confusion {
            tn: 4,
            ..Default::default()
        };
        let s = c.scores();
        assert_eq!((s.precision, s.recall, s.f_score, s.fn_ratio), (0.0, 0.0, 0.0, 0.0));
        assert_eq!(Confusion::default().scores().fn_ratio, 0.0);
    }

    #[test]
    fn averages_counts_and_scores_separately() {
        let folds = [
            Confusion { tn: 2, fp: 0, fn_: 0, tp: 2 },
            Confusion { tn: 2, fp: 2, fn_: 2, tp: 0 },
        ];
        let s = Scores::average(&folds);
        assert_eq!(s.tn, 2.0);
        assert_eq!(s.fp, 1.0);
        assert_eq!(s.fn_, 1.0);
        assert_eq!(s.tp, 1.0);
        assert_eq!(s.fn_ratio, 0.2);
        assert_eq!(s.precision, 0.5);
        assert_eq!(s.recall, 0.5);
    }
}
