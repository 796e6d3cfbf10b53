//! Losses computed over a validation window's predictions.

use timber_tree::{Label, LabelPredictionWeight};

/// Maps a validation window's (label, prediction, weight) triples to a loss.
pub trait LossFunction<L: Label> {
    /// Compute the loss of `results`.
    fn loss(&self, results: &[LabelPredictionWeight<L>]) -> f64;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// `1 - AUC` for a designated positive label; lower is better.
///
/// Every instance is scored by its predicted `P(positive)`. Instance
/// weights are ignored. A window with no positives
/// or no negatives has AUC 0.5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonWeightedAucLoss<L> {
    positive: L,
}

impl<L: Label> NonWeightedAucLoss<L> {
    /// Create an AUC loss treating `positive` as the positive class.
    #[must_use]
    pub fn new(positive: L) -> Self {
        Self { positive }
    }

    /// Return the positive label.
    #[must_use]
    pub fn positive(&self) -> &L {
        &self.positive
    }

    /// Return the area under the ROC curve of `results`, in [0, 1].
    #[must_use]
    pub fn auc(&self, results: &[LabelPredictionWeight<L>]) -> f64 {
        let mut scored: Vec<(f64, bool)> = results
            .iter()
            .map(|r| (r.prediction.get(&self.positive), r.label == self.positive))
            .collect();
        let n_pos = scored.iter().filter(|(_, positive)| *positive).count();
        let n_neg = scored.len() - n_pos;
        if n_pos == 0 || n_neg == 0 {
            return 0.5;
        }

        scored.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Rank-sum of positives, ties sharing the mean of their ranks.
        let mut positive_rank_sum = 0.0;
        let mut start = 0;
        while start < scored.len() {
            let score = scored[start].0;
            let end = start
                + scored[start..]
                    .iter()
                    .take_while(|(s, _)| *s == score)
                    .count()
                    .max(1);
            let mean_rank = (start + 1 + end) as f64 / 2.0;
            let tied_positives = scored[start..end].iter().filter(|(_, p)| *p).count();
            positive_rank_sum += mean_rank * tied_positives as f64;
            start = end;
        }

        let n_pos = n_pos as f64;
        let n_neg = n_neg as f64;
        (positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg)
    }
}

impl<L: Label> LossFunction<L> for NonWeightedAucLoss<L> {
    fn loss(&self, results: &[LabelPredictionWeight<L>]) -> f64 {
        1.0 - self.auc(results)
    }

    fn name(&self) -> &str {
        "non-weighted-auc"
    }
}
