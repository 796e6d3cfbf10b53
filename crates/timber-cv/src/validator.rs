//! Walk-forward evaluation of a model builder over time-ordered data.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use timber_tree::{Instance, Label, PredictiveModel, PredictiveModelBuilder};
use tracing::{info, instrument};

use crate::config::OutOfTimeConfig;
use crate::error::CvError;
use crate::loss::LossFunction;
use crate::observer::{LoggingObserver, RoundObserver, RoundSummary};
use crate::time::TimeExtractor;
use crate::window::SortedDataset;

/// Shared flag for stopping a run between rounds.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the run stops before its next training step.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Return `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Weight-averaged loss accumulated across rounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningLoss {
    weighted_loss: f64,
    weight: f64,
}

impl RunningLoss {
    /// Fold in a round's `loss` over a window of total `weight`.
    #[must_use]
    pub fn add(self, loss: f64, weight: f64) -> Self {
        Self {
            weighted_loss: self.weighted_loss + loss * weight,
            weight: self.weight + weight,
        }
    }

    /// Return the accumulated weight.
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Return the weighted average, or `None` when no weight has accumulated.
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        (self.weight > 0.0).then(|| self.weighted_loss / self.weight)
    }
}

/// Result of a full cross-validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidationResult {
    /// Loss averaged over rounds, weighted by validation-window weight.
    pub average_loss: f64,
    /// Sum of validation-window weights over all rounds.
    pub total_weight: f64,
    /// Per-round summaries, in round order.
    pub rounds: Vec<RoundSummary>,
}

/// Out-of-time cross-validator.
///
/// Sorts instances by time, trains on everything before a validation window,
/// scores the window, then slides forward until every held-out instance has
/// been validated once.
#[derive(Debug, Clone)]
pub struct OutOfTimeCrossValidator<F, T> {
    config: OutOfTimeConfig,
    loss: F,
    time_extractor: T,
    cancellation: Option<CancellationFlag>,
}

impl<F, T> OutOfTimeCrossValidator<F, T> {
    /// Create a validator scoring windows with `loss` and ordering instances
    /// by `time_extractor`.
    pub fn new(config: OutOfTimeConfig, loss: F, time_extractor: T) -> Self {
        Self {
            config,
            loss,
            time_extractor,
            cancellation: None,
        }
    }

    /// Stop the run at the next round boundary once `flag` is set.
    #[must_use]
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    /// Return the window configuration.
    #[must_use]
    pub fn config(&self) -> &OutOfTimeConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationFlag::is_cancelled)
    }

    /// Run every round and return the weighted average loss.
    ///
    /// Rounds are logged through [`LoggingObserver`].
    ///
    /// # Errors
    ///
    /// See [`evaluate`](Self::evaluate).
    pub fn cross_validated_loss<L, B>(
        &self,
        builder: &B,
        raw: impl IntoIterator<Item = Instance<L>>,
    ) -> Result<f64, CvError>
    where
        L: Label,
        F: LossFunction<L>,
        T: TimeExtractor<L>,
        B: PredictiveModelBuilder<L>,
    {
        self.evaluate(builder, raw, &mut LoggingObserver)
            .map(|result| result.average_loss)
    }

    /// Run every round, reporting each to `observer`, and return the
    /// per-round summaries with the weighted average loss.
    ///
    /// # Errors
    ///
    /// | Variant                           | When                                        |
    /// |-----------------------------------|---------------------------------------------|
    /// | [`CvError::EmptyDataset`]         | `raw` is empty                              |
    /// | [`CvError::EmptyValidationSet`]   | the fraction holds out no instance          |
    /// | [`CvError::ModelBuild`]           | `builder` fails; no later round runs        |
    /// | [`CvError::Cancelled`]            | the cancellation flag is set                |
    /// | [`CvError::ZeroValidationWeight`] | every validation window weighs zero         |
    #[instrument(
        skip_all,
        fields(
            fraction = self.config.fraction_for_validation(),
            slice = %self.config.slice_duration(),
            loss = self.loss.name(),
        )
    )]
    pub fn evaluate<L, B, O>(
        &self,
        builder: &B,
        raw: impl IntoIterator<Item = Instance<L>>,
        observer: &mut O,
    ) -> Result<CrossValidationResult, CvError>
    where
        L: Label,
        F: LossFunction<L>,
        T: TimeExtractor<L>,
        B: PredictiveModelBuilder<L>,
        O: RoundObserver + ?Sized,
    {
        let dataset = SortedDataset::from_raw(raw, &self.time_extractor);
        if dataset.is_empty() {
            return Err(CvError::EmptyDataset);
        }
        let n_instances = dataset.len();
        let initial_training_size = self.config.initial_training_size(n_instances);
        if initial_training_size >= n_instances {
            return Err(CvError::EmptyValidationSet {
                n_instances,
                fraction: self.config.fraction_for_validation(),
            });
        }

        info!(
            n_instances,
            initial_training_size,
            "starting out-of-time cross-validation"
        );

        let (running, rounds) = dataset
            .slices(initial_training_size, self.config.slice_duration())
            .try_fold(
                (RunningLoss::default(), Vec::new()),
                |(running, mut rounds), slice| -> Result<_, CvError> {
                    if self.is_cancelled() {
                        return Err(CvError::Cancelled {
                            completed_rounds: rounds.len(),
                        });
                    }

                    let model = builder.build(dataset.training(&slice)).map_err(|e| {
                        CvError::ModelBuild {
                            round: slice.round,
                            source: Box::new(e),
                        }
                    })?;
                    let validation = dataset.validation(&slice);
                    let loss = self.loss.loss(&model.score_all(validation));
                    let running = running.add(loss, slice.validation_weight);

                    let summary = RoundSummary {
                        round: slice.round,
                        training_instances: slice.training.len(),
                        validation_instances: validation.len(),
                        validation_weight: slice.validation_weight,
                        validation_start: slice.start,
                        validation_end: slice.end,
                        loss,
                        running_average_loss: running.average(),
                    };
                    observer.on_round(&summary);
                    rounds.push(summary);
                    Ok((running, rounds))
                },
            )?;

        if rounds.is_empty() {
            return Err(CvError::NoValidationRounds);
        }
        let average_loss = running.average().ok_or(CvError::ZeroValidationWeight {
            rounds: rounds.len(),
        })?;

        info!(
            average_loss,
            total_weight = running.weight(),
            rounds = rounds.len(),
            "out-of-time cross-validation complete"
        );

        Ok(CrossValidationResult {
            average_loss,
            total_weight: running.weight(),
            rounds,
        })
    }
}
