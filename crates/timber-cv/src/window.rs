//! Time-sorted dataset and the sliding train/validate windows over it.

use std::iter::FusedIterator;
use std::ops::Range;

use chrono::{DateTime, TimeDelta, Utc};
use timber_tree::{Instance, Label};

use crate::time::TimeExtractor;

/// Instances sorted ascending by extracted time.
///
/// The sort is stable, so instances sharing a timestamp keep their input
/// order. Timestamps are extracted once and kept alongside.
#[derive(Debug, Clone)]
pub struct SortedDataset<L> {
    instances: Vec<Instance<L>>,
    times: Vec<DateTime<Utc>>,
}

impl<L: Label> SortedDataset<L> {
    /// Extract every instance's time and sort by it.
    pub fn from_raw<T>(raw: impl IntoIterator<Item = Instance<L>>, extractor: &T) -> Self
    where
        T: TimeExtractor<L> + ?Sized,
    {
        let mut stamped: Vec<(DateTime<Utc>, Instance<L>)> = raw
            .into_iter()
            .map(|instance| (extractor.extract_time(&instance), instance))
            .collect();
        stamped.sort_by_key(|(time, _)| *time);
        let (times, instances) = stamped.into_iter().unzip();
        Self { instances, times }
    }

    /// Return the number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Return `true` if there are no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Return the instances in time order.
    #[must_use]
    pub fn instances(&self) -> &[Instance<L>] {
        &self.instances
    }

    /// Return the timestamps, aligned with [`instances`](Self::instances).
    #[must_use]
    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    /// Return the sum of all instance weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.instances.iter().map(Instance::weight).sum()
    }

    /// Return the index of the first instance with time `>= t`, or
    /// [`len`](Self::len) if none.
    #[must_use]
    pub fn first_at_or_after(&self, t: DateTime<Utc>) -> usize {
        self.times.partition_point(|time| *time < t)
    }

    /// Return the training instances of `slice`.
    #[must_use]
    pub fn training(&self, slice: &TimeSlice) -> &[Instance<L>] {
        &self.instances[slice.training.clone()]
    }

    /// Return the validation instances of `slice`.
    #[must_use]
    pub fn validation(&self, slice: &TimeSlice) -> &[Instance<L>] {
        &self.instances[slice.validation.clone()]
    }

    /// Iterate the rounds of a walk that starts with the first
    /// `initial_training_size` instances as training data and validates
    /// successive windows of `duration`.
    ///
    /// The first window opens at the time of instance
    /// `initial_training_size`; instances sharing that time move to
    /// validation. Each later window opens at the time of the first instance
    /// not yet consumed, so no round is empty. Iteration ends once every
    /// instance has been validated.
    #[must_use]
    pub fn slices(&self, initial_training_size: usize, duration: TimeDelta) -> TimeSlices<'_, L> {
        TimeSlices {
            dataset: self,
            next: initial_training_size,
            duration,
            round: 0,
        }
    }
}

/// One round's windows, as index ranges into a [`SortedDataset`].
///
/// `training` is always a prefix and `validation` immediately follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlice {
    /// Zero-based round index.
    pub round: usize,
    /// Training instances: everything before the validation window.
    pub training: Range<usize>,
    /// Validation instances: times in `[start, end)`.
    pub validation: Range<usize>,
    /// Total weight of the validation instances.
    pub validation_weight: f64,
    /// Inclusive lower time bound of the validation window.
    pub start: DateTime<Utc>,
    /// Exclusive upper time bound; saturates at the latest representable time.
    pub end: DateTime<Utc>,
}

/// Iterator over the rounds of a sliding-window walk.
///
/// Created by [`SortedDataset::slices`].
#[derive(Debug, Clone)]
pub struct TimeSlices<'a, L> {
    dataset: &'a SortedDataset<L>,
    next: usize,
    duration: TimeDelta,
    round: usize,
}

impl<L: Label> Iterator for TimeSlices<'_, L> {
    type Item = TimeSlice;

    fn next(&mut self) -> Option<TimeSlice> {
        let times = self.dataset.times();
        let start = *times.get(self.next)?;
        let training_end = self.dataset.first_at_or_after(start);

        let (end, validation_end) = match start.checked_add_signed(self.duration) {
            Some(end) => (end, self.dataset.first_at_or_after(end)),
            None => (DateTime::<Utc>::MAX_UTC, times.len()),
        };
        // A window always holds at least the instance at `start`.
        let validation_end = validation_end.max(self.next + 1);

        let validation_weight = self.dataset.instances[training_end..validation_end]
            .iter()
            .map(Instance::weight)
            .sum();
        let slice = TimeSlice {
            round: self.round,
            training: 0..training_end,
            validation: training_end..validation_end,
            validation_weight,
            start,
            end,
        };
        self.next = validation_end;
        self.round += 1;
        Some(slice)
    }
}

impl<L: Label> FusedIterator for TimeSlices<'_, L> {}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use timber_tree::Attributes;

    use super::*;

    fn at_hour(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + TimeDelta::hours(hour)
    }

    /// Instances labelled with their hour, in the given (unsorted) order.
    fn dataset(hours: &[i64]) -> SortedDataset<i64> {
        let raw = hours
            .iter()
            .map(|&h| Instance::new(Attributes::new().with("hour", h), h));
        SortedDataset::from_raw(raw, &|i: &Instance<i64>| at_hour(*i.label()))
    }

    #[test]
    fn sorts_by_time() {
        let ds = dataset(&[5, 1, 3, 2, 4]);
        let labels: Vec<i64> = ds.instances().iter().map(|i| *i.label()).collect();
        assert_eq!(labels, vec![1, 2, 3, 4, 5]);
        assert!(ds.times().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn sort_is_stable_for_equal_times() {
        let raw = (0..6).map(|i| Instance::new(Attributes::new().with("seq", i), i));
        let by_parity = |i: &Instance<i32>| at_hour(i64::from(*i.label() % 2));
        let ds = SortedDataset::from_raw(raw, &by_parity);
        let labels: Vec<i32> = ds.instances().iter().map(|i| *i.label()).collect();
        assert_eq!(labels, vec![0, 2, 4, 1, 3, 5]);
    }

    #[test]
    fn hourly_walk() {
        // 8 instances, one per hour; train on 6, validate in 1h slices.
        let ds = dataset(&[0, 1, 2, 3, 4, 5, 6, 7]);
        let slices: Vec<TimeSlice> = ds.slices(6, TimeDelta::hours(1)).collect();
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].training, 0..6);
        assert_eq!(slices[0].validation, 6..7);
        assert_eq!(slices[0].start, at_hour(6));
        assert_eq!(slices[0].end, at_hour(7));
        assert_eq!(slices[1].training, 0..7);
        assert_eq!(slices[1].validation, 7..8);
        assert_eq!(slices[1].round, 1);
    }

    #[test]
    fn wide_slice_takes_everything_remaining() {
        let ds = dataset(&[0, 1, 2, 3]);
        let slices: Vec<TimeSlice> = ds.slices(2, TimeDelta::days(365)).collect();
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].validation, 2..4);
        assert!((slices[0].validation_weight - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gaps_are_skipped() {
        // A 10h hole after hour 3 does not produce empty rounds.
        let ds = dataset(&[0, 1, 2, 3, 14, 15]);
        let slices: Vec<TimeSlice> = ds.slices(3, TimeDelta::hours(2)).collect();
        let validations: Vec<Range<usize>> = slices.iter().map(|s| s.validation.clone()).collect();
        assert_eq!(validations, vec![3..4, 4..6]);
        assert_eq!(slices[1].start, at_hour(14));
    }

    #[test]
    fn ties_at_anchor_move_to_validation() {
        let ds = dataset(&[0, 1, 2, 2, 2, 3]);
        let first = ds.slices(3, TimeDelta::hours(1)).next().unwrap();
        assert_eq!(first.training, 0..2);
        assert_eq!(first.validation, 2..5);
    }

    #[test]
    fn windows_partition_the_validated_suffix() {
        let ds = dataset(&[0, 0, 1, 3, 3, 4, 6, 9, 9, 10, 11]);
        let slices: Vec<TimeSlice> = ds.slices(4, TimeDelta::hours(2)).collect();
        let mut expected_start = slices[0].validation.start;
        for (round, slice) in slices.iter().enumerate() {
            assert_eq!(slice.round, round);
            assert_eq!(slice.training.end, slice.validation.start);
            assert_eq!(slice.validation.start, expected_start);
            assert!(!slice.validation.is_empty());
            for &t in &ds.times()[slice.validation.clone()] {
                assert!(t >= slice.start && t < slice.end);
            }
            expected_start = slice.validation.end;
        }
        assert_eq!(expected_start, ds.len());
    }

    #[test]
    fn saturates_at_latest_time() {
        let raw = vec![
            Instance::new(Attributes::new(), 0),
            Instance::new(Attributes::new(), 1),
        ];
        let ds = SortedDataset::from_raw(raw, &|i: &Instance<i32>| {
            if *i.label() == 0 {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            }
        });
        let slices: Vec<TimeSlice> = ds.slices(1, TimeDelta::days(1)).collect();
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].validation, 1..2);
        assert_eq!(slices[0].end, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn start_past_end_yields_nothing() {
        let ds = dataset(&[0, 1]);
        assert_eq!(ds.slices(2, TimeDelta::hours(1)).count(), 0);
        assert_eq!(ds.slices(9, TimeDelta::hours(1)).count(), 0);
    }
}
