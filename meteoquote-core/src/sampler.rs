//! Point-in-time and daily-peak extraction from hourly series.

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::PayloadError;

/// An hourly series whose timestamps are validated to be ascending.
#[derive(Debug, Clone, Copy)]
pub struct TimeSeries<'a, T> {
    times: &'a [NaiveDateTime],
    values: &'a [T],
}

/// What [`TimeSeries::sample`] extracted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<T> {
    /// Value at the first timestamp not before `now`, or the first value when
    /// every timestamp is in the past. `T::default()` when the series is empty.
    pub current: T,
    pub current_found: bool,
    pub peak: T,
    /// `None` when no sample falls on `today`.
    pub peak_time: Option<NaiveDateTime>,
}

impl<'a, T> TimeSeries<'a, T>
where
    T: Copy + PartialOrd + Default,
{
    pub fn new(
        name: &'static str,
        times: &'a [NaiveDateTime],
        values: &'a [T],
    ) -> Result<Self, PayloadError> {
        if times.len() != values.len() {
            return Err(PayloadError::LengthMismatch {
                field: name,
                expected: times.len(),
                actual: values.len(),
            });
        }

        if times.windows(2).any(|w| w[0] > w[1]) {
            return Err(PayloadError::Unsorted(name));
        }

        Ok(Self { times, values })
    }

    /// `fallback_peak` is used when nothing is dated `today`; zero otherwise.
    pub fn sample(&self, now: NaiveDateTime, today: NaiveDate, fallback_peak: Option<T>) -> Sample<T> {
        let current = self
            .times
            .iter()
            .position(|t| *t >= now)
            .map(|idx| self.values[idx])
            .or_else(|| self.values.first().copied());

        let mut peak: Option<(T, NaiveDateTime)> = None;
        for (time, value) in self.times.iter().zip(self.values) {
            if time.date() != today {
                continue;
            }
            // strict: the first occurrence of the max wins
            let replace = match peak {
                Some((best, _)) => *value > best,
                None => true,
            };
            if replace {
                peak = Some((*value, *time));
            }
        }

        let (peak, peak_time) = match peak {
            Some((value, time)) => (value, Some(time)),
            None => (fallback_peak.unwrap_or_default(), None),
        };

        Sample {
            current: current.unwrap_or_default(),
            current_found: current.is_some(),
            peak,
            peak_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid datetime")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date")
    }

    #[test]
    fn current_is_first_sample_not_before_now() {
        let times = [at(10, 8), at(10, 9), at(10, 10), at(10, 11)];
        let values = [1.0, 2.0, 3.0, 4.0];
        let series = TimeSeries::new("uv_index", &times, &values).unwrap();

        let now = at(10, 9) + chrono::Duration::minutes(30);
        let sample = series.sample(now, today(), None);

        assert!(sample.current_found);
        assert_eq!(sample.current, 3.0);
    }

    #[test]
    fn exact_match_counts_as_current() {
        let times = [at(10, 8), at(10, 9)];
        let values = [1, 7];
        let series = TimeSeries::new("european_aqi", &times, &values).unwrap();

        assert_eq!(series.sample(at(10, 9), today(), None).current, 7);
    }

    #[test]
    fn all_past_falls_back_to_first_value() {
        let times = [at(10, 8), at(10, 9)];
        let values = [5.5, 6.5];
        let series = TimeSeries::new("uv_index", &times, &values).unwrap();

        let sample = series.sample(at(11, 0), today(), None);
        assert!(sample.current_found);
        assert_eq!(sample.current, 5.5);
    }

    #[test]
    fn empty_series_is_not_found() {
        let series = TimeSeries::<f64>::new("uv_index", &[], &[]).unwrap();
        let sample = series.sample(at(10, 0), today(), None);

        assert!(!sample.current_found);
        assert_eq!(sample.current, 0.0);
        assert_eq!(sample.peak, 0.0);
        assert_eq!(sample.peak_time, None);
    }

    #[test]
    fn peak_tie_keeps_first_occurrence() {
        let times = [at(10, 6), at(10, 7), at(10, 8), at(10, 9)];
        let values = [1, 5, 5, 3];
        let series = TimeSeries::new("european_aqi", &times, &values).unwrap();

        let sample = series.sample(at(10, 0), today(), None);
        assert_eq!(sample.peak, 5);
        assert_eq!(sample.peak_time, Some(at(10, 7)));
    }

    #[test]
    fn peak_ignores_other_days() {
        let times = [at(9, 23), at(10, 12), at(11, 12)];
        let values = [9.0, 4.0, 10.0];
        let series = TimeSeries::new("uv_index", &times, &values).unwrap();

        let sample = series.sample(at(10, 0), today(), None);
        assert_eq!(sample.peak, 4.0);
        assert_eq!(sample.peak_time, Some(at(10, 12)));
    }

    #[test]
    fn all_zero_day_still_reports_peak_time() {
        let times = [at(10, 0), at(10, 1)];
        let values = [0, 0];
        let series = TimeSeries::new("european_aqi", &times, &values).unwrap();

        let sample = series.sample(at(10, 0), today(), None);
        assert_eq!(sample.peak, 0);
        assert_eq!(sample.peak_time, Some(at(10, 0)));
    }

    #[test]
    fn no_sample_today_uses_fallback() {
        let times = [at(11, 10), at(11, 11)];
        let values = [3.0, 4.0];
        let series = TimeSeries::new("uv_index", &times, &values).unwrap();

        let with_fallback = series.sample(at(10, 0), today(), Some(6.2));
        assert_eq!(with_fallback.peak, 6.2);
        assert_eq!(with_fallback.peak_time, None);

        let without = series.sample(at(10, 0), today(), None);
        assert_eq!(without.peak, 0.0);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let times = [at(10, 0), at(10, 1)];
        let values = [1.0];
        let err = TimeSeries::new("uv_index", &times, &values).unwrap_err();

        assert_eq!(
            err,
            PayloadError::LengthMismatch { field: "uv_index", expected: 2, actual: 1 }
        );
    }

    #[test]
    fn rejects_unsorted_series() {
        let times = [at(10, 2), at(10, 1)];
        let values = [1.0, 2.0];
        let err = TimeSeries::new("uv_index", &times, &values).unwrap_err();

        assert_eq!(err, PayloadError::Unsorted("uv_index"));
    }
}
