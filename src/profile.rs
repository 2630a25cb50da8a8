//! Per-call statistics over the timed trials of one method.

use core::time::Duration;

use serde::Serialize;

/// Statistics of the individual trial durations of one method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Profile {
    /// Number of timed calls.
    pub calls: usize,
    /// Sum of all calls.
    #[serde(with = "millis")]
    pub total: Duration,
    /// Arithmetic mean per call.
    #[serde(with = "millis")]
    pub mean: Duration,
    /// Median per call.
    #[serde(with = "millis")]
    pub median: Duration,
    /// Fastest call.
    #[serde(with = "millis")]
    pub min: Duration,
    /// Slowest call.
    #[serde(with = "millis")]
    pub max: Duration,
    /// Sample standard deviation. Zero for a single call.
    #[serde(with = "millis")]
    pub std_dev: Duration,
    /// 95th percentile per call.
    #[serde(with = "millis")]
    pub p95: Duration,
}

impl Profile {
    /// Summarizes `samples`, or returns `None` when there are none.
    pub fn from_samples(samples: &[Duration]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mut sorted: Vec<f64> = samples.iter().map(|d| d.as_nanos() as f64).collect();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = if sorted.len() > 1 {
            sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
        } else {
            0.0
        };

        Some(Self {
            calls: samples.len(),
            total: samples.iter().sum(),
            mean: nanos(mean),
            median: nanos(percentile(&sorted, 50.0)),
            min: nanos(sorted[0]),
            max: nanos(sorted[sorted.len() - 1]),
            std_dev: nanos(variance.sqrt()),
            p95: nanos(percentile(&sorted, 95.0)),
        })
    }
}

fn nanos(value: f64) -> Duration {
    Duration::from_nanos(value.round() as u64)
}

/// The `p`th percentile of ascending `sorted` values, interpolating linearly between the
/// nearest ranks.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted {
        [] => 0.0,
        [only] => *only,
        _ => {
            let rank = (p / 100.0) * (sorted.len() - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = (lower + 1).min(sorted.len() - 1);
            let fraction = rank - lower as f64;
            sorted[lower] + fraction * (sorted[upper] - sorted[lower])
        }
    }
}

/// Serializes a [`Duration`] as fractional milliseconds.
pub(crate) mod millis {
    use core::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_nanos() as f64 / 1e6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_millis).collect()
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 50.0), 3.0);
        assert_eq!(percentile(&sorted, 100.0), 5.0);
        assert!((percentile(&sorted, 95.0) - 4.8).abs() < 1e-12);
        assert_eq!(percentile(&[1.0, 2.0], 50.0), 1.5);
        assert_eq!(percentile(&[7.0], 95.0), 7.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn profile_of_known_samples() {
        let profile = Profile::from_samples(&ms(&[4, 1, 3, 2, 5])).unwrap();
        assert_eq!(profile.calls, 5);
        assert_eq!(profile.total, Duration::from_millis(15));
        assert_eq!(profile.min, Duration::from_millis(1));
        assert_eq!(profile.max, Duration::from_millis(5));
        assert!((profile.mean.as_secs_f64() - 0.003).abs() < 1e-9);
        assert!((profile.median.as_secs_f64() - 0.003).abs() < 1e-9);
        // sqrt(2.5) ms
        assert!((profile.std_dev.as_secs_f64() - 0.001_581_138_8).abs() < 1e-9);
        assert!((profile.p95.as_secs_f64() - 0.0048).abs() < 1e-9);
    }

    #[test]
    fn single_and_empty_samples() {
        assert_eq!(Profile::from_samples(&[]), None);
        let profile = Profile::from_samples(&ms(&[9])).unwrap();
        assert_eq!(profile.std_dev, Duration::ZERO);
        assert_eq!(profile.median, Duration::from_millis(9));
    }

    #[test]
    fn serializes_as_milliseconds() {
        let profile = Profile::from_samples(&ms(&[2, 2])).unwrap();
        let json = serde_json::to_value(profile).unwrap();
        assert_eq!(json["calls"], 2);
        assert_eq!(json["total"], 4.0);
        assert_eq!(json["std_dev"], 0.0);
    }
}
