// Traffic delta sampler: diffs consecutive absolute counter snapshots

use crate::models::{TrafficDelta, TrafficRates, TrafficSample};
use std::time::Duration;

/// Holds the previous absolute sample. Not synchronized: one owner drives
/// `sample`, callers sharing it across tasks must wrap it in a mutex.
#[derive(Debug, Clone)]
pub struct DeltaSampler {
    previous: Option<TrafficSample>,
    interval_s: f64,
}

impl DeltaSampler {
    pub fn new(interval: Duration) -> Self {
        Self {
            previous: None,
            interval_s: interval.as_secs_f64(),
        }
    }

    /// A sampler whose first `sample` call already yields a delta.
    pub fn with_baseline(interval: Duration, baseline: TrafficSample) -> Self {
        Self {
            previous: Some(baseline),
            interval_s: interval.as_secs_f64(),
        }
    }

    pub fn previous(&self) -> Option<&TrafficSample> {
        self.previous.as_ref()
    }

    pub fn interval_s(&self) -> f64 {
        self.interval_s
    }

    /// Stores `current` and returns its difference to the previous sample,
    /// or `None` when there was no previous sample yet. Counter resets show
    /// up as negative values.
    pub fn sample(&mut self, current: TrafficSample) -> Option<TrafficDelta> {
        let previous = self.previous.replace(current)?;
        Some(TrafficDelta {
            sent_bytes: diff(current.sent_bytes, previous.sent_bytes),
            recv_bytes: diff(current.recv_bytes, previous.recv_bytes),
            packets_sent: diff(current.packets_sent, previous.packets_sent),
            packets_recv: diff(current.packets_recv, previous.packets_recv),
            err_in: diff(current.err_in, previous.err_in),
            err_out: diff(current.err_out, previous.err_out),
            drop_in: diff(current.drop_in, previous.drop_in),
            drop_out: diff(current.drop_out, previous.drop_out),
            interval_s: self.interval_s,
        })
    }
}

fn diff(current: u64, previous: u64) -> i64 {
    (current as i128 - previous as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

impl TrafficDelta {
    /// Each delta divided by `interval_s`. All zero if the interval is not positive.
    pub fn rates(&self) -> TrafficRates {
        if self.interval_s <= 0.0 {
            return TrafficRates::default();
        }
        let per_sec = |v: i64| v as f64 / self.interval_s;
        TrafficRates {
            sent_bytes_per_sec: per_sec(self.sent_bytes),
            recv_bytes_per_sec: per_sec(self.recv_bytes),
            packets_sent_per_sec: per_sec(self.packets_sent),
            packets_recv_per_sec: per_sec(self.packets_recv),
            err_in_per_sec: per_sec(self.err_in),
            err_out_per_sec: per_sec(self.err_out),
            drop_in_per_sec: per_sec(self.drop_in),
            drop_out_per_sec: per_sec(self.drop_out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sent(bytes: u64) -> TrafficSample {
        TrafficSample {
            sent_bytes: bytes,
            ..Default::default()
        }
    }

    #[test]
    fn first_sample_only_sets_baseline() {
        let mut sampler = DeltaSampler::new(Duration::from_secs(1));
        assert!(sampler.sample(sent(100)).is_none());
        assert_eq!(sampler.previous(), Some(&sent(100)));
    }

    #[test]
    fn deltas_follow_baseline_and_surface_wraparound() {
        let mut sampler = DeltaSampler::with_baseline(Duration::from_secs(1), sent(100));

        let d = sampler.sample(sent(150)).unwrap();
        assert_eq!(d.sent_bytes, 50);
        assert_eq!(d.interval_s, 1.0);

        let d = sampler.sample(sent(120)).unwrap();
        assert_eq!(d.sent_bytes, -30);
        assert_eq!(sampler.previous(), Some(&sent(120)));
    }

    #[test]
    fn all_eight_counters_are_diffed() {
        let base = TrafficSample {
            sent_bytes: 10,
            recv_bytes: 20,
            packets_sent: 1,
            packets_recv: 2,
            err_in: 0,
            err_out: 0,
            drop_in: 5,
            drop_out: 5,
        };
        let next = TrafficSample {
            sent_bytes: 30,
            recv_bytes: 60,
            packets_sent: 4,
            packets_recv: 8,
            err_in: 1,
            err_out: 2,
            drop_in: 5,
            drop_out: 3,
        };
        let mut sampler = DeltaSampler::with_baseline(Duration::from_millis(500), base);
        let d = sampler.sample(next).unwrap();
        assert_eq!(
            (d.sent_bytes, d.recv_bytes, d.packets_sent, d.packets_recv),
            (20, 40, 3, 6)
        );
        assert_eq!((d.err_in, d.err_out, d.drop_in, d.drop_out), (1, 2, 0, -2));
        assert_eq!(d.interval_s, 0.5);

        let r = d.rates();
        assert_eq!(r.sent_bytes_per_sec, 40.0);
        assert_eq!(r.drop_out_per_sec, -4.0);
    }

    #[test]
    fn diff_saturates_at_i64_bounds() {
        assert_eq!(diff(u64::MAX, 0), i64::MAX);
        assert_eq!(diff(0, u64::MAX), i64::MIN);
    }
}
