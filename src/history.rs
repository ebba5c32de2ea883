use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Display weight (opacity) of a history point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointWeight {
    /// Caller-supplied, never changes.
    Fixed(f64),
    /// Fades linearly from 1 to 0 over the fade window after insertion.
    Decaying { inserted_at: Instant },
}

impl PointWeight {
    pub fn weight_at(&self, now: Instant, fade_window: Duration) -> f64 {
        match *self {
            PointWeight::Fixed(w) => w,
            PointWeight::Decaying { inserted_at } => {
                if fade_window.is_zero() {
                    return 0.0;
                }
                let elapsed = now.saturating_duration_since(inserted_at).as_secs_f64();
                (1.0 - elapsed / fade_window.as_secs_f64()).max(0.0)
            }
        }
    }
}

/// One accepted (F1, F2) pair together with its chart position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    pub f1: f64,
    pub f2: f64,
    pub x: f64,
    pub y: f64,
    pub weight: PointWeight,
}

/// Fixed-capacity FIFO of recent points, oldest first.
#[derive(Debug, Clone)]
pub struct History {
    points: VecDeque<HistoryPoint>,
    capacity: usize,
}

impl History {
    /// `capacity` must be non-zero; the classifier validates it before building one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends `point`, returning the evicted oldest point when full.
    pub fn push(&mut self, point: HistoryPoint) -> Option<HistoryPoint> {
        let evicted = if self.points.len() >= self.capacity {
            self.points.pop_front()
        } else {
            None
        };
        self.points.push_back(point);
        evicted
    }

    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryPoint> + ExactSizeIterator {
        self.points.iter()
    }

    pub fn snapshot(&self) -> Vec<HistoryPoint> {
        self.points.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> HistoryPoint {
        HistoryPoint {
            f1: 300.0 + i as f64,
            f2: 1000.0 + i as f64,
            x: i as f64,
            y: i as f64,
            weight: PointWeight::Fixed(1.0),
        }
    }

    #[test]
    fn keeps_last_capacity_points_in_order() {
        let capacity = 5;
        let k = 7;
        let mut h = History::with_capacity(capacity);
        for i in 0..capacity + k {
            h.push(point(i));
            assert!(h.len() <= capacity);
        }
        let kept: Vec<f64> = h.iter().map(|p| p.f1).collect();
        let expected: Vec<f64> = (k..capacity + k).map(|i| point(i).f1).collect();
        assert_eq!(kept, expected);
        assert_eq!(h.latest().map(|p| p.x), Some((capacity + k - 1) as f64));
    }

    #[test]
    fn push_reports_eviction() {
        let mut h = History::with_capacity(2);
        assert!(h.push(point(0)).is_none());
        assert!(h.push(point(1)).is_none());
        assert_eq!(h.push(point(2)), Some(point(0)));
    }

    #[test]
    fn clear_empties() {
        let mut h = History::with_capacity(3);
        h.push(point(0));
        h.clear();
        assert!(h.is_empty());
        assert!(h.latest().is_none());
        assert_eq!(h.capacity(), 3);
    }

    #[test]
    fn decaying_weight_fades_linearly() {
        let t0 = Instant::now();
        let window = Duration::from_secs(2);
        let w = PointWeight::Decaying { inserted_at: t0 };
        assert!((w.weight_at(t0, window) - 1.0).abs() < 1e-12);
        assert!((w.weight_at(t0 + Duration::from_millis(500), window) - 0.75).abs() < 1e-9);
        assert_eq!(w.weight_at(t0 + Duration::from_secs(3), window), 0.0);
    }

    #[test]
    fn fixed_weight_ignores_time() {
        let t0 = Instant::now();
        let w = PointWeight::Fixed(0.4);
        assert_eq!(w.weight_at(t0 + Duration::from_secs(60), Duration::from_secs(2)), 0.4);
    }
}
