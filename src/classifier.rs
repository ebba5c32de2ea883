//! Nearest-vowel classification over a short history of chart points.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chart::{ChartGeometry, PrototypeLayout};
use crate::history::{History, HistoryPoint, PointWeight};
use crate::types::FrequencyRange;
use crate::vowels::VowelPrototype;

/// F1 deviation that counts as one distance unit.
pub const F1_SCALE_HZ: f64 = 100.0;
/// F2 deviation that counts as one distance unit.
pub const F2_SCALE_HZ: f64 = 200.0;

/// Scaled Euclidean distance between a point and a prototype.
pub fn weighted_distance(f1: f64, f2: f64, prototype: &VowelPrototype) -> f64 {
    let d1 = (f1 - prototype.f1) / F1_SCALE_HZ;
    let d2 = (f2 - prototype.f2) / F2_SCALE_HZ;
    (d1 * d1 + d2 * d2).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Pixel extent plus the accepted F1/F2 domain.
    pub chart: ChartGeometry,
    pub capacity: usize,
    pub distance_threshold: f64,
    /// Time for an unweighted point to fade out completely.
    pub fade_window_secs: f64,
}

impl ClassifierConfig {
    pub const LIVE_CAPACITY: usize = 5;
    pub const MAX_CAPACITY: usize = 100;
    pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 3.0;
    pub const DEFAULT_FADE_WINDOW_SECS: f64 = 2.0;

    pub fn live() -> Self {
        Self::default()
    }

    pub fn batch(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn f1_range(&self) -> FrequencyRange {
        self.chart.f1_range
    }

    pub fn f2_range(&self) -> FrequencyRange {
        self.chart.f2_range
    }

    pub fn fade_window(&self) -> crate::Result<Duration> {
        Duration::try_from_secs_f64(self.fade_window_secs).map_err(|_| {
            crate::invalid(format!(
                "fade window must be a representable non-negative number of seconds, got {}",
                self.fade_window_secs
            ))
        })
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.capacity == 0 || self.capacity > Self::MAX_CAPACITY {
            return Err(crate::invalid(format!(
                "history capacity must lie in 1..={}, got {}",
                Self::MAX_CAPACITY,
                self.capacity
            )));
        }
        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(crate::invalid(format!(
                "distance threshold must be positive, got {}",
                self.distance_threshold
            )));
        }
        self.fade_window()?;
        self.chart.validate()
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            chart: ChartGeometry::default(),
            capacity: Self::LIVE_CAPACITY,
            distance_threshold: Self::DEFAULT_DISTANCE_THRESHOLD,
            fade_window_secs: Self::DEFAULT_FADE_WINDOW_SECS,
        }
    }
}

/// The closest prototype to a point and how far away it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestVowel {
    /// Position in the prototype table.
    pub index: usize,
    pub prototype: &'static VowelPrototype,
    pub distance: f64,
}

impl NearestVowel {
    pub fn label(&self) -> &'static str {
        self.prototype.label
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    /// No point in the history.
    Empty,
    /// Nearest prototype is beyond the distance threshold.
    NoMatch(NearestVowel),
    Match(NearestVowel),
}

impl Classification {
    pub fn nearest(&self) -> Option<&NearestVowel> {
        match self {
            Classification::Empty => None,
            Classification::NoMatch(n) | Classification::Match(n) => Some(n),
        }
    }

    pub fn matched(&self) -> Option<&NearestVowel> {
        match self {
            Classification::Match(n) => Some(n),
            _ => None,
        }
    }

    /// Index of the prototype to highlight, if any.
    pub fn highlight(&self) -> Option<usize> {
        self.matched().map(|n| n.index)
    }
}

pub struct VowelClassifier {
    config: ClassifierConfig,
    prototypes: &'static [VowelPrototype],
    layout: PrototypeLayout,
    history: History,
    fade_window: Duration,
}

impl VowelClassifier {
    pub fn new(config: ClassifierConfig, prototypes: &'static [VowelPrototype]) -> crate::Result<Self> {
        config.validate()?;
        if prototypes.is_empty() {
            return Err(crate::invalid("prototype table is empty"));
        }
        Ok(Self {
            fade_window: config.fade_window()?,
            layout: config.chart.layout(prototypes),
            history: History::with_capacity(config.capacity),
            prototypes,
            config,
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn chart(&self) -> &ChartGeometry {
        &self.config.chart
    }

    pub fn prototypes(&self) -> &'static [VowelPrototype] {
        self.prototypes
    }

    pub fn layout(&self) -> &PrototypeLayout {
        &self.layout
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Adds a point now. Returns `false` when the point lies outside the chart domain.
    pub fn add_point(&mut self, f1: f64, f2: f64, weight: Option<f64>) -> bool {
        self.add_point_at(f1, f2, weight, Instant::now())
    }

    pub fn add_point_at(&mut self, f1: f64, f2: f64, weight: Option<f64>, now: Instant) -> bool {
        if !self.config.f1_range().contains(f1) || !self.config.f2_range().contains(f2) {
            debug!("[classifier] dropped out-of-domain point f1 {f1:.1} f2 {f2:.1}");
            return false;
        }
        let weight = match weight {
            Some(w) if w.is_finite() => PointWeight::Fixed(w.clamp(0.0, 1.0)),
            Some(w) => {
                debug!("[classifier] dropped point with weight {w}");
                return false;
            }
            None => PointWeight::Decaying { inserted_at: now },
        };
        let (x, y) = self.config.chart.to_chart(f1, f2);
        self.history.push(HistoryPoint { f1, f2, x, y, weight });
        true
    }

    /// Classifies the most recent point only.
    pub fn classify(&self) -> Classification {
        match self.history.latest() {
            Some(p) => self.classify_point(p.f1, p.f2),
            None => Classification::Empty,
        }
    }

    pub fn classify_point(&self, f1: f64, f2: f64) -> Classification {
        let prototypes: &'static [VowelPrototype] = self.prototypes;
        let mut best: Option<NearestVowel> = None;
        for (index, prototype) in prototypes.iter().enumerate() {
            let distance = weighted_distance(f1, f2, prototype);
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(NearestVowel {
                    index,
                    prototype,
                    distance,
                });
            }
        }
        match best {
            Some(n) if n.distance <= self.config.distance_threshold => Classification::Match(n),
            Some(n) => Classification::NoMatch(n),
            None => Classification::Empty,
        }
    }

    /// Display weights of the history, oldest first.
    pub fn weights_at(&self, now: Instant) -> Vec<f64> {
        self.history
            .iter()
            .map(|p| p.weight.weight_at(now, self.fade_window))
            .collect()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
