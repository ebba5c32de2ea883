//! Linear mapping between (F1, F2) and vowel-chart pixels.
//!
//! F2 grows to the left and F1 grows downwards, so front vowels sit on the
//! left and open vowels at the bottom.

use serde::{Deserialize, Serialize};

use crate::types::{FormantEstimate, FrequencyRange};
use crate::vowels::VowelPrototype;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
    /// Inset applied on all four sides.
    pub margin: f64,
    pub f1_range: FrequencyRange,
    pub f2_range: FrequencyRange,
}

impl ChartGeometry {
    pub const DEFAULT_WIDTH: f64 = 600.0;
    pub const DEFAULT_HEIGHT: f64 = 400.0;
    pub const DEFAULT_MARGIN: f64 = 20.0;
    pub const PROTOTYPE_RADIUS: f64 = 15.0;

    pub fn validate(&self) -> crate::Result<()> {
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(crate::invalid(format!("chart margin {} is negative", self.margin)));
        }
        if !(self.plot_width() > 0.0) || !(self.plot_height() > 0.0) {
            return Err(crate::invalid(format!(
                "chart {}x{} leaves no room inside a {} px margin",
                self.width, self.height, self.margin
            )));
        }
        self.f1_range.validate("chart f1 range", None)?;
        self.f2_range.validate("chart f2 range", None)
    }

    fn plot_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    fn plot_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }

    pub fn f2_to_x(&self, f2: f64) -> f64 {
        let r = &self.f2_range;
        self.margin + self.plot_width() * (1.0 - (f2 - r.min) / r.span())
    }

    pub fn f1_to_y(&self, f1: f64) -> f64 {
        let r = &self.f1_range;
        self.margin + self.plot_height() * ((f1 - r.min) / r.span())
    }

    pub fn x_to_f2(&self, x: f64) -> f64 {
        let r = &self.f2_range;
        r.min + (1.0 - (x - self.margin) / self.plot_width()) * r.span()
    }

    pub fn y_to_f1(&self, y: f64) -> f64 {
        let r = &self.f1_range;
        r.min + ((y - self.margin) / self.plot_height()) * r.span()
    }

    pub fn to_chart(&self, f1: f64, f2: f64) -> (f64, f64) {
        (self.f2_to_x(f2), self.f1_to_y(f1))
    }

    /// Formant pair under a pointer position, for hover read-outs.
    pub fn probe(&self, x: f64, y: f64) -> FormantEstimate {
        FormantEstimate {
            f1: self.y_to_f1(y),
            f2: self.x_to_f2(x),
        }
    }

    pub fn layout(&self, prototypes: &[VowelPrototype]) -> PrototypeLayout {
        PrototypeLayout {
            positions: prototypes
                .iter()
                .map(|p| self.to_chart(p.f1, p.f2))
                .collect(),
            radius: Self::PROTOTYPE_RADIUS,
        }
    }
}

impl Default for ChartGeometry {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            margin: Self::DEFAULT_MARGIN,
            f1_range: crate::estimator::EstimatorConfig::F1_BAND,
            f2_range: crate::estimator::EstimatorConfig::F2_BAND,
        }
    }
}

/// Pixel positions of the prototypes, indexed like the prototype table.
#[derive(Debug, Clone, PartialEq)]
pub struct PrototypeLayout {
    positions: Vec<(f64, f64)>,
    radius: f64,
}

impl PrototypeLayout {
    pub fn position(&self, index: usize) -> Option<(f64, f64)> {
        self.positions.get(index).copied()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// First prototype whose marker contains `(x, y)`.
    pub fn prototype_at(&self, x: f64, y: f64) -> Option<usize> {
        self.positions
            .iter()
            .position(|&(px, py)| (x - px).hypot(y - py) <= self.radius)
    }
}
