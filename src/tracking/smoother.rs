use crate::tracking::SmoothingState;
use crate::types::FormantEstimate;

#[derive(Clone, Copy, Debug)]
struct Exponential1D {
    value: Option<f64>,
}

impl Exponential1D {
    fn new() -> Self {
        Self { value: None }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn update(&mut self, z: f64, alpha: f64) -> f64 {
        let next = match self.value {
            Some(prev) => alpha * prev + (1.0 - alpha) * z,
            None => z,
        };
        self.value = Some(next);
        next
    }

    fn position(&self) -> Option<f64> {
        self.value
    }
}

/// Independent exponential smoothing of F1 and F2.
///
/// `alpha` weights the previous value; the first sample passes through.
#[derive(Clone, Debug)]
pub struct FormantSmoother {
    f1: Exponential1D,
    f2: Exponential1D,
    alpha: f64,
}

impl FormantSmoother {
    pub fn new(alpha: f64) -> Self {
        Self {
            f1: Exponential1D::new(),
            f2: Exponential1D::new(),
            alpha,
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn reset(&mut self) {
        self.f1.reset();
        self.f2.reset();
    }

    pub fn update(&mut self, raw: FormantEstimate) -> FormantEstimate {
        let f1 = self.f1.update(raw.f1, self.alpha);
        let f2 = self.f2.update(raw.f2, self.alpha);
        FormantEstimate { f1, f2 }
    }

    pub fn state(&self) -> SmoothingState {
        SmoothingState {
            f1: self.f1.position(),
            f2: self.f2.position(),
        }
    }
}
