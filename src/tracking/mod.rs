pub(crate) mod smoother;

use serde::Serialize;

pub use smoother::FormantSmoother;

/// Last smoothed values per axis. `None` means no prior value this session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SmoothingState {
    pub f1: Option<f64>,
    pub f2: Option<f64>,
}

impl SmoothingState {
    pub fn is_empty(&self) -> bool {
        self.f1.is_none() && self.f2.is_none()
    }
}
