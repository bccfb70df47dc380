//! Easing curves mapping time progress `[0,1]` to value progress `[0,1]`.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Easing {
    /// `1 - (1-p)^3`, used by stat counters.
    CubicOut,
    /// `1 - 2^(-10p)`, exactly 1 at `p == 1`; used by magnitude counters.
    ExpoOut,
}

impl Easing {
    #[inline]
    pub fn apply(self, progress: f64) -> f64 {
        match self {
            Easing::CubicOut => ease_out_cubic(progress),
            Easing::ExpoOut => ease_out_expo(progress),
        }
    }
}

#[inline]
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

#[inline]
pub fn ease_out_expo(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    // 1 - 2^-10 is not 1; the end point is pinned explicitly.
    if p == 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * p)
    }
}
