/// Easing functions used to map normalized animation progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Linear interpolation.
    Linear,
    /// Quadratic ease-out, `1 - (1 - t)^2`.
    OutQuad,
}

impl Ease {
    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// Scalar motion from `from` to `to` over `[start, start + duration]`.
///
/// Pinned to `from` before `start` and to exactly `to` after the end.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub start: f64,
    pub duration: f64,
    pub ease: Ease,
}

impl Tween {
    pub fn sample(&self, t: f64) -> f64 {
        if t <= self.start {
            return self.from;
        }
        if self.duration <= 0.0 || t >= self.start + self.duration {
            return self.to;
        }
        let p = (t - self.start) / self.duration;
        self.from + (self.to - self.from) * self.ease.apply(p)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
