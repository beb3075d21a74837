//! Feedback correction from past watering accuracy.
//!
//! A prior event's recorded error is damped by a factor that depends on the
//! plant type's thirstiness, then clamped to a fraction of the base volume
//! so a single bad data point cannot run away with the recommendation.
//!
//! Damping tiers (by type coefficient):
//! - up to 25: 0.2
//! - up to 50: 0.4
//! - up to 75: 0.6
//! - above: 0.8

/// Default share of the base volume the feedback term may reach.
pub const DEFAULT_CAP_RATIO: f64 = 0.3;

/// Damping factor for a plant type coefficient.
pub fn damping(type_coefficient: u8) -> f64 {
    match type_coefficient {
        0..=25 => 0.2,
        26..=50 => 0.4,
        51..=75 => 0.6,
        _ => 0.8,
    }
}

/// Converts raw historical error into a bounded feedback term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorCorrection {
    cap_ratio: f64,
}

impl Default for ErrorCorrection {
    fn default() -> Self {
        Self {
            cap_ratio: DEFAULT_CAP_RATIO,
        }
    }
}

impl ErrorCorrection {
    /// Create an engine with a custom cap ratio. Ratios outside
    /// `[0.0, 1.0]` fall back to the default.
    pub fn with_cap_ratio(cap_ratio: f64) -> Self {
        if (0.0..=1.0).contains(&cap_ratio) {
            Self { cap_ratio }
        } else {
            tracing::warn!(cap_ratio, "invalid feedback cap ratio, using default");
            Self::default()
        }
    }

    /// The configured cap ratio.
    pub fn cap_ratio(&self) -> f64 {
        self.cap_ratio
    }

    /// Largest absolute feedback allowed for a base volume.
    pub fn cap(&self, base_volume_ml: u32) -> i32 {
        let cap = (base_volume_ml as f64 * self.cap_ratio).round();
        cap.min(i32::MAX as f64) as i32
    }

    /// Feedback term in mL for a prior error.
    pub fn correction(&self, prior_error_ml: i32, type_coefficient: u8, base_volume_ml: u32) -> i32 {
        let adjusted = (prior_error_ml as f64 * damping(type_coefficient)).round() as i32;
        let cap = self.cap(base_volume_ml);
        adjusted.clamp(-cap, cap)
    }

    /// Feedback term for an optional prior error. No history means no
    /// correction.
    pub fn feedback(
        &self,
        prior_error_ml: Option<i32>,
        type_coefficient: u8,
        base_volume_ml: u32,
    ) -> i32 {
        prior_error_ml
            .map(|err| self.correction(err, type_coefficient, base_volume_ml))
            .unwrap_or(0)
    }
}

/// Feedback term with the default 30% cap.
pub fn correction(prior_error_ml: i32, type_coefficient: u8, base_volume_ml: u32) -> i32 {
    ErrorCorrection::default().correction(prior_error_ml, type_coefficient, base_volume_ml)
}
