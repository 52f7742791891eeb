//! Parameters structure for TargetSampler

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::TargetSamplerError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the target sampler.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Rate at which sampling is attempted.
    ///
    /// Units: Hz
    pub frequency_hz: f64,

    /// Inner radius of the shell. Axis draws with a magnitude at or below this
    /// are redrawn once.
    ///
    /// Units: meters
    pub r_min_m: f64,

    /// Outer radius of the shell, also the half width of the draw range.
    ///
    /// Units: meters
    pub r_max_m: f64,

    /// Offset added to the z coordinate of accepted candidates.
    ///
    /// Units: meters
    pub z_offset_m: f64,

    /// Margin kept inside both shell boundaries.
    ///
    /// Units: meters
    pub tolerance_m: f64,

    /// Seed for the random number generator. If not given the generator is
    /// seeded from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            frequency_hz: 2.0,
            r_min_m: 0.03,
            r_max_m: 0.53,
            z_offset_m: 0.2,
            tolerance_m: 0.01,
            seed: None,
        }
    }
}

impl Params {
    /// Check the shell is well formed.
    pub fn validate(&self) -> Result<(), TargetSamplerError> {
        let finite = [
            self.frequency_hz,
            self.r_min_m,
            self.r_max_m,
            self.z_offset_m,
            self.tolerance_m,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(TargetSamplerError::InvalidParams(String::from(
                "all parameters must be finite",
            )));
        }

        if self.frequency_hz <= 0.0 {
            return Err(TargetSamplerError::InvalidParams(format!(
                "frequency_hz must be positive, found {}",
                self.frequency_hz
            )));
        }

        if self.r_min_m < 0.0 || self.r_min_m >= self.r_max_m {
            return Err(TargetSamplerError::InvalidParams(format!(
                "expected 0 <= r_min_m < r_max_m, found r_min_m = {}, r_max_m = {}",
                self.r_min_m, self.r_max_m
            )));
        }

        if self.tolerance_m <= 0.0 || self.tolerance_m >= self.r_max_m - self.r_min_m {
            return Err(TargetSamplerError::InvalidParams(format!(
                "expected 0 < tolerance_m < r_max_m - r_min_m, found {}",
                self.tolerance_m
            )));
        }

        Ok(())
    }

    /// Lower bound on the squared norm of an accepted candidate.
    ///
    /// Units: meters^2
    pub fn min_squared_norm_m2(&self) -> f64 {
        (self.r_min_m + self.tolerance_m).powi(2)
    }

    /// Upper bound on the squared norm of an accepted candidate.
    ///
    /// Units: meters^2
    pub fn max_squared_norm_m2(&self) -> f64 {
        (self.r_max_m - self.tolerance_m).powi(2)
    }

    /// Period of one sampler tick.
    ///
    /// Units: seconds
    pub fn period_s(&self) -> f64 {
        1.0 / self.frequency_hz
    }
}
