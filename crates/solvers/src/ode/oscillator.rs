use thiserror::Error;
use uom::si::{
    angular_velocity::radian_per_second,
    f64::{AngularVelocity, Ratio},
    ratio::ratio,
};

use super::System;

/// A damped harmonic oscillator in first-order form.
///
/// The state is `[x, v]` (position and velocity) and evolves as
///
/// ```text
/// x' = v
/// v' = -2 ζ ω₀ v - ω₀² x
/// ```
///
/// where `ω₀` is the undamped angular frequency and `ζ` the damping ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicOscillator {
    omega_0: AngularVelocity,
    zeta: Ratio,
}

/// Errors that can occur when constructing a [`HarmonicOscillator`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorError {
    #[error("omega_0 must be finite and positive")]
    Frequency,

    #[error("zeta must be finite and non-negative")]
    Damping,
}

impl HarmonicOscillator {
    /// Creates an oscillator with natural frequency `omega_0` and damping
    /// ratio `zeta`.
    ///
    /// # Errors
    ///
    /// Returns an error if `omega_0` is not finite and positive or `zeta` is
    /// not finite and non-negative.
    pub fn new(omega_0: AngularVelocity, zeta: Ratio) -> Result<Self, OscillatorError> {
        let w = omega_0.get::<radian_per_second>();
        if !w.is_finite() || w <= 0.0 {
            return Err(OscillatorError::Frequency);
        }
        let z = zeta.get::<ratio>();
        if !z.is_finite() || z < 0.0 {
            return Err(OscillatorError::Damping);
        }

        Ok(Self { omega_0, zeta })
    }

    /// Creates an oscillator from `omega_0` in rad/s and a plain damping ratio.
    ///
    /// # Errors
    ///
    /// See [`HarmonicOscillator::new`].
    pub fn from_si(omega_0: f64, zeta: f64) -> Result<Self, OscillatorError> {
        Self::new(
            AngularVelocity::new::<radian_per_second>(omega_0),
            Ratio::new::<ratio>(zeta),
        )
    }

    #[must_use]
    pub fn omega_0(&self) -> AngularVelocity {
        self.omega_0
    }

    #[must_use]
    pub fn zeta(&self) -> Ratio {
        self.zeta
    }

    /// Returns the closed-form state at time `t` starting from `y0` at `t = 0`.
    ///
    /// Returns `None` unless the oscillator is underdamped (`ζ < 1`).
    #[must_use]
    pub fn underdamped_solution(&self, y0: [f64; 2], t: f64) -> Option<[f64; 2]> {
        let (w, z) = self.coefficients();
        if z >= 1.0 {
            return None;
        }

        let [x0, v0] = y0;
        let decay = z * w;
        let wd = w * (1.0 - z * z).sqrt();
        let envelope = (-decay * t).exp();
        let (sin, cos) = (wd * t).sin_cos();

        let x = envelope * (x0 * cos + (v0 + decay * x0) / wd * sin);
        let v = envelope * (v0 * cos - (decay * v0 + w * w * x0) / wd * sin);
        Some([x, v])
    }

    fn coefficients(&self) -> (f64, f64) {
        (
            self.omega_0.get::<radian_per_second>(),
            self.zeta.get::<ratio>(),
        )
    }
}

impl System<[f64; 2]> for HarmonicOscillator {
    fn derivative(&self, state: &[f64; 2], _t: f64) -> [f64; 2] {
        let (w, z) = self.coefficients();
        let [x, v] = *state;
        [v, -2.0 * z * w * v - w * w * x]
    }
}
