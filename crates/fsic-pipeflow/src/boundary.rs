//! Inlet velocity boundary condition.
//!
//! Modeled as a tagged shape rather than a numeric type code. Constructing
//! the enum directly is exhaustive; config-level deserialization is the
//! only place an unrecognized tag is forgiven, falling back to the ramp
//! variant.

use fsic_core::Real;

/// Shape of the prescribed inlet velocity `u(t)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InletBoundaryKind {
    /// `ureference + uamplitude * sin(2*pi*t/uperiod)`
    Sinusoidal,
    /// `ureference + uamplitude` (constant step).
    Step,
    /// `ureference + uamplitude * sin(pi*t/uperiod)^2`
    SineSquaredRamp,
    /// `ureference + uamplitude * t/uperiod` (default / fallback).
    LinearRamp,
}

impl Default for InletBoundaryKind {
    fn default() -> Self {
        InletBoundaryKind::LinearRamp
    }
}

/// Evaluates the prescribed inlet velocity at time `t`.
pub fn inlet_velocity(
    kind: InletBoundaryKind,
    t: Real,
    reference: Real,
    amplitude: Real,
    period: Real,
) -> Real {
    use std::f64::consts::PI;
    match kind {
        InletBoundaryKind::Sinusoidal => reference + amplitude * (2.0 * PI * t / period).sin(),
        InletBoundaryKind::Step => reference + amplitude,
        InletBoundaryKind::SineSquaredRamp => {
            reference + amplitude * (PI * t / period).sin().powi(2)
        }
        InletBoundaryKind::LinearRamp => reference + amplitude * t / period,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_is_time_invariant() {
        let a = inlet_velocity(InletBoundaryKind::Step, 0.0, 1.0, 0.5, 1.0);
        let b = inlet_velocity(InletBoundaryKind::Step, 100.0, 1.0, 0.5, 1.0);
        assert_eq!(a, b);
        assert_eq!(a, 1.5);
    }

    #[test]
    fn sinusoidal_returns_to_reference_at_zero() {
        let u = inlet_velocity(InletBoundaryKind::Sinusoidal, 0.0, 2.0, 0.3, 1.0);
        assert!((u - 2.0).abs() < 1e-12);
    }

    #[test]
    fn linear_ramp_is_default() {
        assert_eq!(InletBoundaryKind::default(), InletBoundaryKind::LinearRamp);
        let u = inlet_velocity(InletBoundaryKind::LinearRamp, 2.0, 1.0, 1.0, 4.0);
        assert!((u - 1.5).abs() < 1e-12);
    }
}
