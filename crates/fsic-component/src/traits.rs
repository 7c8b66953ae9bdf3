//! Shared lifecycle traits for every component role in the coupling loop.
//!
//! Every component the orchestrator drives exposes the same four lifecycle
//! calls (`initialize`, `initializestep`, `finalizestep`, `finalize`); each
//! role then adds the narrow capability it actually needs (`calculate` for
//! solvers, `add`+`predict` for the coupler, `predict`+`update` for the
//! extrapolator, `add`+`issatisfied` for the convergence monitor). Modeling
//! this as one fat trait would force every implementor to stub out methods
//! it has no business implementing, so the capability set is split instead.

use fsic_core::Real;
use nalgebra::DVector;

use crate::error::ComponentResult;

/// Calls every coupled component must support, independent of role.
pub trait Lifecycle {
    /// One-time setup before any step is run. Fatal if called twice.
    fn initialize(&mut self) -> ComponentResult<()>;

    /// Begin a new time step: snapshot previous-step state, reset
    /// per-step bookkeeping (history buffers, `added` flags, counters).
    fn initializestep(&mut self) -> ComponentResult<()>;

    /// End the current time step. Implementations must reject this call if
    /// the per-step "information added" invariant was not satisfied.
    fn finalizestep(&mut self) -> ComponentResult<()>;

    /// One-time teardown (flush/close persisted output).
    fn finalize(&mut self) -> ComponentResult<()>;
}

/// A black-box physical solver mapping one interface quantity to another
/// (flow: area -> pressure; structure: pressure -> area), on a shared 1-D
/// grid of cell centers.
pub trait Solver: Lifecycle {
    /// Grid of cell centers this solver expects its input on.
    fn input_grid(&self) -> &[Real];

    /// Grid of cell centers this solver produces its output on.
    fn output_grid(&self) -> &[Real];

    /// Install a different input grid (used only when paired with a grid
    /// mapper because a peer solver advertises a mismatched grid).
    fn set_input_grid(&mut self, z: &[Real]) -> ComponentResult<()>;

    /// Install a different output grid.
    fn set_output_grid(&mut self, z: &[Real]) -> ComponentResult<()>;

    /// Initial value of this solver's interface output, used once by the
    /// orchestrator to seed the coupling variable before step 0.
    fn input_data(&self) -> DVector<Real>;

    fn set_time_step(&mut self, dt: Real) -> ComponentResult<()>;

    fn get_time_step(&self) -> Real;

    /// Evaluate the solver at the given input. Must be idempotent within a
    /// step for the same input, and must return a defensive (freshly
    /// allocated) copy — callers never observe internal aliasing.
    fn calculate(&mut self, input: &DVector<Real>) -> ComponentResult<DVector<Real>>;
}

/// IQN-ILS-shaped coupler: absorbs observations, predicts an update from
/// history. Kept distinct from `StepExtrapolator` because the two roles'
/// signatures genuinely differ (`add` takes a pair here, `update` takes a
/// single state there) — a shared trait would just be dead parameters.
pub trait ResidualCoupler: Lifecycle {
    /// Record an observation pair `(x, xt)` for this iteration.
    fn add(&mut self, x: &DVector<Real>, xt: &DVector<Real>) -> ComponentResult<()>;

    /// Given the current residual `r`, produce the quasi-Newton update `dx`.
    fn predict(&mut self, r: &DVector<Real>) -> ComponentResult<DVector<Real>>;
}

/// Linear-extrapolator-shaped predictor: predicts the next step's initial
/// guess from the last two accepted states, then records the accepted
/// state for this step.
pub trait StepExtrapolator: Lifecycle {
    fn initialize_state(&mut self, x0: &DVector<Real>);

    /// First guess for the current step's coupling variable.
    fn predict(&mut self) -> DVector<Real>;

    /// Record the accepted state for this step (exactly once).
    fn update(&mut self, x: &DVector<Real>) -> ComponentResult<()>;
}

/// Relative-norm-shaped stopping rule.
pub trait ConvergenceMonitor: Lifecycle {
    /// Record this iteration's residual.
    fn add(&mut self, r: &DVector<Real>) -> ComponentResult<()>;

    /// Whether the coupling iteration loop may stop.
    fn issatisfied(&self) -> bool;
}
