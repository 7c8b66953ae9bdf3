//! fsic-couple: the coupling orchestrator (C6) — time-step loop, coupling
//! iteration loop, and the fixed-order lifecycle dispatch shared by every
//! component.
//!
//! Drives a two-level `for n` / `for k` loop with a fixed
//! `initializestep`/`finalizestep` component ordering, an options-struct-
//! plus-summary return shape, and an optional progress-callback hook for
//! observing iteration counts and residual norms without coupling the
//! orchestrator to any particular UI.

pub mod error;
pub mod progress;

pub use error::{CoupleError, CoupleResult};
pub use progress::{CoupleProgressCallback, CoupleProgressEvent, CoupleStage};

use fsic_component::{ComponentError, ConvergenceMonitor, Lifecycle, ResidualCoupler, Solver, StepExtrapolator};
use fsic_core::Real;
use nalgebra::DVector;
use tracing::{info, instrument, warn};

#[derive(Clone, Copy, Debug)]
pub struct CoupleOptions {
    pub n_start: u64,
    pub n_stop: u64,
    pub k_stop: u32,
    pub dt: Real,
}

/// Per-step iteration counts, in step order, for post-run inspection.
#[derive(Debug, Clone, Default)]
pub struct CoupleSummary {
    pub iterations_per_step: Vec<u32>,
}

impl CoupleSummary {
    pub fn steps_run(&self) -> u64 {
        self.iterations_per_step.len() as u64
    }
}

/// The five roles the orchestrator drives, borrowed mutably for the
/// duration of the run. Grouped into a struct (rather than five loose
/// parameters) so the fixed lifecycle order — flow, structure, coupler,
/// extrapolator, convergence — is a single iteration over one array instead
/// of five cut-and-pasted call sites.
pub struct Components<'a> {
    pub flow: &'a mut dyn Solver,
    pub structure: &'a mut dyn Solver,
    pub coupler: &'a mut dyn ResidualCoupler,
    pub extrapolator: &'a mut dyn StepExtrapolator,
    pub convergence: &'a mut dyn ConvergenceMonitor,
}

impl Components<'_> {
    fn lifecycles_mut(&mut self) -> [&mut dyn Lifecycle; 5] {
        fn up_solver(s: &mut dyn Solver) -> &mut dyn Lifecycle {
            s
        }
        fn up_coupler(c: &mut dyn ResidualCoupler) -> &mut dyn Lifecycle {
            c
        }
        fn up_extrapolator(e: &mut dyn StepExtrapolator) -> &mut dyn Lifecycle {
            e
        }
        fn up_convergence(c: &mut dyn ConvergenceMonitor) -> &mut dyn Lifecycle {
            c
        }
        [
            up_solver(self.flow),
            up_solver(self.structure),
            up_coupler(self.coupler),
            up_extrapolator(self.extrapolator),
            up_convergence(self.convergence),
        ]
    }
}

fn at_step(step: u64, source: ComponentError) -> CoupleError {
    CoupleError {
        step,
        iteration: 0,
        source,
    }
}

fn at_iteration(step: u64, iteration: u32, source: ComponentError) -> CoupleError {
    CoupleError {
        step,
        iteration,
        source,
    }
}

/// Runs the full coupled simulation from `opts.n_start` to `opts.n_stop`.
///
/// On any contract violation or numerical failure, attempts a best-effort
/// `finalize` of every component before returning the original error,
/// terminating the run after a clean finalize pass; finalize failures
/// during this cleanup pass are logged, not
/// propagated, so the first real failure is what the caller sees.
#[instrument(skip_all)]
pub fn run_coupled(
    mut components: Components<'_>,
    opts: &CoupleOptions,
    mut progress: Option<CoupleProgressCallback<'_>>,
) -> CoupleResult<CoupleSummary> {
    let result = run_coupled_inner(&mut components, opts, &mut progress);
    if result.is_err() {
        for lc in components.lifecycles_mut() {
            if let Err(e) = lc.finalize() {
                warn!(error = %e, "cleanup finalize failed after earlier error");
            }
        }
    }
    result
}

fn run_coupled_inner(
    components: &mut Components<'_>,
    opts: &CoupleOptions,
    progress: &mut Option<CoupleProgressCallback<'_>>,
) -> CoupleResult<CoupleSummary> {
    components
        .flow
        .set_time_step(opts.dt)
        .map_err(|e| at_step(opts.n_start, e))?;
    components
        .structure
        .set_time_step(opts.dt)
        .map_err(|e| at_step(opts.n_start, e))?;

    components.flow.initialize().map_err(|e| at_step(opts.n_start, e))?;
    components
        .structure
        .initialize()
        .map_err(|e| at_step(opts.n_start, e))?;
    components
        .coupler
        .initialize()
        .map_err(|e| at_step(opts.n_start, e))?;
    components
        .extrapolator
        .initialize()
        .map_err(|e| at_step(opts.n_start, e))?;
    components
        .convergence
        .initialize()
        .map_err(|e| at_step(opts.n_start, e))?;

    let mut x = components.flow.input_data();
    components.extrapolator.initialize_state(&x);
    let mut r: DVector<Real> = DVector::zeros(x.len());

    let mut summary = CoupleSummary::default();

    for n in opts.n_start..opts.n_stop {
        for lc in components.lifecycles_mut() {
            lc.initializestep().map_err(|e| at_step(n, e))?;
        }
        if let Some(cb) = progress.as_deref_mut() {
            cb(CoupleProgressEvent {
                stage: CoupleStage::StepStarted,
                step: n,
                iteration: 0,
                residual_norm: 0.0,
            });
        }

        let mut converged = false;
        let mut last_k = 0u32;
        for k in 1..opts.k_stop {
            last_k = k;
            if k == 1 {
                x = components.extrapolator.predict();
            } else {
                let dx = components
                    .coupler
                    .predict(&r)
                    .map_err(|e| at_iteration(n, k, e))?;
                x = &x + &dx;
            }

            let y = components
                .flow
                .calculate(&x)
                .map_err(|e| at_iteration(n, k, e))?;
            let xt = components
                .structure
                .calculate(&y)
                .map_err(|e| at_iteration(n, k, e))?;
            r = &xt - &x;

            components
                .coupler
                .add(&x, &xt)
                .map_err(|e| at_iteration(n, k, e))?;
            components
                .convergence
                .add(&r)
                .map_err(|e| at_iteration(n, k, e))?;

            let residual_norm = r.norm();
            if let Some(cb) = progress.as_deref_mut() {
                cb(CoupleProgressEvent {
                    stage: CoupleStage::IterationDone,
                    step: n,
                    iteration: k,
                    residual_norm,
                });
            }

            if components.convergence.issatisfied() {
                converged = true;
                break;
            }
        }

        if let Some(cb) = progress.as_deref_mut() {
            cb(CoupleProgressEvent {
                stage: if converged {
                    CoupleStage::StepConverged
                } else {
                    CoupleStage::StepExhausted
                },
                step: n,
                iteration: last_k,
                residual_norm: r.norm(),
            });
        }
        if !converged {
            warn!(step = n, iterations = last_k, "step did not converge within k_stop");
        }

        components
            .extrapolator
            .update(&x)
            .map_err(|e| at_step(n, e))?;

        for lc in components.lifecycles_mut() {
            lc.finalizestep().map_err(|e| at_step(n, e))?;
        }

        info!(step = n, iterations = last_k, "coupling step finalized");
        summary.iterations_per_step.push(last_k);
    }

    components.flow.finalize().map_err(|e| at_step(opts.n_stop, e))?;
    components
        .structure
        .finalize()
        .map_err(|e| at_step(opts.n_stop, e))?;
    components
        .coupler
        .finalize()
        .map_err(|e| at_step(opts.n_stop, e))?;
    components
        .extrapolator
        .finalize()
        .map_err(|e| at_step(opts.n_stop, e))?;
    components
        .convergence
        .finalize()
        .map_err(|e| at_step(opts.n_stop, e))?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsic_convergence::{RelativeNormConfig, RelativeNormConvergence};
    use fsic_coupler::{IqnIls, IqnIlsConfig};
    use fsic_extrapolator::LinearExtrapolator;
    use fsic_pipeflow::{PipeFlow, PipeFlowConfig};
    use fsic_pipestructure::{PipeStructure, PipeStructureConfig};

    fn tube1d_components() -> (PipeFlow, PipeStructure, IqnIls, LinearExtrapolator, RelativeNormConvergence) {
        let flow = PipeFlow::new(PipeFlowConfig {
            length: 0.05,
            diameter: 0.005,
            density: 1000.0,
            segments: 20,
            u_reference: 1.0,
            u_amplitude: 0.0,
            u_period: 1.0,
            young_modulus: 3.0e5,
            wall_thickness: 1.0e-3,
            newton_max_iterations: 50,
            newton_tolerance: 1e-10,
            output_dir: None,
            ..PipeFlowConfig::default()
        })
        .unwrap();
        let structure = PipeStructure::new(PipeStructureConfig {
            length: 0.05,
            diameter: 0.005,
            density: 1000.0,
            segments: 20,
            young_modulus: 3.0e5,
            wall_thickness: 1.0e-3,
            output_dir: None,
        })
        .unwrap();
        let coupler = IqnIls::new(IqnIlsConfig {
            min_significant: 1e-10,
            omega: 0.01,
        });
        let extrapolator = LinearExtrapolator::new();
        let convergence = RelativeNormConvergence::new(RelativeNormConfig {
            k_min: 1,
            min_tol: 1e-10,
            rel_tol: 1e-6,
        });
        (flow, structure, coupler, extrapolator, convergence)
    }

    #[test]
    fn full_loop_reaches_nstop_without_contract_violation() {
        let (mut flow, mut structure, mut coupler, mut extrapolator, mut convergence) =
            tube1d_components();
        let opts = CoupleOptions {
            n_start: 0,
            n_stop: 5,
            k_stop: 50,
            dt: 0.01,
        };
        let components = Components {
            flow: &mut flow,
            structure: &mut structure,
            coupler: &mut coupler,
            extrapolator: &mut extrapolator,
            convergence: &mut convergence,
        };
        let summary = run_coupled(components, &opts, None).unwrap();
        assert_eq!(summary.steps_run(), 5);
        for iters in &summary.iterations_per_step {
            assert!(*iters < opts.k_stop, "step should converge before k_stop");
        }
    }

    #[test]
    fn progress_callback_observes_every_step() {
        let (mut flow, mut structure, mut coupler, mut extrapolator, mut convergence) =
            tube1d_components();
        let opts = CoupleOptions {
            n_start: 0,
            n_stop: 3,
            k_stop: 50,
            dt: 0.01,
        };
        let mut steps_seen = Vec::new();
        {
            let components = Components {
                flow: &mut flow,
                structure: &mut structure,
                coupler: &mut coupler,
                extrapolator: &mut extrapolator,
                convergence: &mut convergence,
            };
            let mut cb = |event: CoupleProgressEvent| {
                if event.stage == CoupleStage::StepConverged {
                    steps_seen.push(event.step);
                }
            };
            run_coupled(components, &opts, Some(&mut cb)).unwrap();
        }
        assert_eq!(steps_seen, vec![0, 1, 2]);
    }
}
