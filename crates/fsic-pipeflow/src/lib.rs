//! PipeFlow: banded-Newton 1-D pipe flow solver (C1).
//!
//! Solves the staggered mass/momentum discretization for velocity and
//! pressure on a fixed grid of cell centers, given the cross-sectional area
//! supplied by the coupled structure solver at each coupling iteration.

mod band;
mod boundary;
mod error;
mod jacobian;
mod residual;
mod state;

pub use band::BandMatrix;
pub use boundary::{inlet_velocity, InletBoundaryKind};
pub use error::{PipeFlowError, PipeFlowResult};

use std::f64::consts::PI;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use fsic_component::{ComponentResult, Lifecycle, Solver};
use fsic_core::Real;
use nalgebra::DVector;
use tracing::{debug, instrument};

use state::PipeFlowState;

/// Static configuration read once at construction time.
#[derive(Clone, Debug)]
pub struct PipeFlowConfig {
    pub length: Real,
    pub diameter: Real,
    pub density: Real,
    pub segments: usize,

    pub u_reference: Real,
    pub u_amplitude: Real,
    pub u_period: Real,
    pub inlet_kind: InletBoundaryKind,

    /// Young's modulus of the coupled structure, used only to derive `cmk2`
    /// for this solver's own outlet characteristic BC.
    pub young_modulus: Real,
    pub wall_thickness: Real,

    pub newton_max_iterations: usize,
    pub newton_tolerance: Real,

    /// Directory this solver's `output.dat` is written under; `None`
    /// disables persistence (used by tests and dry validation runs).
    pub output_dir: Option<PathBuf>,
}

impl Default for PipeFlowConfig {
    fn default() -> Self {
        Self {
            length: 10.0,
            diameter: 0.02,
            density: 1000.0,
            segments: 100,
            u_reference: 0.1,
            u_amplitude: 0.0,
            u_period: 1.0,
            inlet_kind: InletBoundaryKind::default(),
            young_modulus: 3.0e5,
            wall_thickness: 1.0e-3,
            newton_max_iterations: 50,
            newton_tolerance: 1e-10,
            output_dir: None,
        }
    }
}

pub struct PipeFlow {
    cfg: PipeFlowConfig,
    z: Vec<Real>,
    dz: Real,
    step: u64,
    dt: Real,

    state: PipeFlowState,

    initialized: bool,
    step_ongoing: bool,

    writer: Option<BufWriter<File>>,
}

impl PipeFlow {
    pub fn new(cfg: PipeFlowConfig) -> PipeFlowResult<Self> {
        if cfg.segments == 0 {
            return Err(PipeFlowError::InvalidArg {
                what: "segments must be positive",
            });
        }
        let m = cfg.segments;
        let dz = cfg.length / m as Real;
        let z: Vec<Real> = (0..m).map(|i| dz / 2.0 + i as Real * dz).collect();
        let cmk2 = (cfg.young_modulus * cfg.wall_thickness) / (cfg.density * cfg.diameter);

        let n = m + 2;
        let area0 = PI * cfg.diameter.powi(2) / 4.0;
        let state = PipeFlowState {
            m,
            dz,
            dt: 0.0,
            cmk2,
            alpha: 0.0,
            u: vec![cfg.u_reference; n],
            un: vec![cfg.u_reference; n],
            p: vec![0.0; n],
            pn: vec![0.0; n],
            a: vec![area0; n],
            an: vec![area0; n],
        };

        let writer = match &cfg.output_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| PipeFlowError::Io {
                    what: format!("cannot create output dir: {e}"),
                })?;
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(dir.join("output.dat"))
                    .map_err(|e| PipeFlowError::Io {
                        what: format!("cannot open output.dat: {e}"),
                    })?;
                Some(BufWriter::new(file))
            }
            None => None,
        };

        Ok(Self {
            cfg,
            z,
            dz,
            step: 0,
            dt: 0.0,
            state,
            initialized: false,
            step_ongoing: false,
            writer,
        })
    }

    fn inlet_velocity_now(&self) -> Real {
        inlet_velocity(
            self.cfg.inlet_kind,
            self.step as Real * self.dt,
            self.cfg.u_reference,
            self.cfg.u_amplitude,
            self.cfg.u_period,
        )
    }

    fn write_row(w: &mut BufWriter<File>, row: &[Real]) -> std::io::Result<()> {
        let line = row
            .iter()
            .map(|v| format!("{v:.17e}"))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(w, "{line}")
    }
}

impl Lifecycle for PipeFlow {
    fn initialize(&mut self) -> ComponentResult<()> {
        if self.initialized {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "PipeFlow already initialized",
            }
            .into());
        }
        self.initialized = true;
        Ok(())
    }

    fn initializestep(&mut self) -> ComponentResult<()> {
        if !self.initialized {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "PipeFlow not initialized",
            }
            .into());
        }
        if self.step_ongoing {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "PipeFlow step already ongoing",
            }
            .into());
        }
        self.step += 1;
        self.step_ongoing = true;
        self.state.un = self.state.u.clone();
        self.state.pn = self.state.p.clone();
        self.state.an = self.state.a.clone();
        Ok(())
    }

    fn finalizestep(&mut self) -> ComponentResult<()> {
        if !self.initialized {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "PipeFlow not initialized",
            }
            .into());
        }
        if !self.step_ongoing {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "PipeFlow has no step ongoing",
            }
            .into());
        }
        self.step_ongoing = false;

        if let Some(w) = self.writer.as_mut() {
            Self::write_row(w, &self.state.a)
                .and_then(|_| Self::write_row(w, &self.state.p))
                .and_then(|_| Self::write_row(w, &self.state.u))
                .map_err(|e| fsic_component::ComponentError::Numerical {
                    what: format!("failed writing output.dat: {e}"),
                })?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> ComponentResult<()> {
        if !self.initialized {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "PipeFlow not initialized",
            }
            .into());
        }
        self.initialized = false;
        if let Some(w) = self.writer.as_mut() {
            w.flush().map_err(|e| fsic_component::ComponentError::Numerical {
                what: format!("failed flushing output.dat: {e}"),
            })?;
        }
        Ok(())
    }
}

impl Solver for PipeFlow {
    fn input_grid(&self) -> &[Real] {
        &self.z
    }

    fn output_grid(&self) -> &[Real] {
        &self.z
    }

    fn set_input_grid(&mut self, z: &[Real]) -> ComponentResult<()> {
        if z.len() != self.z.len() {
            return Err(fsic_component::ComponentError::InvalidArg {
                what: "input grid length mismatch",
            });
        }
        self.z = z.to_vec();
        Ok(())
    }

    fn set_output_grid(&mut self, z: &[Real]) -> ComponentResult<()> {
        self.set_input_grid(z)
    }

    fn input_data(&self) -> DVector<Real> {
        DVector::from_row_slice(&self.state.a[1..=self.state.m])
    }

    fn set_time_step(&mut self, dt: Real) -> ComponentResult<()> {
        if self.step_ongoing {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "cannot change time step while a step is ongoing",
            });
        }
        self.dt = dt;
        self.state.dt = dt;
        Ok(())
    }

    fn get_time_step(&self) -> Real {
        self.dt
    }

    #[instrument(skip(self, input), fields(step = self.step))]
    fn calculate(&mut self, input: &DVector<Real>) -> ComponentResult<DVector<Real>> {
        if !self.initialized {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "calculate called before initialize",
            });
        }
        if !self.step_ongoing {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "calculate called outside initializestep/finalizestep",
            });
        }
        if input.len() != self.state.m {
            return Err(fsic_component::ComponentError::InvalidArg {
                what: "area input length does not match segment count",
            });
        }

        for i in 0..self.state.m {
            self.state.a[i + 1] = input[i];
        }
        self.state.a[0] = self.state.a[1];
        self.state.a[self.state.m + 1] = self.state.a[self.state.m];

        self.state.alpha = PI * self.cfg.diameter.powi(2)
            / 4.0
            / (self.cfg.u_reference + self.dz / self.dt);

        let u_inlet = self.inlet_velocity_now();
        let mut f = residual::residual(&self.state, u_inlet);
        let residual0 = fsic_core::norm(&f);

        if residual0 > 0.0 {
            let mut converged = false;
            for _ in 0..self.cfg.newton_max_iterations {
                let j = jacobian::jacobian(&self.state);
                let rhs: Vec<Real> = f.iter().map(|v| -v).collect();
                let dx = j.lu_solve(&rhs)?;
                self.state.apply_step(&dx);
                self.state.u[0] = self.inlet_velocity_now();

                f = residual::residual(&self.state, u_inlet);
                let residual_norm = fsic_core::norm(&f);
                if residual_norm / residual0 < self.cfg.newton_tolerance {
                    converged = true;
                    break;
                }
            }
            if !converged {
                return Err(PipeFlowError::ConvergenceFailed {
                    what: format!(
                        "Newton solve did not reach tolerance {} within {} iterations",
                        self.cfg.newton_tolerance, self.cfg.newton_max_iterations
                    ),
                }
                .into());
            }
        }
        debug!(residual0, "pipeflow newton solve settled");

        Ok(DVector::from_row_slice(
            &self.state.p[1..=self.state.m],
        ))
    }
}
