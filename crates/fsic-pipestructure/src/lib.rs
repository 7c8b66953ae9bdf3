//! PipeStructure: independent-rings structural solver (C2).
//!
//! Maps interface pressure to cross-sectional area cell-by-cell via the
//! ring law `a = a0 * (2 / (2 + (p0 - p) / c0^2))^2`, with no coupling
//! between rings — each cell's area depends only on its own pressure.

mod error;

pub use error::{PipeStructureError, PipeStructureResult};

use std::f64::consts::PI;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use fsic_component::{ComponentResult, Lifecycle, Solver};
use fsic_core::Real;
use nalgebra::DVector;
use tracing::{instrument, warn};

#[derive(Clone, Debug)]
pub struct PipeStructureConfig {
    pub length: Real,
    pub diameter: Real,
    pub density: Real,
    pub segments: usize,

    pub young_modulus: Real,
    pub wall_thickness: Real,

    pub output_dir: Option<PathBuf>,
}

impl Default for PipeStructureConfig {
    fn default() -> Self {
        Self {
            length: 10.0,
            diameter: 0.02,
            density: 1000.0,
            segments: 100,
            young_modulus: 3.0e5,
            wall_thickness: 1.0e-3,
            output_dir: None,
        }
    }
}

pub struct PipeStructure {
    m: usize,
    z: Vec<Real>,
    a0: Real,
    p0: Real,
    c02: Real,
    dt: Real,

    p: Vec<Real>,
    a: Vec<Real>,

    initialized: bool,
    step_ongoing: bool,

    writer: Option<BufWriter<File>>,
}

impl PipeStructure {
    pub fn new(cfg: PipeStructureConfig) -> PipeStructureResult<Self> {
        if cfg.segments == 0 {
            return Err(PipeStructureError::InvalidArg {
                what: "segments must be positive",
            });
        }
        let m = cfg.segments;
        let dz = cfg.length / m as Real;
        let z: Vec<Real> = (0..m).map(|i| dz / 2.0 + i as Real * dz).collect();

        let cmk2 = (cfg.young_modulus * cfg.wall_thickness) / (cfg.density * cfg.diameter);
        let p0 = 0.0;
        let c02 = cmk2 - p0 / 2.0;
        let a0 = PI * cfg.diameter.powi(2) / 4.0;

        let writer = match &cfg.output_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir).map_err(|e| PipeStructureError::Io {
                    what: format!("cannot create output dir: {e}"),
                })?;
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(dir.join("output.dat"))
                    .map_err(|e| PipeStructureError::Io {
                        what: format!("cannot open output.dat: {e}"),
                    })?;
                Some(BufWriter::new(file))
            }
            None => None,
        };

        Ok(Self {
            m,
            z,
            a0,
            p0,
            c02,
            dt: 0.0,
            p: vec![p0; m],
            a: vec![a0; m],
            initialized: false,
            step_ongoing: false,
            writer,
        })
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

impl Lifecycle for PipeStructure {
    fn initialize(&mut self) -> ComponentResult<()> {
        if self.initialized {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "PipeStructure already initialized",
            });
        }
        self.initialized = true;
        Ok(())
    }

    fn initializestep(&mut self) -> ComponentResult<()> {
        if !self.initialized {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "PipeStructure not initialized",
            });
        }
        if self.step_ongoing {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "PipeStructure step already ongoing",
            });
        }
        self.step_ongoing = true;
        Ok(())
    }

    fn finalizestep(&mut self) -> ComponentResult<()> {
        if !self.initialized {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "PipeStructure not initialized",
            });
        }
        if !self.step_ongoing {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "PipeStructure has no step ongoing",
            });
        }
        self.step_ongoing = false;

        if let Some(w) = self.writer.as_mut() {
            Self::write_row(w, &self.p)
                .and_then(|_| Self::write_row(w, &self.a))
                .map_err(|e| fsic_component::ComponentError::Numerical {
                    what: format!("failed writing output.dat: {e}"),
                })?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> ComponentResult<()> {
        if !self.initialized {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "PipeStructure not initialized",
            });
        }
        self.initialized = false;
        if let Some(w) = self.writer.as_mut() {
            w.flush()
                .map_err(|e| fsic_component::ComponentError::Numerical {
                    what: format!("failed flushing output.dat: {e}"),
                })?;
        }
        Ok(())
    }
}

impl Solver for PipeStructure {
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
        DVector::from_row_slice(&self.p)
    }

    fn set_time_step(&mut self, dt: Real) -> ComponentResult<()> {
        if self.step_ongoing {
            return Err(fsic_component::ComponentError::ContractViolation {
                what: "cannot change time step while a step is ongoing",
            });
        }
        self.dt = dt;
        Ok(())
    }

    fn get_time_step(&self) -> Real {
        self.dt
    }

    #[instrument(skip(self, input), fields(cells = self.m))]
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
        if input.len() != self.m {
            return Err(fsic_component::ComponentError::InvalidArg {
                what: "pressure input length does not match segment count",
            });
        }

        let limit = 2.0 * self.c02 + self.p0;
        for (i, &p) in input.iter().enumerate() {
            if p > limit {
                warn!(cell = i, pressure = p, limit, "unphysical pressure rejected by ring law");
                return Err(PipeStructureError::UnphysicalPressure {
                    cell: i,
                    pressure: p,
                    limit,
                }
                .into());
            }
        }
        self.p.copy_from_slice(input.as_slice());

        for i in 0..self.m {
            self.a[i] = self.a0 * (2.0 / (2.0 + (self.p0 - self.p[i]) / self.c02)).powi(2);
        }

        Ok(DVector::from_row_slice(&self.a))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn calculate_is_stateless_in_pressure(
            p1 in prop::collection::vec(-1.0e5_f64..1.0e5, 4),
            p2 in prop::collection::vec(-1.0e5_f64..1.0e5, 4),
        ) {
            let mut s = PipeStructure::new(PipeStructureConfig {
                segments: 4,
                ..PipeStructureConfig::default()
            })
            .unwrap();
            let limit = 2.0 * s.c02 + s.p0;
            prop_assume!(p1.iter().all(|&p| p < limit) && p2.iter().all(|&p| p < limit));

            s.initialize().unwrap();
            s.initializestep().unwrap();

            let v1 = DVector::from_row_slice(&p1);
            let v2 = DVector::from_row_slice(&p2);

            let a_first = s.calculate(&v1).unwrap();
            let _ = s.calculate(&v2).unwrap();
            let a_third = s.calculate(&v1).unwrap();

            for (x, y) in a_first.iter().zip(a_third.iter()) {
                prop_assert!((x - y).abs() < 1e-9, "calculate is not stateless in pressure: {x} vs {y}");
            }
        }
    }
}
