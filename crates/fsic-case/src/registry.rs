//! Component registry: tagged-variant selection keyed by config string,
//! used in place of dynamic plugin loading by name. Each role has exactly
//! one recognized variant today; unrecognized strings are a configuration
//! error rather than a silent fallback.

use std::path::{Path, PathBuf};

use fsic_pipeflow::{InletBoundaryKind, PipeFlow, PipeFlowConfig};
use fsic_pipestructure::{PipeStructure, PipeStructureConfig};
use fsic_coupler::{IqnIls, IqnIlsConfig};
use fsic_extrapolator::LinearExtrapolator;
use fsic_convergence::{RelativeNormConfig, RelativeNormConvergence};

use crate::error::{CaseError, CaseResult};
use crate::schema::Settings;

pub fn check_known_class(role: &str, class: &str) -> CaseResult<()> {
    let known: &[&str] = match role {
        "flowsolver_class" => &["PipeFlow"],
        "structuresolver_class" => &["PipeStructure"],
        "coupler_class" => &["IQN_ILS"],
        "extrapolator_class" => &["Linear"],
        "convergence_class" => &["RelativeNorm"],
        _ => {
            return Err(CaseError::Configuration {
                what: format!("unknown component role {role}"),
            });
        }
    };
    if known.contains(&class) {
        Ok(())
    } else {
        Err(CaseError::Configuration {
            what: format!("unrecognized {role} '{class}' (expected one of {known:?})"),
        })
    }
}

fn parse_utype(raw: &str) -> InletBoundaryKind {
    match raw {
        "1" => InletBoundaryKind::Sinusoidal,
        "2" => InletBoundaryKind::Step,
        "3" => InletBoundaryKind::SineSquaredRamp,
        _ => InletBoundaryKind::LinearRamp,
    }
}

/// `<datapath>/<component-id>/`, one directory per persisted component.
fn component_datapath(datapath: &Path, component_id: &str) -> PathBuf {
    datapath.join(component_id)
}

pub fn build_pipeflow(settings: &Settings, datapath: &Path) -> CaseResult<PipeFlow> {
    let s = &settings.pipe_flow;
    let cfg = PipeFlowConfig {
        length: s.l,
        diameter: s.d,
        density: s.rhof,
        segments: s.m,
        u_reference: s.ureference,
        u_amplitude: s.uamplitude,
        u_period: s.uperiod,
        inlet_kind: parse_utype(&s.utype),
        young_modulus: s.e,
        wall_thickness: s.h,
        newton_max_iterations: s.newtonmax,
        newton_tolerance: s.newtontol,
        output_dir: Some(component_datapath(datapath, "pipeflow")),
    };
    Ok(PipeFlow::new(cfg)?)
}

pub fn build_pipestructure(settings: &Settings, datapath: &Path) -> CaseResult<PipeStructure> {
    let s = &settings.pipe_structure;
    let cfg = PipeStructureConfig {
        length: s.l,
        diameter: s.d,
        density: s.rhof,
        segments: s.m,
        young_modulus: s.e,
        wall_thickness: s.h,
        output_dir: Some(component_datapath(datapath, "pipestructure")),
    };
    Ok(PipeStructure::new(cfg)?)
}

pub fn build_coupler(settings: &Settings) -> IqnIls {
    IqnIls::new(IqnIlsConfig {
        min_significant: settings.iqn_ils.minsignificant,
        omega: settings.iqn_ils.omega,
    })
}

pub fn build_extrapolator() -> LinearExtrapolator {
    LinearExtrapolator::new()
}

pub fn build_convergence(settings: &Settings) -> RelativeNormConvergence {
    RelativeNormConvergence::new(RelativeNormConfig {
        k_min: settings.relative_norm.kmin,
        min_tol: settings.relative_norm.mintol,
        rel_tol: settings.relative_norm.reltol,
    })
}
