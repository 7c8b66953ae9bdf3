//! JSON settings schema for a coupled FSI case.
//!
//! One flattened `settings.txt` tree per case holds the global loop bounds
//! plus one nested settings struct per component. Component selection by
//! module/class string becomes explicit tagged-variant selection via the
//! `*_class` fields, validated against the one recognized variant per role.

use fsic_core::Real;
use serde::{Deserialize, Serialize};

use crate::error::{CaseError, CaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub n_start: u64,
    pub n_stop: u64,
    pub k_stop: u32,
    pub dt: Real,

    #[serde(default = "default_flowsolver_class")]
    pub flowsolver_class: String,
    #[serde(default = "default_structuresolver_class")]
    pub structuresolver_class: String,
    #[serde(default = "default_coupler_class")]
    pub coupler_class: String,
    #[serde(default = "default_extrapolator_class")]
    pub extrapolator_class: String,
    #[serde(default = "default_convergence_class")]
    pub convergence_class: String,

    pub pipe_flow: PipeFlowSettings,
    pub pipe_structure: PipeStructureSettings,
    #[serde(default)]
    pub iqn_ils: IqnIlsSettings,
    #[serde(default)]
    pub relative_norm: RelativeNormSettings,
}

fn default_flowsolver_class() -> String {
    "PipeFlow".to_string()
}
fn default_structuresolver_class() -> String {
    "PipeStructure".to_string()
}
fn default_coupler_class() -> String {
    "IQN_ILS".to_string()
}
fn default_extrapolator_class() -> String {
    "Linear".to_string()
}
fn default_convergence_class() -> String {
    "RelativeNorm".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipeFlowSettings {
    pub l: Real,
    pub d: Real,
    pub rhof: Real,
    pub ureference: Real,
    #[serde(default)]
    pub uamplitude: Real,
    #[serde(default = "default_period")]
    pub uperiod: Real,
    #[serde(default = "default_utype")]
    pub utype: String,
    pub e: Real,
    pub h: Real,
    pub m: usize,
    #[serde(default = "default_newton_max")]
    pub newtonmax: usize,
    #[serde(default = "default_newton_tol")]
    pub newtontol: Real,
}

fn default_period() -> Real {
    1.0
}
fn default_utype() -> String {
    "1".to_string()
}
fn default_newton_max() -> usize {
    50
}
fn default_newton_tol() -> Real {
    1e-10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipeStructureSettings {
    pub l: Real,
    pub d: Real,
    pub rhof: Real,
    pub e: Real,
    pub h: Real,
    pub m: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IqnIlsSettings {
    #[serde(default = "default_min_significant")]
    pub minsignificant: Real,
    #[serde(default = "default_omega")]
    pub omega: Real,
}

fn default_min_significant() -> Real {
    1e-9
}
fn default_omega() -> Real {
    0.01
}

impl Default for IqnIlsSettings {
    fn default() -> Self {
        Self {
            minsignificant: default_min_significant(),
            omega: default_omega(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativeNormSettings {
    #[serde(default = "default_kmin")]
    pub kmin: u32,
    #[serde(default = "default_mintol")]
    pub mintol: Real,
    #[serde(default = "default_reltol")]
    pub reltol: Real,
}

fn default_kmin() -> u32 {
    1
}
fn default_mintol() -> Real {
    1e-10
}
fn default_reltol() -> Real {
    1e-6
}

impl Default for RelativeNormSettings {
    fn default() -> Self {
        Self {
            kmin: default_kmin(),
            mintol: default_mintol(),
            reltol: default_reltol(),
        }
    }
}

impl Settings {
    pub fn from_json_str(text: &str) -> CaseResult<Self> {
        let settings: Settings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &std::path::Path) -> CaseResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    fn validate(&self) -> CaseResult<()> {
        if self.n_stop <= self.n_start {
            return Err(CaseError::Configuration {
                what: "n_stop must be greater than n_start".to_string(),
            });
        }
        if self.k_stop < 2 {
            return Err(CaseError::Configuration {
                what: "k_stop must allow at least one coupling iteration".to_string(),
            });
        }
        if self.dt <= 0.0 {
            return Err(CaseError::Configuration {
                what: "dt must be positive".to_string(),
            });
        }
        if self.pipe_flow.m != self.pipe_structure.m {
            return Err(CaseError::Configuration {
                what: "pipe_flow.m and pipe_structure.m must match in the baseline (ungapped) case".to_string(),
            });
        }
        for (role, class) in [
            ("flowsolver_class", self.flowsolver_class.as_str()),
            ("structuresolver_class", self.structuresolver_class.as_str()),
            ("coupler_class", self.coupler_class.as_str()),
            ("extrapolator_class", self.extrapolator_class.as_str()),
            ("convergence_class", self.convergence_class.as_str()),
        ] {
            crate::registry::check_known_class(role, class)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tube1d_json() -> &'static str {
        r#"{
            "n_start": 0, "n_stop": 10, "k_stop": 20, "dt": 0.01,
            "pipe_flow": {
                "l": 0.05, "d": 0.005, "rhof": 1000, "ureference": 1.0,
                "uamplitude": 0.1, "uperiod": 1.0, "utype": "1",
                "e": 3e5, "h": 0.001, "m": 100
            },
            "pipe_structure": {
                "l": 0.05, "d": 0.005, "rhof": 1000, "e": 3e5, "h": 0.001, "m": 100
            }
        }"#
    }

    #[test]
    fn parses_tube1d_like_settings_with_defaults() {
        let settings = Settings::from_json_str(tube1d_json()).unwrap();
        assert_eq!(settings.n_stop, 10);
        assert_eq!(settings.iqn_ils.omega, 0.01);
        assert_eq!(settings.flowsolver_class, "PipeFlow");
    }

    #[test]
    fn rejects_mismatched_segment_counts() {
        let mut settings = Settings::from_json_str(tube1d_json()).unwrap();
        settings.pipe_structure.m = 50;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_unknown_component_class() {
        let mut settings = Settings::from_json_str(tube1d_json()).unwrap();
        settings.coupler_class = "Aitken".to_string();
        assert!(settings.validate().is_err());
    }
}
