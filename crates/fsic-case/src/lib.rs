//! fsic-case: on-disk case loading and component instantiation.
//!
//! Reads `settings.txt` from a case directory, validates it, and builds
//! the five coupled components from it. Case/settings loading and
//! plugin-style instantiation are collaborators around the coupling
//! kernel rather than part of it, so this lives in its own crate.

pub mod error;
pub mod registry;
pub mod schema;

pub use error::{CaseError, CaseResult};
pub use schema::Settings;

use std::path::{Path, PathBuf};

use fsic_convergence::RelativeNormConvergence;
use fsic_coupler::IqnIls;
use fsic_extrapolator::LinearExtrapolator;
use fsic_pipeflow::PipeFlow;
use fsic_pipestructure::PipeStructure;

/// Everything needed to drive one coupled run: the parsed settings and the
/// five constructed components, plus the loop bounds the orchestrator reads.
pub struct Case {
    pub settings: Settings,
    pub datapath: PathBuf,

    pub flow: PipeFlow,
    pub structure: PipeStructure,
    pub coupler: IqnIls,
    pub extrapolator: LinearExtrapolator,
    pub convergence: RelativeNormConvergence,
}

impl Case {
    /// Loads `<case_dir>/settings.txt` and constructs all components,
    /// writing persisted output under `<data_root>/<case name>/`.
    pub fn load(case_dir: &Path, data_root: &Path) -> CaseResult<Self> {
        if !case_dir.is_dir() {
            return Err(CaseError::Configuration {
                what: format!("case directory does not exist: {}", case_dir.display()),
            });
        }
        let settings_path = case_dir.join("settings.txt");
        let settings = Settings::load(&settings_path)?;

        let case_name = case_dir
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "case".to_string());
        let datapath = data_root.join(case_name);
        std::fs::create_dir_all(&datapath)?;

        let flow = registry::build_pipeflow(&settings, &datapath)?;
        let structure = registry::build_pipestructure(&settings, &datapath)?;
        let coupler = registry::build_coupler(&settings);
        let extrapolator = registry::build_extrapolator();
        let convergence = registry::build_convergence(&settings);

        Ok(Self {
            settings,
            datapath,
            flow,
            structure,
            coupler,
            extrapolator,
            convergence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "fsic-case-test-{tag}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_tube1d_settings(case_dir: &Path) {
        fs::write(
            case_dir.join("settings.txt"),
            r#"{
                "n_start": 0, "n_stop": 5, "k_stop": 20, "dt": 0.01,
                "pipe_flow": {
                    "l": 0.05, "d": 0.005, "rhof": 1000, "ureference": 1.0,
                    "uamplitude": 0.1, "uperiod": 1.0, "utype": "1",
                    "e": 3e5, "h": 0.001, "m": 10
                },
                "pipe_structure": {
                    "l": 0.05, "d": 0.005, "rhof": 1000, "e": 3e5, "h": 0.001, "m": 10
                }
            }"#,
        )
        .unwrap();
    }

    #[test]
    fn loads_case_and_builds_components() {
        let root = scratch_dir("load");
        let case_dir = root.join("tube1d");
        fs::create_dir_all(&case_dir).unwrap();
        write_tube1d_settings(&case_dir);

        let data_root = root.join("data");
        let case = Case::load(&case_dir, &data_root).unwrap();
        assert_eq!(case.settings.pipe_flow.m, 10);
        assert!(case.datapath.ends_with("tube1d"));
    }

    #[test]
    fn missing_case_directory_is_a_configuration_error() {
        let root = scratch_dir("missing");
        let err = Case::load(&root.join("does-not-exist"), &root.join("data")).unwrap_err();
        assert!(matches!(err, CaseError::Configuration { .. }));
    }
}
