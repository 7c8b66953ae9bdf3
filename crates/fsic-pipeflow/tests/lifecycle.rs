use fsic_component::{Lifecycle, Solver};
use fsic_pipeflow::{PipeFlow, PipeFlowConfig};
use nalgebra::DVector;

fn small_config(output_dir: Option<std::path::PathBuf>) -> PipeFlowConfig {
    PipeFlowConfig {
        length: 1.0,
        diameter: 0.02,
        density: 1000.0,
        segments: 10,
        u_reference: 0.1,
        u_amplitude: 0.0,
        u_period: 1.0,
        newton_max_iterations: 30,
        newton_tolerance: 1e-9,
        output_dir,
        ..PipeFlowConfig::default()
    }
}

#[test]
fn steady_inlet_converges_and_preserves_area() {
    let mut solver = PipeFlow::new(small_config(None)).unwrap();
    solver.initialize().unwrap();
    solver.set_time_step(1e-3).unwrap();

    let a0 = solver.input_data();

    for _ in 0..3 {
        solver.initializestep().unwrap();
        let p = solver.calculate(&a0).unwrap();
        assert_eq!(p.len(), a0.len());
        for v in p.iter() {
            assert!(v.is_finite());
        }
        solver.finalizestep().unwrap();
    }
    solver.finalize().unwrap();
}

#[test]
fn calculate_is_idempotent_for_same_input() {
    let mut solver = PipeFlow::new(small_config(None)).unwrap();
    solver.initialize().unwrap();
    solver.set_time_step(1e-3).unwrap();
    solver.initializestep().unwrap();

    let a0 = solver.input_data();
    let p1 = solver.calculate(&a0).unwrap();
    let p2 = solver.calculate(&a0).unwrap();
    for (x, y) in p1.iter().zip(p2.iter()) {
        assert!((x - y).abs() < 1e-9);
    }
}

#[test]
fn finalizestep_without_initializestep_is_rejected() {
    let mut solver = PipeFlow::new(small_config(None)).unwrap();
    solver.initialize().unwrap();
    assert!(solver.finalizestep().is_err());
}

#[test]
fn persists_output_rows_per_step() {
    let dir = std::env::temp_dir().join(format!("fsic_pipeflow_test_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);

    let mut solver = PipeFlow::new(small_config(Some(dir.clone()))).unwrap();
    solver.initialize().unwrap();
    solver.set_time_step(1e-3).unwrap();
    let a0 = solver.input_data();

    for _ in 0..2 {
        solver.initializestep().unwrap();
        let _ = solver.calculate(&a0).unwrap();
        solver.finalizestep().unwrap();
    }
    solver.finalize().unwrap();

    let contents = std::fs::read_to_string(dir.join("output.dat")).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 6); // 2 steps * 3 rows (a, p, u)

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rejects_wrong_length_input() {
    let mut solver = PipeFlow::new(small_config(None)).unwrap();
    solver.initialize().unwrap();
    solver.set_time_step(1e-3).unwrap();
    solver.initializestep().unwrap();

    let bad = DVector::from_element(3, 1.0e-3);
    assert!(solver.calculate(&bad).is_err());
}
