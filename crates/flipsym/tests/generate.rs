//! End-to-end generation runs.

use std::fs;

use flipsym::decompose::verify_plane_parallel;
use flipsym::prelude::*;

fn options(workers: usize) -> GenerateOptions {
    GenerateOptions {
        workers,
        config: DecomposeConfig::default(),
    }
}

#[test]
fn test_carreres23_module() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("carreres23").join("flip_terms.py");
    let model = preset("carreres23").unwrap();
    let generated = generate(&model, &path, &options(2)).unwrap();
    assert_eq!(generated.grid.len(), 12);
    assert_eq!(generated.non_empty(), 2);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("import numpy as np\nimport scipy\n\n\n"));
    assert!(text.contains("def M_vv_0_0_0():\n    def func(k):\n"));
    assert!(text.contains("def N_vv_0_2_0(theta,phi):\n"));
    assert!(!text.contains("M_vv_0_1_0"));
    assert!(text.contains("dictionary_terms = {'vv': ['0']}\n"));
    assert!(text.contains("dictionary_lmax = {'vv': [2]}\n"));
    assert!(text.contains("dictionary_subterms = {'vv_0_0': 1, 'vv_0_1': 0, 'vv_0_2': 1}\n"));
    assert!(text.ends_with("multi_index_model = False\n"));
    assert!(!text.contains("math."));
}

#[test]
fn test_worker_count_does_not_change_output() {
    let model = preset("carreres23").unwrap();
    let sequential = decompose_model(&model, &options(1)).unwrap();
    let parallel = decompose_model(&model, &options(4)).unwrap();
    assert_eq!(sequential.pool, parallel.pool);
    assert_eq!(
        render_model(&model, &sequential.grid, &sequential.pool).unwrap(),
        render_model(&model, &parallel.grid, &parallel.pool).unwrap()
    );
}

#[test]
fn test_adamsblake20_velocity_reconstructs() {
    let model = preset("adamsblake20").unwrap();
    let generated = decompose_model(&model, &options(3)).unwrap();
    let vv: Vec<TermPair> = generated
        .grid
        .jobs()
        .iter()
        .zip(&generated.pool)
        .filter(|(job, _)| job.key.ty() == "vv")
        .map(|(_, pair)| pair.clone())
        .collect();
    assert_eq!(vv.len(), 3);
    assert!(vv[1].is_empty());

    let kernel = &model.types[2].terms[0].kernel;
    let params = Bindings::new().with("k", 0.05).with("sig_g", 3.0);
    let residual =
        verify_plane_parallel(kernel, &vv, &params, &DecomposeConfig::default(), 11).unwrap();
    assert!(residual < 1e-7, "residual {residual}");
}

#[test]
fn test_json_model_file() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("toy.json");
    fs::write(
        &model_path,
        r#"{
            "name": "toy",
            "geometry": "plane_parallel",
            "additional_parameters": ["sig_g"],
            "types": [
                { "name": "gg", "terms": [
                    { "index": "0", "kernel": "(exp (neg (^ (* k sig_g mu) 2)))", "lmax": 2 } ] },
                { "name": "vv", "terms": [
                    { "index": "0", "kernel": "(^ mu 2)", "lmax": 2 } ] }
            ]
        }"#,
    )
    .unwrap();
    let model = load_model(&model_path).unwrap();
    let out = dir.path().join("out.py");
    generate(&model, &out, &options(2)).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("def M_gg_0_0_0(sig_g):\n"));
    assert!(text.contains("scipy.special.erf"));
    assert!(text.contains("dictionary_subterms = {'gg_0_0': 1, 'gg_0_1': 0, 'gg_0_2': 1, 'vv_0_0': 1, 'vv_0_1': 0, 'vv_0_2': 1}\n"));
}

#[test]
fn test_failed_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad").join("flip_terms.py");
    let model = flipsym::models::parse_model(
        r#"{
            "name": "bad",
            "geometry": "plane_parallel",
            "types": [{ "name": "gg", "terms": [{ "index": "0", "kernel": "(/ 1 mu)", "lmax": 1 }] }]
        }"#,
    )
    .unwrap();
    let err = generate(&model, &path, &options(2)).unwrap_err();
    assert!(matches!(err, flipsym::Error::Dispatch(_)));
    assert!(err.to_string().contains("gg_0_0") || err.to_string().contains("gg_0_1"));
    assert!(!path.exists());
}

#[test]
fn test_zero_denominator_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pole.py");
    let model = flipsym::models::parse_model(
        r#"{
            "name": "pole",
            "geometry": "plane_parallel",
            "types": [{ "name": "vv", "terms": [{ "index": "0", "kernel": "(/ (^ mu 2) 0)", "lmax": 2 }] }]
        }"#,
    )
    .unwrap();
    let err = generate(&model, &path, &options(1)).unwrap_err();
    assert!(matches!(err, flipsym::Error::Dispatch(_)));
    assert!(err.to_string().contains("division by zero"), "{err}");
    assert!(!path.exists());
}
