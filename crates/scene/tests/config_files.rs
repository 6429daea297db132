use cubelight_scene::{Scene, SceneConfig, SceneError};
use std::io::Write;

fn write_config(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn load_override_file() {
    let file = write_config(
        "renderer:\n  msaa_samples: 1\n  shadows: false\ncube:\n  spin_rate: 2.0\nwander:\n  seed: 1234\n",
    );
    let config = SceneConfig::load(file.path()).unwrap();
    assert_eq!(config.renderer.msaa_samples, 1);
    assert!(!config.renderer.shadows);
    assert_eq!(config.wander.seed, Some(1234));

    let mut scene = Scene::from_config(&config, config.wander.seed.unwrap()).unwrap();
    assert_eq!(scene.tick(1.0).cube_rotation.x, 2.0);
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SceneConfig::load(dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(err, SceneError::Io(_)));
}

#[test]
fn malformed_yaml_is_yaml_error() {
    let file = write_config("camera: [1, 2\n");
    let err = SceneConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, SceneError::Yaml(_)));
}

#[test]
fn out_of_range_value_names_the_field() {
    let file = write_config("spot:\n  penumbra: 3\n");
    let err = SceneConfig::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("spot.penumbra"), "{err}");
}

#[test]
fn dumped_default_reloads() {
    let text = SceneConfig::default().to_yaml().unwrap();
    let file = write_config(&text);
    assert_eq!(SceneConfig::load(file.path()).unwrap(), SceneConfig::default());
}

#[test]
fn seeded_runs_replay_identically() {
    let config = SceneConfig::default();
    let mut a = Scene::from_config(&config, 99).unwrap();
    let mut b = Scene::from_config(&config, 99).unwrap();
    for frame in 1..=2000u32 {
        let t = frame as f32 / 60.0;
        assert_eq!(a.tick(t), b.tick(t));
    }
    assert!(a.wander().retargets() > 0);
}
