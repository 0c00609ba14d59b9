use super::*;

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "canvas_pro_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn defaults_match_host_layout() {
    let opts = CanvasProOpts::default();
    assert_eq!(opts.scratch_dir(), PathBuf::from("output").join("web_canvas_pro"));
    assert_eq!(opts.wait_timeout(), Duration::from_secs(300));
    assert_eq!(opts.placeholder_size, 64);
}

#[test]
fn from_path_fills_missing_fields_with_defaults() {
    let path = temp_file("config_partial", r#"{ "wait_timeout_secs": 5 }"#);
    let opts = CanvasProOpts::from_path(&path).unwrap();
    assert_eq!(opts.wait_timeout_secs, 5);
    assert_eq!(opts.subfolder, DEFAULT_SUBFOLDER);
    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn from_path_rejects_unknown_fields_and_bad_subfolder() {
    let path = temp_file("config_unknown", r#"{ "nope": 1 }"#);
    assert!(matches!(
        CanvasProOpts::from_path(&path),
        Err(CanvasError::Serde(_))
    ));
    std::fs::remove_dir_all(path.parent().unwrap()).ok();

    let path = temp_file("config_subfolder", r#"{ "subfolder": "../etc" }"#);
    assert!(matches!(
        CanvasProOpts::from_path(&path),
        Err(CanvasError::Configuration(_))
    ));
    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[test]
fn missing_file_is_a_configuration_error() {
    let err = CanvasProOpts::from_path("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, CanvasError::Configuration(_)));
}

#[test]
fn subfolder_must_be_a_plain_component() {
    for bad in ["", ".", "..", "a/b", "a\\b"] {
        let opts = CanvasProOpts {
            subfolder: bad.to_string(),
            ..CanvasProOpts::default()
        };
        assert!(
            matches!(opts.validate(), Err(CanvasError::Configuration(_))),
            "{bad:?} accepted"
        );
    }

    let path = temp_file("config_dot", r#"{ "subfolder": "." }"#);
    assert!(matches!(
        CanvasProOpts::from_path(&path),
        Err(CanvasError::Configuration(_))
    ));
    std::fs::remove_dir_all(path.parent().unwrap()).ok();

    assert!(CanvasProOpts::default().validate().is_ok());
    assert!(is_plain_component("web_canvas_pro"));
}
