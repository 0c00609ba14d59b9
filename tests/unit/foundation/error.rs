use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(CanvasError::shape("x").to_string().contains("shape error:"));
    assert!(
        CanvasError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        CanvasError::data_integrity("x")
            .to_string()
            .contains("data integrity error:")
    );
    assert!(CanvasError::decode("x").to_string().contains("decode error:"));
    assert!(
        CanvasError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CanvasError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn fatal_classification() {
    assert!(CanvasError::shape("x").is_fatal());
    assert!(CanvasError::configuration("x").is_fatal());
    assert!(CanvasError::data_integrity("x").is_fatal());
    assert!(!CanvasError::decode("x").is_fatal());
    assert!(!CanvasError::NoActiveSession.is_fatal());
    assert!(!CanvasError::Other(anyhow::anyhow!("io")).is_fatal());
}

#[test]
fn serde_json_errors_convert() {
    let err: CanvasError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, CanvasError::Serde(_)));
}
