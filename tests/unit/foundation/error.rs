use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DiagramError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        DiagramError::missing_element("x")
            .to_string()
            .contains("missing element:")
    );
    assert!(
        DiagramError::layout_not_ready("x")
            .to_string()
            .contains("layout not ready:")
    );
    assert!(
        DiagramError::geometry("x")
            .to_string()
            .contains("geometry error:")
    );
    assert!(
        DiagramError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DiagramError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
