use super::*;

#[test]
fn defaults_match_page_constants() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.narrow_breakpoint_px, 992.0);
    assert_eq!(cfg.route_margin, 100.0);
    assert_eq!(cfg.timing.reveal_delay_ms, 200);
    assert_eq!(cfg.timing.settle_delay_ms, 600);
    assert_eq!(cfg.timing.finale_delay(), Duration::from_millis(1200));
    assert_eq!(cfg.retry.draw_max_retries, 5);
    assert_eq!(cfg.retry.init_max_retries, 10);
    cfg.validate().unwrap();
}

#[test]
fn init_backoff_doubles() {
    let retry = RetryPolicy::default();
    assert_eq!(retry.init_backoff(0), Duration::from_millis(200));
    assert_eq!(retry.init_backoff(1), Duration::from_millis(400));
    assert_eq!(retry.init_backoff(4), Duration::from_millis(3200));
    assert_eq!(retry.init_backoff(200), Duration::from_millis(u64::MAX));
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg = EngineConfig::from_json(r#"{ "timing": { "settle_delay_ms": 10 } }"#).unwrap();
    assert_eq!(cfg.timing.settle_delay_ms, 10);
    assert_eq!(cfg.timing.reveal_delay_ms, 200);
    assert_eq!(cfg.narrow_breakpoint_px, 992.0);
}

#[test]
fn validate_rejects_bad_ranges() {
    assert!(EngineConfig::from_json(r#"{ "narrow_breakpoint_px": 0 }"#).is_err());
    assert!(EngineConfig::from_json(r#"{ "route_margin": -1 }"#).is_err());
    assert!(EngineConfig::from_json(r#"{ "path_opacity": { "wide": 1.5 } }"#).is_err());
}

#[test]
fn layout_mode_uses_breakpoint() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.layout_mode(1200.0), LayoutMode::Wide);
    assert_eq!(cfg.layout_mode(700.0), LayoutMode::Narrow);
}
