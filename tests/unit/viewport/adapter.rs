use std::time::Duration;

use super::*;
use crate::{
    host::SimulatedPage, manifest::builtin::nlp_pipeline, time::scheduler::TimerQueue,
};

fn page(width: f64) -> (SimulatedPage, EngineConfig) {
    let config = EngineConfig::default();
    let page = SimulatedPage::new(&nlp_pipeline(), width, config.narrow_breakpoint_px);
    (page, config)
}

#[test]
fn zoom_steps_are_clamped() {
    let (mut page, _) = page(1200.0);
    let mut adapter = ViewportAdapter::new(LayoutMode::Wide);

    for _ in 0..20 {
        adapter.apply_zoom(&mut page, ZoomCommand::In);
    }
    assert_eq!(adapter.zoom(), ZoomLevel::MAX);
    assert_eq!(page.scale(), 2.0);

    for _ in 0..20 {
        adapter.apply_zoom(&mut page, ZoomCommand::Out);
    }
    assert_eq!(adapter.zoom(), ZoomLevel::MIN);
    assert_eq!(page.scale(), 0.5);

    assert_eq!(
        adapter.apply_zoom(&mut page, ZoomCommand::Reset),
        Some(ZoomLevel::DEFAULT)
    );
    assert_eq!(page.scale(), 1.0);
}

#[test]
fn zoom_is_disabled_on_narrow_layouts() {
    let (mut page, _) = page(700.0);
    let mut adapter = ViewportAdapter::new(LayoutMode::Narrow);
    let before = page.mutations();
    assert_eq!(adapter.apply_zoom(&mut page, ZoomCommand::In), None);
    assert_eq!(adapter.zoom(), ZoomLevel::DEFAULT);
    assert_eq!(page.mutations(), before);
}

#[test]
fn entering_narrow_mode_hides_controls_and_resets_zoom() {
    let (mut page, config) = page(1200.0);
    let mut adapter = ViewportAdapter::new(LayoutMode::Wide);
    assert!(!adapter.sync(&mut page, &config));
    assert!(page.zoom_controls_visible());

    adapter.apply_zoom(&mut page, ZoomCommand::In);
    adapter.apply_zoom(&mut page, ZoomCommand::In);
    assert_eq!(page.scale(), 1.2);

    page.set_viewport_width(992.0);
    assert!(adapter.sync(&mut page, &config));
    assert_eq!(adapter.mode(), LayoutMode::Narrow);
    assert!(!page.zoom_controls_visible());
    assert_eq!(adapter.zoom(), ZoomLevel::DEFAULT);
    assert_eq!(page.scale(), 1.0);

    page.set_viewport_width(993.0);
    assert!(adapter.sync(&mut page, &config));
    assert!(page.zoom_controls_visible());
}

#[test]
fn resize_burst_keeps_only_the_last_debounce() {
    let config = EngineConfig::default();
    let mut queue = TimerQueue::new();
    let mut adapter = ViewportAdapter::default();

    let first = adapter.arm_resize(&mut queue, &config);
    queue.set_now(Duration::from_millis(100));
    let second = adapter.arm_resize(&mut queue, &config);

    assert_eq!(queue.pending_of(Task::ResizeSettled), 1);
    assert_eq!(queue.next_deadline(), Some(Duration::from_millis(350)));
    assert!(adapter.is_settling());
    assert!(!adapter.take_resize(first));
    assert!(adapter.take_resize(second));
    assert!(!adapter.take_resize(second));
    assert!(!adapter.is_settling());
}

#[test]
fn zoom_settle_timer_is_rearmed() {
    let config = EngineConfig::default();
    let mut queue = TimerQueue::new();
    let mut adapter = ViewportAdapter::default();

    let first = adapter.arm_zoom(&mut queue, &config);
    let second = adapter.arm_zoom(&mut queue, &config);
    assert_ne!(first, second);
    assert_eq!(queue.pending_of(Task::ZoomSettled), 1);
    assert_eq!(queue.next_deadline(), Some(Duration::from_millis(300)));
    assert!(adapter.take_zoom(second));
}

#[test]
fn resize_and_zoom_share_a_single_pending_rebuild() {
    let config = EngineConfig::default();
    let mut queue = TimerQueue::new();
    let mut adapter = ViewportAdapter::default();

    let zoom = adapter.arm_zoom(&mut queue, &config);
    let resize = adapter.arm_resize(&mut queue, &config);
    assert_eq!(queue.pending_of(Task::ZoomSettled), 0);
    assert_eq!(queue.pending_of(Task::ResizeSettled), 1);
    assert!(!adapter.take_zoom(zoom));

    let zoom = adapter.arm_zoom(&mut queue, &config);
    assert_eq!(queue.pending_of(Task::ResizeSettled), 0);
    assert!(!adapter.take_resize(resize));
    assert!(adapter.take_zoom(zoom));
    assert!(!adapter.is_settling());
}
