//! End-to-end scenarios: a tool mounted on a recording host, driven by a
//! manual frame clock and rendered into a framebuffer.

use panelcheck_core::frame_clock::ManualFrameClock;
use panelcheck_core::fullscreen::{HostCall, RecordingHost};
use panelcheck_core::input::ToolEvent;
use panelcheck_core::raster::Framebuffer;
use panelcheck_core::refresh::RefreshTier;
use panelcheck_core::scene::SceneRecorder;
use panelcheck_core::{Rgb, Size, Tool, ToolConfig, ToolKind};
use pretty_assertions::assert_eq;

#[test]
fn refresh_rate_at_144hz_is_competitive() {
    let clock = ManualFrameClock::new();
    let mut host = RecordingHost::new();
    let mut tool = Tool::mount(ToolKind::RefreshRate, &ToolConfig::default(), &mut host, clock.clone());
    tool.start();
    clock.run(0.0, 6.94, 60);

    let refresh = tool.readout().refresh.unwrap_or_default();
    assert_eq!(refresh.hz, Some(144));
    assert_eq!(refresh.tier, Some(RefreshTier::Competitive));
    assert_eq!(refresh.tier.map(RefreshTier::label), Some("competitive"));
    assert_eq!(refresh.frame_count, 60);
}

#[test]
fn dead_pixel_walkthrough_releases_display() {
    let clock = ManualFrameClock::new();
    let mut host = RecordingHost::new();
    {
        let mut tool = Tool::mount(ToolKind::DeadPixel, &ToolConfig::default(), &mut host, clock);
        tool.start();
        for _ in 0..4 {
            tool.handle(ToolEvent::Advance, 0.0);
        }
        assert_eq!(tool.readout().pattern.map(|p| p.index), Some(4));
        assert!(tool.is_fullscreen());

        tool.handle(ToolEvent::Advance, 0.0);
        assert!(!tool.is_active());
        assert!(!tool.is_fullscreen());
    }
    assert_eq!(
        host.calls(),
        &[
            HostCall::RequestFullscreen,
            HostCall::SuppressScroll(true),
            HostCall::SuppressScroll(false),
            HostCall::ExitFullscreen,
        ]
    );
}

#[test]
fn denied_fullscreen_still_runs_patterns() {
    let clock = ManualFrameClock::new();
    let mut host = RecordingHost::denying();
    let mut tool = Tool::mount(ToolKind::Brightness, &ToolConfig::default(), &mut host, clock);
    assert!(tool.start());
    assert!(tool.is_active());
    assert!(!tool.is_fullscreen());
    let mut surface = SceneRecorder::new(Size::new(320.0, 200.0));
    assert_eq!(tool.render(&mut surface), Ok(true));
}

#[test]
fn teardown_mid_motion_stops_frames_and_releases() {
    let clock = ManualFrameClock::new();
    let mut host = RecordingHost::new();
    {
        let mut tool = Tool::mount(ToolKind::ResponseTime, &ToolConfig::default(), &mut host, clock.clone());
        tool.start();
        clock.run(0.0, 16.0, 10);
        assert_eq!(clock.active(), 1);
    }
    assert_eq!(clock.active(), 0);
    assert!(!host.is_fullscreen());
    assert!(!host.is_scroll_suppressed());
}

#[test]
fn flasher_rasterizes_current_color() {
    let clock = ManualFrameClock::new();
    let mut host = RecordingHost::new();
    let mut tool = Tool::mount(ToolKind::PixelRepair, &ToolConfig::default(), &mut host, clock.clone());
    tool.handle(ToolEvent::Resize(Size::new(200.0, 200.0)), 0.0);
    tool.start();
    clock.tick(0.0);
    clock.tick(150.0);

    let scene = tool.scene(Size::new(200.0, 200.0));
    let mut fb = Framebuffer::new(200, 200);
    if let Some(scene) = &scene {
        fb.render(scene);
    }
    assert_eq!(fb.get(100, 100), Some(Rgb::GREEN));
    assert_eq!(fb.get(5, 5), Some(Rgb::BLACK));
}
