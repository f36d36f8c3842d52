#![forbid(unsafe_code)]

//! One mounted diagnostic tool.
//!
//! A [`Tool`] owns exactly one engine, chosen by [`ToolKind`]:
//!
//! | kind                                                   | engine                          |
//! |--------------------------------------------------------|---------------------------------|
//! | `dead-pixel`, `black-white`, `color`, `contrast`, `brightness` | [`TestSession`] (stepped) |
//! | `refresh-rate`                                         | [`RefreshMeter`] (per frame)    |
//! | `response-time`                                        | [`MotionRenderer`] (per frame)  |
//! | `pixel-repair`                                         | [`PixelRepairFlasher`] (per frame) |
//!
//! Hosts feed it [`ToolEvent`]s, call [`Tool::tick`] with monotonic time and
//! [`Tool::render`] whenever they can draw. Tools never share state.

use core::str::FromStr;
use std::time::Duration;

use crate::catalog;
use crate::continuous::ContinuousSession;
use crate::error::{ParseError, SurfaceError};
use crate::flasher::{FlashSequence, FlasherConfig, PixelRepairFlasher};
use crate::frame_clock::FrameClock;
use crate::fullscreen::DisplayHost;
use crate::geometry::Size;
use crate::input::ToolEvent;
use crate::motion::{MotionConfig, MotionPattern, MotionRenderer, MotionSpeed};
use crate::pattern::PatternSequence;
use crate::refresh::{RefreshConfig, RefreshMeter, RefreshReadout};
use crate::scene::{Scene, Surface};
use crate::session::TestSession;

/// Which diagnostic to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ToolKind {
    DeadPixel,
    BlackWhite,
    Color,
    Contrast,
    Brightness,
    RefreshRate,
    ResponseTime,
    PixelRepair,
}

impl ToolKind {
    pub const ALL: [Self; 8] = [
        Self::DeadPixel,
        Self::BlackWhite,
        Self::Color,
        Self::Contrast,
        Self::Brightness,
        Self::RefreshRate,
        Self::ResponseTime,
        Self::PixelRepair,
    ];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::DeadPixel => "dead-pixel",
            Self::BlackWhite => "black-white",
            Self::Color => "color",
            Self::Contrast => "contrast",
            Self::Brightness => "brightness",
            Self::RefreshRate => "refresh-rate",
            Self::ResponseTime => "response-time",
            Self::PixelRepair => "pixel-repair",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::DeadPixel => "Dead pixel test",
            Self::BlackWhite => "Black and white test",
            Self::Color => "Color test",
            Self::Contrast => "Contrast test",
            Self::Brightness => "Brightness test",
            Self::RefreshRate => "Refresh rate test",
            Self::ResponseTime => "Response time test",
            Self::PixelRepair => "Stuck pixel repair",
        }
    }

    /// Pattern list for stepped tools; `None` for frame-driven ones.
    #[must_use]
    pub fn patterns(self) -> Option<PatternSequence> {
        match self {
            Self::DeadPixel => Some(catalog::dead_pixel()),
            Self::BlackWhite => Some(catalog::black_white()),
            Self::Color => Some(catalog::color_test()),
            Self::Contrast => Some(catalog::contrast()),
            Self::Brightness => Some(catalog::brightness()),
            Self::RefreshRate | Self::ResponseTime | Self::PixelRepair => None,
        }
    }
}

impl FromStr for ToolKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.slug().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseError::new("tool", s))
    }
}

impl core::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Per-mount options. Every field has a usable default.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ToolConfig {
    /// Pattern id to start on (stepped tools).
    pub initial_pattern: Option<String>,
    /// Auto-advance interval in milliseconds (stepped tools).
    pub auto_advance_ms: Option<u64>,
    pub motion: MotionConfig,
    pub flasher: FlasherConfig,
    pub refresh: RefreshConfig,
}

impl ToolConfig {
    #[must_use]
    pub fn with_initial_pattern(mut self, id: impl Into<String>) -> Self {
        self.initial_pattern = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_auto_advance_ms(mut self, ms: u64) -> Self {
        self.auto_advance_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn with_motion_speed(mut self, speed: MotionSpeed) -> Self {
        self.motion = self.motion.with_speed(speed);
        self
    }

    #[must_use]
    pub fn with_motion_pattern(mut self, pattern: MotionPattern) -> Self {
        self.motion = self.motion.with_pattern(pattern);
        self
    }

    #[must_use]
    pub fn with_flash_sequence(mut self, sequence: FlashSequence) -> Self {
        self.flasher = self.flasher.with_sequence(sequence);
        self
    }

    #[must_use]
    pub fn with_refresh(mut self, refresh: RefreshConfig) -> Self {
        self.refresh = refresh;
        self
    }
}

/// Stepped-tool position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PatternReadout {
    pub index: usize,
    pub total: usize,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MotionReadout {
    pub speed: MotionSpeed,
    pub pattern: MotionPattern,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlasherReadout {
    /// Current color as `#rrggbb`.
    pub color: String,
    pub elapsed_secs: f64,
    pub x: f64,
    pub y: f64,
}

/// Snapshot of a tool for status lines and the JS `readout()` call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ToolReadout {
    pub tool: ToolKind,
    pub active: bool,
    pub fullscreen: bool,
    pub pattern: Option<PatternReadout>,
    pub refresh: Option<RefreshReadout>,
    pub motion: Option<MotionReadout>,
    pub flasher: Option<FlasherReadout>,
}

impl core::fmt::Display for ToolReadout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.tool)?;
        if !self.active {
            return f.write_str(" (idle)");
        }
        if let Some(p) = &self.pattern {
            write!(f, " {}/{} {}", p.index + 1, p.total, p.name)?;
        }
        if let Some(r) = &self.refresh {
            match (r.hz, r.tier) {
                (Some(hz), Some(tier)) => write!(f, " {hz} Hz ({tier})")?,
                _ => f.write_str(" measuring")?,
            }
            write!(f, " {} frames", r.frame_count)?;
        }
        if let Some(m) = &self.motion {
            write!(f, " {} {}", m.pattern, m.speed)?;
        }
        if let Some(fl) = &self.flasher {
            write!(f, " {} {:.0}s", fl.color, fl.elapsed_secs)?;
        }
        if !self.fullscreen {
            f.write_str(" [windowed]")?;
        }
        Ok(())
    }
}

enum Engine<H: DisplayHost, C: FrameClock> {
    Patterns(TestSession<H>),
    Refresh(ContinuousSession<H, C, RefreshMeter>),
    Motion(ContinuousSession<H, C, MotionRenderer>),
    Flasher(ContinuousSession<H, C, PixelRepairFlasher>),
}

/// A mounted tool bound to one host and one frame clock.
pub struct Tool<H: DisplayHost, C: FrameClock> {
    kind: ToolKind,
    viewport: Size,
    engine: Engine<H, C>,
}

impl<H: DisplayHost, C: FrameClock> core::fmt::Debug for Tool<H, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tool")
            .field("kind", &self.kind)
            .field("viewport", &self.viewport)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

impl<H: DisplayHost, C: FrameClock> Tool<H, C> {
    /// Build the engine `kind` needs. Stepped tools never use `clock`.
    #[must_use]
    pub fn mount(kind: ToolKind, config: &ToolConfig, host: H, clock: C) -> Self {
        let viewport = Size::default();
        let engine = match kind {
            ToolKind::RefreshRate => {
                Engine::Refresh(ContinuousSession::new(host, clock, RefreshMeter::new(config.refresh)))
            }
            ToolKind::ResponseTime => Engine::Motion(ContinuousSession::new(
                host,
                clock,
                MotionRenderer::new(config.motion, viewport),
            )),
            ToolKind::PixelRepair => Engine::Flasher(ContinuousSession::new(
                host,
                clock,
                PixelRepairFlasher::new(config.flasher.clone(), viewport),
            )),
            ToolKind::DeadPixel
            | ToolKind::BlackWhite
            | ToolKind::Color
            | ToolKind::Contrast
            | ToolKind::Brightness => {
                let patterns = kind.patterns().unwrap_or_else(catalog::dead_pixel);
                let mut session = TestSession::new(patterns, host);
                if let Some(id) = &config.initial_pattern {
                    session = session.with_start_pattern(id);
                }
                if let Some(ms) = config.auto_advance_ms {
                    session = session.with_auto_advance(Duration::from_millis(ms));
                }
                Engine::Patterns(session)
            }
        };
        crate::debug!(tool = kind.slug(), "tool mounted");
        Self {
            kind,
            viewport,
            engine,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Start the test. Returns `false` if it was already running.
    pub fn start(&mut self) -> bool {
        match &mut self.engine {
            Engine::Patterns(session) => session.start(),
            Engine::Refresh(session) => {
                if !session.is_running()
                    && let Some(mut meter) = session.engine_mut()
                {
                    meter.reset();
                }
                session.start()
            }
            Engine::Motion(session) => {
                if !session.is_running()
                    && let Some(mut motion) = session.engine_mut()
                {
                    motion.reset();
                }
                session.start()
            }
            Engine::Flasher(session) => {
                if !session.is_running()
                    && let Some(mut flasher) = session.engine_mut()
                {
                    flasher.reset_timer();
                }
                session.start()
            }
        }
    }

    /// Stop the test and release the display.
    pub fn stop(&mut self) {
        match &mut self.engine {
            Engine::Patterns(session) => {
                session.stop();
            }
            Engine::Refresh(session) => session.stop(),
            Engine::Motion(session) => session.stop(),
            Engine::Flasher(session) => {
                if let Some(mut flasher) = session.engine_mut() {
                    flasher.pointer_up();
                }
                session.stop();
            }
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        match &self.engine {
            Engine::Patterns(session) => session.is_active(),
            Engine::Refresh(session) => session.is_running(),
            Engine::Motion(session) => session.is_running(),
            Engine::Flasher(session) => session.is_running(),
        }
    }

    /// Whether the display is currently in immersive mode.
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        match &self.engine {
            Engine::Patterns(session) => session.fullscreen().engaged,
            Engine::Refresh(session) => session.fullscreen().engaged,
            Engine::Motion(session) => session.fullscreen().engaged,
            Engine::Flasher(session) => session.fullscreen().engaged,
        }
    }

    fn revoke_fullscreen(&mut self) -> bool {
        match &mut self.engine {
            Engine::Patterns(session) => session.revoke_fullscreen(),
            Engine::Refresh(session) => session.revoke_fullscreen(),
            Engine::Motion(session) => session.revoke_fullscreen(),
            Engine::Flasher(session) => session.revoke_fullscreen(),
        }
    }

    /// Apply one input event. Returns whether anything changed; events that
    /// do not apply to this tool or its state are ignored.
    pub fn handle(&mut self, event: ToolEvent, now_ms: f64) -> bool {
        if let ToolEvent::Resize(size) = event {
            self.resize(size);
            return true;
        }
        match event {
            ToolEvent::Cancel => {
                let was_active = self.is_active();
                self.stop();
                return was_active;
            }
            // Leaving immersive mode through the host is the cancellation
            // key the page never saw.
            ToolEvent::FullscreenExited => {
                if !self.is_fullscreen() {
                    return false;
                }
                self.stop();
                return true;
            }
            ToolEvent::FullscreenDenied => return self.revoke_fullscreen(),
            _ => {}
        }

        match &mut self.engine {
            Engine::Patterns(session) => {
                session.tick(now_ms);
                if matches!(event, ToolEvent::Advance) && session.is_active() {
                    session.advance();
                    true
                } else {
                    false
                }
            }
            Engine::Motion(session) => {
                let Some(mut motion) = session.engine_mut() else {
                    return false;
                };
                match event {
                    ToolEvent::SelectSpeed(speed) => motion.set_speed(speed),
                    ToolEvent::SelectMotionPattern(pattern) => motion.set_pattern(pattern),
                    _ => return false,
                }
                true
            }
            Engine::Flasher(session) => {
                if !session.is_running() && event.pointer().is_some() {
                    return false;
                }
                let Some(mut flasher) = session.engine_mut() else {
                    return false;
                };
                match event {
                    ToolEvent::PointerDown { x, y } => flasher.pointer_down(crate::Position::new(x, y)),
                    ToolEvent::PointerMove { x, y } => flasher.pointer_move(crate::Position::new(x, y)),
                    ToolEvent::PointerUp { .. } => {
                        let was = flasher.is_dragging();
                        flasher.pointer_up();
                        was
                    }
                    ToolEvent::SelectSequence(sequence) => {
                        flasher.set_sequence(sequence);
                        true
                    }
                    _ => false,
                }
            }
            Engine::Refresh(_) => false,
        }
    }

    /// Drive timers with monotonic time (auto-advance).
    pub fn tick(&mut self, now_ms: f64) {
        if let Engine::Patterns(session) = &mut self.engine {
            session.tick(now_ms);
        }
    }

    fn resize(&mut self, size: Size) {
        self.viewport = size;
        match &self.engine {
            Engine::Motion(session) => {
                if let Some(mut motion) = session.engine_mut() {
                    motion.set_viewport(size);
                }
            }
            Engine::Flasher(session) => {
                if let Some(mut flasher) = session.engine_mut() {
                    flasher.set_viewport(size);
                }
            }
            Engine::Patterns(_) | Engine::Refresh(_) => {}
        }
    }

    /// What to draw at `size`; `None` while idle.
    #[must_use]
    pub fn scene(&self, size: Size) -> Option<Scene> {
        match &self.engine {
            Engine::Patterns(session) => session.scene(size),
            Engine::Refresh(session) => running(session)?.engine().map(|m| m.scene(size)),
            Engine::Motion(session) => running(session)?.engine().map(|m| m.scene(size)),
            Engine::Flasher(session) => running(session)?.engine().map(|fl| fl.scene(size)),
        }
    }

    /// Present the current scene. Returns `Ok(false)` when there was nothing
    /// to draw.
    ///
    /// # Errors
    ///
    /// Propagates [`SurfaceError`] from the surface. Engine state is not
    /// affected: a frame-driven engine keeps advancing and the next render
    /// shows its latest state.
    pub fn render<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<bool, SurfaceError> {
        let size = surface.size();
        if size != self.viewport {
            self.resize(size);
        }
        let Some(scene) = self.scene(size) else {
            return Ok(false);
        };
        surface.present(&scene)?;
        Ok(true)
    }

    #[must_use]
    pub fn readout(&self) -> ToolReadout {
        let mut readout = ToolReadout {
            tool: self.kind,
            active: self.is_active(),
            fullscreen: self.is_fullscreen(),
            pattern: None,
            refresh: None,
            motion: None,
            flasher: None,
        };
        match &self.engine {
            Engine::Patterns(session) => {
                readout.pattern = session.index().zip(session.current()).map(|(index, p)| PatternReadout {
                    index,
                    total: session.patterns().len(),
                    id: p.id().to_owned(),
                    name: p.name().to_owned(),
                });
            }
            Engine::Refresh(session) => {
                readout.refresh = session.engine().map(|m| m.readout());
            }
            Engine::Motion(session) => {
                readout.motion = session.engine().map(|m| MotionReadout {
                    speed: m.config().speed,
                    pattern: m.config().pattern,
                    position: m.position(),
                });
            }
            Engine::Flasher(session) => {
                readout.flasher = session.engine().map(|fl| {
                    let region = fl.region();
                    FlasherReadout {
                        color: fl.current_color().to_hex(),
                        elapsed_secs: fl.elapsed_ms() / 1000.0,
                        x: region.x,
                        y: region.y,
                    }
                });
            }
        }
        readout
    }

    #[must_use]
    pub fn host(&self) -> &H {
        match &self.engine {
            Engine::Patterns(session) => session.host(),
            Engine::Refresh(session) => session.host(),
            Engine::Motion(session) => session.host(),
            Engine::Flasher(session) => session.host(),
        }
    }

    /// Frame clock of a frame-driven tool.
    #[must_use]
    pub fn clock(&self) -> Option<&C> {
        match &self.engine {
            Engine::Patterns(_) => None,
            Engine::Refresh(session) => Some(session.clock()),
            Engine::Motion(session) => Some(session.clock()),
            Engine::Flasher(session) => Some(session.clock()),
        }
    }

    /// Mutable frame clock, for hosts that pump it themselves.
    pub fn clock_mut(&mut self) -> Option<&mut C> {
        match &mut self.engine {
            Engine::Patterns(_) => None,
            Engine::Refresh(session) => Some(session.clock_mut()),
            Engine::Motion(session) => Some(session.clock_mut()),
            Engine::Flasher(session) => Some(session.clock_mut()),
        }
    }
}

fn running<H, C, E>(session: &ContinuousSession<H, C, E>) -> Option<&ContinuousSession<H, C, E>>
where
    H: DisplayHost,
    C: FrameClock,
    E: crate::frame_clock::FrameConsumer + 'static,
{
    session.is_running().then_some(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::frame_clock::ManualFrameClock;
    use crate::fullscreen::RecordingHost;
    use crate::scene::SceneRecorder;
    use pretty_assertions::assert_eq;

    type TestTool<'a> = Tool<&'a mut RecordingHost, ManualFrameClock>;

    fn mount<'a>(kind: ToolKind, host: &'a mut RecordingHost, clock: &ManualFrameClock) -> TestTool<'a> {
        Tool::mount(kind, &ToolConfig::default(), host, clock.clone())
    }

    #[test]
    fn slugs_round_trip_through_from_str() {
        for kind in ToolKind::ALL {
            assert_eq!(kind.slug().parse::<ToolKind>(), Ok(kind));
        }
        assert!("nope".parse::<ToolKind>().is_err());
        assert_eq!(ToolKind::PixelRepair.to_string(), "pixel-repair");
    }

    #[test]
    fn stepped_tool_advances_and_cancels() {
        let clock = ManualFrameClock::new();
        let mut host = RecordingHost::new();
        let mut tool = mount(ToolKind::DeadPixel, &mut host, &clock);
        assert!(!tool.handle(ToolEvent::Advance, 0.0));
        assert!(tool.start());
        assert!(tool.is_fullscreen());
        assert!(tool.handle(ToolEvent::Advance, 10.0));
        let readout = tool.readout();
        assert_eq!(readout.pattern.map(|p| p.id), Some("white".to_owned()));
        assert!(tool.handle(ToolEvent::Cancel, 20.0));
        assert!(!tool.is_active());
        assert!(!tool.is_fullscreen());
        assert_eq!(clock.active(), 0);
    }

    #[test]
    fn initial_pattern_and_auto_advance_come_from_config() {
        let clock = ManualFrameClock::new();
        let mut host = RecordingHost::new();
        let config = ToolConfig::default()
            .with_initial_pattern("green")
            .with_auto_advance_ms(1_000);
        let mut tool = Tool::mount(ToolKind::DeadPixel, &config, &mut host, clock);
        tool.tick(0.0);
        tool.start();
        tool.tick(1_000.0);
        assert_eq!(tool.readout().pattern.map(|p| p.id), Some("blue".to_owned()));
        tool.tick(2_000.0);
        assert!(!tool.is_active());
    }

    #[test]
    fn refresh_tool_measures_from_clock() {
        let clock = ManualFrameClock::new();
        let mut host = RecordingHost::new();
        let mut tool = mount(ToolKind::RefreshRate, &mut host, &clock);
        tool.start();
        clock.run(0.0, 1000.0 / 60.0, 30);
        let refresh = tool.readout().refresh.unwrap_or_default();
        assert_eq!(refresh.hz, Some(60));
        assert_eq!(refresh.frame_count, 30);
        tool.stop();
        clock.run(1_000.0, 5.0, 5);
        assert_eq!(tool.readout().refresh.map(|r| r.frame_count), Some(30));
    }

    #[test]
    fn restarting_refresh_tool_resets_measurement() {
        let clock = ManualFrameClock::new();
        let mut host = RecordingHost::new();
        let mut tool = mount(ToolKind::RefreshRate, &mut host, &clock);
        tool.start();
        clock.run(0.0, 10.0, 20);
        tool.stop();
        tool.start();
        assert_eq!(tool.readout().refresh.map(|r| r.frame_count), Some(0));
    }

    #[test]
    fn motion_tool_switches_live() {
        let clock = ManualFrameClock::new();
        let mut host = RecordingHost::new();
        let mut tool = mount(ToolKind::ResponseTime, &mut host, &clock);
        tool.handle(ToolEvent::Resize(Size::new(800.0, 400.0)), 0.0);
        tool.start();
        clock.run(0.0, 16.0, 4);
        assert!(tool.handle(ToolEvent::SelectSpeed(MotionSpeed::Turbo), 64.0));
        clock.tick(80.0);
        let motion = tool.readout().motion;
        assert_eq!(motion.map(|m| m.position), Some(-120.0 + 4.0 * 5.0 + 20.0));
        assert_eq!(motion.map(|m| m.speed), Some(MotionSpeed::Turbo));
    }

    #[test]
    fn flasher_tool_drags_only_while_running() {
        let clock = ManualFrameClock::new();
        let mut host = RecordingHost::new();
        let mut tool = mount(ToolKind::PixelRepair, &mut host, &clock);
        tool.handle(ToolEvent::Resize(Size::new(400.0, 400.0)), 0.0);
        assert!(!tool.handle(ToolEvent::PointerDown { x: 200.0, y: 200.0 }, 0.0));

        tool.start();
        assert!(tool.handle(ToolEvent::PointerDown { x: 200.0, y: 200.0 }, 0.0));
        assert!(tool.handle(ToolEvent::PointerMove { x: 210.0, y: 190.0 }, 0.0));
        assert!(tool.handle(ToolEvent::PointerUp { x: 210.0, y: 190.0 }, 0.0));
        let flasher = tool.readout().flasher;
        assert_eq!(flasher.as_ref().map(|f| (f.x, f.y)), Some((160.0, 140.0)));
    }

    #[test]
    fn cancelled_drag_and_idle_time_do_not_survive_a_restart() {
        let clock = ManualFrameClock::new();
        let mut host = RecordingHost::new();
        let mut tool = mount(ToolKind::PixelRepair, &mut host, &clock);
        tool.handle(ToolEvent::Resize(Size::new(400.0, 400.0)), 0.0);

        tool.start();
        clock.tick(0.0);
        assert!(tool.handle(ToolEvent::PointerDown { x: 200.0, y: 200.0 }, 0.0));
        assert!(tool.handle(ToolEvent::Cancel, 0.0));
        clock.tick(60_000.0);

        tool.start();
        clock.tick(60_000.0);
        clock.tick(180_000.0);
        assert!(!tool.handle(ToolEvent::PointerMove { x: 100.0, y: 100.0 }, 180_000.0));

        let flasher = tool.readout().flasher.expect("flasher readout");
        assert_eq!((flasher.x, flasher.y), (150.0, 150.0));
        assert_eq!(flasher.elapsed_secs, 120.0);
    }

    #[test]
    fn host_exit_from_fullscreen_stops_the_test() {
        let clock = ManualFrameClock::new();
        let mut host = RecordingHost::new();
        {
            let mut tool = mount(ToolKind::DeadPixel, &mut host, &clock);
            assert!(!tool.handle(ToolEvent::FullscreenExited, 0.0));
            tool.start();
            assert!(tool.handle(ToolEvent::FullscreenExited, 10.0));
            assert!(!tool.is_active());
            assert!(!tool.is_fullscreen());
            assert!(!tool.host().is_scroll_suppressed());
            // Our own exit echoes back as another change; nothing left to do.
            assert!(!tool.handle(ToolEvent::FullscreenExited, 20.0));
        }
        assert!(!host.is_fullscreen());
    }

    #[test]
    fn late_fullscreen_refusal_keeps_running_in_normal_layout() {
        let clock = ManualFrameClock::new();
        let mut host = RecordingHost::new();
        let mut tool = mount(ToolKind::RefreshRate, &mut host, &clock);
        tool.start();
        assert!(tool.host().is_scroll_suppressed());

        assert!(tool.handle(ToolEvent::FullscreenDenied, 0.0));
        assert!(tool.is_active());
        assert!(!tool.is_fullscreen());
        assert!(!tool.host().is_scroll_suppressed());
        assert!(!tool.handle(ToolEvent::FullscreenDenied, 0.0));
        // Not engaged any more, so a host exit is not a cancellation.
        assert!(!tool.handle(ToolEvent::FullscreenExited, 0.0));

        clock.run(0.0, 10.0, 3);
        assert_eq!(tool.readout().refresh.map(|r| r.frame_count), Some(3));
    }

    #[test]
    fn render_skips_when_idle_and_tracks_surface_size() {
        let clock = ManualFrameClock::new();
        let mut host = RecordingHost::new();
        let mut tool = mount(ToolKind::BlackWhite, &mut host, &clock);
        let mut surface = SceneRecorder::new(Size::new(64.0, 32.0));
        assert_eq!(tool.render(&mut surface), Ok(false));
        tool.start();
        assert_eq!(tool.render(&mut surface), Ok(true));
        assert_eq!(tool.viewport(), Size::new(64.0, 32.0));
        assert_eq!(surface.last().and_then(Scene::background), Some(Rgb::BLACK));
    }

    #[test]
    fn unavailable_surface_does_not_stall_motion() {
        let clock = ManualFrameClock::new();
        let mut host = RecordingHost::new();
        let mut tool = mount(ToolKind::ResponseTime, &mut host, &clock);
        let mut surface = SceneRecorder::new(Size::new(800.0, 400.0));
        tool.render(&mut surface).ok();
        tool.start();
        surface.set_available(false);
        clock.run(0.0, 16.0, 3);
        assert_eq!(tool.render(&mut surface), Err(SurfaceError::Unavailable));
        surface.set_available(true);
        clock.tick(48.0);
        assert_eq!(tool.render(&mut surface), Ok(true));
        assert_eq!(tool.readout().motion.map(|m| m.position), Some(-100.0));
    }

    #[test]
    fn readout_display_is_compact() {
        let clock = ManualFrameClock::new();
        let mut host = RecordingHost::denying();
        let mut tool = mount(ToolKind::Color, &mut host, &clock);
        assert_eq!(tool.readout().to_string(), "color (idle)");
        tool.start();
        assert_eq!(tool.readout().to_string(), "color 1/8 Red [windowed]");
    }
}
