//! Tick-driven playback for the gear (spirograph) drawing tool.
//!
//! [`PlaybackState`] is a pure state machine; [`SpirographPlayer`] owns
//! one and advances the drawing only when the caller's clock calls
//! [`SpirographPlayer::tick`]. Nothing here schedules frames or sleeps.
//!
//! ```text
//!            Play / Toggle
//!   Idle ───────────────────► Playing
//!    ▲  ◄───────────────────    │
//!    │     Pause / Toggle       │ Finish
//!    │                          ▼
//!    └──────── Reset ─────── Complete
//! ```

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::types::{Point, Polyline};

/// Where an animation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    /// Not advancing. Also the paused state.
    #[default]
    Idle,
    /// Advancing on every tick.
    Playing,
    /// Reached the end; only a reset leaves this state.
    Complete,
}

/// Input to [`PlaybackState::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Start or resume.
    Play,
    /// Stop advancing, keeping progress.
    Pause,
    /// Play if idle, pause if playing.
    Toggle,
    /// The animation reached its end.
    Finish,
    /// Discard progress.
    Reset,
}

impl PlaybackState {
    /// The state after `event`.
    #[must_use]
    pub const fn transition(self, event: PlaybackEvent) -> Self {
        match (self, event) {
            (_, PlaybackEvent::Reset) => Self::Idle,
            (_, PlaybackEvent::Finish) | (Self::Complete, _) => Self::Complete,
            (Self::Idle, PlaybackEvent::Play | PlaybackEvent::Toggle) => Self::Playing,
            (Self::Playing, PlaybackEvent::Pause | PlaybackEvent::Toggle) => Self::Idle,
            (state, _) => state,
        }
    }
}

/// Whether the moving gear rolls inside or outside the fixed ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GearMode {
    /// Hypotrochoid.
    #[default]
    Inside,
    /// Epitrochoid.
    Outside,
}

/// Gear-tool settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GearConfig {
    /// Teeth on the fixed ring.
    pub fixed_teeth: u32,
    /// Teeth on the rolling gear.
    pub moving_teeth: u32,
    /// Pen hole as a fraction of the rolling gear's radius.
    pub pen_position: f64,
    /// Inside or outside the ring.
    pub mode: GearMode,
    /// Animation speed; each tick advances `speed × 0.02` radians.
    pub speed: f64,
}

impl Default for GearConfig {
    fn default() -> Self {
        Self {
            fixed_teeth: 96,
            moving_teeth: 36,
            pen_position: 0.8,
            mode: GearMode::Inside,
            speed: 2.0,
        }
    }
}

/// Fixed ring radius in center-normalized units.
const RING_RADIUS: f64 = 0.63;

/// Radians advanced per tick at speed 1.
const STEP_PER_SPEED: f64 = 0.02;

impl GearConfig {
    /// Angle at which the pen returns to its starting point.
    #[must_use]
    pub fn max_angle(&self) -> f64 {
        let fixed = self.fixed_teeth.max(1);
        let moving = self.moving_teeth.max(1);
        f64::from(moving / gcd(fixed, moving)) * TAU
    }

    /// Pen position at `angle`, center-normalized and +Y up.
    #[must_use]
    pub fn point_at(&self, angle: f64) -> Point {
        let big_r = RING_RADIUS;
        let r = big_r * f64::from(self.moving_teeth.max(1)) / f64::from(self.fixed_teeth.max(1));
        let d = r * self.pen_position;

        let (x, y) = match self.mode {
            GearMode::Inside => {
                let k = (big_r - r) / r;
                (
                    (big_r - r).mul_add(angle.cos(), d * (k * angle).cos()),
                    (big_r - r).mul_add(angle.sin(), -(d * (k * angle).sin())),
                )
            }
            GearMode::Outside => {
                let k = (big_r + r) / r;
                (
                    (big_r + r).mul_add(angle.cos(), -(d * (k * angle).cos())),
                    (big_r + r).mul_add(angle.sin(), -(d * (k * angle).sin())),
                )
            }
        };
        // The gear math is in screen orientation; flip to +Y up.
        Point::new(x, -y)
    }
}

const fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Animated gear drawing with committed layers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpirographPlayer {
    config: GearConfig,
    state: PlaybackState,
    angle: f64,
    points: Vec<Point>,
    layers: Vec<Polyline>,
}

impl SpirographPlayer {
    /// A player with no drawing yet.
    #[must_use]
    pub fn new(config: GearConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current settings.
    #[must_use]
    pub const fn config(&self) -> &GearConfig {
        &self.config
    }

    /// Change settings. The drawing in progress is discarded; committed
    /// layers are kept.
    pub fn set_config(&mut self, config: GearConfig) {
        self.config = config;
        self.reset();
    }

    /// Playback state.
    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current gear angle in radians.
    #[must_use]
    pub const fn angle(&self) -> f64 {
        self.angle
    }

    /// Points of the drawing in progress.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Committed drawings.
    #[must_use]
    pub fn layers(&self) -> &[Polyline] {
        &self.layers
    }

    /// Committed layers followed by the drawing in progress, if any.
    #[must_use]
    pub fn paths(&self) -> Vec<Polyline> {
        let mut paths = self.layers.clone();
        if !self.points.is_empty() {
            paths.push(Polyline::new(self.points.clone()));
        }
        paths
    }

    /// Apply a playback event.
    pub const fn handle(&mut self, event: PlaybackEvent) {
        self.state = self.state.transition(event);
    }

    /// Start or resume.
    pub const fn play(&mut self) {
        self.handle(PlaybackEvent::Play);
    }

    /// Pause, keeping progress.
    pub const fn pause(&mut self) {
        self.handle(PlaybackEvent::Pause);
    }

    /// Play if idle, pause if playing.
    pub const fn toggle(&mut self) {
        self.handle(PlaybackEvent::Toggle);
    }

    /// Discard the drawing in progress.
    pub fn reset(&mut self) {
        self.handle(PlaybackEvent::Reset);
        self.angle = 0.0;
        self.points.clear();
    }

    /// Advance one clock tick.
    ///
    /// Returns the point appended, or `None` when not playing. The tick
    /// that reaches the closing angle appends the closing point and moves
    /// to [`PlaybackState::Complete`].
    pub fn tick(&mut self) -> Option<Point> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        let max = self.config.max_angle();
        let step = self.config.speed * STEP_PER_SPEED;
        self.angle = (self.angle + step).min(max);
        let point = self.config.point_at(self.angle);
        self.points.push(point);
        if self.angle >= max {
            self.handle(PlaybackEvent::Finish);
        }
        Some(point)
    }

    /// Replace the drawing in progress with the full curve, 360 samples
    /// per rotation.
    pub fn generate_complete(&mut self) {
        let max = self.config.max_angle();
        let rotations = self.config.moving_teeth.max(1)
            / gcd(self.config.fixed_teeth.max(1), self.config.moving_teeth.max(1));
        let steps = rotations.saturating_mul(360);
        self.points = (0..=steps)
            .map(|i| self.config.point_at(f64::from(i) / f64::from(steps) * max))
            .collect();
        self.angle = max;
        self.handle(PlaybackEvent::Finish);
    }

    /// Move the drawing in progress onto the committed layers and start
    /// a fresh one. Does nothing when there is nothing drawn.
    pub fn commit_layer(&mut self) {
        if self.points.is_empty() {
            return;
        }
        self.layers.push(Polyline::new(std::mem::take(&mut self.points)));
        self.reset();
    }

    /// Drop every committed layer and the drawing in progress.
    pub fn clear_layers(&mut self) {
        self.layers.clear();
        self.reset();
    }
}
