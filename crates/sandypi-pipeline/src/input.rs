//! Multi-pointer input routing and the rotary dial widget.
//!
//! Several pointers (touches, a mouse) may be active at once. Each widget
//! claims at most one input stream on press and keeps it until that same
//! stream is released or cancelled; events from other streams never reach
//! it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Identifier of one pointer stream, e.g. a touch identifier.
pub type StreamId = u64;

/// Maps active input streams to the widgets that claimed them.
#[derive(Debug, Clone)]
pub struct InputRouter<W> {
    claims: HashMap<StreamId, W>,
}

impl<W> Default for InputRouter<W> {
    fn default() -> Self {
        Self {
            claims: HashMap::new(),
        }
    }
}

impl<W: PartialEq> InputRouter<W> {
    /// An empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `stream` for `widget`.
    ///
    /// Fails (returns `false`) if the stream is already claimed or the
    /// widget already holds another stream.
    pub fn press(&mut self, stream: StreamId, widget: W) -> bool {
        if self.claims.contains_key(&stream) || self.claims.values().any(|w| *w == widget) {
            return false;
        }
        self.claims.insert(stream, widget);
        true
    }

    /// The widget that owns `stream`, if any.
    #[must_use]
    pub fn route(&self, stream: StreamId) -> Option<&W> {
        self.claims.get(&stream)
    }

    /// The stream held by `widget`, if any.
    #[must_use]
    pub fn stream_of(&self, widget: &W) -> Option<StreamId> {
        self.claims
            .iter()
            .find_map(|(stream, w)| (w == widget).then_some(*stream))
    }

    /// End `stream` normally, returning the widget that held it.
    pub fn release(&mut self, stream: StreamId) -> Option<W> {
        self.claims.remove(&stream)
    }

    /// Abort `stream`, returning the widget that held it.
    pub fn cancel(&mut self, stream: StreamId) -> Option<W> {
        self.claims.remove(&stream)
    }

    /// Number of active claims.
    #[must_use]
    pub fn active(&self) -> usize {
        self.claims.len()
    }
}

/// Position change below this magnitude is not reported.
const MIN_POSITION_DELTA: f64 = 0.001;

/// Scale from dial degrees to position units.
const POSITION_SCALE: f64 = 0.1;

/// A dial turned by dragging a pointer around its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotaryDial {
    center: Point,
    sensitivity: f64,
    rotation: f64,
    last_angle: Option<f64>,
}

impl RotaryDial {
    /// Default sensitivity.
    pub const DEFAULT_SENSITIVITY: f64 = 0.5;

    /// A dial centered on `center`.
    #[must_use]
    pub const fn new(center: Point, sensitivity: f64) -> Self {
        Self {
            center,
            sensitivity,
            rotation: 0.0,
            last_angle: None,
        }
    }

    /// Accumulated visual rotation in degrees.
    #[must_use]
    pub const fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Returns `true` while a drag is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.last_angle.is_some()
    }

    /// Start a drag at `pointer`.
    pub fn begin(&mut self, pointer: Point) {
        self.last_angle = Some(self.angle_of(pointer));
    }

    /// Continue a drag, returning the position change to apply, if it is
    /// large enough to matter.
    pub fn drag(&mut self, pointer: Point) -> Option<f64> {
        let last = self.last_angle?;
        let current = self.angle_of(pointer);
        let delta = wrap_degrees(current - last);
        self.last_angle = Some(current);
        self.rotation += delta * self.sensitivity;

        let position_delta = delta * self.sensitivity * POSITION_SCALE;
        (position_delta.abs() > MIN_POSITION_DELTA).then_some(position_delta)
    }

    /// Finish the drag.
    pub const fn end(&mut self) {
        self.last_angle = None;
    }

    fn angle_of(&self, pointer: Point) -> f64 {
        (pointer.y - self.center.y)
            .atan2(pointer.x - self.center.x)
            .to_degrees()
    }
}

/// Bring an angle difference into `[-180, 180]`.
fn wrap_degrees(delta: f64) -> f64 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Knob {
        Horizontal,
        Vertical,
    }

    #[test]
    fn streams_route_to_their_claimant() {
        let mut router = InputRouter::new();
        assert!(router.press(1, Knob::Horizontal));
        assert!(router.press(2, Knob::Vertical));
        assert_eq!(router.route(1), Some(&Knob::Horizontal));
        assert_eq!(router.route(2), Some(&Knob::Vertical));
        assert_eq!(router.route(3), None);
        assert_eq!(router.stream_of(&Knob::Vertical), Some(2));
    }

    #[test]
    fn widget_and_stream_hold_one_claim_each() {
        let mut router = InputRouter::new();
        assert!(router.press(1, Knob::Horizontal));
        assert!(!router.press(2, Knob::Horizontal));
        assert!(!router.press(1, Knob::Vertical));
        assert_eq!(router.active(), 1);
    }

    #[test]
    fn release_frees_only_matching_stream() {
        let mut router = InputRouter::new();
        router.press(1, Knob::Horizontal);
        router.press(2, Knob::Vertical);
        assert_eq!(router.release(3), None);
        assert_eq!(router.cancel(2), Some(Knob::Vertical));
        assert_eq!(router.route(1), Some(&Knob::Horizontal));
        assert!(router.press(4, Knob::Vertical));
    }

    #[test]
    fn dial_reports_scaled_delta() {
        let mut dial = RotaryDial::new(Point::new(0.0, 0.0), 0.5);
        dial.begin(Point::new(1.0, 0.0));
        let delta = dial.drag(Point::new(0.0, 1.0)).unwrap();
        assert!((delta - 4.5).abs() < 1e-9);
        assert!((dial.rotation() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn dial_wraps_across_half_turn() {
        let mut dial = RotaryDial::new(Point::new(0.0, 0.0), 1.0);
        // Just above the negative x axis to just below it: a small step,
        // not a full turn.
        dial.begin(Point::new(-1.0, 0.01));
        let delta = dial.drag(Point::new(-1.0, -0.01)).unwrap();
        assert!(delta > 0.0);
        assert!(delta < 0.2);
    }

    #[test]
    fn dial_ignores_tiny_moves_and_idle_drags() {
        let mut dial = RotaryDial::new(Point::new(0.0, 0.0), 0.5);
        assert_eq!(dial.drag(Point::new(1.0, 0.0)), None);
        dial.begin(Point::new(1.0, 0.0));
        assert_eq!(dial.drag(Point::new(1.0, 0.0001)), None);
        assert!(dial.is_dragging());
        dial.end();
        assert!(!dial.is_dragging());
    }
}
