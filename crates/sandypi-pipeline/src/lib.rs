//! sandypi-pipeline: Pure geometry pipeline for a sand table (sans-IO).
//!
//! Turns drawing parameters into machine-space polylines through:
//! pattern generation -> layer transform -> coordinate transform ->
//! boundary clipping.
//!
//! This crate has **no I/O dependencies**: table settings arrive as an
//! in-memory JSON value and results are returned as plain data. G-code
//! serialization lives in `sandypi-export`, HTTP and filesystem access in
//! `sandypi-io`.

pub mod clip;
pub mod font;
pub mod generators;
pub mod input;
pub mod layers;
pub mod playback;
pub mod stamps;
pub mod symmetry;
pub mod table;
pub mod transform;
pub mod types;

pub use clip::{BoundaryHit, Edge, clip_polyline, clip_polylines};
pub use generators::{Pattern, PatternGenerator, PatternKind};
pub use layers::{Layer, LayerAction, PatternBuilder, TransformPatch};
pub use playback::{GearConfig, GearMode, PlaybackEvent, PlaybackState, SpirographPlayer};
pub use symmetry::{MirrorMode, kaleidoscope};
pub use table::{Corners, Rotation, TableConfig};
pub use transform::{CoordinateSpace, LayerTransform, to_canvas, to_machine, to_machine_paths};
pub use types::{Bounds, CanvasSize, PatternError, Point, Polyline};
