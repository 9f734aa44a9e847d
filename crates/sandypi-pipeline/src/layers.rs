//! Pattern-builder document: an ordered stack of generated layers.
//!
//! Each [`Layer`] pairs a [`Pattern`] with a [`LayerTransform`]. Layers
//! are generated in order, so reordering changes drawing order on the
//! table. Edits go through methods on [`PatternBuilder`] or, for callers
//! that queue edits as data, through [`LayerAction`] and
//! [`PatternBuilder::apply`].
//!
//! Layer ids come from a counter owned by the document, never from
//! global state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generators::{Pattern, PatternGenerator, PatternKind};
use crate::transform::{LayerTransform, transform_points};
use crate::types::{PatternError, Polyline};

/// Feedrate used for new documents, in machine units per minute.
pub const DEFAULT_FEEDRATE: f64 = 2000.0;

/// One pattern layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Document-unique id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// What to draw.
    #[serde(default)]
    pub pattern: Pattern,
    /// Hidden layers are skipped by [`PatternBuilder::generate`].
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Placement of the pattern.
    #[serde(default)]
    pub transform: LayerTransform,
}

const fn default_visible() -> bool {
    true
}

impl Layer {
    fn new(id: u64, name: String, kind: PatternKind) -> Self {
        Self {
            id,
            name,
            pattern: kind.defaults(),
            visible: true,
            transform: LayerTransform::default(),
        }
    }

    /// Generate the layer's points: pattern first, then transform.
    #[must_use]
    pub fn generate(&self) -> Polyline {
        transform_points(&self.pattern.generate(), &self.transform)
    }
}

/// Partial update of a [`LayerTransform`]. Absent fields keep their value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransformPatch {
    /// New scale.
    pub scale: Option<f64>,
    /// New rotation in degrees.
    pub rotation: Option<f64>,
    /// New x offset.
    pub offset_x: Option<f64>,
    /// New y offset.
    pub offset_y: Option<f64>,
}

impl TransformPatch {
    fn apply_to(self, transform: &mut LayerTransform) {
        if let Some(scale) = self.scale {
            transform.scale = scale;
        }
        if let Some(rotation) = self.rotation {
            transform.rotation = rotation;
        }
        if let Some(offset_x) = self.offset_x {
            transform.offset_x = offset_x;
        }
        if let Some(offset_y) = self.offset_y {
            transform.offset_y = offset_y;
        }
    }
}

/// An edit to a [`PatternBuilder`], as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LayerAction {
    /// Append a layer with default parameters and select it.
    AddLayer {
        /// Pattern of the new layer.
        #[serde(default = "default_new_kind")]
        kind: PatternKind,
    },
    /// Remove a layer.
    RemoveLayer {
        /// Target layer.
        id: u64,
    },
    /// Select a layer.
    SelectLayer {
        /// Target layer.
        id: u64,
    },
    /// Merge parameter values into a layer's current parameters.
    UpdateLayerParams {
        /// Target layer.
        id: u64,
        /// JSON object of parameter names to new values.
        params: Value,
    },
    /// Merge transform values into a layer's current transform.
    UpdateLayerTransform {
        /// Target layer.
        id: u64,
        /// Fields to change.
        transform: TransformPatch,
    },
    /// Switch a layer's pattern type, resetting its parameters.
    UpdateLayerPatternType {
        /// Target layer.
        id: u64,
        /// New pattern type.
        pattern_type: PatternKind,
    },
    /// Flip a layer's visibility.
    ToggleLayerVisibility {
        /// Target layer.
        id: u64,
    },
    /// Rename a layer.
    RenameLayer {
        /// Target layer.
        id: u64,
        /// New name.
        name: String,
    },
    /// Move the layer at `from_index` to `to_index`.
    ReorderLayers {
        /// Current position.
        from_index: usize,
        /// New position.
        to_index: usize,
    },
    /// Set the document name used for uploads.
    SetDrawingName {
        /// New name.
        name: String,
    },
    /// Set the drawing feedrate.
    SetFeedrate {
        /// Units per minute.
        feedrate: f64,
    },
    /// Return to the initial document.
    ResetPattern,
}

const fn default_new_kind() -> PatternKind {
    PatternKind::Circle
}

/// The pattern-builder document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternBuilder {
    layers: Vec<Layer>,
    #[serde(default)]
    selected: Option<u64>,
    #[serde(default)]
    drawing_name: String,
    #[serde(default = "default_feedrate")]
    feedrate: f64,
    #[serde(default)]
    next_id: u64,
}

const fn default_feedrate() -> f64 {
    DEFAULT_FEEDRATE
}

impl Default for PatternBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternBuilder {
    /// A document with a single spirograph layer named "Layer 1".
    #[must_use]
    pub fn new() -> Self {
        Self {
            layers: vec![Layer::new(1, "Layer 1".to_string(), PatternKind::Spirograph)],
            selected: None,
            drawing_name: String::new(),
            feedrate: DEFAULT_FEEDRATE,
            next_id: 2,
        }
    }

    /// Layers in generation order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Look up a layer by id.
    #[must_use]
    pub fn layer(&self, id: u64) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Currently selected layer id.
    #[must_use]
    pub const fn selected(&self) -> Option<u64> {
        self.selected
    }

    /// Name used for uploads.
    #[must_use]
    pub fn drawing_name(&self) -> &str {
        &self.drawing_name
    }

    /// Drawing feedrate.
    #[must_use]
    pub const fn feedrate(&self) -> f64 {
        self.feedrate
    }

    /// Append a layer of `kind` with default parameters and select it.
    pub fn add_layer(&mut self, kind: PatternKind) -> u64 {
        let id = self.allocate_id();
        let name = format!("Layer {}", self.layers.len() + 1);
        self.layers.push(Layer::new(id, name, kind));
        self.selected = Some(id);
        id
    }

    /// Remove a layer. If it was selected, the first remaining layer (if
    /// any) becomes selected.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::UnknownLayer`] if no layer has `id`.
    pub fn remove_layer(&mut self, id: u64) -> Result<(), PatternError> {
        let index = self.index_of(id)?;
        self.layers.remove(index);
        if self.selected == Some(id) {
            self.selected = self.layers.first().map(|l| l.id);
        }
        Ok(())
    }

    /// Select a layer.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::UnknownLayer`] if no layer has `id`.
    pub fn select_layer(&mut self, id: u64) -> Result<(), PatternError> {
        self.index_of(id)?;
        self.selected = Some(id);
        Ok(())
    }

    /// Merge `patch` (a JSON object) into the layer's current parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::UnknownLayer`] if no layer has `id`, or
    /// [`PatternError::InvalidParams`] if the merged parameters do not
    /// deserialize for the layer's pattern type.
    pub fn update_params(&mut self, id: u64, patch: &Value) -> Result<(), PatternError> {
        let layer = self.layer_mut(id)?;
        let mut current = serde_json::to_value(&layer.pattern)
            .map_err(|e| PatternError::InvalidParams(e.to_string()))?;

        let Value::Object(changes) = patch else {
            return Err(PatternError::InvalidParams(
                "parameters must be a JSON object".to_string(),
            ));
        };
        if let Some(Value::Object(params)) = current.get_mut("params") {
            for (key, value) in changes {
                params.insert(key.clone(), value.clone());
            }
        }

        layer.pattern = serde_json::from_value(current)
            .map_err(|e| PatternError::InvalidParams(e.to_string()))?;
        Ok(())
    }

    /// Change some fields of a layer's transform.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::UnknownLayer`] if no layer has `id`.
    pub fn update_transform(&mut self, id: u64, patch: TransformPatch) -> Result<(), PatternError> {
        patch.apply_to(&mut self.layer_mut(id)?.transform);
        Ok(())
    }

    /// Switch a layer to another pattern type with default parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::UnknownLayer`] if no layer has `id`.
    pub fn set_pattern_kind(&mut self, id: u64, kind: PatternKind) -> Result<(), PatternError> {
        self.layer_mut(id)?.pattern = kind.defaults();
        Ok(())
    }

    /// Flip a layer's visibility.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::UnknownLayer`] if no layer has `id`.
    pub fn toggle_visibility(&mut self, id: u64) -> Result<(), PatternError> {
        let layer = self.layer_mut(id)?;
        layer.visible = !layer.visible;
        Ok(())
    }

    /// Rename a layer.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::UnknownLayer`] if no layer has `id`.
    pub fn rename_layer(&mut self, id: u64, name: impl Into<String>) -> Result<(), PatternError> {
        self.layer_mut(id)?.name = name.into();
        Ok(())
    }

    /// Move the layer at `from` so it ends up at index `to`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::IndexOutOfRange`] if either index is not a
    /// valid layer position.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), PatternError> {
        let len = self.layers.len();
        for index in [from, to] {
            if index >= len {
                return Err(PatternError::IndexOutOfRange { index, len });
            }
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        Ok(())
    }

    /// Set the name used for uploads.
    pub fn set_drawing_name(&mut self, name: impl Into<String>) {
        self.drawing_name = name.into();
    }

    /// Set the drawing feedrate.
    pub const fn set_feedrate(&mut self, feedrate: f64) {
        self.feedrate = feedrate;
    }

    /// Return to the initial document.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Apply an edit expressed as data.
    ///
    /// # Errors
    ///
    /// Propagates the error of the corresponding method.
    pub fn apply(&mut self, action: LayerAction) -> Result<(), PatternError> {
        match action {
            LayerAction::AddLayer { kind } => {
                self.add_layer(kind);
                Ok(())
            }
            LayerAction::RemoveLayer { id } => self.remove_layer(id),
            LayerAction::SelectLayer { id } => self.select_layer(id),
            LayerAction::UpdateLayerParams { id, params } => self.update_params(id, &params),
            LayerAction::UpdateLayerTransform { id, transform } => {
                self.update_transform(id, transform)
            }
            LayerAction::UpdateLayerPatternType { id, pattern_type } => {
                self.set_pattern_kind(id, pattern_type)
            }
            LayerAction::ToggleLayerVisibility { id } => self.toggle_visibility(id),
            LayerAction::RenameLayer { id, name } => self.rename_layer(id, name),
            LayerAction::ReorderLayers {
                from_index,
                to_index,
            } => self.reorder(from_index, to_index),
            LayerAction::SetDrawingName { name } => {
                self.set_drawing_name(name);
                Ok(())
            }
            LayerAction::SetFeedrate { feedrate } => {
                self.set_feedrate(feedrate);
                Ok(())
            }
            LayerAction::ResetPattern => {
                self.reset();
                Ok(())
            }
        }
    }

    /// Points of every visible layer, in layer order.
    #[must_use]
    pub fn generate(&self) -> Vec<Polyline> {
        self.layers
            .iter()
            .filter(|l| l.visible)
            .map(Layer::generate)
            .collect()
    }

    fn allocate_id(&mut self) -> u64 {
        let past_existing = self.layers.iter().map(|l| l.id + 1).max().unwrap_or(1);
        let id = self.next_id.max(past_existing);
        self.next_id = id + 1;
        id
    }

    fn index_of(&self, id: u64) -> Result<usize, PatternError> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(PatternError::UnknownLayer(id))
    }

    fn layer_mut(&mut self, id: u64) -> Result<&mut Layer, PatternError> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(PatternError::UnknownLayer(id))
    }
}
