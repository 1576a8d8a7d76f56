//! Named component: identity, layout position and device state.

use crate::device::{Device, DeviceKind};

/// Spatial position carried through from the layout, for display only.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A node of the process graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    pub id: String,
    pub name: String,
    pub position: Option<Position>,
    pub device: Device,
}

impl Component {
    pub fn new(id: impl Into<String>, name: impl Into<String>, device: Device) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: None,
            device,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn kind(&self) -> DeviceKind {
        self.device.kind()
    }
}
