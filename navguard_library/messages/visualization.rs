use crate::tf::{timestamp_now, Transform};
use navguard_core::core::LogSummary;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorRGBA {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRGBA {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn blue() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    pub const fn red() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerType {
    Arrow,
    Cube,
    Sphere,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerAction {
    Add,
    Delete,
}

/// Single display primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub ns: String,
    pub id: i32,
    pub frame_id: String,
    pub marker_type: MarkerType,
    pub action: MarkerAction,
    pub pose: Transform,
    pub scale: [f64; 3],
    pub color: ColorRGBA,
    pub timestamp: u64,
}

impl Marker {
    /// Arrow along the pose's x axis
    pub fn arrow(ns: &str, id: i32, frame_id: &str, pose: Transform) -> Self {
        Self {
            ns: ns.to_string(),
            id,
            frame_id: frame_id.to_string(),
            marker_type: MarkerType::Arrow,
            action: MarkerAction::Add,
            pose,
            scale: [0.1, 0.025, 0.025],
            color: ColorRGBA::blue(),
            timestamp: timestamp_now(),
        }
    }

    pub fn with_scale(mut self, scale: [f64; 3]) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_color(mut self, color: ColorRGBA) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerArray {
    pub markers: Vec<Marker>,
}

impl MarkerArray {
    pub fn new(markers: Vec<Marker>) -> Self {
        Self { markers }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl LogSummary for MarkerArray {
    fn log_summary(&self) -> String {
        format!("MarkerArray({} markers)", self.markers.len())
    }
}
