use crate::tf::timestamp_now;
use navguard_core::core::LogSummary;
use serde::{Deserialize, Serialize};

/// Occupied voxels of a 3D occupancy map
///
/// Each point is the center of an occupied cube of edge `resolution`,
/// expressed in `frame_id`. An update always replaces the whole map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyVoxels {
    pub frame_id: String,
    /// Voxel edge length in meters
    pub resolution: f64,
    pub points: Vec<[f64; 3]>,
    pub timestamp: u64,
}

impl OccupancyVoxels {
    pub fn new(resolution: f64, points: Vec<[f64; 3]>) -> Self {
        Self {
            frame_id: "world".to_string(),
            resolution,
            points,
            timestamp: timestamp_now(),
        }
    }

    pub fn empty(resolution: f64) -> Self {
        Self::new(resolution, Vec::new())
    }

    /// Fill the axis-aligned box `[min, max]` with voxel centers
    pub fn filled_box(resolution: f64, min: [f64; 3], max: [f64; 3]) -> Self {
        let mut points = Vec::new();
        if resolution > 0.0 && resolution.is_finite() {
            let steps = |axis: usize| ((max[axis] - min[axis]) / resolution).floor().max(0.0) as usize;
            for i in 0..=steps(0) {
                for j in 0..=steps(1) {
                    for k in 0..=steps(2) {
                        points.push([
                            min[0] + i as f64 * resolution,
                            min[1] + j as f64 * resolution,
                            min[2] + k as f64 * resolution,
                        ]);
                    }
                }
            }
        }
        Self::new(resolution, points)
    }
}

impl LogSummary for OccupancyVoxels {
    fn log_summary(&self) -> String {
        format!(
            "OccupancyVoxels({}: {} voxels @ {:.3}m)",
            self.frame_id,
            self.points.len(),
            self.resolution
        )
    }
}
