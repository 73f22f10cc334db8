use super::{
    AllowedCollisionMatrix, CollisionRequest, CollisionResult, CollisionWorld, Contact, RobotModel,
};
use crate::messages::{OccupancyVoxels, RobotState};
use nalgebra::{Isometry3, Matrix3, Point3, Vector3};
use navguard_core::error::{NavGuardError, NavGuardResult};

/// Body name reported for contacts with the occupancy map
pub const OCTOMAP_BODY: &str = "<octomap>";

/// Robot link placed in the world for one query
struct PlacedLink<'a> {
    name: &'a str,
    pose: Isometry3<f64>,
    half: Vector3<f64>,
}

/// Reference collision world: box-link robot against occupied voxels
///
/// Each voxel is treated as its bounding sphere, so the test may report a
/// contact slightly early but never misses one. Link-versus-link checks use
/// an exact oriented-box separating axis test and only run for pairs the
/// allowed collision matrix does not allow.
#[derive(Debug, Clone)]
pub struct VoxelCollisionWorld {
    model: RobotModel,
    frame_id: String,
    resolution: f64,
    voxels: Vec<[f64; 3]>,
    updates_applied: u64,
}

impl VoxelCollisionWorld {
    /// Empty world in the `world` frame
    pub fn new(model: RobotModel) -> Self {
        Self {
            model,
            frame_id: "world".to_string(),
            resolution: 0.05,
            voxels: Vec::new(),
            updates_applied: 0,
        }
    }

    /// Accept updates expressed in another fixed frame
    pub fn with_frame(mut self, frame_id: &str) -> Self {
        self.frame_id = frame_id.to_string();
        self
    }

    pub fn model(&self) -> &RobotModel {
        &self.model
    }

    pub fn frame_id(&self) -> &str {
        &self.frame_id
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn voxel_count(&self) -> usize {
        self.voxels.len()
    }

    pub fn updates_applied(&self) -> u64 {
        self.updates_applied
    }

    fn place_links(&self, state: &RobotState) -> NavGuardResult<Vec<PlacedLink<'_>>> {
        let base = &state.base_pose;
        if !base.is_finite() {
            return Err(NavGuardError::query_failure(format!(
                "Non-finite virtual link pose {:?}",
                base
            )));
        }
        if !base.is_normalized() {
            return Err(NavGuardError::query_failure(format!(
                "Virtual link rotation {:?} is not a unit quaternion",
                base.rotation
            )));
        }
        let base_iso = base.to_isometry();

        self.model
            .links
            .iter()
            .map(|link| {
                let position = match &link.joint {
                    Some(joint) => {
                        let value = state.joint_position(&joint.name);
                        if !value.is_finite() {
                            return Err(NavGuardError::query_failure(format!(
                                "Joint '{}' has non-finite position {}",
                                joint.name, value
                            )));
                        }
                        value
                    }
                    None => 0.0,
                };
                Ok(PlacedLink {
                    name: link.name.as_str(),
                    pose: base_iso * link.local_pose(position).to_isometry(),
                    half: Vector3::from(link.half_extents()),
                })
            })
            .collect()
    }
}

/// Signed distance from a point to a box centered at the origin,
/// negative inside
fn signed_distance_to_box(p: &Point3<f64>, half: &Vector3<f64>) -> f64 {
    let q = p.coords.abs() - half;
    let outside = q.map(|v| v.max(0.0)).norm();
    let inside = q.max().min(0.0);
    outside + inside
}

/// Separating axis test for two oriented boxes
fn boxes_intersect(a: &PlacedLink<'_>, b: &PlacedLink<'_>) -> bool {
    let rot_a: Matrix3<f64> = *a.pose.rotation.to_rotation_matrix().matrix();
    let rot_b: Matrix3<f64> = *b.pose.rotation.to_rotation_matrix().matrix();

    // B expressed in A's frame
    let r = rot_a.transpose() * rot_b;
    let t = rot_a.transpose() * (b.pose.translation.vector - a.pose.translation.vector);
    let abs_r = r.map(|v| v.abs() + 1e-9);
    let (ea, eb) = (&a.half, &b.half);

    for i in 0..3 {
        let rb = eb[0] * abs_r[(i, 0)] + eb[1] * abs_r[(i, 1)] + eb[2] * abs_r[(i, 2)];
        if t[i].abs() > ea[i] + rb {
            return false;
        }
    }

    for j in 0..3 {
        let ra = ea[0] * abs_r[(0, j)] + ea[1] * abs_r[(1, j)] + ea[2] * abs_r[(2, j)];
        let proj = t[0] * r[(0, j)] + t[1] * r[(1, j)] + t[2] * r[(2, j)];
        if proj.abs() > ra + eb[j] {
            return false;
        }
    }

    // Cross products of edge directions
    for i in 0..3 {
        let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
        for j in 0..3 {
            let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
            let ra = ea[i1] * abs_r[(i2, j)] + ea[i2] * abs_r[(i1, j)];
            let rb = eb[j1] * abs_r[(i, j2)] + eb[j2] * abs_r[(i, j1)];
            let proj = t[i2] * r[(i1, j)] - t[i1] * r[(i2, j)];
            if proj.abs() > ra + rb {
                return false;
            }
        }
    }

    true
}

impl CollisionWorld for VoxelCollisionWorld {
    fn apply_update(&mut self, update: &OccupancyVoxels) -> NavGuardResult<()> {
        if update.frame_id != self.frame_id {
            return Err(NavGuardError::InvalidInput(format!(
                "Occupancy update in frame '{}', world expects '{}'",
                update.frame_id, self.frame_id
            )));
        }
        if !update.resolution.is_finite() || update.resolution <= 0.0 {
            return Err(NavGuardError::InvalidInput(format!(
                "Occupancy resolution must be positive, got {}",
                update.resolution
            )));
        }
        if let Some(bad) = update
            .points
            .iter()
            .find(|p| !p.iter().all(|v| v.is_finite()))
        {
            return Err(NavGuardError::InvalidInput(format!(
                "Occupancy update contains non-finite voxel {:?}",
                bad
            )));
        }

        self.resolution = update.resolution;
        self.voxels = update.points.clone();
        self.updates_applied += 1;
        Ok(())
    }

    fn check_collision(
        &self,
        request: &CollisionRequest,
        state: &RobotState,
        acm: &AllowedCollisionMatrix,
    ) -> NavGuardResult<CollisionResult> {
        let links = self.place_links(state)?;
        let voxel_radius = self.resolution * 3f64.sqrt() / 2.0;
        let mut result = CollisionResult::default();

        let record = |result: &mut CollisionResult, contact: Contact| {
            result.collision = true;
            if request.contacts && result.contacts.len() < request.max_contacts {
                result.contacts.push(contact);
            }
        };
        let saturated = |result: &CollisionResult| {
            result.collision
                && !request.distance
                && (!request.contacts || result.contacts.len() >= request.max_contacts)
        };

        'links: for link in &links {
            if acm.is_allowed(link.name, OCTOMAP_BODY) {
                continue;
            }
            for voxel in &self.voxels {
                let local = link
                    .pose
                    .inverse_transform_point(&Point3::new(voxel[0], voxel[1], voxel[2]));
                let clearance = signed_distance_to_box(&local, &link.half) - voxel_radius;

                if request.distance {
                    result.distance = Some(result.distance.map_or(clearance, |d| d.min(clearance)));
                }
                if clearance <= 0.0 {
                    record(
                        &mut result,
                        Contact {
                            body_a: link.name.to_string(),
                            body_b: OCTOMAP_BODY.to_string(),
                            position: *voxel,
                            depth: -clearance,
                        },
                    );
                    if saturated(&result) {
                        break 'links;
                    }
                }
            }
        }

        for (i, a) in links.iter().enumerate() {
            for b in &links[i + 1..] {
                if acm.is_allowed(a.name, b.name) || !boxes_intersect(a, b) {
                    continue;
                }
                let mid = (a.pose.translation.vector + b.pose.translation.vector) / 2.0;
                record(
                    &mut result,
                    Contact {
                        body_a: a.name.to_string(),
                        body_b: b.name.to_string(),
                        position: [mid.x, mid.y, mid.z],
                        depth: 0.0,
                    },
                );
            }
        }

        Ok(result)
    }

    fn link_names(&self) -> Vec<String> {
        self.model.link_names()
    }

    fn virtual_joint_name(&self) -> &str {
        &self.model.virtual_joint
    }
}
