use crate::tf::Transform;
use nalgebra::{Unit, UnitQuaternion, Vector3};
use navguard_core::error::{NavGuardError, NavGuardResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Name of the floating joint between the world and the robot root link
pub const DEFAULT_VIRTUAL_JOINT: &str = "world_virtual_joint";

fn default_virtual_joint() -> String {
    DEFAULT_VIRTUAL_JOINT.to_string()
}

/// Revolute joint between the robot base and a link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointModel {
    pub name: String,
    /// Rotation axis in the joint frame
    pub axis: [f64; 3],
}

/// Rigid link approximated by an oriented box
///
/// The link frame sits at `origin` relative to the robot base, rotated by
/// the joint angle about `joint.axis` when a joint is present. The box is
/// centered on the link frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkModel {
    pub name: String,
    #[serde(default)]
    pub joint: Option<JointModel>,
    #[serde(default)]
    pub origin_xyz: [f64; 3],
    #[serde(default)]
    pub origin_rpy: [f64; 3],
    /// Full box extents (m)
    pub size: [f64; 3],
}

impl LinkModel {
    /// Link pose relative to the robot base for the given joint value
    pub fn local_pose(&self, joint_position: f64) -> Transform {
        let origin = Transform::from_xyz_rpy(self.origin_xyz, self.origin_rpy);
        match &self.joint {
            Some(joint) => {
                let axis = Unit::new_normalize(Vector3::from(joint.axis));
                let rotation = UnitQuaternion::from_axis_angle(&axis, joint_position);
                let q = rotation.quaternion();
                origin * Transform::new([0.0; 3], [q.i, q.j, q.k, q.w])
            }
            None => origin,
        }
    }

    pub fn half_extents(&self) -> [f64; 3] {
        [self.size[0] / 2.0, self.size[1] / 2.0, self.size[2] / 2.0]
    }
}

/// Kinematic and geometric description of the robot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotModel {
    pub name: String,
    #[serde(default = "default_virtual_joint")]
    pub virtual_joint: String,
    pub links: Vec<LinkModel>,
}

impl RobotModel {
    /// One box link rigidly attached to the base, resting on the ground
    pub fn single_box(link_name: &str, size: [f64; 3]) -> Self {
        Self {
            name: "robot".to_string(),
            virtual_joint: default_virtual_joint(),
            links: vec![LinkModel {
                name: link_name.to_string(),
                joint: None,
                origin_xyz: [0.0, 0.0, size[2] / 2.0],
                origin_rpy: [0.0; 3],
                size,
            }],
        }
    }

    /// Load and validate a model (auto-detect format from extension)
    pub fn from_file<P: AsRef<Path>>(path: P) -> NavGuardResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            NavGuardError::model_load(format!(
                "Failed to read robot model '{}': {}",
                path.display(),
                e
            ))
        })?;

        let model = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml(&contents),
            Some("yaml") | Some("yml") => Self::from_yaml(&contents),
            _ => Self::from_toml(&contents).or_else(|_| Self::from_yaml(&contents)),
        }?;
        tracing::info!(
            "Loaded robot model '{}' with {} link(s) from {}",
            model.name,
            model.links.len(),
            path.display()
        );
        Ok(model)
    }

    pub fn from_toml(contents: &str) -> NavGuardResult<Self> {
        let model: Self = toml::from_str(contents)
            .map_err(|e| NavGuardError::model_load(format!("Failed to parse TOML: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    pub fn from_yaml(contents: &str) -> NavGuardResult<Self> {
        let model: Self = serde_yaml::from_str(contents)
            .map_err(|e| NavGuardError::model_load(format!("Failed to parse YAML: {}", e)))?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> NavGuardResult<()> {
        if self.links.is_empty() {
            return Err(NavGuardError::model_load(format!(
                "Robot model '{}' has no links",
                self.name
            )));
        }
        if self.virtual_joint.is_empty() {
            return Err(NavGuardError::model_load("Virtual joint name must not be empty"));
        }

        let mut link_names = HashSet::new();
        let mut joint_names = HashSet::new();
        for link in &self.links {
            if !link_names.insert(link.name.as_str()) {
                return Err(NavGuardError::model_load(format!(
                    "Duplicate link name '{}'",
                    link.name
                )));
            }
            if !link.size.iter().all(|s| s.is_finite() && *s > 0.0) {
                return Err(NavGuardError::model_load(format!(
                    "Link '{}' needs positive finite box extents, got {:?}",
                    link.name, link.size
                )));
            }
            let origin_finite = link
                .origin_xyz
                .iter()
                .chain(link.origin_rpy.iter())
                .all(|v| v.is_finite());
            if !origin_finite {
                return Err(NavGuardError::model_load(format!(
                    "Link '{}' has a non-finite origin",
                    link.name
                )));
            }

            if let Some(joint) = &link.joint {
                if joint.name == self.virtual_joint {
                    return Err(NavGuardError::model_load(format!(
                        "Joint of link '{}' reuses the virtual joint name '{}'",
                        link.name, joint.name
                    )));
                }
                if !joint_names.insert(joint.name.as_str()) {
                    return Err(NavGuardError::model_load(format!(
                        "Duplicate joint name '{}'",
                        joint.name
                    )));
                }
                let norm: f64 = joint.axis.iter().map(|v| v * v).sum::<f64>().sqrt();
                if !norm.is_finite() || norm < 1e-9 {
                    return Err(NavGuardError::model_load(format!(
                        "Joint '{}' has an invalid axis {:?}",
                        joint.name, joint.axis
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn link_names(&self) -> Vec<String> {
        self.links.iter().map(|link| link.name.clone()).collect()
    }

    pub fn joint_names(&self) -> Vec<String> {
        self.links
            .iter()
            .filter_map(|link| link.joint.as_ref().map(|joint| joint.name.clone()))
            .collect()
    }

    /// Whether a joint-state name addresses the virtual joint, either by
    /// its own name or as one of its `<virtual_joint>/<variable>` components
    pub fn is_virtual_joint_variable(&self, name: &str) -> bool {
        name == self.virtual_joint
            || name
                .strip_prefix(self.virtual_joint.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;
    use std::io::Write;

    const MODEL_TOML: &str = r#"
name = "tracked_robot"

[[links]]
name = "base_link"
origin_xyz = [0.0, 0.0, 0.15]
size = [0.8, 0.5, 0.3]

[[links]]
name = "arm_link"
origin_xyz = [0.2, 0.0, 0.4]
size = [0.6, 0.1, 0.1]
joint = { name = "arm_joint", axis = [0.0, 0.0, 1.0] }
"#;

    #[test]
    fn test_parse_toml() {
        let model = RobotModel::from_toml(MODEL_TOML).unwrap();
        assert_eq!(model.name, "tracked_robot");
        assert_eq!(model.virtual_joint, DEFAULT_VIRTUAL_JOINT);
        assert_eq!(model.link_names(), vec!["base_link", "arm_link"]);
        assert_eq!(model.joint_names(), vec!["arm_joint"]);
    }

    #[test]
    fn test_parse_yaml_file() {
        let yaml = r#"
name: yaml_robot
virtual_joint: odom_joint
links:
  - name: chassis
    size: [1.0, 1.0, 0.5]
"#;
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let model = RobotModel::from_file(file.path()).unwrap();
        assert_eq!(model.virtual_joint, "odom_joint");
        assert_eq!(model.links[0].origin_xyz, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_file_is_model_load_error() {
        let err = RobotModel::from_file("/nonexistent/robot.toml").unwrap_err();
        assert!(matches!(err, NavGuardError::ModelLoad(_)));
    }

    #[test]
    fn test_validation_failures() {
        let mut model = RobotModel::from_toml(MODEL_TOML).unwrap();

        let mut no_links = model.clone();
        no_links.links.clear();
        assert!(matches!(no_links.validate(), Err(NavGuardError::ModelLoad(_))));

        let mut bad_size = model.clone();
        bad_size.links[0].size[1] = 0.0;
        assert!(bad_size.validate().is_err());

        let mut duplicate = model.clone();
        duplicate.links[1].name = "base_link".to_string();
        assert!(duplicate.validate().is_err());

        let mut bad_axis = model.clone();
        bad_axis.links[1].joint.as_mut().unwrap().axis = [0.0; 3];
        assert!(bad_axis.validate().is_err());

        model.links[1].joint.as_mut().unwrap().name = DEFAULT_VIRTUAL_JOINT.to_string();
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_joint_rotates_link() {
        let model = RobotModel::from_toml(MODEL_TOML).unwrap();
        let arm = &model.links[1];
        let pose = arm.local_pose(FRAC_PI_2);
        let tip = pose.transform_point([0.3, 0.0, 0.0]);
        assert_relative_eq!(tip[0], 0.2, epsilon = 1e-12);
        assert_relative_eq!(tip[1], 0.3, epsilon = 1e-12);
        assert_relative_eq!(tip[2], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_virtual_joint_variables() {
        let model = RobotModel::single_box("base_link", [1.0, 1.0, 1.0]);
        assert!(model.is_virtual_joint_variable("world_virtual_joint"));
        assert!(model.is_virtual_joint_variable("world_virtual_joint/trans_x"));
        assert!(!model.is_virtual_joint_variable("world_virtual_joint_extra"));
        assert!(!model.is_virtual_joint_variable("arm_joint"));
    }
}
