use crate::tf::timestamp_now;
use navguard_core::core::LogSummary;
use serde::{Deserialize, Serialize};

/// Joint positions reported by the robot's state publisher
///
/// `names[i]` pairs with `positions[i]`. Extra entries in the longer of the
/// two vectors are ignored by consumers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JointState {
    pub names: Vec<String>,
    pub positions: Vec<f64>,
    pub timestamp: u64,
}

impl JointState {
    pub fn new(names: Vec<String>, positions: Vec<f64>) -> Self {
        Self {
            names,
            positions,
            timestamp: timestamp_now(),
        }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let (names, positions): (Vec<String>, Vec<f64>) = pairs
            .into_iter()
            .map(|(name, position)| (name.to_string(), position))
            .unzip();
        Self::new(names, positions)
    }

    /// Matched name/position pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.positions.iter().copied())
    }

    pub fn is_consistent(&self) -> bool {
        self.names.len() == self.positions.len()
    }
}

impl LogSummary for JointState {
    fn log_summary(&self) -> String {
        format!("JointState({} joints)", self.names.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs() {
        let js = JointState::from_pairs([("arm_joint", 0.5), ("head_pan", -0.2)]);
        assert!(js.is_consistent());
        let pairs: Vec<_> = js.iter().collect();
        assert_eq!(pairs, vec![("arm_joint", 0.5), ("head_pan", -0.2)]);
    }

    #[test]
    fn test_mismatched_lengths_truncate() {
        let js = JointState::new(vec!["a".into(), "b".into()], vec![1.0]);
        assert!(!js.is_consistent());
        assert_eq!(js.iter().count(), 1);
    }
}
