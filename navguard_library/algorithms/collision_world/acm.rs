use std::collections::BTreeSet;

/// Pairs of entities whose contacts are ignored during collision checks
///
/// Entries are symmetric. Set up once before the first query and never
/// changed afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedCollisionMatrix {
    allowed: BTreeSet<(String, String)>,
}

fn ordered(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl AllowedCollisionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matrix allowing every pair of the given robot links, so only
    /// robot-versus-environment contacts are reported
    pub fn environment_only(links: &[String]) -> Self {
        let mut acm = Self::new();
        acm.set_entries(links, links, true);
        acm
    }

    pub fn set_entry(&mut self, a: &str, b: &str, allowed: bool) {
        let key = ordered(a, b);
        if allowed {
            self.allowed.insert(key);
        } else {
            self.allowed.remove(&key);
        }
    }

    /// Set every pair of the cartesian product `first x second`
    pub fn set_entries(&mut self, first: &[String], second: &[String], allowed: bool) {
        for a in first {
            for b in second {
                self.set_entry(a, b, allowed);
            }
        }
    }

    pub fn is_allowed(&self, a: &str, b: &str) -> bool {
        self.allowed.contains(&ordered(a, b))
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}
