use serde::{Deserialize, Serialize};

use super::college::College;

/// Minimum number of saved colleges a comparison needs
pub const MIN_COMPARE: usize = 2;

/// Colleges the user saved, in the order they were saved.
///
/// Names are unique: saving a college whose name is already present is
/// impossible through [`SavedSelection::toggle`], which removes it instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedSelection {
    colleges: Vec<College>,
}

impl SavedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff a college with this name is saved.
    pub fn contains(&self, name: &str) -> bool {
        self.colleges.iter().any(|c| c.name == name)
    }

    pub fn is_saved(&self, college: &College) -> bool {
        self.contains(&college.name)
    }

    /// Remove the entry matching `college` by name, or append it.
    ///
    /// Returns whether the college is saved afterwards.
    pub fn toggle(&mut self, college: College) -> bool {
        if self.is_saved(&college) {
            self.colleges.retain(|c| c.name != college.name);
            false
        } else {
            self.colleges.push(college);
            true
        }
    }

    pub fn can_compare(&self) -> bool {
        self.colleges.len() >= MIN_COMPARE
    }

    pub fn names(&self) -> Vec<String> {
        self.colleges.iter().map(|c| c.name.clone()).collect()
    }

    pub fn as_slice(&self) -> &[College] {
        &self.colleges
    }

    pub fn iter(&self) -> std::slice::Iter<'_, College> {
        self.colleges.iter()
    }

    pub fn len(&self) -> usize {
        self.colleges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colleges.is_empty()
    }
}

impl<'a> IntoIterator for &'a SavedSelection {
    type Item = &'a College;
    type IntoIter = std::slice::Iter<'a, College>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
