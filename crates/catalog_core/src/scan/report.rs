//! Change report returned by a scan.

use serde::Serialize;

/// Outcome of one change query.
///
/// `changed` always equals `!categories.is_empty()`; categories are unique and
/// listed in the order the scan first met them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeReport {
    changed: bool,
    categories: Vec<String>,
}

impl ChangeReport {
    /// Report with no changed category.
    pub fn unchanged() -> Self {
        Self {
            changed: false,
            categories: Vec::new(),
        }
    }

    /// Builds a report from category names, dropping repeats.
    pub fn from_categories<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut categories: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if !categories.contains(&name) {
                categories.push(name);
            }
        }
        Self {
            changed: !categories.is_empty(),
            categories,
        }
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn contains(&self, category: &str) -> bool {
        self.categories.iter().any(|name| name == category)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
