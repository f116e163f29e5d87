//! Collect the columns whose description was inherited from upstream

use std::collections::BTreeMap;
use crate::model::CatalogColumn;

/// Column name → inherited description, for one model
///
/// A marked column with a `null` or empty description is still recorded (so
/// the map reflects every marked column) but carries no text to propagate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InheritedColumns {
    descriptions: BTreeMap<String, Option<String>>,
}

impl InheritedColumns {
    /// Scan a model's columns and keep the ones with an origin marker
    pub fn from_columns(columns: &[CatalogColumn]) -> Self {
        let descriptions = columns
            .iter()
            .filter(|c| c.is_inherited())
            .map(|c| (c.name.clone(), c.description.clone()))
            .collect();

        Self { descriptions }
    }

    /// `(has_inherited_columns, mapping)`
    pub fn collect(columns: &[CatalogColumn]) -> (bool, Self) {
        let inherited = Self::from_columns(columns);
        (!inherited.is_empty(), inherited)
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptions.contains_key(name)
    }

    /// Description to write for `name`, if the column was inherited and has
    /// non-empty text
    pub fn description_for(&self, name: &str) -> Option<&str> {
        self.descriptions
            .get(name)
            .and_then(|d| d.as_deref())
            .filter(|d| !d.is_empty())
    }

    /// Names of all inherited columns
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptions.keys().map(String::as_str)
    }
}
