//! Column role declarations and partitioning

use crate::error::{Result, TabstoreError};
use serde::{Deserialize, Serialize};

/// Ordered sub-sequence of `source` containing exactly the names present in
/// `role` and absent from `excluded`, in `source` order.
pub fn filtered_columns(
    source: &[String],
    role: &[String],
    excluded: &[String],
) -> Vec<String> {
    source
        .iter()
        .filter(|c| role.contains(c) && !excluded.contains(c))
        .cloned()
        .collect()
}

/// Column-kind and role declaration for one dataset.
///
/// `categorical` and `continuous` must be disjoint. `x` and `t` may overlap:
/// a column can serve as both a feature and a stratification variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnRoles {
    /// Discrete-label columns, encoded to integer codes before modeling
    pub categorical: Vec<String>,
    /// Real-valued columns, standardized before modeling
    pub continuous: Vec<String>,
    /// Feature-role columns
    pub x: Vec<String>,
    /// Stratification/treatment-role columns
    pub t: Vec<String>,
    /// Optional outcome column
    pub y: Option<String>,
    /// Columns excluded from every role view regardless of membership
    pub removed: Vec<String>,
}

impl ColumnRoles {
    /// Validate the shape invariants: no duplicates within, and no overlap
    /// between, the categorical and continuous lists.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for col in self.categorical.iter().chain(self.continuous.iter()) {
            if !seen.insert(col.as_str()) {
                return Err(TabstoreError::ValidationError(format!(
                    "column '{col}' appears more than once across the categorical and continuous lists"
                )));
            }
        }
        Ok(())
    }

    /// All declared columns: categorical first, then continuous.
    pub fn all_columns(&self) -> Vec<String> {
        self.categorical
            .iter()
            .chain(self.continuous.iter())
            .cloned()
            .collect()
    }

    pub fn x_all(&self) -> Vec<String> {
        filtered_columns(&self.all_columns(), &self.x, &self.removed)
    }

    pub fn t_all(&self) -> Vec<String> {
        filtered_columns(&self.all_columns(), &self.t, &self.removed)
    }

    pub fn x_categorical(&self) -> Vec<String> {
        filtered_columns(&self.categorical, &self.x, &self.removed)
    }

    pub fn x_continuous(&self) -> Vec<String> {
        filtered_columns(&self.continuous, &self.x, &self.removed)
    }

    pub fn t_categorical(&self) -> Vec<String> {
        filtered_columns(&self.categorical, &self.t, &self.removed)
    }

    pub fn t_continuous(&self) -> Vec<String> {
        filtered_columns(&self.continuous, &self.t, &self.removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filtered_preserves_source_order() {
        let source = strings(&["a", "b", "c", "d"]);
        let role = strings(&["d", "b", "a"]);
        let out = filtered_columns(&source, &role, &[]);
        assert_eq!(out, strings(&["a", "b", "d"]));
    }

    #[test]
    fn test_filtered_excludes_removed() {
        let source = strings(&["a", "b", "c"]);
        let role = strings(&["a", "b", "c"]);
        let excluded = strings(&["b"]);
        let out = filtered_columns(&source, &role, &excluded);
        assert_eq!(out, strings(&["a", "c"]));
    }

    #[test]
    fn test_filtered_membership_property() {
        let source = strings(&["a", "b", "c", "d", "e"]);
        let role = strings(&["b", "d", "z"]);
        let excluded = strings(&["d"]);
        let out = filtered_columns(&source, &role, &excluded);
        for col in &out {
            assert!(source.contains(col));
            assert!(role.contains(col));
            assert!(!excluded.contains(col));
        }
        assert_eq!(out, strings(&["b"]));
    }

    #[test]
    fn test_validate_rejects_kind_overlap() {
        let roles = ColumnRoles {
            categorical: strings(&["a", "b"]),
            continuous: strings(&["b", "c"]),
            x: vec![],
            t: vec![],
            y: None,
            removed: vec![],
        };
        assert!(matches!(
            roles.validate(),
            Err(TabstoreError::ValidationError(_))
        ));
    }

    #[test]
    fn test_x_t_overlap_is_allowed() {
        let roles = ColumnRoles {
            categorical: strings(&["race"]),
            continuous: strings(&["age"]),
            x: strings(&["race", "age"]),
            t: strings(&["race"]),
            y: None,
            removed: vec![],
        };
        roles.validate().unwrap();
        assert_eq!(roles.x_categorical(), strings(&["race"]));
        assert_eq!(roles.t_categorical(), strings(&["race"]));
    }

    #[test]
    fn test_all_columns_categorical_first() {
        let roles = ColumnRoles {
            categorical: strings(&["city"]),
            continuous: strings(&["age", "income"]),
            x: vec![],
            t: vec![],
            y: None,
            removed: vec![],
        };
        assert_eq!(roles.all_columns(), strings(&["city", "age", "income"]));
    }
}
