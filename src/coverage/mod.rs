//! # Coverage module
//!
//! Module dedicated to the coverage validator. Coverage measures how
//! much of the mailbox the downstream classifier can validly route
//! email into: a folder is classifiable when its name belongs to the
//! expected category set of the tenant.
//!
//! The validator is advisory: it drives a UI warning and never
//! mutates state.

use std::collections::HashSet;

use serde::Serialize;

use crate::{
    schema::{FolderSpec, FolderTree},
    store::FolderRecord,
};

/// The coverage percentage under which a mailbox is considered
/// unhealthy.
pub const HEALTHY_COVERAGE_THRESHOLD: f64 = 90.0;

/// The set of names the classifier is allowed to emit.
///
/// Derived from a resolved folder tree, never persisted: top-level
/// categories, declared subfolders and current team/supplier names
/// are all spec names of the tree. Matching is case-insensitive.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExpectedCategories(HashSet<String>);

impl ExpectedCategories {
    /// Collect every spec name of the given tree.
    pub fn from_tree(tree: &FolderTree) -> Self {
        fn collect(spec: &FolderSpec, names: &mut HashSet<String>) {
            names.insert(spec.name.to_lowercase());
            for child in &spec.children {
                collect(child, names);
            }
        }

        let mut names = HashSet::new();
        for spec in tree.iter() {
            collect(spec, &mut names);
        }

        Self(names)
    }

    /// Return `true` when the given name is a valid classification
    /// target.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The coverage report.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CoverageReport {
    /// The number of non-deleted folders examined.
    pub total_folders: usize,

    /// The number of folders the classifier can route into.
    pub classifiable_folders: usize,

    /// The paths of the folders outside the expected category set.
    pub unclassifiable_folders: Vec<String>,

    /// The classifiable share, in percent.
    pub coverage_percentage: f64,

    /// Whether the coverage reaches
    /// [`HEALTHY_COVERAGE_THRESHOLD`].
    pub is_healthy: bool,
}

/// Measure the classifier coverage of the given records against the
/// given expected category set.
///
/// Soft-deleted records are skipped. A folder matches on the leaf
/// segment of its recorded path, case-insensitively. An empty mailbox
/// reports full coverage: refusing to treat "nothing provisioned" as
/// valid is the routing table builder's job, not an advisory metric's.
pub fn validate(records: &[FolderRecord], expected: &ExpectedCategories) -> CoverageReport {
    let mut classifiable = 0;
    let mut unclassifiable = Vec::new();

    let active = records.iter().filter(|record| !record.is_deleted);
    let mut total = 0;

    for record in active {
        total += 1;
        if expected.contains(record.leaf_name()) {
            classifiable += 1;
        } else {
            unclassifiable.push(record.label_name.clone());
        }
    }

    unclassifiable.sort();

    let coverage_percentage = if total == 0 {
        100.0
    } else {
        classifiable as f64 * 100.0 / total as f64
    };

    CoverageReport {
        total_folders: total,
        classifiable_folders: classifiable,
        unclassifiable_folders: unclassifiable,
        coverage_percentage,
        is_healthy: coverage_percentage >= HEALTHY_COVERAGE_THRESHOLD,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        profile::TeamMember,
        provider::Provider,
        schema::{self},
    };

    fn types() -> Vec<String> {
        vec!["hot-tub-spa".to_owned()]
    }

    fn record(label_id: &str, label_name: &str) -> FolderRecord {
        FolderRecord::new(Provider::Gmail, "profile-1", label_id, label_name, Utc::now())
    }

    #[test]
    fn expected_categories_cover_the_whole_tree() {
        let team = [TeamMember::new("Hailey")];
        let tree = schema::resolve(&types(), &team, &[]).unwrap();
        let expected = ExpectedCategories::from_tree(&tree);

        assert!(expected.contains("SALES"));
        assert!(expected.contains("quotes"));
        assert!(expected.contains("Unassigned"));
        assert!(expected.contains("hailey"));
        assert!(!expected.contains("MISC"));
    }

    #[test]
    fn empty_mailbox_reports_full_coverage() {
        let tree = schema::resolve(&types(), &[], &[]).unwrap();
        let report = validate(&[], &ExpectedCategories::from_tree(&tree));

        assert_eq!(report.total_folders, 0);
        assert_eq!(report.coverage_percentage, 100.0);
        assert!(report.is_healthy);
    }

    #[test]
    fn unexpected_folders_are_surfaced() {
        let tree = schema::resolve(&types(), &[], &[]).unwrap();
        let expected = ExpectedCategories::from_tree(&tree);

        let mut deleted = record("Label_4", "OLD STUFF");
        deleted.is_deleted = true;

        let records = [
            record("Label_1", "SALES"),
            record("Label_2", "SALES/Quotes"),
            record("Label_3", "MISC"),
            deleted,
        ];

        let report = validate(&records, &expected);

        assert_eq!(report.total_folders, 3);
        assert_eq!(report.classifiable_folders, 2);
        assert_eq!(report.unclassifiable_folders, ["MISC"]);
        assert!((report.coverage_percentage - 200.0 / 3.0).abs() < f64::EPSILON);
        assert!(!report.is_healthy);
    }

    #[test]
    fn adding_a_team_member_never_decreases_coverage() {
        let records = [
            record("Label_1", "SALES"),
            record("Label_2", "MANAGER/Hailey"),
            record("Label_3", "MISC"),
        ];

        let without = ExpectedCategories::from_tree(&schema::resolve(&types(), &[], &[]).unwrap());
        let with = ExpectedCategories::from_tree(
            &schema::resolve(&types(), &[TeamMember::new("Hailey")], &[]).unwrap(),
        );

        let before = validate(&records, &without);
        let after = validate(&records, &with);

        assert!(after.coverage_percentage >= before.coverage_percentage);
        assert_eq!(after.classifiable_folders, before.classifiable_folders + 1);
    }
}
