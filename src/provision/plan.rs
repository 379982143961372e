//! # Provisioning plan
//!
//! Module dedicated to the provisioning plan, the pure diff between a
//! resolved folder tree and the known local records. The plan is
//! exported on its own so that it can be unit tested without any
//! provider adapter.

use std::collections::HashMap;

use crate::{
    schema::{FolderSpec, FolderTree, SpecKind, PATH_SEPARATOR},
    store::FolderRecord,
};

/// The action planned for one folder spec.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlannedAction {
    /// No non-deleted record covers the path: the folder must be
    /// created (or resolved, if it turns out to pre-exist remotely).
    Create,

    /// A non-deleted record already covers the path, under the given
    /// identifier. No remote call is needed.
    Confirm(String),
}

/// One folder spec with its planned action, flattened.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlannedNode {
    /// The full logical path of the folder.
    pub path: String,

    /// The path of the parent folder, `None` for top-level
    /// categories.
    pub parent_path: Option<String>,

    /// The folder name alone.
    pub name: String,

    /// The spec kind.
    pub kind: SpecKind,

    /// The planned action.
    pub action: PlannedAction,
}

/// Build the provisioning plan of the given tree against the given
/// known records.
///
/// Returns one list per top-level branch, nodes ordered parents
/// first. Branches carry no data dependency between them and can be
/// processed concurrently; nodes within a branch cannot. Soft-deleted
/// records do not count as known: their folder is gone remotely and
/// must be recreated.
pub fn build_plan(tree: &FolderTree, known: &[FolderRecord]) -> Vec<Vec<PlannedNode>> {
    let known: HashMap<String, &str> = known
        .iter()
        .filter(|record| !record.is_deleted)
        .map(|record| (record.label_name.to_lowercase(), record.label_id.as_str()))
        .collect();

    tree.iter()
        .map(|spec| {
            let mut branch = Vec::new();
            walk(spec, None, &known, &mut branch);
            branch
        })
        .collect()
}

fn walk(
    spec: &FolderSpec,
    parent_path: Option<&str>,
    known: &HashMap<String, &str>,
    branch: &mut Vec<PlannedNode>,
) {
    let path = match parent_path {
        Some(parent) => format!("{parent}{PATH_SEPARATOR}{}", spec.name),
        None => spec.name.clone(),
    };

    let action = match known.get(&path.to_lowercase()) {
        Some(label_id) => PlannedAction::Confirm(label_id.to_string()),
        None => PlannedAction::Create,
    };

    branch.push(PlannedNode {
        path: path.clone(),
        parent_path: parent_path.map(ToOwned::to_owned),
        name: spec.name.clone(),
        kind: spec.kind,
        action,
    });

    for child in &spec.children {
        walk(child, Some(&path), known, branch);
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        profile::TeamMember,
        provider::Provider,
        schema::{self, MANAGER, UNASSIGNED},
    };

    fn types() -> Vec<String> {
        vec!["hot-tub-spa".to_owned()]
    }

    fn record(label_id: &str, label_name: &str) -> FolderRecord {
        FolderRecord::new(Provider::Gmail, "profile-1", label_id, label_name, Utc::now())
    }

    #[test]
    fn empty_records_plan_everything_as_create() {
        let tree = schema::resolve(&types(), &[], &[]).unwrap();
        let branches = build_plan(&tree, &[]);

        assert_eq!(branches.len(), tree.len());

        let nodes: Vec<&PlannedNode> = branches.iter().flatten().collect();
        assert_eq!(nodes.len(), tree.node_count());
        assert!(nodes.iter().all(|node| node.action == PlannedAction::Create));
    }

    #[test]
    fn branches_order_parents_first() {
        let tree = schema::resolve(&types(), &[], &[]).unwrap();
        let branches = build_plan(&tree, &[]);

        for branch in &branches {
            assert_eq!(branch[0].parent_path, None);

            for node in &branch[1..] {
                let parent = node.parent_path.as_deref().unwrap();
                let parent_pos = branch.iter().position(|n| n.path == parent).unwrap();
                let node_pos = branch.iter().position(|n| n.path == node.path).unwrap();
                assert!(parent_pos < node_pos);
            }
        }
    }

    #[test]
    fn known_records_are_confirmed_case_insensitively() {
        let tree = schema::resolve(&types(), &[], &[]).unwrap();
        let known = [record("Label_1", "sales"), record("Label_2", "SALES/quotes")];
        let branches = build_plan(&tree, &known);

        let nodes: Vec<&PlannedNode> = branches.iter().flatten().collect();

        let sales = nodes.iter().find(|n| n.path == "SALES").unwrap();
        assert_eq!(sales.action, PlannedAction::Confirm("Label_1".into()));

        let quotes = nodes.iter().find(|n| n.path == "SALES/Quotes").unwrap();
        assert_eq!(quotes.action, PlannedAction::Confirm("Label_2".into()));

        let orders = nodes.iter().find(|n| n.path == "SALES/Orders").unwrap();
        assert_eq!(orders.action, PlannedAction::Create);
    }

    #[test]
    fn soft_deleted_records_are_planned_again() {
        let tree = schema::resolve(&types(), &[], &[]).unwrap();

        let mut gone = record("Label_1", "SALES");
        gone.is_deleted = true;

        let branches = build_plan(&tree, &[gone]);
        let nodes: Vec<&PlannedNode> = branches.iter().flatten().collect();

        let sales = nodes.iter().find(|n| n.path == "SALES").unwrap();
        assert_eq!(sales.action, PlannedAction::Create);
    }

    #[test]
    fn team_injection_only_creates_the_new_dynamic_nodes() {
        // phase A result: the skeleton is fully recorded
        let skeleton = schema::resolve(&types(), &[], &[]).unwrap();
        let known: Vec<FolderRecord> = skeleton
            .paths()
            .iter()
            .enumerate()
            .map(|(n, path)| record(&format!("Label_{n}"), path))
            .collect();

        // phase B: same tree resolved with the current team
        let team = [TeamMember::new("Hailey"), TeamMember::new("Jillian")];
        let tree = schema::resolve(&types(), &team, &[]).unwrap();

        let branches = build_plan(&tree, &known);
        let creates: Vec<&PlannedNode> = branches
            .iter()
            .flatten()
            .filter(|node| node.action == PlannedAction::Create)
            .collect();

        let paths: Vec<&str> = creates.iter().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, [format!("{MANAGER}/Hailey"), format!("{MANAGER}/Jillian")]);
        assert!(creates.iter().all(|node| node.kind == SpecKind::DynamicTeam));

        let unassigned = branches
            .iter()
            .flatten()
            .find(|n| n.path == format!("{MANAGER}/{UNASSIGNED}"))
            .unwrap();
        assert!(matches!(unassigned.action, PlannedAction::Confirm(_)));
    }
}
