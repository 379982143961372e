//! # Folder schema module
//!
//! Module dedicated to the folder schema, the declarative side of the
//! taxonomy. The main entities are [`FolderSpec`], the in-memory
//! description of one folder to provision, and [`FolderTree`], the
//! ordered set of top-level specs.
//!
//! The [`resolve`] function merges the base taxonomy with business
//! type extensions (see [`extension`]) and the current team/supplier
//! data into a single canonical tree. It is a pure function: no I/O,
//! deterministic given identical inputs. The same resolution feeds
//! both the provisioning orchestrator and the coverage validator.

mod error;
pub mod extension;

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

#[doc(inline)]
pub use self::error::{Error, Result};
pub use self::extension::{BusinessTypeExtension, CategoryExtension};
use crate::profile::{Supplier, TeamMember};

/// The top-level category holding one subfolder per team member.
pub const MANAGER: &str = "MANAGER";
/// The top-level category holding one subfolder per supplier.
pub const SUPPLIERS: &str = "SUPPLIERS";
/// The team subfolder that always exists, even with no team member.
pub const UNASSIGNED: &str = "Unassigned";

/// The separator used in logical folder paths.
pub const PATH_SEPARATOR: char = '/';

/// The categories present for every business type, with their default
/// subfolders.
const BASE_TAXONOMY: &[(&str, &[&str])] = &[
    ("SALES", &["Quotes", "Orders"]),
    ("SUPPORT", &["Warranty", "Scheduling"]),
    ("BILLING", &["Invoices", "Receipts"]),
    ("FORMS", &["Website", "Financing"]),
    ("PROMOTIONS", &[]),
    (SUPPLIERS, &[]),
    (MANAGER, &[]),
];

/// The folder spec kind enumeration.
///
/// The kind tells where a spec comes from: the static schema or the
/// tenant's runtime data.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecKind {
    /// The spec comes from the base taxonomy or a business type
    /// extension.
    Core,

    /// The spec comes from a team member name.
    DynamicTeam,

    /// The spec comes from a supplier name.
    DynamicSupplier,
}

impl SpecKind {
    /// Return `true` if the spec comes from runtime data rather than
    /// the static schema.
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Self::Core)
    }
}

/// The folder spec structure.
///
/// A spec describes one folder the provisioning orchestrator must
/// ensure exists remotely. The parent owns its children; a node never
/// references its parent back.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FolderSpec {
    /// The folder name, unique among siblings (case-insensitive).
    pub name: String,

    /// The spec kind.
    pub kind: SpecKind,

    /// The nesting depth, `0` for top-level categories.
    pub depth: u8,

    /// The child specs.
    pub children: Vec<FolderSpec>,
}

impl FolderSpec {
    fn core(name: impl ToString, depth: u8) -> Self {
        Self {
            name: name.to_string(),
            kind: SpecKind::Core,
            depth,
            children: Vec::new(),
        }
    }

    fn dynamic(name: impl ToString, kind: SpecKind, depth: u8) -> Self {
        Self {
            name: name.to_string(),
            kind,
            depth,
            children: Vec::new(),
        }
    }
}

/// The ordered list of top-level folder specs.
///
/// This structure is just a convenient wrapper used to implement
/// tree-wide helpers.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct FolderTree(Vec<FolderSpec>);

impl Deref for FolderTree {
    type Target = Vec<FolderSpec>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for FolderTree {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl IntoIterator for FolderTree {
    type Item = FolderSpec;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<FolderSpec> for FolderTree {
    fn from_iter<T: IntoIterator<Item = FolderSpec>>(iter: T) -> Self {
        let mut tree = FolderTree::default();
        tree.extend(iter);
        tree
    }
}

impl FolderTree {
    /// Find a top-level spec by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<&FolderSpec> {
        self.0.iter().find(|spec| spec.name.eq_ignore_ascii_case(name))
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut FolderSpec> {
        self.0
            .iter_mut()
            .find(|spec| spec.name.eq_ignore_ascii_case(name))
    }

    /// Count all specs of the tree, children included.
    pub fn node_count(&self) -> usize {
        fn count(spec: &FolderSpec) -> usize {
            1 + spec.children.iter().map(count).sum::<usize>()
        }

        self.0.iter().map(count).sum()
    }

    /// Collect the full logical path of every spec, in provisioning
    /// order (parents before children).
    pub fn paths(&self) -> Vec<String> {
        fn walk(spec: &FolderSpec, prefix: Option<&str>, paths: &mut Vec<String>) {
            let path = match prefix {
                Some(prefix) => format!("{prefix}{PATH_SEPARATOR}{}", spec.name),
                None => spec.name.clone(),
            };

            paths.push(path.clone());

            for child in &spec.children {
                walk(child, Some(&path), paths);
            }
        }

        let mut paths = Vec::with_capacity(self.node_count());

        for spec in &self.0 {
            walk(spec, None, &mut paths);
        }

        paths
    }
}

/// Resolve the canonical folder tree for the given business types and
/// team/supplier data.
///
/// The base taxonomy comes first, then every business type extension
/// is applied in order (the last one wins on conflicts), then one
/// dynamic spec per team member is attached under [`MANAGER`] (next
/// to the always-present [`UNASSIGNED`]) and one per supplier under
/// [`SUPPLIERS`].
pub fn resolve(
    business_types: &[String],
    team: &[TeamMember],
    suppliers: &[Supplier],
) -> Result<FolderTree> {
    if business_types.is_empty() {
        return Err(Error::MissingBusinessTypeError);
    }

    let mut categories: Vec<(String, Vec<String>)> = BASE_TAXONOMY
        .iter()
        .map(|(name, subfolders)| {
            let subfolders = subfolders.iter().map(ToString::to_string).collect();
            (name.to_string(), subfolders)
        })
        .collect();

    for key in business_types {
        let ext =
            extension::find(key).ok_or_else(|| Error::UnknownBusinessTypeError(key.clone()))?;

        for cat in ext.categories {
            match categories
                .iter_mut()
                .find(|(name, _)| name.eq_ignore_ascii_case(cat.category))
            {
                Some((name, subfolders)) => {
                    if let Some(rename) = cat.rename_to {
                        *name = rename.to_string();
                    }

                    for sub in cat.subfolders {
                        match subfolders.iter_mut().find(|s| s.eq_ignore_ascii_case(sub)) {
                            // extension wins on name conflicts
                            Some(existing) => *existing = sub.to_string(),
                            None => subfolders.push(sub.to_string()),
                        }
                    }
                }
                None => {
                    let subfolders = cat.subfolders.iter().map(ToString::to_string).collect();
                    categories.push((cat.category.to_string(), subfolders));
                }
            }
        }
    }

    let mut tree: FolderTree = categories
        .into_iter()
        .map(|(name, subfolders)| {
            let mut spec = FolderSpec::core(name, 0);
            spec.children = subfolders
                .into_iter()
                .map(|sub| FolderSpec::core(sub, 1))
                .collect();
            spec
        })
        .collect();

    if let Some(manager) = tree.get_mut(MANAGER) {
        manager.children.insert(0, FolderSpec::core(UNASSIGNED, 1));
        manager.children.extend(
            team.iter()
                .map(|member| FolderSpec::dynamic(&member.name, SpecKind::DynamicTeam, 1)),
        );
    }

    if let Some(parent) = tree.get_mut(SUPPLIERS) {
        parent.children.extend(
            suppliers
                .iter()
                .map(|supplier| FolderSpec::dynamic(&supplier.name, SpecKind::DynamicSupplier, 1)),
        );
    }

    validate(&tree)?;

    Ok(tree)
}

/// Check the sibling-uniqueness invariant of the whole tree.
fn validate(tree: &FolderTree) -> Result<()> {
    check_siblings("the taxonomy root", tree.iter().map(|spec| spec.name.as_str()))?;

    for spec in tree.iter() {
        check_siblings(&spec.name, spec.children.iter().map(|c| c.name.as_str()))?;
    }

    Ok(())
}

fn check_siblings<'a>(parent: &str, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen: Vec<String> = Vec::new();

    for name in names {
        let lowercased = name.to_lowercase();
        if seen.contains(&lowercased) {
            return Err(Error::DuplicateSiblingNameError(
                parent.to_owned(),
                name.to_owned(),
            ));
        }
        seen.push(lowercased);
    }

    Ok(())
}
