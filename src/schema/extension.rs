//! # Business type extensions
//!
//! Module dedicated to the business type registry. An extension
//! adjusts the base taxonomy for one business vertical: it can add
//! new top-level categories, rename existing ones and extend their
//! subfolder lists. The extension always wins on name conflicts.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// A business type extension over the base taxonomy.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BusinessTypeExtension {
    /// The stable key used by profiles to reference the extension.
    pub key: &'static str,

    /// The human readable name.
    pub display_name: &'static str,

    /// The category adjustments carried by the extension.
    pub categories: &'static [CategoryExtension],
}

/// One category adjustment of a [`BusinessTypeExtension`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CategoryExtension {
    /// The targeted top-level category. Creates the category when the
    /// base taxonomy does not have it.
    pub category: &'static str,

    /// The new name of the category, when the extension renames it.
    pub rename_to: Option<&'static str>,

    /// Subfolders added to the category. An extension subfolder
    /// replaces a base subfolder carrying the same name.
    pub subfolders: &'static [&'static str],
}

static REGISTRY: &[BusinessTypeExtension] = &[
    BusinessTypeExtension {
        key: "hot-tub-spa",
        display_name: "Hot tub & Spa",
        categories: &[
            CategoryExtension {
                category: "SALES",
                rename_to: None,
                subfolders: &["Water Care", "Covers & Parts"],
            },
            CategoryExtension {
                category: "SUPPORT",
                rename_to: None,
                subfolders: &["Repairs", "Water Testing"],
            },
            CategoryExtension {
                category: "SERVICE",
                rename_to: None,
                subfolders: &["Maintenance Plans", "Site Visits"],
            },
        ],
    },
    BusinessTypeExtension {
        key: "hvac",
        display_name: "Heating & Cooling",
        categories: &[
            CategoryExtension {
                category: "SUPPORT",
                rename_to: Some("SERVICE CALLS"),
                subfolders: &["Emergency", "Tune-Ups"],
            },
            CategoryExtension {
                category: "PROMOTIONS",
                rename_to: None,
                subfolders: &["Seasonal"],
            },
        ],
    },
    BusinessTypeExtension {
        key: "landscaping",
        display_name: "Landscaping & Lawn Care",
        categories: &[
            CategoryExtension {
                category: "SALES",
                rename_to: None,
                subfolders: &["Design Projects"],
            },
            CategoryExtension {
                category: "CREWS",
                rename_to: None,
                subfolders: &[],
            },
        ],
    },
];

static EXTENSIONS: Lazy<HashMap<&'static str, &'static BusinessTypeExtension>> =
    Lazy::new(|| HashMap::from_iter(REGISTRY.iter().map(|ext| (ext.key, ext))));

/// Find the extension registered under the given key.
pub fn find(key: &str) -> Option<&'static BusinessTypeExtension> {
    EXTENSIONS.get(key).copied()
}

/// List all registered extensions.
pub fn all() -> impl Iterator<Item = &'static BusinessTypeExtension> {
    REGISTRY.iter()
}

#[cfg(test)]
mod tests {
    #[test]
    fn find_registered_extension() {
        let ext = super::find("hot-tub-spa").unwrap();
        assert_eq!(ext.display_name, "Hot tub & Spa");
    }

    #[test]
    fn find_unknown_extension() {
        assert!(super::find("bakery").is_none());
    }
}
