//! Service catalog.
//!
//! The catalog is static reference data: categories of home and personal
//! services, each with subcategories. It ships embedded in the binary and is
//! parsed once at startup. Bookings carry a display label built from the
//! catalog (`"Category - Subcategory"`); [`Catalog::resolve_label`] maps such
//! a label back to its entries by exact match.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Embedded catalog table.
const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// Separator between category and subcategory in a service label.
pub const LABEL_SEPARATOR: &str = " - ";

/// Errors that can occur when loading a catalog.
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// The catalog document is not valid JSON or has the wrong shape.
    #[error("invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two categories share an ID.
    #[error("duplicate category id: {0}")]
    DuplicateCategory(String),
    /// Two subcategories of the same category share an ID.
    #[error("duplicate subcategory id {subcategory} in category {category}")]
    DuplicateSubcategory {
        /// Owning category ID.
        category: String,
        /// Repeated subcategory ID.
        subcategory: String,
    },
}

/// A bookable subcategory of service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    /// Stable identifier, unique within its category.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A service category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable identifier, unique within the catalog.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description shown when browsing.
    #[serde(default)]
    pub description: String,
    /// Bookable subcategories, in display order.
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

impl Category {
    /// Find a subcategory by ID.
    #[must_use]
    pub fn subcategory(&self, id: &str) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| s.id == id)
    }

    /// Booking label for a subcategory of this category.
    #[must_use]
    pub fn label_for(&self, subcategory: &Subcategory) -> String {
        format!("{}{LABEL_SEPARATOR}{}", self.name, subcategory.name)
    }
}

/// A catalog entry matched from a booking's service label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceMatch<'a> {
    /// The matched category.
    pub category: &'a Category,
    /// The matched subcategory, when the label names one.
    pub subcategory: Option<&'a Subcategory>,
}

/// The full service catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    categories: Vec<Category>,
}

impl Catalog {
    /// Load the catalog embedded in this crate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the embedded table is malformed.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse and check a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON and a duplicate-ID
    /// error when IDs are not unique.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.check_ids()?;
        Ok(catalog)
    }

    fn check_ids(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for category in &self.categories {
            if !seen.insert(category.id.as_str()) {
                return Err(CatalogError::DuplicateCategory(category.id.clone()));
            }
            let mut seen_sub = HashSet::new();
            for sub in &category.subcategories {
                if !seen_sub.insert(sub.id.as_str()) {
                    return Err(CatalogError::DuplicateSubcategory {
                        category: category.id.clone(),
                        subcategory: sub.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// All categories, in display order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Find a category by ID.
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Build the booking label for a category/subcategory ID pair.
    #[must_use]
    pub fn service_label(&self, category_id: &str, subcategory_id: &str) -> Option<String> {
        let category = self.category(category_id)?;
        let sub = category.subcategory(subcategory_id)?;
        Some(category.label_for(sub))
    }

    /// Resolve a booking's service label back to catalog entries.
    ///
    /// Accepts either a bare category name or `"Category - Subcategory"`.
    /// Matching is exact (ignoring ASCII case), never by substring.
    #[must_use]
    pub fn resolve_label(&self, label: &str) -> Option<ServiceMatch<'_>> {
        let label = label.trim();
        for category in &self.categories {
            if category.name.eq_ignore_ascii_case(label) {
                return Some(ServiceMatch {
                    category,
                    subcategory: None,
                });
            }
            let Some(rest) = strip_prefix_ignore_case(label, &category.name) else {
                continue;
            };
            let Some(sub_name) = rest.strip_prefix(LABEL_SEPARATOR) else {
                continue;
            };
            if let Some(sub) = category
                .subcategories
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(sub_name))
            {
                return Some(ServiceMatch {
                    category,
                    subcategory: Some(sub),
                });
            }
        }
        None
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        s.get(prefix.len()..)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert!(!catalog.categories().is_empty());
        assert!(catalog.category("bill-payment").is_some());
        assert!(catalog.categories().iter().all(|c| !c.subcategories.is_empty()));
    }

    #[test]
    fn test_service_label() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(
            catalog.service_label("plumbing", "leak-repair").as_deref(),
            Some("Plumbing - Leak Repair")
        );
        assert!(catalog.service_label("plumbing", "nope").is_none());
        assert!(catalog.service_label("nope", "leak-repair").is_none());
    }

    #[test]
    fn test_resolve_label_roundtrip() {
        let catalog = Catalog::builtin().unwrap();
        for category in catalog.categories() {
            for sub in &category.subcategories {
                let label = category.label_for(sub);
                let found = catalog.resolve_label(&label).unwrap();
                assert_eq!(found.category.id, category.id);
                assert_eq!(found.subcategory.unwrap().id, sub.id);
            }
        }
    }

    #[test]
    fn test_resolve_bare_category() {
        let catalog = Catalog::builtin().unwrap();
        let found = catalog.resolve_label("home cleaning").unwrap();
        assert_eq!(found.category.id, "cleaning");
        assert!(found.subcategory.is_none());
    }

    #[test]
    fn test_resolve_rejects_partial_matches() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.resolve_label("Cleaning").is_none());
        assert!(catalog.resolve_label("Plumbing - Leak").is_none());
        assert!(catalog.resolve_label("").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{"categories":[{"id":"a","name":"A"},{"id":"a","name":"B"}]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateCategory(id)) if id == "a"
        ));

        let json = r#"{"categories":[{"id":"a","name":"A","subcategories":[
            {"id":"x","name":"X"},{"id":"x","name":"Y"}]}]}"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateSubcategory { .. })
        ));
    }
}
