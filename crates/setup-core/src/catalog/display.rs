//! Sorted name and version lists for presenting the catalog

use super::{Catalog, Category};
use crate::templates::TemplateCatalog;
use serde::Serialize;

/// An extension row; lists are sorted by id so parallel columns line up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionRow {
    pub id: String,
    pub name: String,
    pub version: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialectRow {
    pub id: String,
    pub name: String,
    pub versions: Vec<String>,
}

/// Everything a front end needs to populate its choice widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayLists {
    pub framework_version: String,
    pub platforms: Vec<String>,
    pub dialects: Vec<DialectRow>,
    pub gwt_versions: Vec<String>,
    pub official_extensions: Vec<ExtensionRow>,
    pub third_party_extensions: Vec<ExtensionRow>,
    pub templates: Vec<String>,
}

impl DisplayLists {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut platforms: Vec<String> = catalog
            .matrix()
            .platforms()
            .map(|p| p.as_str().to_string())
            .collect();
        platforms.sort();

        let dialects = catalog
            .dialects()
            .iter()
            .map(|d| DialectRow {
                id: d.id.clone(),
                name: d.name.clone(),
                versions: d.versions.clone(),
            })
            .collect();

        let rows = |category: Category| -> Vec<ExtensionRow> {
            let mut rows: Vec<ExtensionRow> = catalog
                .extensions()
                .iter()
                .filter(|e| e.category == category)
                .map(|e| ExtensionRow {
                    id: e.id.clone(),
                    name: e.name.clone(),
                    version: e
                        .default_version
                        .clone()
                        .unwrap_or_else(|| catalog.framework_version().to_string()),
                    url: e.url.to_string(),
                })
                .collect();
            rows.sort_by(|a, b| a.id.cmp(&b.id));
            rows
        };

        Self {
            framework_version: catalog.framework_version().to_string(),
            platforms,
            dialects,
            gwt_versions: catalog.gwt_versions().to_vec(),
            official_extensions: rows(Category::Official),
            third_party_extensions: rows(Category::ThirdParty),
            templates: Vec::new(),
        }
    }

    /// Adds the sorted template ids.
    pub fn with_templates(mut self, templates: &TemplateCatalog) -> Self {
        self.templates = templates.ids().map(str::to_string).collect();
        self.templates.sort();
        self
    }

    pub fn official_extension_urls(&self) -> Vec<&str> {
        self.official_extensions
            .iter()
            .map(|r| r.url.as_str())
            .collect()
    }

    pub fn third_party_extension_versions(&self) -> Vec<&str> {
        self.third_party_extensions
            .iter()
            .map(|r| r.version.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_are_sorted() {
        let catalog = Catalog::builtin().unwrap();
        let lists = catalog
            .display_lists()
            .with_templates(&TemplateCatalog::builtin());

        let mut sorted = lists.platforms.clone();
        sorted.sort();
        assert_eq!(lists.platforms, sorted);

        let ids: Vec<&str> = lists
            .official_extensions
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        let mut sorted_ids = ids.clone();
        sorted_ids.sort();
        assert_eq!(ids, sorted_ids);

        assert!(lists.templates.contains(&"basic".to_string()));
    }

    #[test]
    fn test_parallel_columns_line_up() {
        let catalog = Catalog::builtin().unwrap();
        let lists = catalog.display_lists();

        let visui = lists
            .third_party_extensions
            .iter()
            .position(|r| r.id == "visui")
            .unwrap();
        assert_eq!(lists.third_party_extension_versions()[visui], "1.4.4");

        let box2d = lists
            .official_extensions
            .iter()
            .position(|r| r.id == "box2d")
            .unwrap();
        assert!(lists.official_extension_urls()[box2d].contains("Box2d"));
        // official extensions without their own version follow the framework
        assert_eq!(lists.official_extensions[box2d].version, "1.9.10");
    }
}
