use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bundle name the host loads backend web assets from.
pub const BACKEND_ASSETS_BUNDLE: &str = "web.assets_backend";

/// Registration record handed to the host application: module identity,
/// dependencies, declarative view files, and the frontend asset bundles
/// (stylesheet, chart library, adapter script/template).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub name: String,
    pub summary: String,
    pub version: String,
    pub category: String,
    pub license: String,
    pub depends: Vec<String>,
    pub data: Vec<String>,
    pub assets: BTreeMap<String, Vec<String>>,
    pub installable: bool,
    pub application: bool,
}

impl Default for ModuleManifest {
    fn default() -> Self {
        let mut assets = BTreeMap::new();
        assets.insert(
            BACKEND_ASSETS_BUNDLE.to_string(),
            vec![
                "project_gantt/static/lib/frappe-gantt/frappe-gantt.css".to_string(),
                "project_gantt/static/lib/frappe-gantt/frappe-gantt.umd.js".to_string(),
                "project_gantt/static/src/js/gantt.js".to_string(),
                "project_gantt/static/src/xml/gantt.xml".to_string(),
                "project_gantt/static/src/scss/gantt.scss".to_string(),
            ],
        );
        Self {
            name: "Project Task Gantt".to_string(),
            summary: "Gantt chart view for project tasks".to_string(),
            version: "17.0.1.0.0".to_string(),
            category: "Project".to_string(),
            license: "LGPL-3".to_string(),
            depends: vec!["web".to_string(), "project".to_string()],
            data: vec![
                "views/project_task_views.xml".to_string(),
                "views/gantt_action.xml".to_string(),
            ],
            assets,
            installable: true,
            application: false,
        }
    }
}

impl ModuleManifest {
    pub fn backend_assets(&self) -> &[String] {
        self.assets
            .get(BACKEND_ASSETS_BUNDLE)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
