//! Editable components. Each field reads its value from the bound concept,
//! writes back through `Model::commit_value` and follows the concept's
//! `value.*` events.

pub mod binary;
pub mod buffer;
pub mod choice;
pub mod list;
pub mod reconcile;
pub mod table;
pub mod text;

use projector_core::{ComponentCore, Model, Orientation};
use serde::Deserialize;
use serde_json::Value as Json;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub placeholder: Option<String>,
    pub readonly: bool,
    /// List only.
    pub orientation: Orientation,
    /// Projection tag for list items.
    pub tag: Option<String>,
    /// Table only.
    pub columns: Vec<Column>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub header: String,
    pub content: Json,
}

/// Mirrors `errors` on the element: an `error` class plus the first message
/// as `data-error`.
pub(crate) fn show_errors(model: &mut Model, core: &ComponentCore, errors: &[String]) {
    let Some(element) = core.element else {
        return;
    };
    let target = model.target_mut();
    target.set_class(element, "error", !errors.is_empty());
    target.set_attribute(element, "data-error", errors.first().map_or("", String::as_str));
}

#[cfg(test)]
mod tests {
    use super::*;
    use projector_core::ComponentNode;
    use serde_json::json;

    #[test]
    fn test_table_columns_parse() {
        let node = ComponentNode::new("table").with(
            "columns",
            json!([
                { "header": "Name", "content": { "type": "property", "name": "label" } },
                { "content": { "type": "field", "field": { "type": "binary" } } }
            ]),
        );
        let config: FieldConfig = node.config().unwrap();
        assert_eq!(config.columns.len(), 2);
        assert_eq!(config.columns[0].header, "Name");
        assert_eq!(config.columns[1].header, "");
        assert!(!config.readonly);
    }

    #[test]
    fn test_column_without_content_is_malformed() {
        let node = ComponentNode::new("table").with("columns", json!([{ "header": "Name" }]));
        assert!(node.config::<FieldConfig>().is_err());
    }
}
