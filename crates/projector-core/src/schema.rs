//! Schema nodes: the declarative description a concept owns of how it is
//! projected. Nodes arrive as JSON and are parsed into [`SchemaNode`], a closed
//! sum type the resolver matches exhaustively.
//!
//! ```rust
//! use projector_core::SchemaNode;
//!
//! let node = SchemaNode::parse(r#"{ "type": "field", "field": { "type": "binary" } }"#).unwrap();
//! assert_eq!(node.type_name(), "field");
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::SchemaError;

/// Override arguments merged over a component's schema configuration.
pub type Args = Map<String, Json>;

#[derive(Clone, Debug, PartialEq)]
pub enum SchemaNode {
    Layout(ComponentNode),
    Field(ComponentNode),
    Static(ComponentNode),
    Attribute(AttributeNode),
    Template(TemplateNode),
    Projection(ProjectionNode),
    Property(PropertyNode),
}

impl SchemaNode {
    pub fn parse(json: &str) -> Result<Self, SchemaError> {
        let value: Json = serde_json::from_str(json).map_err(SchemaError::malformed("schema"))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Json) -> Result<Self, SchemaError> {
        let obj = value
            .as_object()
            .ok_or_else(|| SchemaError::NotAnObject(value.to_string()))?;
        let tag = obj
            .get("type")
            .and_then(Json::as_str)
            .ok_or(SchemaError::MissingType)?;
        match tag {
            "layout" => ComponentNode::parse("layout", obj).map(SchemaNode::Layout),
            "field" => ComponentNode::parse("field", obj).map(SchemaNode::Field),
            "static" => ComponentNode::parse("static", obj).map(SchemaNode::Static),
            "attribute" => serde_json::from_value(value.clone())
                .map(SchemaNode::Attribute)
                .map_err(SchemaError::malformed("attribute")),
            "template" => serde_json::from_value(value.clone())
                .map(SchemaNode::Template)
                .map_err(SchemaError::malformed("template")),
            "projection" => serde_json::from_value(value.clone())
                .map(SchemaNode::Projection)
                .map_err(SchemaError::malformed("projection")),
            "property" => serde_json::from_value(value.clone())
                .map(SchemaNode::Property)
                .map_err(SchemaError::malformed("property")),
            other => Err(SchemaError::UnknownNodeType(other.to_string())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaNode::Layout(_) => "layout",
            SchemaNode::Field(_) => "field",
            SchemaNode::Static(_) => "static",
            SchemaNode::Attribute(_) => "attribute",
            SchemaNode::Template(_) => "template",
            SchemaNode::Projection(_) => "projection",
            SchemaNode::Property(_) => "property",
        }
    }
}

/// A layout, field or static node. `kind` selects the factory; `config` is
/// the variant object (`node.layout`, `node.field` or `node.static`).
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentNode {
    pub kind: String,
    pub config: Map<String, Json>,
    pub style: Option<Json>,
    pub help: Option<String>,
}

impl ComponentNode {
    pub fn new(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        let mut config = Map::new();
        config.insert("type".into(), Json::String(kind.clone()));
        Self {
            kind,
            config,
            style: None,
            help: None,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Json>) -> Self {
        self.config.insert(key.to_string(), value.into());
        self
    }

    fn parse(family: &'static str, obj: &Map<String, Json>) -> Result<Self, SchemaError> {
        let config = obj
            .get(family)
            .and_then(Json::as_object)
            .ok_or(SchemaError::MissingKind(family))?;
        let kind = config
            .get("type")
            .and_then(Json::as_str)
            .ok_or(SchemaError::MissingKind(family))?;
        Ok(Self {
            kind: kind.to_string(),
            config: config.clone(),
            style: obj.get("style").cloned(),
            help: obj.get("help").and_then(Json::as_str).map(str::to_string),
        })
    }

    /// Deserializes the variant configuration into its typed form.
    pub fn config<T: DeserializeOwned>(&self) -> Result<T, SchemaError> {
        serde_json::from_value(Json::Object(self.config.clone()))
            .map_err(SchemaError::malformed("component"))
    }

    pub fn with_args(&self, args: &Args) -> ComponentNode {
        let mut node = self.clone();
        for (k, v) in args {
            if k != "type" {
                node.config.insert(k.clone(), v.clone());
            }
        }
        node
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeNode {
    pub name: String,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateNode {
    pub name: String,
    #[serde(default)]
    pub param: Args,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectionNode {
    pub tag: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ProjectionNode {
    /// Projection references render as a link that switches the owning
    /// projection to the tagged view.
    pub fn as_link(&self) -> ComponentNode {
        ComponentNode::new("link")
            .with("tag", self.tag.clone())
            .with("content", self.content.clone().unwrap_or_else(|| self.tag.clone()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyNode {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DispositionItem {
    Node(SchemaNode),
    Text(String),
}

/// The `disposition`/`elements` pair shared by composing layouts. A string
/// item `#[key]` refers to `elements[key]`; any other string is plain text.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Disposition {
    #[serde(default)]
    pub disposition: Vec<Json>,
    #[serde(default, alias = "element")]
    pub elements: Map<String, Json>,
}

impl Disposition {
    pub fn items(&self) -> Result<Vec<DispositionItem>, SchemaError> {
        self.disposition.iter().map(|item| self.item(item)).collect()
    }

    pub fn item(&self, item: &Json) -> Result<DispositionItem, SchemaError> {
        match item {
            Json::String(s) => match element_key(s) {
                Some(key) => {
                    let node = self
                        .elements
                        .get(key)
                        .ok_or_else(|| SchemaError::UnknownElement(key.to_string()))?;
                    SchemaNode::from_value(node).map(DispositionItem::Node)
                }
                None => Ok(DispositionItem::Text(s.clone())),
            },
            Json::Object(_) => SchemaNode::from_value(item).map(DispositionItem::Node),
            other => Err(SchemaError::MalformedDisposition(other.to_string())),
        }
    }
}

fn element_key(s: &str) -> Option<&str> {
    s.trim()
        .strip_prefix("#[")
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

/// Reusable schema fragment. Strings of the form `$name` anywhere in
/// `content` are replaced by the parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateSchema {
    pub name: String,
    #[serde(default)]
    pub param: Vec<TemplateParam>,
    pub content: Vec<Json>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateParam {
    pub name: String,
    #[serde(default)]
    pub default: Option<Json>,
}

impl TemplateSchema {
    pub fn instantiate(&self, args: &Args) -> Result<Vec<SchemaNode>, SchemaError> {
        let mut values = Map::new();
        for p in &self.param {
            let value = args
                .get(&p.name)
                .or(p.default.as_ref())
                .ok_or_else(|| SchemaError::MissingParameter {
                    template: self.name.clone(),
                    param: p.name.clone(),
                })?;
            values.insert(p.name.clone(), value.clone());
        }
        // undeclared arguments still substitute
        for (k, v) in args {
            values.entry(k.clone()).or_insert_with(|| v.clone());
        }
        self.content
            .iter()
            .map(|node| SchemaNode::from_value(&substitute(node, &values)))
            .collect()
    }
}

fn substitute(node: &Json, values: &Map<String, Json>) -> Json {
    match node {
        Json::String(s) => s
            .strip_prefix('$')
            .and_then(|name| values.get(name))
            .cloned()
            .unwrap_or_else(|| node.clone()),
        Json::Array(items) => Json::Array(items.iter().map(|i| substitute(i, values)).collect()),
        Json::Object(obj) => Json::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), substitute(v, values)))
                .collect(),
        ),
        other => other.clone(),
    }
}
