//! # Projections, Components, and Events
//!
//! Projector renders an external domain model (a graph of *concepts*) through
//! declarative schemas. There are four main pieces:
//!
//! - `SchemaNode` — a parsed description of one unit of projectable structure.
//! - `Model` — owns the component registry, the live projections and the
//!   render target; resolves schema nodes into components.
//! - `Component` / `Field` — the capability contract every layout, field and
//!   static implements.
//! - `EventChannel` — per-projection publish/subscribe for model and view
//!   changes.
//!
//! ## Schemas
//!
//! Schemas are JSON. The `type` tag picks the node family; layouts, fields
//! and statics carry their variant object under the same key:
//!
//! ```rust
//! use projector_core::*;
//!
//! let node = SchemaNode::parse(r##"{
//!     "type": "layout",
//!     "layout": { "type": "stack", "orientation": "horizontal", "disposition": ["Name:", "#[name]"],
//!                 "elements": { "name": { "type": "field", "field": { "type": "text" } } } }
//! }"##).unwrap();
//! assert_eq!(node.type_name(), "layout");
//!
//! assert!(matches!(
//!     SchemaNode::parse(r#"{ "type": "bogus" }"#),
//!     Err(SchemaError::UnknownNodeType(_))
//! ));
//! ```
//!
//! ## Resolution
//!
//! `Model::project(concept, tag)` picks the views registered for the
//! concept's name, resolves the active one and returns the root element.
//! Every layout/field/static node becomes exactly one live component held in
//! a typed arena (`LayoutId`, `FieldId`, `StaticId`); `attribute` nodes
//! recurse into nested projections, `template` nodes splice a named fragment,
//! `projection` nodes become view-switching links and `property` nodes read
//! a value without creating anything.
//!
//! Component families are pluggable: a `Factories` table maps each variant
//! kind to a constructor. `projector-ui` installs the standard set.
//!
//! ## Events
//!
//! Concepts report changes to the `Observer` each projection registers with
//! them. Notifications are queued and delivered once the component that caused
//! them has finished, in subscription order; whatever a handler causes drains
//! before the next subscriber runs.
//!
//! ```rust
//! use projector_core::*;
//!
//! let mut channel = EventChannel::default();
//! channel.register_handler(VALUE_CHANGED, |_, event| {
//!     log::debug!("changed: {:?}", event.payload);
//!     Ok(())
//! });
//! assert_eq!(channel.count(VALUE_CHANGED), 1);
//! ```
//!
//! ## Focus and keys
//!
//! The host's input layer calls `Model::handle(command, target)`. The command
//! goes to the component owning `target` (or the focused one) and bubbles to
//! parents until someone handles it. Arrow keys are answered geometrically
//! through the render target's `SpatialIndex`: nearest sibling in the
//! half-plane first, then the parent container with the container itself as
//! origin.

pub mod component;
pub mod concept;
pub mod config;
pub mod error;
pub mod event;
pub mod factory;
pub mod focus;
pub mod geometry;
pub mod host;
pub mod model;
pub mod projection;
pub mod registry;
pub mod render_api;
pub mod resolver;
pub mod schema;
pub mod timer;
pub mod value;

pub use component::*;
pub use concept::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use factory::*;
pub use focus::*;
pub use geometry::*;
pub use host::*;
pub use model::*;
pub use projection::*;
pub use registry::*;
pub use render_api::*;
pub use resolver::*;
pub use schema::*;
pub use timer::*;
pub use value::*;
