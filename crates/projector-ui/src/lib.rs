//! Layouts, fields and statics for Projector.
//!
//! [`install`] registers the standard component families on a model:
//!
//! | family | kinds |
//! |--------|-------|
//! | layout | `stack`, `wrap`, `table`, `flex` |
//! | field  | `text`, `binary`, `choice`, `list`, `table` |
//! | static | `text`, `button`, `link`, `activator` |
//!
//! ```rust
//! use projector_core::{LogEnvironment, Model};
//! use projector_devtools::HeadlessTarget;
//!
//! let mut model = Model::new(Box::new(HeadlessTarget::new()), Box::new(LogEnvironment));
//! projector_ui::install(&mut model);
//! assert!(model.factories().layout("stack").is_some());
//! assert!(model.factories().field("list").is_some());
//! ```

pub mod field;
pub mod layout;
pub mod statics;

pub use field::binary::BinaryField;
pub use field::buffer::TextBuffer;
pub use field::choice::ChoiceField;
pub use field::list::CollectionField;
pub use field::reconcile::{Item, ItemList, ItemShape};
pub use field::text::TextField;
pub use field::{Column, FieldConfig};
pub use layout::{Arrangement, Layout, LayoutConfig};
pub use statics::{Action, Activator, Button, Link, StaticConfig, TextStatic};

use projector_core::Model;

pub fn install(model: &mut Model) {
    let factories = model.factories_mut();

    factories.register_layout("stack", layout::stack::create);
    factories.register_layout("wrap", layout::wrap::create);
    factories.register_layout("table", layout::table::create);
    factories.register_layout("flex", layout::flex::create);

    factories.register_field("text", field::text::create);
    factories.register_field("binary", field::binary::create);
    factories.register_field("choice", field::choice::create);
    factories.register_field("list", field::list::create);
    factories.register_field("table", field::table::create);

    factories.register_static("text", statics::text);
    factories.register_static("button", statics::button);
    factories.register_static("link", statics::link);
    factories.register_static("activator", statics::activator);

    log::debug!("installed the standard component families");
}
