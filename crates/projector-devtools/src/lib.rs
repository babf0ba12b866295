//! Developer tools for Projector: a headless render target with flow
//! geometry, in-memory concepts, an environment that records notifications
//! and an inspector for the live component tree.
//!
//! ```rust
//! use projector_core::{Concept, Value};
//! use projector_devtools::MemoryConcept;
//!
//! let flag = MemoryConcept::new("flag", "flag");
//! flag.set_value(Value::Bool(true)).unwrap();
//! assert!(flag.has_value());
//! ```

pub mod headless;
pub mod inspector;
pub mod memory;
pub mod recording;

pub use headless::*;
pub use inspector::*;
pub use memory::*;
pub use recording::*;
