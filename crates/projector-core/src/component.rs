//! The capability contract shared by every layout, field and static.
//!
//! Components are plain structs implementing [`Component`] (and [`Field`] for
//! editable ones). The model stores them boxed in per-family arenas and calls
//! them with itself as context, so a component reaches the registry, the
//! render target and the event channel only through the `&mut Model` it is
//! handed.

use std::fmt;

use bitflags::bitflags;
use serde::Serialize;
use slotmap::Key;
use smallvec::SmallVec;

use crate::{
    ComponentNode, ConceptRef, Direction, EngineError, FieldId, LayoutId, Model, ModelEvent,
    ProjectionId, StaticId, TimerId, Value, VisualHandle,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Layout,
    Field,
    Static,
}

impl ComponentKind {
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Layout => "layout",
            ComponentKind::Field => "field",
            ComponentKind::Static => "static",
        }
    }
}

/// Typed identity of a registered component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentRef {
    Layout(LayoutId),
    Field(FieldId),
    Static(StaticId),
}

impl ComponentRef {
    pub fn kind(self) -> ComponentKind {
        match self {
            ComponentRef::Layout(_) => ComponentKind::Layout,
            ComponentRef::Field(_) => ComponentKind::Field,
            ComponentRef::Static(_) => ComponentKind::Static,
        }
    }

    pub fn as_field(self) -> Option<FieldId> {
        match self {
            ComponentRef::Field(id) => Some(id),
            _ => None,
        }
    }

    fn index(self) -> u64 {
        let data = match self {
            ComponentRef::Layout(id) => id.data(),
            ComponentRef::Field(id) => id.data(),
            ComponentRef::Static(id) => id.data(),
        };
        data.as_ffi() & 0xffff_ffff
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind().name(), self.index())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Uninitialized,
    Rendered,
    Editing,
    Destroyed,
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Flags: u8 {
        const FOCUSABLE = 1;
        const COLLAPSIBLE = 1 << 1;
        const COLLAPSED = 1 << 2;
        const READONLY = 1 << 3;
    }
}

/// An owned child: a component, or a nested projection of another concept.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Child {
    Component(ComponentRef),
    Projection(ProjectionId),
}

/// Where a node is resolved: which projection, which concept, under whom.
#[derive(Clone)]
pub struct Binding {
    pub projection: ProjectionId,
    pub concept: ConceptRef,
    pub parent: Option<ComponentRef>,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("projection", &self.projection)
            .field("concept", &self.concept.id())
            .field("parent", &self.parent)
            .finish()
    }
}

/// State every component carries regardless of variant.
pub struct ComponentCore {
    pub id: ComponentRef,
    pub variant: String,
    pub projection: ProjectionId,
    pub source: ConceptRef,
    /// Back-reference only; the parent owns us, not the reverse.
    pub parent: Option<ComponentRef>,
    pub children: SmallVec<[Child; 4]>,
    pub element: Option<VisualHandle>,
    pub state: Lifecycle,
    pub flags: Flags,
    pub help: Option<String>,
}

impl ComponentCore {
    pub fn new(id: ComponentRef, node: &ComponentNode, binding: &Binding) -> Self {
        Self {
            id,
            variant: node.kind.clone(),
            projection: binding.projection,
            source: binding.concept.clone(),
            parent: binding.parent,
            children: SmallVec::new(),
            element: None,
            state: Lifecycle::Uninitialized,
            flags: Flags::empty(),
            help: node.help.clone(),
        }
    }

    /// Binding for nodes resolved underneath this component.
    pub fn child_binding(&self) -> Binding {
        Binding {
            projection: self.projection,
            concept: self.source.clone(),
            parent: Some(self.id),
        }
    }

    pub fn is_focusable(&self) -> bool {
        self.flags.contains(Flags::FOCUSABLE)
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == Lifecycle::Destroyed
    }

    /// True when `target` is absent or is this component's own element.
    pub fn is_self_target(&self, target: Option<VisualHandle>) -> bool {
        target.is_none() || target == self.element
    }
}

/// Outcome of asking a component to take focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Accept,
    Delegate(ComponentRef),
    Reject,
}

/// Keyboard commands the host's input layer routes to the focused component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Space,
    Enter,
    Escape,
    Delete,
    Backspace,
    Arrow(Direction),
    Shift(Direction),
}

impl Command {
    pub fn name(self) -> &'static str {
        match self {
            Command::Space => "space",
            Command::Enter => "enter",
            Command::Escape => "escape",
            Command::Delete => "delete",
            Command::Backspace => "backspace",
            Command::Arrow(_) => "arrow",
            Command::Shift(_) => "shift",
        }
    }
}

/// Logs that `core` has no handler for `command` and reports it unhandled.
pub fn unhandled(core: &ComponentCore, command: &str) -> bool {
    log::debug!(
        "{} ({}) does not handle `{command}`",
        core.id,
        core.variant
    );
    false
}

pub trait Component {
    fn core(&self) -> &ComponentCore;
    fn core_mut(&mut self) -> &mut ComponentCore;

    /// One-time setup: flags, subscriptions.
    fn init(&mut self, _model: &mut Model) -> Result<(), EngineError> {
        Ok(())
    }

    /// Materializes the visual representation, or returns the one already made.
    fn render(&mut self, model: &mut Model) -> Result<VisualHandle, EngineError>;

    fn focus(&mut self, _model: &mut Model, _target: Option<VisualHandle>) -> Focus {
        if self.core().is_focusable() {
            Focus::Accept
        } else {
            Focus::Reject
        }
    }
    fn focus_in(&mut self, _model: &mut Model) {}
    fn focus_out(&mut self, _model: &mut Model) {}

    fn space_handler(&mut self, _model: &mut Model, _target: Option<VisualHandle>) -> bool {
        unhandled(self.core(), "space")
    }
    fn enter_handler(&mut self, _model: &mut Model, _target: Option<VisualHandle>) -> bool {
        unhandled(self.core(), "enter")
    }
    fn escape_handler(&mut self, _model: &mut Model, _target: Option<VisualHandle>) -> bool {
        unhandled(self.core(), "escape")
    }
    fn delete_handler(&mut self, _model: &mut Model, _target: Option<VisualHandle>) -> bool {
        unhandled(self.core(), "delete")
    }
    fn backspace_handler(&mut self, _model: &mut Model, _target: Option<VisualHandle>) -> bool {
        unhandled(self.core(), "backspace")
    }
    fn arrow_handler(
        &mut self,
        _model: &mut Model,
        _dir: Direction,
        _target: Option<VisualHandle>,
    ) -> bool {
        unhandled(self.core(), "arrow")
    }
    fn shift_handler(
        &mut self,
        _model: &mut Model,
        _dir: Direction,
        _target: Option<VisualHandle>,
    ) -> bool {
        unhandled(self.core(), "shift")
    }

    /// Character input while focused.
    fn input(&mut self, _model: &mut Model, _text: &str) -> bool {
        false
    }

    /// Reaction to an event this component subscribed to with `Model::listen`.
    fn update(&mut self, _model: &mut Model, _event: &ModelEvent) -> Result<(), EngineError> {
        Ok(())
    }

    fn on_timer(&mut self, _model: &mut Model, _timer: TimerId) {}

    /// Variant teardown. The model cancels timers, destroys children and
    /// unregisters the component afterwards.
    fn destroy(&mut self, _model: &mut Model) {}

    /// Short human-readable state for the inspector.
    fn describe(&self) -> Option<String> {
        None
    }
}

pub trait Field: Component {
    fn has_value(&self) -> bool;
    fn get_value(&self) -> Value;
    /// `commit == false` only updates visual state; `commit == true` also
    /// writes through to the concept. Returns whether the value was accepted.
    fn set_value(&mut self, model: &mut Model, value: Value, commit: bool) -> bool;
    fn errors(&self) -> &[String] {
        &[]
    }
}

pub(crate) fn dispatch(
    component: &mut dyn Component,
    model: &mut Model,
    command: Command,
    target: Option<VisualHandle>,
) -> bool {
    if component.core().is_destroyed() {
        log::debug!("{} is destroyed; ignoring `{}`", component.core().id, command.name());
        return false;
    }
    match command {
        Command::Space => component.space_handler(model, target),
        Command::Enter => component.enter_handler(model, target),
        Command::Escape => component.escape_handler(model, target),
        Command::Delete => component.delete_handler(model, target),
        Command::Backspace => component.backspace_handler(model, target),
        Command::Arrow(dir) => component.arrow_handler(model, dir, target),
        Command::Shift(dir) => component.shift_handler(model, dir, target),
    }
}
