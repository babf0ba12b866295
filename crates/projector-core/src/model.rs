//! The projection model: owner of the registry, the live projections, the
//! render target and the host environment.
//!
//! Every public entry point that may mutate concepts (`handle`, `input`,
//! `set_value`, `tick`, `project`, `focus_component`) delivers the mailbox
//! before returning, so hosts observe a quiescent model.

use std::collections::HashMap;

use serde::Serialize;
use slotmap::SlotMap;
use web_time::{Duration, Instant};

use crate::component::dispatch;
use crate::event::{DISPLAYED, Envelope, Mailbox, VIEW_CHANGED};
use crate::{
    Child, Command, Component, ComponentKind, ComponentRef, ConceptId, ConceptRef, EngineConfig,
    EngineError, Environment, Factories, Field, FieldId, Focus, Lifecycle, ModelEvent, Mutation,
    Observer, Payload, Primitive, Projection, ProjectionId, ProjectionSchema, Registry,
    RenderTarget, Result, SchemaSnapshot, Severity, TemplateSchema, TimerId, Timers, Value,
    VisualHandle,
};

const MAX_DELEGATION: usize = 64;

/// Structural shape of a component subtree: what the determinism property
/// compares between two resolutions of the same schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Outline {
    pub kind: ComponentKind,
    pub variant: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Outline>,
}

pub struct Model {
    pub(crate) registry: Registry,
    pub(crate) projections: SlotMap<ProjectionId, Projection>,
    schemas: HashMap<String, Vec<ProjectionSchema>>,
    pub(crate) templates: HashMap<String, TemplateSchema>,
    pub(crate) factories: Factories,
    pub(crate) target: Box<dyn RenderTarget>,
    pub(crate) env: Box<dyn Environment>,
    mailbox: Mailbox,
    pub(crate) timers: Timers,
    focused: Option<ComponentRef>,
    /// Components asked to destroy themselves while checked out.
    deferred: Vec<ComponentRef>,
    pub(crate) config: EngineConfig,
    now: Instant,
}

impl Model {
    pub fn new(target: Box<dyn RenderTarget>, env: Box<dyn Environment>) -> Self {
        Self {
            registry: Registry::default(),
            projections: SlotMap::with_key(),
            schemas: HashMap::new(),
            templates: HashMap::new(),
            factories: Factories::default(),
            target,
            env,
            mailbox: Mailbox::default(),
            timers: Timers::default(),
            focused: None,
            deferred: Vec::new(),
            config: EngineConfig::default(),
            now: Instant::now(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn factories_mut(&mut self) -> &mut Factories {
        &mut self.factories
    }

    pub fn factories(&self) -> &Factories {
        &self.factories
    }

    /// Adds a view for concepts named `concept`. Views keep registration order.
    pub fn register_projection(&mut self, concept: impl Into<String>, schema: ProjectionSchema) {
        self.schemas.entry(concept.into()).or_default().push(schema);
    }

    pub fn register_template(&mut self, template: TemplateSchema) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn has_schema(&self, concept: &str, tag: Option<&str>) -> bool {
        self.schemas
            .get(concept)
            .is_some_and(|views| views.iter().any(|v| tag.is_none_or(|t| v.has_tag(t))))
    }

    pub fn target(&self) -> &dyn RenderTarget {
        &*self.target
    }

    pub fn target_mut(&mut self) -> &mut dyn RenderTarget {
        &mut *self.target
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn notify_host(&mut self, message: &str, severity: Severity) {
        self.env.notify(message, severity);
    }

    // ---- Projections ----

    /// Creates (but does not render) a projection of `concept` restricted to
    /// the views tagged `tag`. `None` when no view matches.
    pub fn create_projection(
        &mut self,
        concept: ConceptRef,
        tag: Option<&str>,
        parent: Option<ComponentRef>,
    ) -> Option<ProjectionId> {
        let views: Vec<ProjectionSchema> = self
            .schemas
            .get(concept.name())?
            .iter()
            .filter(|v| tag.is_none_or(|t| v.has_tag(t)))
            .cloned()
            .collect();
        if views.is_empty() {
            return None;
        }
        let id = self
            .projections
            .insert_with_key(|id| Projection::new(id, concept.clone(), views, parent));
        self.observe(id, &concept);
        log::trace!("created projection {id:?} of `{}`", concept.id());
        Some(id)
    }

    /// Renders the active view of a projection into its container element.
    /// Memoized: a rendered projection returns its existing container.
    pub fn render_projection(&mut self, id: ProjectionId) -> Result<VisualHandle> {
        let p = self
            .projections
            .get(id)
            .ok_or(EngineError::UnknownProjection(id))?;
        if let Some(element) = p.element {
            return Ok(element);
        }
        let container = self.target.create(
            Primitive::container()
                .class("projection")
                .attr("data-concept", p.concept.id().0),
        );
        self.projections[id].element = Some(container);
        self.fill_projection(id, container)?;

        let p = &mut self.projections[id];
        if !p.displayed {
            p.displayed = true;
            self.mailbox.post(Envelope {
                projection: id,
                event: ModelEvent::new(DISPLAYED, Payload::None),
            });
        }
        Ok(container)
    }

    fn fill_projection(&mut self, id: ProjectionId, container: VisualHandle) -> Result<()> {
        let p = self
            .projections
            .get(id)
            .ok_or(EngineError::UnknownProjection(id))?;
        let Some(view) = p.active() else {
            return Ok(());
        };
        let content = view.content.clone();
        let binding = crate::Binding {
            projection: id,
            concept: p.concept.clone(),
            parent: p.parent,
        };
        let resolution = self.resolve_value(&content, &binding)?;
        for element in self.materialize(&resolution) {
            self.target.append(container, element);
        }
        if let Some(p) = self.projections.get_mut(id) {
            p.roots = resolution.children();
        }
        Ok(())
    }

    /// Projects `concept` as a root view and delivers the resulting events.
    pub fn project(&mut self, concept: ConceptRef, tag: Option<&str>) -> Result<crate::Resolution> {
        let resolution = self.resolve_projection(concept, tag, None)?;
        if self.config.focus_on_render
            && let Some(id) = resolution.projection()
        {
            let roots = self.projections[id].roots.clone();
            if let Some(first) = self.first_focusable(&roots) {
                self.focus(first, None);
            }
        }
        self.flush()?;
        Ok(resolution)
    }

    pub fn projection(&self, id: ProjectionId) -> Option<&Projection> {
        self.projections.get(id)
    }

    pub fn projections(&self) -> impl Iterator<Item = &Projection> {
        self.projections.values()
    }

    /// Tears down the active view and renders view `index` in place.
    /// Returns `false` when `index` is out of range.
    pub fn change_view(&mut self, id: ProjectionId, index: usize) -> Result<bool> {
        let p = self
            .projections
            .get_mut(id)
            .ok_or(EngineError::UnknownProjection(id))?;
        if index >= p.views.len() {
            log::debug!("projection {id:?} has no view {index}");
            return Ok(false);
        }
        p.index = index;
        let roots = std::mem::take(&mut p.roots);
        let container = p.element;
        for root in roots {
            self.discard(root);
        }
        if let Some(container) = container {
            for child in self.target.children(container) {
                self.target.remove(child);
            }
            self.fill_projection(id, container)?;
        }
        self.post(id, ModelEvent::new(VIEW_CHANGED, Payload::View(index)));
        Ok(true)
    }

    pub fn change_view_by_tag(&mut self, id: ProjectionId, tag: &str) -> Result<bool> {
        let index = self
            .projections
            .get(id)
            .ok_or(EngineError::UnknownProjection(id))?
            .view_with_tag(tag);
        match index {
            Some(index) => self.change_view(id, index),
            None => {
                let message = format!("no view tagged `{tag}`");
                log::warn!("{message}");
                self.env.notify(&message, Severity::Warning);
                Ok(false)
            }
        }
    }

    /// Destroys a projection with everything it rendered.
    pub fn drop_projection(&mut self, id: ProjectionId) {
        let Some(p) = self.projections.get_mut(id) else {
            return;
        };
        let roots = std::mem::take(&mut p.roots);
        let observed = std::mem::take(&mut p.observed);
        let element = p.element.take();
        for root in roots {
            self.discard(root);
        }
        let observer = Observer::new(id, self.mailbox.clone());
        for concept in observed {
            concept.unregister(&observer);
        }
        if let Some(element) = element {
            self.target.remove(element);
        }
        self.projections.remove(id);
        log::trace!("dropped projection {id:?}");
    }

    /// Registers the projection as observer of `concept`, once per concept.
    pub fn observe(&mut self, projection: ProjectionId, concept: &ConceptRef) {
        let Some(p) = self.projections.get_mut(projection) else {
            return;
        };
        let id = concept.id();
        if p.is_observing(&id) {
            return;
        }
        p.observed.push(concept.clone());
        concept.register(Observer::new(projection, self.mailbox.clone()));
    }

    /// Stops `projection` observing `concept`. The projection's own concept
    /// stays observed for as long as the projection lives.
    pub fn unobserve(&mut self, projection: ProjectionId, concept: &ConceptRef) {
        let Some(p) = self.projections.get_mut(projection) else {
            return;
        };
        let id = concept.id();
        if p.concept.id() == id || !p.is_observing(&id) {
            return;
        }
        p.observed.retain(|c| c.id() != id);
        concept.unregister(&Observer::new(projection, self.mailbox.clone()));
        log::trace!("projection {projection:?} no longer observes `{id}`");
    }

    pub fn export(&self) -> Vec<SchemaSnapshot> {
        self.projections.values().map(Projection::snapshot).collect()
    }

    // ---- Events ----

    pub fn register_handler(
        &mut self,
        projection: ProjectionId,
        name: &str,
        handler: impl Fn(&mut Model, &ModelEvent) -> Result<()> + 'static,
    ) -> Result<()> {
        self.projections
            .get_mut(projection)
            .ok_or(EngineError::UnknownProjection(projection))?
            .channel
            .register_handler(name, handler);
        Ok(())
    }

    /// Subscribes `component` to events about `source` on its projection's
    /// channel. The handler holds the component's identity; once the
    /// component is gone it is skipped.
    pub fn listen(
        &mut self,
        component: ComponentRef,
        projection: ProjectionId,
        source: ConceptId,
        names: &[&str],
    ) -> Result<()> {
        for name in names {
            let source = source.clone();
            self.register_handler(projection, name, move |model, event| {
                if !event.concerns(&source) {
                    return Ok(());
                }
                model
                    .with_component(component, |c, m| c.update(m, event))
                    .unwrap_or(Ok(()))
            })?;
        }
        Ok(())
    }

    /// Queues an event for delivery at the next flush.
    pub fn post(&mut self, projection: ProjectionId, event: ModelEvent) {
        self.mailbox.post(Envelope { projection, event });
    }

    /// Delivers an event now, then anything it caused.
    pub fn notify(&mut self, projection: ProjectionId, event: ModelEvent) -> Result<()> {
        self.deliver(Envelope { projection, event })?;
        self.flush()
    }

    /// Delivers queued events until the mailbox is empty.
    pub fn flush(&mut self) -> Result<()> {
        while !self.mailbox.is_empty() {
            for envelope in self.mailbox.take_all() {
                self.deliver(envelope)?;
            }
        }
        Ok(())
    }

    fn deliver(&mut self, envelope: Envelope) -> Result<()> {
        let Some(p) = self.projections.get(envelope.projection) else {
            log::trace!(
                "dropping `{}` for vanished projection {:?}",
                envelope.event.name,
                envelope.projection
            );
            return Ok(());
        };
        let subscribers = p.channel.subscribers(&envelope.event.name);
        for handler in subscribers {
            handler(self, &envelope.event)?;
            // whatever the handler caused drains before the next subscriber
            self.flush()?;
        }
        Ok(())
    }

    // ---- Components ----

    /// Checks `r` out of its arena, runs `f`, and puts it back. `None` when
    /// the component is gone or already running further up the stack.
    pub fn with_component<R>(
        &mut self,
        r: ComponentRef,
        f: impl FnOnce(&mut dyn Component, &mut Model) -> R,
    ) -> Option<R> {
        let Some(mut built) = self.registry.take(r) else {
            if self.registry.is_checked_out(r) {
                log::debug!("{r} is busy; call skipped");
            } else {
                log::trace!("{r} is not registered; call skipped");
            }
            return None;
        };
        let out = f(built.component_mut(), self);
        self.registry.restore(r, built);
        self.settle(r);
        Some(out)
    }

    pub fn with_field<R>(
        &mut self,
        id: FieldId,
        f: impl FnOnce(&mut dyn Field, &mut Model) -> R,
    ) -> Option<R> {
        let Some(mut field) = self.registry.fields.take(id) else {
            log::trace!("{} is not available", ComponentRef::Field(id));
            return None;
        };
        let out = f(&mut *field, self);
        self.registry.fields.fill(id, field);
        self.settle(ComponentRef::Field(id));
        Some(out)
    }

    /// Runs a destroy requested while `r` was checked out.
    pub(crate) fn settle(&mut self, r: ComponentRef) {
        if let Some(pos) = self.deferred.iter().position(|d| *d == r) {
            self.deferred.swap_remove(pos);
            self.destroy(r);
        }
    }

    pub fn component(&self, r: ComponentRef) -> Option<&dyn Component> {
        self.registry.get(r)
    }

    pub fn field(&self, id: FieldId) -> Option<&dyn Field> {
        self.registry.fields.get(id)
    }

    pub fn core_mut(&mut self, r: ComponentRef) -> Option<&mut crate::ComponentCore> {
        self.registry.get_mut(r).map(|c| c.core_mut())
    }

    /// Component registered for exactly this element.
    pub fn resolve_element(&self, handle: VisualHandle) -> Option<ComponentRef> {
        self.registry.resolve_element(handle)
    }

    /// Innermost component whose element is `handle` or one of its ancestors.
    pub fn owner_of(&self, handle: VisualHandle) -> Option<ComponentRef> {
        let mut current = Some(handle);
        while let Some(h) = current {
            if let Some(r) = self.registry.resolve_element(h) {
                return Some(r);
            }
            current = self.target.parent(h);
        }
        None
    }

    /// First visible component at or below `handle` that can take focus.
    pub fn focusable_within(&self, handle: VisualHandle) -> Option<ComponentRef> {
        if !self.target.is_visible(handle) {
            return None;
        }
        if let Some(r) = self.registry.resolve_element(handle)
            && self.can_focus(r)
        {
            return Some(r);
        }
        self.target
            .children(handle)
            .into_iter()
            .find_map(|child| self.focusable_within(child))
    }

    /// Whether focusing `r` would land somewhere: it is focusable itself or
    /// has a visible focusable descendant.
    pub fn can_focus(&self, r: ComponentRef) -> bool {
        let Some(c) = self.component(r) else {
            return false;
        };
        let core = c.core();
        if core.is_destroyed() || core.element.is_some_and(|e| !self.target.is_visible(e)) {
            return false;
        }
        core.is_focusable()
            || (!core.flags.contains(crate::Flags::COLLAPSED)
                && self.first_focusable(&core.children).is_some())
    }

    pub fn first_focusable(&self, children: &[Child]) -> Option<ComponentRef> {
        children
            .iter()
            .flat_map(|child| self.child_components(*child))
            .find(|r| self.can_focus(*r))
    }

    /// Components a child stands for: itself, or a nested projection's roots.
    pub fn child_components(&self, child: Child) -> Vec<ComponentRef> {
        match child {
            Child::Component(r) => vec![r],
            Child::Projection(id) => self
                .projections
                .get(id)
                .map(|p| {
                    p.roots
                        .iter()
                        .flat_map(|root| self.child_components(*root))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Element a child is rendered as.
    pub fn child_element(&self, child: Child) -> Option<VisualHandle> {
        match child {
            Child::Component(r) => self.component(r).and_then(|c| c.core().element),
            Child::Projection(id) => self.projections.get(id).and_then(|p| p.element),
        }
    }

    /// Destroys `r` and everything it owns. A component that is currently
    /// running is destroyed as soon as it returns.
    pub fn destroy(&mut self, r: ComponentRef) {
        if self.registry.is_checked_out(r) {
            if !self.deferred.contains(&r) {
                self.deferred.push(r);
            }
            return;
        }
        let Some(mut built) = self.registry.take(r) else {
            return;
        };
        let c = built.component_mut();
        if self.focused == Some(r) {
            // leaving focus is where pending edits commit
            self.focused = None;
            c.focus_out(self);
        }
        c.destroy(self);
        let children: Vec<Child> = c.core_mut().children.drain(..).collect();
        for child in children {
            self.discard(child);
        }
        let cancelled = self.timers.cancel_owned(r);
        if cancelled > 0 {
            log::trace!("cancelled {cancelled} timer(s) of {r}");
        }
        if self.focused == Some(r) {
            self.focused = None;
        }
        if let Some(element) = c.core().element {
            self.target.remove(element);
        }
        c.core_mut().state = Lifecycle::Destroyed;
        self.registry.release(r);
        log::trace!("destroyed {r}");
    }

    pub fn discard(&mut self, child: Child) {
        match child {
            Child::Component(r) => self.destroy(r),
            Child::Projection(id) => self.drop_projection(id),
        }
    }

    /// Replaces `old` among the children of `owner` (or among the roots of
    /// `projection` when there is no owner) with `new`, keeping its position.
    pub fn replace_child(
        &mut self,
        owner: Option<ComponentRef>,
        projection: ProjectionId,
        old: Child,
        new: Vec<Child>,
    ) -> bool {
        fn splice(children: &mut Vec<Child>, old: Child, new: Vec<Child>) -> bool {
            match children.iter().position(|c| *c == old) {
                Some(pos) => {
                    children.splice(pos..=pos, new);
                    true
                }
                None => false,
            }
        }
        match owner {
            Some(parent) => match self.core_mut(parent) {
                Some(core) => {
                    let mut children = core.children.to_vec();
                    let done = splice(&mut children, old, new);
                    core.children = children.into_iter().collect();
                    done
                }
                None => {
                    log::debug!("{parent} is not available to adopt a replacement");
                    false
                }
            },
            None => self
                .projections
                .get_mut(projection)
                .is_some_and(|p| splice(&mut p.roots, old, new)),
        }
    }

    // ---- Focus & input ----

    pub fn focused(&self) -> Option<ComponentRef> {
        self.focused
    }

    /// Moves focus to `r`, following delegation. Returns whether some
    /// component accepted. Does not deliver events; see `focus_component`.
    pub fn focus(&mut self, r: ComponentRef, target: Option<VisualHandle>) -> bool {
        let mut current = r;
        let mut target = target;
        for _ in 0..MAX_DELEGATION {
            match self.with_component(current, |c, m| c.focus(m, target)) {
                Some(Focus::Accept) => return self.enter(current),
                Some(Focus::Delegate(next)) => {
                    current = next;
                    target = None;
                }
                Some(Focus::Reject) | None => return false,
            }
        }
        log::warn!("focus delegation from {r} did not settle");
        false
    }

    pub fn focus_component(&mut self, r: ComponentRef) -> Result<bool> {
        let focused = self.focus(r, None);
        self.flush()?;
        Ok(focused)
    }

    fn enter(&mut self, r: ComponentRef) -> bool {
        if self.focused == Some(r) {
            return true;
        }
        self.with_component(r, |c, m| m.claim_focus(c))
            .unwrap_or(false)
    }

    /// Gives focus to a component that is running right now and so cannot
    /// be reached through `focus`.
    pub fn claim_focus(&mut self, me: &mut dyn Component) -> bool {
        let r = me.core().id;
        if self.focused == Some(r) {
            return true;
        }
        if me.core().is_destroyed() {
            return false;
        }
        self.leave();
        self.focused = Some(r);
        me.core_mut().state = Lifecycle::Editing;
        me.focus_in(self);
        if let Some(element) = me.core().element {
            self.target.focus(element);
        }
        true
    }

    fn leave(&mut self) {
        if let Some(previous) = self.focused.take() {
            self.with_component(previous, |c, m| {
                c.focus_out(m);
                if c.core().state == Lifecycle::Editing {
                    c.core_mut().state = Lifecycle::Rendered;
                }
            });
        }
    }

    /// Drops focus, committing whatever the focused component holds.
    pub fn blur(&mut self) -> Result<()> {
        self.leave();
        self.flush()
    }

    /// Routes a key command to the component owning `target` (or the focused
    /// one) and bubbles it up the parent chain until someone handles it.
    pub fn handle(&mut self, command: Command, target: Option<VisualHandle>) -> Result<bool> {
        let start = target.and_then(|h| self.owner_of(h)).or(self.focused);
        let Some(mut current) = start else {
            log::debug!("no component to receive `{}`", command.name());
            return Ok(false);
        };
        let mut origin =
            target.or_else(|| self.component(current).and_then(|c| c.core().element));
        loop {
            let handled = self
                .with_component(current, |c, m| dispatch(c, m, command, origin))
                .unwrap_or(false);
            self.flush()?;
            if handled {
                return Ok(true);
            }
            let Some(core) = self.component(current).map(|c| c.core()) else {
                return Ok(false);
            };
            match core.parent {
                Some(parent) => {
                    origin = core.element;
                    current = parent;
                }
                None => {
                    log::debug!(
                        "`{}` bubbled past the root at {current} unhandled",
                        command.name()
                    );
                    return Ok(false);
                }
            }
        }
    }

    /// Character input for the focused component.
    pub fn input(&mut self, text: &str) -> Result<bool> {
        let Some(r) = self.focused else {
            return Ok(false);
        };
        let handled = self
            .with_component(r, |c, m| c.input(m, text))
            .unwrap_or(false);
        self.flush()?;
        Ok(handled)
    }

    // ---- Values ----

    pub fn set_value(&mut self, id: FieldId, value: Value, commit: bool) -> Result<bool> {
        let accepted = self
            .with_field(id, |f, m| f.set_value(m, value, commit))
            .ok_or(EngineError::Detached(ComponentRef::Field(id)))?;
        self.flush()?;
        Ok(accepted)
    }

    pub fn value(&self, id: FieldId) -> Option<Value> {
        self.field(id).map(|f| f.get_value())
    }

    /// Writes `value` through to `concept`, surfacing a refusal to the host.
    pub fn commit_value(&mut self, concept: &ConceptRef, value: Value) -> Mutation {
        let result = concept.set_value(value);
        if let Err(rejection) = &result {
            log::debug!("`{}` rejected a value: {rejection}", concept.id());
            self.env.notify(&rejection.message, Severity::Error);
        }
        result
    }

    /// Unwraps a concept mutation, surfacing a refusal to the host.
    pub fn mutate<T>(&mut self, result: Mutation<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(rejection) => {
                log::debug!("mutation rejected: {rejection}");
                self.env.notify(&rejection.message, Severity::Error);
                None
            }
        }
    }

    // ---- Timers ----

    /// Time of the last tick; timers are scheduled relative to it.
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn start_timer(&mut self, owner: ComponentRef, interval: Duration) -> TimerId {
        self.timers.start(owner, interval, self.now)
    }

    pub fn cancel_timer(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Fires every timer due at `now`. Returns how many fired.
    pub fn tick(&mut self, now: Instant) -> Result<usize> {
        self.now = now;
        let due = self.timers.fire_due(now);
        let fired = due.len();
        for (timer, owner) in due {
            self.with_component(owner, |c, m| c.on_timer(m, timer));
        }
        self.flush()?;
        Ok(fired)
    }

    // ---- Inspection ----

    pub fn outline(&self, r: ComponentRef) -> Option<Outline> {
        let c = self.component(r)?;
        Some(Outline {
            kind: r.kind(),
            variant: c.core().variant.clone(),
            children: c
                .core()
                .children
                .iter()
                .flat_map(|child| self.child_outline(*child))
                .collect(),
        })
    }

    pub fn projection_outline(&self, id: ProjectionId) -> Vec<Outline> {
        self.projections
            .get(id)
            .map(|p| {
                p.roots
                    .iter()
                    .flat_map(|root| self.child_outline(*root))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn child_outline(&self, child: Child) -> Vec<Outline> {
        match child {
            Child::Component(r) => self.outline(r).into_iter().collect(),
            Child::Projection(id) => self.projection_outline(id),
        }
    }
}
