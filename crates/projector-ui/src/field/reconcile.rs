//! Keeps one visual item per element of a collection concept, in model
//! order, under `value.added`, `value.removed`, `value.swapped` and wholesale
//! `value.changed`.
//!
//! Items are wrapper containers inside one container element, so inserting,
//! removing and swapping only ever touch direct children. Each wrapper
//! carries a `data-index` attribute re-read from the concept after every
//! transition rather than adjusted locally.

use projector_core::{
    Binding, Child, ComponentCore, ConceptId, ConceptRef, EngineError, Model, Primitive,
    ProjectionId, VisualHandle, is_within,
};

use super::Column;

/// What one item is made of.
#[derive(Clone, Debug)]
pub enum ItemShape {
    /// A nested projection of the element, restricted to `tag`.
    Projection { tag: Option<String> },
    /// One cell per column, each resolved against the element concept.
    Row { columns: Vec<Column> },
}

pub struct Item {
    pub concept: ConceptRef,
    pub element: VisualHandle,
    pub children: Vec<Child>,
}

impl Item {
    fn is(&self, id: &ConceptId) -> bool {
        self.concept.id() == *id
    }
}

pub struct ItemList {
    items: Vec<Item>,
    container: Option<VisualHandle>,
    shape: ItemShape,
}

impl ItemList {
    pub fn new(shape: ItemShape) -> Self {
        Self {
            items: Vec::new(),
            container: None,
            shape,
        }
    }

    pub fn attach(&mut self, container: VisualHandle) {
        self.container = Some(container);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn ids(&self) -> Vec<ConceptId> {
        self.items.iter().map(|i| i.concept.id()).collect()
    }

    pub fn index_of(&self, id: &ConceptId) -> Option<usize> {
        self.items.iter().position(|i| i.is(id))
    }

    /// Item whose wrapper is `handle` or contains it.
    pub fn position_of(&self, model: &Model, handle: VisualHandle) -> Option<usize> {
        self.items
            .iter()
            .position(|i| is_within(model.target(), i.element, handle))
    }

    /// Whether every item still has its element in `source`, items follow
    /// the collection's order and the container holds exactly the item
    /// wrappers. Elements skipped for lack of a projection have no item.
    pub fn is_synchronized(&self, model: &Model, source: &ConceptRef) -> bool {
        let order = element_order(source);
        let ranks: Option<Vec<usize>> = self.items.iter().map(|i| rank(&order, i)).collect();
        let Some(ranks) = ranks else {
            return false;
        };
        if !ranks.windows(2).all(|w| w[0] < w[1]) {
            return false;
        }
        let Some(container) = self.container else {
            return self.items.is_empty();
        };
        let visual = model.target().children(container);
        visual.len() == self.items.len()
            && visual.iter().zip(&self.items).all(|(v, i)| *v == i.element)
    }

    /// Components and projections the items own, in item order.
    pub fn children(&self) -> Vec<Child> {
        self.items
            .iter()
            .flat_map(|i| i.children.iter().copied())
            .collect()
    }

    /// Clears every item and builds one per current element.
    pub fn rebuild(&mut self, model: &mut Model, host: &mut ComponentCore) -> Result<(), EngineError> {
        for item in std::mem::take(&mut self.items) {
            release(model, host.projection, item);
        }
        for element in host.source.elements() {
            if let Some(item) = self.build(model, host, element)? {
                if let Some(container) = self.container {
                    model.target_mut().append(container, item.element);
                }
                self.items.push(item);
            }
        }
        self.finish(model, host);
        Ok(())
    }

    /// Builds the item of a new element. It goes after the last item whose
    /// element precedes it in the collection, so events queued behind this
    /// one cannot put it out of order. Returns the item's final position.
    pub fn added(
        &mut self,
        model: &mut Model,
        host: &mut ComponentCore,
        element: ConceptRef,
    ) -> Result<Option<usize>, EngineError> {
        let id = element.id();
        if self.index_of(&id).is_some() {
            log::debug!("`{id}` already has an item");
            return Ok(None);
        }
        let order = element_order(&host.source);
        let Some(at_rank) = order.iter().position(|e| *e == id) else {
            log::debug!("`{id}` left the collection before its item was built");
            return Ok(None);
        };
        let at = self
            .items
            .iter()
            .rposition(|i| rank(&order, i).is_some_and(|r| r < at_rank))
            .map_or(0, |p| p + 1);
        let Some(item) = self.build(model, host, element)? else {
            return Ok(None);
        };
        if let Some(container) = self.container {
            model.target_mut().insert(container, at, item.element);
        }
        self.items.insert(at, item);
        self.settle(model, host)?;
        Ok(self.index_of(&id))
    }

    pub fn removed(
        &mut self,
        model: &mut Model,
        host: &mut ComponentCore,
        element: &ConceptRef,
    ) -> Result<Option<usize>, EngineError> {
        let Some(at) = self.index_of(&element.id()) else {
            log::debug!("`{}` has no item to remove", element.id());
            return Ok(None);
        };
        let item = self.items.remove(at);
        release(model, host.projection, item);
        self.settle(model, host)?;
        Ok(Some(at))
    }

    /// `a` and `b` traded places in the collection. The items are put back
    /// into collection order as it stands now, which also covers swaps
    /// still queued behind this one. Returns whether anything moved.
    pub fn swapped(
        &mut self,
        model: &mut Model,
        host: &mut ComponentCore,
        a: &ConceptRef,
        b: &ConceptRef,
    ) -> Result<bool, EngineError> {
        if self.index_of(&a.id()).is_none() || self.index_of(&b.id()).is_none() {
            log::debug!("swap of `{}` and `{}` does not match the items", a.id(), b.id());
        }
        let moved = self.align(model, &host.source);
        self.settle(model, host)?;
        Ok(moved)
    }

    /// Drops every item with its content.
    pub fn clear(&mut self, model: &mut Model, projection: ProjectionId) {
        for item in std::mem::take(&mut self.items) {
            release(model, projection, item);
        }
    }

    /// Brings items back into collection order, then checks the result.
    /// Items whose element is already gone keep their slot until their own
    /// `value.removed` arrives; once none is left, any remaining drift is
    /// repaired by a rebuild.
    fn settle(&mut self, model: &mut Model, host: &mut ComponentCore) -> Result<(), EngineError> {
        self.align(model, &host.source);
        self.finish(model, host);
        let order = element_order(&host.source);
        let settled = self.items.iter().all(|i| rank(&order, i).is_some());
        if settled && !self.is_synchronized(model, &host.source) {
            log::warn!("items of `{}` drifted from the collection; rebuilding", host.source.id());
            return self.rebuild(model, host);
        }
        Ok(())
    }

    fn finish(&self, model: &mut Model, host: &mut ComponentCore) {
        self.restamp(model, &host.source);
        host.children = self.children().into_iter().collect();
    }

    /// Reorders the items still in the collection to match it, leaving
    /// departed ones in their slots. Returns whether anything moved.
    fn align(&mut self, model: &mut Model, source: &ConceptRef) -> bool {
        let order = element_order(source);
        let ranked: Vec<(usize, usize)> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(slot, item)| rank(&order, item).map(|r| (slot, r)))
            .collect();
        let mut sorted = ranked.clone();
        sorted.sort_by_key(|&(_, r)| r);
        if ranked.iter().zip(&sorted).all(|(a, b)| a.0 == b.0) {
            return false;
        }
        let mut taken: Vec<Option<Item>> = std::mem::take(&mut self.items)
            .into_iter()
            .map(Some)
            .collect();
        let mut placed: Vec<Option<Item>> = (0..taken.len()).map(|_| None).collect();
        for (&(slot, _), &(from, _)) in ranked.iter().zip(&sorted) {
            placed[slot] = taken[from].take();
        }
        for (slot, item) in placed.iter_mut().enumerate() {
            if item.is_none() {
                *item = taken[slot].take();
            }
        }
        self.items = placed.into_iter().flatten().collect();
        if let Some(container) = self.container {
            for (i, item) in self.items.iter().enumerate() {
                model.target_mut().insert(container, i, item.element);
            }
        }
        true
    }

    fn restamp(&self, model: &mut Model, source: &ConceptRef) {
        let order = element_order(source);
        for item in &self.items {
            let index = rank(&order, item).map_or_else(String::new, |i| i.to_string());
            model
                .target_mut()
                .set_attribute(item.element, "data-index", &index);
        }
    }

    fn build(
        &self,
        model: &mut Model,
        host: &ComponentCore,
        element: ConceptRef,
    ) -> Result<Option<Item>, EngineError> {
        match &self.shape {
            ItemShape::Projection { tag } => {
                if !model.has_schema(element.name(), tag.as_deref()) {
                    log::debug!("no projection for `{}`; item skipped", element.name());
                    return Ok(None);
                }
                let wrapper = model.target_mut().create(
                    Primitive::container()
                        .class("item")
                        .attr("data-concept", element.id().0),
                );
                match model.resolve_projection(element.clone(), tag.as_deref(), Some(host.id)) {
                    Ok(resolution) => {
                        for handle in model.materialize(&resolution) {
                            model.target_mut().append(wrapper, handle);
                        }
                        Ok(Some(Item {
                            concept: element,
                            element: wrapper,
                            children: resolution.children(),
                        }))
                    }
                    Err(e) => {
                        model.target_mut().remove(wrapper);
                        Err(e)
                    }
                }
            }
            ItemShape::Row { columns } => {
                let row = model.target_mut().create(
                    Primitive::container()
                        .class("item")
                        .class("row")
                        .class("horizontal")
                        .attr("data-concept", element.id().0),
                );
                let binding = Binding {
                    projection: host.projection,
                    concept: element.clone(),
                    parent: Some(host.id),
                };
                let mut children = Vec::new();
                for column in columns {
                    let cell = model.target_mut().create(Primitive::container().class("cell"));
                    model.target_mut().append(row, cell);
                    match model.resolve_value(&column.content, &binding) {
                        Ok(resolution) => {
                            for handle in model.materialize(&resolution) {
                                model.target_mut().append(cell, handle);
                            }
                            children.extend(resolution.children());
                        }
                        Err(e) => {
                            for child in children {
                                model.discard(child);
                            }
                            model.target_mut().remove(row);
                            return Err(e);
                        }
                    }
                }
                Ok(Some(Item {
                    concept: element,
                    element: row,
                    children,
                }))
            }
        }
    }
}

fn element_order(source: &ConceptRef) -> Vec<ConceptId> {
    source.elements().iter().map(|e| e.id()).collect()
}

fn rank(order: &[ConceptId], item: &Item) -> Option<usize> {
    order.iter().position(|id| item.is(id))
}

/// Discards an item's content and stops `projection` observing its element.
fn release(model: &mut Model, projection: ProjectionId, item: Item) {
    for child in item.children {
        model.discard(child);
    }
    model.target_mut().remove(item.element);
    model.unobserve(projection, &item.concept);
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use projector_core::{Concept, ComponentNode, ComponentRef, LogEnvironment, ProjectionSchema};
    use projector_devtools::{HeadlessTarget, MemoryConcept};
    use serde_json::json;

    use super::*;

    struct Fixture {
        model: Model,
        host: ComponentCore,
        items: ItemList,
        list: Rc<MemoryConcept>,
    }

    /// A table-shaped item list over `ids`, one binary cell per row.
    fn fixture(ids: &[&str]) -> Fixture {
        let mut model = Model::new(Box::new(HeadlessTarget::new()), Box::new(LogEnvironment));
        crate::install(&mut model);
        model.register_projection(
            "list",
            ProjectionSchema::new(json!({ "type": "static", "static": { "type": "text" } })),
        );
        let list = MemoryConcept::list("l", "list", "item", ids);
        let projection = model.create_projection(list.clone(), None, None).unwrap();
        let binding = Binding {
            projection,
            concept: list.clone(),
            parent: None,
        };
        let mut host = ComponentCore::new(
            ComponentRef::Field(Default::default()),
            &ComponentNode::new("table"),
            &binding,
        );
        let mut items = ItemList::new(ItemShape::Row {
            columns: vec![Column {
                header: String::new(),
                content: json!({ "type": "field", "field": { "type": "binary" } }),
            }],
        });
        let container = model.target_mut().create(Primitive::container());
        items.attach(container);
        items.rebuild(&mut model, &mut host).unwrap();
        Fixture {
            model,
            host,
            items,
            list,
        }
    }

    fn element(list: &MemoryConcept, index: usize) -> ConceptRef {
        list.element_at(index).unwrap()
    }

    fn ids(f: &Fixture) -> Vec<String> {
        f.items.ids().into_iter().map(|id| id.0).collect()
    }

    #[test]
    fn test_is_synchronized_tracks_collection_order() {
        let mut f = fixture(&["a", "b", "c"]);
        let source: ConceptRef = f.list.clone();
        assert!(f.items.is_synchronized(&f.model, &source));

        f.list.swap_element(0, 2).unwrap();
        assert!(!f.items.is_synchronized(&f.model, &source));

        let (a, c) = (element(&f.list, 2), element(&f.list, 0));
        assert!(f.items.swapped(&mut f.model, &mut f.host, &a, &c).unwrap());
        assert_eq!(ids(&f), ["c", "b", "a"]);
        assert!(f.items.is_synchronized(&f.model, &source));
    }

    #[test]
    fn test_visual_drift_is_repaired_by_rebuild() {
        let mut f = fixture(&["a", "b"]);
        let source: ConceptRef = f.list.clone();
        let (first, second) = (f.items.get(0).unwrap().element, f.items.get(1).unwrap().element);
        f.model.target_mut().swap(first, second);
        assert!(!f.items.is_synchronized(&f.model, &source));

        // any transition checks the result once every item is accounted for
        let (a, b) = (element(&f.list, 0), element(&f.list, 1));
        f.items.swapped(&mut f.model, &mut f.host, &a, &b).unwrap();

        assert!(f.items.is_synchronized(&f.model, &source));
        assert_eq!(ids(&f), ["a", "b"]);
    }

    #[test]
    fn test_queued_inserts_land_in_collection_order() {
        let mut f = fixture(&["a", "b"]);
        f.list.insert_element_at(1, MemoryConcept::new("z", "item"));
        f.list.insert_element_at(1, MemoryConcept::new("w", "item"));

        let (z, w) = (element(&f.list, 2), element(&f.list, 1));
        assert_eq!(f.items.added(&mut f.model, &mut f.host, z).unwrap(), Some(1));
        assert_eq!(f.items.added(&mut f.model, &mut f.host, w).unwrap(), Some(1));

        assert_eq!(ids(&f), ["a", "w", "z", "b"]);
        let source: ConceptRef = f.list.clone();
        assert!(f.items.is_synchronized(&f.model, &source));
    }

    #[test]
    fn test_added_element_already_gone_is_skipped() {
        let mut f = fixture(&["a"]);
        let gone = MemoryConcept::new("gone", "item");
        f.list.push_element(gone.clone());
        f.list.remove_element_at(1).unwrap();

        assert_eq!(f.items.added(&mut f.model, &mut f.host, gone).unwrap(), None);
        assert_eq!(ids(&f), ["a"]);
    }

    #[test]
    fn test_removed_item_is_no_longer_observed() {
        let mut f = fixture(&["a", "b"]);
        let a = f.list.element_at(0).unwrap();
        let projection = f.host.projection;
        assert!(f.model.projection(projection).unwrap().is_observing(&a.id()));
        assert_eq!(a.observer_count(), 1);

        f.list.remove_element_at(0).unwrap();
        let gone: ConceptRef = a.clone();
        assert_eq!(f.items.removed(&mut f.model, &mut f.host, &gone).unwrap(), Some(0));

        assert!(!f.model.projection(projection).unwrap().is_observing(&a.id()));
        assert_eq!(a.observer_count(), 0);
        // the collection itself stays observed
        assert!(f.model.projection(projection).unwrap().is_observing(&f.list.id()));
    }
}
