//! In-memory render target.
//!
//! Elements live in a slotmap tree. Geometry is a simple flow layout computed
//! on demand: a leaf is as wide as its text (at least one cell) and one cell
//! tall; a container carrying the `horizontal` class lays its children out
//! in a row, any other container stacks them in a column. Explicit bounds set
//! with [`HeadlessTarget::set_bounds`] win over the flow.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use projector_core::{Primitive, PrimitiveKind, Rect, RenderTarget, SpatialIndex, VisualHandle};
use slotmap::SlotMap;

#[derive(Clone, Debug)]
pub struct Element {
    pub kind: PrimitiveKind,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub parent: Option<VisualHandle>,
    pub children: Vec<VisualHandle>,
}

impl Element {
    fn new(primitive: Primitive) -> Self {
        Self {
            kind: primitive.kind,
            classes: primitive.classes,
            text: primitive.text,
            attributes: primitive.attributes,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Text content of an element and its descendants, in document order.
pub fn text_content<T: RenderTarget + ?Sized>(target: &T, handle: VisualHandle) -> String {
    let mut out = String::new();
    collect_text(target, handle, &mut out);
    out
}

fn collect_text<T: RenderTarget + ?Sized>(target: &T, handle: VisualHandle, out: &mut String) {
    if let Some(text) = target.text(handle) {
        out.push_str(&text);
    }
    for child in target.children(handle) {
        collect_text(target, child, out);
    }
}

/// Indented tree of kinds, classes and text, for snapshots.
pub fn dump<T: RenderTarget + ?Sized>(target: &T, handle: VisualHandle) -> String {
    let mut out = String::new();
    dump_into(target, handle, 0, &mut out);
    out
}

fn dump_into<T: RenderTarget + ?Sized>(
    target: &T,
    handle: VisualHandle,
    depth: usize,
    out: &mut String,
) {
    let Some(primitive) = target.primitive(handle) else {
        return;
    };
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!("{:?}", primitive.kind).to_lowercase());
    if !primitive.classes.is_empty() {
        out.push('.');
        out.push_str(&primitive.classes.join("."));
    }
    if let Some(text) = &primitive.text {
        out.push_str(&format!(" {text:?}"));
    }
    out.push('\n');
    for child in target.children(handle) {
        dump_into(target, child, depth + 1, out);
    }
}

/// Shared record of every `focus` call the target received, in order.
#[derive(Clone, Debug, Default)]
pub struct FocusLog(Rc<RefCell<Vec<VisualHandle>>>);

impl FocusLog {
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn last(&self) -> Option<VisualHandle> {
        self.0.borrow().last().copied()
    }

    pub fn take(&self) -> Vec<VisualHandle> {
        self.0.borrow_mut().drain(..).collect()
    }
}

#[derive(Default)]
pub struct HeadlessTarget {
    nodes: SlotMap<VisualHandle, Element>,
    overrides: HashMap<VisualHandle, Rect>,
    layout: RefCell<Option<HashMap<VisualHandle, Rect>>>,
    focus_log: FocusLog,
}

impl HeadlessTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus_log(&self) -> FocusLog {
        self.focus_log.clone()
    }

    pub fn element(&self, handle: VisualHandle) -> Option<&Element> {
        self.nodes.get(handle)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pins the bounds of an element, bypassing the flow layout.
    pub fn set_bounds(&mut self, handle: VisualHandle, rect: Rect) {
        self.overrides.insert(handle, rect);
        self.invalidate();
    }

    fn invalidate(&self) {
        self.layout.borrow_mut().take();
    }

    fn detach(&mut self, handle: VisualHandle) {
        let parent = self.nodes.get(handle).and_then(|el| el.parent);
        if let Some(parent) = parent
            && let Some(p) = self.nodes.get_mut(parent)
        {
            p.children.retain(|c| *c != handle);
        }
        if let Some(el) = self.nodes.get_mut(handle) {
            el.parent = None;
        }
    }

    fn measure(&self, handle: VisualHandle, sizes: &mut HashMap<VisualHandle, (f32, f32)>) -> (f32, f32) {
        let Some(el) = self.nodes.get(handle) else {
            return (0.0, 0.0);
        };
        let size = if let Some(rect) = self.overrides.get(&handle) {
            for child in &el.children {
                self.measure(*child, sizes);
            }
            (rect.w, rect.h)
        } else if el.children.is_empty() {
            let chars = el.text.as_deref().map_or(0, |t| t.chars().count());
            (chars.max(1) as f32, 1.0)
        } else {
            let horizontal = el.has_class("horizontal");
            let (mut w, mut h) = (0.0_f32, 0.0_f32);
            for child in &el.children {
                let (cw, ch) = self.measure(*child, sizes);
                if horizontal {
                    w += cw;
                    h = h.max(ch);
                } else {
                    w = w.max(cw);
                    h += ch;
                }
            }
            (w, h)
        };
        sizes.insert(handle, size);
        size
    }

    fn place(
        &self,
        handle: VisualHandle,
        x: f32,
        y: f32,
        sizes: &HashMap<VisualHandle, (f32, f32)>,
        out: &mut HashMap<VisualHandle, Rect>,
    ) {
        let Some(el) = self.nodes.get(handle) else {
            return;
        };
        let rect = self.overrides.get(&handle).copied().unwrap_or_else(|| {
            let (w, h) = sizes.get(&handle).copied().unwrap_or_default();
            Rect::new(x, y, w, h)
        });
        out.insert(handle, rect);
        let horizontal = el.has_class("horizontal");
        let (mut cx, mut cy) = (rect.x, rect.y);
        for child in &el.children {
            self.place(*child, cx, cy, sizes, out);
            let (cw, ch) = sizes.get(child).copied().unwrap_or_default();
            if horizontal {
                cx += cw;
            } else {
                cy += ch;
            }
        }
    }

    fn compute_layout(&self) -> HashMap<VisualHandle, Rect> {
        let mut sizes = HashMap::new();
        let mut out = HashMap::new();
        let mut y = 0.0;
        let roots: Vec<VisualHandle> = self
            .nodes
            .iter()
            .filter(|(_, el)| el.parent.is_none())
            .map(|(h, _)| h)
            .collect();
        for root in roots {
            let (_, h) = self.measure(root, &mut sizes);
            self.place(root, 0.0, y, &sizes, &mut out);
            y += h;
        }
        out
    }
}

impl SpatialIndex for HeadlessTarget {
    fn parent(&self, handle: VisualHandle) -> Option<VisualHandle> {
        self.nodes.get(handle)?.parent
    }

    fn children(&self, handle: VisualHandle) -> Vec<VisualHandle> {
        self.nodes
            .get(handle)
            .map(|el| el.children.clone())
            .unwrap_or_default()
    }

    fn bounds(&self, handle: VisualHandle) -> Option<Rect> {
        if !self.nodes.contains_key(handle) {
            return None;
        }
        let mut layout = self.layout.borrow_mut();
        let layout = layout.get_or_insert_with(|| self.compute_layout());
        layout.get(&handle).copied()
    }

    fn is_visible(&self, handle: VisualHandle) -> bool {
        let Some(el) = self.nodes.get(handle) else {
            return false;
        };
        if el.has_class("hidden") {
            return false;
        }
        let mut current = el.parent;
        while let Some(h) = current {
            let Some(ancestor) = self.nodes.get(h) else {
                break;
            };
            if ancestor.has_class("hidden") || ancestor.has_class("collapsed") {
                return false;
            }
            current = ancestor.parent;
        }
        true
    }
}

impl RenderTarget for HeadlessTarget {
    fn create(&mut self, primitive: Primitive) -> VisualHandle {
        self.invalidate();
        self.nodes.insert(Element::new(primitive))
    }

    fn append(&mut self, parent: VisualHandle, child: VisualHandle) {
        let end = self.nodes.get(parent).map_or(0, |p| p.children.len());
        self.insert(parent, end, child);
    }

    fn insert(&mut self, parent: VisualHandle, index: usize, child: VisualHandle) {
        if parent == child || !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            log::warn!("insert of {child:?} into {parent:?} ignored");
            return;
        }
        self.detach(child);
        if let Some(p) = self.nodes.get_mut(parent) {
            let index = index.min(p.children.len());
            p.children.insert(index, child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
        self.invalidate();
    }

    fn remove(&mut self, handle: VisualHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.detach(handle);
        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            if let Some(el) = self.nodes.remove(h) {
                stack.extend(el.children);
            }
            self.overrides.remove(&h);
        }
        self.invalidate();
    }

    fn replace(&mut self, old: VisualHandle, new: VisualHandle) {
        match (self.parent(old), self.position(old)) {
            (Some(parent), Some(index)) => {
                self.insert(parent, index, new);
                self.remove(old);
            }
            _ => log::debug!("replace of detached {old:?} ignored"),
        }
    }

    fn swap(&mut self, a: VisualHandle, b: VisualHandle) {
        let (Some(pa), Some(pb)) = (self.parent(a), self.parent(b)) else {
            return;
        };
        if pa != pb {
            log::debug!("swap of non-siblings {a:?} and {b:?} ignored");
            return;
        }
        if let Some(p) = self.nodes.get_mut(pa) {
            let ia = p.children.iter().position(|c| *c == a);
            let ib = p.children.iter().position(|c| *c == b);
            if let (Some(ia), Some(ib)) = (ia, ib) {
                p.children.swap(ia, ib);
            }
        }
        self.invalidate();
    }

    fn position(&self, handle: VisualHandle) -> Option<usize> {
        let parent = self.parent(handle)?;
        self.nodes.get(parent)?.children.iter().position(|c| *c == handle)
    }

    fn set_text(&mut self, handle: VisualHandle, text: &str) {
        if let Some(el) = self.nodes.get_mut(handle) {
            el.text = Some(text.to_string());
            self.invalidate();
        }
    }

    fn text(&self, handle: VisualHandle) -> Option<String> {
        self.nodes.get(handle)?.text.clone()
    }

    fn set_attribute(&mut self, handle: VisualHandle, name: &str, value: &str) {
        if let Some(el) = self.nodes.get_mut(handle) {
            match el.attributes.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => el.attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn attribute(&self, handle: VisualHandle, name: &str) -> Option<String> {
        self.nodes.get(handle)?.attribute(name).map(str::to_string)
    }

    fn set_class(&mut self, handle: VisualHandle, class: &str, on: bool) {
        if let Some(el) = self.nodes.get_mut(handle) {
            let present = el.has_class(class);
            if on && !present {
                el.classes.push(class.to_string());
            } else if !on && present {
                el.classes.retain(|c| c != class);
            }
        }
    }

    fn has_class(&self, handle: VisualHandle, class: &str) -> bool {
        self.nodes.get(handle).is_some_and(|el| el.has_class(class))
    }

    fn primitive(&self, handle: VisualHandle) -> Option<Primitive> {
        self.nodes.get(handle).map(|el| Primitive {
            kind: el.kind,
            classes: el.classes.clone(),
            text: el.text.clone(),
            attributes: el.attributes.clone(),
        })
    }

    fn focus(&mut self, handle: VisualHandle) {
        self.focus_log.0.borrow_mut().push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projector_core::Direction;

    fn row(target: &mut HeadlessTarget, labels: &[&str]) -> (VisualHandle, Vec<VisualHandle>) {
        let row = target.create(Primitive::container().class("horizontal"));
        let cells = labels
            .iter()
            .map(|l| {
                let cell = target.create(Primitive::text_node(*l));
                target.append(row, cell);
                cell
            })
            .collect();
        (row, cells)
    }

    #[test]
    fn test_flow_layout() {
        let mut target = HeadlessTarget::new();
        let column = target.create(Primitive::container());
        let (first, cells) = row(&mut target, &["ab", "cde"]);
        let (second, _) = row(&mut target, &["x"]);
        target.append(column, first);
        target.append(column, second);

        assert_eq!(target.bounds(cells[0]), Some(Rect::new(0.0, 0.0, 2.0, 1.0)));
        assert_eq!(target.bounds(cells[1]), Some(Rect::new(2.0, 0.0, 3.0, 1.0)));
        assert_eq!(target.bounds(second), Some(Rect::new(0.0, 1.0, 1.0, 1.0)));
        assert_eq!(target.bounds(column), Some(Rect::new(0.0, 0.0, 5.0, 2.0)));
    }

    #[test]
    fn test_nearest_in_row() {
        let mut target = HeadlessTarget::new();
        let (row, cells) = row(&mut target, &["a", "b", "c"]);
        assert_eq!(
            target.nearest_in_direction(row, cells[0], Direction::Right),
            Some(cells[1])
        );
        assert_eq!(target.nearest_in_direction(row, cells[2], Direction::Right), None);
        assert_eq!(target.nearest_in_direction(row, cells[1], Direction::Up), None);
    }

    #[test]
    fn test_collapsed_hides_descendants_only() {
        let mut target = HeadlessTarget::new();
        let (row, cells) = row(&mut target, &["a"]);
        target.set_class(row, "collapsed", true);
        assert!(target.is_visible(row));
        assert!(!target.is_visible(cells[0]));
        target.set_class(row, "collapsed", false);
        target.set_class(cells[0], "hidden", true);
        assert!(!target.is_visible(cells[0]));
    }

    #[test]
    fn test_swap_replace_remove() {
        let mut target = HeadlessTarget::new();
        let (row, cells) = row(&mut target, &["a", "b", "c"]);
        target.swap(cells[0], cells[2]);
        assert_eq!(text_content(&target, row), "cba");

        let z = target.create(Primitive::text_node("z"));
        target.replace(cells[1], z);
        assert_eq!(text_content(&target, row), "cza");
        assert!(target.element(cells[1]).is_none());

        target.remove(row);
        assert_eq!(target.len(), 0);
    }

    #[test]
    fn test_dump() {
        let mut target = HeadlessTarget::new();
        let (row, _) = row(&mut target, &["a", "b"]);
        insta::assert_snapshot!(dump(&target, row), @r###"
        container.horizontal
          text "a"
          text "b"
        "###);
    }
}
