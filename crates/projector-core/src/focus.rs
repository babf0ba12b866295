//! Directional focus navigation.
//!
//! A query "move `dir` from `origin`" is answered inside the origin's
//! immediate container: siblings entirely inside the half-plane on the `dir`
//! side are ranked by the distance between centers, ties going to the earlier
//! sibling. When a container has nothing to offer, the owning component
//! bubbles the query to its parent with its own element as the new origin
//! (see `Model::handle`).

use crate::{Direction, Model, SpatialIndex, VisualHandle};

/// Siblings of `origin` inside `container` lying in direction `dir`, nearest
/// first. Hidden siblings are skipped.
pub fn rank_in_direction<S: SpatialIndex + ?Sized>(
    index: &S,
    container: VisualHandle,
    origin: VisualHandle,
    dir: Direction,
) -> Vec<VisualHandle> {
    let Some(from) = index.bounds(origin) else {
        return Vec::new();
    };
    let anchor = from.center();
    let mut ranked: Vec<(VisualHandle, f32)> = index
        .children(container)
        .into_iter()
        .filter(|&child| child != origin && index.is_visible(child))
        .filter_map(|child| index.bounds(child).map(|rect| (child, rect)))
        .filter(|(_, rect)| from.faces(rect, dir))
        .map(|(child, rect)| (child, anchor.distance(rect.center())))
        .collect();
    // stable: document order breaks ties
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.into_iter().map(|(h, _)| h).collect()
}

/// Ancestor-or-self of `handle` that is a direct child of `container`.
pub fn direct_child<S: SpatialIndex + ?Sized>(
    index: &S,
    container: VisualHandle,
    handle: VisualHandle,
) -> Option<VisualHandle> {
    let mut current = handle;
    loop {
        let parent = index.parent(current)?;
        if parent == container {
            return Some(current);
        }
        current = parent;
    }
}

/// Whether `handle` is `ancestor` or lies inside it.
pub fn is_within<S: SpatialIndex + ?Sized>(
    index: &S,
    ancestor: VisualHandle,
    handle: VisualHandle,
) -> bool {
    let mut current = Some(handle);
    while let Some(h) = current {
        if h == ancestor {
            return true;
        }
        current = index.parent(h);
    }
    false
}

impl Model {
    /// Focuses the nearest focusable sibling of `origin` in `container`.
    /// Returns `false`, without side effects, when there is none.
    pub fn focus_nearest(
        &mut self,
        container: VisualHandle,
        origin: Option<VisualHandle>,
        dir: Direction,
    ) -> bool {
        let Some(origin) = origin else {
            return false;
        };
        let origin = direct_child(self.target(), container, origin).unwrap_or(origin);
        let candidates = rank_in_direction(self.target(), container, origin, dir);
        candidates
            .into_iter()
            .any(|candidate| self.focus_element(candidate))
    }

    /// Focuses the first focusable component owning `handle` or found inside it.
    pub fn focus_element(&mut self, handle: VisualHandle) -> bool {
        match self.focusable_within(handle) {
            Some(owner) => self.focus(owner, None),
            None => false,
        }
    }
}
