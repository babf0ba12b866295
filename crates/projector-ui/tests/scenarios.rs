mod common;

use std::cell::RefCell;
use std::rc::Rc;

use projector_core::{ComponentRef, Concept, ConceptRef, Field, VALUE_CHANGED, Value};
use projector_devtools::MemoryConcept;
use serde_json::json;

use common::{Harness, item, items};

fn list_view(h: &mut Harness) {
    h.view("list", json!({ "type": "field", "field": { "type": "list" } }));
    h.view("item", json!({ "type": "property", "name": "label" }));
}

/// Checks that the list field's items mirror the concept's elements, and
/// that every wrapper carries its current index.
fn assert_synchronized(h: &Harness, pid: projector_core::ProjectionId, list: &Rc<MemoryConcept>) {
    let r = h.find(pid, "list");
    let source: ConceptRef = list.clone();
    let c = h.model.component(r).unwrap();
    let ids: Vec<String> = source.elements().iter().map(|e| e.id().0).collect();
    let element = c.core().element.unwrap();
    let container = h.children(element)[0];
    for (i, wrapper) in h.children(container).into_iter().enumerate() {
        assert_eq!(h.attribute(wrapper, "data-index"), Some(i.to_string()));
        assert_eq!(h.attribute(wrapper, "data-concept").as_deref(), Some(ids[i].as_str()));
    }
    assert_eq!(h.children(container).len(), ids.len());
}

#[test]
fn test_binary_field_commits_to_concept() {
    let mut h = Harness::new();
    h.view("flag", json!({ "type": "field", "field": { "type": "binary" } }));
    let flag = MemoryConcept::new("flag", "flag");
    let (pid, _) = h.project(&flag);
    let field = h.field(pid, "binary");
    let element = h.element(ComponentRef::Field(field));

    assert!(!h.model.field(field).unwrap().has_value());
    assert_eq!(h.attribute(element, "checked").as_deref(), Some("false"));

    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    h.model
        .register_handler(pid, VALUE_CHANGED, move |_, event| {
            log.borrow_mut().push(format!("{:?}", event.payload));
            Ok(())
        })
        .unwrap();

    assert!(h.model.set_value(field, Value::Bool(true), true).unwrap());

    assert_eq!(flag.get_value(), Value::Bool(true));
    assert_eq!(h.model.value(field), Some(Value::Bool(true)));
    assert!(h.model.field(field).unwrap().has_value());
    assert_eq!(h.attribute(element, "checked").as_deref(), Some("true"));
    assert!(h.has_class(element, "checked"));
    assert_eq!(*seen.borrow(), vec!["Value(Bool(true))".to_string()]);
}

#[test]
fn test_rejected_commit_keeps_previous_value() {
    let mut h = Harness::new();
    h.view("flag", json!({ "type": "field", "field": { "type": "binary" } }));
    let flag = MemoryConcept::builder("flag", "flag")
        .value(false)
        .validator(|v| match v {
            Value::Bool(true) => Err("locked".to_string()),
            _ => Ok(()),
        })
        .build();
    let (pid, _) = h.project(&flag);
    let field = h.field(pid, "binary");

    assert!(!h.model.set_value(field, Value::Bool(true), true).unwrap());

    assert_eq!(flag.get_value(), Value::Bool(false));
    assert_eq!(h.model.value(field), Some(Value::Bool(false)));
    assert_eq!(h.model.field(field).unwrap().errors(), ["locked".to_string()]);
    assert!(h.has_class(h.element(ComponentRef::Field(field)), "error"));
    assert_eq!(h.notices.count(projector_core::Severity::Error), 1);
}

#[test]
fn test_list_follows_external_insert() {
    let mut h = Harness::new();
    list_view(&mut h);
    let list = items("list", &["x", "y"]);
    let (pid, _) = h.project(&list);
    let r = h.find(pid, "list");
    let element = h.element(r);
    let container = h.children(element)[0];
    assert_eq!(h.text(container), "xy");

    list.insert_element_at(1, item("z"));
    h.model.flush().unwrap();

    assert_eq!(h.text(container), "xzy");
    assert_eq!(h.model.value(r.as_field().unwrap()), Some(Value::Number(3.0)));
    assert_synchronized(&h, pid, &list);
}

#[test]
fn test_list_follows_swap() {
    let mut h = Harness::new();
    list_view(&mut h);
    let list = items("list", &["x", "y"]);
    let (pid, _) = h.project(&list);
    let container = h.children(h.element(h.find(pid, "list")))[0];

    list.swap_element(0, 1).unwrap();
    h.model.flush().unwrap();

    assert_eq!(h.text(container), "yx");
    assert_synchronized(&h, pid, &list);
}

#[test]
fn test_double_swap_before_delivery_restores_order() {
    let mut h = Harness::new();
    list_view(&mut h);
    let list = items("list", &["x", "y"]);
    let (pid, _) = h.project(&list);
    let container = h.children(h.element(h.find(pid, "list")))[0];

    list.swap_element(0, 1).unwrap();
    list.swap_element(0, 1).unwrap();
    h.model.flush().unwrap();

    assert_eq!(h.text(container), "xy");
    assert_synchronized(&h, pid, &list);
}

#[test]
fn test_queued_swaps_follow_final_order() {
    let mut h = Harness::new();
    list_view(&mut h);
    let list = items("list", &["a", "b", "c"]);
    let (pid, _) = h.project(&list);
    let container = h.children(h.element(h.find(pid, "list")))[0];

    list.swap_element(0, 1).unwrap();
    list.swap_element(0, 1).unwrap();
    list.swap_element(1, 2).unwrap();
    h.model.flush().unwrap();

    assert_eq!(list.element_ids(), ["a", "c", "b"]);
    assert_eq!(h.text(container), "acb");
    assert_synchronized(&h, pid, &list);
}

#[test]
fn test_queued_inserts_follow_final_order() {
    let mut h = Harness::new();
    list_view(&mut h);
    let list = items("list", &["a", "b"]);
    let (pid, _) = h.project(&list);
    let container = h.children(h.element(h.find(pid, "list")))[0];

    list.insert_element_at(1, item("z"));
    list.insert_element_at(1, item("w"));
    h.model.flush().unwrap();

    assert_eq!(list.element_ids(), ["a", "w", "z", "b"]);
    assert_eq!(h.text(container), "awzb");
    assert_synchronized(&h, pid, &list);
}

/// Deterministic generator so mixed batches are reproducible.
struct Lcg(u64);

impl Lcg {
    fn below(&mut self, n: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as usize % n
    }
}

/// One random insert, removal or swap on `list`.
fn mutate(list: &MemoryConcept, rng: &mut Lcg, fresh: &mut usize) {
    let len = list.element_ids().len();
    match rng.below(3) {
        1 if len > 0 => list.remove_element_at(rng.below(len)).unwrap(),
        2 if len > 1 => {
            let (a, b) = (rng.below(len), rng.below(len));
            list.swap_element(a, b).unwrap();
        }
        _ => {
            *fresh += 1;
            list.insert_element_at(rng.below(len + 1), item(&format!("n{fresh}")));
        }
    }
}

#[test]
fn test_mixed_batches_keep_items_in_collection_order() {
    for flush_each_step in [false, true] {
        for seed in 0..32 {
            let mut h = Harness::new();
            list_view(&mut h);
            let list = items("list", &["a", "b", "c"]);
            let (pid, _) = h.project(&list);
            let mut rng = Lcg(seed);
            let mut fresh = 0;
            for _ in 0..4 {
                for _ in 0..5 {
                    mutate(&list, &mut rng, &mut fresh);
                    if flush_each_step {
                        h.model.flush().unwrap();
                        assert_synchronized(&h, pid, &list);
                    }
                }
                h.model.flush().unwrap();
                assert_synchronized(&h, pid, &list);
            }
        }
    }
}

#[test]
fn test_list_follows_removal_and_wholesale_change() {
    let mut h = Harness::new();
    list_view(&mut h);
    let list = items("list", &["a", "b", "c"]);
    let (pid, _) = h.project(&list);
    let element = h.element(h.find(pid, "list"));
    let container = h.children(element)[0];

    list.remove_element_at(1).unwrap();
    h.model.flush().unwrap();
    assert_eq!(h.text(container), "ac");
    assert_synchronized(&h, pid, &list);

    list.touch();
    h.model.flush().unwrap();
    assert_eq!(h.text(container), "ac");
    assert_synchronized(&h, pid, &list);

    list.remove_element_at(0).unwrap();
    list.remove_element_at(0).unwrap();
    h.model.flush().unwrap();
    assert_eq!(h.text(container), "");
    assert!(h.has_class(element, "empty"));
    assert_synchronized(&h, pid, &list);
}

#[test]
fn test_items_own_their_projections() {
    let mut h = Harness::new();
    list_view(&mut h);
    let list = items("list", &["x", "y"]);
    let (pid, _) = h.project(&list);
    let r = h.find(pid, "list");
    let c = h.model.component(r).unwrap();

    assert_eq!(c.core().children.len(), 2);
    assert!(
        c.core()
            .children
            .iter()
            .all(|child| matches!(child, projector_core::Child::Projection(_)))
    );
}

#[test]
fn test_item_without_schema_is_skipped() {
    let mut h = Harness::new();
    h.view("list", json!({ "type": "field", "field": { "type": "list" } }));
    let list = items("list", &["x"]);
    let (pid, _) = h.project(&list);
    let element = h.element(h.find(pid, "list"));

    assert!(h.has_class(element, "empty"));
    assert!(h.notices.is_empty());
}

#[test]
fn test_same_schema_resolves_to_same_outline() {
    let mut h = Harness::new();
    h.view(
        "form",
        json!({
            "type": "layout",
            "layout": {
                "type": "stack",
                "disposition": ["title", "#[flag]", "#[items]"],
                "elements": {
                    "flag": { "type": "field", "field": { "type": "binary" } },
                    "items": { "type": "attribute", "name": "items" }
                }
            }
        }),
    );
    list_view(&mut h);
    let first = MemoryConcept::builder("form", "form")
        .attribute_with("items", items("form.items", &["a", "b"]))
        .build();
    let second = MemoryConcept::builder("form2", "form")
        .attribute_with("items", items("form2.items", &["c", "d"]))
        .build();

    let (a, _) = h.project(&first);
    let (b, _) = h.project(&second);

    let outline = h.model.projection_outline(a);
    assert!(!outline.is_empty());
    assert_eq!(outline, h.model.projection_outline(b));
}

#[test]
fn test_list_field_refuses_wholesale_value() {
    let mut h = Harness::new();
    list_view(&mut h);
    let list = items("list", &["x"]);
    let (pid, _) = h.project(&list);
    let field = h.field(pid, "list");

    assert!(!h.model.set_value(field, Value::Number(0.0), true).unwrap());
    assert_eq!(list.element_ids(), vec!["x".to_string()]);
    let f = h.model.field(field).unwrap();
    assert_eq!(f.errors().len(), 1);
    assert!(f.has_value());
}
