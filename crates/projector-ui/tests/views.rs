mod common;

use std::cell::RefCell;
use std::rc::Rc;

use projector_core::{
    Command, Concept, ConceptRef, DISPLAYED, EngineError, Resolution, Severity, TemplateSchema,
    VIEW_CHANGED, Value,
};
use projector_devtools::{Inspector, MemoryConcept};
use serde_json::json;

use common::{Harness, items};

fn recorder(h: &mut Harness, pid: projector_core::ProjectionId, name: &str) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    h.model
        .register_handler(pid, name, move |_, event| {
            log.borrow_mut().push(format!("{:?}", event.payload));
            Ok(())
        })
        .unwrap();
    seen
}

#[test]
fn test_add_button_appends_an_element() {
    let mut h = Harness::new();
    h.view(
        "list",
        json!({
            "type": "layout",
            "layout": {
                "type": "stack",
                "disposition": ["#[items]", "#[add]"],
                "elements": {
                    "items": { "type": "field", "field": { "type": "list" } },
                    "add": { "type": "static", "static": { "type": "button", "action": "create" } }
                }
            }
        }),
    );
    h.view("item", json!({ "type": "property", "name": "label" }));
    let list = items("l", &["a", "b"]);
    let (pid, _) = h.project(&list);
    let button = h.find(pid, "button");
    assert_eq!(h.text(h.element(button)), "add");

    h.model.focus_component(button).unwrap();
    assert!(h.model.handle(Command::Space, None).unwrap());

    assert_eq!(list.element_ids().len(), 3);
    assert_eq!(h.model.value(h.field(pid, "list")), Some(projector_core::Value::Number(3.0)));
}

#[test]
fn test_delete_button_removes_its_own_item() {
    let mut h = Harness::new();
    h.view("list", json!({ "type": "field", "field": { "type": "list" } }));
    h.view(
        "item",
        json!({
            "type": "layout",
            "layout": {
                "type": "stack",
                "orientation": "horizontal",
                "disposition": [
                    { "type": "property", "name": "label" },
                    { "type": "static", "static": { "type": "button", "action": "delete", "content": "x" } }
                ]
            }
        }),
    );
    let list = items("l", &["a", "b", "c"]);
    let (pid, _) = h.project(&list);
    let buttons = h.all(pid, "button");
    assert_eq!(buttons.len(), 3);

    h.model.focus_component(buttons[1]).unwrap();
    assert!(h.model.handle(Command::Enter, None).unwrap());

    assert_eq!(list.element_ids(), vec!["a", "c"]);
    assert_eq!(h.all(pid, "button").len(), 2);
    assert!(h.model.component(buttons[1]).is_none());
    assert_eq!(h.model.focused(), None);
}

#[test]
fn test_button_rejection_is_reported() {
    let mut h = Harness::new();
    h.view(
        "thing",
        json!({ "type": "static", "static": { "type": "button", "action": "delete" } }),
    );
    let (pid, _) = h.project(&MemoryConcept::new("t", "thing"));
    let button = h.find(pid, "button");
    h.model.focus_component(button).unwrap();

    assert!(!h.model.handle(Command::Space, None).unwrap());
    assert_eq!(h.notices.count(Severity::Error), 1);
}

fn two_views(h: &mut Harness) {
    h.tagged_view(
        "doc",
        "summary",
        json!({
            "type": "layout",
            "layout": {
                "type": "stack",
                "disposition": ["Summary", { "type": "projection", "tag": "detail", "content": "more" }]
            }
        }),
    );
    h.tagged_view(
        "doc",
        "detail",
        json!({ "type": "static", "static": { "type": "text", "content": "Details" } }),
    );
}

#[test]
fn test_link_switches_the_view() {
    let mut h = Harness::new();
    two_views(&mut h);
    let (pid, container) = h.project(&MemoryConcept::new("d", "doc"));
    let changed = recorder(&mut h, pid, VIEW_CHANGED);
    assert_eq!(h.text(container), "Summarymore");

    let link = h.find(pid, "link");
    assert_eq!(h.attribute(h.element(link), "data-tag").as_deref(), Some("detail"));
    h.model.focus_component(link).unwrap();
    assert!(h.model.handle(Command::Enter, None).unwrap());

    assert_eq!(h.text(container), "Details");
    assert_eq!(h.model.projection(pid).unwrap().index, 1);
    assert_eq!(*changed.borrow(), vec!["View(1)".to_string()]);
    assert!(h.model.component(link).is_none());
    assert_eq!(h.model.focused(), None);
}

#[test]
fn test_view_change_commits_a_pending_edit() {
    let mut h = Harness::new();
    h.tagged_view("name", "edit", json!({ "type": "field", "field": { "type": "text" } }));
    h.tagged_view(
        "name",
        "plain",
        json!({ "type": "static", "static": { "type": "text", "content": "saved" } }),
    );
    let name = MemoryConcept::builder("n", "name").value("ada").build();
    let (pid, container) = h.project(&name);
    let field = h.find(pid, "text");
    h.model.focus_component(field).unwrap();
    h.model.input("!").unwrap();
    assert_eq!(name.get_value(), Value::Text("ada".into()));

    assert!(h.model.change_view_by_tag(pid, "plain").unwrap());

    assert_eq!(name.get_value(), Value::Text("ada!".into()));
    assert!(h.model.component(field).is_none());
    assert_eq!(h.model.focused(), None);
    assert!(h.model.timers().is_empty());
    assert_eq!(h.text(container), "saved");
}

#[test]
fn test_unknown_view_tag_is_a_warning() {
    let mut h = Harness::new();
    two_views(&mut h);
    let (pid, _) = h.project(&MemoryConcept::new("d", "doc"));

    assert!(!h.model.change_view_by_tag(pid, "history").unwrap());
    assert_eq!(h.notices.count(Severity::Warning), 1);
    assert_eq!(h.model.projection(pid).unwrap().index, 0);
}

#[test]
fn test_tagged_projection_uses_only_matching_views() {
    let mut h = Harness::new();
    two_views(&mut h);
    let doc: ConceptRef = MemoryConcept::new("d", "doc");
    let Resolution::Projection { element, .. } = h.model.project(doc, Some("detail")).unwrap()
    else {
        panic!("expected a projection");
    };
    assert_eq!(h.text(element), "Details");
}

#[test]
fn test_displayed_fires_once_per_projection() {
    let mut h = Harness::new();
    h.view("flag", json!({ "type": "field", "field": { "type": "binary" } }));
    let pid = h
        .model
        .create_projection(MemoryConcept::new("f", "flag"), None, None)
        .unwrap();
    let displayed = recorder(&mut h, pid, DISPLAYED);

    h.model.render_projection(pid).unwrap();
    h.model.render_projection(pid).unwrap();
    h.model.flush().unwrap();

    assert_eq!(displayed.borrow().len(), 1);
}

fn person(h: &mut Harness) {
    h.view(
        "person",
        json!({
            "type": "layout",
            "layout": {
                "type": "stack",
                "disposition": ["#[name]", "#[note]"],
                "elements": {
                    "name": { "type": "attribute", "name": "name" },
                    "note": { "type": "attribute", "name": "note" }
                }
            }
        }),
    );
    h.view("text", json!({ "type": "field", "field": { "type": "text" } }));
}

#[test]
fn test_activator_materializes_an_optional_attribute() {
    let mut h = Harness::new();
    person(&mut h);
    let who = MemoryConcept::builder("p", "person")
        .attribute_with("name", MemoryConcept::builder("p.name", "text").value("ada").build())
        .attribute("note", "text", true)
        .build();
    let (pid, container) = h.project(&who);
    let activator = h.find(pid, "activator");
    assert_eq!(h.text(container), "ada+ note");
    assert_eq!(h.all(pid, "text").len(), 1);

    h.model.focus_component(activator).unwrap();
    assert!(h.model.handle(Command::Space, None).unwrap());

    assert!(who.attribute_target("note").is_some());
    assert!(h.model.component(activator).is_none());
    assert!(h.all(pid, "activator").is_empty());
    let texts = h.all(pid, "text");
    assert_eq!(texts.len(), 2);
    assert_eq!(h.model.focused(), Some(texts[1]));
    // the new field sits where the activator was
    assert_eq!(h.text(container), "ada");
    let stack = h.children(container)[0];
    assert_eq!(h.children(stack).len(), 2);
}

#[test]
fn test_missing_required_attribute_renders_a_placeholder() {
    let mut h = Harness::new();
    person(&mut h);
    let who = MemoryConcept::builder("p", "person")
        .attribute("name", "text", false)
        .attribute("note", "text", true)
        .build();
    let (_, container) = h.project(&who);

    let stack = h.children(container)[0];
    let first = h.children(stack)[0];
    assert!(h.has_class(first, "binding-error"));
    assert_eq!(h.notices.count(Severity::Warning), 1);
}

#[test]
fn test_unknown_kind_fails_the_projection() {
    let mut h = Harness::new();
    h.view("odd", json!({ "type": "field", "field": { "type": "slider" } }));
    let odd: ConceptRef = MemoryConcept::new("o", "odd");

    let err = h.model.project(odd, None).unwrap_err();
    assert!(matches!(err, EngineError::Schema(_)));
    assert_eq!(h.model.projections().count(), 0);
}

#[test]
fn test_template_expands_in_place() {
    let mut h = Harness::new();
    let template: TemplateSchema = serde_json::from_value(json!({
        "name": "labelled",
        "param": [{ "name": "label" }],
        "content": [
            { "type": "static", "static": { "type": "text", "content": "$label" } },
            { "type": "field", "field": { "type": "binary" } }
        ]
    }))
    .unwrap();
    h.model.register_template(template);
    h.view(
        "consent",
        json!({
            "type": "layout",
            "layout": {
                "type": "stack",
                "orientation": "horizontal",
                "disposition": [{ "type": "template", "name": "labelled", "param": { "label": "Agree" } }]
            }
        }),
    );
    let (pid, container) = h.project(&MemoryConcept::new("c", "consent"));

    assert_eq!(h.text(container), "Agree");
    let stack = h.find(pid, "stack");
    let children = &h.model.component(stack).unwrap().core().children;
    assert_eq!(children.len(), 2);
    assert_eq!(h.all(pid, "binary").len(), 1);
}

#[test]
fn test_headless_dump_of_a_form() {
    let mut h = Harness::new();
    h.view(
        "person",
        json!({
            "type": "layout",
            "layout": {
                "type": "stack",
                "disposition": ["Name", "#[name]"],
                "elements": { "name": { "type": "field", "field": { "type": "text" } } }
            }
        }),
    );
    let who = MemoryConcept::builder("p", "person").value("ada").build();
    let (_, container) = h.project(&who);

    insta::assert_snapshot!(h.dump(container), @r#"
    container.projection
      container.layout.stack.vertical
        text.label "Name"
        input.field.text-field "ada"
    "#);
}

#[test]
fn test_inspector_dump_shows_values_and_state() {
    let mut h = Harness::new();
    h.view(
        "person",
        json!({
            "type": "layout",
            "layout": {
                "type": "stack",
                "disposition": ["#[name]", "#[ok]"],
                "elements": {
                    "name": { "type": "field", "field": { "type": "text" } },
                    "ok": { "type": "field", "field": { "type": "binary" } }
                }
            }
        }),
    );
    let who = MemoryConcept::builder("p", "person").value("ada").build();
    let (pid, _) = h.project(&who);

    insta::assert_snapshot!(Inspector::new().dump(&h.model, pid), @r#"
    projection person (p) view 0
      layout stack [rendered]
        field text [rendered] = Text("ada") ("ada")
        field binary [rendered] = Bool(false) (unchecked)
    "#);
}
