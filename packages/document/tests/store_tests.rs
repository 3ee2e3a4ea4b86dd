//! Store-level behavior: ownership index, conflict resolution, bulk reloads

use drafter_document::{
    Binding, Content, DocumentStore, Element, ElementPatch, OwnerType, Ownership, Style,
};

fn div(id: &str, owner: Ownership) -> Element {
    Element::new(id, "div", owner)
}

#[test]
fn test_ownership_removal_scenario() {
    let mut store = DocumentStore::new();
    store.add_element(div("A", Ownership::screen("S1")));
    store.add_element(div("B", Ownership::screen("S1")));

    store.remove_element("A");

    assert_eq!(store.owned_by(OwnerType::Screen, "S1"), ["B"]);
    store.check_invariants().unwrap();
}

#[test]
fn test_removing_last_element_keeps_empty_bucket() {
    let mut store = DocumentStore::new();
    store.add_element(div("A", Ownership::component("C1")));
    store.remove_element("A");

    let bucket = store.ownership_index().bucket(OwnerType::Component, "C1");
    assert_eq!(bucket.map(|ids| ids.len()), Some(0));
}

#[test]
fn test_ownership_change_moves_index_entry() {
    let mut store = DocumentStore::new();
    store.add_element(div("A", Ownership::screen("S1")));
    store.add_element(div("P", Ownership::screen("S1")));

    store.update_element("A", &ElementPatch::new().ownership(Ownership::element("P")));

    assert_eq!(store.owned_by(OwnerType::Screen, "S1"), ["P"]);
    assert_eq!(store.owned_by(OwnerType::Element, "P"), ["A"]);
    store.check_invariants().unwrap();
}

#[test]
fn test_conflict_resolution_scenario() {
    let mut store = DocumentStore::new();
    store.add_element(
        div("E", Ownership::screen("S1"))
            .with_style(Style::new().with_binding("width", Binding::prop("propA"))),
    );

    store.update_element_style("E", &Style::new().with_literal("width", "10px"));

    let style = &store.element("E").unwrap().properties.style;
    assert_eq!(style.literal("width").map(|l| l.to_string()), Some("10px".to_string()));
    assert!(style.binding.is_none());
}

#[test]
fn test_remove_style_prunes_binding() {
    let mut store = DocumentStore::new();
    store.add_element(
        div("E", Ownership::screen("S1")).with_style(
            Style::new()
                .with_literal("color", "red")
                .with_binding("width", Binding::prop("propA")),
        ),
    );

    store.remove_element_style("E", &["width"]);

    let style = &store.element("E").unwrap().properties.style;
    assert!(style.binding.is_none());
    assert!(style.literal("color").is_some());
}

#[test]
fn test_mutual_exclusion_over_update_sequence() {
    let mut store = DocumentStore::new();
    store.add_element(div("E", Ownership::screen("S1")).with_text("Hello"));

    store.update_element(
        "E",
        &ElementPatch::new().style(Style::new().with_binding("height", Binding::prop("h"))),
    );
    store.update_element_style("E", &Style::new().with_literal("height", 20.0));
    store.update_element_style("E", &Style::new().with_binding("height", Binding::prop("h")));
    store.update_element_content("E", &Content::bound(Binding::prop("label")));
    store.update_element(
        "E",
        &ElementPatch::new().style(
            Style::new()
                .with_literal("gap", "4px")
                .with_binding("gap", Binding::prop("g")),
        ),
    );
    store.update_element_content("E", &Content::text("Bye"));

    store.check_invariants().unwrap();
    let props = &store.element("E").unwrap().properties;
    assert!(props.style.binding_for("height").is_some());
    assert!(props.style.literal("height").is_none());
    assert!(props.style.literal("gap").is_some());
    assert_eq!(props.content.text.as_deref(), Some("Bye"));
    assert!(props.content.binding.is_none());
}

#[test]
fn test_set_elements_rebuilds_index() {
    let mut store = DocumentStore::new();
    store.add_element(div("old", Ownership::screen("S1")));

    store.set_elements(vec![
        div("a", Ownership::screen("S2")),
        div("b", Ownership::component("C1")),
    ]);

    assert!(!store.contains("old"));
    assert_eq!(store.ids(), ["a", "b"]);
    assert!(store.ownership_index().bucket(OwnerType::Screen, "S1").is_none());
    assert_eq!(store.owned_by(OwnerType::Component, "C1"), ["b"]);
    store.check_invariants().unwrap();
}

#[test]
fn test_snapshot_roundtrip_preserves_store() {
    let mut store = DocumentStore::new();
    store.add_elements(vec![
        div("root", Ownership::screen("S1")).with_children(["child"]),
        div("child", Ownership::element("root")).with_text("Hi"),
    ]);

    let restored = DocumentStore::from_snapshot(store.snapshot());
    assert_eq!(restored.ids(), store.ids());
    assert_eq!(restored.element("child"), store.element("child"));
    restored.check_invariants().unwrap();
}
