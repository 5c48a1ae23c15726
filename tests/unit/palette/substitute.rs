use super::*;
use crate::palette::model::{PaletteBook, SLOT_COUNT};
use crate::scene::model::GOLD_GRADIENT;
use pretty_assertions::assert_eq;
use serde_json::json;

fn book() -> PaletteBook {
    PaletteBook::from_json(include_str!("../../fixtures/palettes.json")).unwrap()
}

fn scene() -> SceneDocument {
    SceneDocument::from_json(include_str!("../../fixtures/scene_basic.json")).unwrap()
}

#[test]
fn red_text_becomes_blue_and_gold_stays() {
    let book = book();
    let (out, stats) = substitute(
        &scene(),
        book.require("red").unwrap(),
        book.require("blue").unwrap(),
    );

    let t = &out.elements.text;
    assert_eq!(t[0].style.fill.as_deref(), Some("#0057b8"));
    assert_eq!(t[0].style.stroke.as_deref(), Some("#ffffff"));
    assert_eq!(t[1].style.fill.as_deref(), Some(GOLD_GRADIENT));
    assert_eq!(out.background_color, Background::Solid("#0057b8".to_string()));
    assert_eq!(out.elements.curved_text[0].style.fill.as_deref(), Some("#f1c400"));
    assert_eq!(out.elements.shape[0].fill.as_deref(), Some("#f1c400"));
    assert_eq!(out.elements.shape[1].stroke.as_deref(), Some("transparent"));
    assert!(stats.replaced >= 6);
    assert!(stats.visited > stats.replaced);
}

#[test]
fn gradient_offsets_are_preserved() {
    let book = book();
    let (out, _) = substitute(
        &scene(),
        book.require("red").unwrap(),
        book.require("blue").unwrap(),
    );
    let stops = out.elements.shape[1]
        .fill_linear_gradient_color_stops
        .as_ref()
        .unwrap();
    let v = serde_json::to_value(stops).unwrap();
    assert_eq!(v, json!([0.0, "#0057b8", 1.0, "#f1c400"]));
}

#[test]
fn round_trip_restores_the_document() {
    let source = Palette::from_slots(["#c8102e", "#ffd100", "#ffffff"]);
    let target = Palette::from_slots(["#0057b8", "#f1c400", "#eeeeee"]);
    let mut doc = scene();
    // Use the palette's own spelling everywhere so the comparison is exact.
    doc.background_color = Background::Solid("#c8102e".to_string());
    doc.elements.text[1].style.fill = Some("#ffd100".to_string());
    doc.elements.shape[1].stroke = None;

    let (there, _) = substitute(&doc, &source, &target);
    assert_ne!(there, doc);
    let (back, _) = substitute(&there, &target, &source);
    assert_eq!(back, doc);
}

#[test]
fn every_slot_maps_wherever_it_occurs() {
    let source = Palette::from_slots(["#000001", "#000002", "#000003", "#000004", "#000005"]);
    let target = Palette::from_slots(["#100000", "#200000", "#300000", "#400000", "#500000"]);
    for slot in 0..SLOT_COUNT {
        let from = source.slot(slot).unwrap();
        let to = target.slot(slot).unwrap();
        let doc = SceneDocument::from_value(json!({
            "dimensions": { "width": 100, "height": 100 },
            "backgroundColor": "radial-gradient",
            "backgroundGradient": { "type": "radial", "colorStops": [0, from, 1, "#ffffff"] },
            "designableArea": { "x": 0, "y": 0, "width": 100, "height": 100 },
            "elements": {
                "shape": [{
                    "id": "s", "x": 0, "y": 0, "shapeType": "ellipse", "width": 10, "height": 10,
                    "fill": from,
                    "fillRadialGradientColorStops": [0, from, 0.5, from],
                    "meta": { "layers": [{ "stroke": from }] }
                }]
            }
        }))
        .unwrap();

        let (out, _) = substitute(&doc, &source, &target);
        let g = out.background_gradient.as_ref().unwrap();
        assert_eq!(g.color_stops.0[0].color, to);
        let s = &out.elements.shape[0];
        assert_eq!(s.fill.as_deref(), Some(to));
        let radial = s.fill_radial_gradient_color_stops.as_ref().unwrap();
        assert!(radial.iter().all(|st| st.color == to));
        assert_eq!(s.extra["meta"]["layers"][0]["stroke"], json!(to));
    }
}

#[test]
fn missing_target_slot_leaves_color_alone() {
    let source = Palette::from_slots(["#111111", "#222222", "#333333", "#444444"]);
    let target = Palette::from_slots(["#aaaaaa", "#bbbbbb", "#cccccc"]);
    let mut doc = scene();
    doc.elements.text[0].style.fill = Some("#444444".to_string());
    let (out, stats) = substitute(&doc, &source, &target);
    assert_eq!(out.elements.text[0].style.fill.as_deref(), Some("#444444"));
    assert_eq!(stats.replaced, 0);
}

#[test]
fn unknown_editor_fields_are_walked() {
    let source = Palette::from_slots(["#c8102e"]);
    let target = Palette::from_slots(["#0057b8"]);
    let mut doc = scene();
    doc.extra.insert(
        "guides".to_string(),
        json!([{ "fill": "#C8102E", "label": "#c8102e", "colorStops": [0.25, "#c8102e"] }]),
    );
    let (out, _) = substitute(&doc, &source, &target);
    assert_eq!(
        out.extra["guides"],
        json!([{ "fill": "#0057b8", "label": "#c8102e", "colorStops": [0.25, "#0057b8"] }])
    );
    assert_eq!(out.extra["editorVersion"], json!(3));
}

#[test]
fn canvas_sides_are_all_substituted() {
    let source = Palette::from_slots(["#c8102e"]);
    let target = Palette::from_slots(["#0057b8"]);
    let canvas = CanvasData::Sides {
        front: scene(),
        back: Some(scene()),
    };
    let (out, stats) = substitute_canvas(&canvas, &source, &target);
    for side in out.sides() {
        assert_eq!(side.elements.text[0].style.fill.as_deref(), Some("#0057b8"));
    }
    let (_, single) = substitute(&scene(), &source, &target);
    assert_eq!(stats.replaced, single.replaced * 2);
}
