use super::*;
use crate::foundation::core::Dimensions;
use serde_json::json;

fn side(w: f64) -> SceneDocument {
    SceneDocument::new(Dimensions::new(w, 100.0).unwrap())
}

#[test]
fn single_and_sided_forms_parse() {
    let single = serde_json::to_string(&side(100.0)).unwrap();
    assert!(matches!(CanvasData::from_json(&single).unwrap(), CanvasData::Single(_)));

    let sided = json!({ "front": side(100.0), "back": side(100.0) }).to_string();
    let data = CanvasData::from_json(&sided).unwrap();
    assert_eq!(data.sides().len(), 2);

    let front_only = json!({ "front": side(100.0) }).to_string();
    assert_eq!(CanvasData::from_json(&front_only).unwrap().sides().len(), 1);
}

#[test]
fn dimension_lock_applies_per_side() {
    let before = CanvasData::Sides {
        front: side(100.0),
        back: Some(side(100.0)),
    };
    let after = CanvasData::Sides {
        front: side(100.0),
        back: Some(side(120.0)),
    };
    assert!(after.ensure_same_dimensions(&before).is_err());

    let dropped = CanvasData::Sides {
        front: side(100.0),
        back: None,
    };
    assert!(dropped.ensure_same_dimensions(&before).is_err());
    assert!(before.ensure_same_dimensions(&before.clone()).is_ok());
}

#[test]
fn try_map_sides_propagates_errors() {
    let data = CanvasData::Single(side(100.0));
    let err = data
        .try_map_sides(|_| Err(SwatchError::validation("nope")))
        .unwrap_err();
    assert!(err.to_string().contains("nope"));
}

#[test]
fn base_image_lands_on_the_front_face() {
    let data = CanvasData::Sides {
        front: side(100.0),
        back: Some(side(100.0)),
    };
    let out = data.with_base_image("https://cdn/red.png");
    let sides = out.sides();
    assert_eq!(sides[0].assets.base_image, "https://cdn/red.png");
    assert_eq!(sides[1].assets.base_image, "");

    let single = CanvasData::Single(side(100.0)).with_base_image("a.png");
    assert_eq!(single.front().assets.base_image, "a.png");
}
