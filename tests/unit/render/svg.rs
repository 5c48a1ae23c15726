use super::*;
use crate::foundation::error::SwatchError;
use crate::geometry::measure::AdvanceMeasure;
use serde_json::json;

fn doc(v: serde_json::Value) -> SceneDocument {
    SceneDocument::from_value(v).unwrap()
}

fn minimal(elements: serde_json::Value) -> serde_json::Value {
    json!({
        "dimensions": { "width": 200, "height": 100 },
        "backgroundColor": "#ffffff",
        "designableArea": { "x": 10, "y": 10, "width": 180, "height": 80, "cornerRadius": 8, "visible": true },
        "elements": elements,
        "assets": { "baseImage": "" }
    })
}

fn render(d: &SceneDocument) -> String {
    scene_to_svg(d, &AdvanceMeasure).unwrap()
}

#[test]
fn numbers_use_at_most_three_decimals() {
    assert_eq!(num(1.0), "1");
    assert_eq!(num(1.5), "1.5");
    assert_eq!(num(1.23456), "1.235");
    assert_eq!(num(-0.0001), "0");
    assert_eq!(num(-2.25), "-2.25");
}

#[test]
fn escaping_covers_markup_characters() {
    assert_eq!(
        escape(r#"<b>"Tom" & 'Jerry'</b>"#),
        "&lt;b&gt;&quot;Tom&quot; &amp; &apos;Jerry&apos;&lt;/b&gt;"
    );
}

#[test]
fn text_content_cannot_inject_markup() {
    let d = doc(minimal(json!({
        "text": [{ "id": "t", "x": 0, "y": 0, "text": "</text><script>x</script>", "fontSize": 12,
                   "fontFamily": "A\"B" }]
    })));
    let svg = render(&d);
    assert!(!svg.contains("<script>"));
    assert!(svg.contains("&lt;/text&gt;&lt;script&gt;"));
    assert!(svg.contains(r#"font-family="A&quot;B""#));
}

#[test]
fn base_image_precedes_the_clipped_group() {
    let mut v = minimal(json!({
        "image": [{ "id": "i", "x": 5, "y": 5, "url": "https://cdn/logo.png", "width": 20, "height": 20 }]
    }));
    v["assets"]["baseImage"] = json!("https://cdn/face.png");
    let svg = render(&doc(v));

    let base = svg.find(&image_key("https://cdn/face.png")).unwrap();
    let group = svg.find(r#"<g clip-path="url(#designable-area)">"#).unwrap();
    let background = svg.find(r##"fill="#ffffff""##).unwrap();
    let logo = svg.find(&image_key("https://cdn/logo.png")).unwrap();
    assert!(base < group);
    assert!(group < background);
    assert!(background < logo);
    assert!(svg.ends_with("</g></svg>"));
}

#[test]
fn clip_is_the_rounded_designable_area() {
    let svg = render(&doc(minimal(json!({}))));
    assert!(svg.contains(
        r#"<clipPath id="designable-area"><rect x="10" y="10" width="180" height="80" rx="8" ry="8"/></clipPath>"#
    ));
}

#[test]
fn elements_follow_layer_order() {
    let d = doc(minimal(json!({
        "text": [
            { "id": "top", "x": 0, "y": 0, "text": "TOP", "fontSize": 10, "zIndex": 5 },
            { "id": "bottom", "x": 0, "y": 0, "text": "BOTTOM", "fontSize": 10, "zIndex": 1 }
        ],
        "shape": [{ "id": "s", "x": 0, "y": 0, "shapeType": "rect", "width": 5, "height": 5,
                    "fill": "#00ff00", "zIndex": 3 }]
    })));
    let svg = render(&d);
    let bottom = svg.find(">BOTTOM<").unwrap();
    let shape = svg.find(r##"fill="#00ff00""##).unwrap();
    let top = svg.find(">TOP<").unwrap();
    assert!(bottom < shape && shape < top);
}

#[test]
fn gold_fills_reference_the_fixed_gradient() {
    let d = doc(minimal(json!({
        "text": [{ "id": "t", "x": 0, "y": 0, "text": "Gold", "fontSize": 10, "fill": "gold-gradient" }],
        "gradientText": [{ "id": "g", "x": 0, "y": 0, "text": "Shine", "fontSize": 10 }]
    })));
    let svg = render(&d);
    assert!(svg.contains(r##"<stop offset="0" stop-color="#f6e27a" stop-opacity="1"/>"##));
    assert!(svg.contains(r##"<stop offset="0.5" stop-color="#cb9b51" stop-opacity="1"/>"##));
    assert!(svg.contains(r##"<stop offset="1" stop-color="#f6f2c0" stop-opacity="1"/>"##));
    assert_eq!(svg.matches("url(#gold-gradient)").count(), 2);
}

#[test]
fn curved_text_uses_the_shared_arc_path() {
    let v = minimal(json!({
        "curvedText": [{ "id": "c", "x": 100, "y": 0, "text": "Arc & Co", "topY": 30,
                         "radius": 80, "flipped": true, "fontSize": 16, "fill": "#123456" }]
    }));
    let d = doc(v);
    let el = &d.elements.curved_text[0];
    let arc = ArcGeometry::for_element(el, &AdvanceMeasure).unwrap();
    let svg = render(&d);

    assert!(svg.contains(&format!(r#"<path id="arc-1" d="{}"/>"#, arc.svg_path())));
    assert!(svg.contains(r##"<textPath xlink:href="#arc-1" startOffset="50%">Arc &amp; Co</textPath>"##));
    assert!(svg.contains(r#"text-anchor="middle""#));
    assert!(svg.contains(&format!(r#"transform="translate(100 {})""#, num(arc.center_y))));
    assert_eq!(arc.center_y, -50.0);
}

#[test]
fn empty_curved_text_draws_nothing() {
    let d = doc(minimal(json!({
        "curvedText": [{ "id": "c", "x": 100, "y": 0, "text": "", "topY": 30, "radius": 80, "fontSize": 16 }]
    })));
    assert!(!render(&d).contains("textPath"));
}

#[test]
fn translucent_colors_carry_an_opacity() {
    let d = doc(minimal(json!({
        "shape": [
            { "id": "a", "x": 0, "y": 0, "shapeType": "ellipse", "width": 10, "height": 6,
              "fill": "rgba(255, 0, 0, 0.5)", "stroke": "transparent" },
            { "id": "b", "x": 0, "y": 0, "shapeType": "rect", "width": 10, "height": 6,
              "fill": "#ABCDEF" }
        ]
    })));
    let svg = render(&d);
    assert!(svg.contains(
        r##"<ellipse cx="0" cy="0" rx="5" ry="3" fill="#ff0000" fill-opacity="0.502" stroke="none""##
    ));
    assert!(svg.contains(r##"fill="#abcdef"/>"##));
}

#[test]
fn gradient_backgrounds_span_the_designable_area() {
    let mut v = minimal(json!({}));
    v["backgroundColor"] = json!("linear-gradient");
    v["backgroundGradient"] = json!({ "type": "linear", "colorStops": [0, "#000000", 1, "#ffffff"] });
    let svg = render(&doc(v));
    assert!(svg.contains(
        r#"<linearGradient id="background-gradient" gradientUnits="userSpaceOnUse" x1="10" y1="10" x2="10" y2="90">"#
    ));
    assert!(svg.contains(r#"fill="url(#background-gradient)""#));
}

#[test]
fn transparent_background_draws_no_rect() {
    let mut v = minimal(json!({}));
    v["backgroundColor"] = json!("transparent");
    assert!(!render(&doc(v)).contains(r#"<rect x="0" y="0" width="200""#));
}

#[test]
fn ring_is_an_even_odd_pair_of_circles() {
    let d = doc(minimal(json!({
        "shape": [{ "id": "r", "x": 50, "y": 50, "shapeType": "ring", "innerRadius": 5,
                    "outerRadius": 10, "fill": "#000000" }]
    })));
    let svg = render(&d);
    assert!(svg.contains(
        r#"d="M 10 0 A 10 10 0 1 0 -10 0 A 10 10 0 1 0 10 0 Z M 5 0 A 5 5 0 1 0 -5 0 A 5 5 0 1 0 5 0 Z""#
    ));
    assert!(svg.contains(r#"fill-rule="evenodd""#));
}

#[test]
fn referenced_images_are_unique_and_base_first() {
    let mut v = minimal(json!({
        "image": [
            { "id": "a", "x": 0, "y": 0, "url": "logo.png", "width": 1, "height": 1, "zIndex": 2 },
            { "id": "b", "x": 0, "y": 0, "url": "logo.png", "width": 1, "height": 1, "zIndex": 1 },
            { "id": "c", "x": 0, "y": 0, "url": "mark.png", "width": 1, "height": 1, "zIndex": 0 }
        ]
    }));
    v["assets"]["baseImage"] = json!(" face.png ");
    assert_eq!(
        referenced_images(&doc(v)),
        vec!["face.png".to_string(), "mark.png".to_string(), "logo.png".to_string()]
    );
}

#[test]
fn image_keys_are_stable_and_distinct() {
    assert_eq!(image_key("a.png"), image_key("a.png"));
    assert_ne!(image_key("a.png"), image_key("b.png"));
    assert!(image_key("a.png").starts_with("image-"));
}

#[test]
fn invalid_documents_are_rejected_before_lowering() {
    let mut d = doc(minimal(json!({})));
    d.designable_area.corner_radius = 1000.0;
    let err = scene_to_svg(&d, &AdvanceMeasure).unwrap_err();
    assert!(matches!(err, SwatchError::Validation(_)));
}
