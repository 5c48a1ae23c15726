use super::*;
use crate::foundation::error::SwatchError;
use crate::render::sandbox::global_value;
use serde_json::json;

fn renderer() -> HeadlessRenderer {
    HeadlessRenderer::new(Arc::new(fontdb::Database::new()), Arc::new(AdvanceMeasure))
}

fn doc(width: f64, height: f64, area_width: f64, base_image: &str) -> SceneDocument {
    SceneDocument::from_value(json!({
        "dimensions": { "width": width, "height": height },
        "backgroundColor": "#00ff00",
        "designableArea": { "x": 0, "y": 0, "width": area_width, "height": height, "cornerRadius": 0, "visible": true },
        "elements": {
            "shape": [{ "id": "s", "x": 0, "y": 0, "shapeType": "rect", "width": 10, "height": 10, "fill": "#ff0000" }]
        },
        "assets": { "baseImage": base_image }
    }))
    .unwrap()
}

fn decode(png: &[u8]) -> image::RgbaImage {
    image::load_from_memory(png).unwrap().to_rgba8()
}

fn assert_slots_clear() {
    let _sandbox = RenderSandbox::enter();
    for slot in [FONTDB_SLOT, IMAGES_SLOT, SCALE_SLOT] {
        assert!(global_value(slot).is_none(), "{slot} left installed");
    }
}

#[test]
fn renders_background_and_elements_inside_the_clip() {
    let png = renderer().render(&doc(100.0, 50.0, 60.0, ""), ImageBundle::new()).unwrap();
    let img = decode(&png);

    assert_eq!(img.dimensions(), (100, 50));
    assert_eq!(img.get_pixel(5, 5).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(40, 25).0, [0, 255, 0, 255]);
    assert_eq!(img.get_pixel(80, 25).0[3], 0);
    assert_slots_clear();
}

#[test]
fn base_image_shows_outside_the_designable_area() {
    let mut bundle = ImageBundle::new();
    let mut face = Vec::new();
    image::RgbaImage::from_pixel(10, 5, image::Rgba([0, 0, 255, 255]))
        .write_to(&mut std::io::Cursor::new(&mut face), image::ImageFormat::Png)
        .unwrap();
    bundle.insert("face.png", &face).unwrap();

    let png = renderer()
        .render(&doc(100.0, 50.0, 60.0, "face.png"), bundle)
        .unwrap();
    let img = decode(&png);
    assert_eq!(img.get_pixel(80, 25).0, [0, 0, 255, 255]);
    assert_eq!(img.get_pixel(40, 25).0, [0, 255, 0, 255]);
}

#[test]
fn output_is_limited_to_max_px() {
    let png = renderer()
        .with_max_px(Some(40))
        .render(&doc(200.0, 100.0, 200.0, ""), ImageBundle::new())
        .unwrap();
    assert_eq!(decode(&png).dimensions(), (40, 20));
}

#[test]
fn failed_renders_restore_the_environment() {
    // Passes validation but exceeds the raster limit once inside the sandbox.
    let err = renderer()
        .render(&doc(20_000.0, 10.0, 20_000.0, ""), ImageBundle::new())
        .unwrap_err();
    assert!(matches!(err, SwatchError::Render(_)), "{err}");
    assert_slots_clear();
}

#[test]
fn invalid_documents_fail_before_rendering() {
    let mut d = doc(100.0, 50.0, 60.0, "");
    d.elements.shape[0].fill = Some("not-a-color".to_string());
    let err = renderer().render(&d, ImageBundle::new()).unwrap_err();
    assert!(!matches!(err, SwatchError::Render(_)), "{err}");
    assert_slots_clear();
}
