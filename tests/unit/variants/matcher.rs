use super::*;

fn variant(id: &str, options: &[(&str, &str)], image: Option<&str>) -> PlatformVariant {
    PlatformVariant {
        id: id.to_string(),
        title: String::new(),
        selected_options: options
            .iter()
            .map(|(name, value)| SelectedOption {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect(),
        image_url: image.map(str::to_string),
    }
}

fn key(color: &str, pattern: Option<&str>) -> VariantKey {
    VariantKey::new(color, pattern).unwrap()
}

#[test]
fn sizes_group_under_one_offering() {
    let variants = [
        variant("v1", &[("Color", "Light Blue"), ("Size", "S")], None),
        variant("v2", &[("Size", "M"), ("Colour", "light-blue")], Some("https://cdn/lb.png")),
        variant("v3", &[("color", "Grey"), ("Size", "S")], Some("https://cdn/gray.png")),
        variant("v4", &[("Size", "L")], None),
    ];
    let catalog = VariantCatalog::from_variants(&variants, &OptionNames::default());

    assert_eq!(catalog.len(), 2);
    let lb = catalog.get(&key("light blue", None)).unwrap();
    assert_eq!(lb.variant_ids, ["v1", "v2"]);
    assert_eq!(lb.image_url.as_deref(), Some("https://cdn/lb.png"));
    assert_eq!(lb.color_name, "Light Blue");
    assert!(catalog.get(&key("gray", None)).is_some());
    assert_eq!(catalog.skipped.len(), 1);
    assert_eq!(catalog.skipped[0].variant_id, "v4");
}

#[test]
fn pattern_is_a_separate_dimension() {
    let variants = [
        variant("v1", &[("Color", "Red"), ("Pattern", "Stripes")], None),
        variant("v2", &[("Color", "Red"), ("Pattern", "Dots")], None),
        variant("v3", &[("Color", "Red")], None),
    ];
    let catalog = VariantCatalog::from_variants(&variants, &OptionNames::default());
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.offerings()[0].key, key("red", Some("stripes")));
    assert_eq!(catalog.offerings()[0].key.to_string(), "red / stripes");
    assert_eq!(catalog.offerings()[2].key, key("red", None));
}

#[test]
fn custom_option_names_are_normalized() {
    let names = OptionNames::new(&["Shade"], &["Print Style"]);
    let variants = [variant("v1", &[("shade", "Navy"), ("print_style", "Plaid")], None)];
    let catalog = VariantCatalog::from_variants(&variants, &names);
    assert_eq!(catalog.offerings()[0].key, key("navy", Some("plaid")));
    assert_eq!(catalog.offerings()[0].pattern_name.as_deref(), Some("Plaid"));
}

#[test]
fn matching_reports_both_sides() {
    let variants = [
        variant("v1", &[("Color", "Red")], Some("https://cdn/red.png")),
        variant("v2", &[("Color", "Blue")], None),
        variant("v3", &[("Color", "Gray")], None),
    ];
    let catalog = VariantCatalog::from_variants(&variants, &OptionNames::default());
    let generated = [
        GeneratedVariant {
            template_id: "t-red".to_string(),
            key: key("RED", None),
        },
        GeneratedVariant {
            template_id: "t-grey".to_string(),
            key: key("grey", None),
        },
        GeneratedVariant {
            template_id: "t-green".to_string(),
            key: key("green", None),
        },
        GeneratedVariant {
            template_id: "t-red-2".to_string(),
            key: key("red", None),
        },
    ];

    let report = match_templates(&catalog, &generated);
    let matched: Vec<_> = report.matched.iter().map(|m| m.template_id.as_str()).collect();
    assert_eq!(matched, ["t-red", "t-grey"]);
    assert_eq!(report.matched[0].variant_ids, ["v1"]);
    assert_eq!(report.matched[0].image_url.as_deref(), Some("https://cdn/red.png"));

    let unmatched: Vec<_> = report.unmatched_offerings.iter().map(|o| o.key.to_string()).collect();
    assert_eq!(unmatched, ["blue"]);

    let orphans: Vec<_> = report.orphan_templates.iter().map(|g| g.template_id.as_str()).collect();
    assert_eq!(orphans, ["t-green", "t-red-2"]);
}

#[test]
fn pattern_and_no_pattern_do_not_match() {
    let variants = [variant("v1", &[("Color", "Red"), ("Pattern", "Stripes")], None)];
    let catalog = VariantCatalog::from_variants(&variants, &OptionNames::default());
    let report = match_templates(
        &catalog,
        &[GeneratedVariant {
            template_id: "t".to_string(),
            key: key("red", None),
        }],
    );
    assert!(report.matched.is_empty());
    assert_eq!(report.unmatched_offerings.len(), 1);
    assert_eq!(report.orphan_templates.len(), 1);
}
