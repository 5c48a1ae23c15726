use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::variants::normalize::{ChipKey, normalize_chip_key};

/// One `name: value` option selected by a platform variant.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOption {
    /// Option name, e.g. `Color`.
    pub name: String,
    /// Option value, e.g. `Light Blue`.
    pub value: String,
}

/// A sellable variant as reported by the commerce platform.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformVariant {
    /// Platform identifier.
    pub id: String,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Selected options (color, pattern, size, ...).
    #[serde(default)]
    pub selected_options: Vec<SelectedOption>,
    /// Face photograph for this variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Normalized (color, pattern) combination.
///
/// `pattern` is `None` for products without a pattern option. It is never filled in from some
/// other template: a key with a pattern and one without are different combinations.
#[serde(rename_all = "camelCase")]
pub struct VariantKey {
    /// Color chip.
    pub color: ChipKey,
    /// Pattern chip, when the product has a pattern option.
    pub pattern: Option<ChipKey>,
}

impl VariantKey {
    /// Key for display names; `None` when the color normalizes to nothing.
    pub fn new(color: &str, pattern: Option<&str>) -> Option<Self> {
        Some(Self {
            color: ChipKey::new(color)?,
            pattern: pattern.and_then(ChipKey::new),
        })
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pattern {
            Some(p) => write!(f, "{} / {}", self.color, p),
            None => write!(f, "{}", self.color),
        }
    }
}

/// Option names that identify the color and pattern dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionNames {
    color: BTreeSet<String>,
    pattern: BTreeSet<String>,
}

impl OptionNames {
    /// Build from display names; matching is by normalized name.
    pub fn new<S: AsRef<str>>(color: &[S], pattern: &[S]) -> Self {
        let norm = |names: &[S]| -> BTreeSet<String> {
            names
                .iter()
                .map(|n| normalize_chip_key(n.as_ref()))
                .filter(|n| !n.is_empty())
                .collect()
        };
        Self {
            color: norm(color),
            pattern: norm(pattern),
        }
    }

    fn find<'v>(names: &BTreeSet<String>, options: &'v [SelectedOption]) -> Option<&'v str> {
        options
            .iter()
            .find(|o| names.contains(&normalize_chip_key(&o.name)))
            .map(|o| o.value.as_str())
    }
}

impl Default for OptionNames {
    fn default() -> Self {
        Self::new(&["color", "colour"], &["pattern", "print", "design"])
    }
}

/// One sellable combination and every platform variant that carries it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Offering {
    /// Normalized combination.
    pub key: VariantKey,
    /// Color as first displayed by the platform.
    pub color_name: String,
    /// Pattern as first displayed by the platform.
    pub pattern_name: Option<String>,
    /// Every variant id sharing this combination (sizes, materials, ...).
    pub variant_ids: Vec<String>,
    /// First face photograph found among those variants.
    pub image_url: Option<String>,
}

/// A platform variant the catalog could not place.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedVariant {
    /// Platform identifier.
    pub variant_id: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Sellable combinations of one product, in first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantCatalog {
    offerings: Vec<Offering>,
    #[serde(skip)]
    index: BTreeMap<VariantKey, usize>,
    /// Variants without a usable color option.
    pub skipped: Vec<SkippedVariant>,
}

impl VariantCatalog {
    /// Group platform variants by normalized (color, pattern).
    pub fn from_variants(variants: &[PlatformVariant], names: &OptionNames) -> Self {
        let mut out = Self::default();
        for v in variants {
            let color = OptionNames::find(&names.color, &v.selected_options);
            let pattern = OptionNames::find(&names.pattern, &v.selected_options);
            let Some(key) = color.and_then(|c| VariantKey::new(c, pattern)) else {
                out.skipped.push(SkippedVariant {
                    variant_id: v.id.clone(),
                    reason: "no color option".to_string(),
                });
                continue;
            };

            match out.index.get(&key) {
                Some(&i) => {
                    let offering = &mut out.offerings[i];
                    offering.variant_ids.push(v.id.clone());
                    if offering.image_url.is_none() {
                        offering.image_url.clone_from(&v.image_url);
                    }
                }
                None => {
                    out.index.insert(key.clone(), out.offerings.len());
                    out.offerings.push(Offering {
                        key,
                        color_name: color.unwrap_or_default().trim().to_string(),
                        pattern_name: pattern.map(|p| p.trim().to_string()),
                        variant_ids: vec![v.id.clone()],
                        image_url: v.image_url.clone(),
                    });
                }
            }
        }
        out
    }

    /// Offering for a combination.
    pub fn get(&self, key: &VariantKey) -> Option<&Offering> {
        self.index.get(key).map(|&i| &self.offerings[i])
    }

    /// Offerings in first-seen order.
    pub fn offerings(&self) -> &[Offering] {
        &self.offerings
    }

    /// Number of distinct combinations.
    pub fn len(&self) -> usize {
        self.offerings.len()
    }

    /// `true` when the product sells no recognizable combination.
    pub fn is_empty(&self) -> bool {
        self.offerings.is_empty()
    }
}

/// A template waiting to be matched to a sellable combination.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedVariant {
    /// Template id.
    pub template_id: String,
    /// Combination the template was generated for.
    pub key: VariantKey,
}

/// A template paired with its platform variants.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantMatch {
    /// Template id.
    pub template_id: String,
    /// Shared combination.
    pub key: VariantKey,
    /// Platform variants to bind.
    pub variant_ids: Vec<String>,
    /// Face photograph to use as the template's base image.
    pub image_url: Option<String>,
}

/// Outcome of [`match_templates`]. Nothing is dropped: every offering and every template lands
/// in exactly one list.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    /// Paired templates.
    pub matched: Vec<VariantMatch>,
    /// Sellable combinations without a template.
    pub unmatched_offerings: Vec<Offering>,
    /// Templates without a sellable combination, including duplicates of an already-matched
    /// combination.
    pub orphan_templates: Vec<GeneratedVariant>,
}

/// Pair generated templates with catalog offerings by normalized key.
pub fn match_templates(catalog: &VariantCatalog, generated: &[GeneratedVariant]) -> MatchReport {
    let mut report = MatchReport::default();
    let mut taken = BTreeSet::new();

    for g in generated {
        match catalog.get(&g.key) {
            Some(offering) if taken.insert(g.key.clone()) => {
                report.matched.push(VariantMatch {
                    template_id: g.template_id.clone(),
                    key: g.key.clone(),
                    variant_ids: offering.variant_ids.clone(),
                    image_url: offering.image_url.clone(),
                });
            }
            _ => report.orphan_templates.push(g.clone()),
        }
    }

    report.unmatched_offerings = catalog
        .offerings()
        .iter()
        .filter(|o| !taken.contains(&o.key))
        .cloned()
        .collect();
    report
}

#[cfg(test)]
#[path = "../../tests/unit/variants/matcher.rs"]
mod tests;
