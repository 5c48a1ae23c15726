use std::fmt;

/// Word-level spellings folded to one form before comparison.
const SPELLINGS: &[(&str, &str)] = &[
    ("grey", "gray"),
    ("greys", "grays"),
    ("colour", "color"),
    ("colours", "colors"),
];

/// Canonical key for a chip (color or pattern) display name.
///
/// `"Light Blue"`, `"light_blue"` and `"LIGHT-BLUE"` all become `light-blue`; `"Grey"` becomes
/// `gray`.
pub fn normalize_chip_key(raw: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut word = String::new();
    for c in raw.trim().chars() {
        if c.is_alphanumeric() {
            word.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            if !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
        }
    }
    if !word.is_empty() {
        words.push(word);
    }

    words
        .into_iter()
        .map(|w| {
            SPELLINGS
                .iter()
                .find(|(from, _)| *from == w)
                .map(|(_, to)| (*to).to_string())
                .unwrap_or(w)
        })
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
/// Normalized chip name.
#[serde(transparent)]
pub struct ChipKey(String);

impl ChipKey {
    /// Normalize `raw`; `None` when nothing comparable is left.
    pub fn new(raw: &str) -> Option<Self> {
        let key = normalize_chip_key(raw);
        (!key.is_empty()).then_some(Self(key))
    }

    /// Key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChipKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/variants/normalize.rs"]
mod tests;
