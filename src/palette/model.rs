use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

use crate::{
    foundation::core::Rgba8,
    foundation::error::{SwatchError, SwatchResult},
    variants::normalize::ChipKey,
};

/// Number of slots in a palette.
pub const SLOT_COUNT: usize = 5;

/// Five positional color slots for one chip.
///
/// Slot position is what two palettes of one product family have in common: `color2` of every
/// chip plays the same role in the design.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Palette {
    /// Slot 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color1: Option<String>,
    /// Slot 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color2: Option<String>,
    /// Slot 3.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color3: Option<String>,
    /// Slot 4; optional in most families.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color4: Option<String>,
    /// Slot 5; optional in most families.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color5: Option<String>,
}

impl Palette {
    /// Palette from leading slots; extra entries beyond five are ignored.
    pub fn from_slots<S: Into<String>>(slots: impl IntoIterator<Item = S>) -> Self {
        let mut out = Self::default();
        for (i, color) in slots.into_iter().take(SLOT_COUNT).enumerate() {
            *out.slot_mut(i) = Some(color.into());
        }
        out
    }

    /// Slot `index` (0-based).
    pub fn slot(&self, index: usize) -> Option<&str> {
        match index {
            0 => self.color1.as_deref(),
            1 => self.color2.as_deref(),
            2 => self.color3.as_deref(),
            3 => self.color4.as_deref(),
            4 => self.color5.as_deref(),
            _ => None,
        }
    }

    fn slot_mut(&mut self, index: usize) -> &mut Option<String> {
        match index {
            0 => &mut self.color1,
            1 => &mut self.color2,
            2 => &mut self.color3,
            3 => &mut self.color4,
            _ => &mut self.color5,
        }
    }

    /// Lowest slot whose color equals `color`, ignoring ASCII case and surrounding whitespace.
    pub fn slot_of(&self, color: &str) -> Option<usize> {
        let needle = color.trim();
        (0..SLOT_COUNT).find(|&i| {
            self.slot(i)
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(needle))
        })
    }

    /// Number of filled slots.
    pub fn filled(&self) -> usize {
        (0..SLOT_COUNT).filter(|&i| self.slot(i).is_some()).count()
    }

    /// Require at least one slot and parseable colors; `chip` names the palette in errors.
    pub fn validate(&self, chip: &str) -> SwatchResult<()> {
        if self.filled() == 0 {
            return Err(SwatchError::validation(format!(
                "palette '{chip}' must define at least one slot"
            )));
        }
        for i in 0..SLOT_COUNT {
            if let Some(c) = self.slot(i) {
                Rgba8::parse(c).map_err(|e| {
                    SwatchError::validation(format!("palette '{chip}' color{}: {e}", i + 1))
                })?;
            }
        }
        Ok(())
    }
}

/// Chip palettes keyed by normalized chip name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PaletteBook {
    chips: BTreeMap<ChipKey, Palette>,
}

impl PaletteBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chip. Names that normalize to an existing key are rejected.
    pub fn insert(&mut self, chip: &str, palette: Palette) -> SwatchResult<()> {
        let key = ChipKey::new(chip).ok_or_else(|| {
            SwatchError::validation(format!("palette chip name '{chip}' is empty"))
        })?;
        palette.validate(chip)?;
        if self.chips.contains_key(&key) {
            return Err(SwatchError::validation(format!(
                "palette chip '{chip}' collides with an existing chip as '{key}'"
            )));
        }
        self.chips.insert(key, palette);
        Ok(())
    }

    /// Parse `{ "<chip>": { "color1": "#..", ... }, ... }`.
    pub fn from_json(s: &str) -> SwatchResult<Self> {
        let raw: BTreeMap<String, Palette> = serde_json::from_str(s)
            .map_err(|e| SwatchError::validation(format!("parse palette book JSON: {e}")))?;
        let mut book = Self::new();
        for (chip, palette) in raw {
            book.insert(&chip, palette)?;
        }
        Ok(book)
    }

    /// Read and parse a palette book file.
    pub fn load(path: &Path) -> SwatchResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read palette book '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// Palette for a chip display name or key.
    pub fn palette_for(&self, chip: &str) -> Option<&Palette> {
        ChipKey::new(chip).and_then(|k| self.chips.get(&k))
    }

    /// Like [`PaletteBook::palette_for`], but a missing mapping is a validation error.
    pub fn require(&self, chip: &str) -> SwatchResult<&Palette> {
        self.palette_for(chip).ok_or_else(|| {
            SwatchError::validation(format!("no palette mapping for chip '{chip}'"))
        })
    }

    /// Chip keys in sorted order.
    pub fn chips(&self) -> impl Iterator<Item = &ChipKey> {
        self.chips.keys()
    }

    /// Number of chips.
    pub fn len(&self) -> usize {
        self.chips.len()
    }

    /// `true` when no chip is defined.
    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/palette/model.rs"]
mod tests;
