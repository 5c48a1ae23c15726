use serde::de::Error as _;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{SwatchError, SwatchResult};

/// One gradient stop: an offset in `[0, 1]` and a CSS color string.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient.
    pub offset: f64,
    /// Color exactly as authored.
    pub color: String,
}

/// Gradient color stops, stored on the wire as `[offset, color, offset, color, ...]`.
///
/// The typed form keeps offsets and colors apart, so nothing that rewrites colors can ever
/// touch an offset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorStops(pub Vec<ColorStop>);

impl ColorStops {
    /// Build from `(offset, color)` pairs.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (f64, S)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(offset, color)| ColorStop {
                    offset,
                    color: color.into(),
                })
                .collect(),
        )
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when there are no stops.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate stops in order.
    pub fn iter(&self) -> impl Iterator<Item = &ColorStop> {
        self.0.iter()
    }

    /// Iterate stops mutably in order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ColorStop> {
        self.0.iter_mut()
    }

    /// Check offsets are finite and inside `[0, 1]` and every color parses.
    pub fn validate(&self, field: &str) -> SwatchResult<()> {
        if self.0.is_empty() {
            return Err(SwatchError::validation(format!(
                "{field} must contain at least one stop"
            )));
        }
        for stop in &self.0 {
            if !stop.offset.is_finite() || !(0.0..=1.0).contains(&stop.offset) {
                return Err(SwatchError::validation(format!(
                    "{field} offsets must be finite and within [0, 1]"
                )));
            }
            Rgba8::parse(&stop.color)
                .map_err(|e| SwatchError::validation(format!("{field}: {e}")))?;
        }
        Ok(())
    }
}

impl serde::Serialize for ColorStops {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;

        let mut seq = serializer.serialize_seq(Some(self.0.len() * 2))?;
        for stop in &self.0 {
            seq.serialize_element(&stop.offset)?;
            seq.serialize_element(&stop.color)?;
        }
        seq.end()
    }
}

impl<'de> serde::Deserialize<'de> for ColorStops {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
        parse_flat_stops(&raw).map_err(D::Error::custom)
    }
}

/// Parse a flat alternating `[offset, color, ...]` array.
pub(crate) fn parse_flat_stops(raw: &[serde_json::Value]) -> Result<ColorStops, String> {
    if raw.len() % 2 != 0 {
        return Err(format!(
            "color stops must alternate [offset, color], got odd length {}",
            raw.len()
        ));
    }
    let mut out = Vec::with_capacity(raw.len() / 2);
    for (i, pair) in raw.chunks_exact(2).enumerate() {
        let offset = pair[0]
            .as_f64()
            .ok_or_else(|| format!("color stop entry {} must be a number", i * 2))?;
        let color = pair[1]
            .as_str()
            .ok_or_else(|| format!("color stop entry {} must be a color string", i * 2 + 1))?;
        out.push(ColorStop {
            offset,
            color: color.to_string(),
        });
    }
    Ok(ColorStops(out))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/stops.rs"]
mod tests;
