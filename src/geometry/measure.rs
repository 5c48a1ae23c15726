/// Estimates the rendered width of a run of text.
///
/// Curved-text arcs are sized from this estimate, so whatever draws a preview and whatever
/// draws the final output must share one implementation.
pub trait TextMeasure: Send + Sync {
    /// Width in pixels of `text` set in `font_family` at `font_size` pixels.
    fn text_width(&self, text: &str, font_family: &str, font_size: f64, bold: bool) -> f64;
}

/// Deterministic per-character advance table.
///
/// Glyphs fall into a handful of width classes expressed in ems; the family is ignored so the
/// estimate never depends on which fonts a host has installed.
#[derive(Clone, Copy, Debug, Default)]
pub struct AdvanceMeasure;

/// Width multiplier applied to bold weights.
pub const BOLD_WIDEN: f64 = 1.06;

impl AdvanceMeasure {
    /// Advance of one character in ems.
    pub fn advance_em(c: char) -> f64 {
        match c {
            ' ' | 'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.28,
            'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '{' | '}' | '-' | '"' => 0.36,
            'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.86,
            '0'..='9' => 0.56,
            'A'..='Z' => 0.68,
            'a'..='z' => 0.53,
            c if c.is_ascii() => 0.56,
            _ => 0.62,
        }
    }
}

impl TextMeasure for AdvanceMeasure {
    fn text_width(&self, text: &str, _font_family: &str, font_size: f64, bold: bool) -> f64 {
        let ems: f64 = text.chars().map(Self::advance_em).sum();
        let w = ems * font_size;
        if bold { w * BOLD_WIDEN } else { w }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/measure.rs"]
mod tests;
