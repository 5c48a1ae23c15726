use crate::foundation::error::{SwatchError, SwatchResult};

pub use kurbo::{Point, Rect, Vec2};

/// Canvas extent of a scene document in pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Dimensions {
    /// Create validated dimensions (finite and > 0).
    pub fn new(width: f64, height: f64) -> SwatchResult<Self> {
        let d = Self { width, height };
        d.validate()?;
        Ok(d)
    }

    /// Check that both sides are finite and positive.
    pub fn validate(self) -> SwatchResult<()> {
        if !self.width.is_finite() || !self.height.is_finite() {
            return Err(SwatchError::validation("dimensions must be finite"));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(SwatchError::validation("dimensions width/height must be > 0"));
        }
        Ok(())
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Fully transparent black.
    pub const fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Parse a CSS color string.
    ///
    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`/`rgba()`, `hsl()`/`hsla()`, `transparent`,
    /// and a small set of named colors. Matching is case-insensitive.
    pub fn parse(s: &str) -> SwatchResult<Self> {
        let t = s.trim().to_ascii_lowercase();
        if let Some(hex) = t.strip_prefix('#') {
            return parse_hex(hex)
                .map_err(|e| SwatchError::validation(format!("color \"{s}\": {e}")));
        }
        if let Some(args) = func_args(&t, "rgba").or_else(|| func_args(&t, "rgb")) {
            return parse_rgb_args(args)
                .map_err(|e| SwatchError::validation(format!("color \"{s}\": {e}")));
        }
        if let Some(args) = func_args(&t, "hsla").or_else(|| func_args(&t, "hsl")) {
            return parse_hsl_args(args)
                .map_err(|e| SwatchError::validation(format!("color \"{s}\": {e}")));
        }
        named_color(&t).ok_or_else(|| SwatchError::validation(format!("unknown color \"{s}\"")))
    }

    /// `#rrggbb` form, alpha dropped.
    pub fn to_hex_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a `0..=1` opacity.
    pub fn opacity(self) -> f64 {
        f64::from(self.a) / 255.0
    }
}

fn func_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_hex(hex: &str) -> Result<Rgba8, String> {
    fn nibble(c: u8) -> Result<u8, String> {
        (c as char)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| format!("invalid hex digit '{}'", c as char))
    }
    fn byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    let b = hex.as_bytes();
    match hex.len() {
        3 | 4 => {
            let r = nibble(b[0])? * 17;
            let g = nibble(b[1])? * 17;
            let bl = nibble(b[2])? * 17;
            let a = if hex.len() == 4 { nibble(b[3])? * 17 } else { 255 };
            Ok(Rgba8 { r, g, b: bl, a })
        }
        6 | 8 => {
            if !hex.is_ascii() {
                return Err("hex color must be ASCII".to_owned());
            }
            let r = byte(&hex[0..2])?;
            let g = byte(&hex[2..4])?;
            let bl = byte(&hex[4..6])?;
            let a = if hex.len() == 8 { byte(&hex[6..8])? } else { 255 };
            Ok(Rgba8 { r, g, b: bl, a })
        }
        _ => Err("hex color must be #rgb, #rgba, #rrggbb or #rrggbbaa".to_owned()),
    }
}

fn split_args(args: &str) -> Vec<&str> {
    args.split([',', ' ', '/'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

fn parse_alpha(p: Option<&&str>) -> Result<u8, String> {
    let Some(p) = p else {
        return Ok(255);
    };
    let v = if let Some(pct) = p.strip_suffix('%') {
        pct.parse::<f64>().map_err(|_| format!("bad alpha \"{p}\""))? / 100.0
    } else {
        p.parse::<f64>().map_err(|_| format!("bad alpha \"{p}\""))?
    };
    Ok((v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn parse_rgb_args(args: &str) -> Result<Rgba8, String> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return Err("rgb() takes 3 or 4 components".to_owned());
    }
    let mut ch = [0u8; 3];
    for (i, p) in parts.iter().take(3).enumerate() {
        let v = if let Some(pct) = p.strip_suffix('%') {
            pct.parse::<f64>().map_err(|_| format!("bad component \"{p}\""))? * 2.55
        } else {
            p.parse::<f64>().map_err(|_| format!("bad component \"{p}\""))?
        };
        ch[i] = v.clamp(0.0, 255.0).round() as u8;
    }
    Ok(Rgba8 {
        r: ch[0],
        g: ch[1],
        b: ch[2],
        a: parse_alpha(parts.get(3))?,
    })
}

fn parse_hsl_args(args: &str) -> Result<Rgba8, String> {
    let parts = split_args(args);
    if parts.len() != 3 && parts.len() != 4 {
        return Err("hsl() takes 3 or 4 components".to_owned());
    }
    let num = |p: &str| -> Result<f64, String> {
        p.trim_end_matches(['%'])
            .trim_end_matches("deg")
            .parse::<f64>()
            .map_err(|_| format!("bad component \"{p}\""))
    };
    let h = num(parts[0])?;
    let s = num(parts[1])? / 100.0;
    let l = num(parts[2])? / 100.0;
    let (r, g, b) = hsl_to_rgb(h, s, l);
    let to_u8 = |x: f64| (x.clamp(0.0, 1.0) * 255.0).round() as u8;
    Ok(Rgba8 {
        r: to_u8(r),
        g: to_u8(g),
        b: to_u8(b),
        a: parse_alpha(parts.get(3))?,
    })
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let h = (h % 360.0 + 360.0) % 360.0 / 360.0;
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);

    if s == 0.0 {
        return (l, l, l);
    }

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    (
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

fn named_color(name: &str) -> Option<Rgba8> {
    Some(match name {
        "transparent" => Rgba8::transparent(),
        "black" => Rgba8::rgb(0, 0, 0),
        "white" => Rgba8::rgb(255, 255, 255),
        "red" => Rgba8::rgb(255, 0, 0),
        "green" => Rgba8::rgb(0, 128, 0),
        "blue" => Rgba8::rgb(0, 0, 255),
        "yellow" => Rgba8::rgb(255, 255, 0),
        "orange" => Rgba8::rgb(255, 165, 0),
        "purple" => Rgba8::rgb(128, 0, 128),
        "pink" => Rgba8::rgb(255, 192, 203),
        "gray" | "grey" => Rgba8::rgb(128, 128, 128),
        "silver" => Rgba8::rgb(192, 192, 192),
        "gold" => Rgba8::rgb(255, 215, 0),
        "navy" => Rgba8::rgb(0, 0, 128),
        "brown" => Rgba8::rgb(165, 42, 42),
        _ => return None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
