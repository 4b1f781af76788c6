//! Palette Generator Module
//! Derives a harmonious color per chart entity from its index and the
//! entity count via uniform hue rotation.

use plotters::style::RGBColor;

/// Alpha applied to base node and series colors.
pub const BASE_ALPHA: f64 = 0.6;

/// Alpha applied to the muted variant used for flow edges.
pub const MUTED_ALPHA: f64 = 0.3;

/// One generated RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl ChartColor {
    /// CSS `rgba(...)` string as embedded in the HTML figure.
    pub fn rgba(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.alpha)
    }

    /// Same color at reduced opacity, without recomputing the hue.
    pub fn muted(&self) -> ChartColor {
        ChartColor {
            alpha: MUTED_ALPHA,
            ..*self
        }
    }

    /// Opaque equivalent for the plotters backend.
    pub fn to_plotters(&self) -> RGBColor {
        RGBColor(self.r, self.g, self.b)
    }
}

/// Generate `n` colors with hues evenly spaced around the hue circle
/// (color i sits at hue i/n) at the given saturation and value.
/// `n == 0` yields an empty palette.
pub fn generate_colors(n: usize, saturation: f64, value: f64) -> Vec<ChartColor> {
    if n == 0 {
        return Vec::new();
    }

    (0..n)
        .map(|i| {
            let hue = i as f64 / n as f64;
            let (r, g, b) = hsv_to_rgb(hue, saturation, value);
            ChartColor {
                r,
                g,
                b,
                alpha: BASE_ALPHA,
            }
        })
        .collect()
}

/// HSV to RGB, all inputs in [0, 1]; hue wraps.
fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (u8, u8, u8) {
    let h = hue.rem_euclid(1.0) * 6.0;
    let sector = h.floor() as u32 % 6;
    let f = h - h.floor();

    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));

    let (r, g, b) = match sector {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };

    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}
