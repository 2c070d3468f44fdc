//! Cell and palette colors.
//!
//! A [`Color`] remembers the model it was picked in (RGB, HSV or HSL) so the
//! palette can round-trip a user's choice exactly, but two colors compare
//! equal whenever they render to the same 8-bit RGB triple.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ColorError {
    #[error("{component} must be within 0..={max}, got {value}")]
    OutOfRange {
        component: &'static str,
        value: f64,
        max: f64,
    },
}

fn check(component: &'static str, value: f64, max: f64) -> Result<f64, ColorError> {
    // NaN fails `contains` too
    if (0.0..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ColorError::OutOfRange {
            component,
            value,
            max,
        })
    }
}

fn channel(unit: f64) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue in degrees `0..=360`, saturation and value in percent `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// Hue in degrees `0..=360`, saturation and lightness in percent `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn unit(self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }
}

impl Hsv {
    pub fn new(h: f64, s: f64, v: f64) -> Result<Self, ColorError> {
        Ok(Self {
            h: check("hue", h, 360.0)?,
            s: check("saturation", s, 100.0)?,
            v: check("value", v, 100.0)?,
        })
    }
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Result<Self, ColorError> {
        Ok(Self {
            h: check("hue", h, 360.0)?,
            s: check("saturation", s, 100.0)?,
            l: check("lightness", l, 100.0)?,
        })
    }
}

impl From<Rgb> for Hsv {
    fn from(rgb: Rgb) -> Self {
        let [r, g, b] = rgb.unit();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let s = if max == 0.0 { 0.0 } else { delta / max };

        Hsv {
            h,
            s: s * 100.0,
            v: max * 100.0,
        }
    }
}

impl From<Hsv> for Rgb {
    fn from(hsv: Hsv) -> Self {
        let s = hsv.s / 100.0;
        let v = hsv.v / 100.0;
        let chroma = v * s;
        let sector = hsv.h.rem_euclid(360.0) / 60.0;
        let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());

        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = v - chroma;

        Rgb::new(channel(r + m), channel(g + m), channel(b + m))
    }
}

impl From<Hsv> for Hsl {
    fn from(hsv: Hsv) -> Self {
        let s = hsv.s / 100.0;
        let v = hsv.v / 100.0;
        let l = v * (1.0 - s / 2.0);
        let s = if l == 0.0 || l == 1.0 {
            0.0
        } else {
            (v - l) / l.min(1.0 - l)
        };

        Hsl {
            h: hsv.h,
            s: (s * 100.0).clamp(0.0, 100.0),
            l: (l * 100.0).clamp(0.0, 100.0),
        }
    }
}

impl From<Hsl> for Hsv {
    fn from(hsl: Hsl) -> Self {
        let s = hsl.s / 100.0;
        let l = hsl.l / 100.0;
        let v = l + s * l.min(1.0 - l);
        let s = if v == 0.0 { 0.0 } else { 2.0 * (1.0 - l / v) };

        Hsv {
            h: hsl.h,
            s: (s * 100.0).clamp(0.0, 100.0),
            v: (v * 100.0).clamp(0.0, 100.0),
        }
    }
}

/// A color in one of the three supported models.
///
/// Equality and hashing go through [`Color::to_rgb`], so `a == b` is symmetric
/// and transitive across models: both sides are reduced to the same fixed
/// 8-bit representation before comparing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "ColorJson", into = "ColorJson")]
pub enum Color {
    Rgb(Rgb),
    Hsv(Hsv),
    Hsl(Hsl),
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb(Rgb::new(r, g, b))
    }

    pub fn hsv(h: f64, s: f64, v: f64) -> Result<Self, ColorError> {
        Hsv::new(h, s, v).map(Color::Hsv)
    }

    pub fn hsl(h: f64, s: f64, l: f64) -> Result<Self, ColorError> {
        Hsl::new(h, s, l).map(Color::Hsl)
    }

    pub fn to_rgb(self) -> Rgb {
        match self {
            Color::Rgb(rgb) => rgb,
            Color::Hsv(hsv) => hsv.into(),
            Color::Hsl(hsl) => Hsv::from(hsl).into(),
        }
    }

    pub fn to_hsv(self) -> Hsv {
        match self {
            Color::Rgb(rgb) => rgb.into(),
            Color::Hsv(hsv) => hsv,
            Color::Hsl(hsl) => hsl.into(),
        }
    }

    pub fn to_hsl(self) -> Hsl {
        match self {
            Color::Rgb(rgb) => Hsv::from(rgb).into(),
            Color::Hsv(hsv) => hsv.into(),
            Color::Hsl(hsl) => hsl,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let Rgb { r, g, b } = self.to_rgb();
        [r, g, b, u8::MAX]
    }

    pub fn to_color32(self) -> egui::Color32 {
        let Rgb { r, g, b } = self.to_rgb();
        egui::Color32::from_rgb(r, g, b)
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.to_rgb() == other.to_rgb()
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_rgb().hash(state);
    }
}

impl From<egui::Color32> for Color {
    fn from(color: egui::Color32) -> Self {
        Color::rgb(color.r(), color.g(), color.b())
    }
}

/// Wire form: `{"rgb":[r,g,b]}`, `{"hsv":[h,s,v]}` or `{"hsl":[h,s,l]}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ColorJson {
    Rgb([u8; 3]),
    Hsv([f64; 3]),
    Hsl([f64; 3]),
}

impl TryFrom<ColorJson> for Color {
    type Error = ColorError;

    fn try_from(json: ColorJson) -> Result<Self, Self::Error> {
        match json {
            ColorJson::Rgb([r, g, b]) => Ok(Color::rgb(r, g, b)),
            ColorJson::Hsv([h, s, v]) => Color::hsv(h, s, v),
            ColorJson::Hsl([h, s, l]) => Color::hsl(h, s, l),
        }
    }
}

impl From<Color> for ColorJson {
    fn from(color: Color) -> Self {
        match color {
            Color::Rgb(Rgb { r, g, b }) => ColorJson::Rgb([r, g, b]),
            Color::Hsv(Hsv { h, s, v }) => ColorJson::Hsv([h, s, v]),
            Color::Hsl(Hsl { h, s, l }) => ColorJson::Hsl([h, s, l]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn pure_red_has_zero_hue_and_full_saturation() {
        let hsv = Color::rgb(255, 0, 0).to_hsv();
        assert!(approx_eq(hsv.h, 0.0));
        assert!(approx_eq(hsv.s, 100.0));
        assert!(approx_eq(hsv.v, 100.0));

        let hsl = Color::rgb(255, 0, 0).to_hsl();
        assert!(approx_eq(hsl.s, 100.0));
        assert!(approx_eq(hsl.l, 50.0));
    }

    #[test]
    fn grays_have_no_saturation() {
        let hsv = Color::rgb(128, 128, 128).to_hsv();
        assert!(approx_eq(hsv.s, 0.0));

        let white = Color::WHITE.to_hsl();
        assert!(approx_eq(white.s, 0.0));
        assert!(approx_eq(white.l, 100.0));
    }

    #[test]
    fn hue_360_wraps_to_red() {
        let color = Color::hsv(360.0, 100.0, 100.0).unwrap();
        assert_eq!(color.to_rgb(), Rgb::new(255, 0, 0));
    }

    #[test]
    fn equality_crosses_models_in_both_directions() {
        let rgb = Color::rgb(255, 0, 0);
        let hsv = Color::hsv(0.0, 100.0, 100.0).unwrap();
        let hsl = Color::hsl(0.0, 100.0, 50.0).unwrap();

        assert_eq!(rgb, hsv);
        assert_eq!(hsv, rgb);
        assert_eq!(rgb, hsl);
        assert_eq!(hsl, rgb);
        assert_eq!(hsv, hsl);
        assert_eq!(hsl, hsv);
        assert_ne!(rgb, Color::rgb(254, 0, 0));
    }

    #[test]
    fn out_of_range_components_are_rejected() {
        assert!(Color::hsv(361.0, 0.0, 0.0).is_err());
        assert!(Color::hsl(0.0, 101.0, 0.0).is_err());
        assert!(Color::hsv(0.0, f64::NAN, 0.0).is_err());
        assert!(Color::hsl(-1.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn serializes_with_model_tag() {
        let json = serde_json::to_string(&Color::rgb(1, 2, 3)).unwrap();
        assert_eq!(json, r#"{"rgb":[1,2,3]}"#);

        let parsed: Color = serde_json::from_str(r#"{"hsl":[0,100,50]}"#).unwrap();
        assert!(matches!(parsed, Color::Hsl(_)));
        assert_eq!(parsed, Color::rgb(255, 0, 0));
    }

    #[test]
    fn rejects_unknown_model_and_bad_ranges() {
        assert!(serde_json::from_str::<Color>(r#"{"cmyk":[0,0,0]}"#).is_err());
        assert!(serde_json::from_str::<Color>(r#"{"rgb":[0,0,300]}"#).is_err());
        assert!(serde_json::from_str::<Color>(r#"{"hsv":[400,0,0]}"#).is_err());
        assert!(serde_json::from_str::<Color>(r#"{"rgb":[0,0]}"#).is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rgb_survives_hsv_and_hsl(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
                let rgb = Rgb::new(r, g, b);
                prop_assert_eq!(Color::Hsv(Hsv::from(rgb)).to_rgb(), rgb);
                prop_assert_eq!(Color::Hsl(Color::Rgb(rgb).to_hsl()).to_rgb(), rgb);
            }

            #[test]
            fn equality_is_symmetric(
                h in 0.0_f64..=360.0,
                s in 0.0_f64..=100.0,
                v in 0.0_f64..=100.0,
            ) {
                let hsv = Color::hsv(h, s, v).unwrap();
                let hsl = Color::Hsl(hsv.to_hsl());
                let rgb = Color::Rgb(hsv.to_rgb());
                prop_assert_eq!(hsv == rgb, rgb == hsv);
                prop_assert_eq!(hsl == rgb, rgb == hsl);
                prop_assert_eq!(hsv == hsl, hsl == hsv);
                prop_assert!(hsv == rgb);
            }
        }
    }
}
