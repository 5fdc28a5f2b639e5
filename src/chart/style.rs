//! Colours, palettes and figure styles.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Colours
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    const fn hex(v: u32) -> Self {
        Self::rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    /// Parses `#rrggbb` or a named colour.
    pub fn parse(s: &str) -> Option<Color> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() == 6 {
                return u32::from_str_radix(hex, 16).ok().map(Color::hex);
            }
            return None;
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, c)| *c)
    }

    /// Linear blend: `t = 0` gives `self`, `t = 1` gives `other`.
    pub fn mix(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgb(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

static NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::hex(0x000000)),
    ("white", Color::hex(0xffffff)),
    ("gray", Color::hex(0x808080)),
    ("grey", Color::hex(0x808080)),
    ("lightgray", Color::hex(0xd3d3d3)),
    ("red", Color::hex(0xff0000)),
    ("green", Color::hex(0x008000)),
    ("blue", Color::hex(0x0000ff)),
    ("orange", Color::hex(0xffa500)),
    ("purple", Color::hex(0x800080)),
    ("navy", Color::hex(0x000080)),
    ("teal", Color::hex(0x008080)),
    ("tomato", Color::hex(0xff6347)),
    ("gold", Color::hex(0xffd700)),
    ("skyblue", Color::hex(0x87ceeb)),
    ("steelblue", Color::hex(0x4682b4)),
    ("lightblue", Color::hex(0xadd8e6)),
    ("darkblue", Color::hex(0x00008b)),
    ("seagreen", Color::hex(0x2e8b57)),
    ("salmon", Color::hex(0xfa8072)),
];

// ---------------------------------------------------------------------------
// Palettes
// ---------------------------------------------------------------------------

static TAB10: [Color; 10] = [
    Color::hex(0x1f77b4), Color::hex(0xff7f0e), Color::hex(0x2ca02c), Color::hex(0xd62728),
    Color::hex(0x9467bd), Color::hex(0x8c564b), Color::hex(0xe377c2), Color::hex(0x7f7f7f),
    Color::hex(0xbcbd22), Color::hex(0x17becf),
];

static TAB20: [Color; 20] = [
    Color::hex(0x1f77b4), Color::hex(0xaec7e8), Color::hex(0xff7f0e), Color::hex(0xffbb78),
    Color::hex(0x2ca02c), Color::hex(0x98df8a), Color::hex(0xd62728), Color::hex(0xff9896),
    Color::hex(0x9467bd), Color::hex(0xc5b0d5), Color::hex(0x8c564b), Color::hex(0xc49c94),
    Color::hex(0xe377c2), Color::hex(0xf7b6d2), Color::hex(0x7f7f7f), Color::hex(0xc7c7c7),
    Color::hex(0xbcbd22), Color::hex(0xdbdb8d), Color::hex(0x17becf), Color::hex(0x9edae5),
];

static TAB20C: [Color; 20] = [
    Color::hex(0x3182bd), Color::hex(0x6baed6), Color::hex(0x9ecae1), Color::hex(0xc6dbef),
    Color::hex(0xe6550d), Color::hex(0xfd8d3c), Color::hex(0xfdae6b), Color::hex(0xfdd0a2),
    Color::hex(0x31a354), Color::hex(0x74c476), Color::hex(0xa1d99b), Color::hex(0xc7e9c0),
    Color::hex(0x756bb1), Color::hex(0x9e9ac8), Color::hex(0xbcbddc), Color::hex(0xdadaeb),
    Color::hex(0x636363), Color::hex(0x969696), Color::hex(0xbdbdbd), Color::hex(0xd9d9d9),
];

static SET2: [Color; 8] = [
    Color::hex(0x66c2a5), Color::hex(0xfc8d62), Color::hex(0x8da0cb), Color::hex(0xe78ac3),
    Color::hex(0xa6d854), Color::hex(0xffd92f), Color::hex(0xe5c494), Color::hex(0xb3b3b3),
];

static GGPLOT: [Color; 7] = [
    Color::hex(0xe24a33), Color::hex(0x348abd), Color::hex(0x988ed5), Color::hex(0x777777),
    Color::hex(0xfbc15e), Color::hex(0x8eba42), Color::hex(0xffb5b8),
];

static DEEP: [Color; 10] = [
    Color::hex(0x4c72b0), Color::hex(0xdd8452), Color::hex(0x55a868), Color::hex(0xc44e52),
    Color::hex(0x8172b3), Color::hex(0x937860), Color::hex(0xda8bc3), Color::hex(0x8c8c8c),
    Color::hex(0xccb974), Color::hex(0x64b5cd),
];

static BMH: [Color; 10] = [
    Color::hex(0x348abd), Color::hex(0xa60628), Color::hex(0x7a68a6), Color::hex(0x467821),
    Color::hex(0xd55e00), Color::hex(0xcc79a7), Color::hex(0x56b4e9), Color::hex(0x009e73),
    Color::hex(0xf0e442), Color::hex(0x0072b2),
];

static VIRIDIS: [Color; 10] = [
    Color::hex(0x440154), Color::hex(0x482878), Color::hex(0x3e4989), Color::hex(0x31688e),
    Color::hex(0x26828e), Color::hex(0x1f9e89), Color::hex(0x35b779), Color::hex(0x6ece58),
    Color::hex(0xb5de2b), Color::hex(0xfde725),
];

static BLUES: [Color; 9] = [
    Color::hex(0xf7fbff), Color::hex(0xdeebf7), Color::hex(0xc6dbef), Color::hex(0x9ecae1),
    Color::hex(0x6baed6), Color::hex(0x4292c6), Color::hex(0x2171b5), Color::hex(0x08519c),
    Color::hex(0x08306b),
];

/// How series colours are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum Palette {
    /// Cycles through a fixed list.
    Qualitative(&'static [Color]),
    /// Samples a colour map evenly, first series at the low end.
    Sequential(&'static [Color]),
    /// Every series gets the same colour.
    Single(Color),
}

impl Palette {
    pub fn from_name(name: &str) -> Result<Palette> {
        let palette = match name {
            "tab10" => Palette::Qualitative(&TAB10),
            "tab20" => Palette::Qualitative(&TAB20),
            "tab20c" => Palette::Qualitative(&TAB20C),
            "Set2" => Palette::Qualitative(&SET2),
            "deep" => Palette::Qualitative(&DEEP),
            "viridis" => Palette::Sequential(&VIRIDIS),
            "Blues" => Palette::Sequential(&BLUES),
            other => match Color::parse(other) {
                Some(c) => Palette::Single(c),
                None => {
                    return Err(Error::Chart {
                        message: format!("unknown palette or colour '{}'", other),
                    });
                }
            },
        };
        Ok(palette)
    }

    /// Colour of series `i` out of `n`.
    pub fn color(&self, i: usize, n: usize) -> Color {
        match self {
            Palette::Qualitative(colors) => colors[i % colors.len()],
            Palette::Single(c) => *c,
            Palette::Sequential(stops) => {
                let t = if n <= 1 { 0.0 } else { i as f64 / (n - 1) as f64 };
                let pos = t * (stops.len() - 1) as f64;
                let lo = pos.floor() as usize;
                let hi = (lo + 1).min(stops.len() - 1);
                stops[lo].mix(stops[hi], pos - lo as f64)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

/// Figure-wide colours, the equivalent of a plotting style sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    pub name: &'static str,
    pub background: Color,
    pub axes_background: Color,
    pub foreground: Color,
    pub grid: Color,
    #[serde(skip)]
    pub cycle: &'static [Color],
}

impl Default for Style {
    fn default() -> Self {
        Style {
            name: "default",
            background: Color::hex(0xffffff),
            axes_background: Color::hex(0xffffff),
            foreground: Color::hex(0x000000),
            grid: Color::hex(0xb0b0b0),
            cycle: &TAB10,
        }
    }
}

impl Style {
    pub fn from_name(name: &str) -> Result<Style> {
        let style = match name {
            "default" => Style::default(),
            "ggplot" => Style {
                name: "ggplot",
                background: Color::hex(0xffffff),
                axes_background: Color::hex(0xe5e5e5),
                foreground: Color::hex(0x555555),
                grid: Color::hex(0xffffff),
                cycle: &GGPLOT,
            },
            "seaborn" | "seaborn-v0_8" => Style {
                name: "seaborn",
                background: Color::hex(0xffffff),
                axes_background: Color::hex(0xeaeaf2),
                foreground: Color::hex(0x262626),
                grid: Color::hex(0xffffff),
                cycle: &DEEP,
            },
            "dark_background" => Style {
                name: "dark_background",
                background: Color::hex(0x000000),
                axes_background: Color::hex(0x000000),
                foreground: Color::hex(0xffffff),
                grid: Color::hex(0x555555),
                cycle: &TAB10,
            },
            "bmh" => Style {
                name: "bmh",
                background: Color::hex(0xffffff),
                axes_background: Color::hex(0xeeeeee),
                foreground: Color::hex(0x262626),
                grid: Color::hex(0xb2b2b2),
                cycle: &BMH,
            },
            other => {
                return Err(Error::Chart {
                    message: format!("unknown style '{}'", other),
                });
            }
        };
        Ok(style)
    }

    /// The style's own series colours.
    pub fn palette(&self) -> Palette {
        Palette::Qualitative(self.cycle)
    }
}
