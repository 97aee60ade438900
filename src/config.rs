use anyhow::{bail, Context, Result};
use std::str::FromStr;

use crate::utils::Rect;

pub const WIDTH: u16 = 512;
pub const HEIGHT: u16 = 384;
pub const OPAQUE: u32 = 0xffff_ffff;
pub const WID_PLACEHOLDER: &str = "%WID";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Rectangle,
    Circle,
    Triangle,
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Rectangle
    }
}

impl FromStr for Shape {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rectangle" => Ok(Shape::Rectangle),
            "circle" => Ok(Shape::Circle),
            "triangle" => Ok(Shape::Triangle),
            other => bail!("unknown shape '{}'", other),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WindowFlags {
    pub no_input: bool,
    pub argb: bool,
    pub desktop_type: bool,
    pub fullscreen: bool,
    pub undecorated: bool,
    pub sticky: bool,
    pub skip_taskbar: bool,
    pub skip_pager: bool,
    pub above: bool,
    pub below: bool,
    pub no_focus: bool,
    pub override_redirect: bool,
    pub force_attach: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    pub geometry: Rect,
    pub shape: Shape,
    pub opacity: u32,
    pub flags: WindowFlags,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            geometry: Rect::new(0, 0, WIDTH, HEIGHT),
            shape: Shape::default(),
            opacity: OPAQUE,
            flags: WindowFlags::default(),
        }
    }
}

impl WindowConfig {
    pub fn is_opaque(&self) -> bool {
        self.opacity == OPAQUE
    }
}

/// Parsed X geometry string. Absent parts leave the defaults alone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub x: Option<i16>,
    pub y: Option<i16>,
}

impl Geometry {
    pub fn apply(&self, rect: &mut Rect) {
        if let Some(width) = self.width {
            rect.width = width;
        }
        if let Some(height) = self.height {
            rect.height = height;
        }
        if let Some(x) = self.x {
            rect.x = x;
        }
        if let Some(y) = self.y {
            rect.y = y;
        }
    }
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or_else(|| s.len());
    s.split_at(end)
}

fn take_offset(s: &str) -> Result<(i16, &str)> {
    let (negative, rest) = match s.chars().next() {
        Some('+') => (false, &s[1..]),
        Some('-') => (true, &s[1..]),
        _ => bail!("expected '+' or '-' in '{}'", s),
    };
    let (digits, rest) = split_digits(rest);
    let value: i16 = digits.parse().with_context(|| format!("bad offset '{}'", s))?;
    Ok((if negative { -value } else { value }, rest))
}

impl FromStr for Geometry {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut geom = Geometry::default();
        let mut rest = s.strip_prefix('=').unwrap_or(s);

        if rest.starts_with(|c: char| c.is_ascii_digit()) {
            let (width, tail) = split_digits(rest);
            geom.width = Some(width.parse().with_context(|| format!("bad width in '{}'", s))?);
            rest = tail;
        }
        if let Some(tail) = rest.strip_prefix(|c: char| c == 'x' || c == 'X') {
            let (height, tail) = split_digits(tail);
            geom.height = Some(height.parse().with_context(|| format!("bad height in '{}'", s))?);
            rest = tail;
        }
        if !rest.is_empty() {
            let (x, tail) = take_offset(rest)?;
            let (y, tail) = take_offset(tail)?;
            if !tail.is_empty() {
                bail!("trailing characters in geometry '{}'", s);
            }
            geom.x = Some(x);
            geom.y = Some(y);
        }
        if geom == Geometry::default() {
            bail!("empty geometry '{}'", s);
        }
        Ok(geom)
    }
}

/// Scale a 0.0..=1.0 opacity onto the 32-bit `_NET_WM_WINDOW_OPACITY` range.
pub fn parse_opacity(s: &str) -> Result<u32> {
    let value: f64 = s
        .trim()
        .parse()
        .with_context(|| format!("invalid opacity '{}'", s))?;
    if value.is_nan() {
        bail!("invalid opacity '{}'", s);
    }
    Ok((value.max(0.0).min(1.0) * OPAQUE as f64).round() as u32)
}
