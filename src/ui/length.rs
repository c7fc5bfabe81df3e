//! Dimension specifications and their resolution to pixels.
//!
//! A [`Length`] stores its magnitude as a fixed-point integer (x100) so that
//! resolution is bit-identical across platforms. `px` lengths keep the raw
//! pixel count. The AUTO/STRETCH/INFINITY sentinels express sizing intent and
//! must be checked before numeric resolution.

use std::fmt;

use super::canvas::Canvas;
use super::geometry::{Insets, Size};

/// Measurement system of a [`Length`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Uninitialized; never resolved.
    #[default]
    None,
    /// Density-independent pixels, scaled by display density.
    Dp,
    /// Absolute pixels.
    Px,
    /// Percentage of a reference dimension.
    Percent,
    /// Percentage of the viewport width.
    Vw,
    /// Percentage of the viewport height.
    Vh,
    /// AUTO / STRETCH / INFINITY sentinels.
    Special,
}

/// External inputs needed to turn a [`Length`] into pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    /// Display density (pixels per dp).
    pub density: f32,
    /// Canvas size used by `vw`/`vh`.
    pub viewport: Size,
}

impl Default for LengthContext {
    fn default() -> Self {
        Self {
            density: 1.0,
            viewport: Size::ZERO,
        }
    }
}

impl LengthContext {
    pub fn new(density: f32, viewport: Size) -> Self {
        Self { density, viewport }
    }

    pub fn from_canvas(canvas: &dyn Canvas) -> Self {
        Self::new(canvas.density(), canvas.size())
    }
}

/// A UI dimension: a unit plus a fixed-point value, or a sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Length {
    value: i32,
    unit: Unit,
}

impl Length {
    /// Multiplier for fixed-point storage (two decimal places).
    pub const SCALE: f32 = 100.0;
    pub const VAL_STRETCH: i32 = -1;
    pub const VAL_AUTO: i32 = -2;
    pub const VAL_INFINITY: i32 = -3;

    pub const ZERO: Self = Self::px(0);

    fn scaled(v: f32, unit: Unit) -> Self {
        Self {
            value: (v * Self::SCALE).round() as i32,
            unit,
        }
    }

    pub fn dp(v: f32) -> Self {
        Self::scaled(v, Unit::Dp)
    }

    pub const fn px(v: i32) -> Self {
        Self {
            value: v,
            unit: Unit::Px,
        }
    }

    pub fn percent(v: f32) -> Self {
        Self::scaled(v, Unit::Percent)
    }

    pub fn vw(v: f32) -> Self {
        Self::scaled(v, Unit::Vw)
    }

    pub fn vh(v: f32) -> Self {
        Self::scaled(v, Unit::Vh)
    }

    pub const fn stretch() -> Self {
        Self {
            value: Self::VAL_STRETCH,
            unit: Unit::Special,
        }
    }

    pub const fn auto() -> Self {
        Self {
            value: Self::VAL_AUTO,
            unit: Unit::Special,
        }
    }

    pub const fn infinity() -> Self {
        Self {
            value: Self::VAL_INFINITY,
            unit: Unit::Special,
        }
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Stored value: pixels for `px`, x100 fixed point otherwise, sentinel for specials.
    pub fn raw_value(&self) -> i32 {
        self.value
    }

    /// Value in the unit's own scale (e.g. `12.5` for `12.5dp`).
    pub fn value(&self) -> f32 {
        match self.unit {
            Unit::Px | Unit::Special | Unit::None => self.value as f32,
            _ => self.value as f32 / Self::SCALE,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.unit != Unit::None
    }

    pub fn is_auto(&self) -> bool {
        self.unit == Unit::Special && self.value == Self::VAL_AUTO
    }

    pub fn is_stretch(&self) -> bool {
        self.unit == Unit::Special && self.value == Self::VAL_STRETCH
    }

    pub fn is_infinity(&self) -> bool {
        self.unit == Unit::Special && self.value == Self::VAL_INFINITY
    }

    pub fn is_special(&self) -> bool {
        self.unit == Unit::Special
    }

    /// Percent or stretch: depends on a reference only known after a first pass.
    pub fn is_relative(&self) -> bool {
        self.unit == Unit::Percent || self.is_stretch()
    }

    /// A valid, non-sentinel length that can be resolved numerically.
    pub fn is_concrete(&self) -> bool {
        self.is_valid() && !self.is_special()
    }

    /// Parses `"16"`, `"12.5dp"`, `"100px"`, `"50%"`, `"10vw"`, `"10vh"`,
    /// `auto`/`AUTO`, `stretch`/`STRETCH`, `infinity`/`INFINITY`.
    ///
    /// Never fails: anything else yields `px(0)`.
    pub fn parse(text: &str) -> Self {
        match text {
            "" => return Self::px(0),
            "auto" | "AUTO" => return Self::auto(),
            "stretch" | "STRETCH" => return Self::stretch(),
            "infinity" | "INFINITY" => return Self::infinity(),
            _ => {}
        }

        let (number, suffix) = text.split_at(numeric_prefix_len(text));
        let value = match number.parse::<f32>() {
            Ok(v) if v.is_finite() => v,
            _ => return Self::px(0),
        };

        match suffix {
            "" | "dp" => Self::dp(value),
            "px" => Self::px(value as i32),
            "%" => Self::percent(value),
            "vw" => Self::vw(value),
            "vh" => Self::vh(value),
            _ => Self::px(0),
        }
    }

    /// Resolves a concrete length to pixels. Sentinels and invalid lengths
    /// yield `None`.
    pub fn try_resolve(&self, ctx: &LengthContext, reference: i32) -> Option<i32> {
        let v = self.value as i64;
        let px = match self.unit {
            Unit::None | Unit::Special => return None,
            Unit::Px => v,
            Unit::Dp => (self.value as f64 * ctx.density as f64 / Self::SCALE as f64).round() as i64,
            Unit::Percent => div_round(v * reference as i64, 10_000),
            Unit::Vw => div_round(v * ctx.viewport.width as i64, 10_000),
            Unit::Vh => div_round(v * ctx.viewport.height as i64, 10_000),
        };
        Some(px.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
    }

    /// Resolves a concrete length to pixels.
    ///
    /// Callers must intercept sentinels with [`is_auto`](Self::is_auto),
    /// [`is_stretch`](Self::is_stretch) and [`is_infinity`](Self::is_infinity)
    /// first. Debug builds panic on a sentinel; release builds return 0.
    pub fn resolve(&self, ctx: &LengthContext, reference: i32) -> i32 {
        debug_assert!(
            self.is_concrete(),
            "numeric resolution of non-concrete length {self}"
        );
        self.try_resolve(ctx, reference).unwrap_or(0)
    }
}

/// Length of the leading `-?[0-9.]*` run plus an optional `e[+-]?[0-9]+`
/// exponent. An `e` without digits after it is left to the suffix.
fn numeric_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize, dot: bool| {
        while i < bytes.len() && (bytes[i].is_ascii_digit() || (dot && bytes[i] == b'.')) {
            i += 1;
        }
        i
    };
    let end = digits_from(usize::from(bytes.first() == Some(&b'-')), true);
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_end = digits_from(end + 1 + sign, false);
        if exp_end > end + 1 + sign {
            return exp_end;
        }
    }
    end
}

/// Integer division rounding half away from zero. `d` must be positive.
fn div_round(n: i64, d: i64) -> i64 {
    if n < 0 { (n - d / 2) / d } else { (n + d / 2) / d }
}

/// Formats a x100 fixed-point value with at most two decimals, no trailing zeros.
fn write_fixed(f: &mut fmt::Formatter<'_>, fixed: i32) -> fmt::Result {
    let sign = if fixed < 0 { "-" } else { "" };
    let abs = fixed.unsigned_abs();
    let (whole, frac) = (abs / 100, abs % 100);
    if frac == 0 {
        write!(f, "{sign}{whole}")
    } else if frac % 10 == 0 {
        write!(f, "{sign}{whole}.{}", frac / 10)
    } else {
        write!(f, "{sign}{whole}.{frac:02}")
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Unit::None => f.write_str("none"),
            Unit::Px => write!(f, "{}px", self.value),
            Unit::Dp => write_fixed(f, self.value).and_then(|_| f.write_str("dp")),
            Unit::Percent => write_fixed(f, self.value).and_then(|_| f.write_str("%")),
            Unit::Vw => write_fixed(f, self.value).and_then(|_| f.write_str("vw")),
            Unit::Vh => write_fixed(f, self.value).and_then(|_| f.write_str("vh")),
            Unit::Special => match self.value {
                Self::VAL_AUTO => f.write_str("auto"),
                Self::VAL_STRETCH => f.write_str("stretch"),
                _ => f.write_str("infinity"),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Composite specs
// ---------------------------------------------------------------------------

/// Margins or padding as four [`Length`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeInsets {
    pub left: Length,
    pub top: Length,
    pub right: Length,
    pub bottom: Length,
}

impl Default for EdgeInsets {
    fn default() -> Self {
        Self::all(Length::ZERO)
    }
}

impl EdgeInsets {
    pub const fn new(left: Length, top: Length, right: Length, bottom: Length) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn all(v: Length) -> Self {
        Self::new(v, v, v, v)
    }

    pub const fn symmetric(vertical: Length, horizontal: Length) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }

    /// Parses one (`all`), two (`vertical horizontal`) or four
    /// (`left top right bottom`) whitespace-separated lengths. Other arities
    /// yield zero insets.
    pub fn parse(text: &str) -> Self {
        let parts: Vec<Length> = text.split_whitespace().map(Length::parse).collect();
        match parts.as_slice() {
            [v] => Self::all(*v),
            [v, h] => Self::symmetric(*v, *h),
            [l, t, r, b] => Self::new(*l, *t, *r, *b),
            _ => Self::default(),
        }
    }

    /// Resolves each edge independently: left/right against the reference
    /// width, top/bottom against its height. Sentinels resolve to 0 and
    /// negative results are clamped to 0.
    pub fn resolve(&self, ctx: &LengthContext, reference: Size) -> Insets {
        let edge = |l: &Length, r: i32| l.try_resolve(ctx, r).unwrap_or(0).max(0);
        Insets::new(
            edge(&self.left, reference.width),
            edge(&self.top, reference.height),
            edge(&self.right, reference.width),
            edge(&self.bottom, reference.height),
        )
    }
}

/// Requested width/height of a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutSize {
    pub width: Length,
    pub height: Length,
}

impl Default for LayoutSize {
    fn default() -> Self {
        Self::auto()
    }
}

impl LayoutSize {
    pub const fn new(width: Length, height: Length) -> Self {
        Self { width, height }
    }

    pub const fn auto() -> Self {
        Self::new(Length::auto(), Length::auto())
    }

    pub fn is_relative(&self) -> bool {
        self.width.is_relative() || self.height.is_relative()
    }
}

/// Min/max bounds as lengths. Defaults: min 0, max infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoxConstraints {
    pub min_width: Length,
    pub min_height: Length,
    pub max_width: Length,
    pub max_height: Length,
}

impl Default for BoxConstraints {
    fn default() -> Self {
        Self {
            min_width: Length::ZERO,
            min_height: Length::ZERO,
            max_width: Length::infinity(),
            max_height: Length::infinity(),
        }
    }
}

/// Pixel bounds resolved from [`BoxConstraints`]. A negative max means "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBounds {
    pub min: Size,
    pub max: Size,
}

impl BoxConstraints {
    pub fn resolve(&self, ctx: &LengthContext, reference: Size) -> PixelBounds {
        let min = |l: &Length, r: i32| l.try_resolve(ctx, r).unwrap_or(0).max(0);
        let max = |l: &Length, r: i32| {
            if l.is_stretch() {
                r
            } else {
                l.try_resolve(ctx, r).map_or(-1, |v| v.max(0))
            }
        };
        PixelBounds {
            min: Size::new(
                min(&self.min_width, reference.width),
                min(&self.min_height, reference.height),
            ),
            max: Size::new(
                max(&self.max_width, reference.width),
                max(&self.max_height, reference.height),
            ),
        }
    }

    /// True when both bounds on an axis are absolute pixels and min > max.
    pub fn is_contradictory(&self) -> bool {
        let bad = |min: &Length, max: &Length| {
            min.unit() == Unit::Px && max.unit() == Unit::Px && min.raw_value() > max.raw_value()
        };
        bad(&self.min_width, &self.max_width) || bad(&self.min_height, &self.max_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> LengthContext {
        LengthContext::new(1.5, Size::new(800, 600))
    }

    #[test]
    fn parse_table() {
        assert_eq!(Length::parse("16"), Length::dp(16.0));
        assert_eq!(Length::parse("16").raw_value(), 1600);
        assert_eq!(Length::parse("12.5dp").raw_value(), 1250);
        assert_eq!(Length::parse("100px"), Length::px(100));
        assert_eq!(Length::parse("50.5%").raw_value(), 5050);
        assert_eq!(Length::parse("50.5%").unit(), Unit::Percent);
        assert_eq!(Length::parse("10vw"), Length::vw(10.0));
        assert_eq!(Length::parse("25vh"), Length::vh(25.0));
        assert_eq!(Length::parse("-4px"), Length::px(-4));
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert!(Length::parse("auto").is_auto());
        assert!(Length::parse("AUTO").is_auto());
        assert!(Length::parse("stretch").is_stretch());
        assert!(Length::parse("STRETCH").is_stretch());
        assert_eq!(Length::parse("Auto"), Length::px(0));
        assert_eq!(Length::parse("Stretch"), Length::px(0));
    }

    #[test]
    fn garbage_degrades_to_zero_px() {
        for s in ["", "invalid", "12em", "px", ".", "+5", "1.2.3", "--1", "NaN"] {
            assert_eq!(Length::parse(s), Length::px(0), "input {s:?}");
        }
    }

    #[test]
    fn exponent_forms_parse() {
        assert_eq!(Length::parse("1e2"), Length::dp(100.0));
        assert_eq!(Length::parse("2.5E1%"), Length::percent(25.0));
        assert_eq!(Length::parse("1e2px"), Length::px(100));
        assert_eq!(Length::parse("5e-1dp"), Length::dp(0.5));
        assert_eq!(Length::parse("-1e+1vw"), Length::vw(-10.0));
        assert_eq!(Length::parse("1e"), Length::px(0));
        assert_eq!(Length::parse("3em"), Length::px(0));
    }

    #[test]
    fn px_parse_truncates() {
        assert_eq!(Length::parse("12.9px"), Length::px(12));
    }

    #[test]
    fn display_round_trips() {
        let samples = [
            Length::dp(12.5),
            Length::dp(-0.5),
            Length::px(100),
            Length::percent(33.33),
            Length::percent(50.0),
            Length::vw(12.3),
            Length::vh(7.05),
            Length::auto(),
            Length::stretch(),
            Length::infinity(),
        ];
        for l in samples {
            assert_eq!(Length::parse(&l.to_string()), l, "{l}");
        }
        assert_eq!(Length::dp(12.5).to_string(), "12.5dp");
        assert_eq!(Length::percent(33.33).to_string(), "33.33%");
        assert_eq!(Length::vh(7.05).to_string(), "7.05vh");
    }

    #[test]
    fn resolve_units() {
        let c = ctx();
        assert_eq!(Length::px(42).resolve(&c, 1000), 42);
        assert_eq!(Length::dp(10.0).resolve(&c, 1000), 15);
        assert_eq!(Length::percent(50.0).resolve(&c, 200), 100);
        assert_eq!(Length::percent(33.33).resolve(&c, 100), 33);
        assert_eq!(Length::vw(10.0).resolve(&c, 5), 80);
        assert_eq!(Length::vh(50.0).resolve(&c, 5), 300);
    }

    #[test]
    fn percent_rounds_half_away_from_zero() {
        let c = ctx();
        // 25% of 2 = 0.5
        assert_eq!(Length::percent(25.0).resolve(&c, 2), 1);
        assert_eq!(Length::percent(-25.0).resolve(&c, 2), -1);
    }

    #[test]
    fn sentinels_do_not_resolve() {
        let c = ctx();
        assert_eq!(Length::auto().try_resolve(&c, 100), None);
        assert_eq!(Length::stretch().try_resolve(&c, 100), None);
        assert_eq!(Length::infinity().try_resolve(&c, 100), None);
        assert_eq!(Length::default().try_resolve(&c, 100), None);
        assert!(!Length::default().is_valid());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "non-concrete")]
    fn resolving_sentinel_panics_in_debug() {
        Length::auto().resolve(&ctx(), 100);
    }

    #[test]
    fn edge_insets_clamp_negative_edges() {
        let e = EdgeInsets::new(Length::px(-5), Length::px(3), Length::percent(10.0), Length::auto());
        let r = e.resolve(&ctx(), Size::new(200, 100));
        assert_eq!(r, Insets::new(0, 3, 20, 0));
    }

    #[test]
    fn edge_insets_parse_arity() {
        assert_eq!(EdgeInsets::parse("4px"), EdgeInsets::all(Length::px(4)));
        assert_eq!(
            EdgeInsets::parse("2px 8px"),
            EdgeInsets::symmetric(Length::px(2), Length::px(8))
        );
        assert_eq!(
            EdgeInsets::parse("1px 2px 3px 4px"),
            EdgeInsets::new(Length::px(1), Length::px(2), Length::px(3), Length::px(4))
        );
        assert_eq!(EdgeInsets::parse("1px 2px 3px"), EdgeInsets::default());
    }

    #[test]
    fn constraints_default_unbounded() {
        let b = BoxConstraints::default().resolve(&ctx(), Size::new(100, 100));
        assert_eq!(b.min, Size::ZERO);
        assert_eq!(b.max, Size::UNSET);
    }

    #[test]
    fn constraints_contradiction_detected() {
        let c = BoxConstraints {
            min_width: Length::px(50),
            max_width: Length::px(10),
            ..BoxConstraints::default()
        };
        assert!(c.is_contradictory());
        assert!(!BoxConstraints::default().is_contradictory());
    }
}
