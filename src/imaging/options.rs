//! phpThumb-style option bag and its typed, normalized form.
//!
//! [`RawOptions`] is the loosely-typed key/value set a caller hands in (from
//! a CLI, a job file, or code). [`normalize`] turns it into
//! [`TransformOptions`], deciding once how absent, empty, zero and malformed
//! values are treated:
//!
//! | Key | Field | Absent | `0` / empty | Malformed |
//! |---|---|---|---|---|
//! | `w`, `h`, `wl`..`hs` | `Option<f64>` | `None` | `Some(0.0)`: present, clears the dimension | warning, `None` |
//! | `scale` | `Option<f64>` | `None` | warning, `None` | warning, `None` |
//! | `aoe`, `strip` | `bool` | `false` | `false` | n/a |
//! | `zc`, `far` | `Option<Anchor>` | `None` | `None` (off) | center |
//! | `bg` | `Option<Background>` | `None` | `None` | warning, white |
//! | `sw`, `sh`, `sx`, `sy` | `Option<f64>` | `None` | `Some(0.0)` | warning, `None` |
//! | `q`, `qmax` | `Option<Quality>` | `None` | `Some(0)` | warning, `None` |
//! | `fltr` | `Vec<Filter>` | empty | empty | n/a |
//!
//! Nothing here fails: problems come back as [`OptionWarning`]s next to the
//! options, and the offending key behaves as if it were not supplied.

use super::params::{Color, Dimensions, Quality};
use super::position::Anchor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// A single raw option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<OptionValue>),
}

impl OptionValue {
    /// Numeric reading. Text is trimmed and parsed; lists have no number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) if f.is_finite() => Some(*f),
            Self::Float(_) => None,
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            Self::List(_) => None,
        }
    }

    /// Loose truthiness: `false`, `0`, `""`, `"0"` and empty lists are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(s) => {
                let s = s.trim();
                !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
            }
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Flatten into the list of strings it carries.
    fn texts(&self) -> Vec<String> {
        match self {
            Self::List(items) => items.iter().flat_map(Self::texts).collect(),
            other => vec![other.to_string()],
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for OptionValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for OptionValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<OptionValue>> From<Vec<T>> for OptionValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// Keys whose repeated `key=value` tokens accumulate instead of replacing.
const LIST_KEYS: &[&str] = &["fltr"];

/// The raw option set, keyed by option name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawOptions(BTreeMap<String, OptionValue>);

impl RawOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, replacing any previous value.
    pub fn with(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<OptionValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build from `key=value` tokens.
    ///
    /// Keys ending in `[]` (e.g. `fltr[]=usm`) and repeated `fltr` tokens
    /// accumulate into a list. Any other repeated key keeps its last value.
    /// A token without `=` is a flag set to `1`.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut raw = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').unwrap_or((pair, "1"));
            let key = key.trim();
            if key.is_empty() {
                return Err(format!("option without a key: '{pair}'"));
            }
            let (key, is_list) = match key.strip_suffix("[]") {
                Some(stripped) => (stripped, true),
                None => (key, LIST_KEYS.contains(&key)),
            };
            let value = OptionValue::Text(value.to_string());
            if !is_list {
                raw.0.insert(key.to_string(), value);
                continue;
            }
            match raw.0.remove(key) {
                Some(OptionValue::List(mut items)) => {
                    items.push(value);
                    raw.0.insert(key.to_string(), OptionValue::List(items));
                }
                Some(previous) => {
                    raw.0
                        .insert(key.to_string(), OptionValue::List(vec![previous, value]));
                }
                None => {
                    raw.0.insert(key.to_string(), OptionValue::List(vec![value]));
                }
            }
        }
        Ok(raw)
    }
}

impl fmt::Display for RawOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        f.write_str(&parts.join(" "))
    }
}

/// Non-fatal problem found while normalizing options.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionWarning {
    #[error("unrecognized option '{key}' = '{value}'")]
    KeyNotRecognized { key: String, value: String },
    #[error("invalid value for '{key}': '{value}' ({reason})")]
    ValueInvalid {
        key: String,
        value: String,
        reason: &'static str,
    },
}

/// Orientation of the original image, classified on its aspect rounded to
/// two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    pub fn classify(original: Dimensions) -> Self {
        let aspect = (original.aspect() * 100.0).round() / 100.0;
        if aspect > 1.0 {
            Self::Landscape
        } else if aspect < 1.0 {
            Self::Portrait
        } else {
            Self::Square
        }
    }
}

/// A requested width/height pair, either side possibly absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeRequest {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl SizeRequest {
    /// Neither dimension was asked for.
    pub fn is_empty(self) -> bool {
        self.width.is_none() && self.height.is_none()
    }

    /// Overlay `other` on top of `self`, field by field.
    fn overridden_by(self, other: SizeRequest) -> Self {
        Self {
            width: other.width.or(self.width),
            height: other.height.or(self.height),
        }
    }

    /// Drop zero values: an explicit `0` clears the dimension.
    fn positive(self) -> Self {
        Self {
            width: self.width.filter(|w| *w > 0.0),
            height: self.height.filter(|h| *h > 0.0),
        }
    }
}

/// Letterbox/background fill from `bg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background {
    pub color: Color,
    /// 0 = fully transparent, 100 = fully opaque.
    pub opacity: u8,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 100,
        }
    }
}

/// Source sub-window request (`sw`, `sh`, `sx`, `sy`).
///
/// Values below 1 are fractions of the original extent, values of 1 and
/// above are pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SourceWindow {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// An entry of `fltr`. Only unsharp mask does anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// `usm|amount|radius|threshold`; the parameters are ignored.
    UnsharpMask,
    Other(String),
}

impl Filter {
    pub fn parse(spec: &str) -> Self {
        let name = spec.split('|').next().unwrap_or("").trim();
        if name == "usm" {
            Self::UnsharpMask
        } else {
            Self::Other(spec.to_string())
        }
    }
}

/// Normalized, typed option set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformOptions {
    /// `w` / `h`
    pub size: SizeRequest,
    /// `wl` / `hl`
    pub landscape: SizeRequest,
    /// `wp` / `hp`
    pub portrait: SizeRequest,
    /// `ws` / `hs`
    pub square: SizeRequest,
    pub scale: Option<f64>,
    /// `aoe`
    pub allow_enlargement: bool,
    /// `zc`
    pub cover_crop: Option<Anchor>,
    /// `far`
    pub fit_anchor: Option<Anchor>,
    pub background: Option<Background>,
    pub source_window: Option<SourceWindow>,
    pub quality: Option<Quality>,
    pub quality_max: Option<Quality>,
    pub strip: bool,
    pub filters: Vec<Filter>,
}

impl TransformOptions {
    /// Target box before dimension filling: base `w`/`h` with the override
    /// set for the original's orientation laid on top.
    pub fn requested_size(&self, original: Dimensions) -> SizeRequest {
        let overrides = match Orientation::classify(original) {
            Orientation::Landscape => self.landscape,
            Orientation::Portrait => self.portrait,
            Orientation::Square => self.square,
        };
        self.size.overridden_by(overrides).positive()
    }

    pub fn sharpen(&self) -> bool {
        self.filters.contains(&Filter::UnsharpMask)
    }
}

/// Normalize a raw option bag. See the [module docs](self) for the rules.
pub fn normalize(raw: &RawOptions) -> (TransformOptions, Vec<OptionWarning>) {
    let mut opts = TransformOptions::default();
    let mut warnings = Vec::new();
    let mut window = SourceWindow::default();
    let mut has_window = false;

    for (key, value) in raw.iter() {
        match key {
            "w" => opts.size.width = dimension(key, value, &mut warnings),
            "h" => opts.size.height = dimension(key, value, &mut warnings),
            "wl" => opts.landscape.width = dimension(key, value, &mut warnings),
            "hl" => opts.landscape.height = dimension(key, value, &mut warnings),
            "wp" => opts.portrait.width = dimension(key, value, &mut warnings),
            "hp" => opts.portrait.height = dimension(key, value, &mut warnings),
            "ws" => opts.square.width = dimension(key, value, &mut warnings),
            "hs" => opts.square.height = dimension(key, value, &mut warnings),
            "scale" => match value.as_number() {
                Some(s) if s > 0.0 => opts.scale = Some(s),
                _ => warnings.push(invalid(key, value, "expected a positive ratio")),
            },
            "aoe" => opts.allow_enlargement = value.is_truthy(),
            "strip" => opts.strip = value.is_truthy(),
            "zc" => opts.cover_crop = anchor(value),
            "far" => opts.fit_anchor = anchor(value),
            "bg" => opts.background = background(key, value, &mut warnings),
            "sw" => {
                has_window = true;
                window.width = dimension(key, value, &mut warnings);
            }
            "sh" => {
                has_window = true;
                window.height = dimension(key, value, &mut warnings);
            }
            "sx" => window.x = dimension(key, value, &mut warnings),
            "sy" => window.y = dimension(key, value, &mut warnings),
            "q" => opts.quality = quality(key, value, &mut warnings),
            "qmax" => opts.quality_max = quality(key, value, &mut warnings),
            "fltr" => {
                opts.filters = value
                    .texts()
                    .iter()
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| Filter::parse(s))
                    .collect();
            }
            _ => warnings.push(OptionWarning::KeyNotRecognized {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    if has_window {
        opts.source_window = Some(window);
    }
    (opts, warnings)
}

fn invalid(key: &str, value: &OptionValue, reason: &'static str) -> OptionWarning {
    OptionWarning::ValueInvalid {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    }
}

/// Non-negative number; zero is kept because presence matters.
fn dimension(key: &str, value: &OptionValue, warnings: &mut Vec<OptionWarning>) -> Option<f64> {
    match value.as_number() {
        Some(n) if n >= 0.0 => Some(n),
        Some(_) => {
            warnings.push(invalid(key, value, "must not be negative"));
            None
        }
        None => {
            warnings.push(invalid(key, value, "expected a number"));
            None
        }
    }
}

fn anchor(value: &OptionValue) -> Option<Anchor> {
    if !value.is_truthy() {
        return None;
    }
    Some(Anchor::parse(&value.to_string()))
}

fn quality(key: &str, value: &OptionValue, warnings: &mut Vec<OptionWarning>) -> Option<Quality> {
    match value.as_number() {
        Some(q) if (0.0..=100.0).contains(&q) => Some(Quality::new(q.round() as u32)),
        Some(q) => {
            warnings.push(invalid(key, value, "clamped to 0-100"));
            Some(Quality::saturating(q.round() as i64))
        }
        None => {
            warnings.push(invalid(key, value, "expected 0-100"));
            None
        }
    }
}

/// `RRGGBB` or `RRGGBB/opacityPercent`.
fn background(
    key: &str,
    value: &OptionValue,
    warnings: &mut Vec<OptionWarning>,
) -> Option<Background> {
    if !value.is_truthy() {
        return None;
    }
    let text = value.to_string();
    let (hex, opacity) = match text.split_once('/') {
        Some((hex, opacity)) => (hex, Some(opacity)),
        None => (text.as_str(), None),
    };

    let mut bg = Background::default();
    match Color::parse_hex(hex) {
        Some(color) => bg.color = color,
        None => warnings.push(invalid(key, value, "expected RRGGBB hex colour")),
    }
    if let Some(opacity) = opacity {
        match opacity.trim().parse::<f64>() {
            Ok(o) if o.is_finite() => bg.opacity = o.round().clamp(0.0, 100.0) as u8,
            _ => warnings.push(invalid(key, value, "expected opacity percent after '/'")),
        }
    }
    Some(bg)
}
