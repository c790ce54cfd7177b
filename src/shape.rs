//! Shape descriptors: how the engine sees an arbitrary typed value.
//!
//! The decoder and the encoder never know the concrete type they are working
//! on. They ask a [`Configurable`] value for its shape, a borrowed view
//! tagged by kind, and recurse from there. [`ShapeMut`] is the write side (used by decoding), [`ShapeRef`] the
//! read side (used by encoding); both come from the same trait, so a type
//! that decodes also documents itself.
//!
//! Implementations ship for the usual scalars, `Option<T>`, `Vec<T>`,
//! `HashMap<String, T>`, `BTreeMap<String, T>` and [`RawValue`]. Structs opt in with
//! [`record!`](crate::record), custom scalars with [`scalar!`](crate::scalar).
//!
//! ```ignore
//! #[derive(Debug, Default)]
//! struct ServerFtp {
//!     host: String,
//!     port: u16,
//!     disable_epsv: Option<bool>,
//! }
//!
//! treefig::record!(ServerFtp {
//!     host => "FTP server host",
//!     port,
//!     disable_epsv as "disableEPSV",
//! });
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::time::Duration;

use crate::path;
use crate::raw::RawValue;

/// A value whose shape the engine can walk.
pub trait Configurable {
    fn shape(&self) -> ShapeRef<'_>;
    fn shape_mut(&mut self) -> ShapeMut<'_>;
}

/// Shape taxonomy, without the borrowed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Scalar,
    Optional,
    Sequence,
    Mapping,
    Record,
    /// Untyped: takes whatever structure the source has.
    Raw,
}

pub enum ShapeRef<'a> {
    Scalar(&'a dyn ScalarValue),
    Optional(&'a dyn OptionalValue),
    Sequence(&'a dyn SequenceValue),
    Mapping(&'a dyn MappingValue),
    Record(&'a dyn RecordValue),
    Raw(&'a RawValue),
}

pub enum ShapeMut<'a> {
    Scalar(&'a mut dyn ScalarValue),
    Optional(&'a mut dyn OptionalValue),
    Sequence(&'a mut dyn SequenceValue),
    Mapping(&'a mut dyn MappingValue),
    Record(&'a mut dyn RecordValue),
    Raw(&'a mut RawValue),
}

impl ShapeRef<'_> {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeRef::Scalar(_) => ShapeKind::Scalar,
            ShapeRef::Optional(_) => ShapeKind::Optional,
            ShapeRef::Sequence(_) => ShapeKind::Sequence,
            ShapeRef::Mapping(_) => ShapeKind::Mapping,
            ShapeRef::Record(_) => ShapeKind::Record,
            ShapeRef::Raw(_) => ShapeKind::Raw,
        }
    }
}

/// Whether a single string leaf can populate `value` directly.
///
/// True for scalars, raw values and optionals wrapping something that
/// accepts a leaf. Sequences are handled separately because they split the
/// leaf.
pub fn accepts_leaf(value: &dyn Configurable) -> bool {
    match value.shape() {
        ShapeRef::Scalar(_) | ShapeRef::Raw(_) => true,
        ShapeRef::Optional(optional) => accepts_leaf(optional.placeholder().as_ref()),
        _ => false,
    }
}

/// A terminal value parsed from and rendered to a string.
pub trait ScalarValue {
    /// Replace the value by parsing `raw`. The error is a human-readable reason.
    fn set_str(&mut self, raw: &str) -> Result<(), String>;
    fn render(&self) -> String;
}

/// `Option<T>`: unset until the decoder first writes into it.
pub trait OptionalValue {
    fn get(&self) -> Option<&dyn Configurable>;
    /// Return the inner value, allocating `T::default()` first if unset.
    fn get_or_allocate(&mut self) -> &mut dyn Configurable;
    fn clear(&mut self);
    /// A fresh default instance of the inner type.
    fn placeholder(&self) -> Box<dyn Configurable>;
}

/// `Vec<T>`: index-addressed, replaced wholesale by the decoder.
pub trait SequenceValue {
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn element(&self, index: usize) -> Option<&dyn Configurable>;
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Configurable>;
    fn clear(&mut self);
    /// Grow (or shrink) to `len`, filling with `T::default()`.
    fn resize(&mut self, len: usize);
    fn placeholder(&self) -> Box<dyn Configurable>;
}

/// String-keyed map.
pub trait MappingValue {
    /// Keys in the map's own iteration order.
    fn keys(&self) -> Vec<String>;
    fn value(&self, key: &str) -> Option<&dyn Configurable>;
    /// Return the value for `key`, inserting `T::default()` if absent.
    fn entry(&mut self, key: &str) -> &mut dyn Configurable;
    fn placeholder(&self) -> Box<dyn Configurable>;
}

/// A struct with a fixed, declared set of fields.
pub trait RecordValue {
    fn fields(&self) -> &'static [FieldMeta];
    fn field(&self, index: usize) -> Option<&dyn Configurable>;
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Configurable>;
}

/// Declared metadata for one record field.
///
/// Built in `const` context by [`record!`](crate::record).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMeta {
    ident: &'static str,
    rename: Option<&'static str>,
    description: Option<&'static str>,
    ignore: bool,
    allow_empty: bool,
    flatten: bool,
}

impl FieldMeta {
    pub const fn new(ident: &'static str) -> Self {
        Self {
            ident,
            rename: None,
            description: None,
            ignore: false,
            allow_empty: false,
            flatten: false,
        }
    }

    /// Use `name` instead of the camelCased identifier.
    pub const fn rename(mut self, name: &'static str) -> Self {
        self.rename = Some(name);
        self
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Never decode into this field and never list it.
    pub const fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Let an explicit leaf (`""` or `true`) allocate an optional record.
    pub const fn allow_empty(mut self) -> Self {
        self.allow_empty = true;
        self
    }

    /// Promote the fields of this record (or optional record) into the
    /// enclosing record, like an embedded struct.
    pub const fn flatten(mut self) -> Self {
        self.flatten = true;
        self
    }

    pub fn ident(&self) -> &'static str {
        self.ident
    }

    pub fn config_name(&self) -> Cow<'static, str> {
        match self.rename {
            Some(name) => Cow::Borrowed(name),
            None => path::camel_case(self.ident),
        }
    }

    pub fn description(&self) -> Option<&'static str> {
        self.description
    }

    pub fn is_ignored(&self) -> bool {
        self.ignore
    }

    pub fn allows_empty(&self) -> bool {
        self.allow_empty
    }

    pub fn is_flattened(&self) -> bool {
        self.flatten
    }
}

// --- Scalars ---

/// Implement [`Configurable`] as a scalar for types with `FromStr + Display`.
///
/// ```ignore
/// treefig::scalar!(LogLevel);
/// ```
#[macro_export]
macro_rules! scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::ScalarValue for $ty {
                fn set_str(&mut self, raw: &str) -> ::std::result::Result<(), ::std::string::String> {
                    *self = raw
                        .parse::<$ty>()
                        .map_err(|e| ::std::string::ToString::to_string(&e))?;
                    Ok(())
                }

                fn render(&self) -> ::std::string::String {
                    ::std::string::ToString::to_string(self)
                }
            }

            impl $crate::Configurable for $ty {
                fn shape(&self) -> $crate::ShapeRef<'_> {
                    $crate::ShapeRef::Scalar(self)
                }

                fn shape_mut(&mut self) -> $crate::ShapeMut<'_> {
                    $crate::ShapeMut::Scalar(self)
                }
            }
        )+
    };
}

scalar!(String, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl ScalarValue for bool {
    fn set_str(&mut self, raw: &str) -> Result<(), String> {
        *self = parse_bool(raw)?;
        Ok(())
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl Configurable for bool {
    fn shape(&self) -> ShapeRef<'_> {
        ShapeRef::Scalar(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Scalar(self)
    }
}

/// Parse the usual boolean spellings, case-insensitively.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "on" => Ok(true),
        "false" | "f" | "0" | "no" | "off" => Ok(false),
        _ => Err(format!("'{raw}' is not a boolean")),
    }
}

impl ScalarValue for Duration {
    fn set_str(&mut self, raw: &str) -> Result<(), String> {
        *self = parse_duration(raw)?;
        Ok(())
    }

    fn render(&self) -> String {
        format_duration(*self)
    }
}

impl Configurable for Duration {
    fn shape(&self) -> ShapeRef<'_> {
        ShapeRef::Scalar(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Scalar(self)
    }
}

/// Parse `1h30m`, `1.5s`, `250ms`, … A bare integer is a number of seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let s = raw.trim();
    if s.is_empty() {
        return Err("empty duration".into());
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        let secs: u64 = s.parse().map_err(|e| format!("invalid duration '{raw}': {e}"))?;
        return Ok(Duration::from_secs(secs));
    }

    let mut total_nanos = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("missing unit in duration '{raw}'"))?;
        if number_len == 0 {
            return Err(format!("expected a number in duration '{raw}'"));
        }
        let number: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid number in duration '{raw}'"))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            unit => return Err(format!("unknown unit '{unit}' in duration '{raw}'")),
        };
        total_nanos += number * nanos_per_unit;
        rest = &rest[unit_len..];
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(format!("duration '{raw}' is out of range"));
    }
    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

/// Compact rendering: `0s`, `750ms`, `5s`, `1m30s`, `2h0m0s`.
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".into();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", trim_fraction(nanos as f64 / 1e3));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", trim_fraction(nanos as f64 / 1e6));
    }

    let secs = d.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    out.push_str(&seconds.to_string());
    let frac = d.subsec_nanos();
    if frac > 0 {
        let digits = format!("{frac:09}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
    out.push('s');
    out
}

fn trim_fraction(v: f64) -> String {
    let s = format!("{v:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

// --- Containers ---

impl<T: Configurable + Default + 'static> OptionalValue for Option<T> {
    fn get(&self) -> Option<&dyn Configurable> {
        self.as_ref().map(|v| v as &dyn Configurable)
    }

    fn get_or_allocate(&mut self) -> &mut dyn Configurable {
        self.get_or_insert_with(T::default)
    }

    fn clear(&mut self) {
        *self = None;
    }

    fn placeholder(&self) -> Box<dyn Configurable> {
        Box::new(T::default())
    }
}

impl<T: Configurable + Default + 'static> Configurable for Option<T> {
    fn shape(&self) -> ShapeRef<'_> {
        ShapeRef::Optional(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Optional(self)
    }
}

impl<T: Configurable + Default + 'static> SequenceValue for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, index: usize) -> Option<&dyn Configurable> {
        self.get(index).map(|v| v as &dyn Configurable)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Configurable> {
        self.get_mut(index).map(|v| v as &mut dyn Configurable)
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn resize(&mut self, len: usize) {
        self.resize_with(len, T::default);
    }

    fn placeholder(&self) -> Box<dyn Configurable> {
        Box::new(T::default())
    }
}

impl<T: Configurable + Default + 'static> Configurable for Vec<T> {
    fn shape(&self) -> ShapeRef<'_> {
        ShapeRef::Sequence(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Sequence(self)
    }
}

impl<T: Configurable + Default + 'static> MappingValue for BTreeMap<String, T> {
    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }

    fn value(&self, key: &str) -> Option<&dyn Configurable> {
        self.get(key).map(|v| v as &dyn Configurable)
    }

    fn entry(&mut self, key: &str) -> &mut dyn Configurable {
        BTreeMap::entry(self, key.to_string()).or_default()
    }

    fn placeholder(&self) -> Box<dyn Configurable> {
        Box::new(T::default())
    }
}

impl<T: Configurable + Default + 'static> Configurable for BTreeMap<String, T> {
    fn shape(&self) -> ShapeRef<'_> {
        ShapeRef::Mapping(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Mapping(self)
    }
}

impl<T, S> MappingValue for HashMap<String, T, S>
where
    T: Configurable + Default + 'static,
    S: BuildHasher,
{
    fn keys(&self) -> Vec<String> {
        HashMap::keys(self).cloned().collect()
    }

    fn value(&self, key: &str) -> Option<&dyn Configurable> {
        self.get(key).map(|v| v as &dyn Configurable)
    }

    fn entry(&mut self, key: &str) -> &mut dyn Configurable {
        HashMap::entry(self, key.to_string()).or_default()
    }

    fn placeholder(&self) -> Box<dyn Configurable> {
        Box::new(T::default())
    }
}

impl<T, S> Configurable for HashMap<String, T, S>
where
    T: Configurable + Default + 'static,
    S: BuildHasher,
{
    fn shape(&self) -> ShapeRef<'_> {
        ShapeRef::Mapping(self)
    }

    fn shape_mut(&mut self) -> ShapeMut<'_> {
        ShapeMut::Mapping(self)
    }
}

// --- Records ---

/// Implement [`Configurable`] for a struct by listing its fields.
///
/// Each entry is `field`, optionally followed by `as "name"` (explicit config
/// name), `[ignore]` / `[allow_empty]` / `[flatten]` directives, and
/// `=> "description"`. Every field type must itself be [`Configurable`].
///
/// ```ignore
/// treefig::record!(Notif {
///     mail [allow_empty] => "Mail notification settings",
///     webhook,
///     common [flatten],
///     internal_state [ignore],
/// });
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $( $field:ident $(as $name:literal)? $([$($flag:ident),+ $(,)?])? $(=> $doc:literal)? ),* $(,)? }) => {
        impl $crate::RecordValue for $ty {
            fn fields(&self) -> &'static [$crate::FieldMeta] {
                const FIELDS: &[$crate::FieldMeta] = &[
                    $(
                        $crate::FieldMeta::new(stringify!($field))
                            $(.rename($name))?
                            $($(.$flag())+)?
                            $(.describe($doc))?
                    ),*
                ];
                FIELDS
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn field(&self, index: usize) -> ::std::option::Option<&dyn $crate::Configurable> {
                let mut position = 0usize;
                $(
                    if position == index {
                        return ::std::option::Option::Some(&self.$field as &dyn $crate::Configurable);
                    }
                    position += 1;
                )*
                ::std::option::Option::None
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn field_mut(&mut self, index: usize) -> ::std::option::Option<&mut dyn $crate::Configurable> {
                let mut position = 0usize;
                $(
                    if position == index {
                        return ::std::option::Option::Some(&mut self.$field as &mut dyn $crate::Configurable);
                    }
                    position += 1;
                )*
                ::std::option::Option::None
            }
        }

        impl $crate::Configurable for $ty {
            fn shape(&self) -> $crate::ShapeRef<'_> {
                $crate::ShapeRef::Record(self)
            }

            fn shape_mut(&mut self) -> $crate::ShapeMut<'_> {
                $crate::ShapeMut::Record(self)
            }
        }
    };
}
