//! Semantic kinds of fields and the values they accept.
//!
//! Every field is declared with a [`FieldKind`] that never changes. Typed
//! columns carry their kind as a marker type (`Column<Int>`), so binding a
//! value of the wrong type to them is rejected by the compiler through
//! [`ValueFor`]. Untyped [`Field`](super::Field)s check the value at
//! runtime with [`FieldKind::accepts`].

use std::fmt;

use chrono::{DateTime, Utc};

use crate::value::SqlValue;

/// The declared semantic kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Variable-length text.
    Text,
    /// 32-bit integer.
    Int,
    /// 64-bit integer.
    Int64,
    /// Double precision float.
    Float,
    /// Boolean.
    Bool,
    /// Timestamp in UTC.
    Timestamp,
}

impl FieldKind {
    /// Returns true if `value` may be bound to a field of this kind.
    ///
    /// NULL is accepted by every kind.
    #[must_use]
    pub const fn accepts(self, value: &SqlValue) -> bool {
        matches!(
            (self, value),
            (_, SqlValue::Null)
                | (Self::Text, SqlValue::Text(_))
                | (Self::Int, SqlValue::Int(_))
                | (Self::Int64, SqlValue::Int64(_))
                | (Self::Float, SqlValue::Float(_))
                | (Self::Bool, SqlValue::Bool(_))
                | (Self::Timestamp, SqlValue::Timestamp(_))
        )
    }

    /// Human readable name, matching [`SqlValue::kind_name`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Int => "integer",
            Self::Int64 => "bigint",
            Self::Float => "float",
            Self::Bool => "boolean",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Compile-time kind marker.
pub trait Kind: sealed::Sealed + Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// The runtime kind this marker stands for.
    const KIND: FieldKind;
}

macro_rules! kind_markers {
    ($($(#[$doc:meta])* $marker:ident => $kind:ident),+ $(,)?) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $marker;

            impl sealed::Sealed for $marker {}

            impl Kind for $marker {
                const KIND: FieldKind = FieldKind::$kind;
            }
        )+
    };
}

kind_markers! {
    /// Marker for text columns.
    Text => Text,
    /// Marker for 32-bit integer columns.
    Int => Int,
    /// Marker for 64-bit integer columns.
    Int64 => Int64,
    /// Marker for float columns.
    Float => Float,
    /// Marker for boolean columns.
    Bool => Bool,
    /// Marker for timestamp columns.
    Timestamp => Timestamp,
}

/// Rust types that are legal values for columns of kind `K`.
pub trait ValueFor<K: Kind> {
    /// Converts into the bound value, widened to the column's kind.
    fn into_value(self) -> SqlValue;
}

macro_rules! value_for {
    ($marker:ident: $($ty:ty => |$v:ident| $conv:expr),+ $(,)?) => {
        $(
            impl ValueFor<$marker> for $ty {
                fn into_value(self) -> SqlValue {
                    let $v = self;
                    $conv
                }
            }
        )+
    };
}

value_for!(Text:
    String => |v| SqlValue::Text(v),
    &str => |v| SqlValue::Text(String::from(v)),
    &String => |v| SqlValue::Text(v.clone()),
);
value_for!(Int:
    i32 => |v| SqlValue::Int(v),
    i16 => |v| SqlValue::Int(i32::from(v)),
    i8 => |v| SqlValue::Int(i32::from(v)),
    u16 => |v| SqlValue::Int(i32::from(v)),
    u8 => |v| SqlValue::Int(i32::from(v)),
);
value_for!(Int64:
    i64 => |v| SqlValue::Int64(v),
    i32 => |v| SqlValue::Int64(i64::from(v)),
    u32 => |v| SqlValue::Int64(i64::from(v)),
    i16 => |v| SqlValue::Int64(i64::from(v)),
    u16 => |v| SqlValue::Int64(i64::from(v)),
    i8 => |v| SqlValue::Int64(i64::from(v)),
    u8 => |v| SqlValue::Int64(i64::from(v)),
);
value_for!(Float:
    f64 => |v| SqlValue::Float(v),
    f32 => |v| SqlValue::Float(f64::from(v)),
);
value_for!(Bool:
    bool => |v| SqlValue::Bool(v),
);
value_for!(Timestamp:
    DateTime<Utc> => |v| SqlValue::Timestamp(v),
);

impl<K: Kind, T: ValueFor<K>> ValueFor<K> for Option<T> {
    fn into_value(self) -> SqlValue {
        self.map_or(SqlValue::Null, <T as ValueFor<K>>::into_value)
    }
}

/// Maps a Rust field type to the kind of the column storing it.
///
/// Used by `#[derive(Table)]` to type the generated column accessors.
pub trait ColumnType {
    /// Kind marker of the column.
    type Kind: Kind;

    /// Whether the column admits NULL.
    const NULLABLE: bool = false;
}

impl ColumnType for String {
    type Kind = Text;
}

impl ColumnType for i32 {
    type Kind = Int;
}

impl ColumnType for i64 {
    type Kind = Int64;
}

impl ColumnType for f64 {
    type Kind = Float;
}

impl ColumnType for bool {
    type Kind = Bool;
}

impl ColumnType for DateTime<Utc> {
    type Kind = Timestamp;
}

impl<T: ColumnType> ColumnType for Option<T> {
    type Kind = T::Kind;

    const NULLABLE: bool = true;
}
