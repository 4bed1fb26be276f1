//! Static shape descriptions for every object and enum that crosses the
//! boundary.
//!
//! Schemas are plain `static` data: built at compile time, never mutated.
//! The codec walks them recursively, so a nested object or a list of
//! objects is described by reference to another schema.

use std::fmt;

/// Shape of one typed object: its wire name and ordered fields.
#[derive(PartialEq, Eq)]
pub struct ObjectSchema {
    /// Type name reported in `MissingMandatoryField` failures.
    pub name: &'static str,
    /// Fields in declaration order.
    pub fields: &'static [FieldSpec],
}

impl ObjectSchema {
    /// Returns the position and spec of the field called `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<(usize, &'static FieldSpec)> {
        let fields: &'static [FieldSpec] = self.fields;
        fields
            .iter()
            .enumerate()
            .find(|(_, spec)| spec.name == name)
    }

    /// Iterates the names of mandatory fields in declaration order.
    pub fn mandatory_names(&self) -> impl Iterator<Item = &'static str> + use<> {
        let fields: &'static [FieldSpec] = self.fields;
        fields
            .iter()
            .filter(|spec| spec.mandatory)
            .map(|spec| spec.name)
    }
}

impl fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Nested schemas are printed by name only.
        f.debug_struct("ObjectSchema")
            .field("name", &self.name)
            .field(
                "fields",
                &self.fields.iter().map(|s| s.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// One field of an [`ObjectSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire key.
    pub name: &'static str,
    /// Whether the key must be present and non-null.
    pub mandatory: bool,
    /// Expected value kind.
    pub kind: FieldKind,
}

/// The kind of value a field holds.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Boolean.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// Unsigned 32-bit integer, carried as [`crate::WireValue::Int`].
    UInt32,
    /// Unsigned 64-bit integer, carried as [`crate::WireValue::Double`].
    UInt64,
    /// Double-precision float.
    Double,
    /// UTF-8 string.
    String,
    /// Byte sequence, each element in `0..=255`.
    Bytes,
    /// Symbolic enum looked up in an enum table.
    Enum(&'static EnumSchema),
    /// Nested object.
    Object(&'static ObjectSchema),
    /// Homogeneous list.
    List(&'static FieldKind),
}

impl fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("Bool"),
            Self::Int => f.write_str("Int"),
            Self::UInt32 => f.write_str("UInt32"),
            Self::UInt64 => f.write_str("UInt64"),
            Self::Double => f.write_str("Double"),
            Self::String => f.write_str("String"),
            Self::Bytes => f.write_str("Bytes"),
            Self::Enum(schema) => write!(f, "Enum({})", schema.name),
            Self::Object(schema) => write!(f, "Object({})", schema.name),
            Self::List(element) => write!(f, "List({element:?})"),
        }
    }
}

/// Bidirectional table between symbolic enum variants and wire strings.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumSchema {
    /// Enum type name.
    pub name: &'static str,
    /// Variants in declaration order.
    pub variants: &'static [EnumVariant],
}

impl EnumSchema {
    /// Finds the variant whose symbolic name equals `raw` uppercased.
    #[must_use]
    pub fn lookup(&self, raw: &str) -> Option<&'static EnumVariant> {
        let symbol = raw.to_uppercase();
        let variants: &'static [EnumVariant] = self.variants;
        variants.iter().find(|variant| variant.symbol == symbol)
    }
}

/// One row of an [`EnumSchema`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct EnumVariant {
    /// Uppercase symbolic name.
    pub symbol: &'static str,
    /// Lowercase string sent over the wire.
    pub wire: &'static str,
}

/// Declares a symbolic enum together with its wire table and
/// [`WireEnum`](crate::WireEnum) impl, keeping the two in lockstep.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident as $table:ident ($type_name:literal) {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $symbol:literal / $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        #[doc = concat!("Wire table for [`", stringify!($name), "`].")]
        $vis static $table: $crate::schema::EnumSchema = $crate::schema::EnumSchema {
            name: $type_name,
            variants: &[
                $( $crate::schema::EnumVariant { symbol: $symbol, wire: $wire }, )+
            ],
        };

        impl $crate::record::WireEnum for $name {
            const SCHEMA: &'static $crate::schema::EnumSchema = &$table;
            const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];

            fn variant(self) -> &'static $crate::schema::EnumVariant {
                &$table.variants[self as usize]
            }
        }
    };
}

pub(crate) use wire_enum;
