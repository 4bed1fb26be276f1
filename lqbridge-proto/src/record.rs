//! Schema-conforming records and the typed layer on top of them.
//!
//! A [`Record`] is what the codec produces from a wire map once every
//! field has been checked against its [`ObjectSchema`]. Typed structs
//! implement [`WireObject`] to move in and out of records; symbolic enums
//! implement [`WireEnum`] (usually through the `wire_enum!` macro).

use crate::DecodeError;
use crate::schema::{EnumSchema, EnumVariant, FieldSpec, ObjectSchema};

/// A decoded, kind-checked field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned 32-bit integer.
    UInt32(u32),
    /// Unsigned 64-bit integer.
    UInt64(u64),
    /// Float.
    Double(f64),
    /// String.
    String(String),
    /// Byte sequence.
    Bytes(Vec<u8>),
    /// Enum variant from a static table.
    Enum(&'static EnumVariant),
    /// Nested record.
    Object(Record),
    /// List of values of one kind.
    List(Vec<Self>),
}

impl Value {
    const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::UInt32(_) => "UInt32",
            Self::UInt64(_) => "UInt64",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::Bytes(_) => "Bytes",
            Self::Enum(_) => "Enum",
            Self::Object(_) => "Object",
            Self::List(_) => "List",
        }
    }

    fn mismatch(&self) -> DecodeError {
        DecodeError::UnexpectedType(self.kind_name().to_owned())
    }
}

/// An object whose fields conform to a static [`ObjectSchema`].
///
/// Values are stored positionally, aligned with `schema.fields`. `None`
/// marks an omitted optional field.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: &'static ObjectSchema,
    values: Vec<Option<Value>>,
}

impl Record {
    /// Creates an empty record for `schema`.
    #[must_use]
    pub fn new(schema: &'static ObjectSchema) -> Self {
        Self {
            schema,
            values: vec![None; schema.fields.len()],
        }
    }

    /// The schema this record conforms to.
    #[must_use]
    pub const fn schema(&self) -> &'static ObjectSchema {
        self.schema
    }

    /// Returns the value of `field`, if set.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        let (index, _) = self.schema.field(field)?;
        self.values[index].as_ref()
    }

    /// Iterates field specs with their values in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldSpec, Option<&Value>)> {
        let specs: &'static [FieldSpec] = self.schema.fields;
        specs.iter().zip(self.values.iter().map(Option::as_ref))
    }

    pub(crate) fn put(&mut self, index: usize, value: Value) {
        self.values[index] = Some(value);
    }

    /// Sets `field` to `value`, returning the updated record.
    ///
    /// Unknown field names are ignored (and trip a debug assertion).
    #[must_use]
    pub fn with<T: IntoValue>(mut self, field: &str, value: T) -> Self {
        match self.schema.field(field) {
            Some((index, _)) => self.put(index, value.into_value()),
            None => debug_assert!(false, "{} has no field {field}", self.schema.name),
        }
        self
    }

    /// Sets `field` when `value` is `Some`, leaving it omitted otherwise.
    #[must_use]
    pub fn with_optional<T: IntoValue>(self, field: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.with(field, value),
            None => self,
        }
    }

    /// Removes and returns the value of `field`.
    pub fn take(&mut self, field: &str) -> Option<Value> {
        let (index, _) = self.schema.field(field)?;
        self.values[index].take()
    }

    /// Takes a mandatory field, converting it to `T`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::MissingMandatoryField`] when the field is unset, or a
    /// conversion error when the stored value is of another kind.
    pub fn required<T: FromValue>(&mut self, field: &'static str) -> Result<T, DecodeError> {
        let object = self.schema.name;
        let value = self
            .take(field)
            .ok_or(DecodeError::MissingMandatoryField { field, object })?;
        T::from_value(value)
    }

    /// Takes an optional field, converting it to `T` when present.
    ///
    /// # Errors
    ///
    /// A conversion error when the stored value is of another kind.
    pub fn optional<T: FromValue>(&mut self, field: &'static str) -> Result<Option<T>, DecodeError> {
        self.take(field).map(T::from_value).transpose()
    }

    /// Takes a mandatory enum field.
    ///
    /// # Errors
    ///
    /// See [`Record::required`]; also [`DecodeError::UnknownEnumVariant`]
    /// when the variant belongs to another table.
    pub fn required_enum<E: WireEnum>(&mut self, field: &'static str) -> Result<E, DecodeError> {
        let variant: &'static EnumVariant = self.required(field)?;
        E::from_variant(variant)
    }

    /// Takes an optional enum field.
    ///
    /// # Errors
    ///
    /// See [`Record::required_enum`].
    pub fn optional_enum<E: WireEnum>(
        &mut self,
        field: &'static str,
    ) -> Result<Option<E>, DecodeError> {
        self.optional::<&'static EnumVariant>(field)?
            .map(E::from_variant)
            .transpose()
    }

    /// Takes a mandatory nested object.
    ///
    /// # Errors
    ///
    /// See [`Record::required`]; nested conversion errors propagate.
    pub fn required_object<T: WireObject>(&mut self, field: &'static str) -> Result<T, DecodeError> {
        let record: Self = self.required(field)?;
        T::from_record(record)
    }

    /// Takes an optional nested object.
    ///
    /// # Errors
    ///
    /// Nested conversion errors propagate.
    pub fn optional_object<T: WireObject>(
        &mut self,
        field: &'static str,
    ) -> Result<Option<T>, DecodeError> {
        self.optional::<Self>(field)?
            .map(T::from_record)
            .transpose()
    }
}

/// Conversion out of a decoded [`Value`].
pub trait FromValue: Sized {
    /// Converts `value`, failing with `UnexpectedType` on a kind mismatch.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnexpectedType`] when `value` holds another kind.
    fn from_value(value: Value) -> Result<Self, DecodeError>;
}

/// Conversion into a [`Value`] for encoding.
pub trait IntoValue {
    /// Converts `self`.
    fn into_value(self) -> Value;
}

macro_rules! scalar_value {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self, DecodeError> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(other.mismatch()),
                    }
                }
            }

            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }
        )+
    };
}

scalar_value! {
    bool => Bool,
    i64 => Int,
    u32 => UInt32,
    u64 => UInt64,
    f64 => Double,
    String => String,
    Record => Object,
}

impl FromValue for &'static EnumVariant {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Enum(variant) => Ok(variant),
            other => Err(other.mismatch()),
        }
    }
}

impl IntoValue for &'static EnumVariant {
    fn into_value(self) -> Value {
        Value::Enum(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::String(self.to_owned())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(other.mismatch()),
        }
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

/// A typed struct with a static schema.
pub trait WireObject: Sized {
    /// The object's schema in the registry.
    const SCHEMA: &'static ObjectSchema;

    /// Builds the typed value from a record already checked against
    /// [`WireObject::SCHEMA`].
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when a field is missing or of the wrong kind.
    fn from_record(record: Record) -> Result<Self, DecodeError>;

    /// Converts the typed value into a record for encoding.
    fn to_record(&self) -> Record;
}

/// A symbolic enum backed by a static [`EnumSchema`].
pub trait WireEnum: Copy + Sized + 'static {
    /// The enum's wire table.
    const SCHEMA: &'static EnumSchema;
    /// Every variant, in table order.
    const ALL: &'static [Self];

    /// Returns this variant's table row. Total by construction.
    fn variant(self) -> &'static EnumVariant;

    /// Finds the typed variant for a table row.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnknownEnumVariant`] when `variant` is not a row of
    /// [`WireEnum::SCHEMA`].
    fn from_variant(variant: &EnumVariant) -> Result<Self, DecodeError> {
        Self::ALL
            .iter()
            .copied()
            .find(|candidate| candidate.variant().symbol == variant.symbol)
            .ok_or_else(|| DecodeError::UnknownEnumVariant(variant.wire.to_owned()))
    }

    /// The lowercase wire string for this variant.
    fn wire_name(self) -> &'static str {
        self.variant().wire
    }
}
