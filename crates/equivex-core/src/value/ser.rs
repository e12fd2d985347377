//! Serde bridge: any `T: Serialize` becomes a [`Value`].
//!
//! Mapping:
//! - structs, tuple structs and data-carrying enum variants become records
//!   (tuple fields are named `"0"`, `"1"`, ...)
//! - unit variants become enums whose numeric value is the variant index
//! - maps become dictionaries, sequences become lists, tuples become arrays
//! - `None` and `()` become null

use super::{Dictionary, EnumValue, Key, Record, Sequence, SequenceKind, Value, ValueType};
use crate::errors::{EquivexError, Result};
use serde::ser::{self, Impossible, Serialize};

/// Convert any serializable value into the value model.
///
/// # Errors
///
/// Returns [`EquivexError::Serialization`] when the value's `Serialize`
/// implementation fails, when a map key is not a scalar, or when a `u128`
/// does not fit the integer range.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

fn variant_type_name(name: &str, variant: &str) -> String {
    format!("{}::{}", name, variant)
}

struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = EquivexError;
    type SerializeSeq = SequenceBuilder;
    type SerializeTuple = SequenceBuilder;
    type SerializeTupleStruct = RecordBuilder;
    type SerializeTupleVariant = RecordBuilder;
    type SerializeMap = DictionaryBuilder;
    type SerializeStruct = RecordBuilder;
    type SerializeStructVariant = RecordBuilder;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        Ok(Value::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        i128::try_from(v)
            .map(Value::Integer)
            .map_err(|_| ser::Error::custom(format!("{} does not fit a 128-bit signed integer", v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Sequence(Sequence::new(
            SequenceKind::Array,
            ValueType::Integer,
            v.iter().copied().map(Value::from).collect(),
        )))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Ok(Value::Record(Record::new(name)))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::Enum(EnumValue::new(
            name,
            variant,
            i128::from(variant_index),
        )))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value> {
        let inner = value.serialize(ValueSerializer)?;
        Ok(Value::Record(
            Record::new(variant_type_name(name, variant)).with("0", inner),
        ))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SequenceBuilder> {
        Ok(SequenceBuilder::new(SequenceKind::List, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SequenceBuilder> {
        Ok(SequenceBuilder::new(SequenceKind::Array, len))
    }

    fn serialize_tuple_struct(self, name: &'static str, _len: usize) -> Result<RecordBuilder> {
        Ok(RecordBuilder::new(name.to_owned()))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<RecordBuilder> {
        Ok(RecordBuilder::new(variant_type_name(name, variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<DictionaryBuilder> {
        Ok(DictionaryBuilder::default())
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<RecordBuilder> {
        Ok(RecordBuilder::new(name.to_owned()))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<RecordBuilder> {
        Ok(RecordBuilder::new(variant_type_name(name, variant)))
    }
}

struct SequenceBuilder {
    kind: SequenceKind,
    items: Vec<Value>,
}

impl SequenceBuilder {
    fn new(kind: SequenceKind, capacity: usize) -> Self {
        Self {
            kind,
            items: Vec::with_capacity(capacity),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn finish(self) -> Value {
        let items = self.items;
        let sequence = match self.kind {
            SequenceKind::List => Sequence::list(items),
            SequenceKind::Array => Sequence::array(items),
            SequenceKind::Set => Sequence::set(items),
        };
        Value::Sequence(sequence)
    }
}

impl ser::SerializeSeq for SequenceBuilder {
    type Ok = Value;
    type Error = EquivexError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SequenceBuilder {
    type Ok = Value;
    type Error = EquivexError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

struct RecordBuilder {
    record: Record,
    next_position: usize,
}

impl RecordBuilder {
    fn new(type_name: String) -> Self {
        Self {
            record: Record::new(type_name),
            next_position: 0,
        }
    }

    fn field<T: ?Sized + Serialize>(&mut self, name: &str, value: &T) -> Result<()> {
        let value = value.serialize(ValueSerializer)?;
        self.record.set(name, value);
        Ok(())
    }

    fn positional<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let name = self.next_position.to_string();
        self.next_position += 1;
        self.field(&name, value)
    }
}

impl ser::SerializeStruct for RecordBuilder {
    type Ok = Value;
    type Error = EquivexError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Record(self.record))
    }
}

impl ser::SerializeStructVariant for RecordBuilder {
    type Ok = Value;
    type Error = EquivexError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.field(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Record(self.record))
    }
}

impl ser::SerializeTupleStruct for RecordBuilder {
    type Ok = Value;
    type Error = EquivexError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.positional(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Record(self.record))
    }
}

impl ser::SerializeTupleVariant for RecordBuilder {
    type Ok = Value;
    type Error = EquivexError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.positional(value)
    }

    fn end(self) -> Result<Value> {
        Ok(Value::Record(self.record))
    }
}

#[derive(Default)]
struct DictionaryBuilder {
    entries: Vec<(Key, Value)>,
    pending_key: Option<Key>,
}

impl ser::SerializeMap for DictionaryBuilder {
    type Ok = Value;
    type Error = EquivexError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        self.pending_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| EquivexError::Serialization {
                message: "map value serialized before its key".to_string(),
            })?;
        self.entries.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Value> {
        let key_type = ValueType::common(self.entries.iter().map(|(k, _)| k.key_type()));
        let value_type = ValueType::common(
            self.entries
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(_, v)| v.runtime_type()),
        );
        let dictionary = self
            .entries
            .into_iter()
            .fold(Dictionary::new(key_type, value_type), |d, (k, v)| {
                d.with_entry(k, v)
            });
        Ok(Value::Dictionary(dictionary))
    }
}

/// Serializer for map keys; only scalar keys are accepted.
struct KeySerializer;

fn unsupported_key<T>(what: &str) -> Result<T> {
    Err(ser::Error::custom(format!(
        "map keys must be scalars, found {}",
        what
    )))
}

impl ser::Serializer for KeySerializer {
    type Ok = Key;
    type Error = EquivexError;
    type SerializeSeq = Impossible<Key, EquivexError>;
    type SerializeTuple = Impossible<Key, EquivexError>;
    type SerializeTupleStruct = Impossible<Key, EquivexError>;
    type SerializeTupleVariant = Impossible<Key, EquivexError>;
    type SerializeMap = Impossible<Key, EquivexError>;
    type SerializeStruct = Impossible<Key, EquivexError>;
    type SerializeStructVariant = Impossible<Key, EquivexError>;

    fn serialize_bool(self, v: bool) -> Result<Key> {
        Ok(Key::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Key> {
        Ok(Key::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Key> {
        Ok(Key::from(v))
    }

    fn serialize_f32(self, _v: f32) -> Result<Key> {
        unsupported_key("a float")
    }

    fn serialize_f64(self, _v: f64) -> Result<Key> {
        unsupported_key("a float")
    }

    fn serialize_char(self, v: char) -> Result<Key> {
        Ok(Key::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<Key> {
        Ok(Key::String(v.to_owned()))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<Key> {
        unsupported_key("bytes")
    }

    fn serialize_none(self) -> Result<Key> {
        Ok(Key::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Key> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Key> {
        Ok(Key::Null)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Key> {
        unsupported_key(name)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<Key> {
        Ok(Key::Enum(EnumValue::new(
            name,
            variant,
            i128::from(variant_index),
        )))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Key> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Key> {
        unsupported_key(name)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        unsupported_key("a sequence")
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        unsupported_key("a tuple")
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        unsupported_key(name)
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        unsupported_key(name)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        unsupported_key("a map")
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        unsupported_key(name)
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        unsupported_key(name)
    }
}
