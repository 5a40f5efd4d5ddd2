//! Property codec.
//!
//! Every property entry on disk is a code byte, a type byte and the value
//! bytes. The type byte packs the scalar type into its low 6 bits; bit `0x40`
//! marks a tuple whose length follows as one extra byte (`2 + extra`
//! elements), and bit `0x80` is an alternate flag no known file uses.
//!
//! Decoding is driven by the type byte found in the file. Encoding is driven
//! by the type declared in the property table, so a decoded tree re-encodes to
//! the same bytes without the tree having to remember type bytes.

use surfride_common::{BinaryReader, BinaryWriter};

use crate::dictionary::{ListEncoding, ListHints};
use crate::property::{PropertyDescriptor, PropertyType};
use crate::value::Value;
use crate::{Error, Result};

/// Type byte flag: a dimension byte follows and the value is a tuple.
pub const DIMENSION_FLAG: u8 = 0x40;

/// Type byte flag reserved for an alternate layout.
pub const ALTERNATE_FLAG: u8 = 0x80;

/// Mask selecting the base type from a type byte.
pub const BASE_TYPE_MASK: u8 = 0x3F;

/// Fewest elements a tuple can hold (`extra == 0`).
pub const MIN_TUPLE_LEN: usize = 2;

/// Most elements a tuple can hold (`extra == 255`).
pub const MAX_TUPLE_LEN: usize = MIN_TUPLE_LEN + u8::MAX as usize;

/// Decoded type byte: what follows and how many of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub ty: PropertyType,
    /// Tuple length, or `None` for a single scalar.
    pub tuple_len: Option<usize>,
}

impl Layout {
    pub fn scalar(ty: PropertyType) -> Self {
        Self { ty, tuple_len: None }
    }

    pub fn tuple(ty: PropertyType, len: usize) -> Self {
        Self {
            ty,
            tuple_len: Some(len),
        }
    }

    /// Check if a type byte announces a dimension byte.
    #[inline]
    pub fn has_dimension(type_byte: u8) -> bool {
        type_byte & DIMENSION_FLAG != 0
    }

    /// Interpret a type byte and, when flagged, its dimension byte.
    ///
    /// `code` is only used for error context.
    pub fn from_type_byte(code: u8, type_byte: u8, extra: Option<u8>) -> Result<Self> {
        let unsupported = |reason| Error::UnsupportedPropertyEncoding {
            code,
            type_byte,
            reason,
        };

        if type_byte & DIMENSION_FLAG != 0 && type_byte & ALTERNATE_FLAG != 0 {
            return Err(unsupported("dimension and alternate flags are both set"));
        }
        if type_byte & ALTERNATE_FLAG != 0 {
            return Err(unsupported("alternate flag is not supported"));
        }

        let ty = PropertyType::from_u8(type_byte & BASE_TYPE_MASK)
            .ok_or_else(|| unsupported("unknown base type"))?;

        if !Self::has_dimension(type_byte) {
            return Ok(Self::scalar(ty));
        }
        if ty == PropertyType::AnsiString {
            return Err(unsupported("string tuples are not supported"));
        }
        let extra = extra.ok_or_else(|| unsupported("missing dimension byte"))?;
        Ok(Self::tuple(ty, MIN_TUPLE_LEN + extra as usize))
    }

    /// Read a type byte (and its dimension byte, if flagged) from `reader`.
    pub fn read(reader: &mut BinaryReader<'_>, code: u8) -> Result<Self> {
        let type_byte = reader.read_u8()?;
        let extra = if Self::has_dimension(type_byte) {
            Some(reader.read_u8()?)
        } else {
            None
        };
        Self::from_type_byte(code, type_byte, extra)
    }

    /// The type byte that announces this layout.
    pub fn type_byte(&self) -> u8 {
        match self.tuple_len {
            Some(_) => self.ty.code() | DIMENSION_FLAG,
            None => self.ty.code(),
        }
    }
}

/// A single decoded element.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Zero-width `None` or `ArraySeparator`.
    Null,
    Bool(bool),
    /// Any integer type, widened.
    Int(i64),
    /// `Float` or `Double`, widened.
    Float(f64),
    Text(String),
    /// Four channel bytes in file order.
    Color([u8; 4]),
}

impl Scalar {
    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(v) => Value::Bool(*v),
            Scalar::Int(v) => Value::Int(*v),
            Scalar::Float(v) => Value::Float(*v),
            Scalar::Text(v) => Value::String(v.clone()),
            Scalar::Color(c) => Value::List(c.iter().map(|&b| Value::Int(b as i64)).collect()),
        }
    }
}

/// A decoded property value, its shape decided at decode time.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// One entry without the dimension flag.
    Scalar(Scalar),
    /// One entry with the dimension flag.
    Tuple(Vec<Scalar>),
    /// Several entries with the same code in one chunk. Elements are never
    /// themselves `Repeated`.
    Repeated(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Number of on-disk entries this value occupies.
    pub fn entry_count(&self) -> usize {
        match self {
            PropertyValue::Repeated(items) => items.len(),
            _ => 1,
        }
    }

    /// Convert into a tree value.
    ///
    /// Colours become lists of four integers; a tuple of colours is flattened
    /// into one list of `4 * n` integers so that it stays distinguishable from
    /// repeated colours (a list of lists).
    pub fn to_value(&self) -> Value {
        match self {
            PropertyValue::Scalar(scalar) => scalar.to_value(),
            PropertyValue::Tuple(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Scalar::Color(c) => out.extend(c.iter().map(|&b| Value::Int(b as i64))),
                        other => out.push(other.to_value()),
                    }
                }
                Value::List(out)
            }
            PropertyValue::Repeated(items) => {
                Value::List(items.iter().map(PropertyValue::to_value).collect())
            }
        }
    }
}

/// Read one element of type `ty`.
pub fn decode_scalar(reader: &mut BinaryReader<'_>, ty: PropertyType) -> Result<Scalar> {
    let scalar = match ty {
        PropertyType::None | PropertyType::ArraySeparator => Scalar::Null,
        PropertyType::Bool => Scalar::Bool(reader.read_bool()?),
        PropertyType::AnsiString => {
            let len = reader.read_u8()? as usize;
            Scalar::Text(reader.read_string(len)?.to_string())
        }
        PropertyType::Char => Scalar::Int(reader.read_i8()? as i64),
        PropertyType::UChar => Scalar::Int(reader.read_u8()? as i64),
        PropertyType::Short | PropertyType::ShortAngle => Scalar::Int(reader.read_i16()? as i64),
        PropertyType::UShort => Scalar::Int(reader.read_u16()? as i64),
        PropertyType::Long => Scalar::Int(reader.read_i32()? as i64),
        PropertyType::ULong | PropertyType::Angle => Scalar::Int(reader.read_u32()? as i64),
        PropertyType::Float => Scalar::Float(f64::from(reader.read_f32()?)),
        PropertyType::Double => Scalar::Float(reader.read_f64()?),
        PropertyType::Argb8888 => Scalar::Color(reader.read_array()?),
    };
    Ok(scalar)
}

/// Read the value bytes announced by `layout`, consuming exactly those bytes.
pub fn decode_value(reader: &mut BinaryReader<'_>, layout: Layout) -> Result<PropertyValue> {
    match layout.tuple_len {
        None => Ok(PropertyValue::Scalar(decode_scalar(reader, layout.ty)?)),
        Some(len) => {
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(decode_scalar(reader, layout.ty)?);
            }
            Ok(PropertyValue::Tuple(items))
        }
    }
}

/// Write `value` as one or more entries for `desc`.
///
/// Returns the number of entries written, which is what the chunk's
/// property count has to include.
pub fn encode_value(
    writer: &mut BinaryWriter,
    desc: &PropertyDescriptor,
    value: &PropertyValue,
) -> Result<usize> {
    match value {
        PropertyValue::Scalar(scalar) => {
            writer.write_u8(desc.code);
            writer.write_u8(Layout::scalar(desc.ty).type_byte());
            write_scalar(writer, desc, scalar)?;
            Ok(1)
        }
        PropertyValue::Tuple(items) => {
            let extra = tuple_extra(desc, items.len())?;
            writer.write_u8(desc.code);
            writer.write_u8(Layout::tuple(desc.ty, items.len()).type_byte());
            writer.write_u8(extra);
            for item in items {
                write_scalar(writer, desc, item)?;
            }
            Ok(1)
        }
        PropertyValue::Repeated(items) => {
            let mut written = 0;
            for item in items {
                if matches!(item, PropertyValue::Repeated(_)) {
                    return Err(mismatch(desc, "nested repetition"));
                }
                written += encode_value(writer, desc, item)?;
            }
            Ok(written)
        }
    }
}

/// Decide how a tree value is written for `desc`.
///
/// Non-list values are single scalars. Lists resolve, in order: repeated if
/// pinned so or if any element is itself a list; tuple if pinned so; colours
/// for `ARGB8888`; tuple for floating point types; repeated for strings.
/// Anything else is [`Error::AmbiguousListEncoding`].
pub fn resolve_value(
    desc: &PropertyDescriptor,
    value: &Value,
    hints: &ListHints,
) -> Result<PropertyValue> {
    let items = match value {
        Value::List(items) => items,
        other => return Ok(PropertyValue::Scalar(to_scalar(desc, other)?)),
    };

    let hint = hints.get(desc.name);
    if hint == Some(ListEncoding::Repeated) || items.iter().any(Value::is_list) {
        return resolve_repeated(desc, items);
    }
    if hint == Some(ListEncoding::Tuple) {
        return resolve_tuple(desc, items);
    }

    match desc.ty {
        PropertyType::Argb8888 => resolve_colors(desc, items),
        ty if ty.is_float() => resolve_tuple(desc, items),
        PropertyType::AnsiString => resolve_repeated(desc, items),
        _ => Err(Error::AmbiguousListEncoding(desc.name.to_string())),
    }
}

fn resolve_repeated(desc: &PropertyDescriptor, items: &[Value]) -> Result<PropertyValue> {
    if items.is_empty() {
        return Err(mismatch(desc, "empty list"));
    }
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let element = match item {
            Value::List(inner) if desc.ty == PropertyType::Argb8888 => resolve_colors(desc, inner)?,
            Value::List(inner) => resolve_tuple(desc, inner)?,
            other => PropertyValue::Scalar(to_scalar(desc, other)?),
        };
        out.push(element);
    }
    Ok(PropertyValue::Repeated(out))
}

fn resolve_tuple(desc: &PropertyDescriptor, items: &[Value]) -> Result<PropertyValue> {
    tuple_extra(desc, items.len())?;
    let scalars = items
        .iter()
        .map(|item| to_scalar(desc, item))
        .collect::<Result<Vec<_>>>()?;
    Ok(PropertyValue::Tuple(scalars))
}

/// Four integers are one colour; `4 * n` integers are a tuple of `n` colours.
fn resolve_colors(desc: &PropertyDescriptor, items: &[Value]) -> Result<PropertyValue> {
    if items.is_empty() || items.len() % 4 != 0 {
        return Err(mismatch(desc, &format!("list of {} integers", items.len())));
    }

    let mut colors = Vec::with_capacity(items.len() / 4);
    for channels in items.chunks_exact(4) {
        let mut color = [0u8; 4];
        for (slot, channel) in color.iter_mut().zip(channels) {
            let v = channel
                .as_i64()
                .ok_or_else(|| mismatch(desc, channel.type_name()))?;
            *slot = u8::try_from(v).map_err(|_| Error::ValueOutOfRange {
                property: desc.name.to_string(),
                value: v,
                width: 1,
            })?;
        }
        colors.push(Scalar::Color(color));
    }

    if colors.len() == 1 {
        return Ok(PropertyValue::Scalar(colors.swap_remove(0)));
    }
    tuple_extra(desc, colors.len())?;
    Ok(PropertyValue::Tuple(colors))
}

/// Convert a non-list tree value into an element of `desc.ty`.
fn to_scalar(desc: &PropertyDescriptor, value: &Value) -> Result<Scalar> {
    let ty = desc.ty;
    match (ty, value) {
        (PropertyType::None | PropertyType::ArraySeparator, Value::Null) => Ok(Scalar::Null),
        (PropertyType::Bool, Value::Bool(v)) => Ok(Scalar::Bool(*v)),
        (PropertyType::AnsiString, Value::String(s)) => {
            if s.len() > u8::MAX as usize {
                return Err(Error::StringTooLong {
                    property: desc.name.to_string(),
                    len: s.len(),
                });
            }
            Ok(Scalar::Text(s.clone()))
        }
        (_, Value::Float(_) | Value::Int(_)) if ty.is_float() => {
            // Integral floats written by hand may come back from JSON as integers
            Ok(Scalar::Float(value.as_f64().unwrap_or_default()))
        }
        (_, Value::Int(v)) if ty.is_integer() => {
            check_int_range(desc, *v)?;
            Ok(Scalar::Int(*v))
        }
        (_, other) => Err(mismatch(desc, other.type_name())),
    }
}

/// Integers may use either the signed or the unsigned range of their width;
/// both produce the same bytes.
fn check_int_range(desc: &PropertyDescriptor, value: i64) -> Result<()> {
    let width = desc.ty.width().unwrap_or(0);
    let bits = (width * 8) as u32;
    let min = -(1i64 << (bits - 1));
    let max = (1i64 << bits) - 1;
    if value < min || value > max {
        return Err(Error::ValueOutOfRange {
            property: desc.name.to_string(),
            value,
            width,
        });
    }
    Ok(())
}

fn write_scalar(writer: &mut BinaryWriter, desc: &PropertyDescriptor, scalar: &Scalar) -> Result<()> {
    match (desc.ty, scalar) {
        (PropertyType::None | PropertyType::ArraySeparator, Scalar::Null) => {}
        (PropertyType::Bool, Scalar::Bool(v)) => writer.write_u8(*v as u8),
        (PropertyType::AnsiString, Scalar::Text(s)) => {
            let len = u8::try_from(s.len()).map_err(|_| Error::StringTooLong {
                property: desc.name.to_string(),
                len: s.len(),
            })?;
            writer.write_u8(len);
            writer.write_bytes(s.as_bytes());
        }
        (PropertyType::Float, Scalar::Float(v)) => writer.write_f32(*v as f32),
        (PropertyType::Double, Scalar::Float(v)) => writer.write_f64(*v),
        (PropertyType::Argb8888, Scalar::Color(c)) => writer.write_bytes(c),
        (ty, Scalar::Int(v)) if ty.is_integer() => {
            check_int_range(desc, *v)?;
            // Two's complement truncation covers both signed and unsigned ranges
            match ty.width() {
                Some(1) => writer.write_u8(*v as u8),
                Some(2) => writer.write_u16(*v as u16),
                _ => writer.write_u32(*v as u32),
            }
        }
        (_, other) => return Err(mismatch(desc, scalar_kind(other))),
    }
    Ok(())
}

fn tuple_extra(desc: &PropertyDescriptor, len: usize) -> Result<u8> {
    if len < MIN_TUPLE_LEN {
        return Err(mismatch(desc, &format!("list of {} elements", len)));
    }
    u8::try_from(len - MIN_TUPLE_LEN).map_err(|_| Error::CountOverflow {
        what: "tuple element",
        count: len,
        limit: MAX_TUPLE_LEN,
    })
}

fn scalar_kind(scalar: &Scalar) -> &'static str {
    match scalar {
        Scalar::Null => "null",
        Scalar::Bool(_) => "bool",
        Scalar::Int(_) => "integer",
        Scalar::Float(_) => "float",
        Scalar::Text(_) => "string",
        Scalar::Color(_) => "colour",
    }
}

fn mismatch(desc: &PropertyDescriptor, actual: &str) -> Error {
    Error::ValueMismatch {
        property: desc.name.to_string(),
        expected: desc.ty,
        actual: actual.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(code: u8, name: &'static str, ty: PropertyType) -> PropertyDescriptor {
        PropertyDescriptor { code, name, ty }
    }

    fn encode(desc: &PropertyDescriptor, value: &Value) -> Result<(Vec<u8>, usize)> {
        let resolved = resolve_value(desc, value, &ListHints::standard())?;
        let mut writer = BinaryWriter::new();
        let count = encode_value(&mut writer, desc, &resolved)?;
        Ok((writer.into_inner(), count))
    }

    fn ints(values: &[i64]) -> Value {
        Value::List(values.iter().map(|&v| Value::Int(v)).collect())
    }

    #[test]
    fn test_type_byte_flags() {
        assert_eq!(
            Layout::from_type_byte(0x12, 0x0A, None).unwrap(),
            Layout::scalar(PropertyType::Float)
        );
        assert_eq!(
            Layout::from_type_byte(0x12, 0x4A, Some(1)).unwrap(),
            Layout::tuple(PropertyType::Float, 3)
        );
        assert_eq!(Layout::tuple(PropertyType::Float, 3).type_byte(), 0x4A);
    }

    #[test]
    fn test_type_byte_rejections() {
        for (type_byte, extra) in [(0xCA, Some(0)), (0x8A, None), (0x0F, None), (0x3F, None), (0x42, Some(0))] {
            assert!(
                matches!(
                    Layout::from_type_byte(0x12, type_byte, extra),
                    Err(Error::UnsupportedPropertyEncoding { code: 0x12, .. })
                ),
                "type byte {:#04x} accepted",
                type_byte
            );
        }
    }

    #[test]
    fn test_decode_scalars() {
        let data = [
            0xFF, // Char
            0xFF, // UChar
            0xFE, 0xFF, // Short
            0xFE, 0xFF, // UShort
            0x00, 0x00, 0x80, 0x3F, // Float 1.0
            0x04, b'd', b'e', b'm', b'o', // AnsiString
            0x01, 0x02, 0x03, 0x04, // ARGB
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(decode_scalar(&mut reader, PropertyType::Char).unwrap(), Scalar::Int(-1));
        assert_eq!(decode_scalar(&mut reader, PropertyType::UChar).unwrap(), Scalar::Int(255));
        assert_eq!(decode_scalar(&mut reader, PropertyType::Short).unwrap(), Scalar::Int(-2));
        assert_eq!(decode_scalar(&mut reader, PropertyType::UShort).unwrap(), Scalar::Int(65534));
        assert_eq!(decode_scalar(&mut reader, PropertyType::Float).unwrap(), Scalar::Float(1.0));
        assert_eq!(
            decode_scalar(&mut reader, PropertyType::AnsiString).unwrap(),
            Scalar::Text("demo".into())
        );
        assert_eq!(
            decode_scalar(&mut reader, PropertyType::Argb8888).unwrap(),
            Scalar::Color([1, 2, 3, 4])
        );
        assert_eq!(decode_scalar(&mut reader, PropertyType::None).unwrap(), Scalar::Null);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_decode_tuple_consumes_exact_bytes() {
        let data = [0x4A, 0x00, 0, 0, 0x80, 0x3F, 0, 0, 0, 0x40, 0xAA];
        let mut reader = BinaryReader::new(&data);
        let layout = Layout::read(&mut reader, 0x12).unwrap();
        let value = decode_value(&mut reader, layout).unwrap();

        assert_eq!(
            value,
            PropertyValue::Tuple(vec![Scalar::Float(1.0), Scalar::Float(2.0)])
        );
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_encode_string() {
        let (bytes, count) = encode(&desc(0x03, "Name", PropertyType::AnsiString), &"demo".into()).unwrap();
        assert_eq!(bytes, b"\x03\x02\x04demo");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_encode_float_tuple() {
        let value = Value::List(vec![1.0.into(), 2.0.into(), 3.0.into()]);
        let (bytes, _) = encode(&desc(0x12, "PositionXYZ", PropertyType::Float), &value).unwrap();
        assert_eq!(&bytes[..3], &[0x12, 0x4A, 0x01]);
        assert_eq!(bytes.len(), 3 + 12);
    }

    #[test]
    fn test_encode_pinned_repetition() {
        let (bytes, count) = encode(&desc(0x45, "CropIndex", PropertyType::Short), &ints(&[1, 2])).unwrap();
        assert_eq!(bytes, [0x45, 0x05, 0x01, 0x00, 0x45, 0x05, 0x02, 0x00]);
        assert_eq!(count, 2);
    }

    #[test]
    fn test_encode_pinned_tuple() {
        let (bytes, count) = encode(&desc(0x49, "CropRef", PropertyType::Short), &ints(&[3, -1])).unwrap();
        assert_eq!(bytes, [0x49, 0x45, 0x00, 0x03, 0x00, 0xFF, 0xFF]);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_encode_colors() {
        let color = desc(0x04, "BackColor", PropertyType::Argb8888);

        let (single, _) = encode(&color, &ints(&[1, 2, 3, 4])).unwrap();
        assert_eq!(single, [0x04, 0x0C, 1, 2, 3, 4]);

        let (tuple, _) = encode(&color, &ints(&[1, 2, 3, 4, 5, 6, 7, 8])).unwrap();
        assert_eq!(tuple, [0x04, 0x4C, 0x00, 1, 2, 3, 4, 5, 6, 7, 8]);

        let repeated = Value::List(vec![ints(&[1, 2, 3, 4]), ints(&[5, 6, 7, 8])]);
        let (bytes, count) = encode(&color, &repeated).unwrap();
        assert_eq!(bytes, [0x04, 0x0C, 1, 2, 3, 4, 0x04, 0x0C, 5, 6, 7, 8]);
        assert_eq!(count, 2);

        assert!(matches!(
            encode(&color, &ints(&[1, 2, 3, 256])),
            Err(Error::ValueOutOfRange { width: 1, .. })
        ));
    }

    #[test]
    fn test_encode_integer_ranges() {
        let short = desc(0x45, "Child", PropertyType::Short);
        assert_eq!(encode(&short, &Value::Int(-1)).unwrap().0, [0x45, 0x05, 0xFF, 0xFF]);
        // The unsigned reading of the same two bytes is accepted too
        assert_eq!(encode(&short, &Value::Int(65535)).unwrap().0, [0x45, 0x05, 0xFF, 0xFF]);
        assert!(matches!(
            encode(&short, &Value::Int(65536)),
            Err(Error::ValueOutOfRange { width: 2, .. })
        ));
        assert!(matches!(
            encode(&short, &Value::Int(-32769)),
            Err(Error::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn test_ambiguous_list_rejected() {
        let margins = desc(0x7F, "Margins", PropertyType::Short);
        assert!(matches!(
            encode(&margins, &ints(&[0, 0, 16, 16])),
            Err(Error::AmbiguousListEncoding(name)) if name == "Margins"
        ));
    }

    #[test]
    fn test_rectangle_is_a_tuple() {
        let rect = desc(0x65, "Rectangle", PropertyType::Short);
        let (bytes, count) = encode(&rect, &ints(&[0, 0, 16, 16])).unwrap();
        assert_eq!(bytes, [0x65, 0x45, 0x02, 0, 0, 0, 0, 16, 0, 16, 0]);
        assert_eq!(count, 1);

        let mut reader = BinaryReader::new(&bytes[1..]);
        let layout = Layout::read(&mut reader, 0x65).unwrap();
        assert_eq!(decode_value(&mut reader, layout).unwrap().to_value(), ints(&[0, 0, 16, 16]));
    }

    #[test]
    fn test_value_mismatch() {
        let name = desc(0x03, "Name", PropertyType::AnsiString);
        assert!(matches!(encode(&name, &Value::Int(1)), Err(Error::ValueMismatch { .. })));

        let width = desc(0x40, "Width", PropertyType::UShort);
        assert!(matches!(encode(&width, &Value::Float(1.5)), Err(Error::ValueMismatch { .. })));
    }

    #[test]
    fn test_string_too_long() {
        let name = desc(0x03, "Name", PropertyType::AnsiString);
        let long = Value::String("x".repeat(256));
        assert!(matches!(encode(&name, &long), Err(Error::StringTooLong { len: 256, .. })));
    }

    #[test]
    fn test_tuple_length_limits() {
        let pos = desc(0x12, "PositionXYZ", PropertyType::Float);
        let max = Value::List(vec![Value::Float(0.0); MAX_TUPLE_LEN]);
        let (bytes, _) = encode(&pos, &max).unwrap();
        assert_eq!(bytes[2], 0xFF);

        let over = Value::List(vec![Value::Float(0.0); MAX_TUPLE_LEN + 1]);
        assert!(matches!(encode(&pos, &over), Err(Error::CountOverflow { .. })));

        let under = Value::List(vec![Value::Float(0.0)]);
        assert!(matches!(encode(&pos, &under), Err(Error::ValueMismatch { .. })));
    }

    #[test]
    fn test_color_tuple_flattens() {
        let value = PropertyValue::Tuple(vec![Scalar::Color([1, 2, 3, 4]), Scalar::Color([5, 6, 7, 8])]);
        assert_eq!(value.to_value(), ints(&[1, 2, 3, 4, 5, 6, 7, 8]));
    }
}
