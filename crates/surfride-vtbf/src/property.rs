//! Property types and the property code table.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{Error, Result};

/// Scalar type of a property, stored in the low 6 bits of its type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PropertyType {
    /// Zero-width marker.
    None = 0x00,
    /// 1 byte, non-zero is true.
    Bool = 0x01,
    /// 1-byte length prefix followed by that many bytes of text.
    AnsiString = 0x02,
    /// Signed 8-bit integer.
    Char = 0x03,
    /// Unsigned 8-bit integer.
    UChar = 0x04,
    /// Signed 16-bit integer.
    Short = 0x05,
    /// Unsigned 16-bit integer.
    UShort = 0x06,
    /// 16-bit angle, stored as a signed integer.
    ShortAngle = 0x07,
    /// Signed 32-bit integer.
    Long = 0x08,
    /// Unsigned 32-bit integer.
    ULong = 0x09,
    /// 32-bit floating point.
    Float = 0x0A,
    /// 32-bit angle, stored as an unsigned integer.
    Angle = 0x0B,
    /// Four colour channel bytes.
    Argb8888 = 0x0C,
    /// 64-bit floating point.
    Double = 0x0D,
    /// Zero-width separator.
    ArraySeparator = 0x0E,
}

impl PropertyType {
    /// Parse from the base-type bits of a type byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::None),
            0x01 => Some(Self::Bool),
            0x02 => Some(Self::AnsiString),
            0x03 => Some(Self::Char),
            0x04 => Some(Self::UChar),
            0x05 => Some(Self::Short),
            0x06 => Some(Self::UShort),
            0x07 => Some(Self::ShortAngle),
            0x08 => Some(Self::Long),
            0x09 => Some(Self::ULong),
            0x0A => Some(Self::Float),
            0x0B => Some(Self::Angle),
            0x0C => Some(Self::Argb8888),
            0x0D => Some(Self::Double),
            0x0E => Some(Self::ArraySeparator),
            _ => None,
        }
    }

    /// The type code as stored in a type byte.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Fixed width of one value in bytes, or `None` for length-prefixed strings.
    pub fn width(self) -> Option<usize> {
        match self {
            Self::None | Self::ArraySeparator => Some(0),
            Self::Bool | Self::Char | Self::UChar => Some(1),
            Self::Short | Self::UShort | Self::ShortAngle => Some(2),
            Self::Long | Self::ULong | Self::Float | Self::Angle | Self::Argb8888 => Some(4),
            Self::Double => Some(8),
            Self::AnsiString => None,
        }
    }

    /// Check if values of this type are integers.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::UChar
                | Self::Short
                | Self::UShort
                | Self::ShortAngle
                | Self::Long
                | Self::ULong
                | Self::Angle
        )
    }

    /// Check if values of this type are floating point.
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Get the string name for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bool => "Bool",
            Self::AnsiString => "AnsiString",
            Self::Char => "Char",
            Self::UChar => "UChar",
            Self::Short => "Short",
            Self::UShort => "UShort",
            Self::ShortAngle => "ShortAngle",
            Self::Long => "Long",
            Self::ULong => "ULong",
            Self::Float => "Float",
            Self::Angle => "Angle",
            Self::Argb8888 => "ARGB8888",
            Self::Double => "Double",
            Self::ArraySeparator => "ArraySeparator",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Code byte preceding the type byte on disk.
    pub code: u8,
    /// Name used as the key in the decoded tree.
    pub name: &'static str,
    /// Declared scalar type; the encoder's source of truth.
    pub ty: PropertyType,
}

/// Bijective mapping between property codes and names.
///
/// Built as two one-directional maps; construction fails if either side
/// contains a duplicate.
#[derive(Debug, Clone)]
pub struct PropertyTable {
    by_code: FxHashMap<u8, PropertyDescriptor>,
    by_name: FxHashMap<&'static str, u8>,
}

impl PropertyTable {
    /// Build a table from `(code, name, type)` entries.
    pub fn new(entries: &[(u8, &'static str, PropertyType)]) -> Result<Self> {
        let mut by_code = FxHashMap::default();
        let mut by_name = FxHashMap::default();
        by_code.reserve(entries.len());
        by_name.reserve(entries.len());

        for &(code, name, ty) in entries {
            if by_code
                .insert(code, PropertyDescriptor { code, name, ty })
                .is_some()
            {
                return Err(Error::DuplicateTableEntry {
                    table: "property code",
                    key: format!("{:#04x}", code),
                });
            }
            if by_name.insert(name, code).is_some() {
                return Err(Error::DuplicateTableEntry {
                    table: "property name",
                    key: name.to_string(),
                });
            }
        }

        Ok(Self { by_code, by_name })
    }

    /// Build the table of every property the scene format defines.
    pub fn standard() -> Result<Self> {
        Self::new(STANDARD_PROPERTIES)
    }

    /// Look up a descriptor by code.
    pub fn by_code(&self, code: u8) -> Option<&PropertyDescriptor> {
        self.by_code.get(&code)
    }

    /// Look up a descriptor by name.
    pub fn by_name(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.by_name.get(name).and_then(|code| self.by_code.get(code))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

use PropertyType as T;

/// Property codes of the scene format.
pub const STANDARD_PROPERTIES: &[(u8, &str, PropertyType)] = &[
    (0x00, "SceneCount", T::UShort),
    (0x01, "TexListCount", T::UShort),
    (0x03, "Name", T::AnsiString),
    (0x04, "BackColor", T::Argb8888),
    (0x05, "FontCount", T::UShort),
    (0x06, "CommentLength", T::Short),
    (0x0E, "AttributeCount", T::UShort),
    (0x10, "LayerCount", T::UShort),
    (0x11, "CameraCount", T::UShort),
    (0x12, "PositionXYZ", T::Float),
    (0x13, "TargetXYZ", T::Float),
    (0x14, "FovY", T::Angle),
    (0x15, "ZNear", T::Float),
    (0x16, "ZFar", T::Float),
    (0x20, "Flags", T::ULong),
    (0x21, "CastCount", T::UShort),
    (0x22, "AnimationCount", T::UShort),
    (0x30, "Flags2", T::ULong),
    (0x31, "TranslationXY", T::Float),
    (0x32, "RotationZ", T::Angle),
    (0x33, "Scale", T::Float),
    (0x37, "MaterialColorRGBA", T::Argb8888),
    (0x38, "IlluminationColorRGBA", T::Argb8888),
    (0x39, "VertexColorRGBA", T::Argb8888),
    (0x3A, "Display", T::Bool),
    (0x3B, "Child", T::Short),
    (0x3C, "Sibling", T::Short),
    (0x3D, "MultiPosFlags", T::UShort),
    (0x3E, "MultiSizeFlags", T::UShort),
    (0x40, "Width", T::UShort),
    (0x41, "Height", T::UShort),
    (0x42, "PivotX", T::Float),
    (0x43, "PivotY", T::Float),
    (0x44, "CropRefCount", T::UShort),
    (0x45, "CropIndex", T::Short),
    (0x48, "ImageCastFlags", T::ULong),
    (0x49, "CropRef", T::Short),
    (0x50, "MotionCount", T::UShort),
    (0x51, "CastIndex", T::UShort),
    (0x52, "TrackCount", T::UShort),
    (0x53, "TrackType", T::UShort),
    (0x54, "Flags3", T::ULong),
    (0x55, "StartFrame", T::Long),
    (0x56, "EndFrame", T::Long),
    (0x57, "KeyCount", T::UShort),
    (0x58, "FirstFrame", T::Long),
    (0x59, "LastFrame", T::Long),
    (0x5A, "KeyFrame", T::Long),
    (0x5B, "KeyValue", T::Long),
    (0x5C, "Interpolation", T::UShort),
    (0x5D, "InParam", T::Float),
    (0x5E, "OutParam", T::Float),
    (0x60, "LayerCount2", T::UShort),
    (0x61, "TextureFileName", T::AnsiString),
    (0x62, "TextureFlags", T::ULong),
    (0x63, "CropCount", T::UShort),
    (0x65, "Rectangle", T::Short),
];
