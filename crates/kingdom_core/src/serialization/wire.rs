use super::error::ParseError;

/// One-byte tag introducing every record in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTag {
    SerializedStreamHeader = 0,
    ClassWithId = 1,
    SystemClassWithMembers = 2,
    ClassWithMembers = 3,
    SystemClassWithMembersAndTypes = 4,
    ClassWithMembersAndTypes = 5,
    BinaryObjectString = 6,
    BinaryArray = 7,
    MemberPrimitiveTyped = 8,
    MemberReference = 9,
    ObjectNull = 10,
    MessageEnd = 11,
    BinaryLibrary = 12,
    ObjectNullMultiple256 = 13,
    ObjectNullMultiple = 14,
    ArraySinglePrimitive = 15,
    ArraySingleObject = 16,
    ArraySingleString = 17,
    MethodCall = 21,
    MethodReturn = 22,
}

impl RecordTag {
    pub fn from_wire(raw: u8, offset: u64) -> Result<Self, ParseError> {
        Ok(match raw {
            0 => RecordTag::SerializedStreamHeader,
            1 => RecordTag::ClassWithId,
            2 => RecordTag::SystemClassWithMembers,
            3 => RecordTag::ClassWithMembers,
            4 => RecordTag::SystemClassWithMembersAndTypes,
            5 => RecordTag::ClassWithMembersAndTypes,
            6 => RecordTag::BinaryObjectString,
            7 => RecordTag::BinaryArray,
            8 => RecordTag::MemberPrimitiveTyped,
            9 => RecordTag::MemberReference,
            10 => RecordTag::ObjectNull,
            11 => RecordTag::MessageEnd,
            12 => RecordTag::BinaryLibrary,
            13 => RecordTag::ObjectNullMultiple256,
            14 => RecordTag::ObjectNullMultiple,
            15 => RecordTag::ArraySinglePrimitive,
            16 => RecordTag::ArraySingleObject,
            17 => RecordTag::ArraySingleString,
            21 => RecordTag::MethodCall,
            22 => RecordTag::MethodReturn,
            _ => return Err(ParseError::UnknownRecordTag { tag: raw, offset }),
        })
    }
}

/// Coarse wire-type category of a class member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryType {
    Primitive = 0,
    String = 1,
    Object = 2,
    SystemClass = 3,
    Class = 4,
    ObjectArray = 5,
    StringArray = 6,
    PrimitiveArray = 7,
}

impl BinaryType {
    pub fn from_wire(raw: u8) -> Result<Self, ParseError> {
        Ok(match raw {
            0 => BinaryType::Primitive,
            1 => BinaryType::String,
            2 => BinaryType::Object,
            3 => BinaryType::SystemClass,
            4 => BinaryType::Class,
            5 => BinaryType::ObjectArray,
            6 => BinaryType::StringArray,
            7 => BinaryType::PrimitiveArray,
            _ => return Err(ParseError::UnknownBinaryType(raw)),
        })
    }
}

/// Scalar type code used when the binary type is Primitive or
/// PrimitiveArray. The wire format has no value 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Boolean = 1,
    Byte = 2,
    Char = 3,
    Decimal = 5,
    Double = 6,
    Int16 = 7,
    Int32 = 8,
    Int64 = 9,
    SByte = 10,
    Single = 11,
    TimeSpan = 12,
    DateTime = 13,
    UInt16 = 14,
    UInt32 = 15,
    UInt64 = 16,
    Null = 17,
    String = 18,
}

impl PrimitiveType {
    pub fn from_wire(raw: u8) -> Result<Self, ParseError> {
        Ok(match raw {
            1 => PrimitiveType::Boolean,
            2 => PrimitiveType::Byte,
            3 => PrimitiveType::Char,
            5 => PrimitiveType::Decimal,
            6 => PrimitiveType::Double,
            7 => PrimitiveType::Int16,
            8 => PrimitiveType::Int32,
            9 => PrimitiveType::Int64,
            10 => PrimitiveType::SByte,
            11 => PrimitiveType::Single,
            12 => PrimitiveType::TimeSpan,
            13 => PrimitiveType::DateTime,
            14 => PrimitiveType::UInt16,
            15 => PrimitiveType::UInt32,
            16 => PrimitiveType::UInt64,
            17 => PrimitiveType::Null,
            18 => PrimitiveType::String,
            _ => return Err(ParseError::UnknownPrimitiveType(raw)),
        })
    }
}

/// Shape variant of a BinaryArray record. The offset variants carry
/// per-dimension lower bounds after the lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryArrayType {
    Single = 0,
    Jagged = 1,
    Rectangular = 2,
    SingleOffset = 3,
    JaggedOffset = 4,
    RectangularOffset = 5,
}

impl BinaryArrayType {
    pub fn from_wire(raw: u8) -> Result<Self, ParseError> {
        Ok(match raw {
            0 => BinaryArrayType::Single,
            1 => BinaryArrayType::Jagged,
            2 => BinaryArrayType::Rectangular,
            3 => BinaryArrayType::SingleOffset,
            4 => BinaryArrayType::JaggedOffset,
            5 => BinaryArrayType::RectangularOffset,
            _ => return Err(ParseError::UnknownArrayType(raw)),
        })
    }

    pub fn has_lower_bounds(self) -> bool {
        matches!(
            self,
            BinaryArrayType::SingleOffset
                | BinaryArrayType::JaggedOffset
                | BinaryArrayType::RectangularOffset
        )
    }
}
