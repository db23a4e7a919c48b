use std::error::Error;
use std::fmt;
use std::io;

/// Fatal decode errors. The stream has no resynchronization points, so any
/// of these aborts the whole parse.
#[derive(Debug)]
pub enum ParseError {
    /// The stream ended inside a record or fixed-width value.
    Truncated { context: &'static str },
    /// The first record was not a SerializedStreamHeader.
    BadLeadingTag(u8),
    UnknownRecordTag { tag: u8, offset: u64 },
    UnknownBinaryType(u8),
    UnknownPrimitiveType(u8),
    UnknownArrayType(u8),
    InvalidUtf8 { context: &'static str },
    /// A string length prefix encoded a length above the 2-byte cap, or the
    /// second prefix byte had its continuation bit set.
    BadLengthPrefix,
    StringTooLong(usize),
    MalformedDecimal(String),
    /// A class-typed member referenced a library id that was never declared.
    UnknownLibrary { type_name: String, library_id: i32 },
    /// A ClassWithId record referenced class metadata that was never read.
    UnknownClassMetadata { object_id: i32, metadata_id: i32 },
    /// An instance ended up with a different value count than its class
    /// declares members.
    ShapeMismatch {
        class_name: String,
        expected: usize,
        actual: usize,
    },
    DuplicateObjectId(i32),
    /// A structurally valid record appeared where the format forbids it,
    /// e.g. a second stream header or MessageEnd inside member values.
    UnexpectedRecord { what: &'static str },
    /// A count field (member count, null run, array length) was negative.
    InvalidCount { what: &'static str, value: i64 },
    /// Record or primitive kinds deliberately left unimplemented. Never
    /// silently skipped: the byte layout past this point is unverified.
    Unsupported(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Truncated { context } => {
                write!(f, "stream truncated while reading {context}")
            }
            ParseError::BadLeadingTag(tag) => {
                write!(f, "stream must start with a header record, found tag {tag}")
            }
            ParseError::UnknownRecordTag { tag, offset } => {
                write!(f, "unknown record tag {tag} at offset {offset}")
            }
            ParseError::UnknownBinaryType(raw) => write!(f, "unknown binary type {raw}"),
            ParseError::UnknownPrimitiveType(raw) => write!(f, "unknown primitive type {raw}"),
            ParseError::UnknownArrayType(raw) => write!(f, "unknown binary array type {raw}"),
            ParseError::InvalidUtf8 { context } => write!(f, "invalid UTF-8 in {context}"),
            ParseError::BadLengthPrefix => write!(f, "malformed string length prefix"),
            ParseError::StringTooLong(len) => {
                write!(f, "string length {len} exceeds the 16383-byte prefix cap")
            }
            ParseError::MalformedDecimal(value) => write!(f, "malformed decimal {value:?}"),
            ParseError::UnknownLibrary {
                type_name,
                library_id,
            } => write!(
                f,
                "class type {type_name:?} references undeclared library id {library_id}"
            ),
            ParseError::UnknownClassMetadata {
                object_id,
                metadata_id,
            } => write!(
                f,
                "object {object_id} references unknown class metadata id {metadata_id}"
            ),
            ParseError::ShapeMismatch {
                class_name,
                expected,
                actual,
            } => write!(
                f,
                "class {class_name:?} declares {expected} members but instance has {actual} values"
            ),
            ParseError::DuplicateObjectId(id) => write!(f, "duplicate object id {id}"),
            ParseError::UnexpectedRecord { what } => write!(f, "unexpected record: {what}"),
            ParseError::InvalidCount { what, value } => {
                write!(f, "invalid {what} count {value}")
            }
            ParseError::Unsupported(what) => write!(f, "unsupported: {what}"),
        }
    }
}

impl Error for ParseError {}

impl From<io::Error> for ParseError {
    fn from(_: io::Error) -> Self {
        // The reader only fails on short reads of an in-memory buffer.
        ParseError::Truncated { context: "record" }
    }
}

/// Non-fatal field access and patch failures, surfaced to the caller as a
/// rejected lookup or edit. The loaded document stays usable.
#[derive(Debug)]
pub enum FieldError {
    UnknownRoot(String),
    UnknownInstance(i32),
    UnknownMember(String),
    /// A member reference that still has no referent at the point the value
    /// is actually consumed.
    Unresolved(i32),
    /// The field's on-disk size is not fixed-width, so it cannot be patched
    /// in place.
    NotPatchable(String),
    /// The new value's type does not match the field's wire type.
    TypeMismatch {
        member: String,
        expected: &'static str,
    },
    /// The recorded byte offset no longer fits the buffer.
    OutOfBounds { offset: usize, len: usize },
    NotAnObject(i32),
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::UnknownRoot(name) => write!(f, "no root object with class name {name:?}"),
            FieldError::UnknownInstance(id) => write!(f, "no instance with object id {id}"),
            FieldError::UnknownMember(name) => write!(f, "no member named {name:?}"),
            FieldError::Unresolved(id) => {
                write!(f, "reference to object id {id} cannot be resolved")
            }
            FieldError::NotPatchable(member) => write!(
                f,
                "member {member:?} is not a fixed-width field and cannot be patched in place"
            ),
            FieldError::TypeMismatch { member, expected } => {
                write!(f, "member {member:?} expects a {expected} value")
            }
            FieldError::OutOfBounds { offset, len } => {
                write!(f, "patch offset {offset} out of bounds for buffer of {len} bytes")
            }
            FieldError::NotAnObject(id) => {
                write!(f, "object id {id} is not a class instance")
            }
        }
    }
}

impl Error for FieldError {}
