use std::collections::HashMap;
use std::io::{Read, Seek};
use std::rc::Rc;

use crate::reader::LittleEndianReader;

use super::error::ParseError;
use super::graph::{
    ArrayInstance, ClassInfo, ClassShape, Entity, MemberReference, MemberTypeInfo, MemberValue,
    ObjectGraph, ObjectInstance, StringInstance,
};
use super::patch::FieldSlot;
use super::primitives::{decode_primitive, read_length_prefixed_string};
use super::wire::{BinaryArrayType, BinaryType, PrimitiveType, RecordTag};

/// Fields of the mandatory leading SerializedStreamHeader record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    pub root_id: i32,
    pub header_id: i32,
    pub major_version: i32,
    pub minor_version: i32,
}

/// Everything one pass over the stream produces: the header, the graph of
/// all decoded entities, and the top-level objects keyed by class name.
#[derive(Debug)]
pub struct ParsedStream {
    pub header: StreamHeader,
    pub graph: ObjectGraph,
    pub roots: HashMap<String, i32>,
}

/// What one record contributed, from the point of view of whoever asked
/// for it (the top-level loop or a member-value decode).
enum Record {
    /// A new entity was registered under this object id.
    Entity(i32),
    Reference(MemberReference),
    Null,
    /// Run-length-encoded nulls, count only.
    NullRun(u32),
    /// Metadata-only record (system class shape); no entity.
    Metadata,
    /// A library declaration; callers waiting for a value read on.
    Library,
    End,
}

/// Parses a whole stream. The first record must be the header; records are
/// then dispatched by tag until MessageEnd. Unexpected end of input is a
/// truncation error.
pub fn parse_stream<R: Read + Seek>(
    r: &mut LittleEndianReader<R>,
) -> Result<ParsedStream, ParseError> {
    let leading = r.read_u8().map_err(|_| ParseError::Truncated {
        context: "leading record tag",
    })?;
    if RecordTag::from_wire(leading, 0)? != RecordTag::SerializedStreamHeader {
        return Err(ParseError::BadLeadingTag(leading));
    }
    let header = read_stream_header(r)?;

    let mut parser = RecordParser::new();
    loop {
        match parser.read_record(r, true)? {
            Record::End => break,
            _ => continue,
        }
    }

    Ok(ParsedStream {
        header,
        graph: parser.graph,
        roots: parser.roots,
    })
}

fn read_stream_header<R: Read + Seek>(
    r: &mut LittleEndianReader<R>,
) -> Result<StreamHeader, ParseError> {
    let truncated = |_| ParseError::Truncated {
        context: "stream header",
    };
    Ok(StreamHeader {
        root_id: r.read_i32().map_err(truncated)?,
        header_id: r.read_i32().map_err(truncated)?,
        major_version: r.read_i32().map_err(truncated)?,
        minor_version: r.read_i32().map_err(truncated)?,
    })
}

struct RecordParser {
    graph: ObjectGraph,
    roots: HashMap<String, i32>,
}

impl RecordParser {
    fn new() -> Self {
        Self {
            graph: ObjectGraph::new(),
            roots: HashMap::new(),
        }
    }

    /// Reads one tag byte and dispatches to the matching record reader.
    fn read_record<R: Read + Seek>(
        &mut self,
        r: &mut LittleEndianReader<R>,
        top_level: bool,
    ) -> Result<Record, ParseError> {
        let offset = r.position()?;
        let raw = r.read_u8().map_err(|_| ParseError::Truncated {
            context: "record tag",
        })?;

        match RecordTag::from_wire(raw, offset)? {
            RecordTag::SerializedStreamHeader => Err(ParseError::UnexpectedRecord {
                what: "second stream header",
            }),
            RecordTag::ClassWithId => self.read_class_with_id(r),
            RecordTag::SystemClassWithMembers => self.read_system_class_with_members(r),
            RecordTag::ClassWithMembers => {
                Err(ParseError::Unsupported("ClassWithMembers record (tag 3)"))
            }
            RecordTag::SystemClassWithMembersAndTypes => {
                self.read_class_with_members_and_types(r, false, false)
            }
            RecordTag::ClassWithMembersAndTypes => {
                self.read_class_with_members_and_types(r, true, top_level)
            }
            RecordTag::BinaryObjectString => self.read_binary_object_string(r),
            RecordTag::BinaryArray => self.read_binary_array(r),
            RecordTag::MemberPrimitiveTyped => Err(ParseError::Unsupported(
                "MemberPrimitiveTyped record (tag 8)",
            )),
            RecordTag::MemberReference => {
                let id_ref = r.read_i32()?;
                Ok(Record::Reference(MemberReference { id_ref }))
            }
            RecordTag::ObjectNull => Ok(Record::Null),
            RecordTag::MessageEnd => Ok(Record::End),
            RecordTag::BinaryLibrary => self.read_binary_library(r),
            RecordTag::ObjectNullMultiple256 => {
                let count = r.read_u8()?;
                Ok(Record::NullRun(count as u32))
            }
            RecordTag::ObjectNullMultiple => {
                let count = r.read_i32()?;
                let count = u32::try_from(count).map_err(|_| ParseError::InvalidCount {
                    what: "null run",
                    value: count as i64,
                })?;
                Ok(Record::NullRun(count))
            }
            RecordTag::ArraySinglePrimitive => self.read_array_single_primitive(r),
            RecordTag::ArraySingleObject => {
                let _object_id = r.read_i32()?;
                let _length = r.read_i32()?;
                Err(ParseError::Unsupported(
                    "ArraySingleObject element decoding (tag 16)",
                ))
            }
            RecordTag::ArraySingleString => {
                let _object_id = r.read_i32()?;
                let _length = r.read_i32()?;
                Err(ParseError::Unsupported(
                    "ArraySingleString element decoding (tag 17)",
                ))
            }
            RecordTag::MethodCall => Err(ParseError::Unsupported("MethodCall record (tag 21)")),
            RecordTag::MethodReturn => Err(ParseError::Unsupported("MethodReturn record (tag 22)")),
        }
    }

    // --- Tag 1: ClassWithId ---

    /// A back-reference to previously declared class metadata: only the
    /// new instance's id plus the metadata id, then the member values.
    /// Missing metadata is fatal; the values cannot be decoded without the
    /// shape.
    fn read_class_with_id<R: Read + Seek>(
        &mut self,
        r: &mut LittleEndianReader<R>,
    ) -> Result<Record, ParseError> {
        let object_id = r.read_i32()?;
        let metadata_id = r.read_i32()?;

        let shape = self
            .graph
            .class_shape(metadata_id)
            .cloned()
            .ok_or(ParseError::UnknownClassMetadata {
                object_id,
                metadata_id,
            })?;

        let mut instance = ObjectInstance::new(object_id, shape);
        self.read_instance_values(r, &mut instance)?;
        self.graph.register(Entity::Object(instance))?;
        Ok(Record::Entity(object_id))
    }

    // --- Tag 2: SystemClassWithMembers ---

    /// Metadata-only shape for a built-in type: class info without member
    /// types, so no values follow and no instance is created.
    fn read_system_class_with_members<R: Read + Seek>(
        &mut self,
        r: &mut LittleEndianReader<R>,
    ) -> Result<Record, ParseError> {
        let class_info = self.read_class_info(r)?;
        self.graph.record_system_class(class_info);
        Ok(Record::Metadata)
    }

    // --- Tags 4/5: class declaration with member types ---

    /// Declares a class shape and its first instance in one record. Tag 5
    /// (user classes) carries a trailing library id; tag 4 (system
    /// classes) does not. Top-level tag-5 records are indexed by class
    /// name so well-known root structures can be found again.
    fn read_class_with_members_and_types<R: Read + Seek>(
        &mut self,
        r: &mut LittleEndianReader<R>,
        has_library: bool,
        top_level: bool,
    ) -> Result<Record, ParseError> {
        let class_info = self.read_class_info(r)?;
        let member_types = self.read_member_types(r, &class_info)?;
        if has_library {
            let library_id = r.read_i32()?;
            if self.graph.library(library_id).is_none() {
                return Err(ParseError::UnknownLibrary {
                    type_name: class_info.name,
                    library_id,
                });
            }
        }

        let object_id = class_info.object_id;
        let class_name = class_info.name.clone();
        let shape = Rc::new(ClassShape {
            class_info,
            member_types,
        });
        self.graph.register_class(Rc::clone(&shape))?;

        let mut instance = ObjectInstance::new(object_id, shape);
        self.read_instance_values(r, &mut instance)?;
        self.graph.register(Entity::Object(instance))?;

        if top_level {
            self.roots.insert(class_name, object_id);
        }
        Ok(Record::Entity(object_id))
    }

    // --- Tag 6: BinaryObjectString ---

    fn read_binary_object_string<R: Read + Seek>(
        &mut self,
        r: &mut LittleEndianReader<R>,
    ) -> Result<Record, ParseError> {
        let object_id = r.read_i32()?;
        let value = read_length_prefixed_string(r)?;
        self.graph
            .register(Entity::String(StringInstance { object_id, value }))?;
        Ok(Record::Entity(object_id))
    }

    // --- Tag 7: BinaryArray ---

    /// The shape header (rank, lengths, lower bounds for offset kinds,
    /// element-type descriptor) is fully parsed, but no sample data has
    /// confirmed the element layout for multi-dimensional or offset
    /// arrays, so decoding stops loudly here instead of guessing.
    fn read_binary_array<R: Read + Seek>(
        &mut self,
        r: &mut LittleEndianReader<R>,
    ) -> Result<Record, ParseError> {
        let _object_id = r.read_i32()?;
        let array_type = BinaryArrayType::from_wire(r.read_u8()?)?;
        let rank = r.read_i32()?;
        let rank = usize::try_from(rank).map_err(|_| ParseError::InvalidCount {
            what: "array rank",
            value: rank as i64,
        })?;

        for _ in 0..rank {
            let _length = r.read_i32()?;
        }
        if array_type.has_lower_bounds() {
            for _ in 0..rank {
                let _lower_bound = r.read_i32()?;
            }
        }

        // Element-type descriptor, same encoding as one member type.
        let element_type = BinaryType::from_wire(r.read_u8()?)?;
        let _ = self.read_additional_type_info(r, element_type)?;

        Err(ParseError::Unsupported("BinaryArray element decoding (tag 7)"))
    }

    // --- Tag 12: BinaryLibrary ---

    fn read_binary_library<R: Read + Seek>(
        &mut self,
        r: &mut LittleEndianReader<R>,
    ) -> Result<Record, ParseError> {
        let library_id = r.read_i32()?;
        let library_name = read_length_prefixed_string(r)?;
        self.graph.declare_library(library_id, library_name);
        Ok(Record::Library)
    }

    // --- Tag 15: ArraySinglePrimitive ---

    fn read_array_single_primitive<R: Read + Seek>(
        &mut self,
        r: &mut LittleEndianReader<R>,
    ) -> Result<Record, ParseError> {
        let object_id = r.read_i32()?;
        let length = r.read_i32()?;
        if length < 0 {
            return Err(ParseError::InvalidCount {
                what: "array length",
                value: length as i64,
            });
        }
        let primitive_type = PrimitiveType::from_wire(r.read_u8()?)?;

        let mut array = ArrayInstance::new(object_id, length, primitive_type);
        for _ in 0..length {
            array.add_value(read_primitive_member(r, primitive_type)?);
        }
        self.graph.register(Entity::Array(array))?;
        Ok(Record::Entity(object_id))
    }

    // --- Shared metadata readers ---

    fn read_class_info<R: Read + Seek>(
        &mut self,
        r: &mut LittleEndianReader<R>,
    ) -> Result<ClassInfo, ParseError> {
        let object_id = r.read_i32()?;
        let name = read_length_prefixed_string(r)?;
        let member_count = r.read_i32()?;
        let count = usize::try_from(member_count).map_err(|_| ParseError::InvalidCount {
            what: "member",
            value: member_count as i64,
        })?;

        let mut member_names = Vec::with_capacity(count);
        for _ in 0..count {
            member_names.push(read_length_prefixed_string(r)?);
        }

        Ok(ClassInfo {
            object_id,
            name,
            member_count,
            member_names,
        })
    }

    /// Reads the member-type block: first one binary-type byte per member,
    /// then the additional info each tag calls for, in the same order.
    fn read_member_types<R: Read + Seek>(
        &mut self,
        r: &mut LittleEndianReader<R>,
        class_info: &ClassInfo,
    ) -> Result<Vec<MemberTypeInfo>, ParseError> {
        let count = class_info.member_names.len();
        let mut tags = Vec::with_capacity(count);
        for _ in 0..count {
            tags.push(BinaryType::from_wire(r.read_u8()?)?);
        }

        let mut member_types = Vec::with_capacity(count);
        for tag in tags {
            member_types.push(self.read_additional_type_info(r, tag)?);
        }
        Ok(member_types)
    }

    /// Additional per-member info depends on the binary type: a scalar
    /// code for Primitive/PrimitiveArray, a discarded type name for
    /// SystemClass (system types are not resolved against the library
    /// table), a validated (type name, library id) pair for Class, and
    /// nothing otherwise.
    fn read_additional_type_info<R: Read + Seek>(
        &mut self,
        r: &mut LittleEndianReader<R>,
        tag: BinaryType,
    ) -> Result<MemberTypeInfo, ParseError> {
        Ok(match tag {
            BinaryType::Primitive => {
                MemberTypeInfo::Primitive(PrimitiveType::from_wire(r.read_u8()?)?)
            }
            BinaryType::PrimitiveArray => {
                MemberTypeInfo::PrimitiveArray(PrimitiveType::from_wire(r.read_u8()?)?)
            }
            BinaryType::String => MemberTypeInfo::String,
            BinaryType::Object => MemberTypeInfo::Object,
            BinaryType::ObjectArray => MemberTypeInfo::ObjectArray,
            BinaryType::StringArray => MemberTypeInfo::StringArray,
            BinaryType::SystemClass => {
                let _type_name = read_length_prefixed_string(r)?;
                MemberTypeInfo::SystemClass
            }
            BinaryType::Class => {
                let type_name = read_length_prefixed_string(r)?;
                let library_id = r.read_i32()?;
                MemberTypeInfo::Class(self.graph.resolve_class_type(type_name, library_id)?)
            }
        })
    }

    // --- Member value decoding ---

    /// Decodes one value per declared member, in declaration order.
    /// Primitive members read bytes directly; every other binary type's
    /// value is itself a record (commonly a MemberReference or a nested
    /// object), which is why references must stay lazy.
    fn read_instance_values<R: Read + Seek>(
        &mut self,
        r: &mut LittleEndianReader<R>,
        instance: &mut ObjectInstance,
    ) -> Result<(), ParseError> {
        let member_types = Rc::clone(instance.shape());
        let mut pending_nulls = 0u32;

        for member_type in &member_types.member_types {
            if pending_nulls > 0 {
                pending_nulls -= 1;
                instance.add_value(MemberValue::Null)?;
                continue;
            }

            let value = match member_type {
                MemberTypeInfo::Primitive(kind) => read_primitive_member(r, *kind)?,
                _ => loop {
                    match self.read_record(r, false)? {
                        Record::Entity(id) => break MemberValue::Object(id),
                        Record::Reference(reference) => break MemberValue::Reference(reference),
                        Record::Null => break MemberValue::Null,
                        Record::NullRun(count) => {
                            pending_nulls = count.saturating_sub(1);
                            break MemberValue::Null;
                        }
                        // Libraries may be declared right before the value
                        // that needs them; keep reading.
                        Record::Library => continue,
                        Record::Metadata => {
                            return Err(ParseError::UnexpectedRecord {
                                what: "metadata-only record as a member value",
                            });
                        }
                        Record::End => {
                            return Err(ParseError::UnexpectedRecord {
                                what: "MessageEnd inside member values",
                            });
                        }
                    }
                },
            };
            instance.add_value(value)?;
        }

        if pending_nulls > 0 {
            let declared = member_types.class_info.member_names.len();
            return Err(ParseError::ShapeMismatch {
                class_name: member_types.class_info.name.clone(),
                expected: declared,
                actual: declared + pending_nulls as usize,
            });
        }

        instance.check_complete()
    }
}

/// Reads one primitive, tracking the byte offset for the fixed-width kinds
/// the patch engine supports so the field can later be overwritten in
/// place.
fn read_primitive_member<R: Read + Seek>(
    r: &mut LittleEndianReader<R>,
    kind: PrimitiveType,
) -> Result<MemberValue, ParseError> {
    match kind {
        PrimitiveType::Boolean => {
            let offset = r.position()? as usize;
            let value = r.read_u8()? != 0;
            Ok(MemberValue::Field(FieldSlot::Boolean { value, offset }))
        }
        PrimitiveType::Int32 => {
            let offset = r.position()? as usize;
            let value = r.read_i32()?;
            Ok(MemberValue::Field(FieldSlot::Int32 { value, offset }))
        }
        _ => Ok(MemberValue::Primitive(decode_primitive(kind, r)?)),
    }
}
