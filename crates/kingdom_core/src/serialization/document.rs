use std::collections::HashMap;
use std::io::Cursor;

use crate::reader::LittleEndianReader;

use super::error::{FieldError, ParseError};
use super::graph::{Entity, MemberValue, ObjectGraph, ObjectInstance};
use super::patch::{FieldSlot, PatchRejection, PatchValue};
use super::primitives::Primitive;
use super::records::{self, StreamHeader};

/// A fully parsed save held next to its source bytes. Reads go through the
/// decoded graph; writes go through the patch engine, which edits the
/// original buffer in place so unmodeled bytes survive untouched.
#[derive(Debug)]
pub struct SaveDocument {
    bytes: Vec<u8>,
    header: StreamHeader,
    graph: ObjectGraph,
    roots: HashMap<String, i32>,
}

/// A resolved member value, as handed to callers. References have already
/// been chased; entities come back as ids to look up in the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Boolean(bool),
    Int32(i32),
    Primitive(Primitive),
    Str(String),
    Null,
    Object(i32),
    Array(i32),
}

impl SaveDocument {
    pub fn parse(bytes: Vec<u8>) -> Result<Self, ParseError> {
        let mut r = LittleEndianReader::new(Cursor::new(&bytes));
        let parsed = records::parse_stream(&mut r)?;
        Ok(Self {
            bytes,
            header: parsed.header,
            graph: parsed.graph,
            roots: parsed.roots,
        })
    }

    pub fn header(&self) -> &StreamHeader {
        &self.header
    }

    pub fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    pub fn roots(&self) -> &HashMap<String, i32> {
        &self.roots
    }

    pub fn root_id(&self, class_name: &str) -> Result<i32, FieldError> {
        self.roots
            .get(class_name)
            .copied()
            .ok_or_else(|| FieldError::UnknownRoot(class_name.to_string()))
    }

    pub fn instance(&self, object_id: i32) -> Result<&ObjectInstance, FieldError> {
        match self.graph.lookup(object_id) {
            Some(Entity::Object(instance)) => Ok(instance),
            Some(_) => Err(FieldError::NotAnObject(object_id)),
            None => Err(FieldError::UnknownInstance(object_id)),
        }
    }

    /// Looks up one member of one instance and resolves it to a value.
    /// References are chased here, at the point of consumption; a dangling
    /// id is reported as unresolved rather than a parse failure.
    pub fn field(&self, object_id: i32, member: &str) -> Result<FieldValue, FieldError> {
        let instance = self.instance(object_id)?;
        let value = instance
            .value(member)
            .ok_or_else(|| FieldError::UnknownMember(member.to_string()))?;
        self.resolve_value(value)
    }

    fn resolve_value(&self, value: &MemberValue) -> Result<FieldValue, FieldError> {
        Ok(match value {
            MemberValue::Field(FieldSlot::Boolean { value, .. }) => FieldValue::Boolean(*value),
            MemberValue::Field(FieldSlot::Int32 { value, .. }) => FieldValue::Int32(*value),
            MemberValue::Primitive(p) => FieldValue::Primitive(p.clone()),
            MemberValue::Null => FieldValue::Null,
            MemberValue::Object(id) => self.resolve_entity(*id)?,
            MemberValue::Reference(reference) => match reference.resolve(&self.graph) {
                Some(_) => self.resolve_entity(reference.id_ref)?,
                None => return Err(FieldError::Unresolved(reference.id_ref)),
            },
        })
    }

    fn resolve_entity(&self, id: i32) -> Result<FieldValue, FieldError> {
        match self.graph.lookup(id) {
            Some(Entity::String(s)) => Ok(FieldValue::Str(s.value.clone())),
            Some(Entity::Object(_)) => Ok(FieldValue::Object(id)),
            Some(Entity::Array(_)) => Ok(FieldValue::Array(id)),
            None => Err(FieldError::Unresolved(id)),
        }
    }

    /// Overwrites one fixed-width field both in the decoded graph and in
    /// the underlying byte buffer. Only members decoded with a tracked
    /// offset can be edited; everything else is rejected without touching
    /// the buffer.
    pub fn set_field(
        &mut self,
        object_id: i32,
        member: &str,
        new_value: PatchValue,
    ) -> Result<(), FieldError> {
        let bytes = &mut self.bytes;
        let instance = match self.graph.lookup_mut(object_id) {
            Some(Entity::Object(instance)) => instance,
            Some(_) => return Err(FieldError::NotAnObject(object_id)),
            None => return Err(FieldError::UnknownInstance(object_id)),
        };
        let value = instance
            .value_mut(member)
            .ok_or_else(|| FieldError::UnknownMember(member.to_string()))?;
        let MemberValue::Field(slot) = value else {
            return Err(FieldError::NotPatchable(member.to_string()));
        };

        slot.update(bytes, new_value).map_err(|rejection| match rejection {
            PatchRejection::TypeMismatch { expected } => FieldError::TypeMismatch {
                member: member.to_string(),
                expected,
            },
            PatchRejection::OutOfBounds { offset, len } => {
                FieldError::OutOfBounds { offset, len }
            }
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
