use std::collections::HashMap;
use std::rc::Rc;

use super::error::ParseError;
use super::patch::FieldSlot;
use super::primitives::Primitive;
use super::wire::PrimitiveType;

/// Declared shape of a class: id, name, and ordered member names.
/// Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub object_id: i32,
    pub name: String,
    pub member_count: i32,
    pub member_names: Vec<String>,
}

/// Reference to another declared class type, carried by class-typed
/// members. The library id must have been declared before it is
/// referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTypeInfo {
    pub type_name: String,
    pub library_id: i32,
}

/// Per-member wire-type descriptor. Only Primitive/PrimitiveArray carry a
/// scalar type code and only Class carries a type reference; the remaining
/// binary types have no additional info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberTypeInfo {
    Primitive(PrimitiveType),
    String,
    Object,
    SystemClass,
    Class(ClassTypeInfo),
    ObjectArray,
    StringArray,
    PrimitiveArray(PrimitiveType),
}

/// The shared class_base: one ClassShape is referenced by every instance
/// of the same declared class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassShape {
    pub class_info: ClassInfo,
    pub member_types: Vec<MemberTypeInfo>,
}

/// An unresolved id pointer. Resolution is lazy: the referent may appear
/// later in the stream, so `resolve` returns None until the graph actually
/// contains the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberReference {
    pub id_ref: i32,
}

impl MemberReference {
    pub fn resolve<'g>(&self, graph: &'g ObjectGraph) -> Option<&'g Entity> {
        graph.lookup(self.id_ref)
    }
}

/// One decoded member value. Fixed-width booleans and 32-bit integers keep
/// their byte offset (`Field`) so they can be patched in place; nested
/// records are stored by object id and resolved through the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberValue {
    Primitive(Primitive),
    Field(FieldSlot),
    Null,
    Reference(MemberReference),
    Object(i32),
}

/// A concrete object instance. Values are appended in declaration order,
/// one per decode call; the class shape fixes how many there may be.
#[derive(Debug)]
pub struct ObjectInstance {
    pub object_id: i32,
    shape: Rc<ClassShape>,
    values: Vec<MemberValue>,
}

impl ObjectInstance {
    pub fn new(object_id: i32, shape: Rc<ClassShape>) -> Self {
        let capacity = shape.class_info.member_names.len();
        Self {
            object_id,
            shape,
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn shape(&self) -> &Rc<ClassShape> {
        &self.shape
    }

    pub fn class_name(&self) -> &str {
        &self.shape.class_info.name
    }

    /// Appends a value into the next undeclared member slot. The wire
    /// format addresses members positionally, so there are no explicit
    /// indices; appending past the declared member count is a shape error.
    pub fn add_value(&mut self, value: MemberValue) -> Result<(), ParseError> {
        let declared = self.shape.class_info.member_names.len();
        if self.values.len() >= declared {
            return Err(ParseError::ShapeMismatch {
                class_name: self.shape.class_info.name.clone(),
                expected: declared,
                actual: self.values.len() + 1,
            });
        }
        self.values.push(value);
        Ok(())
    }

    /// A short read is a decode error, not a silent partial object.
    pub fn check_complete(&self) -> Result<(), ParseError> {
        let declared = self.shape.class_info.member_names.len();
        if self.values.len() != declared {
            return Err(ParseError::ShapeMismatch {
                class_name: self.shape.class_info.name.clone(),
                expected: declared,
                actual: self.values.len(),
            });
        }
        Ok(())
    }

    pub fn member_index(&self, member: &str) -> Option<usize> {
        self.shape
            .class_info
            .member_names
            .iter()
            .position(|name| name == member)
    }

    pub fn value(&self, member: &str) -> Option<&MemberValue> {
        self.values.get(self.member_index(member)?)
    }

    pub fn value_mut(&mut self, member: &str) -> Option<&mut MemberValue> {
        let index = self.member_index(member)?;
        self.values.get_mut(index)
    }

    pub fn values(&self) -> &[MemberValue] {
        &self.values
    }
}

/// A homogeneous primitive array. No member names; elements are stored
/// positionally.
#[derive(Debug)]
pub struct ArrayInstance {
    pub object_id: i32,
    pub length: i32,
    pub primitive_type: PrimitiveType,
    values: Vec<MemberValue>,
}

impl ArrayInstance {
    pub fn new(object_id: i32, length: i32, primitive_type: PrimitiveType) -> Self {
        Self {
            object_id,
            length,
            primitive_type,
            values: Vec::with_capacity(length.max(0) as usize),
        }
    }

    pub fn add_value(&mut self, value: MemberValue) {
        self.values.push(value);
    }

    pub fn values(&self) -> &[MemberValue] {
        &self.values
    }
}

/// A BinaryObjectString record: a string keyed by object id so members can
/// reference it.
#[derive(Debug)]
pub struct StringInstance {
    pub object_id: i32,
    pub value: String,
}

/// Any id-addressable entity in the graph.
#[derive(Debug)]
pub enum Entity {
    Object(ObjectInstance),
    Array(ArrayInstance),
    String(StringInstance),
}

impl Entity {
    pub fn object_id(&self) -> i32 {
        match self {
            Entity::Object(instance) => instance.object_id,
            Entity::Array(array) => array.object_id,
            Entity::String(string) => string.object_id,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectInstance> {
        match self {
            Entity::Object(instance) => Some(instance),
            _ => None,
        }
    }
}

/// Registries for one parse session. Instance ids and class-metadata ids
/// are separate namespaces that may overlap numerically, so they live in
/// separate maps.
#[derive(Debug, Default)]
pub struct ObjectGraph {
    entities: HashMap<i32, Entity>,
    class_metadata: HashMap<i32, Rc<ClassShape>>,
    instances_by_class: HashMap<i32, Vec<i32>>,
    libraries: HashMap<i32, String>,
    system_classes: HashMap<i32, ClassInfo>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entity: Entity) -> Result<(), ParseError> {
        let id = entity.object_id();
        if self.entities.contains_key(&id) {
            return Err(ParseError::DuplicateObjectId(id));
        }
        if let Entity::Object(instance) = &entity {
            self.instances_by_class
                .entry(instance.shape().class_info.object_id)
                .or_default()
                .push(id);
        }
        self.entities.insert(id, entity);
        Ok(())
    }

    pub fn lookup(&self, id: i32) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn lookup_mut(&mut self, id: i32) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn instance(&self, id: i32) -> Option<&ObjectInstance> {
        self.lookup(id).and_then(Entity::as_object)
    }

    pub fn instance_mut(&mut self, id: i32) -> Option<&mut ObjectInstance> {
        match self.lookup_mut(id) {
            Some(Entity::Object(instance)) => Some(instance),
            _ => None,
        }
    }

    pub fn register_class(&mut self, shape: Rc<ClassShape>) -> Result<(), ParseError> {
        let id = shape.class_info.object_id;
        if self.class_metadata.contains_key(&id) {
            return Err(ParseError::DuplicateObjectId(id));
        }
        self.class_metadata.insert(id, shape);
        Ok(())
    }

    pub fn class_shape(&self, metadata_id: i32) -> Option<&Rc<ClassShape>> {
        self.class_metadata.get(&metadata_id)
    }

    pub fn class_id_by_name(&self, name: &str) -> Option<i32> {
        self.class_metadata
            .iter()
            .find(|(_, shape)| shape.class_info.name == name)
            .map(|(id, _)| *id)
    }

    /// Every instance id sharing the given class metadata, in stream
    /// order. The format encodes repeated shapes as one full declaration
    /// followed by ClassWithId back-references; this is how callers walk
    /// all of them (e.g. every map tile).
    pub fn instances_of_class(&self, metadata_id: i32) -> &[i32] {
        self.instances_by_class
            .get(&metadata_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn declare_library(&mut self, library_id: i32, library_name: String) {
        self.libraries.insert(library_id, library_name);
    }

    pub fn library(&self, library_id: i32) -> Option<&str> {
        self.libraries.get(&library_id).map(String::as_str)
    }

    /// Validates a class-typed member's library reference. Libraries must
    /// be declared before any class that references them; a miss is a hard
    /// error, not a forward reference.
    pub fn resolve_class_type(
        &self,
        type_name: String,
        library_id: i32,
    ) -> Result<ClassTypeInfo, ParseError> {
        if self.library(library_id).is_none() {
            return Err(ParseError::UnknownLibrary {
                type_name,
                library_id,
            });
        }
        Ok(ClassTypeInfo {
            type_name,
            library_id,
        })
    }

    pub fn record_system_class(&mut self, info: ClassInfo) {
        self.system_classes.insert(info.object_id, info);
    }

    pub fn system_class(&self, id: i32) -> Option<&ClassInfo> {
        self.system_classes.get(&id)
    }
}
