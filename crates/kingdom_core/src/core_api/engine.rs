use crate::serialization::primitives::Primitive;
use crate::serialization::{FieldError, FieldValue, PatchValue, SaveDocument};

use super::error::{CoreError, CoreErrorCode};
use super::types::{Capabilities, CapabilityIssue, CellEntry, Snapshot};
use super::well_known;

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

#[derive(Debug)]
pub struct Session {
    snapshot: Snapshot,
    capabilities: Capabilities,
    document: SaveDocument,
    cell_ids: Vec<i32>,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<B: AsRef<[u8]>>(&self, bytes: B) -> Result<Session, CoreError> {
        let document = SaveDocument::parse(bytes.as_ref().to_vec()).map_err(|e| {
            CoreError::new(CoreErrorCode::Parse, format!("failed to parse save: {e}"))
        })?;

        let cell_ids = document
            .graph()
            .class_id_by_name(well_known::CELL_CLASS)
            .map(|id| document.graph().instances_of_class(id).to_vec())
            .unwrap_or_default();

        let mut root_classes: Vec<String> = document.roots().keys().cloned().collect();
        root_classes.sort();

        let mut issues = Vec::new();
        if document.root_id(well_known::WORLD_CLASS).is_err() {
            issues.push(CapabilityIssue::MissingWorldRoot);
        }
        if document.root_id(well_known::TOWN_NAME_CLASS).is_err() {
            issues.push(CapabilityIssue::MissingTownNameRoot);
        }
        if cell_ids.is_empty() {
            issues.push(CapabilityIssue::NoCellInstances);
        }

        let snapshot = Snapshot {
            town_name: root_string(
                &document,
                well_known::TOWN_NAME_CLASS,
                well_known::MEMBER_TOWN_NAME,
            ),
            grid_width: root_i32(
                &document,
                well_known::WORLD_CLASS,
                well_known::MEMBER_GRID_WIDTH,
            ),
            grid_height: root_i32(
                &document,
                well_known::WORLD_CLASS,
                well_known::MEMBER_GRID_HEIGHT,
            ),
            cell_count: cell_ids.len(),
            root_classes,
        };

        Ok(Session {
            snapshot,
            capabilities: Capabilities::editable(issues),
            document,
            cell_ids,
        })
    }
}

impl Session {
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// All cell instances in stream order, which is the order the game
    /// writes the grid.
    pub fn cells(&self) -> Vec<CellEntry> {
        self.cell_ids
            .iter()
            .enumerate()
            .map(|(index, &object_id)| CellEntry {
                index,
                object_id,
                fertile: self.instance_bool(object_id, well_known::MEMBER_FERTILE),
                deep_water: self.instance_bool(object_id, well_known::MEMBER_DEEP_WATER),
                salt_water: self.instance_bool(object_id, well_known::MEMBER_SALT_WATER),
                amount: self.instance_i32(object_id, well_known::MEMBER_AMOUNT),
            })
            .collect()
    }

    pub fn field(&self, class_name: &str, member: &str) -> Result<FieldValue, CoreError> {
        let id = self.document.root_id(class_name).map_err(field_error)?;
        self.document.field(id, member).map_err(field_error)
    }

    pub fn set_field(
        &mut self,
        class_name: &str,
        member: &str,
        value: PatchValue,
    ) -> Result<(), CoreError> {
        let id = self.document.root_id(class_name).map_err(field_error)?;
        self.document
            .set_field(id, member, value)
            .map_err(field_error)?;

        if class_name == well_known::WORLD_CLASS {
            if let PatchValue::Int32(v) = value {
                match member {
                    well_known::MEMBER_GRID_WIDTH => self.snapshot.grid_width = Some(v),
                    well_known::MEMBER_GRID_HEIGHT => self.snapshot.grid_height = Some(v),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    pub fn cell_field(&self, index: usize, member: &str) -> Result<FieldValue, CoreError> {
        let id = self.cell_object_id(index)?;
        self.document.field(id, member).map_err(field_error)
    }

    pub fn set_cell_field(
        &mut self,
        index: usize,
        member: &str,
        value: PatchValue,
    ) -> Result<(), CoreError> {
        let id = self.cell_object_id(index)?;
        self.document.set_field(id, member, value).map_err(field_error)
    }

    /// The patched buffer, identical to the input outside edited fields.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.document.as_bytes().to_vec()
    }

    pub fn document(&self) -> &SaveDocument {
        &self.document
    }

    fn cell_object_id(&self, index: usize) -> Result<i32, CoreError> {
        self.cell_ids.get(index).copied().ok_or_else(|| {
            CoreError::new(
                CoreErrorCode::Field,
                format!("cell index {index} out of range ({} cells)", self.cell_ids.len()),
            )
        })
    }

    fn instance_bool(&self, object_id: i32, member: &str) -> Option<bool> {
        match self.document.field(object_id, member).ok()? {
            FieldValue::Boolean(v) => Some(v),
            FieldValue::Primitive(Primitive::Boolean(v)) => Some(v),
            _ => None,
        }
    }

    fn instance_i32(&self, object_id: i32, member: &str) -> Option<i32> {
        match self.document.field(object_id, member).ok()? {
            FieldValue::Int32(v) => Some(v),
            FieldValue::Primitive(Primitive::Int32(v)) => Some(v),
            _ => None,
        }
    }
}

fn field_error(e: FieldError) -> CoreError {
    CoreError::new(CoreErrorCode::Field, e.to_string())
}

fn root_string(document: &SaveDocument, class_name: &str, member: &str) -> Option<String> {
    let id = document.root_id(class_name).ok()?;
    match document.field(id, member).ok()? {
        FieldValue::Str(s) => Some(s),
        FieldValue::Primitive(Primitive::String(s)) => Some(s),
        _ => None,
    }
}

fn root_i32(document: &SaveDocument, class_name: &str, member: &str) -> Option<i32> {
    let id = document.root_id(class_name).ok()?;
    match document.field(id, member).ok()? {
        FieldValue::Int32(v) => Some(v),
        FieldValue::Primitive(Primitive::Int32(v)) => Some(v),
        _ => None,
    }
}
