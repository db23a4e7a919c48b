use serde::{Deserialize, Serialize};

/// Summary of the loaded save, assembled once at open time. Fields are
/// `None` when the save has no matching root object; older saves lack the
/// town-name structure entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub town_name: Option<String>,
    pub grid_width: Option<i32>,
    pub grid_height: Option<i32>,
    pub cell_count: usize,
    pub root_classes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityIssue {
    MissingWorldRoot,
    MissingTownNameRoot,
    NoCellInstances,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Capabilities {
    pub can_query: bool,
    pub can_apply_edits: bool,
    pub issues: Vec<CapabilityIssue>,
}

impl Capabilities {
    pub fn editable(issues: Vec<CapabilityIssue>) -> Self {
        Self {
            can_query: true,
            can_apply_edits: true,
            issues,
        }
    }
}

/// One map cell, read through the shared cell shape. Members that a given
/// save version does not carry come back `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellEntry {
    pub index: usize,
    pub object_id: i32,
    pub fertile: Option<bool>,
    pub deep_water: Option<bool>,
    pub salt_water: Option<bool>,
    pub amount: Option<i32>,
}
