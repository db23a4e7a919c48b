//! Class and member names the map editor relies on. These are the
//! serialized type names the game writes; instance counts and member sets
//! vary between save versions, so callers treat misses as soft failures.

pub const WORLD_CLASS: &str = "World+WorldSaveData";
pub const CELL_CLASS: &str = "Cell+CellSaveData";
pub const TOWN_NAME_CLASS: &str = "TownNameUI+TownNameSaveData";
pub const BUILDING_CLASS: &str = "Building+BuildingSaveData";

pub const MEMBER_GRID_WIDTH: &str = "gridWidth";
pub const MEMBER_GRID_HEIGHT: &str = "gridHeight";
pub const MEMBER_TOWN_NAME: &str = "townName";
pub const MEMBER_FERTILE: &str = "fertile";
pub const MEMBER_DEEP_WATER: &str = "deepWater";
pub const MEMBER_SALT_WATER: &str = "saltWater";
pub const MEMBER_AMOUNT: &str = "amount";
