//! Synthetic stream fixtures shared by the integration tests.

use kingdom_core::serialization::primitives::encode_length_prefixed_string;

pub const LIBRARY_ID: i32 = 2;
pub const LIBRARY_NAME: &str = "Assembly-CSharp";

pub const WORLD_CLASS: &str = "World+WorldSaveData";
pub const TOWN_NAME_CLASS: &str = "TownNameUI+TownNameSaveData";
pub const CELL_CLASS: &str = "Cell+CellSaveData";

/// Builds record streams byte by byte. High-level helpers emit the record
/// layouts the game writes; the raw push methods are there for malformed
/// inputs.
pub struct StreamBuilder {
    bytes: Vec<u8>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn push_u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    pub fn push_i32(&mut self, v: i32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn push_str(&mut self, v: &str) {
        let encoded = encode_length_prefixed_string(v).expect("fixture string fits the prefix");
        self.bytes.extend_from_slice(&encoded);
    }

    pub fn header(&mut self, root_id: i32) {
        self.push_u8(0);
        self.push_i32(root_id);
        self.push_i32(-1);
        self.push_i32(1);
        self.push_i32(0);
    }

    pub fn library(&mut self) {
        self.push_u8(12);
        self.push_i32(LIBRARY_ID);
        self.push_str(LIBRARY_NAME);
    }

    /// ClassWithMembersAndTypes (tag 5) for the world root: two Int32
    /// members.
    pub fn world(&mut self, object_id: i32, grid_width: i32, grid_height: i32) {
        self.push_u8(5);
        self.push_i32(object_id);
        self.push_str(WORLD_CLASS);
        self.push_i32(2);
        self.push_str("gridWidth");
        self.push_str("gridHeight");
        self.push_u8(0); // BinaryType::Primitive
        self.push_u8(0);
        self.push_u8(8); // PrimitiveType::Int32
        self.push_u8(8);
        self.push_i32(LIBRARY_ID);
        self.push_i32(grid_width);
        self.push_i32(grid_height);
    }

    /// Town-name root whose single member is a string record.
    pub fn town_name(&mut self, object_id: i32, string_id: i32, name: &str) {
        self.push_u8(5);
        self.push_i32(object_id);
        self.push_str(TOWN_NAME_CLASS);
        self.push_i32(1);
        self.push_str("townName");
        self.push_u8(1); // BinaryType::String
        self.push_i32(LIBRARY_ID);
        // Member value: a nested BinaryObjectString record.
        self.push_u8(6);
        self.push_i32(string_id);
        self.push_str(name);
    }

    /// Full cell class declaration plus its first instance.
    pub fn cell_class(
        &mut self,
        object_id: i32,
        fertile: bool,
        deep_water: bool,
        salt_water: bool,
        amount: i32,
    ) {
        self.push_u8(5);
        self.push_i32(object_id);
        self.push_str(CELL_CLASS);
        self.push_i32(4);
        self.push_str("fertile");
        self.push_str("deepWater");
        self.push_str("saltWater");
        self.push_str("amount");
        self.push_u8(0);
        self.push_u8(0);
        self.push_u8(0);
        self.push_u8(0);
        self.push_u8(1); // PrimitiveType::Boolean
        self.push_u8(1);
        self.push_u8(1);
        self.push_u8(8); // PrimitiveType::Int32
        self.push_i32(LIBRARY_ID);
        self.cell_values(fertile, deep_water, salt_water, amount);
    }

    /// ClassWithId (tag 1) instance sharing previously declared cell
    /// metadata.
    pub fn cell_with_id(
        &mut self,
        object_id: i32,
        metadata_id: i32,
        fertile: bool,
        deep_water: bool,
        salt_water: bool,
        amount: i32,
    ) {
        self.push_u8(1);
        self.push_i32(object_id);
        self.push_i32(metadata_id);
        self.cell_values(fertile, deep_water, salt_water, amount);
    }

    fn cell_values(&mut self, fertile: bool, deep_water: bool, salt_water: bool, amount: i32) {
        self.push_u8(u8::from(fertile));
        self.push_u8(u8::from(deep_water));
        self.push_u8(u8::from(salt_water));
        self.push_i32(amount);
    }

    pub fn end(&mut self) {
        self.push_u8(11);
    }

    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }
}

/// A small but complete save: library, world root, town name, and three
/// cells (one full declaration, two ClassWithId back-references).
pub fn kingdom_save() -> Vec<u8> {
    let mut b = StreamBuilder::new();
    b.header(1);
    b.library();
    b.world(1, 3, 2);
    b.town_name(3, 4, "Porthaven");
    b.cell_class(5, false, false, false, 10);
    b.cell_with_id(6, 5, true, false, true, 0);
    b.cell_with_id(7, 5, false, true, false, 25);
    b.end();
    b.finish()
}
