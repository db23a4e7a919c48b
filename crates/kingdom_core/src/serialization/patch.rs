/// The patch engine: position-aware handles for fields that were
/// physically read from the buffer, permitting later in-place overwrite of
/// only that field's bytes.
///
/// Only kinds whose on-disk size cannot change when the value changes are
/// tracked; in practice save files patch booleans and 32-bit integers.

/// A decoded primitive paired with the exact byte offset it occupied in
/// the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSlot {
    Boolean { value: bool, offset: usize },
    Int32 { value: i32, offset: usize },
}

/// A replacement value for a patchable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchValue {
    Boolean(bool),
    Int32(i32),
}

/// Why an individual patch was refused. Local to the edit; the loaded
/// document stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchRejection {
    TypeMismatch { expected: &'static str },
    OutOfBounds { offset: usize, len: usize },
}

impl FieldSlot {
    pub fn offset(&self) -> usize {
        match self {
            FieldSlot::Boolean { offset, .. } | FieldSlot::Int32 { offset, .. } => *offset,
        }
    }

    /// On-disk size of the field. Fixed at decode time; `update` always
    /// rewrites exactly this many bytes.
    pub fn width(&self) -> usize {
        match self {
            FieldSlot::Boolean { .. } => 1,
            FieldSlot::Int32 { .. } => 4,
        }
    }

    /// Re-encodes `new_value` to this field's recorded width and
    /// overwrites `buffer[offset..offset + width]` in place. Never resizes
    /// the buffer; every other byte is left untouched.
    pub fn update(&mut self, buffer: &mut [u8], new_value: PatchValue) -> Result<(), PatchRejection> {
        match (self, new_value) {
            (FieldSlot::Boolean { value, offset }, PatchValue::Boolean(new)) => {
                if *offset >= buffer.len() {
                    return Err(PatchRejection::OutOfBounds {
                        offset: *offset,
                        len: buffer.len(),
                    });
                }
                buffer[*offset] = u8::from(new);
                *value = new;
                Ok(())
            }
            (FieldSlot::Int32 { value, offset }, PatchValue::Int32(new)) => {
                let end = offset.checked_add(4).filter(|&end| end <= buffer.len());
                let Some(end) = end else {
                    return Err(PatchRejection::OutOfBounds {
                        offset: *offset,
                        len: buffer.len(),
                    });
                };
                buffer[*offset..end].copy_from_slice(&new.to_le_bytes());
                *value = new;
                Ok(())
            }
            (FieldSlot::Boolean { .. }, _) => Err(PatchRejection::TypeMismatch {
                expected: "boolean",
            }),
            (FieldSlot::Int32 { .. }, _) => Err(PatchRejection::TypeMismatch {
                expected: "32-bit integer",
            }),
        }
    }
}
