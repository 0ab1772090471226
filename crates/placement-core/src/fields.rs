use shared_types::{Field, FieldId, FieldType, RecipientId};

/// Ordered collection of placed fields for one session.
///
/// Coordinates arriving here are already clamped by [`crate::coords`].
/// Recipient references are validated by the caller before `assign_field`.
#[derive(Debug, Clone)]
pub struct FieldStore {
    fields: Vec<Field>,
    next_id: u64,
}

impl FieldStore {
    /// Create an empty store; the first field gets id 1
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            next_id: 1,
        }
    }

    /// Place a new unassigned field and return its ID
    pub fn add_field(
        &mut self,
        field_type: FieldType,
        page_number: u32,
        left: f64,
        top: f64,
    ) -> FieldId {
        let id = FieldId(self.next_id);
        self.next_id += 1;
        self.fields.push(Field::new(id, field_type, page_number, left, top));
        id
    }

    /// Move a field to a new position. The page never changes.
    ///
    /// Returns false when the id is unknown (a stale drag source).
    pub fn move_field(&mut self, id: FieldId, left: f64, top: f64) -> bool {
        match self.get_field_mut(id) {
            Some(field) => {
                field.left = left;
                field.top = top;
                true
            }
            None => false,
        }
    }

    /// Set or clear the recipient of a field; false when the id is unknown
    pub fn assign_field(&mut self, id: FieldId, recipient: Option<RecipientId>) -> bool {
        match self.get_field_mut(id) {
            Some(field) => {
                field.assigned_to = recipient;
                true
            }
            None => false,
        }
    }

    /// Clear every reference to `recipient`, returning the affected fields
    pub fn unassign_recipient(&mut self, recipient: &RecipientId) -> Vec<FieldId> {
        self.fields
            .iter_mut()
            .filter(|f| f.assigned_to.as_ref() == Some(recipient))
            .map(|f| {
                f.assigned_to = None;
                f.id
            })
            .collect()
    }

    /// Get a field by ID
    pub fn get_field(&self, id: FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    fn get_field_mut(&mut self, id: FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.id == id)
    }

    /// Get all fields in insertion order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Get fields for a specific page, in insertion order
    pub fn fields_for_page(&self, page_number: u32) -> Vec<&Field> {
        self.fields
            .iter()
            .filter(|f| f.page_number == page_number)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Remove all fields and restart id allocation
    pub fn clear_all(&mut self) {
        self.fields.clear();
        self.next_id = 1;
    }
}

impl Default for FieldStore {
    fn default() -> Self {
        Self::new()
    }
}
