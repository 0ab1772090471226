//! Cross-store consistency between fields and recipients
//!
//! Every field's `assigned_to` is either `None` or the id of a live
//! recipient. The functions here are the only way the session mutates
//! assignments, and readiness is always recomputed from current state.

use crate::error::{NotReadyReason, PlacementError};
use crate::fields::FieldStore;
use crate::recipients::RecipientStore;
use shared_types::{Field, FieldId, Payload, PayloadField, Recipient, RecipientId};
use tracing::{debug, warn};

/// Assign (or clear) a field's recipient after checking the reference
pub fn assign(
    fields: &mut FieldStore,
    recipients: &RecipientStore,
    field_id: FieldId,
    recipient: Option<RecipientId>,
) -> Result<(), PlacementError> {
    if let Some(ref id) = recipient {
        if !recipients.contains(id) {
            warn!(field = %field_id, recipient = %id, "Rejected assignment to unknown recipient");
            return Err(PlacementError::UnresolvedReference(id.clone()));
        }
    }
    if fields.get_field(field_id).is_none() {
        return Err(PlacementError::UnknownField(field_id));
    }

    fields.assign_field(field_id, recipient);
    Ok(())
}

/// Remove a recipient and clear every field that referenced it, as one step.
///
/// Returns `None` when the recipient does not exist.
pub fn remove_recipient(
    fields: &mut FieldStore,
    recipients: &mut RecipientStore,
    recipient: &RecipientId,
) -> Option<(Recipient, Vec<FieldId>)> {
    let removed = recipients.remove_recipient(recipient)?;
    let unassigned = on_recipient_removed(fields, recipient);
    Some((removed, unassigned))
}

/// Cascade a recipient removal into the field store
pub fn on_recipient_removed(fields: &mut FieldStore, recipient: &RecipientId) -> Vec<FieldId> {
    let unassigned = fields.unassign_recipient(recipient);
    debug!(
        recipient = %recipient,
        count = unassigned.len(),
        "Cleared assignments for removed recipient"
    );
    unassigned
}

/// Why `fields`/`recipients` are not sendable, if they are not
pub fn readiness(fields: &[Field], recipients: &[Recipient]) -> Result<(), NotReadyReason> {
    if fields.is_empty() {
        return Err(NotReadyReason::NoFields);
    }
    if recipients.is_empty() {
        return Err(NotReadyReason::NoRecipients);
    }
    let count = fields.iter().filter(|f| !f.is_assigned()).count();
    if count > 0 {
        return Err(NotReadyReason::UnassignedFields { count });
    }
    Ok(())
}

/// True iff there is at least one field, at least one recipient, and every
/// field has a recipient
pub fn is_ready_to_send(fields: &[Field], recipients: &[Recipient]) -> bool {
    readiness(fields, recipients).is_ok()
}

/// Build the outgoing payload, refusing when the state is not sendable
pub fn build_payload(
    fields: &[Field],
    recipients: &[Recipient],
) -> Result<Payload, PlacementError> {
    readiness(fields, recipients)?;

    Ok(Payload {
        recipients: recipients.to_vec(),
        fields: fields.iter().map(PayloadField::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::FieldType;

    fn setup() -> (FieldStore, RecipientStore, RecipientId) {
        let mut fields = FieldStore::new();
        let mut recipients = RecipientStore::new();
        let alice = recipients.add_recipient("alice@example.com").unwrap();
        fields.add_field(FieldType::Signature, 1, 10.0, 10.0);
        (fields, recipients, alice)
    }

    #[test]
    fn test_assign_known_recipient() {
        let (mut fields, recipients, alice) = setup();
        assign(&mut fields, &recipients, FieldId(1), Some(alice.clone())).unwrap();
        assert_eq!(fields.get_field(FieldId(1)).unwrap().assigned_to, Some(alice));
    }

    #[test]
    fn test_assign_unknown_recipient_never_reaches_store() {
        let (mut fields, recipients, _) = setup();
        let ghost = RecipientId::from("ghost");
        let result = assign(&mut fields, &recipients, FieldId(1), Some(ghost.clone()));
        assert_eq!(result, Err(PlacementError::UnresolvedReference(ghost)));
        assert_eq!(fields.get_field(FieldId(1)).unwrap().assigned_to, None);
    }

    #[test]
    fn test_assign_unknown_field() {
        let (mut fields, recipients, alice) = setup();
        let result = assign(&mut fields, &recipients, FieldId(42), Some(alice));
        assert_eq!(result, Err(PlacementError::UnknownField(FieldId(42))));
    }

    #[test]
    fn test_unassign_with_none() {
        let (mut fields, recipients, alice) = setup();
        assign(&mut fields, &recipients, FieldId(1), Some(alice)).unwrap();
        assign(&mut fields, &recipients, FieldId(1), None).unwrap();
        assert!(!fields.get_field(FieldId(1)).unwrap().is_assigned());
    }

    #[test]
    fn test_remove_cascades() {
        let (mut fields, mut recipients, alice) = setup();
        assign(&mut fields, &recipients, FieldId(1), Some(alice.clone())).unwrap();

        let (removed, unassigned) = remove_recipient(&mut fields, &mut recipients, &alice).unwrap();
        assert_eq!(removed.email, "alice@example.com");
        assert_eq!(unassigned, vec![FieldId(1)]);
        assert!(recipients.is_empty());
        assert_eq!(fields.get_field(FieldId(1)).unwrap().assigned_to, None);
    }

    #[test]
    fn test_remove_unknown_recipient() {
        let (mut fields, mut recipients, _) = setup();
        assert!(remove_recipient(&mut fields, &mut recipients, &RecipientId::from("x")).is_none());
        assert_eq!(recipients.len(), 1);
    }

    #[test]
    fn test_readiness_reasons() {
        let (mut fields, recipients, alice) = setup();
        assert_eq!(
            readiness(&[], recipients.all()),
            Err(NotReadyReason::NoFields)
        );
        assert_eq!(
            readiness(fields.fields(), &[]),
            Err(NotReadyReason::NoRecipients)
        );
        assert_eq!(
            readiness(fields.fields(), recipients.all()),
            Err(NotReadyReason::UnassignedFields { count: 1 })
        );

        assign(&mut fields, &recipients, FieldId(1), Some(alice)).unwrap();
        assert!(is_ready_to_send(fields.fields(), recipients.all()));
    }

    #[test]
    fn test_build_payload_rejects_when_not_ready() {
        let (fields, recipients, _) = setup();
        let result = build_payload(fields.fields(), recipients.all());
        assert_eq!(
            result,
            Err(PlacementError::NotReadyToSend(
                NotReadyReason::UnassignedFields { count: 1 }
            ))
        );
    }

    #[test]
    fn test_build_payload_strips_ids() {
        let (mut fields, recipients, alice) = setup();
        fields.add_field(FieldType::Text, 2, 50.0, 75.0);
        assign(&mut fields, &recipients, FieldId(1), Some(alice.clone())).unwrap();
        assign(&mut fields, &recipients, FieldId(2), Some(alice.clone())).unwrap();

        let payload = build_payload(fields.fields(), recipients.all()).unwrap();
        assert_eq!(payload.fields.len(), 2);
        assert_eq!(payload.recipients.len(), 1);
        assert_eq!(payload.fields[1].page_number, 2);
        assert_eq!(payload.fields[1].assigned_to, Some(alice));

        let json = payload.to_json().unwrap();
        assert!(!json.contains("\"id\":1"), "{}", json);
    }
}
