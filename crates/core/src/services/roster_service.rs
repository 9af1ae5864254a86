use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::ledger::LedgerState;
use crate::models::participant::Participant;

/// Maintains the participant list and the single-collector invariant.
pub struct RosterService;

impl RosterService {
    pub fn new() -> Self {
        Self
    }

    /// Add a participant. The first one in an empty roster becomes the collector.
    pub fn add_participant(&self, ledger: &mut LedgerState, name: &str) -> Result<Uuid, CoreError> {
        let name = Self::validate_name(name)?;
        let mut participant = Participant::new(name);
        participant.is_collector = ledger.participants.is_empty();
        let id = participant.id;
        ledger.participants.push(participant);
        Ok(id)
    }

    /// Remove a participant together with the expenses they paid for, the
    /// payments they sent or received, and their advance.
    ///
    /// The last remaining participant cannot be removed. Removing the collector
    /// promotes the first remaining participant.
    pub fn remove_participant(&self, ledger: &mut LedgerState, participant_id: Uuid) -> Result<Participant, CoreError> {
        let idx = ledger
            .participants
            .iter()
            .position(|p| p.id == participant_id)
            .ok_or_else(|| CoreError::ParticipantNotFound(participant_id.to_string()))?;

        if ledger.participants.len() == 1 {
            return Err(CoreError::LastParticipant);
        }

        let removed = ledger.participants.remove(idx);
        ledger.expenses.retain(|e| e.payer_id != participant_id);
        ledger
            .payments
            .retain(|p| p.from != participant_id && p.to != participant_id);
        ledger.advances.remove(&participant_id);

        if removed.is_collector || !ledger.participants.iter().any(|p| p.is_collector) {
            if let Some(first) = ledger.participants.first_mut() {
                first.is_collector = true;
            }
        }

        Ok(removed)
    }

    /// Make `participant_id` the sole collector.
    pub fn set_collector(&self, ledger: &mut LedgerState, participant_id: Uuid) -> Result<(), CoreError> {
        if ledger.participant(participant_id).is_none() {
            return Err(CoreError::ParticipantNotFound(participant_id.to_string()));
        }
        for p in &mut ledger.participants {
            p.is_collector = p.id == participant_id;
        }
        Ok(())
    }

    pub fn rename_participant(&self, ledger: &mut LedgerState, participant_id: Uuid, name: &str) -> Result<(), CoreError> {
        let name = Self::validate_name(name)?;
        let participant = ledger
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| CoreError::ParticipantNotFound(participant_id.to_string()))?;
        participant.name = name;
        Ok(())
    }

    fn validate_name(name: &str) -> Result<String, CoreError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CoreError::ValidationError(
                "Participant name must not be empty".into(),
            ));
        }
        Ok(trimmed.to_string())
    }
}

impl Default for RosterService {
    fn default() -> Self {
        Self::new()
    }
}
