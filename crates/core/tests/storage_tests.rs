// ═══════════════════════════════════════════════════════════════════
// Storage Tests — snapshot format, StorageManager, state sinks
// ═══════════════════════════════════════════════════════════════════

use chrono::{TimeZone, Utc};

use roomshare_core::errors::CoreError;
use roomshare_core::models::expense::{Category, Expense};
use roomshare_core::models::ledger::LedgerState;
use roomshare_core::models::participant::Participant;
use roomshare_core::models::payment::SettlementPayment;
use roomshare_core::models::period::PeriodKey;
use roomshare_core::models::settings::{RetentionPolicy, SettlementModel};
use roomshare_core::storage::format::{self, CURRENT_VERSION, HEADER_SIZE, MAGIC};
use roomshare_core::storage::manager::StorageManager;
use roomshare_core::storage::sink::{JsonFileSink, StateSink};

fn sample_ledger() -> LedgerState {
    let mut ledger = LedgerState::new(PeriodKey::new(2025, 3).unwrap());
    let admin = Participant::collector("Admin");
    let alice = Participant::new("Alice");
    let when = Utc.with_ymd_and_hms(2025, 3, 4, 18, 30, 0).unwrap();

    ledger.expenses.push(
        Expense::new(alice.id, 64.25, Category::Groceries, when).with_title(Some("Weekly shop".into())),
    );
    ledger
        .payments
        .push(SettlementPayment::new(alice.id, admin.id, 10.0, when));
    ledger.advances.insert(alice.id, 5.5);
    ledger.participants = vec![admin, alice];
    ledger.pending_period = Some(PeriodKey::new(2025, 2).unwrap());
    ledger.settings.settlement_model = SettlementModel::Peer;
    ledger.settings.retention = RetentionPolicy::KeepMonths(6);
    ledger
}

// ═══════════════════════════════════════════════════════════════════
// Snapshot frame
// ═══════════════════════════════════════════════════════════════════

mod frame {
    use super::*;

    #[test]
    fn header_layout() {
        let framed = format::write_file(CURRENT_VERSION, b"payload");
        assert_eq!(&framed[0..4], MAGIC);
        assert_eq!(framed.len(), HEADER_SIZE + 7);

        let (header, payload) = format::read_file(&framed).unwrap();
        assert_eq!(header.version, CURRENT_VERSION);
        assert_eq!(header.payload_len, 7);
        assert_eq!(payload, b"payload");
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut framed = format::write_file(CURRENT_VERSION, b"abc");
        framed.extend_from_slice(b"junk");
        let (_, payload) = format::read_file(&framed).unwrap();
        assert_eq!(payload, b"abc");
    }

    #[test]
    fn too_small() {
        let err = format::read_file(b"RMSH").unwrap_err();
        assert!(matches!(err, CoreError::InvalidFileFormat(_)));
    }

    #[test]
    fn wrong_magic() {
        let mut framed = format::write_file(CURRENT_VERSION, b"abc");
        framed[0] = b'X';
        let err = format::read_file(&framed).unwrap_err();
        assert!(matches!(err, CoreError::InvalidFileFormat(_)));
    }

    #[test]
    fn unsupported_versions() {
        for version in [0u16, CURRENT_VERSION + 1] {
            let framed = format::write_file(version, b"abc");
            let err = format::read_file(&framed).unwrap_err();
            assert!(matches!(err, CoreError::UnsupportedVersion(v) if v == version));
        }
    }

    #[test]
    fn truncated_payload() {
        let framed = format::write_file(CURRENT_VERSION, b"abcdef");
        let err = format::read_file(&framed[..framed.len() - 2]).unwrap_err();
        assert!(err.to_string().contains("truncated"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// StorageManager
// ═══════════════════════════════════════════════════════════════════

mod manager {
    use super::*;

    #[test]
    fn json_document_shape() {
        let json = StorageManager::to_json(&sample_ledger()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["currentPeriod"], "2025-03");
        assert_eq!(value["pendingPeriod"], "2025-02");
        assert!(value["lastArchivedPeriod"].is_null());
        assert_eq!(value["participants"][0]["isCollector"], true);
        assert_eq!(value["expenses"][0]["category"], "Groceries");
        assert_eq!(value["expenses"][0]["title"], "Weekly shop");
        assert!(value["expenses"][0]["occurredAt"].as_str().unwrap().starts_with("2025-03-04T18:30:00"));
        assert_eq!(value["settings"]["currency"], "SAR");
    }

    #[test]
    fn json_restores_equal_state() {
        let original = sample_ledger();
        let json = StorageManager::to_json(&original).unwrap();
        assert_eq!(StorageManager::from_json(&json).unwrap(), original);
    }

    #[test]
    fn json_minimal_document_uses_defaults() {
        let json = r#"{
            "participants": [],
            "currentPeriod": "2025-01",
            "expenses": [],
            "payments": []
        }"#;
        let state = StorageManager::from_json(json).unwrap();
        assert!(state.archive.is_empty());
        assert_eq!(state.pending_period, None);
        assert_eq!(state.settings.settlement_model, SettlementModel::Collector);
        assert_eq!(state.settings.retention, RetentionPolicy::KeepAll);
    }

    #[test]
    fn json_rejects_bad_period() {
        let json = r#"{"participants":[],"currentPeriod":"2025-13","expenses":[],"payments":[]}"#;
        let err = StorageManager::from_json(json).unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn bytes_restore_equal_state() {
        let original = sample_ledger();
        let bytes = StorageManager::save_to_bytes(&original).unwrap();
        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(StorageManager::load_from_bytes(&bytes).unwrap(), original);
    }

    #[test]
    fn garbage_payload_fails_to_decode() {
        let framed = format::write_file(CURRENT_VERSION, &[0xFF; 3]);
        let err = StorageManager::load_from_bytes(&framed).unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn files_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("ledger.rmsh");
        let json = dir.path().join("ledger.json");
        let (bin, json) = (bin.to_str().unwrap(), json.to_str().unwrap());
        let original = sample_ledger();

        StorageManager::save_to_file(&original, bin).unwrap();
        assert_eq!(StorageManager::load_from_file(bin).unwrap(), original);

        StorageManager::save_json_to_file(&original, json).unwrap();
        assert_eq!(StorageManager::load_json_from_file(json).unwrap(), original);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.rmsh");
        let err = StorageManager::load_from_file(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, CoreError::FileIO(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// State sinks
// ═══════════════════════════════════════════════════════════════════

mod sinks {
    use super::*;

    #[test]
    fn closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |state: &LedgerState| -> Result<(), CoreError> {
                seen.push(state.current_period);
                Ok(())
            };
            sink.persist(&sample_ledger()).unwrap();
            sink.persist(&sample_ledger()).unwrap();
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn json_file_sink_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.json");
        let mut sink = JsonFileSink::new(path.to_str().unwrap());
        assert_eq!(sink.path(), path.to_str().unwrap());

        let state = sample_ledger();
        sink.persist(&state).unwrap();
        assert_eq!(StorageManager::load_json_from_file(sink.path()).unwrap(), state);
    }

    #[test]
    fn json_file_sink_reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("mirror.json");
        let mut sink = JsonFileSink::new(path.to_str().unwrap());
        assert!(matches!(sink.persist(&sample_ledger()).unwrap_err(), CoreError::FileIO(_)));
    }
}
