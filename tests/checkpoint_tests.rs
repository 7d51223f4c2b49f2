//! Checkpoint record tests: snapshot, restore, resume and migration.

use sarcomere_sim::config::{LatticeConfig, Parameters};
use sarcomere_sim::error::{AddressError, RecordError};
use sarcomere_sim::export::{export_checkpoint_json_to, load_checkpoint_json};
use sarcomere_sim::lattice::{Address, Lattice};
use sarcomere_sim::physics::XbState;
use sarcomere_sim::state::{migrate_record, LatticeRecord, RECORD_SCHEMA_VERSION};

fn running_lattice(seed: u64, steps: usize) -> Lattice {
    let config = LatticeConfig {
        seed: Some(seed),
        ..Default::default()
    };
    let mut lattice = Lattice::new(config, Parameters::default()).unwrap();
    for _ in 0..steps {
        lattice.advance_timestep().unwrap();
    }
    lattice
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_record_round_trip_preserves_state() {
    let lattice = running_lattice(50, 40);
    let record = lattice.to_record();
    let restored = Lattice::from_record(record.clone()).unwrap();

    assert_eq!(restored.to_record(), record);
    assert_eq!(restored.current_timestep(), 40);
    assert_eq!(restored.bound_count(), lattice.bound_count());
    assert_eq!(restored.flatten_positions(), lattice.flatten_positions());
    assert_eq!(restored.tm_state_counts(), lattice.tm_state_counts());
}

#[test]
fn test_restored_run_continues_identically() {
    let mut original = running_lattice(51, 30);
    let mut restored = Lattice::from_record(original.to_record()).unwrap();
    for _ in 0..25 {
        original.advance_timestep().unwrap();
        restored.advance_timestep().unwrap();
    }
    assert_eq!(original.to_record(), restored.to_record());
}

#[test]
fn test_json_checkpoint_file() {
    let lattice = running_lattice(52, 20);
    let path = std::env::temp_dir().join(format!("sarcomere_checkpoint_{}.json", std::process::id()));
    export_checkpoint_json_to(&lattice.to_record(), &path).unwrap();

    let record = load_checkpoint_json(&path).unwrap();
    std::fs::remove_file(&path).ok();
    let restored = Lattice::from_record(record).unwrap();

    assert_eq!(restored.current_timestep(), 20);
    assert_eq!(restored.to_record(), lattice.to_record());
}

#[test]
fn test_json_resume_continues_identically() {
    for seed in [60, 61, 62] {
        let mut original = running_lattice(seed, 25);
        let text = serde_json::to_string(&original.to_record()).unwrap();
        let mut restored = Lattice::from_record(LatticeRecord::from_json(&text).unwrap()).unwrap();

        let a = original.flatten_positions();
        let b = restored.flatten_positions();
        let differing = a.iter().zip(&b).filter(|(x, y)| x.to_bits() != y.to_bits()).count();
        assert_eq!(differing, 0, "seed {}: {} of {} positions changed", seed, differing, a.len());

        for _ in 0..20 {
            original.advance_timestep().unwrap();
            restored.advance_timestep().unwrap();
        }
        assert_eq!(original.to_record(), restored.to_record(), "seed {}", seed);
    }
}

#[test]
fn test_pending_transitions_survive_restore() {
    let mut original = running_lattice(63, 30);
    let mut restored = Lattice::from_record(original.to_record()).unwrap();
    let before = original.collect_metrics().transitions;
    assert!(before.total_attempts() > 0);
    assert_eq!(restored.collect_metrics().transitions, before);
}

// ============================================================================
// Migration
// ============================================================================

#[test]
fn test_v1_record_migrates() {
    let lattice = running_lattice(53, 5);
    let mut value = serde_json::to_value(lattice.to_record()).unwrap();
    value["schema_version"] = 1.into();
    for section in ["scalars", "config"] {
        value[section]
            .as_object_mut()
            .unwrap()
            .remove("actin_permissiveness");
    }

    let record = migrate_record(value).unwrap();
    assert_eq!(record.schema_version, RECORD_SCHEMA_VERSION);
    assert_eq!(record.scalars.actin_permissiveness, 1.0);
    assert_eq!(record.config.actin_permissiveness, 1.0);
    let restored = Lattice::from_record(record).unwrap();
    assert_eq!(restored.current_timestep(), 5);
}

#[test]
fn test_current_record_parses_from_text() {
    let text = serde_json::to_string(&running_lattice(54, 3).to_record()).unwrap();
    let record = LatticeRecord::from_json(&text).unwrap();
    assert_eq!(record.current_timestep, 3);
}

// ============================================================================
// Rejection
// ============================================================================

#[test]
fn test_unresolvable_binding_address_rejected() {
    let mut record = running_lattice(55, 0).to_record();
    let xb = &mut record.thick[0].crossbridges[0];
    xb.state = XbState::Loose;
    xb.bound_to = Some(Address::BindingSite {
        thin: 42,
        face: 0,
        index: 0,
    });
    assert!(matches!(
        Lattice::from_record(record),
        Err(RecordError::Address(AddressError::Unresolvable(_)))
    ));
}

#[test]
fn test_binding_to_wrong_kind_rejected() {
    let mut record = running_lattice(56, 0).to_record();
    let xb = &mut record.thick[0].crossbridges[0];
    xb.state = XbState::Tight;
    xb.bound_to = Some(Address::Titin { index: 0 });
    assert!(matches!(
        Lattice::from_record(record),
        Err(RecordError::Address(AddressError::WrongKind { .. }))
    ));
}

#[test]
fn test_one_sided_binding_rejected() {
    let lattice = running_lattice(57, 0);
    let partner = lattice.thick()[0].faces[0].partner;
    let mut record = lattice.to_record();
    let xb = &mut record.thick[0].crossbridges[0];
    xb.state = XbState::Loose;
    xb.bound_to = Some(Address::BindingSite {
        thin: partner.thin,
        face: partner.face,
        index: 0,
    });
    assert!(matches!(
        Lattice::from_record(record),
        Err(RecordError::BrokenBinding { .. })
    ));
}

#[test]
fn test_truncated_filament_rejected() {
    let mut record = running_lattice(58, 0).to_record();
    record.thin[3].axial.pop();
    assert!(matches!(
        Lattice::from_record(record),
        Err(RecordError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_invalid_scalar_rejected() {
    let mut record = running_lattice(59, 0).to_record();
    record.scalars.actin_permissiveness = 3.0;
    assert!(matches!(
        Lattice::from_record(record),
        Err(RecordError::Config(_))
    ));
}
