//! Whole-lattice tests: construction, timestep invariants, force balance,
//! time dependence and addressing.

use sarcomere_sim::config::{LatticeConfig, Parameters, TimeDependence};
use sarcomere_sim::ensemble::{derive_worker_seed, run_ensemble};
use sarcomere_sim::error::{AddressError, ConfigError};
use sarcomere_sim::lattice::{Address, Component, Lattice, ThickFaceId};
use sarcomere_sim::physics::Relaxable;

fn seeded(seed: u64) -> LatticeConfig {
    LatticeConfig {
        seed: Some(seed),
        ..Default::default()
    }
}

fn lattice(seed: u64) -> Lattice {
    Lattice::new(seeded(seed), Parameters::default()).unwrap()
}

fn assert_bindings_mutual(lattice: &Lattice) {
    for xb in lattice.crossbridges() {
        assert_eq!(xb.state.is_bound(), xb.is_bound(), "{:?}", xb.address);
        if let Some(site) = xb.bound_to {
            assert_eq!(lattice.binding_site(site).bound_to, Some(xb.address));
            let partner = lattice.thick()[xb.address.thick].faces[xb.address.face].partner;
            assert_eq!(site.face_id(), partner);
        }
    }
    for site in lattice.binding_sites() {
        if let Some(xb) = site.bound_to {
            assert_eq!(lattice.crossbridge(xb).bound_to, Some(site.address));
        }
    }
    let bound_sites = lattice.binding_sites().filter(|s| s.is_bound()).count();
    assert_eq!(bound_sites, lattice.bound_count());
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_unit_cell_dimensions() {
    let lattice = lattice(1);
    assert_eq!(lattice.thick().len(), 4);
    assert_eq!(lattice.thin().len(), 8);
    assert_eq!(lattice.crossbridges().count(), 720);
    assert_eq!(lattice.binding_sites().count(), 720);
    assert_eq!(lattice.titin().len(), 24);
    assert_eq!(lattice.current_timestep(), 0);
}

#[test]
fn test_every_face_pairs_with_its_partner() {
    let lattice = lattice(1);
    for thick in lattice.thick() {
        for face in &thick.faces {
            let thin_face = &lattice.thin()[face.partner.thin].faces[face.partner.face];
            assert_eq!(thin_face.partner, face.address);
            assert_eq!(face.crossbridges.len(), thin_face.binding_sites.len());
        }
    }
}

#[test]
fn test_invalid_configs_rejected() {
    let bad_spacing = LatticeConfig {
        lattice_spacing_nm: -1.0,
        ..seeded(1)
    };
    assert!(matches!(
        Lattice::new(bad_spacing, Parameters::default()),
        Err(ConfigError::NonPositive { .. })
    ));

    let mismatched = LatticeConfig {
        time_dependence: TimeDependence {
            z_line_nm: Some(vec![1250.0, 1240.0, 1230.0]),
            pCa: Some(vec![4.0, 5.0]),
            ..Default::default()
        },
        ..seeded(1)
    };
    assert!(matches!(
        Lattice::new(mismatched, Parameters::default()),
        Err(ConfigError::TraceLengthMismatch { .. })
    ));

    let bad_trace = LatticeConfig {
        time_dependence: TimeDependence {
            actin_permissiveness: Some(vec![1.0, 2.0]),
            ..Default::default()
        },
        ..seeded(1)
    };
    assert!(matches!(
        Lattice::new(bad_trace, Parameters::default()),
        Err(ConfigError::InvalidTraceValue { step: 1, .. })
    ));
}

#[test]
fn test_same_seed_same_trajectory() {
    let mut a = lattice(77);
    let mut b = lattice(77);
    for _ in 0..15 {
        a.advance_timestep().unwrap();
        b.advance_timestep().unwrap();
    }
    assert_eq!(a.flatten_positions(), b.flatten_positions());
    assert_eq!(a.crossbridge_state_counts(), b.crossbridge_state_counts());
}

// ============================================================================
// Timestep invariants
// ============================================================================

#[test]
fn test_state_fractions_sum_to_one() {
    let mut lattice = lattice(5);
    let fractions = lattice.run(40, |_, m| m.xb_fractions()).unwrap();
    for f in fractions {
        assert!((f.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
    let tm: f64 = lattice.tm_state_fractions().iter().sum();
    assert!((tm - 1.0).abs() < 1e-12);
}

#[test]
fn test_bindings_stay_mutual() {
    let mut lattice = lattice(8);
    for _ in 0..60 {
        lattice.advance_timestep().unwrap();
        assert_bindings_mutual(&lattice);
    }
}

#[test]
fn test_every_head_attempts_once_per_step() {
    let mut lattice = lattice(12);
    let attempts = lattice
        .run(10, |_, m| m.transitions.total_attempts())
        .unwrap();
    assert!(attempts.iter().all(|&n| n == 720), "{:?}", attempts);
}

#[test]
fn test_run_reports_each_timestep() {
    let mut lattice = lattice(4);
    let steps = lattice.run(5, |l, m| (l.current_timestep(), m.timestep)).unwrap();
    assert_eq!(steps, vec![(1, 1), (2, 2), (3, 3), (4, 4), (5, 5)]);
    assert!((lattice.elapsed_ms() - 5.0).abs() < 1e-12);
}

#[test]
fn test_zero_permissiveness_never_binds() {
    let config = LatticeConfig {
        actin_permissiveness: 0.0,
        ..seeded(21)
    };
    let mut lattice = Lattice::new(config, Parameters::default()).unwrap();
    let binds = lattice
        .run(50, |l, m| (l.bound_count(), m.transitions.bind_12))
        .unwrap();
    assert!(binds.iter().all(|&(bound, n)| bound == 0 && n == 0));
    assert_eq!(lattice.crossbridge_state_counts(), [720, 0, 0]);

    // With no heads attached, titin alone holds the thick filaments
    let ls = lattice.lattice_spacing_nm();
    let z_line = lattice.z_line_nm();
    let titin_force: f64 = lattice
        .thick()
        .iter()
        .flat_map(|thick| {
            let tip = thick.axial[thick.tip()];
            thick
                .faces
                .iter()
                .map(move |face| (face.titin, tip))
        })
        .map(|(titin, tip)| lattice.titin()[titin].axial_force(z_line, tip, ls))
        .sum();
    // One settle tolerance per thick filament
    let tolerance = Parameters::default().settle.tolerance_pN * lattice.thick().len() as f64;
    assert!(
        (lattice.axial_force() - titin_force).abs() <= tolerance,
        "axial {} vs titin {}",
        lattice.axial_force(),
        titin_force
    );
}

// ============================================================================
// Force balance
// ============================================================================

#[test]
fn test_settle_reaches_tolerance() {
    let mut lattice = lattice(3);
    for _ in 0..20 {
        let report = lattice.advance_timestep().unwrap();
        assert!(report.residual_pN < 0.12);
        assert!(lattice.max_residual() < 0.12);
    }
}

#[test]
fn test_settle_idempotent() {
    let mut lattice = lattice(6);
    for _ in 0..10 {
        lattice.advance_timestep().unwrap();
    }
    let before = lattice.flatten_positions();
    let report = lattice.settle().unwrap();
    assert_eq!(report.sweeps, 0);
    assert_eq!(lattice.flatten_positions(), before);
}

#[test]
fn test_settle_recovers_from_perturbation() {
    let mut lattice = lattice(6);
    for _ in 0..10 {
        lattice.advance_timestep().unwrap();
    }
    let settled = lattice.flatten_positions();
    let mut perturbed = settled.clone();
    perturbed[100] += 2.0;
    perturbed[500] -= 2.0;
    lattice.reload_positions(&perturbed);
    assert!(lattice.max_residual() > 0.12);
    lattice.settle().unwrap();
    for (a, b) in lattice.flatten_positions().iter().zip(&settled) {
        assert!((a - b).abs() < 0.1, "{} vs {}", a, b);
    }
}

#[test]
fn test_titin_pulls_thick_toward_z_line() {
    let mut lattice = lattice(2);
    lattice.advance_timestep().unwrap();
    assert!(lattice.axial_force() > 0.0);
    let thick = &lattice.thick()[0];
    let tip = thick.tip();
    assert!(thick.axial[tip] > thick.initial_axial[tip]);
}

// ============================================================================
// Time dependence
// ============================================================================

#[test]
fn test_trace_applied_then_held() {
    let config = LatticeConfig {
        time_dependence: TimeDependence {
            pCa: Some(vec![9.0, 8.0, 7.0]),
            ..Default::default()
        },
        ..seeded(14)
    };
    let mut lattice = Lattice::new(config, Parameters::default()).unwrap();
    assert_eq!(lattice.pCa(), 9.0);
    let pcas = lattice.run(4, |l, _| l.pCa()).unwrap();
    assert_eq!(pcas, vec![8.0, 7.0, 7.0, 7.0]);
}

#[test]
fn test_poisson_coupling_scales_spacing() {
    let config = LatticeConfig {
        poisson_ratio: 0.5,
        time_dependence: TimeDependence {
            z_line_nm: Some(vec![1250.0, 1200.0]),
            ..Default::default()
        },
        ..seeded(15)
    };
    let mut lattice = Lattice::new(config, Parameters::default()).unwrap();
    assert!((lattice.lattice_spacing_nm() - 14.0).abs() < 1e-12);
    lattice.advance_timestep().unwrap();
    assert_eq!(lattice.z_line_nm(), 1200.0);
    let expected = 14.0 * (1250.0f64 / 1200.0).sqrt();
    assert!((lattice.lattice_spacing_nm() - expected).abs() < 1e-12);
}

#[test]
fn test_spacing_trace_overrides_poisson() {
    let config = LatticeConfig {
        poisson_ratio: 0.5,
        time_dependence: TimeDependence {
            z_line_nm: Some(vec![1250.0, 1200.0]),
            lattice_spacing_nm: Some(vec![14.0, 13.0]),
            ..Default::default()
        },
        ..seeded(15)
    };
    let mut lattice = Lattice::new(config, Parameters::default()).unwrap();
    lattice.advance_timestep().unwrap();
    assert_eq!(lattice.lattice_spacing_nm(), 13.0);
}

// ============================================================================
// Addressing
// ============================================================================

#[test]
fn test_addresses_resolve_to_their_components() {
    let lattice = lattice(1);
    for xb in lattice.crossbridges() {
        match lattice.resolve(&Address::from(xb.address)).unwrap() {
            Component::Crossbridge(found) => assert_eq!(found.address, xb.address),
            other => panic!("resolved to {}", other.kind()),
        }
    }
    let face = ThickFaceId { thick: 2, face: 4 };
    match lattice.resolve(&Address::from(face)).unwrap() {
        Component::ThickFace(found) => assert_eq!(found.address, face),
        other => panic!("resolved to {}", other.kind()),
    }
    assert!(matches!(
        lattice.resolve(&Address::Titin { index: 23 }),
        Ok(Component::Titin(_))
    ));
}

#[test]
fn test_out_of_range_address_unresolvable() {
    let lattice = lattice(1);
    let address = Address::BindingSite {
        thin: 0,
        face: 0,
        index: 30,
    };
    assert_eq!(
        lattice.resolve(&address).err(),
        Some(AddressError::Unresolvable(address))
    );
    assert!(Address::Titin { index: 0 }.as_crossbridge().is_err());
}

// ============================================================================
// Ensemble
// ============================================================================

#[test]
fn test_ensemble_reproducible() {
    let config = LatticeConfig::default();
    let params = Parameters::default();
    let first = run_ensemble(&config, &params, 99, 3, 5).unwrap();
    let second = run_ensemble(&config, &params, 99, 3, 5).unwrap();
    assert_eq!(first.len(), 3);
    assert!(first.iter().all(|run| run.len() == 5));
    assert_eq!(first, second);
}

#[test]
fn test_ensemble_worker_matches_single_run() {
    let config = LatticeConfig::default();
    let params = Parameters::default();
    let ensemble = run_ensemble(&config, &params, 40, 2, 4).unwrap();

    let mut single = Lattice::new(
        LatticeConfig {
            seed: Some(derive_worker_seed(40, 1)),
            ..config
        },
        params,
    )
    .unwrap();
    let metrics = single.run(4, |_, m| m.clone()).unwrap();
    assert_eq!(ensemble[1], metrics);
}
