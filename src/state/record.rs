//! Versioned checkpoint records.
//!
//! A [`LatticeRecord`] holds everything needed to rebuild a lattice
//! mid-run: scalars, the run inputs, model constants, the RNG stream
//! position, uncollected transition counts, node positions and every head
//! and regulatory unit with its binding partner. Links are written as
//! [`Address`] values and checked for mutual consistency on import.

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{LatticeConfig, Parameters};
use crate::error::{AddressError, RecordError};
use crate::lattice::{Address, Component, Lattice, SiteId, TmState, XbId};
use crate::physics::XbState;
use crate::state::TransitionCounts;

/// Current layout of [`LatticeRecord`]
///
/// - 1: first layout, no actin permissiveness
/// - 2: adds `actin_permissiveness` to scalars and run inputs
pub const RECORD_SCHEMA_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    pub lattice_spacing_nm: f64,
    pub z_line_nm: f64,
    pub pCa: f64,
    pub timestep_len_ms: f64,
    pub actin_permissiveness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossbridgeRecord {
    pub address: Address,
    pub state: XbState,
    pub bound_to: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingSiteRecord {
    pub address: Address,
    pub tm_state: TmState,
    pub bound_to: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThickRecord {
    pub address: Address,
    pub axial: Vec<f64>,
    pub initial_axial: Vec<f64>,
    pub crossbridges: Vec<CrossbridgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinRecord {
    pub address: Address,
    pub axial: Vec<f64>,
    pub initial_axial: Vec<f64>,
    pub binding_sites: Vec<BindingSiteRecord>,
}

/// Complete serializable snapshot of a lattice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeRecord {
    pub schema_version: u32,
    pub current_timestep: usize,
    pub scalars: ScalarRecord,
    pub config: LatticeConfig,
    pub parameters: Parameters,
    pub rng: ChaCha8Rng,
    /// Transitions since metrics were last collected
    #[serde(default)]
    pub transitions: TransitionCounts,
    pub thick: Vec<ThickRecord>,
    pub thin: Vec<ThinRecord>,
}

impl LatticeRecord {
    /// Parse a record of any supported schema version
    pub fn from_json(text: &str) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_str(text)?;
        migrate_record(value)
    }
}

/// Upgrade a raw record to [`RECORD_SCHEMA_VERSION`] and decode it
pub fn migrate_record(mut value: Value) -> Result<LatticeRecord, RecordError> {
    let version = value
        .get("schema_version")
        .and_then(Value::as_u64)
        .ok_or(RecordError::MissingVersion)?;

    match version {
        1 => {
            log::info!("Migrating lattice record from schema 1 to {}", RECORD_SCHEMA_VERSION);
            for section in ["scalars", "config"] {
                if let Some(obj) = value.get_mut(section).and_then(Value::as_object_mut) {
                    obj.entry("actin_permissiveness").or_insert(Value::from(1.0));
                }
            }
            value["schema_version"] = Value::from(RECORD_SCHEMA_VERSION);
        }
        v if v == RECORD_SCHEMA_VERSION as u64 => {}
        v => {
            return Err(RecordError::UnsupportedVersion(
                u32::try_from(v).unwrap_or(u32::MAX),
            ))
        }
    }

    Ok(serde_json::from_value(value)?)
}

impl Lattice {
    /// Snapshot the full lattice state
    pub fn to_record(&self) -> LatticeRecord {
        LatticeRecord {
            schema_version: RECORD_SCHEMA_VERSION,
            current_timestep: self.current_timestep,
            scalars: ScalarRecord {
                lattice_spacing_nm: self.lattice_spacing_nm,
                z_line_nm: self.z_line_nm,
                pCa: self.pCa,
                timestep_len_ms: self.timestep_len_ms,
                actin_permissiveness: self.actin_permissiveness,
            },
            config: self.config.clone(),
            parameters: self.params.clone(),
            rng: self.rng.clone(),
            transitions: self.transitions,
            thick: self
                .thick
                .iter()
                .map(|t| ThickRecord {
                    address: Address::ThickFilament { thick: t.index },
                    axial: t.axial.clone(),
                    initial_axial: t.initial_axial.clone(),
                    crossbridges: t
                        .crossbridges()
                        .map(|xb| CrossbridgeRecord {
                            address: xb.address.into(),
                            state: xb.state,
                            bound_to: xb.bound_to.map(Address::from),
                        })
                        .collect(),
                })
                .collect(),
            thin: self
                .thin
                .iter()
                .map(|t| ThinRecord {
                    address: Address::ThinFilament { thin: t.index },
                    axial: t.axial.clone(),
                    initial_axial: t.initial_axial.clone(),
                    binding_sites: t
                        .binding_sites()
                        .map(|site| BindingSiteRecord {
                            address: site.address.into(),
                            tm_state: site.tm_state,
                            bound_to: site.bound_to.map(Address::from),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Rebuild a lattice from a record
    ///
    /// The record must match the lattice its parameters describe entry for
    /// entry, and every binding must be reported by both partners.
    pub fn from_record(record: LatticeRecord) -> Result<Self, RecordError> {
        if record.schema_version != RECORD_SCHEMA_VERSION {
            return Err(RecordError::UnsupportedVersion(record.schema_version));
        }
        let mut lattice = Lattice::new(record.config.clone(), record.parameters.clone())?;

        let scalars = &record.scalars;
        lattice.set_lattice_spacing_nm(scalars.lattice_spacing_nm)?;
        lattice.set_z_line_nm(scalars.z_line_nm)?;
        lattice.set_pCa(scalars.pCa)?;
        lattice.set_timestep_len_ms(scalars.timestep_len_ms)?;
        lattice.set_actin_permissiveness(scalars.actin_permissiveness)?;
        lattice.current_timestep = record.current_timestep;

        check_len("thick filaments", lattice.thick.len(), record.thick.len())?;
        check_len("thin filaments", lattice.thin.len(), record.thin.len())?;

        // Resolve every link before touching the lattice so a bad record
        // leaves nothing half-applied
        let mut heads = Vec::new();
        for (thick, entry) in lattice.thick.iter().zip(&record.thick) {
            check_place(Address::ThickFilament { thick: thick.index }, entry.address)?;
            let what = |field: &str| format!("thick {} {}", thick.index, field);
            check_len(&what("axial"), thick.axial.len(), entry.axial.len())?;
            check_len(&what("initial_axial"), thick.axial.len(), entry.initial_axial.len())?;
            let expected: Vec<XbId> = thick.crossbridges().map(|xb| xb.address).collect();
            check_len(&what("crossbridges"), expected.len(), entry.crossbridges.len())?;
            for (id, xb) in expected.into_iter().zip(&entry.crossbridges) {
                check_place(id.into(), xb.address)?;
                let site = xb
                    .bound_to
                    .map(|address| resolve_site(&lattice, address))
                    .transpose()?;
                if xb.state.is_bound() != site.is_some() {
                    return Err(RecordError::StateMismatch {
                        crossbridge: xb.address,
                        state: xb.state,
                        bound: site.is_some(),
                    });
                }
                heads.push((id, xb.state, site));
            }
        }

        let mut sites = Vec::new();
        for (thin, entry) in lattice.thin.iter().zip(&record.thin) {
            check_place(Address::ThinFilament { thin: thin.index }, entry.address)?;
            let what = |field: &str| format!("thin {} {}", thin.index, field);
            check_len(&what("axial"), thin.axial.len(), entry.axial.len())?;
            check_len(&what("initial_axial"), thin.axial.len(), entry.initial_axial.len())?;
            let expected: Vec<SiteId> = thin.binding_sites().map(|s| s.address).collect();
            check_len(&what("binding_sites"), expected.len(), entry.binding_sites.len())?;
            for (id, site) in expected.into_iter().zip(&entry.binding_sites) {
                check_place(id.into(), site.address)?;
                let xb = site
                    .bound_to
                    .map(|address| resolve_crossbridge(&lattice, address))
                    .transpose()?;
                sites.push((id, site.tm_state, xb));
            }
        }

        for &(xb, _, site) in &heads {
            let Some(site) = site else { continue };
            let partner = lattice.thick[xb.thick].faces[xb.face].partner;
            let reciprocal = sites
                .iter()
                .find(|(id, _, _)| *id == site)
                .and_then(|&(_, _, back)| back);
            if site.face_id() != partner || reciprocal != Some(xb) {
                return Err(RecordError::BrokenBinding {
                    crossbridge: xb.into(),
                    site: site.into(),
                });
            }
        }
        for &(site, _, xb) in &sites {
            let Some(xb) = xb else { continue };
            let forward = heads
                .iter()
                .find(|(id, _, _)| *id == xb)
                .and_then(|&(_, _, site)| site);
            if forward != Some(site) {
                return Err(RecordError::BrokenBinding {
                    crossbridge: xb.into(),
                    site: site.into(),
                });
            }
        }

        for (thick, entry) in lattice.thick.iter_mut().zip(&record.thick) {
            thick.axial.clone_from(&entry.axial);
            thick.initial_axial.clone_from(&entry.initial_axial);
        }
        for (thin, entry) in lattice.thin.iter_mut().zip(&record.thin) {
            thin.axial.clone_from(&entry.axial);
            thin.initial_axial.clone_from(&entry.initial_axial);
        }
        for (id, state, site) in heads {
            let xb = &mut lattice.thick[id.thick].faces[id.face].crossbridges[id.index];
            xb.state = state;
            xb.bound_to = site;
        }
        for (id, tm_state, xb) in sites {
            let site = &mut lattice.thin[id.thin].faces[id.face].binding_sites[id.index];
            site.tm_state = tm_state;
            site.bound_to = xb;
        }
        lattice.rng = record.rng;
        lattice.transitions = record.transitions;

        log::info!(
            "Restored lattice at timestep {} ({} bound heads)",
            lattice.current_timestep,
            lattice.bound_count()
        );
        Ok(lattice)
    }
}

fn check_len(what: &str, expected: usize, found: usize) -> Result<(), RecordError> {
    if expected != found {
        return Err(RecordError::ShapeMismatch {
            what: what.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

fn check_place(expected: Address, found: Address) -> Result<(), RecordError> {
    if expected != found {
        return Err(RecordError::Misplaced { expected, found });
    }
    Ok(())
}

fn resolve_site(lattice: &Lattice, address: Address) -> Result<SiteId, AddressError> {
    match lattice.resolve(&address)? {
        Component::BindingSite(site) => Ok(site.address),
        other => Err(AddressError::WrongKind {
            address,
            expected: "binding site",
            found: other.kind(),
        }),
    }
}

fn resolve_crossbridge(lattice: &Lattice, address: Address) -> Result<XbId, AddressError> {
    match lattice.resolve(&address)? {
        Component::Crossbridge(xb) => Ok(xb.address),
        other => Err(AddressError::WrongKind {
            address,
            expected: "cross-bridge",
            found: other.kind(),
        }),
    }
}
