//! Half-sarcomere lattice.
//!
//! Owns every filament, cross-bridge, binding site and titin molecule of
//! the unit cell in flat arenas, plus the run scalars and the RNG. All
//! cross-references between components are typed indices (see
//! [`address`]), so the whole aggregate is a plain tree of owned data.
//!
//! One call to [`Lattice::advance_timestep`]:
//! 1. moves the timestep counter and applies any per-timestep overrides,
//! 2. lets every cross-bridge attempt a transition, then every tropomyosin
//!    unit,
//! 3. relaxes all filament positions to force balance.

pub mod address;
mod balance;
pub mod binding_site;
pub mod crossbridge;
pub mod thick;
pub mod thin;
pub mod topology;
pub mod tropomyosin;

pub use address::{Address, Component, SiteId, ThickFaceId, ThinFaceId, XbId};
pub use binding_site::BindingSite;
pub use crossbridge::Crossbridge;
pub use thick::{Crown, ThickFace, ThickFilament};
pub use thin::{ThinFace, ThinFilament};
pub use tropomyosin::{TmKinetics, TmRates, TmState};

use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{LatticeConfig, Parameters};
use crate::error::{ConfigError, SettleError, SimulationError};
use crate::physics::{self, HeadKinetics, SettleReport, Titin, XbState, XbTransition};
use crate::state::{TimestepMetrics, TransitionCounts};
use topology::{THICK_COUNT, THICK_FACE_COUNT, THIN_COUNT};

#[derive(Debug, Clone)]
pub struct Lattice {
    /// Face-to-face filament spacing (nm)
    pub(crate) lattice_spacing_nm: f64,
    /// M-line to Z-line distance (nm)
    pub(crate) z_line_nm: f64,
    pub(crate) pCa: f64,
    pub(crate) timestep_len_ms: f64,
    pub(crate) actin_permissiveness: f64,
    pub(crate) current_timestep: usize,
    pub(crate) thick: Vec<ThickFilament>,
    pub(crate) thin: Vec<ThinFilament>,
    pub(crate) titin: Vec<Titin>,
    pub(crate) head: HeadKinetics,
    pub(crate) tm: TmKinetics,
    pub(crate) config: LatticeConfig,
    pub(crate) params: Parameters,
    pub(crate) rng: ChaCha8Rng,
    /// Cross-bridge transitions since metrics were last collected
    pub(crate) transitions: TransitionCounts,
}

impl Lattice {
    /// Build a lattice at rest geometry
    ///
    /// Scalars come from `config`, or from the first entry of a trace when
    /// one is given. Filaments start unstrained and all heads free; the
    /// first timestep settles them.
    pub fn new(config: LatticeConfig, params: Parameters) -> Result<Self, ConfigError> {
        config.validate()?;
        params.validate()?;

        let mut config = config;
        let seed = match config.seed {
            Some(seed) => seed,
            None => {
                let seed: u64 = rand::random();
                log::warn!("No seed given, seeding lattice RNG with {}", seed);
                seed
            }
        };
        config.seed = Some(seed);

        let thick: Vec<ThickFilament> = (0..THICK_COUNT)
            .map(|i| ThickFilament::new(i, &params.thick))
            .collect();
        let titin = thick
            .iter()
            .flat_map(|t| t.faces.iter())
            .map(|face| Titin::new(face.titin, face.address, face.partner, &params.titin))
            .collect();

        let mut lattice = Self {
            lattice_spacing_nm: config.lattice_spacing_nm,
            z_line_nm: config.z_line_nm,
            pCa: config.pCa,
            timestep_len_ms: config.timestep_len_ms,
            actin_permissiveness: config.actin_permissiveness,
            current_timestep: 0,
            thick,
            thin: Vec::new(),
            titin,
            head: HeadKinetics::new(&params.head),
            tm: TmKinetics::new(&params.tropomyosin),
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
            params,
            transitions: TransitionCounts::default(),
        };
        lattice.apply_time_dependence(0);
        lattice.thin = (0..THIN_COUNT)
            .map(|i| ThinFilament::new(i, lattice.z_line_nm, &lattice.params.thin))
            .collect();

        log::info!(
            "Lattice built: {} thick, {} thin, {} cross-bridges, {} binding sites, seed {}",
            lattice.thick.len(),
            lattice.thin.len(),
            lattice.crossbridges().count(),
            lattice.binding_sites().count(),
            seed
        );
        Ok(lattice)
    }

    /// Apply the trace entries for `step`
    ///
    /// With a z-line trace but no lattice-spacing trace, a non-zero Poisson
    /// ratio scales the spacing as ls = ls₀ (z₀ / z)^ν.
    fn apply_time_dependence(&mut self, step: usize) {
        let overrides = self.config.time_dependence.at(step);
        if let Some(z) = overrides.z_line_nm {
            self.z_line_nm = z;
        }
        if let Some(ls) = overrides.lattice_spacing_nm {
            self.lattice_spacing_nm = ls;
        } else if overrides.z_line_nm.is_some() && self.config.poisson_ratio > 0.0 {
            let ratio = self.config.z_line_nm / self.z_line_nm;
            self.lattice_spacing_nm =
                self.config.lattice_spacing_nm * ratio.powf(self.config.poisson_ratio);
        }
        if let Some(pca) = overrides.pCa {
            self.pCa = pca;
        }
        if let Some(ap) = overrides.actin_permissiveness {
            self.actin_permissiveness = ap;
        }
    }

    /// Advance one timestep: overrides, transitions, force balance
    pub fn advance_timestep(&mut self) -> Result<SettleReport, SimulationError> {
        self.current_timestep += 1;
        self.apply_time_dependence(self.current_timestep);

        let counts = self.transition_crossbridges();
        self.transitions += counts;
        let tm_changes = self.transition_tropomyosin();

        let report = self.settle()?;
        log::debug!(
            "timestep {}: {} xb transitions, {} tm changes, settled in {} sweeps (residual {:.4} pN)",
            self.current_timestep,
            counts.total_transitions(),
            tm_changes,
            report.sweeps,
            report.residual_pN
        );
        Ok(report)
    }

    /// Relax filament positions to force balance
    pub fn settle(&mut self) -> Result<SettleReport, SettleError> {
        let params = self.params.settle.clone();
        physics::settle(self, &params)
    }

    /// Run `steps` timesteps, calling `callback` after each one
    pub fn run<F, T>(&mut self, steps: usize, mut callback: F) -> Result<Vec<T>, SimulationError>
    where
        F: FnMut(&Lattice, &TimestepMetrics) -> T,
    {
        let mut output = Vec::with_capacity(steps);
        for _ in 0..steps {
            self.advance_timestep()?;
            let metrics = self.collect_metrics();
            output.push(callback(self, &metrics));
        }
        log::info!(
            "Ran {} timesteps, now at step {} (axial force {:.1} pN)",
            steps,
            self.current_timestep,
            self.axial_force()
        );
        Ok(output)
    }

    /// Snapshot observables and reset the transition counters
    pub fn collect_metrics(&mut self) -> TimestepMetrics {
        let metrics = TimestepMetrics::from_lattice(self);
        self.transitions = TransitionCounts::default();
        metrics
    }

    fn transition_crossbridges(&mut self) -> TransitionCounts {
        let mut counts = TransitionCounts::default();
        let ls = self.lattice_spacing_nm;
        let dt = self.timestep_len_ms;
        let ap = self.actin_permissiveness;
        let Self {
            thick,
            thin,
            head,
            rng,
            ..
        } = self;

        for filament in thick.iter_mut() {
            let ThickFilament { axial, faces, .. } = filament;
            for face in faces.iter_mut() {
                let partner = face.partner;
                let ThinFilament {
                    axial: thin_axial,
                    faces: thin_faces,
                    ..
                } = &mut thin[partner.thin];
                let sites = &mut thin_faces[partner.face].binding_sites;

                for xb in face.crossbridges.iter_mut() {
                    let crown_x = axial[xb.crown];
                    let index = match xb.bound_to {
                        Some(site) => {
                            assert_eq!(
                                site.face_id(),
                                partner,
                                "cross-bridge {:?} bound off its partner face",
                                xb.address
                            );
                            site.index
                        }
                        None => {
                            let nearest = thin::nearest_site(sites, thin_axial, crown_x);
                            if sites[nearest].is_bound() {
                                counts.record(None);
                                continue;
                            }
                            nearest
                        }
                    };
                    let site = &mut sites[index];
                    let sep = crossbridge::separation(crown_x, thin_axial[site.node], ls);
                    let permissiveness = site.permissiveness(ap);
                    let transition = head.transition(xb.state, sep, permissiveness, dt, rng);

                    if let Some(t) = transition {
                        assert_eq!(t.from_state(), xb.state, "state mismatch on {:?}", xb.address);
                        match t {
                            XbTransition::Bind => {
                                xb.bound_to = Some(site.address);
                                site.bound_to = Some(xb.address);
                            }
                            t if t.releases() => {
                                assert_eq!(
                                    site.bound_to,
                                    Some(xb.address),
                                    "binding site {:?} lost its cross-bridge",
                                    site.address
                                );
                                xb.bound_to = None;
                                site.bound_to = None;
                            }
                            _ => {}
                        }
                        xb.state = t.to_state();
                    }
                    counts.record(transition);
                }
            }
        }
        counts
    }

    fn transition_tropomyosin(&mut self) -> usize {
        let rates = self.tm.rates(self.calcium_M());
        let dt = self.timestep_len_ms;
        let z = self.z_line_nm;
        let mut changed = 0;
        for filament in self.thin.iter_mut() {
            let tension = filament.segment_tensions(z);
            let ThinFilament { axial, faces, .. } = filament;
            for face in faces.iter_mut() {
                changed += self.tm.step_strand(
                    &mut face.binding_sites,
                    axial,
                    &tension,
                    &rates,
                    dt,
                    &mut self.rng,
                );
            }
        }
        changed
    }

    // ------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------

    pub fn lattice_spacing_nm(&self) -> f64 {
        self.lattice_spacing_nm
    }

    pub fn z_line_nm(&self) -> f64 {
        self.z_line_nm
    }

    pub fn pCa(&self) -> f64 {
        self.pCa
    }

    /// Calcium concentration (M)
    pub fn calcium_M(&self) -> f64 {
        10f64.powf(-self.pCa)
    }

    pub fn timestep_len_ms(&self) -> f64 {
        self.timestep_len_ms
    }

    pub fn actin_permissiveness(&self) -> f64 {
        self.actin_permissiveness
    }

    pub fn current_timestep(&self) -> usize {
        self.current_timestep
    }

    /// Time simulated so far (ms)
    pub fn elapsed_ms(&self) -> f64 {
        self.current_timestep as f64 * self.timestep_len_ms
    }

    pub fn config(&self) -> &LatticeConfig {
        &self.config
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn head_kinetics(&self) -> &HeadKinetics {
        &self.head
    }

    pub fn set_lattice_spacing_nm(&mut self, value: f64) -> Result<(), ConfigError> {
        self.lattice_spacing_nm = checked_positive("lattice_spacing_nm", value)?;
        Ok(())
    }

    pub fn set_z_line_nm(&mut self, value: f64) -> Result<(), ConfigError> {
        self.z_line_nm = checked_positive("z_line_nm", value)?;
        Ok(())
    }

    pub fn set_pCa(&mut self, value: f64) -> Result<(), ConfigError> {
        self.pCa = checked_positive("pCa", value)?;
        Ok(())
    }

    pub fn set_timestep_len_ms(&mut self, value: f64) -> Result<(), ConfigError> {
        self.timestep_len_ms = checked_positive("timestep_len_ms", value)?;
        Ok(())
    }

    pub fn set_actin_permissiveness(&mut self, value: f64) -> Result<(), ConfigError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::OutOfRange {
                name: "actin_permissiveness",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        self.actin_permissiveness = value;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Components
    // ------------------------------------------------------------------

    pub fn thick(&self) -> &[ThickFilament] {
        &self.thick
    }

    pub fn thin(&self) -> &[ThinFilament] {
        &self.thin
    }

    pub fn titin(&self) -> &[Titin] {
        &self.titin
    }

    pub fn crossbridge(&self, id: XbId) -> &Crossbridge {
        self.thick[id.thick].crossbridge(id)
    }

    pub fn binding_site(&self, id: SiteId) -> &BindingSite {
        self.thin[id.thin].binding_site(id)
    }

    pub fn crossbridges(&self) -> impl Iterator<Item = &Crossbridge> {
        self.thick.iter().flat_map(|t| t.crossbridges())
    }

    pub fn binding_sites(&self) -> impl Iterator<Item = &BindingSite> {
        self.thin.iter().flat_map(|t| t.binding_sites())
    }

    /// Axial position of a binding site (nm)
    pub fn site_axial_nm(&self, id: SiteId) -> f64 {
        let thin = &self.thin[id.thin];
        thin.axial[thin.binding_site(id).node]
    }

    /// Axial position of the crown carrying a cross-bridge (nm)
    pub fn crossbridge_axial_nm(&self, id: XbId) -> f64 {
        let thick = &self.thick[id.thick];
        thick.axial[thick.crossbridge(id).crown]
    }

    /// Crown-to-site separation of a bound cross-bridge
    ///
    /// # Panics
    ///
    /// If the cross-bridge is free.
    pub fn bound_separation(&self, id: XbId) -> DVec2 {
        let site = self.crossbridge(id).bound_site();
        crossbridge::separation(
            self.crossbridge_axial_nm(id),
            self.site_axial_nm(site),
            self.lattice_spacing_nm,
        )
    }

    /// (axial, radial) force of a cross-bridge on its crown; zero when free
    pub fn crossbridge_force(&self, id: XbId) -> DVec2 {
        let xb = self.crossbridge(id);
        if !xb.is_bound() {
            return DVec2::ZERO;
        }
        self.head.force(xb.state, self.bound_separation(id))
    }

    /// Elastic energy held in a cross-bridge (pN·nm); zero when free
    pub fn crossbridge_energy(&self, id: XbId) -> f64 {
        let xb = self.crossbridge(id);
        if !xb.is_bound() {
            return 0.0;
        }
        self.head.energy(xb.state, self.bound_separation(id))
    }

    pub fn total_crossbridge_energy(&self) -> f64 {
        self.crossbridges()
            .map(|xb| self.crossbridge_energy(xb.address))
            .sum()
    }

    // ------------------------------------------------------------------
    // Aggregate observables
    // ------------------------------------------------------------------

    /// Total pull of the thick filaments on the M-line (pN)
    pub fn axial_force(&self) -> f64 {
        self.thick.iter().map(|t| t.effective_axial_force()).sum()
    }

    /// Axial force of every bound head on one thick face (pN)
    pub fn face_axial_force(&self, face: ThickFaceId) -> f64 {
        self.thick[face.thick].faces[face.face]
            .crossbridges
            .iter()
            .map(|xb| self.crossbridge_force(xb.address).x)
            .sum()
    }

    /// Radial force of one thick face toward its partner (pN)
    pub fn face_radial_force(&self, face: ThickFaceId) -> f64 {
        let thick = &self.thick[face.thick];
        let thick_face = &thick.faces[face.face];
        let heads: f64 = thick_face
            .crossbridges
            .iter()
            .map(|xb| self.crossbridge_force(xb.address).y)
            .sum();
        let titin = self.titin[thick_face.titin].radial_force(
            self.z_line_nm,
            thick.axial[thick.tip()],
            self.lattice_spacing_nm,
        );
        heads + titin
    }

    /// Net radial force on the thick filaments as a (y, z) vector (pN)
    pub fn radial_force(&self) -> DVec2 {
        self.thick
            .iter()
            .flat_map(|t| t.faces.iter())
            .fold(DVec2::ZERO, |total, face| {
                total + self.face_radial_force(face.address) * face.direction()
            })
    }

    /// Scalar sum of every face's radial force (pN)
    pub fn radial_tension(&self) -> f64 {
        self.thick
            .iter()
            .flat_map(|t| t.faces.iter())
            .map(|face| self.face_radial_force(face.address))
            .sum()
    }

    /// Cross-bridges in free, loose and tight states
    pub fn crossbridge_state_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for xb in self.crossbridges() {
            counts[xb.state.index()] += 1;
        }
        counts
    }

    /// Fractions of cross-bridges in free, loose and tight states
    pub fn crossbridge_state_fractions(&self) -> [f64; 3] {
        fractions(self.crossbridge_state_counts())
    }

    /// Count of cross-bridges in `state`, per thick filament per face
    pub fn state_counts_by_face(&self, state: XbState) -> Vec<[usize; THICK_FACE_COUNT]> {
        self.thick
            .iter()
            .map(|t| {
                let mut per_face = [0; THICK_FACE_COUNT];
                for (count, face) in per_face.iter_mut().zip(&t.faces) {
                    *count = face.count_in_state(state);
                }
                per_face
            })
            .collect()
    }

    pub fn bound_count(&self) -> usize {
        self.crossbridges().filter(|xb| xb.is_bound()).count()
    }

    /// Binding sites in inactive, primed and active regulatory states
    pub fn tm_state_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for site in self.binding_sites() {
            counts[site.tm_state.index()] += 1;
        }
        counts
    }

    pub fn tm_state_fractions(&self) -> [f64; 3] {
        fractions(self.tm_state_counts())
    }

    /// Mean binding permissiveness over every site
    pub fn mean_permissiveness(&self) -> f64 {
        let ap = self.actin_permissiveness;
        let (sum, n) = self
            .binding_sites()
            .fold((0.0, 0usize), |(sum, n), s| (sum + s.permissiveness(ap), n + 1));
        if n == 0 {
            0.0
        } else {
            sum / n as f64
        }
    }

    /// Every crown position then every actin node position, filament order
    pub fn flatten_positions(&self) -> Vec<f64> {
        self.thick
            .iter()
            .flat_map(|t| t.axial.iter())
            .chain(self.thin.iter().flat_map(|t| t.axial.iter()))
            .copied()
            .collect()
    }

    /// Write back positions laid out as by [`Lattice::flatten_positions`]
    ///
    /// # Panics
    ///
    /// If `flat` does not hold exactly one value per node.
    pub fn reload_positions(&mut self, flat: &[f64]) {
        let expected: usize = self.thick.iter().map(|t| t.axial.len()).sum::<usize>()
            + self.thin.iter().map(|t| t.axial.len()).sum::<usize>();
        assert_eq!(flat.len(), expected, "position vector length mismatch");
        let mut rest = flat;
        for axial in self
            .thick
            .iter_mut()
            .map(|t| &mut t.axial)
            .chain(self.thin.iter_mut().map(|t| &mut t.axial))
        {
            let (head, tail) = rest.split_at(axial.len());
            axial.copy_from_slice(head);
            rest = tail;
        }
    }
}

fn checked_positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { name, value });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { name, value });
    }
    Ok(value)
}

fn fractions(counts: [usize; 3]) -> [f64; 3] {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return [0.0; 3];
    }
    counts.map(|c| c as f64 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice() -> Lattice {
        let config = LatticeConfig {
            seed: Some(42),
            ..Default::default()
        };
        Lattice::new(config, Parameters::default()).unwrap()
    }

    #[test]
    fn test_construction_counts() {
        let lattice = lattice();
        assert_eq!(lattice.thick().len(), 4);
        assert_eq!(lattice.thin().len(), 8);
        assert_eq!(lattice.titin().len(), 24);
        assert_eq!(lattice.crossbridges().count(), 720);
        assert_eq!(lattice.binding_sites().count(), 720);
        assert_eq!(lattice.flatten_positions().len(), 4 * 60 + 8 * 90);
        assert_eq!(lattice.crossbridge_state_counts(), [720, 0, 0]);
    }

    #[test]
    fn test_entropy_seed_recorded() {
        let lattice = Lattice::new(LatticeConfig::default(), Parameters::default()).unwrap();
        assert!(lattice.config().seed.is_some());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = LatticeConfig {
            z_line_nm: 0.0,
            ..Default::default()
        };
        assert!(Lattice::new(config, Parameters::default()).is_err());
    }

    #[test]
    fn test_first_trace_entry_used_at_construction() {
        let config = LatticeConfig {
            seed: Some(1),
            time_dependence: crate::config::TimeDependence {
                z_line_nm: Some(vec![1200.0, 1190.0]),
                ..Default::default()
            },
            ..Default::default()
        };
        let lattice = Lattice::new(config, Parameters::default()).unwrap();
        assert_eq!(lattice.z_line_nm(), 1200.0);
        assert!((lattice.thin()[0].axial[89] - (1200.0 - 12.3)).abs() < 1e-9);
    }

    #[test]
    fn test_reload_round_trip() {
        let mut lattice = lattice();
        let mut flat = lattice.flatten_positions();
        flat[3] += 0.5;
        flat[300] -= 0.25;
        lattice.reload_positions(&flat);
        assert_eq!(lattice.flatten_positions(), flat);
    }

    #[test]
    fn test_setters_validate() {
        let mut lattice = lattice();
        assert!(lattice.set_pCa(-1.0).is_err());
        assert!(lattice.set_actin_permissiveness(1.5).is_err());
        lattice.set_actin_permissiveness(0.5).unwrap();
        assert_eq!(lattice.actin_permissiveness(), 0.5);
    }

    #[test]
    fn test_free_lattice_has_no_head_force() {
        let lattice = lattice();
        assert_eq!(lattice.total_crossbridge_energy(), 0.0);
        assert_eq!(lattice.face_axial_force(ThickFaceId { thick: 0, face: 0 }), 0.0);
    }
}
