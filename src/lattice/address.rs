//! Stable addresses for every component of the lattice.
//!
//! Components live in flat vectors owned by the lattice, and links between
//! them (cross-bridge ↔ binding site, face ↔ face, titin ↔ faces) are
//! stored as these typed indices. An `Address` names any component and is
//! what checkpoints carry across the serialization boundary.

use serde::{Deserialize, Serialize};

use super::binding_site::BindingSite;
use super::crossbridge::Crossbridge;
use super::thick::{Crown, ThickFace, ThickFilament};
use super::thin::{ThinFace, ThinFilament};
use super::Lattice;
use crate::error::AddressError;
use crate::physics::Titin;

/// One of the six faces of a thick filament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThickFaceId {
    pub thick: usize,
    pub face: usize,
}

/// One of the three faces of a thin filament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThinFaceId {
    pub thin: usize,
    pub face: usize,
}

/// A cross-bridge, by its position along a thick face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct XbId {
    pub thick: usize,
    pub face: usize,
    pub index: usize,
}

impl XbId {
    pub fn face_id(self) -> ThickFaceId {
        ThickFaceId {
            thick: self.thick,
            face: self.face,
        }
    }
}

/// A binding site, by its position along a thin face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId {
    pub thin: usize,
    pub face: usize,
    pub index: usize,
}

impl SiteId {
    pub fn face_id(self) -> ThinFaceId {
        ThinFaceId {
            thin: self.thin,
            face: self.face,
        }
    }
}

/// Hierarchical address of any lattice component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Address {
    ThickFilament { thick: usize },
    ThickFace { thick: usize, face: usize },
    Crown { thick: usize, crown: usize },
    Crossbridge { thick: usize, face: usize, index: usize },
    ThinFilament { thin: usize },
    ThinFace { thin: usize, face: usize },
    BindingSite { thin: usize, face: usize, index: usize },
    Titin { index: usize },
}

impl From<XbId> for Address {
    fn from(id: XbId) -> Self {
        Address::Crossbridge {
            thick: id.thick,
            face: id.face,
            index: id.index,
        }
    }
}

impl From<SiteId> for Address {
    fn from(id: SiteId) -> Self {
        Address::BindingSite {
            thin: id.thin,
            face: id.face,
            index: id.index,
        }
    }
}

impl From<ThickFaceId> for Address {
    fn from(id: ThickFaceId) -> Self {
        Address::ThickFace {
            thick: id.thick,
            face: id.face,
        }
    }
}

impl From<ThinFaceId> for Address {
    fn from(id: ThinFaceId) -> Self {
        Address::ThinFace {
            thin: id.thin,
            face: id.face,
        }
    }
}

impl Address {
    /// Human-readable component kind
    pub fn kind(&self) -> &'static str {
        match self {
            Address::ThickFilament { .. } => "thick filament",
            Address::ThickFace { .. } => "thick face",
            Address::Crown { .. } => "crown",
            Address::Crossbridge { .. } => "cross-bridge",
            Address::ThinFilament { .. } => "thin filament",
            Address::ThinFace { .. } => "thin face",
            Address::BindingSite { .. } => "binding site",
            Address::Titin { .. } => "titin",
        }
    }

    pub fn as_crossbridge(&self) -> Result<XbId, AddressError> {
        match *self {
            Address::Crossbridge { thick, face, index } => Ok(XbId { thick, face, index }),
            other => Err(AddressError::WrongKind {
                address: other,
                expected: "cross-bridge",
                found: other.kind(),
            }),
        }
    }

    pub fn as_binding_site(&self) -> Result<SiteId, AddressError> {
        match *self {
            Address::BindingSite { thin, face, index } => Ok(SiteId { thin, face, index }),
            other => Err(AddressError::WrongKind {
                address: other,
                expected: "binding site",
                found: other.kind(),
            }),
        }
    }
}

/// Borrowed view of a resolved component
#[derive(Debug, Clone, Copy)]
pub enum Component<'a> {
    ThickFilament(&'a ThickFilament),
    ThickFace(&'a ThickFace),
    Crown(&'a Crown),
    Crossbridge(&'a Crossbridge),
    ThinFilament(&'a ThinFilament),
    ThinFace(&'a ThinFace),
    BindingSite(&'a BindingSite),
    Titin(&'a Titin),
}

impl Lattice {
    /// Look up the component an address names
    pub fn resolve(&self, address: &Address) -> Result<Component<'_>, AddressError> {
        let missing = || AddressError::Unresolvable(*address);
        let component = match *address {
            Address::ThickFilament { thick } => {
                Component::ThickFilament(self.thick.get(thick).ok_or_else(missing)?)
            }
            Address::ThickFace { thick, face } => Component::ThickFace(
                self.thick
                    .get(thick)
                    .and_then(|t| t.faces.get(face))
                    .ok_or_else(missing)?,
            ),
            Address::Crown { thick, crown } => Component::Crown(
                self.thick
                    .get(thick)
                    .and_then(|t| t.crowns.get(crown))
                    .ok_or_else(missing)?,
            ),
            Address::Crossbridge { thick, face, index } => Component::Crossbridge(
                self.thick
                    .get(thick)
                    .and_then(|t| t.faces.get(face))
                    .and_then(|f| f.crossbridges.get(index))
                    .ok_or_else(missing)?,
            ),
            Address::ThinFilament { thin } => {
                Component::ThinFilament(self.thin.get(thin).ok_or_else(missing)?)
            }
            Address::ThinFace { thin, face } => Component::ThinFace(
                self.thin
                    .get(thin)
                    .and_then(|t| t.faces.get(face))
                    .ok_or_else(missing)?,
            ),
            Address::BindingSite { thin, face, index } => Component::BindingSite(
                self.thin
                    .get(thin)
                    .and_then(|t| t.faces.get(face))
                    .and_then(|f| f.binding_sites.get(index))
                    .ok_or_else(missing)?,
            ),
            Address::Titin { index } => Component::Titin(self.titin.get(index).ok_or_else(missing)?),
        };
        Ok(component)
    }

    /// Resolve an address that must name a cross-bridge
    pub fn resolve_crossbridge(&self, address: &Address) -> Result<&Crossbridge, AddressError> {
        match self.resolve(address)? {
            Component::Crossbridge(xb) => Ok(xb),
            other => Err(AddressError::WrongKind {
                address: *address,
                expected: "cross-bridge",
                found: other.kind(),
            }),
        }
    }

    /// Resolve an address that must name a binding site
    pub fn resolve_binding_site(&self, address: &Address) -> Result<&BindingSite, AddressError> {
        match self.resolve(address)? {
            Component::BindingSite(site) => Ok(site),
            other => Err(AddressError::WrongKind {
                address: *address,
                expected: "binding site",
                found: other.kind(),
            }),
        }
    }
}

impl Component<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Component::ThickFilament(_) => "thick filament",
            Component::ThickFace(_) => "thick face",
            Component::Crown(_) => "crown",
            Component::Crossbridge(_) => "cross-bridge",
            Component::ThinFilament(_) => "thin filament",
            Component::ThinFace(_) => "thin face",
            Component::BindingSite(_) => "binding site",
            Component::Titin(_) => "titin",
        }
    }
}
