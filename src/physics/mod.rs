//! Mechanochemistry of the half-sarcomere.
//!
//! This module implements:
//! - Two-state linear springs with thermal sampling
//! - Three-state myosin head kinetics
//! - Titin passive elasticity
//! - Block Gauss-Seidel force-balance relaxation
//!
//! References:
//! - Tanner BCW, Daniel TL, Regnier M. PLoS Comput Biol, 2007
//! - Williams CD, Regnier M, Daniel TL. PLoS Comput Biol, 2010
//! - Linke WA et al. J Mol Biol, 1998

pub mod head;
pub mod settle;
pub mod spring;
pub mod titin;

pub use head::{rate_to_probability, HeadKinetics, XbState, XbTransition};
pub use settle::{settle, ChainSystem, Relaxable, SettleReport};
pub use spring::{Spring, SpringState, KB_T_PN_NM};
pub use titin::Titin;
