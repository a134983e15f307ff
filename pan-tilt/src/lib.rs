//! Pan/tilt is the kinematics kernel of a two-actuator spherical parallel
//! linkage.
//!
//! Two rotary actuators sit symmetrically around a reference pole. Each one
//! drives a two-link arm, and both arms meet at a common end-effector point on
//! the unit sphere. This crate provides:
//!
//! + [`Linkage`], the calibrated inverse kinematics model.
//! + [`Cone::link_lengths`], which derives arm lengths from actuator placement.
//! + [`Sweep`], a design-space search over actuator placements.
//!
//! ```
//! use pan_tilt::{Geometry, Linkage};
//!
//! let geo = Geometry::new_degrees(45., 9., 90., 51.265, 68.735).unwrap();
//! let linkage = Linkage::new(geo).unwrap();
//! assert_eq!(linkage.ik(0., 0.).unwrap(), [0., 0.]);
//! let [a, b] = linkage.ik(45., 0.).unwrap();
//! assert!(a.is_finite() && b.is_finite());
//! ```
#![cfg_attr(doc_cfg, feature(doc_cfg))]
pub use crate::{drive::*, error::*, geometry::*, linkage::*, links::*, pose::*, sweep::*};

macro_rules! impl_builders {
    ($($(#[$meta:meta])* fn $name:ident($ty:ty))+) => {$(
        $(#[$meta])*
        pub fn $name(self, $name: $ty) -> Self {
            Self { $name, ..self }
        }
    )+};
}

#[cfg(feature = "csv")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "csv")))]
pub mod csv;
mod drive;
mod error;
mod geometry;
mod linkage;
mod links;
mod pose;
mod sweep;
#[cfg(test)]
mod tests;
