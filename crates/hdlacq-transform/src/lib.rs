//! `hdlacq-transform` – mounting geometry.
//!
//! Turns the operator-entered sensor and GPS mounting offsets into the 4×4
//! homogeneous matrices that the acquisition pipeline applies to every point.
//!
//! # Modules
//!
//! - [`transform`] – [`Matrix4`][transform::Matrix4] and
//!   [`pose_transform`][transform::pose_transform]: composes a translation
//!   and yaw/pitch/roll rotations into `Y = T · Rz · Ry · Rx · X`.

pub mod transform;

pub use transform::{Matrix4, Vec3, pose_transform};
