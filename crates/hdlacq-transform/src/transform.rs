//! Mounting transform.
//!
//! A [`Pose`] (origin + yaw/pitch/roll in degrees) is turned into the affine
//! map `Y = R·X + T` expressed as a homogeneous [`Matrix4`].
//!
//! Operations are accumulated scene-graph style: each call to
//! [`Matrix4::translate`] / [`Matrix4::rotate_z`] etc. right-multiplies onto
//! the matrix built so far.  Writing translate, yaw, pitch, roll therefore
//! yields `T · Rz(yaw) · Ry(pitch) · Rx(roll)`, which applied to a column
//! vector rolls first, then pitches, then yaws, then translates.  Calibration
//! files in the field were produced with exactly this order.
//!
//! # Example
//!
//! ```rust
//! use hdlacq_transform::{pose_transform, Vec3};
//! use hdlacq_types::Pose;
//!
//! let m = pose_transform(&Pose::new(1.0, 2.0, 3.0, 90.0, 0.0, 0.0));
//! let p = m.transform_point(Vec3::new(1.0, 0.0, 0.0));
//! assert!((p.x - 1.0).abs() < 1e-9);
//! assert!((p.y - 3.0).abs() < 1e-9);
//! assert!((p.z - 3.0).abs() < 1e-9);
//! ```

use hdlacq_types::Pose;
use serde::Serialize;

// ────────────────────────────────────────────────────────────────────────────
// Primitive types
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D vector / point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// `(sin, cos)` of an angle given in degrees.
///
/// Quarter turns return exact values so that a 90° mounting does not leak
/// `6e-17` terms into otherwise axis-aligned matrices.
fn sin_cos_degrees(degrees: f64) -> (f64, f64) {
    let turns = degrees.rem_euclid(360.0);
    if turns == 0.0 {
        (0.0, 1.0)
    } else if turns == 90.0 {
        (1.0, 0.0)
    } else if turns == 180.0 {
        (0.0, -1.0)
    } else if turns == 270.0 {
        (-1.0, 0.0)
    } else {
        degrees.to_radians().sin_cos()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Matrix4
// ────────────────────────────────────────────────────────────────────────────

/// Row-major 4×4 homogeneous matrix (`m[row][col]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Matrix4 {
    pub m: [[f64; 4]; 4],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4 {
    pub fn identity() -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self { m }
    }

    /// Pure translation by `(x, y, z)`.
    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        let mut t = Self::identity();
        t.m[0][3] = x;
        t.m[1][3] = y;
        t.m[2][3] = z;
        t
    }

    /// Right-handed rotation about X by `degrees`.
    pub fn rotation_x(degrees: f64) -> Self {
        let (s, c) = sin_cos_degrees(degrees);
        let mut r = Self::identity();
        r.m[1][1] = c;
        r.m[1][2] = -s;
        r.m[2][1] = s;
        r.m[2][2] = c;
        r
    }

    /// Right-handed rotation about Y by `degrees`.
    pub fn rotation_y(degrees: f64) -> Self {
        let (s, c) = sin_cos_degrees(degrees);
        let mut r = Self::identity();
        r.m[0][0] = c;
        r.m[0][2] = s;
        r.m[2][0] = -s;
        r.m[2][2] = c;
        r
    }

    /// Right-handed rotation about Z by `degrees`.
    pub fn rotation_z(degrees: f64) -> Self {
        let (s, c) = sin_cos_degrees(degrees);
        let mut r = Self::identity();
        r.m[0][0] = c;
        r.m[0][1] = -s;
        r.m[1][0] = s;
        r.m[1][1] = c;
        r
    }

    /// Matrix product `self · rhs`.
    pub fn mul(&self, rhs: &Self) -> Self {
        let mut out = [[0.0; 4]; 4];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[i][k] * rhs.m[k][j]).sum();
            }
        }
        Self { m: out }
    }

    /// Accumulate a translation: `self = self · T`.
    pub fn translate(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        *self = self.mul(&Self::translation(x, y, z));
        self
    }

    /// Accumulate a rotation about X: `self = self · Rx`.
    pub fn rotate_x(&mut self, degrees: f64) -> &mut Self {
        *self = self.mul(&Self::rotation_x(degrees));
        self
    }

    /// Accumulate a rotation about Y: `self = self · Ry`.
    pub fn rotate_y(&mut self, degrees: f64) -> &mut Self {
        *self = self.mul(&Self::rotation_y(degrees));
        self
    }

    /// Accumulate a rotation about Z: `self = self · Rz`.
    pub fn rotate_z(&mut self, degrees: f64) -> &mut Self {
        *self = self.mul(&Self::rotation_z(degrees));
        self
    }

    /// Apply to a point (w = 1).
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let row = |i: usize| self.m[i][0] * p.x + self.m[i][1] * p.y + self.m[i][2] * p.z + self.m[i][3];
        Vec3::new(row(0), row(1), row(2))
    }

    /// Apply to a direction (w = 0); translation is ignored.
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let row = |i: usize| self.m[i][0] * v.x + self.m[i][1] * v.y + self.m[i][2] * v.z;
        Vec3::new(row(0), row(1), row(2))
    }

    /// Upper-left 3×3 block.
    pub fn rotation_part(&self) -> [[f64; 3]; 3] {
        let mut r = [[0.0; 3]; 3];
        for (i, row) in r.iter_mut().enumerate() {
            row.copy_from_slice(&self.m[i][..3]);
        }
        r
    }

    pub fn translation_part(&self) -> Vec3 {
        Vec3::new(self.m[0][3], self.m[1][3], self.m[2][3])
    }

    /// `true` when the rotation block is orthonormal with determinant +1 and
    /// the bottom row is `[0, 0, 0, 1]`, within `tol`.
    pub fn is_rigid(&self, tol: f64) -> bool {
        let r = self.rotation_part();
        for i in 0..3 {
            for j in 0..3 {
                let dot: f64 = (0..3).map(|k| r[k][i] * r[k][j]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                if (dot - expected).abs() > tol {
                    return false;
                }
            }
        }
        let det = r[0][0] * (r[1][1] * r[2][2] - r[1][2] * r[2][1])
            - r[0][1] * (r[1][0] * r[2][2] - r[1][2] * r[2][0])
            + r[0][2] * (r[1][0] * r[2][1] - r[1][1] * r[2][0]);
        let bottom = self.m[3];
        (det - 1.0).abs() <= tol
            && bottom[0].abs() <= tol
            && bottom[1].abs() <= tol
            && bottom[2].abs() <= tol
            && (bottom[3] - 1.0).abs() <= tol
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pose → matrix
// ────────────────────────────────────────────────────────────────────────────

/// Compute `T(origin) · Rz(yaw) · Ry(pitch) · Rx(roll)` for `pose`.
pub fn pose_transform(pose: &Pose) -> Matrix4 {
    let mut transform = Matrix4::identity();
    transform
        .translate(pose.origin_x, pose.origin_y, pose.origin_z)
        .rotate_z(pose.yaw)
        .rotate_y(pose.pitch)
        .rotate_x(pose.roll);
    transform
}

impl From<&Pose> for Matrix4 {
    fn from(pose: &Pose) -> Self {
        pose_transform(pose)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
