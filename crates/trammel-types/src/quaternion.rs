//! Unit quaternions representing orientations. A quaternion maps the base
//! coordinate system's basis vectors onto a rotated basis (U, V, N); the
//! solver stores every 3D normal this way.

use serde::{Deserialize, Serialize};

use crate::vector::Vector;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        w: 1.0,
        vx: 0.0,
        vy: 0.0,
        vz: 0.0,
    };

    pub fn new(w: f64, vx: f64, vy: f64, vz: f64) -> Self {
        Self { w, vx, vy, vz }
    }

    pub fn from_axis_angle(axis: Vector, dtheta: f64) -> Self {
        let c = (dtheta / 2.0).cos();
        let s = (dtheta / 2.0).sin();
        let a = axis.with_magnitude(s);
        Self::new(c, a.x, a.y, a.z)
    }

    /// Build the unit quaternion whose rotated basis has the given U and V
    /// vectors. Branches on the largest diagonal element of the rotation
    /// matrix so the divisor stays well away from zero.
    pub fn from_basis(u: Vector, v: Vector) -> Self {
        let n = u.cross(v);

        let tr = 1.0 + u.x + v.y + n.z;
        let q = if tr > 1e-4 {
            let s = 2.0 * tr.sqrt();
            Self::new(
                s / 4.0,
                (v.z - n.y) / s,
                (n.x - u.z) / s,
                (u.y - v.x) / s,
            )
        } else if u.x > v.y && u.x > n.z {
            let s = 2.0 * (1.0 + u.x - v.y - n.z).sqrt();
            Self::new(
                (v.z - n.y) / s,
                s / 4.0,
                (u.y + v.x) / s,
                (n.x + u.z) / s,
            )
        } else if v.y > n.z {
            let s = 2.0 * (1.0 - u.x + v.y - n.z).sqrt();
            Self::new(
                (n.x - u.z) / s,
                (u.y + v.x) / s,
                s / 4.0,
                (v.z + n.y) / s,
            )
        } else {
            let s = 2.0 * (1.0 - u.x - v.y + n.z).sqrt();
            Self::new(
                (u.y - v.x) / s,
                (n.x + u.z) / s,
                (v.z + n.y) / s,
                s / 4.0,
            )
        };

        q.with_magnitude(1.0)
    }

    pub fn magnitude(self) -> f64 {
        (self.w * self.w + self.vx * self.vx + self.vy * self.vy + self.vz * self.vz).sqrt()
    }

    pub fn scaled_by(self, s: f64) -> Self {
        Self::new(self.w * s, self.vx * s, self.vy * s, self.vz * s)
    }

    pub fn with_magnitude(self, s: f64) -> Self {
        self.scaled_by(s / self.magnitude())
    }

    /// First basis vector of the rotated coordinate system.
    pub fn rotation_u(self) -> Vector {
        Vector::new(
            self.w * self.w + self.vx * self.vx - self.vy * self.vy - self.vz * self.vz,
            2.0 * self.w * self.vz + 2.0 * self.vx * self.vy,
            2.0 * self.vx * self.vz - 2.0 * self.w * self.vy,
        )
    }

    /// Second basis vector of the rotated coordinate system.
    pub fn rotation_v(self) -> Vector {
        Vector::new(
            2.0 * self.vx * self.vy - 2.0 * self.w * self.vz,
            self.w * self.w - self.vx * self.vx + self.vy * self.vy - self.vz * self.vz,
            2.0 * self.w * self.vx + 2.0 * self.vy * self.vz,
        )
    }

    /// Normal (third basis vector) of the rotated coordinate system.
    pub fn rotation_n(self) -> Vector {
        Vector::new(
            2.0 * self.w * self.vy + 2.0 * self.vx * self.vz,
            2.0 * self.vy * self.vz - 2.0 * self.w * self.vx,
            self.w * self.w - self.vx * self.vx - self.vy * self.vy + self.vz * self.vz,
        )
    }

    /// Express a point in the rotated basis.
    pub fn rotate(self, p: Vector) -> Vector {
        self.rotation_u().scaled_by(p.x)
            + self.rotation_v().scaled_by(p.y)
            + self.rotation_n().scaled_by(p.z)
    }

    /// Hamilton product.
    pub fn times(self, b: Self) -> Self {
        let (sa, sb) = (self.w, b.w);
        let va = Vector::new(self.vx, self.vy, self.vz);
        let vb = Vector::new(b.vx, b.vy, b.vz);

        let vr = vb.scaled_by(sa) + va.scaled_by(sb) + va.cross(vb);
        Self::new(sa * sb - va.dot(vb), vr.x, vr.y, vr.z)
    }

    pub fn inverse(self) -> Self {
        Self::new(self.w, -self.vx, -self.vy, -self.vz).with_magnitude(1.0)
    }

    /// The orientation with both U and V negated (N unchanged).
    pub fn mirror(self) -> Self {
        let u = -self.rotation_u();
        let v = -self.rotation_v();
        Self::from_basis(u, v)
    }
}
