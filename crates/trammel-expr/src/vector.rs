//! Symbolic 3-vectors and quaternions: small bundles of expression refs
//! with the vector algebra the equation emitter writes residuals in.

use trammel_types::{HParam, Quaternion, Vector};

use crate::arena::{ExprArena, ExprRef};

#[derive(Debug, Clone, Copy)]
pub struct ExprVector {
    pub x: ExprRef,
    pub y: ExprRef,
    pub z: ExprRef,
}

impl ExprVector {
    pub fn from_refs(x: ExprRef, y: ExprRef, z: ExprRef) -> Self {
        Self { x, y, z }
    }

    pub fn from_params(hx: HParam, hy: HParam, hz: HParam, ar: &mut ExprArena) -> Self {
        Self {
            x: ar.param(hx),
            y: ar.param(hy),
            z: ar.param(hz),
        }
    }

    pub fn from_num(v: Vector, ar: &mut ExprArena) -> Self {
        Self {
            x: ar.constant(v.x),
            y: ar.constant(v.y),
            z: ar.constant(v.z),
        }
    }

    pub fn plus(self, b: Self, ar: &mut ExprArena) -> Self {
        Self {
            x: ar.plus(self.x, b.x),
            y: ar.plus(self.y, b.y),
            z: ar.plus(self.z, b.z),
        }
    }

    pub fn minus(self, b: Self, ar: &mut ExprArena) -> Self {
        Self {
            x: ar.minus(self.x, b.x),
            y: ar.minus(self.y, b.y),
            z: ar.minus(self.z, b.z),
        }
    }

    pub fn dot(self, b: Self, ar: &mut ExprArena) -> ExprRef {
        let xx = ar.times(self.x, b.x);
        let yy = ar.times(self.y, b.y);
        let zz = ar.times(self.z, b.z);
        let s = ar.plus(xx, yy);
        ar.plus(s, zz)
    }

    pub fn cross(self, b: Self, ar: &mut ExprArena) -> Self {
        let yz = ar.times(self.y, b.z);
        let zy = ar.times(self.z, b.y);
        let zx = ar.times(self.z, b.x);
        let xz = ar.times(self.x, b.z);
        let xy = ar.times(self.x, b.y);
        let yx = ar.times(self.y, b.x);
        Self {
            x: ar.minus(yz, zy),
            y: ar.minus(zx, xz),
            z: ar.minus(xy, yx),
        }
    }

    pub fn scaled_by(self, s: ExprRef, ar: &mut ExprArena) -> Self {
        Self {
            x: ar.times(self.x, s),
            y: ar.times(self.y, s),
            z: ar.times(self.z, s),
        }
    }

    pub fn negated(self, ar: &mut ExprArena) -> Self {
        Self {
            x: ar.negate(self.x),
            y: ar.negate(self.y),
            z: ar.negate(self.z),
        }
    }

    pub fn magnitude(self, ar: &mut ExprArena) -> ExprRef {
        let xx = ar.square(self.x);
        let yy = ar.square(self.y);
        let zz = ar.square(self.z);
        let s = ar.plus(xx, yy);
        let s = ar.plus(s, zz);
        ar.sqrt(s)
    }

    pub fn with_magnitude(self, s: ExprRef, ar: &mut ExprArena) -> Self {
        let m = self.magnitude(ar);
        let k = ar.div(s, m);
        self.scaled_by(k, ar)
    }

    pub fn eval_with<F: Fn(HParam) -> f64>(self, ar: &ExprArena, lookup: &F) -> Vector {
        Vector::new(
            ar.eval_with(self.x, lookup),
            ar.eval_with(self.y, lookup),
            ar.eval_with(self.z, lookup),
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExprQuaternion {
    pub w: ExprRef,
    pub vx: ExprRef,
    pub vy: ExprRef,
    pub vz: ExprRef,
}

impl ExprQuaternion {
    pub fn from_params(
        w: HParam,
        vx: HParam,
        vy: HParam,
        vz: HParam,
        ar: &mut ExprArena,
    ) -> Self {
        Self {
            w: ar.param(w),
            vx: ar.param(vx),
            vy: ar.param(vy),
            vz: ar.param(vz),
        }
    }

    pub fn from_num(q: Quaternion, ar: &mut ExprArena) -> Self {
        Self {
            w: ar.constant(q.w),
            vx: ar.constant(q.vx),
            vy: ar.constant(q.vy),
            vz: ar.constant(q.vz),
        }
    }

    /// U basis vector of the rotated csys, written out exactly:
    /// `(w² + vx² − vy² − vz², 2(w·vz + vx·vy), 2(vx·vz − w·vy))`.
    pub fn rotation_u(self, ar: &mut ExprArena) -> ExprVector {
        let two = ar.constant(2.0);

        let ww = ar.square(self.w);
        let xx = ar.square(self.vx);
        let yy = ar.square(self.vy);
        let zz = ar.square(self.vz);
        let ux = ar.plus(ww, xx);
        let ux = ar.minus(ux, yy);
        let ux = ar.minus(ux, zz);

        let wz = ar.times(self.w, self.vz);
        let wz2 = ar.times(two, wz);
        let xy = ar.times(self.vx, self.vy);
        let xy2 = ar.times(two, xy);
        let uy = ar.plus(wz2, xy2);

        let xz = ar.times(self.vx, self.vz);
        let xz2 = ar.times(two, xz);
        let wy = ar.times(self.w, self.vy);
        let wy2 = ar.times(two, wy);
        let uz = ar.minus(xz2, wy2);

        ExprVector::from_refs(ux, uy, uz)
    }

    pub fn rotation_v(self, ar: &mut ExprArena) -> ExprVector {
        let two = ar.constant(2.0);

        let xy = ar.times(self.vx, self.vy);
        let xy2 = ar.times(two, xy);
        let wz = ar.times(self.w, self.vz);
        let wz2 = ar.times(two, wz);
        let vx = ar.minus(xy2, wz2);

        let ww = ar.square(self.w);
        let xx = ar.square(self.vx);
        let yy = ar.square(self.vy);
        let zz = ar.square(self.vz);
        let vy = ar.minus(ww, xx);
        let vy = ar.plus(vy, yy);
        let vy = ar.minus(vy, zz);

        let wx = ar.times(self.w, self.vx);
        let wx2 = ar.times(two, wx);
        let yz = ar.times(self.vy, self.vz);
        let yz2 = ar.times(two, yz);
        let vz = ar.plus(wx2, yz2);

        ExprVector::from_refs(vx, vy, vz)
    }

    pub fn rotation_n(self, ar: &mut ExprArena) -> ExprVector {
        let two = ar.constant(2.0);

        let wy = ar.times(self.w, self.vy);
        let wy2 = ar.times(two, wy);
        let xz = ar.times(self.vx, self.vz);
        let xz2 = ar.times(two, xz);
        let nx = ar.plus(wy2, xz2);

        let yz = ar.times(self.vy, self.vz);
        let yz2 = ar.times(two, yz);
        let wx = ar.times(self.w, self.vx);
        let wx2 = ar.times(two, wx);
        let ny = ar.minus(yz2, wx2);

        let ww = ar.square(self.w);
        let xx = ar.square(self.vx);
        let yy = ar.square(self.vy);
        let zz = ar.square(self.vz);
        let nz = ar.minus(ww, xx);
        let nz = ar.minus(nz, yy);
        let nz = ar.plus(nz, zz);

        ExprVector::from_refs(nx, ny, nz)
    }

    /// Express a point in the rotated basis.
    pub fn rotate(self, p: ExprVector, ar: &mut ExprArena) -> ExprVector {
        let u = self.rotation_u(ar).scaled_by(p.x, ar);
        let v = self.rotation_v(ar).scaled_by(p.y, ar);
        let n = self.rotation_n(ar).scaled_by(p.z, ar);
        u.plus(v, ar).plus(n, ar)
    }

    /// Hamilton product.
    pub fn times(self, b: Self, ar: &mut ExprArena) -> Self {
        let va = ExprVector::from_refs(self.vx, self.vy, self.vz);
        let vb = ExprVector::from_refs(b.vx, b.vy, b.vz);

        let sasb = ar.times(self.w, b.w);
        let dot = va.dot(vb, ar);
        let w = ar.minus(sasb, dot);

        let vb_sa = vb.scaled_by(self.w, ar);
        let va_sb = va.scaled_by(b.w, ar);
        let cr = va.cross(vb, ar);
        let vr = vb_sa.plus(va_sb.plus(cr, ar), ar);

        Self {
            w,
            vx: vr.x,
            vy: vr.y,
            vz: vr.z,
        }
    }

    pub fn magnitude(self, ar: &mut ExprArena) -> ExprRef {
        let ww = ar.square(self.w);
        let xx = ar.square(self.vx);
        let yy = ar.square(self.vy);
        let zz = ar.square(self.vz);
        let s = ar.plus(ww, xx);
        let s = ar.plus(s, yy);
        let s = ar.plus(s, zz);
        ar.sqrt(s)
    }
}
