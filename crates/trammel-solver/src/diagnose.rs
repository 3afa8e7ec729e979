//! When a solve fails as inconsistent or redundant, isolate the smallest
//! set of constraints whose removal would make the system solvable. The
//! search works on the numeric Jacobian the kernel already evaluated:
//! removing a constraint removes its rows, and a constraint belongs in the
//! bad list exactly when that removal shrinks the rank deficit.

use nalgebra::DMatrix;
use tracing::debug;

use trammel_types::HConstraint;

use crate::system::matrix_rank;

/// Walk the group's constraints in reverse creation order, dropping each
/// candidate's rows and re-ranking; keep every constraint whose removal
/// strictly decreases the deficit, stopping once the list accounts for the
/// whole of it. O(constraints × rank cost), so gated behind the caller's
/// explicit request.
pub fn find_bad_constraints(
    jacobian: &DMatrix<f64>,
    row_owners: &[HConstraint],
    constraints_newest_first: &[HConstraint],
) -> Vec<HConstraint> {
    let m = jacobian.nrows();
    debug_assert_eq!(m, row_owners.len());

    let rank = matrix_rank(jacobian);
    let deficit = m - rank;
    if deficit == 0 {
        return Vec::new();
    }

    let mut bad = Vec::new();
    for &ch in constraints_newest_first {
        if ch.is_none() {
            continue;
        }
        let kept: Vec<usize> = (0..m).filter(|&i| row_owners[i] != ch).collect();
        if kept.len() == m {
            continue; // no rows in this system
        }

        let sub = select_rows(jacobian, &kept);
        let sub_rank = matrix_rank(&sub);
        let sub_deficit = kept.len() - sub_rank;
        if sub_deficit < deficit {
            bad.push(ch);
        }
        if bad.len() == deficit {
            break;
        }
    }

    debug!(deficit, bad = bad.len(), "diagnostic search finished");
    bad
}

fn select_rows(a: &DMatrix<f64>, rows: &[usize]) -> DMatrix<f64> {
    let n = a.ncols();
    let mut out = DMatrix::zeros(rows.len(), n);
    for (k, &r) in rows.iter().enumerate() {
        for c in 0..n {
            out[(k, c)] = a[(r, c)];
        }
    }
    out
}
