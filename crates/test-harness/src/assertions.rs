//! Assertion helpers shared by the integration suites.

use trammel_types::Vector;

pub fn assert_near(actual: f64, expected: f64, tol: f64, what: &str) {
    assert!(
        (actual - expected).abs() < tol,
        "{what}: got {actual:.9}, expected {expected:.9} (tol {tol:e})"
    );
}

pub fn assert_vec_near(actual: Vector, expected: Vector, tol: f64, what: &str) {
    assert!(
        (actual - expected).magnitude() < tol,
        "{what}: got ({:.6}, {:.6}, {:.6}), expected ({:.6}, {:.6}, {:.6}) (tol {tol:e})",
        actual.x,
        actual.y,
        actual.z,
        expected.x,
        expected.y,
        expected.z,
    );
}
