// Joint-angle geometry: the two angle conventions used by the pipeline

use crate::models::pose::Keypoint;

/// Angle at vertex `b` between the rays b->a and b->c, in degrees [0, 180].
///
/// Dot-product form, direction-insensitive: a flexed limb reads the same
/// whichever way it points. The cosine is clamped to [-1, 1] before the
/// arccosine so floating-point drift on near-collinear triples cannot
/// produce NaN. Returns `None` when either ray has zero length (coincident
/// points), where the angle is undefined.
pub fn absolute_angle(a: &Keypoint, b: &Keypoint, c: &Keypoint) -> Option<f32> {
    let (bax, bay) = (a.x - b.x, a.y - b.y);
    let (bcx, bcy) = (c.x - b.x, c.y - b.y);

    let mag_ba = (bax * bax + bay * bay).sqrt();
    let mag_bc = (bcx * bcx + bcy * bcy).sqrt();
    if mag_ba == 0.0 || mag_bc == 0.0 {
        return None;
    }

    let cos = ((bax * bcx + bay * bcy) / (mag_ba * mag_bc)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Difference of the atan2 bearings b->c and b->a, absolute value, reduced
/// modulo 360; degrees in [0, 360).
///
/// Direction-sensitive, unlike [`absolute_angle`]: the two conventions
/// disagree on most triples, and downstream consumers are calibrated to one
/// or the other. Returns `None` when either ray has zero length, where the
/// bearing of (0, 0) would silently read as zero and skew the result.
pub fn directional_angle(a: &Keypoint, b: &Keypoint, c: &Keypoint) -> Option<f32> {
    if (a.x == b.x && a.y == b.y) || (c.x == b.x && c.y == b.y) {
        return None;
    }

    let delta = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    Some(delta.to_degrees().abs() % 360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(x: f32, y: f32) -> Keypoint {
        Keypoint::new(x, y, 1.0)
    }

    #[test]
    fn test_right_angle_reads_90_in_both_conventions() {
        // Shoulder straight left of the elbow, wrist straight below it.
        let shoulder = kp(0.0, 0.0);
        let elbow = kp(1.0, 0.0);
        let wrist = kp(1.0, 1.0);

        let abs = absolute_angle(&shoulder, &elbow, &wrist).unwrap();
        let dir = directional_angle(&shoulder, &elbow, &wrist).unwrap();
        assert!((abs - 90.0).abs() < 1e-3, "absolute angle was {}", abs);
        assert!((dir - 90.0).abs() < 1e-3, "directional angle was {}", dir);
    }

    #[test]
    fn test_collinear_triple_reads_180() {
        let a = kp(0.0, 0.0);
        let b = kp(1.0, 0.0);
        let c = kp(2.0, 0.0);

        let abs = absolute_angle(&a, &b, &c).unwrap();
        let dir = directional_angle(&a, &b, &c).unwrap();
        assert!((abs - 180.0).abs() < 1e-3);
        assert!((dir - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_absolute_angle_is_symmetric() {
        let a = kp(3.0, 1.0);
        let b = kp(0.5, -0.5);
        let c = kp(1.0, 4.0);

        let forward = absolute_angle(&a, &b, &c).unwrap();
        let reverse = absolute_angle(&c, &b, &a).unwrap();
        assert!(
            (forward - reverse).abs() < 1e-6,
            "swapping the outer points changed the angle: {} vs {}",
            forward,
            reverse
        );
    }

    #[test]
    fn test_conventions_disagree_on_reflex_configurations() {
        // Rays at bearings ~170 and ~-170 degrees: 20 degrees apart as an
        // absolute angle, 340 as a directional one.
        let a = kp(-0.9848, 0.1736);
        let b = kp(0.0, 0.0);
        let c = kp(-0.9848, -0.1736);

        let abs = absolute_angle(&a, &b, &c).unwrap();
        let dir = directional_angle(&a, &b, &c).unwrap();
        assert!((abs - 20.0).abs() < 0.01, "absolute angle was {}", abs);
        assert!((dir - 340.0).abs() < 0.01, "directional angle was {}", dir);
    }

    #[test]
    fn test_results_stay_in_range() {
        let triples = [
            (kp(1.0, 2.0), kp(0.0, 0.0), kp(-3.0, 1.0)),
            (kp(-1.0, -1.0), kp(2.0, 0.5), kp(4.0, -2.0)),
            (kp(0.0, 5.0), kp(0.0, 0.0), kp(0.1, -5.0)),
        ];
        for (a, b, c) in &triples {
            let abs = absolute_angle(a, b, c).unwrap();
            let dir = directional_angle(a, b, c).unwrap();
            assert!((0.0..=180.0).contains(&abs), "absolute out of range: {}", abs);
            assert!((0.0..360.0).contains(&dir), "directional out of range: {}", dir);
        }
    }

    #[test]
    fn test_degenerate_triples_are_undefined() {
        let p = kp(1.0, 1.0);
        let other = kp(2.0, 2.0);

        assert_eq!(absolute_angle(&p, &p, &other), None);
        assert_eq!(absolute_angle(&other, &p, &p), None);
        assert_eq!(directional_angle(&p, &p, &other), None);
        assert_eq!(directional_angle(&other, &p, &p), None);
    }
}
