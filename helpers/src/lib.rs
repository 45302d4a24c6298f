pub mod buffer;
pub mod general;
pub mod geometry;

#[cfg(test)]
mod buffer_tests {
    use crate::buffer::RingBuffer;
    use approx::assert_ulps_eq;

    #[test]
    fn test_ringbuffer_empty() {
        let x: RingBuffer<u32> = RingBuffer::new(5);
        assert!(x.get_avg().is_none());
        assert!(x.is_empty());
    }
    #[test]
    fn test_ringbuffer_partially_filled() {
        let mut x: RingBuffer<u32> = RingBuffer::new(5);
        x.push(3);
        x.push(4);
        assert_eq!(x.len(), 2);
        assert_ulps_eq!(x.get_avg().unwrap(), 3.5);
    }
    #[test]
    fn test_ringbuffer_overwrites_oldest() {
        let mut x: RingBuffer<u32> = RingBuffer::new(5);
        for val in [3, 4, 2, 1, 5, 10] {
            x.push(val);
        }
        assert_eq!(x.len(), 5);
        assert_ulps_eq!(x.get_avg().unwrap(), 4.4);
    }
    #[test]
    fn test_ringbuffer_zero_capacity() {
        let mut x: RingBuffer<f64> = RingBuffer::new(0);
        x.push(1.0);
        x.push(2.0);
        assert_eq!(x.len(), 1);
        assert_ulps_eq!(x.get_avg().unwrap(), 2.0);
    }
}

#[cfg(test)]
mod general_tests {
    use crate::general::{argmax, argsort, is_strictly_increasing, lin_interp, max, SortOrder};
    use approx::assert_ulps_eq;

    #[test]
    fn test_argmax() {
        let x: Vec<f64> = vec![3.0, -1.0, 5.0, 8.0, -2.0];
        assert_eq!(argmax(&x), 3);
    }
    #[test]
    fn test_argmax_first_of_equal() {
        let x: Vec<u32> = vec![2, 7, 7, 1];
        assert_eq!(argmax(&x), 1);
    }

    #[test]
    fn test_max() {
        let x: Vec<f64> = vec![3.0, -1.0, 5.0, 8.0, -2.0];
        assert_ulps_eq!(max(&x), 8.0);
    }

    #[test]
    fn test_argsort_ascending() {
        let x: Vec<f64> = vec![3.0, -1.0, 5.0, 8.0, -2.0];
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![4, 1, 0, 2, 3]);
    }
    #[test]
    fn test_argsort_descending() {
        let x: Vec<i32> = vec![3, -1, 5, 8, -2];
        assert_eq!(argsort(&x, SortOrder::Descending), vec![3, 2, 0, 1, 4]);
    }
    #[test]
    fn test_argsort_is_stable() {
        let x: Vec<f64> = vec![1.0, 2.0, 1.0, 2.0];
        assert_eq!(argsort(&x, SortOrder::Descending), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_lin_interp_inside() {
        let xp: Vec<f64> = vec![-5.0, 0.0, 5.0, 10.0];
        let fp: Vec<f64> = vec![1.0, 2.0, 1.0, 0.0];
        assert_ulps_eq!(lin_interp(-2.5, &xp, &fp), 1.5);
        assert_ulps_eq!(lin_interp(7.5, &xp, &fp), 0.5);
    }
    #[test]
    fn test_lin_interp_clamped() {
        let xp: Vec<f64> = vec![0.0, 1.0];
        let fp: Vec<f64> = vec![0.0, 2.0];
        assert_ulps_eq!(lin_interp(-1.0, &xp, &fp), 0.0);
        assert_ulps_eq!(lin_interp(3.0, &xp, &fp), 2.0);
    }

    #[test]
    fn test_is_strictly_increasing() {
        assert!(is_strictly_increasing(&[0.0, 0.5, 1.0]));
        assert!(!is_strictly_increasing(&[0.0, 0.5, 0.5]));
    }
}

#[cfg(test)]
mod geometry_tests {
    use crate::geometry::{normalize_angle, wrap_to_pi, Point2d, Vector2d};
    use approx::assert_ulps_eq;
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    #[test]
    fn test_vector2d_sub_add() {
        let v1 = Vector2d { dx: 5.0, dy: 5.0 };
        let v2 = Vector2d { dx: 2.0, dy: -1.0 };
        assert_eq!(v1.sub(&v2), Vector2d { dx: 3.0, dy: 6.0 });
        assert_eq!(v1.add(&v2), Vector2d { dx: 7.0, dy: 4.0 });
    }
    #[test]
    fn test_vector2d_dot_cross() {
        let v1 = Vector2d { dx: 5.0, dy: 5.0 };
        let v2 = Vector2d { dx: 2.0, dy: -1.0 };
        assert_ulps_eq!(v1.dot(&v2), 5.0);
        assert_ulps_eq!(v1.cross(&v2), -15.0);
    }
    #[test]
    fn test_vector2d_normalized() {
        let v1 = Vector2d { dx: 5.0, dy: 5.0 };
        assert_eq!(
            v1.normalized(),
            Vector2d {
                dx: 5.0 / 50.0_f64.sqrt(),
                dy: 5.0 / 50.0_f64.sqrt()
            }
        );
    }
    #[test]
    fn test_vector2d_heading() {
        assert_ulps_eq!(Vector2d { dx: 0.0, dy: 2.0 }.heading(), FRAC_PI_2);
        assert_ulps_eq!(Vector2d { dx: 0.0, dy: -2.0 }.heading(), 1.5 * PI);
        assert_eq!(
            Vector2d::from_heading(FRAC_PI_2),
            Vector2d {
                dx: FRAC_PI_2.cos(),
                dy: 1.0
            }
        );
    }
    #[test]
    fn test_point2d_distance() {
        let p1 = Point2d::new(1.0, 1.0);
        let p2 = Point2d::new(4.0, 5.0);
        assert_ulps_eq!(p1.distance(&p2), 5.0);
    }
    #[test]
    fn test_normalize_angle() {
        assert_ulps_eq!(normalize_angle(-FRAC_PI_2), 1.5 * PI);
        assert_ulps_eq!(normalize_angle(TAU + 1.0), 1.0);
        assert!(normalize_angle(-1e-18) < TAU);
    }
    #[test]
    fn test_wrap_to_pi() {
        assert_ulps_eq!(wrap_to_pi(1.5 * PI), -FRAC_PI_2);
        assert_ulps_eq!(wrap_to_pi(FRAC_PI_2), FRAC_PI_2);
    }
}
