use crate::core::collision::{Body, Shape};
use crate::core::traffic::TrafficLightPars;
use helpers::geometry::{Point2d, Vector2d};
use serde::Deserialize;

/// * `position` - (m) Center of the obstacle
/// * `heading` - (rad) Orientation of the obstacle (only relevant for rectangles)
/// * `shape` - Bounding shape of the obstacle, e.g. a building or a barrier
#[derive(Debug, Deserialize, Clone)]
pub struct ObstaclePars {
    pub position: Point2d,
    #[serde(default)]
    pub heading: f64,
    pub shape: Shape,
}

/// * `name` - Track name
/// * `waypoints` - (m) Ordered waypoints of the racing line, the first waypoint marks the start
/// and finish line
/// * `closed` - True if the path is a loop (last waypoint connects to the first one), false for a
/// sprint from the first to the last waypoint
/// * `gate_half_width` - (m) Half width of the gate through each waypoint that must be crossed to
/// count it as passed
/// * `obstacles` - Static obstacles such as buildings and barriers
/// * `traffic_lights` - Traffic lights, each one guards a waypoint
#[derive(Debug, Deserialize, Clone)]
pub struct TrackPars {
    pub name: String,
    pub waypoints: Vec<Point2d>,
    pub closed: bool,
    pub gate_half_width: f64,
    #[serde(default)]
    pub obstacles: Vec<ObstaclePars>,
    #[serde(default)]
    pub traffic_lights: Vec<TrafficLightPars>,
}

#[derive(Debug, Clone)]
pub struct Track {
    pub name: String,
    pub waypoints: Vec<Point2d>,
    pub closed: bool,
    pub gate_half_width: f64,
    pub obstacles: Vec<ObstaclePars>,
    seg_lengths: Vec<f64>, // length of the segment starting at the waypoint with the same index
    gate_dirs: Vec<Vector2d>,
}

impl Track {
    pub fn new(track_pars: &TrackPars) -> Track {
        let no_wps = track_pars.waypoints.len();

        let mut track = Track {
            name: track_pars.name.to_owned(),
            waypoints: track_pars.waypoints.to_owned(),
            closed: track_pars.closed,
            gate_half_width: track_pars.gate_half_width,
            obstacles: track_pars.obstacles.to_owned(),
            seg_lengths: Vec::with_capacity(no_wps),
            gate_dirs: Vec::with_capacity(no_wps),
        };

        for idx in 0..no_wps {
            let seg_length = match track.next_idx(idx) {
                Some(idx_next) => track.waypoints[idx].distance(&track.waypoints[idx_next]),
                None => 0.0,
            };
            track.seg_lengths.push(seg_length);
        }

        for idx in 0..no_wps {
            let gate_dir = track.calc_gate_direction(idx);
            track.gate_dirs.push(gate_dir);
        }

        track
    }

    pub fn no_waypoints(&self) -> usize {
        self.waypoints.len()
    }

    /// next_idx returns the index of the waypoint following idx. On an open path there is no
    /// successor of the last waypoint.
    pub fn next_idx(&self, idx: usize) -> Option<usize> {
        let no_wps = self.no_waypoints();

        if idx + 1 < no_wps {
            Some(idx + 1)
        } else if self.closed && no_wps > 1 {
            Some(0)
        } else {
            None
        }
    }

    /// prev_idx returns the index of the waypoint preceding idx.
    pub fn prev_idx(&self, idx: usize) -> Option<usize> {
        if idx > 0 {
            Some(idx - 1)
        } else if self.closed && self.no_waypoints() > 1 {
            Some(self.no_waypoints() - 1)
        } else {
            None
        }
    }

    /// get_length returns the total length of the path (including the closing segment on a loop).
    pub fn get_length(&self) -> f64 {
        self.seg_lengths.iter().sum()
    }

    pub fn get_seg_length(&self, idx: usize) -> f64 {
        self.seg_lengths[idx]
    }

    /// dist_along_path returns the distance from the position via the waypoint target_idx along
    /// the path to the waypoint goal_idx. None is returned if the goal cannot be reached without
    /// passing the end of an open path.
    pub fn dist_along_path(&self, pos: &Point2d, target_idx: usize, goal_idx: usize) -> Option<f64> {
        let mut dist = pos.distance(&self.waypoints[target_idx]);
        let mut idx = target_idx;

        while idx != goal_idx {
            dist += self.seg_lengths[idx];
            idx = self.next_idx(idx)?;
        }

        Some(dist)
    }

    /// crossed_gate checks if the movement from pos_prev to pos_cur crosses the gate of the
    /// waypoint in driving direction. In that case, the fraction of the movement before the
    /// crossing is returned (in the range [0.0, 1.0]).
    pub fn crossed_gate(&self, idx: usize, pos_prev: &Point2d, pos_cur: &Point2d) -> Option<f64> {
        let wp = &self.waypoints[idx];
        let gate_dir = &self.gate_dirs[idx];

        let s_prev = wp.vector_to(pos_prev).dot(gate_dir);
        let s_cur = wp.vector_to(pos_cur).dot(gate_dir);

        if !(s_prev < 0.0 && s_cur >= 0.0) {
            return None;
        }

        let frac = -s_prev / (s_cur - s_prev);
        let pos_cross = pos_prev.shift(&pos_prev.vector_to(pos_cur).mult(frac));
        let lateral = wp.vector_to(&pos_cross).dot(&gate_dir.normal_vector()).abs();

        if lateral <= self.gate_half_width {
            Some(frac)
        } else {
            None
        }
    }

    /// is_on_or_past_gate checks if the position lies on the gate of the waypoint or in front of
    /// it in driving direction (within the gate width).
    pub fn is_on_or_past_gate(&self, idx: usize, pos: &Point2d) -> bool {
        let wp = &self.waypoints[idx];
        let gate_dir = &self.gate_dirs[idx];
        let rel = wp.vector_to(pos);

        rel.dot(gate_dir) >= 0.0 && rel.dot(&gate_dir.normal_vector()).abs() <= self.gate_half_width
    }

    /// get_obstacle_bodies returns the collision bodies of all static obstacles.
    pub fn get_obstacle_bodies(&self) -> Vec<Body> {
        self.obstacles
            .iter()
            .map(|obstacle| Body {
                center: obstacle.position,
                heading: obstacle.heading,
                shape: obstacle.shape,
            })
            .collect()
    }

    /// calc_gate_direction returns the driving direction at the waypoint, i.e. the bisector of the
    /// incoming and the outgoing segment. The gate itself is perpendicular to it.
    fn calc_gate_direction(&self, idx: usize) -> Vector2d {
        let wp = &self.waypoints[idx];

        let dir_in = self
            .prev_idx(idx)
            .map(|idx_prev| self.waypoints[idx_prev].vector_to(wp))
            .filter(|v| v.abs() > 1e-9)
            .map(|v| v.normalized());
        let dir_out = self
            .next_idx(idx)
            .map(|idx_next| wp.vector_to(&self.waypoints[idx_next]))
            .filter(|v| v.abs() > 1e-9)
            .map(|v| v.normalized());

        match (dir_in, dir_out) {
            (Some(d_in), Some(d_out)) => {
                let bisector = d_in.add(&d_out);

                // a reversing path has no bisector, the incoming direction is used then
                if bisector.abs() > 1e-9 {
                    bisector.normalized()
                } else {
                    d_in
                }
            }
            (Some(d_in), None) => d_in,
            (None, Some(d_out)) => d_out,
            (None, None) => Vector2d { dx: 1.0, dy: 0.0 },
        }
    }
}
