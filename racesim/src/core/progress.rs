use crate::core::track::Track;
use helpers::geometry::Point2d;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Racing,
    Finished,
    Retired,
}

/// The ProgressHandler contains a statemachine that tracks if a car is still racing, and it keeps
/// track of the car's race progress along the waypoints of the track.
///
/// Possible statemachine states:
/// * `Racing` -> active from the race start until the car takes the chequered flag
/// * `Finished` -> reachable from state `Racing` by external method call when the car crosses the
/// line after the chequered flag got active
/// * `Retired` -> reachable from state `Racing` by external method call, e.g. if the car left the
/// world bounds
///
/// A waypoint counts as passed once the car crosses its gate in driving direction. The gates must
/// be passed in order, a lap is completed when the start/finish line (waypoint 0) is crossed after
/// all other gates were passed since the last line crossing. On an open path, the lap is completed
/// at the last waypoint.
#[derive(Debug, Clone)]
pub struct ProgressHandler {
    // parameters
    no_wps: usize,
    closed: bool,
    // variables related to the race progress handling
    next_wp: Option<usize>, // None after the end of an open path was reached
    wps_since_line: usize,
    pos_prev: Point2d,
    pos_cur: Point2d,
    compl_lap_prev: u32,
    compl_lap_cur: u32,
    lap_frac_cross: f64, // part of the sub-step driven before crossing the line
    // variables related to the statemachine
    state: State,
}

impl ProgressHandler {
    pub fn new(track: &Track, start_wp: usize, pos_start: Point2d) -> ProgressHandler {
        let no_wps = track.no_waypoints();

        // the gates before the start waypoint count as passed, a car starting in front of the
        // line (start_wp 0) opens its first lap when crossing the line, a car starting on or
        // past the line has already opened it
        let (next_wp, wps_since_line) = if start_wp != 0 {
            (Some(start_wp), start_wp - 1)
        } else if track.is_on_or_past_gate(0, &pos_start) {
            (track.next_idx(0), 0)
        } else {
            (Some(0), 0)
        };

        ProgressHandler {
            no_wps,
            closed: track.closed,
            next_wp,
            wps_since_line,
            pos_prev: pos_start,
            pos_cur: pos_start,
            compl_lap_prev: 0,
            compl_lap_cur: 0,
            lap_frac_cross: 0.0,
            state: State::Racing,
        }
    }

    /// update_race_prog checks which gates the car crossed while moving to the inserted position.
    pub fn update_race_prog(&mut self, track: &Track, pos_cur: Point2d) {
        // update previous state
        self.compl_lap_prev = self.compl_lap_cur;
        self.pos_prev = self.pos_cur;
        self.pos_cur = pos_cur;

        // a sub-step is much shorter than a segment, the loop is only bounded for safety
        for _ in 0..self.no_wps {
            let idx = match self.next_wp {
                Some(idx) => idx,
                None => break,
            };

            let frac = match track.crossed_gate(idx, &self.pos_prev, &self.pos_cur) {
                Some(frac) => frac,
                None => break,
            };

            if self.closed {
                if idx == 0 {
                    if self.wps_since_line + 1 == self.no_wps {
                        self.compl_lap_cur += 1;
                        self.lap_frac_cross = frac;
                    }
                    self.wps_since_line = 0;
                } else {
                    self.wps_since_line += 1;
                }
            } else if idx + 1 == self.no_wps {
                self.compl_lap_cur += 1;
                self.lap_frac_cross = frac;
            } else {
                self.wps_since_line += 1;
            }

            self.next_wp = track.next_idx(idx);
        }
    }

    /// get_new_lap returns a bool indicating if the car completed a lap within the last update.
    pub fn get_new_lap(&self) -> bool {
        self.compl_lap_cur > self.compl_lap_prev
    }

    /// get_lap_frac_cross returns the part of the last update's movement that was driven before
    /// the line was crossed (only meaningful if get_new_lap is true).
    pub fn get_lap_frac_cross(&self) -> f64 {
        self.lap_frac_cross
    }

    pub fn get_compl_lap(&self) -> u32 {
        self.compl_lap_cur
    }

    pub fn get_next_wp(&self) -> Option<usize> {
        self.next_wp
    }

    /// get_race_prog returns the current race progress in laps (used for ordering the cars).
    pub fn get_race_prog(&self, track: &Track) -> f64 {
        let next_wp = match self.next_wp {
            Some(idx) => idx,
            None => return self.compl_lap_cur as f64,
        };

        // fraction of the segment towards the next waypoint that is already driven
        let seg_frac = match track.prev_idx(next_wp) {
            Some(idx_prev) if track.get_seg_length(idx_prev) > 0.0 => (1.0
                - self.pos_cur.distance(&track.waypoints[next_wp]) / track.get_seg_length(idx_prev))
            .clamp(0.0, 1.0),
            _ => 0.0,
        };

        let lap_frac = if self.closed {
            (self.wps_since_line as f64 + seg_frac) / self.no_wps as f64
        } else if next_wp > 0 {
            ((next_wp - 1) as f64 + seg_frac) / (self.no_wps - 1) as f64
        } else {
            0.0
        };

        self.compl_lap_cur as f64 + lap_frac
    }

    pub fn get_state(&self) -> State {
        self.state
    }

    pub fn is_racing(&self) -> bool {
        matches!(self.state, State::Racing)
    }

    /// set_finished is used to finish the race of the car from within the world.
    pub fn set_finished(&mut self) {
        if !self.is_racing() {
            panic!("Tried to finish the race of a car that is not racing anymore!")
        }
        self.state = State::Finished;
    }

    /// set_retired is used to retire the car from within the world.
    pub fn set_retired(&mut self) {
        if !self.is_racing() {
            panic!("Tried to retire a car that is not racing anymore!")
        }
        self.state = State::Retired;
    }
}
