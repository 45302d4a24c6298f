use helpers::geometry::Point2d;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Green,
    Yellow,
    Red,
}

impl Phase {
    /// next returns the subsequent phase of the fixed cycle Green -> Yellow -> Red -> Green.
    pub fn next(&self) -> Phase {
        match self {
            Phase::Green => Phase::Yellow,
            Phase::Yellow => Phase::Red,
            Phase::Red => Phase::Green,
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Green
    }
}

/// * `id` - Light id
/// * `position` - (m) Position of the light (used for rendering)
/// * `waypoint_idx` - Index of the waypoint the light guards, i.e. the stop line
/// * `t_green` - (s) Dwell time of the green phase
/// * `t_yellow` - (s) Dwell time of the yellow phase
/// * `t_red` - (s) Dwell time of the red phase
/// * `initial_phase` - Phase at the race start
/// * `t_initial` - (s) Time already spent in the initial phase at the race start (used to offset
/// opposing lights)
#[derive(Debug, Deserialize, Clone)]
pub struct TrafficLightPars {
    pub id: u32,
    pub position: Point2d,
    pub waypoint_idx: usize,
    pub t_green: f64,
    pub t_yellow: f64,
    pub t_red: f64,
    #[serde(default)]
    pub initial_phase: Phase,
    #[serde(default)]
    pub t_initial: f64,
}

/// TrafficController contains the purely time-driven statemachine of a traffic light.
///
/// Possible statemachine states: `Green`, `Yellow`, `Red`. The transitions follow the fixed cycle
/// `Green` -> `Yellow` -> `Red` -> `Green`. A transition happens as soon as the dwell time of the
/// current phase has elapsed. The timer of the new phase starts at zero, i.e. every phase lasts
/// at least its dwell time and at most one transition happens per update.
#[derive(Debug, Clone)]
pub struct TrafficController {
    t_green: f64,
    t_yellow: f64,
    t_red: f64,
    phase: Phase,
    t_phase: f64,
    t_cur: f64,
}

impl TrafficController {
    pub fn new(t_green: f64, t_yellow: f64, t_red: f64, phase: Phase, t_phase: f64) -> Self {
        TrafficController {
            t_green,
            t_yellow,
            t_red,
            phase,
            t_phase,
            t_cur: 0.0,
        }
    }

    /// dwell returns the dwell time of the given phase.
    pub fn dwell(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Green => self.t_green,
            Phase::Yellow => self.t_yellow,
            Phase::Red => self.t_red,
        }
    }

    /// update advances the phase timer and returns the new phase if a transition happened.
    pub fn update(&mut self, timestep_size: f64) -> Option<Phase> {
        if timestep_size <= 0.0 {
            return None;
        }

        self.t_cur += timestep_size;
        self.t_phase += timestep_size;

        if self.t_phase >= self.dwell(self.phase) {
            self.phase = self.phase.next();
            self.t_phase = 0.0;
            Some(self.phase)
        } else {
            None
        }
    }

    /// phase_at predicts the phase at the absolute simulation time t_query. Times in the past
    /// (or now) return the current phase since no history is kept.
    pub fn phase_at(&self, t_query: f64) -> Phase {
        if t_query <= self.t_cur {
            return self.phase;
        }

        let t_cycle = self.t_green + self.t_yellow + self.t_red;
        let mut t_remaining = t_query - self.t_cur;
        let mut phase = self.phase;
        let mut t_left = self.dwell(phase) - self.t_phase;

        if t_remaining < t_left {
            return phase;
        }

        // continue at the beginning of the next phase, full cycles can be skipped from there on
        t_remaining -= t_left;
        phase = phase.next();
        t_remaining %= t_cycle;
        t_left = self.dwell(phase);

        while t_remaining >= t_left {
            t_remaining -= t_left;
            phase = phase.next();
            t_left = self.dwell(phase);
        }

        phase
    }

    pub fn get_phase(&self) -> Phase {
        self.phase
    }

    pub fn get_t_phase(&self) -> f64 {
        self.t_phase
    }
}

#[derive(Debug, Clone)]
pub struct TrafficLight {
    pub id: u32,
    pub position: Point2d,
    pub waypoint_idx: usize,
    pub controller: TrafficController,
}

impl TrafficLight {
    pub fn new(pars: &TrafficLightPars) -> TrafficLight {
        TrafficLight {
            id: pars.id,
            position: pars.position,
            waypoint_idx: pars.waypoint_idx,
            controller: TrafficController::new(
                pars.t_green,
                pars.t_yellow,
                pars.t_red,
                pars.initial_phase,
                pars.t_initial,
            ),
        }
    }
}
