use crate::core::car::Role;
use crate::core::traffic::Phase;
use crate::core::vehicle::VehicleKind;

pub const MAX_HUD_UPDATE_FREQUENCY: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSnapshot {
    pub car_no: u32,
    pub name: String,
    pub kind: VehicleKind,
    pub role: Role,
    pub color: RgbColor,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub speed: f64,
    pub speed_kmh: f64,
    pub gear: Option<u32>,
    pub rpm: Option<f64>,
    pub racing: bool,
    pub compl_laps: u32,
    pub next_wp: Option<usize>,
    pub finished: bool,
    pub retired: bool,
    pub race_prog: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightSnapshot {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub phase: Phase,
}

/// WorldSnapshot is the read-only state a renderer or HUD needs to present a frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldSnapshot {
    pub t_race: f64,
    pub cur_lap_leader: u32,
    pub chequered: bool,
    pub vehicles: Vec<VehicleSnapshot>,
    pub lights: Vec<LightSnapshot>,
}
