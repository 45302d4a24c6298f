use crate::core::progress::State;
use std::cmp::Ordering;
use std::fmt::Write;

/// CarInfo is used to store car number, name, and final state for post-processing the results.
#[derive(Debug, Clone, PartialEq)]
pub struct CarInfo {
    pub car_no: u32,
    pub name: String,
    pub compl_laps: u32,
    pub state: State,
}

/// RaceResult contains all race information that is required for post-processing the results.
#[derive(Debug, Clone, PartialEq)]
pub struct RaceResult {
    pub tot_no_laps: u32,
    pub car_infos: Vec<CarInfo>,
    pub laptimes: Vec<Vec<f64>>,
    pub racetimes: Vec<Vec<f64>>,
    pub no_collisions: u64,
}

impl RaceResult {
    /// get_classification returns the car indices in the order of the final classification, i.e.
    /// more completed laps first and, for the same number of laps, the earlier race time first.
    pub fn get_classification(&self) -> Vec<usize> {
        let mut idxs: Vec<usize> = (0..self.car_infos.len()).collect();

        idxs.sort_by(|&a, &b| {
            let laps_a = self.car_infos[a].compl_laps;
            let laps_b = self.car_infos[b].compl_laps;

            laps_b.cmp(&laps_a).then_with(|| {
                self.racetimes[a][laps_a as usize]
                    .partial_cmp(&self.racetimes[b][laps_b as usize])
                    .unwrap_or(Ordering::Equal)
            })
        });

        idxs
    }

    /// print_lap_and_race_times prints the resulting lap and race times to the console output.
    pub fn print_lap_and_race_times(&self) {
        // create string for lap times and race times (laps that were not driven are marked)
        let mut tmp_string_laptime = String::new();
        let mut tmp_string_racetime = String::new();
        let no_cars = self.car_infos.len();

        for lap in 1..self.tot_no_laps as usize + 1 {
            write!(&mut tmp_string_laptime, "{:3}, ", lap).unwrap();
            write!(&mut tmp_string_racetime, "{:3}, ", lap).unwrap();

            for i in 0..no_cars {
                let sep = if i < no_cars - 1 { ", " } else { "\n" };

                if lap <= self.car_infos[i].compl_laps as usize {
                    write!(&mut tmp_string_laptime, "{:8.3}s{}", self.laptimes[i][lap], sep)
                        .unwrap();
                    write!(&mut tmp_string_racetime, "{:8.3}s{}", self.racetimes[i][lap], sep)
                        .unwrap();
                } else {
                    write!(&mut tmp_string_laptime, "{:>9}{}", "-", sep).unwrap();
                    write!(&mut tmp_string_racetime, "{:>9}{}", "-", sep).unwrap();
                }
            }
        }

        // create string with car info
        let tmp_string_car_info = self
            .car_infos
            .iter()
            .map(|car_info| format!("{:3} ({})", car_info.car_no, car_info.name))
            .collect::<Vec<String>>()
            .join(", ");

        // print everything to the console
        println!("RESULT: Lap times");
        println!("lap, {}", tmp_string_car_info);
        println!("{}", tmp_string_laptime);

        println!("RESULT: Race times");
        println!("lap, {}", tmp_string_car_info);
        println!("{}", tmp_string_racetime);
    }

    /// print_classification prints the final classification to the console output.
    pub fn print_classification(&self) {
        println!("RESULT: Classification");

        for (pos, &idx) in self.get_classification().iter().enumerate() {
            let car_info = &self.car_infos[idx];

            let status = match car_info.state {
                State::Finished => format!(
                    "{:8.3}s",
                    self.racetimes[idx][car_info.compl_laps as usize]
                ),
                State::Retired => "     DNF".to_owned(),
                State::Racing => "    n.c.".to_owned(),
            };

            println!(
                "{:3}. car {:3} ({}), {} laps, {}",
                pos + 1,
                car_info.car_no,
                car_info.name,
                car_info.compl_laps,
                status
            );
        }

        println!("RESULT: {} collisions", self.no_collisions);
    }
}
