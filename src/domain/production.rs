// Production counters domain model
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DAYS_PER_WEEK: usize = 7;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    #[serde(default)]
    pub grass_squares: Vec<u32>,
    #[serde(default)]
    pub area: Vec<f64>,
    #[serde(default)]
    pub efficiency: Vec<f64>,
}

impl DailyProgress {
    /// Sets today's grass-square count to the last recorded count plus `increment`.
    ///
    /// `weekday` counts from Sunday = 0; slots up to it are created on demand.
    pub fn advance_grass_squares(&mut self, weekday: usize, increment: u32) -> u32 {
        let last = self.grass_squares.last().copied().unwrap_or(0);
        let next = last.saturating_add(increment);
        if self.grass_squares.len() <= weekday {
            self.grass_squares.resize(weekday + 1, 0);
        }
        self.grass_squares[weekday] = next;
        next
    }

    pub fn total_area(&self) -> f64 {
        self.area.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionData {
    #[serde(default)]
    pub daily_progress: DailyProgress,
    #[serde(default)]
    pub quality_metrics: BTreeMap<String, f64>,
}
