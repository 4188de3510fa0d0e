use crate::stats::{mean, sample_std};
use crate::structs::{Reading, Season, SeasonProfile, SeasonStats};
use std::collections::BTreeMap;

/// Groups one city's readings by season and summarizes each group.
///
/// Every season present in `readings` gets exactly one entry. A season with a
/// single reading has a NaN `std`.
pub fn season_profile(readings: &[Reading]) -> SeasonProfile {
    let mut by_season: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for reading in readings {
        by_season
            .entry(reading.season)
            .or_default()
            .push(reading.temperature);
    }

    by_season
        .into_iter()
        .map(|(season, temps)| {
            let stats = SeasonStats {
                mean: mean(&temps),
                std: sample_std(&temps),
            };
            (season, stats)
        })
        .collect()
}
