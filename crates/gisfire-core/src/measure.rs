//! Weather measurement catalogue.
//!
//! Every example carries the same 30 measurements: five kinds, each read
//! instantaneously and aggregated over five trailing windows. Column names
//! and their order are part of the CSV contract.

use serde::{Deserialize, Serialize};

/// Measured variable at a weather station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureKind {
    RelHumidity,
    Temperature,
    Rain,
    SolarIrradiance,
    Wind,
}

/// How a kind is folded over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Average,
    Sum,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Average => "average",
            Aggregation::Sum => "sum",
        }
    }

    fn column_prefix(&self) -> &'static str {
        match self {
            Aggregation::Average => "AVG",
            Aggregation::Sum => "SUM",
        }
    }
}

impl MeasureKind {
    /// Kinds in column order.
    pub const ALL: [MeasureKind; 5] = [
        MeasureKind::RelHumidity,
        MeasureKind::Temperature,
        MeasureKind::Rain,
        MeasureKind::SolarIrradiance,
        MeasureKind::Wind,
    ];

    /// Variable code understood by the data API.
    pub fn code(&self) -> &'static str {
        match self {
            MeasureKind::RelHumidity => "HR",
            MeasureKind::Temperature => "T",
            MeasureKind::Rain => "PPT",
            MeasureKind::SolarIrradiance => "RS",
            MeasureKind::Wind => "VV10",
        }
    }

    pub fn aggregation(&self) -> Aggregation {
        match self {
            MeasureKind::RelHumidity | MeasureKind::Temperature => Aggregation::Average,
            MeasureKind::Rain | MeasureKind::SolarIrradiance | MeasureKind::Wind => {
                Aggregation::Sum
            }
        }
    }

    fn column_stem(&self) -> &'static str {
        match self {
            MeasureKind::RelHumidity => "REL_HUMIDITY",
            MeasureKind::Temperature => "TEMPERATURE",
            MeasureKind::Rain => "RAIN",
            MeasureKind::SolarIrradiance => "SOLAR_IRRADIANCE",
            MeasureKind::Wind => "WIND",
        }
    }

    /// CSV column for this kind over `window`, e.g. `AVG_REL_HUMIDITY_3_DAY`.
    pub fn column(&self, window: Window) -> String {
        if window.is_instant() {
            self.column_stem().to_string()
        } else {
            format!(
                "{}_{}_{}_DAY",
                self.aggregation().column_prefix(),
                self.column_stem(),
                window.days()
            )
        }
    }
}

/// Trailing aggregation window in days; 0 is the instantaneous reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Window(u32);

impl Window {
    /// Windows in column order.
    pub const ALL: [Window; 6] = [
        Window(0),
        Window(1),
        Window(3),
        Window(5),
        Window(10),
        Window(15),
    ];
    pub const INSTANT: Window = Window(0);
    pub const LONGEST: Window = Window(15);

    pub fn days(&self) -> u32 {
        self.0
    }

    pub fn is_instant(&self) -> bool {
        self.0 == 0
    }
}

pub const MEASURES_PER_EXAMPLE: usize = MeasureKind::ALL.len() * Window::ALL.len();

/// All (kind, window) pairs in column order.
pub fn measure_pairs() -> impl Iterator<Item = (MeasureKind, Window)> {
    MeasureKind::ALL
        .into_iter()
        .flat_map(|kind| Window::ALL.into_iter().map(move |window| (kind, window)))
}

/// The 30 measurement column names in order.
pub fn measure_columns() -> Vec<String> {
    measure_pairs()
        .map(|(kind, window)| kind.column(window))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_measures_per_example() {
        assert_eq!(MEASURES_PER_EXAMPLE, 30);
        assert_eq!(measure_columns().len(), 30);
    }

    #[test]
    fn column_names_follow_aggregation() {
        assert_eq!(MeasureKind::RelHumidity.column(Window::INSTANT), "REL_HUMIDITY");
        assert_eq!(
            MeasureKind::RelHumidity.column(Window::ALL[2]),
            "AVG_REL_HUMIDITY_3_DAY"
        );
        assert_eq!(
            MeasureKind::Temperature.column(Window::LONGEST),
            "AVG_TEMPERATURE_15_DAY"
        );
        assert_eq!(MeasureKind::Rain.column(Window::ALL[1]), "SUM_RAIN_1_DAY");
        assert_eq!(
            MeasureKind::SolarIrradiance.column(Window::ALL[4]),
            "SUM_SOLAR_IRRADIANCE_10_DAY"
        );
        assert_eq!(MeasureKind::Wind.column(Window::ALL[3]), "SUM_WIND_5_DAY");
    }

    #[test]
    fn columns_are_grouped_by_kind() {
        let columns = measure_columns();
        assert_eq!(columns[0], "REL_HUMIDITY");
        assert_eq!(columns[6], "TEMPERATURE");
        assert_eq!(columns[12], "RAIN");
        assert_eq!(columns[18], "SOLAR_IRRADIANCE");
        assert_eq!(columns[24], "WIND");
        assert_eq!(columns[29], "SUM_WIND_15_DAY");
    }
}
