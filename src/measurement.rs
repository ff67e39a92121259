//! The fixed set of quantities reported by the monitored sampling site.

use std::fmt;
use std::str::FromStr;

use crate::threshold::Threshold;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Measurement {
    WaterDepth,
    Temperature,
    ElectricalConductivity,
    Turbidity,
    BatteryVoltage,
    PercentFullScale,
    RelativeHumidity,
}

impl Measurement {
    /// Every tracked measurement, in processing order.
    pub const ALL: [Measurement; 7] = [
        Measurement::WaterDepth,
        Measurement::Temperature,
        Measurement::ElectricalConductivity,
        Measurement::Turbidity,
        Measurement::BatteryVoltage,
        Measurement::PercentFullScale,
        Measurement::RelativeHumidity,
    ];

    /// Name as it appears in the data source catalog.
    pub fn name(self) -> &'static str {
        match self {
            Measurement::WaterDepth => "Water depth",
            Measurement::Temperature => "Temperature",
            Measurement::ElectricalConductivity => "Electrical conductivity",
            Measurement::Turbidity => "Turbidity",
            Measurement::BatteryVoltage => "Battery voltage",
            Measurement::PercentFullScale => "Percent full scale",
            Measurement::RelativeHumidity => "Relative humidity",
        }
    }

    pub fn from_name(name: &str) -> Option<Measurement> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Built-in acceptable range used when no override is configured.
    pub fn default_threshold(self) -> Threshold {
        let (min, max) = match self {
            Measurement::WaterDepth => (0.0, 1000.0),
            Measurement::Temperature => (-20.0, 26.0),
            Measurement::ElectricalConductivity => (0.0, 600.0),
            Measurement::Turbidity => (0.0, 150.0),
            Measurement::BatteryVoltage => (0.0, 5.0),
            Measurement::PercentFullScale => (0.0, 101.0),
            Measurement::RelativeHumidity => (0.0, 100.0),
        };
        Threshold { min, max }
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Measurement {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| anyhow::anyhow!("unknown measurement: {s}"))
    }
}

/// Normalizes a measurement name into its environment key
/// (`"Water depth"` becomes `"WATER_DEPTH"`).
pub fn env_key(name: &str) -> String {
    name.to_uppercase().replace(' ', "_")
}
