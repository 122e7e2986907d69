//! Host unit tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit a host variable or record field is read and written in.
///
/// The host converts between its native unit and the requested one, so the
/// same variable may be registered twice with different units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    #[default]
    Number,
    Bool,
    Enum,
    Percent,
    PercentOver100,
    Degrees,
    Radians,
    Feet,
    Meters,
    FeetPerSecond,
    FeetPerSecondSquared,
    RadiansPerSecond,
    RadiansPerSecondSquared,
    Knots,
    Seconds,
}

impl Unit {
    /// Unit string as understood by the host
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Number => "Number",
            Unit::Bool => "Bool",
            Unit::Enum => "Enum",
            Unit::Percent => "Percent",
            Unit::PercentOver100 => "Percent Over 100",
            Unit::Degrees => "Degrees",
            Unit::Radians => "Radians",
            Unit::Feet => "Feet",
            Unit::Meters => "Meters",
            Unit::FeetPerSecond => "Feet per second",
            Unit::FeetPerSecondSquared => "Feet per second squared",
            Unit::RadiansPerSecond => "Radians per second",
            Unit::RadiansPerSecondSquared => "Radians per second squared",
            Unit::Knots => "Knots",
            Unit::Seconds => "Seconds",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
