//! Closed channel and datatype tables shared with the simulation binary.
//!
//! The numeric indices here are part of the wire contract: both ends
//! compile the same table, and a new quantity means a protocol version
//! bump, never a renumbering. Band counts are likewise fixed per
//! quantity: a land-use channel always carries its 64 category
//! fractions, a CO2 channel a single concentration.

// ── Input channels ────────────────────────────────────────────────────────────

/// Physical quantities the controller can supply to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum InputKind {
    Cloudiness = 0,
    Temperature = 1,
    Precipitation = 2,
    ShortwaveRadiation = 3,
    NetLongwaveRadiation = 4,
    Co2 = 5,
    LandUse = 6,
    Tillage = 7,
    Residue = 8,
    TemperatureMin = 9,
    TemperatureMax = 10,
    TemperatureAmplitude = 11,
    WetDays = 12,
    BurntArea = 13,
    Humidity = 14,
    WindSpeed = 15,
    Nh4Deposition = 16,
    No3Deposition = 17,
    Fertilizer = 18,
    Manure = 19,
    WaterUse = 20,
    PopulationDensity = 21,
    HumanIgnition = 22,
}

impl InputKind {
    /// Every known input quantity, in index order.
    pub const ALL: [InputKind; 23] = [
        InputKind::Cloudiness,
        InputKind::Temperature,
        InputKind::Precipitation,
        InputKind::ShortwaveRadiation,
        InputKind::NetLongwaveRadiation,
        InputKind::Co2,
        InputKind::LandUse,
        InputKind::Tillage,
        InputKind::Residue,
        InputKind::TemperatureMin,
        InputKind::TemperatureMax,
        InputKind::TemperatureAmplitude,
        InputKind::WetDays,
        InputKind::BurntArea,
        InputKind::Humidity,
        InputKind::WindSpeed,
        InputKind::Nh4Deposition,
        InputKind::No3Deposition,
        InputKind::Fertilizer,
        InputKind::Manure,
        InputKind::WaterUse,
        InputKind::PopulationDensity,
        InputKind::HumanIgnition,
    ];

    /// Wire index of this quantity.
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Bands this engine reports for the quantity during negotiation.
    pub fn band_count(self) -> i32 {
        match self {
            InputKind::LandUse => 64,
            InputKind::Residue => 32,
            InputKind::Fertilizer => 32,
            InputKind::Manure => 32,
            InputKind::Tillage => 2,
            _ => 1,
        }
    }

    /// Whether the quantity has no per-cell dimension.
    ///
    /// A spatially uniform channel transfers `bands` values per step
    /// instead of `bands × cells`; CO2 concentration is the only one.
    pub fn is_spatially_uniform(self) -> bool {
        matches!(self, InputKind::Co2)
    }

    /// Stable lowercase name used in configuration files and logs.
    pub fn name(self) -> &'static str {
        match self {
            InputKind::Cloudiness => "cloudiness",
            InputKind::Temperature => "temperature",
            InputKind::Precipitation => "precipitation",
            InputKind::ShortwaveRadiation => "shortwave_radiation",
            InputKind::NetLongwaveRadiation => "net_longwave_radiation",
            InputKind::Co2 => "co2",
            InputKind::LandUse => "landuse",
            InputKind::Tillage => "tillage",
            InputKind::Residue => "residue",
            InputKind::TemperatureMin => "temperature_min",
            InputKind::TemperatureMax => "temperature_max",
            InputKind::TemperatureAmplitude => "temperature_amplitude",
            InputKind::WetDays => "wet_days",
            InputKind::BurntArea => "burnt_area",
            InputKind::Humidity => "humidity",
            InputKind::WindSpeed => "wind_speed",
            InputKind::Nh4Deposition => "nh4_deposition",
            InputKind::No3Deposition => "no3_deposition",
            InputKind::Fertilizer => "fertilizer",
            InputKind::Manure => "manure",
            InputKind::WaterUse => "water_use",
            InputKind::PopulationDensity => "population_density",
            InputKind::HumanIgnition => "human_ignition",
        }
    }

    /// Looks a quantity up by its configuration name.
    pub fn from_name(name: &str) -> Option<InputKind> {
        InputKind::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

impl TryFrom<i32> for InputKind {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(InputKind::Cloudiness),
            1 => Ok(InputKind::Temperature),
            2 => Ok(InputKind::Precipitation),
            3 => Ok(InputKind::ShortwaveRadiation),
            4 => Ok(InputKind::NetLongwaveRadiation),
            5 => Ok(InputKind::Co2),
            6 => Ok(InputKind::LandUse),
            7 => Ok(InputKind::Tillage),
            8 => Ok(InputKind::Residue),
            9 => Ok(InputKind::TemperatureMin),
            10 => Ok(InputKind::TemperatureMax),
            11 => Ok(InputKind::TemperatureAmplitude),
            12 => Ok(InputKind::WetDays),
            13 => Ok(InputKind::BurntArea),
            14 => Ok(InputKind::Humidity),
            15 => Ok(InputKind::WindSpeed),
            16 => Ok(InputKind::Nh4Deposition),
            17 => Ok(InputKind::No3Deposition),
            18 => Ok(InputKind::Fertilizer),
            19 => Ok(InputKind::Manure),
            20 => Ok(InputKind::WaterUse),
            21 => Ok(InputKind::PopulationDensity),
            22 => Ok(InputKind::HumanIgnition),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Output channels ───────────────────────────────────────────────────────────

/// Output index of the grid coordinate channel.
pub const OUTPUT_GRID: i32 = 0;
/// Output index of the country id channel.
pub const OUTPUT_COUNTRY: i32 = 1;
/// Output index of the region id channel.
pub const OUTPUT_REGION: i32 = 2;
/// Output index of the global flux aggregate channel.
pub const OUTPUT_GLOBAL_FLUX: i32 = 3;

/// How an output channel behaves over the session lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputClass {
    /// Transferred once before the main loop (grid, country, region).
    Static,
    /// A flat vector of scalars per step, no per-cell dimension.
    GlobalAggregate,
    /// `bands × cells` values per step.
    Gridded,
}

impl OutputClass {
    /// Classifies an output index declared during negotiation.
    ///
    /// Indices outside the fixed table are per-variable gridded outputs;
    /// their negotiated metadata fully determines the payload shape.
    pub fn for_index(index: i32) -> OutputClass {
        match index {
            OUTPUT_GRID | OUTPUT_COUNTRY | OUTPUT_REGION => OutputClass::Static,
            OUTPUT_GLOBAL_FLUX => OutputClass::GlobalAggregate,
            _ => OutputClass::Gridded,
        }
    }
}

// ── Datatypes ─────────────────────────────────────────────────────────────────

/// Element type tag an output channel declares during negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Datatype {
    Byte = 0,
    Short = 1,
    Int = 2,
    Float = 3,
    Double = 4,
}

impl Datatype {
    /// Width of one element on the wire, in bytes.
    pub fn wire_size(self) -> usize {
        match self {
            Datatype::Byte => 1,
            Datatype::Short => 2,
            Datatype::Int => 4,
            Datatype::Float => 4,
            Datatype::Double => 8,
        }
    }
}

impl TryFrom<i32> for Datatype {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Datatype::Byte),
            1 => Ok(Datatype::Short),
            2 => Ok(Datatype::Int),
            3 => Ok(Datatype::Float),
            4 => Ok(Datatype::Double),
            _ => Err(()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_indices_round_trip_through_the_table() {
        for kind in InputKind::ALL {
            assert_eq!(InputKind::try_from(kind.index()), Ok(kind));
        }
    }

    #[test]
    fn test_input_table_is_dense_and_closed() {
        assert_eq!(InputKind::ALL.len(), 23);
        for (position, kind) in InputKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), position as i32);
        }
        assert_eq!(InputKind::try_from(23), Err(()));
        assert_eq!(InputKind::try_from(-1), Err(()));
    }

    #[test]
    fn test_band_counts_are_channel_specific() {
        assert_eq!(InputKind::LandUse.band_count(), 64);
        assert_eq!(InputKind::Fertilizer.band_count(), 32);
        assert_eq!(InputKind::Manure.band_count(), 32);
        assert_eq!(InputKind::Residue.band_count(), 32);
        assert_eq!(InputKind::Tillage.band_count(), 2);
        assert_eq!(InputKind::Co2.band_count(), 1);
        assert_eq!(InputKind::Temperature.band_count(), 1);
    }

    #[test]
    fn test_only_co2_is_spatially_uniform() {
        for kind in InputKind::ALL {
            assert_eq!(kind.is_spatially_uniform(), kind == InputKind::Co2);
        }
    }

    #[test]
    fn test_names_round_trip() {
        for kind in InputKind::ALL {
            assert_eq!(InputKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(InputKind::from_name("not_a_channel"), None);
    }

    #[test]
    fn test_output_classification_by_index() {
        assert_eq!(OutputClass::for_index(OUTPUT_GRID), OutputClass::Static);
        assert_eq!(OutputClass::for_index(OUTPUT_COUNTRY), OutputClass::Static);
        assert_eq!(OutputClass::for_index(OUTPUT_REGION), OutputClass::Static);
        assert_eq!(
            OutputClass::for_index(OUTPUT_GLOBAL_FLUX),
            OutputClass::GlobalAggregate
        );
        // Everything else is a per-variable gridded output.
        assert_eq!(OutputClass::for_index(4), OutputClass::Gridded);
        assert_eq!(OutputClass::for_index(250), OutputClass::Gridded);
    }

    #[test]
    fn test_datatype_wire_sizes() {
        assert_eq!(Datatype::Byte.wire_size(), 1);
        assert_eq!(Datatype::Short.wire_size(), 2);
        assert_eq!(Datatype::Int.wire_size(), 4);
        assert_eq!(Datatype::Float.wire_size(), 4);
        assert_eq!(Datatype::Double.wire_size(), 8);
    }

    #[test]
    fn test_datatype_tags_round_trip() {
        for tag in 0..5 {
            let datatype = Datatype::try_from(tag).expect("tag must be known");
            assert_eq!(datatype as i32, tag);
        }
        assert_eq!(Datatype::try_from(5), Err(()));
    }
}
