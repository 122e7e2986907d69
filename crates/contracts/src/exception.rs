//! Host exception codes and their symbolic names.

use std::fmt;

/// Exception codes the host reports in [`crate::HostMessage::Exception`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum HostException {
    None = 0,
    Error = 1,
    SizeMismatch = 2,
    UnrecognizedId = 3,
    Unopened = 4,
    VersionMismatch = 5,
    TooManyGroups = 6,
    NameUnrecognized = 7,
    TooManyEventNames = 8,
    EventIdDuplicate = 9,
    TooManyMaps = 10,
    TooManyObjects = 11,
    TooManyRequests = 12,
    WeatherInvalidPort = 13,
    WeatherInvalidMetar = 14,
    WeatherUnableToGetObservation = 15,
    WeatherUnableToCreateStation = 16,
    WeatherUnableToRemoveStation = 17,
    InvalidDataType = 18,
    InvalidDataSize = 19,
    DataError = 20,
    InvalidArray = 21,
    CreateObjectFailed = 22,
    LoadFlightplanFailed = 23,
    OperationInvalidForObjectType = 24,
    IllegalOperation = 25,
    AlreadySubscribed = 26,
    InvalidEnum = 27,
    DefinitionError = 28,
    DuplicateId = 29,
    DatumId = 30,
    OutOfBounds = 31,
    AlreadyCreated = 32,
    ObjectOutsideRealityBubble = 33,
    ObjectContainer = 34,
    ObjectAi = 35,
    ObjectAtc = 36,
    ObjectSchedule = 37,
}

const ALL: [HostException; 38] = [
    HostException::None,
    HostException::Error,
    HostException::SizeMismatch,
    HostException::UnrecognizedId,
    HostException::Unopened,
    HostException::VersionMismatch,
    HostException::TooManyGroups,
    HostException::NameUnrecognized,
    HostException::TooManyEventNames,
    HostException::EventIdDuplicate,
    HostException::TooManyMaps,
    HostException::TooManyObjects,
    HostException::TooManyRequests,
    HostException::WeatherInvalidPort,
    HostException::WeatherInvalidMetar,
    HostException::WeatherUnableToGetObservation,
    HostException::WeatherUnableToCreateStation,
    HostException::WeatherUnableToRemoveStation,
    HostException::InvalidDataType,
    HostException::InvalidDataSize,
    HostException::DataError,
    HostException::InvalidArray,
    HostException::CreateObjectFailed,
    HostException::LoadFlightplanFailed,
    HostException::OperationInvalidForObjectType,
    HostException::IllegalOperation,
    HostException::AlreadySubscribed,
    HostException::InvalidEnum,
    HostException::DefinitionError,
    HostException::DuplicateId,
    HostException::DatumId,
    HostException::OutOfBounds,
    HostException::AlreadyCreated,
    HostException::ObjectOutsideRealityBubble,
    HostException::ObjectContainer,
    HostException::ObjectAi,
    HostException::ObjectAtc,
    HostException::ObjectSchedule,
];

impl HostException {
    /// Every known exception, indexed by code
    pub fn all() -> &'static [HostException] {
        &ALL
    }

    /// Look up a host code; `None` for codes outside the table
    pub fn from_code(code: u32) -> Option<Self> {
        ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Symbolic host name, e.g. `SIMCONNECT_EXCEPTION_NAME_UNRECOGNIZED`
    pub fn as_str(self) -> &'static str {
        match self {
            HostException::None => "SIMCONNECT_EXCEPTION_NONE",
            HostException::Error => "SIMCONNECT_EXCEPTION_ERROR",
            HostException::SizeMismatch => "SIMCONNECT_EXCEPTION_SIZE_MISMATCH",
            HostException::UnrecognizedId => "SIMCONNECT_EXCEPTION_UNRECOGNIZED_ID",
            HostException::Unopened => "SIMCONNECT_EXCEPTION_UNOPENED",
            HostException::VersionMismatch => "SIMCONNECT_EXCEPTION_VERSION_MISMATCH",
            HostException::TooManyGroups => "SIMCONNECT_EXCEPTION_TOO_MANY_GROUPS",
            HostException::NameUnrecognized => "SIMCONNECT_EXCEPTION_NAME_UNRECOGNIZED",
            HostException::TooManyEventNames => "SIMCONNECT_EXCEPTION_TOO_MANY_EVENT_NAMES",
            HostException::EventIdDuplicate => "SIMCONNECT_EXCEPTION_EVENT_ID_DUPLICATE",
            HostException::TooManyMaps => "SIMCONNECT_EXCEPTION_TOO_MANY_MAPS",
            HostException::TooManyObjects => "SIMCONNECT_EXCEPTION_TOO_MANY_OBJECTS",
            HostException::TooManyRequests => "SIMCONNECT_EXCEPTION_TOO_MANY_REQUESTS",
            HostException::WeatherInvalidPort => "SIMCONNECT_EXCEPTION_WEATHER_INVALID_PORT",
            HostException::WeatherInvalidMetar => "SIMCONNECT_EXCEPTION_WEATHER_INVALID_METAR",
            HostException::WeatherUnableToGetObservation => {
                "SIMCONNECT_EXCEPTION_WEATHER_UNABLE_TO_GET_OBSERVATION"
            }
            HostException::WeatherUnableToCreateStation => {
                "SIMCONNECT_EXCEPTION_WEATHER_UNABLE_TO_CREATE_STATION"
            }
            HostException::WeatherUnableToRemoveStation => {
                "SIMCONNECT_EXCEPTION_WEATHER_UNABLE_TO_REMOVE_STATION"
            }
            HostException::InvalidDataType => "SIMCONNECT_EXCEPTION_INVALID_DATA_TYPE",
            HostException::InvalidDataSize => "SIMCONNECT_EXCEPTION_INVALID_DATA_SIZE",
            HostException::DataError => "SIMCONNECT_EXCEPTION_DATA_ERROR",
            HostException::InvalidArray => "SIMCONNECT_EXCEPTION_INVALID_ARRAY",
            HostException::CreateObjectFailed => "SIMCONNECT_EXCEPTION_CREATE_OBJECT_FAILED",
            HostException::LoadFlightplanFailed => "SIMCONNECT_EXCEPTION_LOAD_FLIGHTPLAN_FAILED",
            HostException::OperationInvalidForObjectType => {
                "SIMCONNECT_EXCEPTION_OPERATION_INVALID_FOR_OBJECT_TYPE"
            }
            HostException::IllegalOperation => "SIMCONNECT_EXCEPTION_ILLEGAL_OPERATION",
            HostException::AlreadySubscribed => "SIMCONNECT_EXCEPTION_ALREADY_SUBSCRIBED",
            HostException::InvalidEnum => "SIMCONNECT_EXCEPTION_INVALID_ENUM",
            HostException::DefinitionError => "SIMCONNECT_EXCEPTION_DEFINITION_ERROR",
            HostException::DuplicateId => "SIMCONNECT_EXCEPTION_DUPLICATE_ID",
            HostException::DatumId => "SIMCONNECT_EXCEPTION_DATUM_ID",
            HostException::OutOfBounds => "SIMCONNECT_EXCEPTION_OUT_OF_BOUNDS",
            HostException::AlreadyCreated => "SIMCONNECT_EXCEPTION_ALREADY_CREATED",
            HostException::ObjectOutsideRealityBubble => {
                "SIMCONNECT_EXCEPTION_OBJECT_OUTSIDE_REALITY_BUBBLE"
            }
            HostException::ObjectContainer => "SIMCONNECT_EXCEPTION_OBJECT_CONTAINER",
            HostException::ObjectAi => "SIMCONNECT_EXCEPTION_OBJECT_AI",
            HostException::ObjectAtc => "SIMCONNECT_EXCEPTION_OBJECT_ATC",
            HostException::ObjectSchedule => "SIMCONNECT_EXCEPTION_OBJECT_SCHEDULE",
        }
    }

    /// Human-readable name for any code, including unknown ones
    pub fn describe(code: u32) -> String {
        match Self::from_code(code) {
            Some(exception) => exception.as_str().to_string(),
            None => format!("UNKNOWN_EXCEPTION({code})"),
        }
    }
}

impl fmt::Display for HostException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
