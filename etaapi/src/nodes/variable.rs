use chrono::{DateTime, Local};
use serde::Serialize;

use crate::error::EtaError;

/// Display semantics of a variable, derived from the attributes the device
/// returns alongside the raw value.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    /// A plain number, `value / scale_factor` in `unit`.
    Default,
    /// An enumerated text code, `str_value` holds the label.
    Text,
    /// A schedule string like `06:00 - 22:00 80`.
    Timeslot,
}

impl std::fmt::Display for VariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VariableType::Default => write!(f, "default"),
            VariableType::Text => write!(f, "text"),
            VariableType::Timeslot => write!(f, "timeslot"),
        }
    }
}

impl std::str::FromStr for VariableType {
    type Err = EtaError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "default" | "number" => Ok(VariableType::Default),
            "text" => Ok(VariableType::Text),
            "timeslot" | "time" => Ok(VariableType::Timeslot),
            _ => Err(EtaError::ParserError(format!(
                "Cannot convert {:?} to VariableType",
                input
            ))),
        }
    }
}

/// One complete refresh result of a [`Variable`]. Replaced as a whole on every
/// update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub value: i64,
    pub str_value: String,
    pub unit: String,
    pub scale_factor: i64,
    pub dec_places: i64,
    pub adv_text_offset: i64,
    pub variable_type: VariableType,
    pub last_updated: DateTime<Local>,
}

/// Leaf of the node tree. Holds no data until it was passed to
/// [`crate::EtaClient::update_variable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    name: String,
    uri: String,
    #[serde(flatten)]
    reading: Option<Reading>,
}

impl Variable {
    pub fn new(name: impl ToString, uri: impl ToString) -> Self {
        Variable {
            name: name.to_string(),
            uri: uri.to_string(),
            reading: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn reading(&self) -> Option<&Reading> {
        self.reading.as_ref()
    }

    pub(crate) fn set_reading(&mut self, reading: Reading) {
        self.reading = Some(reading);
    }

    pub fn is_updated(&self) -> bool {
        self.reading.is_some()
    }

    pub fn value(&self) -> Option<i64> {
        self.reading.as_ref().map(|r| r.value)
    }

    pub fn str_value(&self) -> Option<&str> {
        self.reading.as_ref().map(|r| r.str_value.as_str())
    }

    pub fn unit(&self) -> &str {
        self.reading.as_ref().map(|r| r.unit.as_str()).unwrap_or("")
    }

    pub fn scale_factor(&self) -> i64 {
        self.reading.as_ref().map(|r| r.scale_factor).unwrap_or(1)
    }

    pub fn dec_places(&self) -> i64 {
        self.reading.as_ref().map(|r| r.dec_places).unwrap_or(0)
    }

    pub fn adv_text_offset(&self) -> i64 {
        self.reading.as_ref().map(|r| r.adv_text_offset).unwrap_or(0)
    }

    pub fn variable_type(&self) -> Option<VariableType> {
        self.reading.as_ref().map(|r| r.variable_type)
    }

    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.reading.as_ref().map(|r| r.last_updated)
    }

    /// Applies the scale factor to the raw value. A scale factor below 1 is
    /// treated as 1.
    pub fn normalized_value(&self) -> Option<f64> {
        self.reading
            .as_ref()
            .map(|r| r.value as f64 / r.scale_factor.max(1) as f64)
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reading {
            None => write!(f, "{} ({}): not updated", self.name, self.uri),
            Some(r) => write!(
                f,
                "{} ({}): {} (strValue={:?}, type={}, unit={}, scaleFactor={}, decPlaces={}, advTextOffset={}, last_updated={})",
                self.name,
                self.uri,
                r.value,
                r.str_value,
                r.variable_type,
                r.unit,
                r.scale_factor,
                r.dec_places,
                r.adv_text_offset,
                r.last_updated.format("%Y-%m-%d %H:%M:%S")
            ),
        }
    }
}
