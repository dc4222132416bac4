//! Parameter registry: symbolic names to device addresses and scaling.
//!
//! Raw bytes relate to user-facing values linearly:
//! `raw = offset + multiplier * value`, and on the way back
//! `value = (raw - offset) / multiplier`.

use crate::error::{PelletError, Result};
use crate::types::{Bank, ParameterDescriptor};
use std::collections::HashMap;

// Slack for float noise when checking that a scaled value lands on a whole byte
const INTEGRAL_EPSILON: f64 = 1e-9;

/// Immutable lookup table built once at startup
#[derive(Debug, Clone, Default)]
pub struct ParameterRegistry {
    parameters: HashMap<String, ParameterDescriptor>,
}

impl ParameterRegistry {
    /// Build a registry, rejecting duplicate names and unusable scaling
    pub fn new<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = ParameterDescriptor>,
    {
        let mut parameters = HashMap::new();
        for descriptor in descriptors {
            validate(&descriptor)?;
            if parameters.contains_key(&descriptor.name) {
                return Err(PelletError::InvalidDescriptor {
                    name: descriptor.name,
                    reason: "duplicate name".to_string(),
                });
            }
            parameters.insert(descriptor.name.clone(), descriptor);
        }
        Ok(Self { parameters })
    }

    /// Load a table from a JSON array of descriptors
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptors: Vec<ParameterDescriptor> = serde_json::from_str(json)?;
        Self::new(descriptors)
    }

    pub fn resolve(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

fn validate(descriptor: &ParameterDescriptor) -> Result<()> {
    let reason = if descriptor.name.is_empty() {
        "empty name"
    } else if !descriptor.multiplier.is_finite() || descriptor.multiplier == 0.0 {
        "multiplier must be finite and non-zero"
    } else if !descriptor.offset.is_finite() {
        "offset must be finite"
    } else {
        return Ok(());
    };

    Err(PelletError::InvalidDescriptor {
        name: descriptor.name.clone(),
        reason: reason.to_string(),
    })
}

/// Convert a user-facing value into the byte sent on the wire
pub fn to_raw(parameter: &ParameterDescriptor, value: f64) -> Result<u8> {
    let raw = parameter.offset + parameter.multiplier * value;
    let rounded = raw.round();

    if !raw.is_finite()
        || (raw - rounded).abs() > INTEGRAL_EPSILON
        || !(0.0..=255.0).contains(&rounded)
    {
        return Err(PelletError::InvalidValue {
            name: parameter.name.clone(),
            value,
        });
    }

    Ok(rounded as u8)
}

/// Convert a received byte into the user-facing value
pub fn to_scaled(parameter: &ParameterDescriptor, raw: u8) -> f64 {
    (raw as f64 - parameter.offset) / parameter.multiplier
}

/// Parameter table of the P937 stove controller
pub fn p937() -> Vec<ParameterDescriptor> {
    vec![
        // Stove current stage
        ParameterDescriptor::new("stage", Bank::Ram, 0x21, 1.0, 0.0),
        // Remote temperature, half-degree steps
        ParameterDescriptor::new("ambientTmp", Bank::Ram, 0x01, 2.0, 0.0),
        ParameterDescriptor::new("probeTmp", Bank::Ram, 0x44, 1.0, 0.0),
        // Set temperature
        ParameterDescriptor::new("targetTmp", Bank::Epr, 0x7D, 1.0, 0.0),
        // Set power level
        ParameterDescriptor::new("power", Bank::Epr, 0x7F, 1.0, 0.0),
        ParameterDescriptor::new("fanLeft", Bank::Epr, 0x81, 1.0, 0.0),
        ParameterDescriptor::new("fanRight", Bank::Epr, 0x82, 1.0, 0.0),
    ]
}
