//! Session settings and startup configuration.
//!
//! Settings are validated once at the boundary (CLI startup or the settings
//! endpoint) and then passed around as plain data. The API credential is read
//! from the environment exactly once, at startup, and is a fatal error when
//! absent. The application never limps along without it.

use crate::persona::Persona;
use crate::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use serde::{Deserialize, Serialize};

/// Environment variable holding the completion API credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// The fixed set of model identifiers offered in the UI dropdown.
pub const MODEL_CATALOG: [&str; 4] = [
    "gpt-3.5-turbo",
    "text-davinci-003",
    "text-davinci-002",
    "code-davinci-002",
];

/// Per-session model configuration plus the chosen persona.
///
/// Applies to all subsequent completion calls until changed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub model: String,
    pub persona: Persona,
    pub temperature: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            persona: Persona::GeneralAssistant,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl SessionSettings {
    /// Check catalog membership and the temperature domain.
    ///
    /// Out-of-range values are rejected, not clamped. The UI slider already
    /// constrains the range, so anything outside it is a caller bug.
    pub fn validate(&self) -> Result<(), String> {
        if !MODEL_CATALOG.contains(&self.model.as_str()) {
            return Err(format!("unknown model: {}", self.model));
        }
        if !self.temperature.is_finite() || !(0.0..=1.0).contains(&self.temperature) {
            return Err(format!(
                "temperature {} out of range [0.0, 1.0]",
                self.temperature
            ));
        }
        Ok(())
    }
}

/// Read the completion API credential from the environment.
///
/// Call once at startup; absence is a fatal configuration error.
pub fn load_api_key() -> Result<String, String> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(format!(
            "Set {API_KEY_VAR} env var to your completion API key"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = SessionSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.model, "gpt-3.5-turbo");
        assert_eq!(settings.persona, Persona::GeneralAssistant);
        assert!((settings.temperature - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn every_catalog_model_is_valid() {
        for model in MODEL_CATALOG {
            let settings = SessionSettings {
                model: model.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "{model} should validate");
        }
    }

    #[test]
    fn unknown_model_rejected() {
        let settings = SessionSettings {
            model: "gpt-9".into(),
            ..Default::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.contains("unknown model"));
    }

    #[test]
    fn temperature_bounds_are_inclusive() {
        for temp in [0.0, 0.5, 1.0] {
            let settings = SessionSettings {
                temperature: temp,
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "temperature {temp} is legal");
        }
    }

    #[test]
    fn out_of_range_temperature_rejected() {
        for temp in [-0.1, 1.1, f32::NAN, f32::INFINITY] {
            let settings = SessionSettings {
                temperature: temp,
                ..Default::default()
            };
            assert!(
                settings.validate().is_err(),
                "temperature {temp} must be rejected"
            );
        }
    }

    #[test]
    fn settings_deserialize_from_wire_shape() {
        let json = r#"{"model":"text-davinci-003","persona":"witty","temperature":0.9}"#;
        let settings: SessionSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.model, "text-davinci-003");
        assert_eq!(settings.persona, Persona::Witty);
        assert!(settings.validate().is_ok());
    }
}
