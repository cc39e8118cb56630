//! Monitor configuration.

use btncount_gpio::{PinId, Polarity};
use serde::{Deserialize, Serialize};

use crate::error::{BtnCountError, BtnCountResult};

/// Size of the control message buffer.
///
/// Command input is truncated to this many bytes before it is decoded, so
/// input that differs from a valid token only past this bound decodes as that
/// token.
pub const CONTROL_BUFFER_LEN: usize = 32;

/// Configuration fixed at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// The monitored input line.
    pub pin: PinId,
    /// Which level means pressed.
    #[serde(default)]
    pub polarity: Polarity,
}

impl MonitorConfig {
    /// Monitor `pin` with the default (active-low) polarity.
    #[must_use]
    pub fn new(pin: PinId) -> Self {
        Self {
            pin,
            polarity: Polarity::default(),
        }
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::default()
    }
}

/// Builder for [`MonitorConfig`].
#[derive(Debug, Default)]
pub struct MonitorConfigBuilder {
    pin: Option<PinId>,
    polarity: Polarity,
}

impl MonitorConfigBuilder {
    /// Set the monitored line.
    #[must_use]
    pub fn pin(mut self, pin: impl Into<PinId>) -> Self {
        self.pin = Some(pin.into());
        self
    }

    /// Set the polarity.
    #[must_use]
    pub fn polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BtnCountError::Configuration`] if no line was given.
    pub fn build(self) -> BtnCountResult<MonitorConfig> {
        let pin = self
            .pin
            .ok_or_else(|| BtnCountError::configuration("monitored line is required"))?;
        Ok(MonitorConfig {
            pin,
            polarity: self.polarity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_pin() {
        assert!(matches!(
            MonitorConfig::builder().build(),
            Err(BtnCountError::Configuration(_))
        ));
    }

    #[test]
    fn test_builder_sets_fields() -> BtnCountResult<()> {
        let config = MonitorConfig::builder()
            .pin(48)
            .polarity(Polarity::ActiveHigh)
            .build()?;
        assert_eq!(config.pin, PinId::new(48));
        assert_eq!(config.polarity, Polarity::ActiveHigh);
        Ok(())
    }

    #[test]
    fn test_polarity_defaults_when_absent() -> Result<(), serde_json::Error> {
        let config: MonitorConfig = serde_json::from_str(r#"{"pin": 17}"#)?;
        assert_eq!(config, MonitorConfig::new(PinId::new(17)));
        Ok(())
    }
}
