//! A simulated push-button wired to a [`SimulatedPlatform`] line.

use std::sync::Arc;

use btncount_gpio::{GpioResult, Level, PinId, Polarity, SimulatedPlatform};

/// Drives one simulated line in press/release terms.
#[derive(Debug, Clone)]
pub struct SimButton {
    platform: Arc<SimulatedPlatform>,
    pin: PinId,
    polarity: Polarity,
}

impl SimButton {
    /// A released, interrupt-capable active-low button on a fresh platform.
    #[must_use]
    pub fn new(pin: PinId) -> Self {
        Self::with_polarity(pin, Polarity::ActiveLow)
    }

    /// A released, interrupt-capable button with `polarity`.
    #[must_use]
    pub fn with_polarity(pin: PinId, polarity: Polarity) -> Self {
        let platform = SimulatedPlatform::new().with_line(pin, polarity.deasserted_level());
        Self {
            platform: Arc::new(platform),
            pin,
            polarity,
        }
    }

    /// The platform, for handing to the code under test.
    #[must_use]
    pub fn platform(&self) -> Arc<SimulatedPlatform> {
        Arc::clone(&self.platform)
    }

    /// The line the button is on.
    #[must_use]
    pub fn pin(&self) -> PinId {
        self.pin
    }

    /// Hold the button down.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown to the platform.
    pub fn press(&self) -> GpioResult<bool> {
        self.platform
            .set_level(self.pin, self.polarity.asserted_level())
    }

    /// Let the button go.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown to the platform.
    pub fn release(&self) -> GpioResult<bool> {
        self.platform
            .set_level(self.pin, self.polarity.deasserted_level())
    }

    /// Press and release `times` times.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown to the platform.
    pub fn click(&self, times: usize) -> GpioResult<()> {
        for _ in 0..times {
            self.press()?;
            self.release()?;
        }
        Ok(())
    }

    /// Drive the raw level without press/release translation.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is unknown to the platform.
    pub fn drive(&self, level: Level) -> GpioResult<bool> {
        self.platform.set_level(self.pin, level)
    }

    /// Deliver a notification with no level change.
    #[must_use]
    pub fn bounce(&self) -> bool {
        self.platform.fire(self.pin)
    }
}
