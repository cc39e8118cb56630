//! Line identifiers, logic levels and button polarity.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a digital input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinId(u32);

impl PinId {
    /// Wrap a raw line number.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw line number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for PinId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gpio{}", self.0)
    }
}

/// Instantaneous logic level of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Logic 0.
    Low,
    /// Logic 1.
    High,
}

impl Level {
    /// Build a level from a raw bit (`true` is high).
    #[must_use]
    pub const fn from_bit(high: bool) -> Self {
        if high { Self::High } else { Self::Low }
    }

    /// Whether the level is logic 1.
    #[must_use]
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }

    /// The opposite level.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::High => "high",
        })
    }
}

/// Which logic level means "pressed".
///
/// The default is [`Polarity::ActiveLow`]: a button wired to ground with a
/// pull-up reads 1 when released and 0 while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Polarity {
    /// Pressed reads low.
    #[default]
    ActiveLow,
    /// Pressed reads high.
    ActiveHigh,
}

impl Polarity {
    /// The level that means pressed.
    #[must_use]
    pub const fn asserted_level(self) -> Level {
        match self {
            Self::ActiveLow => Level::Low,
            Self::ActiveHigh => Level::High,
        }
    }

    /// The level that means released.
    #[must_use]
    pub const fn deasserted_level(self) -> Level {
        self.asserted_level().toggled()
    }

    /// Whether `level` means pressed under this polarity.
    #[must_use]
    pub fn is_asserted(self, level: Level) -> bool {
        level == self.asserted_level()
    }

    /// Stable name used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ActiveLow => "active-low",
            Self::ActiveHigh => "active-high",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Polarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active-low" => Ok(Self::ActiveLow),
            "active-high" => Ok(Self::ActiveHigh),
            other => Err(format!("unknown polarity '{other}'")),
        }
    }
}

/// Opaque identifier of one edge subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationHandle(u64);

impl NotificationHandle {
    /// Build a handle from a backend-assigned value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The backend-assigned value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NotificationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_levels() {
        assert_eq!(Polarity::ActiveLow.asserted_level(), Level::Low);
        assert_eq!(Polarity::ActiveLow.deasserted_level(), Level::High);
        assert!(Polarity::ActiveHigh.is_asserted(Level::High));
        assert!(!Polarity::ActiveHigh.is_asserted(Level::Low));
    }

    #[test]
    fn test_polarity_round_trips_through_name() -> Result<(), String> {
        for polarity in [Polarity::ActiveLow, Polarity::ActiveHigh] {
            assert_eq!(polarity.as_str().parse::<Polarity>()?, polarity);
        }
        assert!(matches!("inverted".parse::<Polarity>(), Err(_)));
        Ok(())
    }

    #[test]
    fn test_pin_display() {
        assert_eq!(PinId::new(17).to_string(), "gpio17");
        assert_eq!(PinId::from(5).get(), 5);
    }

    #[test]
    fn test_serde_names() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&Polarity::ActiveHigh)?, "\"active-high\"");
        assert_eq!(serde_json::to_string(&PinId::new(48))?, "48");
        assert_eq!(serde_json::from_str::<Level>("\"low\"")?, Level::Low);
        Ok(())
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        fn polarity() -> impl Strategy<Value = Polarity> {
            prop_oneof![Just(Polarity::ActiveLow), Just(Polarity::ActiveHigh)]
        }

        proptest! {
            #[test]
            fn prop_exactly_one_level_is_asserted(polarity in polarity(), high in any::<bool>()) {
                let level = Level::from_bit(high);
                prop_assert_ne!(polarity.is_asserted(level), polarity.is_asserted(level.toggled()));
                prop_assert_ne!(polarity.asserted_level(), polarity.deasserted_level());
            }

            #[test]
            fn prop_pin_display_names_the_line(raw in any::<u32>()) {
                prop_assert_eq!(PinId::new(raw).to_string(), format!("gpio{raw}"));
            }
        }
    }
}
