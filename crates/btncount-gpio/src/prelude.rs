//! Prelude for btncount-gpio.
//!
//! ```rust
//! use btncount_gpio::prelude::*;
//!
//! let platform = SimulatedPlatform::new().with_line(PinId::new(4), Level::Low);
//! assert!(platform.is_valid(PinId::new(4)));
//! ```

pub use crate::error::{GpioError, GpioResult};
pub use crate::hal::HalLine;
pub use crate::platform::{EdgeHandler, GpioPlatform};
pub use crate::polled::{LineSource, PolledPlatform};
pub use crate::simulated::SimulatedPlatform;
pub use crate::sysfs::SysfsLines;
pub use crate::types::{Level, NotificationHandle, PinId, Polarity};
