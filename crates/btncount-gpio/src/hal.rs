//! Adapter from an `embedded-hal` input pin to a [`LineSource`].

use core::fmt;

use embedded_hal::digital::{Error as _, InputPin};
use parking_lot::Mutex;

use crate::error::{GpioError, GpioResult};
use crate::polled::LineSource;
use crate::types::{Level, PinId};

/// A single `embedded-hal` [`InputPin`] exposed under a fixed identifier.
///
/// `InputPin` reads need `&mut self`, so the pin sits behind a mutex shared
/// by the sampling worker and direct level reads.
pub struct HalLine<P> {
    id: PinId,
    pin: Mutex<P>,
}

impl<P> fmt::Debug for HalLine<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HalLine").field("id", &self.id).finish_non_exhaustive()
    }
}

impl<P> HalLine<P> {
    /// Expose `pin` as line `id`.
    #[must_use]
    pub fn new(id: PinId, pin: P) -> Self {
        Self {
            id,
            pin: Mutex::new(pin),
        }
    }

    /// The identifier this pin answers to.
    #[must_use]
    pub fn id(&self) -> PinId {
        self.id
    }

    /// Give the pin back.
    #[must_use]
    pub fn into_inner(self) -> P {
        self.pin.into_inner()
    }
}

impl<P> LineSource for HalLine<P>
where
    P: InputPin + Send + 'static,
{
    fn is_valid(&self, pin: PinId) -> bool {
        pin == self.id
    }

    fn supports_edges(&self, pin: PinId) -> bool {
        pin == self.id
    }

    fn read_level(&self, pin: PinId) -> GpioResult<Level> {
        if pin != self.id {
            return Err(GpioError::InvalidPin(pin));
        }
        self.pin
            .lock()
            .is_high()
            .map(Level::from_bit)
            .map_err(|e| GpioError::read_failed(pin, format!("{:?}", e.kind())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use crate::platform::GpioPlatform;
    use crate::polled::PolledPlatform;

    struct FixedPin(bool);

    impl ErrorType for FixedPin {
        type Error = Infallible;
    }

    impl InputPin for FixedPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0)
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0)
        }
    }

    /// A pin whose level is flipped from outside the sampling worker.
    #[derive(Clone, Default)]
    struct SharedPin(Arc<AtomicBool>);

    impl ErrorType for SharedPin {
        type Error = Infallible;
    }

    impl InputPin for SharedPin {
        fn is_high(&mut self) -> Result<bool, Self::Error> {
            Ok(self.0.load(Ordering::Acquire))
        }

        fn is_low(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.0.load(Ordering::Acquire))
        }
    }

    #[test]
    fn test_polled_subscription_over_input_pin() -> Result<(), Box<dyn std::error::Error>> {
        let pin = SharedPin::default();
        let id = PinId::new(21);
        let platform = PolledPlatform::new(HalLine::new(id, pin.clone()));

        let (tx, rx) = mpsc::channel();
        let tx = Mutex::new(tx);
        let handle = platform.subscribe(
            id,
            Arc::new(move || {
                let name = thread::current().name().map(str::to_owned);
                let _sent = tx.lock().send(name);
            }),
        )?;

        pin.0.store(true, Ordering::Release);
        let name = rx.recv_timeout(Duration::from_secs(2))?;
        assert_eq!(name.as_deref(), Some("btncount-gpio21"));
        assert_eq!(platform.read_level(id)?, Level::High);

        pin.0.store(false, Ordering::Release);
        rx.recv_timeout(Duration::from_secs(2))?;
        assert_eq!(platform.read_level(id)?, Level::Low);

        platform.unsubscribe(handle);
        assert_eq!(platform.subscriptions(), 0);
        assert!(matches!(
            platform.subscribe(PinId::new(22), Arc::new(|| {})),
            Err(GpioError::InvalidPin(_))
        ));
        Ok(())
    }

    #[test]
    fn test_reads_through_input_pin() -> GpioResult<()> {
        let line = HalLine::new(PinId::new(12), FixedPin(false));
        assert_eq!(line.read_level(PinId::new(12))?, Level::Low);
        assert!(line.supports_edges(PinId::new(12)));
        assert!(matches!(
            line.read_level(PinId::new(13)),
            Err(GpioError::InvalidPin(_))
        ));
        Ok(())
    }
}
