//! WM8778 audio codec driver.
//!
//! The driver is generic over any [`embedded_hal::spi::SpiDevice<u16>`] (chip
//! select handled by the device, which also provides the rising-edge latch)
//! and [`embedded_hal::delay::DelayNs`] for the power-on wait.
//!
//! # Example
//!
//! ```ignore
//! let mut codec = Wm8778::new(spi, delay);
//! codec.configure(&StreamConfig::default().codec_format())?;
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::spi::SpiDevice;
use thiserror::Error;

use super::registers as reg;
use crate::config::{ChannelFormat, CodecFormat};
use crate::control::AudioCodec;

/// Time the codec needs after power is applied before it accepts commands.
const POWER_ON_DELAY_MS: u32 = 500;

/// WM8778 driver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error<E> {
    /// The SPI transfer failed.
    #[error("SPI transfer failed: {0:?}")]
    Spi(E),
    /// The converters support 16, 20, 24 and 32-bit words only.
    #[error("unsupported word length {0}")]
    WordLength(u8),
}

/// WM8778 codec driver.
///
/// The control port cannot be read back, so the driver shadows the
/// interface registers it has written.
pub struct Wm8778<SPI, D> {
    spi: SPI,
    delay: D,
    /// Whether the power-on wait has elapsed.
    powered: bool,
    dac_interface: u16,
    adc_interface: u16,
    word_bits: Option<u8>,
}

impl<SPI, D> Wm8778<SPI, D>
where
    SPI: SpiDevice<u16>,
    D: DelayNs,
{
    pub fn new(spi: SPI, delay: D) -> Self {
        Self {
            spi,
            delay,
            powered: false,
            dac_interface: 0,
            adc_interface: 0,
            word_bits: None,
        }
    }

    /// Send one command word.
    pub fn write_register(&mut self, register: u8, data: u16) -> Result<(), Error<SPI::Error>> {
        debug_assert!(data <= reg::DATA_MASK, "data wider than 9 bits");
        self.spi
            .write(&[reg::command(register, data)])
            .map_err(Error::Spi)
    }

    /// Wait out the power-on time. Only the first call delays.
    pub fn power_up(&mut self) {
        if !self.powered {
            self.delay.delay_ms(POWER_ON_DELAY_MS);
            self.powered = true;
        }
    }

    /// Return every register to its default.
    pub fn reset(&mut self) -> Result<(), Error<SPI::Error>> {
        self.write_register(reg::SOFTWARE_RESET, 0)?;
        self.dac_interface = 0;
        self.adc_interface = 0;
        self.word_bits = None;
        Ok(())
    }

    /// Set the DAC (playback) word length and framing.
    pub fn dac_interface(&mut self, bits: u8, format: ChannelFormat) -> Result<(), Error<SPI::Error>> {
        let value = Self::interface_word(bits, format)?;
        self.write_register(reg::DAC_INTERFACE, value)?;
        self.dac_interface = value;
        Ok(())
    }

    /// Set the ADC (capture) word length and framing.
    pub fn adc_interface(&mut self, bits: u8, format: ChannelFormat) -> Result<(), Error<SPI::Error>> {
        let value = Self::interface_word(bits, format)?;
        self.write_register(reg::ADC_INTERFACE, value)?;
        self.adc_interface = value;
        Ok(())
    }

    /// Release the SPI device and delay provider.
    pub fn release(self) -> (SPI, D) {
        (self.spi, self.delay)
    }

    fn interface_word(bits: u8, format: ChannelFormat) -> Result<u16, Error<SPI::Error>> {
        let wl = match bits {
            16 => reg::WL_16,
            20 => reg::WL_20,
            24 => reg::WL_24,
            32 => reg::WL_32,
            other => return Err(Error::WordLength(other)),
        };
        let fmt = match format {
            ChannelFormat::RightJustified => reg::FMT_RIGHT_JUSTIFIED,
            ChannelFormat::LeftJustified => reg::FMT_LEFT_JUSTIFIED,
            ChannelFormat::I2s => reg::FMT_I2S,
        };
        Ok(wl | fmt)
    }
}

// ── AudioCodec trait implementation ────────────────────────────────────────

impl<SPI, D> AudioCodec for Wm8778<SPI, D>
where
    SPI: SpiDevice<u16>,
    D: DelayNs,
{
    type Error = Error<SPI::Error>;

    /// Power-on wait, reset, then program both converters identically.
    fn configure(&mut self, format: &CodecFormat) -> Result<(), Self::Error> {
        // Reject before touching the bus.
        Self::interface_word(format.bit_depth, format.format)?;

        self.power_up();
        self.reset()?;
        self.dac_interface(format.bit_depth, format.format)?;
        self.adc_interface(format.bit_depth, format.format)?;
        self.word_bits = Some(format.bit_depth);

        #[cfg(feature = "defmt")]
        defmt::info!("WM8778 configured: {}-bit {}", format.bit_depth, format.format);
        Ok(())
    }

    fn word_bits(&self) -> Option<u8> {
        self.word_bits
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::{self, ErrorType, Operation};

    // ── Mock SPI recording command words ──────────────────────────────

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct MockError;

    impl spi::Error for MockError {
        fn kind(&self) -> spi::ErrorKind {
            spi::ErrorKind::Other
        }
    }

    struct MockSpi {
        log: [u16; 16],
        log_count: usize,
        /// Fail every transaction once this many words were written.
        fail_after: Option<usize>,
    }

    impl MockSpi {
        fn new() -> Self {
            Self {
                log: [0; 16],
                log_count: 0,
                fail_after: None,
            }
        }

        fn words(&self) -> &[u16] {
            &self.log[..self.log_count]
        }
    }

    impl ErrorType for MockSpi {
        type Error = MockError;
    }

    impl SpiDevice<u16> for MockSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u16>]) -> Result<(), MockError> {
            if self.fail_after.is_some_and(|n| self.log_count >= n) {
                return Err(MockError);
            }
            for op in operations.iter() {
                if let Operation::Write(words) = op {
                    for &w in words.iter() {
                        self.log[self.log_count] = w;
                        self.log_count += 1;
                    }
                }
            }
            Ok(())
        }
    }

    // ── Mock delay recording total wait ───────────────────────────────

    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    fn make_codec() -> Wm8778<MockSpi, MockDelay> {
        Wm8778::new(MockSpi::new(), MockDelay::default())
    }

    fn format(bit_depth: u8, format: ChannelFormat) -> CodecFormat {
        CodecFormat { bit_depth, format }
    }

    // ── Configuration sequence ────────────────────────────────────────

    #[test]
    fn configure_writes_reset_then_interfaces() {
        let mut codec = make_codec();
        codec.configure(&format(16, ChannelFormat::I2s)).unwrap();
        assert_eq!(codec.word_bits(), Some(16));
        assert_eq!(codec.dac_interface, 0x0002);
        assert_eq!(codec.adc_interface, 0x0002);

        let (spi, delay) = codec.release();
        assert_eq!(spi.words(), &[0x4E00, 0x1402, 0x1602]);
        assert!(delay.total_ns >= 500_000_000);
    }

    #[test]
    fn right_justified_16_bit_writes_zero_data() {
        let mut codec = make_codec();
        codec
            .configure(&format(16, ChannelFormat::RightJustified))
            .unwrap();
        let (spi, _) = codec.release();
        assert_eq!(spi.words(), &[0x4E00, 0x1400, 0x1600]);
    }

    #[test]
    fn power_on_wait_happens_once() {
        let mut codec = make_codec();
        codec.configure(&format(16, ChannelFormat::I2s)).unwrap();
        codec.configure(&format(24, ChannelFormat::LeftJustified)).unwrap();
        assert_eq!(codec.word_bits(), Some(24));

        let (spi, delay) = codec.release();
        assert_eq!(delay.total_ns, 500_000_000);
        assert_eq!(spi.words()[3..], [0x4E00, 0x1421, 0x1621]);
    }

    #[test]
    fn unsupported_width_is_rejected_before_bus_traffic() {
        let mut codec = make_codec();
        assert_eq!(
            codec.configure(&format(18, ChannelFormat::I2s)),
            Err(Error::WordLength(18))
        );
        assert_eq!(codec.word_bits(), None);
        let (spi, delay) = codec.release();
        assert!(spi.words().is_empty());
        assert_eq!(delay.total_ns, 0);
    }

    #[test]
    fn spi_failure_propagates() {
        let mut codec = make_codec();
        codec.spi.fail_after = Some(1);
        assert_eq!(
            codec.configure(&format(16, ChannelFormat::I2s)),
            Err(Error::Spi(MockError))
        );
        assert_eq!(codec.word_bits(), None);
    }

    #[test]
    fn reset_clears_shadow_registers() {
        let mut codec = make_codec();
        codec.configure(&format(32, ChannelFormat::I2s)).unwrap();
        assert_eq!(codec.dac_interface, 0x0032);
        codec.reset().unwrap();
        assert_eq!(codec.dac_interface, 0);
        assert_eq!(codec.adc_interface, 0);
        assert_eq!(codec.word_bits(), None);
    }

    #[test]
    fn write_register_masks_address_and_data() {
        let mut codec = make_codec();
        codec.write_register(reg::DAC_INTERFACE, 0x0012).unwrap();
        let (spi, _) = codec.release();
        assert_eq!(spi.words(), &[0x1412]);
    }
}
