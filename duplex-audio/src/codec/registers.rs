//! WM8778 control-port register map (the subset the driver uses).
//!
//! The control port is write-only. Each command is one 16-bit SPI word:
//! a 7-bit register address followed by 9 data bits, latched on the rising
//! edge of chip select.
//!
//! ```text
//!  15            9 8                     0
//! ┌───────────────┬───────────────────────┐
//! │ address (7)   │       data (9)        │
//! └───────────────┴───────────────────────┘
//! ```

/// Bits the data field occupies.
pub const DATA_MASK: u16 = 0x01FF;

/// Address field position within a command word.
pub const ADDRESS_SHIFT: u16 = 9;

// ── Interface control ──────────────────────────────────────────────────────

/// DAC audio interface control.
/// - Bits 5:4: DACWL word length (0=16, 1=20, 2=24, 3=32 bit)
/// - Bit  3  : DACBCP bit-clock polarity
/// - Bit  2  : DACLRP word-clock polarity
/// - Bits 1:0: DACFMT (0=right-justified, 1=left-justified, 2=I2S)
pub const DAC_INTERFACE: u8 = 0x0A;

/// ADC audio interface control. Same layout as [`DAC_INTERFACE`].
pub const ADC_INTERFACE: u8 = 0x0B;

/// Writing any value returns every register to its default.
pub const SOFTWARE_RESET: u8 = 0x27;

// ── Interface fields ───────────────────────────────────────────────────────

pub const FMT_RIGHT_JUSTIFIED: u16 = 0b00;
pub const FMT_LEFT_JUSTIFIED: u16 = 0b01;
pub const FMT_I2S: u16 = 0b10;

pub const WL_SHIFT: u16 = 4;
pub const WL_16: u16 = 0b00 << WL_SHIFT;
pub const WL_20: u16 = 0b01 << WL_SHIFT;
pub const WL_24: u16 = 0b10 << WL_SHIFT;
pub const WL_32: u16 = 0b11 << WL_SHIFT;

/// Build a command word.
pub const fn command(register: u8, data: u16) -> u16 {
    ((register as u16) << ADDRESS_SHIFT) | (data & DATA_MASK)
}
