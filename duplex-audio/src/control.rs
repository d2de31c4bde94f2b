use crate::config::CodecFormat;

/// Command channel of an audio codec.
///
/// The codec is configured once, before any transfer engine starts, and is
/// not touched again while streaming.
pub trait AudioCodec {
    /// Error type for control operations.
    type Error;

    /// Program the codec's sample width and data-line framing.
    fn configure(&mut self, format: &CodecFormat) -> Result<(), Self::Error>;

    /// Sample width the codec was last configured for, if any.
    fn word_bits(&self) -> Option<u8>;
}
