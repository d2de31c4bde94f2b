//! Bringing a full-duplex stream up.
//!
//! Startup is the only place misconfiguration can be caught: once the
//! engines run, a mismatch shows up only as garbled audio. [`start_session`]
//! therefore validates everything first and touches hardware in a fixed
//! order:
//!
//! 1. validate the [`StreamConfig`] and the buffer size;
//! 2. configure the codec and check it agrees on the sample width;
//! 3. bind each engine to its buffer in circular mode;
//! 4. reset the [`HandoffController`];
//! 5. start the output engine, then the input engine.
//!
//! The buffers are borrowed for `'static`: the engines keep their address
//! after this returns.

use crate::buffer::FrameBufferPair;
use crate::config::StreamConfig;
use crate::control::AudioCodec;
use crate::error::{ConfigError, SessionError};

use super::engine::{TransferConfig, TransferEngine};
use super::handoff::HandoffController;
use super::Direction;

/// Validate, configure and start one streaming session.
///
/// Every check, the codec and both bindings come before the first
/// `start()`, so any of those errors leaves both engines stopped. Only a
/// failing `input.start()` leaves a partial session: the output engine is
/// already running and, with no `stop()`, keeps running.
pub fn start_session<C, I, O, const FRAME: usize>(
    config: &StreamConfig,
    codec: &mut C,
    buffers: &'static FrameBufferPair<FRAME>,
    controller: &HandoffController,
    input: &mut I,
    output: &mut O,
) -> Result<(), SessionError<C::Error, I::Error>>
where
    C: AudioCodec,
    I: TransferEngine,
    O: TransferEngine<Error = I::Error>,
{
    config.validate()?;
    if config.frame_samples != FRAME {
        return Err(ConfigError::FrameSizeMismatch {
            configured: config.frame_samples,
            buffer: FRAME,
        }
        .into());
    }
    let rx = TransferConfig::circular(buffers.input.region(), Direction::Input)?;
    let tx = TransferConfig::circular(buffers.output.region(), Direction::Output)?;

    codec
        .configure(&config.codec_format())
        .map_err(SessionError::Codec)?;
    let codec_bits = codec.word_bits().unwrap_or(0);
    for transfer in [&rx, &tx] {
        if transfer.word_bits() != codec_bits {
            return Err(ConfigError::WordSizeMismatch {
                engine_bits: transfer.word_bits(),
                codec_bits,
            }
            .into());
        }
    }

    output.configure(&tx).map_err(SessionError::Engine)?;
    input.configure(&rx).map_err(SessionError::Engine)?;

    controller.reset();

    output.start().map_err(SessionError::Engine)?;
    input.start().map_err(SessionError::Engine)?;

    #[cfg(feature = "defmt")]
    defmt::info!(
        "streaming: {} samples/frame, {} Hz, {}-bit, frame period {} us",
        config.frame_samples,
        config.sample_rate,
        config.bit_depth,
        config.frame_period_us()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChannelFormat, CodecFormat};
    use crate::io::engine::TransferEvent;
    use crate::io::handoff::HandoffState;
    use crate::io::sim::{SimEngine, SimError};

    fn leak_pair() -> &'static FrameBufferPair<4> {
        Box::leak(Box::new(FrameBufferPair::new()))
    }

    /// Binds like a real engine but fails to start.
    struct RefusesStart(SimEngine);

    impl TransferEngine for RefusesStart {
        type Error = SimError;

        fn configure(&mut self, config: &TransferConfig) -> Result<(), SimError> {
            self.0.configure(config)
        }

        fn start(&mut self) -> Result<(), SimError> {
            Err(SimError::NotConfigured)
        }

        fn take_event(&mut self) -> Option<TransferEvent> {
            self.0.take_event()
        }
    }

    /// Codec that records the format it was given.
    struct RecordingCodec {
        configured: Option<CodecFormat>,
        /// Width to report back, overriding the requested one.
        report_bits: Option<u8>,
        fail: bool,
    }

    impl RecordingCodec {
        fn new() -> Self {
            RecordingCodec {
                configured: None,
                report_bits: None,
                fail: false,
            }
        }
    }

    impl AudioCodec for RecordingCodec {
        type Error = &'static str;

        fn configure(&mut self, format: &CodecFormat) -> Result<(), Self::Error> {
            if self.fail {
                return Err("bus error");
            }
            self.configured = Some(*format);
            Ok(())
        }

        fn word_bits(&self) -> Option<u8> {
            self.report_bits
                .or(self.configured.map(|f| f.bit_depth))
        }
    }

    fn small_config() -> StreamConfig {
        StreamConfig {
            frame_samples: 4,
            ..StreamConfig::default()
        }
    }

    #[test]
    fn starts_both_engines() {
        let buffers = leak_pair();
        let controller = HandoffController::new();
        let mut codec = RecordingCodec::new();
        let (mut rx, mut tx) = (SimEngine::new(), SimEngine::new());

        start_session(&small_config(), &mut codec, buffers, &controller, &mut rx, &mut tx)
            .unwrap();

        assert!(rx.is_running());
        assert!(tx.is_running());
        assert_eq!(
            codec.configured,
            Some(CodecFormat {
                bit_depth: 16,
                format: ChannelFormat::I2s
            })
        );
        assert_eq!(rx.current_half(), Some(crate::buffer::Half::A));
    }

    #[test]
    fn resets_controller_before_start() {
        let buffers = leak_pair();
        let controller = HandoffController::new();
        controller.on_full_complete(Direction::Input);
        controller.on_full_complete(Direction::Output);

        let (mut rx, mut tx) = (SimEngine::new(), SimEngine::new());
        start_session(
            &small_config(),
            &mut RecordingCodec::new(),
            buffers,
            &controller,
            &mut rx,
            &mut tx,
        )
        .unwrap();

        assert_eq!(controller.state(Direction::Input), HandoffState::INITIAL);
        assert_eq!(controller.state(Direction::Output), HandoffState::INITIAL);
    }

    #[test]
    fn frame_mismatch_fails_before_codec() {
        let buffers = leak_pair();
        let controller = HandoffController::new();
        let mut codec = RecordingCodec::new();
        let (mut rx, mut tx) = (SimEngine::new(), SimEngine::new());

        let err = start_session(
            &StreamConfig::default(),
            &mut codec,
            buffers,
            &controller,
            &mut rx,
            &mut tx,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            SessionError::Config(ConfigError::FrameSizeMismatch {
                configured: 128,
                buffer: 4
            })
        ));
        assert_eq!(codec.configured, None);
        assert!(!rx.is_running() && !tx.is_running());
    }

    #[test]
    fn invalid_config_fails_fast() {
        let buffers = leak_pair();
        let controller = HandoffController::new();
        let config = StreamConfig {
            bit_depth: 24,
            ..small_config()
        };
        let (mut rx, mut tx) = (SimEngine::new(), SimEngine::new());

        let err = start_session(
            &config,
            &mut RecordingCodec::new(),
            buffers,
            &controller,
            &mut rx,
            &mut tx,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Config(ConfigError::UnsupportedBitDepth(24))
        ));
    }

    #[test]
    fn codec_failure_leaves_engines_stopped() {
        let buffers = leak_pair();
        let controller = HandoffController::new();
        let mut codec = RecordingCodec::new();
        codec.fail = true;
        let (mut rx, mut tx) = (SimEngine::new(), SimEngine::new());

        let err = start_session(&small_config(), &mut codec, buffers, &controller, &mut rx, &mut tx)
            .unwrap_err();
        assert!(matches!(err, SessionError::Codec("bus error")));
        assert!(!rx.is_running() && !tx.is_running());
    }

    #[test]
    fn codec_word_width_must_match_engines() {
        let buffers = leak_pair();
        let controller = HandoffController::new();
        let mut codec = RecordingCodec::new();
        codec.report_bits = Some(24);
        let (mut rx, mut tx) = (SimEngine::new(), SimEngine::new());

        let err = start_session(&small_config(), &mut codec, buffers, &controller, &mut rx, &mut tx)
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Config(ConfigError::WordSizeMismatch {
                engine_bits: 16,
                codec_bits: 24
            })
        ));
        assert!(!rx.is_running() && !tx.is_running());
    }

    #[test]
    fn engine_failure_is_reported() {
        let buffers = leak_pair();
        let controller = HandoffController::new();
        let (mut rx, mut tx) = (SimEngine::new(), SimEngine::new());
        start_session(
            &small_config(),
            &mut RecordingCodec::new(),
            buffers,
            &controller,
            &mut rx,
            &mut tx,
        )
        .unwrap();

        // A second session on running engines is refused.
        let err = start_session(
            &small_config(),
            &mut RecordingCodec::new(),
            buffers,
            &controller,
            &mut rx,
            &mut tx,
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Engine(SimError::AlreadyRunning)));
    }

    #[test]
    fn failed_input_start_leaves_output_running() {
        let buffers = leak_pair();
        let controller = HandoffController::new();
        let mut rx = RefusesStart(SimEngine::new());
        let mut tx = SimEngine::new();

        let err = start_session(
            &small_config(),
            &mut RecordingCodec::new(),
            buffers,
            &controller,
            &mut rx,
            &mut tx,
        )
        .unwrap_err();

        assert!(matches!(err, SessionError::Engine(SimError::NotConfigured)));
        assert!(!rx.0.is_running());
        assert!(tx.is_running());
    }
}
