//! `LIGHT` consumer driving one playback session at a time.
//!
//! ```text
//!   Idle ──wait_any({LIGHT})──▶ Playing ──clip queued──▶ Draining ──FIFO empty──▶ stop_all ──▶ clear(LIGHT) ──▶ Idle
//!                                 │  ▲                    │  ▲
//!                                 └──┘ refill + yield_now └──┘ yield_now
//! ```
//!
//! # Refill budget
//!
//! The DAC drains its FIFO at the clip's sample rate, so the loop must
//! come back at least `sample_rate / buffer_depth` times per second
//! ([`min_refills_per_sec`]). Between refills the task only yields, which
//! keeps it runnable; an underrun is heard, never reported.
//!
//! `LIGHT` stays set for the whole session. New assertions during playback
//! coalesce into the running session, and the flag is cleared only after
//! the session is gone.

use embassy_futures::yield_now;
use platform::DacOutput;
use playback::{min_refills_per_sec, PcmClip, PlaybackEngine, PlaybackError, PlaybackState};

use crate::config::AudioResponderConfig;
use crate::fmt::dbg_fmt;
use crate::signals::{Flag, SignalRegister};

/// How a playback session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionOutcome {
    /// Every sample was played out of the DAC FIFO.
    Completed,
    /// The DAC failed; the rest of the clip was dropped.
    Aborted,
}

/// Plays `clip` through `dac` each time `LIGHT` is raised.
pub struct AudioResponder<D> {
    register: &'static SignalRegister,
    config: AudioResponderConfig,
    dac: D,
    clip: PcmClip<'static>,
    engine: PlaybackEngine<'static>,
}

impl<D: DacOutput> AudioResponder<D> {
    /// Take ownership of the output channel and the clip to play.
    pub fn new(
        register: &'static SignalRegister,
        config: AudioResponderConfig,
        dac: D,
        clip: PcmClip<'static>,
    ) -> Self {
        Self {
            register,
            config,
            dac,
            clip,
            engine: PlaybackEngine::new(),
        }
    }

    /// Parameters this responder was created with.
    pub fn config(&self) -> &AudioResponderConfig {
        &self.config
    }

    /// The owned output channel.
    pub fn dac(&self) -> &D {
        &self.dac
    }

    /// Sessions that played to the end.
    pub fn sessions_completed(&self) -> u32 {
        self.engine.sessions_completed()
    }

    /// Wait for `LIGHT`, play the clip to the end, then clear `LIGHT`.
    pub async fn respond_once(&mut self) -> SessionOutcome {
        self.register.wait_any(Flag::Light.into()).await;
        debug!("LIGHT: playing");
        let outcome = self.play().await;
        self.register.clear(Flag::Light);
        debug!("LIGHT cleared");
        outcome
    }

    /// Serve `LIGHT` forever.
    pub async fn run(mut self) -> ! {
        info!("audio responder on GPIO{}", self.config.pin.number());
        loop {
            self.respond_once().await;
        }
    }

    async fn play(&mut self) -> SessionOutcome {
        let rate = self.clip.sample_rate();
        let outcome = if let Err(e) = self.dac.start(rate) {
            error!("DAC start failed: {:?}", dbg_fmt(&e));
            SessionOutcome::Aborted
        } else {
            debug!(
                "session: {} samples at {} Hz, refill >= {}/s",
                self.clip.len(),
                rate,
                min_refills_per_sec(rate, self.dac.buffer_depth())
            );
            self.stream().await
        };
        if let Err(e) = self.dac.stop_all() {
            warn!("DAC stop failed: {:?}", dbg_fmt(&e));
        }
        outcome
    }

    async fn stream(&mut self) -> SessionOutcome {
        if let Err(PlaybackError::AlreadyPlaying) = self.engine.begin::<D::Error>(self.clip) {
            // Left behind by a `respond_once` future dropped mid-clip.
            warn!("stale session dropped");
            self.engine.abort();
            return SessionOutcome::Aborted;
        }
        loop {
            match self.engine.refill(&mut self.dac) {
                Ok(PlaybackState::Playing) => yield_now().await,
                Ok(PlaybackState::Idle) => break,
                Err(PlaybackError::Output(e)) => {
                    warn!("DAC fill failed, session dropped: {:?}", dbg_fmt(&e));
                    return SessionOutcome::Aborted;
                }
                Err(PlaybackError::AlreadyPlaying) => return SessionOutcome::Aborted,
            }
        }
        // The whole clip is queued; let the FIFO play out before stop_all.
        while self.dac.queued() > 0 {
            yield_now().await;
        }
        debug!("session complete");
        SessionOutcome::Completed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use platform::mocks::MockDac;

    static BARK: [u8; 256] = [0x80; 256];

    fn clip() -> PcmClip<'static> {
        PcmClip::from_raw(&BARK, 8_000)
    }

    #[tokio::test]
    async fn test_session_plays_whole_clip_then_clears() {
        static REGISTER: SignalRegister = SignalRegister::new();
        REGISTER.create().unwrap();
        let mut audio = AudioResponder::new(
            &REGISTER,
            AudioResponderConfig::default(),
            MockDac::new(64, 16),
            clip(),
        );
        REGISTER.set(Flag::Light).unwrap();

        assert_eq!(audio.respond_once().await, SessionOutcome::Completed);

        assert_eq!(audio.dac().accepted(), BARK.len());
        assert_eq!(audio.dac().played(), BARK.len());
        assert_eq!(audio.dac().sample_rate(), 8_000);
        assert_eq!(audio.dac().starts(), 1);
        assert_eq!(audio.dac().stops(), 1);
        assert!(!audio.dac().is_running());
        assert_eq!(audio.sessions_completed(), 1);
        assert!(REGISTER.pending().is_empty());
    }

    #[tokio::test]
    async fn test_dac_failure_still_clears_flag() {
        static REGISTER: SignalRegister = SignalRegister::new();
        REGISTER.create().unwrap();
        let mut audio = AudioResponder::new(
            &REGISTER,
            AudioResponderConfig::default(),
            MockDac::new(64, 16).fail_after(2),
            clip(),
        );
        REGISTER.set(Flag::Light).unwrap();

        assert_eq!(audio.respond_once().await, SessionOutcome::Aborted);
        assert_eq!(audio.dac().stops(), 1);
        assert_eq!(audio.sessions_completed(), 0);
        assert!(REGISTER.pending().is_empty());
    }

    #[tokio::test]
    async fn test_other_flags_are_untouched() {
        static REGISTER: SignalRegister = SignalRegister::new();
        REGISTER.create().unwrap();
        let mut audio = AudioResponder::new(
            &REGISTER,
            AudioResponderConfig::default(),
            MockDac::new(256, 256),
            clip(),
        );
        REGISTER.set(Flag::Touch).unwrap();
        REGISTER.set(Flag::Light).unwrap();

        audio.respond_once().await;
        assert_eq!(REGISTER.pending(), Flag::Touch.into());
    }

    #[tokio::test]
    async fn test_fifo_tail_plays_before_stop() {
        static REGISTER: SignalRegister = SignalRegister::new();
        static LONG_BARK: [u8; 4000] = [0x80; 4000];
        REGISTER.create().unwrap();
        let mut audio = AudioResponder::new(
            &REGISTER,
            AudioResponderConfig::default(),
            MockDac::new(1000, 100),
            PcmClip::from_raw(&LONG_BARK, 8_000),
        );
        REGISTER.set(Flag::Light).unwrap();

        assert_eq!(audio.respond_once().await, SessionOutcome::Completed);

        assert_eq!(audio.dac().played(), LONG_BARK.len());
        assert_eq!(audio.dac().discarded(), 0);
        assert_eq!(audio.dac().stops(), 1);
    }

    #[tokio::test]
    async fn test_dropped_session_is_discarded_on_next_wake() {
        use embassy_futures::select::{select, Either};

        static REGISTER: SignalRegister = SignalRegister::new();
        REGISTER.create().unwrap();
        let mut audio = AudioResponder::new(
            &REGISTER,
            AudioResponderConfig::default(),
            MockDac::new(64, 16),
            clip(),
        );
        REGISTER.set(Flag::Light).unwrap();

        // The first refill yields, so the empty future wins and the
        // session is abandoned mid-clip.
        let raced = select(audio.respond_once(), async {}).await;
        assert!(matches!(raced, Either::Second(())));
        assert!(REGISTER.pending().contains(Flag::Light));

        assert_eq!(audio.respond_once().await, SessionOutcome::Aborted);
        assert!(REGISTER.pending().is_empty());

        REGISTER.set(Flag::Light).unwrap();
        assert_eq!(audio.respond_once().await, SessionOutcome::Completed);
        assert_eq!(audio.sessions_completed(), 1);
    }
}
