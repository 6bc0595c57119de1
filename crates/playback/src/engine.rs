//! Playback state machine.
//!
//! `PlaybackEngine` owns at most one playback session: a cursor into a
//! [`PcmClip`] that advances as the DAC FIFO accepts samples. It performs no
//! waiting of its own; the audio task calls [`PlaybackEngine::refill`] and
//! yields between calls. Keeping the engine free of async makes the session
//! lifecycle trivially testable on the host.

use platform::DacOutput;

use crate::clip::PcmClip;

/// Current playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No session exists.
    Idle,
    /// A session is streaming samples into the DAC.
    Playing,
}

/// Errors returned by `PlaybackEngine` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackError<E> {
    /// A session is already active; only one may exist at a time.
    AlreadyPlaying,
    /// The DAC rejected a fill. The session has been dropped.
    Output(E),
}

/// Ephemeral per-clip state.
#[derive(Debug, Clone, Copy)]
struct PlaybackSession<'a> {
    clip: PcmClip<'a>,
    /// Samples already handed to the DAC.
    cursor: usize,
}

impl PlaybackSession<'_> {
    fn remaining(&self) -> &[u8] {
        self.clip.samples().get(self.cursor..).unwrap_or(&[])
    }

    fn exhausted(&self) -> bool {
        self.cursor >= self.clip.len()
    }
}

/// Minimum number of refills per second that keeps a FIFO of `buffer_depth`
/// samples from underrunning at `sample_rate` Hz, i.e. `ceil(rate / depth)`.
///
/// A zero depth cannot be kept fed at any cadence and returns `u32::MAX`.
pub const fn min_refills_per_sec(sample_rate: u32, buffer_depth: usize) -> u32 {
    if buffer_depth == 0 {
        return u32::MAX;
    }
    let depth = if buffer_depth > u32::MAX as usize {
        u32::MAX
    } else {
        buffer_depth as u32
    };
    sample_rate.div_ceil(depth)
}

/// Single-session playback engine.
pub struct PlaybackEngine<'a> {
    session: Option<PlaybackSession<'a>>,
    completed: u32,
}

impl<'a> PlaybackEngine<'a> {
    /// Create an engine in the `Idle` state.
    pub const fn new() -> Self {
        Self {
            session: None,
            completed: 0,
        }
    }

    /// Open a session for `clip`.
    ///
    /// # Errors
    ///
    /// `AlreadyPlaying` when a session is active; the active session is left
    /// untouched.
    pub fn begin<E>(&mut self, clip: PcmClip<'a>) -> Result<(), PlaybackError<E>> {
        if self.session.is_some() {
            return Err(PlaybackError::AlreadyPlaying);
        }
        self.session = Some(PlaybackSession { clip, cursor: 0 });
        Ok(())
    }

    /// One non-blocking refill of `output` from the session cursor.
    ///
    /// Returns `Playing` while samples remain. Once the last sample has been
    /// accepted the session is destroyed and `Idle` is returned. Calling this
    /// without a session is a no-op returning `Idle`.
    ///
    /// # Errors
    ///
    /// A DAC error drops the session and is returned as
    /// [`PlaybackError::Output`].
    pub fn refill<O: DacOutput>(
        &mut self,
        output: &mut O,
    ) -> Result<PlaybackState, PlaybackError<O::Error>> {
        let Some(session) = self.session.as_mut() else {
            return Ok(PlaybackState::Idle);
        };
        if !session.exhausted() {
            match output.fill(session.remaining()) {
                Ok(taken) => session.cursor = session.cursor.saturating_add(taken),
                Err(e) => {
                    self.session = None;
                    return Err(PlaybackError::Output(e));
                }
            }
        }
        if session.exhausted() {
            self.session = None;
            self.completed = self.completed.saturating_add(1);
            return Ok(PlaybackState::Idle);
        }
        Ok(PlaybackState::Playing)
    }

    /// Drop the active session, if any, without counting it as completed.
    pub fn abort(&mut self) {
        self.session = None;
    }

    /// Return the current [`PlaybackState`].
    pub fn state(&self) -> PlaybackState {
        if self.session.is_some() {
            PlaybackState::Playing
        } else {
            PlaybackState::Idle
        }
    }

    /// Samples already handed to the DAC in the active session.
    pub fn position(&self) -> Option<usize> {
        self.session.map(|s| s.cursor)
    }

    /// Sessions that ran to the end of their clip.
    pub fn sessions_completed(&self) -> u32 {
        self.completed
    }
}

impl Default for PlaybackEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}
