//! Synchronization engine
//!
//! Narrates a queue of lines one after another and keeps the visual highlight
//! in step with the audio.
//!
//! Each line is driven by a single `select!` loop over three sources:
//! session changes (cancellation wins), backend events for the line's
//! utterance, and the fallback estimator's interval. Everything a session
//! does is tagged with its id; once the id is no longer current nothing more
//! reaches the presenter.

use log::{debug, info, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use super::backend::{await_voices, pick_voice, NarrationBackend};
use super::presenter::Presenter;
use super::tracker::HighlightTracker;
use super::types::{BackendEvent, EngineState, PacingConfig, PlaybackOutcome, Utterance, Voice};
use crate::config::validate_voice_params;
use crate::error::ReaderError;
use crate::narration::NarrationLine;

enum LineEnd {
    Finished { failed: bool },
    Cancelled,
}

/// Drives a [`NarrationBackend`] and a [`Presenter`] through one playback
/// session at a time.
///
/// Starting a new session with [`play`](SyncEngine::play) supersedes the
/// current one. [`cancel`](SyncEngine::cancel) can be called from anywhere,
/// including while `play` is pending on another task.
///
/// Presenter calls happen while the state lock is held, and session changes
/// take the same lock. Once `cancel` returns, nothing from the cancelled
/// session reaches the presenter. A presenter must not call back into the
/// engine.
pub struct SyncEngine<B, P> {
    backend: B,
    presenter: P,
    pacing: PacingConfig,
    voice_lang: String,
    voice_timeout: Duration,
    session: watch::Sender<u64>,
    state: Mutex<EngineState>,
}

impl<B: NarrationBackend, P: Presenter> SyncEngine<B, P> {
    pub fn new(backend: B, presenter: P) -> Self {
        let (session, _) = watch::channel(0);
        Self {
            backend,
            presenter,
            pacing: PacingConfig::default(),
            voice_lang: "ko".to_string(),
            voice_timeout: Duration::from_secs(2),
            session,
            state: Mutex::new(EngineState::Idle),
        }
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    /// Preferred voice language and how long to wait for voices to appear.
    pub fn with_voice(mut self, lang: impl Into<String>, timeout: Duration) -> Self {
        self.voice_lang = lang.into();
        self.voice_timeout = timeout;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn state(&self) -> EngineState {
        *self.lock_state()
    }

    /// Stop narration, tear down the active line and clear the reading
    /// marker. Safe to call when idle.
    pub fn cancel(&self) {
        {
            let mut state = self.lock_state();
            self.session.send_modify(|id| *id += 1);
            *state = EngineState::Idle;
            self.presenter.on_clear();
        }
        self.backend.cancel();
    }

    /// Narrate `queue` line by line at `rate` and `pitch`.
    ///
    /// Resolves once every line has been narrated, or as soon as the session
    /// is cancelled or superseded. A backend error on one line counts as the
    /// end of that line; narration carries on with the next.
    ///
    /// # Errors
    /// [`ReaderError::Config`] when `rate` or `pitch` is not a positive number.
    pub async fn play(
        &self,
        queue: Vec<NarrationLine>,
        rate: f32,
        pitch: f32,
    ) -> Result<PlaybackOutcome, ReaderError> {
        validate_voice_params(rate, pitch)?;
        self.cancel();
        let session = self.begin_session();
        let mut watcher = self.session.subscribe();
        info!(
            "session {}: narrating {} lines (rate {}, pitch {})",
            session,
            queue.len(),
            rate,
            pitch
        );
        if !self.present(session, |presenter| presenter.on_queue(&queue)) {
            return Ok(PlaybackOutcome::Cancelled { line: 0 });
        }

        let voices = tokio::select! {
            biased;
            _ = watcher.changed() => {
                debug!("session {} superseded while waiting for voices", session);
                return Ok(PlaybackOutcome::Cancelled { line: 0 });
            }
            voices = await_voices(&self.backend, self.voice_timeout) => voices,
        };
        let voice = pick_voice(&voices, &self.voice_lang);
        match &voice {
            Some(voice) => debug!(
                "session {}: using voice {} ({})",
                session, voice.name, voice.lang
            ),
            None => warn!(
                "no voice available for '{}'; narrating with the backend default",
                self.voice_lang
            ),
        }

        let mut errors = 0;
        for (index, line) in queue.iter().enumerate() {
            if !self.is_current(session) {
                return Ok(PlaybackOutcome::Cancelled { line: index });
            }
            self.set_state(session, EngineState::Playing { line: index });
            let end = self
                .narrate_line(session, &mut watcher, index, line, voice.clone(), rate, pitch)
                .await;
            match end {
                LineEnd::Finished { failed } => {
                    if failed {
                        errors += 1;
                    }
                }
                LineEnd::Cancelled => {
                    debug!("session {} cancelled on line {}", session, index);
                    return Ok(PlaybackOutcome::Cancelled { line: index });
                }
            }
        }

        self.set_state(session, EngineState::Idle);
        info!(
            "session {}: finished {} lines ({} backend errors)",
            session,
            queue.len(),
            errors
        );
        Ok(PlaybackOutcome::Completed {
            lines: queue.len(),
            errors,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn narrate_line(
        &self,
        session: u64,
        watcher: &mut watch::Receiver<u64>,
        index: usize,
        line: &NarrationLine,
        voice: Option<Voice>,
        rate: f32,
        pitch: f32,
    ) -> LineEnd {
        let mut tracker = HighlightTracker::new(line);
        let pacing = self.pacing.estimate(line.word_count(), rate);
        debug!(
            "line {}: {} words, estimated {:?}, tick {:?}",
            index,
            line.word_count(),
            pacing.estimated,
            pacing.tick
        );

        if !self.present(session, |presenter| presenter.on_line_start(index)) {
            return LineEnd::Cancelled;
        }
        let mut events = self.backend.speak(Utterance {
            text: line.display_text.clone(),
            voice,
            rate,
            pitch,
        });
        let mut ticker = tokio::time::interval_at(Instant::now() + pacing.tick, pacing.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let failed = loop {
            tokio::select! {
                biased;
                changed = watcher.changed() => {
                    if changed.is_err() || !self.is_current(session) {
                        return LineEnd::Cancelled;
                    }
                }
                event = events.recv() => match event {
                    Some(BackendEvent::Boundary { char_index }) => {
                        if let Some(token) = tracker.on_boundary(char_index) {
                            self.report(session, index, token);
                        }
                    }
                    Some(BackendEvent::Ended) => break false,
                    Some(BackendEvent::Error(message)) => {
                        let error =
                            ReaderError::NarrationBackend(format!("line {}: {}", index, message));
                        warn!("{}", error);
                        break true;
                    }
                    None => {
                        debug!("line {}: event stream closed without a terminal event", index);
                        break false;
                    }
                },
                _ = ticker.tick() => {
                    if let Some(token) = tracker.on_tick() {
                        self.report(session, index, token);
                    }
                }
            }
        };
        drop(ticker);

        let closing = tracker.finish();
        let delivered = self.present(session, |presenter| {
            if let Some(token) = closing {
                presenter.on_progress(index, token);
            }
            presenter.on_line_end(index);
        });
        if delivered {
            LineEnd::Finished { failed }
        } else {
            LineEnd::Cancelled
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_session(&self) -> u64 {
        let _state = self.lock_state();
        let mut session = 0;
        self.session.send_modify(|id| {
            *id += 1;
            session = *id;
        });
        session
    }

    fn is_current(&self, session: u64) -> bool {
        *self.session.borrow() == session
    }

    /// Run `f` against the presenter if `session` is still current. The check
    /// and the call happen under the state lock, so `cancel` cannot slip in
    /// between them. Returns whether `f` ran.
    fn present(&self, session: u64, f: impl FnOnce(&P)) -> bool {
        let _state = self.lock_state();
        if !self.is_current(session) {
            return false;
        }
        f(&self.presenter);
        true
    }

    fn set_state(&self, session: u64, state: EngineState) {
        let mut current = self.lock_state();
        if self.is_current(session) {
            *current = state;
        }
    }

    fn report(&self, session: u64, line: usize, token: usize) {
        if !self.present(session, |presenter| presenter.on_progress(line, token)) {
            debug!("dropping stale progress from session {}", session);
        }
    }
}
