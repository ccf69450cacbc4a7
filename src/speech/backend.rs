//! Narration backends: the speech engine contract, voice readiness and
//! selection, and a simulated backend driven by the tokio clock.

use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::types::{BackendEvent, Utterance, Voice};
use crate::tokenizer::tokenize;

/// How often [`await_voices`] re-checks the voice list.
const VOICE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A text-to-speech engine.
pub trait NarrationBackend: Send + Sync {
    /// Voices known right now. May be empty until the backend has finished
    /// enumerating them.
    fn voices(&self) -> Vec<Voice>;

    /// Start speaking `utterance`.
    ///
    /// Events for this utterance arrive on the returned receiver: zero or more
    /// boundaries followed by exactly one `Ended` or `Error`. A receiver that
    /// closes without a terminal event is treated as ended.
    fn speak(&self, utterance: Utterance) -> mpsc::UnboundedReceiver<BackendEvent>;

    /// Stop speaking. Safe to call when idle.
    fn cancel(&self);
}

/// Poll the backend's voice list until it is non-empty or `timeout` passes.
///
/// Returns whatever is available at that point, possibly nothing.
pub async fn await_voices<B>(backend: &B, timeout: Duration) -> Vec<Voice>
where
    B: NarrationBackend + ?Sized,
{
    let deadline = Instant::now() + timeout;
    loop {
        let voices = backend.voices();
        if !voices.is_empty() || Instant::now() >= deadline {
            return voices;
        }
        tokio::time::sleep(VOICE_POLL_INTERVAL).await;
    }
}

/// English display name for common language subtags, used when a voice's
/// language tag doesn't match but its name does.
fn language_name(lang: &str) -> Option<&'static str> {
    match lang {
        "ko" => Some("korea"),
        "en" => Some("english"),
        "ja" => Some("japan"),
        "zh" => Some("chinese"),
        "de" => Some("german"),
        "fr" => Some("french"),
        "es" => Some("spanish"),
        _ => None,
    }
}

/// Pick a voice for `lang`: first by language tag, then by a name that
/// mentions the language, then the first voice at all.
pub fn pick_voice(voices: &[Voice], lang: &str) -> Option<Voice> {
    let wanted = lang.trim().to_lowercase();
    let by_tag = voices
        .iter()
        .find(|v| !wanted.is_empty() && v.lang.to_lowercase().starts_with(&wanted));
    let by_name = || {
        let needle = language_name(&wanted)?;
        voices.iter().find(|v| v.name.to_lowercase().contains(needle))
    };
    by_tag.or_else(by_name).or_else(|| voices.first()).cloned()
}

/// Char offsets at which each word of `text` starts.
fn word_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for token in tokenize(text) {
        if token.is_word {
            starts.push(offset);
        }
        offset += token.char_len();
    }
    starts
}

/// Speaks nothing aloud; paces word boundaries at a fixed words-per-minute
/// rate on the tokio clock.
///
/// Must be used inside a tokio runtime. After [`cancel`](NarrationBackend::cancel)
/// every in-flight utterance ends with `Error("interrupted")`.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    voices: Vec<Voice>,
    words_per_minute: f64,
    generation: Arc<AtomicU64>,
}

impl SimulatedBackend {
    pub fn new(voices: Vec<Voice>, words_per_minute: f64) -> Self {
        Self {
            voices,
            words_per_minute,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn word_gap(&self, rate: f32) -> Duration {
        let wpm = (self.words_per_minute * f64::from(rate)).max(1.0);
        Duration::from_secs_f64(60.0 / wpm)
    }
}

impl NarrationBackend for SimulatedBackend {
    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn speak(&self, utterance: Utterance) -> mpsc::UnboundedReceiver<BackendEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let generation = Arc::clone(&self.generation);
        let started = generation.load(Ordering::SeqCst);
        let gap = self.word_gap(utterance.rate);
        let starts = word_starts(&utterance.text);

        tokio::spawn(async move {
            let interrupted = || generation.load(Ordering::SeqCst) != started;
            for char_index in starts {
                if interrupted() {
                    let _ = tx.send(BackendEvent::Error("interrupted".to_string()));
                    return;
                }
                if tx.send(BackendEvent::Boundary { char_index }).is_err() {
                    return;
                }
                tokio::time::sleep(gap).await;
            }
            let terminal = if interrupted() {
                BackendEvent::Error("interrupted".to_string())
            } else {
                BackendEvent::Ended
            };
            let _ = tx.send(terminal);
        });
        rx
    }

    fn cancel(&self) {
        let previous = self.generation.fetch_add(1, Ordering::SeqCst);
        debug!("simulated backend cancelled generation {}", previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voices() -> Vec<Voice> {
        vec![
            Voice::new("Samantha", "en-US"),
            Voice::new("Google 한국의", "ko-KR"),
            Voice::new("Yuna (Korean)", "und"),
        ]
    }

    #[test]
    fn test_pick_voice_by_language_tag() {
        assert_eq!(pick_voice(&voices(), "ko").unwrap().lang, "ko-KR");
        assert_eq!(pick_voice(&voices(), "EN").unwrap().name, "Samantha");
    }

    #[test]
    fn test_pick_voice_by_name() {
        let voices = vec![Voice::new("Samantha", "en-US"), Voice::new("Yuna (Korean)", "und")];
        assert_eq!(pick_voice(&voices, "ko").unwrap().name, "Yuna (Korean)");
    }

    #[test]
    fn test_pick_voice_falls_back_to_first() {
        assert_eq!(pick_voice(&voices(), "sw").unwrap().name, "Samantha");
        assert_eq!(pick_voice(&[], "ko"), None);
    }

    #[test]
    fn test_word_starts() {
        assert_eq!(word_starts("하나님이, 세상을"), vec![0, 6]);
        assert!(word_starts("...").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_voices_times_out_empty() {
        let backend = SimulatedBackend::new(vec![], 170.0);
        let started = Instant::now();
        let voices = await_voices(&backend, Duration::from_millis(2000)).await;
        assert!(voices.is_empty());
        assert!(started.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_voices_returns_immediately_when_ready() {
        let backend = SimulatedBackend::new(voices(), 170.0);
        let started = Instant::now();
        assert_eq!(await_voices(&backend, Duration::from_secs(2)).await.len(), 3);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    /// Enumerates its voices only once `ready_at` has passed.
    struct LateVoices {
        ready_at: Instant,
    }

    impl NarrationBackend for LateVoices {
        fn voices(&self) -> Vec<Voice> {
            if Instant::now() >= self.ready_at {
                voices()
            } else {
                Vec::new()
            }
        }

        fn speak(&self, _utterance: Utterance) -> mpsc::UnboundedReceiver<BackendEvent> {
            let (tx, rx) = mpsc::unbounded_channel();
            let _ = tx.send(BackendEvent::Ended);
            rx
        }

        fn cancel(&self) {}
    }

    #[tokio::test(start_paused = true)]
    async fn test_await_voices_returns_at_next_poll_after_voices_appear() {
        let started = Instant::now();
        let backend = LateVoices {
            ready_at: started + Duration::from_millis(250),
        };
        let found = await_voices(&backend, Duration::from_secs(2)).await;
        assert_eq!(found.len(), 3);
        // Polls at 0, 100, 200 and 300ms; the last one sees the voices.
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    fn utterance(text: &str) -> Utterance {
        Utterance {
            text: text.to_string(),
            voice: None,
            rate: 1.0,
            pitch: 1.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_backend_emits_boundaries_then_ended() {
        let backend = SimulatedBackend::new(voices(), 120.0);
        let mut events = backend.speak(utterance("태초에 말씀이"));
        let mut received = Vec::new();
        while let Some(event) = events.recv().await {
            received.push(event);
        }
        assert_eq!(
            received,
            vec![
                BackendEvent::Boundary { char_index: 0 },
                BackendEvent::Boundary { char_index: 4 },
                BackendEvent::Ended,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_backend_interrupted_by_cancel() {
        let backend = SimulatedBackend::new(voices(), 120.0);
        let mut events = backend.speak(utterance("one two three four"));
        assert_eq!(events.recv().await, Some(BackendEvent::Boundary { char_index: 0 }));
        backend.cancel();
        assert_eq!(
            events.recv().await,
            Some(BackendEvent::Error("interrupted".to_string()))
        );
        assert_eq!(events.recv().await, None);
    }
}
