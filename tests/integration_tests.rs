//! Integration tests for versecast
//!
//! Tests the full pipeline from a typed reference to narrated, highlighted lines.

use std::sync::Mutex;

use versecast::speech::{PlaybackOutcome, Presenter, SimulatedBackend, Voice};
use versecast::{
    books, expand_range, parse_reference, resolve_points, tokenize, BookId, ChapterTable,
    MemoryProvider, NarrationLine, Reader, ReaderConfig, ReaderError, ReferenceAddress, VersePoint,
};

const JOHN_3: &str = "\u{feff}3:16\t하나님이 세상을 이처럼 사랑하사 독생자를 주셨으니\n\
3:17\t하나님이 그 아들을 세상에 보내신 것은 세상을 심판하려 하심이 아니요\n\
3:18 그를 믿는 자는 심판을 받지 아니하는 것이요\n\
not a verse line\n\
4:1\t예수께서 제자를 삼고 세례를 베푸시는 것이\n\
4:2\t(예수께서 친히 세례를 베푸신 것이 아니요 제자들이 베푼 것이라)\n";

#[derive(Default)]
struct Recorder {
    progress: Mutex<Vec<(usize, usize)>>,
    queued: Mutex<Vec<NarrationLine>>,
    clears: Mutex<usize>,
}

impl Presenter for Recorder {
    fn on_queue(&self, lines: &[NarrationLine]) {
        *self.queued.lock().unwrap() = lines.to_vec();
    }

    fn on_progress(&self, line: usize, token: usize) {
        self.progress.lock().unwrap().push((line, token));
    }

    fn on_clear(&self) {
        *self.clears.lock().unwrap() += 1;
    }
}

fn john() -> BookId {
    books::resolve("요한복음").unwrap()
}

fn reader() -> Reader<MemoryProvider, SimulatedBackend, Recorder> {
    let provider = MemoryProvider::new().with_book(john(), JOHN_3);
    let backend = SimulatedBackend::new(vec![Voice::new("Test Voice", "ko-KR")], 400.0);
    Reader::new(ReaderConfig::default(), provider, backend, Recorder::default())
}

#[test]
fn test_lookup_range_builds_headed_lines() {
    let passage = reader().lookup("요 3:16-18").unwrap();
    assert_eq!(
        passage.points,
        vec![VersePoint::new(3, 16), VersePoint::new(3, 17), VersePoint::new(3, 18)]
    );
    let texts: Vec<&str> = passage.lines.iter().map(|l| l.display_text.as_str()).collect();
    assert_eq!(texts[0], "요한복음 3장 16절. 하나님이 세상을 이처럼 사랑하사 독생자를 주셨으니");
    assert_eq!(texts[2], "요한복음 3장 18절. 그를 믿는 자는 심판을 받지 아니하는 것이요");
    assert!(passage.lines.iter().all(|l| l.found));
}

#[test]
fn test_lookup_cross_chapter_range_uses_chapter_lengths() {
    let passage = reader().lookup("john 3:17~4:2").unwrap();
    assert_eq!(
        passage.points,
        vec![
            VersePoint::new(3, 17),
            VersePoint::new(3, 18),
            VersePoint::new(4, 1),
            VersePoint::new(4, 2),
        ]
    );
}

#[test]
fn test_lookup_missing_verse_uses_placeholder() {
    let passage = reader().lookup("요 3:19").unwrap();
    assert_eq!(passage.lines.len(), 1);
    assert!(!passage.lines[0].found);
    assert_eq!(passage.lines[0].display_text, "요한복음 3장 19절. (구절 없음)");
}

#[test]
fn test_elliptical_reference_reuses_last_book() {
    let reader = reader();
    assert_eq!(reader.lookup("3:16").unwrap_err(), ReaderError::MissingBook);

    reader.lookup("요 3:16").unwrap();
    let passage = reader.lookup("3:17").unwrap();
    assert_eq!(passage.address.book, john());
    assert_eq!(passage.points, vec![VersePoint::new(3, 17)]);
}

#[test]
fn test_failed_parse_keeps_remembered_book() {
    let reader = reader();
    reader.lookup("요 3:16").unwrap();

    assert!(matches!(reader.lookup("요 3:18-16"), Err(ReaderError::InvertedRange { .. })));
    assert!(matches!(reader.lookup("없는책 1:1"), Err(ReaderError::UnknownBook(_))));
    assert!(matches!(reader.lookup("요 삼:십육"), Err(ReaderError::MalformedReference { .. })));
    assert_eq!(reader.last_book(), Some(john()));
}

#[test]
fn test_unavailable_source_is_retryable() {
    let err = reader().lookup("창 1:1").unwrap_err();
    assert!(matches!(err, ReaderError::SourceUnavailable { .. }));
    assert!(err.is_retryable());
    assert!(!err.is_user_correctable());
}

#[tokio::test(start_paused = true)]
async fn test_read_aloud_highlights_every_line_to_the_end() {
    let reader = reader();
    let outcome = reader.read_aloud("요 3:16-18").await.unwrap();
    assert_eq!(outcome, PlaybackOutcome::Completed { lines: 3, errors: 0 });

    let queued = reader.engine().presenter().queued.lock().unwrap().clone();
    let progress = reader.engine().presenter().progress.lock().unwrap().clone();
    assert_eq!(queued.len(), 3);
    for (index, line) in queued.iter().enumerate() {
        let tokens: Vec<usize> = progress
            .iter()
            .filter(|(l, _)| *l == index)
            .map(|(_, t)| *t)
            .collect();
        assert!(!tokens.is_empty(), "line {} was never highlighted", index);
        assert!(tokens.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(tokens.last().copied(), line.last_token_index());
    }
    // Lines are highlighted in queue order.
    assert!(progress.windows(2).all(|w| w[0].0 <= w[1].0));
}

#[tokio::test(start_paused = true)]
async fn test_read_aloud_failure_leaves_engine_idle() {
    let reader = reader();
    let err = reader.read_aloud("3:16").await.unwrap_err();
    assert_eq!(err, ReaderError::MissingBook);
    assert_eq!(reader.engine().state(), versecast::speech::EngineState::Idle);
    assert!(reader.engine().presenter().progress.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_clears_and_cancels_playback() {
    let reader = std::sync::Arc::new(reader());
    let playing = {
        let reader = std::sync::Arc::clone(&reader);
        tokio::spawn(async move { reader.read_aloud("요 3:16-18").await })
    };
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
    reader.stop();

    let outcome = playing.await.unwrap().unwrap();
    assert!(matches!(outcome, PlaybackOutcome::Cancelled { .. }));
    let seen = reader.engine().presenter().progress.lock().unwrap().len();
    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
    assert_eq!(reader.engine().presenter().progress.lock().unwrap().len(), seen);
    assert!(*reader.engine().presenter().clears.lock().unwrap() >= 2);
}

#[test]
fn test_parse_then_expand_is_strictly_increasing() {
    let mut table = ChapterTable::new();
    for verse in 1..=20 {
        table.insert(1, verse, "a");
        table.insert(2, verse, "b");
    }
    for raw in ["창 1:1", "창 1:3-9", "창 1:18~2:4", "gen 2:20", "창세기 1:20-2:1"] {
        let (_, points) = resolve_points(raw, None, &table).unwrap();
        assert!(!points.is_empty(), "{} expanded to nothing", raw);
        assert!(points.windows(2).all(|w| w[0] < w[1]), "{} is not increasing", raw);
    }
}

#[test]
fn test_huge_numbers_are_rejected_without_expanding() {
    let mut table = ChapterTable::new();
    table.insert(1, 1, "a");
    for raw in ["요 1:1-4000000000", "요 1:1-4000000000:1"] {
        assert!(
            matches!(
                resolve_points(raw, None, &table),
                Err(ReaderError::MalformedReference { .. })
            ),
            "{} was accepted",
            raw
        );
        assert!(matches!(reader().lookup(raw), Err(ReaderError::MalformedReference { .. })));
    }
}

#[test]
fn test_tokens_reproduce_text() {
    for text in [
        "",
        "...",
        "요한복음 3장 16절. 하나님이 세상을 이처럼 사랑하사",
        "  In the beginning, God created!  ",
        "(구절 없음)",
    ] {
        let joined: String = tokenize(text).into_iter().map(|t| t.text).collect();
        assert_eq!(joined, text);
    }
}

#[test]
fn test_expand_examples() {
    let single = ReferenceAddress::single(john(), VersePoint::new(1, 5));
    assert_eq!(expand_range(&single, |_| 10).unwrap(), vec![VersePoint::new(1, 5)]);

    let range =
        ReferenceAddress::new(john(), VersePoint::new(1, 1), Some(VersePoint::new(1, 3)))
            .unwrap();
    assert_eq!(
        expand_range(&range, |_| 10).unwrap(),
        vec![VersePoint::new(1, 1), VersePoint::new(1, 2), VersePoint::new(1, 3)]
    );

    let inverted = ReferenceAddress {
        book: john(),
        start: VersePoint::new(2, 1),
        end: Some(VersePoint::new(1, 1)),
    };
    assert!(matches!(
        expand_range(&inverted, |_| 10),
        Err(ReaderError::InvertedRange { .. })
    ));
}

#[test]
fn test_alias_resolution_ignores_case_and_whitespace() {
    let expected = books::resolve("jn");
    assert!(expected.is_some());
    assert_eq!(books::resolve("JN"), expected);
    assert_eq!(books::resolve(" jn "), expected);
    assert_eq!(books::resolve("요한복음"), expected);
    assert_eq!(parse_reference("JN 3:16", None).unwrap().book, john());
}
