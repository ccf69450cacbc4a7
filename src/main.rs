use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::{Mutex, PoisonError};

use log::warn;
use tokio::io::{AsyncBufReadExt, BufReader};

use versecast::speech::{current_word, PlaybackOutcome, Presenter, SimulatedBackend, Voice};
use versecast::{DirectoryProvider, NarrationLine, Reader, ReaderConfig, ReaderError, Token};

const USAGE: &str =
    "Usage: versecast [--config FILE] [--rate R] [--pitch P] [--json] [REFERENCE...]";

type CliReader = Reader<DirectoryProvider, SimulatedBackend, TerminalPresenter>;

#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    rate: Option<f32>,
    pitch: Option<f32>,
    json: bool,
    references: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config needs a file")?;
                options.config = Some(PathBuf::from(path));
            }
            "--rate" => options.rate = Some(parse_number("--rate", iter.next())?),
            "--pitch" => options.pitch = Some(parse_number("--pitch", iter.next())?),
            "--json" => options.json = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{}'", flag)),
            reference => options.references.push(reference.to_string()),
        }
    }
    Ok(options)
}

fn parse_number(flag: &str, value: Option<&String>) -> Result<f32, String> {
    let value = value.ok_or_else(|| format!("{} needs a number", flag))?;
    value
        .parse()
        .map_err(|_| format!("{} expects a number, got '{}'", flag, value))
}

const UNDERLINE: &str = "\x1b[4m";
const NO_UNDERLINE: &str = "\x1b[24m";

/// Tokens `0..=upto` joined back together. With `mark`, the current word is
/// underlined.
fn render_revealed(tokens: &[Token], upto: usize, mark: bool) -> String {
    let end = (upto + 1).min(tokens.len());
    let current = if mark { current_word(tokens, upto) } else { None };
    tokens[..end]
        .iter()
        .enumerate()
        .map(|(index, token)| {
            if Some(index) == current {
                format!("{}{}{}", UNDERLINE, token.text, NO_UNDERLINE)
            } else {
                token.text.clone()
            }
        })
        .collect()
}

#[derive(Default)]
struct TerminalState {
    lines: Vec<NarrationLine>,
    /// Line and token last revealed, while a line is on screen.
    shown: Option<(usize, usize)>,
}

/// Redraws the current line in place as narration reveals it, underlining
/// the word being read.
#[derive(Default)]
struct TerminalPresenter {
    state: Mutex<TerminalState>,
}

impl TerminalPresenter {
    fn state(&self) -> std::sync::MutexGuard<'_, TerminalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TerminalState {
    fn redraw(&self, line: usize, upto: usize, mark: bool) {
        if let Some(current) = self.lines.get(line) {
            print!("\r{}", render_revealed(&current.tokens, upto, mark));
            let _ = io::stdout().flush();
        }
    }
}

impl Presenter for TerminalPresenter {
    fn on_queue(&self, lines: &[NarrationLine]) {
        let mut state = self.state();
        state.lines = lines.to_vec();
        state.shown = None;
    }

    fn on_progress(&self, line: usize, token: usize) {
        let mut state = self.state();
        state.redraw(line, token, true);
        state.shown = Some((line, token));
    }

    fn on_line_end(&self, line: usize) {
        let mut state = self.state();
        if let Some(last) = state.lines.get(line).and_then(|l| l.last_token_index()) {
            state.redraw(line, last, false);
        }
        println!();
        state.shown = None;
    }

    fn on_clear(&self) {
        let mut state = self.state();
        if let Some((line, token)) = state.shown.take() {
            state.redraw(line, token, false);
            println!();
        }
    }
}

async fn run(reader: &CliReader, raw: &str, json: bool) -> Result<(), ReaderError> {
    if json {
        let passage = reader.lookup(raw)?;
        match serde_json::to_string_pretty(&passage) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error writing JSON: {}", e),
        }
        return Ok(());
    }

    tokio::select! {
        outcome = reader.read_aloud(raw) => {
            if let PlaybackOutcome::Completed { errors, .. } = outcome? {
                if errors > 0 {
                    warn!("{} lines failed to narrate", errors);
                }
            }
        }
        _ = tokio::signal::ctrl_c() => {
            reader.stop();
            eprintln!("Stopped.");
        }
    }
    Ok(())
}

fn load_config(options: &Options) -> Result<ReaderConfig, ReaderError> {
    let mut config = match &options.config {
        Some(path) => ReaderConfig::load(path)?,
        None => ReaderConfig::default(),
    };
    if let Some(rate) = options.rate {
        config.rate = rate;
    }
    if let Some(pitch) = options.pitch {
        config.pitch = pitch;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("{}", USAGE);
            process::exit(1);
        }
    };

    let config = match load_config(&options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let provider = DirectoryProvider::new(config.text_dir.clone());
    let backend = SimulatedBackend::new(
        vec![Voice::new("Simulated Korean", "ko-KR")],
        config.pacing.base_wpm,
    );
    let reader = Reader::new(config, provider, backend, TerminalPresenter::default());

    // One-shot mode
    if !options.references.is_empty() {
        let raw = options.references.join(" ");
        if let Err(e) = run(&reader, &raw, options.json).await {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
        return;
    }

    // Interactive mode: one reference per line, the book carries over
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let _ = io::stderr().flush();
        let line = tokio::select! {
            line = input.next_line() => line,
            _ = tokio::signal::ctrl_c() => break,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        };
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }
        if let Err(e) = run(&reader, raw, options.json).await {
            eprintln!("Error: {}", e);
        }
    }
}
