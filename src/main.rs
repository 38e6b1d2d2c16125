pub mod config;
pub mod history;
pub mod pacing;
pub mod runtime;
pub mod script;
pub mod scoring;
pub mod session;
pub mod ui;
pub mod util;

use crate::{
    config::{Config, ConfigStore, FileConfigStore},
    history::{HistoryDb, ScriptProgress, SessionRecord},
    pacing::PaceRate,
    runtime::{CrosstermEventSource, FixedTicker, PromptEvent, Runner, TICK_RATE_MS},
    scoring::{AmplitudeSource, ConfidenceModel, SimulatedAmplitude, SimulatedModel},
    script::Script,
    session::{RecordingSession, SessionState, SessionSummary},
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::rngs::ThreadRng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

/// terminal teleprompter for paced speech practice
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal teleprompter for speech practice: pick a script and a target pace, read along with timed word highlighting, and track your confidence scores across sessions."
)]
pub struct Cli {
    /// builtin script to practice
    #[clap(short = 's', long, value_enum)]
    script: Option<BuiltinScript>,

    /// practice a custom text instead of a builtin script
    #[clap(short = 't', long)]
    text: Option<String>,

    /// read the practice script from a file
    #[clap(short = 'f', long)]
    file: Option<PathBuf>,

    /// target pace in words per minute
    #[clap(short = 'w', long)]
    wpm: Option<u16>,

    /// countdown seconds before recording starts
    #[clap(short = 'c', long)]
    countdown: Option<u8>,

    /// stop the session automatically after this many seconds
    #[clap(short = 'm', long)]
    max_secs: Option<u64>,

    /// list builtin scripts and exit
    #[clap(long)]
    list_scripts: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum BuiltinScript {
    Peppers,
    Seashells,
    Woodchuck,
    Gettysburg,
}

impl BuiltinScript {
    fn key(&self) -> String {
        self.to_string().to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Practice,
    Results,
    History,
}

pub struct App {
    pub config: Config,
    pub script: Script,
    pub session: RecordingSession,
    pub state: AppState,
    pub level: f64,
    pub last_summary: Option<SessionSummary>,
    pub last_score: Option<f64>,
    pub progress: Option<ScriptProgress>,
    pub score_spread: Option<f64>,
    pub recent: Vec<SessionRecord>,
    pub history: Option<HistoryDb>,
    amplitude: SimulatedAmplitude<ThreadRng>,
    model: SimulatedModel<ThreadRng>,
}

impl App {
    /// The history database is injected so callers without one (or tests that
    /// must not touch the real state directory) can pass `None` or an
    /// in-memory database.
    pub fn new(
        cli: &Cli,
        config: Config,
        history: Option<HistoryDb>,
    ) -> Result<Self, Box<dyn Error>> {
        let script = if let Some(text) = &cli.text {
            Script::from_text("custom", "Custom script", text)
        } else if let Some(path) = &cli.file {
            Script::from_file(path)?
        } else {
            Script::builtin(&config.builtin_script)?
        };
        if script.is_empty() {
            return Err("script has no words to practice".into());
        }

        let rate = PaceRate::new(config.clamp_wpm(config.words_per_minute))?;
        let session = RecordingSession::new(script.word_count(), rate)
            .with_countdown(config.countdown_secs);

        Ok(Self {
            config,
            script,
            session,
            state: AppState::Practice,
            level: 0.0,
            last_summary: None,
            last_score: None,
            progress: None,
            score_spread: None,
            recent: Vec::new(),
            history,
            amplitude: SimulatedAmplitude::new(),
            model: SimulatedModel::new(),
        })
    }

    /// Fresh attempt at the same script.
    pub fn new_session(&mut self) {
        let rate = self.session.rate();
        self.session = RecordingSession::new(self.script.word_count(), rate)
            .with_countdown(self.config.countdown_secs);
        self.level = 0.0;
        self.state = AppState::Practice;
    }

    /// Stops the running session, scores it, and records it to history.
    /// Ignored when no session is running.
    pub fn finalize_stop(&mut self) {
        if let Ok(summary) = self.session.stop() {
            let score = self.model.score(&summary);
            if let Some(ref db) = self.history {
                let rec = SessionRecord::from_summary(&self.script.name, &summary, score);
                let _ = db.record_session(&rec);
                self.progress = db.script_progress(&self.script.name).ok().flatten();
                self.score_spread = db
                    .script_scores(&self.script.name)
                    .ok()
                    .and_then(|scores| util::std_dev(&scores));
            }
            self.last_summary = Some(summary);
            self.last_score = Some(score);
            self.state = AppState::Results;
        }
    }

    pub fn open_history(&mut self) {
        if let Some(ref db) = self.history {
            self.recent = db.recent_sessions(12).unwrap_or_default();
        }
        self.state = AppState::History;
    }

    pub fn close_history(&mut self) {
        self.state = if self.last_summary.is_some() {
            AppState::Results
        } else {
            AppState::Practice
        };
    }

    pub fn adjust_wpm(&mut self, delta: i32) {
        let requested = (self.config.words_per_minute as i32 + delta).clamp(1, u16::MAX as i32);
        let clamped = self.config.clamp_wpm(requested as u16);
        if clamped != self.config.words_per_minute {
            self.config.words_per_minute = clamped;
            if let Ok(rate) = PaceRate::new(clamped) {
                self.session.set_rate(rate);
            }
        }
    }
}

fn list_scripts(config: &Config) -> Result<(), Box<dyn Error>> {
    let rate = PaceRate::new(config.clamp_wpm(config.words_per_minute))?;
    for name in script::builtin_names() {
        let s = Script::builtin(&name)?;
        println!(
            "{:<12} {:>3} words  ~{} at {} wpm  ({})",
            name,
            s.word_count(),
            util::format_mmss(s.estimated_secs(rate)),
            rate.wpm(),
            s.title,
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = FileConfigStore::new();
    let mut config = store.load();
    if let Some(wpm) = cli.wpm {
        config.words_per_minute = config.clamp_wpm(wpm);
    }
    if let Some(secs) = cli.countdown {
        config.countdown_secs = secs;
    }
    if let Some(max) = cli.max_secs {
        config.max_secs = Some(max);
    }
    if let Some(builtin) = cli.script {
        config.builtin_script = builtin.key();
    }

    if cli.list_scripts {
        return list_scripts(&config);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let mut app = App::new(&cli, config, HistoryDb::new().ok())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Remember the last-used settings for next time
    let _ = store.save(&app.config);

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        match runner.step() {
            PromptEvent::Tick { second } => {
                let mut dirty = false;
                if app.state == AppState::Practice {
                    match app.session.state() {
                        SessionState::CountingDown | SessionState::Recording => {
                            if app.session.is_recording() {
                                app.level = app.amplitude.level();
                            }
                            if second {
                                app.session.tick();
                                if let Some(max) = app.config.max_secs {
                                    if app.session.is_recording()
                                        && app.session.elapsed_secs() >= max
                                    {
                                        app.finalize_stop();
                                    }
                                }
                            }
                            dirty = true;
                        }
                        _ => runner.resync(),
                    }
                }
                if dirty {
                    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
                }
            }
            PromptEvent::Resize => {
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
            PromptEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
                terminal.draw(|f| f.render_widget(&*app, f.area()))?;
            }
        }
    }

    Ok(())
}

/// Returns true when the app should exit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.state {
        AppState::Practice => match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char(' ') => match app.session.state() {
                // start() from any other state is rejected by the machine;
                // the keymap simply never asks for it
                SessionState::Idle => {
                    let _ = app.session.start();
                }
                SessionState::Recording => app.session.pause(),
                SessionState::Paused => app.session.resume(),
                _ => {}
            },
            KeyCode::Enter => app.finalize_stop(),
            KeyCode::Char('r') => {
                app.session.restart();
                app.level = 0.0;
            }
            KeyCode::Char('h') => app.open_history(),
            KeyCode::Up => app.adjust_wpm(5),
            KeyCode::Down => app.adjust_wpm(-5),
            _ => {}
        },
        AppState::Results => match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('r') | KeyCode::Char('n') => app.new_session(),
            KeyCode::Char('h') => app.open_history(),
            _ => {}
        },
        AppState::History => match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('b') | KeyCode::Backspace => app.close_history(),
            _ => {}
        },
    }
    false
}
