mod ui;

use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
};

use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{debug, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use triads::{
    audio::SilentCue,
    catalog::{ChordType, DifficultyFilter},
    clock::SystemClock,
    config::{ConfigStore, FileConfigStore},
    keymap::{self, KeyCommand},
    runtime::{CrosstermEventSource, FixedTicker, PracticeEvent, Runner},
    settings::{GameMode, Language, SelectionMode},
    Catalog, SessionEngine, Settings, SettingsUpdate,
};

/// sleek piano chord practice tui with timed drills and self-paced reveal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Practice major and minor triads on a virtual keyboard: race a countdown in speed mode, or reveal and advance at your own pace in beginner mode."
)]
pub struct Cli {
    /// practice mode
    #[clap(short = 'm', long, value_enum)]
    mode: Option<GameMode>,

    /// seconds per chord in speed mode
    #[clap(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=10))]
    countdown: Option<u8>,

    /// show the chord on the keyboard while the countdown runs (speed mode)
    #[clap(long, action = ArgAction::Set)]
    show_keys: Option<bool>,

    /// reveal every new chord straight away (beginner mode)
    #[clap(long, action = ArgAction::Set)]
    auto_reveal: Option<bool>,

    /// play each chord as it is shown
    #[clap(long, action = ArgAction::Set)]
    sound: Option<bool>,

    /// language for note and chord names
    #[clap(short = 'l', long, value_enum)]
    language: Option<Language>,

    /// chord types to practice, comma separated
    #[clap(short = 't', long, value_enum, value_delimiter = ',')]
    types: Option<Vec<ChordType>>,

    /// difficulty tier to practice
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<DifficultyFilter>,

    /// practice only these chords, e.g. C-major,A-minor
    #[clap(long, value_delimiter = ',')]
    chords: Option<Vec<String>>,

    /// read preferences from this file instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// seed for reproducible chord order
    #[clap(long)]
    seed: Option<u64>,
}

impl Cli {
    /// Command-line flags as overrides on top of the config file
    fn settings_update(&self) -> SettingsUpdate {
        SettingsUpdate {
            language: self.language,
            game_mode: self.mode,
            countdown_secs: self.countdown,
            show_on_keyboard: self.show_keys,
            auto_reveal: self.auto_reveal,
            sound_enabled: self.sound,
            chord_types: self.types.as_ref().map(|t| t.iter().copied().collect()),
            difficulty: self.difficulty,
            selection_mode: self.chords.as_ref().map(|_| SelectionMode::Selected),
            selected_chord_ids: self.chords.as_ref().map(|c| c.iter().cloned().collect()),
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

pub struct App {
    pub engine: SessionEngine<SilentCue, SystemClock>,
}

impl App {
    pub fn new(catalog: Arc<Catalog>, settings: Settings, seed: Option<u64>) -> Self {
        let engine = SessionEngine::new(catalog, settings, SilentCue, SystemClock);
        let engine = match seed {
            Some(seed) => engine.with_seed(seed),
            None => engine,
        };
        Self { engine }
    }
}

fn load_settings(cli: &Cli, catalog: &Catalog) -> Settings {
    let store = cli.config_store();
    debug!("loading preferences from {}", store.path().display());
    let mut settings = Settings::from(store.load());
    settings.apply(cli.settings_update());

    for id in &settings.selected_chord_ids {
        if catalog.get(id).is_none() {
            warn!("unknown chord {id:?} in selection");
        }
    }
    settings
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let catalog = Arc::new(Catalog::builtin()?);
    let settings = load_settings(&cli, &catalog);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(catalog, settings, cli.seed);
    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            PracticeEvent::Tick => {
                app.engine.on_tick();
            }
            PracticeEvent::Resize => {}
            PracticeEvent::Key(key) => {
                let snapshot = app.engine.snapshot();
                match keymap::action_for(&key, &snapshot, app.engine.settings()) {
                    Some(KeyCommand::Quit) => break,
                    Some(KeyCommand::Session(action)) => {
                        app.engine.dispatch(action);
                    }
                    None => {}
                }
            }
        }
    }

    app.engine.stop();
    Ok(())
}
