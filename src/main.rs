pub mod ui;

use std::{
    cell::Cell,
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    rc::Rc,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Frame, Terminal,
};
use tracing::{info, warn};

use setpace::{
    app_dirs::AppDirs,
    catalog::{self, Catalog},
    celebration::Celebration,
    config::{Config, ConfigStore, FileConfigStore},
    cues::{CuePlayer, SilentCues, TerminalBell},
    logging,
    momentary::MomentaryDisable,
    runtime::{CrosstermEventSource, FixedTicker, Runner, TimerEvent},
    store::FileCommitmentStore,
    Advance, CommitmentLevel, Phase, Set, TimerMachine, Workout,
};

use crate::ui::screen::{current_screen, ScreenAction};

/// interval workout timer with supersets, auto-started rests, and commitment-scaled volume
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "An interval workout timer for the terminal. Pick a workout, choose how hard to commit, and follow the sets: timed sets count down, rep sets wait for you, rests start on their own."
)]
pub struct Cli {
    /// open this workout directly instead of the workout list
    #[clap(short = 'w', long)]
    workout: Option<String>,

    /// add a workout from a JSON file to the catalog
    #[clap(short = 'f', long)]
    workout_file: Option<PathBuf>,

    /// commitment level to use (try-it, easy-win, comfortable, standard, push-it); overrides the remembered one
    #[clap(short = 'l', long)]
    level: Option<CommitmentLevel>,

    /// print the available workouts and exit
    #[clap(long)]
    list: bool,

    /// no terminal bell on set start and end
    #[clap(long)]
    mute: bool,

    /// skip the confetti when a workout is finished
    #[clap(long)]
    no_celebrate: bool,

    /// milliseconds between timer ticks
    #[clap(long)]
    tick_rate: Option<u64>,

    /// write logs here instead of the default state directory
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// log every state transition
    #[clap(short = 'v', long)]
    verbose: bool,

    /// persist the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer command line overrides over the stored configuration
    fn apply_to(&self, mut config: Config) -> Config {
        if self.mute {
            config.sound = false;
        }
        if self.no_celebrate {
            config.celebrate = false;
        }
        if let Some(ms) = self.tick_rate {
            config.tick_rate_ms = ms.max(1);
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    WorkoutList,
    WorkoutDetail,
    Timer,
    Finished,
}

#[derive(Debug)]
pub struct App {
    pub catalog: Catalog,
    pub state: AppState,
    pub list_cursor: usize,
    pub selected: Option<usize>,
    pub machine: TimerMachine,
    pub done_lock: MomentaryDisable,
    pub celebration: Celebration,
    pub settings: Config,
    pub viewport: Rect,
    level_override: Option<CommitmentLevel>,
    needs_redraw: Rc<Cell<bool>>,
    entered_set: Rc<Cell<bool>>,
}

impl App {
    pub fn new(catalog: Catalog, mut machine: TimerMachine, settings: Config) -> Self {
        let needs_redraw = Rc::new(Cell::new(true));
        let entered_set = Rc::new(Cell::new(false));
        let last_index = Cell::new(None);

        let redraw = Rc::clone(&needs_redraw);
        let entered = Rc::clone(&entered_set);
        machine.subscribe(move |snapshot| {
            redraw.set(true);
            if last_index.replace(Some(snapshot.current_set_index)) != Some(snapshot.current_set_index) {
                entered.set(true);
            }
        });

        Self {
            catalog,
            state: AppState::WorkoutList,
            list_cursor: 0,
            selected: None,
            machine,
            done_lock: MomentaryDisable::inactive(),
            celebration: Celebration::new(),
            settings,
            viewport: Rect::new(0, 0, 80, 24),
            level_override: None,
            needs_redraw,
            entered_set,
        }
    }

    pub fn with_level_override(mut self, level: Option<CommitmentLevel>) -> Self {
        self.level_override = level;
        self
    }

    pub fn selected_workout(&self) -> Option<&Workout> {
        self.selected.and_then(|i| self.catalog.workouts().get(i))
    }

    /// True once per batch of changes that need a new frame
    pub fn take_redraw(&self) -> bool {
        self.needs_redraw.replace(false)
    }

    fn request_redraw(&self) {
        self.needs_redraw.set(true);
    }

    // --- workout list ---

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.catalog.len();
        if len == 0 {
            return;
        }
        self.list_cursor = (self.list_cursor as isize + delta).rem_euclid(len as isize) as usize;
        self.request_redraw();
    }

    pub fn open_selected(&mut self) {
        if self.list_cursor < self.catalog.len() {
            self.open_index(self.list_cursor);
        }
    }

    /// Select a workout by id and show its detail screen
    pub fn open_workout(&mut self, id: &str) -> setpace::Result<()> {
        let workout = self.catalog.get(id)?;
        let index = self
            .catalog
            .workouts()
            .iter()
            .position(|w| w.id == workout.id)
            .unwrap_or_default();
        self.list_cursor = index;
        self.open_index(index);
        Ok(())
    }

    fn open_index(&mut self, index: usize) {
        let Some(workout) = self.catalog.workouts().get(index) else {
            return;
        };
        self.machine.select_workout(workout);
        if let Some(level) = self.level_override.take() {
            self.machine.set_commitment_level(level);
        }
        self.selected = Some(index);
        self.state = AppState::WorkoutDetail;
        self.request_redraw();
    }

    // --- workout detail ---

    pub fn change_level(&mut self, up: bool) {
        let level = self.machine.snapshot().commitment_level;
        let next = if up { level.step_up() } else { level.step_down() };
        if next != level {
            info!(from = %level, to = %next, "commitment level changed");
            self.machine.set_commitment_level(next);
        }
    }

    pub fn start_workout(&mut self) {
        if self.machine.current_set().is_none() {
            return;
        }
        self.machine.reset();
        self.state = AppState::Timer;
        self.enter_current_set();
        self.request_redraw();
    }

    pub fn back_to_list(&mut self) {
        self.celebration.stop();
        self.machine.reset();
        self.state = AppState::WorkoutList;
        self.request_redraw();
    }

    // --- timer ---

    /// Enter / Space: whatever moves the current set forward
    pub fn primary_action(&mut self) {
        let Some(is_reps) = self.machine.current_set().map(Set::is_reps) else {
            return;
        };
        match self.machine.phase() {
            Phase::Idle if is_reps => {
                if !self.done_lock.is_disabled() {
                    self.advance();
                }
            }
            Phase::Idle => self.machine.start_countdown(),
            Phase::Countdown => self.machine.start_timer(),
            Phase::Running | Phase::Paused => self.toggle_pause(),
            Phase::Completed => self.advance(),
        }
        self.after_transition();
    }

    pub fn toggle_pause(&mut self) {
        match self.machine.phase() {
            Phase::Running => self.machine.pause(),
            Phase::Paused => self.machine.resume(),
            _ => {}
        }
    }

    fn advance(&mut self) {
        if self.machine.done() == Advance::Finished {
            self.finish();
        }
    }

    pub fn restart(&mut self) {
        if self.machine.current_set().is_none() {
            return;
        }
        self.celebration.stop();
        self.machine.reset();
        self.state = AppState::Timer;
        self.enter_current_set();
        self.request_redraw();
    }

    /// Leave a workout in progress and go back to its details
    pub fn exit_timer(&mut self) {
        self.machine.reset();
        self.state = AppState::WorkoutDetail;
        self.request_redraw();
    }

    fn finish(&mut self) {
        info!(
            workout = ?self.machine.snapshot().workout_id,
            level = %self.machine.snapshot().commitment_level,
            "workout complete"
        );
        self.state = AppState::Finished;
        if self.settings.celebrate {
            self.celebration.start(self.viewport.width, self.viewport.height);
        }
        self.request_redraw();
    }

    /// Re-arm the Done lockout whenever a rep set becomes current
    fn enter_current_set(&mut self) {
        self.entered_set.set(false);
        self.done_lock = match self.machine.current_set() {
            Some(Set::Reps(_)) => MomentaryDisable::default(),
            _ => MomentaryDisable::inactive(),
        };
    }

    fn after_transition(&mut self) {
        if self.entered_set.get() {
            self.enter_current_set();
        }
    }

    pub fn on_tick(&mut self, step_ms: u64) {
        match self.state {
            AppState::Timer => {
                self.machine.tick(step_ms);
                self.after_transition();
                if self.done_lock.is_disabled() {
                    self.done_lock.tick(step_ms);
                    self.request_redraw();
                }
            }
            AppState::Finished if self.celebration.is_active => {
                self.celebration.update(step_ms);
                self.request_redraw();
            }
            _ => {}
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> ScreenAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return ScreenAction::Quit;
        }
        let action = current_screen(&self.state).on_key(key, self);
        self.request_redraw();
        action
    }
}

fn build_catalog(cli: &Cli) -> setpace::Result<Catalog> {
    let mut catalog = Catalog::builtin()?;
    if let Some(path) = &cli.workout_file {
        let workout = catalog::load_workout_file(path)?;
        info!(workout = %workout.id, path = %path.display(), "loaded workout file");
        catalog.insert(workout);
    }
    Ok(catalog)
}

fn print_catalog(catalog: &Catalog) {
    for workout in catalog.workouts() {
        println!(
            "{:<24} {:<28} {} sets",
            workout.id,
            workout.name,
            workout.working_set_count()
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let log_path = cli.log_file.clone().or_else(AppDirs::log_path);
    if let Some(path) = &log_path {
        if let Err(e) = logging::init(path, cli.verbose) {
            eprintln!("logging disabled: {e}");
        }
    }

    let config_store = FileConfigStore::new();
    let settings = cli.apply_to(config_store.load());
    if cli.save_config {
        config_store.save(&settings)?;
        info!(path = %config_store.path().display(), "saved config");
    }

    let catalog = match build_catalog(&cli) {
        Ok(catalog) => catalog,
        Err(e) => Cli::command().error(ErrorKind::InvalidValue, e).exit(),
    };

    if cli.list {
        print_catalog(&catalog);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let cues: Box<dyn CuePlayer> = if settings.sound {
        Box::new(TerminalBell)
    } else {
        Box::new(SilentCues)
    };
    let machine = TimerMachine::new()
        .with_cues(cues)
        .with_store(Box::new(FileCommitmentStore::new()));
    let mut app = App::new(catalog, machine, settings).with_level_override(cli.level);
    if let Some(id) = &cli.workout {
        if let Err(e) = app.open_workout(id) {
            Cli::command().error(ErrorKind::InvalidValue, e).exit();
        }
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        warn!(error = %e, "tui exited with error");
    }
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::from_millis(app.settings.tick_rate_ms),
    );
    let step_ms = runner.tick_ms();

    loop {
        if app.take_redraw() {
            terminal.draw(|f| ui(app, f))?;
        }

        match runner.step() {
            TimerEvent::Tick => app.on_tick(step_ms),
            TimerEvent::Resize => app.request_redraw(),
            TimerEvent::Key(key) => {
                if app.on_key(key) == ScreenAction::Quit {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    app.viewport = f.area();
    f.render_widget(&*app, f.area());
}
