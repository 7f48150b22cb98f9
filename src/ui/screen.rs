use crossterm::event::{KeyCode, KeyEvent};

use crate::{App, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    Continue,
    Quit,
}

/// A UI Screen boundary: maps keys to app operations for one state
pub trait Screen {
    fn on_key(&self, key: KeyEvent, app: &mut App) -> ScreenAction;
}

/// Pick a workout
pub struct WorkoutListScreen;

impl Screen for WorkoutListScreen {
    fn on_key(&self, key: KeyEvent, app: &mut App) -> ScreenAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return ScreenAction::Quit,
            KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
            KeyCode::Enter | KeyCode::Char(' ') => app.open_selected(),
            _ => {}
        }
        ScreenAction::Continue
    }
}

/// Review the sets and choose a commitment level
pub struct WorkoutDetailScreen;

impl Screen for WorkoutDetailScreen {
    fn on_key(&self, key: KeyEvent, app: &mut App) -> ScreenAction {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => app.state = AppState::WorkoutList,
            KeyCode::Left | KeyCode::Char('h') => app.change_level(false),
            KeyCode::Right | KeyCode::Char('l') => app.change_level(true),
            KeyCode::Enter | KeyCode::Char(' ') => app.start_workout(),
            _ => {}
        }
        ScreenAction::Continue
    }
}

/// The running workout
pub struct TimerScreen;

impl Screen for TimerScreen {
    fn on_key(&self, key: KeyEvent, app: &mut App) -> ScreenAction {
        match key.code {
            KeyCode::Esc => app.exit_timer(),
            KeyCode::Enter | KeyCode::Char(' ') => app.primary_action(),
            KeyCode::Char('p') => app.toggle_pause(),
            KeyCode::Char('r') => app.restart(),
            _ => {}
        }
        ScreenAction::Continue
    }
}

/// Summary after the last set
pub struct FinishedScreen;

impl Screen for FinishedScreen {
    fn on_key(&self, key: KeyEvent, app: &mut App) -> ScreenAction {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return ScreenAction::Quit,
            KeyCode::Enter | KeyCode::Char(' ') => app.back_to_list(),
            KeyCode::Char('r') => app.restart(),
            _ => {}
        }
        ScreenAction::Continue
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::WorkoutList => Box::new(WorkoutListScreen),
        AppState::WorkoutDetail => Box::new(WorkoutDetailScreen),
        AppState::Timer => Box::new(TimerScreen),
        AppState::Finished => Box::new(FinishedScreen),
    }
}
