//! Input handling for the quiz board.

use anyhow::{Result, anyhow};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::debug;

use capquiz_engine::{App, FocusMove};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads terminal events on a blocking thread and hands them to the frame loop.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drains pending input into the app. Returns `Ok(true)` once the user quits.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        if apply_event(app, ev) {
            return Ok(true);
        }
        processed += 1;
    }
    Ok(app.should_quit())
}

/// Applies one terminal event. Returns `true` when the app should exit.
pub fn apply_event(app: &mut App, ev: Event) -> bool {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        _ => {}
    }
    app.should_quit()
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('c') {
            app.request_quit();
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.request_quit(),
        KeyCode::Left | KeyCode::Char('h') => app.move_focus(FocusMove::Left),
        KeyCode::Right | KeyCode::Char('l') => app.move_focus(FocusMove::Right),
        KeyCode::Up | KeyCode::Char('k') => app.move_focus(FocusMove::Up),
        KeyCode::Down | KeyCode::Char('j') => app.move_focus(FocusMove::Down),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(outcome) = app.activate_focused() {
                debug!(?outcome, "Keyboard select");
            }
        }
        KeyCode::Char('r') => {
            if !app.restart() {
                debug!("Restart ignored mid-round");
            }
        }
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    if let Some(outcome) = app.click_position(mouse.column, mouse.row) {
        debug!(?outcome, column = mouse.column, row = mouse.row, "Mouse select");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use capquiz_engine::{
        App, CountryProvider, CountryRecord, FetchError, QuizSettings, SelectOutcome, TileArea,
        TileSet,
    };
    use capquiz_providers::BoxFuture;
    use capquiz_types::build_tiles_ordered;
    use crossterm::event::{
        Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers, MouseButton,
        MouseEvent, MouseEventKind,
    };

    use super::apply_event;

    struct NoCountries;

    impl CountryProvider for NoCountries {
        fn fetch_sample(
            &self,
            _n: usize,
        ) -> BoxFuture<'_, Result<Vec<CountryRecord>, FetchError>> {
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    fn board() -> TileSet {
        build_tiles_ordered(&[
            CountryRecord::new("FRA", "France", "Paris"),
            CountryRecord::new("JPN", "Japan", "Tokyo"),
        ])
    }

    fn app() -> App {
        App::with_board(QuizSettings::default(), Arc::new(NoCountries), board())
    }

    fn key(code: KeyCode) -> Event {
        key_with(code, KeyModifiers::NONE)
    }

    fn key_with(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn left_click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn quit_keys() {
        for ev in [
            key(KeyCode::Char('q')),
            key(KeyCode::Esc),
            key_with(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            let mut app = app();
            assert!(apply_event(&mut app, ev));
        }
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = app();
        let ev = Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert!(!apply_event(&mut app, ev));
    }

    #[test]
    fn arrows_and_vim_keys_move_focus() {
        let mut app = app();
        app.set_tile_layout(Vec::new(), 2);
        apply_event(&mut app, key(KeyCode::Right));
        assert_eq!(app.focus_index(), 1);
        apply_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.focus_index(), 3);
        apply_event(&mut app, key(KeyCode::Char('h')));
        assert_eq!(app.focus_index(), 2);
        apply_event(&mut app, key(KeyCode::Up));
        assert_eq!(app.focus_index(), 0);
    }

    #[test]
    fn enter_and_space_click_the_focused_tile() {
        let mut app = app();
        apply_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.machine().unwrap().selection().len(), 1);

        apply_event(&mut app, key(KeyCode::Right));
        apply_event(&mut app, key(KeyCode::Char(' ')));
        let machine = app.machine().unwrap();
        assert_eq!(machine.remaining_pairs(), 1);
        assert!(machine.selection().is_empty());
    }

    #[test]
    fn left_click_selects_tile_under_cursor() {
        let mut app = app();
        let paris = board().find_by_code("FRA_capital").unwrap().id();
        app.set_tile_layout(
            vec![TileArea {
                id: paris,
                x: 4,
                y: 2,
                width: 8,
                height: 3,
            }],
            1,
        );

        apply_event(&mut app, left_click(0, 0));
        assert!(app.machine().unwrap().selection().is_empty());

        apply_event(&mut app, left_click(5, 3));
        assert_eq!(app.machine().unwrap().selection(), vec![paris]);
        assert_eq!(app.focus_index(), 1);
    }

    #[test]
    fn restart_key_is_ignored_mid_round() {
        let mut app = app();
        apply_event(&mut app, key(KeyCode::Char('r')));
        assert!(!app.is_loading());
        assert_eq!(app.round(), 1);
        assert_eq!(app.activate_focused(), Some(SelectOutcome::Selected));
    }
}
