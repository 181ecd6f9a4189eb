//! Playing whole rounds through the public app surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use capquiz_engine::{
    App, CountryProvider, CountryRecord, FetchError, IgnoreReason, PairingState, QuizSettings,
    SelectOutcome, TileId, TileVisual,
};
use capquiz_providers::BoxFuture;
use capquiz_tui::apply_event;
use capquiz_types::build_tiles_ordered;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

use crate::common::wait_until_loaded;

/// Hands out a different slice of a fixed list on every call.
struct Rotating {
    records: Vec<CountryRecord>,
    calls: AtomicUsize,
}

impl CountryProvider for Rotating {
    fn fetch_sample(&self, n: usize) -> BoxFuture<'_, Result<Vec<CountryRecord>, FetchError>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let records = self
            .records
            .iter()
            .cycle()
            .skip(call * n)
            .take(n)
            .cloned()
            .collect();
        Box::pin(async move { Ok(records) })
    }
}

fn records() -> Vec<CountryRecord> {
    vec![
        CountryRecord::new("PER", "Peru", "Lima"),
        CountryRecord::new("ITA", "Italy", "Rome"),
        CountryRecord::new("GHA", "Ghana", "Accra"),
        CountryRecord::new("THA", "Thailand", "Bangkok"),
    ]
}

fn settings(sample_size: usize) -> QuizSettings {
    QuizSettings {
        sample_size,
        ..QuizSettings::default()
    }
}

fn find(app: &App, code: &str) -> TileId {
    app.machine()
        .and_then(|machine| machine.tiles().iter().find(|tile| tile.code() == code))
        .map(|tile| tile.id())
        .unwrap_or_else(|| panic!("{code} not on board"))
}

fn press(app: &mut App, code: KeyCode) -> bool {
    apply_event(
        app,
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }),
    )
}

#[test]
fn mistake_then_recovery_then_win() {
    let set = build_tiles_ordered(&records()[..2]);
    let provider = Arc::new(Rotating {
        records: records(),
        calls: AtomicUsize::new(0),
    });
    let mut app = App::with_board(settings(2), provider, set);
    let start = Instant::now();

    let peru = find(&app, "PER");
    let rome = find(&app, "ITA_capital");
    assert_eq!(app.click_tile_at(peru, start), SelectOutcome::Selected);
    assert_eq!(app.click_tile_at(rome, start), SelectOutcome::Mismatched);

    // Locked until the delay runs out.
    let almost = start + Duration::from_millis(2999);
    app.tick_at(almost);
    assert_eq!(
        app.click_tile_at(find(&app, "PER_capital"), almost),
        SelectOutcome::Ignored(IgnoreReason::InputLocked)
    );
    assert_eq!(app.machine().unwrap().visual(rome), TileVisual::Error);

    // First pick survives the revert.
    let after = start + Duration::from_secs(3);
    app.tick_at(after);
    let machine = app.machine().unwrap();
    assert_eq!(machine.state(), PairingState::OneSelected);
    assert_eq!(machine.visual(peru), TileVisual::Selected);
    assert_eq!(machine.visual(rome), TileVisual::Default);

    assert_eq!(
        app.click_tile_at(find(&app, "PER_capital"), after),
        SelectOutcome::Matched { remaining: 2 }
    );
    app.click_tile_at(find(&app, "ITA"), after);
    assert_eq!(
        app.click_tile_at(rome, after),
        SelectOutcome::Matched { remaining: 0 }
    );

    let machine = app.machine().unwrap();
    assert!(machine.is_complete());
    let stats = machine.stats();
    assert_eq!((stats.attempts, stats.matches, stats.mistakes), (3, 2, 1));
}

#[test]
fn keyboard_only_round() {
    let set = build_tiles_ordered(&records()[..2]);
    let provider = Arc::new(Rotating {
        records: records(),
        calls: AtomicUsize::new(0),
    });
    let mut app = App::with_board(settings(2), provider, set);
    app.set_tile_layout(Vec::new(), 2);

    // Ordered board: PER, PER_capital / ITA, ITA_capital
    press(&mut app, KeyCode::Enter);
    press(&mut app, KeyCode::Right);
    press(&mut app, KeyCode::Enter);
    assert_eq!(app.machine().unwrap().remaining_pairs(), 1);

    // Focus is clamped onto the remaining tiles.
    press(&mut app, KeyCode::Left);
    press(&mut app, KeyCode::Char(' '));
    press(&mut app, KeyCode::Right);
    press(&mut app, KeyCode::Enter);
    assert!(app.machine().unwrap().is_complete());
    assert!(press(&mut app, KeyCode::Char('q')));
}

#[tokio::test]
async fn restart_after_win_loads_a_fresh_round() {
    let provider = Arc::new(Rotating {
        records: records(),
        calls: AtomicUsize::new(0),
    });
    let mut app = App::new(settings(2), provider.clone());
    wait_until_loaded(&mut app).await;

    for code in ["PER", "ITA"] {
        app.click_tile(find(&app, code));
        app.click_tile(find(&app, &format!("{code}_capital")));
    }
    assert!(app.machine().unwrap().is_complete());

    press(&mut app, KeyCode::Char('r'));
    assert!(app.is_loading());
    wait_until_loaded(&mut app).await;

    assert_eq!(app.round(), 2);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    let machine = app.machine().unwrap();
    assert_eq!(machine.total_pairs(), 2);
    assert_eq!(machine.stats().attempts, 0);
    assert!(machine.tiles().iter().any(|tile| tile.code() == "GHA"));
    assert!(machine.tiles().iter().any(|tile| tile.code() == "THA_capital"));
}
