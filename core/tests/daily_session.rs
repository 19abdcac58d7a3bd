use chrono::NaiveDate;
use unveil_core::*;

type Controller = GameController<MemoryStore, PixelBuffer>;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn hidden() -> PixelBuffer {
    PixelBuffer::from_fn(SURFACE_SIZE, SURFACE_SIZE, |x, y| {
        Rgb::new((x / 4) as u8, (y / 4) as u8, 200)
    })
}

fn open(store: MemoryStore, today: NaiveDate) -> (Controller, LoadKind) {
    let mut controller = GameController::new(
        GameRules::default(),
        SessionStore::new(store, today),
        PixelBuffer::new(SURFACE_SIZE, SURFACE_SIZE),
    );
    let (kind, _) = controller.on_image_loaded(hidden()).unwrap();
    (controller, kind)
}

fn saved(controller: &Controller) -> MemoryStore {
    controller.session().store().clone()
}

#[test]
fn first_click_splits_top_left_quadrant() {
    let (mut controller, kind) = open(MemoryStore::new(), day(1));
    assert_eq!(kind, LoadKind::Seeded);

    controller.on_click(GridPoint::new(4, 4)).unwrap();

    let mut spans = controller.engine().spans();
    spans.sort_by_key(|span| (span.x_range(), span.y_range()));
    let expected = [
        ((1, 4), (1, 4)),
        ((1, 4), (5, 8)),
        ((1, 8), (9, 16)),
        ((5, 8), (1, 4)),
        ((5, 8), (5, 8)),
        ((9, 16), (1, 8)),
        ((9, 16), (9, 16)),
    ];
    assert_eq!(
        spans
            .iter()
            .map(|span| (span.x_range(), span.y_range()))
            .collect::<Vec<_>>(),
        expected
    );
    assert_eq!(controller.engine().hidden_cells(), 256);
}

#[test]
fn progress_survives_reload_but_not_midnight() {
    let (mut controller, _) = open(MemoryStore::new(), day(1));
    controller.on_click(GridPoint::new(10, 3)).unwrap();
    controller.on_click(GridPoint::new(10, 3)).unwrap();
    controller.on_guess(GuessEvent::WrongGuess).unwrap();

    let (same_day, kind) = open(saved(&controller), day(1));
    assert_eq!(kind, LoadKind::Resumed);
    assert_eq!(same_day.clicks(), 2);
    assert_eq!(same_day.wrong_guesses(), 1);
    assert_eq!(same_day.engine().spans(), controller.engine().spans());
    assert_eq!(same_day.surface(), controller.surface());

    let (next_day, kind) = open(saved(&controller), day(2));
    assert_eq!(kind, LoadKind::Seeded);
    assert_eq!(next_day.score(), 250);
    assert_eq!(next_day.engine().len(), 4);
    assert_eq!(
        next_day.session().store().get(keys::DATE_PLAYED).as_deref(),
        Some("2024-06-02")
    );
}

#[test]
fn score_runs_out_before_full_reveal() {
    let (mut controller, _) = open(MemoryStore::new(), day(3));

    while let Some(span) = controller.engine().spans().first().copied() {
        let (x, y) = (span.x_range().0, span.y_range().0);
        controller
            .on_click(GridPoint::new(i32::from(x), i32::from(y)))
            .unwrap();
        if controller.phase().is_finished() {
            break;
        }
    }

    // a full reveal takes 340 clicks, the score runs out after 250
    assert_eq!(controller.phase(), Phase::Resolved(Outcome::Lose));
    assert_eq!(controller.clicks(), 250);
    assert!(controller.engine().is_empty());
}

#[test]
fn finished_day_is_read_only() {
    let (mut controller, _) = open(MemoryStore::new(), day(4));
    controller.on_click(GridPoint::new(16, 16)).unwrap();
    controller.on_guess(GuessEvent::CorrectGuess).unwrap();
    while controller
        .on_reveal_frame()
        .unwrap()
        .contains(&Effect::ScheduleRevealFrame)
    {}
    let store = saved(&controller);
    assert!(!store.contains_key(keys::IMAGE_SNAPSHOT));

    let (mut replay, kind) = open(store.clone(), day(4));

    assert_eq!(kind, LoadKind::Replayed);
    assert_eq!(replay.phase(), Phase::Replaying(Outcome::Win));
    assert_eq!(replay.score(), 249);
    assert!(replay.on_click(GridPoint::new(1, 1)).unwrap().is_empty());
    assert!(replay.on_guess(GuessEvent::WrongGuess).unwrap().is_empty());
    assert_eq!(saved(&replay), store);
}
