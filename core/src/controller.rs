use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Lose,
}

impl Outcome {
    pub const fn from_guessed_right(guessed_right: bool) -> Self {
        if guessed_right { Self::Win } else { Self::Lose }
    }

    pub const fn guessed_right(self) -> bool {
        matches!(self, Self::Win)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the day's image; all input is gated.
    Loading,
    Active,
    WrongGuessLockout,
    /// Finished during this visit; the wipe may still be running.
    Resolved(Outcome),
    /// Finished on an earlier visit today; shown read-only.
    Replaying(Outcome),
}

impl Phase {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Replaying(_))
    }

    pub const fn outcome(self) -> Option<Outcome> {
        match self {
            Self::Resolved(outcome) | Self::Replaying(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// How the controller left [`Phase::Loading`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadKind {
    Seeded,
    Resumed,
    Replayed,
}

bitflags! {
    /// Reasons pointer and keyboard input are currently ignored.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct InputLock: u8 {
        const LOADING  = 1;
        const LOCKOUT  = 1 << 1;
        const REVEAL   = 1 << 2;
        const FINISHED = 1 << 3;
    }
}

/// Events produced by the guess input widget.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuessEvent {
    CorrectGuess,
    WrongGuess,
    /// The lockout feedback interval after a wrong guess has elapsed.
    WrongGuessResolved,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sound {
    Pop,
    WinJingle,
    Chime,
}

/// Side effects the host has to carry out after an event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    PlaySound(Sound),
    StopSound(Sound),
    /// Play the wrong-guess cue and report [`GuessEvent::WrongGuessResolved`]
    /// when it ends, or after `fallback_ms` when audio is off.
    BeginLockout { fallback_ms: u32 },
    /// Call [`GameController::on_reveal_frame`] on the next display refresh.
    ScheduleRevealFrame,
    /// Input widget: clear the boxes and accept guesses again.
    UnlockAndReset,
    /// Input widget: stop accepting guesses for good.
    ForceGameOver,
    /// The puzzle is resolved, so its solution may be fetched.
    ShowSolution,
}

pub type Effects = SmallVec<[Effect; 4]>;

/// Drives one day's puzzle: loading, clicks, guesses, scoring, persistence
/// and the final reveal.
#[derive(Debug)]
pub struct GameController<K, S> {
    rules: GameRules,
    session: SessionStore<K>,
    surface: S,
    hidden: Option<PixelBuffer>,
    engine: RevealEngine,
    phase: Phase,
    clicks: u32,
    wrong_guesses: u32,
    wipe: Option<RevealWipe>,
}

impl<K: KeyValueStore, S: Surface> GameController<K, S> {
    pub fn new(rules: GameRules, session: SessionStore<K>, surface: S) -> Self {
        Self {
            rules,
            session,
            surface,
            hidden: None,
            engine: RevealEngine::new(),
            phase: Phase::Loading,
            clicks: 0,
            wrong_guesses: 0,
            wipe: None,
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    pub fn wrong_guesses(&self) -> u32 {
        self.wrong_guesses
    }

    pub fn score(&self) -> u32 {
        self.rules.score(self.clicks, self.wrong_guesses)
    }

    pub fn engine(&self) -> &RevealEngine {
        &self.engine
    }

    pub fn session(&self) -> &SessionStore<K> {
        &self.session
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_revealing(&self) -> bool {
        self.wipe.is_some()
    }

    pub fn input_lock(&self) -> InputLock {
        let mut lock = InputLock::empty();
        match self.phase {
            Phase::Loading => lock |= InputLock::LOADING,
            Phase::WrongGuessLockout => lock |= InputLock::LOCKOUT,
            Phase::Resolved(_) | Phase::Replaying(_) => lock |= InputLock::FINISHED,
            Phase::Active => {}
        }
        if self.wipe.is_some() {
            lock |= InputLock::REVEAL;
        }
        lock
    }

    /// Leaves [`Phase::Loading`] once the day's image is decoded, seeding,
    /// resuming or replaying depending on the stored session.
    pub fn on_image_loaded(&mut self, hidden: PixelBuffer) -> Result<(LoadKind, Effects)> {
        if self.phase != Phase::Loading {
            return Err(GameError::AlreadyLoaded);
        }

        let mut effects = Effects::new();
        let kind = match self.session.load_for_today() {
            SessionLoad::Finished(record) => {
                self.surface.put_pixels(&hidden, 0, 0)?;
                self.clicks = record.clicks;
                self.wrong_guesses = record.wrong_guesses;
                self.phase = Phase::Replaying(Outcome::from_guessed_right(record.guessed_right));
                effects.extend([Effect::ForceGameOver, Effect::ShowSolution]);
                LoadKind::Replayed
            }
            SessionLoad::Resuming(record) => match self.resume(&hidden, record) {
                Ok(()) => LoadKind::Resumed,
                Err(err) => {
                    log::warn!("could not resume session, starting over: {}", err);
                    self.seed(&hidden)?;
                    LoadKind::Seeded
                }
            },
            SessionLoad::Fresh => {
                self.seed(&hidden)?;
                LoadKind::Seeded
            }
        };
        self.hidden = Some(hidden);
        log::debug!("loaded puzzle for {}: {:?}", self.session.today(), kind);

        if self.phase == Phase::Active && self.score() == 0 {
            effects.extend(self.resolve_game(Outcome::Lose));
        }
        Ok((kind, effects))
    }

    pub fn on_pointer_move(&mut self, point: GridPoint) -> Result<bool> {
        if !self.accepts_pointer() {
            return Ok(false);
        }
        self.engine.hover(point, &mut self.surface)
    }

    pub fn on_pointer_leave(&mut self) -> Result<bool> {
        self.on_pointer_move(GridPoint::OUTSIDE)
    }

    /// Resolves the region under `point`, persists, and ends the game once
    /// the score runs out. The click is charged even when it cannot be
    /// persisted.
    pub fn on_click(&mut self, point: GridPoint) -> Result<Effects> {
        let mut effects = Effects::new();
        if !self.accepts_pointer() {
            log::trace!("click ignored, input locked: {:?}", self.input_lock());
            return Ok(effects);
        }
        let Some(hidden) = self.hidden.as_ref() else {
            return Ok(effects);
        };
        if self.engine.resolve_at(point, hidden, &mut self.surface)?.is_none() {
            return Ok(effects);
        }

        self.clicks = self.clicks.saturating_add(1);
        if let Err(err) = self.persist_click() {
            log::error!("could not save click {}: {}", self.clicks, err);
        }
        effects.push(Effect::PlaySound(Sound::Pop));

        if self.score() == 0 {
            effects.extend(self.resolve_game(Outcome::Lose));
        }
        Ok(effects)
    }

    pub fn on_guess(&mut self, event: GuessEvent) -> Result<Effects> {
        use GuessEvent::*;

        match (event, self.phase) {
            (_, Phase::Loading) => Err(GameError::NotReady),
            (_, phase) if phase.is_finished() => {
                log::debug!("{:?} ignored, puzzle already finished", event);
                Ok(Effects::new())
            }
            (CorrectGuess | WrongGuess, Phase::WrongGuessLockout) => {
                log::debug!("{:?} ignored during lockout", event);
                Ok(Effects::new())
            }
            (CorrectGuess, _) => Ok(self.resolve_game(Outcome::Win)),
            (WrongGuess, _) => {
                self.wrong_guesses = self.wrong_guesses.saturating_add(1);
                if let Err(err) = self.session.record_wrong_guess(self.wrong_guesses) {
                    log::error!("could not save wrong guess {}: {}", self.wrong_guesses, err);
                }
                if self.score() == 0 {
                    return Ok(self.resolve_game(Outcome::Lose));
                }
                self.phase = Phase::WrongGuessLockout;
                let fallback_ms = self.rules.lockout_fallback_ms;
                Ok(Effects::from_iter([Effect::BeginLockout { fallback_ms }]))
            }
            (WrongGuessResolved, Phase::WrongGuessLockout) => {
                self.phase = Phase::Active;
                Ok(Effects::from_iter([Effect::UnlockAndReset]))
            }
            (WrongGuessResolved, _) => Ok(Effects::new()),
        }
    }

    /// Advances the final wipe by one step.
    pub fn on_reveal_frame(&mut self) -> Result<Effects> {
        let mut effects = Effects::new();
        let (Some(wipe), Some(hidden)) = (self.wipe.as_mut(), self.hidden.as_ref()) else {
            return Ok(effects);
        };

        match wipe.step(hidden, &mut self.surface)? {
            WipeProgress::Running => effects.push(Effect::ScheduleRevealFrame),
            WipeProgress::Finished => {
                self.wipe = None;
                effects.push(Effect::StopSound(Sound::WinJingle));
                if self.phase == Phase::Resolved(Outcome::Win) {
                    effects.push(Effect::PlaySound(Sound::Chime));
                }
                log::debug!("reveal finished");
            }
        }
        Ok(effects)
    }

    fn accepts_pointer(&self) -> bool {
        self.input_lock().is_empty()
    }

    fn seed(&mut self, hidden: &PixelBuffer) -> Result<()> {
        self.engine = RevealEngine::seed(hidden, &mut self.surface)?;
        self.clicks = 0;
        self.wrong_guesses = 0;
        let snapshot = Snapshot::capture(&self.surface)?;
        self.session.init_fresh(&snapshot, &self.engine.spans())?;
        self.phase = Phase::Active;
        Ok(())
    }

    fn resume(&mut self, hidden: &PixelBuffer, record: ResumeRecord) -> Result<()> {
        let engine = RevealEngine::restore(&record.regions, hidden)?;
        record.snapshot.restore(&mut self.surface)?;
        self.engine = engine;
        self.clicks = record.clicks;
        self.wrong_guesses = record.wrong_guesses;
        self.phase = Phase::Active;
        Ok(())
    }

    fn persist_click(&mut self) -> Result<()> {
        let snapshot = Snapshot::capture(&self.surface)?;
        self.session
            .record_click(self.clicks, &snapshot, &self.engine.spans())
    }

    fn resolve_game(&mut self, outcome: Outcome) -> Effects {
        self.engine.clear();
        if let Err(err) = self.session.finish(outcome.guessed_right()) {
            log::error!("could not save outcome {:?}: {}", outcome, err);
        }
        self.phase = Phase::Resolved(outcome);
        self.wipe = Some(RevealWipe::new());
        log::debug!("puzzle resolved: {:?}, score {}", outcome, self.score());

        let mut effects = Effects::new();
        match outcome {
            Outcome::Win => effects.push(Effect::PlaySound(Sound::WinJingle)),
            Outcome::Lose => effects.push(Effect::ForceGameOver),
        }
        effects.extend([Effect::ScheduleRevealFrame, Effect::ShowSolution]);
        effects
    }
}
