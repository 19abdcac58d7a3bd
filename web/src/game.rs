use crate::audio::Sounds;
use crate::canvas::CanvasSurface;
use crate::guess::{BoxTone, GuessInput};
use crate::settings::{Settings, SettingsView};
use crate::source::PuzzleApi;
use crate::utils::*;
use chrono::NaiveDate;
use gloo::events::EventListener;
use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::Timeout;
use unveil_core::{
    Effect, Effects, GameController, GameRules, GridPoint, GuessEvent, GuessVerdict, Outcome,
    Phase, PixelBuffer, PuzzleInfo, SURFACE_SIZE, SessionStore,
};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlCanvasElement;
use yew::prelude::*;

type Controller = GameController<LocalKeyValueStore, CanvasSurface>;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PointerMsg {
    Move(GridPoint),
    Leave,
    Click(GridPoint),
}

pub(crate) enum Msg {
    InfoLoaded(PuzzleInfo),
    ImageLoaded(PixelBuffer),
    LoadFailed(String),
    ImageTimedOut,
    Pointer(PointerMsg),
    Commit(String),
    Verdict(GuessVerdict),
    SubmitFailed(String),
    Guess(GuessEvent),
    RevealFrame,
    Solution(String),
    UpdateSettings(Settings),
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct GameProps {
    pub(crate) api: AttrValue,
}

/// Maps a mouse event on the canvas onto the grid, whatever size the canvas
/// is displayed at.
fn grid_point(e: &MouseEvent) -> GridPoint {
    let Some(canvas) = e.target_dyn_into::<HtmlCanvasElement>() else {
        return GridPoint::OUTSIDE;
    };
    let rect = canvas.get_bounding_client_rect();
    GridPoint::from_surface(
        f64::from(e.client_x()) - rect.left(),
        f64::from(e.client_y()) - rect.top(),
        rect.width(),
    )
}

fn guess_tone(phase: Option<Phase>) -> BoxTone {
    match phase {
        Some(Phase::WrongGuessLockout) => BoxTone::Wrong,
        Some(phase) if phase.outcome() == Some(Outcome::Win) => BoxTone::Correct,
        _ => BoxTone::Plain,
    }
}

/// Upper bound on a lockout. The buzzer ends it sooner when it plays
/// through; a clip longer than `fallback_ms` stretches the bound to fit.
fn lockout_deadline_ms(fallback_ms: u32, buzzer_secs: Option<f64>) -> u32 {
    match buzzer_secs {
        Some(secs) if secs.is_finite() && secs > 0.0 => {
            let clip_ms = (secs * 1000.0).ceil().min(f64::from(u32::MAX)) as u32;
            fallback_ms.max(clip_ms)
        }
        _ => fallback_ms,
    }
}

pub(crate) struct GameView {
    rules: GameRules,
    settings: Settings,
    today: Option<NaiveDate>,
    api: Option<PuzzleApi>,
    sounds: Sounds,
    canvas: NodeRef,
    controller: Option<Controller>,
    pending_image: Option<PixelBuffer>,
    info: Option<PuzzleInfo>,
    solution: Option<String>,
    load_failed: bool,
    submitting: bool,
    game_over: bool,
    guess_reset: u32,
    _frame: Option<AnimationFrame>,
    _buzzer: Option<EventListener>,
    _lockout_timer: Option<Timeout>,
    _image_timeout: Option<Timeout>,
}

impl GameView {
    fn start_loading(&mut self, ctx: &Context<Self>) {
        let Some(api) = self.api.clone() else {
            return;
        };

        let link = ctx.link().clone();
        let info_api = api.clone();
        spawn_local(async move {
            link.send_message(match info_api.fetch_info().await {
                Ok(info) => Msg::InfoLoaded(info),
                Err(err) => Msg::LoadFailed(format!("{:#}", err)),
            });
        });

        let link = ctx.link().clone();
        spawn_local(async move {
            link.send_message(match api.fetch_image().await {
                Ok(image) => Msg::ImageLoaded(image),
                Err(err) => Msg::LoadFailed(format!("{:#}", err)),
            });
        });

        if let Some(timeout_ms) = self.rules.image_timeout_ms {
            let link = ctx.link().clone();
            self._image_timeout = Some(Timeout::new(timeout_ms, move || {
                link.send_message(Msg::ImageTimedOut)
            }));
        }
    }

    /// Binds the controller to the rendered canvas.
    fn attach(&mut self, ctx: &Context<Self>) {
        let Some(today) = self.today else {
            return;
        };
        let Some(canvas) = self.canvas.cast::<HtmlCanvasElement>() else {
            log::error!("canvas is not mounted");
            return;
        };
        match CanvasSurface::new(&canvas) {
            Ok(surface) => {
                let session = SessionStore::new(LocalKeyValueStore, today);
                self.controller = Some(GameController::new(self.rules, session, surface));
            }
            Err(err) => {
                log::error!("could not set up the canvas: {:#}", err);
                self.load_failed = true;
            }
        }
        if let Some(image) = self.pending_image.take() {
            ctx.link().send_message(Msg::ImageLoaded(image));
        }
    }

    fn phase(&self) -> Option<Phase> {
        self.controller.as_ref().map(Controller::phase)
    }

    fn accepts_guess(&self) -> bool {
        self.phase() == Some(Phase::Active) && !self.submitting && !self.game_over
    }

    fn handle(&mut self, ctx: &Context<Self>, result: unveil_core::Result<Effects>) {
        match result {
            Ok(effects) => self.apply(ctx, effects),
            Err(err) => log::error!("{}", err),
        }
    }

    fn apply(&mut self, ctx: &Context<Self>, effects: Effects) {
        for effect in effects {
            log::trace!("effect: {:?}", effect);
            match effect {
                Effect::PlaySound(sound) => {
                    if self.settings.audio_enabled {
                        self.sounds.play(sound);
                    }
                }
                Effect::StopSound(sound) => self.sounds.stop(sound),
                Effect::BeginLockout { fallback_ms } => self.begin_lockout(ctx, fallback_ms),
                Effect::ScheduleRevealFrame => {
                    let link = ctx.link().clone();
                    self._frame = Some(request_animation_frame(move |_| {
                        link.send_message(Msg::RevealFrame)
                    }));
                }
                Effect::UnlockAndReset => {
                    self._buzzer = None;
                    self._lockout_timer = None;
                    self.guess_reset = self.guess_reset.wrapping_add(1);
                }
                Effect::ForceGameOver => self.game_over = true,
                Effect::ShowSolution => self.fetch_solution(ctx),
            }
        }
    }

    /// The lockout lasts as long as the buzzer. The timer always runs too,
    /// since a clip that fails to load or is refused playback never ends;
    /// whichever fires first unlocks.
    fn begin_lockout(&mut self, ctx: &Context<Self>, fallback_ms: u32) {
        let (buzzer, buzzer_secs) = if self.settings.audio_enabled {
            let link = ctx.link().clone();
            let buzzer = self
                .sounds
                .buzz(move || link.send_message(Msg::Guess(GuessEvent::WrongGuessResolved)));
            (buzzer, self.sounds.buzzer_secs())
        } else {
            (None, None)
        };

        let link = ctx.link().clone();
        self._lockout_timer = Some(Timeout::new(
            lockout_deadline_ms(fallback_ms, buzzer_secs),
            move || link.send_message(Msg::Guess(GuessEvent::WrongGuessResolved)),
        ));
        self._buzzer = buzzer;
    }

    fn submit(&mut self, ctx: &Context<Self>, guess: String) {
        let Some(api) = self.api.clone() else {
            return;
        };
        self.submitting = true;
        let link = ctx.link().clone();
        spawn_local(async move {
            link.send_message(match api.submit_guess(&guess).await {
                Ok(verdict) => Msg::Verdict(verdict),
                Err(err) => Msg::SubmitFailed(format!("{:#}", err)),
            });
        });
    }

    fn fetch_solution(&self, ctx: &Context<Self>) {
        let Some(api) = self.api.clone() else {
            return;
        };
        if self.solution.is_some() {
            return;
        }
        let link = ctx.link().clone();
        spawn_local(async move {
            match api.fetch_solution().await {
                Ok(solution) => link.send_message(Msg::Solution(solution)),
                Err(err) => log::error!("could not fetch solution: {:#}", err),
            }
        });
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let today = local_today();
        if today.is_none() {
            log::error!("could not determine the local date");
        }
        let api = today.map(|date| PuzzleApi::new(&ctx.props().api, date));

        let mut view = Self {
            rules: GameRules::default(),
            settings: LocalOrDefault::local_or_default(),
            today,
            api,
            sounds: Sounds::load(),
            canvas: NodeRef::default(),
            controller: None,
            pending_image: None,
            info: None,
            solution: None,
            load_failed: today.is_none(),
            submitting: false,
            game_over: false,
            guess_reset: 0,
            _frame: None,
            _buzzer: None,
            _lockout_timer: None,
            _image_timeout: None,
        };
        view.start_loading(ctx);
        view
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if first_render {
            self.attach(ctx);
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;
        use PointerMsg::*;

        match msg {
            InfoLoaded(info) => {
                log::debug!("puzzle has {} letters", info.number_of_chars);
                self.info = Some(info);
                true
            }
            ImageLoaded(image) => {
                self._image_timeout = None;
                let Some(controller) = self.controller.as_mut() else {
                    self.pending_image = Some(image);
                    return false;
                };
                match controller.on_image_loaded(image) {
                    Ok((kind, effects)) => {
                        log::info!("puzzle ready: {:?}", kind);
                        self.apply(ctx, effects);
                    }
                    Err(err) => log::error!("{}", err),
                }
                true
            }
            LoadFailed(err) => {
                log::error!("could not load puzzle: {}", err);
                self.load_failed = true;
                true
            }
            ImageTimedOut => {
                if self.phase().is_some_and(|phase| phase != Phase::Loading) {
                    return false;
                }
                log::error!("puzzle image did not arrive in time");
                self.load_failed = true;
                true
            }
            Pointer(Move(point)) => {
                if let Some(controller) = self.controller.as_mut() {
                    if let Err(err) = controller.on_pointer_move(point) {
                        log::error!("{}", err);
                    }
                }
                false
            }
            Pointer(Leave) => {
                if let Some(controller) = self.controller.as_mut() {
                    if let Err(err) = controller.on_pointer_leave() {
                        log::error!("{}", err);
                    }
                }
                false
            }
            Pointer(Click(point)) => {
                let Some(controller) = self.controller.as_mut() else {
                    return false;
                };
                let result = controller.on_click(point);
                self.handle(ctx, result);
                true
            }
            Commit(guess) => {
                if !self.accepts_guess() {
                    log::debug!("guess ignored");
                    return false;
                }
                self.submit(ctx, guess);
                true
            }
            Verdict(verdict) => {
                self.submitting = false;
                log::debug!("guess verdict: {:?}", verdict);
                ctx.link().send_message(Guess(verdict.event()));
                true
            }
            SubmitFailed(err) => {
                self.submitting = false;
                log::error!("could not submit guess: {}", err);
                true
            }
            Guess(event) => {
                let Some(controller) = self.controller.as_mut() else {
                    return false;
                };
                let result = controller.on_guess(event);
                self.handle(ctx, result);
                true
            }
            RevealFrame => {
                self._frame = None;
                let Some(controller) = self.controller.as_mut() else {
                    return false;
                };
                let result = controller.on_reveal_frame();
                let finished = !controller.is_revealing();
                self.handle(ctx, result);
                finished
            }
            Solution(solution) => {
                self.solution = Some(solution);
                true
            }
            UpdateSettings(settings) => {
                if self.settings != settings {
                    self.settings = settings;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Msg::*;

        let phase = self.phase();
        let score = self
            .controller
            .as_ref()
            .map_or(self.rules.base_score, Controller::score);
        let score_class = classes!(
            "score",
            (phase == Some(Phase::WrongGuessLockout)).then_some("lockout")
        );
        let size = SURFACE_SIZE.to_string();

        let onmousemove = ctx
            .link()
            .callback(|e: MouseEvent| Pointer(PointerMsg::Move(grid_point(&e))));
        let onmouseleave = ctx.link().callback(|_| Pointer(PointerMsg::Leave));
        let onclick = ctx
            .link()
            .callback(|e: MouseEvent| Pointer(PointerMsg::Click(grid_point(&e))));
        let on_commit = ctx.link().callback(Commit);
        let on_settings = ctx.link().callback(UpdateSettings);

        html! {
            <div class="unveil">
                <nav>
                    <aside class={score_class}>{score.to_string()}</aside>
                    <SettingsView settings={self.settings} on_change={on_settings}/>
                </nav>
                <canvas
                    ref={self.canvas.clone()}
                    width={size.clone()}
                    height={size}
                    style="cursor: crosshair"
                    {onmousemove}
                    {onmouseleave}
                    {onclick}
                />
                if let Some(info) = &self.info {
                    <GuessInput
                        info={info.clone()}
                        locked={!self.accepts_guess()}
                        tone={guess_tone(phase)}
                        reset={self.guess_reset}
                        {on_commit}
                    />
                }
                if let Some(solution) = &self.solution {
                    <p class="solution">{solution.clone()}</p>
                }
                if self.load_failed {
                    <p class="error">
                        {"Could not load today's puzzle. "}
                        <a href="">{"Try again"}</a>
                    </p>
                }
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_boxes_follow_phase() {
        assert_eq!(guess_tone(None), BoxTone::Plain);
        assert_eq!(guess_tone(Some(Phase::Active)), BoxTone::Plain);
        assert_eq!(guess_tone(Some(Phase::WrongGuessLockout)), BoxTone::Wrong);
        assert_eq!(guess_tone(Some(Phase::Resolved(Outcome::Win))), BoxTone::Correct);
        assert_eq!(guess_tone(Some(Phase::Replaying(Outcome::Win))), BoxTone::Correct);
        assert_eq!(guess_tone(Some(Phase::Resolved(Outcome::Lose))), BoxTone::Plain);
    }

    #[test]
    fn lockout_always_has_a_deadline() {
        assert_eq!(lockout_deadline_ms(2000, None), 2000);
        // metadata not loaded yet, or the file is missing
        assert_eq!(lockout_deadline_ms(2000, Some(f64::NAN)), 2000);
        assert_eq!(lockout_deadline_ms(2000, Some(0.0)), 2000);
        assert_eq!(lockout_deadline_ms(2000, Some(f64::INFINITY)), 2000);
        assert_eq!(lockout_deadline_ms(2000, Some(0.8)), 2000);
        assert_eq!(lockout_deadline_ms(2000, Some(3.25)), 3250);
    }
}
