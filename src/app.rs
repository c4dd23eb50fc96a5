//! Top-level controller
//!
//! `VoidApp` owns the simulation, the session, the seen history and the
//! viewer settings, and exposes the operations the page calls. Every
//! operation updates `UiState` (labels, disabled flags, modal text) which the
//! page copies into the DOM.
//!
//! Async operations never hold a `RefCell` borrow across an await: state is
//! read, the borrow dropped, the store awaited, then state is borrowed again.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{
    FEEDBACK_DURATION_MS, RELEASE_ANIMATION_DURATION_MS, RELEASE_ANIMATOR_FINAL_SIZE,
    RELEASE_ANIMATOR_GAP, RELEASE_ANIMATOR_HEIGHT, RELEASE_DELAY_MS,
};
use crate::content::validate_thought;
use crate::error::VoidError;
use crate::history::SeenPostHistory;
use crate::persistence::KeyValueStore;
use crate::platform::{AnchorSource, Clock};
use crate::renderer::{DrawList, build_frame};
use crate::sampler::{ListenOutcome, VoidSampler};
use crate::session::{Connection, IdentityChange, Session};
use crate::settings::{QualityPreset, Settings};
use crate::sim::{FrameReport, SimConfig, Simulation, advance_frame};
use crate::store::{Identity, NewPost, PostId, StoreError, VoidStore};

/// Element the release animation starts from
pub const MAIN_ACTION_ELEMENT: &str = "main-action";

pub const RELEASE_LABEL: &str = "Release into the Void";
pub const RELEASING_LABEL: &str = "Releasing...";
pub const LISTEN_LABEL: &str = "Listen to the Void";
pub const LISTENING_LABEL: &str = "Listening...";
pub const LISTENING_MODAL: &str = "The void is vast...";
pub const SILENT_MODAL: &str = "The void is silent. No other thoughts were found.";
pub const INTERFERENCE_MODAL: &str = "A cosmic interference prevented listening. Please try again.";
pub const CONNECTION_LOST_TITLE: &str = "Connection Lost";

/// Transient message under the compose box
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub text: String,
    pub expires_at_ms: f64,
}

/// Everything the page needs to render controls
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub release_label: String,
    pub release_disabled: bool,
    pub listen_label: String,
    pub listen_disabled: bool,
    pub compose_enabled: bool,
    /// Text of the listen modal, if open
    pub modal_text: Option<String>,
    pub feedback: Option<Feedback>,
    /// Page title override (connection lost)
    pub title: Option<String>,
    pub animation_enabled: bool,
    pub quality: QualityPreset,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            release_label: RELEASE_LABEL.to_string(),
            release_disabled: true,
            listen_label: LISTEN_LABEL.to_string(),
            listen_disabled: true,
            compose_enabled: true,
            modal_text: None,
            feedback: None,
            title: None,
            animation_enabled: true,
            quality: QualityPreset::default(),
        }
    }
}

/// A committed thought waiting for its release animation to finish
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingLaunch {
    at_ms: f64,
    start: Vec2,
}

struct AppState {
    sim: Simulation,
    session: Session,
    history: SeenPostHistory,
    settings: Settings,
    prefers_reduced_motion: bool,
    pending: Vec<PendingLaunch>,
    releasing: bool,
    listening: bool,
    rng: Pcg32,
    ui: UiState,
}

impl AppState {
    fn animation_enabled(&self) -> bool {
        self.settings.animation_enabled(self.prefers_reduced_motion)
    }

    fn show_feedback(&mut self, text: String, now_ms: f64) {
        self.ui.feedback = Some(Feedback {
            text,
            expires_at_ms: now_ms + FEEDBACK_DURATION_MS,
        });
    }

    /// Recompute labels and disabled flags from the current state
    fn refresh_controls(&mut self, now_ms: f64) {
        let ready = self.session.is_ready();
        let lost = self.session.connection == Connection::Lost;
        let cooling = self.session.cooldown.is_active(now_ms);

        let ui = &mut self.ui;
        if self.releasing {
            ui.release_label = RELEASING_LABEL.to_string();
            ui.release_disabled = true;
        } else if cooling {
            ui.release_label = format!(
                "On Cooldown ({}s)",
                self.session.cooldown.seconds_left(now_ms)
            );
            ui.release_disabled = true;
        } else {
            ui.release_label = RELEASE_LABEL.to_string();
            ui.release_disabled = !ready;
        }

        ui.listen_label = if self.listening {
            LISTENING_LABEL
        } else {
            LISTEN_LABEL
        }
        .to_string();
        ui.listen_disabled = self.listening || !ready;

        ui.compose_enabled = !lost;
        ui.title = lost.then(|| CONNECTION_LOST_TITLE.to_string());
        ui.animation_enabled = self.settings.animation_enabled(self.prefers_reduced_motion);
        ui.quality = self.settings.quality;
    }
}

fn sim_config(quality: QualityPreset) -> SimConfig {
    SimConfig {
        particle_count: quality.particle_count(),
        star_count: quality.star_count(),
        ..SimConfig::default()
    }
}

/// Where a released thought enters the canvas
///
/// The release animator shrinks to a small square centred above the main
/// action element; the particle starts at that square's centre. Without the
/// element it starts at the bottom centre of the canvas.
pub fn launch_point(anchors: &dyn AnchorSource, width: f32, height: f32) -> Vec2 {
    match anchors.element_rect(MAIN_ACTION_ELEMENT) {
        Some(rect) => Vec2::new(
            rect.left + rect.width / 2.0,
            rect.top - RELEASE_ANIMATOR_HEIGHT - RELEASE_ANIMATOR_GAP
                + RELEASE_ANIMATOR_FINAL_SIZE / 2.0,
        ),
        None => Vec2::new(width / 2.0, height),
    }
}

/// The thought void controller
pub struct VoidApp {
    store: Rc<dyn VoidStore>,
    kv: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    anchors: Rc<dyn AnchorSource>,
    sampler: VoidSampler,
    state: RefCell<AppState>,
}

impl VoidApp {
    pub fn new(
        store: Rc<dyn VoidStore>,
        kv: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        anchors: Rc<dyn AnchorSource>,
        width: f32,
        height: f32,
        seed: u64,
    ) -> Self {
        let settings = Settings::load(kv.as_ref());
        let history = SeenPostHistory::load(kv.as_ref());
        let sim = Simulation::new(sim_config(settings.quality), width, height, seed);
        log::info!(
            "Void ready: {}x{}, {} dust, {} stars",
            width,
            height,
            sim.ambient.len(),
            sim.stars.len()
        );

        let mut state = AppState {
            sim,
            session: Session::new(),
            history,
            settings,
            prefers_reduced_motion: false,
            pending: Vec::new(),
            releasing: false,
            listening: false,
            rng: Pcg32::seed_from_u64(seed ^ 0x5eed),
            ui: UiState::default(),
        };
        state.refresh_controls(clock.now_ms());

        Self {
            store,
            kv,
            clock,
            anchors,
            sampler: VoidSampler::default(),
            state: RefCell::new(state),
        }
    }

    /// Snapshot of the visible control state
    pub fn ui(&self) -> UiState {
        self.state.borrow().ui.clone()
    }

    pub fn animation_enabled(&self) -> bool {
        self.state.borrow().animation_enabled()
    }

    /// Validate, commit and launch a thought
    ///
    /// The post is committed before the cooldown starts or the launch is
    /// queued. The activity upsert runs after the commit and only logs on
    /// failure.
    pub async fn release_thought(&self, raw: &str) -> Result<PostId, VoidError> {
        let now = self.clock.now_ms();
        let (post, author) = {
            let mut state = self.state.borrow_mut();
            let checked = validate_thought(raw)
                .map_err(VoidError::from)
                .and_then(|content| {
                    let author = state.session.user().cloned().ok_or(VoidError::NotSignedIn)?;
                    if state.releasing {
                        return Err(VoidError::Busy);
                    }
                    if state.session.cooldown.is_active(now) {
                        return Err(VoidError::RateLimited);
                    }
                    Ok((content, author))
                });
            match checked {
                Ok((content, author)) => {
                    state.releasing = true;
                    state.refresh_controls(now);
                    (NewPost::new(content, author.clone()), author)
                }
                Err(err) => {
                    log::debug!("Release rejected locally: {}", err);
                    state.show_feedback(err.user_message(), now);
                    return Err(err);
                }
            }
        };

        let result = self.store.submit_post(post).await;

        let now = self.clock.now_ms();
        let id = {
            let mut state = self.state.borrow_mut();
            state.releasing = false;
            let outcome = match result {
                Ok(id) => {
                    log::info!("Thought {} released", id);
                    let start = launch_point(
                        self.anchors.as_ref(),
                        state.sim.width,
                        state.sim.height,
                    );
                    state.pending.push(PendingLaunch {
                        at_ms: now + RELEASE_DELAY_MS + RELEASE_ANIMATION_DURATION_MS,
                        start,
                    });
                    if !state.session.is_admin() {
                        state.session.cooldown.start(now);
                    }
                    Ok(id)
                }
                Err(err) => {
                    if err == StoreError::RateLimited {
                        log::warn!("Release rate limited by the backend");
                        state.session.cooldown.start(now);
                    } else {
                        log::warn!("Release failed: {}", err);
                    }
                    let err = VoidError::from(err);
                    state.show_feedback(err.user_message(), now);
                    Err(err)
                }
            };
            state.refresh_controls(now);
            outcome?
        };

        if let Err(err) = self.store.upsert_user_activity(&author, now).await {
            log::warn!("Activity update for {} failed: {}", author, err);
        }
        Ok(id)
    }

    /// Retrieve someone else's thought into the listen modal
    pub async fn listen_to_void(&self) -> Result<ListenOutcome, VoidError> {
        let now = self.clock.now_ms();
        let (listener, mut history, mut rng) = {
            let mut state = self.state.borrow_mut();
            let listener = match state.session.user().cloned() {
                Some(uid) if !state.listening => uid,
                Some(_) => return Err(VoidError::Busy),
                None => return Err(VoidError::NotSignedIn),
            };
            state.listening = true;
            state.ui.modal_text = Some(LISTENING_MODAL.to_string());
            state.refresh_controls(now);
            let rng = Pcg32::seed_from_u64(state.rng.random());
            (listener, state.history.clone(), rng)
        };

        let result = self
            .sampler
            .listen(self.store.as_ref(), &listener, &mut history, &mut rng)
            .await;

        let mut state = self.state.borrow_mut();
        state.listening = false;
        let outcome = match result {
            Ok(outcome) => {
                state.ui.modal_text = Some(match &outcome {
                    ListenOutcome::Heard(post) => post.content.clone(),
                    ListenOutcome::Silent => SILENT_MODAL.to_string(),
                });
                state.history = history;
                state.history.save(self.kv.as_ref());
                Ok(outcome)
            }
            Err(err) => {
                log::warn!("Listening failed: {}", err);
                state.ui.modal_text = Some(INTERFERENCE_MODAL.to_string());
                Err(VoidError::TransientStorage(err.to_string()))
            }
        };
        state.refresh_controls(self.clock.now_ms());
        outcome
    }

    /// Close the listen modal
    pub fn dismiss_modal(&self) {
        self.state.borrow_mut().ui.modal_text = None;
    }

    /// React to an identity notification, bootstrapping an anonymous identity
    /// when there is none
    pub async fn handle_identity_change(&self, identity: Option<Identity>) -> Result<(), VoidError> {
        let change = {
            let mut state = self.state.borrow_mut();
            let change = state.session.on_identity_changed(identity);
            state.refresh_controls(self.clock.now_ms());
            change
        };
        if change != IdentityChange::NeedsAnonymousSignIn {
            return Ok(());
        }

        log::info!("No identity; signing in anonymously");
        let result = self.store.sign_in_anonymously().await;

        let mut state = self.state.borrow_mut();
        let outcome = match result {
            Ok(identity) => {
                state.session.on_identity_changed(Some(identity));
                Ok(())
            }
            Err(err) => {
                log::error!("Anonymous sign-in failed: {}", err);
                state.session.on_sign_in_failed();
                Err(VoidError::AuthFailure(err.to_string()))
            }
        };
        state.refresh_controls(self.clock.now_ms());
        outcome
    }

    /// Advance one display frame
    ///
    /// Spawns due launches and steps the simulation when animation is on;
    /// otherwise pending launches are dropped and nothing moves. Returns the
    /// frame report when the simulation advanced.
    pub fn frame(&self) -> Option<FrameReport> {
        let now = self.clock.now_ms();
        let mut state = self.state.borrow_mut();

        let report = if state.animation_enabled() {
            let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pending)
                .into_iter()
                .partition(|launch| launch.at_ms <= now);
            state.pending = waiting;
            for launch in due {
                state.sim.launch_thought(launch.start);
            }
            Some(advance_frame(&mut state.sim))
        } else {
            if !state.pending.is_empty() {
                log::debug!("Animation off; dropping {} launches", state.pending.len());
                state.pending.clear();
            }
            None
        };

        if state
            .ui
            .feedback
            .as_ref()
            .is_some_and(|f| f.expires_at_ms <= now)
        {
            state.ui.feedback = None;
        }
        state.refresh_controls(now);
        report
    }

    /// Draw list for the current frame
    pub fn draw_list(&self) -> DrawList {
        let state = self.state.borrow();
        build_frame(&state.sim, state.animation_enabled())
    }

    pub fn on_resize(&self, width: f32, height: f32) {
        self.state.borrow_mut().sim.resize(width, height);
    }

    /// Explicit animation toggle, persisted
    pub fn set_animation_enabled(&self, enabled: bool) {
        let mut state = self.state.borrow_mut();
        state.settings.animation_override = Some(enabled);
        state.settings.save(self.kv.as_ref());
        state.refresh_controls(self.clock.now_ms());
        log::info!("Animation {}", if enabled { "enabled" } else { "disabled" });
    }

    /// System reduced-motion preference (applies when there is no override)
    pub fn set_reduced_motion_preference(&self, prefers_reduced_motion: bool) {
        let mut state = self.state.borrow_mut();
        state.prefers_reduced_motion = prefers_reduced_motion;
        state.refresh_controls(self.clock.now_ms());
    }

    pub fn set_quality(&self, quality: QualityPreset) {
        let mut state = self.state.borrow_mut();
        state.settings.quality = quality;
        state
            .sim
            .reconfigure(quality.particle_count(), quality.star_count());
        state.settings.save(self.kv.as_ref());
        state.refresh_controls(self.clock.now_ms());
        log::info!("Quality set to {}", quality.as_str());
    }

    /// Step to the next quality preset
    pub fn cycle_quality(&self) {
        let next = self.state.borrow().settings.quality.next();
        self.set_quality(next);
    }

    /// Particles currently orbiting (thoughts, transitions)
    pub fn thought_counts(&self) -> (usize, usize) {
        let state = self.state.borrow();
        (state.sim.thoughts.len(), state.sim.transitions.len())
    }

    /// Seconds left on the posting cooldown
    pub fn cooldown_seconds(&self) -> u32 {
        self.state
            .borrow()
            .session
            .cooldown
            .seconds_left(self.clock.now_ms())
    }
}
