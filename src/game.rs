//! Game flow: difficulty selection, the timed scoring run, game over.
//!
//! ```text
//! ChoosingDifficulty --whack difficulty slot--> Playing
//! Playing --countdown hits 0--> GameOver --restart delay--> ChoosingDifficulty
//! ```
//!
//! All deferred work runs through one [`Scheduler`]; the host calls
//! [`Game::advance_to`] (or any input method, which advances first) with the
//! current time in milliseconds.

use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::difficulty::{DifficultyLevel, GameConfig};
use crate::error::GameError;
use crate::hammer::Hammer;
pub use crate::schedule::Timer;
use crate::schedule::{Scheduler, TaskId};
use crate::view::{Audio, Cue, Stat, View};
use crate::wrangler::MoleWrangler;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    ChoosingDifficulty,
    Playing,
    GameOver,
}

/// Whack subscriber registered by the current phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WhackHandler {
    DifficultyChosen,
    Score,
}

/// One timed run at a fixed difficulty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSession {
    pub difficulty: DifficultyLevel,
    pub moles_whacked: u32,
    pub time_left: u32,
}

pub struct Game<V, A> {
    config: GameConfig,
    view: V,
    audio: A,
    scheduler: Scheduler<Timer>,
    wrangler: MoleWrangler<WhackHandler>,
    hammer: Hammer,
    phase: Phase,
    session: Option<GameSession>,
    // Best score this page load.
    highscore: u32,
    countdown: Option<TaskId>,
    sessions_completed: u32,
}

impl<V: View, A: Audio> Game<V, A> {
    /// Build the game on `view` and open the difficulty menu.
    pub fn new(
        view: V,
        audio: A,
        config: GameConfig,
        rng: StdRng,
        now_ms: u64,
    ) -> Result<Self, GameError> {
        let slot_count = view.slot_count();
        config.validate(slot_count)?;

        let wrangler = MoleWrangler::new(
            slot_count,
            config.start_delay_ms,
            &config.difficulties[0],
            rng,
        );
        let hammer = Hammer::new(config.hammer_offset, config.hammer_strike_ms);
        let mut game = Self {
            config,
            view,
            audio,
            scheduler: Scheduler::new(now_ms),
            wrangler,
            hammer,
            phase: Phase::ChoosingDifficulty,
            session: None,
            highscore: 0,
            countdown: None,
            sessions_completed: 0,
        };
        game.view.set_stat(Stat::Highscore, &format_stat(0, 3));
        game.choose_difficulty();
        Ok(game)
    }

    /// Same as [`Game::new`] with an OS-seeded RNG.
    pub fn from_entropy(
        view: V,
        audio: A,
        config: GameConfig,
        now_ms: u64,
    ) -> Result<Self, GameError> {
        Self::new(view, audio, config, StdRng::from_entropy(), now_ms)
    }

    /// Run every timer due at or before `now_ms`, in order.
    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some(timer) = self.scheduler.pop_due(now_ms) {
            debug!("timer {:?} at {}", timer, self.scheduler.now());
            self.on_timer(timer);
        }
        self.scheduler.settle(now_ms);
    }

    pub fn pointer_move(&mut self, now_ms: u64, x: i32, y: i32) {
        self.advance_to(now_ms);
        self.hammer.drag(x, y, &mut self.view);
    }

    pub fn pointer_down(&mut self, now_ms: u64) {
        self.advance_to(now_ms);
        self.hammer
            .strike(&mut self.view, &mut self.audio, &mut self.scheduler);
    }

    /// Click on mole slot `index`.
    pub fn slot_clicked(&mut self, now_ms: u64, index: usize) {
        self.advance_to(now_ms);
        let whacked = self
            .wrangler
            .mole_whacked(index, &mut self.view, &mut self.scheduler);
        match whacked {
            Some((WhackHandler::DifficultyChosen, slot)) => self.difficulty_chosen(slot),
            Some((WhackHandler::Score, _)) => self.mole_whacked(),
            None => {}
        }
    }

    fn on_timer(&mut self, timer: Timer) {
        match timer {
            Timer::ShowMoleGroup => {
                if self.wrangler.is_wrangling() {
                    self.wrangler
                        .show_mole_group(&mut self.view, &mut self.scheduler);
                }
            }
            Timer::StartCountdown => {
                self.countdown = Some(
                    self.scheduler
                        .schedule_repeating(self.config.tick_ms, Timer::CountdownTick),
                );
            }
            Timer::CountdownTick => self.count_down(),
            Timer::HammerRevert => self.hammer.finish_strike(&mut self.view),
            Timer::ChooseDifficulty => self.choose_difficulty(),
        }
    }

    fn choose_difficulty(&mut self) {
        info!("choosing difficulty");
        self.phase = Phase::ChoosingDifficulty;
        let slots = self.config.difficulty_slots;
        self.wrangler.show_moles_at(&slots, &mut self.view);
        self.view.set_difficulty_labels_visible(true);
        self.wrangler
            .set_whacked_callback(Some(WhackHandler::DifficultyChosen));
        self.audio.play(Cue::ChooseDifficulty);
    }

    fn difficulty_chosen(&mut self, slot: usize) {
        let Some(level) = self.config.difficulty_for_slot(slot).cloned() else {
            warn!("slot {slot} is not a difficulty choice");
            return;
        };
        self.wrangler.set_difficulty(&level);
        self.new_game(level);
    }

    fn new_game(&mut self, difficulty: DifficultyLevel) {
        info!(
            "new game: {} ({} s, {} moles every {} ms)",
            difficulty.name, difficulty.total_time, difficulty.moles_per_round, difficulty.speed_ms
        );
        self.view.set_difficulty_labels_visible(false);
        self.view.set_stat(Stat::Difficulty, &difficulty.name);
        self.session = Some(GameSession {
            moles_whacked: 0,
            time_left: difficulty.total_time,
            difficulty,
        });
        self.phase = Phase::Playing;
        self.update_moles_whacked_display();
        self.update_time_display();

        self.wrangler.hide_all(&mut self.view);
        self.wrangler.set_whacked_callback(Some(WhackHandler::Score));

        if let Some(id) = self.countdown.take() {
            self.scheduler.cancel(id);
        }
        self.countdown = Some(
            self.scheduler
                .schedule_once(self.config.start_delay_ms, Timer::StartCountdown),
        );

        self.audio.play(Cue::Background);
        self.wrangler
            .start_wrangling(&mut self.view, &mut self.scheduler);
    }

    fn mole_whacked(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.moles_whacked += 1;
        }
        self.update_moles_whacked_display();
    }

    fn count_down(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if self.phase != Phase::Playing {
            return;
        }
        session.time_left = session.time_left.saturating_sub(1);
        let done = session.time_left == 0;
        self.update_time_display();
        if done {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.sessions_completed += 1;
        if let Some(id) = self.countdown.take() {
            self.scheduler.cancel(id);
        }
        self.wrangler
            .stop_wrangling(&mut self.view, &mut self.scheduler);
        self.wrangler.set_whacked_callback(None);

        self.update_highscore();
        info!(
            "game over: {} whacked, highscore {}",
            self.moles_whacked(),
            self.highscore
        );

        self.audio.play(Cue::Buzzer);
        self.audio.stop_background();
        self.scheduler
            .schedule_once(self.config.restart_delay_ms, Timer::ChooseDifficulty);
    }

    fn update_moles_whacked_display(&mut self) {
        let text = format_stat(self.moles_whacked(), 3);
        self.view.set_stat(Stat::MolesWhacked, &text);
    }

    fn update_time_display(&mut self) {
        let time_left = self.session.as_ref().map_or(0, |s| s.time_left);
        self.view.set_stat(Stat::TimeLeft, &format_stat(time_left, 2));
    }

    // Ties rewrite the display too; the value can only go up.
    fn update_highscore(&mut self) {
        let whacked = self.moles_whacked();
        if whacked >= self.highscore {
            self.highscore = whacked;
            self.view
                .set_stat(Stat::Highscore, &format_stat(self.highscore, 3));
        }
    }

    fn moles_whacked(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.moles_whacked)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn highscore(&self) -> u32 {
        self.highscore
    }

    /// Number of sessions that reached game over.
    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn wrangler(&self) -> &MoleWrangler<WhackHandler> {
        &self.wrangler
    }

    pub fn hammer(&self) -> &Hammer {
        &self.hammer
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }
}

/// Zero-pad `value` to at least `digits` characters. Never truncates.
pub fn format_stat(value: u32, digits: usize) -> String {
    format!("{value:0digits$}")
}
