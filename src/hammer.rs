//! Mouse-following hammer cursor.

use crate::schedule::{Scheduler, TaskId, Timer};
use crate::view::{Audio, Cue, View};

pub struct Hammer {
    offset: (i32, i32),
    strike_ms: u64,
    position: Option<(i32, i32)>,
    revert: Option<TaskId>,
}

impl Hammer {
    pub fn new(offset: (i32, i32), strike_ms: u64) -> Self {
        Self {
            offset,
            strike_ms,
            position: None,
            revert: None,
        }
    }

    /// Pointer moved to page coordinates (`x`, `y`) inside the game container.
    pub fn drag(&mut self, x: i32, y: i32, view: &mut impl View) {
        let pos = (x + self.offset.0, y + self.offset.1);
        self.position = Some(pos);
        view.place_hammer(pos.0, pos.1);
    }

    /// Swing on pointer press, hit or miss. A second press mid-swing extends
    /// the swing rather than cutting it short.
    pub fn strike(
        &mut self,
        view: &mut impl View,
        audio: &mut impl Audio,
        sched: &mut Scheduler<Timer>,
    ) {
        view.set_hammer_rotated(true);
        if let Some(id) = self.revert.take() {
            sched.cancel(id);
        }
        self.revert = Some(sched.schedule_once(self.strike_ms, Timer::HammerRevert));
        audio.play(Cue::Whacked);
    }

    pub fn finish_strike(&mut self, view: &mut impl View) {
        self.revert = None;
        view.set_hammer_rotated(false);
    }

    pub fn is_striking(&self) -> bool {
        self.revert.is_some()
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        self.position
    }
}
