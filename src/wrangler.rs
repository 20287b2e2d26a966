//! Mole slots: which are up, picking the next group, and whack detection.

use log::debug;
use rand::rngs::StdRng;
use rand::seq::index;

use crate::difficulty::DifficultyLevel;
use crate::schedule::{Scheduler, TaskId, Timer};
use crate::view::View;

/// Owns the mole slots and the group refresh cycle.
///
/// Whack notifications go to at most one subscriber `H`. Instead of calling
/// back into its owner, `mole_whacked` hands the subscriber value back so the
/// owner can dispatch on it.
pub struct MoleWrangler<H> {
    slots: Vec<bool>,
    speed_ms: u64,
    moles_per_round: usize,
    whacked_this_round: usize,
    wrangling: bool,
    start_delay_ms: u64,
    // Start delay or next refresh; never both.
    refresh: Option<TaskId>,
    subscriber: Option<H>,
    rng: StdRng,
}

impl<H: Copy> MoleWrangler<H> {
    pub fn new(
        slot_count: usize,
        start_delay_ms: u64,
        difficulty: &DifficultyLevel,
        rng: StdRng,
    ) -> Self {
        Self {
            slots: vec![false; slot_count],
            speed_ms: difficulty.speed_ms,
            moles_per_round: difficulty.moles_per_round,
            whacked_this_round: 0,
            wrangling: false,
            start_delay_ms,
            refresh: None,
            subscriber: None,
            rng,
        }
    }

    /// Takes effect on the next group; moles already up stay up.
    pub fn set_difficulty(&mut self, difficulty: &DifficultyLevel) {
        self.speed_ms = difficulty.speed_ms;
        self.moles_per_round = difficulty.moles_per_round;
    }

    pub fn set_whacked_callback(&mut self, subscriber: Option<H>) {
        self.subscriber = subscriber;
    }

    pub fn hide_all(&mut self, view: &mut impl View) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            *slot = false;
            view.set_slot_visible(i, false);
        }
    }

    /// Hide everything, then show exactly `indexes`. Out-of-range entries are skipped.
    pub fn show_moles_at(&mut self, indexes: &[usize], view: &mut impl View) {
        self.hide_all(view);
        for &i in indexes {
            if let Some(slot) = self.slots.get_mut(i) {
                *slot = true;
                view.set_slot_visible(i, true);
            }
        }
    }

    /// Restart the cycle: the first group appears after the start delay.
    pub fn start_wrangling(&mut self, view: &mut impl View, sched: &mut Scheduler<Timer>) {
        self.stop_wrangling(view, sched);
        self.wrangling = true;
        self.refresh = Some(sched.schedule_once(self.start_delay_ms, Timer::ShowMoleGroup));
    }

    /// Pop up a fresh group of distinct moles and reschedule the next refresh,
    /// replacing whatever refresh was pending.
    pub fn show_mole_group(&mut self, view: &mut impl View, sched: &mut Scheduler<Timer>) {
        self.hide_all(view);
        self.whacked_this_round = 0;

        let count = self.moles_per_round.min(self.slots.len());
        let chosen = index::sample(&mut self.rng, self.slots.len(), count);
        for i in chosen.iter() {
            self.slots[i] = true;
            view.set_slot_visible(i, true);
        }
        debug!("mole group {:?}", chosen.into_vec());

        if let Some(id) = self.refresh.take() {
            sched.cancel(id);
        }
        self.refresh = Some(sched.schedule_once(self.speed_ms, Timer::ShowMoleGroup));
    }

    pub fn stop_wrangling(&mut self, view: &mut impl View, sched: &mut Scheduler<Timer>) {
        self.hide_all(view);
        if let Some(id) = self.refresh.take() {
            sched.cancel(id);
        }
        self.wrangling = false;
    }

    /// A click on slot `index`. Hidden or unknown slots can't be hit.
    ///
    /// Whacking the last mole of the group while wrangling brings up the next
    /// group immediately. Returns the subscriber to notify, if one is set.
    pub fn mole_whacked(
        &mut self,
        index: usize,
        view: &mut impl View,
        sched: &mut Scheduler<Timer>,
    ) -> Option<(H, usize)> {
        match self.slots.get_mut(index) {
            Some(up) if *up => *up = false,
            _ => {
                debug!("ignored whack on hidden slot {index}");
                return None;
            }
        }
        view.set_slot_visible(index, false);
        self.whacked_this_round += 1;

        if self.wrangling && self.whacked_this_round == self.moles_per_round {
            debug!("round cleared early");
            self.show_mole_group(view, sched);
        }

        self.subscriber.map(|h| (h, index))
    }

    pub fn is_wrangling(&self) -> bool {
        self.wrangling
    }

    pub fn whacked_this_round(&self) -> usize {
        self.whacked_this_round
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_up(&self, index: usize) -> bool {
        self.slots.get(index).copied().unwrap_or(false)
    }

    pub fn visible(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, up)| **up)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;
    use crate::difficulty::DIFFICULTIES;
    use crate::view::HeadlessView;

    const SLOTS: usize = 12;

    fn setup(level: usize) -> (MoleWrangler<char>, HeadlessView, Scheduler<Timer>) {
        let w = MoleWrangler::new(SLOTS, 2200, &DIFFICULTIES[level], StdRng::seed_from_u64(7));
        (w, HeadlessView::new(SLOTS), Scheduler::new(0))
    }

    fn pump(w: &mut MoleWrangler<char>, v: &mut HeadlessView, s: &mut Scheduler<Timer>, until: u64) {
        while let Some(t) = s.pop_due(until) {
            assert_eq!(t, Timer::ShowMoleGroup);
            w.show_mole_group(v, s);
        }
        s.settle(until);
    }

    #[test]
    fn group_has_exact_distinct_count() {
        for (level, preset) in DIFFICULTIES.iter().enumerate() {
            let (mut w, mut v, mut s) = setup(level);
            for _ in 0..50 {
                w.show_mole_group(&mut v, &mut s);
                let up = w.visible();
                assert_eq!(up.len(), preset.moles_per_round);
                assert_eq!(v.visible_slots(), up);
            }
        }
    }

    #[test]
    fn show_moles_at_shows_exactly_those() {
        let (mut w, mut v, mut s) = setup(0);
        w.show_mole_group(&mut v, &mut s);
        w.show_moles_at(&[8, 9, 10, 11], &mut v);
        assert_eq!(w.visible(), vec![8, 9, 10, 11]);
        assert_eq!(v.visible_slots(), vec![8, 9, 10, 11]);
    }

    #[test]
    fn set_difficulty_leaves_visible_moles() {
        let (mut w, mut v, mut s) = setup(0);
        w.show_mole_group(&mut v, &mut s);
        let before = w.visible();
        w.set_difficulty(&DIFFICULTIES[3]);
        assert_eq!(w.visible(), before);
        w.show_mole_group(&mut v, &mut s);
        assert_eq!(w.visible().len(), 3);
    }

    #[test]
    fn start_waits_for_delay_then_refreshes_on_speed() {
        let (mut w, mut v, mut s) = setup(2);
        w.start_wrangling(&mut v, &mut s);
        assert!(w.is_wrangling());
        pump(&mut w, &mut v, &mut s, 2199);
        assert!(w.visible().is_empty());
        pump(&mut w, &mut v, &mut s, 2200);
        assert_eq!(w.visible().len(), 4);
        assert_eq!(s.next_due(), Some(4200));
        assert_eq!(s.pending_count(), 1);
    }

    #[test]
    fn clearing_round_early_spawns_next_group_and_resets_timer() {
        let (mut w, mut v, mut s) = setup(2);
        w.start_wrangling(&mut v, &mut s);
        pump(&mut w, &mut v, &mut s, 2200);
        s.settle(3000);

        let group = w.visible();
        for (n, &i) in group.iter().enumerate() {
            w.mole_whacked(i, &mut v, &mut s);
            if n + 1 < group.len() {
                assert_eq!(w.whacked_this_round(), n + 1);
            }
        }
        assert_eq!(w.whacked_this_round(), 0);
        assert_eq!(w.visible().len(), 4);
        // Old refresh at 4200 is gone; the new one counts from the whack.
        assert_eq!(s.pending_count(), 1);
        assert_eq!(s.next_due(), Some(5000));
    }

    #[test]
    fn whack_returns_subscriber_and_hides_slot() {
        let (mut w, mut v, mut s) = setup(0);
        w.show_moles_at(&[3], &mut v);
        assert_eq!(w.mole_whacked(3, &mut v, &mut s), None);
        assert!(!w.is_up(3));

        w.show_moles_at(&[3], &mut v);
        w.set_whacked_callback(Some('a'));
        w.set_whacked_callback(Some('b'));
        assert_eq!(w.mole_whacked(3, &mut v, &mut s), Some(('b', 3)));
        assert!(v.visible_slots().is_empty());
    }

    #[test]
    fn hidden_or_unknown_slot_is_not_whackable() {
        let (mut w, mut v, mut s) = setup(0);
        w.set_whacked_callback(Some('x'));
        assert_eq!(w.mole_whacked(2, &mut v, &mut s), None);
        assert_eq!(w.mole_whacked(99, &mut v, &mut s), None);
        assert_eq!(w.whacked_this_round(), 0);
    }

    #[test]
    fn no_early_group_when_not_wrangling() {
        let (mut w, mut v, mut s) = setup(3);
        w.show_moles_at(&[0, 1, 2], &mut v);
        for i in 0..3 {
            w.mole_whacked(i, &mut v, &mut s);
        }
        assert!(w.visible().is_empty());
        assert_eq!(s.pending_count(), 0);
    }

    #[test]
    fn stop_cancels_pending_start_and_refresh() {
        let (mut w, mut v, mut s) = setup(1);
        w.start_wrangling(&mut v, &mut s);
        w.stop_wrangling(&mut v, &mut s);
        assert_eq!(s.pending_count(), 0);
        assert!(!w.is_wrangling());

        w.start_wrangling(&mut v, &mut s);
        w.start_wrangling(&mut v, &mut s);
        assert_eq!(s.pending_count(), 1);
        pump(&mut w, &mut v, &mut s, 2200);
        w.stop_wrangling(&mut v, &mut s);
        assert!(w.visible().is_empty());
        assert_eq!(s.pending_count(), 0);
        // Stopping again with nothing pending is fine.
        w.stop_wrangling(&mut v, &mut s);
    }
}
