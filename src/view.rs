//! Boundary between the game logic and whatever renders it.
//!
//! The browser implementation lives in `web.rs`; the headless pair below keeps
//! a plain record of everything the game asked for, which is what the native
//! tests assert against.

/// Stat displays, looked up by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stat {
    Highscore,
    Difficulty,
    MolesWhacked,
    TimeLeft,
}

/// Named sound effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Looping background track.
    Background,
    ChooseDifficulty,
    Buzzer,
    Whacked,
}

pub trait View {
    /// Number of mole holes on the board. Fixed for the page's lifetime.
    fn slot_count(&self) -> usize;
    fn set_slot_visible(&mut self, index: usize, visible: bool);
    /// Show or hide the text overlays on the difficulty slots.
    fn set_difficulty_labels_visible(&mut self, visible: bool);
    fn set_stat(&mut self, stat: Stat, text: &str);
    /// Move the hammer to page coordinates and make sure it is shown.
    fn place_hammer(&mut self, left: i32, top: i32);
    fn set_hammer_rotated(&mut self, rotated: bool);
}

/// Play-and-forget. Nothing waits on playback.
pub trait Audio {
    fn play(&mut self, cue: Cue);
    /// Pause the background loop and rewind it.
    fn stop_background(&mut self);
}

/// In-memory view.
#[derive(Clone, Debug, Default)]
pub struct HeadlessView {
    pub slots: Vec<bool>,
    pub labels_visible: bool,
    pub highscore: String,
    pub difficulty: String,
    pub moles_whacked: String,
    pub time_left: String,
    /// `None` until the pointer first moves.
    pub hammer: Option<(i32, i32)>,
    pub hammer_rotated: bool,
}

impl HeadlessView {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![false; slot_count],
            ..Self::default()
        }
    }

    pub fn visible_slots(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn stat(&self, stat: Stat) -> &str {
        match stat {
            Stat::Highscore => &self.highscore,
            Stat::Difficulty => &self.difficulty,
            Stat::MolesWhacked => &self.moles_whacked,
            Stat::TimeLeft => &self.time_left,
        }
    }
}

impl View for HeadlessView {
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn set_slot_visible(&mut self, index: usize, visible: bool) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = visible;
        }
    }

    fn set_difficulty_labels_visible(&mut self, visible: bool) {
        self.labels_visible = visible;
    }

    fn set_stat(&mut self, stat: Stat, text: &str) {
        let target = match stat {
            Stat::Highscore => &mut self.highscore,
            Stat::Difficulty => &mut self.difficulty,
            Stat::MolesWhacked => &mut self.moles_whacked,
            Stat::TimeLeft => &mut self.time_left,
        };
        text.clone_into(target);
    }

    fn place_hammer(&mut self, left: i32, top: i32) {
        self.hammer = Some((left, top));
    }

    fn set_hammer_rotated(&mut self, rotated: bool) {
        self.hammer_rotated = rotated;
    }
}

/// Records cues in the order they were played.
#[derive(Clone, Debug, Default)]
pub struct HeadlessAudio {
    pub played: Vec<Cue>,
    pub background_stops: usize,
}

impl HeadlessAudio {
    pub fn count(&self, cue: Cue) -> usize {
        self.played.iter().filter(|c| **c == cue).count()
    }
}

impl Audio for HeadlessAudio {
    fn play(&mut self, cue: Cue) {
        self.played.push(cue);
    }

    fn stop_background(&mut self) {
        self.background_stops += 1;
    }
}
