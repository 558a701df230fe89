/// Position within a snapshot sequence plus the running/paused flag.
///
/// The index always stays inside `[0, len - 1]`; every operation clamps
/// rather than failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackCursor {
    index: usize,
    len: usize,
    paused: bool,
}

impl PlaybackCursor {
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len,
            paused: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn last_index(&self) -> usize {
        self.len.saturating_sub(1)
    }

    pub fn at_end(&self) -> bool {
        self.index == self.last_index()
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Automatic advance from the scheduler. Returns `true` when the index
    /// moved.
    pub fn tick(&mut self) -> bool {
        if self.paused {
            return false;
        }
        self.step_forward()
    }

    pub fn step_forward(&mut self) -> bool {
        if self.index < self.last_index() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    pub fn step_back(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn restart(&mut self) {
        self.index = 0;
    }

    /// Points the cursor at a new sequence of `len` snapshots, starting over
    /// while keeping the paused flag.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.restart();
    }
}

/// Converts the fixed frame rate into cursor advances every `ticks_per_step`
/// ticks.
#[derive(Debug, Clone)]
pub struct StepClock {
    ticks_per_step: u32,
    pending: u32,
}

impl StepClock {
    pub fn new(ticks_per_step: u32) -> Self {
        Self {
            ticks_per_step: ticks_per_step.max(1),
            pending: 0,
        }
    }

    /// Counts one tick and reports whether a step is due.
    pub fn tick(&mut self) -> bool {
        self.pending += 1;
        if self.pending >= self.ticks_per_step {
            self.pending = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.pending = 0;
    }
}
