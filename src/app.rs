use dla_stepper::engine::{RunRequest, SimulationEngine};
use dla_stepper::error::Error;
use dla_stepper::stepper::{BatchOutcome, RunState};

/// Which box receives typed characters
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Focus {
    /// Hotkeys drive the simulation
    #[default]
    Canvas,
    /// Characters go into the step-count box
    StepEntry,
}

impl Focus {
    pub fn next(&self) -> Focus {
        match self {
            Focus::Canvas => Focus::StepEntry,
            Focus::StepEntry => Focus::Canvas,
        }
    }
}

/// Kind of blocking notice shown over the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoticeKind {
    /// The user typed something unusable; fix it and retry
    InvalidInput,
    /// The run cannot continue; a reset is required
    Saturated,
    /// Anything else reported by the engine
    Failure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn from_error(err: &Error) -> Self {
        let kind = match err {
            Error::InvalidInput(_) => NoticeKind::InvalidInput,
            Error::SaturationExhausted { .. } => NoticeKind::Saturated,
            _ => NoticeKind::Failure,
        };
        Self {
            kind,
            message: err.to_string(),
        }
    }

    pub fn title(&self) -> &str {
        match self.kind {
            NoticeKind::InvalidInput => " Invalid step count ",
            NoticeKind::Saturated => " Simulation cannot continue ",
            NoticeKind::Failure => " Error ",
        }
    }

    pub fn hint(&self) -> &str {
        match self.kind {
            NoticeKind::InvalidInput => "Enter a positive whole number of steps.",
            NoticeKind::Saturated => "The region is full. Press R to reset.",
            NoticeKind::Failure => "Press Enter to dismiss.",
        }
    }
}

/// Main application state
pub struct App {
    pub engine: SimulationEngine,
    pub step_input: String,
    pub focus: Focus,
    pub fullscreen_mode: bool,
    pub show_help: bool,
    pub help_scroll: u16,
    pub show_particles: bool,
    pub notice: Option<Notice>,
    pub last_batch: Option<BatchOutcome>,
}

impl App {
    pub fn new(engine: SimulationEngine, default_steps: u64) -> Self {
        Self {
            engine,
            step_input: default_steps.to_string(),
            focus: Focus::Canvas,
            fullscreen_mode: false,
            show_help: false,
            help_scroll: 0,
            show_particles: true,
            notice: None,
            last_batch: None,
        }
    }

    /// Run one engine batch for this frame, then yield back to the event loop
    pub fn tick(&mut self) {
        match self.engine.step_batch() {
            Ok(BatchOutcome::Idle) => {}
            Ok(outcome) => self.last_batch = Some(outcome),
            Err(err) => self.report(&err),
        }
    }

    fn report(&mut self, err: &Error) {
        self.notice = Some(Notice::from_error(err));
    }

    /// Start a run with the typed step count
    pub fn submit_steps(&mut self) {
        match self.engine.run_input(&self.step_input) {
            Ok(RunRequest::Started) => self.focus = Focus::Canvas,
            Ok(RunRequest::AlreadyRunning) => {}
            Err(err) => self.report(&err),
        }
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    /// Reset simulation
    pub fn reset(&mut self) {
        self.last_batch = None;
        self.notice = None;
        if let Err(err) = self.engine.reset() {
            self.report(&err);
        }
    }

    /// Toggle between stopped and running the typed step count
    pub fn toggle_run(&mut self) {
        match self.engine.run_state() {
            RunState::Running => self.stop(),
            RunState::Stopped => self.submit_steps(),
        }
    }

    /// Cycle respawn strategy (ignored while running)
    pub fn cycle_strategy(&mut self) {
        let next = self.engine.strategy().next();
        self.engine.select_strategy(next);
    }

    /// Rebuild the engine with a different particle count, keeping the seed.
    /// Ignored while running.
    pub fn adjust_particles(&mut self, delta: i64) {
        if self.engine.run_state() == RunState::Running {
            return;
        }
        let mut settings = self.engine.settings().clone();
        settings.rng_seed = Some(self.engine.rng_seed());
        settings.adjust_particles(delta);
        match SimulationEngine::new(settings) {
            Ok(engine) => {
                self.engine = engine;
                self.last_batch = None;
            }
            Err(err) => self.report(&err),
        }
    }

    pub fn push_input(&mut self, c: char) {
        if self.step_input.len() < 12 {
            self.step_input.push(c);
        }
    }

    pub fn pop_input(&mut self) {
        self.step_input.pop();
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn next_focus(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn toggle_particles(&mut self) {
        self.show_particles = !self.show_particles;
    }

    /// Toggle fullscreen mode
    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen_mode = !self.fullscreen_mode;
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0; // Reset scroll when opening
        }
    }

    /// Scroll help content up
    pub fn scroll_help_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(1);
    }

    /// Scroll help content down
    pub fn scroll_help_down(&mut self, max_scroll: u16) {
        self.help_scroll = (self.help_scroll + 1).min(max_scroll);
    }
}
