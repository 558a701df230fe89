//! Playback session: owns the active trace, the cursor and the completion
//! memo, and turns ticks and user commands into events and tone requests.

use serde::Serialize;

use crate::{
    audio::{ToneContext, ToneMapper, ToneRequest, ToneSink},
    classify::classify,
    completion::CompletionMemo,
    playback::{PlaybackCursor, StepClock},
    render::{FrameView, Renderer},
    trace::{LoadedTrace, TraceLoader},
    Algorithm, AppConfig, Camera, Event, Result, SortVizError,
};

/// User input understood by the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePause,
    StepForward,
    StepBack,
    Restart,
    ToggleMute,
    VolumeUp,
    VolumeDown,
    SelectAlgorithm(Algorithm),
    RotateCamera { dx: f32, dy: f32 },
    Zoom(f32),
    Quit,
}

/// Result of one tick or command.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickOutput {
    pub index: usize,
    /// Whether the cursor moved forward during this tick.
    pub advanced: bool,
    pub events: Vec<Event>,
    /// Empty while muted, even when `events` is not.
    pub tones: Vec<ToneRequest>,
}

#[derive(Debug)]
pub struct Session {
    loader: TraceLoader,
    trace: LoadedTrace,
    cursor: PlaybackCursor,
    clock: StepClock,
    memo: CompletionMemo,
    mapper: ToneMapper,
    camera: Camera,
    tick_rate_hz: u32,
    ticks: u64,
    quit: bool,
}

impl Session {
    /// Loads the first trace. Fails only if the loader returns an empty
    /// sequence, which leaves nothing to play.
    pub fn new(config: &AppConfig, algorithm: Algorithm) -> Result<Self> {
        let loader = TraceLoader::new(config.trace.clone());
        let trace = load_playable(&loader, algorithm)?;
        let cursor = PlaybackCursor::new(trace.sequence.len());
        tracing::info!(
            %algorithm,
            origin = ?trace.origin,
            steps = trace.sequence.len(),
            "session started"
        );

        Ok(Self {
            loader,
            trace,
            cursor,
            clock: StepClock::new(config.playback.ticks_per_step),
            memo: CompletionMemo::new(config.completion.memo_capacity),
            mapper: ToneMapper::new(&config.audio),
            camera: Camera::default(),
            tick_rate_hz: config.playback.tick_rate_hz.max(1),
            ticks: 0,
            quit: false,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.trace.algorithm
    }

    pub fn trace(&self) -> &LoadedTrace {
        &self.trace
    }

    pub fn cursor(&self) -> &PlaybackCursor {
        &self.cursor
    }

    pub fn memo(&self) -> &CompletionMemo {
        &self.memo
    }

    pub fn mapper(&self) -> &ToneMapper {
        &self.mapper
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Session time derived from the tick count at the configured rate.
    pub fn elapsed_seconds(&self) -> f64 {
        self.ticks as f64 / f64::from(self.tick_rate_hz)
    }

    /// `true` once the cursor sits on a sorted final snapshot.
    pub fn is_finished(&self) -> bool {
        self.cursor.at_end() && crate::trace::is_sorted(self.current_snapshot())
    }

    pub fn current_snapshot(&self) -> &[i64] {
        self.trace
            .sequence
            .get(self.cursor.index())
            .unwrap_or_default()
    }

    pub fn frame(&self) -> FrameView<'_> {
        FrameView {
            snapshot: self.current_snapshot(),
            algorithm: self.algorithm(),
            index: self.cursor.index(),
            len: self.cursor.len(),
            paused: self.cursor.is_paused(),
            muted: self.mapper.is_muted(),
            volume: self.mapper.volume(),
        }
    }

    /// One scheduler tick: advances on the step cadence unless paused, then
    /// classifies the transition and checks for completion.
    pub fn tick(&mut self) -> TickOutput {
        self.ticks += 1;
        let advanced = self.clock.tick() && self.cursor.tick();
        self.output(advanced)
    }

    /// Ticks, forwards the resulting tones to `sink` and draws the frame.
    pub fn run_frame(
        &mut self,
        sink: &mut dyn ToneSink,
        renderer: &mut dyn Renderer,
    ) -> Result<TickOutput> {
        let output = self.tick();
        let at = self.elapsed_seconds();
        for tone in &output.tones {
            sink.submit(at, tone)?;
        }
        renderer.draw(&self.frame(), &self.camera)?;
        Ok(output)
    }

    /// Applies a user command. Only `StepForward` can produce events; an
    /// algorithm switch fails without touching the current state if the new
    /// trace is unplayable.
    pub fn handle(&mut self, command: Command) -> Result<TickOutput> {
        match command {
            Command::TogglePause => self.cursor.toggle_pause(),
            Command::StepForward => {
                let advanced = self.cursor.step_forward();
                return Ok(self.output(advanced));
            }
            Command::StepBack => {
                self.cursor.step_back();
            }
            Command::Restart => {
                self.cursor.restart();
                self.clock.reset();
            }
            Command::ToggleMute => self.mapper.toggle_mute(),
            Command::VolumeUp => self.mapper.increase_volume(),
            Command::VolumeDown => self.mapper.decrease_volume(),
            Command::SelectAlgorithm(algorithm) => self.select_algorithm(algorithm)?,
            Command::RotateCamera { dx, dy } => self.camera.rotate(dx, dy),
            Command::Zoom(delta) => self.camera.zoom(delta),
            Command::Quit => self.quit = true,
        }
        tracing::debug!(?command, index = self.cursor.index(), "command applied");
        Ok(self.idle_output())
    }

    fn select_algorithm(&mut self, algorithm: Algorithm) -> Result<()> {
        let trace = load_playable(&self.loader, algorithm)?;
        tracing::info!(
            from = %self.trace.algorithm,
            to = %algorithm,
            origin = ?trace.origin,
            steps = trace.sequence.len(),
            "switched algorithm"
        );
        self.cursor.reset(trace.sequence.len());
        self.clock.reset();
        self.trace = trace;
        Ok(())
    }

    fn output(&mut self, advanced: bool) -> TickOutput {
        let index = self.cursor.index();
        let algorithm = self.trace.algorithm;
        let curr = self.trace.sequence.get(index).unwrap_or_default();

        let mut events = if advanced {
            let prev = index
                .checked_sub(1)
                .and_then(|previous| self.trace.sequence.get(previous));
            classify(prev, curr, algorithm)
        } else {
            Vec::new()
        };

        let context = ToneContext::from_snapshot(curr);
        let at_end = self.cursor.at_end();
        let completed = self.memo.check_completion(algorithm, at_end, curr);
        if let Some(event) = completed {
            tracing::info!(%algorithm, steps = self.cursor.len(), "trace completed");
            events.push(event);
        }

        if !events.is_empty() {
            tracing::debug!(%algorithm, index, events = events.len(), "classified transition");
        }
        let tones = self.mapper.requests_for(&events, context);

        TickOutput {
            index,
            advanced,
            events,
            tones,
        }
    }

    fn idle_output(&self) -> TickOutput {
        TickOutput {
            index: self.cursor.index(),
            ..TickOutput::default()
        }
    }
}

fn load_playable(loader: &TraceLoader, algorithm: Algorithm) -> Result<LoadedTrace> {
    let trace = loader.load(algorithm);
    if trace.sequence.is_empty() {
        return Err(SortVizError::EmptyTrace(algorithm.to_string()));
    }
    Ok(trace)
}
