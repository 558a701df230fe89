mod emit;

use std::{collections::BTreeMap, io, path::PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use sort_visualiser_core::{
    classify, trace::is_sorted, Algorithm, AppConfig, Command, Event, LayoutRecorder, Session,
    ToneAnalyser, ToneContext, ToneMapper, ToneRecorder, ToneSink, TraceLoader, TraceOrigin,
};
use tracing_subscriber::EnvFilter;

const BAR_SPACING: f32 = 0.3;

fn main() -> sort_visualiser_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            algorithms,
            config,
            wav,
            max_frames,
        } => run_play(&algorithms, config, wav, max_frames),
        Commands::Inspect { algorithm, config } => run_inspect(algorithm, config),
        Commands::Emit { algorithm, len, seed } => {
            let seed = seed.unwrap_or_else(rand::random);
            let stdout = io::stdout();
            let mut out = io::BufWriter::new(stdout.lock());
            emit::emit_trace(algorithm, len, seed, &mut out)?;
            Ok(())
        }
        Commands::Tones { config, wav } => run_tones(config, wav),
    }
}

fn run_play(
    algorithms: &[Algorithm],
    config: Option<PathBuf>,
    wav: Option<PathBuf>,
    max_frames: Option<usize>,
) -> sort_visualiser_core::Result<()> {
    let config = AppConfig::load_or_default(config.as_deref())?;
    let (first, rest) = algorithms.split_first().unwrap_or((&Algorithm::Bubble, &[][..]));
    tracing::info!(algorithm = %first, "starting headless playback");

    let mut session = Session::new(&config, *first)?;
    let mut sink = ToneRecorder::new(config.audio.sample_rate);
    let mut renderer = LayoutRecorder::new(BAR_SPACING);
    let mut queue = rest.iter().copied();

    loop {
        let budget = max_frames.unwrap_or_else(|| frame_budget(&session, &config));
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for _ in 0..budget {
            let output = session.run_frame(&mut sink, &mut renderer)?;
            for event in &output.events {
                *counts.entry(event.kind()).or_default() += 1;
                tracing::trace!(index = output.index, event = ?event, "event");
            }
            if session.is_finished() || session.is_quit() {
                break;
            }
        }
        tracing::info!(
            algorithm = %session.algorithm(),
            index = session.cursor().index(),
            finished = session.is_finished(),
            events = ?counts,
            "playback stopped"
        );

        match queue.next() {
            Some(next) => {
                session.handle(Command::SelectAlgorithm(next))?;
            }
            None => break,
        }
    }
    session.handle(Command::Quit)?;

    if let Some(path) = wav {
        sink.write_wav(path)?;
    }
    Ok(())
}

/// Enough ticks to walk the whole trace at the configured cadence, plus one
/// second of slack.
fn frame_budget(session: &Session, config: &AppConfig) -> usize {
    let steps = session.trace().sequence.len();
    let ticks_per_step = config.playback.ticks_per_step.max(1) as usize;
    steps * ticks_per_step + config.playback.tick_rate_hz as usize
}

#[derive(Debug, Serialize)]
struct InspectReport {
    algorithm: Algorithm,
    origin: TraceOrigin,
    steps: usize,
    width: usize,
    max_value: Option<i64>,
    permutation_consistent: bool,
    ends_sorted: bool,
    events: BTreeMap<&'static str, usize>,
}

fn run_inspect(algorithm: Algorithm, config: Option<PathBuf>) -> sort_visualiser_core::Result<()> {
    let config = AppConfig::load_or_default(config.as_deref())?;
    let trace = TraceLoader::new(config.trace).load(algorithm);
    let sequence = &trace.sequence;

    let mut events: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut previous: Option<&[i64]> = None;
    for snapshot in sequence.iter() {
        for event in classify(previous, snapshot, algorithm) {
            *events.entry(event.kind()).or_default() += 1;
        }
        previous = Some(snapshot);
    }

    let report = InspectReport {
        algorithm,
        origin: trace.origin,
        steps: sequence.len(),
        width: sequence.width(),
        max_value: sequence.max_value(),
        permutation_consistent: sequence.is_permutation_consistent(),
        ends_sorted: sequence.last().is_some_and(is_sorted),
        events,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Renders one cue of each kind back to back and logs the measured pitch.
fn run_tones(config: Option<PathBuf>, wav: Option<PathBuf>) -> sort_visualiser_core::Result<()> {
    const GAP_SEC: f64 = 0.1;

    let config = AppConfig::load_or_default(config.as_deref())?;
    let mapper = ToneMapper::new(&config.audio);
    let context = ToneContext {
        max_value: 100,
        len: 50,
    };
    let palette = [
        Event::Swap {
            i: 10,
            j: 11,
            values: (40, 60),
        },
        Event::PartitionSpan { left: 5, right: 30 },
        Event::PivotPlaced { value: 75 },
        Event::MergeWrite {
            value: 25,
            index: 12,
        },
        Event::Completed,
    ];

    let sample_rate = config.audio.sample_rate;
    let mut analyser = ToneAnalyser::new(sample_rate);
    let mut sink = ToneRecorder::new(sample_rate);
    let mut at = 0.0_f64;
    for event in &palette {
        let tones = mapper.map_event(event, context);
        for tone in &tones {
            let samples = sort_visualiser_core::audio::synth::render(tone, sample_rate);
            let measured = analyser.dominant_frequency(&samples)?;
            tracing::info!(
                kind = event.kind(),
                requested_hz = tone.frequency_hz,
                measured_hz = measured,
                seconds = tone.duration_sec,
                "cue"
            );
            sink.submit(at, tone)?;
        }
        let longest = tones.iter().map(|tone| tone.end_sec()).fold(0.0_f32, f32::max);
        at += f64::from(longest) + GAP_SEC;
    }

    if let Some(path) = wav {
        sink.write_wav(path)?;
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

fn parse_algorithm(value: &str) -> Result<Algorithm, String> {
    value.parse::<Algorithm>().map_err(|err| err.to_string())
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Sorting algorithm visualiser with audio cues",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play traces headlessly, logging classified events.
    Play {
        /// Algorithms to play in order; switching happens once each finishes.
        #[arg(short, long = "algorithm", value_parser = parse_algorithm, default_value = "bubble")]
        algorithms: Vec<Algorithm>,
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the mixed audio cues to this WAV file.
        #[arg(short, long)]
        wav: Option<PathBuf>,
        /// Stop each trace after this many frames.
        #[arg(long)]
        max_frames: Option<usize>,
    },
    /// Load one trace and print a JSON summary of its classified events.
    Inspect {
        #[arg(short, long, value_parser = parse_algorithm, default_value = "bubble")]
        algorithm: Algorithm,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Act as a trace source: sort random values and print every step.
    Emit {
        #[arg(value_parser = parse_algorithm)]
        algorithm: Algorithm,
        /// Number of values to sort.
        #[arg(short, long, default_value_t = 50)]
        len: usize,
        /// Seed for the random values; random when omitted.
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Render one cue of each kind and report the measured pitch.
    Tones {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        wav: Option<PathBuf>,
    },
}
