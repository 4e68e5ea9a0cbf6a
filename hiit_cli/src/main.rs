mod ticker;

use clap::{Parser, Subcommand};
use hiit_core::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use ticker::{spawn_stdin_reader, HostEvent, ThreadClock};

#[derive(Parser)]
#[command(name = "hiit")]
#[command(about = "Guided interval workout runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a workout session (default)
    Run {
        /// Workout key (see `hiit list`)
        #[arg(long)]
        workout: Option<String>,

        /// Work interval in seconds
        #[arg(long)]
        work: Option<u32>,

        /// Rest interval in seconds
        #[arg(long)]
        rest: Option<u32>,

        /// Starting intensity (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        intensity: Option<u8>,

        /// Seed for the heart rate simulation
        #[arg(long)]
        seed: Option<u64>,

        /// Auto-complete (for testing) - run every interval instantly
        #[arg(long)]
        auto_complete: bool,

        /// Difficulty rating used with --auto-complete (easy, medium, hard)
        #[arg(long, default_value = "medium")]
        rating: String,

        /// Notes stored with --auto-complete
        #[arg(long)]
        notes: Option<String>,
    },

    /// List available workouts
    List,

    /// Show saved sessions, newest first
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    hiit_core::logging::init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    let catalog = BuiltinCatalog::with_custom(&config.workouts);
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    match cli.command {
        Some(Commands::Run {
            workout,
            work,
            rest,
            intensity,
            seed,
            auto_complete,
            rating,
            notes,
        }) => {
            let key = workout.unwrap_or_else(|| config.session.workout.clone());
            let session = SessionConfig::from_catalog(&catalog, &key)?
                .with_defaults(&config.session);
            let session = session.clone().with_durations(
                work.unwrap_or(session.work_secs),
                rest.unwrap_or(session.rest_secs),
            );
            let session = match intensity {
                Some(i) => session.with_intensity(i),
                None => session,
            };

            let rng = match seed {
                Some(seed) => RngSource::seeded(seed),
                None => RngSource::from_entropy(),
            };
            let mut sink = JsonlSink::new(results_path(&data_dir));

            if auto_complete {
                let feedback = Feedback::new(rating.parse()?, notes);
                cmd_run_instant(session, rng, feedback, &mut sink)
            } else {
                cmd_run_live(session, rng, &mut sink)
            }
        }
        Some(Commands::List) => cmd_list(&catalog),
        Some(Commands::History { limit }) => cmd_history(&data_dir, limit),
        None => {
            // Default to an interactive run of the configured workout
            let session = SessionConfig::from_catalog(&catalog, &config.session.workout)?
                .with_defaults(&config.session);
            let mut sink = JsonlSink::new(results_path(&data_dir));
            cmd_run_live(session, RngSource::from_entropy(), &mut sink)
        }
    }
}

fn results_path(data_dir: &Path) -> PathBuf {
    data_dir.join("results.jsonl")
}

/// Run every interval without waiting on the wall clock
fn cmd_run_instant<R: RandomSource>(
    session: SessionConfig,
    rng: R,
    feedback: Feedback,
    sink: &mut JsonlSink,
) -> Result<()> {
    let narrator = ConsoleNarrator::new(session.exercises().to_vec(), false);
    let mut engine = SessionEngine::new(session, ManualClock::new(), rng, narrator)?;

    engine.start();
    while !engine.state().is_complete() {
        let token = engine
            .armed_token()
            .ok_or_else(|| Error::Other("Clock stopped before the session completed".into()))?;
        engine.handle_tick(token);
    }

    engine.submit_feedback(feedback, sink)?;
    Ok(())
}

#[derive(Clone, Copy)]
enum Prompt {
    Session,
    Rating,
    Notes(Difficulty),
}

/// Run the session in real time, taking commands from stdin
fn cmd_run_live<R: RandomSource>(
    session: SessionConfig,
    rng: R,
    sink: &mut JsonlSink,
) -> Result<()> {
    let (tx, rx) = channel();
    spawn_stdin_reader(tx.clone());

    let narrator = ConsoleNarrator::new(session.exercises().to_vec(), true);
    let mut engine = SessionEngine::new(session, ThreadClock::new(tx), rng, narrator)?;

    print_controls();
    engine.start();

    let mut prompt = Prompt::Session;
    let mut save_error: Option<Error> = None;

    for event in rx.iter() {
        match event {
            HostEvent::Tick(token) => engine.handle_tick(token),
            HostEvent::InputClosed => break,
            HostEvent::Line(line) => match prompt {
                Prompt::Session => {
                    if !apply_command(&mut engine, &line) {
                        break;
                    }
                }
                Prompt::Rating => match line.trim().to_lowercase().as_str() {
                    "q" | "quit" => break,
                    "x" | "reset" => {
                        engine.reset();
                        println!("Press Enter to start again.");
                        prompt = Prompt::Session;
                    }
                    _ => match line.parse::<Difficulty>() {
                        Ok(difficulty) => {
                            println!("Any notes? (Enter to skip, 'q' to quit without saving)");
                            prompt = Prompt::Notes(difficulty);
                        }
                        Err(e) => println!("{}", e),
                    },
                },
                Prompt::Notes(_) if is_quit(&line) => break,
                Prompt::Notes(difficulty) => {
                    match engine.submit_feedback(Feedback::new(difficulty, Some(line)), sink) {
                        Ok(_) => return Ok(()),
                        Err(e) => {
                            println!("Type 'x' to restart the session or 'q' to quit.");
                            save_error = Some(e);
                            prompt = Prompt::Session;
                        }
                    }
                }
            },
        }

        if matches!(prompt, Prompt::Session) && engine.state().phase == Phase::Complete {
            println!("How hard was it? [e]asy / [m]edium / [h]ard  ('x' restart, 'q' quit)");
            prompt = Prompt::Rating;
        }
        if engine.state().phase != Phase::SaveFailed {
            save_error = None;
        }
    }

    engine.pause();
    match save_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "q" | "quit")
}

/// Apply one stdin command; false means quit
fn apply_command<C: Clock, R: RandomSource, N: Narrator>(
    engine: &mut SessionEngine<C, R, N>,
    line: &str,
) -> bool {
    let mut parts = line.split_whitespace();
    match parts.next().map(|c| c.to_lowercase()).as_deref() {
        None => {
            if engine.state().running {
                engine.pause()
            } else {
                engine.resume()
            }
        }
        Some("p") | Some("pause") => engine.pause(),
        Some("r") | Some("resume") | Some("start") => engine.resume(),
        Some("n") | Some("next") => engine.advance(),
        Some("b") | Some("back") => engine.previous(),
        Some("x") | Some("reset") => {
            engine.reset();
            println!("Press Enter to start again.");
        }
        Some("i") | Some("intensity") => match parts.next().map(str::parse::<u8>) {
            Some(Ok(value)) => engine.set_intensity(value),
            _ => println!("Usage: i <0-100>"),
        },
        Some("q") | Some("quit") => return false,
        Some("h") | Some("help") => print_controls(),
        Some(other) => println!("Unknown command '{}'. Type 'h' for help.", other),
    }
    true
}

fn print_controls() {
    println!("─────────────────────────────────────────");
    println!("Enter      pause / resume");
    println!("n / b      next / previous exercise");
    println!("i <0-100>  set intensity");
    println!("x          restart session");
    println!("q          quit");
    println!("─────────────────────────────────────────");
}

fn cmd_list(catalog: &BuiltinCatalog) -> Result<()> {
    for workout in catalog.workouts() {
        println!("{}  {} ({} exercises)", workout.key, workout.title, workout.exercises.len());
        for exercise in &workout.exercises {
            println!("    • {} ({})", exercise.title, exercise.target);
        }
    }
    Ok(())
}

fn cmd_history(data_dir: &Path, limit: usize) -> Result<()> {
    let mut results = read_results(&results_path(data_dir))?;

    if results.is_empty() {
        println!("No sessions saved yet.");
        return Ok(());
    }

    results.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    for result in results.iter().take(limit) {
        println!(
            "{}  {:<16} {:>4}s {:>4} kcal  {:<6} {}",
            result.completed_at.format("%Y-%m-%d %H:%M"),
            result.session_key,
            result.total_duration_secs,
            result.calories_burned,
            result.difficulty,
            result.notes.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

/// Prints session events for a terminal user
struct ConsoleNarrator {
    exercises: Vec<ExerciseDescriptor>,
    show_ticks: bool,
    mid_line: bool,
}

impl ConsoleNarrator {
    fn new(exercises: Vec<ExerciseDescriptor>, show_ticks: bool) -> Self {
        Self {
            exercises,
            show_ticks,
            mid_line: false,
        }
    }

    fn end_line(&mut self) {
        if self.mid_line {
            println!();
            self.mid_line = false;
        }
    }
}

impl Narrator for ConsoleNarrator {
    fn announce(&mut self, event: &SessionEvent) {
        if let SessionEvent::Tick {
            remaining,
            calories_burned,
            heart_rate,
        } = event
        {
            if self.show_ticks {
                print!(
                    "\r  {:>2}:{:02}   {:>6.1} kcal   {:>3.0} bpm ",
                    remaining / 60,
                    remaining % 60,
                    calories_burned,
                    heart_rate.current
                );
                let _ = io::stdout().flush();
                self.mid_line = true;
            }
            return;
        }

        self.end_line();
        match event {
            SessionEvent::Started => println!("▶ Session started"),
            SessionEvent::PhaseChanged {
                phase,
                exercise_index,
                remaining,
            } => match phase {
                Phase::Work => {
                    if let Some(exercise) = self.exercises.get(*exercise_index) {
                        println!(
                            "\n── WORK {}/{} · {} ({}) · {}s",
                            exercise_index + 1,
                            self.exercises.len(),
                            exercise.title,
                            exercise.target,
                            remaining
                        );
                        println!("   {}", exercise.instructions);
                    }
                }
                _ => println!("\n── {} · {}s", phase.label(), remaining),
            },
            SessionEvent::RestBegins { next } => {
                println!("   Up next: {} ({})", next.title, next.target)
            }
            SessionEvent::Paused => println!("⏸ Paused"),
            SessionEvent::Resumed => println!("▶ Resumed"),
            SessionEvent::Reset => println!("↺ Session reset"),
            SessionEvent::IntensityChanged(value) => println!("Intensity set to {}", value),
            SessionEvent::Completed(summary) => {
                println!("\n✓ Workout complete!");
                println!(
                    "  {} exercises · {}s active · {:.0} kcal",
                    summary.exercises_completed,
                    summary.total_duration_secs,
                    summary.calories_burned
                );
                if summary.heart_rate.max > 0.0 {
                    println!(
                        "  Heart rate avg {:.0} bpm · max {:.0} bpm",
                        summary.heart_rate.avg, summary.heart_rate.max
                    );
                }
            }
            SessionEvent::Saved { result_id } => println!("✓ Session saved ({})", result_id),
            SessionEvent::SaveFailed { reason } => {
                println!("✗ Workout complete, but the result was NOT saved: {}", reason)
            }
            SessionEvent::Tick { .. } => {}
        }
    }
}
