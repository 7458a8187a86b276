use std::cell::Cell;
use std::rc::Rc;

use clap::Subcommand;
use coachroom_core::{
    BlockPlan, CoachConfig, ExerciseInfo, ExercisePlan, SessionCaps, SessionContext, StaticLookup,
    TimelinePlayer, Verbosity,
};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Simulate a block on a virtual clock and print the cue trace
    Run {
        /// Rounds in the block
        #[arg(long, default_value = "3")]
        rounds: u32,
        /// Round duration in seconds
        #[arg(long, default_value = "180")]
        round_sec: u32,
        /// Coaching verbosity: silent, minimal, high
        #[arg(long, default_value = "minimal")]
        verbosity: String,
        /// Print events as JSON lines instead of a text trace
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Run {
            rounds,
            round_sec,
            verbosity,
            json,
        } => simulate(rounds, round_sec, &verbosity, json),
    }
}

fn parse_verbosity(s: &str) -> Result<Verbosity, Box<dyn std::error::Error>> {
    match s {
        "silent" => Ok(Verbosity::Silent),
        "minimal" => Ok(Verbosity::Minimal),
        "high" => Ok(Verbosity::High),
        other => Err(format!("unknown verbosity '{other}' (silent|minimal|high)").into()),
    }
}

fn demo_exercises() -> Vec<ExerciseInfo> {
    vec![
        ExerciseInfo {
            id: "goblet-squat".into(),
            name: "Goblet Squat".into(),
            technique_cues: vec!["chest tall".into(), "drive through the heels".into()],
            est_duration_sec: Some(45),
            unilateral: false,
        },
        ExerciseInfo {
            id: "split-squat".into(),
            name: "Split Squat".into(),
            technique_cues: vec!["front knee over the foot".into()],
            est_duration_sec: Some(75),
            unilateral: true,
        },
        ExerciseInfo {
            id: "ring-row".into(),
            name: "Ring Row".into(),
            technique_cues: vec!["squeeze the shoulder blades".into()],
            est_duration_sec: Some(30),
            unilateral: false,
        },
    ]
}

fn simulate(
    rounds: u32,
    round_sec: u32,
    verbosity: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let verbosity = parse_verbosity(verbosity)?;
    let exercises = demo_exercises();
    let plans: Vec<ExercisePlan> = exercises
        .iter()
        .map(|e| ExercisePlan {
            exercise_id: e.id.clone(),
            est_sec: e.est_duration_sec,
            unilateral: e.unilateral,
        })
        .collect();

    let mut config = CoachConfig::default();
    config.verbosity = verbosity;
    config.round.rounds = rounds;
    config.round.round_sec = round_sec;

    let lookup = Rc::new(StaticLookup::new(exercises));
    let ctx = SessionContext::new(config.pattern, config.mode, verbosity, "en", lookup);
    let mut player = TimelinePlayer::new(ctx, config.clone());

    // Virtual clock shared with the printing callbacks.
    let now = Rc::new(Cell::new(0u64));

    // JSON mode keeps stdout machine-readable: events only, no voice trace.
    if !json {
        let speak_clock = Rc::clone(&now);
        player.set_caps(SessionCaps {
            speak: Some(Box::new(move |line: &str| {
                println!("{} [voice] {line}", stamp(speak_clock.get()));
            })),
            ..Default::default()
        });
    }

    let event_clock = Rc::clone(&now);
    player.subscribe(move |event| {
        if json {
            match serde_json::to_string(event) {
                Ok(body) => println!("{{\"t_ms\":{},\"event\":{body}}}", event_clock.get()),
                Err(e) => eprintln!("error: {e}"),
            }
        } else {
            println!("{} {event:?}", stamp(event_clock.get()));
        }
    });

    let block = BlockPlan::from_config(&config, plans);
    player.play_block(&block, 0);

    while let Some(due) = player.next_due() {
        now.set(due);
        player.tick(due);
    }
    Ok(())
}

fn stamp(ms: u64) -> String {
    format!("[{:02}:{:02}.{:03}]", ms / 60_000, (ms / 1000) % 60, ms % 1000)
}
