use clap::Subcommand;
use coachroom_core::{pacing_windows, ExercisePlan};

#[derive(Subcommand)]
pub enum PacingAction {
    /// Compute pacing windows for one round and print them as JSON
    Windows {
        /// Round duration in seconds
        #[arg(long)]
        duration: u32,
        /// Exercise spec `id:est_sec[:uni]`; repeat for each exercise
        #[arg(long = "exercise")]
        exercises: Vec<String>,
    },
}

pub fn run(action: PacingAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PacingAction::Windows {
            duration,
            exercises,
        } => {
            let plans = exercises
                .iter()
                .map(|spec| parse_spec(spec))
                .collect::<Result<Vec<_>, _>>()?;
            let windows = pacing_windows(duration, &plans);
            println!("{}", serde_json::to_string_pretty(&windows)?);
            Ok(())
        }
    }
}

fn parse_spec(spec: &str) -> Result<ExercisePlan, Box<dyn std::error::Error>> {
    let mut parts = spec.split(':');
    let id = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("empty exercise spec '{spec}'"))?;
    let est_sec = match parts.next() {
        Some(est) => Some(est.parse::<u32>().map_err(|_| {
            format!("bad estimate in '{spec}' (expected id:est_sec[:uni])")
        })?),
        None => None,
    };
    let unilateral = match parts.next() {
        Some("uni") => true,
        Some(other) => return Err(format!("unknown flag '{other}' in '{spec}'").into()),
        None => false,
    };
    Ok(ExercisePlan {
        exercise_id: id.to_string(),
        est_sec,
        unilateral,
    })
}
