use std::path::PathBuf;

use clap::Subcommand;
use coachroom_core::CoachConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the default configuration as TOML
    Show,
    /// Validate a configuration file
    Check { path: PathBuf },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            println!("{}", CoachConfig::default().to_toml()?);
            Ok(())
        }
        ConfigAction::Check { path } => {
            let text = std::fs::read_to_string(&path)?;
            let config = CoachConfig::from_toml(&text)?;
            println!(
                "ok: verbosity={:?} rounds={} round_sec={}",
                config.verbosity, config.round.rounds, config.round.round_sec
            );
            Ok(())
        }
    }
}
