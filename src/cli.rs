#![allow(clippy::missing_errors_doc)]

use std::path::PathBuf;

use clap::Parser;

use crate::domain::EffectInputs;

/// Weather codes the demo script walks through, one per refresh.
pub const DEMO_CODES: &[i64] = &[0, 2, 3, 45, 61, 65, 95, 99, 71, 86, 48, 7];

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser, Clone)]
#[command(
    name = "ambient-fx",
    version,
    about = "Weather-reactive particle overlay for an ambient terminal display"
)]
pub struct Cli {
    /// WMO weather code to display (e.g. 0 clear, 61 rain, 95 thunderstorm)
    #[arg(long, allow_negative_numbers = true)]
    pub weather_code: Option<i64>,

    /// Effect quality tier (1..5); out-of-range values are clamped
    #[arg(long, allow_negative_numbers = true)]
    pub quality: Option<i64>,

    /// Disable weather effects entirely
    #[arg(long)]
    pub no_effects: bool,

    /// Target FPS (15..60)
    #[arg(long, value_parser = clap::value_parser!(u8).range(15..=60))]
    pub fps: Option<u8>,

    /// Cycle through a fixed list of weather codes
    #[arg(long)]
    pub demo: bool,

    /// Seconds between weather refreshes in demo mode (2..86400)
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u64).range(2..=86_400))]
    pub refresh_interval: u64,

    /// Pretend the graphics context cannot be created
    #[arg(long)]
    pub simulate_gpu_failure: bool,

    /// Write diagnostics to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Do not read or write the settings file
    #[arg(long)]
    pub no_persist: bool,
}

impl Cli {
    /// Inputs as given on the command line, before stored settings are applied.
    pub fn initial_inputs(&self) -> EffectInputs {
        EffectInputs::new(
            self.weather_code
                .or_else(|| self.demo.then(|| DEMO_CODES[0])),
            !self.no_effects,
            self.quality,
        )
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.demo && self.weather_code.is_some() {
            anyhow::bail!("--demo and --weather-code cannot be combined");
        }
        Ok(())
    }
}
