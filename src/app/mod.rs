mod report;
mod runner;

pub use runner::{run_sweep, SweepRun};

use self::report::{report_model, report_sweep_summary};
use crate::config::{Args, Config};
use crate::exact;
use crate::io::setup_output;
use clap::Parser;
use color_eyre::eyre::{bail, Result, WrapErr};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use tracing::info;

pub struct TrgApplication {
    args: Args,
    config: Config,
}

impl TrgApplication {
    pub fn from_cli() -> Result<Self> {
        let args = Args::parse();
        Self::from_args(args)
    }

    pub fn from_args(args: Args) -> Result<Self> {
        let config = load_config(&args)?;
        Ok(Self { args, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn run(self) -> Result<()> {
        setup_output(self.args.output.as_ref());
        info!("Configuration loaded:\n{:?}", self.config);
        self.config.validate()?;

        let model = self.config.model();
        report_model(
            &model,
            exact::free_energy_per_site(model.temperature, model.coupling, model.boltzmann),
        );

        let mut table: Box<dyn Write> = match &self.args.table {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).wrap_err_with(|| format!("Unable to create table file: {}", path))?,
            )),
            None => Box::new(io::stdout().lock()),
        };
        let runs = run_sweep(&self.config, &mut table)?;
        table.flush().wrap_err("Failed to write estimate table")?;

        report_sweep_summary(&runs);
        let aborted = runs.iter().filter(|run| run.is_aborted()).count();
        if aborted > 0 {
            bail!("{} of {} runs aborted", aborted, runs.len());
        }
        Ok(())
    }
}

/// Read the configuration file if one was given, then apply command line
/// overrides and defaults.
fn load_config(args: &Args) -> Result<Config> {
    let config = match &args.config_file {
        Some(path) => {
            let config_content = fs::read_to_string(path)
                .wrap_err_with(|| format!("Unable to read configuration file: {}", path))?;
            serde_yml::from_str::<Config>(&config_content).wrap_err("Failed to parse configuration file")?
        }
        None => Config::default(),
    };
    Ok(config.apply_args(args).with_defaults())
}
