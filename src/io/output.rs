//! Output formatting and logging utilities

use crate::trg_impl::Estimate;
use color_eyre::eyre::Result;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

/// Wall-clock time of day as HH:MM:SS
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let total_seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        write!(
            w,
            "{:02}:{:02}:{:02}",
            (total_seconds / 3600) % 24,
            (total_seconds / 60) % 60,
            total_seconds % 60
        )
    }
}

/// Send log output to `output_path`, or to stdout when no path is given
pub fn setup_output(output_path: Option<&String>) {
    match output_path {
        Some(path) => match File::create(path) {
            Ok(log) => {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(SecondPrecisionTimer)
                    .with_ansi(false);
                Registry::default().with(file_layer).init();
                info!("Log written to: {}", path);
            }
            Err(err) => eprintln!("Could not create output file {}: {}", path, err),
        },
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            Registry::default().with(stdout_layer).init();
        }
    }
}

/// Write one fixed-width row per estimate: step, sites per copy, free
/// energy and relative error
pub fn write_estimates<W: Write>(writer: &mut W, estimates: &[Estimate]) -> Result<()> {
    for estimate in estimates {
        writeln!(
            writer,
            "{:04} {:>6} {:.12e} {:.12e}",
            estimate.step, estimate.sites_per_copy, estimate.free_energy, estimate.relative_error
        )?;
    }
    Ok(())
}
