use std::path::PathBuf;

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// Route `log` records (and `tracing` events, through its `log` feature) to
/// the console and, optionally, to a log file with its own level.
///
/// Console lines carry only the colored level and message, the file gets
/// timestamps and targets as well.
pub fn setup_logging(
    console_level: LevelFilter,
    log_file: Option<PathBuf>,
    file_level: LevelFilter,
) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let console = fern::Dispatch::new()
        .level(console_level)
        // HTTP internals are noise on the console.
        .level_for("hyper_util", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .format(move |out, message, record| {
            if record.level() == log::Level::Info {
                out.finish(format_args!("{}", message))
            } else {
                out.finish(format_args!("[{}] {}", colors.color(record.level()), message))
            }
        })
        .chain(std::io::stderr());

    let mut root = fern::Dispatch::new().chain(console);

    if let Some(path) = log_file {
        let file = fern::log_file(&path)
            .wrap_err_with(|| format!("Failed to open log file: {}", path.display()))?;
        root = root.chain(
            fern::Dispatch::new()
                .level(file_level)
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} [{}] {}: {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .chain(file),
        );
    }

    root.apply().wrap_err("Failed to install logger")?;
    Ok(())
}
