use env_logger::WriteStyle;
use log::LevelFilter;
use std::io::Write;

/// Installs a stderr logger for the `log` macros used by the simulation.
///
/// `RUST_LOG` overrides the default `info` filter. Calling this more than once,
/// or after another logger was installed, returns an error and changes nothing.
pub fn init_logging() -> Result<(), log::SetLoggerError> {
    env_logger::builder()
        .format(|buf, record| writeln!(buf, "[CARBALL | {}] {}", record.level(), record.args()))
        .write_style(WriteStyle::Always)
        .filter(None, LevelFilter::Info)
        .parse_default_env()
        .try_init()
}
