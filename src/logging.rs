//! Logger setup.

use crate::config::Config;

/// Installs the global logger: stdout, plus `latest.log` in the local data directory when the
/// config asks for it.
pub fn init(config: &Config) -> Result<(), String> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(config.log_level())
        .chain(std::io::stdout());

    if config.log.file
        && let Some(dir) = dirs::data_local_dir().map(|d| d.join("learnopengl"))
    {
        std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
        let file = fern::log_file(dir.join("latest.log")).map_err(|e| e.to_string())?;
        dispatch = dispatch.chain(file);
    }

    dispatch.apply().map_err(|e| e.to_string())
}
