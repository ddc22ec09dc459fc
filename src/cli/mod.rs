mod handler;
mod options;

pub use handler::run;
pub use options::Options;

use env_logger::Env;

/// Install the global logger. `RUST_LOG` overrides the default level.
pub fn init_logger(quiet: bool) {
    let default_level = if quiet { "error" } else { "info" };

    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
