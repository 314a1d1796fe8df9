use std::path::PathBuf;

use kieznotiz::AppConfig;

fn main() {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let result = AppConfig::load(config_path.as_deref()).and_then(|config| kieznotiz::run(&config));
    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
