use common::{init_logging, run_app};
use runner::DataProcessorRunner;

mod app_config;
mod io;
mod runner;

const ENV_FILE: &str = ".env/data-processor.env";

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("{}", e);
    }

    match DataProcessorRunner::from_env_file(ENV_FILE) {
        Ok(runner) => run_app(runner),
        Err(e) => {
            log::error!("failed to load configuration: {}", e);
            std::process::exit(1);
        }
    }
}
