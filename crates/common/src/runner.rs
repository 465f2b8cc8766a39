use std::time::Duration;

use crate::AppResult;

/// How long blocking tasks such as stdin reads get once the runner returns
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

#[async_trait::async_trait]
pub trait Runner {
    async fn run(&mut self) -> AppResult<String>;
}

/// Runs `runner` to completion on a multi threaded runtime and exits the
/// process with a failure status if it returns an error.
pub fn run_app<R: Runner>(mut runner: R) {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("failed to build runtime: {}", e);
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(async move { runner.run().await });
    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
    match result {
        Ok(name) => log::info!("{} finished", name),
        Err(e) => {
            log::error!("application failed: {}", e);
            std::process::exit(1);
        }
    }
}
