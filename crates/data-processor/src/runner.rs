use common::{static_config, AppResult, Context, Runner, Workers};
use data_processing::{DataProcessingWorker, DataProcessor};
use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};
use tokio::sync::mpsc;

use crate::{
    app_config::ProcessorAppConfig,
    io::{Item, LineReaderWorker, LineWriterWorker},
};

/// Streams JSON batches from stdin through the processor to stdout.
pub struct DataProcessorRunner {
    context: Context,
}

impl DataProcessorRunner {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub fn from_env_file(env_file: &str) -> AppResult<Self> {
        let config = static_config::create_config(env_file)
            .set_default("app_name", "data-processor")?
            .build()?;
        Ok(Self::new(Context::from_config(config)))
    }
}

/// Runs reader -> input channel -> processing worker -> output channel -> writer
/// until the reader reaches end of input and every queued batch is written.
pub async fn run_pipeline<R, W>(
    context: &Context,
    app_config: ProcessorAppConfig,
    reader: R,
    writer: W,
) -> AppResult<String>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (input_sender, input_receiver) = mpsc::channel(app_config.input_buffer);
    let (output_sender, output_receiver) = mpsc::channel(app_config.output_buffer);

    let mut workers = Workers::new(context.clone(), 0);

    let reader = LineReaderWorker::new(context.with_name("input-reader"), reader, input_sender);
    workers.add_worker(Box::new(reader));

    let processor = DataProcessor::<Item>::with_settings(app_config.settings);
    let processing_worker = DataProcessingWorker::new(
        context.with_name("data-processing-worker"),
        input_receiver,
        output_sender,
        processor,
    );
    workers.add_worker(Box::new(processing_worker));

    let writer = LineWriterWorker::new(context.with_name("output-writer"), writer, output_receiver);
    workers.add_worker(Box::new(writer));

    workers.run().await
}

#[async_trait::async_trait]
impl Runner for DataProcessorRunner {
    async fn run(&mut self) -> AppResult<String> {
        let app_config = ProcessorAppConfig::from_config(&self.context.config)?;
        log::info!(
            "{} starting with buffers in={} out={}",
            self.context.name,
            app_config.input_buffer,
            app_config.output_buffer
        );
        for (key, value) in app_config.settings.iter() {
            log::debug!("setting {} = {}", key, value);
        }

        run_pipeline(
            &self.context,
            app_config,
            BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
        )
        .await?;
        Ok("DataProcessorRunner".to_string())
    }
}
