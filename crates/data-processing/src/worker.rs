use common::{AppError, AppResult, Context, SharedRef, SpawnResult, Worker};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::BatchProcessor;

/// A worker that processes batches using a specified processor implementation
///
/// # Type Parameters
/// * `I` - The input type that will be received from the upstream channel
/// * `O` - The output type that will be sent downstream
/// * `A` - The processor implementation type that transforms `I` into `O`
///
/// This worker acts as a bridge between:
/// 1. An upstream channel that sends input data of type `I`
/// 2. A processor that transforms the input
/// 3. A downstream channel that receives the processed output of type `O`
///
/// The worker stops once the upstream channel closes. On an application exit
/// signal it stops accepting input but still processes what is already queued.
pub struct DataProcessingWorker<I, O, A>
where
    A: BatchProcessor<I, O>,
{
    /// Application context containing configuration and runtime information
    context: Context,

    /// Receives input data, taken by the spawned task
    receiver: Option<Receiver<I>>,

    /// Sends processed output data to the downstream consumer
    sender: Sender<O>,

    /// The implementation that processes input data into output data
    processor: SharedRef<A>,
}

impl<I, O, A> DataProcessingWorker<I, O, A>
where
    A: BatchProcessor<I, O>,
{
    /// Creates a new DataProcessingWorker with the given components
    pub fn new(context: Context, receiver: Receiver<I>, sender: Sender<O>, processor: A) -> Self {
        Self {
            context,
            receiver: Some(receiver),
            sender,
            processor: SharedRef::new(processor),
        }
    }

    /// Clones the worker, moving the receiver into the clone
    pub fn clone_with_receiver(&mut self) -> Self {
        Self {
            context: self.context.clone(),
            receiver: self.receiver.take(),
            sender: self.sender.clone(),
            processor: self.processor.clone(),
        }
    }

    pub fn process(&mut self, input: &I) -> Option<O> {
        self.processor.lock().process(input)
    }

    async fn forward(&mut self, input: &I) -> AppResult<()> {
        if let Some(output) = self.process(input) {
            self.sender.send(output).await.map_err(|_| {
                AppError::ChannelSendError(format!("{} downstream channel is closed", self.context.name))
            })?;
            log::debug!("{} forwarded batch", self.context.name);
        }
        Ok(())
    }
}

impl<I, O, A> Worker for DataProcessingWorker<I, O, A>
where
    I: Send + Sync + 'static,
    O: Send + 'static,
    A: BatchProcessor<I, O> + Send + 'static,
{
    fn spawn(&mut self) -> SpawnResult {
        let mut worker = self.clone_with_receiver();
        let mut exit = worker.context.subscribe();

        tokio::spawn(async move {
            let Some(mut receiver) = worker.receiver.take() else {
                return Err(AppError::Unrecoverable(format!(
                    "{} receiver is not set",
                    worker.context.name
                )));
            };
            log::info!("{} started", worker.context.name);

            loop {
                tokio::select! {
                    input = receiver.recv() => {
                        match input {
                            Some(input) => worker.forward(&input).await?,
                            None => {
                                log::info!("{} input closed", worker.context.name);
                                break;
                            }
                        }
                    }
                    message = exit.recv() => {
                        log::info!("{} received {:?}, draining queued input", worker.context.name, message);
                        receiver.close();
                        while let Some(input) = receiver.recv().await {
                            worker.forward(&input).await?;
                        }
                        break;
                    }
                }
            }

            let name = worker.context.name.clone();
            worker.context.log_and_exit(&name)
        })
    }
}

#[cfg(test)]
mod tests {
    use config::Config;
    use tokio::sync::mpsc;

    use super::*;
    use crate::{Batch, DataProcessor};

    type TestWorker = DataProcessingWorker<Batch<i32>, Vec<i32>, DataProcessor<i32>>;

    fn context() -> Context {
        Context::from_config(Config::builder().build().unwrap()).with_name("processing-test")
    }

    #[tokio::test]
    async fn test_forwards_batches_until_input_closes() {
        let (input_tx, input_rx) = mpsc::channel(8);
        let (output_tx, mut output_rx) = mpsc::channel(8);
        let mut worker: TestWorker = DataProcessingWorker::new(context(), input_rx, output_tx, DataProcessor::new());

        let handle = worker.spawn();
        input_tx.send(Some(vec![1, 2])).await.unwrap();
        input_tx.send(None).await.unwrap();
        input_tx.send(Some(vec![3])).await.unwrap();
        drop(input_tx);

        assert_eq!(handle.await.unwrap().unwrap(), "processing-test");
        drop(worker);

        assert_eq!(output_rx.recv().await, Some(vec![1, 2]));
        assert_eq!(output_rx.recv().await, Some(vec![]));
        assert_eq!(output_rx.recv().await, Some(vec![3]));
        assert_eq!(output_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_exit_signal_drains_queued_input() {
        let context = context();
        let (input_tx, input_rx) = mpsc::channel(8);
        let (output_tx, mut output_rx) = mpsc::channel(8);
        for batch in [Some(vec![1]), Some(vec![2]), Some(vec![3])] {
            input_tx.send(batch).await.unwrap();
        }

        let mut worker: TestWorker = DataProcessingWorker::new(context.clone(), input_rx, output_tx, DataProcessor::new());
        let handle = worker.spawn();
        assert!(context.exit());

        assert!(handle.await.unwrap().is_ok());
        for expected in [vec![1], vec![2], vec![3]] {
            assert_eq!(output_rx.recv().await, Some(expected));
        }
        drop(input_tx);
    }

    #[tokio::test]
    async fn test_closed_downstream_fails() {
        let (input_tx, input_rx) = mpsc::channel(8);
        let (output_tx, output_rx) = mpsc::channel(8);
        drop(output_rx);

        let mut worker: TestWorker = DataProcessingWorker::new(context(), input_rx, output_tx, DataProcessor::new());
        let handle = worker.spawn();
        input_tx.send(Some(vec![1])).await.unwrap();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(AppError::ChannelSendError(_))));
    }

    #[tokio::test]
    async fn test_second_spawn_has_no_receiver() {
        let (_input_tx, input_rx) = mpsc::channel(8);
        let (output_tx, _output_rx) = mpsc::channel(8);

        let mut worker: TestWorker = DataProcessingWorker::new(context(), input_rx, output_tx, DataProcessor::new());
        let first = worker.spawn();
        let second = worker.spawn();

        assert!(matches!(second.await.unwrap(), Err(AppError::Unrecoverable(_))));
        first.abort();
    }

    #[test]
    fn test_process_delegates_to_processor() {
        let (_input_tx, input_rx) = mpsc::channel(1);
        let (output_tx, _output_rx) = mpsc::channel(1);
        let mut worker: TestWorker = DataProcessingWorker::new(context(), input_rx, output_tx, DataProcessor::new());
        assert_eq!(worker.process(&Some(vec![4, 5])), Some(vec![4, 5]));
    }
}
