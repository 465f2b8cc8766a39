use common::{AppError, AppResult, Context, SharedRef, SpawnResult, Worker};
use data_processing::Batch;
use serde_json::value::RawValue;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{Receiver, Sender};

/// One item exactly as it appeared in the input, never re-encoded
pub type Item = Box<RawValue>;

/// Parses one input line into a batch.
///
/// A JSON array is a batch, `null` is an absent batch and a blank line yields
/// `Ok(None)`. Anything else, including bytes that are not UTF-8, is a
/// warning for the caller to skip.
pub fn parse_line(line: &[u8]) -> AppResult<Option<Batch<Item>>> {
    let line = std::str::from_utf8(line)
        .map_err(|e| AppError::Warning(format!("skipping line that is not utf-8: {}", e)))?
        .trim();
    if line.is_empty() {
        return Ok(None);
    }

    let batch = serde_json::from_str::<Batch<Item>>(line).map_err(|e| {
        AppError::Warning(format!("skipping line, expected a json array or null: {}", e))
    })?;
    Ok(Some(batch))
}

/// Reads the next line including its terminator, `None` at end of input
async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<Option<Vec<u8>>> {
    let mut line = Vec::new();
    match reader.read_until(b'\n', &mut line).await? {
        0 => Ok(None),
        _ => Ok(Some(line)),
    }
}

/// Reads batches line by line and sends them to the processing worker.
///
/// Finishes at end of input or on an application exit signal.
pub struct LineReaderWorker<R> {
    context: Context,
    reader: SharedRef<Option<R>>,
    sender: Sender<Batch<Item>>,
}

impl<R> LineReaderWorker<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    pub fn new(context: Context, reader: R, sender: Sender<Batch<Item>>) -> Self {
        Self {
            context,
            reader: SharedRef::new(Some(reader)),
            sender,
        }
    }
}

impl<R> Worker for LineReaderWorker<R>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    fn spawn(&mut self) -> SpawnResult {
        let reader = self.reader.lock().take();
        let sender = self.sender.clone();
        let context = self.context.clone();
        let mut exit = context.subscribe();

        tokio::spawn(async move {
            let Some(mut reader) = reader else {
                return Err(AppError::Unrecoverable(format!("{} reader is not set", context.name)));
            };
            let mut line_number = 0usize;

            loop {
                tokio::select! {
                    line = read_line(&mut reader) => {
                        // Only a failing read is fatal, bad content is skipped below
                        let Some(line) = line? else {
                            log::info!("{} reached end of input after {} lines", context.name, line_number);
                            break;
                        };
                        line_number += 1;

                        match parse_line(&line) {
                            Ok(Some(batch)) => {
                                if sender.send(batch).await.is_err() {
                                    return Err(AppError::ChannelSendError(format!(
                                        "{} processing channel is closed",
                                        context.name
                                    )));
                                }
                            }
                            Ok(None) => {}
                            Err(e) if e.is_recoverable() => log::warn!("line {}: {}", line_number, e),
                            Err(e) => return Err(e),
                        }
                    }
                    _ = exit.recv() => {
                        log::info!("{} stopping on exit signal", context.name);
                        break;
                    }
                }
            }

            context.log_and_exit(&context.name)
        })
    }
}

/// Writes each processed batch as one JSON line.
///
/// Runs until every producer of the output channel is gone so no processed
/// batch is lost on shutdown.
pub struct LineWriterWorker<W> {
    context: Context,
    writer: SharedRef<Option<W>>,
    receiver: Option<Receiver<Vec<Item>>>,
}

impl<W> LineWriterWorker<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(context: Context, writer: W, receiver: Receiver<Vec<Item>>) -> Self {
        Self {
            context,
            writer: SharedRef::new(Some(writer)),
            receiver: Some(receiver),
        }
    }
}

impl<W> Worker for LineWriterWorker<W>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn spawn(&mut self) -> SpawnResult {
        let writer = self.writer.lock().take();
        let receiver = self.receiver.take();
        let context = self.context.clone();

        tokio::spawn(async move {
            let (Some(mut writer), Some(mut receiver)) = (writer, receiver) else {
                return Err(AppError::Unrecoverable(format!("{} is already running", context.name)));
            };

            let mut batches = 0usize;
            while let Some(batch) = receiver.recv().await {
                let mut line = serde_json::to_vec(&batch)?;
                line.push(b'\n');
                writer.write_all(&line).await?;
                writer.flush().await?;
                batches += 1;
            }
            log::info!("{} wrote {} batches", context.name, batches);

            context.log_and_exit(&context.name)
        })
    }
}
