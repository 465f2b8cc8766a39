mod processor;
mod settings;
mod worker;

pub use processor::*;
pub use settings::*;
pub use worker::*;

/// A batch handed to a processor. `None` stands for an absent batch.
pub type Batch<T> = Option<Vec<T>>;

/// A trait for processing data with configurable input and output types
///
/// # Type Parameters
/// * `I` - The input type that will be processed
/// * `O` - The output type that will be produced after processing
///
/// This trait provides a common interface for processors that transform
/// input data of type `I` into output data of type `O`. The processing may
/// produce nothing, which is why the output is wrapped in an `Option`.
pub trait BatchProcessor<I, O> {
    /// Processes the given input and attempts to produce an output
    ///
    /// # Parameters
    /// * `input` - The input data to process, of type `I`
    ///
    /// # Returns
    /// * `Option<O>` - The processed output if any (`Some`), or `None` if nothing is produced
    fn process(&mut self, input: &I) -> Option<O>;
}
