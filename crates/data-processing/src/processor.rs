use std::marker::PhantomData;

use crate::{Batch, BatchProcessor, ProcessorSettings};

/// Filters and cleans batches of opaque items.
///
/// Items are never inspected: every item is accepted and passed through
/// unchanged, so the output of [`DataProcessor::process_data`] always equals
/// its input. What makes an item malformed, and what should be stripped from
/// it, is not decided yet.
#[derive(Debug, Clone)]
pub struct DataProcessor<T> {
    settings: ProcessorSettings,
    _item: PhantomData<fn(&T) -> T>,
}

impl<T> Default for DataProcessor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DataProcessor<T> {
    /// Creates a processor with empty settings
    pub fn new() -> Self {
        Self::with_settings(ProcessorSettings::default())
    }

    pub fn with_settings(settings: ProcessorSettings) -> Self {
        Self {
            settings,
            _item: PhantomData,
        }
    }

    pub fn settings(&self) -> &ProcessorSettings {
        &self.settings
    }

    // TODO: reject items once a validation schema for malformed data is agreed on
    fn validate_item(&self, _item: &T) -> bool {
        true
    }
}

impl<T: Clone> DataProcessor<T> {
    /// Returns the valid items of `raw_items`, cleaned, in their original order.
    ///
    /// An absent or empty input yields an empty vector. The result is always a
    /// new vector, the input is left untouched.
    pub fn process_data(&self, raw_items: Option<&[T]>) -> Vec<T> {
        let raw_items = match raw_items {
            Some(items) if !items.is_empty() => items,
            _ => return Vec::new(),
        };

        raw_items
            .iter()
            .filter(|item| self.validate_item(item))
            .map(|item| self.clean_item(item))
            .collect()
    }

    // TODO: strip sensitive fields once the set of sensitive fields is defined
    fn clean_item(&self, item: &T) -> T {
        item.clone()
    }
}

impl<T: Clone> BatchProcessor<Batch<T>, Vec<T>> for DataProcessor<T> {
    fn process(&mut self, input: &Batch<T>) -> Option<Vec<T>> {
        Some(self.process_data(input.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    #[test]
    fn test_empty_input() {
        let processor = DataProcessor::<String>::new();
        assert!(processor.process_data(Some(&[][..])).is_empty());
    }

    #[test]
    fn test_absent_input() {
        let processor = DataProcessor::<String>::new();
        assert!(processor.process_data(None).is_empty());
    }

    #[test]
    fn test_strings_pass_through() {
        let processor = DataProcessor::new();
        let input = vec!["a", "b", "c"];
        assert_eq!(processor.process_data(Some(input.as_slice())), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_numbers_pass_through() {
        let processor = DataProcessor::new();
        assert_eq!(processor.process_data(Some(&[1, 2, 3][..])), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_object_passes_unchanged() {
        let processor = DataProcessor::<Value>::new();
        let input = vec![json!({})];
        assert_eq!(processor.process_data(Some(input.as_slice())), vec![json!({})]);
    }

    #[test]
    fn test_mixed_json_keeps_order_and_length() {
        let processor = DataProcessor::<Value>::new();
        let input = vec![json!(null), json!("x"), json!({"password": "hunter2"}), json!([1, 2]), json!(3.5)];
        let output = processor.process_data(Some(input.as_slice()));
        assert_eq!(output.len(), input.len());
        assert_eq!(output, input);
    }

    #[test]
    fn test_idempotent() {
        let processor = DataProcessor::new();
        let input = vec![3, 1, 2, 1];
        let once = processor.process_data(Some(input.as_slice()));
        let twice = processor.process_data(Some(once.as_slice()));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_output_is_a_new_vector() {
        let processor = DataProcessor::new();
        let mut input = vec![String::from("a")];
        let output = processor.process_data(Some(input.as_slice()));
        input[0].push('b');
        assert_eq!(output, vec![String::from("a")]);
    }

    #[test]
    fn test_settings_are_kept() {
        let settings: ProcessorSettings = [("region", "eu")].into_iter().collect();
        let processor = DataProcessor::<u8>::with_settings(settings.clone());
        assert_eq!(processor.settings(), &settings);
        assert!(DataProcessor::<u8>::default().settings().is_empty());
    }

    #[test]
    fn test_batch_processor() {
        let mut processor = DataProcessor::new();
        assert_eq!(processor.process(&Some(vec![1, 2])), Some(vec![1, 2]));
        assert_eq!(processor.process(&None), Some(vec![]));
        assert_eq!(processor.process(&Some(vec![])), Some(vec![]));
    }
}
