use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key/value settings handed to a processor at construction.
///
/// No key is interpreted yet; the processor only carries them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessorSettings {
    values: BTreeMap<String, String>,
}

impl ProcessorSettings {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for ProcessorSettings
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<It: IntoIterator<Item = (K, V)>>(iter: It) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
