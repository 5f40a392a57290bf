//! Dataset transform options.

use crate::Password;

/// Default name of the dataset wrapper element.
pub const DEFAULT_DATASET_ROOT: &str = "NewDataSet";

/// Default extension of entries holding tabular XML.
pub const DEFAULT_EXTENSION: &str = ".xml";

/// Options for [`transform`](super::transform).
#[derive(Clone)]
pub struct TransformOptions {
    /// Password for encrypted archives.
    pub password: Option<Password>,
    /// Column names left out of the statements (case-insensitive).
    pub primary_keys: Vec<String>,
    /// Name of the wrapper element around the table rows (case-insensitive).
    pub dataset_root: String,
    /// Only entries whose name ends with this extension are scanned.
    pub extension: String,
    /// Drop a record cut off by the end of its entry instead of failing.
    pub tolerate_truncation: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            password: None,
            primary_keys: Vec::new(),
            dataset_root: DEFAULT_DATASET_ROOT.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            tolerate_truncation: false,
        }
    }
}

impl std::fmt::Debug for TransformOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformOptions")
            .field("has_password", &self.password.is_some())
            .field("primary_keys", &self.primary_keys)
            .field("dataset_root", &self.dataset_root)
            .field("extension", &self.extension)
            .field("tolerate_truncation", &self.tolerate_truncation)
            .finish()
    }
}

impl TransformOptions {
    /// Creates transform options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the password used to decrypt entries.
    pub fn password(mut self, password: impl Into<Password>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Replaces the list of primary-key column names.
    pub fn primary_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one primary-key column name.
    pub fn primary_key(mut self, key: impl Into<String>) -> Self {
        self.primary_keys.push(key.into());
        self
    }

    /// Sets the dataset wrapper element name.
    pub fn dataset_root(mut self, name: impl Into<String>) -> Self {
        self.dataset_root = name.into();
        self
    }

    /// Sets the extension of entries to scan (for example `.xml`).
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Controls what happens when an entry ends inside a record.
    pub fn tolerate_truncation(mut self, tolerate: bool) -> Self {
        self.tolerate_truncation = tolerate;
        self
    }

    /// Returns true if `column` is a configured primary key.
    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_keys
            .iter()
            .any(|key| key.eq_ignore_ascii_case(column))
    }

    /// Returns true if `element` is the dataset wrapper.
    pub fn is_dataset_root(&self, element: &str) -> bool {
        self.dataset_root.eq_ignore_ascii_case(element)
    }
}
