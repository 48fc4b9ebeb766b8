use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    #[error("category name must not be empty")]
    Empty,
    #[error("category '{0}' already exists")]
    Duplicate(String),
}

#[derive(Debug, Clone, Default)]
pub struct CategoryStore {
    labels: Vec<String>,
}

impl CategoryStore {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|existing| existing == label)
    }

    /// Appends the trimmed label and returns it.
    pub fn add(&mut self, label: &str) -> Result<&str, CategoryError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(CategoryError::Empty);
        }
        if self.contains(label) {
            return Err(CategoryError::Duplicate(label.to_string()));
        }
        self.labels.push(label.to_string());
        Ok(&self.labels[self.labels.len() - 1])
    }

    pub fn delete(&mut self, label: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|existing| existing != label);
        self.labels.len() != before
    }
}
