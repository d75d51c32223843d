use std::{collections::HashSet, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SocialError};

const DEFAULT_TOPICS: [&str; 12] = [
    "music",
    "movies",
    "sports",
    "technology",
    "travel",
    "cooking",
    "reading",
    "gaming",
    "photography",
    "art",
    "science",
    "fashion",
];

/// The fixed, ordered list of topics users can be interested in.
///
/// A topic's position in the catalog is its index everywhere else, so the catalog never changes
/// once it has been loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestCatalog {
    topics: Vec<String>,
}

impl InterestCatalog {
    pub fn new(topics: Vec<String>) -> Result<Self> {
        if topics.is_empty() {
            return Err(SocialError::EmptyCatalog);
        }

        let mut seen = HashSet::with_capacity(topics.len());
        for topic in &topics {
            if !seen.insert(topic.as_str()) {
                return Err(SocialError::InvalidConfig(format!(
                    "interest `{}` is listed twice",
                    topic
                )));
            }
        }

        Ok(InterestCatalog { topics })
    }

    /// Parses one topic per line. Blank lines and lines starting with `#` are skipped.
    pub fn from_text(text: &str) -> Result<Self> {
        let topics = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self::new(topics)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| SocialError::io(e, path))?;
        Self::from_text(&text)
    }

    /// The built-in topic list used when no catalog file is given.
    pub fn default_topics() -> Self {
        InterestCatalog {
            topics: DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.topics.get(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.topics.iter().position(|topic| topic == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(String::as_str)
    }

    /// A vector aligned with this catalog with no interest set.
    pub fn empty_vector(&self) -> InterestVector {
        InterestVector {
            flags: vec![false; self.topics.len()],
        }
    }

    /// Names of the topics set in both vectors, in catalog order.
    pub fn shared_names(&self, a: &InterestVector, b: &InterestVector) -> Vec<String> {
        a.shared_with(b)
            .filter_map(|i| self.name(i))
            .map(str::to_string)
            .collect()
    }
}

/// Per-user interest flags, aligned one to one with an [`InterestCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestVector {
    flags: Vec<bool>,
}

impl InterestVector {
    /// Builds a vector from stored flags. The length must match the catalog.
    pub fn from_flags(flags: Vec<bool>, catalog: &InterestCatalog) -> Result<Self> {
        if flags.len() != catalog.len() {
            return Err(SocialError::InvalidConfig(format!(
                "expected {} interest flags, got {}",
                catalog.len(),
                flags.len()
            )));
        }
        Ok(InterestVector { flags })
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn has(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Sets the flag at `index`. The length of the vector never changes.
    pub fn set(&mut self, index: usize) -> Result<()> {
        match self.flags.get_mut(index) {
            Some(flag) => {
                *flag = true;
                Ok(())
            }
            None => Err(SocialError::UnknownInterest(format!("#{}", index))),
        }
    }

    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    /// Number of interests set.
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&flag| flag).count()
    }

    /// Indices set in both `self` and `other`.
    pub fn shared_with<'a>(&'a self, other: &'a InterestVector) -> impl Iterator<Item = usize> + 'a {
        self.flags
            .iter()
            .zip(other.flags.iter())
            .enumerate()
            .filter(|(_, (&a, &b))| a && b)
            .map(|(i, _)| i)
    }
}
