//! # Search Criteria
//!
//! Every populated filter must hold for a block to match. Keyword filters
//! match if the block carries any of the requested keywords. The free-text
//! `term` is matched case-insensitively against keywords and category, and
//! against payload text at the levels that read payloads.

use chrono::{DateTime, Utc};
use shared_types::{Block, BlockNumber, ParameterError};
use zeroize::Zeroizing;

/// What to look for.
#[derive(Clone, Default)]
pub struct SearchCriteria {
    pub term: Option<String>,
    pub keywords: Vec<String>,
    pub category: Option<String>,
    pub block_number: Option<BlockNumber>,
    pub hash: Option<String>,
    /// Inclusive lower bound on the block timestamp.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the block timestamp.
    pub to: Option<DateTime<Utc>>,
    /// Opens password-encrypted payloads while scanning.
    pub password: Option<Zeroizing<String>>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text search for `term`.
    pub fn term(term: impl Into<String>) -> Self {
        Self::new().with_term(term)
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_block_number(mut self, number: BlockNumber) -> Self {
        self.block_number = Some(number);
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_date_range(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Zeroizing::new(password.into()));
        self
    }

    /// Reject criteria that select nothing or contradict themselves.
    pub fn check(&self) -> Result<(), ParameterError> {
        let has_filter = self.normalized_term().is_some()
            || self.keywords.iter().any(|k| !k.trim().is_empty())
            || self.category.as_deref().is_some_and(|c| !c.trim().is_empty())
            || self.block_number.is_some()
            || self.hash.as_deref().is_some_and(|h| !h.trim().is_empty())
            || self.from.is_some()
            || self.to.is_some();
        if !has_filter {
            return Err(ParameterError::new(
                "criteria",
                "at least one search filter is required",
            ));
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(ParameterError::new("from", "start of date range is after its end"));
            }
        }
        Ok(())
    }

    /// Lower-cased, trimmed term; `None` when blank.
    pub fn normalized_term(&self) -> Option<String> {
        self.term
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
    }

    /// Indexed-field filters: keywords, category, number, hash, dates.
    pub fn matches_metadata(&self, block: &Block) -> bool {
        if self.block_number.is_some_and(|n| n != block.block_number) {
            return false;
        }
        if let Some(hash) = self.hash.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
            if !hash.eq_ignore_ascii_case(&block.hash) {
                return false;
            }
        }
        if self.from.is_some_and(|from| block.timestamp < from) {
            return false;
        }
        if self.to.is_some_and(|to| block.timestamp > to) {
            return false;
        }
        if let Some(category) = self.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            let matches = block
                .content_category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category));
            if !matches {
                return false;
            }
        }

        let wanted: Vec<String> = self
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        wanted.is_empty() || block.all_keywords().any(|k| wanted.iter().any(|w| w == k))
    }

    /// `term` found in the block's keywords or category.
    pub fn term_in_metadata(term: &str, block: &Block) -> bool {
        block.all_keywords().any(|k| k.contains(term))
            || block
                .content_category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(term))
    }
}

/// Case-insensitive containment of an already lower-cased `term`.
pub fn text_contains(text: &str, term: &str) -> bool {
    text.to_lowercase().contains(term)
}

impl std::fmt::Debug for SearchCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCriteria")
            .field("term", &self.term)
            .field("keywords", &self.keywords)
            .field("category", &self.category)
            .field("block_number", &self.block_number)
            .field("hash", &self.hash)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
