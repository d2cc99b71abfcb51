//! Per-append and per-import options.

use std::path::PathBuf;
use zeroize::Zeroizing;

/// Optional metadata and storage switches for [`append`](crate::ChainStore::append).
#[derive(Clone, Default)]
pub struct AppendOptions {
    /// Caller keywords, normalised before storage.
    pub keywords: Vec<String>,
    /// Content category.
    pub category: Option<String>,
    /// Store off-chain regardless of size.
    pub force_off_chain: bool,
    /// Override the off-chain store's encryption default.
    pub encrypt_off_chain: Option<bool>,
    /// Encrypt the payload under this password before storage.
    pub encrypt_password: Option<Zeroizing<String>>,
    /// Content type recorded for off-chain payloads.
    pub content_type: Option<String>,
}

impl AppendOptions {
    pub fn new() -> Self {
        Self::default()
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

    pub fn with_force_off_chain(mut self, force: bool) -> Self {
        self.force_off_chain = force;
        self
    }

    pub fn with_off_chain_encryption(mut self, encrypt: bool) -> Self {
        self.encrypt_off_chain = Some(encrypt);
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.encrypt_password = Some(Zeroizing::new(password.into()));
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl std::fmt::Debug for AppendOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppendOptions")
            .field("keywords", &self.keywords)
            .field("category", &self.category)
            .field("force_off_chain", &self.force_off_chain)
            .field("encrypt_off_chain", &self.encrypt_off_chain)
            .field("encrypt_password", &self.encrypt_password.as_ref().map(|_| "<redacted>"))
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Switches for [`import_chain`](crate::ChainStore::import_chain).
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Validate and plan only; nothing is written.
    pub dry_run: bool,
    /// Accept blocks whose signer is unknown or revoked in this registry.
    /// Broken links, hashes and signatures are never accepted.
    pub force: bool,
    /// Export the current chain here before replacing it.
    pub backup_path: Option<PathBuf>,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_backup(mut self, path: impl Into<PathBuf>) -> Self {
        self.backup_path = Some(path.into());
        self
    }
}
