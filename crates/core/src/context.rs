//! Caller identity propagation.
//!
//! An inbound request's metadata (credentials, request id) is captured once
//! into an immutable [`CallMetadata`] bag. [`CallContext`] carries that bag,
//! together with the call's cancellation token, into every outbound call so
//! downstream services see the original caller.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::SubmissionError;

/// Metadata key holding the caller's credential.
pub const CREDENTIAL_KEY: &str = "authorization";

/// Ordered, case-insensitive bag of call metadata entries.
///
/// Keys are stored lower-cased, values exactly as received. A key may occur
/// more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallMetadata {
    entries: Vec<(String, String)>,
}

impl CallMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. The key is lower-cased, the value is kept verbatim.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries.push((key.to_ascii_lowercase(), value.into()));
    }

    /// First value recorded for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the bag identifies a caller, i.e. carries a non-empty credential.
    pub fn has_credentials(&self) -> bool {
        self.get(CREDENTIAL_KEY)
            .is_some_and(|value| !value.trim().is_empty())
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for CallMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Self::new();
        for (key, value) in iter {
            metadata.insert(key.as_ref(), value);
        }
        metadata
    }
}

/// Outbound-call context threaded through every downstream call of one
/// submission.
///
/// Cloning is cheap; all clones share the same metadata and cancellation.
#[derive(Debug, Clone)]
pub struct CallContext {
    metadata: Arc<CallMetadata>,
    cancel: CancellationToken,
}

impl CallContext {
    /// Build the outbound context from the inbound call's metadata.
    ///
    /// Fails with [`SubmissionError::AuthenticationContextMissing`] when the
    /// inbound call is anonymous.
    pub fn from_inbound(
        metadata: CallMetadata,
        cancel: CancellationToken,
    ) -> Result<Self, SubmissionError> {
        if !metadata.has_credentials() {
            return Err(SubmissionError::AuthenticationContextMissing);
        }
        Ok(Self {
            metadata: Arc::new(metadata),
            cancel,
        })
    }

    /// Metadata to attach, unmodified, to every outbound call.
    pub fn metadata(&self) -> &CallMetadata {
        &self.metadata
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` to completion unless the call is cancelled first.
    ///
    /// Returns `None` on cancellation; `fut` is dropped at that point, which
    /// aborts whatever network I/O it was blocked on.
    pub async fn run_until_cancelled<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => None,
            output = fut => Some(output),
        }
    }
}
