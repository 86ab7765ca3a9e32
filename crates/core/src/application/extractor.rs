// Identifier Extractor - raw keys to canonical queue identifiers

use crate::domain::{queue_id_from_key, DomainError, QueueId};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Result of one extraction pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Sorted, deduplicated identifiers
    pub queues: Vec<QueueId>,
    /// Keys skipped for not following the naming convention
    pub malformed: usize,
}

/// Extract sorted, deduplicated queue identifiers from raw keys
///
/// Keys that do not follow `<namespace>:<queue>:<suffix>` are skipped and
/// logged; they never abort the pass.
pub fn extract_queue_ids<I, S>(namespace: &str, keys: I) -> Extraction
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut queues = BTreeSet::new();
    let mut malformed = 0;

    for key in keys {
        match queue_id_from_key(namespace, key.as_ref()) {
            Ok(queue) => {
                queues.insert(queue);
            }
            Err(DomainError::MalformedKey { key, reason }) => {
                debug!(key = %key, reason = %reason, "Skipping malformed key");
                malformed += 1;
            }
            Err(e) => {
                debug!(error = %e, "Skipping key");
                malformed += 1;
            }
        }
    }

    if malformed > 0 {
        warn!(
            namespace = %namespace,
            malformed,
            "Keys outside the queue naming convention were skipped"
        );
    }

    Extraction {
        queues: queues.into_iter().collect(),
        malformed,
    }
}
