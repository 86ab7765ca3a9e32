// Raw Key Naming Convention
//
// Queue keys look like `<namespace>:<queue>:<suffix>`. The suffix may itself
// contain colons (`bull:emails:1:lock`); the queue segment may not.

use super::error::{DomainError, Result};
use super::queue::QueueId;

pub const KEY_SEPARATOR: char = ':';

/// Extract the queue identifier from one raw key
///
/// # Errors
/// `DomainError::MalformedKey` when the key is outside the namespace,
/// has an empty queue segment, or has no suffix segment.
pub fn queue_id_from_key(namespace: &str, key: &str) -> Result<QueueId> {
    let rest = key
        .strip_prefix(namespace)
        .and_then(|rest| rest.strip_prefix(KEY_SEPARATOR))
        .ok_or_else(|| malformed(key, "outside namespace"))?;

    let (queue, suffix) = rest
        .split_once(KEY_SEPARATOR)
        .ok_or_else(|| malformed(key, "missing suffix segment"))?;

    if queue.is_empty() {
        return Err(malformed(key, "empty queue segment"));
    }
    if suffix.is_empty() {
        return Err(malformed(key, "empty suffix segment"));
    }

    Ok(queue.to_string())
}

/// Check a queue name supplied from outside (e.g. an RPC parameter)
///
/// # Errors
/// `DomainError::InvalidQueueId` when the name is empty or contains the
/// key separator, i.e. could never come out of `queue_id_from_key`.
pub fn validate_queue_id(queue: &str) -> Result<()> {
    let reason = if queue.is_empty() {
        "must not be empty"
    } else if queue.contains(KEY_SEPARATOR) {
        "must not contain ':'"
    } else {
        return Ok(());
    };
    Err(DomainError::InvalidQueueId {
        queue: queue.to_string(),
        reason: reason.to_string(),
    })
}

/// Store glob pattern matching every key in the namespace
///
/// Glob metacharacters inside the namespace are escaped so they match literally.
pub fn namespace_pattern(namespace: &str) -> String {
    let mut pattern = String::with_capacity(namespace.len() + 2);
    for c in namespace.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push(KEY_SEPARATOR);
    pattern.push('*');
    pattern
}

fn malformed(key: &str, reason: &str) -> DomainError {
    DomainError::MalformedKey {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
