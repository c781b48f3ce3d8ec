//! Follow-up reminder payloads.
//!
//! Composes the push payload announcing how many follow-ups are due today.

use super::push::PushPayload;
use super::script::{DEFAULT_TAG, DEFAULT_URL};

/// Names listed before the rest are summarised as "+N more".
const LISTED_NAMES: usize = 3;

/// Payload for the contacts whose follow-ups are due today.
///
/// Returns `None` when nothing is due.
pub fn follow_up_reminder<S: AsRef<str>>(contact_names: &[S]) -> Option<PushPayload> {
    let count = contact_names.len();
    if count == 0 {
        return None;
    }

    let mut body = contact_names
        .iter()
        .take(LISTED_NAMES)
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");
    if count > LISTED_NAMES {
        body.push_str(&format!(" +{} more", count - LISTED_NAMES));
    }

    let plural = if count > 1 { "s" } else { "" };

    Some(PushPayload {
        title: Some(format!("{count} Follow-up{plural} Due Today")),
        body: Some(body),
        tag: Some(DEFAULT_TAG.into()),
        url: Some(DEFAULT_URL.into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_due() {
        let names: [&str; 0] = [];
        assert!(follow_up_reminder(&names).is_none());
    }

    #[test]
    fn test_single_follow_up() {
        let payload = follow_up_reminder(&["Ana Ruiz"]).unwrap();
        assert_eq!(payload.title.as_deref(), Some("1 Follow-up Due Today"));
        assert_eq!(payload.body.as_deref(), Some("Ana Ruiz"));
        assert_eq!(payload.url.as_deref(), Some("/dashboard"));
        assert_eq!(payload.tag.as_deref(), Some("follow-up"));
    }

    #[test]
    fn test_three_names_listed() {
        let payload = follow_up_reminder(&["Ana", "Bo", "Cy"]).unwrap();
        assert_eq!(payload.title.as_deref(), Some("3 Follow-ups Due Today"));
        assert_eq!(payload.body.as_deref(), Some("Ana, Bo, Cy"));
    }

    #[test]
    fn test_overflow_summarised() {
        let names: Vec<String> = ["Ana", "Bo", "Cy", "Di", "Ed"].iter().map(|s| s.to_string()).collect();
        let payload = follow_up_reminder(&names).unwrap();
        assert_eq!(payload.title.as_deref(), Some("5 Follow-ups Due Today"));
        assert_eq!(payload.body.as_deref(), Some("Ana, Bo, Cy +2 more"));
    }
}
