//! Restart re-matching.
//!
//! Native handles are meaningless across restarts, so restoring a session
//! means pairing each stored [`WindowIdentity`] with a currently-open
//! window by descriptor fields. Class name and process are hard
//! requirements; the title is a tie-breaker because file-manager titles
//! change as the user navigates.

use std::collections::HashSet;

use crate::registry::types::{Hwnd, WindowDescriptor};
use crate::session::types::{GroupWindowState, WindowIdentity};

fn identity_matches(identity: &WindowIdentity, descriptor: &WindowDescriptor) -> bool {
    identity.class_name == descriptor.class_name
        && identity.process_name == descriptor.process_name()
}

fn title_matches(identity: &WindowIdentity, descriptor: &WindowDescriptor) -> bool {
    identity.title.eq_ignore_ascii_case(&descriptor.title)
}

/// Pair a snapshot's stored identities with live windows.
///
/// Each live window is claimed at most once. Identities are resolved in
/// stored order; an exact title match is preferred, otherwise the first
/// unclaimed window with the same class and process is taken. Unmatched
/// identities are simply absent from the result; the snapshot is kept on
/// disk until the next save overwrites it.
pub fn match_windows(
    state: &GroupWindowState,
    live: &[(Hwnd, WindowDescriptor)],
) -> Vec<Hwnd> {
    let mut claimed: HashSet<Hwnd> = HashSet::new();
    let mut matched = Vec::new();

    for identity in &state.windows {
        let exact = live.iter().find(|(hwnd, descriptor)| {
            !claimed.contains(hwnd)
                && identity_matches(identity, descriptor)
                && title_matches(identity, descriptor)
        });
        let candidate = exact.or_else(|| {
            live.iter().find(|(hwnd, descriptor)| {
                !claimed.contains(hwnd) && identity_matches(identity, descriptor)
            })
        });

        if let Some((hwnd, _)) = candidate {
            claimed.insert(*hwnd);
            matched.push(*hwnd);
        }
    }

    matched
}
