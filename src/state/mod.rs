//! Client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by domain (`profiles`, `notifications`, `tour`) so
//! callers can depend on small focused containers. Mutations broadcast a
//! [`StateEvent`] so observers can react without the containers knowing
//! about them — the event channel replaces the reactive-store
//! subscriptions of the original front-end.

pub mod notifications;
pub mod profiles;
pub mod tour;

use tokio::sync::broadcast;

/// State-change events emitted by the client's containers.
///
/// Dropped when nobody is subscribed; lagging receivers miss events rather
/// than blocking mutators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// The token pair was stored, replaced, or cleared.
    TokensChanged,
    /// The in-memory user record changed (sign-in, refresh, sign-out).
    SessionChanged,
    /// A profile namespace id was resolved or the map was cleared.
    ProfilesChanged,
    /// A notification entered the queue.
    NotificationPushed(u64),
    /// A notification left the queue (dismissed or timed out).
    NotificationDismissed(u64),
    /// A new translation set is active.
    LanguageChanged(String),
}

/// Shared sender handle for state events.
pub type Events = broadcast::Sender<StateEvent>;

pub(crate) fn emit(events: &Events, event: StateEvent) {
    // Err only means no live receivers.
    let _ = events.send(event);
}
