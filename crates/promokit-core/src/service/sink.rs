use tracing::info;

use crate::models::PromoEvent;

/// Receives analytics events from a `PromoService`.
///
/// The service only keeps a weak reference to its sink; the host owns it
/// and should call `PromoService::clear_event_sink` on teardown.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: &PromoEvent);
}

/// Sink that writes events to the tracing log.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&self, event: &PromoEvent) {
        let kind = if event.is_impression() { "impression" } else { "tap" };
        info!(app_id = event.app_id(), kind, "Promo event");
    }
}
