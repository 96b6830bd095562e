//! Notification boundary
//!
//! Delivery (email, messaging) belongs to an external collaborator; the
//! engine only emits the event. `LogNotifier` is the production default
//! until a real sender is wired in.

use carflow_core::{models::Booking, traits::NotificationSender, AppResult};
use async_trait::async_trait;
use tracing::{info, instrument};

/// Notification sender that records decisions in the log stream
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSender for LogNotifier {
    #[instrument(skip(self, booking))]
    async fn booking_decided(&self, booking: &Booking) -> AppResult<()> {
        info!(
            "Notifying customer {}: booking {} {}",
            booking.customer_id, booking.id, booking.action
        );
        Ok(())
    }
}
