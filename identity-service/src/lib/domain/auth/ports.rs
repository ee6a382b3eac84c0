use async_trait::async_trait;

use super::errors::DeliveryError;
use crate::domain::identity::models::Identity;

/// External notification capability (email delivery).
///
/// Implemented by an outbound adapter; failures are reported to the caller
/// but never roll back the operation that triggered the notification.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    /// Deliver the verification link carrying the raw verify-email token.
    ///
    /// # Errors
    /// * `DeliveryError` - Message could not be built or sent
    async fn send_verification_email(
        &self,
        identity: &Identity,
        raw_token: &str,
    ) -> Result<(), DeliveryError>;
}
