use async_trait::async_trait;
use tracing::info;

use crate::error::AppError;
use crate::models::ride::Ride;

/// Reference to a settlement transaction on the external ledger.
#[derive(Debug, Clone)]
pub struct TxRef(pub String);

/// Opaque settlement collaborator. Called after a ride completes, off the
/// request path; a failure here never touches the ride's lifecycle state.
#[async_trait]
pub trait SettlementLedger: Send + Sync {
    async fn record_ride(&self, ride: &Ride) -> Result<TxRef, AppError>;
}

/// Outbound receipt delivery, also fire-and-forget post-completion.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_receipt(&self, ride: &Ride) -> Result<(), AppError>;
}

/// Default ledger: records locally in the logs only.
pub struct LoggingLedger;

#[async_trait]
impl SettlementLedger for LoggingLedger {
    async fn record_ride(&self, ride: &Ride) -> Result<TxRef, AppError> {
        info!(ride_id = %ride.id, fare = ride.fare, "ride recorded on local ledger");
        Ok(TxRef(format!("local-{}", ride.id)))
    }
}

/// Default mailer: logs the receipt instead of sending it.
pub struct LoggingMailer;

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send_receipt(&self, ride: &Ride) -> Result<(), AppError> {
        info!(ride_id = %ride.id, rider_id = %ride.rider_id, "receipt queued");
        Ok(())
    }
}
