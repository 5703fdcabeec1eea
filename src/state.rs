use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::hub::NotificationHub;
use crate::lifecycle::RideLifecycle;
use crate::models::driver::DriverPoolEntry;
use crate::observability::metrics::Metrics;
use crate::routing::{RouteProvider, StraightLineRoutes};
use crate::settlement::{LoggingLedger, LoggingMailer, Mailer, SettlementLedger};
use crate::storage::{InMemoryRideRepository, RideRepository};
use crate::users::{InMemoryUserStore, UserStore};

pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub rides: Arc<dyn RideRepository>,
    pub lifecycle: RideLifecycle,
    pub hub: NotificationHub,
    /// Drivers with a live socket; ephemeral, keyed by driver id.
    pub drivers: DashMap<Uuid, DriverPoolEntry>,
    pub routes: Arc<dyn RouteProvider>,
    pub ledger: Arc<dyn SettlementLedger>,
    pub mailer: Arc<dyn Mailer>,
    pub metrics: Metrics,
    pub ws_buffer_size: usize,
}

impl AppState {
    pub fn new(ws_buffer_size: usize) -> Self {
        let rides: Arc<dyn RideRepository> = Arc::new(InMemoryRideRepository::new());

        Self {
            users: Arc::new(InMemoryUserStore::new()),
            lifecycle: RideLifecycle::new(rides.clone()),
            rides,
            hub: NotificationHub::new(),
            drivers: DashMap::new(),
            routes: Arc::new(StraightLineRoutes::new()),
            ledger: Arc::new(LoggingLedger),
            mailer: Arc::new(LoggingMailer),
            metrics: Metrics::new(),
            ws_buffer_size,
        }
    }
}
