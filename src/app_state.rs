//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use tokio::sync::watch;

use crate::config::BackofficeConfig;
use crate::outbound::ImageUploader;
use crate::service::{
    FeedbackService, IdentityGate, MoreScreenService, RosterService, SettlementService,
    StaticCredentials, TournamentService,
};
use crate::store::Store;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Document store handle.
    pub store: Store,
    /// Operator auth gate and session registry.
    pub gate: Arc<IdentityGate<StaticCredentials>>,
    /// Settlement service. Shared so the in-flight guard spans every
    /// connection on this process.
    pub settlement: SettlementService,
    /// User roster operations.
    pub roster: RosterService,
    /// Tournament and category administration.
    pub tournaments: TournamentService,
    /// More-screen menu editor.
    pub more_screen: MoreScreenService,
    /// Feedback read/delete operations.
    pub feedback: FeedbackService,
    /// External image host client.
    pub uploader: Arc<ImageUploader>,
    /// Feedback bridge delivery status, shown to connected operators.
    pub notifier_status: watch::Receiver<Option<String>>,
    /// Page size for the transactions console.
    pub page_size: u32,
}

impl AppState {
    /// Wires all services over one store.
    #[must_use]
    pub fn new(
        store: Store,
        config: &BackofficeConfig,
        notifier_status: watch::Receiver<Option<String>>,
    ) -> Self {
        let gate = Arc::new(IdentityGate::new(StaticCredentials::from_config(config)));
        gate.mark_settled();
        Self {
            settlement: SettlementService::new(store.clone()),
            roster: RosterService::new(store.clone()),
            tournaments: TournamentService::new(store.clone()),
            more_screen: MoreScreenService::new(store.clone()),
            feedback: FeedbackService::new(store.clone()),
            uploader: Arc::new(ImageUploader::from_config(config)),
            notifier_status,
            page_size: config.page_size,
            gate,
            store,
        }
    }
}
