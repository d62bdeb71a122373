use crate::interface_adapters::clients::auth::AuthClient;
use crate::interface_adapters::clients::results::ResultsClient;
use crate::use_cases::RoomRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // Owns the set of active room match tasks.
    pub room_registry: Arc<RoomRegistry>,
    // Verifies session tokens during the join handshake.
    pub auth_client: Arc<AuthClient>,
    // Reports finished matches to the head service.
    pub results_client: Arc<ResultsClient>,
}
