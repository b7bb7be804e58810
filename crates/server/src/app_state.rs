use std::sync::Arc;

use integrations::SessionProvider;
use server_api::ApiContext;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: ApiContext,
    pub(crate) sessions: Arc<dyn SessionProvider>,
}
