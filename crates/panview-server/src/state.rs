//! Application state.

use panview_site::AppContext;

/// State shared by all request handlers.
pub(crate) struct AppState {
    /// Compilers, resolvers and caches.
    pub(crate) context: AppContext,
}
