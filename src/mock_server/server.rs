//! Mock CircleCI API server.
//!
//! Provides an axum-based HTTP server that simulates the CircleCI v1.1 API.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers::{self, SharedState};
use super::state::MockState;

/// Path prefix of the emulated API version.
pub const API_PREFIX: &str = "/api/v1.1";

/// A mock CircleCI API server for testing.
///
/// The server runs in the background and can be used to test the client
/// and the reconciler against a realistic API implementation.
pub struct MockServer {
    /// Address the server listens on, e.g. `http://127.0.0.1:41234`.
    addr: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: SharedState,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the API base URL.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Server error");
        });

        Self {
            addr: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the API base URL of the mock server.
    ///
    /// Use this URL when creating a `CircleCiClient` for testing.
    pub fn url(&self) -> String {
        format!("{}{}/", self.addr, API_PREFIX)
    }

    /// Get the address of the server without the API prefix.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Get access to the server's shared state.
    ///
    /// This allows modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        let scenario = Fixtures::default_scenario();
        Self::state_from_scenario(scenario)
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new();

        for project in scenario.projects {
            state = state.with_project(project);
        }

        for (project, name, value) in scenario.env_vars {
            state = state.with_env_var(&project, &name, &value);
        }

        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: SharedState) -> Router {
        let api = Router::new()
            // Project routes
            .route("/projects", get(handlers::list_projects))
            .route("/project/:vcs/:account/:repo/follow", post(handlers::follow_project))
            .route("/project/:vcs/:account/:repo/enable", delete(handlers::disable_project))
            .route("/project/:vcs/:account/:repo/settings", put(handlers::update_settings))
            // Environment variable routes
            .route(
                "/project/:vcs/:account/:repo/envvar",
                get(handlers::list_env_vars).post(handlers::add_env_var),
            )
            .route(
                "/project/:vcs/:account/:repo/envvar/:name",
                delete(handlers::delete_env_var),
            );

        Router::new()
            .nest(API_PREFIX, api)
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
