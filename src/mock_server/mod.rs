//! Mock CircleCI API server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the CircleCI
//! v1.1 API for integration and end-to-end testing. Unlike wiremock which
//! mocks at the HTTP level per-test, this server maintains state across
//! requests, enabling realistic reconcile workflows.
//!
//! # Example
//!
//! ```ignore
//! use circleci_project::mock_server::{Fixtures, MockServer};
//! use circleci_project::CircleCiClient;
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = CircleCiClient::new("test-token", &server.url()).unwrap();
//!
//!     // Server comes with default fixtures
//!     let project = client.get_project(&Fixtures::test_project_ref()).await.unwrap();
//!     assert_eq!(project.reponame, "test-repo");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::{MockServer, API_PREFIX};
pub use state::{MockError, MockState};
