//! Integration test modules.

mod config_services_test;
mod fallback_route_test;
mod walk_session_test;
