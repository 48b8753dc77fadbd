//! Wanderer - Story-Driven Walking Tours
//!
//! Plans a walking route through user-placed checkpoints, generates a
//! branching story bound to those checkpoints, and narrates it as the walker
//! reaches each stop. Remote directions and story providers are tried through
//! rotating API keys and always degrade to local fallbacks.

pub mod config;
pub mod credentials;
pub mod geo;
pub mod http;
pub mod location;
pub mod narration;
pub mod routing;
pub mod services;
pub mod session;
pub mod story;
pub mod tracking;

// Re-export commonly used types
pub use config::AppConfig;
pub use credentials::{CredentialRotator, Provider};
pub use geo::Coordinate;
pub use routing::{Route, RoutingChain};
pub use services::Services;
pub use session::{WalkPlan, WalkSession, WalkingSummary};
pub use story::{Genre, Story, StoryGenerator, StoryStateMachine};
pub use tracking::{Checkpoint, ProximityMonitor};
