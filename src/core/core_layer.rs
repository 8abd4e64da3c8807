// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "content/content_models.rs"]
pub mod content;

#[path = "restriction/restriction_policy.rs"]
pub mod restriction;

#[path = "queue/mod.rs"]
pub mod queue;

#[path = "approval/mod.rs"]
pub mod approval;

#[path = "relay/relay_service.rs"]
pub mod relay;
