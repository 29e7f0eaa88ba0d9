//! Manager-scoped components
//!
//! Components sit beside the actor population and hear the whole message
//! stream: the routing hook sees every send-queue message (outbound
//! traffic, where transport bridges live), the processing hook every
//! process-queue message (simulation-facing traffic). Within a drain,
//! components are invoked in the order they were added.

use types::Message;

use crate::context::GameContext;

/// A manager-scoped message consumer/producer
///
/// All hooks default to no-ops so a component implements only what it
/// needs. Hooks interact with the runtime exclusively through the
/// [`GameContext`] they receive.
pub trait Component: Send {
    /// Stable name used for removal and logging
    fn name(&self) -> &str;

    /// Called once, when the component is added to the manager
    fn on_added_to_manager(&mut self, _ctx: &mut GameContext) {}

    /// Send-queue delivery
    fn on_message_for_routing(&mut self, _message: &Message, _ctx: &mut GameContext) {}

    /// Process-queue delivery
    fn on_message_for_processing(&mut self, _message: &Message, _ctx: &mut GameContext) {}
}
