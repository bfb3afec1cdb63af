pub mod commands;
pub mod counters;
pub mod events;
pub mod invites;

use crate::modules::{Module, ModuleDefinition};

pub const DEFINITION: ModuleDefinition = ModuleDefinition {
    id: "tracking",
    name: "Tracking",
    description: "Invite and message counters with leaderboards",
};

pub fn module() -> Module {
    Module {
        definition: DEFINITION,
        commands: commands::commands(),
        event_handlers: vec![events::handler],
    }
}
