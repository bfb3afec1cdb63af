pub mod commands;
pub mod events;

use crate::modules::{Module, ModuleDefinition};

pub const DEFINITION: ModuleDefinition = ModuleDefinition {
    id: "announcements",
    name: "Announcements",
    description: "Welcome and boost messages",
};

pub fn module() -> Module {
    Module {
        definition: DEFINITION,
        commands: commands::commands(),
        event_handlers: vec![events::handler],
    }
}
