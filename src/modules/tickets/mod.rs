pub mod commands;
pub mod transcript;
pub mod workflow;

use crate::modules::{Module, ModuleDefinition};

pub const DEFINITION: ModuleDefinition = ModuleDefinition {
    id: "tickets",
    name: "Tickets",
    description: "Private support channels with transcripts",
};

pub fn module() -> Module {
    Module {
        definition: DEFINITION,
        commands: commands::commands(),
        event_handlers: vec![],
    }
}
