pub mod commands;
pub mod duration;
pub mod engine;
pub mod winners;

use crate::modules::{Module, ModuleDefinition};

pub const DEFINITION: ModuleDefinition = ModuleDefinition {
    id: "giveaways",
    name: "Giveaways",
    description: "Timed giveaways with random winner selection",
};

pub fn module() -> Module {
    Module {
        definition: DEFINITION,
        commands: commands::commands(),
        event_handlers: vec![],
    }
}
