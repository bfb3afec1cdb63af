pub mod announcements;
pub mod giveaways;
pub mod tickets;
pub mod tracking;

use crate::{Data, Error};
use poise::serenity_prelude as serenity;

#[derive(Debug, Clone)]
pub struct ModuleDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub type EventHandlerFn = for<'a> fn(
    &'a serenity::Context,
    &'a serenity::FullEvent,
    &'a Data,
) -> poise::BoxFuture<'a, Result<(), Error>>;

pub struct Module {
    pub definition: ModuleDefinition,
    pub commands: Vec<poise::Command<Data, Error>>,
    pub event_handlers: Vec<EventHandlerFn>,
}

pub fn get_modules() -> Vec<Module> {
    vec![
        giveaways::module(),
        tickets::module(),
        tracking::module(),
        announcements::module(),
    ]
}

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    let mut all_commands = vec![];

    for mut module in get_modules() {
        let category = module.definition.id;
        for command in &mut module.commands {
            command.category = Some(category.into());
        }
        all_commands.extend(module.commands);
    }

    all_commands.push(crate::services::help::help());
    all_commands
}

/// Event handlers of every module, tagged with the owning module id for
/// error reporting.
pub fn event_handlers() -> Vec<(&'static str, EventHandlerFn)> {
    get_modules()
        .into_iter()
        .flat_map(|module| {
            let id = module.definition.id;
            module
                .event_handlers
                .into_iter()
                .map(move |handler| (id, handler))
        })
        .collect()
}
