use anyhow::Context as _;
use clap::Parser as _;
use dotenvy::dotenv;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::info;

mod modules;
mod services;

#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the persisted JSON documents.
    #[arg(long, default_value = "data")]
    data_dir: std::path::PathBuf,
}

// Custom user data passed to all command functions
pub struct Data {
    pub config: Arc<services::guild_config::GuildConfigService>,
    pub giveaways: Arc<modules::giveaways::engine::GiveawayService>,
    pub tracking: Arc<modules::tracking::counters::TrackingService>,
    pub event_handlers: Vec<(&'static str, modules::EventHandlerFn)>,
}

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::fmt::init();

    info!("Starting community utility bot...");

    let token = std::env::var("DISCORD_TOKEN").context("missing DISCORD_TOKEN")?;
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
        | serenity::GatewayIntents::GUILD_INVITES;

    let store = Arc::new(services::store::JsonStore::new(&args.data_dir)?);
    let config = Arc::new(services::guild_config::GuildConfigService::load(
        store.clone(),
    ));
    let giveaways = Arc::new(modules::giveaways::engine::GiveawayService::load(
        store.clone(),
    ));
    let tracking = Arc::new(modules::tracking::counters::TrackingService::load(store));

    let framework_options = poise::FrameworkOptions {
        commands: modules::commands(),
        event_handler: |ctx, event, framework, data| {
            Box::pin(services::event_manager::dispatch(ctx, event, framework, data))
        },
        ..Default::default()
    };

    let data = Data {
        config,
        giveaways: giveaways.clone(),
        tracking,
        event_handlers: modules::event_handlers(),
    };

    let framework = poise::Framework::builder()
        .options(framework_options)
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                ctx.set_activity(Some(serenity::ActivityData::watching(
                    "tickets and giveaways",
                )));
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .context("Failed to create client")?;

    // Start the giveaway sweep
    giveaways.start_sweep_runner(client.http.clone());

    info!("Bot is ready!");
    client.start_autosharded().await.context("Client error")?;

    Ok(())
}
