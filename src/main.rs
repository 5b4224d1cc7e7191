use std::process::ExitCode;

use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use endfield_companion::config::Config;
use endfield_companion::{metrics, AppContext};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    metrics::register_metrics();

    let ctx = match AppContext::from_config(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Failed to set up: {e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        "Companion backend {} (language {})",
        ctx.config.api_base_url,
        ctx.language.current()
    );

    if let Err(e) = ctx.game_data.initialize().await {
        tracing::error!("Could not load game data: {e}");
        return ExitCode::FAILURE;
    }
    print_lookups(&ctx);

    if !ctx.config.no_logs {
        tail_logs(&ctx).await;
    }

    ctx.shutdown().await;
    if ctx.config.print_metrics {
        print!("{}", metrics::gather_metrics());
    }
    ExitCode::SUCCESS
}

fn print_lookups(ctx: &AppContext) {
    let data = &ctx.game_data;
    {
        let tables = data.tables();
        tracing::info!(
            "Loaded {} items, {} weapons, {} gems, {} wiki entries",
            tables.items.len(),
            tables.weapons.len(),
            tables.gems.len(),
            tables.wiki_entry_data.len()
        );
    }

    for id in &ctx.config.items {
        println!(
            "{id}\t{}\trarity={}\tcolor={}\ticon={}",
            data.item_name(id, None),
            data.item_rarity(id).map_or("-".to_string(), |r| r.to_string()),
            data.item_tier_color(id),
            data.item_icon_url(id).unwrap_or_else(|| "-".to_string())
        );
    }

    for id in &ctx.config.weapons {
        let stats = data.weapon_stats(id);
        let stat = |gem: &Option<String>| {
            gem.as_deref()
                .map_or("-".to_string(), |g| data.gem_tag_name(g, None))
        };
        println!(
            "{id}\t{}\ttype={}\tattribute={}\tsecondary={}\tskill={}",
            data.weapon_name(id, None),
            data.weapon_type_name(id, None).unwrap_or_else(|| "-".to_string()),
            stat(&stats.attribute),
            stat(&stats.secondary),
            stat(&stats.skill)
        );
    }
}

/// Print backend log lines until Ctrl-C.
async fn tail_logs(ctx: &AppContext) {
    let mut lines = ctx.logs.subscribe();
    ctx.logs.mount();
    tracing::info!("Streaming logs from {} (Ctrl-C to stop)", ctx.logs.url());

    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Ok(line) => println!("{line}"),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("Log output lagged, skipped {n} lines");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
}
