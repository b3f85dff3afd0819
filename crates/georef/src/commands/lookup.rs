//! Direct listing commands: countries, states, cities.

use georef_core::{CacheKey, Settlement};

use super::{Context, NodeRow};
use crate::cli::{CitiesArgs, StatesArgs};
use crate::error::CliError;
use crate::output;

// ── Handlers ────────────────────────────────────────────────────────

pub async fn countries(ctx: &Context<'_>) -> Result<(), CliError> {
    list(ctx, &CacheKey::Root, "countries").await
}

pub async fn states(ctx: &Context<'_>, args: &StatesArgs) -> Result<(), CliError> {
    let key = CacheKey::country(args.country.trim());
    list(ctx, &key, &format!("states of {}", args.country)).await
}

pub async fn cities(ctx: &Context<'_>, args: &CitiesArgs) -> Result<(), CliError> {
    let key = CacheKey::state(args.country.trim(), args.state.trim());
    list(
        ctx,
        &key,
        &format!("cities of {}/{}", args.country, args.state),
    )
    .await
}

// ── Shared ──────────────────────────────────────────────────────────

async fn list(ctx: &Context<'_>, key: &CacheKey, what: &str) -> Result<(), CliError> {
    let nodes = match ctx.resolver.settle(key).await {
        Settlement::Failed(err) => {
            return Err(CliError::from_lookup(
                &err,
                what,
                &ctx.url,
                ctx.timeout.as_secs(),
            ));
        }
        settled => settled.nodes(),
    };

    let out = output::render_list(
        ctx.global.output,
        &nodes,
        |n| NodeRow::from(n),
        |n| n.key.clone(),
    )?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}
