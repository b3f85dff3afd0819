//! Command dispatch: bridges CLI args -> resolver lookups -> output formatting.

pub mod config_cmd;
pub mod copy;
pub mod lookup;
pub mod walk;

use std::time::Duration;

use georef_core::{
    AddressSection, CacheKey, Level, LevelPhase, ReferenceNode, Resolver, SectionState, Settlement,
};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Everything a resolver-backed command needs.
pub struct Context<'a> {
    pub resolver: Resolver,
    pub url: String,
    pub timeout: Duration,
    pub global: &'a GlobalOpts,
}

/// Dispatch a resolver-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context<'_>) -> Result<(), CliError> {
    match cmd {
        Command::Countries => lookup::countries(ctx).await,
        Command::States(args) => lookup::states(ctx, &args).await,
        Command::Cities(args) => lookup::cities(ctx, &args).await,
        Command::Walk(args) => walk::handle(ctx, &args).await,
        Command::Copy(args) => copy::handle(ctx, &args).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

// ── Shared table row ────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct NodeRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&ReferenceNode> for NodeRow {
    fn from(n: &ReferenceNode) -> Self {
        Self {
            key: n.key.clone(),
            name: n.display_name.clone(),
        }
    }
}

// ── Section driving ─────────────────────────────────────────────────

/// One level of a driven section, as shown to the user.
#[derive(Debug, Serialize)]
pub(crate) struct LevelView {
    pub level: Level,
    pub selection: Option<String>,
    pub options: Vec<ReferenceNode>,
}

/// Wait until `level` has no fetch outstanding and fail if it failed.
pub(crate) async fn settled(
    section: &AddressSection,
    level: Level,
    ctx: &Context<'_>,
) -> Result<SectionState, CliError> {
    let state = section
        .subscribe()
        .wait_until(|s| !s.is_loading(level))
        .await
        .ok_or_else(|| CliError::Setup {
            message: format!("section '{}' closed", section.name()),
        })?;

    if state.level(level).phase == LevelPhase::Failed {
        return Err(failure(&state, level, ctx).await);
    }
    Ok(state)
}

/// Recover the error behind a failed level.
///
/// Failures are not cached, so settling the same key again re-fetches
/// and yields the transport error the section itself never keeps.
async fn failure(state: &SectionState, level: Level, ctx: &Context<'_>) -> CliError {
    let what = format!("{level} options");
    let key = CacheKey::for_level(
        level,
        state.selection(Level::Country),
        state.selection(Level::State),
    );
    let reason = match key {
        Some(key) => match ctx.resolver.settle(&key).await {
            Settlement::Failed(err) => {
                return CliError::from_lookup(&err, &what, &ctx.url, ctx.timeout.as_secs());
            }
            _ => "lookup failed, then succeeded on retry; run the command again".into(),
        },
        None => "lookup failed (see log output above)".into(),
    };
    CliError::Unavailable {
        what,
        url: ctx.url.clone(),
        reason,
    }
}

/// Select `path` level by level, root first, validating each key.
///
/// Returns one view per visited level; the level below the last
/// selection is included with its options when it exists.
pub(crate) async fn drive(
    section: &AddressSection,
    path: [Option<&str>; 3],
    ctx: &Context<'_>,
) -> Result<Vec<LevelView>, CliError> {
    section.load_countries();
    let mut views = Vec::new();

    for (level, key) in Level::ALL.into_iter().zip(path) {
        let state = settled(section, level, ctx).await?;
        let options: Vec<ReferenceNode> = state.children(level).to_vec();

        let Some(key) = key else {
            views.push(LevelView {
                level,
                selection: None,
                options,
            });
            break;
        };

        if !options.iter().any(|n| n.key == key) {
            return Err(CliError::NotFound {
                level: level.to_string(),
                key: key.into(),
                list_command: list_command(&state, level),
            });
        }
        section.set_ancestor(level, key);
        views.push(LevelView {
            level,
            selection: Some(key.into()),
            options,
        });
    }
    Ok(views)
}

fn list_command(state: &SectionState, level: Level) -> String {
    let country = state.selection(Level::Country).unwrap_or_default();
    let region = state.selection(Level::State).unwrap_or_default();
    match level {
        Level::Country => "countries".into(),
        Level::State => format!("states {country}"),
        Level::City => format!("cities {country} {region}"),
    }
}
