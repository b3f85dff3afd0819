//! Copy command: fill a "current" section, mirror it into "permanent".
//!
//! Reports how many remote fetches each phase issued, so a copy served
//! entirely from the shared cache shows zero.

use std::fmt::Write as _;

use georef_core::{Level, SectionState};
use serde::Serialize;

use super::walk::path;
use super::{Context, drive};
use crate::cli::PathArgs;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct CopyReport {
    current: Vec<Option<String>>,
    permanent: Vec<Option<String>>,
    fetches_filling_current: u64,
    fetches_during_copy: u64,
    cache_hits_during_copy: u64,
}

pub async fn handle(ctx: &Context<'_>, args: &PathArgs) -> Result<(), CliError> {
    let current = ctx.resolver.section("current");
    drive(&current, path(args), ctx).await?;
    let before = ctx.resolver.stats();

    let permanent = ctx.resolver.section("permanent");
    permanent.copy_from(&current);
    let state = permanent
        .subscribe()
        .wait_until(SectionState::is_quiescent)
        .await
        .ok_or_else(|| CliError::Setup {
            message: "section 'permanent' closed".into(),
        })?;
    let after = ctx.resolver.stats();

    let report = CopyReport {
        current: selections(|level| current.selection(level)),
        permanent: selections(|level| state.selection(level).map(str::to_owned)),
        fetches_filling_current: before.fetches,
        fetches_during_copy: after.fetches - before.fetches,
        cache_hits_during_copy: after.cache_hits - before.cache_hits,
    };

    let out = output::render_single(
        ctx.global.output,
        &report,
        detail,
        |r| r.fetches_during_copy.to_string(),
    )?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

fn selections(select: impl Fn(Level) -> Option<String>) -> Vec<Option<String>> {
    Level::ALL.into_iter().map(select).collect()
}

fn detail(report: &CopyReport) -> String {
    let join = |levels: &[Option<String>]| {
        levels
            .iter()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(" / ")
    };

    let mut out = String::new();
    let _ = writeln!(out, "current:   {}", join(&report.current));
    let _ = writeln!(out, "permanent: {}", join(&report.permanent));
    let _ = writeln!(
        out,
        "remote fetches: {} while filling current, {} during copy ({} cache hits)",
        report.fetches_filling_current, report.fetches_during_copy, report.cache_hits_during_copy
    );
    out.trim_end().to_owned()
}
