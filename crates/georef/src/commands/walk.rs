//! Walk command: drive one address section and show every level.

use std::fmt::Write as _;

use tabled::{Table, settings::Style};

use super::{Context, LevelView, NodeRow, drive};
use crate::cli::PathArgs;
use crate::error::CliError;
use crate::output;

pub async fn handle(ctx: &Context<'_>, args: &PathArgs) -> Result<(), CliError> {
    let section = ctx.resolver.section("walk");
    let views = drive(&section, path(args), ctx).await?;

    let out = output::render_single(ctx.global.output, &views, |v| detail(v), |v| plain(v))?;
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

pub(crate) fn path(args: &PathArgs) -> [Option<&str>; 3] {
    [
        Some(args.country.as_str()),
        args.state.as_deref(),
        args.city.as_deref(),
    ]
}

/// Human-readable view: one titled options table per level.
pub(crate) fn detail(views: &[LevelView]) -> String {
    let mut out = String::new();
    for view in views {
        let chosen = view.selection.as_deref().unwrap_or("(none)");
        let _ = writeln!(
            out,
            "{}: {chosen}  [{} options]",
            view.level,
            view.options.len()
        );
        let rows: Vec<NodeRow> = view.options.iter().map(NodeRow::from).collect();
        let _ = writeln!(out, "{}", Table::new(rows).with(Style::rounded()));
    }
    out.trim_end().to_owned()
}

fn plain(views: &[LevelView]) -> String {
    views
        .iter()
        .map(|v| {
            format!(
                "{}\t{}\t{}",
                v.level,
                v.selection.as_deref().unwrap_or(""),
                v.options.len()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
