//! Statistics and achievements handlers.

use chrono::Local;
use tabled::Tabled;

use rendezvous_core::{Achievement, Context, StatsSnapshot};

use crate::cli::{AchievementsArgs, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Stats ───────────────────────────────────────────────────────────

fn stats_detail(s: &StatsSnapshot) -> String {
    [
        format!("Books:          {}", s.total_books),
        format!("Finished:       {}", s.completed_books),
        format!("Reading:        {}", s.reading_books),
        format!("To read:        {}", s.to_read_books),
        format!("Favorites:      {}", s.favorite_books),
        format!("Pages read:     {}", s.total_pages),
        format!("Average rating: {:.1}", s.average_rating),
    ]
    .join("\n")
}

pub async fn handle_stats(ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_login(ctx)?;
    if !ctx.stats().fetch().await {
        return Err(CliError::request("Stats refresh", ctx.stats().last_error()));
    }

    let snapshot = ctx.stats().snapshot();
    let mut out = output::render_single(global.format(), &snapshot, stats_detail, |s| {
        s.total_books.to_string()
    });
    if let (OutputFormat::Table, Some(at)) = (global.format(), ctx.stats().last_refresh()) {
        let color = output::should_color(global.color);
        let stamp = format!("as of {}", at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
        out = format!("{out}\n{}", output::dim(stamp, color));
    }
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Achievements ────────────────────────────────────────────────────

#[derive(Tabled)]
struct AchievementRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Unlocked")]
    unlocked: String,
}

impl From<&Achievement> for AchievementRow {
    fn from(a: &Achievement) -> Self {
        Self {
            name: a.name.clone(),
            kind: a.kind.clone().unwrap_or_default(),
            description: a.description.clone().unwrap_or_default(),
            unlocked: a
                .unlocked_at
                .map(|at| at.with_timezone(&Local).format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".into()),
        }
    }
}

pub async fn handle_achievements(
    ctx: &Context,
    args: AchievementsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_login(ctx)?;
    if !ctx.achievements().fetch().await {
        return Err(CliError::request(
            "Achievements fetch",
            ctx.achievements().state().error,
        ));
    }

    let list: Vec<Achievement> = ctx
        .achievements()
        .achievements()
        .iter()
        .filter(|a| args.all || a.is_unlocked())
        .cloned()
        .collect();
    let out = output::render_list(
        global.format(),
        &list,
        |a| AchievementRow::from(a),
        |a| a.name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
