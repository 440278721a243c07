//! Collection sharing handlers.

use serde::Serialize;

use rendezvous_core::Context;

use crate::cli::{GlobalOpts, ShareArgs, ShareCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareView {
    public: bool,
    share_link: Option<String>,
}

fn detail(v: &ShareView) -> String {
    let state = if v.public { "public" } else { "private" };
    format!(
        "Collection: {state}\nShare link: {}",
        v.share_link.as_deref().unwrap_or("-")
    )
}

pub async fn handle(ctx: &Context, args: ShareArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_login(ctx)?;

    if let ShareCommand::Toggle = args.command {
        if !ctx.session().change_public_visibility().await {
            return Err(CliError::request("Visibility change", None));
        }
    }

    // Re-read after a toggle so the share link reflects the new state.
    if ctx.session().get_public_visibility().await.is_none() {
        return Err(CliError::request("Visibility fetch", None));
    }

    let session = ctx.session().snapshot();
    let view = ShareView {
        public: session.is_public,
        share_link: session.share_link,
    };
    let out = output::render_single(global.format(), &view, detail, |v| {
        v.share_link.clone().unwrap_or_default()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
