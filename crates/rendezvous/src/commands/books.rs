//! Book collection handlers.

use std::sync::Arc;

use tabled::Tabled;

use rendezvous_core::{Book, Context, books};

use crate::cli::{BookAddArgs, BookUpdateArgs, BooksArgs, BooksCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct BookRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Authors")]
    authors: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Rating")]
    rating: String,
    #[tabled(rename = "Progress")]
    progress: String,
}

impl From<&Book> for BookRow {
    fn from(b: &Book) -> Self {
        Self {
            id: b.id.clone(),
            title: b.title.clone(),
            authors: b.authors.join(", "),
            status: b.status.to_string(),
            rating: b.rating.map(|r| format!("{r}/5")).unwrap_or_default(),
            progress: b.progress.map(|p| format!("{p:.0}%")).unwrap_or_default(),
        }
    }
}

fn detail(b: &Book) -> String {
    let mut lines = vec![
        format!("ID:          {}", b.id),
        format!("Title:       {}", b.title),
        format!("Authors:     {}", b.authors.join(", ")),
        format!("Status:      {}", b.status),
    ];
    if let Some(ref genres) = b.genres {
        let genres: Vec<&str> = genres.iter().map(String::as_str).collect();
        lines.push(format!("Genres:      {}", genres.join(", ")));
    }
    if let Some(rating) = b.rating {
        lines.push(format!("Rating:      {rating}/5"));
    }
    if let Some(progress) = b.progress {
        lines.push(format!("Progress:    {progress:.0}%"));
    }
    if let Some(start) = b.start_date {
        lines.push(format!("Started:     {start}"));
    }
    if let Some(end) = b.end_date {
        lines.push(format!("Finished:    {end}"));
    }
    if b.favorite == Some(true) {
        lines.push("Favorite:    yes".into());
    }
    if b.abandoned == Some(true) {
        lines.push("Abandoned:   yes".into());
    }
    if let Some(pages) = b.page_count {
        lines.push(format!("Pages:       {pages}"));
    }
    if let Some(ref comment) = b.comment {
        lines.push(format!("Comment:     {comment}"));
    }
    lines.join("\n")
}

fn not_found(id: String) -> CliError {
    CliError::NotFound {
        resource_type: "book".into(),
        identifier: id,
        list_command: "books list".into(),
    }
}

/// Load the collection, failing with the store's error message.
async fn fetch(ctx: &Context) -> Result<(), CliError> {
    if ctx.books().fetch_all().await {
        Ok(())
    } else {
        Err(CliError::request("Collection fetch", ctx.books().last_error()))
    }
}

/// Copy the flags that were given onto `book`.
fn apply_update(book: &mut Book, args: BookUpdateArgs) {
    if let Some(status) = args.status {
        book.status = status;
    }
    if let Some(rating) = args.rating {
        book.rating = Some(rating);
    }
    if let Some(progress) = args.progress {
        book.progress = Some(progress);
    }
    if let Some(comment) = args.comment {
        book.comment = Some(comment);
    }
    if let Some(favorite) = args.favorite {
        book.favorite = Some(favorite);
    }
    if let Some(abandoned) = args.abandoned {
        book.abandoned = Some(abandoned);
    }
    if let Some(start) = args.start_date {
        book.start_date = Some(start);
    }
    if let Some(end) = args.end_date {
        book.end_date = Some(end);
    }
}

fn draft_from(args: BookAddArgs) -> Book {
    let mut book = books::draft(
        args.google_id.unwrap_or_default(),
        args.title,
        args.author,
        args.status,
    );
    if !args.genre.is_empty() {
        book.genres = Some(args.genre.into_iter().collect());
    }
    book.page_count = args.pages;
    book
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: BooksArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Shared collections are readable without an account.
    if !matches!(args.command, BooksCommand::Public { .. }) {
        util::require_login(ctx)?;
    }

    match args.command {
        BooksCommand::List { status } => {
            fetch(ctx).await?;
            let snap: Vec<Arc<Book>> = ctx
                .books()
                .books()
                .iter()
                .filter(|b| status.is_none_or(|s| b.status == s))
                .cloned()
                .collect();
            let out = output::render_list(
                global.format(),
                &snap,
                |b| BookRow::from(b.as_ref()),
                |b| b.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BooksCommand::Show { id } => {
            fetch(ctx).await?;
            let book = ctx.books().get(&id).ok_or_else(|| not_found(id))?;
            let out = output::render_single(global.format(), book.as_ref(), detail, |b| {
                b.id.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BooksCommand::Add(args) => {
            let book = draft_from(args);
            let id = book.id.clone();
            ctx.books().add(book).settled().await?;
            output::print_status(&format!("Book added ({id})"), global.quiet);
            Ok(())
        }

        BooksCommand::Update(args) => {
            fetch(ctx).await?;
            let id = args.id.clone();
            let current = ctx.books().get(&id).ok_or_else(|| not_found(id.clone()))?;
            let mut book = Book::clone(&current);
            apply_update(&mut book, args);
            ctx.books().update(book).settled().await?;
            output::print_status(&format!("Book {id} updated"), global.quiet);
            Ok(())
        }

        BooksCommand::Remove { id } => {
            if !util::confirm(&format!("Remove book '{id}'?"), global.yes)? {
                return Ok(());
            }
            ctx.books().remove(&id).settled().await?;
            output::print_status(&format!("Book {id} removed"), global.quiet);
            Ok(())
        }

        BooksCommand::Public { public_id } => {
            let payload = ctx.books().fetch_public(&public_id).await;
            let payload = payload.ok_or_else(|| CliError::NotFound {
                resource_type: "shared collection".into(),
                identifier: public_id,
                list_command: "share status".into(),
            })?;
            let out = output::render_list(
                global.format(),
                &payload.books,
                |b| BookRow::from(b),
                |b| b.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
