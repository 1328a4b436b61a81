//! Status and refresh commands.

use console::style;

use roadworks::session::Session;

use super::output::print_halt;
use super::Context;

/// Show the status report, ingesting first when there is no snapshot.
pub async fn cmd_status(ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.open_session().await;
    print_session(ctx, &session);
    Ok(())
}

/// Clear the snapshot and ingest again.
pub async fn cmd_refresh(ctx: &Context) -> anyhow::Result<()> {
    println!(
        "{} Clearing snapshot in {}",
        style("→").cyan(),
        ctx.store.dir().display()
    );
    let session = ctx.refresh().await?;
    print_session(ctx, &session);
    Ok(())
}

fn print_session(ctx: &Context, session: &Session) {
    if session.banner.is_some() {
        println!(
            "{} Falha ao carregar o ponteiro (bases.json).",
            style("✗").red()
        );
    }

    println!("\n{}", style("Status da Base").bold());
    println!("{}", "-".repeat(40));
    if session.ingested {
        println!("{}", style(format!("Fonte: {}", ctx.settings.manifest_url)).dim());
    } else {
        println!("{}", style("Fonte: snapshot local").dim());
    }
    println!("{}", session.status_summary());

    if let Some(reason) = session.halt_reason() {
        println!();
        print_halt(session, &reason);
    }
}
