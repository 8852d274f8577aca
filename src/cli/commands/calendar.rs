use clap::Subcommand;

use crate::cli::context::CliContext;
use crate::cli::utils::output_rows;
use crate::cli::OutputFormat;
use crate::models::calendar::events_path;
use crate::models::CalendarEvent;
use crate::storage::validate_segment;

#[derive(Subcommand)]
pub enum CalendarCommands {
    #[command(about = "List a member's events")]
    List {
        #[arg(help = "Member username")]
        member: String,
        #[arg(long, help = "Only events ending on or after YYYY-MM-DD")]
        from: Option<String>,
        #[arg(long, help = "Only events starting on or before YYYY-MM-DD")]
        to: Option<String>,
    },
}

pub async fn handle(cmd: CalendarCommands, token: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load(token)?;

    match cmd {
        CalendarCommands::List { member, from, to } => {
            validate_segment(&member)?;
            let events: Vec<CalendarEvent> = ctx.state.repo.load_strict(&ctx.token, &events_path(&member)).await?;
            let events: Vec<CalendarEvent> = events
                .into_iter()
                .filter(|e| e.overlaps(from.as_deref(), to.as_deref()))
                .collect();

            output_rows(&output_format, "events", &events, "No events", |e| {
                format!("{} .. {}  {}  [{}]", e.start_date, e.end_date, e.title, e.category)
            })
        }
    }
}
