use clap::Subcommand;

use crate::cli::context::CliContext;
use crate::cli::utils::output_value;
use crate::cli::OutputFormat;
use crate::models::finance::transactions_path;
use crate::models::{FinanceSummary, Transaction};
use crate::storage::validate_segment;

#[derive(Subcommand)]
pub enum FinancesCommands {
    #[command(about = "Income, expense and balance for a member")]
    Summary {
        #[arg(help = "Member username")]
        member: String,
        #[arg(long, help = "Restrict to one month (YYYY-MM)")]
        month: Option<String>,
    },
}

pub async fn handle(cmd: FinancesCommands, token: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load(token)?;

    match cmd {
        FinancesCommands::Summary { member, month } => {
            validate_segment(&member)?;
            let transactions: Vec<Transaction> =
                ctx.state.repo.load_strict(&ctx.token, &transactions_path(&member)).await?;
            let summary = FinanceSummary::from_transactions(&transactions, month.as_deref());
            output_value(&output_format, &summary)
        }
    }
}
