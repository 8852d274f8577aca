use clap::Subcommand;

use crate::cli::context::CliContext;
use crate::cli::utils::{output_rows, output_value};
use crate::cli::OutputFormat;
use crate::handlers::protected::members::add_member;
use crate::models::family::FAMILY_PATH;
use crate::models::{FamilyDocument, MemberInput, MemberView, Role};

#[derive(Subcommand)]
pub enum MembersCommands {
    #[command(about = "List family members")]
    List,

    #[command(about = "Add a family member")]
    Add {
        #[arg(help = "Login name, also the member's data folder")]
        username: String,
        #[arg(long, help = "Initial password (min 4 characters)")]
        password: String,
        #[arg(long, default_value = "child", value_parser = ["parent", "child"])]
        role: String,
        #[arg(long, help = "Display name")]
        display_name: Option<String>,
    },
}

pub async fn handle(cmd: MembersCommands, token: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::load(token)?;

    match cmd {
        MembersCommands::List => {
            let doc: FamilyDocument = ctx.state.repo.load_strict(&ctx.token, FAMILY_PATH).await?;
            let members: Vec<MemberView> = doc.members.iter().map(MemberView::from).collect();
            output_rows(&output_format, "members", &members, "No family members yet", |m| {
                format!(
                    "{:<16} {:<7} {}",
                    m.username,
                    format!("{:?}", m.role).to_lowercase(),
                    m.display_name.as_deref().unwrap_or("")
                )
            })
        }
        MembersCommands::Add { username, password, role, display_name } => {
            let input = MemberInput {
                username,
                password: Some(password),
                display_name,
                role: if role == "parent" { Role::Parent } else { Role::Child },
                ..Default::default()
            };
            let member = add_member(&ctx.state, &ctx.token, input).await?;
            output_value(&output_format, &MemberView::from(&member))
        }
    }
}
