use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client_core::LeadsClient;
use shared::{
    domain::{LeadStatus, NewLead, VisaCategory},
    form::lead_form_schema,
};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Submit {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        linkedin: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        country: Option<String>,
        /// Repeatable: O1, EB2A, EB2-NIW or "I don't know".
        #[arg(long = "visa")]
        visas: Vec<String>,
    },
    List,
    MarkReachedOut {
        email: String,
    },
    /// Prints the submission form definition as JSON.
    FormSchema,
}

fn parse_visas(raw: &[String]) -> Result<Vec<VisaCategory>> {
    raw.iter()
        .map(|value| VisaCategory::parse(value).ok_or_else(|| anyhow!("unknown visa '{value}'")))
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        server_url,
        command,
    } = Cli::parse();
    let client = || LeadsClient::new(&server_url);

    match command {
        Command::Submit {
            first_name,
            last_name,
            email,
            linkedin,
            message,
            country,
            visas,
        } => {
            let candidate = NewLead {
                first_name: Some(first_name),
                last_name: Some(last_name),
                email: Some(email),
                linkedin: Some(linkedin),
                country,
                visas: Some(parse_visas(&visas)?),
                resume: None,
                message: Some(message),
            };
            let created = client()?.create_lead(&candidate).await?;
            println!("{}: {} ({})", created.message, created.lead.email, created.lead.status);
        }
        Command::List => {
            for lead in client()?.list_leads().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    lead.submitted_at.to_rfc3339(),
                    lead.status,
                    lead.email,
                    lead.full_name()
                );
            }
        }
        Command::MarkReachedOut { email } => {
            let updated = client()?.update_status(&email, LeadStatus::ReachedOut).await?;
            println!("{}: {} ({})", updated.message, updated.lead.email, updated.lead.status);
        }
        Command::FormSchema => {
            println!("{}", serde_json::to_string_pretty(&lead_form_schema())?);
        }
    }

    Ok(())
}
