//! Kavach - command-line client for the Nyaya Kavach complaint service
//!
//! Usage:
//!   kavach file --aadhar 123456789012 --name "A" --type Theft --location X \
//!       --description "wallet stolen" --evidence ./photo.jpg
//!   kavach track --case-id CASE... [--watch]
//!   kavach status CASE... "In Progress" --note "officer assigned"
//!   kavach update-status CASE... Resolved
//!
//! Environment variables:
//!   KAVACH_API_URL - API base URL (default: http://localhost:5000)
//!   KAVACH_LOG_LEVEL - Log level (default: warn)

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use nyaya_kavach::{
    client::{api::DEFAULT_API_URL, ClientError, ComplaintClient, ComplaintForm, Tracker},
    db::{ComplaintDoc, ComplaintStatus},
    logging,
    store::CaseLookup,
};

#[derive(Parser, Debug)]
#[command(name = "kavach")]
#[command(about = "File and track complaints with Nyaya Kavach")]
#[command(version)]
struct ClientArgs {
    /// API base URL
    #[arg(long, env = "KAVACH_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "KAVACH_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// File a new complaint
    File(FileArgs),
    /// Look up a complaint
    Track(TrackArgs),
    /// Record a status change with a note
    Status {
        case_id: String,
        status: ComplaintStatus,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Administrative status update
    UpdateStatus {
        case_id: String,
        status: ComplaintStatus,
    },
}

#[derive(ClapArgs, Debug)]
struct FileArgs {
    /// 12-digit Aadhaar number
    #[arg(long = "aadhar")]
    aadhar_number: String,
    #[arg(long = "name")]
    full_name: String,
    #[arg(long = "type")]
    complaint_type: String,
    #[arg(long)]
    location: String,
    #[arg(long)]
    description: String,
    /// 10-digit mobile number
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long, default_value = "")]
    witnesses: String,
    /// low, medium, high or urgent (suggested from the description when omitted)
    #[arg(long)]
    priority: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    incident_date: Option<String>,
    #[arg(long)]
    anonymous: bool,
    #[arg(long)]
    sms_updates: bool,
    #[arg(long)]
    email_updates: bool,
    /// Evidence file; only its name is sent (repeatable)
    #[arg(long = "evidence")]
    evidence: Vec<PathBuf>,
}

#[derive(ClapArgs, Debug)]
#[group(required = true, multiple = false, id = "lookup")]
struct LookupArgs {
    #[arg(long)]
    case_id: Option<String>,
    #[arg(long = "aadhar")]
    aadhar_number: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

impl LookupArgs {
    fn into_lookup(self) -> Option<CaseLookup> {
        self.case_id
            .map(CaseLookup::CaseId)
            .or(self.aadhar_number.map(CaseLookup::Aadhaar))
            .or(self.phone.map(CaseLookup::Phone))
    }
}

#[derive(ClapArgs, Debug)]
struct TrackArgs {
    #[command(flatten)]
    lookup: LookupArgs,

    /// Keep refreshing until interrupted
    #[arg(long)]
    watch: bool,

    /// Refresh interval in seconds
    #[arg(long, default_value = "5")]
    interval: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let args = ClientArgs::parse();
    logging::init("nyaya_kavach", &args.log_level, false);

    let client = ComplaintClient::new(&args.api_url)?;

    let outcome = match args.command {
        Command::File(file) => file_complaint(&client, file).await,
        Command::Track(track) => track_complaint(client, track).await,
        Command::Status {
            case_id,
            status,
            note,
        } => client
            .append_status(&case_id, status, &note)
            .await
            .map(|message| println!("{}", message)),
        Command::UpdateStatus { case_id, status } => {
            client.set_status(&case_id, status).await.map(|doc| {
                println!("Status updated successfully");
                print_complaint(&doc);
            })
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

async fn file_complaint(client: &ComplaintClient, args: FileArgs) -> Result<(), ClientError> {
    let form = ComplaintForm {
        aadhar_number: args.aadhar_number,
        full_name: args.full_name,
        phone: args.phone,
        email: args.email,
        address: args.address,
        complaint_type: args.complaint_type,
        location: args.location,
        description: args.description,
        witnesses: args.witnesses,
        priority: args.priority,
        incident_date: args.incident_date,
        anonymous: args.anonymous,
        sms_updates: args.sms_updates,
        email_updates: args.email_updates,
        evidence: args.evidence,
    };

    let submission = form.into_submission()?;
    let case_id = client.submit(&submission).await?;

    println!("Complaint filed successfully");
    println!("Case ID: {}", case_id);
    if let Some(priority) = submission.priority {
        println!("Priority: {}", priority);
    }
    Ok(())
}

async fn track_complaint(client: ComplaintClient, args: TrackArgs) -> Result<(), ClientError> {
    let lookup = args
        .lookup
        .into_lookup()
        .ok_or_else(|| {
            ClientError::Validation(vec![
                "Please provide a case id, Aadhaar number or phone".into(),
            ])
        })?;

    if !args.watch {
        let doc = client.track(&lookup).await?;
        print_complaint(&doc);
        return Ok(());
    }

    let (mut tracker, mut updates) = Tracker::new(client, Duration::from_secs(args.interval.max(1)));
    tracker.track(lookup);

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                match update.result {
                    Ok(doc) => print_complaint(&doc),
                    Err(e) => eprintln!("Error: {}", e.user_message()),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracker.stop();
                break;
            }
        }
    }

    Ok(())
}

fn print_complaint(doc: &ComplaintDoc) {
    println!("----------------------------------------");
    println!("Case ID:        {}", doc.case_id);
    println!("Status:         {}", doc.status);
    println!("Type:           {}", doc.complaint_type);
    println!("Priority:       {}", doc.priority);
    println!("Location:       {}", doc.location);
    if let Some(date) = doc.incident_date {
        println!("Incident date:  {}", date);
    }
    println!("Filed:          {}", doc.created_at.format("%Y-%m-%d %H:%M"));
    println!("Description:    {}", doc.description);
    if !doc.evidence_files.is_empty() {
        println!("Evidence:       {}", doc.evidence_files.join(", "));
    }
    println!("Timeline:");
    for entry in &doc.timeline {
        let note = if entry.note.is_empty() { "-" } else { &entry.note };
        println!(
            "  {}  {:<12} {}",
            entry.date.format("%Y-%m-%d %H:%M"),
            entry.status.as_str(),
            note
        );
    }
}
