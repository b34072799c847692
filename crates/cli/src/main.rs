use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use derived_state::{AppVersion, LoadState, ecowatt_hook};
use domain_access::{
    accountant, analysis, booklet, email, invoice_viewers, rehousing, reviews, settings, stripe,
};
use models::{BilanInput, NewAccountantRequest, NewRehousingNote, SettingKey};
use remote_client::{HttpEmailSender, RemoteClient, SupabaseClient};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hello-keys", about = "Query the Hello Keys backend from the terminal.")]
struct Args {
    /// Path to a JSON settings file; defaults to settings.json, then the environment
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Account used for user-scoped calls
    #[arg(long, env = "HELLO_KEYS_EMAIL")]
    email: Option<String>,

    #[arg(long, env = "HELLO_KEYS_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reviews of the given holdings
    Reviews { holding_ids: Vec<String> },
    /// AI synthesis of the reviews of the given holdings
    Synthesis { holding_ids: Vec<String> },
    /// Payment intents; a `pi_` search looks up that intent
    Stripe {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = stripe::DEFAULT_PAYMENT_LIMIT)]
        limit: usize,
    },
    /// One payment intent by id
    Payment { id: String },
    /// Written analysis of a yearly bilan read from a JSON file
    Bilan { input: PathBuf },
    /// Competitive set analysis of the signed-in owner
    CompSet,
    /// Price position analysis of the signed-in owner
    PricePosition,
    /// Digital booklet of the signed-in owner
    Booklet {
        #[command(subcommand)]
        action: BookletAction,
    },
    /// Rehousing, compensation and refund notes
    Rehousing {
        #[command(subcommand)]
        action: RehousingAction,
    },
    /// Accountant requests
    Accountant {
        #[command(subcommand)]
        action: AccountantAction,
    },
    /// Delegated invoice viewers
    Viewers {
        #[command(subcommand)]
        action: ViewerAction,
    },
    /// Electricity grid forecast
    Ecowatt,
    /// Raw value of an application setting
    Setting { key: String },
    /// App version shown in the footer
    Version,
    /// Send an email without being signed in
    Email {
        to: String,
        subject: String,
        /// File holding the HTML body
        html: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum BookletAction {
    Show,
    /// Replace the booklet content with a JSON file
    Save { content: PathBuf },
}

#[derive(Subcommand, Debug)]
enum RehousingAction {
    List,
    /// Create a note from a JSON file
    Create { note: PathBuf },
}

#[derive(Subcommand, Debug)]
enum AccountantAction {
    Latest,
    Request {
        #[arg(long)]
        message: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ViewerAction {
    List,
    Add { email: String },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let txt = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&txt).with_context(|| format!("parsing {}", path.display()))
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn signed_in_user(client: &dyn RemoteClient) -> Result<String> {
    let identity = client
        .current_identity()
        .await?
        .context("sign in with --email/--password (or HELLO_KEYS_EMAIL/HELLO_KEYS_PASSWORD)")?;
    Ok(identity.id)
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();
    let args = Args::parse();

    let config = settings_loader::resolve_config(args.settings.as_ref())?;
    let supabase = SupabaseClient::new(&config).context("building backend client")?;
    if let (Some(email), Some(password)) = (&args.email, &args.password) {
        let identity = supabase
            .sign_in_with_password(email, password)
            .await
            .context("signing in")?;
        info!("Signed in as {}", identity.id);
    }
    let client: Arc<dyn RemoteClient> = Arc::new(supabase);

    match args.command {
        Command::Reviews { holding_ids } => {
            print(&reviews::fetch_reviews(client.as_ref(), Some(holding_ids.as_slice())).await?)?
        }
        Command::Synthesis { holding_ids } => print(
            &reviews::fetch_review_synthesis(client.as_ref(), Some(holding_ids.as_slice())).await?,
        )?,
        Command::Stripe { search, limit } => {
            print(&stripe::fetch_payments(client.as_ref(), search.as_deref(), limit).await?)?
        }
        Command::Payment { id } => print(&stripe::fetch_payment(client.as_ref(), &id).await?)?,
        Command::Bilan { input } => {
            let bilan: BilanInput = read_json(&input)?;
            println!("{}", analysis::generate_bilan_analysis(client.as_ref(), &bilan).await?);
        }
        Command::CompSet => print(&analysis::analyze_comp_set(client.as_ref()).await?)?,
        Command::PricePosition => print(&analysis::analyze_price_position(client.as_ref()).await?)?,
        Command::Booklet { action } => match action {
            BookletAction::Show => {
                let user_id = signed_in_user(client.as_ref()).await?;
                print(&booklet::fetch_booklet(client.as_ref(), &user_id).await?)?
            }
            BookletAction::Save { content } => {
                let content: Value = read_json(&content)?;
                print(&booklet::save_booklet(client.as_ref(), content).await?)?
            }
        },
        Command::Rehousing { action } => match action {
            RehousingAction::List => {
                let user_id = signed_in_user(client.as_ref()).await?;
                print(&rehousing::list_notes(client.as_ref(), &user_id).await?)?
            }
            RehousingAction::Create { note } => {
                let note: NewRehousingNote = read_json(&note)?;
                print(&rehousing::create_note(client.as_ref(), &note).await?)?
            }
        },
        Command::Accountant { action } => match action {
            AccountantAction::Latest => {
                let user_id = signed_in_user(client.as_ref()).await?;
                print(&accountant::latest_request(client.as_ref(), &user_id).await?)?
            }
            AccountantAction::Request { message } => print(
                &accountant::create_request(client.as_ref(), &NewAccountantRequest { message }).await?,
            )?,
        },
        Command::Viewers { action } => match action {
            ViewerAction::List => {
                let user_id = signed_in_user(client.as_ref()).await?;
                print(&invoice_viewers::list_viewers(client.as_ref(), &user_id).await?)?
            }
            ViewerAction::Add { email } => {
                print(&invoice_viewers::add_viewer(client.as_ref(), &email).await?)?
            }
        },
        Command::Ecowatt => {
            let hook = ecowatt_hook(client.clone());
            hook.mount().await;
            match hook.state().await {
                LoadState::Success(forecast) => print(&forecast)?,
                LoadState::Error(message) => anyhow::bail!(message),
                LoadState::Idle | LoadState::Loading => anyhow::bail!("forecast not loaded"),
            }
        }
        Command::Setting { key } => {
            let key = SettingKey::parse(&key).with_context(|| format!("unknown setting '{key}'"))?;
            print(&settings::fetch_setting(client.as_ref(), key).await?)?
        }
        Command::Version => println!("{}", AppVersion::new(client.clone()).get().await),
        Command::Email { to, subject, html } => {
            let html = fs::read_to_string(&html).with_context(|| format!("reading {}", html.display()))?;
            let sender = HttpEmailSender::from_config(&config)?;
            email::send_unauthenticated_email(&sender, &to, &subject, &html).await?;
            println!("Email sent to {to}");
        }
    }

    Ok(())
}
