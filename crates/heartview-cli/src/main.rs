//! Heartview command-line client.
//!
//! Wraps the heartview-client library: sign in once, then predict,
//! browse and search history, and manage the account profile from the
//! terminal. Endpoints come from `HEARTVIEW_*` environment variables.

mod commands;
mod table;

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use heartview_client::HeartviewClient;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "heartview")]
#[command(about = "Command-line client for the Heartview prediction service")]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and save the session
    Login {
        /// Account email address
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// Create an account and send the verification email
    Register {
        /// Display name for the profile
        #[arg(long)]
        username: String,
        /// Account email address
        #[arg(long)]
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        /// Gender, M or F
        #[arg(long)]
        gender: String,
        /// Date of birth, YYYY-MM-DD
        #[arg(long)]
        dob: String,
    },
    /// Password reset flow
    #[command(subcommand)]
    Reset(ResetCommand),
    /// Submit clinical values for a prediction
    Predict(PredictArgs),
    /// Show, search, and delete prediction history
    History(HistoryArgs),
    /// Show or edit the account profile
    #[command(subcommand)]
    Account(AccountCommand),
}

#[derive(Subcommand, Debug)]
enum ResetCommand {
    /// Email a password reset link to a known account
    Request {
        /// Account email address
        email: String,
    },
    /// Redeem an emailed reset code and set a new password
    Confirm {
        /// The oobCode from the reset link
        code: String,
        /// New password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },
}

/// The 13 clinical inputs, named after the history table headers.
#[derive(ClapArgs, Debug)]
struct PredictArgs {
    /// Age in years
    #[arg(long)]
    age: String,
    /// Gender, M or F
    #[arg(long)]
    gender: String,
    /// Chest pain type (0-3)
    #[arg(long)]
    cp: String,
    /// Resting blood pressure in mm Hg
    #[arg(long)]
    trestbps: String,
    /// Serum cholesterol in mg/dl
    #[arg(long)]
    chol: String,
    /// Fasting blood sugar > 120 mg/dl (1 or 0)
    #[arg(long)]
    fbs: String,
    /// Resting ECG result code (0-2)
    #[arg(long)]
    restecg: String,
    /// Maximum heart rate achieved
    #[arg(long)]
    thalch: String,
    /// Exercise-induced angina (1 or 0)
    #[arg(long)]
    exang: String,
    /// ST depression induced by exercise
    #[arg(long)]
    oldpeak: String,
    /// Slope of the peak exercise ST segment (0-2)
    #[arg(long)]
    slope: String,
    /// Number of major vessels colored by fluoroscopy (0-3)
    #[arg(long)]
    ca: String,
    /// Thalassemia code (1-3)
    #[arg(long)]
    thal: String,
}

#[derive(ClapArgs, Debug)]
struct HistoryArgs {
    /// Search term; supports >N, <N, and min-max on numeric columns
    #[arg(short, long)]
    search: Option<String>,
    /// Restrict the search to one column header, e.g. Chol
    #[arg(short, long)]
    column: Option<String>,
    /// Match the whole value instead of a substring
    #[arg(long)]
    exact: bool,
    /// Delete every matching record after listing it
    #[arg(long)]
    delete: bool,
    /// Print records as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum AccountCommand {
    /// Show the signed-in user's profile
    Show,
    /// Change the profile's username
    SetUsername {
        /// The new username
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let client = HeartviewClient::from_env()?;

    match args.command {
        Command::Login { email, password } => commands::login(&client, &email, password).await,
        Command::Logout => commands::logout(&client).await,
        Command::Register {
            username,
            email,
            password,
            gender,
            dob,
        } => commands::register(&client, username, email, password, gender, dob).await,
        Command::Reset(ResetCommand::Request { email }) => {
            commands::reset_request(&client, &email).await
        }
        Command::Reset(ResetCommand::Confirm { code, password }) => {
            commands::reset_confirm(&client, &code, password).await
        }
        Command::Predict(predict) => commands::predict(&client, &predict).await,
        Command::History(history) => commands::history(&client, &history).await,
        Command::Account(AccountCommand::Show) => commands::account_show(&client).await,
        Command::Account(AccountCommand::SetUsername { username }) => {
            commands::account_set_username(&client, &username).await
        }
    }
}
