use clap::{Args as ClapArgs, Parser, Subcommand};
use common::Category;

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Parser, Debug)]
#[command(author, version, about = "Tutor Portal CLI - send UPI payments and export history")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a UPI payment through a running portal
    ///
    /// Walks the same steps as the payment dialog: details, verification,
    /// confirmation, then the UPI PIN.
    Pay(PayArgs),

    /// Check that a UPI ID is well formed and known to the portal
    Verify(VerifyArgs),

    /// Write the UPI transaction history to a CSV file
    ExportHistory(ExportHistoryArgs),
}

#[derive(ClapArgs, Debug)]
pub struct PayArgs {
    #[arg(short, long, help = "Recipient UPI ID, e.g. user@paytm")]
    pub to: String,

    #[arg(short, long, help = "Amount in rupees (1 to 1,00,000)")]
    pub amount: f64,

    #[arg(
        short,
        long,
        default_value = "other",
        help = "salary, course_fee, refund or other"
    )]
    pub category: Category,

    #[arg(short, long, help = "What the payment is for")]
    pub description: String,

    #[arg(short, long, help = "4-6 digit UPI PIN")]
    pub pin: String,

    #[arg(short, long, default_value = DEFAULT_SERVER, help = "Portal base URL")]
    pub server: String,
}

#[derive(ClapArgs, Debug)]
pub struct VerifyArgs {
    #[arg(short, long, help = "UPI ID to verify")]
    pub address: String,

    #[arg(short, long, default_value = DEFAULT_SERVER, help = "Portal base URL")]
    pub server: String,
}

#[derive(ClapArgs, Debug)]
pub struct ExportHistoryArgs {
    #[arg(short, long, help = "Output CSV file path")]
    pub out: String,

    #[arg(short, long, help = "Fixture YAML to read instead of the bundled data")]
    pub fixtures: Option<String>,
}
