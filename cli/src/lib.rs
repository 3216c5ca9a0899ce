mod args;

pub use args::{Args, Commands, DEFAULT_SERVER, ExportHistoryArgs, PayArgs, VerifyArgs};
use clap::Parser;
use common::gateway::{HttpGateway, PaymentGateway};
use common::validation::is_valid_vpa;
use common::wizard::{NoticeKind, PaymentDraft, PaymentWizard};
use common::{Fixtures, TransactionRecord, format_amount, write_history_csv_file};

/// Runs the CLI command parser and executes the selected command.
/// Returns true if a CLI command was handled, false otherwise.
pub async fn run_cli() -> bool {
    let args = Args::parse();
    match &args.command {
        Some(Commands::Pay(pay_args)) => {
            match pay(pay_args).await {
                Ok(transaction) => println!(
                    "Payment {} settled. Reference: {}",
                    transaction.transaction_id, transaction.reference_number
                ),
                Err(e) => eprintln!("Payment not sent: {e}"),
            }
            true
        }
        Some(Commands::Verify(verify_args)) => {
            if let Err(e) = verify(&verify_args.address, &verify_args.server).await {
                eprintln!("Failed to verify {}: {e}", verify_args.address);
            }
            true
        }
        Some(Commands::ExportHistory(export_args)) => {
            match export_history(&export_args.out, export_args.fixtures.as_deref()).await {
                Ok(count) => println!(
                    "Successfully exported {} transactions to: {}",
                    count, export_args.out
                ),
                Err(e) => eprintln!("Failed to export history: {e:#}"),
            }
            true
        }
        None => {
            println!("No CLI command provided. Use --help to see available commands.");
            false
        }
    }
}

/// Drives the payment wizard against a running portal from details to success.
async fn pay(args: &PayArgs) -> anyhow::Result<TransactionRecord> {
    let gateway = HttpGateway::new(&args.server)?;
    let mut wizard = PaymentWizard::with_draft(
        gateway,
        PaymentDraft {
            recipient: args.to.clone(),
            amount: Some(args.amount),
            category: args.category,
            description: args.description.clone(),
        },
    );

    let errors = wizard.field_errors();
    if !errors.is_empty() {
        anyhow::bail!("{errors}");
    }

    println!("Verifying {}...", args.to);
    let verification = wizard.verify_recipient().await.cloned();
    print_notices(&mut wizard);
    match verification {
        Some(result) if result.is_valid => println!(
            "Recipient verified: {}",
            result.display_name.as_deref().unwrap_or("unknown name")
        ),
        Some(_) => anyhow::bail!("{} is not a valid UPI ID", args.to),
        None => anyhow::bail!("Could not verify {}. Please try again.", args.to),
    }

    wizard.advance()?;
    if let Some(summary) = wizard.summary() {
        println!("To:          {}", summary.recipient);
        println!("Amount:      {}", summary.amount);
        println!("Category:    {}", summary.category);
        println!("Description: {}", summary.description);
    }
    wizard.advance()?;
    wizard.set_authorization_code(args.pin.as_str())?;

    println!("Processing payment...");
    let outcome = wizard.submit().await.cloned();
    print_notices(&mut wizard);
    let transaction = outcome?;
    wizard.finish()?;
    Ok(transaction)
}

fn print_notices<G: PaymentGateway>(wizard: &mut PaymentWizard<G>) {
    for notice in wizard.take_notices() {
        match notice.kind {
            NoticeKind::Success => println!("{}: {}", notice.title, notice.description),
            NoticeKind::Destructive => eprintln!("{}: {}", notice.title, notice.description),
        }
    }
}

async fn verify(address: &str, server: &str) -> anyhow::Result<()> {
    if !is_valid_vpa(address) {
        anyhow::bail!("Enter a valid UPI ID (e.g. user@paytm)");
    }
    let gateway = HttpGateway::new(server)?;
    let result = gateway.verify_address(address).await?;
    if result.is_valid {
        println!(
            "{} is valid. Account holder: {}",
            address,
            result.display_name.as_deref().unwrap_or("unknown")
        );
    } else {
        println!("{} is not a valid UPI ID", address);
    }
    Ok(())
}

async fn export_history(out: &str, fixtures_path: Option<&str>) -> anyhow::Result<usize> {
    let fixtures = match fixtures_path {
        Some(path) => Fixtures::from_yaml_file(path).await?,
        None => Fixtures::embedded()?,
    };
    write_history_csv_file(out, &fixtures.upi_transactions).await?;
    let total: f64 = fixtures.upi_transactions.iter().map(|t| t.amount).sum();
    println!("History total: {}", format_amount(total));
    Ok(fixtures.upi_transactions.len())
}
