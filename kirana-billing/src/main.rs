//! `kirana-print <invoice.json> [method]`
//!
//! Prices, renders and delivers one invoice, then prints the totals as JSON.

use anyhow::{Context, Result, bail};
use kirana_billing::{Config, PrintRequest, init_logger_with_file};
use kirana_printer::DeliveryMethod;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let config = Config::from_env()?;
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: kirana-print <invoice.json> [hiddenFrame|serialPort|bluetooth|preview]");
    };
    let method = match args.next() {
        Some(m) => m.parse::<DeliveryMethod>().map_err(anyhow::Error::msg)?,
        None => config.print_method,
    };

    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("cannot read {path}"))?;
    let request: PrintRequest =
        serde_json::from_str(&raw).with_context(|| format!("invalid print request in {path}"))?;

    tracing::info!(invoice = %request.invoice.invoice_number, %method, "Printing invoice");

    let dispatcher = config.dispatcher().await?;
    let job = config
        .engine()
        .print(&dispatcher, &request, &config.printer_profile()?, method)
        .await?;

    println!("{}", serde_json::to_string_pretty(&job.totals)?);
    Ok(())
}
