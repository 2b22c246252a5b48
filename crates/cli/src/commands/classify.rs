/// Module for the `classify` subcommand, which decides the category of a single address from
/// externally supplied facts.
use async_trait::async_trait;
use clap::Args;
use govscan_core::decoder::{parse_address, parse_nonce};
use govscan_core::{AccountFacts, TrustSet, classify_account};
use std::error::Error;

/// Arguments for the `classify` subcommand.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Address to classify
    input: String,
    /// Deployed code as hex (0x... , "0x" for none) or @file
    #[arg(long)]
    code: Option<String>,
    /// The code could not be retrieved
    #[arg(long, conflicts_with = "code")]
    no_code: bool,
    /// Transaction count, decimal or 0x hex
    #[arg(long, default_value = "0")]
    nonce: String,
    /// Comma-separated trusted addresses
    #[arg(long, value_delimiter = ',')]
    trusted: Vec<String>,
}

#[async_trait]
impl super::Command for ClassifyArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let address = parse_address(&self.input)?;
        let trusted = self
            .trusted
            .iter()
            .map(String::as_str)
            .map(parse_address)
            .collect::<Result<TrustSet, _>>()?;

        let facts = match self.code.as_deref() {
            _ if self.no_code => AccountFacts::from_hex(None, &self.nonce)?,
            Some(code) if code.starts_with('@') => {
                AccountFacts::new(Some(super::read_code_arg(code)?), parse_nonce(&self.nonce)?)
            }
            code => AccountFacts::from_hex(Some(code.unwrap_or("0x")), &self.nonce)?,
        };

        let category = classify_account(&trusted, &address, &facts);
        println!(
            "{}: {} [{}] {}",
            address.to_checksum(None),
            category,
            category.severity(),
            category.description()
        );
        Ok(())
    }
}
