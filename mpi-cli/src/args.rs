//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mpi::{
    BrowserInfo, Card, LookupRequest, MpiConfig, QueryOptions, TransactionType,
    UpdateTransactionRequest,
};
use rust_decimal::Decimal;

use crate::config::DEFAULT_CONFIG_PATH;

/// Talks to a 3-D Secure MPI service.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, env = "MPI_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Base URL, overriding the configuration.
    #[arg(long)]
    pub url: Option<String>,

    /// Protocol version tag (`v1` or `v2`), overriding the configuration.
    #[arg(long)]
    pub protocol: Option<String>,

    /// Answer from the built-in fixture tables instead of the network.
    #[arg(long)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Applies the command-line overrides to a loaded configuration.
    pub fn apply(&self, config: &mut MpiConfig) {
        if let Some(url) = &self.url {
            config.url = Some(url.clone());
        }
        if let Some(protocol) = &self.protocol {
            config.version = Some(protocol.clone());
        }
    }
}

/// Operation to run.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start an authentication session.
    Lookup(LookupArgs),
    /// Read the authentication status of a transaction.
    Query {
        /// Transaction identifier.
        id: String,
        /// Cardholder user agent.
        #[arg(long)]
        user_agent: Option<String>,
    },
    /// Attach settlement metadata to a transaction.
    Update(UpdateArgs),
}

/// Arguments of `lookup`.
#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Card number.
    #[arg(long)]
    pub card: String,
    /// Expiration month (1-12).
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    pub month: u8,
    /// Expiration year, two or four digits.
    #[arg(long)]
    pub year: u16,
    /// Purchase amount, e.g. `125.00`.
    #[arg(long)]
    pub amount: Decimal,
    /// ISO 4217 currency code.
    #[arg(long)]
    pub currency: String,
    /// Where the cardholder returns after the challenge.
    #[arg(long)]
    pub redirect_uri: String,
    /// Merchant reference.
    #[arg(long)]
    pub reference: Option<String>,
    /// Number of installments.
    #[arg(long, conflicts_with = "recurring")]
    pub installments: Option<u32>,
    /// Mark the lookup as a recurring payment.
    #[arg(long)]
    pub recurring: bool,
    /// Cardholder user agent.
    #[arg(long)]
    pub user_agent: Option<String>,
    /// Cardholder IP address.
    #[arg(long)]
    pub browser_ip: Option<String>,
    /// Cardholder browser language.
    #[arg(long)]
    pub browser_language: Option<String>,
}

impl LookupArgs {
    /// Builds the canonical lookup request.
    #[must_use]
    pub fn to_request(&self) -> LookupRequest {
        let card = Card::new(self.card.clone(), self.month, self.year);
        let mut request = LookupRequest::new(
            card,
            self.amount,
            self.currency.clone(),
            self.redirect_uri.clone(),
        );
        if let Some(reference) = &self.reference {
            request = request.with_reference(reference.clone());
        }
        if let Some(installments) = self.installments {
            request = request.with_installments(installments);
        }
        if self.recurring {
            request = request.with_transaction_type(TransactionType::Recurring);
        }
        if let Some(agent) = &self.user_agent {
            request = request.with_user_agent(agent.clone());
        }
        if self.browser_ip.is_some() || self.browser_language.is_some() {
            request = request.with_browser(BrowserInfo {
                ip: self.browser_ip.clone(),
                language: self.browser_language.clone(),
                ..BrowserInfo::default()
            });
        }
        request
    }
}

/// Arguments of `update`.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Transaction identifier.
    pub id: String,
    /// Processor that handled the payment.
    #[arg(long)]
    pub processor: Option<String>,
    /// Authorization code.
    #[arg(long)]
    pub authorization: Option<String>,
    /// Payment provider.
    #[arg(long)]
    pub provider: Option<String>,
    /// Base24 reference.
    #[arg(long)]
    pub base24: Option<String>,
    /// ISO reference.
    #[arg(long)]
    pub iso: Option<String>,
}

impl UpdateArgs {
    /// Builds the canonical update request.
    #[must_use]
    pub fn to_request(&self) -> UpdateTransactionRequest {
        UpdateTransactionRequest {
            processor: self.processor.clone(),
            authorization: self.authorization.clone(),
            provider: self.provider.clone(),
            base24: self.base24.clone(),
            iso: self.iso.clone(),
        }
    }
}

/// Query options from the `query` arguments.
#[must_use]
pub fn query_options(user_agent: Option<&str>) -> QueryOptions {
    user_agent.map(QueryOptions::with_user_agent).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_lookup() {
        let cli = Cli::try_parse_from([
            "mpi-cli",
            "--protocol",
            "v2",
            "--mock",
            "lookup",
            "--card",
            "4532840681197602",
            "--month",
            "7",
            "--year",
            "2030",
            "--amount",
            "125.00",
            "--currency",
            "USD",
            "--redirect-uri",
            "https://shop.test/return",
            "--recurring",
        ])
        .unwrap();
        assert!(cli.mock);
        let Command::Lookup(args) = &cli.command else {
            panic!("expected lookup");
        };
        let request = args.to_request();
        assert_eq!(request.card.expiry_yymm(), "3007");
        assert_eq!(request.amount, Decimal::new(12500, 2));
        assert_eq!(request.transaction_type, TransactionType::Recurring);
        assert!(request.browser.is_none());

        let mut config = MpiConfig::default();
        cli.apply(&mut config);
        assert_eq!(config.version.as_deref(), Some("v2"));
    }

    #[test]
    fn test_month_out_of_range() {
        let result = Cli::try_parse_from([
            "mpi-cli", "lookup", "--card", "1", "--month", "13", "--year", "30", "--amount", "1",
            "--currency", "USD", "--redirect-uri", "https://shop.test",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_update() {
        let cli =
            Cli::try_parse_from(["mpi-cli", "update", "42", "--processor", "p", "--iso", ""])
                .unwrap();
        let Command::Update(args) = &cli.command else {
            panic!("expected update");
        };
        let payload = args.to_request().payload();
        assert_eq!(payload.payment.processor.as_deref(), Some("p"));
        assert!(payload.payment.iso.is_none());
    }

    #[test]
    fn test_query_options() {
        assert_eq!(query_options(None), QueryOptions::default());
        assert_eq!(
            query_options(Some("curl/8")).user_agent.as_deref(),
            Some("curl/8")
        );
    }
}
