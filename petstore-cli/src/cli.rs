//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Mint ES256-signed customer tokens
    MintToken {
        /// Path to the EC private key in PEM format
        #[arg(long, value_name = "PATH")]
        key_path: Option<PathBuf>,

        /// Username to mint a token for (omit to mint the example customers)
        #[arg(long, value_name = "NAME")]
        username: Option<String>,

        /// Customer tier: free, standard, premium
        #[arg(long, value_name = "TIER", default_value = "standard")]
        tier: String,

        /// Customer email (defaults to {username}@example.com)
        #[arg(long, value_name = "EMAIL")]
        email: Option<String>,

        /// Customer company name
        #[arg(long, value_name = "NAME")]
        company: Option<String>,

        /// Subscription tier carried in the customer claims
        #[arg(long, value_name = "TIER")]
        subscription_tier: Option<String>,

        /// Extra claims as a JSON object (example: --metadata='{"rate_limit":1000}')
        #[arg(long, value_name = "JSON")]
        metadata: Option<String>,

        /// Token validity in seconds
        #[arg(long, value_name = "SECS")]
        expiration: Option<u64>,

        /// Gap in seconds between expirations when minting several tokens
        #[arg(long, value_name = "SECS", default_value = "600")]
        stagger: u64,

        /// JWT issuer claim
        #[arg(long, value_name = "URL")]
        issuer: Option<String>,

        /// JWT audience claim
        #[arg(long, value_name = "NAME")]
        audience: Option<String>,

        /// Key ID placed in the JWT header
        #[arg(long, value_name = "KID")]
        key_id: Option<String>,

        /// Directory to save minted tokens to (printed to stdout if omitted)
        #[arg(long, value_name = "PATH")]
        output_dir: Option<PathBuf>,
    },

    /// Drive randomized CRUD traffic against a petstore API
    Simulate {
        /// Base URL of the petstore API
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Static API key credential
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,

        /// Duration in minutes
        #[arg(long, value_name = "MINUTES")]
        duration: Option<u64>,

        /// Operations per minute (per worker in parallel mode)
        #[arg(long, value_name = "OPS")]
        rate: Option<u32>,

        /// Minimum number of pets to maintain
        #[arg(long, value_name = "N")]
        min_pets: Option<usize>,

        /// Minimum number of users to maintain
        #[arg(long, value_name = "N")]
        min_users: Option<usize>,

        /// Minimum number of orders to maintain
        #[arg(long, value_name = "N")]
        min_orders: Option<usize>,

        /// Number of parallel workers (0 = sequential)
        #[arg(long, value_name = "N")]
        parallel: Option<usize>,

        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Directory of *.jwt files to rotate as bearer credentials
        #[arg(long, value_name = "PATH")]
        token_dir: Option<PathBuf>,

        /// Mint bearer tokens from this EC private key before starting
        #[arg(long, value_name = "PATH")]
        jwt_key: Option<PathBuf>,

        /// Shorthand for --log-level debug
        #[arg(long)]
        debug: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_args_parse() {
        let cli = Cli::parse_from([
            "petstore",
            "simulate",
            "--url",
            "http://localhost:8080",
            "--api-key",
            "secret",
            "--duration",
            "5",
            "--parallel",
            "3",
        ]);
        match cli.command {
            Commands::Simulate {
                url,
                api_key,
                duration,
                parallel,
                debug,
                ..
            } => {
                assert_eq!(url.as_deref(), Some("http://localhost:8080"));
                assert_eq!(api_key.as_deref(), Some("secret"));
                assert_eq!(duration, Some(5));
                assert_eq!(parallel, Some(3));
                assert!(!debug);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_mint_token_defaults() {
        let cli = Cli::parse_from(["petstore", "mint-token"]);
        match cli.command {
            Commands::MintToken {
                username,
                tier,
                stagger,
                ..
            } => {
                assert!(username.is_none());
                assert_eq!(tier, "standard");
                assert_eq!(stagger, 600);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_global_flags_apply_after_subcommand() {
        let cli = Cli::parse_from(["petstore", "simulate", "--log-level", "debug"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }
}
