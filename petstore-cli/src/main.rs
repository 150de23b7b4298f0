use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use petstore_client::{CredentialSet, PetstoreClient};
use petstore_config::{ConfigLoader, PetstoreConfig};
use petstore_sim::{Metrics, Simulator};
use petstore_token::{example_customers, load_tokens, save_token, Customer, CustomerTier, TokenIssuer};
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Cli, Commands};

/// Initialize tracing to stdout, optionally teeing to a log file.
///
/// The returned guard must stay alive for the duration of the process so
/// buffered file output is flushed on exit.
fn init_logging(
    level: &str,
    log_file: Option<&PathBuf>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level '{}', using 'info'", level);
        EnvFilter::new("info")
    });

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("log file path has no file name: {}", path.display()))?;
            let appender =
                tracing_appender::rolling::never(dir.unwrap_or(std::path::Path::new(".")), file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            Ok(None)
        }
    }
}

struct MintArgs {
    key_path: Option<PathBuf>,
    username: Option<String>,
    tier: String,
    email: Option<String>,
    company: Option<String>,
    subscription_tier: Option<String>,
    metadata: Option<String>,
    expiration: Option<u64>,
    stagger: u64,
    issuer: Option<String>,
    audience: Option<String>,
    key_id: Option<String>,
    output_dir: Option<PathBuf>,
}

fn mint_tokens(config: &PetstoreConfig, args: MintArgs) -> Result<()> {
    let tokens = &config.tokens;
    let key_path = args.key_path.unwrap_or_else(|| tokens.key_path.clone());
    let issuer = TokenIssuer::from_pem_file(
        &key_path,
        args.issuer.unwrap_or_else(|| tokens.issuer.clone()),
        args.audience.unwrap_or_else(|| tokens.audience.clone()),
        args.key_id.unwrap_or_else(|| tokens.key_id.clone()),
    )?;

    let customers = match args.username {
        Some(username) => {
            let tier: CustomerTier = args.tier.parse().map_err(|e: String| anyhow!(e))?;
            let email = args
                .email
                .unwrap_or_else(|| format!("{}@example.com", username));
            let mut customer = Customer::new(username, tier, email);
            if let Some(company) = args.company {
                customer = customer.with_company(company);
            }
            if let Some(subscription_tier) = args.subscription_tier {
                customer = customer.with_subscription_tier(subscription_tier);
            }
            if let Some(raw) = args.metadata {
                let value: JsonValue =
                    serde_json::from_str(&raw).context("--metadata is not valid JSON")?;
                let map = value
                    .as_object()
                    .cloned()
                    .ok_or_else(|| anyhow!("--metadata must be a JSON object"))?;
                customer = customer.with_metadata(map);
            }
            vec![customer]
        }
        None => {
            info!("no username given, minting tokens for the example customers");
            example_customers()
        }
    };

    let base_ttl = args
        .expiration
        .map(Duration::from_secs)
        .unwrap_or(tokens.expiration);
    let step = Duration::from_secs(args.stagger);
    let output_dir = args.output_dir.or_else(|| tokens.output_dir.clone());

    for (i, customer) in customers.iter().enumerate() {
        let ttl = base_ttl + step * i as u32;
        let token = issuer.sign(customer, ttl)?;
        let claims = TokenIssuer::decode_unverified(&token)?;

        println!(
            "\nToken for {} ({} tier, expires in {}s):",
            customer.username,
            customer.tier,
            claims.exp - claims.iat
        );
        println!("{}", token);

        if let Some(dir) = &output_dir {
            let path = save_token(&token, &customer.username, customer.tier, dir)?;
            println!("Saved to: {}", path.display());
        }
    }
    Ok(())
}

struct SimulateArgs {
    url: Option<String>,
    api_key: Option<String>,
    duration: Option<u64>,
    rate: Option<u32>,
    min_pets: Option<usize>,
    min_users: Option<usize>,
    min_orders: Option<usize>,
    parallel: Option<usize>,
    timeout: Option<u64>,
    token_dir: Option<PathBuf>,
    jwt_key: Option<PathBuf>,
}

async fn simulate(mut config: PetstoreConfig, args: SimulateArgs) -> Result<()> {
    {
        let sim = &mut config.simulation;
        if let Some(url) = args.url {
            sim.base_url = url;
        }
        if let Some(api_key) = args.api_key {
            sim.api_key = Some(api_key);
        }
        if let Some(minutes) = args.duration {
            sim.duration = Duration::from_secs(minutes * 60);
        }
        if let Some(rate) = args.rate {
            sim.operations_per_minute = rate;
        }
        if let Some(min_pets) = args.min_pets {
            sim.min_pets = min_pets;
        }
        if let Some(min_users) = args.min_users {
            sim.min_users = min_users;
        }
        if let Some(min_orders) = args.min_orders {
            sim.min_orders = min_orders;
        }
        if let Some(parallel) = args.parallel {
            sim.parallel = parallel;
        }
    }
    if let Some(timeout) = args.timeout {
        config.http.timeout = Duration::from_secs(timeout);
    }
    config.validate_all()?;

    let mut credentials = match &config.simulation.api_key {
        Some(key) => CredentialSet::with_api_key(key),
        None => CredentialSet::new(),
    };
    if let Some(dir) = &args.token_dir {
        let tokens = load_tokens(dir)
            .with_context(|| format!("failed to load tokens from {}", dir.display()))?;
        info!(count = tokens.len(), dir = %dir.display(), "loaded bearer tokens");
        credentials.extend_bearers(tokens);
    }
    if let Some(key_path) = &args.jwt_key {
        let mut issuer = TokenIssuer::from_pem_file(
            key_path,
            &config.tokens.issuer,
            &config.tokens.audience,
            &config.tokens.key_id,
        )?;
        for customer in example_customers() {
            issuer.add_customer(customer);
        }
        let minted = issuer.mint_staggered(config.tokens.expiration, Duration::from_secs(600))?;
        info!(count = minted.len(), "minted bearer tokens for simulation");
        credentials.extend_bearers(minted);
    }
    if credentials.is_empty() {
        bail!("no credentials configured: provide --api-key, --token-dir or --jwt-key");
    }

    let metrics = Arc::new(Metrics::new());
    let client = PetstoreClient::new(&config.simulation.base_url, &config.http, credentials)?
        .with_observer(metrics.clone());
    let simulator = Arc::new(Simulator::new(client, metrics, config.simulation.clone()));

    simulator.initialize().await?;

    {
        let simulator = Arc::clone(&simulator);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupt received, stopping after current operation");
                simulator.request_stop();
            }
        });
    }

    let operations = Arc::clone(&simulator).run().await?;
    info!(operations, "simulation run complete");
    println!("{}", simulator.final_report().await?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load(cli.config.as_ref())
        .context("failed to load configuration")?;

    let debug_flag = matches!(&cli.command, Commands::Simulate { debug: true, .. });
    let level = cli
        .log_level
        .clone()
        .or_else(|| debug_flag.then(|| "debug".to_string()))
        .unwrap_or_else(|| config.logging.level.as_str().to_string());
    let log_file = cli.log_file.clone().or_else(|| config.logging.file.clone());
    let _guard = init_logging(&level, log_file.as_ref())?;

    match cli.command {
        Commands::MintToken {
            key_path,
            username,
            tier,
            email,
            company,
            subscription_tier,
            metadata,
            expiration,
            stagger,
            issuer,
            audience,
            key_id,
            output_dir,
        } => mint_tokens(
            &config,
            MintArgs {
                key_path,
                username,
                tier,
                email,
                company,
                subscription_tier,
                metadata,
                expiration,
                stagger,
                issuer,
                audience,
                key_id,
                output_dir,
            },
        ),
        Commands::Simulate {
            url,
            api_key,
            duration,
            rate,
            min_pets,
            min_users,
            min_orders,
            parallel,
            timeout,
            token_dir,
            jwt_key,
            debug: _,
        } => {
            simulate(
                config,
                SimulateArgs {
                    url,
                    api_key,
                    duration,
                    rate,
                    min_pets,
                    min_users,
                    min_orders,
                    parallel,
                    timeout,
                    token_dir,
                    jwt_key,
                },
            )
            .await
        }
    }
}
