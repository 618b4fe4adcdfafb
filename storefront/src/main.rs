//! fxnorm Storefront
//!
//! Command-line storefront over the demo catalog: prices, search and cart
//! totals in any currency.

use clap::{Parser, Subcommand};
use fxnorm_common::{format_amount, Currency, COMMON_CURRENCIES};
use fxnorm_fx::{ConversionEngine, FxConfig};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cart;
mod catalog;

use cart::{build_line_items, CartEntry};
use catalog::{Catalog, ProductSort, DEFAULT_SUGGESTION_LIMIT};

/// fxnorm Storefront CLI
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Demo storefront with live currency conversion")]
struct Args {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Rate endpoint template containing {base}; repeat to set failover order
    #[arg(long = "endpoint", global = true)]
    endpoints: Vec<String>,

    /// Fetch rate tables for the common currencies before running
    #[arg(long, global = true)]
    warm: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an amount between two currencies
    Convert {
        amount: f64,
        #[arg(value_parser = Currency::parse)]
        from: Currency,
        #[arg(value_parser = Currency::parse)]
        to: Currency,
    },

    /// List the catalog
    Products {
        /// price-asc, price-desc, name-asc, name-desc or featured
        #[arg(long, default_value = "price-asc")]
        sort: ProductSort,

        /// Display currency
        #[arg(long, default_value = "USD", value_parser = Currency::parse)]
        currency: Currency,

        /// Only list products whose name or description contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Autocomplete product names
    Suggest {
        prefix: String,

        #[arg(long, default_value_t = DEFAULT_SUGGESTION_LIMIT)]
        limit: usize,
    },

    /// Price a cart of ID=QTY entries
    Cart {
        /// Target currency
        #[arg(long, value_parser = Currency::parse)]
        currency: Currency,

        /// Tax rate as a fraction, e.g. 0.2
        #[arg(long, default_value = "0")]
        tax_rate: f64,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        #[arg(required = true)]
        items: Vec<CartEntry>,
    },

    /// Show the rate table for a base currency
    Rates {
        #[arg(value_parser = Currency::parse)]
        base: Currency,
    },
}

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    let mut config = FxConfig::from_env();
    if !args.endpoints.is_empty() {
        config.endpoints = args.endpoints.clone();
    }
    let engine = config.build_engine()?;
    let catalog = Catalog::demo();

    info!(endpoints = config.endpoints.len(), "Starting storefront");

    if args.warm {
        let bases: Vec<Currency> = COMMON_CURRENCIES.iter().map(|c| Currency::new(*c)).collect();
        let loaded = engine.cache().preload(&bases).await;
        info!(loaded, requested = bases.len(), "Warmed rate cache");
    }

    match args.command {
        Command::Convert { amount, from, to } => {
            let conversion = engine.convert(amount, &from, &to).await;
            println!(
                "{} = {} ({})",
                format_amount(amount, &from),
                format_amount(conversion.value, &to),
                conversion.origin
            );
        }

        Command::Products {
            sort,
            currency,
            filter,
        } => {
            list_products(&engine, &catalog, sort, filter.as_deref(), &currency).await;
        }

        Command::Suggest { prefix, limit } => {
            for product in catalog.suggest(&prefix, limit) {
                println!("{}  {}", product.id, product.name);
            }
        }

        Command::Cart {
            currency,
            tax_rate,
            json,
            items,
        } => {
            let line_items = build_line_items(&catalog, &items)?;
            let result = engine
                .convert_line_items(&line_items, &currency, tax_rate)
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                for line in &result.items {
                    println!(
                        "{:>3} x {:<22} {:>14}  {}",
                        line.item.quantity,
                        line.item.name,
                        format_amount(line.subtotal_converted, &currency),
                        line.origin
                    );
                }
                for row in result.summary() {
                    println!("{}", row);
                }
            }
        }

        Command::Rates { base } => {
            let snapshot = engine.cache().get_rates(&base).await?;
            println!("{} rates from {} at {}", base, snapshot.source(), snapshot.fetched_at_time());
            for (quote, rate) in snapshot.rates() {
                println!("{}  {}", quote, rate);
            }
        }
    }

    let stats = engine.stats();
    debug!(
        live = stats.live,
        fallback = stats.fallback,
        identity = stats.identity,
        cache_hits = stats.cache.hits,
        cache_misses = stats.cache.misses,
        "Storefront finished"
    );

    Ok(())
}

async fn list_products(
    engine: &ConversionEngine,
    catalog: &Catalog,
    sort: ProductSort,
    filter: Option<&str>,
    currency: &Currency,
) {
    let products = catalog.listing(sort, filter);
    if products.is_empty() {
        info!(filter, "No products matched");
    }

    for product in products {
        let price = engine
            .convert(product.price_base, &product.currency_base, currency)
            .await;
        let marker = if price.is_degraded() { " ~" } else { "" };
        println!(
            "{}  {:<22} {:>14}{}",
            product.id,
            product.name,
            format_amount(price.value, currency),
            marker
        );
    }
}
