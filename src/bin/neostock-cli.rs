use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use neostock::client::{
    api::ApiClient,
    credentials::{CredentialCache, FileCredentialCache, StoredSession},
    csv,
    state::{Filter, ProductView, SortKey, SortOrder, ViewMode},
};
use neostock::products::dto::{CreateProductRequest, UpdateProductRequest};

#[derive(Parser)]
#[command(name = "neostock-cli", about = "Inventory tracking from the terminal")]
struct Args {
    #[arg(long, env = "NEOSTOCK_URL", default_value = "http://localhost:8080")]
    url: String,

    #[arg(long, help = "Credential cache file (defaults to the user config dir)")]
    auth_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and start a session
    Register {
        name: String,
        email: String,
        password: String,
    },
    /// Start a session with existing credentials
    Login { email: String, password: String },
    /// Drop the cached session
    Logout,
    /// Show the cached session, if any
    Whoami,
    /// Check that the server is up
    Health,
    /// List products
    List {
        #[arg(long, help = "Match against name and description")]
        search: Option<String>,
        #[arg(long, help = "Only this category")]
        category: Option<String>,
        #[arg(long, help = "Only low-stock products")]
        low: bool,
        #[arg(long, default_value = "name", help = "name, price, quantity, or created")]
        sort: String,
        #[arg(long, help = "Sort descending")]
        desc: bool,
        #[arg(long, help = "One line per product instead of a table")]
        compact: bool,
    },
    /// Add a product
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        quantity: i32,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        sku: Option<String>,
    },
    /// Change fields on an existing product
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        quantity: Option<i32>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        sku: Option<String>,
    },
    /// Delete a product
    Delete { id: Uuid },
    /// Write the product collection to a CSV file
    Export {
        #[arg(default_value = "neostock-products.csv")]
        file: PathBuf,
    },
    /// Create one product per row of a CSV file
    Import { file: PathBuf },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let cache = match &args.auth_file {
        Some(path) => FileCredentialCache::new(path.clone()),
        None => FileCredentialCache::open_default()?,
    };

    match args.command {
        Command::Register {
            name,
            email,
            password,
        } => {
            let auth = ApiClient::new(&args.url).register(&name, &email, &password)?;
            let user = auth.user.clone();
            cache.save(&StoredSession {
                user: auth.user,
                token: auth.token,
            })?;
            println!("Registered and logged in as {} <{}>", user.name, user.email);
        }
        Command::Login { email, password } => {
            let auth = ApiClient::new(&args.url).login(&email, &password)?;
            let user = auth.user.clone();
            cache.save(&StoredSession {
                user: auth.user,
                token: auth.token,
            })?;
            println!("Logged in as {} <{}>", user.name, user.email);
        }
        Command::Logout => {
            cache.clear()?;
            println!("Logged out");
        }
        Command::Whoami => match cache.load()? {
            Some(session) => println!("{} <{}>", session.user.name, session.user.email),
            None => println!("Not logged in"),
        },
        Command::Health => {
            if ApiClient::new(&args.url).health()? {
                println!("Server is up");
            } else {
                bail!("server responded but did not report ok");
            }
        }
        Command::List {
            search,
            category,
            low,
            sort,
            desc,
            compact,
        } => {
            let api = authed_client(&args.url, &cache)?;
            let mut view = ProductView::new(api.list_products()?);
            if let Some(term) = search {
                view.set_search(&term);
            }
            if low {
                view.set_filter(Filter::Low);
            } else if let Some(category) = category {
                view.set_filter(Filter::Category(category));
            }
            view.sort_key = parse_sort(&sort)?;
            view.sort_order = if desc { SortOrder::Desc } else { SortOrder::Asc };
            view.set_view_mode(if compact {
                ViewMode::Compact
            } else {
                ViewMode::Table
            });
            render(&view);
        }
        Command::Add {
            name,
            price,
            quantity,
            description,
            category,
            sku,
        } => {
            let api = authed_client(&args.url, &cache)?;
            let product = api.create_product(&CreateProductRequest {
                name,
                price,
                quantity,
                description,
                category,
                sku,
            })?;
            println!(
                "Created {} ({}) — {} in stock",
                product.name, product.id, product.quantity
            );
        }
        Command::Update {
            id,
            name,
            price,
            quantity,
            description,
            category,
            sku,
        } => {
            let changes = UpdateProductRequest {
                name,
                price,
                quantity,
                description,
                category,
                sku,
            };
            if changes.is_empty() {
                bail!("nothing to update; pass at least one field flag");
            }
            let api = authed_client(&args.url, &cache)?;
            let product = api.update_product(id, &changes)?;
            println!(
                "Updated {} — {} in stock at {:.2}",
                product.name, product.quantity, product.price
            );
        }
        Command::Delete { id } => {
            let api = authed_client(&args.url, &cache)?;
            let message = api.delete_product(id)?;
            println!("{}", message);
        }
        Command::Export { file } => {
            let api = authed_client(&args.url, &cache)?;
            let products = api.list_products()?;
            std::fs::write(&file, csv::export_products(&products))
                .with_context(|| format!("write {}", file.display()))?;
            println!("Exported {} products to {}", products.len(), file.display());
        }
        Command::Import { file } => {
            let text = std::fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let rows = csv::parse_products(&text)?;
            let api = authed_client(&args.url, &cache)?;
            let mut created = 0;
            for row in &rows {
                api.create_product(row)
                    .with_context(|| format!("import failed after {} products", created))?;
                created += 1;
            }
            println!("Imported {} products", created);
        }
    }

    Ok(())
}

fn authed_client(url: &str, cache: &FileCredentialCache) -> Result<ApiClient> {
    match cache.load()? {
        Some(session) => Ok(ApiClient::with_token(url, &session.token)),
        None => bail!("not logged in; run `neostock-cli login <email> <password>` first"),
    }
}

fn parse_sort(key: &str) -> Result<SortKey> {
    match key {
        "name" => Ok(SortKey::Name),
        "price" => Ok(SortKey::Price),
        "quantity" => Ok(SortKey::Quantity),
        "created" => Ok(SortKey::CreatedAt),
        other => bail!("unknown sort key '{}'; use name, price, quantity, or created", other),
    }
}

fn render(view: &ProductView) {
    let items = view.visible();
    if items.is_empty() {
        println!("No products match");
        return;
    }
    match view.view_mode {
        ViewMode::Compact => {
            for p in &items {
                println!(
                    "{} — {} @ {:.2} ({} in stock{})",
                    p.id,
                    p.name,
                    p.price,
                    p.quantity,
                    if p.status.as_str() == "low" { ", LOW" } else { "" }
                );
            }
        }
        ViewMode::Table => {
            println!(
                "{:<36}  {:<24} {:>10} {:>8}  {:<12} {:<8} {:>12}",
                "ID", "NAME", "PRICE", "QTY", "CATEGORY", "STATUS", "VALUE"
            );
            for p in &items {
                println!(
                    "{:<36}  {:<24} {:>10.2} {:>8}  {:<12} {:<8} {:>12.2}",
                    p.id,
                    truncate(&p.name, 24),
                    p.price,
                    p.quantity,
                    truncate(&p.category, 12),
                    p.status.as_str(),
                    p.total_value
                );
            }
        }
    }
    let stats = view.stats();
    println!(
        "\n{} shown of {} products · {} low stock · total value {:.2} · avg price {:.2}",
        items.len(),
        stats.total,
        stats.low_stock,
        stats.total_value,
        stats.average_price
    );
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
