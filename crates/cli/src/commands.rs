//! CLI commands

use anyhow::{Context as _, Result};
use clap::{Subcommand, ValueEnum};
use oak_http::client::auth::{LoginRequest, RegisterRequest};
use oak_http::client::reports::{
    BelowMinimumEntry, CategoryCount, MovementHighlights, MovementLeader, PriceListEntry, Reports,
    StockBalance,
};
use oak_http::types::{
    CategoryPayload, CategorySize, EntityRef, MovementKind, Packaging, Product, ProductPayload,
    StockMovementPayload,
};
use oak_http::{ApiClient, ApiClientBuilder, ClientConfig, ExpiryFlow, FileTokenStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config;
use crate::terminal::{LoginRedirect, TerminalNotifier, format_brl};

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session token
    Login {
        email: String,

        #[arg(long, env = "OAK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        name: String,
        email: String,

        #[arg(long, env = "OAK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session token
    Logout,

    /// Show whether a session token is stored
    Status,

    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },

    /// Manage products
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// List or record stock movements
    Movements {
        #[command(subcommand)]
        command: MovementCommands,
    },

    /// Show aggregate reports
    Reports {
        #[arg(value_enum, default_value = "all")]
        report: ReportKind,
    },

    /// Show the dashboard summary
    Dashboard,

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    List,
    Add(CategoryArgs),
    Update {
        id: i64,
        #[command(flatten)]
        category: CategoryArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(clap::Args)]
pub struct CategoryArgs {
    name: String,

    #[arg(long, value_enum, default_value = "medium")]
    size: SizeArg,

    #[arg(long, value_enum, default_value = "plastic")]
    packaging: PackagingArg,
}

#[derive(Subcommand)]
pub enum ProductCommands {
    List {
        /// Only products below their minimum stock
        #[arg(long)]
        below_minimum: bool,
    },
    Add(ProductArgs),
    Update {
        id: i64,
        #[command(flatten)]
        product: ProductArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(clap::Args)]
pub struct ProductArgs {
    name: String,

    #[arg(long)]
    price: f64,

    #[arg(long, default_value = "un")]
    unit: String,

    #[arg(long, default_value_t = 0)]
    stock: i64,

    #[arg(long, default_value_t = 0)]
    min: i64,

    #[arg(long, default_value_t = 0)]
    max: i64,

    #[arg(long)]
    category: i64,
}

#[derive(Subcommand)]
pub enum MovementCommands {
    List,
    Add {
        product: i64,

        quantity: i64,

        #[arg(long, value_enum, default_value = "in")]
        kind: KindArg,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate a configuration file with the defaults
    Init {
        /// Output file path (defaults to OAK_STATE_DIR/oak.toml)
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    Show,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SizeArg {
    Small,
    Medium,
    Large,
}

impl From<SizeArg> for CategorySize {
    fn from(arg: SizeArg) -> Self {
        match arg {
            SizeArg::Small => Self::Small,
            SizeArg::Medium => Self::Medium,
            SizeArg::Large => Self::Large,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PackagingArg {
    Can,
    Glass,
    Plastic,
}

impl From<PackagingArg> for Packaging {
    fn from(arg: PackagingArg) -> Self {
        match arg {
            PackagingArg::Can => Self::Can,
            PackagingArg::Glass => Self::Glass,
            PackagingArg::Plastic => Self::Plastic,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    In,
    Out,
}

impl From<KindArg> for MovementKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::In => Self::Inbound,
            KindArg::Out => Self::Outbound,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    All,
    Prices,
    Balance,
    BelowMinimum,
    PerCategory,
    Movements,
}

impl From<CategoryArgs> for CategoryPayload {
    fn from(args: CategoryArgs) -> Self {
        Self {
            name: args.name,
            size: args.size.into(),
            packaging: args.packaging.into(),
        }
    }
}

impl From<ProductArgs> for ProductPayload {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            unit_price: args.price,
            unit: args.unit,
            stock_quantity: args.stock,
            min_quantity: args.min,
            max_quantity: args.max,
            category: EntityRef::by_id(args.category),
        }
    }
}

/// Global options every command sees
pub struct Context {
    pub data_dir: PathBuf,
    pub config_file: Option<PathBuf>,
    pub json: bool,
}

impl Context {
    fn settings(&self) -> Result<ClientConfig> {
        config::load(&self.data_dir, self.config_file.as_deref())
    }

    fn client(&self) -> Result<ApiClient> {
        let settings = self.settings()?;
        info!(base_url = %settings.base_url, "Using backend");

        let client = ApiClientBuilder::from_config(&settings)
            .token_store(FileTokenStore::new(&self.data_dir))
            .on_session_expired(ExpiryFlow::new(TerminalNotifier, LoginRedirect))
            .build()?;
        Ok(client)
    }

    fn emit<T: Serialize>(&self, value: &T, render: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            render(value);
        }
        Ok(())
    }
}

impl Commands {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::Login { email, password } => {
                let client = ctx.client()?;
                client
                    .login(&LoginRequest { email, password })
                    .await
                    .context("Login failed")?;
                println!("Logged in.");
                Ok(())
            }
            Self::Register {
                name,
                email,
                password,
            } => {
                let client = ctx.client()?;
                let response = client
                    .register(&RegisterRequest {
                        name,
                        email,
                        password,
                    })
                    .await
                    .context("Registration failed")?;
                if response.token.is_some() {
                    println!("Account created; you are logged in.");
                } else {
                    println!("Account created. Run `oak login` to start a session.");
                }
                Ok(())
            }
            Self::Logout => {
                ctx.client()?.logout()?;
                println!("Logged out.");
                Ok(())
            }
            Self::Status => {
                let client = ctx.client()?;
                if client.is_logged_in() {
                    println!("Logged in ({})", client.base_url());
                } else {
                    println!("Not logged in ({})", client.base_url());
                }
                Ok(())
            }
            Self::Categories { command } => command.execute(ctx, &ctx.client()?).await,
            Self::Products { command } => command.execute(ctx, &ctx.client()?).await,
            Self::Movements { command } => command.execute(ctx, &ctx.client()?).await,
            Self::Reports { report } => show_reports(ctx, &ctx.client()?, report).await,
            Self::Dashboard => {
                let summary = ctx.client()?.dashboard().await?;
                ctx.emit(&summary, |s| {
                    println!("Products registered   {}", s.total_products);
                    println!("Total stock value     {}", format_brl(s.stock_value));
                    println!("Below minimum         {}", s.below_minimum);
                    println!("Movements today       {}", s.movements_today);
                })
            }
            Self::Config { command } => command.execute(ctx),
        }
    }
}

impl CategoryCommands {
    async fn execute(self, ctx: &Context, client: &ApiClient) -> Result<()> {
        match self {
            Self::List => {
                let categories = client.list_categories().await?;
                ctx.emit(&categories, |categories| {
                    for c in categories {
                        println!("{:>5}  {:<30} {:?} / {:?}", c.id, c.name, c.size, c.packaging);
                    }
                })
            }
            Self::Add(args) => {
                let created = client.create_category(&args.into()).await?;
                ctx.emit(&created, |c| println!("Category {} created.", c.id))
            }
            Self::Update { id, category } => {
                let updated = client.update_category(id, &category.into()).await?;
                ctx.emit(&updated, |c| println!("Category {} updated.", c.id))
            }
            Self::Delete { id } => {
                client.delete_category(id).await?;
                println!("Category {id} deleted.");
                Ok(())
            }
        }
    }
}

impl ProductCommands {
    async fn execute(self, ctx: &Context, client: &ApiClient) -> Result<()> {
        match self {
            Self::List { below_minimum } => {
                let mut products = client.list_products().await?;
                if below_minimum {
                    products.retain(Product::is_below_minimum);
                }
                ctx.emit(&products, |products| {
                    for p in products {
                        println!(
                            "{:>5}  {:<30} {:>14} /{:<4} stock {:>6} (min {}, max {})  {:>16}",
                            p.id,
                            p.name,
                            format_brl(p.unit_price),
                            p.unit,
                            p.stock_quantity,
                            p.min_quantity,
                            p.max_quantity,
                            format_brl(p.stock_value()),
                        );
                    }
                })
            }
            Self::Add(args) => {
                let created = client.create_product(&args.into()).await?;
                ctx.emit(&created, |p| println!("Product {} created.", p.id))
            }
            Self::Update { id, product } => {
                let updated = client.update_product(id, &product.into()).await?;
                ctx.emit(&updated, |p| println!("Product {} updated.", p.id))
            }
            Self::Delete { id } => {
                client.delete_product(id).await?;
                println!("Product {id} deleted.");
                Ok(())
            }
        }
    }
}

impl MovementCommands {
    async fn execute(self, ctx: &Context, client: &ApiClient) -> Result<()> {
        match self {
            Self::List => {
                let movements = client.list_movements().await?;
                ctx.emit(&movements, |movements| {
                    for m in movements {
                        println!(
                            "{:>5}  {:<16} {:<8} {:>6}  {}",
                            m.id,
                            m.formatted_timestamp(),
                            m.kind,
                            m.quantity,
                            m.product.name.as_deref().unwrap_or("-"),
                        );
                    }
                })
            }
            Self::Add {
                product,
                quantity,
                kind,
            } => {
                let payload = StockMovementPayload {
                    product: EntityRef::by_id(product),
                    quantity,
                    kind: kind.into(),
                };
                let created = client.create_movement(&payload).await?;
                ctx.emit(&created, |m| println!("Movement {} recorded.", m.id))
            }
        }
    }
}

impl ConfigCommands {
    fn execute(self, ctx: &Context) -> Result<()> {
        match self {
            Self::Init { output } => {
                let path = output.unwrap_or_else(|| ctx.data_dir.join(config::CONFIG_FILE));
                write_default_config(&path)?;
                println!("Generated configuration at: {}", path.display());
                Ok(())
            }
            Self::Show => {
                let settings = ctx.settings()?;
                print!("{}", toml::to_string_pretty(&settings)?);
                Ok(())
            }
        }
    }
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    config::generate_default_config(path)
}

async fn show_reports(ctx: &Context, client: &ApiClient, report: ReportKind) -> Result<()> {
    match report {
        ReportKind::All => {
            let reports = client.all_reports().await?;
            ctx.emit(&reports, render_all)
        }
        ReportKind::Prices => {
            let prices = client.price_list().await?;
            ctx.emit(&prices, |prices| render_prices(prices))
        }
        ReportKind::Balance => {
            let balance = client.stock_balance().await?;
            ctx.emit(&balance, render_balance)
        }
        ReportKind::BelowMinimum => {
            let entries = client.below_minimum().await?;
            ctx.emit(&entries, |entries| render_below_minimum(entries))
        }
        ReportKind::PerCategory => {
            let counts = client.products_per_category().await?;
            ctx.emit(&counts, |counts| render_per_category(counts))
        }
        ReportKind::Movements => {
            let highlights = client.movement_highlights().await?;
            ctx.emit(&highlights, render_highlights)
        }
    }
}

fn render_all(reports: &Reports) {
    render_prices(&reports.price_list);
    println!();
    render_balance(&reports.balance);
    println!();
    render_below_minimum(&reports.below_minimum);
    println!();
    render_per_category(&reports.per_category);
    println!();
    render_highlights(&reports.highlights);
}

fn render_prices(prices: &[PriceListEntry]) {
    println!("Price list");
    for p in prices {
        println!(
            "  {:<30} {:>14} /{:<4} {}",
            p.product_name,
            format_brl(p.unit_price),
            p.unit,
            p.category_name
        );
    }
}

fn render_balance(balance: &StockBalance) {
    println!("Financial balance: {}", format_brl(balance.total_value));
    for item in &balance.items {
        println!(
            "  {:<30} {:>6}  {:>14}",
            item.product_name,
            item.stock_quantity,
            format_brl(item.total_value)
        );
    }
}

fn render_below_minimum(entries: &[BelowMinimumEntry]) {
    println!("Below minimum stock");
    if entries.is_empty() {
        println!("  (none)");
    }
    for e in entries {
        println!(
            "  {:<30} stock {:>6} (min {})",
            e.product_name, e.stock_quantity, e.min_quantity
        );
    }
}

fn render_per_category(counts: &[CategoryCount]) {
    println!("Products per category");
    for c in counts {
        println!("  {:<30} {:>6}", c.category_name, c.product_count);
    }
}

fn render_highlights(highlights: &MovementHighlights) {
    println!("Largest movements");
    let line = |label: &str, leader: Option<&MovementLeader>| match leader {
        Some(l) => println!("  {label:<10} {} ({})", l.product_name, l.total_moved),
        None => println!("  {label:<10} -"),
    };
    line("Outbound", highlights.most_outbound.as_ref());
    line("Inbound", highlights.most_inbound.as_ref());
}
