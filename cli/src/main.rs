mod validate;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use epoch_core::{
    render_robots, AuthClient, MetadataBuilder, PostTransformer, Sections, SiteConfig,
    SitemapGenerator, SitemapKind, WordPressClient, WordPressHttp, YoastClient,
};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "epoch")]
#[command(about = "The Maple Epoch pipeline CLI", long_about = None)]
struct Cli {
    /// WordPress REST root (default: EPOCH_WP_API_URL or https://api.mapleepoch.com/wp-json)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Public site origin (default: EPOCH_FRONTEND_URL or https://www.mapleepoch.com)
    #[arg(long, global = true)]
    frontend_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SitemapArg {
    Posts,
    Categories,
    Static,
    Full,
    News,
    Index,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a sitemap
    Sitemap {
        #[arg(long = "type", value_enum, default_value = "full")]
        kind: SitemapArg,
    },
    /// Print the homepage feed as JSON
    Home,
    /// Print a section's posts as JSON
    Section {
        /// Category slug, e.g. daily-maple
        slug: String,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    /// Search published posts
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
    /// Print page metadata as JSON
    Seo {
        #[command(subcommand)]
        page: SeoPage,
    },
    /// Print robots.txt
    Robots,
    /// Generate a sitemap and check it against the sitemap protocol limits
    Validate {
        #[arg(long = "type", value_enum, default_value = "full")]
        kind: SitemapArg,
    },
    /// Check a WordPress token and print the account behind it
    Whoami {
        /// JWT issued by the jwt-auth plugin
        #[arg(long, env = "EPOCH_TOKEN")]
        token: String,
    },
}

#[derive(Subcommand)]
enum SeoPage {
    Home,
    Category { slug: String },
    Post { slug: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = SiteConfig::from_env()
        .and_then(|c| c.with_urls(cli.api_url.as_deref(), cli.frontend_url.as_deref()))
        .context("Invalid site configuration")?;
    let config = Arc::new(config);
    let http: Arc<dyn epoch_core::HttpClient> = Arc::new(
        WordPressHttp::builder()
            .timeout(config.http_timeout)
            .build()
            .context("Failed to build HTTP client")?,
    );

    match cli.command {
        Commands::Sitemap { kind } => {
            let sitemaps = SitemapGenerator::new(http, config);
            let sitemap = generate(&sitemaps, kind).await;
            if sitemap.degraded {
                tracing::warn!("upstream failure, sitemap is incomplete");
            }
            println!("{}", sitemap.xml);
        }
        Commands::Home => {
            let sections = Arc::new(sections(http, config));
            print_json(&sections.homepage().await)?;
        }
        Commands::Section { slug, limit } => {
            print_json(&sections(http, config).get_section(&slug, limit).await)?;
        }
        Commands::Search {
            query,
            page,
            per_page,
        } => {
            let wp = WordPressClient::new(http, config);
            let posts = wp
                .search(&query, page, per_page)
                .await
                .with_context(|| format!("Search for {:?} failed", query))?;
            print_json(&PostTransformer::default().transform_all(&posts))?;
        }
        Commands::Seo { page } => {
            let yoast = YoastClient::new(http, config.clone());
            let builder = MetadataBuilder::new(&config);
            let metadata = match page {
                SeoPage::Home => builder.to_page_metadata(yoast.homepage().await.as_ref(), None, None),
                SeoPage::Category { slug } => {
                    builder.to_page_metadata(yoast.category(&slug).await.as_ref(), Some(&slug), None)
                }
                SeoPage::Post { slug } => match yoast.post(&slug).await {
                    Some(seo) => builder.to_page_metadata(Some(&seo), None, None),
                    None => builder.fallback_metadata(None, None, Some(&slug)),
                },
            };
            print_json(&metadata)?;
        }
        Commands::Robots => {
            print!("{}", render_robots(&config));
        }
        Commands::Validate { kind } => {
            let sitemaps = SitemapGenerator::new(http, config.clone());
            let sitemap = generate(&sitemaps, kind).await;
            validate::report(&sitemap, &config.frontend_url)?;
        }
        Commands::Whoami { token } => {
            let auth = AuthClient::new(http, config);
            let user = auth
                .current_user(&token)
                .await
                .context("Token was not accepted")?;
            println!(
                "{} ({}) id={} roles={}",
                user.display_name,
                user.username,
                user.id,
                user.roles.join(",")
            );
        }
    }

    Ok(())
}

fn sections(http: Arc<dyn epoch_core::HttpClient>, config: Arc<SiteConfig>) -> Sections {
    let wp = Arc::new(WordPressClient::new(http, config));
    Sections::new(wp, PostTransformer::default())
}

async fn generate(sitemaps: &SitemapGenerator, kind: SitemapArg) -> epoch_core::GeneratedSitemap {
    match kind {
        SitemapArg::Posts => sitemaps.generate(SitemapKind::Posts).await,
        SitemapArg::Categories => sitemaps.generate(SitemapKind::Categories).await,
        SitemapArg::Static => sitemaps.generate(SitemapKind::Static).await,
        SitemapArg::Full => sitemaps.generate(SitemapKind::Full).await,
        SitemapArg::News => sitemaps.news().await,
        SitemapArg::Index => sitemaps.index(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
