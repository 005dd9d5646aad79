//! Nimbus - Search and open Azure resources from the terminal
//!
//! This is the main entry point for the Nimbus command-line application.

use anyhow::{Result, bail};
use azure::{
    AzureError, Confirmation, FieldFilter, ResourceId, ResourceSummary, Settings, SubscriptionId,
};
use clap::{Parser, Subcommand};
use log::error;

mod app;

use app::NimbusApp;

#[derive(Parser)]
#[command(name = "nimbus")]
#[command(about = "Search and open Azure resources across subscriptions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default settings.json to the config directory
    Init,
    /// List subscriptions visible to the signed-in account
    Subscriptions,
    /// Search resources, across all subscriptions unless one is given
    Search {
        /// Free text matched against name, group, type, location, subscription and tags
        #[arg(default_value = "")]
        text: String,
        /// Restrict to one subscription id
        #[arg(short, long)]
        subscription: Option<String>,
        /// Exact resource type, or "all"
        #[arg(short = 't', long = "type", default_value = azure::ALL_FILTER)]
        resource_type: String,
        /// Exact location, or "all"
        #[arg(short, long, default_value = azure::ALL_FILTER)]
        location: String,
    },
    /// Record a resource in history and open it in the portal
    Open {
        /// Full resource id
        id: String,
        /// Print the URL instead of launching the browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Show recently opened resources and favorites
    Home,
    /// Show or clear the access history
    History {
        /// Erase the whole history
        #[arg(long)]
        clear: bool,
        /// Confirm a destructive action
        #[arg(long)]
        yes: bool,
    },
    /// Manage pinned resources
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },
    /// Make a subscription the CLI default
    Default {
        /// Subscription id
        id: String,
    },
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorites in insertion order
    List,
    /// Pin a resource by id
    Add { id: String },
    /// Unpin a resource by id
    Remove { id: String },
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        match AzureError::classify(&e) {
            Some(az) => eprintln!("{}\n  {}", az.title(), az.remediation()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Init = cli.command {
        let (path, created) = Settings::write_default()?;
        if created {
            println!("Wrote {}", path.display());
        } else {
            println!("{} already exists", path.display());
        }
        return Ok(());
    }

    let settings = Settings::load()?;
    let app = NimbusApp::new(settings)?;

    match cli.command {
        Commands::Init => {}
        Commands::Subscriptions => {
            for sub in app.start()? {
                let marker = if sub.is_default { "*" } else { " " };
                println!("{} {}  {}  ({})", marker, sub.id, sub.name, sub.state);
            }
        }
        Commands::Search {
            text,
            subscription,
            resource_type,
            location,
        } => {
            app.start()?;
            let response = app.search(
                &text,
                subscription.as_deref(),
                FieldFilter::parse(&resource_type),
                FieldFilter::parse(&location),
            )?;

            print_summaries(&app.summarize(&response.outcome.resources));
            if response.outcome.is_truncated() {
                println!(
                    "Showing {} of {} matches",
                    response.outcome.resources.len(),
                    response.outcome.total_matches
                );
            }
        }
        Commands::Open { id, no_browser } => {
            let resource = app.find_resource(&ResourceId::new(id))?;
            let url = if no_browser {
                app.actions.open_in_portal(&resource)?
            } else {
                app.actions.launch_in_browser(&resource)?
            };
            println!("{}", url);
        }
        Commands::Home => {
            let view = app.home();
            println!("Recent:");
            for item in &view.recent {
                println!(
                    "  {}  {}",
                    item.accessed_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
                    item.resource.name
                );
            }
            println!("Favorites:");
            print_summaries(&view.favorites);
        }
        Commands::History { clear, yes } => {
            if clear {
                let Some(confirmation) = Confirmation::from_answer(yes) else {
                    bail!("Refusing to clear history without --yes");
                };
                app.actions.clear_history(confirmation)?;
                println!("History cleared");
            } else {
                for entry in app.history().list() {
                    println!(
                        "{}  {}  {}",
                        entry.accessed_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M"),
                        entry.resource.name,
                        entry.resource.id
                    );
                }
            }
        }
        Commands::Favorites { action } => match action.unwrap_or(FavoritesAction::List) {
            FavoritesAction::List => {
                print_summaries(&app.summarize(&app.favorites().list()));
            }
            FavoritesAction::Add { id } => {
                let resource = app.find_resource(&ResourceId::new(id))?;
                if app.favorites().add(resource.clone())? {
                    println!("Pinned {}", resource.name);
                } else {
                    println!("{} is already pinned", resource.name);
                }
            }
            FavoritesAction::Remove { id } => {
                if !app.favorites().remove(&ResourceId::new(id.clone()))? {
                    println!("{} is not pinned", id);
                }
            }
        },
        Commands::Default { id } => {
            app.start()?;
            app.actions
                .set_default_subscription(&SubscriptionId::new(id.clone()))?;
            println!("Default subscription set to {}", id);
        }
    }

    Ok(())
}

fn print_summaries(summaries: &[ResourceSummary]) {
    for summary in summaries {
        let star = if summary.is_favorite { "★" } else { " " };
        println!(
            "{} {:<40} {:<24} {:<16} {}",
            star,
            summary.name,
            summary.short_type,
            summary.location,
            summary.subscription_name.as_deref().unwrap_or("")
        );
    }
}
