use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use thingbook::{HttpThingClient, Thing, ThingApi, ThingForm, ValidatorConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thingctl")]
#[command(about = "Command-line client for a thingbook server")]
struct Cli {
    /// Backend root URL
    #[arg(long, default_value = "http://localhost:8080/")]
    server: String,
    /// Quiet period before the name check is sent
    #[arg(long, default_value_t = 300)]
    debounce_ms: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    List,
    Get {
        id: i32,
    },
    /// Asks whether a name is free for the Thing with `id`
    Check {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0)]
        id: i32,
    },
    /// Saves through the edit form: validated locally, then revalidated by the server
    Save {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value_t = 0)]
        id: i32,
    },
    Remove {
        id: i32,
    },
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
    let api: Arc<dyn ThingApi> =
        Arc::new(HttpThingClient::new(&cli.server).context("failed to build HTTP client")?);
    let config = ValidatorConfig::default().debounce(Duration::from_millis(cli.debounce_ms));

    match cli.command {
        Command::List => {
            for thing in api.get_things().await? {
                print_thing(&thing);
            }
            Ok(())
        }
        Command::Get { id } => match api.get_thing(id).await? {
            Some(thing) => {
                print_thing(&thing);
                Ok(())
            }
            None => Err(anyhow!("thing {id} not found")),
        },
        Command::Check { name, id } => {
            let probe = Thing::new(name, "").with_id(id);
            let unique = api.check_name_unique(&probe).await?;
            println!("{}", if unique { "available" } else { "taken" });
            Ok(())
        }
        Command::Save {
            name,
            description,
            id,
        } => save(api, &config, id, name, description).await,
        Command::Remove { id } => {
            let removed = api.remove(id).await?;
            println!("removed {removed}");
            Ok(())
        }
    }
}

async fn save(
    api: Arc<dyn ThingApi>,
    config: &ValidatorConfig,
    id: i32,
    name: String,
    description: Option<String>,
) -> Result<()> {
    let existing = if id > 0 {
        api.get_thing(id)
            .await?
            .ok_or_else(|| anyhow!("thing {id} not found"))?
    } else {
        Thing::default()
    };

    let description = description.unwrap_or_else(|| existing.description.clone());
    let mut form = ThingForm::open(existing, api, config);
    form.set_name(name);
    form.set_description(description);
    form.settled().await;

    if !form.is_submittable() {
        let messages = form
            .name_messages()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(anyhow!("cannot save: {messages}"));
    }

    match form.submit().await? {
        Some(saved) => {
            print_thing(&saved);
            Ok(())
        }
        None => Err(anyhow!("form became unsubmittable before saving")),
    }
}

fn print_thing(thing: &Thing) {
    if thing.description.is_empty() {
        println!("{:>5}  {}", thing.id, thing.name);
    } else {
        println!("{:>5}  {}  ({})", thing.id, thing.name, thing.description);
    }
}
