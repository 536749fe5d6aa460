use std::{num::NonZeroUsize, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    config::load_settings, ControllerOptions, HttpSpotApi, MutationOutcome, SpotController,
    SpotDraft, SpotPage,
};
use shared::domain::{DistrictId, SpotId};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "spot_admin", about = "Manage tourist spots through the admin REST API")]
struct Cli {
    /// Overrides `api_base_url` from spot_admin.toml and the environment.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long)]
        rows_per_page: Option<NonZeroUsize>,
        #[arg(long)]
        json: bool,
    },
    Districts,
    Create {
        #[command(flatten)]
        fields: SpotFields,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: SpotFields,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct SpotFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    latitude: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    longitude: Option<f64>,
    #[arg(long)]
    district_id: Option<String>,
}

impl SpotFields {
    fn apply(self, draft: &mut SpotDraft) {
        if let Some(name) = self.name {
            draft.set_name(name);
        }
        if let Some(description) = self.description {
            draft.set_description(description);
        }
        if let Some(latitude) = self.latitude {
            draft.set_latitude(latitude);
        }
        if let Some(longitude) = self.longitude {
            draft.set_longitude(longitude);
        }
        if let Some(district_id) = self.district_id {
            draft.set_district(DistrictId(district_id));
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(api_base_url) = cli.api_base_url {
        settings.api_base_url = api_base_url;
    }
    let api = HttpSpotApi::from_settings(&settings)?;
    tracing::info!(base_url = %api.base_url(), "using spot api");
    let controller = SpotController::with_options(Arc::new(api), ControllerOptions::from(&settings));

    controller
        .load_all()
        .await
        .context("failed to load spots and districts")?;

    match cli.command {
        Command::List {
            search,
            page,
            rows_per_page,
            json,
        } => {
            if let Some(rows_per_page) = rows_per_page {
                controller.set_rows_per_page(rows_per_page).await;
            }
            controller.set_search_term(search).await;
            controller.set_page(page).await;
            let page = controller.displayed_page().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&page.rows)?);
            } else {
                print_page(&page);
            }
        }
        Command::Districts => {
            for district in controller.districts().await {
                println!("{}\t{}", district.id, district.name);
            }
        }
        Command::Create { fields } => {
            controller.open_create().await;
            controller.edit_draft(|draft| fields.apply(draft)).await;
            finish(&controller, controller.save().await).await?;
        }
        Command::Update { id, fields } => {
            let id = SpotId(id);
            let Some(spot) = controller.find_spot(&id).await else {
                bail!("no spot with id {id}");
            };
            controller.open_edit(&spot).await;
            controller.edit_draft(|draft| fields.apply(draft)).await;
            finish(&controller, controller.save().await).await?;
        }
        Command::Delete { id } => {
            let id = SpotId(id);
            let Some(spot) = controller.find_spot(&id).await else {
                bail!("no spot with id {id}");
            };
            controller.open_delete(&spot).await;
            if let Some(prompt) = controller.dialog().await.delete_prompt() {
                println!("{prompt}");
            }
            finish(&controller, controller.delete_confirmed().await).await?;
        }
    }

    Ok(())
}

async fn finish(controller: &SpotController, outcome: MutationOutcome) -> Result<()> {
    if let Some(notification) = controller.notification().await {
        println!("[{:?}] {}", notification.severity, notification.message);
    }
    match outcome {
        MutationOutcome::Succeeded => Ok(()),
        MutationOutcome::Failed => bail!("backend rejected the change"),
        MutationOutcome::Busy => bail!("another change is still in flight"),
        MutationOutcome::Skipped => bail!("nothing to submit"),
    }
}

fn print_page(page: &SpotPage) {
    for spot in &page.rows {
        println!(
            "{:<12} {:<28} {:<32} {:>10.5} {:>10.5}  {}",
            spot.id.as_ref().map(SpotId::as_str).unwrap_or("-"),
            spot.name_or_empty(),
            spot.location_label(),
            spot.latitude,
            spot.longitude,
            spot.status_label(),
        );
    }
    println!(
        "{} (page {}/{})",
        page.range_label(),
        page.page + 1,
        page.page_count().max(1)
    );
}
