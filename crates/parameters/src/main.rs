//! `previx-parameters` -- command-line view of the Parameters page.
//!
//! Fetches both parameter datasets from the Prev-IX API, prints the selected
//! tab (wear coefficients grouped by category, subcategory and state;
//! construction costs as a list), and optionally runs the construction cost
//! calculator.
//!
//! # Environment variables
//!
//! | Variable                    | Required | Default                 | Description                          |
//! |-----------------------------|----------|-------------------------|--------------------------------------|
//! | `PREVIX_API_URL`            | no       | `http://localhost:8000` | API base URL                         |
//! | `PREVIX_ACCESS_TOKEN`       | no       | --                      | Bearer token (else the session file) |
//! | `PREVIX_SESSION_FILE`       | no       | `session.json`          | Session written at login             |
//! | `REQUEST_TIMEOUT_SECS`      | no       | `30`                    | HTTP timeout                         |
//! | `PREVIX_TAB`                | no       | `wear`                  | `wear` or `costs`                    |
//! | `PREVIX_SEARCH`             | no       | --                      | Search applied to the tab            |
//! | `PREVIX_SURFACE`            | no       | --                      | Runs the calculator when set (m²)    |
//! | `PREVIX_COST_CATEGORY`      | no       | `residential`           | Calculator category                  |
//! | `PREVIX_COST_TYPE`          | no       | --                      | Calculator construction type         |
//! | `PREVIX_COST_STRUCTURE`     | no       | first for the type      | Calculator structure                 |
//! | `PREVIX_COST_ENVELOPE`      | no       | first for the structure | Calculator envelope                  |

use std::time::Instant;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use previx_client::api::ParametersApi;
use previx_client::config::ClientConfig;
use previx_core::types::Dataset;
use previx_parameters::options::RunOptions;
use previx_parameters::page::ParametersPage;
use previx_parameters::report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "previx_parameters=info,previx_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env().context("Invalid client configuration")?;
    let options = RunOptions::from_env().context("Invalid options")?;
    let api = ParametersApi::new(&config).context("Failed to build HTTP client")?;

    tracing::info!(
        api_url = %config.api_url,
        tab = options.tab.label(),
        "Starting previx-parameters",
    );

    let mut page = ParametersPage::new(config.search_debounce());
    page.switch_tab(options.tab);
    if let Err(e) = page.load_all(&api).await {
        let message = page
            .status()
            .map(|s| s.text.clone())
            .unwrap_or_else(|| e.to_string());
        anyhow::bail!(message);
    }

    if let Some(search) = &options.search {
        let now = Instant::now();
        match options.tab {
            Dataset::WearCoefficients => page.set_wear_search(search.as_str(), now),
            Dataset::ConstructionCosts => page.set_cost_search(search.as_str(), now),
        }
        page.flush_searches();
    }

    match options.tab {
        Dataset::WearCoefficients => {
            print!("{}", report::render_wear_groups(page.wear_groups()));
        }
        Dataset::ConstructionCosts => {
            print!("{}", report::render_costs(page.filtered_costs()));
        }
    }

    if let Some(surface) = &options.surface {
        run_calculator(&mut page, &options, surface)?;
    }

    Ok(())
}

fn run_calculator(
    page: &mut ParametersPage,
    options: &RunOptions,
    surface: &str,
) -> anyhow::Result<()> {
    page.set_surface(surface);
    page.set_calc_category(Some(options.cost_category.unwrap_or_default()));

    let construction_type = match &options.cost_type {
        Some(value) => value.clone(),
        None => page
            .available_types()
            .into_iter()
            .next()
            .context("No construction cost available for this category")?,
    };
    page.set_calc_type(Some(&construction_type))?;
    if let Some(structure) = &options.cost_structure {
        page.set_calc_structure(Some(structure))?;
    }
    if let Some(envelope) = &options.cost_envelope {
        page.set_calc_envelope(Some(envelope))?;
    }

    let result = page.calculate()?;
    println!();
    print!("{}", report::render_result(result));
    Ok(())
}
