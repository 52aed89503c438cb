mod contact;
mod decode;
mod fetch;
mod filter;
mod loader;
mod record;
mod source;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::Config;
use serde::Deserialize;
use tracing::{info, warn};

use decode::DecodeOptions;
use fetch::HttpFetcher;
use filter::StatusClass;
use loader::{CatalogCache, FetchText};
use record::{AgeBracket, AnimalRecord, CatalogSnapshot};

#[derive(Parser)]
#[command(
    name = "refuge_catalog",
    about = "Catalogue d'adoption du refuge, chargé depuis le tableur partagé"
)]
struct Cli {
    /// Share link of the source spreadsheet (overrides REFUGE_SOURCE_URL)
    #[arg(long, global = true)]
    url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the adoption cards, optionally filtered
    Show {
        /// Exact species filter, e.g. "Chien" (default: all)
        #[arg(short, long)]
        species: Option<String>,
        /// Age bracket filter, e.g. "Jeune adulte" (default: all)
        #[arg(short, long)]
        age: Option<String>,
        /// Drop rows with a blank name
        #[arg(long)]
        skip_unnamed: bool,
        /// Ignore the cached snapshot and fetch again
        #[arg(long)]
        refresh: bool,
    },
    /// List the filter options derived from the catalog
    Options,
    /// Counts per species, age bracket and status
    Stats,
}

#[derive(Debug, Deserialize)]
struct Settings {
    /// Share link of the source spreadsheet.
    source_url: Option<String>,
    #[serde(default = "default_ttl_secs")]
    cache_ttl_secs: u64,
    contact_phone: Option<String>,
    contact_email: Option<String>,
}

fn default_ttl_secs() -> u64 {
    300
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            source_url: None,
            cache_ttl_secs: default_ttl_secs(),
            contact_phone: None,
            contact_email: None,
        }
    }
}

fn load_settings() -> Settings {
    Config::builder()
        .add_source(config::Environment::with_prefix("REFUGE").try_parsing(true))
        .build()
        .and_then(|c| c.try_deserialize())
        .unwrap_or_else(|err| {
            warn!(error = %err, "could not read settings, using defaults");
            Settings::default()
        })
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = load_settings();

    let Some(share_link) = cli.url.clone().or_else(|| settings.source_url.clone()) else {
        println!("Aucune source de données configurée.");
        println!("Renseignez REFUGE_SOURCE_URL avec le lien de partage du tableur, ou passez --url.");
        return Ok(());
    };
    let export_url = source::resolve(&share_link);
    info!(url = %export_url, ttl_secs = settings.cache_ttl_secs, "source resolved");

    let mut decode_opts = DecodeOptions::default();
    let mut refresh = false;
    if let Commands::Show {
        skip_unnamed,
        refresh: force,
        ..
    } = &cli.command
    {
        decode_opts.skip_unnamed = *skip_unnamed;
        refresh = *force;
    }

    let fetcher = HttpFetcher::new()?;
    let mut cache = CatalogCache::new(Duration::from_secs(settings.cache_ttl_secs), decode_opts);
    let snapshot = load_or_empty(&mut cache, &fetcher, &export_url, refresh);

    match cli.command {
        Commands::Show { species, age, .. } => {
            println!("Refuge de Douai");
            println!("Nos animaux à l'adoption");
            println!("========================\n");
            let species_sel = species.as_deref().unwrap_or(filter::TOUS);
            let bracket_sel = age.as_deref().unwrap_or(filter::TOUS);
            print_cards(&snapshot, species_sel, bracket_sel, &settings);
        }
        Commands::Options => {
            println!("Espèces : {}", filter::species_options(&snapshot).join(", "));
            println!("Tranches d'âge : {}", filter::bracket_options(&snapshot).join(", "));
        }
        Commands::Stats => print_stats(&snapshot),
    }
    Ok(())
}

/// The fail-soft policy of the pipeline: a load failure is logged, shown as
/// a notice, and rendering carries on with an empty catalog.
fn load_or_empty(
    cache: &mut CatalogCache,
    fetcher: &dyn FetchText,
    url: &str,
    refresh: bool,
) -> Arc<CatalogSnapshot> {
    let result = if refresh {
        cache.refresh(fetcher, url)
    } else {
        cache.load(fetcher, url)
    };
    match result {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(url, error = %err, "catalog load failed, rendering empty catalog");
            println!("Impossible de charger le catalogue ({err}).\n");
            Arc::new(CatalogSnapshot::empty())
        }
    }
}

fn print_cards(
    snapshot: &CatalogSnapshot,
    species_sel: &str,
    bracket_sel: &str,
    settings: &Settings,
) {
    let visible = filter::filter_records(snapshot, species_sel, bracket_sel);
    if visible.is_empty() {
        println!("Aucun animal ne correspond à ces critères.");
        return;
    }
    for &record in &visible {
        print_card(record, settings);
    }
    println!("{}", "-".repeat(58));
    println!("{} animaux affichés ({} au catalogue)", visible.len(), snapshot.len());
}

fn print_card(record: &AnimalRecord, settings: &Settings) {
    let name = if record.name.is_empty() {
        "(sans nom)"
    } else {
        record.name.as_str()
    };
    let badge = filter::status_class(&record.status).label();

    println!("{}", "-".repeat(58));
    println!("{name}  [{badge}]");

    let mut details = Vec::new();
    if let Some(species) = &record.species {
        details.push(format!("Espèce : {species}"));
    }
    if !record.age_raw.is_empty() {
        details.push(format!("Âge : {}", record.age_raw));
    }
    details.push(record.age_bracket.label().to_string());
    if !record.sex.is_empty() {
        details.push(format!("Sexe : {}", record.sex));
    }
    println!("{}", details.join(" | "));

    if !record.arrival_date.is_empty() {
        println!("Au refuge depuis : {}", record.arrival_date);
    }
    println!("Photo : {}", filter::photo_display_url(&record.photo));
    if !record.description.is_empty() {
        println!("{}", record.description);
    }
    if !record.story.is_empty() {
        println!("Histoire : {}", record.story);
    }
    if let Some(phone) = &settings.contact_phone {
        println!("Appeler : {}", contact::tel_link(phone));
    }
    if let Some(email) = &settings.contact_email {
        println!("Écrire : {}", contact::mailto_link(email, &record.name));
    }
}

fn print_stats(snapshot: &CatalogSnapshot) {
    if snapshot.is_empty() {
        println!("Catalogue vide.");
        return;
    }
    println!("{} animaux au catalogue\n", snapshot.len());

    println!("Par espèce :");
    for species in filter::species_options(snapshot).iter().skip(1) {
        let n = filter::filter_records(snapshot, species, filter::TOUS).len();
        println!("  {:<16} {:>4}", species, n);
    }
    let unnamed_species = snapshot
        .records()
        .iter()
        .filter(|r| r.species.is_none())
        .count();
    if unnamed_species > 0 {
        println!("  {:<16} {:>4}", "(non renseignée)", unnamed_species);
    }

    println!("\nPar tranche d'âge :");
    for bracket in AgeBracket::ALL {
        let n = snapshot
            .records()
            .iter()
            .filter(|r| r.age_bracket == bracket)
            .count();
        if n > 0 {
            println!("  {:<16} {:>4}", bracket.label(), n);
        }
    }

    println!("\nPar statut :");
    for class in [
        StatusClass::Urgent,
        StatusClass::Reserved,
        StatusClass::Adopted,
        StatusClass::Available,
    ] {
        let n = snapshot
            .records()
            .iter()
            .filter(|r| filter::status_class(&r.status) == class)
            .count();
        if n > 0 {
            println!("  {:<16} {:>4}", class.label(), n);
        }
    }
}
