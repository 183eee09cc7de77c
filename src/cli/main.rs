use clap::{Parser, Subcommand};
use pawsight::models::{IncidentRecord, Preset, Priority};
use pawsight::schema::{self, FieldKind, FEATURE_SCHEMA};
use pawsight::triage::display_severity;
use pawsight::{canonical_flag, recommended_action};
use reqwest::Client;
use serde_json::{json, Value};
use std::error::Error;

#[derive(Parser)]
#[command(name = "pawsight-cli")]
#[command(about = "PAWSIGHT incident triage CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health
    Health,

    /// Score an incident record
    Predict {
        /// JSON file holding the 21-field record
        #[arg(short, long, conflicts_with = "preset", required_unless_present = "preset")]
        file: Option<String>,

        /// Start from a quick-fill scenario: low, medium or high
        #[arg(short, long)]
        preset: Option<Preset>,

        /// Override a field, e.g. `--set bleeding=1` (repeatable)
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        overrides: Vec<String>,
    },

    /// Evaluate the recommended-action rule locally
    Action {
        #[arg(short, long)]
        priority: Priority,

        #[arg(short, long)]
        severity: f64,
    },

    /// Print the feature schema in model column order
    Schema,

    /// Show the models loaded by the server
    Models,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Predict {
            file,
            preset,
            overrides,
        } => {
            let mut record: Value = match (file, preset) {
                (Some(path), _) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
                (None, Some(preset)) => serde_json::to_value(IncidentRecord::preset(preset))?,
                (None, None) => return Err("either --file or --preset is required".into()),
            };

            for item in &overrides {
                apply_override(&mut record, item)?;
            }

            let response = client
                .post(format!("{}/predict", cli.endpoint))
                .json(&record)
                .send()
                .await?;

            let status = response.status();
            let body: Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);

            if !status.is_success() {
                return Err(format!("prediction failed with status {}", status).into());
            }
        }

        Commands::Action { priority, severity } => {
            let action = recommended_action(priority, severity);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "priority": priority,
                    "severity": display_severity(severity),
                    "recommended_action": action,
                }))?
            );
        }

        Commands::Schema => {
            for spec in FEATURE_SCHEMA.iter() {
                let domain = match spec.kind {
                    FieldKind::Categorical { known } if known.is_empty() => "text".to_string(),
                    FieldKind::Categorical { known } => known.join(" | "),
                    FieldKind::Bounded { min, max } => format!("{}..={}", min, max),
                    FieldKind::Flag => "0 | 1".to_string(),
                };
                println!("{:<20} {}", spec.name, domain);
            }
        }

        Commands::Models => {
            let response = client
                .get(format!("{}/v1/models", cli.endpoint))
                .send()
                .await?;

            let body: Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

/// Apply a `FIELD=VALUE` override. Flags go through the server's own 0/1
/// canonicalization so bad values fail here instead of being coerced.
fn apply_override(record: &mut Value, item: &str) -> Result<(), Box<dyn Error>> {
    let (name, raw) = item
        .split_once('=')
        .ok_or_else(|| format!("override `{}` must look like FIELD=VALUE", item))?;

    let spec = schema::field(name).ok_or_else(|| format!("unknown field `{}`", name))?;

    let value = match spec.kind {
        FieldKind::Categorical { .. } => json!(raw),
        FieldKind::Flag => json!(canonical_flag(spec.name, raw.parse::<i64>()?)?),
        FieldKind::Bounded { .. } => json!(raw.parse::<i64>()?),
    };

    let object = record
        .as_object_mut()
        .ok_or("incident record must be a JSON object")?;
    object.insert(spec.name.to_string(), value);
    Ok(())
}
