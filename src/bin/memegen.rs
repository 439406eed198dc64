

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use memegen::app::{FormInput, IpifyResolver, LocationChoices, Outcome, StatusKind, OTHER_LOCATION};
use memegen::llm::LlmProviderFactory;
use memegen::meme::{ImgflipCatalog, ImgflipRenderer};
use memegen::{HelixClient, HelixMemeStore, Intent, MemeApp, MemeConfig, MemeOrchestrator, MemeStore, MemoryStore};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use strum::IntoEnumIterator;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[clap(name = "memegen", about = "Big Red Button Meme Generator")]
struct CliArgs {
    #[arg(long, help = "TOML config file (default: ./memegen.toml when present)")]
    config: Option<PathBuf>,

    #[arg(long, help = "Keep locations and memes in memory instead of HelixDB")]
    ephemeral: bool,

    #[arg(long, help = "Tracing filter, e.g. \"debug\" or \"warn,memegen=debug\"")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let filter = match &args.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,memegen=info")),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = MemeConfig::load(args.config.as_deref())?;
    config.validate()?;

    let http = reqwest::Client::builder().timeout(config.http_timeout()).build()?;

    let store: Arc<dyn MemeStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        let client = HelixClient::from_config(&config);
        match client.queries_deployed().await {
            Ok(true) => {}
            Ok(false) => warn!("HelixDB queries are missing; run memegen-deploy first"),
            Err(e) => warn!("HelixDB at {} is not answering yet: {}", client.base_url(), e),
        }
        Arc::new(HelixMemeStore::new(client))
    };

    let orchestrator = MemeOrchestrator::new(
        LlmProviderFactory::from_config(&config)?,
        Arc::new(ImgflipCatalog::from_config(&config, http.clone())),
        Arc::new(ImgflipRenderer::from_config(&config, http.clone())),
        store,
    );
    let mut app = MemeApp::new(
        Arc::new(orchestrator),
        Arc::new(IpifyResolver::from_config(&config, http)),
        config.gallery_limit,
    );

    println!("{}", "Big Red Button Meme Generator".bright_cyan().bold());
    print_intents();
    println!("{}", "─".repeat(50).bright_black());

    let (gallery, warnings) = app.gallery_only().await;
    print_warnings(&warnings);
    print_gallery(&gallery);

    let mut rl = DefaultEditor::new()?;

    loop {
        let Some(line) = read(&mut rl, "action> ")? else {
            break;
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if matches!(trimmed, "exit" | "quit" | "q") {
            break;
        }

        let Some(intent) = parse_intent(trimmed) else {
            println!("{} {}", "Unknown action:".bright_red(), trimmed);
            print_intents();
            continue;
        };

        let form = if intent == Intent::GenerateNew {
            match read_form(&mut rl, &app).await? {
                Some(form) => form,
                None => break,
            }
        } else {
            FormInput::default()
        };

        if intent != Intent::Clear {
            println!("{}", "Generating...".bright_magenta());
        }
        let outcome = app.handle(intent, &form).await;
        print_outcome(&outcome);
        println!("{}", "─".repeat(50).bright_black());
    }

    println!("{}", "Goodbye!".bright_cyan());
    Ok(())
}

fn parse_intent(input: &str) -> Option<Intent> {
    if let Ok(n) = input.parse::<usize>() {
        return Intent::iter().nth(n.checked_sub(1)?);
    }
    input.parse().ok()
}

fn print_intents() {
    for (i, intent) in Intent::iter().enumerate() {
        println!(
            "  {} {} {}",
            format!("{})", i + 1).bright_black(),
            format!("{:<16}", intent.as_ref()).bright_green(),
            intent.describe()
        );
    }
    println!("  {}", "exit to quit".bright_black());
}

// None on Ctrl-C or Ctrl-D.
fn read(rl: &mut DefaultEditor, prompt: &str) -> anyhow::Result<Option<String>> {
    io::stdout().flush()?;
    match rl.readline(prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = rl.add_history_entry(line.trim());
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn read_form(rl: &mut DefaultEditor, app: &MemeApp) -> anyhow::Result<Option<FormInput>> {
    let (choices, warning) = app.location_choices().await;
    if let Some(warning) = warning {
        print_warnings(&[warning]);
    }
    print_locations(&choices);

    let Some(picked) = read(rl, "location> ")? else {
        return Ok(None);
    };
    let selected_location = pick_location(&choices, picked.trim());

    let custom_location = if selected_location == OTHER_LOCATION {
        match read(rl, "custom location> ")? {
            Some(custom) => custom,
            None => return Ok(None),
        }
    } else {
        String::new()
    };

    let Some(thought) = read(rl, "thought> ")? else {
        return Ok(None);
    };

    Ok(Some(FormInput { thought, selected_location, custom_location }))
}

fn pick_location(choices: &LocationChoices, input: &str) -> String {
    if input.is_empty() {
        return choices.initial.clone().unwrap_or_else(|| OTHER_LOCATION.to_string());
    }
    if let Some(option) = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| choices.options.get(i))
    {
        return option.clone();
    }
    input.to_string()
}

fn print_locations(choices: &LocationChoices) {
    println!("{}", "Select Location".bold());
    for (i, option) in choices.options.iter().enumerate() {
        let marker = if choices.initial.as_deref() == Some(option.as_str()) { "*" } else { " " };
        println!("  {}{} {}", marker.bright_green(), format!("{})", i + 1).bright_black(), option);
    }
}

fn print_outcome(outcome: &Outcome) {
    let status = match outcome.status.kind {
        StatusKind::Success => outcome.status.message.bright_green(),
        StatusKind::Info => outcome.status.message.bright_cyan(),
        StatusKind::Error => outcome.status.message.bright_red(),
    };
    println!("{status}");

    for notice in &outcome.notices {
        println!("{}", notice.green());
    }
    print_warnings(&outcome.warnings);

    if let Some(preview) = &outcome.preview {
        println!();
        println!("  {}", preview.image_url.bold().underline());
        println!("  {}", preview.thought.bold());
        println!("  Location: {}", preview.location);
        println!("  {}", format!("Template: {}", preview.template_name).bright_black());
    }

    print_gallery(&outcome.gallery);
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("{} {}", "Warning:".yellow(), warning);
    }
}

fn print_gallery(gallery: &[memegen::app::GalleryItem]) {
    println!();
    println!("{}", "Previous Memes".bold());
    if gallery.is_empty() {
        println!("  {}", "(none yet)".bright_black());
    }
    for item in gallery {
        println!("  {}", item.caption);
        println!("    {}", item.image_url.bright_blue());
    }
}
