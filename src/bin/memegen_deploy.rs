

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;

#[derive(Parser)]
#[clap(
    name = "memegen-deploy",
    about = "Deploy schema.hx and queries.hx to a HelixDB instance"
)]
struct DeployArgs {
    #[arg(short = 'H', long, env = "HELIX_HOST", default_value = "localhost", help = "HelixDB host")]
    host: String,

    #[arg(short, long, env = "HELIX_PORT", default_value_t = memegen::DEFAULT_HELIX_PORT, help = "HelixDB port")]
    port: u16,

    #[arg(short = 'd', long, default_value = "schema", help = "Directory holding schema.hx and queries.hx")]
    schema_dir: PathBuf,

    #[arg(long, conflicts_with = "queries_only", help = "Deploy only schema.hx")]
    schema_only: bool,

    #[arg(long, help = "Deploy only queries.hx")]
    queries_only: bool,
}

fn main() -> anyhow::Result<()> {
    let args = DeployArgs::parse();

    let schema_dir = locate_schema_dir(&args.schema_dir)?;
    let base_url = format!("http://{}:{}", args.host, args.port);

    println!("memegen schema deployment");
    println!("   Target: {}", base_url);
    println!("   Schema dir: {}", schema_dir.display());
    println!();

    let client = reqwest::blocking::Client::new();

    if !args.queries_only {
        upload(&client, &base_url, "schema", &schema_dir.join("schema.hx"))?;
    }
    if !args.schema_only {
        upload(&client, &base_url, "queries", &schema_dir.join("queries.hx"))?;
    }

    println!();
    println!("Deployment complete.");
    Ok(())
}

fn locate_schema_dir(requested: &Path) -> anyhow::Result<PathBuf> {
    if requested.is_dir() {
        return Ok(requested.to_path_buf());
    }

    let beside_exe = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("schema")));
    match beside_exe {
        Some(dir) if dir.is_dir() => Ok(dir),
        _ => bail!(
            "Schema directory not found: {} (try --schema-dir /path/to/schema)",
            requested.display()
        ),
    }
}

fn upload(client: &reqwest::blocking::Client, base_url: &str, endpoint: &str, file: &Path) -> anyhow::Result<()> {
    if !file.exists() {
        eprintln!("   {} not found, skipping", file.display());
        return Ok(());
    }

    println!("Deploying {}...", endpoint);
    let content = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;

    let response = client
        .post(format!("{}/{}", base_url, endpoint))
        .header("Content-Type", "text/plain")
        .body(content)
        .send()
        .with_context(|| format!("{endpoint} upload to {base_url}"))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        bail!("{} deployment failed: HTTP {}: {}", endpoint, status, body);
    }

    println!("   {} deployed", endpoint);
    Ok(())
}
