use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use console::style;

use vdiforge_fetch::{Fetcher, Progress, ReqwestClient};
use vdiforge_manifest::{Keyring, decode_key_id};

use vdiforge::cli::App;
use vdiforge::pipeline::{Pipeline, PipelineConfig};
use vdiforge::release::{self, Channel, ReleaseNames};
use vdiforge::ui::DownloadBar;
use vdiforge::{convert, unpack};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let app = App::parse();
    match run(app).await {
        Ok(vdi_path) => {
            println!(
                "{} VDI image created at {}",
                style("Success!").green().bold(),
                vdi_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {err:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(app: App) -> anyhow::Result<PathBuf> {
    // Fail before any network traffic if the conversion tool is missing.
    let vboxmanage = convert::find_vboxmanage()?;

    let channel = Channel::parse(&app.channel);
    let base_url = channel.base_url();
    let names = ReleaseNames::new();
    let dest = match app.dest {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolve current directory")?,
    };
    let workdir = tempfile::Builder::new()
        .prefix("coreos")
        .tempdir_in(&dest)
        .context("create working directory")?;

    let trusted_key_id = decode_key_id(&app.key_id)?;
    println!(
        "Trusted key id {} is decimal {}",
        style(&app.key_id).cyan(),
        trusted_key_id
    );

    let fetcher = Fetcher::new(ReqwestClient::new());
    let key_bytes = fetcher
        .fetch_bytes(&app.key_url)
        .await
        .with_context(|| format!("fetch signing key from {}", app.key_url))?;
    let keyring = Keyring::from_armored(&key_bytes)?;

    // version.txt only names the output file; a missing one falls back to
    // the channel name rather than aborting a verifiable download.
    let vars = match fetcher.fetch_text(&format!("{base_url}/version.txt")).await {
        Ok(text) => release::parse_vars(&text),
        Err(err) => {
            tracing::warn!(%err, "version.txt unavailable, naming image after channel");
            Default::default()
        }
    };
    let vdi_path = dest.join(release::vdi_file_name(&vars, &channel));

    let artifact_path = workdir.path().join(&names.image);
    let pipeline = Pipeline::new(
        ReqwestClient::new(),
        PipelineConfig {
            manifest_url: format!("{base_url}/{}", names.digests),
            artifact_url: format!("{base_url}/{}", names.image),
            artifact_name: names.image.clone(),
            artifact_path: artifact_path.clone(),
            keyring,
            trusted_key_id,
        },
    );

    println!("downloading {}", names.image);
    let bar = DownloadBar::new();
    let observe = |progress: &Progress| bar.observe(progress);
    let report = pipeline.run(Some(&observe)).await?;
    bar.finish();

    println!(
        "{} DIGESTS signature valid, signed by trusted key {:016X}",
        style("ok").green(),
        report.signer_key_id
    );
    for check in &report.checks {
        println!(
            "{} {} digest for {} matches DIGESTS",
            style("ok").green(),
            check.algorithm,
            names.image
        );
    }

    let raw_path = workdir.path().join(release::RAW_IMAGE_NAME);
    println!("Writing {} to {}...", names.image, release::RAW_IMAGE_NAME);
    unpack::decompress_bz2(&artifact_path, &raw_path)
        .await
        .context("decompress image")?;

    println!("Converting {} to VirtualBox format...", release::RAW_IMAGE_NAME);
    convert::convert_to_vdi(&vboxmanage, &raw_path, &vdi_path).await?;

    Ok(vdi_path)
}
