use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use dotenvy::dotenv;
use tracing::info;

mod catalog;
mod chat;
mod config;
mod design;
mod inference;
mod render;
mod server;
mod utils;

use catalog::Catalog;
use chat::ChatResponder;
use config::{CONFIG, FINISHES_SYSTEM_PROMPT, PHILOSOPHY_SYSTEM_PROMPT};
use design::{DesignGenerator, INVALID_INPUT_SENTINEL};
use inference::{HttpImageSynthesizer, HttpTextCompleter, ImageSynthesizer, TextCompleter};
use render::{RenderGenerator, RenderOptions};
use server::AppState;
use utils::logging::init_logging;

#[derive(Debug, PartialEq)]
enum CliCommand {
    Generate(GenerateArgs),
    ListOptions,
    Serve { port: u16 },
}

#[derive(Debug, PartialEq)]
struct GenerateArgs {
    style: String,
    space: String,
    size: String,
    colors: Vec<String>,
    output_dir: PathBuf,
    steps: u32,
    guidance: f32,
    no_render: bool,
}

fn usage() -> &'static str {
    "Usage:\n  cladding-studio --style <name> --space <name> --size <small|medium|large> --colors <a,b> [--output-dir <dir>] [--steps <n>] [--guidance <f>] [--no-render]\n  cladding-studio --list-options\n  cladding-studio serve [--port <n>]"
}

fn parse_cli(args: &[String]) -> Result<CliCommand> {
    if args.first().map(|value| value.as_str()) == Some("serve") {
        let mut port = CONFIG.server_port;
        let mut index = 1;
        while index < args.len() {
            match args[index].as_str() {
                "--port" => {
                    index += 1;
                    let value = args
                        .get(index)
                        .ok_or_else(|| anyhow!("Missing value for --port"))?;
                    port = value
                        .parse::<u16>()
                        .map_err(|_| anyhow!("Invalid --port value: {value}"))?;
                }
                other => bail!("Unknown serve argument: {other}\n{}", usage()),
            }
            index += 1;
        }
        return Ok(CliCommand::Serve { port });
    }

    let mut style: Option<String> = None;
    let mut space: Option<String> = None;
    let mut size: Option<String> = None;
    let mut colors: Vec<String> = Vec::new();
    let mut output_dir = CONFIG.output_dir.clone();
    let mut steps = CONFIG.render_steps;
    let mut guidance = CONFIG.render_guidance;
    let mut no_render = false;
    let mut list_options = false;

    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--style" => {
                index += 1;
                style = Some(
                    args.get(index)
                        .ok_or_else(|| anyhow!("Missing value for --style"))?
                        .clone(),
                );
            }
            "--space" => {
                index += 1;
                space = Some(
                    args.get(index)
                        .ok_or_else(|| anyhow!("Missing value for --space"))?
                        .clone(),
                );
            }
            "--size" => {
                index += 1;
                size = Some(
                    args.get(index)
                        .ok_or_else(|| anyhow!("Missing value for --size"))?
                        .clone(),
                );
            }
            "--colors" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --colors"))?;
                colors = value
                    .split(',')
                    .map(|color| color.trim().to_string())
                    .filter(|color| !color.is_empty())
                    .collect();
            }
            "--output-dir" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --output-dir"))?;
                output_dir = PathBuf::from(value);
            }
            "--steps" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --steps"))?;
                steps = value
                    .parse::<u32>()
                    .map_err(|_| anyhow!("Invalid --steps value: {value}"))?;
            }
            "--guidance" => {
                index += 1;
                let value = args
                    .get(index)
                    .ok_or_else(|| anyhow!("Missing value for --guidance"))?;
                guidance = value
                    .parse::<f32>()
                    .map_err(|_| anyhow!("Invalid --guidance value: {value}"))?;
            }
            "--no-render" => no_render = true,
            "--list-options" => list_options = true,
            "--help" | "-h" => bail!(usage()),
            other => bail!("Unknown argument: {other}\n{}", usage()),
        }
        index += 1;
    }

    if list_options {
        return Ok(CliCommand::ListOptions);
    }

    let style = style.ok_or_else(|| anyhow!("--style is required\n{}", usage()))?;
    let space = space.ok_or_else(|| anyhow!("--space is required\n{}", usage()))?;
    let size = size.ok_or_else(|| anyhow!("--size is required\n{}", usage()))?;

    Ok(CliCommand::Generate(GenerateArgs {
        style,
        space,
        size,
        colors,
        output_dir,
        steps,
        guidance,
        no_render,
    }))
}

fn text_completer(system_prompt: &str) -> Option<Arc<dyn TextCompleter>> {
    if !CONFIG.enable_text_model || CONFIG.text_api_key.trim().is_empty() {
        return None;
    }
    Some(Arc::new(HttpTextCompleter::new(
        CONFIG.text_api_base_url.clone(),
        CONFIG.text_api_key.clone(),
        CONFIG.text_model.clone(),
        system_prompt,
        CONFIG.text_temperature,
        CONFIG.text_max_tokens,
    )))
}

fn image_synthesizer() -> Arc<dyn ImageSynthesizer> {
    Arc::new(HttpImageSynthesizer::new(
        CONFIG.diffusion_base_url.clone(),
        CONFIG.diffusion_api_key.clone(),
    ))
}

fn build_app_state(catalog: Arc<Catalog>) -> AppState {
    let design = Arc::new(DesignGenerator::new(
        catalog.clone(),
        text_completer(PHILOSOPHY_SYSTEM_PROMPT),
    ));
    let render = Arc::new(RenderGenerator::new(image_synthesizer()));
    let responder = Arc::new(ChatResponder::new(
        catalog.clone(),
        text_completer(FINISHES_SYSTEM_PROMPT),
        design,
        Some(render),
    ));
    AppState { responder, catalog }
}

async fn run_generation(catalog: Arc<Catalog>, args: GenerateArgs) -> Result<()> {
    let design = DesignGenerator::new(catalog, text_completer(PHILOSOPHY_SYSTEM_PROMPT));

    info!(
        "Generating specification: style={}, space={}, size={}, colors=[{}]",
        args.style,
        args.space,
        args.size,
        args.colors.join(", ")
    );
    let specification = design
        .generate(&args.style, &args.space, &args.size, &args.colors)
        .await;
    if specification == INVALID_INPUT_SENTINEL {
        bail!("{INVALID_INPUT_SENTINEL}. Run with --list-options to see valid keys.");
    }

    let spec_dir = args.output_dir.join("specifications");
    tokio::fs::create_dir_all(&spec_dir).await?;
    let spec_path = spec_dir.join(format!("{}_{}_{}.txt", args.style, args.space, args.size));
    tokio::fs::write(&spec_path, &specification).await?;
    info!("Specification saved: {}", spec_path.display());

    if args.no_render {
        return Ok(());
    }

    let render = RenderGenerator::new(image_synthesizer());
    let options = RenderOptions {
        output_dir: args.output_dir.join("renders"),
        filename: Some(format!(
            "{}_{}_{}.png",
            args.style, args.space, args.size
        )),
        steps: args.steps,
        guidance: args.guidance,
    };
    let render_path = render
        .generate(&args.style, &args.space, &args.colors, &options)
        .await?;
    info!("Generation complete: {}", render_path.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let _guards = init_logging();

    let args: Vec<String> = std::env::args().collect();
    let command = parse_cli(&args[1..])?;

    let catalog = Arc::new(Catalog::load(&CONFIG.catalog_path)?);

    match command {
        CliCommand::ListOptions => {
            let options = catalog.options();
            println!("Styles: {}", options.styles.join(", "));
            println!("Spaces: {}", options.spaces.join(", "));
            println!("Sizes:  {}", options.sizes.join(", "));
            Ok(())
        }
        CliCommand::Serve { port } => {
            let state = build_app_state(catalog);
            server::run_server(state, &CONFIG.server_host, port).await
        }
        CliCommand::Generate(generate_args) => run_generation(catalog, generate_args).await,
    }
}
