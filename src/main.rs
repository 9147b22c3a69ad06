//! 命令行入口：`qr-generator <query-string | @request.json> <output-file> [--settings <settings.json>]`

use qr_generator::error::AppError;
use qr_generator::qr_render::{QrService, RenderConfig, RenderSettings};

const USAGE: &str = "qr-generator <query-string | @request.json> <output-file> [--settings <settings.json>]";

struct CliArgs {
    request: String,
    output: String,
    settings: Option<String>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, AppError> {
    let mut positional = Vec::new();
    let mut settings = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "--settings" {
            let path = iter
                .next()
                .ok_or_else(|| AppError::Usage(format!("--settings 缺少文件路径\n{}", USAGE)))?;
            settings = Some(path.clone());
        } else {
            positional.push(arg.clone());
        }
    }

    match positional.as_slice() {
        [request, output] => Ok(CliArgs {
            request: request.clone(),
            output: output.clone(),
            settings,
        }),
        _ => Err(AppError::Usage(USAGE.to_string())),
    }
}

async fn run(args: CliArgs) -> Result<(), AppError> {
    let mut config = RenderConfig::default();
    if let Some(path) = &args.settings {
        let settings: RenderSettings = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        config.apply_settings(&settings)?;
        log::info!("⚙️ 已加载配置文件: {}", path);
    }

    let service = QrService::with_config(config);
    let output = match args.request.strip_prefix('@') {
        Some(path) => service.render_json(&std::fs::read_to_string(path)?).await?,
        None => service.render_query(&args.request).await?,
    };

    let content_type = output.content_type();
    let bytes = output.into_bytes();
    std::fs::write(&args.output, &bytes)?;

    log::info!(
        "✅ 已写入 {} ({}, {} bytes)",
        args.output,
        content_type,
        bytes.len()
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match parse_args(&args) {
        Ok(cli) => run(cli).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        log::error!("❌ {}", err);
        std::process::exit(1);
    }
}
