use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thumbforge::{
    logger, AspectRatio, Config, DataUri, GenerationRequest, ThumbnailError, ThumbnailGenerator,
};

#[derive(Debug, Parser)]
#[command(name = "thumbforge", version, about = "Forge three YouTube thumbnail options at once")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate thumbnails from a video idea
    Text {
        prompt: String,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Generate thumbnails from a reference image and a description
    Image {
        file: PathBuf,
        description: String,
        #[command(flatten)]
        style: StyleArgs,
    },
    /// Store the Google AI API key used by later runs
    SetKey { api_key: String },
    /// Run the JSON HTTP server
    Serve,
}

#[derive(Debug, Args)]
struct StyleArgs {
    /// Text to render on the thumbnail
    #[arg(long = "text")]
    overlay: Option<String>,

    /// 1:1 square instead of 16:9 landscape
    #[arg(long)]
    square: bool,

    /// Directory the thumbnails are written to
    #[arg(long = "out", default_value = ".")]
    out_dir: PathBuf,
}

impl StyleArgs {
    fn aspect_ratio(&self) -> AspectRatio {
        if self.square {
            AspectRatio::Square
        } else {
            AspectRatio::Landscape
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env())?;
    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = Config::from_env();
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), config.port);
    logger::log_config_info(&config);

    match cli.command {
        Command::Serve => serve(config).await?,
        Command::SetKey { api_key } => {
            let thumbnails = ThumbnailGenerator::from_config(&config);
            thumbnails.credentials().set(&api_key).await?;
            log::info!("🔑 API key stored");
        }
        Command::Text { prompt, style } => {
            forge(&config, GenerationRequest::from_text(prompt), &style).await?;
        }
        Command::Image {
            file,
            description,
            style,
        } => {
            let bytes = std::fs::read(&file)?;
            let uri = DataUri::from_bytes(thumbforge::models::mime_from_path(&file), &bytes);
            let request = GenerationRequest::from_image(uri.to_string(), description);
            forge(&config, request, &style).await?;
        }
    }

    Ok(())
}

async fn forge(
    config: &Config,
    request: GenerationRequest,
    style: &StyleArgs,
) -> Result<(), ThumbnailError> {
    let request = request
        .with_overlay_text(style.overlay.clone())
        .with_aspect_ratio(style.aspect_ratio());
    let thumbnails = ThumbnailGenerator::from_config(config);

    match thumbnails.generate(&request).await {
        Ok(result) => {
            result.save_to_dir(&style.out_dir)?;
            log::info!("🎉 Your forged thumbnails are ready");
            Ok(())
        }
        Err(e) if e.is_invalid_credential() => {
            log::error!("❌ {}", e);
            log::warn!("💡 Run `thumbforge set-key <api-key>` with a key from https://aistudio.google.com/app/apikey");
            Err(e)
        }
        Err(e) => Err(e),
    }
}

#[cfg(feature = "server")]
async fn serve(config: Config) -> std::io::Result<()> {
    thumbforge::server::run(config).await
}

#[cfg(not(feature = "server"))]
async fn serve(_config: Config) -> std::io::Result<()> {
    log::error!("❌ This build has no HTTP server; rebuild with --features server");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_command_reads_style_flags() {
        let cli = Cli::try_parse_from([
            "thumbforge",
            "text",
            "a synthwave landscape",
            "--text",
            "NEW UPDATE!",
            "--square",
            "--out",
            "thumbs",
        ])
        .unwrap();

        let Command::Text { prompt, style } = cli.command else {
            panic!("expected the text command");
        };
        assert_eq!(prompt, "a synthwave landscape");
        assert_eq!(style.overlay.as_deref(), Some("NEW UPDATE!"));
        assert_eq!(style.aspect_ratio(), AspectRatio::Square);
        assert_eq!(style.out_dir, PathBuf::from("thumbs"));
    }

    #[test]
    fn defaults_to_landscape_in_the_working_directory() {
        let cli = Cli::try_parse_from(["thumbforge", "text", "a synthwave landscape"]).unwrap();

        let Command::Text { style, .. } = cli.command else {
            panic!("expected the text command");
        };
        assert_eq!(style.overlay, None);
        assert_eq!(style.aspect_ratio(), AspectRatio::Landscape);
        assert_eq!(style.out_dir, PathBuf::from("."));
    }

    #[test]
    fn misspelled_flag_is_rejected() {
        let err = Cli::try_parse_from(["thumbforge", "text", "--sqaure", "a synthwave landscape"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn image_command_takes_file_and_description() {
        let cli = Cli::try_parse_from([
            "thumbforge",
            "image",
            "me.jpg",
            "make it look like a comic book",
        ])
        .unwrap();

        let Command::Image {
            file, description, ..
        } = cli.command
        else {
            panic!("expected the image command");
        };
        assert_eq!(file, PathBuf::from("me.jpg"));
        assert_eq!(description, "make it look like a comic book");
    }

    #[test]
    fn set_key_requires_a_key() {
        assert!(Cli::try_parse_from(["thumbforge", "set-key"]).is_err());
        let cli = Cli::try_parse_from(["thumbforge", "set-key", "AIza-test"]).unwrap();
        assert!(matches!(cli.command, Command::SetKey { api_key } if api_key == "AIza-test"));
    }
}
