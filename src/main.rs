use clap::{Arg, ArgMatches, Command};
use deeplx_web::mt::language::resolve_language;
use deeplx_web::mt::{
    DeepLWebProvider, MachineTranslator, MockMode, MockTranslator, TranslateOptions,
    truncate_source,
};
use deeplx_web::server::{self, DEFAULT_PORT, ServerConfig};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("deeplx")
        .version("0.1.0")
        .about("Translate through the DeepL web backend, or relay it over HTTP")
        .subcommand_required(true)
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .global(true)
                .help("Use mock translator instead of the web backend")
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("translate")
                .about("Translate a single text")
                .arg(
                    Arg::new("text")
                        .help("Text to translate (truncated to 1000 characters)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("target-lang")
                        .help("Target language code or English name (e.g. DE, EN-US, French)")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("source-lang")
                        .long("source")
                        .short('s')
                        .help("Source language code or name (default: auto)")
                        .default_value("auto"),
                )
                .arg(
                    Arg::new("tag-handling")
                        .long("tag-handling")
                        .short('t')
                        .help("Treat the text as html or xml")
                        .value_parser(["html", "xml"]),
                )
                .arg(
                    Arg::new("verbose")
                        .long("verbose")
                        .short('v')
                        .help("Show request details and alternatives")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP relay")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .help("Address to bind")
                        .default_value("127.0.0.1"),
                )
                .arg(
                    Arg::new("port")
                        .long("port")
                        .short('p')
                        .help("Port to listen on")
                        .value_parser(clap::value_parser!(u16))
                        .default_value("1188"),
                )
                .arg(
                    Arg::new("token")
                        .long("token")
                        .help("Access token required from clients (default: $DEEPLX_TOKEN)"),
                ),
        )
}

fn translator(use_mock: bool) -> Result<Arc<dyn MachineTranslator>, Box<dyn std::error::Error>> {
    if use_mock {
        return Ok(Arc::new(MockTranslator::new(MockMode::Suffix)));
    }
    Ok(Arc::new(DeepLWebProvider::from_env()?))
}

async fn run_translate(
    matches: &ArgMatches,
    use_mock: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = matches.get_one::<String>("text").map(String::as_str).unwrap_or_default();
    let text = truncate_source(text);
    let target_lang = resolve_language(
        matches
            .get_one::<String>("target-lang")
            .map(String::as_str)
            .unwrap_or_default(),
    );
    let source_lang = resolve_language(
        matches
            .get_one::<String>("source-lang")
            .map(String::as_str)
            .unwrap_or("auto"),
    );
    let options = TranslateOptions {
        tag_handling: matches.get_one::<String>("tag-handling").cloned(),
    };
    let verbose = matches.get_flag("verbose");

    let translator = translator(use_mock)?;
    if verbose {
        println!("📝 Source: \"{}\"", text);
        println!("🌍 {} → {}", source_lang, target_lang);
        println!("🔌 Provider: {}", translator.provider_name());
        println!();
    }

    let result = translator
        .translate(text, &source_lang, &target_lang, &options)
        .await?;

    if !result.is_success() {
        let message = result.message.unwrap_or_default();
        eprintln!("❌ {} ({})", message, result.code);
        return Err(message.into());
    }

    println!("{}", result.data);
    if verbose {
        println!();
        println!("🔑 Request ID: {} ({})", result.id, result.method);
        println!("🔎 Source language: {}", result.source_lang);
        for (i, alternative) in result.alternatives.iter().enumerate() {
            println!("   [{}] \"{}\"", i, alternative);
        }
    }
    Ok(())
}

async fn run_serve(matches: &ArgMatches, use_mock: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig {
        host: matches
            .get_one::<String>("host")
            .cloned()
            .unwrap_or_else(|| ServerConfig::default().host),
        port: matches.get_one::<u16>("port").copied().unwrap_or(DEFAULT_PORT),
        token: matches
            .get_one::<String>("token")
            .cloned()
            .or_else(|| env::var("DEEPLX_TOKEN").ok())
            .filter(|t| !t.is_empty()),
    };

    server::serve(config, translator(use_mock)?).await?;
    Ok(())
}

/// `RUST_LOG` when set and valid, `info` otherwise
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();

    let matches = cli().get_matches();
    let use_mock = matches.get_flag("mock");

    match matches.subcommand() {
        Some(("translate", sub)) => run_translate(sub, use_mock).await,
        Some(("serve", sub)) => run_serve(sub, use_mock).await,
        _ => unreachable!("subcommand_required is set"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn test_translate_args() {
        let matches = cli()
            .try_get_matches_from(["deeplx", "translate", "hello", "German", "-s", "EN", "-t", "html"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "translate");
        assert_eq!(sub.get_one::<String>("text").unwrap(), "hello");
        assert_eq!(sub.get_one::<String>("tag-handling").unwrap(), "html");
        assert_eq!(
            resolve_language(sub.get_one::<String>("target-lang").unwrap()),
            "DE"
        );
    }

    #[test]
    fn test_serve_defaults() {
        let matches = cli().try_get_matches_from(["deeplx", "serve"]).unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<u16>("port").copied(), Some(DEFAULT_PORT));
        assert_eq!(sub.get_one::<String>("host").unwrap(), "127.0.0.1");
    }

    #[test]
    fn test_rejects_unknown_tag_handling() {
        let result = cli().try_get_matches_from(["deeplx", "translate", "hi", "DE", "-t", "pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_filter_honours_rust_log() {
        // One test owns RUST_LOG so the two cases cannot race
        // SAFETY: no other test in this binary touches the environment
        unsafe { env::set_var("RUST_LOG", "deeplx_web=debug") };
        assert_eq!(env_filter().to_string(), "deeplx_web=debug");

        unsafe { env::remove_var("RUST_LOG") };
        assert_eq!(env_filter().to_string(), "info");
    }

    #[test]
    fn test_global_mock_flag() {
        let matches = cli()
            .try_get_matches_from(["deeplx", "translate", "--mock", "hi", "DE"])
            .unwrap();
        assert!(matches.get_flag("mock"));
    }
}
