use dotenvy::dotenv;
use plantid_core::config::AnalysisSettings;
use plantid_transport_telegram::config::{BotSettings, TelegramSettings};
use plantid_transport_telegram::runner::run_bot;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "plantid_core=info,plantid_transport_telegram=info,plantid_telegram_bot=info,hyper=warn,h2=error,reqwest=warn,tokio=warn,teloxide=warn";

/// Secrets that must never reach the log output, with their replacements
struct RedactionPatterns {
    rules: Vec<(Regex, &'static str)>,
}

impl RedactionPatterns {
    /// Compile all patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        let rules = [
            (
                r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/['\s]*)",
                "$1[TELEGRAM_TOKEN]$3",
            ),
            (r"([0-9]{8,10}:[A-Za-z0-9_-]{35})", "[TELEGRAM_TOKEN]"),
            (r"(bot[0-9]{8,10}:)[A-Za-z0-9_-]+", "$1[TELEGRAM_TOKEN]"),
            (r"OPENAI_API_KEY=[^\s&]+", "OPENAI_API_KEY=[MASKED]"),
            (r"(Bearer\s+)[A-Za-z0-9._-]+", "$1[MASKED]"),
            (r"sk-[A-Za-z0-9_-]{8,}", "[OPENAI_KEY]"),
        ];

        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Ok((Regex::new(pattern)?, replacement)))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    fn redact(&self, input: &str) -> String {
        self.rules
            .iter()
            .fold(input.to_string(), |acc, (regex, replacement)| {
                regex.replace_all(&acc, *replacement).into_owned()
            })
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let redacted = self.patterns.redact(&String::from_utf8_lossy(buf));
        self.inner.write_all(redacted.as_bytes())?;
        // Report the caller's length; the redacted text may be shorter or longer.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: (self.make_inner)(),
            patterns: self.patterns.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    // Patterns first, so nothing is logged unredacted
    let patterns = Arc::new(RedactionPatterns::new().map_err(|e| {
        eprintln!("Failed to compile regex patterns: {e}");
        e
    })?);

    init_logging(patterns);

    info!("Starting PlantID Telegram bot...");

    let settings = init_settings();

    run_bot(settings).await;

    Ok(())
}

fn init_logging(patterns: Arc<RedactionPatterns>) {
    let make_writer = RedactingMakeWriter {
        make_inner: io::stderr,
        patterns,
    };

    let debug_mode = std::env::var("DEBUG_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    let default_filter = if debug_mode { "debug" } else { DEFAULT_LOG_FILTER };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();
}

fn init_settings() -> Arc<BotSettings> {
    let analysis_settings = match AnalysisSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load model configuration: {}", e);
            std::process::exit(1);
        }
    };
    let telegram_settings = match TelegramSettings::new() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load telegram configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Configuration loaded (model: {}, api base: {}).",
        analysis_settings.openai_vision_model, analysis_settings.openai_api_base
    );
    Arc::new(BotSettings::new(analysis_settings, telegram_settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> RedactionPatterns {
        RedactionPatterns::new().expect("patterns compile")
    }

    #[test]
    fn test_redacts_telegram_token_in_url() {
        let line = "GET https://api.telegram.org/bot123456789:AAEhBOweik6ad9r_QXMENQjcrGbqCr4K-ZU/getMe ";
        let redacted = patterns().redact(line);
        assert!(!redacted.contains("AAEhBOweik6ad9r"));
        assert!(redacted.contains("[TELEGRAM_TOKEN]"));
    }

    #[test]
    fn test_redacts_openai_key() {
        let redacted = patterns().redact("auth failed for sk-proj-abcdEFGH1234_xyz");
        assert_eq!(redacted, "auth failed for [OPENAI_KEY]");

        let redacted = patterns().redact("OPENAI_API_KEY=sk-abc123456789 loaded");
        assert_eq!(redacted, "OPENAI_API_KEY=[MASKED] loaded");
    }

    #[test]
    fn test_redacts_bearer_header() {
        let redacted = patterns().redact("authorization: Bearer abc.def-123");
        assert_eq!(redacted, "authorization: Bearer [MASKED]");
    }

    #[test]
    fn test_plain_text_untouched() {
        let line = "Handling photo request in chat 42";
        assert_eq!(patterns().redact(line), line);
    }

    #[test]
    fn test_writer_reports_original_length() {
        let mut out = Vec::new();
        let mut writer = RedactingWriter {
            inner: &mut out,
            patterns: Arc::new(patterns()),
        };
        let input = b"key sk-abcdefgh12345678\n";
        assert_eq!(writer.write(input).expect("write"), input.len());
        assert_eq!(String::from_utf8_lossy(&out), "key [OPENAI_KEY]\n");
    }
}
