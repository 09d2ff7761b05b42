//! Command-line interface for idea-rs
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//!
//! # One idea
//! idea "Beat the ImageNet top-1 baseline with a 5M parameter model"
//!
//! # One idea per input line
//! cat goals.txt | idea
//! ```

use clap::Parser;
use idea_agent::{IdeaAgent, IdeaConfig};
use idea_llm::providers::OpenAIConfig;
use idea_llm::{API_KEY_ENV, Credential};
use idea_utils::Settings;
use std::ffi::OsString;
use std::io::{self, IsTerminal, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "idea")]
#[command(about = "Generate creative research ideas with an LLM", long_about = None)]
struct Args {
    /// Research goal; goals are read line by line from stdin when omitted
    prompt: Option<String>,

    /// API key (falls back to OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API (falls back to OPENAI_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Model name (falls back to IDEA_MODEL, then gpt-4o)
    #[arg(long)]
    model: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum tokens to generate
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Request timeout in seconds (falls back to IDEA_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,

    /// Report failures as errors instead of printing an [ERROR] line
    #[arg(long)]
    strict: bool,

    /// Refuse to start without an API key
    #[arg(long)]
    require_key: bool,
}

/// Parse arguments, then read settings through `lookup`
///
/// Arguments come first so `--help` works even with a malformed setting.
fn load<I, T, F>(argv: I, lookup: F) -> anyhow::Result<(Args, Settings)>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: Fn(&str) -> Option<String>,
{
    let args = Args::try_parse_from(argv)?;
    let settings = Settings::from_lookup(lookup)?;
    Ok((args, settings))
}

/// Merge flags over environment settings; flags win
fn build_configs<F>(
    args: &Args,
    settings: &Settings,
    lookup: F,
) -> anyhow::Result<(OpenAIConfig, IdeaConfig)>
where
    F: FnOnce(&str) -> Option<String>,
{
    let credential = Credential::resolve_with(args.api_key.clone(), lookup);
    if args.require_key && credential.is_none() {
        anyhow::bail!("No API key: pass --api-key or set {API_KEY_ENV}");
    }

    let mut openai = OpenAIConfig::default().with_optional_api_key(credential);
    if let Some(api_base) = args.api_base.as_ref().or(settings.api_base.as_ref()) {
        openai = openai.with_api_base(api_base);
    }
    if let Some(timeout) = args.timeout.or(settings.timeout_secs) {
        openai = openai.with_timeout(timeout);
    }

    let mut config = IdeaConfig::default();
    if let Some(model) = args.model.as_ref().or(settings.model.as_ref()) {
        config = config.with_model(model);
    }
    if let Some(temperature) = args.temperature {
        config = config.with_temperature(temperature);
    }
    if let Some(max_tokens) = args.max_tokens {
        config = config.with_max_tokens(max_tokens);
    }

    Ok((openai, config))
}

/// One line of output for `prompt`
///
/// In strict mode a failure is returned as the typed error; otherwise it is
/// folded into the `[ERROR]` line.
async fn idea_line(agent: &IdeaAgent, prompt: &str, strict: bool) -> idea_agent::Result<String> {
    if strict {
        agent.generate_idea(prompt).await
    } else {
        Ok(agent.generate_idea_text(prompt).await)
    }
}

/// Read goals from `input` until EOF or `exit`
async fn run_repl<R>(
    agent: &IdeaAgent,
    input: R,
    strict: bool,
    interactive: bool,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut stdout = io::stdout();

    loop {
        if interactive {
            print!(">>> ");
            stdout.flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let goal = line.trim();
        if goal.is_empty() {
            continue;
        }
        if goal == "exit" {
            break;
        }

        // Keep going after a failed goal
        match idea_line(agent, goal, strict).await {
            Ok(idea) => println!("{idea}"),
            Err(e) => eprintln!("Error: {e}"),
        }
        if interactive {
            println!();
        }
    }

    Ok(())
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (args, settings) = match load(std::env::args_os(), env_lookup) {
        Ok(loaded) => loaded,
        Err(e) => match e.downcast::<clap::Error>() {
            Ok(clap_error) => clap_error.exit(),
            Err(e) => return Err(e),
        },
    };
    idea_utils::init_tracing_with("warn,idea_cli=info", settings.log_format);

    let (openai, config) = build_configs(&args, &settings, env_lookup)?;

    info!(model = %config.model, api_base = %openai.api_base, "Starting idea generator");
    let agent = IdeaAgent::with_openai(openai, config)?;

    match args.prompt.as_deref() {
        Some(prompt) => {
            let idea = idea_line(&agent, prompt, args.strict).await?;
            println!("{idea}");
            Ok(())
        }
        None => {
            let interactive = io::stdin().is_terminal();
            run_repl(&agent, BufReader::new(tokio::io::stdin()), args.strict, interactive).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use idea_agent::ErrorKind;
    use idea_llm::{
        CompletionProvider, CompletionRequest, CompletionResponse, LLMError, Message, Role,
        StopReason, TokenUsage,
    };
    use mockall::mock;
    use std::sync::Arc;

    mock! {
        Provider {}

        #[async_trait]
        impl CompletionProvider for Provider {
            async fn complete(&self, request: CompletionRequest) -> idea_llm::Result<CompletionResponse>;
            fn name(&self) -> &str;
        }
    }

    fn reply(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: Some(text.to_string()),
            },
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn failing_agent(times: usize) -> IdeaAgent {
        let mut mock = MockProvider::new();
        mock.expect_complete()
            .times(times)
            .returning(|_| Err(LLMError::ProviderError("boom".to_string())));
        IdeaAgent::with_provider(Arc::new(mock), IdeaConfig::default())
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("idea").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--api-key", "sk-flag", "goal"]);
        let (openai, config) = build_configs(&args, &Settings::default(), no_env).unwrap();

        assert_eq!(args.prompt.as_deref(), Some("goal"));
        assert_eq!(openai.api_key, Some(Credential::new("sk-flag")));
        assert_eq!(openai.api_base, "https://api.openai.com/v1");
        assert_eq!(config, IdeaConfig::default());
    }

    #[test]
    fn test_flags_override_settings() {
        let settings = Settings {
            api_base: Some("http://env:1234/v1".to_string()),
            model: Some("env-model".to_string()),
            timeout_secs: Some(10),
            ..Settings::default()
        };
        let args = parse(&[
            "--api-key",
            "sk-flag",
            "--model",
            "flag-model",
            "--temperature",
            "0.4",
            "--max-tokens",
            "64",
        ]);

        let (openai, config) = build_configs(&args, &settings, no_env).unwrap();
        assert_eq!(openai.api_base, "http://env:1234/v1");
        assert_eq!(openai.timeout_secs, 10);
        assert_eq!(config.model, "flag-model");
        assert_eq!(config.temperature, 0.4);
        assert_eq!(config.max_tokens, 64);
        assert!(args.prompt.is_none());
    }

    #[test]
    fn test_strict_flags() {
        let args = parse(&["--strict", "--require-key", "goal"]);
        assert!(args.strict);
        assert!(args.require_key);
    }

    #[test]
    fn test_require_key_without_key_fails() {
        let args = parse(&["--require-key", "goal"]);
        let err = build_configs(&args, &Settings::default(), no_env).unwrap_err();
        assert!(err.to_string().contains("No API key"));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_require_key_accepts_env_key() {
        let args = parse(&["--require-key", "goal"]);
        let (openai, _) = build_configs(&args, &Settings::default(), |name| {
            (name == API_KEY_ENV).then(|| "sk-env".to_string())
        })
        .unwrap();
        assert_eq!(openai.api_key, Some(Credential::new("sk-env")));
    }

    #[test]
    fn test_missing_key_allowed_by_default() {
        let args = parse(&["goal"]);
        let (openai, _) = build_configs(&args, &Settings::default(), no_env).unwrap();
        assert!(openai.api_key.is_none());
    }

    #[test]
    fn test_help_ignores_bad_settings() {
        let bad = |name: &str| (name == "IDEA_LOG_FORMAT").then(|| "yaml".to_string());

        let err = load(["idea", "--help"], bad).unwrap_err();
        let clap_error = err.downcast::<clap::Error>().unwrap();
        assert_eq!(clap_error.kind(), clap::error::ErrorKind::DisplayHelp);

        let err = load(["idea", "goal"], bad).unwrap_err();
        assert!(err.downcast_ref::<idea_utils::ConfigError>().is_some());
    }

    #[test]
    fn test_load_reads_settings_after_args() {
        let (args, settings) = load(["idea", "--strict", "goal"], |name| {
            (name == "IDEA_MODEL").then(|| "env-model".to_string())
        })
        .unwrap();
        assert!(args.strict);
        assert_eq!(settings.model.as_deref(), Some("env-model"));
    }

    #[tokio::test]
    async fn test_strict_returns_typed_error() {
        let err = idea_line(&failing_agent(1), "goal", true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.detail(), "boom");
    }

    #[tokio::test]
    async fn test_lenient_prints_error_line() {
        let line = idea_line(&failing_agent(1), "goal", false).await.unwrap();
        assert_eq!(line, "[ERROR] Failed to generate idea: boom");
    }

    #[tokio::test]
    async fn test_repl_skips_blanks_and_stops_at_exit() {
        let mut mock = MockProvider::new();
        mock.expect_complete()
            .times(2)
            .returning(|_| Ok(reply("an idea")));
        let agent = IdeaAgent::with_provider(Arc::new(mock), IdeaConfig::default());

        let input: &[u8] = b"first goal\n\n   \nsecond goal\nexit\nnever sent\n";
        run_repl(&agent, input, false, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_repl_continues_after_strict_failure() {
        let input: &[u8] = b"one\ntwo";
        run_repl(&failing_agent(2), input, true, false).await.unwrap();
    }
}
