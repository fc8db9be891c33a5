use crate::{
    Aggregator, AnalysisContext, Cli, Config, JsonReporter, LureError, OutputFormat, Reporter,
    Result, TerminalReporter, Verdict,
};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

const STDIN_LABEL: &str = "<stdin>";

/// Read and parse the analysis context named on the command line.
pub fn load_context(cli: &Cli) -> Result<AnalysisContext> {
    let (label, content) = match cli.input_path() {
        Some(path) => {
            let label = path.display().to_string();
            let content = fs::read_to_string(path).map_err(|e| LureError::ReadInput {
                path: label.clone(),
                source: e,
            })?;
            (label, content)
        }
        None => {
            let content = io::read_to_string(io::stdin()).map_err(|e| LureError::ReadInput {
                path: STDIN_LABEL.to_string(),
                source: e,
            })?;
            (STDIN_LABEL.to_string(), content)
        }
    };

    let context = parse_context(&label, &content)?;
    Ok(match &cli.channel {
        Some(channel) => context.with_channel(channel.as_str()),
        None => context,
    })
}

pub fn parse_context(label: &str, content: &str) -> Result<AnalysisContext> {
    serde_json::from_str(content).map_err(|e| LureError::ParseInput {
        path: label.to_string(),
        source: e,
    })
}

/// Load the explicit `--config` file, or search the current directory.
pub fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Ok(Config::from_file(path)?),
        None => Ok(Config::load(Some(Path::new(".")))),
    }
}

/// Build the aggregator from config plus command-line overrides.
pub fn build_aggregator(cli: &Cli, config: &Config) -> Result<Aggregator> {
    let mut aggregator = Aggregator::from_config(config)?;
    if let Some(combiner) = cli.combiner {
        aggregator = aggregator.with_combiner(combiner);
    }
    if cli.sequential {
        aggregator = aggregator.with_parallel(false);
    }
    debug!(
        modules = ?aggregator.module_ids(),
        combiner = %aggregator.combiner(),
        parallel = aggregator.is_parallel(),
        "Aggregator ready"
    );
    Ok(aggregator)
}

pub fn format_verdict(cli: &Cli, verdict: &Verdict) -> String {
    match cli.format {
        OutputFormat::Terminal => TerminalReporter::new(cli.verbose).report(verdict),
        OutputFormat::Json => JsonReporter::new().report(verdict),
    }
}

/// Evaluate one message end to end and return the rendered report.
pub fn run(cli: &Cli) -> Result<String> {
    let config = load_config(cli)?;
    let aggregator = build_aggregator(cli, &config)?;
    let context = load_context(cli)?;
    let verdict = aggregator.evaluate_all(&context);
    Ok(format_verdict(cli, &verdict))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::Combiner;
    use crate::types::ModuleId;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    const PHISH: &str = r#"{
        "channel": "sms",
        "modules": {
            "url": {"urls": ["https://bit.ly/abc"]},
            "content": {"body": "Act now: verify your account"}
        }
    }"#;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lure-scan").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_context() {
        let context = parse_context("test", PHISH).unwrap();
        assert_eq!(context.channel().as_str(), "sms");
        assert_eq!(context.url().unwrap().urls, vec!["https://bit.ly/abc"]);
        assert!(context.header().is_none());
    }

    #[test]
    fn test_parse_context_invalid() {
        let err = parse_context("bad.json", "{\"channel\": 5").unwrap_err();
        assert!(matches!(err, LureError::ParseInput { ref path, .. } if path == "bad.json"));
    }

    #[test]
    fn test_parse_context_keeps_wrongly_typed_slice() {
        let content = r#"{"channel":"sms","modules":{"url":{"urls":["https://bit.ly/x"]},"header":{"from":42}}}"#;
        let context = parse_context("message.json", content).unwrap();
        assert_eq!(context.url().unwrap().urls, vec!["https://bit.ly/x"]);
        assert!(context.modules().header.is_some());
        assert!(context.header().is_none());
    }

    #[test]
    fn test_load_context_with_channel_override() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("message.json");
        fs::write(&input, PHISH).unwrap();

        let cli = cli(&["--channel", "Slack", input.to_str().unwrap()]);
        let context = load_context(&cli).unwrap();
        assert_eq!(context.channel().as_str(), "slack");
    }

    #[test]
    fn test_load_context_missing_file() {
        let cli = cli(&["/nonexistent/message.json"]);
        assert!(matches!(
            load_context(&cli),
            Err(LureError::ReadInput { .. })
        ));
    }

    #[test]
    fn test_build_aggregator_overrides() {
        let cli = cli(&["--combiner", "max", "--sequential"]);
        let mut config = Config::default();
        config.disabled_modules = vec![ModuleId::Content];

        let aggregator = build_aggregator(&cli, &config).unwrap();
        assert_eq!(aggregator.combiner(), Combiner::Max);
        assert!(!aggregator.is_parallel());
        assert_eq!(aggregator.module_ids(), vec![ModuleId::Url, ModuleId::Header]);
    }

    #[test]
    fn test_run_json() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("message.json");
        let config = dir.path().join("lure.yaml");
        fs::write(&input, PHISH).unwrap();
        fs::write(&config, "aggregator:\n  combiner: sum\n").unwrap();

        let cli = cli(&[
            "--format",
            "json",
            "--config",
            config.to_str().unwrap(),
            input.to_str().unwrap(),
        ]);
        let output = run(&cli).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        // url 25 + content (urgency 15, credential 25) + channel (sms 10, shortener 5)
        assert_eq!(parsed["score"], 80);
        assert_eq!(parsed["modules"]["channel"]["score"], 15);
    }

    #[test]
    fn test_run_bad_config() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("lure.yaml");
        fs::write(&config, "disabled_modules: [channel]\n").unwrap();

        let cli = cli(&["--config", config.to_str().unwrap()]);
        assert!(matches!(run(&cli), Err(LureError::Config(_))));
    }
}
