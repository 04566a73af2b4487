use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use dragsort_core::{SessionPolicy, SortableConfig};
use tracing::info;

use crate::error::{HarnessError, Result};
use crate::replay::{Outcome, StepResult, run_scenario};
use crate::scenario::Scenario;

#[derive(Debug, Parser)]
#[command(
    name = "dragsort-harness",
    about = "Replay drag-to-reorder scenarios against a headless document",
    version
)]
pub struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a scenario and print the final order of every list.
    Run(RunArgs),

    /// Replay a scenario and fail if any list differs from `expect`.
    Check(CheckArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Scenario file (.toml or .json).
    pub scenario: PathBuf,

    /// Print the outcome as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Scenario file (.toml or .json).
    pub scenario: PathBuf,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Command-line overrides for the scenario's `[config]` table.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Class applied to drop candidates.
    #[arg(long)]
    pub target_class: Option<String>,

    /// Whether drop and drag-end close the drag session.
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    Retain,
    ClearOnEnd,
}

impl From<PolicyArg> for SessionPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Retain => Self::Retain,
            PolicyArg::ClearOnEnd => Self::ClearOnEnd,
        }
    }
}

impl ConfigOverrides {
    /// Apply the overrides and validate the result.
    pub fn apply(&self, mut config: SortableConfig) -> Result<SortableConfig> {
        if let Some(class) = &self.target_class {
            config.target_class = class.clone();
        }
        if let Some(policy) = self.policy {
            config.session_policy = policy.into();
        }
        Ok(config.validated()?)
    }
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Commands::Run(args) => run_replay(&args, out),
        Commands::Check(args) => run_check(&args, out),
    }
}

fn load(path: &Path, overrides: &ConfigOverrides) -> Result<(Scenario, Outcome)> {
    let scenario = Scenario::load(path)?;
    let config = overrides.apply(scenario.config.clone())?;
    info!(
        scenario = %path.display(),
        steps = scenario.steps.len(),
        target_class = %config.target_class,
        policy = ?config.session_policy,
        "replaying scenario"
    );
    let outcome = run_scenario(&scenario, &config)?;
    Ok((scenario, outcome))
}

fn run_replay(args: &RunArgs, out: &mut dyn Write) -> Result<()> {
    let (_, outcome) = load(&args.scenario, &args.overrides)?;
    if args.json {
        let json = serde_json::to_string_pretty(&outcome)?;
        writeln!(out, "{json}").map_err(HarnessError::Output)?;
    } else {
        write_text(&outcome, out).map_err(HarnessError::Output)?;
    }
    Ok(())
}

fn write_text(outcome: &Outcome, out: &mut dyn Write) -> std::io::Result<()> {
    for report in &outcome.steps {
        match &report.result {
            StepResult::Rejected { error } => {
                writeln!(out, "step {} rejected: {error}", report.step)?;
            }
            StepResult::StartCancelled { error } => {
                writeln!(out, "step {} not started: {error}", report.step)?;
            }
            _ => {}
        }
    }
    for (name, items) in &outcome.lists {
        writeln!(out, "{name}: {}", items.join(", "))?;
    }
    Ok(())
}

fn run_check(args: &CheckArgs, out: &mut dyn Write) -> Result<()> {
    let (scenario, outcome) = load(&args.scenario, &args.overrides)?;
    if scenario.expect.is_empty() {
        return Err(HarnessError::invalid("scenario has no [expect] table"));
    }
    let mismatches = outcome.mismatches(&scenario.expect);
    for mismatch in &mismatches {
        writeln!(
            out,
            "{}: expected [{}], got [{}]",
            mismatch.list,
            mismatch.expected.join(", "),
            mismatch.actual.join(", ")
        )
        .map_err(HarnessError::Output)?;
    }
    if mismatches.is_empty() {
        writeln!(out, "ok: {} list(s) match", scenario.expect.len())
            .map_err(HarnessError::Output)?;
        Ok(())
    } else {
        Err(HarnessError::Mismatch {
            count: mismatches.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const SWAP_TWO: &str = r#"
[lists]
pair = ["A", "B"]

[[steps]]
drag = { list = "pair", from = 0, over = [1] }

[expect]
pair = ["B", "A"]
"#;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    fn run_to_string(cli: Cli) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = run(cli, &mut out);
        (result, String::from_utf8(out).expect("utf-8 output"))
    }

    #[test]
    fn run_parses_overrides() {
        let cli = parse(&[
            "dragsort-harness",
            "run",
            "s.toml",
            "--json",
            "--target-class",
            "hover",
            "--policy",
            "clear-on-end",
            "--log-json",
        ]);
        assert!(cli.log_json);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(args.json);
        assert_eq!(args.overrides.target_class.as_deref(), Some("hover"));
        assert_eq!(args.overrides.policy, Some(PolicyArg::ClearOnEnd));
    }

    #[test]
    fn unknown_policy_is_rejected_by_the_parser() {
        let parsed = Cli::try_parse_from([
            "dragsort-harness",
            "check",
            "s.toml",
            "--policy",
            "sometimes",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn overrides_replace_scenario_config() {
        let overrides = ConfigOverrides {
            target_class: Some("over".into()),
            policy: Some(PolicyArg::Retain),
        };
        let config = overrides.apply(SortableConfig::default()).expect("valid");
        assert_eq!(config.target_class, "over");
        assert_eq!(config.session_policy, SessionPolicy::Retain);
    }

    #[test]
    fn invalid_override_is_a_config_error() {
        let overrides = ConfigOverrides {
            target_class: Some("two words".into()),
            policy: None,
        };
        assert!(matches!(
            overrides.apply(SortableConfig::default()),
            Err(HarnessError::Config(_))
        ));
    }

    #[test]
    fn run_prints_each_list() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("swap.toml");
        std::fs::write(&path, SWAP_TWO).expect("write");

        let (result, output) = run_to_string(parse(&[
            "dragsort-harness",
            "run",
            path.to_str().expect("utf-8 path"),
        ]));
        result.expect("run succeeds");
        assert_eq!(output, "pair: B, A\n");
    }

    #[test]
    fn run_json_includes_steps() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("swap.toml");
        std::fs::write(&path, SWAP_TWO).expect("write");

        let (result, output) = run_to_string(parse(&[
            "dragsort-harness",
            "run",
            "--json",
            path.to_str().expect("utf-8 path"),
        ]));
        result.expect("run succeeds");
        let value: serde_json::Value = serde_json::from_str(&output).expect("json output");
        assert_eq!(value["lists"]["pair"], serde_json::json!(["B", "A"]));
        assert_eq!(value["steps"][0]["status"], "dropped");
        assert_eq!(value["steps"][0]["step"], 1);
    }

    #[test]
    fn check_passes_on_match_and_fails_on_mismatch() {
        let dir = tempdir().expect("tempdir");
        let good = dir.path().join("good.toml");
        std::fs::write(&good, SWAP_TWO).expect("write");
        let (result, output) = run_to_string(parse(&[
            "dragsort-harness",
            "check",
            good.to_str().expect("utf-8 path"),
        ]));
        result.expect("check passes");
        assert_eq!(output, "ok: 1 list(s) match\n");

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, SWAP_TWO.replace("pair = [\"B\", \"A\"]", "pair = [\"A\", \"B\"]"))
            .expect("write");
        let (result, output) = run_to_string(parse(&[
            "dragsort-harness",
            "check",
            bad.to_str().expect("utf-8 path"),
        ]));
        let err = result.expect_err("check fails");
        assert_eq!(err.exit_code(), 1);
        assert_eq!(output, "pair: expected [A, B], got [B, A]\n");
    }

    #[test]
    fn check_requires_expectations() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("bare.json");
        std::fs::write(&path, r#"{"lists": {"a": ["1"]}}"#).expect("write");
        let (result, _) = run_to_string(parse(&[
            "dragsort-harness",
            "check",
            path.to_str().expect("utf-8 path"),
        ]));
        assert!(matches!(result, Err(HarnessError::InvalidScenario(_))));
    }
}
