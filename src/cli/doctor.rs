//! `oxigate doctor` — a battery of environment self-checks modeled on
//! the teacher's check/print pattern.

use crate::config;
use crate::directory::DirectoryClient;
use crate::utils::http::default_http_client;

#[derive(Debug)]
enum CheckResult {
    Pass(String),
    Fail(String),
    Skip(String),
}

impl CheckResult {
    fn label(&self) -> &'static str {
        match self {
            Self::Pass(_) => "PASS",
            Self::Fail(_) => "FAIL",
            Self::Skip(_) => "SKIP",
        }
    }

    fn detail(&self) -> &str {
        match self {
            Self::Pass(s) | Self::Fail(s) | Self::Skip(s) => s,
        }
    }

    fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

fn print_check(name: &str, result: &CheckResult) {
    println!("  {:<6} {:<24} {}", result.label(), name, result.detail());
}

fn check_config_loads() -> (CheckResult, Option<config::Config>) {
    match config::load_config(None) {
        Ok(cfg) => (CheckResult::Pass("loaded (file or defaults + env overrides)".to_string()), Some(cfg)),
        Err(e) => (CheckResult::Fail(format!("{e}")), None),
    }
}

fn check_config_validates(config: Option<&config::Config>) -> CheckResult {
    match config {
        Some(cfg) => match cfg.validate() {
            Ok(()) => CheckResult::Pass("all checks passed".to_string()),
            Err(e) => CheckResult::Fail(format!("{e}")),
        },
        None => CheckResult::Skip("config did not load".to_string()),
    }
}

async fn check_directory_reachable(config: Option<&config::Config>) -> CheckResult {
    let Some(cfg) = config else {
        return CheckResult::Skip("config did not load".to_string());
    };
    let client = DirectoryClient::new(default_http_client(), cfg.directory_url.clone());
    if client.health().await {
        CheckResult::Pass(cfg.directory_url.clone())
    } else {
        CheckResult::Fail(format!("{} did not respond to /health", cfg.directory_url))
    }
}

fn check_static_fallback(config: Option<&config::Config>) -> CheckResult {
    match config {
        Some(cfg) if cfg.static_fallback.is_empty() => {
            CheckResult::Skip("no static fallback configured; relying on discovery".to_string())
        }
        Some(cfg) => CheckResult::Pass(format!("{} entries", cfg.static_fallback.len())),
        None => CheckResult::Skip("config did not load".to_string()),
    }
}

/// Run every self-check and print a report. Returns `true` if every
/// check passed (skips do not fail the run).
pub async fn run() -> bool {
    println!("oxigate doctor\n");

    let (config_check, config) = check_config_loads();
    print_check("config loads", &config_check);

    let validates = check_config_validates(config.as_ref());
    print_check("config validates", &validates);

    let reachable = check_directory_reachable(config.as_ref()).await;
    print_check("directory reachable", &reachable);

    let fallback = check_static_fallback(config.as_ref());
    print_check("static fallback", &fallback);

    let checks = [&config_check, &validates, &reachable, &fallback];
    let all_passed = !checks.iter().any(|c| c.is_fail());
    println!();
    println!("{}", if all_passed { "All checks passed." } else { "Some checks failed." });
    all_passed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_result_label_and_detail() {
        let pass = CheckResult::Pass("ok".to_string());
        assert_eq!(pass.label(), "PASS");
        assert_eq!(pass.detail(), "ok");
        assert!(!pass.is_fail());

        let fail = CheckResult::Fail("bad".to_string());
        assert!(fail.is_fail());
    }

    #[test]
    fn static_fallback_skip_when_empty() {
        let config = config::Config::default();
        let result = check_static_fallback(Some(&config));
        assert!(matches!(result, CheckResult::Skip(_)));
    }
}
