//! Doctor command - verify credentials, endpoints and the data directory.

use crate::cache::{MediaIndex, INDEX_FILE_NAME, SUBTITLE_DIR_NAME};
use crate::cli::Output;
use crate::config::{Credentials, Settings, TranscriptionBackend, TranslationBackend};
use console::style;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: &std::path::Path) -> anyhow::Result<()> {
    Output::header("Tekst Doctor");
    println!();

    let credentials = Credentials::resolve(&settings.credentials);
    let sections = [
        ("Credentials", check_credentials(settings, &credentials)),
        ("Endpoints", check_endpoints(settings)),
        ("Data", check_data(settings)),
        ("Configuration", vec![check_config_file(config_path)]),
    ];

    let mut errors = 0;
    let mut warnings = 0;
    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
            match check.status {
                CheckStatus::Error => errors += 1,
                CheckStatus::Warning => warnings += 1,
                CheckStatus::Ok => {}
            }
        }
        println!();
    }

    if errors > 0 {
        Output::error(&format!("{} error(s) found. Please fix them before using Tekst.", errors));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Tekst is ready to use.");
    }

    Ok(())
}

/// Keys are only errors when the configured default backend needs them.
fn check_credentials(settings: &Settings, credentials: &Credentials) -> Vec<CheckResult> {
    let assemblyai_needed = settings.transcription.backend == TranscriptionBackend::AssemblyAi;
    let silicon_needed = settings.translation.backend == TranslationBackend::SiliconCloud;

    vec![
        key_check(
            "AssemblyAI key",
            credentials.has_assemblyai(),
            assemblyai_needed,
            "Set credentials.assemblyai_api_key or export ASSEMBLYAI_API_KEY",
        ),
        key_check(
            "SiliconCloud key",
            credentials.has_silicon_cloud(),
            silicon_needed,
            "Set credentials.silicon_cloud_api_key or export SILICONFLOW_API_KEY (needed for summarize/speak)",
        ),
    ]
}

fn key_check(name: &str, present: bool, required: bool, hint: &str) -> CheckResult {
    match (present, required) {
        (true, _) => CheckResult::ok(name, "configured"),
        (false, true) => CheckResult::error(name, "not set (required by default backend)", hint),
        (false, false) => CheckResult::warning(name, "not set", hint),
    }
}

fn check_endpoints(settings: &Settings) -> Vec<CheckResult> {
    [
        ("AssemblyAI", settings.transcription.assemblyai_base_url.as_str()),
        ("Whisper server", settings.transcription.whisper_server_url.as_str()),
        ("Google", settings.translation.google_url.as_str()),
        ("SiliconCloud", settings.translation.silicon_cloud_base_url.as_str()),
        ("Ollama", settings.translation.ollama_url.as_str()),
    ]
    .into_iter()
    .map(|(name, raw)| match url::Url::parse(raw) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => CheckResult::ok(name, raw),
        Ok(u) => CheckResult::error(name, &format!("unsupported scheme '{}'", u.scheme()), "Use an http(s) URL"),
        Err(e) => CheckResult::error(name, &format!("invalid URL ({})", e), "Fix the URL in the config file"),
    })
    .collect()
}

fn check_data(settings: &Settings) -> Vec<CheckResult> {
    let data_dir = settings.data_dir();
    let mut results = Vec::new();

    if data_dir.exists() {
        results.push(CheckResult::ok("Data directory", &data_dir.display().to_string()));
    } else {
        results.push(CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        ));
        return results;
    }

    let index_path = data_dir.join(INDEX_FILE_NAME);
    if index_path.exists() {
        let content = std::fs::read(&index_path).unwrap_or_default();
        match serde_json::from_slice::<serde_json::Value>(&content) {
            Ok(_) => {
                let entries = MediaIndex::open(&index_path).map(|i| i.len()).unwrap_or(0);
                results.push(CheckResult::ok("Media index", &format!("{} entries", entries)));
            }
            Err(e) => results.push(CheckResult::warning(
                "Media index",
                &format!("unparsable ({})", e),
                "It will be moved aside and rebuilt on next use",
            )),
        }
    } else {
        results.push(CheckResult::ok("Media index", "empty"));
    }

    let cached = std::fs::read_dir(data_dir.join(SUBTITLE_DIR_NAME))
        .map(|dir| {
            dir.filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                .count()
        })
        .unwrap_or(0);
    results.push(CheckResult::ok("Subtitle cache", &format!("{} records", cached)));

    results
}

fn check_config_file(config_path: &std::path::Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning("Config file", "using defaults", "Create with: tekst config init")
    }
}
