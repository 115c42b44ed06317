use crate::provider::{ArgosTools, Capabilities, LocalCapabilities};
use crate::{config::WorkerConfig, crash_log_path, log_file_path};
use std::{env, fmt::Display};

pub struct DoctorReport {
    lines: Vec<String>,
}

impl DoctorReport {
    pub fn new(title: &str) -> Self {
        Self {
            lines: vec![title.to_string()],
        }
    }

    pub fn section(&mut self, title: &str) {
        self.lines.push(String::new());
        self.lines.push(format!("{title}:"));
    }

    pub fn push_kv(&mut self, key: &str, value: impl Display) {
        self.lines.push(format!("  {key}: {value}"));
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }
}

pub fn base_doctor_report(config: &WorkerConfig, binary_name: &str) -> DoctorReport {
    let mut report = DoctorReport::new("Translation Worker Doctor");
    report.push_kv("version", env!("CARGO_PKG_VERSION"));
    report.push_kv("binary", binary_name);
    report.push_kv("os", format!("{}/{}", env::consts::OS, env::consts::ARCH));

    let mut validated = config.clone();
    let validation_result = validated.validate();
    let resolved = validation_result
        .as_ref()
        .map(|_| &validated)
        .unwrap_or(config);

    report.section("Config");
    match &validation_result {
        Ok(()) => report.push_kv("validation", "ok"),
        Err(err) => report.push_kv("validation", format!("error: {err:#}")),
    }
    report.push_kv(
        "logs",
        if resolved.logging_enabled() {
            "enabled"
        } else {
            "disabled"
        },
    );
    report.push_kv(
        "log_content",
        if resolved.log_content {
            "enabled"
        } else {
            "disabled"
        },
    );
    report.push_kv(
        "log_timings",
        if resolved.log_timings {
            "enabled"
        } else {
            "disabled"
        },
    );
    report.push_kv("log_file", log_file_path().display());
    report.push_kv("crash_log", crash_log_path().display());

    report.section("Capabilities");
    report.push_kv("detector", "whatlang");
    report.push_kv("argospm_cmd", &resolved.argospm_cmd);
    report.push_kv("argos_translate_cmd", &resolved.argos_translate_cmd);
    if validation_result.is_err() {
        report.push_kv("installed_languages", "skipped (invalid config)");
        return report;
    }

    let probe = || -> anyhow::Result<_> {
        let tools = ArgosTools::new(resolved.package_manager()?, resolved.translator()?);
        LocalCapabilities::new(tools).installed_languages()
    };
    match probe() {
        Ok(languages) if languages.is_empty() => report.push_kv("installed_languages", "none"),
        Ok(languages) => {
            report.push_kv("installed_languages", languages.len());
            for language in languages {
                report.push_line(format!(
                    "    - {} -> {}",
                    language.code,
                    if language.targets.is_empty() {
                        "(target only)".to_string()
                    } else {
                        language.targets.join(", ")
                    }
                ));
            }
        }
        Err(err) => report.push_kv("installed_languages", format!("error: {err:#}")),
    }

    report
}
