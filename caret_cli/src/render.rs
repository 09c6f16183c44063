//! Text and JSON output

use crate::CliResult;
use caret_analyzer::config::CompletionPreferences;
use caret_analyzer::{AnalysisReport, CompletionList};
use std::fmt::Write;

pub fn analysis(report: &AnalysisReport, json: bool) -> CliResult<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }

    let mut out = String::new();
    match &report.type_name {
        Some(name) if report.is_class_identifier => writeln!(out, "type: {} (class)", name)?,
        Some(name) => writeln!(out, "type: {}", name)?,
        None => writeln!(out, "type: <context>")?,
    }
    writeln!(out, "fragment: {:?} at {}", report.fragment, report.fragment_start)?;
    if let Some(stop) = &report.stopped_by {
        writeln!(out, "stopped by: {}", stop)?;
    }
    Ok(out)
}

pub fn completion(
    list: Option<&CompletionList>,
    preferences: &CompletionPreferences,
    json: bool,
) -> CliResult<String> {
    if json {
        return Ok(serde_json::to_string_pretty(&list)?);
    }

    let Some(list) = list else {
        return Ok("no completion available\n".to_string());
    };
    let mut out = String::new();
    writeln!(
        out,
        "{} {} members, {} typed",
        list.type_name,
        if list.is_static { "static" } else { "instance" },
        list.length_entered
    )?;
    writeln!(
        out,
        "{}",
        list.to_autocomplete_string(preferences.separator, preferences.type_separator)
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use caret_analyzer::{CompletionItem, CompletionKind};

    fn report(stopped_by: Option<&str>) -> AnalysisReport {
        AnalysisReport {
            type_name: Some("System.DateTime".to_string()),
            is_class_identifier: true,
            fragment: "DateTime".to_string(),
            fragment_start: 4,
            stopped_by: stopped_by.map(str::to_string),
        }
    }

    #[test]
    fn test_analysis_text() {
        let text = analysis(&report(Some("')' expected")), false).unwrap();
        assert_eq!(
            text,
            "type: System.DateTime (class)\nfragment: \"DateTime\" at 4\nstopped by: ')' expected\n"
        );
    }

    #[test]
    fn test_analysis_json() {
        let json: serde_json::Value = serde_json::from_str(&analysis(&report(None), true).unwrap()).unwrap();
        assert_eq!(json["type"], "System.DateTime");
        assert!(json.get("stopped_by").is_none());
    }

    #[test]
    fn test_completion_text() {
        let list = CompletionList {
            type_name: "System.String".to_string(),
            is_static: false,
            word_start: 3,
            length_entered: 1,
            items: vec![
                CompletionItem {
                    name: "Length".to_string(),
                    kind: CompletionKind::Property,
                },
                CompletionItem {
                    name: "Trim".to_string(),
                    kind: CompletionKind::Method,
                },
            ],
        };
        let text = completion(Some(&list), &CompletionPreferences::default(), false).unwrap();
        assert_eq!(text, "System.String instance members, 1 typed\nLength?1;Trim?2\n");
        assert_eq!(
            completion(None, &CompletionPreferences::default(), true).unwrap(),
            "null"
        );
    }
}
