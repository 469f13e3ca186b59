use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;
use validocu_engine::{
    emit_report, enumerate_files, load_config, mark_identity_errors, merge_page_layouts, report_json, DocumentCatalog,
    Engine, EngineConfig, EnumerateError, PageLayout,
};

const USAGE: &str = r#"Usage:
  validocu validate --doc-type <TYPE> [--config <engine.yaml>] [--out <dir>] [--mark-identity] <layout.json>...
  validocu classify [--config <engine.yaml>] <glob>"#;

fn flag_value(args: &[String], name: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == name)?;
    args.get(pos + 1).filter(|v| !v.starts_with("--")).cloned()
}

/// Positional arguments: everything that is neither a flag nor a flag's value.
fn positionals(args: &[String], valued_flags: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for a in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if valued_flags.contains(&a.as_str()) {
            skip_next = true;
            continue;
        }
        if a.starts_with("--") {
            continue;
        }
        out.push(a.clone());
    }
    out
}

fn slugify(base: &str) -> String {
    let mut s = String::with_capacity(base.len());
    let mut prev_dash = false;
    for ch in base.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            s.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            s.push('-');
            prev_dash = true;
        }
    }
    let trimmed = s.trim_matches('-');
    if trimmed.is_empty() { "doc".to_string() } else { trimmed.to_string() }
}

fn load_engine_config(args: &[String]) -> EngineConfig {
    let Some(path) = flag_value(args, "--config") else {
        return EngineConfig::default();
    };
    match load_config(Path::new(&path)) {
        Ok(cfg) => {
            eprintln!("{}", serde_json::json!({"tool":"load_config", "file": path, "status":"ok"}));
            cfg
        }
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::json!({"tool":"load_config", "file": path, "error": e.to_string(), "error_code": 3})
            );
            std::process::exit(3);
        }
    }
}

fn run_validate(args: &[String]) {
    let Some(doc_type) = flag_value(args, "--doc-type") else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    let files = positionals(args, &["--doc-type", "--config", "--out"]);
    if files.is_empty() {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }
    let cfg = load_engine_config(args);

    let mut pages = Vec::with_capacity(files.len());
    for file in &files {
        match std::fs::read_to_string(file) {
            Ok(json_layout) => {
                let source_name = Path::new(file)
                    .file_name()
                    .and_then(|s| s.to_str())
                    .unwrap_or(file.as_str())
                    .to_string();
                pages.push(PageLayout { source_name, json_layout });
            }
            Err(e) => {
                eprintln!(
                    "{}",
                    serde_json::json!({"tool":"read_layout", "file": file, "error": e.to_string(), "error_code": 1})
                );
                std::process::exit(1);
            }
        }
    }

    let mut items = merge_page_layouts(&pages);
    eprintln!("{}", serde_json::json!({"tool":"merge_page_layouts", "pages": pages.len(), "items": items.len()}));

    if args.iter().any(|a| a == "--mark-identity") {
        let marked = mark_identity_errors(&mut items, &cfg.scoring.identity_fields);
        eprintln!("{}", serde_json::json!({"tool":"mark_identity_errors", "marked": marked}));
    }

    let engine = Engine::from_config(&cfg);
    let report = engine.validate_document(&doc_type, &items);
    eprintln!(
        "{}",
        serde_json::json!({
            "tool":"validate_document",
            "doc_type": doc_type,
            "fields": report.fields.len(),
            "issues": report.issues.len(),
            "compliance": report.compliance,
            "required_pct": report.required.percentage
        })
    );

    match flag_value(args, "--out") {
        Some(outdir) => {
            let stem = Path::new(&files[0]).file_stem().and_then(|s| s.to_str()).unwrap_or("doc");
            let doc_id = slugify(stem);
            match emit_report(&report, &outdir, &doc_id) {
                Ok(paths) => {
                    eprintln!("{}", serde_json::json!({"tool":"emit_report", "report_path": paths.report_path}));
                }
                Err(e) => {
                    eprintln!(
                        "{}",
                        serde_json::json!({"tool":"emit_report", "error": e.to_string(), "error_code": 6})
                    );
                    std::process::exit(6);
                }
            }
        }
        None => {
            let out = serde_json::to_string_pretty(&report_json(&report)).unwrap_or_default();
            println!("{}", out);
        }
    }
}

fn run_classify(args: &[String]) {
    let globs = positionals(args, &["--config"]);
    let Some(pattern) = globs.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    let cfg = load_engine_config(args);
    let Some(catalog_path) = cfg.documents.path.clone() else {
        eprintln!(
            "{}",
            serde_json::json!({"tool":"load_catalog", "error":"documents.path not configured", "error_code": 3})
        );
        std::process::exit(3);
    };
    let mut catalog = match DocumentCatalog::from_file(catalog_path.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::json!({"tool":"load_catalog", "file": catalog_path, "error": e.to_string(), "error_code": 3})
            );
            std::process::exit(3);
        }
    };

    let files: Vec<PathBuf> = match enumerate_files(pattern) {
        Ok(files) => files,
        Err(EnumerateError::NoFilesFound { pattern }) => {
            eprintln!(
                "{}",
                serde_json::json!({"tool":"enumerate_files", "pattern": pattern, "error":"NoFilesFound", "error_code": 1})
            );
            std::process::exit(1);
        }
    };
    eprintln!("{}", serde_json::json!({"tool":"enumerate_files", "count": files.len()}));

    let names: Vec<String> = files
        .iter()
        .filter_map(|p| p.file_name().and_then(|s| s.to_str()).map(str::to_string))
        .collect();
    let overview = catalog.evaluate(&names);
    eprintln!(
        "{}",
        serde_json::json!({
            "tool":"classify",
            "to_analyze": overview.to_analyze.len(),
            "not_to_analyze": overview.not_to_analyze.len(),
            "unmatched": overview.unmatched.len(),
            "pending": overview.pending.len()
        })
    );
    println!("{}", serde_json::to_string_pretty(&overview).unwrap_or_default());
}

fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("validate") => run_validate(&args[1..]),
        Some("classify") => run_classify(&args[1..]),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
}
