use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use score_cli::history::JsonLinesHistory;
use score_cli::input::read_text;
use score_cli::render::{extraction_table, fields_table, result_table, schemes_table};
use score_schemes::{DoctorReport, SchemeStore, schemes_dir_from_env};
use score_session::Session;

use crate::cli::{ExtractArgs, FieldsArgs, ScoreArgs};

/// Flag value first, then `SCORE_SCHEMES_DIR`.
pub fn resolve_schemes_dir(flag: Option<&Path>) -> Option<std::path::PathBuf> {
    flag.map(Path::to_path_buf).or_else(schemes_dir_from_env)
}

fn load_store(schemes_dir: Option<&Path>) -> Result<SchemeStore> {
    match schemes_dir {
        Some(dir) => {
            let (store, summary) = SchemeStore::load_dir(dir)
                .with_context(|| format!("load schemes from {}", dir.display()))?;
            info!(
                dir = %dir.display(),
                files = summary.file_count,
                schemes = summary.scheme_count,
                "verified scheme directory"
            );
            Ok(store)
        }
        None => SchemeStore::builtin().context("load embedded schemes"),
    }
}

pub fn run_schemes(schemes_dir: Option<&Path>) -> Result<()> {
    let store = load_store(schemes_dir)?;
    println!("{}", schemes_table(&store.list_schemes()));
    Ok(())
}

pub fn run_fields(schemes_dir: Option<&Path>, args: &FieldsArgs) -> Result<()> {
    let store = load_store(schemes_dir)?;
    let scheme = store.get_scheme(&args.scheme)?;
    if args.json {
        let json = serde_json::to_string_pretty(&scheme.fields).context("encode fields")?;
        println!("{json}");
    } else {
        println!("{} ({})", scheme.name, scheme.version);
        println!("{}", fields_table(&scheme));
    }
    Ok(())
}

pub fn run_score(schemes_dir: Option<&Path>, args: &ScoreArgs) -> Result<()> {
    let span = info_span!("score", scheme = %args.scheme);
    let _guard = span.enter();

    let store = load_store(schemes_dir)?;
    let scheme = store.get_scheme(&args.scheme)?;

    let mut session = Session::new();
    if let Some(path) = &args.history {
        let sink = JsonLinesHistory::open(path)
            .with_context(|| format!("open history file {}", path.display()))?;
        info!(path = %sink.path().display(), "recording results to history file");
        session = session.with_history(sink);
    }
    session.select(Arc::clone(&scheme))?;

    if let Some(source) = &args.text {
        let text = read_text(Some(source)).context("read report text")?;
        let report = score_extract::extract_with_report(&scheme, &text);
        for dropped in &report.dropped {
            warn!(
                field = %dropped.field,
                reason = dropped.reason.as_str(),
                "report text value not used"
            );
        }
        info!(
            extracted = report.answers.len(),
            dropped = report.dropped.len(),
            "pre-filled answers from report text"
        );
        session.merge_answers(report.answers)?;
    }

    for (field, raw) in &args.answers {
        session
            .answer_raw(field, raw)
            .with_context(|| format!("answer for {field}"))?;
    }

    let result = session.submit().context("score answers")?;
    if args.json {
        let json = serde_json::to_string_pretty(result).context("encode result")?;
        println!("{json}");
    } else {
        println!("{}", result_table(&scheme, result));
    }
    Ok(())
}

pub fn run_extract(schemes_dir: Option<&Path>, args: &ExtractArgs) -> Result<()> {
    let store = load_store(schemes_dir)?;
    let scheme = store.get_scheme(&args.scheme)?;
    let text = read_text(args.input.as_deref()).context("read report text")?;
    let report = score_extract::extract_with_report(&scheme, &text);
    if args.json {
        let json = serde_json::to_string_pretty(&report).context("encode extraction report")?;
        println!("{json}");
    } else {
        println!("{}", extraction_table(&scheme, &report));
    }
    Ok(())
}

pub fn run_doctor(schemes_dir: Option<&Path>) -> Result<()> {
    let report = match schemes_dir {
        Some(dir) => {
            let (store, summary) = SchemeStore::load_dir(dir)
                .with_context(|| format!("verify schemes in {}", dir.display()))?;
            DoctorReport::from_verify_summary(&store, &summary)
        }
        None => {
            let store = SchemeStore::builtin().context("load embedded schemes")?;
            DoctorReport::for_store(&store, "embedded", store.len())
        }
    };
    let json = serde_json::to_string_pretty(&report).context("encode doctor report")?;
    println!("{json}");
    Ok(())
}
