//! # CLI Commands
//!
//! Each `cmd_*` function implements one subcommand. Output goes to the
//! writer it is given so tests can capture it.

use crate::config::{Cli, Command, StoreArgs};
use crate::error::CliError;
use crate::telemetry;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stagewise_core::{
    AnswerRecord, AssessmentDefinition, AssessmentResult, AssessmentSession, DepartmentRollup,
    DepartmentSummary, GapReport, PositionStore, RedbStore, ScoringModel, SessionError,
    StageDistribution,
};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{debug, info};

// =============================================================================
// DISPATCH
// =============================================================================

/// Install logging, then run the command.
pub fn start(cli: Cli) -> Result<(), CliError> {
    telemetry::init(&cli.log_level)?;
    run(cli)
}

/// Run a parsed command line against the process's stdin/stdout.
pub fn run(cli: Cli) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let json = cli.json;

    match cli.command {
        Command::Score {
            definition,
            answers,
        } => cmd_score(&definition, &answers, json, &mut out),
        Command::Gap { current, target } => cmd_gap(&current, &target, json, &mut out),
        Command::Rollup { results } => cmd_rollup(&results, json, &mut out),
        Command::Take {
            definition,
            store,
            resume,
        } => {
            let stdin = std::io::stdin();
            cmd_take(&definition, &store, resume, json, stdin.lock(), &mut out).map(|_| ())
        }
        Command::Position { store, clear, all } => cmd_position(&store, clear, all, json, &mut out),
    }
}

// =============================================================================
// FILE LOADING
// =============================================================================

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and validate an assessment definition.
pub fn load_definition(path: &Path) -> Result<AssessmentDefinition, CliError> {
    let definition: AssessmentDefinition = read_json(path)?;
    debug!(
        path = %path.display(),
        questions = definition.bank().len(),
        "definition loaded"
    );
    Ok(definition)
}

/// One respondent's result tagged with a department.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentResult {
    pub department: String,
    pub distribution: StageDistribution,
}

// =============================================================================
// SCORE / GAP / ROLLUP
// =============================================================================

/// Score a complete answer file.
pub fn cmd_score<W: Write>(
    definition: &Path,
    answers: &Path,
    json: bool,
    out: &mut W,
) -> Result<(), CliError> {
    let definition = load_definition(definition)?;
    let answers: BTreeMap<String, usize> = read_json(answers)?;
    let answers: AnswerRecord = answers.into_iter().collect();

    let model = ScoringModel::new(definition.weights().clone());
    let result = model.score(definition.bank(), &answers)?;
    info!(dominant = %result.dominant_stage, "answers scored");

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
    } else {
        write_result(out, &result)?;
    }
    Ok(())
}

/// Gap report between two distribution files.
pub fn cmd_gap<W: Write>(
    current: &Path,
    target: &Path,
    json: bool,
    out: &mut W,
) -> Result<(), CliError> {
    let current: StageDistribution = read_json(current)?;
    let target: StageDistribution = read_json(target)?;
    let report = GapReport::new(current, target);

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    writeln!(out, "Gap analysis (target - current)")?;
    for (stage, delta) in report.delta.iter() {
        writeln!(
            out,
            "  {:<16} {:>3}% -> {:>3}%  ({:+})",
            stage.label(),
            current.get(stage),
            target.get(stage),
            delta
        )?;
    }
    writeln!(
        out,
        "Total gap: {} points, severity {}",
        report.magnitude, report.severity
    )?;

    if report.is_on_target() {
        writeln!(out, "On target.")?;
    } else {
        writeln!(out, "Recommendations:")?;
        for rec in &report.recommendations {
            writeln!(
                out,
                "  [{}] {} {:+}: {}",
                rec.severity,
                rec.stage.label(),
                rec.delta,
                rec.focus
            )?;
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct RollupReport {
    respondents: usize,
    departments: Vec<DepartmentSummary>,
    overall: Option<StageDistribution>,
}

/// Department and organization aggregates.
pub fn cmd_rollup<W: Write>(results: &Path, json: bool, out: &mut W) -> Result<(), CliError> {
    let records: Vec<DepartmentResult> = read_json(results)?;

    let mut rollup = DepartmentRollup::new();
    rollup.extend(
        records
            .into_iter()
            .map(|record| (record.department, record.distribution)),
    );

    let report = RollupReport {
        respondents: rollup.total_respondents(),
        departments: rollup.summaries(),
        overall: rollup.overall(),
    };

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    for summary in &report.departments {
        writeln!(
            out,
            "{} ({} respondent{})",
            summary.department,
            summary.respondents,
            if summary.respondents == 1 { "" } else { "s" }
        )?;
        write_distribution(out, &summary.distribution)?;
    }
    match report.overall {
        Some(overall) => {
            writeln!(out, "Organization ({} respondents)", report.respondents)?;
            write_distribution(out, &overall)?;
        }
        None => writeln!(out, "No results.")?,
    }
    Ok(())
}

// =============================================================================
// TAKE (INTERACTIVE)
// =============================================================================

/// One parsed line of interactive input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// 1-based option number for the current question.
    Answer(usize),
    Previous,
    /// 1-based question number.
    Jump(usize),
    Submit,
    Reset,
    Quit,
    Help,
    Blank,
}

/// Parse one input line.
pub fn parse_action(line: &str) -> Result<Action, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Action::Blank);
    };
    let number = |word: Option<&str>| -> Result<usize, String> {
        word.ok_or_else(|| format!("'{head}' needs a number"))?
            .parse::<usize>()
            .map_err(|_| format!("'{}' is not a number", line.trim()))
    };

    match head {
        "a" => number(words.next()).map(Action::Answer),
        "g" => number(words.next()).map(Action::Jump),
        "p" => Ok(Action::Previous),
        "s" => Ok(Action::Submit),
        "r" => Ok(Action::Reset),
        "q" => Ok(Action::Quit),
        "h" | "?" => Ok(Action::Help),
        other => other
            .parse::<usize>()
            .map(Action::Answer)
            .map_err(|_| format!("unrecognized command '{other}'; type ? for help")),
    }
}

const HELP: &str = "\
Commands:
  <n> | a <n>   answer the current question with option n
  p             previous question
  g <n>         go to question n
  s             submit
  r             reset and start over
  q             quit (position is saved)";

/// Drive a session from line input until submit, quit, or end of input.
///
/// Guard rejections are printed and the loop continues; store and scoring
/// failures end the run.
pub fn run_take<S, R, W>(
    session: &mut AssessmentSession<S>,
    resume: bool,
    input: R,
    out: &mut W,
) -> Result<Option<AssessmentResult>, CliError>
where
    S: PositionStore,
    R: BufRead,
    W: Write,
{
    if resume {
        let at = session.resume()?;
        writeln!(out, "Resuming at question {}.", at + 1)?;
    } else {
        session.start()?;
    }
    write_prompt(session, out)?;

    for line in input.lines() {
        let action = match parse_action(&line?) {
            Ok(action) => action,
            Err(message) => {
                writeln!(out, "error: {message}")?;
                write_prompt(session, out)?;
                continue;
            }
        };

        match action {
            Action::Answer(number) => {
                let Some(id) = session.current_question().map(|q| q.id.clone()) else {
                    writeln!(out, "error: no question here; use g <n> to revisit one")?;
                    write_prompt(session, out)?;
                    continue;
                };
                match number.checked_sub(1) {
                    Some(option) => {
                        report(out, session.answer(&id, option))?;
                    }
                    None => writeln!(out, "error: options are numbered from 1")?,
                }
            }
            Action::Previous => {
                report(out, session.go_to_previous())?;
            }
            Action::Jump(number) => match number.checked_sub(1) {
                Some(index) => {
                    report(out, session.go_to_question(index))?;
                }
                None => writeln!(out, "error: questions are numbered from 1")?,
            },
            Action::Submit => {
                if let Some(result) = report(out, session.submit())? {
                    write_result(out, &result)?;
                    return Ok(Some(result));
                }
            }
            Action::Reset => {
                session.reset()?;
                session.start()?;
                writeln!(out, "Assessment reset.")?;
            }
            Action::Quit => {
                writeln!(out, "Progress saved.")?;
                return Ok(None);
            }
            Action::Help => writeln!(out, "{HELP}")?,
            Action::Blank => {}
        }
        write_prompt(session, out)?;
    }

    Ok(None)
}

/// Print guard rejections, propagate everything else.
fn report<T, W: Write>(out: &mut W, result: Result<T, SessionError>) -> Result<Option<T>, CliError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_guard() => {
            writeln!(out, "error: {err}")?;
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Take an assessment with the pointer persisted in a redb file.
pub fn cmd_take<R: BufRead, W: Write>(
    definition: &Path,
    store: &StoreArgs,
    resume: bool,
    json: bool,
    input: R,
    out: &mut W,
) -> Result<Option<AssessmentResult>, CliError> {
    let definition = load_definition(definition)?;
    let db = RedbStore::open(&store.db)?;

    let mut session =
        AssessmentSession::new(definition, db).with_config(store.session_config());
    if let Some(user) = &store.user {
        session = session.with_user(user.clone());
    }

    let result = run_take(&mut session, resume, input, out)?;
    if let (true, Some(result)) = (json, &result) {
        writeln!(out, "{}", serde_json::to_string_pretty(result)?)?;
    }
    Ok(result)
}

// =============================================================================
// POSITION
// =============================================================================

/// Show, list, or clear persisted pointers.
pub fn cmd_position<W: Write>(
    store: &StoreArgs,
    clear: bool,
    all: bool,
    json: bool,
    out: &mut W,
) -> Result<(), CliError> {
    let mut db = RedbStore::open(&store.db)?;

    if all {
        let entries: BTreeMap<String, String> = db.entries()?.into_iter().collect();
        if json {
            writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        } else if entries.is_empty() {
            writeln!(out, "No stored positions.")?;
        } else {
            for (key, value) in &entries {
                writeln!(out, "{key} = {value}")?;
            }
        }
        return Ok(());
    }

    let key = store.key();
    if clear {
        db.delete(&key)?;
        info!(key = %key, "position cleared");
        writeln!(out, "Cleared {key}.")?;
        return Ok(());
    }

    let value = db.get(&key)?;
    if json {
        let body = serde_json::json!({ "key": key, "position": value });
        writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
    } else {
        match value {
            Some(value) => writeln!(out, "{key} = {value}")?,
            None => writeln!(out, "{key} has no stored position.")?,
        }
    }
    Ok(())
}

// =============================================================================
// RENDERING
// =============================================================================

fn write_distribution<W: Write>(out: &mut W, dist: &StageDistribution) -> std::io::Result<()> {
    for (stage, percent) in dist.iter() {
        let bar = "#".repeat(usize::from(percent / 5));
        writeln!(out, "  {:<16} {:>3}%  {bar}", stage.label(), percent)?;
    }
    Ok(())
}

fn write_result<W: Write>(out: &mut W, result: &AssessmentResult) -> std::io::Result<()> {
    writeln!(out, "Stage distribution:")?;
    write_distribution(out, &result.distribution)?;
    writeln!(out, "Dominant stage: {}", result.dominant_stage)
}

fn write_prompt<S: PositionStore, W: Write>(
    session: &AssessmentSession<S>,
    out: &mut W,
) -> std::io::Result<()> {
    let progress = session.progress();

    match session.current_question() {
        Some(question) => {
            writeln!(
                out,
                "\n[{}/{}] {}",
                progress.current_index + 1,
                progress.total,
                question.prompt
            )?;
            if let Some(description) = &question.description {
                writeln!(out, "  {description}")?;
            }
            let selected = session.answers().get(&question.id);
            for (n, label) in question.options.iter().enumerate() {
                let marker = if selected == Some(n) { '*' } else { ' ' };
                writeln!(out, " {marker}{}) {label}", n + 1)?;
            }
        }
        None => {
            writeln!(
                out,
                "\nAll questions visited: {}/{} answered. 's' submits, 'g <n>' revisits.",
                progress.answered, progress.total
            )?;
        }
    }

    write!(out, "({}% complete) > ", progress.percent_complete)?;
    out.flush()
}
