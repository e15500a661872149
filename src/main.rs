//! Purpose: `csvtab` CLI entry point.
//! Role: Binary crate root; parses args, installs logging, runs commands, reports errors.
//! Invariants: Table output goes to stdout; diagnostics and logs go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::ffi::OsString;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{
    Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod where_expr;

use csvtab::api::{
    Cell, Error, ErrorKind, LineEnding, RowSet, Table, ValidationReport, WriteOptions, build,
    to_exit_code, validate, write_table,
};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint(clap_error_hint(&err)),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command, color_mode)
        .map_err(add_grammar_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "csvtab",
    version,
    about = "Validate, inspect and query typed quoted-CSV tables",
    long_about = None,
    before_help = r#"Input is a strict CSV dialect: strings are always double-quoted, numbers never are.
Column kinds are inferred from the first record.
"#,
    after_help = r#"EXAMPLES
  $ csvtab validate people.csv
  $ csvtab show people.csv
  $ csvtab select people.csv --where 'age LT 0'
  $ csvtab partition people.csv --where 'name SEQ Bob' --format csv
  $ csvtab set people.csv --where '3 MOD 1'

LEARN MORE
  $ csvtab <command> --help"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        global = true,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum EolArg {
    Lf,
    Crlf,
    Native,
}

impl From<EolArg> for LineEnding {
    fn from(value: EolArg) -> Self {
        match value {
            EolArg::Lf => LineEnding::Lf,
            EolArg::Crlf => LineEnding::CrLf,
            EolArg::Native => LineEnding::native(),
        }
    }
}

#[derive(Args, Clone, Debug)]
struct InputArgs {
    #[arg(help = "Input file", value_hint = ValueHint::FilePath)]
    file: PathBuf,
    #[arg(long, help = "Treat the first line as data; columns are named x0, x1, ...")]
    no_header: bool,
}

impl InputArgs {
    fn has_header(&self) -> bool {
        !self.no_header
    }
}

#[derive(Args, Clone, Debug)]
struct OutputArgs {
    #[arg(long, value_enum, default_value = "text", help = "Output format")]
    format: OutputFormat,
    #[arg(
        long,
        value_enum,
        default_value = "native",
        help = "Line ending for --format csv: lf|crlf|native"
    )]
    eol: EolArg,
}

#[derive(Args, Clone, Debug)]
struct SelectArgs {
    #[arg(
        long = "where",
        short = 'w',
        value_name = "TERM",
        help = "Row predicate `field OP literal` (repeatable; terms intersect)"
    )]
    terms: Vec<String>,
    #[arg(long, value_name = "HEX", help = "Start from this row set instead of all rows")]
    set: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Check a file against the dialect grammar",
        long_about = r#"Run the grammar validator over a file.

Exits 0 when the file is accepted and with the grammar exit code when it is rejected.
Rejections carry no reason."#,
        after_help = r#"EXAMPLES
  $ csvtab validate people.csv
  $ csvtab validate --no-header numbers.csv --json"#
    )]
    Validate {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, help = "Emit the validation report as JSON")]
        json: bool,
    },
    #[command(
        about = "Print the inferred fields and every record",
        after_help = r#"EXAMPLES
  $ csvtab show people.csv
  $ csvtab show people.csv --format json"#
    )]
    Show {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(
        about = "Print the records matching every --where term",
        after_help = r#"EXAMPLES
  $ csvtab select people.csv --where 'age LT 0'
  $ csvtab select people.csv -w 'age >= 18' -w 'name SNE Bob' --format csv"#
    )]
    Select {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        select: SelectArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(
        about = "Split records into matching and complement tables",
        after_help = r#"EXAMPLES
  $ csvtab partition people.csv --where 'age LT 0'"#
    )]
    Partition {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        select: SelectArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    #[command(
        about = "Print the hex row set matching every --where term",
        long_about = r#"Print the row set selected by the --where terms as hex.

The highest-indexed byte comes first. Feed the output back through --set."#,
        after_help = r#"EXAMPLES
  $ csvtab set people.csv --where '2 MOD 0'"#
    )]
    Set {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        select: SelectArgs,
    },
    #[command(about = "Print version info")]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        after_help = r#"EXAMPLES
  $ csvtab completion bash > ~/.local/share/bash-completion/completions/csvtab
  $ csvtab completion zsh > ~/.zfunc/_csvtab"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn read_input(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|err| {
        let kind = if err.kind() == io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Io
        };
        Error::new(kind)
            .with_message("failed to read input file")
            .with_path(path)
            .with_source(err)
    })
}

/// Reads, validates and builds the table named by `input`.
fn load_table(input: &InputArgs) -> Result<Table, Error> {
    let bytes = read_input(&input.file)?;
    if !validate(&bytes, input.has_header()) {
        return Err(Error::new(ErrorKind::Grammar)
            .with_message("input does not match the dialect grammar")
            .with_path(&input.file));
    }
    let table = build(&bytes, input.has_header()).map_err(|err| err.with_path(&input.file))?;
    debug!(path = %input.file.display(), rows = table.len(), "input loaded");
    Ok(table)
}

fn base_set(select: &SelectArgs, table: &Table) -> Result<Option<RowSet>, Error> {
    select
        .set
        .as_deref()
        .map(|hex| {
            RowSet::from_hex_with_len(hex, table.len()).map_err(|err| {
                err.with_hint(format!(
                    "--set must cover exactly {} rows ({} hex digits).",
                    table.len(),
                    table.len().div_ceil(8) * 2
                ))
            })
        })
        .transpose()
}

// Numbers keep the codec's exact text (serde_json `arbitrary_precision`).
fn cell_json(cell: &Cell) -> Value {
    match cell {
        Cell::Number(value) => value
            .to_string()
            .parse::<serde_json::Number>()
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(value.to_string())),
        Cell::String(value) => Value::String(value.clone()),
    }
}

fn table_json(table: &Table) -> Value {
    let records = table
        .rows()
        .map(|row| Value::Array(row.cells().iter().map(cell_json).collect()))
        .collect::<Vec<_>>();
    json!({
        "fields": table.schema(),
        "records": records,
    })
}

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Number(value) => value.to_string(),
        Cell::String(value) => value.clone(),
    }
}

fn render_table_text(table: &Table) -> String {
    let mut lines = Vec::with_capacity(table.schema().len() + table.len() * (table.schema().len() + 1) + 1);
    lines.push("Fields:".to_string());
    for field in table.schema().fields() {
        lines.push(format!("  {}: {}", field.name, field.kind.as_str()));
    }
    for (ordinal, row) in table.rows().enumerate() {
        lines.push(format!("Record {ordinal}:"));
        for (field, cell) in table.schema().fields().iter().zip(row.cells()) {
            lines.push(format!("  {}: {}", field.name, cell_text(cell)));
        }
    }
    lines.join("\n")
}

fn emit_table(table: &Table, output: &OutputArgs, header: bool) -> Result<(), Error> {
    match output.format {
        OutputFormat::Text => println!("{}", render_table_text(table)),
        OutputFormat::Json => emit_json(&table_json(table)),
        OutputFormat::Csv => {
            let options = WriteOptions::new(header).with_line_ending(output.eol.into());
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write_table(&mut lock, table, &options)?;
        }
    }
    Ok(())
}

fn emit_validation_report(report: &ValidationReport, json: bool) {
    if json {
        emit_json(&json!(report));
        return;
    }
    match (report.records, report.columns) {
        (Some(records), Some(columns)) if report.is_ok() => {
            let kinds = report
                .kinds
                .iter()
                .map(|kind| kind.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            println!("ok: {records} records, {columns} columns ({kinds})");
        }
        _ => println!("rejected"),
    }
}

fn emit_version_output() {
    if io::stdout().is_terminal() {
        println!("csvtab {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(&json!({
            "name": "csvtab",
            "version": env!("CARGO_PKG_VERSION"),
        }));
    }
}

fn emit_json(value: &Value) {
    let encoded = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    let json = encoded.unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error",
        ErrorKind::Usage => "usage error",
        ErrorKind::Io => "i/o error",
        ErrorKind::Grammar => "input rejected by grammar",
        ErrorKind::NotFound => "not found",
        ErrorKind::KindMismatch => "field kind mismatch",
        ErrorKind::OutOfRange => "out of range",
        ErrorKind::Encoding => "value cannot be encoded",
        ErrorKind::SizeMismatch => "set size mismatch",
        ErrorKind::Parse => "parse error",
    }
    .to_string()
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(field) = err.field() {
        inner.insert("field".to_string(), json!(field));
    }
    if let Some(row) = err.row() {
        inner.insert("row".to_string(), json!(row));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = vec![format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    )];
    let label = |name: &str| colorize_label(name, use_color, AnsiColor::Yellow);
    if let Some(hint) = err.hint() {
        lines.push(format!("{} {hint}", label("hint:")));
    }
    if let Some(path) = err.path() {
        lines.push(format!("{} {}", label("path:"), path.display()));
    }
    if let Some(field) = err.field() {
        lines.push(format!("{} {field}", label("field:")));
    }
    if let Some(row) = err.row() {
        lines.push(format!("{} {row}", label("row:")));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("{} {cause}", label("caused by:")));
    }
    lines.join("\n")
}

fn add_grammar_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Grammar || err.hint().is_some() {
        return err;
    }
    err.with_hint("Strings must be double-quoted, numbers unquoted, and every record needs the same fields. Use --no-header if the first line is data.")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

fn clap_error_hint(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let subcommand = rendered
        .lines()
        .find_map(|line| line.trim().strip_prefix("Usage: "))
        .and_then(|usage| {
            let mut tokens = usage.split_whitespace().skip_while(|token| *token != "csvtab");
            tokens.next()?;
            tokens.next().filter(|token| {
                !token.starts_with('-') && !token.starts_with('<') && !token.starts_with('[')
            })
        });
    match subcommand {
        Some(name) => format!("Try `csvtab {name} --help`."),
        None => "Try `csvtab --help`.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{Cli, add_grammar_hint, cell_json, error_json, error_text, render_table_text};
    use clap::CommandFactory;
    use csvtab::api::{Cell, Error, ErrorKind, Number, build};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn error_text_respects_color_flag() {
        let err = Error::new(ErrorKind::NotFound)
            .with_message("no column with that name")
            .with_field("height");
        let plain = error_text(&err, false);
        assert!(plain.starts_with("error: no column with that name"));
        assert!(plain.contains("field: height"));
        assert!(!plain.contains('\u{1b}'));
        assert!(error_text(&err, true).contains("\u{1b}[31m"));
    }

    #[test]
    fn error_json_includes_context() {
        let err = Error::new(ErrorKind::Parse)
            .with_message("bad number")
            .with_row(3);
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "Parse");
        assert_eq!(value["error"]["row"], 3);
        assert!(value["error"].get("field").is_none());
    }

    #[test]
    fn grammar_errors_get_a_hint() {
        let err = add_grammar_hint(Error::new(ErrorKind::Grammar));
        assert!(err.hint().is_some());
        let usage = add_grammar_hint(Error::new(ErrorKind::Usage));
        assert!(usage.hint().is_none());
    }

    #[test]
    fn text_rendering_lists_fields_then_records() {
        let table = build(b"\"name\",\"age\"\n\"Alice\",30\n", true).expect("build");
        assert_eq!(
            render_table_text(&table),
            "Fields:\n  name: string\n  age: number\nRecord 0:\n  name: Alice\n  age: 30"
        );
    }

    #[test]
    fn json_numbers_keep_codec_text() {
        for text in ["1.50", "0.000", "-2.5", "9007199254740993", "123456789012345678901234567"] {
            let cell = Cell::Number(Number::parse(text).expect("number"));
            let value = cell_json(&cell);
            assert!(value.is_number(), "{text}");
            assert_eq!(serde_json::to_string(&value).expect("json"), text);
        }
    }
}
