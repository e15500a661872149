//! Purpose: Hold top-level CLI command dispatch for `csvtab`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Helpers in `main.rs` own loading and output formatting.

use super::*;
use csvtab::api::{partition, select_records, validate_report};
use where_expr::{parse_where_terms, select_where};

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "csvtab", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Validate { input, json } => {
            let bytes = read_input(&input.file)?;
            let report = validate_report(&bytes, input.has_header());
            debug!(path = %input.file.display(), status = ?report.status, "validated");
            emit_validation_report(&report, json);
            if report.is_ok() {
                Ok(RunOutcome::ok())
            } else {
                if !json && io::stderr().is_terminal() {
                    let label = colorize_label(
                        "hint:",
                        color_mode.use_color(true),
                        AnsiColor::Yellow,
                    );
                    eprintln!("{label} run with --no-header if the first line is data");
                }
                Ok(RunOutcome::with_code(to_exit_code(ErrorKind::Grammar)))
            }
        }
        Command::Show { input, output } => {
            let table = load_table(&input)?;
            emit_table(&table, &output, input.has_header())?;
            Ok(RunOutcome::ok())
        }
        Command::Select {
            input,
            select,
            output,
        } => {
            let table = load_table(&input)?;
            let terms = parse_where_terms(&select.terms)?;
            let set = select_where(&table, &terms, base_set(&select, &table)?)?;
            let selected = select_records(&table, &set)?;
            emit_table(&selected, &output, input.has_header())?;
            Ok(RunOutcome::ok())
        }
        Command::Partition {
            input,
            select,
            output,
        } => {
            let table = load_table(&input)?;
            let terms = parse_where_terms(&select.terms)?;
            let set = select_where(&table, &terms, base_set(&select, &table)?)?;
            let split = partition(&table, &set)?;
            match output.format {
                OutputFormat::Json => emit_json(&json!({
                    "matching": table_json(&split.matching),
                    "complement": table_json(&split.complement),
                })),
                OutputFormat::Text => {
                    println!("Matching ({} records)", split.matching.len());
                    emit_table(&split.matching, &output, input.has_header())?;
                    println!("Complement ({} records)", split.complement.len());
                    emit_table(&split.complement, &output, input.has_header())?;
                }
                OutputFormat::Csv => {
                    emit_table(&split.matching, &output, input.has_header())?;
                    println!();
                    emit_table(&split.complement, &output, input.has_header())?;
                }
            }
            Ok(RunOutcome::ok())
        }
        Command::Set { input, select } => {
            let table = load_table(&input)?;
            let terms = parse_where_terms(&select.terms)?;
            let set = select_where(&table, &terms, base_set(&select, &table)?)?;
            println!("{set}");
            Ok(RunOutcome::ok())
        }
    }
}
