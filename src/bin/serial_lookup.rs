// In: src/bin/serial_lookup.rs

//! `serial-lookup`: command-line front end for the genealogy lookup.
//!
//! Serial numbers given as arguments are looked up once each. Without any, the
//! tool reads one serial per line from stdin until end of input.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser};
use colored::Colorize;

use serial_genealogy::observability::{init_logging, level_from_verbosity};
use serial_genealogy::resolver::DrilldownView;
use serial_genealogy::{GenealogyError, GenealogyRecord, LookupConfig, SearchResult, Session};

const TABLE_HEADER: [&str; 5] = [
    "Parent Part No",
    "Parent Serial No",
    "Part No",
    "Serial No",
    "Source File",
];

#[derive(Parser, Debug)]
#[command(
    name = "serial-lookup",
    about = "Look up component genealogy by parent serial number",
    version
)]
struct Cli {
    /// JSON config file; the flags below override its fields.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the genealogy spreadsheets.
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Work-order CSV file.
    #[arg(long, value_name = "FILE")]
    aux_file: Option<PathBuf>,

    /// Worksheet read from every spreadsheet.
    #[arg(long)]
    sheet: Option<String>,

    #[arg(long, action = ArgAction::SetTrue, help = "Print each result as pretty JSON")]
    json: bool,

    /// -v for info, -vv for debug, -vvv for trace.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Append log output to this file instead of stderr.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Parent serial numbers to look up. Reads stdin when omitted.
    serials: Vec<String>,
}

impl Cli {
    fn lookup_config(&self) -> Result<LookupConfig, GenealogyError> {
        let mut config = match &self.config {
            Some(path) => LookupConfig::from_json_file(path)?,
            None => LookupConfig::default(),
        };
        if let Some(dir) = &self.data_dir {
            config.genealogy.directory = dir.clone();
        }
        if let Some(path) = &self.aux_file {
            config.aux.path = path.clone();
        }
        if let Some(sheet) = &self.sheet {
            config.genealogy.sheet_name = sheet.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(level_from_verbosity(cli.verbose), cli.log_file.as_deref()) {
        eprintln!("{} {}", "error:".red().bold(), err);
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            if let GenealogyError::MissingData { warnings, .. } = &err {
                for warning in warnings {
                    eprintln!("  {}", warning.to_string().yellow());
                }
                return ExitCode::from(2);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), GenealogyError> {
    let config = Arc::new(cli.lookup_config()?);
    let session = Session::open(config)?;

    for warning in session.warnings() {
        eprintln!("{} {}", "warning:".yellow().bold(), warning);
    }
    if let Some(err) = session.aux_error() {
        eprintln!("{} {}", "notice:".cyan().bold(), err);
    }

    if !cli.serials.is_empty() {
        for serial in &cli.serials {
            search_and_print(&session, serial, cli.json)?;
        }
        return Ok(());
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        if !cli.json {
            print!("Enter a Parent Serial Number: ");
            stdout.flush()?;
        }
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        search_and_print(&session, &line, cli.json)?;
    }
    Ok(())
}

fn search_and_print(session: &Session, serial: &str, json: bool) -> Result<(), GenealogyError> {
    let Some(result) = session.search(serial)? else {
        return Ok(());
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_result(&result));
    }
    Ok(())
}

//==================================================================================
// Text Rendering
//==================================================================================

fn render_result(result: &SearchResult) -> String {
    let mut out = String::new();
    if result.is_empty() {
        out.push_str(&format!("{}\n", "No matching record found.".yellow()));
    } else {
        out.push_str(&format!(
            "{}\n",
            format!("Found {} records!", result.matches.len()).green()
        ));
        out.push_str(&render_table(&result.matches));
    }

    let mut level = result.drilldown.as_ref();
    while let Some(drill) = level {
        out.push_str(&render_drilldown(drill));
        level = drill.next.as_deref();
    }

    match &result.workorder {
        Some(wo) => out.push_str(&format!(
            "{} {}  {} {}\n",
            "Work Order:".bold(),
            wo.work_order_number.as_deref().unwrap_or("-"),
            "Operator:".bold(),
            wo.operator_name.as_deref().unwrap_or("-")
        )),
        None => out.push_str(&format!("{}\n", "No work order found.".dimmed())),
    }
    out
}

fn render_drilldown(drill: &DrilldownView) -> String {
    let mut out = format!(
        "\n{} {} {} {}\n",
        "Drill-down via".bold(),
        drill.via_part.cyan(),
        "-> serial".bold(),
        drill.child_serial.cyan()
    );
    if drill.candidate_count > 1 {
        out.push_str(&format!(
            "{}\n",
            format!(
                "{} rows carry {}; the first was used.",
                drill.candidate_count, drill.via_part
            )
            .yellow()
        ));
    }
    for subpart in &drill.subparts {
        if subpart.records.is_empty() {
            out.push_str(&format!(
                "{}\n",
                format!("No {} records.", subpart.part_no).dimmed()
            ));
        } else {
            out.push_str(&format!("{}\n", subpart.part_no.bold()));
            out.push_str(&render_table(&subpart.records));
        }
    }
    out
}

fn render_table(records: &[GenealogyRecord]) -> String {
    let rows: Vec<[&str; 5]> = records
        .iter()
        .map(|r| {
            [
                r.parent_part_no.as_deref().unwrap_or(""),
                r.parent_serial_no.as_deref().unwrap_or(""),
                r.part_no.as_deref().unwrap_or(""),
                r.serial_no.as_deref().unwrap_or(""),
                r.source_file.as_deref().unwrap_or(""),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[&str; 5]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = format!("{}\n", line(&TABLE_HEADER).bold());
    for row in &rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serial_genealogy::resolver::SubpartView;
    use serial_genealogy::WorkOrderRecord;

    fn record(parent: &str, part: &str, serial: &str) -> GenealogyRecord {
        GenealogyRecord {
            parent_part_no: Some("ASSY".to_string()),
            parent_serial_no: Some(parent.to_string()),
            part_no: Some(part.to_string()),
            serial_no: Some(serial.to_string()),
            source_file: Some("a.xlsx".to_string()),
            extra: Default::default(),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "serial-lookup",
            "--data-dir",
            "/srv/genealogy",
            "--aux-file",
            "/srv/wo.csv",
            "--sheet",
            "Trace",
            "-vv",
            "--json",
            "S1",
            "0071",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
        assert_eq!(cli.serials, vec!["S1", "0071"]);
        let config = cli.lookup_config().unwrap();
        assert_eq!(config.genealogy.directory, PathBuf::from("/srv/genealogy"));
        assert_eq!(config.genealogy.sheet_name, "Trace");
        assert_eq!(config.aux.path, PathBuf::from("/srv/wo.csv"));
        assert_eq!(config.aux.skip_lines, 2);
    }

    #[test]
    fn test_no_serials_means_interactive() {
        let cli = Cli::try_parse_from(["serial-lookup"]).unwrap();
        assert!(cli.serials.is_empty());
        assert_eq!(cli.lookup_config().unwrap(), LookupConfig::default());
    }

    #[test]
    fn test_blank_sheet_is_rejected() {
        let cli = Cli::try_parse_from(["serial-lookup", "--sheet", ""]).unwrap();
        assert!(matches!(
            cli.lookup_config(),
            Err(GenealogyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_table_lists_the_five_columns() {
        colored::control::set_override(false);
        let record = GenealogyRecord {
            parent_part_no: Some("ASSY".to_string()),
            parent_serial_no: Some("S1".to_string()),
            part_no: Some("ASI-MS-00071".to_string()),
            serial_no: Some("S2".to_string()),
            source_file: Some("a.xlsx".to_string()),
            extra: Default::default(),
        };
        let text = render_table(&[record]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Parent Part No | Parent Serial No | Part No"));
        assert!(lines[1].contains("ASI-MS-00071"));
        assert!(lines[1].ends_with("a.xlsx"));
    }

    #[test]
    fn test_result_renders_ambiguous_drilldown_and_empty_subpart() {
        colored::control::set_override(false);
        let result = SearchResult {
            query: "S1".to_string(),
            matches: vec![
                record("S1", "ASI-MS-00071", "S2"),
                record("S1", "ASI-MS-00071", "S7"),
            ],
            drilldown: Some(DrilldownView {
                via_part: "ASI-MS-00071".to_string(),
                child_serial: "S2".to_string(),
                candidate_count: 2,
                subparts: vec![
                    SubpartView {
                        part_no: "ASI-MS-01550".to_string(),
                        records: vec![record("S2", "ASI-MS-01550", "S3")],
                    },
                    SubpartView {
                        part_no: "ASI-MS-01599".to_string(),
                        records: Vec::new(),
                    },
                ],
                next: None,
            }),
            workorder: Some(WorkOrderRecord {
                serial_number: "S1".to_string(),
                work_order_number: Some("WO-9".to_string()),
                operator_name: None,
                extra: Default::default(),
            }),
        };

        let text = render_result(&result);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Found 2 records!");
        assert!(lines.contains(&"Drill-down via ASI-MS-00071 -> serial S2"));
        assert!(lines.contains(&"2 rows carry ASI-MS-00071; the first was used."));
        assert!(lines.contains(&"ASI-MS-01550"));
        assert!(lines.iter().any(|l| l.contains("S3") && l.ends_with("a.xlsx")));
        assert!(lines.contains(&"No ASI-MS-01599 records."));
        assert!(lines.contains(&"Work Order: WO-9  Operator: -"));
    }

    #[test]
    fn test_unmatched_result_renders_notices_only() {
        colored::control::set_override(false);
        let result = SearchResult {
            query: "S9".to_string(),
            matches: Vec::new(),
            drilldown: None,
            workorder: None,
        };

        let text = render_result(&result);
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["No matching record found.", "No work order found."]
        );
    }
}
