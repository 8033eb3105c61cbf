use atty::Stream;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use mws_core::{CommandStatus, ExecutionOutcome, GlobalOptions, MwsCommand};
use serde_json::Value;

mod cli;
mod style;

use cli::{Command, MwsCli};
use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = MwsCli::parse();
    init_tracing(cli.trace, cli.verbose);

    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.json,
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        workspace_file: cli
            .workspace_file
            .as_ref()
            .map(|p| p.to_string_lossy().to_string()),
    };

    let command = build_command(&cli.command);
    let outcome = mws_core::execute(&global, &command).map_err(|err| eyre!("{err:?}"))?;
    let code = emit_output(&cli, &command, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn build_command(command: &Command) -> MwsCommand {
    match command {
        Command::List => MwsCommand::List,
        Command::Open { name, new_window } => MwsCommand::Open {
            name: name.clone(),
            new_window: *new_window,
        },
        Command::Add { name } => MwsCommand::Add { name: name.clone() },
        Command::Update { replace } => MwsCommand::Update { replace: *replace },
        Command::Select { names } => MwsCommand::Select {
            names: names.clone(),
        },
    }
}

fn init_tracing(trace: bool, verbose: u8) {
    let level = if trace {
        "trace"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("mws={level},mws_core={level},mws_domain={level},mws_cli={level}");
    // Log lines go to stderr; stdout carries only the envelope or table.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn emit_output(cli: &MwsCli, command: &MwsCommand, outcome: &ExecutionOutcome) -> Result<i32> {
    let code = match outcome.status {
        CommandStatus::Ok => 0,
        CommandStatus::UserError => 1,
        CommandStatus::Failure => 2,
    };

    let style = Style::new(cli.no_color, atty::is(Stream::Stdout));

    if cli.json {
        let payload = mws_core::to_json_response(command.name(), outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if !cli.quiet {
        let message = mws_core::format_status_message(command.name(), &outcome.message);
        println!("{}", style.status(&outcome.status, &message));
        if let Some(hint) = hint_from_details(&outcome.details) {
            let hint_line = format!("Hint: {hint}");
            println!("{}", style.info(&hint_line));
        }
        if let Some(table) = render_projects_table(&style, &outcome.details) {
            println!("{table}");
        }
        if let Some(table) = render_picker_table(&style, &outcome.details) {
            println!("{table}");
        }
    }

    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

struct ProjectRow {
    label: String,
    kind: String,
    path: String,
}

fn render_projects_table(style: &Style, details: &Value) -> Option<String> {
    let projects = details.get("projects")?.as_array()?;
    if projects.is_empty() {
        return None;
    }

    let mut rows = Vec::new();
    for project in projects {
        let obj = project.as_object()?;
        rows.push(ProjectRow {
            label: obj.get("label")?.as_str()?.to_string(),
            kind: source_kind(obj.get("source")?),
            path: obj.get("relative_root")?.as_str()?.to_string(),
        });
    }

    Some(format_table(
        style,
        ["Project", "Kind", "Path"],
        rows.iter()
            .map(|row| [row.label.as_str(), row.kind.as_str(), row.path.as_str()]),
    ))
}

fn render_picker_table(style: &Style, details: &Value) -> Option<String> {
    let items = details.get("items")?.as_array()?;
    if items.is_empty() {
        return None;
    }

    let mut rows = Vec::new();
    for item in items {
        let obj = item.as_object()?;
        let picked = if obj.get("picked")?.as_bool()? { "*" } else { " " };
        rows.push((
            picked,
            obj.get("label")?.as_str()?.to_string(),
            obj.get("description")?.as_str()?.to_string(),
        ));
    }

    Some(format_table(
        style,
        ["Open", "Project", "Where"],
        rows.iter()
            .map(|(picked, label, at)| [*picked, label.as_str(), at.as_str()]),
    ))
}

fn source_kind(source: &Value) -> String {
    match source.get("kind").and_then(Value::as_str) {
        Some("workspace") => source
            .get("manager")
            .and_then(Value::as_str)
            .map_or_else(|| "workspace".to_string(), |m| format!("{m} workspace")),
        Some(kind) => kind.to_string(),
        None => String::new(),
    }
}

fn format_table<'a>(
    style: &Style,
    headers: [&str; 3],
    rows: impl Iterator<Item = [&'a str; 3]>,
) -> String {
    let rows: Vec<[&str; 3]> = rows.collect();
    let mut widths = [headers[0].len(), headers[1].len(), headers[2].len()];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let header_line = format!(
        "{:<width0$}  {:<width1$}  {:<width2$}",
        headers[0],
        headers[1],
        headers[2],
        width0 = widths[0],
        width1 = widths[1],
        width2 = widths[2],
    );

    let mut lines = Vec::new();
    lines.push(style.table_header(&header_line));
    lines.push(format!(
        "{:-<width0$}  {:-<width1$}  {:-<width2$}",
        "",
        "",
        "",
        width0 = widths[0],
        width1 = widths[1],
        width2 = widths[2],
    ));
    for row in &rows {
        lines.push(format!(
            "{:<width0$}  {:<width1$}  {:<width2$}",
            row[0],
            row[1],
            row[2],
            width0 = widths[0],
            width1 = widths[1],
            width2 = widths[2],
        ));
    }
    lines.join("\n")
}
