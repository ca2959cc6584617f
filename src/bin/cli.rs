use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::{AnyValue, DataFrame};
use project_gantt::{
    ChartTask, GanttView, UndatedPolicy, ViewConfig, ViewMode, load_view_from_csv,
    load_view_from_json, save_view_to_csv, save_view_to_json,
};
use std::io::{self, Write};

const CHART_WIDTH: usize = 60;

fn parse_id_list(s: &str) -> Vec<i32> {
    s.split(',')
        .filter_map(|p| p.trim().parse::<i32>().ok())
        .collect()
}

// Accepts a bare date (midnight) or a full datetime with a T separator,
// so values stay single tokens on the command line.
fn parse_cli_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cell = |av: &AnyValue, name: &str| -> String {
        match av {
            AnyValue::Null => String::new(),
            AnyValue::Int32(v) => v.to_string(),
            AnyValue::Float64(v) => v.to_string(),
            AnyValue::String(s) => s.to_string(),
            AnyValue::List(inner) if name == "depends_on" => {
                if let Ok(ca) = inner.i32() {
                    ca.into_iter()
                        .flatten()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(",")
                } else {
                    av.to_string()
                }
            }
            _ => av.to_string(),
        }
    };

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for (ci, col) in columns.iter().enumerate() {
        for row_idx in 0..df.height() {
            if let Ok(ref av) = col.get(row_idx) {
                let s = cell(av, col.name());
                if s.len() > widths[ci] {
                    widths[ci] = s.len();
                }
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');

    out.push('|');
    for (i, name) in col_names.iter().enumerate() {
        out.push(' ');
        out.push_str(name);
        let pad = widths[i] - name.len();
        if pad > 0 {
            out.push_str(&" ".repeat(pad));
        }
        out.push(' ');
        out.push('|');
    }
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');

    for row_idx in 0..df.height() {
        out.push('|');
        for (ci, col) in columns.iter().enumerate() {
            let mut s = String::new();
            if let Ok(ref av) = col.get(row_idx) {
                s = cell(av, col.name());
            }
            out.push(' ');
            out.push_str(&s);
            let pad = widths[ci].saturating_sub(s.len());
            if pad > 0 {
                out.push_str(&" ".repeat(pad));
            }
            out.push(' ');
            out.push('|');
        }
        out.push('\n');
    }

    out.push_str(&sep);
    out.push('\n');
    out
}

// Text rendering of what the widget would draw: one bar per entry,
// positioned within the configured window.
fn render_chart(entries: &[ChartTask], config: &ViewConfig) -> String {
    if entries.is_empty() {
        return "(no tasks in window)\n".to_string();
    }
    let from = config
        .date_from
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always valid");
    let to = config
        .date_to
        .and_hms_opt(23, 59, 59)
        .expect("end of day is always valid");
    let span_secs = (to - from).num_seconds().max(1);

    let name_width = entries
        .iter()
        .map(|e| e.name.len())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<name_width$} | {} .. {} ({})\n",
        "task",
        config.date_from,
        config.date_to,
        config.view_mode.as_str()
    ));
    for entry in entries {
        let clamp = |dt: NaiveDateTime| dt.clamp(from, to);
        let start_off = (clamp(entry.start) - from).num_seconds() as f64 / span_secs as f64;
        let end_off = (clamp(entry.end) - from).num_seconds() as f64 / span_secs as f64;
        let start_col = ((start_off * CHART_WIDTH as f64).floor() as usize).min(CHART_WIDTH - 1);
        let end_col = ((end_off * CHART_WIDTH as f64).ceil() as usize)
            .clamp(start_col + 1, CHART_WIDTH);

        let mut bar = vec![' '; CHART_WIDTH];
        if entry.start == entry.end {
            bar[start_col] = '|';
        } else {
            for slot in bar.iter_mut().take(end_col).skip(start_col) {
                *slot = '=';
            }
        }
        out.push_str(&format!(
            "{:<name_width$} |{}| {:>5.1}% deps=[{}]\n",
            entry.name,
            bar.iter().collect::<String>(),
            entry.progress,
            entry
                .dependencies
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join(",")
        ));
    }
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show stored tasks\n  chart                              Render the chart for the current window\n  summary                            Show refresh counters\n  add <id> <name> [project_id]       Upsert a task\n  delete <id>                        Delete a task and drop references to it\n  dates <id> <start> <end>           Set Gantt dates (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)\n  cleardates <id>                    Unset both Gantt dates\n  progress <id> <float>              Set completion percentage (0-100)\n  depends <id> <csv>                 Set dependency ids (e.g. 2,3)\n  window <from> <to>                 Set chart window (YYYY-MM-DD)\n  month <YYYY-MM-DD>                 Window the month containing the date\n  mode <Day|Week|Month>              Set chart zoom level\n  project <id|all>                   Filter by project\n  policy <skip|marker>               Choose handling of partially dated tasks\n  config                             Show current view configuration\n  save <json|csv> <path>             Persist view to disk\n  load <json|csv> <path>             Load view from disk\n  serve <addr>                       Hand the view to the HTTP API and block\n  quit|exit                          Exit"
    );
}

fn print_config(view: &GanttView) {
    let config = view.config();
    println!("Title          : {}", config.title);
    println!("Window from    : {}", config.date_from);
    println!("Window to      : {}", config.date_to);
    println!("View mode      : {}", config.view_mode.as_str());
    println!(
        "Project filter : {}",
        config
            .project_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "all".to_string())
    );
    println!("Undated policy : {}", view.undated_policy().as_str());
}

fn show_chart(view: &GanttView) {
    match view.chart() {
        Ok(entries) => print!("{}", render_chart(&entries, view.config())),
        Err(e) => println!("Chart error: {}", e),
    }
}

fn main() {
    let mut view = GanttView::new();

    println!("Project Gantt (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        if stdin.read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_df_as_text_table(view.dataframe())),
            "chart" => show_chart(&view),
            "summary" => match view.refresh() {
                Ok(summary) => println!("{}", summary.to_cli_summary()),
                Err(e) => println!("Refresh error: {}", e),
            },
            "config" => print_config(&view),
            "add" => {
                let id_s = parts.next();
                let name_s = parts.next();
                let project_s = parts.next();
                match (id_s, name_s) {
                    (Some(id_s), Some(name)) => {
                        let id: i32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let mut task = project_gantt::ProjectTask::new(id, name);
                        if let Some(project_s) = project_s {
                            match project_s.parse::<i32>() {
                                Ok(project) => task.project_id = Some(project),
                                Err(_) => {
                                    println!("Invalid project_id");
                                    continue;
                                }
                            }
                        }
                        match view.upsert_task_record(task) {
                            Ok(_) => {
                                println!("Task upserted.");
                                println!("{}", render_df_as_text_table(view.dataframe()));
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: add <id> <name> [project_id]"),
                }
            }
            "delete" => match parts.next() {
                Some(id_s) => match id_s.parse::<i32>() {
                    Ok(id) => match view.delete_task(id) {
                        Ok(true) => {
                            println!("Deleted task {id}.");
                            println!("{}", render_df_as_text_table(view.dataframe()));
                        }
                        Ok(false) => println!("Task {id} not found."),
                        Err(e) => println!("Error deleting task: {}", e),
                    },
                    Err(_) => println!("Invalid id"),
                },
                None => println!("Usage: delete <id>"),
            },
            "dates" => {
                let id_s = parts.next();
                let start_s = parts.next();
                let end_s = parts.next();
                match (id_s, start_s, end_s) {
                    (Some(id_s), Some(start_s), Some(end_s)) => {
                        let id: i32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let (start, end) =
                            match (parse_cli_datetime(start_s), parse_cli_datetime(end_s)) {
                                (Some(s), Some(e)) => (s, e),
                                _ => {
                                    println!(
                                        "Invalid datetime (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)"
                                    );
                                    continue;
                                }
                            };
                        match view.set_gantt_dates(id, Some(start), Some(end)) {
                            Ok(_) => {
                                println!("Dates updated.");
                                show_chart(&view);
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: dates <id> <start> <end>"),
                }
            }
            "cleardates" => match parts.next() {
                Some(id_s) => match id_s.parse::<i32>() {
                    Ok(id) => match view.set_gantt_dates(id, None, None) {
                        Ok(_) => println!("Dates cleared."),
                        Err(e) => println!("Error: {}", e),
                    },
                    Err(_) => println!("Invalid id"),
                },
                None => println!("Usage: cleardates <id>"),
            },
            "progress" => {
                let id_s = parts.next();
                let val_s = parts.next();
                match (id_s, val_s) {
                    (Some(id_s), Some(val_s)) => {
                        let id: i32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        let val: f64 = match val_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid float");
                                continue;
                            }
                        };
                        match view.set_progress(id, val) {
                            Ok(_) => println!("progress set."),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: progress <id> <float>"),
                }
            }
            "depends" => {
                let id_s = parts.next();
                let deps_s = parts.next();
                match (id_s, deps_s) {
                    (Some(id_s), Some(deps_s)) => {
                        let id: i32 = match id_s.parse() {
                            Ok(v) => v,
                            Err(_) => {
                                println!("Invalid id");
                                continue;
                            }
                        };
                        match view.set_depends_on(id, parse_id_list(deps_s)) {
                            Ok(_) => println!("depends_on set."),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: depends <id> <csv>"),
                }
            }
            "window" => {
                let from_s = parts.next();
                let to_s = parts.next();
                match (from_s, to_s) {
                    (Some(from_s), Some(to_s)) => {
                        let parsed = (
                            NaiveDate::parse_from_str(from_s, "%Y-%m-%d"),
                            NaiveDate::parse_from_str(to_s, "%Y-%m-%d"),
                        );
                        match parsed {
                            (Ok(from), Ok(to)) => match view.set_window(from, to) {
                                Ok(_) => show_chart(&view),
                                Err(e) => println!("{}", e),
                            },
                            _ => println!("Invalid date (YYYY-MM-DD)"),
                        }
                    }
                    _ => println!("Usage: window <from> <to>"),
                }
            }
            "month" => match parts.next() {
                Some(date_s) => match NaiveDate::parse_from_str(date_s, "%Y-%m-%d") {
                    Ok(date) => {
                        let mut config = ViewConfig::month_of(date);
                        config.title = view.config().title.clone();
                        config.view_mode = view.config().view_mode;
                        config.project_id = view.config().project_id;
                        match view.set_config(config) {
                            Ok(_) => show_chart(&view),
                            Err(e) => println!("{}", e),
                        }
                    }
                    Err(_) => println!("Invalid date (YYYY-MM-DD)"),
                },
                None => println!("Usage: month <YYYY-MM-DD>"),
            },
            "mode" => match parts.next().and_then(ViewMode::from_str) {
                Some(mode) => {
                    let mut config = view.config().clone();
                    config.view_mode = mode;
                    match view.set_config(config) {
                        Ok(_) => println!("View mode set to {}.", mode.as_str()),
                        Err(e) => println!("{}", e),
                    }
                }
                None => println!("Usage: mode <Day|Week|Month>"),
            },
            "project" => match parts.next() {
                Some("all") => {
                    view.set_project_filter(None);
                    println!("Project filter cleared.");
                }
                Some(id_s) => match id_s.parse::<i32>() {
                    Ok(id) => {
                        view.set_project_filter(Some(id));
                        println!("Filtering on project {id}.");
                    }
                    Err(_) => println!("Usage: project <id|all>"),
                },
                None => println!("Usage: project <id|all>"),
            },
            "policy" => match parts.next().and_then(UndatedPolicy::from_str) {
                Some(policy) => {
                    view.set_undated_policy(policy);
                    println!("Undated policy set to {}.", policy.as_str());
                }
                None => println!("Usage: policy <skip|marker>"),
            },
            "save" => {
                let fmt_s = parts.next();
                let path_s = parts.next();
                match (fmt_s, path_s) {
                    (Some("json"), Some(path)) => match save_view_to_json(&view, path) {
                        Ok(_) => println!("View saved to {path}."),
                        Err(e) => println!("Save error: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_view_to_csv(&view, path) {
                        Ok(_) => println!("View saved to {path}."),
                        Err(e) => println!("Save error: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt_s = parts.next();
                let path_s = parts.next();
                let loaded = match (fmt_s, path_s) {
                    (Some("json"), Some(path)) => Some((load_view_from_json(path), path)),
                    (Some("csv"), Some(path)) => Some((load_view_from_csv(path), path)),
                    _ => {
                        println!("Usage: load <json|csv> <path>");
                        None
                    }
                };
                if let Some((result, path)) = loaded {
                    match result {
                        Ok(new_view) => {
                            view = new_view;
                            println!("View loaded from {path}.");
                            println!("{}", render_df_as_text_table(view.dataframe()));
                        }
                        Err(e) => println!("Load error: {}", e),
                    }
                }
            }
            "serve" => match parts.next() {
                Some(addr_s) => match addr_s.parse::<std::net::SocketAddr>() {
                    Ok(addr) => {
                        println!("Serving HTTP API on http://{addr} (Ctrl-C to stop)");
                        let runtime = match tokio::runtime::Runtime::new() {
                            Ok(rt) => rt,
                            Err(e) => {
                                println!("Runtime error: {}", e);
                                continue;
                            }
                        };
                        let served = std::mem::take(&mut view);
                        if let Err(e) = runtime.block_on(project_gantt::http_api::serve(addr, served))
                        {
                            println!("Server error: {}", e);
                        }
                        break;
                    }
                    Err(_) => println!("Invalid address (host:port)"),
                },
                None => println!("Usage: serve <addr>"),
            },
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }
}
