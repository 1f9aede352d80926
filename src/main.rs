// Entry point and interactive menu.
//
// - Option [1] (re)loads the configured sheet files.
// - Option [2] prints the KPI cards and the monthly series.
// - Option [3] prints the timeline.
// - Option [4] exports the cleaned sheets, KPIs and timeline.
// After options 2–4 the user can go back to the menu or exit.
use sheet_kpi::config::Settings;
use sheet_kpi::kpi::Granularity;
use sheet_kpi::{output, reports, util, Dashboard};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if io::stdin().read_line(&mut buf).unwrap_or(0) == 0 {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load(dash: &mut Dashboard) {
    match dash.load_dir() {
        Ok(report) => {
            println!(
                "Loaded {} sheet(s), {} rows from {}",
                report.sheets_loaded,
                util::format_int(report.total_rows),
                dash.settings().data_dir.display()
            );
            if report.filled_cells > 0 {
                println!(
                    "Info: filled {} blank expert cell(s).",
                    util::format_int(report.filled_cells)
                );
            }
            for file in &report.missing_files {
                println!("Note: {} not found, skipped.", file);
            }
            println!();
        }
        Err(e) => eprintln!("Failed to load sheets: {}\n", e),
    }
}

fn ensure_loaded(dash: &Dashboard) -> bool {
    if dash.datasets().is_empty() {
        println!("Error: No data loaded. Please load the sheets first (option 1).\n");
        return false;
    }
    true
}

fn handle_kpis(dash: &Dashboard) {
    let kpis = dash.kpis();
    println!("KPI Summary\n");
    output::preview_table_rows(&reports::kpi_cards(&kpis), 3);

    let series = dash.series(Granularity::Month);
    if !series.is_empty() {
        println!("Monthly totals\n");
        for line in reports::series_lines(&series, 30) {
            println!("{}", line);
        }
        println!();
    }
}

fn handle_timeline(dash: &Dashboard) {
    let view = dash.timeline();
    println!(
        "Timeline {} → {} ({} days)\n",
        sheet_kpi::dates::format_date(view.range.start),
        sheet_kpi::dates::format_date(view.range.end),
        view.range.total_days
    );
    let rows = reports::timeline_rows(&view.tasks);
    output::preview_table_rows(&rows, rows.len());
}

fn handle_export(dash: &Dashboard) {
    let out_dir = &dash.settings().output_dir;
    if let Err(e) = std::fs::create_dir_all(out_dir) {
        eprintln!("Write error: {}", e);
        return;
    }
    for dataset in dash.datasets().iter() {
        let file = format!("{}.csv", dataset.name.to_lowercase().replace(' ', "_"));
        match output::write_dataset_csv(&out_dir.join(&file), dataset) {
            Ok(()) => println!("Exported {} ({} rows)", file, util::format_int(dataset.len())),
            Err(e) => eprintln!("Write error: {}", e),
        }
    }
    let kpis = dash.kpis();
    if let Err(e) = output::write_csv(&out_dir.join("kpi_cards.csv"), &reports::kpi_cards(&kpis)) {
        eprintln!("Write error: {}", e);
    }
    if let Err(e) = output::write_json(&out_dir.join("kpis.json"), &kpis) {
        eprintln!("Write error: {}", e);
    }
    if let Err(e) = output::write_json(&out_dir.join("timeline.json"), &dash.timeline()) {
        eprintln!("Write error: {}", e);
    }
    println!("Outputs saved to {}\n", out_dir.display());
}

fn main() {
    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut dash = Dashboard::new(settings);

    loop {
        println!("Sheet KPI Dashboard:");
        println!("[1] Load sheets");
        println!("[2] KPI summary");
        println!("[3] Timeline");
        println!("[4] Export\n");
        let choice = read_choice();
        let handler: fn(&Dashboard) = match choice.as_str() {
            "1" => {
                handle_load(&mut dash);
                continue;
            }
            "2" => handle_kpis,
            "3" => handle_timeline,
            "4" => handle_export,
            "" => {
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2, 3 or 4.\n");
                continue;
            }
        };
        if !ensure_loaded(&dash) {
            continue;
        }
        println!();
        handler(&dash);
        if !prompt_back_to_menu() {
            println!("Exiting the program.");
            break;
        }
    }
}
