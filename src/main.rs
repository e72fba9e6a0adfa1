// Entry point and high-level CLI flow.
//
// - Option [1] loads the clean table, the reference table and the boundary
//   files, printing diagnostics.
// - Option [2] selects a name (the configured default when left blank).
// - Option [3] asks for a year and writes tables, charts, maps and a JSON
//   summary for the selected name, previewing the tables in the console.
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prenoms_report::config::{Config, DomainSource};
use prenoms_report::dashboard::Dashboard;
use prenoms_report::loader;
use prenoms_report::output;
use prenoms_report::panel::PanelDomain;
use prenoms_report::reports::{self, Boundaries};
use prenoms_report::types::Sex;
use prenoms_report::util::format_int;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

// Loaded once, then reused for every report in the same run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState::default()));

#[derive(Default)]
struct AppState {
    session: Option<Session>,
}

struct Session {
    dashboard: Dashboard,
    boundaries: Boundaries,
    selected: Option<String>,
}

/// Print `prompt` and read a trimmed line. `None` on end of input.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

fn prompt_back_to_menu() -> bool {
    loop {
        let Some(resp) = read_line("Back to menu (Y/N): ") else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn lock_state() -> std::sync::MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Option [1]: load every input and build the session.
fn handle_load(config: &Config) -> Result<()> {
    let (records, load_report) = loader::load_clean_records(&config.clean_data_path)
        .with_context(|| format!("loading {}", config.clean_data_path.display()))?;
    let reference = loader::load_reference(&config.reference_path)
        .with_context(|| format!("loading {}", config.reference_path.display()))?;
    let boundaries = Boundaries::load(config);

    let domain = match config.panel_domain {
        DomainSource::Observed => PanelDomain::observed(&records),
        DomainSource::Standard => PanelDomain::standard(),
    };
    println!(
        "Processing dataset... ({} rows loaded, {} skipped)",
        format_int(load_report.loaded_rows),
        format_int(load_report.parse_errors)
    );
    println!(
        "Panel grid: {} years × {} departments; reference table: {} departments\n",
        domain.years.len(),
        domain.depts.len(),
        reference.len()
    );

    let dashboard = Dashboard::new(records, reference, domain, config.clone());
    let selected = dashboard.default_name().map(str::to_string);
    lock_state().session = Some(Session { dashboard, boundaries, selected });
    Ok(())
}

/// Option [2]: choose the name reports are generated for.
fn handle_select_name() {
    let mut state = lock_state();
    let Some(session) = state.session.as_mut() else {
        println!("Error: No data loaded. Please load the data first (option 1).\n");
        return;
    };
    let current = session.selected.clone().unwrap_or_default();
    let Some(input) = read_line(&format!("Name [{current}]: ")) else {
        return;
    };
    let name = if input.is_empty() { current } else { input.to_uppercase() };
    match session.dashboard.name_view(&name) {
        Ok(view) => {
            println!("Statistics for {}", view.name);
            println!(
                "  Boys: {}   Girls: {}",
                format_int(view.occurrences(Sex::Male)),
                format_int(view.occurrences(Sex::Female))
            );
            println!("  Total births: {}\n", format_int(view.panel.total()));
            session.selected = Some(name);
        }
        Err(e) => println!("{e}\n"),
    }
}

/// Option [3]: write all reports for the selected name and a chosen year.
fn handle_generate_reports() -> Result<()> {
    let mut state = lock_state();
    let Some(session) = state.session.as_mut() else {
        println!("Error: No data loaded. Please load the data first (option 1).\n");
        return Ok(());
    };
    let Some(name) = session.selected.clone() else {
        println!("Error: No name selected (option 2).\n");
        return Ok(());
    };

    let view = session.dashboard.name_view(&name)?;
    let Some(latest) = view.years_available.last().cloned() else {
        println!("No births recorded for {name}.\n");
        return Ok(());
    };
    println!(
        "Years available for {name}: {} – {}",
        view.years_available.first().map(String::as_str).unwrap_or(""),
        latest
    );
    let input = read_line(&format!("Year [{latest}]: ")).unwrap_or_default();
    let year = if input.is_empty() { latest } else { input };
    if !view.years_available.contains(&year) {
        println!("No births recorded for {name} in {year}.\n");
        return Ok(());
    }

    println!("Generating reports...\n");
    let out_dir = session.dashboard.config().output_dir.clone();
    let generated = reports::generate_reports(&mut session.dashboard, &session.boundaries, &name, &year, &out_dir)?;

    println!("Births per year for {name}\n");
    output::preview_table_rows(&view.by_year, 5);

    let map = session.dashboard.map_year(&name, &year)?;
    println!("Births per region in {year}\n");
    output::preview_table_rows(&reports::area_rows(&map.regions), 5);
    println!("Births per department in {year}\n");
    output::preview_table_rows(&reports::area_rows(&map.departments), 5);

    println!("Top names in France\n");
    output::preview_table_rows(session.dashboard.top_names(), 5);

    println!("Births by sex in France");
    for total in session.dashboard.births_by_sex() {
        println!("  {}: {}", total.sex.label(), format_int(total.count));
    }
    println!();

    for path in generated.tables.iter().chain(&generated.charts).chain(&generated.maps) {
        println!("(exported {})", path.display());
    }
    println!("(summary exported to {})\n", generated.summary.display());
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(filter).init();

    let config = Config::load().context("reading configuration")?;

    loop {
        println!("Select an option:");
        println!("[1] Load the data");
        println!("[2] Select a name");
        println!("[3] Generate reports\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => {
                if let Err(e) = handle_load(&config) {
                    eprintln!("Failed to load data: {e:#}\n");
                }
            }
            "2" => handle_select_name(),
            "3" => {
                println!();
                if let Err(e) = handle_generate_reports() {
                    eprintln!("Report error: {e:#}\n");
                }
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1, 2 or 3.\n"),
        }
    }
    Ok(())
}
