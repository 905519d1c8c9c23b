use crate::infra::InMemoryIntakeRepository;
use barnehage::error::AppError;
use barnehage::intake::{ApplicationForm, FacilityRoster, IntakeService};
use barnehage::statistics::{aggregate, loader, ChartDocument, CoverageTable, Year};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct StatsReportArgs {
    /// Path to the coverage workbook (.xlsm)
    #[arg(long)]
    pub(crate) workbook: PathBuf,
    /// Sheet holding the coverage percentages
    #[arg(long, default_value = loader::DEFAULT_SHEET)]
    pub(crate) sheet: String,
    /// Restrict the report to a single year column (e.g. y17)
    #[arg(long)]
    pub(crate) year: Option<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ChartArgs {
    /// Path to the coverage workbook (.xlsm)
    #[arg(long)]
    pub(crate) workbook: PathBuf,
    /// Sheet holding the coverage percentages
    #[arg(long, default_value = loader::DEFAULT_SHEET)]
    pub(crate) sheet: String,
    /// Municipality to chart as a line over the nine years
    #[arg(long, conflicts_with = "top")]
    pub(crate) municipality: Option<String>,
    /// Chart the top-N municipalities by average as bars (default 10)
    #[arg(long)]
    pub(crate) top: Option<usize>,
    /// Output directory for the chart document
    #[arg(long, default_value = "charts")]
    pub(crate) out: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Optional facility roster CSV; defaults to the built-in roster
    #[arg(long)]
    pub(crate) facilities: Option<PathBuf>,
}

pub(crate) fn run_stats_report(args: StatsReportArgs) -> Result<(), AppError> {
    let table = loader::load_workbook(&args.workbook, &args.sheet)?;
    println!("Coverage statistics ({} cleaned rows)", table.len());

    if let Some(code) = args.year {
        match aggregate::parse_year(&code) {
            Ok(year) => render_year_section(&table, year),
            // Bad year codes are user input, reported rather than raised.
            Err(error) => println!("{error}"),
        }
        return Ok(());
    }

    let latest = aggregate::parse_year("y23")?;
    render_year_section(&table, latest);

    println!("\nHighest average 2015-2023");
    for entry in aggregate::max_average_entries(&table) {
        println!(
            "- {}: {}% (own peak {} at {}%)",
            entry.municipality, entry.average, entry.year, entry.value
        );
    }

    println!("\nLowest average 2015-2023");
    for entry in aggregate::min_average_entries(&table) {
        println!(
            "- {}: {}% (own low {} at {}%)",
            entry.municipality, entry.average, entry.year, entry.value
        );
    }

    println!("\nTop 10 municipalities by average coverage");
    for (rank, entry) in aggregate::top_averages(&table, 10).iter().enumerate() {
        println!("{:2}. {}: {}%", rank + 1, entry.municipality, entry.average);
    }

    Ok(())
}

fn render_year_section(table: &CoverageTable, year: Year) {
    println!("\nYear {}", year.label());

    match aggregate::year_max(table, year) {
        Some(max) => {
            println!("Maximum: {}%", max.value);
            for municipality in &max.municipalities {
                println!("- {municipality}");
            }
        }
        None => println!("Maximum: no observations"),
    }

    match aggregate::year_min(table, year) {
        Some(min) => println!("Minimum: {}% ({})", min.value, min.municipality),
        None => println!("Minimum: no observations"),
    }

    match aggregate::year_mean(table, year) {
        Some(mean) => println!("Average across municipalities: {mean}%"),
        None => println!("Average across municipalities: no observations"),
    }
}

pub(crate) fn run_chart(args: ChartArgs) -> Result<(), AppError> {
    let table = loader::load_workbook(&args.workbook, &args.sheet)?;

    let document = if let Some(name) = args.municipality {
        match ChartDocument::municipality_line(&table, &name) {
            Ok(document) => document,
            // Unknown municipality is a no-op, matching the report path.
            Err(error) => {
                println!("{error}");
                return Ok(());
            }
        }
    } else {
        let ranked = aggregate::top_averages(&table, args.top.unwrap_or(10));
        ChartDocument::top_averages_bar(&ranked)
    };

    let path = document.write_to(&args.out)?;
    println!("Chart written to {}", path.display());
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let roster = match args.facilities {
        Some(path) => FacilityRoster::from_path(&path)?,
        None => FacilityRoster::standard(),
    };

    let repository = Arc::new(InMemoryIntakeRepository::with_roster(roster));
    let service = IntakeService::new(repository);

    println!("Day-care intake demo");
    println!("\nFacility roster");
    for facility in service.facilities()? {
        println!(
            "- {} (id {}): {} vacant slots",
            facility.name, facility.id.0, facility.vacant_slots
        );
    }

    let forms = sample_forms();
    println!("\nSubmitting {} applications", forms.len());
    for form in forms {
        let receipt = service.submit(form)?;
        match receipt.offered_facility {
            Some(facility) => println!(
                "- application {}: {} via facility {}",
                receipt.application_id.0, receipt.status, facility.0
            ),
            None => println!(
                "- application {}: {}",
                receipt.application_id.0, receipt.status
            ),
        }
    }

    println!("\nApplication register");
    for view in service.status_views()? {
        println!(
            "- {} | {} | child {} | priority {} | {}",
            view.application_id.0,
            view.guardian_1,
            view.child_person_number,
            if view.priority_eligible { "yes" } else { "no" },
            view.status
        );
    }

    Ok(())
}

fn sample_forms() -> Vec<ApplicationForm> {
    let blank = |name: &str, person_number: &str, child: &str, prioritized: &str| ApplicationForm {
        guardian_1_name: name.to_string(),
        guardian_1_person_number: person_number.to_string(),
        guardian_1_address: "Eksempelveien 1".to_string(),
        guardian_1_phone: "99887766".to_string(),
        guardian_2_name: String::new(),
        guardian_2_person_number: String::new(),
        guardian_2_address: String::new(),
        guardian_2_phone: String::new(),
        child_person_number: child.to_string(),
        child_welfare_priority: false,
        family_illness_priority: false,
        child_illness_priority: false,
        prioritized_facilities: prioritized.to_string(),
    };

    // One placed by capacity at the second choice, one placed through a
    // priority flag at a full facility, one rejected outright.
    let by_capacity = blank("Kari Nordmann", "01018512345", "01012312345", "5,7");

    let mut by_priority = blank("Ola Nordmann", "02027523456", "02012423456", "1");
    by_priority.child_welfare_priority = true;

    let rejected = blank("Anne Hansen", "03036534567", "03012534567", "1,5");

    vec![by_capacity, by_priority, rejected]
}
