use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde_json::{Map as JsonMap, Value as JsonValue, json};

use floorplan_inventory::logger::{log_error, log_warn, set_log_file};
use floorplan_inventory::{
    AreaIndex, AreaRecord, ColumnMap, ColumnRole, ColumnSpec, CsvSink, Dataset, LoadOptions,
    MapSource, RecordFilter, Resolution, Session, export_records,
};

#[derive(Parser)]
#[command(
    name = "floorplan",
    version,
    about = "Resolve clicked floor-plan areas to inventory rows"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one clicked area and print or export its records.
    Resolve(Box<ResolveArgs>),
    /// Report detected columns and how map areas match the dataset.
    Inspect(InspectArgs),
}

#[derive(Args, Clone)]
struct InputArgs {
    /// Inventory export (CSV/TSV) with a header row.
    #[arg(long)]
    data: PathBuf,

    /// Floor-plan SVG supplying area titles.
    #[arg(long)]
    map: Option<PathBuf>,

    /// Input delimiter. Defaults to ',' (or '\t' for .tsv files).
    #[arg(long)]
    delimiter: Option<char>,

    /// Input character set (e.g. utf-8, latin1). Auto-detected when unset.
    #[arg(long)]
    encoding: Option<String>,

    /// Column holding the area location (detected when unset).
    #[arg(long)]
    location_column: Option<String>,

    /// Column holding the map element id.
    #[arg(long)]
    map_id_column: Option<String>,

    /// Column holding the secondary (oracle) location.
    #[arg(long)]
    secondary_column: Option<String>,

    /// Column holding the person/asset name.
    #[arg(long)]
    name_column: Option<String>,

    /// Column holding the activity/category.
    #[arg(long)]
    activity_column: Option<String>,

    /// Also write warnings and errors to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Parser, Clone)]
struct ResolveArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Raw identifier of the clicked map element.
    #[arg(long)]
    click: Option<String>,

    /// Keep records whose name contains this text.
    #[arg(long)]
    name: Option<String>,

    /// Keep records whose activity contains this text.
    #[arg(long)]
    activity: Option<String>,

    /// Write the matched records to this CSV/TSV file.
    #[arg(long, conflicts_with = "json")]
    out: Option<PathBuf>,

    /// Emit JSON instead of human readable output.
    #[arg(long)]
    json: bool,

    /// Append canonical key columns to exported records.
    #[arg(long = "with-keys")]
    with_keys: bool,

    /// Omit the header row from the `--out` file.
    #[arg(long = "no-header", requires = "out")]
    no_header: bool,
}

#[derive(Parser, Clone)]
struct InspectArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Emit JSON instead of human readable output.
    #[arg(long)]
    json: bool,
}

type AnyError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Resolve(args) => run_resolve(&args),
        Command::Inspect(args) => run_inspect(&args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Routed through the logger so `--log-file` records it too.
            log_error(&err.to_string());
            ExitCode::FAILURE
        }
    }
}

fn open_session(input: &InputArgs) -> Result<Session, AnyError> {
    if let Some(path) = &input.log_file {
        set_log_file(path)?;
    }

    let delimiter = match input.delimiter {
        Some(ch) if ch.is_ascii() => ch as u8,
        Some(ch) => return Err(format!("delimiter '{ch}' is not an ASCII character").into()),
        None if has_extension(&input.data, "tsv") => b'\t',
        None => b',',
    };
    let mut options = LoadOptions::new().with_delimiter(delimiter);
    if let Some(label) = &input.encoding {
        options = options.with_encoding(label.clone());
    }

    let mut spec = ColumnSpec::new();
    if let Some(name) = &input.location_column {
        spec = spec.with_location_column(name.clone());
    }
    if let Some(name) = &input.map_id_column {
        spec = spec.with_map_id_column(name.clone());
    }
    if let Some(name) = &input.secondary_column {
        spec = spec.with_secondary_column(name.clone());
    }
    if let Some(name) = &input.name_column {
        spec = spec.with_name_column(name.clone());
    }
    if let Some(name) = &input.activity_column {
        spec = spec.with_activity_column(name.clone());
    }

    let mut session = Session::new(spec);
    session.load_dataset(Dataset::open(&input.data, &options)?);
    if let Some(path) = &input.map {
        session.load_map(MapSource::load(path)?);
    }
    session.index()?;
    Ok(session)
}

fn run_resolve(args: &ResolveArgs) -> Result<(), AnyError> {
    let mut session = open_session(&args.input)?;
    if let Some(click) = &args.click {
        session.click(click.clone());
    }

    let index = session
        .cached_index()
        .ok_or("area index was not built")?;
    let columns = *index.columns();
    let filter = build_filter(args, &columns);
    let resolution = session
        .resolve_selection()?
        .retain(|record| filter.matches(&columns, record));

    if let Some(out) = &args.out {
        let file = BufWriter::new(File::create(out)?);
        let mut sink = CsvSink::new(file)
            .with_delimiter(if has_extension(out, "tsv") { b'\t' } else { b',' })
            .with_headers(!args.no_header)
            .with_derived_keys(args.with_keys);
        export_records(&mut sink, index, resolution.records())?;
        print_summary(&resolution);
        println!("{} records -> {}", resolution.records().len(), out.display());
    } else if args.json {
        let payload = resolution_json(index, &resolution, args.with_keys);
        serde_json::to_writer_pretty(std::io::stdout(), &payload)?;
        println!();
    } else {
        print_summary(&resolution);
        print_records(index, resolution.records());
    }
    Ok(())
}

fn build_filter(args: &ResolveArgs, columns: &ColumnMap) -> RecordFilter {
    let mut filter = RecordFilter::new();
    if let Some(text) = &args.name {
        if columns.position(ColumnRole::Name).is_none() {
            log_warn("--name given but the dataset has no name column; ignoring");
        }
        filter = filter.with_name(text);
    }
    if let Some(text) = &args.activity {
        if columns.position(ColumnRole::Activity).is_none() {
            log_warn("--activity given but the dataset has no activity column; ignoring");
        }
        filter = filter.with_activity(text);
    }
    filter
}

fn print_summary(resolution: &Resolution<'_>) {
    match resolution {
        Resolution::Unselected => println!("no area selected"),
        Resolution::NoData { key, label, .. } => {
            println!("{} [{key}]: no data for this area", label.text);
        }
        Resolution::Matched {
            key,
            label,
            records,
            ..
        } => println!("{} [{key}]: {} records", label.text, records.len()),
    }
}

fn print_records(index: &AreaIndex, records: &[&AreaRecord]) {
    if records.is_empty() {
        return;
    }
    println!("{}", index.dataset().headers().join(" | "));
    for record in records {
        println!("[{:>4}] {}", record.row, record.fields().join(" | "));
    }
}

fn resolution_json(index: &AreaIndex, resolution: &Resolution<'_>, with_keys: bool) -> JsonValue {
    let state = match resolution {
        Resolution::Unselected => "unselected",
        Resolution::NoData { .. } => "no_data",
        Resolution::Matched { .. } => "matched",
    };
    let records: Vec<JsonValue> = resolution
        .records()
        .iter()
        .map(|record| record_json(index, record, with_keys))
        .collect();
    json!({
        "state": state,
        "key": resolution.key(),
        "label": resolution.area_label(),
        "records": records,
    })
}

fn record_json(index: &AreaIndex, record: &AreaRecord, with_keys: bool) -> JsonValue {
    let mut object = JsonMap::new();
    object.insert("row".to_owned(), json!(record.row));
    for (header, value) in index.dataset().headers().iter().zip(record.fields()) {
        object.insert(header.clone(), json!(value));
    }
    if with_keys && let Some(keys) = index.derived_keys(record.row) {
        object.insert("keys".to_owned(), json!(keys));
    }
    JsonValue::Object(object)
}

fn run_inspect(args: &InspectArgs) -> Result<(), AnyError> {
    let session = open_session(&args.input)?;
    let index = session
        .cached_index()
        .ok_or("area index was not built")?;
    let headers = index.dataset().headers();
    let columns = index.columns();
    let roles = [
        ColumnRole::Location,
        ColumnRole::MapId,
        ColumnRole::SecondaryLocation,
        ColumnRole::Name,
        ColumnRole::Activity,
    ];
    let unlabeled = index.unlabeled().len();

    let map = session.map();
    let coverage = map.map(|map| index.coverage(map)).unwrap_or_default();
    let orphans = map.map(|map| index.orphan_keys(map)).unwrap_or_default();

    if args.json {
        let detected: JsonMap<String, JsonValue> = roles
            .iter()
            .map(|role| {
                let name = columns.position(*role).map(|idx| headers[idx].clone());
                (role_name(*role).to_owned(), json!(name))
            })
            .collect();
        let payload = json!({
            "rows": index.dataset().len(),
            "columns": headers,
            "detected": detected,
            "unlabeled": unlabeled,
            "areas": coverage,
            "orphan_keys": orphans,
        });
        serde_json::to_writer_pretty(std::io::stdout(), &payload)?;
        println!();
        return Ok(());
    }

    println!(
        "Rows: {}  Columns: {}  Unlabeled: {unlabeled}",
        index.dataset().len(),
        headers.len()
    );
    for role in roles {
        let name = columns
            .position(role)
            .map_or_else(|| "-".to_owned(), |idx| format!("'{}' [{idx}]", headers[idx]));
        println!("{:<20} {name}", format!("{role} column:"));
    }
    if map.is_some() {
        println!("Areas: {}", coverage.len());
        for area in &coverage {
            println!(
                "  {id:<16} {key:<20} {count:>5}  {label}",
                id = area.id,
                key = area.key,
                count = area.records,
                label = area.label
            );
            if area.records == 0 {
                log_warn(&format!("map area '{}' has no inventory records", area.id));
            }
        }
        if !orphans.is_empty() {
            println!("Locations without a map area:");
            for key in &orphans {
                println!("  {key}");
            }
        }
    }
    Ok(())
}

const fn role_name(role: ColumnRole) -> &'static str {
    match role {
        ColumnRole::Location => "location",
        ColumnRole::MapId => "map_id",
        ColumnRole::SecondaryLocation => "secondary_location",
        ColumnRole::Name => "name",
        ColumnRole::Activity => "activity",
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
