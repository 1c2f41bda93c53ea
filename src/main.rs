mod analysis;
mod api;
mod cache;
mod config;
mod data;
mod display;
mod error;
mod icons;

use analysis::aggregate::{ItemClassifier, JunkFilter, StaticItemClassifier};
use analysis::canonical::AliasTable;
use analysis::champion_stats::overview;
use analysis::report::{build_report, ChampionReport, ReportContext, ReportRequest, TopN};
use api::client::DataDragonClient;
use api::endpoints::DATA_DRAGON_BASE;
use cache::MemoCache;
use clap::Parser;
use config::Config;
use data::loader::{discover_csv, RawTable};
use data::normalize::{normalize, NormalizedTable};
use display::output::{
    display_error, display_info, display_overview, display_report, display_success, display_warning,
};
use error::AppError;
use icons::catalog::{Catalog, CatalogSnapshot};
use icons::resolver::IconResolver;
use icons::table::IconTable;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Parser, Debug)]
#[command(name = "ARAM Dashboard")]
#[command(about = "Champion statistics from ARAM participant CSV exports", long_about = None)]
struct Args {
    /// Dataset path (default: $ARAM_CSV, then the first known file name in the current directory)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Champion to report on; without it the champion overview is shown
    #[arg(short, long)]
    champion: Option<String>,

    /// Side table with `name,icon` rows (default: $ARAM_ICON_TABLE)
    #[arg(long)]
    icons: Option<PathBuf>,

    /// Resolve missing icons through the Data Dragon catalog
    #[arg(long)]
    catalog: bool,

    /// Data Dragon version (default: $ARAM_DDRAGON_VERSION, then latest)
    #[arg(long)]
    ddragon_version: Option<String>,

    /// Rows in the item table
    #[arg(long, default_value = "25")]
    top_items: usize,

    /// Rows in the spell, rune, build and champion tables
    #[arg(long, default_value = "10")]
    top_combos: usize,

    /// Rows in the champion overview
    #[arg(long, default_value = "20")]
    list: usize,

    /// Also print the raw filtered rows
    #[arg(long)]
    raw: bool,

    /// Keep prompting for champions; `:list`, `:reload` and `:quit` are commands
    #[arg(short, long)]
    interactive: bool,

    /// Re-download the catalog even if a cached copy exists
    #[arg(long)]
    refresh: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn top(&self) -> TopN {
        TopN {
            items: self.top_items,
            combos: self.top_combos,
            builds: self.top_combos,
            champions: self.top_combos,
            ..TopN::default()
        }
    }
}

fn main() {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(args) {
        display_error(&e.to_string());
        std::process::exit(1);
    }
}

fn load_table(path: &Path) -> Result<NormalizedTable, AppError> {
    let raw = RawTable::load(path)?;
    let table = normalize(raw)?;
    if table.rows.is_empty() {
        return Err(AppError::EmptyDataset);
    }
    display_success(&format!(
        "Loaded {} rows ({} champions) from {} [{}]",
        table.rows.len(),
        table.champions().len(),
        path.display(),
        table.fingerprint().short()
    ));
    Ok(table)
}

/// Exact name first, then a case-insensitive match.
fn resolve_champion(table: &NormalizedTable, input: &str) -> Result<String, AppError> {
    let input = input.trim();
    let champions = table.champions();
    champions
        .iter()
        .find(|c| c.as_str() == input)
        .or_else(|| champions.iter().find(|c| c.eq_ignore_ascii_case(input)))
        .cloned()
        .ok_or_else(|| AppError::ChampionNotFound(input.to_string()))
}

fn load_catalog(config: &Config, version: Option<&str>, refresh: bool) -> Option<Catalog> {
    let client = DataDragonClient::new(DATA_DRAGON_BASE);
    match CatalogSnapshot::load_or_fetch(&client, &config.cache_dir, version, refresh) {
        Ok(snapshot) => {
            display_success(&format!("Data Dragon catalog {}", snapshot.version));
            Some(Catalog::new(snapshot))
        }
        Err(e) => {
            log::warn!("Catalog unavailable: {}", e);
            display_warning("Icon catalog unavailable, continuing without catalog icons");
            None
        }
    }
}

struct Session<'a> {
    table: NormalizedTable,
    path: PathBuf,
    ctx: ReportContext<'a>,
    icons: IconResolver<'a>,
    reports: MemoCache<ReportRequest, ChampionReport>,
    top: TopN,
    list: usize,
    raw: bool,
}

impl Session<'_> {
    fn report(&mut self, champion: &str) -> Result<Rc<ChampionReport>, AppError> {
        let request = ReportRequest {
            champion: resolve_champion(&self.table, champion)?,
            top: self.top,
        };
        let table = &self.table;
        let ctx = &self.ctx;
        self.reports
            .get_or_compute(table.fingerprint(), &request, || build_report(table, &request, ctx))
    }

    fn show(&mut self, champion: &str) -> Result<(), AppError> {
        let report = self.report(champion)?;
        display_report(&report, &self.table, &self.icons, self.raw);
        Ok(())
    }

    fn show_overview(&self) {
        let (stats, total) = overview(&self.table);
        display_overview(&stats, total, self.list);
    }

    fn reload(&mut self) -> Result<(), AppError> {
        self.table = load_table(&self.path)?;
        if !self.reports.is_empty() {
            log::debug!("Dropping {} cached reports", self.reports.len());
        }
        self.reports.invalidate();
        Ok(())
    }

    fn interactive(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        loop {
            print!("champion> ");
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }

            let result = match line.trim() {
                "" => continue,
                ":quit" | ":q" => break,
                ":list" => {
                    self.show_overview();
                    Ok(())
                }
                ":reload" => self.reload(),
                champion => self.show(champion),
            };

            if let Err(e) = result {
                display_error(&e.to_string());
            }

            let (hits, misses) = self.reports.stats();
            log::debug!("Report cache: {} entries, {} hits, {} misses", self.reports.len(), hits, misses);
        }
        Ok(())
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let mut config = Config::from_env()?;
    if let Some(path) = &args.csv {
        config.csv_path = Some(path.clone());
    }
    if let Some(path) = &args.icons {
        config.icon_table = Some(path.clone());
    }
    if let Some(version) = &args.ddragon_version {
        let version = version.trim();
        config::validate_version(version)?;
        config.ddragon_version = Some(version.to_string());
    }

    let path = discover_csv(config.csv_path.as_deref(), Path::new("."))?;
    display_info(&format!("Using dataset {}", path.display()));
    let table = load_table(&path)?;

    let icon_table = match &config.icon_table {
        Some(icon_path) => match IconTable::load(icon_path) {
            Ok(t) if t.is_empty() => {
                display_warning(&format!("Icon table {} has no entries", icon_path.display()));
                None
            }
            Ok(t) => {
                log::debug!("Loaded {} icon entries from {}", t.len(), icon_path.display());
                Some(t)
            }
            Err(e) => {
                log::warn!("Icon table {} unavailable: {}", icon_path.display(), e);
                None
            }
        },
        None => None,
    };

    let catalog = if args.catalog {
        load_catalog(&config, config.ddragon_version.as_deref(), args.refresh)
    } else {
        None
    };

    let aliases = AliasTable::builtin();
    let junk = JunkFilter::new(&config.junk_items);
    let static_classifier = StaticItemClassifier::default();
    let classifier: &dyn ItemClassifier = match &catalog {
        Some(c) => c,
        None => &static_classifier,
    };

    let mut icons = IconResolver::new(&aliases);
    if let Some(t) = &icon_table {
        icons = icons.with_local(t);
    }
    if let Some(c) = &catalog {
        icons = icons.with_catalog(c, DATA_DRAGON_BASE);
    }

    let mut session = Session {
        table,
        path,
        ctx: ReportContext {
            aliases: &aliases,
            classifier,
            junk: &junk,
        },
        icons,
        reports: MemoCache::new(),
        top: args.top(),
        list: args.list,
        raw: args.raw,
    };

    if let Some(champion) = &args.champion {
        session.show(champion)?;
    } else if !args.interactive {
        session.show_overview();
    }

    if args.interactive {
        session
            .interactive()
            .map_err(|e| AppError::Io(io::Error::new(io::ErrorKind::Other, e.to_string())))?;
    }

    Ok(())
}
