use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use popfreq::config::Config;
use popfreq::observable::MarkerSource;
use popfreq::prelude::*;
use popfreq::report;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// popfreq: genotype contingency tables across markers and populations
#[derive(Parser)]
#[command(name = "popfreq", version, about)]
struct Cli {
    /// Log more (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every query of a TOML configuration
    Run {
        /// Path to the configuration file
        config: PathBuf,
    },

    /// List the genotype categories of each marker
    Categories {
        /// Marker files are read from <prefix><marker>.csv
        #[arg(long)]
        prefix: String,

        #[arg(required = true)]
        markers: Vec<String>,
    },

    /// Cross-tabulate the genotypes of two markers
    Count2 {
        /// Marker files are read from <prefix><marker>.csv
        #[arg(long)]
        prefix: String,

        a: String,
        b: String,
    },

    /// Cross-tabulate two markers among samples carrying a genotype at a third
    Count3 {
        /// Marker files are read from <prefix><marker>.csv
        #[arg(long)]
        prefix: String,

        /// Marker to condition on
        condition: String,

        /// Genotype at the condition marker, in either allele order
        category: String,

        a: String,
        b: String,

        /// Further markers joined before counting; their samples must match
        #[arg(long, num_args = 1..)]
        markers: Vec<String>,
    },
}

/// Loads each distinct marker once, keeping first-seen order.
fn load(source: &MarkerSource, markers: &[&str]) -> Result<AggregateTable> {
    let mut distinct: Vec<&str> = Vec::with_capacity(markers.len());
    for marker in markers {
        if !distinct.contains(marker) {
            distinct.push(*marker);
        }
    }
    source
        .load_all(&distinct)
        .with_context(|| format!("could not load markers {}", distinct.join(", ")))
}

/// Conditioned three-way count, with `extra` markers joined alongside.
fn count3(
    source: &MarkerSource,
    condition: &str,
    category: &str,
    a: &str,
    b: &str,
    extra: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let mut markers = vec![condition, a, b];
    markers.extend(extra.iter().map(String::as_str));
    let table = load(source, &markers)?;
    let result = table.three_way_conditioned(condition, category, a, b)?;
    report::write_three_way(out, condition, category, a, b, &result)?;
    Ok(())
}

fn run(config: &Config, out: &mut impl Write) -> Result<()> {
    let table = config
        .source()?
        .load_all(&config.markers)
        .with_context(|| format!("could not load markers from prefix {}", config.prefix))?;
    info!(
        "Loaded {} markers over {} samples",
        table.marker_names().len(),
        table.len()
    );

    if config.print_categories {
        report::write_categories(out, &table)?;
    }
    for query in &config.two_way {
        let result = table.two_way(&query.a, &query.b, None)?;
        report::write_two_way(out, &query.a, &query.b, &result)?;
    }
    for query in &config.three_way {
        let result =
            table.three_way_conditioned(&query.condition, &query.category, &query.a, &query.b)?;
        report::write_three_way(
            out,
            &query.condition,
            &query.category,
            &query.a,
            &query.b,
            &result,
        )?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        })
        .parse_default_env()
        .init();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match cli.command {
        Commands::Run { config } => {
            let config = Config::from_path(&config)
                .with_context(|| format!("could not read {}", config.display()))?;
            run(&config, &mut out)?;
        }
        Commands::Categories { prefix, markers } => {
            let markers: Vec<&str> = markers.iter().map(String::as_str).collect();
            let table = load(&MarkerSource::new(&prefix), &markers)?;
            report::write_categories(&mut out, &table)?;
        }
        Commands::Count2 { prefix, a, b } => {
            let table = load(&MarkerSource::new(&prefix), &[a.as_str(), b.as_str()])?;
            let result = table.two_way(&a, &b, None)?;
            report::write_two_way(&mut out, &a, &b, &result)?;
        }
        Commands::Count3 {
            prefix,
            condition,
            category,
            a,
            b,
            markers,
        } => {
            let source = MarkerSource::new(&prefix);
            count3(&source, &condition, &category, &a, &b, &markers, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fs;
    use std::path::Path;

    fn write_markers(dir: &Path) -> std::io::Result<String> {
        let prefix = format!("{}/Sample_", dir.display());
        fs::write(
            format!("{}rs699.csv", prefix),
            "Sample,Population(s),Genotype\nNA1,CEU,A|G\nNA2,CEU,G|A\nNA3,YRI,G|G\nNA4,YRI,G|G\n",
        )?;
        fs::write(
            format!("{}rs4762.csv", prefix),
            "Sample,Population(s),Genotype\nNA4,YRI,C|C\nNA3,YRI,C|T\nNA2,CEU,T|C\nNA1,CEU,C|C\n",
        )?;
        fs::write(
            format!("{}rs11122576.csv", prefix),
            "Sample,Population(s),Genotype\nNA1,CEU,A|A\nNA2,CEU,A|T\nNA3,YRI,T|A\nNA4,YRI,A|A\n",
        )?;
        Ok(prefix)
    }

    const TWO_WAY: &str = "rs4762 rs11122576\n\tA|A\tA|T\t\nC|C\t2\t0\nC|T\t0\t2\n\n";
    const THREE_WAY: &str =
        "rs699 = G|G\nrs4762 rs11122576\n\tA|A\tA|T\t\nC|C\t1\t0\nC|T\t0\t1\n\n";

    #[test]
    fn test_run_prints_categories_then_two_way_then_three_way() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let prefix = write_markers(dir.path())?;
        // Queries listed out of order in the file still print in a fixed order.
        let config: Config = format!(
            r#"
prefix = "{}"
markers = ["rs699", "rs4762", "rs11122576"]

[[three_way]]
condition = "rs699"
category = "G|G"
a = "rs4762"
b = "rs11122576"

[[two_way]]
a = "rs4762"
b = "rs11122576"
"#,
            prefix
        )
        .parse()?;

        let mut out = Vec::new();
        run(&config, &mut out)?;
        let categories = "rs699: A|G, G|G\nrs4762: C|C, C|T\nrs11122576: A|A, A|T\n\n";
        assert_eq!(
            String::from_utf8(out)?,
            format!("{}{}{}", categories, TWO_WAY, THREE_WAY)
        );
        Ok(())
    }

    #[test]
    fn test_run_without_categories() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let prefix = write_markers(dir.path())?;
        let config: Config = format!(
            r#"
prefix = "{}"
markers = ["rs699", "rs4762", "rs11122576"]
print_categories = false

[[three_way]]
condition = "rs699"
category = "G|G"
a = "rs4762"
b = "rs11122576"
"#,
            prefix
        )
        .parse()?;

        let mut out = Vec::new();
        run(&config, &mut out)?;
        assert_eq!(String::from_utf8(out)?, THREE_WAY);
        Ok(())
    }

    #[test]
    fn test_count3_accepts_extra_markers() -> Result<(), Box<dyn Error>> {
        let cli = Cli::try_parse_from([
            "popfreq", "count3", "--prefix", "p", "rs699", "G|G", "rs4762", "rs1", "--markers",
            "rs9", "rs10",
        ])?;
        match cli.command {
            Commands::Count3 { a, b, markers, .. } => {
                assert_eq!((a.as_str(), b.as_str()), ("rs4762", "rs1"));
                assert_eq!(markers, vec!["rs9", "rs10"]);
            }
            _ => panic!("expected count3"),
        }

        let cli = Cli::try_parse_from([
            "popfreq", "count3", "--prefix", "p", "rs1", "A", "rs2", "rs3",
        ])?;
        assert!(matches!(
            cli.command,
            Commands::Count3 { ref markers, .. } if markers.is_empty()
        ));
        Ok(())
    }

    #[test]
    fn test_count3_checks_samples_of_extra_markers() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let prefix = write_markers(dir.path())?;
        fs::write(
            format!("{}rs9.csv", prefix),
            "Sample,Population(s),Genotype\nNA1,CEU,C|C\nNA2,CEU,C|C\nNA3,YRI,C|C\n",
        )?;
        let source = MarkerSource::new(&prefix);

        let (a, b) = ("rs4762", "rs11122576");
        let mut out = Vec::new();
        count3(&source, "rs699", "G|G", a, b, &["rs699".to_string()], &mut out)?;
        assert_eq!(String::from_utf8(out)?, THREE_WAY);

        let mut out = Vec::new();
        let result = count3(&source, "rs699", "G|G", a, b, &["rs9".to_string()], &mut out);
        let err = result.expect_err("rs9 lacks NA4");
        assert!(matches!(
            err.downcast_ref::<popfreq::Error>(),
            Some(popfreq::Error::IndexMismatch { .. })
        ));
        assert!(out.is_empty());
        Ok(())
    }
}
