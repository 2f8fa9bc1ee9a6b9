use clap::Args;
use decimate::{Codec, CsvCodec, FloatFormat, JsonCodec, Point, Sampler, MIN_POINTS};
use eyre::{Result, WrapErr};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::info;

use crate::columns;
use crate::output::{Naming, Output};

#[derive(Args, Debug)]
pub struct Opts {
    /// X column name. May be a column number starting at 1
    #[clap(long, short = 'x')]
    pub xcol: String,

    /// Y column names/numbers separated by the delimiter. Pass "*" to process every column but x
    #[clap(long, short = 'y')]
    pub ycols: String,

    /// Downsampling y-value tolerance
    #[clap(long, short = 't', env = "DECIMATE_TOLERANCE", default_value_t = 0.1)]
    pub tolerance: f64,

    /// Use the interpolating algorithm. Changes y values
    #[clap(long, short = 'i', default_value_t = false)]
    pub interp: bool,

    /// Delimiter token, e.g. ";" or "\t" ("tab" works too)
    #[clap(long, short = 'd', default_value = ",")]
    pub delimiter: String,

    /// Force output to use comma as delimiter
    #[clap(long, short = 'c', default_value_t = false)]
    pub comma: bool,

    /// Output name, suffixed with each y column. Extension defaults to the input's. "stdout" writes every series to stdout
    #[clap(long, short = 'o', default_value = "")]
    pub output: String,

    /// Floating point format
    #[clap(long = "fformat", short = 'f', default_value = "%.6e")]
    pub float_format: FloatFormat,

    /// Do not write a header row
    #[clap(long, short = 'n', default_value_t = false)]
    pub headerless: bool,

    /// Silent execution (warnings and errors only)
    #[clap(long, short = 's', default_value_t = false)]
    pub silent: bool,

    /// Output encoding (csv, json)
    #[clap(long, default_value = "csv")]
    pub encode: String,

    /// Input file
    pub file: PathBuf,
}

pub async fn run(opts: &Opts) -> Result<()> {
    let delimiter = parse_delimiter(&opts.delimiter)?;
    match opts.encode.as_str() {
        "csv" => {
            let codec = CsvCodec {
                delimiter: if opts.comma { b',' } else { delimiter },
                format: opts.float_format,
            };
            decimate_file(opts, delimiter, codec).await
        }
        "json" => decimate_file(opts, delimiter, JsonCodec).await,
        other => eyre::bail!("unknown encoding: {}", other),
    }
}

/// Single-byte delimiter. `\t`, `tab` and `tabs` spell a tab.
pub fn parse_delimiter(s: &str) -> Result<u8> {
    match s {
        "\\t" | "\t" | "tab" | "tabs" => Ok(b'\t'),
        _ if s.len() == 1 => Ok(s.as_bytes()[0]),
        _ => eyre::bail!(
            "delimiter {:?} should be one character. '\\t' and 'tab' work as an option",
            s
        ),
    }
}

const RECORD_BUFFER: usize = 1024;

// Series is one y column being decimated against the x column.
struct Series {
    name: String,
    column: usize,
    sampler: Sampler,
    output: Output,
    rows: usize,
    retained: usize,
}

async fn decimate_file<C: Codec + Sync>(opts: &Opts, delimiter: u8, codec: C) -> Result<()> {
    let path = opts.file.clone();
    let (rdr, headers) = tokio::task::spawn_blocking(move || -> Result<_> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_path(&path)
            .wrap_err_with(|| format!("opening {}", path.display()))?;
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        Ok((rdr, headers))
    })
    .await??;
    let selection = columns::resolve(
        &headers,
        &opts.xcol,
        &columns::split(&opts.ycols, delimiter),
    )?;
    let xname = headers[selection.x].as_str();

    let naming = Naming::new(&opts.output, &opts.file);
    let mut series = Vec::with_capacity(selection.ys.len());
    for &column in &selection.ys {
        let name = headers[column].clone();
        let path = naming.path_for(&name);
        match &path {
            Some(path) => info!("creating file {}", path.display()),
            None => info!("writing {} to stdout", name),
        }
        let mut output = Output::create(path.as_deref()).await?;
        if !opts.headerless {
            codec.header(&mut output, &[xname, name.as_str()]).await?;
        }
        series.push(Series {
            name,
            column,
            sampler: Sampler::new(opts.tolerance)?.with_interpolation(opts.interp),
            output,
            rows: 0,
            retained: 0,
        });
    }

    // Records are parsed on a blocking thread and handed over through a
    // bounded channel. Dropping the receiver on an error stops the reader.
    let (tx, mut rx) = mpsc::channel(RECORD_BUFFER);
    let reader = tokio::task::spawn_blocking(move || {
        for record in rdr.into_records() {
            if tx.blocking_send(record).is_err() {
                break;
            }
        }
    });

    let mut i = 0u64;
    while let Some(record) = rx.recv().await {
        let record = record?;
        i += 1;
        let line = record.position().map_or(i + 1, |p| p.line());
        let x = parse_field(&record, selection.x, line)?;
        for s in series.iter_mut() {
            let y = parse_field(&record, s.column, line)?;
            let kept = s
                .sampler
                .push(Point::new(x, y))
                .wrap_err_with(|| format!("line {} of {}", line, opts.file.display()))?;
            s.rows += 1;
            if let Some(p) = kept {
                codec.encode(&mut s.output, &p).await?;
                s.retained += 1;
            }
        }
    }

    reader.await?;

    for mut s in series {
        if s.rows < MIN_POINTS {
            eyre::bail!(
                "column {:?}: need at least {} rows to decimate, got {}",
                s.name,
                MIN_POINTS,
                s.rows
            );
        }
        if let Some(p) = s.sampler.finish() {
            codec.encode(&mut s.output, &p).await?;
            s.retained += 1;
        }
        s.output.close().await?;
        info!(
            column = %s.name,
            rows = s.rows,
            retained = s.retained,
            "decimated {:.1}%",
            100.0 * (1.0 - s.retained as f64 / s.rows as f64)
        );
    }

    info!("finished writing files");
    Ok(())
}

fn parse_field(record: &csv::StringRecord, column: usize, line: u64) -> Result<f64> {
    let field = record
        .get(column)
        .ok_or_else(|| eyre::eyre!("line {}: missing column {}", line, column + 1))?;
    field
        .parse()
        .map_err(|e| eyre::eyre!("line {}: column {}: {:?}: {}", line, column + 1, field, e))
}
