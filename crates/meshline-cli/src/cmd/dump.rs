//! Dump subcommand - descriptors as JSON Lines

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use meshline_desc::{DescriptorRecord, ParseError, parse_mesh};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// MeSH descriptor XML file (plain or .gz)
    pub input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of descriptors to write
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Pretty-print each record
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: DumpArgs, config: &Config) -> Result<()> {
    let pretty = args.pretty || config.dump.pretty;
    let stream = parse_mesh(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let limit = args.limit.unwrap_or(usize::MAX);

    let written = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_records(stream.take(limit), BufWriter::new(file), pretty)?
        }
        None => write_records(stream.take(limit), std::io::stdout().lock(), pretty)?,
    };

    log::info!("Wrote {written} descriptors");
    Ok(())
}

/// Serialize records one per line (or per block when `pretty`).
///
/// Stops at the first parse error; records before it are already written.
pub fn write_records<I, W>(records: I, mut out: W, pretty: bool) -> Result<usize>
where
    I: Iterator<Item = Result<DescriptorRecord, ParseError>>,
    W: Write,
{
    let mut written = 0;
    for rec in records {
        let rec = rec.with_context(|| format!("Failed after {written} descriptors"))?;
        if pretty {
            serde_json::to_writer_pretty(&mut out, &rec)?;
        } else {
            serde_json::to_writer(&mut out, &rec)?;
        }
        out.write_all(b"\n")?;
        written += 1;
    }
    out.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<DescriptorRecordSet>
        <DescriptorRecord><DescriptorUI>D000001</DescriptorUI>
          <DescriptorName><String>Calcimycin</String></DescriptorName></DescriptorRecord>
        <DescriptorRecord><DescriptorUI>D000002</DescriptorUI>
          <DescriptorName><String>Temefos</String></DescriptorName></DescriptorRecord>
        </DescriptorRecordSet>"#;

    fn records(doc: &str) -> impl Iterator<Item = Result<DescriptorRecord, ParseError>> + '_ {
        meshline_desc::DescriptorStream::from_reader(doc.as_bytes())
    }

    #[test]
    fn one_record_per_line() {
        let mut out = Vec::new();
        let n = write_records(records(DOC), &mut out, false).unwrap();
        assert_eq!(n, 2);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["ui"], "D000001");
        assert_eq!(first["name"], "Calcimycin");
    }

    #[test]
    fn pretty_output_spans_lines() {
        let mut out = Vec::new();
        write_records(records(DOC).take(1), &mut out, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().count() > 1);
        assert!(text.contains("\"ui\": \"D000001\""));
    }

    #[test]
    fn parse_error_after_written_records() {
        let doc = "<DescriptorRecordSet><DescriptorRecord><DescriptorUI>D1</DescriptorUI></DescriptorRecord><DescriptorRecord><DescriptorUI>";
        let mut out = Vec::new();
        let err = write_records(records(doc), &mut out, false).unwrap_err();
        assert!(err.to_string().contains("after 1 descriptors"));
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
