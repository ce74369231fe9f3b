use crate::domain::model::Recording;
use crate::utils::error::Result;
use clap::ValueEnum;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

pub fn write_recordings<W: Write>(
    writer: W,
    recordings: &[Recording],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Table => write_table(writer, recordings),
        OutputFormat::Csv => write_csv(writer, recordings),
        OutputFormat::Json => write_json(writer, recordings),
    }
}

fn write_table<W: Write>(mut writer: W, recordings: &[Recording]) -> Result<()> {
    writeln!(
        writer,
        "{:>12}\t{:>11}\t{:>12}\t{:>19}\t{}",
        "Host WebExID", "RecordingID", "Size", "CreateTime", "Name"
    )?;
    writeln!(
        writer,
        "{:>12}\t{:>11}\t{:>12}\t{:>19}\t{}",
        "------------", "-----------", "----", "----------", "----"
    )?;
    for r in recordings {
        writeln!(
            writer,
            "{:>12}\t{:>11}\t{:>9.3}\t{:>19}\t{}",
            r.host_webex_id, r.recording_id, r.size, r.create_time, r.name
        )?;
    }
    writer.flush()?;
    Ok(())
}

// 即使沒有資料也輸出表頭，方便下游工具解析
fn write_csv<W: Write>(writer: W, recordings: &[Recording]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(Recording::csv_headers())?;
    for r in recordings {
        csv_writer.write_record(r.to_csv_row())?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn write_json<W: Write>(mut writer: W, recordings: &[Recording]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, recordings)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
