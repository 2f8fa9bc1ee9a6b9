use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt as _};

use crate::{FloatFormat, Point, Result};

// Codec writes a stream of retained points.
#[async_trait]
pub trait Codec {
    // header writes the column names, if the encoding has a header.
    async fn header<W: AsyncWrite + Unpin + Send>(&self, writer: &mut W, names: &[&str]) -> Result<()>;
    async fn encode<W: AsyncWrite + Unpin + Send>(&self, writer: &mut W, point: &Point) -> Result<()>;
}

/// Delimited text, one `x<delim>y` record per line.
#[derive(Debug, Clone, Copy)]
pub struct CsvCodec {
    pub delimiter: u8,
    pub format: FloatFormat,
}

impl Default for CsvCodec {
    fn default() -> Self {
        CsvCodec {
            delimiter: b',',
            format: FloatFormat::default(),
        }
    }
}

impl CsvCodec {
    fn record<I, T>(&self, fields: I) -> Result<Vec<u8>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(Vec::new());
        wtr.write_record(fields)?;
        wtr.into_inner().map_err(|e| e.into_error().into())
    }
}

#[async_trait]
impl Codec for CsvCodec {
    async fn header<W: AsyncWrite + Unpin + Send>(&self, writer: &mut W, names: &[&str]) -> Result<()> {
        let buf = self.record(names)?;
        writer.write_all(&buf).await?;
        Ok(())
    }

    async fn encode<W: AsyncWrite + Unpin + Send>(&self, writer: &mut W, point: &Point) -> Result<()> {
        let buf = self.record([self.format.render(point.x), self.format.render(point.y)])?;
        writer.write_all(&buf).await?;
        Ok(())
    }
}

/// Newline delimited JSON objects. Has no header.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[async_trait]
impl Codec for JsonCodec {
    async fn header<W: AsyncWrite + Unpin + Send>(&self, _writer: &mut W, _names: &[&str]) -> Result<()> {
        Ok(())
    }

    async fn encode<W: AsyncWrite + Unpin + Send>(&self, writer: &mut W, point: &Point) -> Result<()> {
        let mut buf = serde_json::to_vec(point)?;
        buf.push(b'\n');
        writer.write_all(&buf).await?;
        Ok(())
    }
}
