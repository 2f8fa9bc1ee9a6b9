use eyre::Result;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt as _, BufWriter};

/// Characters that cannot appear in an output file name.
const BAD_FILENAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '>', '<', '|'];

/// Derives one output path per y column from the `--output` flag and the
/// input file name: `<dir>/<name>-<ycol>.<ext>`.
#[derive(Debug, Clone, PartialEq)]
pub enum Naming {
    Stdout,
    Files {
        dir: PathBuf,
        name: String,
        ext: String,
    },
}

impl Naming {
    pub fn new(output: &str, input: &Path) -> Self {
        if output == "stdout" {
            return Naming::Stdout;
        }

        let (dir, file) = if output.ends_with('/') {
            (PathBuf::from(output), "")
        } else {
            match output.rfind('/') {
                Some(i) => (PathBuf::from(&output[..i + 1]), &output[i + 1..]),
                None => (PathBuf::new(), output),
            }
        };
        let (mut name, mut ext) = split_extension(file);

        let input_name = input
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (input_stem, input_ext) = split_extension(&input_name);
        if name.is_empty() {
            name = input_stem;
        }
        if ext.is_empty() {
            ext = input_ext;
        }

        Naming::Files {
            dir,
            name: name.to_string(),
            ext: ext.to_string(),
        }
    }

    pub fn path_for(&self, ycol: &str) -> Option<PathBuf> {
        match self {
            Naming::Stdout => None,
            Naming::Files { dir, name, ext } => {
                let mut file = format!("{}-{}", name, sanitize(ycol));
                if !ext.is_empty() {
                    file.push('.');
                    file.push_str(ext);
                }
                Some(dir.join(file))
            }
        }
    }
}

pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if BAD_FILENAME_CHARS.contains(&c) { '-' } else { c })
        .collect()
}

fn split_extension(file: &str) -> (&str, &str) {
    match file.rfind('.') {
        Some(i) => (&file[..i], &file[i + 1..]),
        None => (file, ""),
    }
}

// Output is where one decimated series goes. Stdout output is held back
// until the series is complete so that series do not interleave.
#[derive(Debug)]
pub enum Output {
    Stdout(Vec<u8>),
    File(BufWriter<File>),
}

impl Output {
    pub async fn create(path: Option<&Path>) -> Result<Self> {
        match path {
            None => Ok(Output::Stdout(Vec::new())),
            Some(path) => {
                let f = File::create(path).await?;
                Ok(Output::File(BufWriter::new(f)))
            }
        }
    }

    pub async fn close(self) -> Result<()> {
        match self {
            Output::Stdout(buf) => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(&buf).await?;
                stdout.flush().await?;
            }
            Output::File(mut writer) => {
                writer.flush().await?;
            }
        }
        Ok(())
    }
}

impl Output {
    fn sink(self: Pin<&mut Self>) -> Pin<&mut (dyn AsyncWrite + Unpin)> {
        match self.get_mut() {
            Output::Stdout(pending) => Pin::new(pending),
            Output::File(writer) => Pin::new(writer),
        }
    }
}

impl AsyncWrite for Output {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        self.sink().poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.sink().poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.sink().poll_shutdown(cx)
    }
}
