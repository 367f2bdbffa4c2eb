use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use crate::encode::writer::check_gif_speed;
use crate::encode::{OutputAnimation, OutputFormat};
use crate::foundation::error::{QrloomError, QrloomResult};

/// Options for [`write_animation`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncodeOpts {
    /// Output container. `None` infers it from the file extension.
    pub format: Option<OutputFormat>,
    /// Whether to replace an existing file at the target path.
    pub overwrite: bool,
    /// GIF quantiser speed, `1..=30`.
    pub gif_speed: i32,
}

impl Default for EncodeOpts {
    fn default() -> Self {
        Self {
            format: None,
            overwrite: true,
            gif_speed: 10,
        }
    }
}

impl EncodeOpts {
    /// Check these options against `out_path` without encoding anything and return the resolved
    /// output format.
    pub fn validate(&self, out_path: &Path) -> QrloomResult<OutputFormat> {
        let format = match self.format {
            Some(f) => f,
            None => OutputFormat::from_path(out_path)?,
        };
        if format == OutputFormat::Gif {
            check_gif_speed(self.gif_speed)?;
        }
        if !self.overwrite && out_path.exists() {
            return Err(QrloomError::config(format!(
                "output file '{}' already exists",
                out_path.display()
            )));
        }
        Ok(format)
    }
}

/// Encode `anim` and write it to `out_path`.
///
/// Bytes go to a temporary file in the target directory which is renamed over `out_path` once
/// the encoder has finished, so a failed encode never leaves a truncated output behind.
#[tracing::instrument(skip_all, fields(out = %out_path.as_ref().display(), frames = anim.frame_count()))]
pub fn write_animation(
    anim: &OutputAnimation,
    out_path: impl AsRef<Path>,
    opts: &EncodeOpts,
) -> QrloomResult<()> {
    let out_path = out_path.as_ref();
    anim.validate()?;

    let format = opts.validate(out_path)?;
    let writer = format.writer(opts.gif_speed);
    let dir = ensure_parent_dir(out_path)?;

    let tmp = tempfile::Builder::new()
        .prefix(".qrloom-")
        .tempfile_in(&dir)
        .map_err(|e| QrloomError::io(&dir, e))?;
    {
        let mut buf = BufWriter::new(tmp.as_file());
        writer.write(anim, &mut buf)?;
        buf.flush().map_err(|e| QrloomError::io(tmp.path(), e))?;
    }

    if opts.overwrite {
        tmp.persist(out_path)
            .map_err(|e| QrloomError::io(out_path, e.error))?;
    } else {
        tmp.persist_noclobber(out_path)
            .map_err(|e| QrloomError::io(out_path, e.error))?;
    }

    tracing::info!(?format, frames = anim.frame_count(), "wrote output");
    Ok(())
}

/// Create the parent directory of `path` if needed and return it.
pub(crate) fn ensure_parent_dir(path: &Path) -> QrloomResult<PathBuf> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| QrloomError::io(&dir, e))?;
    Ok(dir)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/file.rs"]
mod tests;
