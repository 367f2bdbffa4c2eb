use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    assets::background::BackgroundSource,
    encode::{EncodeOpts, OutputFormat},
    foundation::error::{QrloomError, QrloomResult},
    layout::LayoutMode,
    matrix::EcLevel,
    pipeline::{RenderOpts, RenderStats, RenderToFileOpts, render_to_file},
    render::composite::ResizeFilter,
    style::{Preset, StyleConfig},
};

/// A complete render described as JSON.
///
/// ```json
/// {
///   "url": "https://example.com",
///   "background": "art/loop.gif",
///   "out": "out/qr.gif",
///   "preset": "framed",
///   "style": { "dark_color": "#202040" }
/// }
/// ```
///
/// `style` and `layout` replace the preset's values when present. Relative paths are resolved
/// against the directory of the job file by [`RenderJob::from_path`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderJob {
    pub url: String,
    pub background: PathBuf,
    pub out: PathBuf,
    #[serde(default)]
    pub ec_level: EcLevel,
    #[serde(default)]
    pub preset: Preset,
    #[serde(default)]
    pub style: Option<StyleConfig>,
    #[serde(default)]
    pub layout: Option<LayoutMode>,
    /// Delay for frames without a timing hint, in milliseconds.
    #[serde(default)]
    pub frame_delay_ms: Option<u32>,
    #[serde(default)]
    pub override_delays: bool,
    #[serde(default)]
    pub loop_count: u16,
    #[serde(default)]
    pub filter: ResizeFilter,
    #[serde(default)]
    pub format: Option<OutputFormat>,
    #[serde(default = "default_true")]
    pub overwrite: bool,
    /// GIF quantiser speed, `1..=30`.
    #[serde(default = "default_gif_speed")]
    pub gif_speed: i32,
    #[serde(default)]
    pub parallel: bool,
    #[serde(default)]
    pub threads: Option<usize>,
}

fn default_true() -> bool {
    true
}

fn default_gif_speed() -> i32 {
    EncodeOpts::default().gif_speed
}

impl RenderJob {
    /// Parse a job from a JSON reader. Paths are kept as written.
    pub fn from_reader<R: std::io::Read>(r: R) -> QrloomResult<Self> {
        serde_json::from_reader(r).map_err(|e| QrloomError::config(format!("parse job JSON: {e}")))
    }

    /// Parse a job file and resolve its relative paths against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> QrloomResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| QrloomError::io(path, e))?;
        let mut job = Self::from_reader(BufReader::new(f))?;
        if let Some(dir) = path.parent() {
            job.background = resolve(dir, &job.background);
            job.out = resolve(dir, &job.out);
        }
        Ok(job)
    }

    pub fn style(&self) -> StyleConfig {
        self.style.clone().unwrap_or_else(|| self.preset.style())
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout.unwrap_or_else(|| self.preset.layout())
    }

    pub fn background_source(&self) -> BackgroundSource {
        BackgroundSource::path(&self.background)
    }

    pub fn render_opts(&self) -> RenderOpts {
        let defaults = RenderOpts::default();
        RenderOpts {
            ec_level: self.ec_level,
            filter: self.filter,
            default_delay_ms: self.frame_delay_ms.unwrap_or(defaults.default_delay_ms),
            override_delays: self.override_delays,
            loop_count: self.loop_count,
            parallel: self.parallel,
            threads: self.threads,
        }
    }

    pub fn encode_opts(&self) -> EncodeOpts {
        EncodeOpts {
            format: self.format,
            overwrite: self.overwrite,
            gif_speed: self.gif_speed,
        }
    }

    /// Render the job and write its output file.
    #[tracing::instrument(skip_all, fields(out = %self.out.display()))]
    pub fn run(&self) -> QrloomResult<RenderStats> {
        let opts = RenderToFileOpts {
            render: self.render_opts(),
            encode: self.encode_opts(),
        };
        render_to_file(
            &self.url,
            &self.background_source(),
            &self.style(),
            self.layout(),
            &self.out,
            &opts,
        )
    }
}

fn resolve(dir: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() || dir.as_os_str().is_empty() {
        p.to_path_buf()
    } else {
        dir.join(p)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
