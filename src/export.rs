use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ExportError;
use crate::types::{ProfileBundle, SpeedSeries};

/// Consumer of computed profiles, e.g. a plotter or a file writer.
pub trait ProfileExporter {
    fn export_bundle(&mut self, bundle: &ProfileBundle, label: &str) -> Result<(), ExportError>;

    fn export_series(&mut self, series: &SpeedSeries, label: &str) -> Result<(), ExportError>;
}

/// Writes each export to `<out_dir>/<label>_<unix seconds>.csv`.
///
/// Existing files are never overwritten: a taken name gets a `_1`, `_2`, ...
/// suffix before the extension.
#[derive(Debug)]
pub struct CsvExporter {
    out_dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            written: Vec::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Files written so far, oldest first.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn create(&mut self, label: &str) -> Result<(PathBuf, BufWriter<File>), ExportError> {
        if label.trim().is_empty() {
            return Err(ExportError::EmptyLabel);
        }
        fs::create_dir_all(&self.out_dir)?;

        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let stem = format!("{}_{}", label, secs);

        for attempt in 0u32.. {
            let path = match attempt {
                0 => self.out_dir.join(format!("{}.csv", stem)),
                n => self.out_dir.join(format!("{}_{}.csv", stem, n)),
            };
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, BufWriter::new(file))),
                // Same label within the same second: try the next suffix
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(ExportError::Io(std::io::Error::new(
            ErrorKind::AlreadyExists,
            format!("no free export name for {}", stem),
        )))
    }
}

impl ProfileExporter for CsvExporter {
    fn export_bundle(&mut self, bundle: &ProfileBundle, label: &str) -> Result<(), ExportError> {
        let (path, mut writer) = self.create(label)?;
        writeln!(writer, "frame,raw,mean,median,polyfit")?;

        let rows = bundle
            .indices()
            .iter()
            .zip(bundle.raw().samples())
            .zip(bundle.mean().values())
            .zip(bundle.median().values())
            .zip(bundle.polyfit().values());
        for ((((frame, raw), mean), median), polyfit) in rows {
            writeln!(
                writer,
                "{},{},{},{},{}",
                frame, raw.speed, mean, median, polyfit
            )?;
        }
        writer.flush()?;

        log::info!("Exported {} profile rows to {:?}", bundle.len(), path);
        self.written.push(path);
        Ok(())
    }

    fn export_series(&mut self, series: &SpeedSeries, label: &str) -> Result<(), ExportError> {
        let (path, mut writer) = self.create(label)?;
        writeln!(writer, "frame,speed")?;
        for s in series.samples() {
            writeln!(writer, "{},{}", s.frame, s.speed)?;
        }
        writer.flush()?;

        log::info!("Exported {} speed rows to {:?}", series.len(), path);
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ProfilePipeline;
    use crate::types::{ProfileConfig, Trajectory};

    fn scratch_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!(
            "speed-profile-{}-{}-{}",
            name,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn test_export_bundle_writes_aligned_rows() {
        let trajectory = Trajectory::from_coords((0..8).map(|i| [i as f64 * 2.0, 0.0, 0.0]));
        let config = ProfileConfig::new(2, 3, 5, 2).unwrap();
        let bundle = ProfilePipeline::new(config).compute(&trajectory, 1.0).unwrap();

        let dir = scratch_dir("bundle");
        let mut exporter = CsvExporter::new(&dir);
        exporter.export_bundle(&bundle, "sprint").unwrap();

        assert_eq!(exporter.written().len(), 1);
        let contents = fs::read_to_string(&exporter.written()[0]).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "frame,raw,mean,median,polyfit");
        assert_eq!(lines.len(), bundle.len() + 1);
        assert!(lines[1].starts_with("0,2,"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_repeated_label_keeps_every_export() {
        let trajectory = Trajectory::from_coords((0..8).map(|i| [i as f64 * 2.0, 0.0, 0.0]));
        let pipeline = ProfilePipeline::new(ProfileConfig::new(2, 3, 5, 2).unwrap());
        let first = pipeline.compute(&trajectory, 1.0).unwrap();
        let second = pipeline.compute(&trajectory, 2.0).unwrap();

        let dir = scratch_dir("repeat");
        let mut exporter = CsvExporter::new(&dir);
        exporter.export_bundle(&first, "run").unwrap();
        exporter.export_bundle(&second, "run").unwrap();

        let written = exporter.written();
        assert_eq!(written.len(), 2);
        assert_ne!(written[0], written[1]);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 2);

        let first_rows = fs::read_to_string(&written[0]).unwrap();
        let second_rows = fs::read_to_string(&written[1]).unwrap();
        assert!(first_rows.lines().nth(1).unwrap().starts_with("0,2,"));
        assert!(second_rows.lines().nth(1).unwrap().starts_with("0,1,"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_export_series_and_empty_label() {
        let trajectory = Trajectory::from_coords([[0.0, 0.0, 0.0], [3.0, 4.0, 0.0]]);
        let (raw, _) = ProfilePipeline::default()
            .compute_raw_only(&trajectory, 1.0)
            .unwrap();

        let dir = scratch_dir("series");
        let mut exporter = CsvExporter::new(&dir);
        assert!(matches!(
            exporter.export_series(&raw, "  "),
            Err(ExportError::EmptyLabel)
        ));

        exporter.export_series(&raw, "preview").unwrap();
        let contents = fs::read_to_string(&exporter.written()[0]).unwrap();
        assert_eq!(contents, "frame,speed\n0,5\n");

        fs::remove_dir_all(&dir).ok();
    }
}
