//! Artifact Output Module
//! Filename sanitization, atomic file writing, and the interactive HTML
//! report wrapping the flow diagram.

use std::ffi::OsString;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use thiserror::Error;

use crate::charts::{DisplayConfig, SankeyFigure};

/// CDN location of the chart runtime embedded in the HTML report.
const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.32.0.min.js";

#[derive(Error, Debug)]
pub enum OutputError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    #[error("failed to serialize figure: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Make a record label safe for embedding in an artifact filename.
/// Filesystem-hostile characters and control characters become `_`.
pub fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Write `bytes` to `path` through a temporary sibling file renamed into
/// place, so a failed write never leaves a truncated artifact behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    let tmp = tmp_path(path);
    fs::write(&tmp, bytes)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Encode a rendered chart buffer as PNG and write it atomically.
pub fn write_png_atomic(path: &Path, image: &RgbImage) -> Result<(), OutputError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    write_atomic(path, &bytes)
}

/// Write the standalone interactive HTML report for the flow diagram.
pub fn write_sankey_html(path: &Path, figure: &SankeyFigure) -> Result<(), OutputError> {
    let mut html = Vec::new();
    render_html(&mut html, figure)?;
    write_atomic(path, &html)
}

/// Render the full HTML document: the CDN chart runtime, the serialized
/// figure, and the viewer configuration.
fn render_html<W: Write>(writer: &mut W, figure: &SankeyFigure) -> Result<(), OutputError> {
    let figure_json = serde_json::to_string(figure)?;
    let config_json = serde_json::to_string(&DisplayConfig::standard())?;

    write!(
        writer,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <script src="{cdn}" charset="utf-8"></script>
    <style>
        body {{
            margin: 0;
            background: #fafafa;
            font-family: Arial, sans-serif;
        }}
        #sankey {{
            width: {width}px;
            margin: 0 auto;
        }}
    </style>
</head>
<body>
    <div id="sankey"></div>
    <script>
        const figure = {figure_json};
        const config = {config_json};
        Plotly.newPlot("sankey", figure.data, figure.layout, config);
    </script>
</body>
</html>
"#,
        title = crate::charts::SANKEY_TITLE,
        cdn = PLOTLY_CDN,
        width = crate::charts::CANVAS_WIDTH,
        figure_json = figure_json,
        config_json = config_json,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts;
    use crate::data::{Record, ScoreTable};

    fn sample_figure() -> SankeyFigure {
        let table = ScoreTable::from_records(vec![Record {
            label: "Chen".to_string(),
            radar: [3.0, 4.0, 2.0, 5.0, 1.0],
            flows: [2.0, 0.0, 1.0, 0.0, 4.5],
        }])
        .unwrap();
        charts::build_figure(&table)
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("evalviz-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_sanitize_label_replaces_hostile_characters() {
        assert_eq!(sanitize_label("a/b\\c:d*e"), "a_b_c_d_e");
        assert_eq!(sanitize_label("q?r\"s<t>u|v"), "q_r_s_t_u_v");
        assert_eq!(sanitize_label("tab\there"), "tab_here");
        assert_eq!(sanitize_label("Dr. Chen"), "Dr. Chen");
    }

    #[test]
    fn test_write_atomic_leaves_no_temp_file() {
        let dir = temp_dir("atomic");
        let path = dir.join("artifact.txt");

        write_atomic(&path, b"payload").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"payload");
        assert!(!tmp_path(&path).exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_write_atomic_replaces_existing_artifact() {
        let dir = temp_dir("replace");
        let path = dir.join("artifact.txt");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_html_embeds_figure_and_config() {
        let mut html = Vec::new();
        render_html(&mut html, &sample_figure()).unwrap();
        let html = String::from_utf8(html).unwrap();

        assert!(html.contains(PLOTLY_CDN));
        assert!(html.contains("Plotly.newPlot"));
        assert!(html.contains("Chen"));
        assert!(html.contains(charts::SANKEY_TITLE));
        assert!(html.contains("drawline"));
        assert!(html.contains("\"displayModeBar\":true"));
    }

    #[test]
    fn test_written_report_is_stable_across_runs() {
        let dir = temp_dir("stable");
        let first = dir.join("first.html");
        let second = dir.join("second.html");

        write_sankey_html(&first, &sample_figure()).unwrap();
        write_sankey_html(&second, &sample_figure()).unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
        fs::remove_dir_all(&dir).unwrap();
    }
}
