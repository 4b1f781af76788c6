//! Flow Diagram Module
//! Builds the bipartite record-to-dimension flow graph and the figure
//! document consumed by the interactive HTML report.

use serde::Serialize;

use crate::color::{generate_colors, ChartColor};
use crate::data::{ScoreTable, DIMENSIONS};

/// Diagram title shown above the flow chart.
pub const SANKEY_TITLE: &str = "Teacher Evaluation Dimension Flow";

/// Watermark annotation anchored near the bottom-right corner.
pub const WATERMARK: &str = "Evaluation Analytics";

/// Canvas size of the rendered diagram, in pixels.
pub const CANVAS_WIDTH: u32 = 1200;
pub const CANVAS_HEIGHT: u32 = 800;

/// One strictly-positive record-to-dimension contribution. Node indices are
/// positional: records first in source order, then the five dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    pub source: usize,
    pub target: usize,
    pub value: f64,
}

/// Extract the flow edges for all records. Zero and negative values carry no
/// flow and are omitted; dimension `j` maps to node index `record count + j`.
pub fn extract_edges(table: &ScoreTable) -> Vec<FlowEdge> {
    let mut edges = Vec::new();
    for (record_idx, record) in table.records().iter().enumerate() {
        for (dim_idx, &value) in record.flows.iter().enumerate() {
            if value > 0.0 {
                edges.push(FlowEdge {
                    source: record_idx,
                    target: table.len() + dim_idx,
                    value,
                });
            }
        }
    }
    edges
}

/// Build the full figure for the loaded table. An empty edge list still
/// produces a valid nodes-only figure.
pub fn build_figure(table: &ScoreTable) -> SankeyFigure {
    let record_colors = generate_colors(table.len(), 0.6, 0.9);
    let dimension_colors = generate_colors(DIMENSIONS.len(), 0.8, 0.7);

    let labels: Vec<String> = table
        .records()
        .iter()
        .map(|r| r.label.clone())
        .chain(DIMENSIONS.iter().map(|d| d.to_string()))
        .collect();
    let node_colors: Vec<String> = record_colors
        .iter()
        .chain(dimension_colors.iter())
        .map(ChartColor::rgba)
        .collect();

    let edges = extract_edges(table);
    let link_colors: Vec<String> = edges
        .iter()
        .map(|edge| record_colors[edge.source].muted().rgba())
        .collect();

    SankeyFigure {
        data: vec![SankeyTrace {
            trace_type: "sankey",
            node: NodeBlock {
                pad: 20,
                thickness: 25,
                line: LineStyle {
                    color: "black",
                    width: 0.5,
                },
                label: labels.clone(),
                color: node_colors,
                customdata: labels,
                hovertemplate: "Node: %{customdata}<br>Total score: %{value}<extra></extra>",
            },
            link: LinkBlock {
                source: edges.iter().map(|e| e.source).collect(),
                target: edges.iter().map(|e| e.target).collect(),
                value: edges.iter().map(|e| e.value).collect(),
                color: link_colors,
                hovertemplate: "From %{source.customdata}<br>To %{target.customdata}<br>\
                     Score: %{value:.1f}<extra></extra>",
            },
        }],
        layout: Layout::standard(),
    }
}

/// Serialized figure document: one sankey trace plus the fixed layout.
#[derive(Debug, Serialize)]
pub struct SankeyFigure {
    pub data: Vec<SankeyTrace>,
    pub layout: Layout,
}

#[derive(Debug, Serialize)]
pub struct SankeyTrace {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub node: NodeBlock,
    pub link: LinkBlock,
}

#[derive(Debug, Serialize)]
pub struct NodeBlock {
    pub pad: u32,
    pub thickness: u32,
    pub line: LineStyle,
    pub label: Vec<String>,
    pub color: Vec<String>,
    pub customdata: Vec<String>,
    pub hovertemplate: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LinkBlock {
    pub source: Vec<usize>,
    pub target: Vec<usize>,
    pub value: Vec<f64>,
    pub color: Vec<String>,
    pub hovertemplate: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub width: f64,
}

#[derive(Debug, Serialize)]
pub struct Layout {
    pub title: Title,
    pub font: Font,
    pub paper_bgcolor: &'static str,
    pub plot_bgcolor: &'static str,
    pub height: u32,
    pub width: u32,
    pub showlegend: bool,
    pub margin: Margin,
    pub annotations: Vec<Annotation>,
    pub hovermode: &'static str,
    pub hoverlabel: HoverLabel,
}

#[derive(Debug, Serialize)]
pub struct Title {
    pub text: &'static str,
    pub font: Font,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<&'static str>,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct Margin {
    pub t: u32,
    pub l: u32,
    pub r: u32,
    pub b: u32,
}

#[derive(Debug, Serialize)]
pub struct Annotation {
    pub text: &'static str,
    pub x: f64,
    pub y: f64,
    pub showarrow: bool,
    pub font: Font,
    pub xref: &'static str,
    pub yref: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HoverLabel {
    pub bgcolor: &'static str,
    pub font: Font,
}

impl Layout {
    fn standard() -> Self {
        Layout {
            title: Title {
                text: SANKEY_TITLE,
                font: Font {
                    family: None,
                    size: 24,
                    color: Some("#333333"),
                },
                x: 0.5,
                y: 0.95,
            },
            font: Font {
                family: Some("Arial, sans-serif"),
                size: 12,
                color: Some("#333333"),
            },
            paper_bgcolor: "rgba(250,250,250,0.9)",
            plot_bgcolor: "rgba(250,250,250,0.9)",
            height: CANVAS_HEIGHT,
            width: CANVAS_WIDTH,
            showlegend: false,
            margin: Margin {
                t: 80,
                l: 80,
                r: 80,
                b: 80,
            },
            annotations: vec![Annotation {
                text: WATERMARK,
                x: 0.97,
                y: 0.03,
                showarrow: false,
                font: Font {
                    family: Some("Arial"),
                    size: 10,
                    color: Some("rgba(150,150,150,0.5)"),
                },
                xref: "paper",
                yref: "paper",
            }],
            hovermode: "x",
            hoverlabel: HoverLabel {
                bgcolor: "white",
                font: Font {
                    family: Some("Arial"),
                    size: 12,
                    color: None,
                },
            },
        }
    }
}

/// Viewer configuration for the HTML report: mode bar with line/path
/// annotation and erase tools, and image export matching the canvas at 2x.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfig {
    pub display_mode_bar: bool,
    pub displaylogo: bool,
    pub mode_bar_buttons_to_add: Vec<&'static str>,
    pub to_image_button_options: ImageExportOptions,
}

#[derive(Debug, Serialize)]
pub struct ImageExportOptions {
    pub format: &'static str,
    pub filename: &'static str,
    pub height: u32,
    pub width: u32,
    pub scale: u32,
}

impl DisplayConfig {
    pub fn standard() -> Self {
        DisplayConfig {
            display_mode_bar: true,
            displaylogo: false,
            mode_bar_buttons_to_add: vec!["drawline", "drawopenpath", "eraseshape"],
            to_image_button_options: ImageExportOptions {
                format: "png",
                filename: "teacher_evaluation_sankey",
                height: CANVAS_HEIGHT,
                width: CANVAS_WIDTH,
                scale: 2,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;

    fn record(label: &str, flows: [f64; 5]) -> Record {
        Record {
            label: label.to_string(),
            radar: [3.0, 4.0, 2.0, 5.0, 1.0],
            flows,
        }
    }

    fn table(records: Vec<Record>) -> ScoreTable {
        ScoreTable::from_records(records).unwrap()
    }

    #[test]
    fn test_edges_exclude_zero_values() {
        let table = table(vec![
            record("A", [3.0, 0.0, 0.0, 0.0, 0.0]),
            record("B", [0.0, 5.0, 0.0, 0.0, 0.0]),
        ]);
        let edges = extract_edges(&table);

        assert_eq!(
            edges,
            vec![
                FlowEdge {
                    source: 0,
                    target: 2,
                    value: 3.0
                },
                FlowEdge {
                    source: 1,
                    target: 3,
                    value: 5.0
                },
            ]
        );
    }

    #[test]
    fn test_negative_values_carry_no_flow() {
        let table = table(vec![record("A", [-1.0, 0.0, 2.5, 0.0, -0.5])]);
        let edges = extract_edges(&table);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target, 3);
        assert_eq!(edges[0].value, 2.5);
    }

    #[test]
    fn test_dimension_node_indexing() {
        // With 3 records, dimension 0 sits at node index 3.
        let table = table(vec![
            record("A", [1.0, 0.0, 0.0, 0.0, 0.0]),
            record("B", [1.0, 0.0, 0.0, 0.0, 0.0]),
            record("C", [1.0, 0.0, 0.0, 0.0, 0.0]),
        ]);
        for edge in extract_edges(&table) {
            assert_eq!(edge.target, 3);
        }
    }

    #[test]
    fn test_figure_node_ordering_and_colors() {
        let table = table(vec![
            record("A", [1.0; 5]),
            record("B", [1.0; 5]),
        ]);
        let figure = build_figure(&table);
        let trace = &figure.data[0];

        assert_eq!(trace.node.label.len(), 2 + DIMENSIONS.len());
        assert_eq!(trace.node.label[..2], ["A".to_string(), "B".to_string()]);
        assert_eq!(trace.node.label[2], DIMENSIONS[0]);
        assert_eq!(trace.node.color.len(), trace.node.label.len());
        assert_eq!(trace.node.customdata, trace.node.label);
        // Every edge inherits its source record's hue at reduced opacity.
        assert_eq!(trace.link.color.len(), trace.link.source.len());
        for color in &trace.link.color {
            assert!(color.ends_with("0.3)"), "unexpected link color {color}");
        }
    }

    #[test]
    fn test_empty_edge_list_still_builds() {
        let table = table(vec![record("A", [0.0; 5])]);
        let figure = build_figure(&table);
        let trace = &figure.data[0];

        assert!(trace.link.source.is_empty());
        assert!(trace.link.value.is_empty());
        assert_eq!(trace.node.label.len(), 1 + DIMENSIONS.len());
        serde_json::to_string(&figure).unwrap();
    }

    #[test]
    fn test_layout_and_config_constants() {
        let table = table(vec![record("A", [1.0; 5])]);
        let json = serde_json::to_value(build_figure(&table)).unwrap();

        assert_eq!(json["layout"]["width"], 1200);
        assert_eq!(json["layout"]["height"], 800);
        assert_eq!(json["layout"]["showlegend"], false);
        assert_eq!(json["layout"]["annotations"][0]["text"], WATERMARK);
        assert_eq!(json["layout"]["title"]["text"], SANKEY_TITLE);
        assert_eq!(json["data"][0]["type"], "sankey");

        let config = serde_json::to_value(DisplayConfig::standard()).unwrap();
        assert_eq!(config["displayModeBar"], true);
        assert_eq!(config["displaylogo"], false);
        assert_eq!(config["modeBarButtonsToAdd"][0], "drawline");
        assert_eq!(config["toImageButtonOptions"]["scale"], 2);
        assert_eq!(config["toImageButtonOptions"]["width"], 1200);
    }
}
