//! Charts module - radar and flow diagram construction

mod radar;
mod sankey;

pub use radar::{closed_angles, closed_values, render_charts, RadarError, RADAR_MAX};
pub use sankey::{
    build_figure, extract_edges, DisplayConfig, FlowEdge, SankeyFigure, CANVAS_HEIGHT,
    CANVAS_WIDTH, SANKEY_TITLE, WATERMARK,
};
