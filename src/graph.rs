use std::path::Path;

use anyhow::bail;
use plotly::{
    common::{
        Mode,
        Title,
    },
    layout::{
        Axis,
        Layout,
    },
    ImageFormat,
    Plot,
    Scatter,
};

use crate::types::{
    Result,
    Vector,
};


const IMAGE_WIDTH:  usize = 1280;
const IMAGE_HEIGHT: usize = 960;
const IMAGE_SCALE:  f64   = 1.0;


/// One labelled curve of a plot.
#[derive(Debug, Clone)]
pub struct Series {
    pub x    : Vector<f64>,
    pub y    : Vector<f64>,
    pub name : String,
}


/// A renderable plot, created per plot call and discarded after rendering.
#[derive(Debug, Clone)]
pub struct Graph {
    pub series : Vec<Series>,
    pub xlabel : String,
    pub ylabel : String,
    pub title  : Option<String>,
}

impl Graph {
    pub fn to_plotly(&self) -> Plot {
        let mut plot = Plot::new();

        for series in &self.series {
            let trace = Scatter::from_array(series.x.clone(), series.y.clone())
                .mode(Mode::Lines)
                .name(&series.name);
            plot.add_trace(trace);
        }

        let mut layout = Layout::new()
            .x_axis(Axis::new()
                    .title(Title::new(&self.xlabel)))
            .y_axis(Axis::new()
                    .title(Title::new(&self.ylabel))
                    .zero_line(true));
        if let Some(title) = self.title.as_ref() {
            layout = layout.title(Title::new(title));
        }
        plot.set_layout(layout);

        plot
    }

    pub fn write_html(&self, path: &(impl AsRef<Path> + ?Sized)) {
        self.to_plotly().write_html(path)
    }

    pub fn to_inline_html(&self) -> String {
        self.to_plotly().to_inline_html(None)
    }

    pub fn show(&self) {
        self.to_plotly().show()
    }

    /// Render a static image, format deduced from the file extension.
    pub fn write_image(&self, path: &(impl AsRef<Path> + ?Sized)) -> Result<()> {
        let path = path.as_ref();
        let extension = path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let format = match extension.as_str() {
            "png"          => ImageFormat::PNG,
            "jpg" | "jpeg" => ImageFormat::JPEG,
            "webp"         => ImageFormat::WEBP,
            "svg"          => ImageFormat::SVG,
            "pdf"          => ImageFormat::PDF,
            "eps"          => ImageFormat::EPS,
            _ => bail!("Unsupported image format {:?} of {:?}, available formats: png, jpg, webp, svg, pdf, eps",
                       extension, path),
        };

        self.to_plotly().write_image(path, format, IMAGE_WIDTH, IMAGE_HEIGHT, IMAGE_SCALE);
        Ok(())
    }
}


#[cfg(test)]
mod test {
    use ndarray::Array;

    use super::*;

    #[test]
    fn test_to_plotly_traces() {
        let x = Array::linspace(0.0, 1.0, 5);
        let graph = Graph {
            series: vec![
                Series { x: x.clone(), y: x.mapv(|v| v * v), name: "squared".to_string() },
                Series { x: x.clone(), y: x.clone(),         name: "linear".to_string() },
            ],
            xlabel: "x".to_string(),
            ylabel: "y".to_string(),
            title: None,
        };

        let json = graph.to_plotly().to_json();
        assert!(json.contains("\"squared\""));
        assert!(json.contains("\"linear\""));
        assert!(json.contains("lines"));
    }

    #[test]
    fn test_write_image_rejects_unknown_format() {
        let graph = Graph {
            series: Vec::new(),
            xlabel: String::new(),
            ylabel: String::new(),
            title: None,
        };
        assert!(graph.write_image("plot.bmp").is_err());
        assert!(graph.write_image("plot").is_err());
    }
}
