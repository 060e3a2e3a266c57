use serde::{Deserialize, Serialize};

/// Camera position handed to the renderer: a web-mercator style center and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

/// Size of the canvas hosting the map, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Center and zoom that fit `bounds` on the canvas.
    ///
    /// `bounds` is `[min_x, max_x, min_y, max_y]`. `padding` is subtracted from
    /// the fitted zoom level, leaving a margin around the data.
    pub fn fit_bounds(&self, bounds: [f64; 4], padding: f64) -> ViewState {
        let x_range = bounds[1] - bounds[0];
        let y_range = bounds[3] - bounds[2];

        let longitude = (bounds[0] + bounds[1]) / 2.0;
        let latitude = (bounds[2] + bounds[3]) / 2.0;

        // 256 px tiles covering 360 x 180 degrees at zoom 0.
        let zoom_x = (360.0 / (x_range / (self.width / 256.0))).log2();
        let zoom_y = (180.0 / (y_range / (self.height / 256.0))).log2();

        ViewState {
            longitude,
            latitude,
            zoom: zoom_x.min(zoom_y) - padding,
        }
    }
}
