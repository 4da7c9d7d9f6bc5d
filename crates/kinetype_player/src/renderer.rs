// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON-lines frame sink.
//!
//! Stands in for the tile-warp canvas: every rendered frame becomes one JSON
//! object holding the frame, its time and the parameters the sketch would
//! draw with.

use kinetype_timeline::{Frame, ParameterSet, Renderer};
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct FrameRecord<'a> {
    frame: Frame,
    time: f64,
    parameters: &'a ParameterSet,
}

/// Writes one JSON object per rendered frame
pub struct JsonLinesRenderer<W: Write> {
    out: W,
    frame_rate: f64,
    written: usize,
    error: Option<std::io::Error>,
}

impl<W: Write> JsonLinesRenderer<W> {
    /// Create a renderer writing to `out`
    pub fn new(out: W, frame_rate: f64) -> Self {
        Self {
            out,
            frame_rate,
            written: 0,
            error: None,
        }
    }

    /// Frames written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and report the first write error, if any
    pub fn finish(mut self) -> std::io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_record(&mut self, parameters: &ParameterSet, frame: Frame) -> std::io::Result<()> {
        let time = if self.frame_rate > 0.0 {
            f64::from(frame) / self.frame_rate
        } else {
            0.0
        };
        let record = FrameRecord { frame, time, parameters };
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn render(&mut self, parameters: &ParameterSet, frame: Frame) {
        // Stop writing after the first failure; `finish` reports it.
        if self.error.is_some() {
            return;
        }
        match self.write_record(parameters, frame) {
            Ok(()) => self.written += 1,
            Err(e) => {
                tracing::error!("Failed to write frame {frame}: {e}");
                self.error = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_line_per_frame() {
        let mut renderer = JsonLinesRenderer::new(Vec::new(), 30.0);
        let params = ParameterSet::new().with("tilesX", 8.0).with("offset", 2.5);
        renderer.render(&params, 0);
        renderer.render(&params, 15);
        assert_eq!(renderer.written(), 2);

        let out = String::from_utf8(renderer.finish().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["frame"], 15);
        assert_eq!(second["time"], 0.5);
        assert_eq!(second["parameters"]["tilesX"], 8.0);
        assert_eq!(second["parameters"]["offset"], 2.5);
    }

    #[test]
    fn test_parameter_order_is_preserved() {
        let mut renderer = JsonLinesRenderer::new(Vec::new(), 30.0);
        let params = ParameterSet::new().with("b", 1.0).with("a", 2.0);
        renderer.render(&params, 1);
        let out = String::from_utf8(renderer.finish().unwrap()).unwrap();
        let b = out.find("\"b\"").unwrap();
        let a = out.find("\"a\"").unwrap();
        assert!(b < a);
    }
}
