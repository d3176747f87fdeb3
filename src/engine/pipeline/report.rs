use std::time::Duration;

use tracing::{info, warn};

use crate::engine::types::SensorId;

/// Summary of a finished (or computed) run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub sensors: usize,
    pub fine_rows: usize,
    pub output_rows: usize,
    /// Sensors with no observations in the window, replaced by zeros.
    pub empty_series: Vec<SensorId>,
    pub filled_cells: usize,
    /// Trailing cells left missing by back-fill.
    pub unresolved_cells: usize,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn has_warnings(&self) -> bool {
        !self.empty_series.is_empty() || self.unresolved_cells > 0
    }

    pub fn log(&self) {
        if !self.empty_series.is_empty() {
            let ids: Vec<&str> = self.empty_series.iter().map(SensorId::as_str).collect();
            warn!(
                target: "sensor_slicer::pipeline",
                count = ids.len(),
                sensors = %ids.join(","),
                "Sensors without observations were filled with zeros"
            );
        }
        if self.unresolved_cells > 0 {
            warn!(
                target: "sensor_slicer::pipeline",
                cells = self.unresolved_cells,
                "Trailing gaps could not be back-filled"
            );
        }
        info!(
            target: "sensor_slicer::pipeline",
            sensors = self.sensors,
            fine_rows = self.fine_rows,
            output_rows = self.output_rows,
            filled_cells = self.filled_cells,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "Run complete"
        );
    }
}
