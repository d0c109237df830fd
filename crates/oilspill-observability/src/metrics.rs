use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Installs the process-wide Prometheus recorder without its own HTTP
/// listener; the host (`oilspill-api`) scrapes it through its own router.
pub fn init_prometheus_exporter() {
    let builder = PrometheusBuilder::new();
    builder.install_recorder().expect("failed to install Prometheus recorder");
}

/// Installs the recorder with a dedicated listener, for hosts that don't
/// want to wire a `/metrics` route into their own router.
pub fn start_metrics_server(addr: SocketAddr) {
    let builder = PrometheusBuilder::new();
    builder
        .with_http_listener(addr)
        .install_recorder()
        .expect("failed to start metrics server");
}

/// Counters and histograms recorded once per driver tick. Grounded on the
/// teacher's per-domain metrics structs (`IngestMetrics`, `AnomalyMetrics`).
#[derive(Clone, Default)]
pub struct SimulationMetrics;

impl SimulationMetrics {
    pub fn new() -> Self {
        Self
    }

    pub fn record_step(&self, simulation_id: &str) {
        metrics::counter!("oilspill_steps_total", "simulation_id" => simulation_id.to_string()).increment(1);
    }

    pub fn record_step_duration(&self, simulation_id: &str, duration_ms: f64) {
        metrics::histogram!("oilspill_step_duration_ms", "simulation_id" => simulation_id.to_string()).record(duration_ms);
    }

    pub fn record_particles_beached(&self, simulation_id: &str, count: usize) {
        metrics::gauge!("oilspill_particles_beached", "simulation_id" => simulation_id.to_string()).set(count as f64);
    }

    pub fn record_particles_active(&self, simulation_id: &str, count: usize) {
        metrics::gauge!("oilspill_particles_active", "simulation_id" => simulation_id.to_string()).set(count as f64);
    }

    pub fn record_simulation_completed(&self) {
        metrics::counter!("oilspill_simulations_completed_total").increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_metrics_constructs() {
        let _ = SimulationMetrics::new();
    }
}
