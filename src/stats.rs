use log::info;

/// Counters describing a visualization session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientStats {
    pub ticks_polled: u32,
    pub total_cars_spawned: u32,
    pub total_cars_arrived: u32,
    pub active_cars: u32,
    pub traffic_lights: u32,
    pub scenery_pieces: u32,
    pub failed_requests: u32,
    pub stale_snapshots: u32,
}

impl ClientStats {
    /// Share of spawned cars that reached their destination
    pub fn arrival_rate(&self) -> f32 {
        if self.total_cars_spawned > 0 {
            (self.total_cars_arrived as f32 / self.total_cars_spawned as f32) * 100.0
        } else {
            0.0
        }
    }

    /// Log the end-of-session report
    pub fn log_summary(&self) {
        info!("=== VISUALIZATION COMPLETE ===");
        info!("Ticks polled: {}", self.ticks_polled);
        info!("Cars spawned: {}", self.total_cars_spawned);
        info!("Cars arrived: {}", self.total_cars_arrived);
        info!("Active cars: {}", self.active_cars);
        info!("Traffic lights: {}", self.traffic_lights);
        info!("Scenery pieces: {}", self.scenery_pieces);
        info!("Failed requests: {}", self.failed_requests);
        info!("Stale snapshots dropped: {}", self.stale_snapshots);
        info!("Arrival rate: {:.1}%", self.arrival_rate());
    }
}
