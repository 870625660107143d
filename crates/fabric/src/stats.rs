//! Fabric statistics collection and reporting.
//!
//! This module tracks activity counters for the arbitration fabric. It
//! provides:
//! 1. **Rounds:** Ticks executed, grants issued, and idle rounds.
//! 2. **Bursts:** Full and frame-flushed bursts, and words submitted.
//! 3. **Read path:** Completions routed back to clients.
//! 4. **Faults:** Request overflows observed and high-water occupancy.
//!
//! Counters are updated only inside the fabric's enqueue and tick paths;
//! reading them never perturbs the run.

/// Activity counters for one fabric instance.
#[derive(Clone, Debug, Default)]
pub struct FabricStats {
    /// Scheduling rounds executed.
    pub ticks: u64,
    /// Grants issued (one winning burst each).
    pub grants: u64,
    /// Rounds in which no grant was issued.
    pub idle_rounds: u64,
    /// Rounds skipped because the resource deasserted `ready`.
    pub resource_stalls: u64,
    /// Bursts submitted at full size.
    pub bursts_full: u64,
    /// Bursts cut short by a frame boundary.
    pub bursts_flushed: u64,
    /// Valid words submitted downstream (padding excluded).
    pub words_submitted: u64,
    /// Completion words routed back to clients.
    pub completions_routed: u64,
    /// Requests rejected with an overflow error.
    pub request_overflows: u64,
    /// Highest request-queue occupancy seen on any client.
    pub max_fifo_occupancy: usize,
}

impl FabricStats {
    /// Records a queue occupancy sample for the high-water mark.
    #[inline]
    pub fn sample_occupancy(&mut self, occupancy: usize) {
        if occupancy > self.max_fifo_occupancy {
            self.max_fifo_occupancy = occupancy;
        }
    }

    /// Renders the counters as an aligned text report.
    pub fn report(&self) -> String {
        let granted_rounds = self.grants;
        let grant_rate = if self.ticks == 0 {
            0.0
        } else {
            granted_rounds as f64 / self.ticks as f64
        };
        let mut out = String::new();
        out.push_str("Fabric statistics\n");
        out.push_str(&format!("  ticks              {:>12}\n", self.ticks));
        out.push_str(&format!("  grants             {:>12}\n", self.grants));
        out.push_str(&format!("  idle rounds        {:>12}\n", self.idle_rounds));
        out.push_str(&format!(
            "  resource stalls    {:>12}\n",
            self.resource_stalls
        ));
        out.push_str(&format!("  full bursts        {:>12}\n", self.bursts_full));
        out.push_str(&format!(
            "  flushed bursts     {:>12}\n",
            self.bursts_flushed
        ));
        out.push_str(&format!(
            "  words submitted    {:>12}\n",
            self.words_submitted
        ));
        out.push_str(&format!(
            "  completions routed {:>12}\n",
            self.completions_routed
        ));
        out.push_str(&format!(
            "  request overflows  {:>12}\n",
            self.request_overflows
        ));
        out.push_str(&format!(
            "  max fifo occupancy {:>12}\n",
            self.max_fifo_occupancy
        ));
        out.push_str(&format!("  grant rate         {grant_rate:>12.3}\n"));
        out
    }
}
