//! Burst arbitration fabric core.
//!
//! This module wires the per-client plumbing to the shared resource. It
//! provides:
//! 1. **Lanes:** One request queue, burst former, staged-burst slot, and
//!    completion queue per client.
//! 2. **Scheduling:** The tick function that fills formers, arbitrates one
//!    grant, and routes completions, as one indivisible round.
//! 3. **Client surface:** Enqueue, frame control, completion draining, and
//!    status observation.
//!
//! The fabric is driven from exactly one place: every mutation happens
//! behind `&mut self`, so the round-robin anchor and the outstanding-grant
//! queue are never touched concurrently.

/// Round-robin grant arbiter.
pub mod arbiter;
/// Per-client burst former.
pub mod burst;
/// Client request queue with in-band frame edges.
pub mod queue;
/// Completion router and per-client completion queues.
pub mod router;
/// Per-client status observation.
pub mod status;

use tracing::{debug, error};

use crate::common::{Access, Burst, ClientId, FabricError, FabricResult, SeqNo, Word};
use crate::config::Config;
use crate::resource::MemoryResource;
use crate::stats::FabricStats;

use arbiter::RoundRobinArbiter;
use burst::BurstFormer;
use queue::RequestQueue;
use router::{CompletionQueue, CompletionRouter};
use status::ClientStatus;

/// Per-client plumbing owned exclusively by one client slot.
struct ClientLane {
    queue: RequestQueue,
    former: BurstFormer,
    /// Completed burst awaiting grant (the former's `Ready` hold).
    staged: Option<Burst>,
    completions: CompletionQueue,
    /// Frame closed after its last word already left the queue; flush once
    /// the staging slot frees up.
    pending_flush: bool,
    /// The next enqueued word opens a frame.
    arm_start: bool,
}

impl ClientLane {
    fn new(client: ClientId, config: &Config) -> Self {
        let f = &config.fabric;
        Self {
            queue: RequestQueue::new(client, f.fifo_depth),
            former: BurstFormer::new(client, f.burst_size),
            staged: None,
            completions: CompletionQueue::new(client, f.completion_depth),
            pending_flush: false,
            arm_start: false,
        }
    }

    /// Moves words from the queue into the former until a burst stages or
    /// input runs dry. At most one burst stages per call; the staging slot
    /// is the backpressure point toward the queue.
    fn fill(&mut self) {
        while self.staged.is_none() {
            if self.pending_flush {
                self.pending_flush = false;
                self.staged = self.former.flush_on_frame_end();
                continue;
            }

            let Some(front) = self.queue.peek() else {
                break;
            };
            if front.starts_frame && self.former.is_filling() {
                // Frame edge without an explicit end marker: cut the old
                // accumulation before the new frame's first word goes in.
                self.staged = self.former.flush_on_frame_end();
                continue;
            }

            let Some(entry) = self.queue.dequeue_for_burst() else {
                break;
            };
            self.staged = self.former.feed(entry);
        }
    }
}

/// Multi-client burst arbitration fabric over one shared resource.
///
/// `N` independent clients enqueue word-granular requests; the fabric packs
/// them into per-client bursts, grants one burst per round to the resource
/// (round-robin among ready clients), and routes read completions back to
/// the issuing client in order. See the module docs for the tick discipline.
pub struct Fabric<R: MemoryResource> {
    lanes: Vec<ClientLane>,
    arbiter: RoundRobinArbiter,
    router: CompletionRouter,
    resource: R,
    stats: FabricStats,
    /// First fatal fault observed; poisons every later tick.
    fault: Option<FabricError>,
}

impl<R: MemoryResource> Fabric<R> {
    /// Builds a fabric from a validated configuration and a resource.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::InvalidConfig`] when the geometry fails
    /// [`Config::validate`].
    pub fn new(config: &Config, resource: R) -> FabricResult<Self> {
        config.validate()?;
        let clients = config.fabric.clients;
        let lanes = (0..clients)
            .map(|c| ClientLane::new(ClientId(c), config))
            .collect();
        Ok(Self {
            lanes,
            arbiter: RoundRobinArbiter::new(clients),
            router: CompletionRouter::new(),
            resource,
            stats: FabricStats::default(),
            fault: None,
        })
    }

    /// Returns the number of clients.
    pub fn clients(&self) -> usize {
        self.lanes.len()
    }

    /// Returns the activity counters.
    pub fn stats(&self) -> &FabricStats {
        &self.stats
    }

    /// Returns the first fatal fault, if the fabric is poisoned.
    pub fn fault(&self) -> Option<&FabricError> {
        self.fault.as_ref()
    }

    /// Returns the shared resource.
    pub fn resource(&self) -> &R {
        &self.resource
    }

    /// Returns the shared resource mutably (setup and inspection).
    pub fn resource_mut(&mut self) -> &mut R {
        &mut self.resource
    }

    /// Opens a frame for `client`; the next enqueued word carries the edge.
    pub fn begin_frame(&mut self, client: ClientId) {
        self.lane_mut(client).arm_start = true;
    }

    /// Closes `client`'s frame.
    ///
    /// The close is a fence: it takes effect only after every word enqueued
    /// before it has passed through the burst former. If the frame's words
    /// have all left the queue already, the former flushes (or simply
    /// deactivates, when empty) on the next round.
    pub fn end_frame(&mut self, client: ClientId) {
        let lane = self.lane_mut(client);
        if !lane.queue.mark_frame_end() {
            if lane.former.is_filling() {
                lane.pending_flush = true;
            } else {
                // Nothing queued, nothing accumulating: the frame closes
                // with no burst emitted.
                let flushed = lane.former.flush_on_frame_end();
                debug_assert!(flushed.is_none());
            }
        }
    }

    /// Enqueues a write word for `client`.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::RequestOverflow`] when the client's queue is
    /// full; the client must retry after backpressure clears.
    pub fn enqueue_write(&mut self, client: ClientId, data: Word) -> FabricResult<SeqNo> {
        self.enqueue(client, Access::Write { data })
    }

    /// Enqueues a read request for `client`.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::RequestOverflow`] when the client's queue is
    /// full; the client must retry after backpressure clears.
    pub fn enqueue_read(&mut self, client: ClientId, addr: u64) -> FabricResult<SeqNo> {
        self.enqueue(client, Access::Read { addr })
    }

    fn enqueue(&mut self, client: ClientId, access: Access) -> FabricResult<SeqNo> {
        let lane = self.lane_mut(client);
        let starts_frame = std::mem::take(&mut lane.arm_start);
        match lane.queue.enqueue(access, starts_frame) {
            Ok(seq) => {
                let occupancy = lane.queue.len();
                self.stats.sample_occupancy(occupancy);
                Ok(seq)
            }
            Err(err) => {
                // The word never entered the stream; the frame edge stays
                // armed for the retry.
                self.lane_mut(client).arm_start = starts_frame;
                self.stats.request_overflows += 1;
                Err(err)
            }
        }
    }

    /// Removes and returns the oldest routed completion for `client`.
    pub fn take_completion(&mut self, client: ClientId) -> Option<Word> {
        self.lane_mut(client).completions.pop()
    }

    /// Observes one client's state without mutating anything.
    pub fn status(&self, client: ClientId) -> ClientStatus {
        let lane = self.lane(client);
        ClientStatus {
            active: lane.former.frame_active() || lane.arm_start,
            fifo_occupancy: lane.queue.len(),
            former_fill: lane.former.fill_count(),
            completion_occupancy: lane.completions.len(),
            overflow: lane.queue.overflow(),
            underflow: lane.queue.underflow(),
        }
    }

    /// Clears `client`'s sticky diagnostic latches.
    pub fn clear_latches(&mut self, client: ClientId) {
        self.lane_mut(client).queue.clear_latches();
    }

    /// Executes one indivisible scheduling round.
    ///
    /// A round fills every former from its queue, issues at most one grant
    /// (submitting the winning burst downstream), advances the resource by
    /// one tick, and routes whatever completions the resource released.
    ///
    /// # Errors
    ///
    /// Returns the fatal fault ([`FabricError::CompletionOverflow`],
    /// [`FabricError::ProtocolOrderViolation`], or
    /// [`FabricError::ResourceFault`]) that poisoned the fabric; every
    /// subsequent call returns the same fault.
    pub fn tick(&mut self) -> FabricResult<()> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }
        self.stats.ticks += 1;

        for lane in &mut self.lanes {
            lane.fill();
        }
        self.arbitrate()?;
        self.resource.tick();
        self.drain_completions()
    }

    /// Runs `rounds` ticks, stopping at the first fatal fault.
    ///
    /// # Errors
    ///
    /// Propagates the first fault surfaced by [`Self::tick`].
    pub fn run(&mut self, rounds: u64) -> FabricResult<()> {
        for _ in 0..rounds {
            self.tick()?;
        }
        Ok(())
    }

    /// Selects and submits this round's winning burst, if any.
    fn arbitrate(&mut self) -> FabricResult<()> {
        if !self.resource.ready() {
            if self.lanes.iter().any(|l| l.staged.is_some()) {
                self.stats.resource_stalls += 1;
            } else {
                self.stats.idle_rounds += 1;
            }
            return Ok(());
        }

        let candidates: Vec<bool> = self.lanes.iter().map(|l| l.staged.is_some()).collect();
        let Some(winner) = self.arbiter.poll_ready(&candidates) else {
            self.stats.idle_rounds += 1;
            return Ok(());
        };

        let Some(granted) = self.lanes[winner.0].staged.take() else {
            debug_assert!(false, "arbiter selected a client with no staged burst");
            return Ok(());
        };
        self.arbiter.grant(winner);

        let reads = granted.read_count();
        if reads > 0 {
            self.router.on_grant(winner, reads);
        }

        self.stats.grants += 1;
        if granted.is_short() {
            self.stats.bursts_flushed += 1;
        } else {
            self.stats.bursts_full += 1;
        }
        self.stats.words_submitted += granted.len() as u64;
        debug!(
            client = winner.0,
            len = granted.len(),
            start = granted.start,
            end = granted.end,
            "burst submitted"
        );

        if let Err(err) = self.resource.submit(granted) {
            return Err(self.poison(err));
        }
        Ok(())
    }

    /// Routes every completion the resource released this round.
    fn drain_completions(&mut self) -> FabricResult<()> {
        while let Some(word) = self.resource.complete() {
            let (client, data) = match self.router.on_completion(word) {
                Ok(routed) => routed,
                Err(err) => return Err(self.poison(err)),
            };
            if let Err(err) = self.lanes[client.0].completions.push(data) {
                return Err(self.poison(err));
            }
            self.stats.completions_routed += 1;
        }
        Ok(())
    }

    /// Latches a fatal fault; the fabric refuses further rounds.
    fn poison(&mut self, err: FabricError) -> FabricError {
        error!(error = %err, "fabric poisoned by fatal fault");
        self.fault = Some(err.clone());
        err
    }

    fn lane(&self, client: ClientId) -> &ClientLane {
        assert!(client.0 < self.lanes.len(), "unknown {client}");
        &self.lanes[client.0]
    }

    fn lane_mut(&mut self, client: ClientId) -> &mut ClientLane {
        assert!(client.0 < self.lanes.len(), "unknown {client}");
        &mut self.lanes[client.0]
    }
}
