//! Control Unit receiver
//!
//! Joins the edge handler (producer, interrupt context) and the reader
//! (consumer, task context) through a single published-word slot.
//!
//! # Concurrency
//!
//! All shared state lives in one [`LinkState`] behind a critical-section
//! mutex. The edge handler holds it only for one classify-and-shift step and
//! never waits. Readers sleep on a [`Signal`] the handler raises after each
//! publication, and `stop()` raises it too so no reader is left hanging.

use core::cell::RefCell;

use embassy_futures::select::select;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;

use trackbus_hal::{Edge, EdgeTimer};
use trackbus_protocol::RawWord;

use crate::assembler::WordAssembler;
use crate::config::ReceiverConfig;
use crate::timing::{Classifier, TimingError};

/// State shared between the edge handler and readers
struct LinkState {
    classifier: Classifier,
    assembler: WordAssembler,
    /// Latest unread word, overwritten by newer ones
    published: Option<RawWord>,
    running: bool,
}

impl LinkState {
    const fn new(config: &ReceiverConfig) -> Self {
        Self {
            classifier: Classifier::new(config.timing),
            assembler: WordAssembler::new(config.timing.word_bits),
            published: None,
            running: false,
        }
    }

    fn restart(&mut self) {
        self.classifier.reset();
        self.assembler.reset();
    }
}

/// Outcome of checking the slot
enum Slot {
    Word(RawWord),
    Empty,
    Stopped,
}

/// Connection to a Control Unit
///
/// `T` is the platform's edge source and clock. The back-end calls
/// [`ControlUnit::on_edge`] for every transition on the sensed pin while
/// listening; the application reads words with [`ControlUnit::read`] or
/// [`ControlUnit::read_timeout`].
pub struct ControlUnit<T> {
    timer: T,
    inverted: bool,
    state: Mutex<CriticalSectionRawMutex, RefCell<LinkState>>,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl<T: EdgeTimer> ControlUnit<T> {
    /// Create a receiver
    ///
    /// `config` must have passed [`ReceiverConfig::validate`]; use
    /// [`ControlUnit::try_new`] to validate at construction.
    pub const fn new(timer: T, config: ReceiverConfig) -> Self {
        Self {
            timer,
            inverted: config.pin.inverted,
            state: Mutex::new(RefCell::new(LinkState::new(&config))),
            wake: Signal::new(),
        }
    }

    /// Validate `config` and create a receiver
    pub fn try_new(timer: T, config: ReceiverConfig) -> Result<Self, TimingError> {
        config.validate()?;
        Ok(Self::new(timer, config))
    }

    /// The platform edge source and clock
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Start receiving data from the Control Unit
    ///
    /// Does nothing if already running.
    pub fn start(&self) {
        let started = self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if state.running {
                return false;
            }
            state.restart();
            state.running = true;
            true
        });

        if started {
            self.timer.listen();
        }
    }

    /// Stop receiving data
    ///
    /// Once this returns, no further word is published, and pending reads
    /// return `None`. A word published before the call can still be read
    /// with [`ControlUnit::try_read`].
    pub fn stop(&self) {
        self.timer.unlisten();
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.running = false;
            state.restart();
        });
        self.wake.signal(());
    }

    /// Drop any partially received word and resynchronize
    pub fn reset(&self) {
        self.state.lock(|state| state.borrow_mut().restart());
    }

    /// Check if the receiver is running
    pub fn is_running(&self) -> bool {
        self.state.lock(|state| state.borrow().running)
    }

    /// Edge handler, timestamped with the receiver's clock
    ///
    /// Safe to call from interrupt context: no allocation, no waiting.
    pub fn on_edge(&self, edge: Edge) {
        self.on_edge_at(edge, self.timer.now_us());
    }

    /// Edge handler for back-ends that capture the timestamp themselves
    ///
    /// `now_us` must come from the same clock as [`EdgeTimer::now_us`].
    pub fn on_edge_at(&self, edge: Edge, now_us: u32) {
        let edge = if self.inverted { edge.inverted() } else { edge };

        let published = self.state.lock(|state| {
            let mut state = state.borrow_mut();
            if !state.running {
                return false;
            }

            let LinkState {
                classifier,
                assembler,
                published,
                ..
            } = &mut *state;

            match classifier
                .feed(edge, now_us)
                .and_then(|symbol| assembler.push(symbol))
            {
                Some(word) => {
                    *published = Some(word);
                    true
                }
                None => false,
            }
        });

        if published {
            self.wake.signal(());
        }
    }

    /// Take the published word without waiting
    pub fn try_read(&self) -> Option<RawWord> {
        self.state.lock(|state| state.borrow_mut().published.take())
    }

    /// Read the next data word
    ///
    /// Waits until a word is published, then returns it and clears the
    /// slot. Returns `None` if the receiver is not running or is stopped
    /// while waiting.
    pub async fn read(&self) -> Option<RawWord> {
        loop {
            match self.take() {
                Slot::Word(word) => return Some(word),
                Slot::Stopped => return None,
                Slot::Empty => self.wake.wait().await,
            }
        }
    }

    /// Read the next data word with timeout
    ///
    /// Returns `None` if no word is published within `timeout_us`, or the
    /// receiver is stopped. Elapsed time is measured with the receiver's
    /// clock; `delay` only puts the caller to sleep in between.
    pub async fn read_timeout<D: DelayNs>(
        &self,
        delay: &mut D,
        timeout_us: u32,
    ) -> Option<RawWord> {
        let start = self.timer.now_us();

        loop {
            match self.take() {
                Slot::Word(word) => return Some(word),
                Slot::Stopped => return None,
                Slot::Empty => {}
            }

            let elapsed = self.timer.now_us().wrapping_sub(start);
            if elapsed >= timeout_us {
                return None;
            }

            select(self.wake.wait(), delay.delay_us(timeout_us - elapsed)).await;
        }
    }

    fn take(&self) -> Slot {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            match state.published.take() {
                Some(word) => Slot::Word(word),
                None if state.running => Slot::Empty,
                None => Slot::Stopped,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embassy_futures::block_on;
    use embassy_futures::join::join;

    use crate::config::PinConfig;
    use crate::timing::{BitTiming, PulseWindow};

    const SYNC_US: u32 = 400;
    const BIT0_US: u32 = 50;
    const BIT1_US: u32 = 100;

    const TIMING: BitTiming = BitTiming {
        bit0: PulseWindow::new(40, 60),
        bit1: PulseWindow::new(90, 110),
        sync_min_us: 300,
        word_bits: 10,
    };

    #[derive(Default)]
    struct MockTimer {
        now: Cell<u32>,
        listening: Cell<bool>,
    }

    impl MockTimer {
        fn set(&self, now_us: u32) {
            self.now.set(now_us);
        }
    }

    impl EdgeTimer for MockTimer {
        fn now_us(&self) -> u32 {
            self.now.get()
        }

        fn listen(&self) {
            self.listening.set(true);
        }

        fn unlisten(&self) {
            self.listening.set(false);
        }
    }

    /// Sleeps in simulated time, delivering scripted edges on the way
    struct SimDelay<'a> {
        cu: &'a ControlUnit<MockTimer>,
        edges: &'a [(Edge, u32)],
        next: usize,
    }

    impl<'a> SimDelay<'a> {
        fn new(cu: &'a ControlUnit<MockTimer>, edges: &'a [(Edge, u32)]) -> Self {
            Self { cu, edges, next: 0 }
        }
    }

    impl DelayNs for SimDelay<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            self.delay_us(ns.div_ceil(1000)).await;
        }

        async fn delay_us(&mut self, us: u32) {
            let timer = self.cu.timer();
            let until = timer.now_us() + us;
            while let Some(&(edge, at)) = self.edges.get(self.next) {
                if at > until {
                    break;
                }
                timer.set(at);
                self.cu.on_edge(edge);
                self.next += 1;
            }
            timer.set(until);
        }
    }

    /// A delay that never ends
    struct Forever;

    impl DelayNs for Forever {
        async fn delay_ns(&mut self, _ns: u32) {
            core::future::pending::<()>().await;
        }
    }

    fn receiver(inverted: bool) -> ControlUnit<MockTimer> {
        let pin = if inverted {
            PinConfig::inverted(2)
        } else {
            PinConfig::new(2)
        };
        ControlUnit::try_new(MockTimer::default(), ReceiverConfig { pin, timing: TIMING }).unwrap()
    }

    const WORD_EDGES: usize = 2 + TIMING.word_bits as usize;

    /// Edge script for one word: idle edge, SYNC, then one interval per bit
    ///
    /// Returns the script and the time of its last edge.
    fn word_edges(start_us: u32, bits: u16) -> ([(Edge, u32); WORD_EDGES], u32) {
        let mut edges = [(Edge::Falling, start_us); WORD_EDGES];
        let mut t = start_us + SYNC_US;
        edges[1] = (Edge::Rising, t);

        for (n, i) in (0..TIMING.word_bits).rev().enumerate() {
            t += if bits >> i & 1 != 0 { BIT1_US } else { BIT0_US };
            edges[n + 2] = (edges[n + 1].0.inverted(), t);
        }
        (edges, t)
    }

    fn feed(cu: &ControlUnit<MockTimer>, edges: &[(Edge, u32)]) {
        for &(edge, at) in edges {
            cu.timer().set(at);
            cu.on_edge(edge);
        }
    }

    #[test]
    fn test_start_stop_drive_timer() {
        let cu = receiver(false);
        assert!(!cu.is_running());

        cu.start();
        assert!(cu.is_running());
        assert!(cu.timer().listening.get());

        // Idempotent
        cu.start();
        assert!(cu.is_running());

        cu.stop();
        assert!(!cu.is_running());
        assert!(!cu.timer().listening.get());
    }

    #[test]
    fn test_sync_and_bits_publish_one_word() {
        let cu = receiver(false);
        cu.start();

        let (edges, _) = word_edges(1_000, 0x2c5);
        feed(&cu, &edges);

        assert_eq!(cu.try_read(), Some(RawWord::new(0x2c5)));
        assert_eq!(cu.try_read(), None);
    }

    #[test]
    fn test_inverted_input_decodes_the_same() {
        let cu = receiver(true);
        cu.start();

        let (edges, _) = word_edges(1_000, 0x3e3);
        feed(&cu, &edges);

        assert_eq!(cu.try_read(), Some(RawWord::new(0x3e3)));
    }

    #[test]
    fn test_glitch_drops_word_and_next_sync_recovers() {
        let cu = receiver(false);
        cu.start();

        let (mut edges, end) = word_edges(1_000, 0x2ff);
        // Stretch the fourth bit interval out of both windows
        edges[5].1 += 20;
        for e in edges.iter_mut().skip(6) {
            e.1 += 20;
        }
        feed(&cu, &edges);
        assert_eq!(cu.try_read(), None);

        let (edges, _) = word_edges(end + 1_000, 0x245);
        feed(&cu, &edges);
        assert_eq!(cu.try_read(), Some(RawWord::new(0x245)));
    }

    #[test]
    fn test_unread_word_is_overwritten() {
        let cu = receiver(false);
        cu.start();

        let (edges, end) = word_edges(0, 0x201);
        feed(&cu, &edges);

        let (edges, _) = word_edges(end + 1_000, 0x202);
        feed(&cu, &edges);

        assert_eq!(cu.try_read(), Some(RawWord::new(0x202)));
        assert_eq!(cu.try_read(), None);
    }

    #[test]
    fn test_reset_drops_partial_word() {
        let cu = receiver(false);
        cu.start();

        let (edges, _) = word_edges(0, 0x2aa);
        feed(&cu, &edges[..6]);
        cu.reset();
        feed(&cu, &edges[6..]);

        assert_eq!(cu.try_read(), None);
    }

    #[test]
    fn test_edges_ignored_before_start_and_after_stop() {
        let cu = receiver(false);

        let (edges, end) = word_edges(0, 0x2aa);
        feed(&cu, &edges);
        assert_eq!(cu.try_read(), None);

        cu.start();
        cu.stop();
        let (edges, _) = word_edges(end + 1_000, 0x2aa);
        feed(&cu, &edges);
        assert_eq!(cu.try_read(), None);
    }

    #[test]
    fn test_read_returns_published_word() {
        let cu = receiver(false);
        cu.start();

        let (edges, _) = word_edges(0, 0x3c1);
        feed(&cu, &edges);

        assert_eq!(block_on(cu.read()), Some(RawWord::new(0x3c1)));
    }

    #[test]
    fn test_read_before_start_returns_none() {
        let cu = receiver(false);
        assert_eq!(block_on(cu.read()), None);
    }

    #[test]
    fn test_pending_read_resolves_on_stop() {
        let cu = receiver(false);
        cu.start();

        let (word, _) = block_on(join(cu.read(), async { cu.stop() }));
        assert_eq!(word, None);
    }

    #[test]
    fn test_read_timeout_expires() {
        let cu = receiver(false);
        cu.start();

        let mut delay = SimDelay::new(&cu, &[]);
        assert_eq!(block_on(cu.read_timeout(&mut delay, 5_000)), None);
        assert_eq!(cu.timer().now_us(), 5_000);
    }

    #[test]
    fn test_read_timeout_gets_word_in_window() {
        let cu = receiver(false);
        cu.start();

        let (edges, end) = word_edges(100, 0x2c5);
        assert!(end < 5_000);

        let mut delay = SimDelay::new(&cu, &edges);
        assert_eq!(
            block_on(cu.read_timeout(&mut delay, 5_000)),
            Some(RawWord::new(0x2c5))
        );
    }

    #[test]
    fn test_read_timeout_word_on_deadline() {
        let cu = receiver(false);
        cu.start();

        let (edges, end) = word_edges(100, 0x2c5);

        // Last bit lands exactly on the deadline
        let mut delay = SimDelay::new(&cu, &edges);
        assert_eq!(
            block_on(cu.read_timeout(&mut delay, end)),
            Some(RawWord::new(0x2c5))
        );
    }

    #[test]
    fn test_read_timeout_word_after_deadline() {
        let cu = receiver(false);
        cu.start();

        let (edges, end) = word_edges(100, 0x2c5);

        let mut delay = SimDelay::new(&cu, &edges);
        assert_eq!(block_on(cu.read_timeout(&mut delay, end - 1)), None);
    }

    #[test]
    fn test_pending_timed_read_resolves_on_stop() {
        let cu = receiver(false);
        cu.start();

        let (word, _) = block_on(join(cu.read_timeout(&mut Forever, 1_000), async {
            cu.stop()
        }));
        assert_eq!(word, None);
    }

    #[test]
    fn test_try_new_rejects_bad_timing() {
        let config = ReceiverConfig {
            pin: PinConfig::new(2),
            timing: BitTiming {
                word_bits: 0,
                ..TIMING
            },
        };
        assert_eq!(
            ControlUnit::try_new(MockTimer::default(), config).err(),
            Some(TimingError::InvalidWordBits)
        );
    }
}
