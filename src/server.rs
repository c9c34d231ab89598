//! High-level session over an embedded engine world.
//!
//! A [`Server`] owns one [`World`](crate::engine::World), the node and
//! buffer id allocators, and the reply router that fans incoming engine
//! datagrams out to persistent subscribers and one-shot waiters.
//!
//! ```no_run
//! use magnon::{Server, SynthDefBuilder};
//! use magnon::ugens::{Out, SinOsc};
//!
//! let builder = SynthDefBuilder::new();
//! Out::new(SinOsc::new().frequency(440.0).ar() * 0.2).ar();
//! let synthdef = builder.build("sine").unwrap();
//!
//! let server = Server::new(Default::default());
//! server.boot().unwrap();
//! server.send_synthdef(&synthdef).unwrap();
//! let synth = server.synth("sine", &[("frequency", 440.0)]).unwrap();
//! synth.set(&[("frequency", 880.0)]).unwrap();
//! synth.free().unwrap();
//! server.quit().unwrap();
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use rosc::{OscMessage, OscPacket};
use tracing::{debug, info, warn};

use crate::compiler::CompileError;
use crate::engine::{BootStatus, EngineError, Options, ProcessWorld, ReplyCallback, World};
use crate::enums::AddAction;
use crate::osc::{self, replies};
use crate::synthdef::SynthDef;

const FIRST_NODE_ID: i32 = 1000;
const DEFAULT_GROUP: i32 = 1;
const ROOT_NODE: i32 = 0;
const QUIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors raised by session operations.
#[derive(Debug)]
pub enum ServerError {
    /// A command was issued while the session was offline.
    Offline,
    /// Boot was requested while booting or quitting.
    BootWhileBusy(BootStatus),
    /// No reply arrived within the timeout.
    ReplyTimeout { address: String },
    /// The engine boundary failed.
    Engine(EngineError),
    /// A message could not be encoded.
    Encode(rosc::OscError),
    /// A SynthDef could not be compiled for sending.
    Compile(CompileError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Offline => write!(f, "Server is offline"),
            ServerError::BootWhileBusy(status) => {
                write!(f, "Cannot boot while {:?}", status)
            }
            ServerError::ReplyTimeout { address } => {
                write!(f, "Timed out waiting for {}", address)
            }
            ServerError::Engine(error) => write!(f, "Engine error: {}", error),
            ServerError::Encode(error) => write!(f, "OSC encode error: {}", error),
            ServerError::Compile(error) => write!(f, "SynthDef compile error: {}", error),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Engine(error) => Some(error),
            ServerError::Compile(error) => Some(error),
            _ => None,
        }
    }
}

impl From<EngineError> for ServerError {
    fn from(error: EngineError) -> Self {
        ServerError::Engine(error)
    }
}

impl From<CompileError> for ServerError {
    fn from(error: CompileError) -> Self {
        ServerError::Compile(error)
    }
}

/// Handle for removing a persistent reply subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type SubscriberFn = Arc<dyn Fn(&OscMessage) + Send + Sync>;

/// Demultiplexes incoming reply messages by address.
#[derive(Default)]
struct ReplyRouter {
    subscribers: Mutex<HashMap<String, Vec<(u64, SubscriberFn)>>>,
    waiters: Mutex<HashMap<String, Vec<(u64, mpsc::Sender<OscMessage>)>>>,
    next_id: AtomicU64,
}

impl ReplyRouter {
    fn dispatch(&self, datagram: &[u8]) {
        match osc::decode_datagram(datagram) {
            Ok(packet) => self.dispatch_packet(packet),
            Err(error) => debug!("undecodable reply datagram: {}", error),
        }
    }

    fn dispatch_packet(&self, packet: OscPacket) {
        match packet {
            OscPacket::Message(message) => self.route(message),
            OscPacket::Bundle(bundle) => {
                for content in bundle.content {
                    self.dispatch_packet(content);
                }
            }
        }
    }

    fn route(&self, message: OscMessage) {
        let completed = self.waiters.lock().unwrap().remove(&message.addr);
        if let Some(waiters) = completed {
            for (_, sender) in waiters {
                let _ = sender.send(message.clone());
            }
        }
        let subscribers: Vec<SubscriberFn> = self
            .subscribers
            .lock()
            .unwrap()
            .get(&message.addr)
            .map(|entries| entries.iter().map(|(_, f)| f.clone()).collect())
            .unwrap_or_default();
        for subscriber in subscribers {
            // Subscriber panics are contained; the pump must survive them.
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                subscriber(&message)
            }));
            if result.is_err() {
                warn!("subscriber for {} panicked", message.addr);
            }
        }
    }

    fn subscribe(&self, address: &str, subscriber: SubscriberFn) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default()
            .push((id, subscriber));
        SubscriptionId(id)
    }

    fn unsubscribe(&self, address: &str, id: SubscriptionId) {
        if let Some(entries) = self.subscribers.lock().unwrap().get_mut(address) {
            entries.retain(|(existing, _)| *existing != id.0);
        }
    }

    fn register_waiter(&self, address: &str) -> (u64, mpsc::Receiver<OscMessage>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel();
        self.waiters
            .lock()
            .unwrap()
            .entry(address.to_string())
            .or_default()
            .push((id, sender));
        (id, receiver)
    }

    fn cancel_waiter(&self, address: &str, id: u64) {
        if let Some(entries) = self.waiters.lock().unwrap().get_mut(address) {
            entries.retain(|(existing, _)| *existing != id);
        }
    }
}

/// Factory creating the engine world at boot time.
pub type WorldFactory =
    Box<dyn Fn(&Options) -> Result<Box<dyn World>, EngineError> + Send + Sync>;

/// Parsed `/status.reply` contents.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReply {
    pub ugen_count: i32,
    pub synth_count: i32,
    pub group_count: i32,
    pub synthdef_count: i32,
    pub average_cpu_usage: f32,
    pub peak_cpu_usage: f32,
    pub target_sample_rate: f64,
    pub actual_sample_rate: f64,
}

impl StatusReply {
    fn parse(message: &OscMessage) -> Option<StatusReply> {
        use rosc::OscType;
        let int = |index: usize| match message.args.get(index)? {
            OscType::Int(value) => Some(*value),
            _ => None,
        };
        let float = |index: usize| match message.args.get(index)? {
            OscType::Float(value) => Some(*value),
            _ => None,
        };
        let double = |index: usize| match message.args.get(index)? {
            OscType::Double(value) => Some(*value),
            OscType::Float(value) => Some(*value as f64),
            _ => None,
        };
        Some(StatusReply {
            ugen_count: int(1)?,
            synth_count: int(2)?,
            group_count: int(3)?,
            synthdef_count: int(4)?,
            average_cpu_usage: float(5)?,
            peak_cpu_usage: float(6)?,
            target_sample_rate: double(7)?,
            actual_sample_rate: double(8)?,
        })
    }
}

/// A session owning one engine world.
///
/// Lifecycle: `Offline -> Booting -> Online -> Quitting -> Offline`.
/// Node ids are allocated monotonically from 1000 and never reused within
/// a session; buffer ids monotonically from 0.
pub struct Server {
    options: Options,
    status: Mutex<BootStatus>,
    world: Mutex<Option<Box<dyn World>>>,
    next_node_id: AtomicI32,
    next_buffer_id: AtomicI32,
    next_sync_id: AtomicI32,
    allocated_buffers: Mutex<HashSet<i32>>,
    router: Arc<ReplyRouter>,
    synthdefs: Mutex<HashSet<String>>,
    factory: WorldFactory,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("status", &*self.status.lock().unwrap())
            .finish_non_exhaustive()
    }
}

impl Server {
    /// A server that boots an `scsynth` process world.
    pub fn new(options: Options) -> Server {
        Self::with_world_factory(
            options,
            Box::new(|options| {
                ProcessWorld::create(options).map(|world| Box::new(world) as Box<dyn World>)
            }),
        )
    }

    /// A server that runs the engine in-process via libscsynth.
    #[cfg(feature = "embedded-scsynth")]
    pub fn embedded(options: Options) -> Server {
        Self::with_world_factory(
            options,
            Box::new(|options| {
                crate::embedded::EmbeddedWorld::create(options)
                    .map(|world| Box::new(world) as Box<dyn World>)
            }),
        )
    }

    /// A server with a custom world transport (used by tests, and by the
    /// in-process engine feature).
    pub fn with_world_factory(options: Options, factory: WorldFactory) -> Server {
        Server {
            options,
            status: Mutex::new(BootStatus::Offline),
            world: Mutex::new(None),
            next_node_id: AtomicI32::new(FIRST_NODE_ID),
            next_buffer_id: AtomicI32::new(0),
            next_sync_id: AtomicI32::new(0),
            allocated_buffers: Mutex::new(HashSet::new()),
            router: Arc::new(ReplyRouter::default()),
            synthdefs: Mutex::new(HashSet::new()),
            factory,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn status(&self) -> BootStatus {
        *self.status.lock().unwrap()
    }

    pub fn is_online(&self) -> bool {
        self.status() == BootStatus::Online
    }

    // -- Lifecycle ---------------------------------------------------------

    /// Boot the engine world and create the default group.
    ///
    /// A second boot from `Online` is a no-op; booting while `Booting` or
    /// `Quitting` is an error.
    pub fn boot(&self) -> Result<(), ServerError> {
        {
            let mut status = self.status.lock().unwrap();
            match *status {
                BootStatus::Online => return Ok(()),
                BootStatus::Booting | BootStatus::Quitting => {
                    return Err(ServerError::BootWhileBusy(*status));
                }
                BootStatus::Offline => *status = BootStatus::Booting,
            }
        }
        let world = match (self.factory)(&self.options) {
            Ok(world) => world,
            Err(error) => {
                *self.status.lock().unwrap() = BootStatus::Offline;
                return Err(error.into());
            }
        };
        // The callback must be installed before any message is sent, so
        // no early reply is dropped.
        let router = self.router.clone();
        let callback: ReplyCallback = Arc::new(move |datagram| router.dispatch(datagram));
        world.set_reply_callback(Some(callback));
        *self.world.lock().unwrap() = Some(world);
        *self.status.lock().unwrap() = BootStatus::Online;
        self.send(osc::g_new(DEFAULT_GROUP, AddAction::ToHead, ROOT_NODE))?;
        info!("server online at {}:{}", self.options.ip_address, self.options.port);
        Ok(())
    }

    /// Send `/quit`, wait (bounded) for the engine to acknowledge, and
    /// release the world. Idempotent from `Offline`.
    pub fn quit(&self) -> Result<(), ServerError> {
        {
            let mut status = self.status.lock().unwrap();
            if *status != BootStatus::Online {
                return Ok(());
            }
            *status = BootStatus::Quitting;
        }
        let (id, receiver) = self.router.register_waiter(replies::DONE);
        if let Err(error) = self.send_to_world(&osc::quit()) {
            debug!("sending /quit failed: {}", error);
        }
        if receiver.recv_timeout(QUIT_TIMEOUT).is_err() {
            self.router.cancel_waiter(replies::DONE, id);
            debug!("no /done for /quit within {:?}", QUIT_TIMEOUT);
        }
        // Release the world exactly once.
        if let Some(world) = self.world.lock().unwrap().take() {
            world.wait_for_quit(QUIT_TIMEOUT);
            world.set_reply_callback(None);
            world.cleanup();
        }
        *self.status.lock().unwrap() = BootStatus::Offline;
        info!("server offline");
        Ok(())
    }

    // -- Allocation --------------------------------------------------------

    /// Allocate a node id. Monotonic from 1000; thread-safe.
    pub fn next_node_id(&self) -> i32 {
        self.next_node_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Allocate a buffer id. Monotonic from 0; thread-safe.
    pub fn next_buffer_id(&self) -> i32 {
        loop {
            let id = self.next_buffer_id.fetch_add(1, Ordering::Relaxed);
            let mut allocated = self.allocated_buffers.lock().unwrap();
            if allocated.insert(id) {
                return id;
            }
        }
    }

    /// Buffer ids currently tracked as allocated.
    pub fn allocated_buffers(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self
            .allocated_buffers
            .lock()
            .unwrap()
            .iter()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    // -- Message transport -------------------------------------------------

    /// Send a message to the engine.
    ///
    /// Fails while `Offline`; messages sent while `Quitting` are dropped
    /// after logging.
    pub fn send(&self, message: OscMessage) -> Result<(), ServerError> {
        match self.status() {
            BootStatus::Offline => Err(ServerError::Offline),
            BootStatus::Quitting => {
                debug!("dropping {} while quitting", message.addr);
                Ok(())
            }
            BootStatus::Booting | BootStatus::Online => self.send_to_world(&message),
        }
    }

    fn send_to_world(&self, message: &OscMessage) -> Result<(), ServerError> {
        let datagram = osc::encode_message(message).map_err(ServerError::Encode)?;
        let world = self.world.lock().unwrap();
        match world.as_ref() {
            Some(world) => world.send_packet(&datagram).map_err(ServerError::Engine),
            None => Err(ServerError::Offline),
        }
    }

    /// Register a persistent subscriber for a reply address.
    pub fn on(
        &self,
        address: &str,
        subscriber: impl Fn(&OscMessage) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.router.subscribe(address, Arc::new(subscriber))
    }

    /// Remove a subscriber registered with [`on`](Self::on).
    pub fn off(&self, address: &str, id: SubscriptionId) {
        self.router.unsubscribe(address, id);
    }

    /// Block until a reply with the given address arrives, or time out.
    pub fn wait_for_reply(
        &self,
        address: &str,
        timeout: Duration,
    ) -> Result<OscMessage, ServerError> {
        let (id, receiver) = self.router.register_waiter(address);
        match receiver.recv_timeout(timeout) {
            Ok(message) => Ok(message),
            Err(_) => {
                self.router.cancel_waiter(address, id);
                Err(ServerError::ReplyTimeout {
                    address: address.to_string(),
                })
            }
        }
    }

    /// Register a waiter, send, and wait: the atomic combination that
    /// cannot miss a reply arriving between send and wait.
    pub fn send_msg_sync(
        &self,
        message: OscMessage,
        reply_address: &str,
        timeout: Duration,
    ) -> Result<OscMessage, ServerError> {
        let (id, receiver) = self.router.register_waiter(reply_address);
        if let Err(error) = self.send(message) {
            self.router.cancel_waiter(reply_address, id);
            return Err(error);
        }
        match receiver.recv_timeout(timeout) {
            Ok(message) => Ok(message),
            Err(_) => {
                self.router.cancel_waiter(reply_address, id);
                Err(ServerError::ReplyTimeout {
                    address: reply_address.to_string(),
                })
            }
        }
    }

    /// Request `/status` and parse the `/status.reply`.
    pub fn request_status(&self, timeout: Duration) -> Result<StatusReply, ServerError> {
        let reply = self.send_msg_sync(osc::status(), replies::STATUS_REPLY, timeout)?;
        StatusReply::parse(&reply).ok_or(ServerError::ReplyTimeout {
            address: replies::STATUS_REPLY.to_string(),
        })
    }

    /// Send `/sync` and wait for the matching `/synced`.
    pub fn sync(&self, timeout: Duration) -> Result<(), ServerError> {
        let sync_id = self.next_sync_id.fetch_add(1, Ordering::Relaxed);
        let reply = self.send_msg_sync(osc::sync(sync_id), replies::SYNCED, timeout)?;
        debug!("synced: {:?}", reply.args);
        Ok(())
    }

    // -- SynthDefs ---------------------------------------------------------

    /// Compile a SynthDef and install it with `/d_recv`.
    pub fn send_synthdef(&self, synthdef: &SynthDef) -> Result<(), ServerError> {
        let data = synthdef.compile()?;
        self.send(osc::d_recv(data))?;
        self.synthdefs
            .lock()
            .unwrap()
            .insert(synthdef.effective_name().to_string());
        Ok(())
    }

    /// Install a SynthDef and wait for the server to acknowledge it, so a
    /// following `/s_new` is guaranteed to find it.
    pub fn send_synthdef_sync(
        &self,
        synthdef: &SynthDef,
        timeout: Duration,
    ) -> Result<(), ServerError> {
        let data = synthdef.compile()?;
        self.send_msg_sync(osc::d_recv(data), replies::DONE, timeout)?;
        self.synthdefs
            .lock()
            .unwrap()
            .insert(synthdef.effective_name().to_string());
        Ok(())
    }

    // -- Nodes -------------------------------------------------------------

    /// Create a synth at the head of the default group.
    pub fn synth(&self, name: &str, controls: &[(&str, f32)]) -> Result<Synth<'_>, ServerError> {
        self.synth_with(name, AddAction::ToHead, DEFAULT_GROUP, controls)
    }

    /// Create a synth with explicit placement.
    pub fn synth_with(
        &self,
        name: &str,
        add_action: AddAction,
        target_id: i32,
        controls: &[(&str, f32)],
    ) -> Result<Synth<'_>, ServerError> {
        if !self.is_online() {
            return Err(ServerError::Offline);
        }
        let node_id = self.next_node_id();
        self.send(osc::s_new(name, node_id, add_action, target_id, controls))?;
        Ok(Synth {
            server: self,
            node_id,
        })
    }

    /// Install a SynthDef (if needed) and immediately create a synth.
    pub fn play(
        &self,
        synthdef: &SynthDef,
        controls: &[(&str, f32)],
    ) -> Result<Synth<'_>, ServerError> {
        let name = synthdef.effective_name().to_string();
        if !self.synthdefs.lock().unwrap().contains(&name) {
            self.send_synthdef(synthdef)?;
        }
        self.synth(&name, controls)
    }

    /// Create a group at the head of the root node.
    pub fn group(&self) -> Result<Group<'_>, ServerError> {
        self.group_with(AddAction::ToHead, ROOT_NODE)
    }

    /// Create a group with explicit placement.
    pub fn group_with(
        &self,
        add_action: AddAction,
        target_id: i32,
    ) -> Result<Group<'_>, ServerError> {
        if !self.is_online() {
            return Err(ServerError::Offline);
        }
        let node_id = self.next_node_id();
        self.send(osc::g_new(node_id, add_action, target_id))?;
        Ok(Group {
            server: self,
            node_id,
        })
    }

    /// Free a node by id.
    pub fn free_node(&self, node_id: i32) -> Result<(), ServerError> {
        self.send(osc::n_free(node_id))
    }

    /// Set controls on a node by id.
    pub fn set_node(&self, node_id: i32, controls: &[(&str, f32)]) -> Result<(), ServerError> {
        self.send(osc::n_set(node_id, controls))
    }

    // -- Buffers -----------------------------------------------------------

    /// Allocate an empty buffer.
    pub fn allocate_buffer(
        &self,
        frame_count: i32,
        channel_count: i32,
    ) -> Result<Buffer<'_>, ServerError> {
        if !self.is_online() {
            return Err(ServerError::Offline);
        }
        let buffer_id = self.next_buffer_id();
        self.send(osc::b_alloc(buffer_id, frame_count, channel_count))?;
        Ok(Buffer {
            server: self,
            buffer_id,
        })
    }

    /// Allocate a buffer with an explicit id.
    pub fn allocate_buffer_with_id(
        &self,
        buffer_id: i32,
        frame_count: i32,
        channel_count: i32,
    ) -> Result<Buffer<'_>, ServerError> {
        if !self.is_online() {
            return Err(ServerError::Offline);
        }
        self.allocated_buffers.lock().unwrap().insert(buffer_id);
        self.send(osc::b_alloc(buffer_id, frame_count, channel_count))?;
        Ok(Buffer {
            server: self,
            buffer_id,
        })
    }

    /// Allocate a buffer and read a sound file into it. Zero frames means
    /// the whole file.
    pub fn allocate_read_buffer(
        &self,
        path: &str,
        starting_frame: i32,
        frame_count: i32,
    ) -> Result<Buffer<'_>, ServerError> {
        if !self.is_online() {
            return Err(ServerError::Offline);
        }
        let buffer_id = self.next_buffer_id();
        self.send(osc::b_alloc_read(
            buffer_id,
            path,
            starting_frame,
            frame_count,
        ))?;
        Ok(Buffer {
            server: self,
            buffer_id,
        })
    }

    /// Free a buffer by id and drop it from the allocated set.
    pub fn free_buffer(&self, buffer_id: i32) -> Result<(), ServerError> {
        self.allocated_buffers.lock().unwrap().remove(&buffer_id);
        self.send(osc::b_free(buffer_id))
    }

    // -- Managed resources -------------------------------------------------

    /// Create a synth that is freed when the guard drops.
    pub fn managed_synth(
        &self,
        name: &str,
        controls: &[(&str, f32)],
    ) -> Result<ManagedSynth<'_>, ServerError> {
        Ok(ManagedSynth {
            synth: self.synth(name, controls)?,
        })
    }

    /// Create a group that is freed when the guard drops.
    pub fn managed_group(&self) -> Result<ManagedGroup<'_>, ServerError> {
        Ok(ManagedGroup {
            group: self.group()?,
        })
    }

    /// Allocate a buffer that is freed when the guard drops.
    pub fn managed_buffer(
        &self,
        frame_count: i32,
        channel_count: i32,
    ) -> Result<ManagedBuffer<'_>, ServerError> {
        Ok(ManagedBuffer {
            buffer: self.allocate_buffer(frame_count, channel_count)?,
        })
    }

    /// Allocate-and-read a buffer that is freed when the guard drops.
    pub fn managed_read_buffer(
        &self,
        path: &str,
        starting_frame: i32,
        frame_count: i32,
    ) -> Result<ManagedBuffer<'_>, ServerError> {
        Ok(ManagedBuffer {
            buffer: self.allocate_read_buffer(path, starting_frame, frame_count)?,
        })
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if self.is_online() {
            let _ = self.quit();
        }
    }
}

/// Lightweight handle to a synth node. Compares equal to its node id.
#[derive(Debug)]
pub struct Synth<'a> {
    server: &'a Server,
    node_id: i32,
}

impl Synth<'_> {
    pub fn id(&self) -> i32 {
        self.node_id
    }

    /// Set control values on this synth.
    pub fn set(&self, controls: &[(&str, f32)]) -> Result<(), ServerError> {
        self.server.set_node(self.node_id, controls)
    }

    /// Free this synth.
    pub fn free(&self) -> Result<(), ServerError> {
        self.server.free_node(self.node_id)
    }
}

impl PartialEq<i32> for Synth<'_> {
    fn eq(&self, other: &i32) -> bool {
        self.node_id == *other
    }
}

/// Lightweight handle to a group node. Compares equal to its node id.
#[derive(Debug)]
pub struct Group<'a> {
    server: &'a Server,
    node_id: i32,
}

impl Group<'_> {
    pub fn id(&self) -> i32 {
        self.node_id
    }

    /// Free this group.
    pub fn free(&self) -> Result<(), ServerError> {
        self.server.free_node(self.node_id)
    }
}

impl PartialEq<i32> for Group<'_> {
    fn eq(&self, other: &i32) -> bool {
        self.node_id == *other
    }
}

/// Handle to an allocated buffer. Compares equal to its buffer id.
#[derive(Debug)]
pub struct Buffer<'a> {
    server: &'a Server,
    buffer_id: i32,
}

impl Buffer<'_> {
    pub fn id(&self) -> i32 {
        self.buffer_id
    }

    /// Read part of a sound file into this buffer.
    pub fn read(
        &self,
        path: &str,
        file_starting_frame: i32,
        frame_count: i32,
        buffer_starting_frame: i32,
        leave_open: bool,
    ) -> Result<(), ServerError> {
        self.server.send(osc::b_read(
            self.buffer_id,
            path,
            file_starting_frame,
            frame_count,
            buffer_starting_frame,
            leave_open,
        ))
    }

    /// Write this buffer's contents to a sound file.
    pub fn write(
        &self,
        path: &str,
        header_format: &str,
        sample_format: &str,
        frame_count: i32,
        starting_frame: i32,
        leave_open: bool,
    ) -> Result<(), ServerError> {
        self.server.send(osc::b_write(
            self.buffer_id,
            path,
            header_format,
            sample_format,
            frame_count,
            starting_frame,
            leave_open,
        ))
    }

    /// Zero this buffer's contents.
    pub fn zero(&self) -> Result<(), ServerError> {
        self.server.send(osc::b_zero(self.buffer_id))
    }

    /// Close this buffer's open sound file.
    pub fn close(&self) -> Result<(), ServerError> {
        self.server.send(osc::b_close(self.buffer_id))
    }

    /// Free this buffer.
    pub fn free(&self) -> Result<(), ServerError> {
        self.server.free_buffer(self.buffer_id)
    }
}

impl PartialEq<i32> for Buffer<'_> {
    fn eq(&self, other: &i32) -> bool {
        self.buffer_id == *other
    }
}

/// RAII guard freeing a synth on drop (on every exit path, including
/// panics). The free is skipped if the session is no longer online.
#[derive(Debug)]
pub struct ManagedSynth<'a> {
    synth: Synth<'a>,
}

impl<'a> std::ops::Deref for ManagedSynth<'a> {
    type Target = Synth<'a>;

    fn deref(&self) -> &Synth<'a> {
        &self.synth
    }
}

impl Drop for ManagedSynth<'_> {
    fn drop(&mut self) {
        if self.synth.server.is_online() {
            if let Err(error) = self.synth.free() {
                debug!("managed synth free failed: {}", error);
            }
        }
    }
}

/// RAII guard freeing a group on drop.
#[derive(Debug)]
pub struct ManagedGroup<'a> {
    group: Group<'a>,
}

impl<'a> std::ops::Deref for ManagedGroup<'a> {
    type Target = Group<'a>;

    fn deref(&self) -> &Group<'a> {
        &self.group
    }
}

impl Drop for ManagedGroup<'_> {
    fn drop(&mut self) {
        if self.group.server.is_online() {
            if let Err(error) = self.group.free() {
                debug!("managed group free failed: {}", error);
            }
        }
    }
}

/// RAII guard freeing a buffer on drop.
#[derive(Debug)]
pub struct ManagedBuffer<'a> {
    buffer: Buffer<'a>,
}

impl<'a> std::ops::Deref for ManagedBuffer<'a> {
    type Target = Buffer<'a>;

    fn deref(&self) -> &Buffer<'a> {
        &self.buffer
    }
}

impl Drop for ManagedBuffer<'_> {
    fn drop(&mut self) {
        if self.buffer.server.is_online() {
            if let Err(error) = self.buffer.free() {
                debug!("managed buffer free failed: {}", error);
            }
        }
    }
}
