//! Engine boundary: server options, boot states, and the five-operation
//! [`World`] interface to a running scsynth.
//!
//! The synthesis engine itself is an external collaborator. Everything the
//! session layer needs from it fits behind [`World`]: send a packet,
//! install a reply callback, wait for quit, clean up. The default
//! transport spawns an `scsynth` process and talks to it over UDP; the
//! `embedded-scsynth` feature adds an in-process libscsynth shim (see
//! [`crate::embedded`]).
//!
//! At most one world exists per process; creation claims a global slot
//! that is released when the world is cleaned up.

use std::fmt;
use std::io;
use std::net::UdpSocket;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

pub const DEFAULT_IP_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 57110;

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStatus {
    Offline = 0,
    Booting = 1,
    Online = 2,
    Quitting = 3,
}

/// Errors raised by the engine boundary.
#[derive(Debug)]
pub enum EngineError {
    /// A world is already running in this process.
    AlreadyRunning,
    /// World creation failed.
    WorldUnavailable(String),
    /// The scsynth binary could not be found.
    BinaryNotFound,
    /// Process or socket I/O failed.
    Io(io::Error),
    /// The engine did not answer `/status` within the boot timeout.
    BootTimeout,
    /// The options are inconsistent.
    InvalidOptions(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::AlreadyRunning => {
                write!(f, "An engine world is already running in this process")
            }
            EngineError::WorldUnavailable(reason) => {
                write!(f, "World creation failed: {}", reason)
            }
            EngineError::BinaryNotFound => write!(
                f,
                "scsynth not found; install SuperCollider or set SCSYNTH_PATH"
            ),
            EngineError::Io(error) => write!(f, "Engine I/O error: {}", error),
            EngineError::BootTimeout => write!(f, "Timed out waiting for the engine to boot"),
            EngineError::InvalidOptions(reason) => write!(f, "Invalid options: {}", reason),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Io(error) => Some(error),
            _ => None,
        }
    }
}

impl From<io::Error> for EngineError {
    fn from(error: io::Error) -> Self {
        EngineError::Io(error)
    }
}

/// Engine world configuration.
///
/// Field names and defaults follow the engine's world options; unset
/// optional strings are omitted from the command line / world struct.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub num_audio_bus_channels: u32,
    pub num_input_bus_channels: u32,
    pub num_output_bus_channels: u32,
    pub num_control_bus_channels: u32,
    pub block_size: u32,
    pub num_buffers: u32,
    pub max_nodes: u32,
    pub max_graph_defs: u32,
    pub max_wire_bufs: u32,
    pub num_rgens: u32,
    pub max_logins: u32,
    /// Realtime memory pool, in kilobytes.
    pub realtime_memory_size: u32,
    /// 0 means use the hardware default.
    pub preferred_sample_rate: u32,
    /// 0 means use the hardware default.
    pub preferred_hardware_buffer_size: u32,
    pub load_graph_defs: bool,
    pub memory_locking: bool,
    pub realtime: bool,
    pub verbosity: i32,
    pub ugen_plugins_path: Option<String>,
    pub restricted_path: Option<String>,
    pub password: Option<String>,
    pub in_device_name: Option<String>,
    pub out_device_name: Option<String>,
    pub input_streams_enabled: Option<String>,
    pub output_streams_enabled: Option<String>,
    pub shared_memory_id: i32,
    pub safety_clip_threshold: f32,
    pub ip_address: String,
    pub port: u16,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            num_audio_bus_channels: 1024,
            num_input_bus_channels: 8,
            num_output_bus_channels: 8,
            num_control_bus_channels: 16384,
            block_size: 64,
            num_buffers: 1024,
            max_nodes: 1024,
            max_graph_defs: 1024,
            max_wire_bufs: 64,
            num_rgens: 64,
            max_logins: 1,
            realtime_memory_size: 8192,
            preferred_sample_rate: 0,
            preferred_hardware_buffer_size: 0,
            load_graph_defs: true,
            memory_locking: false,
            realtime: true,
            verbosity: 0,
            ugen_plugins_path: None,
            restricted_path: None,
            password: None,
            in_device_name: None,
            out_device_name: None,
            input_streams_enabled: None,
            output_streams_enabled: None,
            shared_memory_id: 0,
            safety_clip_threshold: 1.26,
            ip_address: DEFAULT_IP_ADDRESS.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.num_audio_bus_channels
            < self.num_input_bus_channels + self.num_output_bus_channels
        {
            return Err(EngineError::InvalidOptions(
                "Insufficient audio buses".to_string(),
            ));
        }
        Ok(())
    }

    /// First bus id after the hardware input and output buses.
    pub fn first_private_bus_id(&self) -> u32 {
        self.num_input_bus_channels + self.num_output_bus_channels
    }

    /// Number of audio buses not mapped to hardware.
    pub fn private_audio_bus_channel_count(&self) -> u32 {
        self.num_audio_bus_channels - self.num_input_bus_channels - self.num_output_bus_channels
    }

    /// scsynth command-line arguments equivalent to these options.
    pub fn to_command_line_args(&self) -> Vec<String> {
        let mut args = vec![
            "-u".to_string(),
            self.port.to_string(),
            "-a".to_string(),
            self.num_audio_bus_channels.to_string(),
            "-c".to_string(),
            self.num_control_bus_channels.to_string(),
            "-i".to_string(),
            self.num_input_bus_channels.to_string(),
            "-o".to_string(),
            self.num_output_bus_channels.to_string(),
            "-z".to_string(),
            self.block_size.to_string(),
            "-b".to_string(),
            self.num_buffers.to_string(),
            "-n".to_string(),
            self.max_nodes.to_string(),
            "-d".to_string(),
            self.max_graph_defs.to_string(),
            "-w".to_string(),
            self.max_wire_bufs.to_string(),
            "-r".to_string(),
            self.num_rgens.to_string(),
            "-m".to_string(),
            self.realtime_memory_size.to_string(),
            "-l".to_string(),
            self.max_logins.to_string(),
            "-D".to_string(),
            (self.load_graph_defs as i32).to_string(),
            "-R".to_string(),
            "0".to_string(),
        ];
        if self.preferred_sample_rate > 0 {
            args.push("-S".to_string());
            args.push(self.preferred_sample_rate.to_string());
        }
        if self.preferred_hardware_buffer_size > 0 {
            args.push("-Z".to_string());
            args.push(self.preferred_hardware_buffer_size.to_string());
        }
        if self.memory_locking {
            args.push("-L".to_string());
        }
        if self.verbosity != 0 {
            args.push("-V".to_string());
            args.push(self.verbosity.to_string());
        }
        if let Some(path) = &self.ugen_plugins_path {
            args.push("-U".to_string());
            args.push(path.clone());
        }
        if let Some(path) = &self.restricted_path {
            args.push("-P".to_string());
            args.push(path.clone());
        }
        if let Some(password) = &self.password {
            args.push("-p".to_string());
            args.push(password.clone());
        }
        match (&self.in_device_name, &self.out_device_name) {
            (Some(input), Some(output)) => {
                args.push("-H".to_string());
                args.push(input.clone());
                args.push(output.clone());
            }
            (Some(device), None) | (None, Some(device)) => {
                args.push("-H".to_string());
                args.push(device.clone());
            }
            (None, None) => {}
        }
        if let Some(mask) = &self.input_streams_enabled {
            args.push("-I".to_string());
            args.push(mask.clone());
        }
        if let Some(mask) = &self.output_streams_enabled {
            args.push("-O".to_string());
            args.push(mask.clone());
        }
        args
    }
}

/// Callback receiving raw reply datagrams from the engine.
pub type ReplyCallback = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// The five-operation boundary to a running engine world.
pub trait World: Send + Sync {
    /// Send one datagram to the engine. Thread-safe and non-blocking.
    fn send_packet(&self, datagram: &[u8]) -> Result<(), EngineError>;

    /// Install (or clear) the callback that receives reply datagrams.
    /// Idempotent; callbacks must never panic through the boundary.
    fn set_reply_callback(&self, callback: Option<ReplyCallback>);

    /// Wait for the engine to exit after `/quit`, up to `timeout`.
    /// Returns true if it exited.
    fn wait_for_quit(&self, timeout: Duration) -> bool;

    /// Tear the world down. Idempotent; releases the process-wide world
    /// slot.
    fn cleanup(&self);
}

// One engine world per process.
static WORLD_ACTIVE: AtomicBool = AtomicBool::new(false);

/// RAII claim on the process-wide world slot.
pub(crate) struct WorldSlot(());

pub(crate) fn claim_world_slot() -> Result<WorldSlot, EngineError> {
    if WORLD_ACTIVE.swap(true, Ordering::SeqCst) {
        return Err(EngineError::AlreadyRunning);
    }
    Ok(WorldSlot(()))
}

impl Drop for WorldSlot {
    fn drop(&mut self) {
        WORLD_ACTIVE.store(false, Ordering::SeqCst);
    }
}

fn find_scsynth() -> Result<PathBuf, EngineError> {
    if let Ok(path) = std::env::var("SCSYNTH_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
    }
    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/SuperCollider.app/Contents/Resources/scsynth",
            "/usr/local/bin/scsynth",
            "/opt/homebrew/bin/scsynth",
        ]
    } else {
        &["/usr/bin/scsynth", "/usr/local/bin/scsynth"]
    };
    for candidate in candidates {
        let path = PathBuf::from(candidate);
        if path.exists() {
            return Ok(path);
        }
    }
    // Fall back to PATH resolution by the OS.
    Ok(PathBuf::from("scsynth"))
}

/// A world backed by an `scsynth` child process and a UDP socket.
pub struct ProcessWorld {
    child: Mutex<Option<Child>>,
    socket: UdpSocket,
    server_address: (String, u16),
    callback: Arc<Mutex<Option<ReplyCallback>>>,
    running: Arc<AtomicBool>,
    reader: Mutex<Option<JoinHandle<()>>>,
    _slot: WorldSlot,
}

impl ProcessWorld {
    const BOOT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Spawn scsynth with the given options and wait for it to answer
    /// `/status`.
    pub fn create(options: &Options) -> Result<Self, EngineError> {
        options.validate()?;
        let slot = claim_world_slot()?;
        let binary = find_scsynth()?;
        info!(
            "booting scsynth at {}:{} ({})",
            options.ip_address,
            options.port,
            binary.display()
        );
        let child = Command::new(&binary)
            .args(options.to_command_line_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|error| {
                if error.kind() == io::ErrorKind::NotFound {
                    EngineError::BinaryNotFound
                } else {
                    EngineError::Io(error)
                }
            })?;
        debug!("scsynth started with pid {}", child.id());

        let socket = UdpSocket::bind("127.0.0.1:0")?;
        socket.set_read_timeout(Some(Duration::from_millis(200)))?;
        let world = ProcessWorld {
            child: Mutex::new(Some(child)),
            socket,
            server_address: (options.ip_address.clone(), options.port),
            callback: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(true)),
            reader: Mutex::new(None),
            _slot: slot,
        };
        world.wait_for_boot()?;
        world.start_reader()?;
        Ok(world)
    }

    /// Poll `/status` until the engine answers.
    fn wait_for_boot(&self) -> Result<(), EngineError> {
        let ping = crate::osc::encode_message(&crate::osc::status())
            .map_err(|error| EngineError::WorldUnavailable(error.to_string()))?;
        let started = Instant::now();
        let mut buffer = [0u8; 8192];
        while started.elapsed() < Self::BOOT_TIMEOUT {
            self.send_packet(&ping)?;
            match self.socket.recv_from(&mut buffer) {
                Ok((size, _)) => {
                    if let Ok(rosc::OscPacket::Message(message)) =
                        crate::osc::decode_datagram(&buffer[..size])
                    {
                        if message.addr == crate::osc::replies::STATUS_REPLY {
                            info!(
                                "scsynth is alive (boot took {:.1}s)",
                                started.elapsed().as_secs_f64()
                            );
                            return Ok(());
                        }
                    }
                }
                Err(ref error)
                    if error.kind() == io::ErrorKind::WouldBlock
                        || error.kind() == io::ErrorKind::TimedOut => {}
                Err(error) => return Err(EngineError::Io(error)),
            }
        }
        self.cleanup();
        Err(EngineError::BootTimeout)
    }

    fn start_reader(&self) -> Result<(), EngineError> {
        let socket = self.socket.try_clone()?;
        let callback = self.callback.clone();
        let running = self.running.clone();
        let handle = std::thread::Builder::new()
            .name("magnon-reply-pump".to_string())
            .spawn(move || {
                let mut buffer = [0u8; 65536];
                while running.load(Ordering::Relaxed) {
                    match socket.recv_from(&mut buffer) {
                        Ok((size, _)) => {
                            let installed = callback.lock().unwrap().clone();
                            if let Some(callback) = installed {
                                let data = &buffer[..size];
                                // A panicking callback must not unwind into
                                // the transport thread.
                                let result = std::panic::catch_unwind(
                                    std::panic::AssertUnwindSafe(|| callback(data)),
                                );
                                if result.is_err() {
                                    warn!("reply callback panicked; reply dropped");
                                }
                            }
                        }
                        Err(ref error)
                            if error.kind() == io::ErrorKind::WouldBlock
                                || error.kind() == io::ErrorKind::TimedOut => {}
                        Err(error) => {
                            if running.load(Ordering::Relaxed) {
                                error!("reply socket error: {}", error);
                            }
                            break;
                        }
                    }
                }
            })?;
        *self.reader.lock().unwrap() = Some(handle);
        Ok(())
    }
}

impl World for ProcessWorld {
    fn send_packet(&self, datagram: &[u8]) -> Result<(), EngineError> {
        let address = (self.server_address.0.as_str(), self.server_address.1);
        self.socket.send_to(datagram, address)?;
        Ok(())
    }

    fn set_reply_callback(&self, callback: Option<ReplyCallback>) {
        *self.callback.lock().unwrap() = callback;
    }

    fn wait_for_quit(&self, timeout: Duration) -> bool {
        let started = Instant::now();
        loop {
            {
                let mut child = self.child.lock().unwrap();
                match child.as_mut().map(|child| child.try_wait()) {
                    None => return true,
                    Some(Ok(Some(status))) => {
                        debug!("scsynth exited with {}", status);
                        *child = None;
                        return true;
                    }
                    Some(Ok(None)) => {}
                    Some(Err(error)) => {
                        warn!("error waiting for scsynth: {}", error);
                        return false;
                    }
                }
            }
            if started.elapsed() >= timeout {
                return false;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
    }

    fn cleanup(&self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(mut child) = self.child.lock().unwrap().take() {
            if matches!(child.try_wait(), Ok(None)) {
                let _ = child.kill();
            }
            let _ = child.wait();
        }
        if let Some(handle) = self.reader.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProcessWorld {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = Options::default();
        assert_eq!(options.num_audio_bus_channels, 1024);
        assert_eq!(options.block_size, 64);
        assert_eq!(options.num_buffers, 1024);
        assert_eq!(options.num_input_bus_channels, 8);
        assert_eq!(options.num_output_bus_channels, 8);
        assert_eq!(options.port, 57110);
        assert!(options.realtime);
        assert_eq!(options.safety_clip_threshold, 1.26);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn bus_accounting() {
        let options = Options::default();
        assert_eq!(options.first_private_bus_id(), 16);
        assert_eq!(options.private_audio_bus_channel_count(), 1008);
    }

    #[test]
    fn insufficient_buses_are_rejected() {
        let options = Options {
            num_audio_bus_channels: 4,
            ..Options::default()
        };
        assert!(matches!(
            options.validate(),
            Err(EngineError::InvalidOptions(_))
        ));
    }

    #[test]
    fn command_line_mapping() {
        let options = Options {
            preferred_sample_rate: 48000,
            ugen_plugins_path: Some("/plugins".to_string()),
            ..Options::default()
        };
        let args = options.to_command_line_args();
        let find = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .map(|index| args[index + 1].clone())
        };
        assert_eq!(find("-u").as_deref(), Some("57110"));
        assert_eq!(find("-a").as_deref(), Some("1024"));
        assert_eq!(find("-c").as_deref(), Some("16384"));
        assert_eq!(find("-z").as_deref(), Some("64"));
        assert_eq!(find("-S").as_deref(), Some("48000"));
        assert_eq!(find("-U").as_deref(), Some("/plugins"));
        assert_eq!(find("-D").as_deref(), Some("1"));
    }

    #[test]
    fn world_slot_is_exclusive() {
        let slot = claim_world_slot().unwrap();
        assert!(matches!(
            claim_world_slot(),
            Err(EngineError::AlreadyRunning)
        ));
        drop(slot);
        let slot = claim_world_slot().unwrap();
        drop(slot);
    }
}
