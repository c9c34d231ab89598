//! In-process libscsynth shim, behind the `embedded-scsynth` feature.
//!
//! Wraps the five libscsynth entry points the session layer needs:
//! `World_New`, `World_SendPacket`, the reply/print callback installers,
//! `World_WaitForQuit`, and `World_Cleanup`. The strings handed to
//! `World_New` must outlive the world, so the world handle owns a
//! companion set of `CString`s for its whole lifetime.
//!
//! Requires libscsynth to be installed and linkable.

use std::ffi::{c_char, c_int, c_void, CString};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::engine::{claim_world_slot, EngineError, Options, ReplyCallback, World, WorldSlot};

/// Mirrors `WorldOptions` from `SC_WorldOptions.h`. Field order and types
/// must match the installed SuperCollider headers.
#[repr(C)]
struct WorldOptions {
    password: *const c_char,
    num_buffers: u32,
    max_logins: u32,
    max_nodes: u32,
    max_graph_defs: u32,
    max_wire_bufs: u32,
    num_audio_bus_channels: u32,
    num_input_bus_channels: u32,
    num_output_bus_channels: u32,
    num_control_bus_channels: u32,
    buf_length: u32,
    realtime_memory_size: u32,
    num_shared_controls: c_int,
    shared_controls: *mut f32,
    realtime: bool,
    memory_locking: bool,
    non_realtime_cmd_filename: *const c_char,
    non_realtime_input_filename: *const c_char,
    non_realtime_output_filename: *const c_char,
    non_realtime_output_header_format: *const c_char,
    non_realtime_output_sample_format: *const c_char,
    preferred_sample_rate: u32,
    num_rgens: u32,
    preferred_hardware_buffer_frame_size: u32,
    load_graph_defs: u32,
    input_streams_enabled: *const c_char,
    output_streams_enabled: *const c_char,
    in_device_name: *const c_char,
    verbosity: c_int,
    rendezvous: bool,
    ugens_plugin_path: *const c_char,
    out_device_name: *const c_char,
    restricted_path: *const c_char,
    shared_memory_id: c_int,
    safety_clip_threshold: f32,
}

type ReplyFunc = extern "C" fn(*mut c_void, *mut c_char, c_int);
// The real signature takes a va_list; stable Rust cannot expand it, so
// the print hook forwards the format string verbatim.
type PrintFunc = extern "C" fn(*const c_char, *mut c_void) -> c_int;

#[link(name = "scsynth")]
extern "C" {
    fn World_New(options: *mut WorldOptions) -> *mut c_void;
    fn World_OpenUDP(world: *mut c_void, bind_to: *const c_char, port: c_int) -> c_int;
    #[allow(dead_code)]
    fn World_OpenTCP(
        world: *mut c_void,
        bind_to: *const c_char,
        port: c_int,
        max_connections: c_int,
        backlog: c_int,
    ) -> c_int;
    fn World_SendPacket(
        world: *mut c_void,
        size: c_int,
        data: *mut c_char,
        reply_func: ReplyFunc,
    ) -> bool;
    fn World_WaitForQuit(world: *mut c_void, unload_plugins: bool);
    fn World_Cleanup(world: *mut c_void, unload_plugins: bool);
    fn SetPrintFunc(func: PrintFunc);
}

static REPLY_SLOT: Mutex<Option<ReplyCallback>> = Mutex::new(None);
static PRINT_SLOT: OnceLock<Arc<dyn Fn(&str) + Send + Sync>> = OnceLock::new();

extern "C" fn reply_trampoline(_address: *mut c_void, data: *mut c_char, size: c_int) {
    let callback = REPLY_SLOT.lock().unwrap().clone();
    if let Some(callback) = callback {
        let slice =
            unsafe { std::slice::from_raw_parts(data as *const u8, size.max(0) as usize) };
        // Copy before invoking; the engine reuses its buffer.
        let owned = slice.to_vec();
        let result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback(&owned)));
        if result.is_err() {
            warn!("reply callback panicked inside the engine boundary");
        }
    }
}

extern "C" fn print_trampoline(format: *const c_char, _args: *mut c_void) -> c_int {
    if format.is_null() {
        return 0;
    }
    let text = unsafe { std::ffi::CStr::from_ptr(format) }.to_string_lossy();
    if let Some(sink) = PRINT_SLOT.get() {
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| sink(&text)));
        if result.is_err() {
            return 0;
        }
    } else {
        debug!(target: "scsynth", "{}", text.trim_end());
    }
    text.len() as c_int
}

/// Install a sink for engine log output. May only be set once per process.
pub fn set_print_sink(sink: impl Fn(&str) + Send + Sync + 'static) {
    let _ = PRINT_SLOT.set(Arc::new(sink));
}

#[cfg(target_os = "macos")]
extern "C" fn force_exit_on_teardown() {
    // CoreAudio's static destructors can crash during process teardown;
    // leaving via _exit skips them. Registered after World_New so it runs
    // first in the reverse-order atexit chain.
    unsafe { libc::_exit(0) }
}

#[cfg(target_os = "macos")]
fn register_teardown_guard() {
    static REGISTERED: AtomicBool = AtomicBool::new(false);
    if !REGISTERED.swap(true, Ordering::SeqCst) {
        unsafe {
            libc::atexit(force_exit_on_teardown);
        }
    }
}

/// Keeps the option strings alive for the lifetime of the world.
struct WorldStrings {
    storage: Vec<CString>,
}

impl WorldStrings {
    fn new() -> Self {
        WorldStrings {
            storage: Vec::new(),
        }
    }

    fn intern(&mut self, value: &Option<String>) -> *const c_char {
        match value {
            Some(value) => match CString::new(value.as_str()) {
                Ok(cstring) => {
                    self.storage.push(cstring);
                    self.storage
                        .last()
                        .map(|s| s.as_ptr())
                        .unwrap_or(std::ptr::null())
                }
                Err(_) => std::ptr::null(),
            },
            None => std::ptr::null(),
        }
    }
}

struct WorldPointer(*mut c_void);

// The engine serializes access internally; the pointer is only handed to
// libscsynth entry points.
unsafe impl Send for WorldPointer {}
unsafe impl Sync for WorldPointer {}

/// A world running inside this process via libscsynth.
pub struct EmbeddedWorld {
    world: WorldPointer,
    finished: AtomicBool,
    _strings: WorldStrings,
    _slot: WorldSlot,
}

impl EmbeddedWorld {
    /// Create the world and open its UDP port.
    pub fn create(options: &Options) -> Result<Self, EngineError> {
        options.validate()?;
        let slot = claim_world_slot()?;
        let mut strings = WorldStrings::new();
        let mut world_options = WorldOptions {
            password: strings.intern(&options.password),
            num_buffers: options.num_buffers,
            max_logins: options.max_logins,
            max_nodes: options.max_nodes,
            max_graph_defs: options.max_graph_defs,
            max_wire_bufs: options.max_wire_bufs,
            num_audio_bus_channels: options.num_audio_bus_channels,
            num_input_bus_channels: options.num_input_bus_channels,
            num_output_bus_channels: options.num_output_bus_channels,
            num_control_bus_channels: options.num_control_bus_channels,
            buf_length: options.block_size,
            realtime_memory_size: options.realtime_memory_size,
            num_shared_controls: 0,
            shared_controls: std::ptr::null_mut(),
            realtime: options.realtime,
            memory_locking: options.memory_locking,
            non_realtime_cmd_filename: std::ptr::null(),
            non_realtime_input_filename: std::ptr::null(),
            non_realtime_output_filename: std::ptr::null(),
            non_realtime_output_header_format: std::ptr::null(),
            non_realtime_output_sample_format: std::ptr::null(),
            preferred_sample_rate: options.preferred_sample_rate,
            num_rgens: options.num_rgens,
            preferred_hardware_buffer_frame_size: options.preferred_hardware_buffer_size,
            load_graph_defs: options.load_graph_defs as u32,
            input_streams_enabled: strings.intern(&options.input_streams_enabled),
            output_streams_enabled: strings.intern(&options.output_streams_enabled),
            in_device_name: strings.intern(&options.in_device_name),
            verbosity: options.verbosity,
            rendezvous: false,
            ugens_plugin_path: strings.intern(&options.ugen_plugins_path),
            out_device_name: strings.intern(&options.out_device_name),
            restricted_path: strings.intern(&options.restricted_path),
            shared_memory_id: options.shared_memory_id,
            safety_clip_threshold: options.safety_clip_threshold,
        };
        unsafe {
            SetPrintFunc(print_trampoline);
        }
        let world = unsafe { World_New(&mut world_options) };
        if world.is_null() {
            return Err(EngineError::WorldUnavailable(
                "World_New returned null".to_string(),
            ));
        }
        #[cfg(target_os = "macos")]
        register_teardown_guard();
        let bind_to = CString::new(options.ip_address.as_str())
            .map_err(|_| EngineError::WorldUnavailable("bad bind address".to_string()))?;
        let opened =
            unsafe { World_OpenUDP(world, bind_to.as_ptr(), options.port as c_int) };
        if opened == 0 {
            unsafe { World_Cleanup(world, false) };
            return Err(EngineError::WorldUnavailable(
                "World_OpenUDP failed".to_string(),
            ));
        }
        info!("embedded scsynth world online on port {}", options.port);
        Ok(EmbeddedWorld {
            world: WorldPointer(world),
            finished: AtomicBool::new(false),
            _strings: strings,
            _slot: slot,
        })
    }
}

impl World for EmbeddedWorld {
    fn send_packet(&self, datagram: &[u8]) -> Result<(), EngineError> {
        if self.finished.load(Ordering::SeqCst) {
            return Err(EngineError::WorldUnavailable(
                "world already cleaned up".to_string(),
            ));
        }
        // World_SendPacket takes a mutable pointer; copy defensively so
        // the engine can never scribble on caller memory.
        let mut copy = datagram.to_vec();
        let sent = unsafe {
            World_SendPacket(
                self.world.0,
                copy.len() as c_int,
                copy.as_mut_ptr() as *mut c_char,
                reply_trampoline,
            )
        };
        if sent {
            Ok(())
        } else {
            Err(EngineError::WorldUnavailable(
                "World_SendPacket failed".to_string(),
            ))
        }
    }

    fn set_reply_callback(&self, callback: Option<ReplyCallback>) {
        *REPLY_SLOT.lock().unwrap() = callback;
    }

    fn wait_for_quit(&self, timeout: Duration) -> bool {
        if self.finished.swap(true, Ordering::SeqCst) {
            return true;
        }
        // World_WaitForQuit blocks until the engine acknowledges /quit;
        // run it on a helper thread so the caller's bound holds.
        let world = self.world.0 as usize;
        let handle = std::thread::spawn(move || unsafe {
            World_WaitForQuit(world as *mut c_void, false);
        });
        let started = Instant::now();
        while started.elapsed() < timeout {
            if handle.is_finished() {
                let _ = handle.join();
                return true;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        false
    }

    fn cleanup(&self) {
        if !self.finished.swap(true, Ordering::SeqCst) {
            unsafe { World_Cleanup(self.world.0, false) };
        }
        *REPLY_SLOT.lock().unwrap() = None;
    }
}

impl Drop for EmbeddedWorld {
    fn drop(&mut self) {
        self.cleanup();
    }
}
