//! Session tests against a scripted in-memory engine world.
//!
//! The mock world records every datagram it receives and answers the
//! asynchronous commands (`/status`, `/sync`, `/d_recv`, `/quit`) the way
//! scsynth would, exercising the reply router without real audio.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rosc::{OscMessage, OscPacket, OscType};

use magnon::ugens::{Out, SinOsc};
use magnon::{
    osc, BootStatus, EngineError, Options, ReplyCallback, Server, ServerError, SynthDef,
    SynthDefBuilder, World,
};

const TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Default)]
struct MockWorld {
    sent: Mutex<Vec<OscMessage>>,
    callback: Mutex<Option<ReplyCallback>>,
    cleaned_up: AtomicBool,
}

impl MockWorld {
    fn reply(&self, message: OscMessage) {
        let callback = self.callback.lock().unwrap().clone();
        if let Some(callback) = callback {
            let datagram =
                rosc::encoder::encode(&OscPacket::Message(message)).expect("encode reply");
            callback(&datagram);
        }
    }
}

impl World for MockWorld {
    fn send_packet(&self, datagram: &[u8]) -> Result<(), EngineError> {
        let packet = rosc::decoder::decode_udp(datagram)
            .expect("decodable datagram")
            .1;
        let message = match packet {
            OscPacket::Message(message) => message,
            OscPacket::Bundle(_) => panic!("session sends messages, not bundles"),
        };
        self.sent.lock().unwrap().push(message.clone());
        match message.addr.as_str() {
            "/status" => self.reply(OscMessage {
                addr: "/status.reply".to_string(),
                args: vec![
                    OscType::Int(1),
                    OscType::Int(4),  // ugens
                    OscType::Int(2),  // synths
                    OscType::Int(1),  // groups
                    OscType::Int(3),  // synthdefs
                    OscType::Float(0.1),
                    OscType::Float(0.2),
                    OscType::Double(44100.0),
                    OscType::Double(44100.0),
                ],
            }),
            "/d_recv" => self.reply(OscMessage {
                addr: "/done".to_string(),
                args: vec![OscType::String("/d_recv".to_string())],
            }),
            "/sync" => {
                let id = message.args.first().cloned();
                self.reply(OscMessage {
                    addr: "/synced".to_string(),
                    args: id.into_iter().collect(),
                });
            }
            "/quit" => self.reply(OscMessage {
                addr: "/done".to_string(),
                args: vec![OscType::String("/quit".to_string())],
            }),
            _ => {}
        }
        Ok(())
    }

    fn set_reply_callback(&self, callback: Option<ReplyCallback>) {
        *self.callback.lock().unwrap() = callback;
    }

    fn wait_for_quit(&self, _timeout: Duration) -> bool {
        true
    }

    fn cleanup(&self) {
        self.cleaned_up.store(true, Ordering::SeqCst);
    }
}

fn mock_server() -> (Server, Arc<MockWorld>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let world = Arc::new(MockWorld::default());
    let handle = world.clone();
    let server = Server::with_world_factory(
        Options::default(),
        Box::new(move |_| Ok(Box::new(SharedWorld(handle.clone())) as Box<dyn World>)),
    );
    (server, world)
}

/// Adapter so one mock can be observed from the test while the server
/// owns its boxed world.
struct SharedWorld(Arc<MockWorld>);

impl World for SharedWorld {
    fn send_packet(&self, datagram: &[u8]) -> Result<(), EngineError> {
        self.0.send_packet(datagram)
    }

    fn set_reply_callback(&self, callback: Option<ReplyCallback>) {
        self.0.set_reply_callback(callback)
    }

    fn wait_for_quit(&self, timeout: Duration) -> bool {
        self.0.wait_for_quit(timeout)
    }

    fn cleanup(&self) {
        self.0.cleanup()
    }
}

fn sent_addresses(world: &MockWorld) -> Vec<String> {
    world
        .sent
        .lock()
        .unwrap()
        .iter()
        .map(|message| message.addr.clone())
        .collect()
}

fn sine_synthdef() -> SynthDef {
    let builder = SynthDefBuilder::new();
    Out::new(SinOsc::new().ar() * 0.2).ar();
    builder.build("sine").unwrap()
}

// -- Lifecycle -------------------------------------------------------------

#[test]
fn boot_creates_the_default_group() {
    let (server, world) = mock_server();
    assert_eq!(server.status(), BootStatus::Offline);
    server.boot().unwrap();
    assert_eq!(server.status(), BootStatus::Online);
    let sent = world.sent.lock().unwrap();
    assert_eq!(sent[0].addr, "/g_new");
    assert_eq!(
        sent[0].args,
        vec![OscType::Int(1), OscType::Int(0), OscType::Int(0)]
    );
}

#[test]
fn double_boot_is_a_no_op() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    server.boot().unwrap();
    assert_eq!(
        sent_addresses(&world)
            .iter()
            .filter(|addr| *addr == "/g_new")
            .count(),
        1
    );
}

#[test]
fn quit_sends_quit_and_releases_the_world() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    server.quit().unwrap();
    assert_eq!(server.status(), BootStatus::Offline);
    assert!(sent_addresses(&world).contains(&"/quit".to_string()));
    assert!(world.cleaned_up.load(Ordering::SeqCst));
    // Idempotent from Offline.
    server.quit().unwrap();
}

#[test]
fn send_while_offline_fails() {
    let (server, _world) = mock_server();
    assert!(matches!(
        server.send(osc::status()),
        Err(ServerError::Offline)
    ));
    assert!(matches!(
        server.synth("sine", &[]),
        Err(ServerError::Offline)
    ));
}

#[test]
fn full_session_lifecycle() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    server
        .send_synthdef_sync(&sine_synthdef(), TIMEOUT)
        .unwrap();
    let status = server.request_status(TIMEOUT).unwrap();
    assert_eq!(status.ugen_count, 4);
    assert_eq!(status.synth_count, 2);
    assert_eq!(status.group_count, 1);
    assert_eq!(status.actual_sample_rate, 44100.0);
    server.quit().unwrap();
    assert!(matches!(
        server.synth("sine", &[]),
        Err(ServerError::Offline)
    ));
    let addresses = sent_addresses(&world);
    assert!(addresses.contains(&"/d_recv".to_string()));
    assert!(addresses.contains(&"/status".to_string()));
}

// -- Allocation ------------------------------------------------------------

#[test]
fn node_ids_start_at_1000_and_increase() {
    let (server, _world) = mock_server();
    server.boot().unwrap();
    let first = server.synth("sine", &[]).unwrap();
    let second = server.synth("sine", &[]).unwrap();
    assert!(first == 1000);
    assert!(second == 1001);
}

#[test]
fn concurrent_node_allocation_never_collides() {
    let (server, _world) = mock_server();
    let mut ids = Vec::new();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| (0..100).map(|_| server.next_node_id()).collect::<Vec<i32>>())
            })
            .collect();
        for handle in handles {
            ids.extend(handle.join().unwrap());
        }
    });
    let count = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), count);
}

#[test]
fn buffer_ids_are_tracked_and_released() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    let first = server.allocate_buffer(44100, 2).unwrap();
    let second = server.allocate_buffer(44100, 1).unwrap();
    assert!(first == 0);
    assert!(second == 1);
    assert_eq!(server.allocated_buffers(), vec![0, 1]);
    first.free().unwrap();
    assert_eq!(server.allocated_buffers(), vec![1]);
    let addresses = sent_addresses(&world);
    assert_eq!(
        addresses.iter().filter(|a| *a == "/b_alloc").count(),
        2
    );
    assert!(addresses.contains(&"/b_free".to_string()));
}

#[test]
fn explicit_buffer_ids_are_respected() {
    let (server, _world) = mock_server();
    server.boot().unwrap();
    let explicit = server.allocate_buffer_with_id(10, 512, 1).unwrap();
    assert!(explicit == 10);
    assert!(server.allocated_buffers().contains(&10));
}

// -- Node and buffer commands ----------------------------------------------

#[test]
fn synth_sends_s_new_with_controls() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    let synth = server.synth("sine", &[("frequency", 440.0)]).unwrap();
    let sent = world.sent.lock().unwrap();
    let s_new = sent.iter().find(|m| m.addr == "/s_new").unwrap();
    assert_eq!(s_new.args[0], OscType::String("sine".to_string()));
    assert_eq!(s_new.args[1], OscType::Int(synth.id()));
    assert_eq!(s_new.args[2], OscType::Int(0));
    assert_eq!(s_new.args[3], OscType::Int(1));
    assert_eq!(s_new.args[4], OscType::String("frequency".to_string()));
    assert_eq!(s_new.args[5], OscType::Float(440.0));
}

#[test]
fn synth_proxies_set_and_free() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    let synth = server.synth("sine", &[]).unwrap();
    synth.set(&[("frequency", 880.0)]).unwrap();
    synth.free().unwrap();
    let sent = world.sent.lock().unwrap();
    let n_set = sent.iter().find(|m| m.addr == "/n_set").unwrap();
    assert_eq!(n_set.args[0], OscType::Int(synth.id()));
    let n_free = sent.iter().find(|m| m.addr == "/n_free").unwrap();
    assert_eq!(n_free.args[0], OscType::Int(synth.id()));
}

#[test]
fn group_placement_arguments() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    let group = server.group().unwrap();
    let sent = world.sent.lock().unwrap();
    let g_new = sent.iter().rev().find(|m| m.addr == "/g_new").unwrap();
    assert_eq!(g_new.args[0], OscType::Int(group.id()));
    assert_eq!(g_new.args[2], OscType::Int(0));
}

#[test]
fn buffer_file_operations() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    let buffer = server.allocate_read_buffer("kick.wav", 0, 0).unwrap();
    buffer.read("snare.wav", 0, -1, 0, false).unwrap();
    buffer.write("out.wav", "wav", "float", -1, 0, false).unwrap();
    buffer.zero().unwrap();
    buffer.close().unwrap();
    buffer.free().unwrap();
    let addresses = sent_addresses(&world);
    for expected in [
        "/b_allocRead",
        "/b_read",
        "/b_write",
        "/b_zero",
        "/b_close",
        "/b_free",
    ] {
        assert!(
            addresses.contains(&expected.to_string()),
            "missing {}",
            expected
        );
    }
}

// -- Managed resources -----------------------------------------------------

#[test]
fn managed_synth_frees_on_scope_exit() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    let id = {
        let managed = server.managed_synth("sine", &[]).unwrap();
        managed.id()
    };
    let sent = world.sent.lock().unwrap();
    let n_free = sent.iter().find(|m| m.addr == "/n_free").unwrap();
    assert_eq!(n_free.args[0], OscType::Int(id));
}

#[test]
fn managed_synth_frees_exactly_once_on_panic() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _managed = server.managed_synth("sine", &[]).unwrap();
        panic!("boom");
    }));
    assert!(result.is_err());
    assert_eq!(server.status(), BootStatus::Online);
    let frees = sent_addresses(&world)
        .iter()
        .filter(|addr| *addr == "/n_free")
        .count();
    assert_eq!(frees, 1);
}

#[test]
fn managed_resources_skip_free_after_quit() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    {
        let _managed = server.managed_synth("sine", &[]).unwrap();
        server.quit().unwrap();
    }
    assert!(!sent_addresses(&world).contains(&"/n_free".to_string()));
}

#[test]
fn managed_buffer_frees_on_drop() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    {
        let _buffer = server.managed_buffer(1024, 1).unwrap();
        assert_eq!(server.allocated_buffers(), vec![0]);
    }
    assert!(server.allocated_buffers().is_empty());
    assert!(sent_addresses(&world).contains(&"/b_free".to_string()));
}

// -- Reply routing ---------------------------------------------------------

#[test]
fn send_msg_sync_returns_the_matching_reply() {
    let (server, _world) = mock_server();
    server.boot().unwrap();
    let reply = server
        .send_msg_sync(osc::status(), "/status.reply", TIMEOUT)
        .unwrap();
    assert_eq!(reply.addr, "/status.reply");
}

#[test]
fn wait_for_reply_times_out_and_removes_the_waiter() {
    let (server, _world) = mock_server();
    server.boot().unwrap();
    let result = server.wait_for_reply("/n_go", Duration::from_millis(50));
    assert!(matches!(
        result,
        Err(ServerError::ReplyTimeout { address }) if address == "/n_go"
    ));
}

#[test]
fn subscribers_receive_every_match_until_removed() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let subscription = server.on("/status.reply", move |message| {
        sink.lock().unwrap().push(message.addr.clone());
    });
    server.request_status(TIMEOUT).unwrap();
    server.request_status(TIMEOUT).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 2);
    server.off("/status.reply", subscription);
    server.request_status(TIMEOUT).unwrap();
    assert_eq!(seen.lock().unwrap().len(), 2);
    let _ = world;
}

#[test]
fn panicking_subscribers_do_not_poison_the_router() {
    let (server, _world) = mock_server();
    server.boot().unwrap();
    server.on("/status.reply", |_| panic!("bad subscriber"));
    // The panic is swallowed; the waiter still completes.
    let status = server.request_status(TIMEOUT);
    assert!(status.is_ok());
}

#[test]
fn sync_round_trip() {
    let (server, _world) = mock_server();
    server.boot().unwrap();
    server.sync(TIMEOUT).unwrap();
}

#[test]
fn play_installs_then_creates() {
    let (server, world) = mock_server();
    server.boot().unwrap();
    let synthdef = sine_synthdef();
    let synth = server.play(&synthdef, &[("frequency", 660.0)]).unwrap();
    assert!(synth.id() >= 1000);
    let addresses = sent_addresses(&world);
    let d_recv = addresses.iter().position(|a| a == "/d_recv").unwrap();
    let s_new = addresses.iter().position(|a| a == "/s_new").unwrap();
    assert!(d_recv < s_new);
    // A second play of the same def skips the reinstall.
    server.play(&synthdef, &[]).unwrap();
    assert_eq!(
        sent_addresses(&world)
            .iter()
            .filter(|a| *a == "/d_recv")
            .count(),
        1
    );
}
