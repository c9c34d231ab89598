//! Wire-protocol command constructors.
//!
//! Builds the OSC command messages the server understands, with the
//! argument orders scsynth expects. Byte-level encoding and decoding is
//! `rosc`'s job; helpers here just wrap it for datagram transport.

use rosc::{decoder, encoder, OscMessage, OscPacket, OscType};

use crate::enums::AddAction;

/// Reply addresses the server is known to send.
pub mod replies {
    pub const DONE: &str = "/done";
    pub const FAIL: &str = "/fail";
    pub const STATUS_REPLY: &str = "/status.reply";
    pub const NODE_GO: &str = "/n_go";
    pub const NODE_END: &str = "/n_end";
    pub const NODE_OFF: &str = "/n_off";
    pub const NODE_ON: &str = "/n_on";
    pub const NODE_INFO: &str = "/n_info";
    pub const BUFFER_INFO: &str = "/b_info";
    pub const TRIGGER: &str = "/tr";
    pub const SYNCED: &str = "/synced";
}

fn message(addr: &str, args: Vec<OscType>) -> OscMessage {
    OscMessage {
        addr: addr.to_string(),
        args,
    }
}

/// Encode a message into a datagram.
pub fn encode_message(message: &OscMessage) -> Result<Vec<u8>, rosc::OscError> {
    encoder::encode(&OscPacket::Message(message.clone()))
}

/// Wrap messages in a bundle tagged for immediate execution.
pub fn bundle_immediately(messages: Vec<OscMessage>) -> rosc::OscBundle {
    rosc::OscBundle {
        timetag: rosc::OscTime {
            seconds: 0,
            fractional: 1,
        },
        content: messages.into_iter().map(OscPacket::Message).collect(),
    }
}

/// Encode a bundle into a datagram.
pub fn encode_bundle(bundle: &rosc::OscBundle) -> Result<Vec<u8>, rosc::OscError> {
    encoder::encode(&OscPacket::Bundle(bundle.clone()))
}

/// Decode a datagram into a packet (message or bundle).
pub fn decode_datagram(data: &[u8]) -> Result<OscPacket, rosc::OscError> {
    decoder::decode_udp(data).map(|(_, packet)| packet)
}

/// Append a completion message to an asynchronous command. The server
/// executes the completion message once the command finishes.
pub fn with_completion(
    mut message: OscMessage,
    completion: &OscMessage,
) -> Result<OscMessage, rosc::OscError> {
    let datagram = encode_message(completion)?;
    message.args.push(OscType::Blob(datagram));
    Ok(message)
}

fn push_controls(args: &mut Vec<OscType>, controls: &[(&str, f32)]) {
    for (name, value) in controls {
        args.push(OscType::String(name.to_string()));
        args.push(OscType::Float(*value));
    }
}

/// `/d_recv` — install the SynthDefs in an SCgf blob.
pub fn d_recv(data: Vec<u8>) -> OscMessage {
    message("/d_recv", vec![OscType::Blob(data)])
}

/// `/s_new` — create a synth.
pub fn s_new(
    name: &str,
    node_id: i32,
    add_action: AddAction,
    target_id: i32,
    controls: &[(&str, f32)],
) -> OscMessage {
    let mut args = vec![
        OscType::String(name.to_string()),
        OscType::Int(node_id),
        OscType::Int(add_action as i32),
        OscType::Int(target_id),
    ];
    push_controls(&mut args, controls);
    message("/s_new", args)
}

/// `/g_new` — create a group.
pub fn g_new(node_id: i32, add_action: AddAction, target_id: i32) -> OscMessage {
    message(
        "/g_new",
        vec![
            OscType::Int(node_id),
            OscType::Int(add_action as i32),
            OscType::Int(target_id),
        ],
    )
}

/// `/n_free` — free a node.
pub fn n_free(node_id: i32) -> OscMessage {
    message("/n_free", vec![OscType::Int(node_id)])
}

/// `/n_set` — set controls on a node.
pub fn n_set(node_id: i32, controls: &[(&str, f32)]) -> OscMessage {
    let mut args = vec![OscType::Int(node_id)];
    push_controls(&mut args, controls);
    message("/n_set", args)
}

/// `/b_alloc` — allocate a buffer.
pub fn b_alloc(buffer_id: i32, frame_count: i32, channel_count: i32) -> OscMessage {
    message(
        "/b_alloc",
        vec![
            OscType::Int(buffer_id),
            OscType::Int(frame_count),
            OscType::Int(channel_count),
        ],
    )
}

/// `/b_allocRead` — allocate a buffer and read a sound file into it.
/// A `frame_count` of zero reads the whole file.
pub fn b_alloc_read(
    buffer_id: i32,
    path: &str,
    starting_frame: i32,
    frame_count: i32,
) -> OscMessage {
    message(
        "/b_allocRead",
        vec![
            OscType::Int(buffer_id),
            OscType::String(path.to_string()),
            OscType::Int(starting_frame),
            OscType::Int(frame_count),
        ],
    )
}

/// `/b_read` — read a sound file into an existing buffer.
#[allow(clippy::too_many_arguments)]
pub fn b_read(
    buffer_id: i32,
    path: &str,
    file_starting_frame: i32,
    frame_count: i32,
    buffer_starting_frame: i32,
    leave_open: bool,
) -> OscMessage {
    message(
        "/b_read",
        vec![
            OscType::Int(buffer_id),
            OscType::String(path.to_string()),
            OscType::Int(file_starting_frame),
            OscType::Int(frame_count),
            OscType::Int(buffer_starting_frame),
            OscType::Int(leave_open as i32),
        ],
    )
}

/// `/b_write` — write buffer contents to a sound file.
#[allow(clippy::too_many_arguments)]
pub fn b_write(
    buffer_id: i32,
    path: &str,
    header_format: &str,
    sample_format: &str,
    frame_count: i32,
    starting_frame: i32,
    leave_open: bool,
) -> OscMessage {
    message(
        "/b_write",
        vec![
            OscType::Int(buffer_id),
            OscType::String(path.to_string()),
            OscType::String(header_format.to_string()),
            OscType::String(sample_format.to_string()),
            OscType::Int(frame_count),
            OscType::Int(starting_frame),
            OscType::Int(leave_open as i32),
        ],
    )
}

/// `/b_zero` — zero a buffer's contents.
pub fn b_zero(buffer_id: i32) -> OscMessage {
    message("/b_zero", vec![OscType::Int(buffer_id)])
}

/// `/b_close` — close a buffer's open sound file.
pub fn b_close(buffer_id: i32) -> OscMessage {
    message("/b_close", vec![OscType::Int(buffer_id)])
}

/// `/b_free` — free a buffer.
pub fn b_free(buffer_id: i32) -> OscMessage {
    message("/b_free", vec![OscType::Int(buffer_id)])
}

/// `/notify` — register or deregister for server notifications.
pub fn notify(enabled: bool) -> OscMessage {
    message("/notify", vec![OscType::Int(enabled as i32)])
}

/// `/status` — request a `/status.reply`.
pub fn status() -> OscMessage {
    message("/status", Vec::new())
}

/// `/quit` — ask the server to shut down.
pub fn quit() -> OscMessage {
    message("/quit", Vec::new())
}

/// `/sync` — request a `/synced` reply carrying the same id once all
/// preceding asynchronous commands have completed.
pub fn sync(sync_id: i32) -> OscMessage {
    message("/sync", vec![OscType::Int(sync_id)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(message: OscMessage) -> OscMessage {
        let datagram = encode_message(&message).unwrap();
        match decode_datagram(&datagram).unwrap() {
            OscPacket::Message(decoded) => decoded,
            OscPacket::Bundle(_) => panic!("expected message"),
        }
    }

    #[test]
    fn s_new_argument_order() {
        let decoded = round_trip(s_new(
            "sine",
            1000,
            AddAction::ToHead,
            1,
            &[("frequency", 440.0)],
        ));
        assert_eq!(decoded.addr, "/s_new");
        assert_eq!(decoded.args[0], OscType::String("sine".into()));
        assert_eq!(decoded.args[1], OscType::Int(1000));
        assert_eq!(decoded.args[2], OscType::Int(0));
        assert_eq!(decoded.args[3], OscType::Int(1));
        assert_eq!(decoded.args[4], OscType::String("frequency".into()));
        assert_eq!(decoded.args[5], OscType::Float(440.0));
    }

    #[test]
    fn g_new_argument_order() {
        let decoded = round_trip(g_new(1001, AddAction::ToTail, 0));
        assert_eq!(decoded.addr, "/g_new");
        assert_eq!(
            decoded.args,
            vec![OscType::Int(1001), OscType::Int(1), OscType::Int(0)]
        );
    }

    #[test]
    fn n_set_flattens_control_pairs() {
        let decoded = round_trip(n_set(1000, &[("frequency", 880.0), ("amplitude", 0.5)]));
        assert_eq!(decoded.args.len(), 5);
        assert_eq!(decoded.args[1], OscType::String("frequency".into()));
        assert_eq!(decoded.args[3], OscType::String("amplitude".into()));
    }

    #[test]
    fn buffer_commands_round_trip() {
        let decoded = round_trip(b_read(3, "kick.wav", 0, -1, 0, true));
        assert_eq!(decoded.addr, "/b_read");
        assert_eq!(decoded.args[5], OscType::Int(1));
        let decoded = round_trip(b_write(3, "out.aiff", "aiff", "int24", -1, 0, false));
        assert_eq!(decoded.addr, "/b_write");
        assert_eq!(decoded.args[2], OscType::String("aiff".into()));
        assert_eq!(decoded.args[6], OscType::Int(0));
    }

    #[test]
    fn d_recv_carries_a_blob() {
        let decoded = round_trip(d_recv(vec![0x53, 0x43, 0x67, 0x66]));
        assert_eq!(decoded.addr, "/d_recv");
        assert_eq!(
            decoded.args[0],
            OscType::Blob(vec![0x53, 0x43, 0x67, 0x66])
        );
    }

    #[test]
    fn completion_messages_nest_as_blobs() {
        let with = with_completion(b_alloc(0, 44100, 2), &s_new("sine", 1000, AddAction::ToHead, 1, &[]))
            .unwrap();
        let decoded = round_trip(with);
        assert_eq!(decoded.args.len(), 4);
        let completion = match &decoded.args[3] {
            OscType::Blob(blob) => decode_datagram(blob).unwrap(),
            other => panic!("expected blob, got {:?}", other),
        };
        match completion {
            OscPacket::Message(inner) => assert_eq!(inner.addr, "/s_new"),
            OscPacket::Bundle(_) => panic!("expected message"),
        }
    }

    #[test]
    fn notify_flag_encoding() {
        assert_eq!(notify(true).args, vec![OscType::Int(1)]);
        assert_eq!(notify(false).args, vec![OscType::Int(0)]);
    }

    #[test]
    fn immediate_bundles_round_trip() {
        let bundle = bundle_immediately(vec![n_free(1000), n_free(1001)]);
        let datagram = encode_bundle(&bundle).unwrap();
        match decode_datagram(&datagram).unwrap() {
            OscPacket::Bundle(decoded) => {
                assert_eq!(decoded.timetag.seconds, 0);
                assert_eq!(decoded.timetag.fractional, 1);
                assert_eq!(decoded.content.len(), 2);
            }
            OscPacket::Message(_) => panic!("expected bundle"),
        }
    }
}
