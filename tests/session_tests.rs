mod common;

use common::{new_wire, recorder, LoopbackOpener};
use serialflow::core::session::callbacks;
use serialflow::{
    ConnectionSession, ConnectionState, ErrorKind, LineEndingMode, SessionConfig, SessionError, SessionEvent,
};
use std::io;
use std::sync::{Arc, Mutex};

/// Session behaviour against an in-memory loopback device
#[cfg(test)]
mod session_tests {
    use super::*;

    fn received_bytes(events: &[SessionEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::DataReceived(chunk) => Some(chunk.bytes.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    #[test]
    fn test_loopback_round_trip() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        let (events, observer) = recorder();
        session.subscribe(observer);

        session.open(&"/dev/loop0".into(), SessionConfig::with_baud_rate(115_200)).unwrap();
        session.send("Hello Integration Test", LineEndingMode::None).unwrap();
        session.on_ready_read();

        let events = events.lock().unwrap();
        assert_eq!(received_bytes(&events), b"Hello Integration Test");
        assert!(events.contains(&SessionEvent::DataSent(b"Hello Integration Test".to_vec())));
    }

    #[test]
    fn test_line_ending_reaches_the_wire() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        session.open(&"/dev/loop0".into(), SessionConfig::default()).unwrap();

        session.send("AT", LineEndingMode::Cr).unwrap();
        session.send("AT+GMR", LineEndingMode::Crlf).unwrap();

        assert_eq!(wire.lock().unwrap().written, b"AT\rAT+GMR\r\n");
    }

    #[test]
    fn test_send_while_disconnected_leaves_device_untouched() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        let (events, observer) = recorder();
        session.subscribe(observer);

        assert_eq!(session.send("ping", LineEndingMode::Lf), Err(SessionError::NotConnected));
        assert_eq!(session.send_bytes(&[0x55]), Err(SessionError::NotConnected));

        session.open(&"/dev/loop0".into(), SessionConfig::default()).unwrap();
        session.close();
        assert_eq!(session.send("ping", LineEndingMode::Lf), Err(SessionError::NotConnected));

        assert_eq!(wire.lock().unwrap().write_calls, 0);
        assert!(!events.lock().unwrap().iter().any(|e| matches!(e, SessionEvent::DataSent(_))));
    }

    #[test]
    fn test_open_nonexistent_port() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        let (events, observer) = recorder();
        session.subscribe(observer);

        let err = session.open(&"/dev/does-not-exist".into(), SessionConfig::default()).unwrap_err();

        assert!(matches!(err, SessionError::OpenFailed(_)));
        assert_eq!(session.state(), ConnectionState::Disconnected);
        assert_eq!(*events.lock().unwrap(), vec![SessionEvent::ConnectionChanged(false)]);
        assert_eq!(session.current_port_name(), "/dev/does-not-exist");
    }

    #[test]
    fn test_reopen_closes_previous_device_first() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        session.open(&"/dev/loop0".into(), SessionConfig::default()).unwrap();

        let (events, observer) = recorder();
        session.subscribe(observer);
        session.open(&"/dev/loop1".into(), SessionConfig::with_baud_rate(9600)).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![SessionEvent::ConnectionChanged(false), SessionEvent::ConnectionChanged(true)]
        );
        let wire = wire.lock().unwrap();
        assert_eq!(wire.opens, vec!["/dev/loop0", "/dev/loop1"]);
        assert_eq!(wire.max_live_handles, 1);
        assert_eq!(wire.live_handles, 1);
        assert_eq!(session.current_port_name(), "/dev/loop1");
        assert_eq!(session.config().map(|c| c.baud_rate), Some(9600));
    }

    #[test]
    fn test_failed_reopen_releases_previous_device() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        session.open(&"/dev/loop0".into(), SessionConfig::default()).unwrap();

        assert!(session.open(&"/dev/does-not-exist".into(), SessionConfig::default()).is_err());

        assert!(!session.is_open());
        assert_eq!(wire.lock().unwrap().live_handles, 0);
    }

    #[test]
    fn test_drop_releases_device() {
        let wire = new_wire();
        {
            let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
            session.open(&"/dev/loop0".into(), SessionConfig::default()).unwrap();
            assert_eq!(wire.lock().unwrap().live_handles, 1);
        }
        assert_eq!(wire.lock().unwrap().live_handles, 0);
    }

    #[test]
    fn test_chunks_arrive_in_order() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        let (events, observer) = recorder();
        session.subscribe(observer);
        session.open(&"/dev/loop0".into(), SessionConfig::default()).unwrap();

        for reply in ["first", "second", "third"] {
            wire.lock().unwrap().rx.extend(reply.bytes());
            session.on_ready_read();
        }
        session.on_ready_read();

        let events = events.lock().unwrap();
        let chunks: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::DataReceived(chunk) => Some(chunk),
                _ => None,
            })
            .collect();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].bytes, b"first");
        assert_eq!(chunks[1].bytes, b"second");
        assert_eq!(chunks[2].bytes, b"third");
        assert!(chunks.windows(2).all(|pair| pair[0].arrival_order < pair[1].arrival_order));
    }

    #[test]
    fn test_arrival_order_continues_across_reopen() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        let (events, observer) = recorder();
        session.subscribe(observer);

        session.open(&"/dev/loop0".into(), SessionConfig::default()).unwrap();
        session.send("one", LineEndingMode::None).unwrap();
        session.on_ready_read();
        session.open(&"/dev/loop1".into(), SessionConfig::default()).unwrap();
        session.send("two", LineEndingMode::None).unwrap();
        session.on_ready_read();

        let orders: Vec<u64> = events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                SessionEvent::DataReceived(chunk) => Some(chunk.arrival_order),
                _ => None,
            })
            .collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[test]
    fn test_resource_loss_reports_then_closes() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        session.open(&"/dev/loop0".into(), SessionConfig::default()).unwrap();
        let (events, observer) = recorder();
        session.subscribe(observer);

        wire.lock().unwrap().read_fault = Some(io::ErrorKind::BrokenPipe);
        session.on_ready_read();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SessionEvent::ErrorOccurred(ref e) if e.kind() == ErrorKind::ResourceLost));
        assert_eq!(events[1], SessionEvent::ConnectionChanged(false));
        assert!(!session.is_open());
        assert_eq!(wire.lock().unwrap().live_handles, 0);
    }

    #[test]
    fn test_host_reported_fault_follows_policy() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        session.open(&"/dev/loop0".into(), SessionConfig::default()).unwrap();
        let (events, observer) = recorder();
        session.subscribe(observer);

        session.on_device_fault(&io::Error::from(io::ErrorKind::TimedOut));
        assert!(events.lock().unwrap().is_empty());

        session.on_device_fault(&io::Error::new(io::ErrorKind::InvalidData, "framing error"));
        assert!(session.is_open());
        assert_eq!(
            *events.lock().unwrap(),
            vec![SessionEvent::ErrorOccurred(SessionError::DeviceError("framing error".to_string()))]
        );

        session.on_device_fault(&io::Error::new(io::ErrorKind::NotFound, "device removed"));
        assert!(!session.is_open());
        let events = events.lock().unwrap();
        let kinds: Vec<ErrorKind> = events
            .iter()
            .filter_map(|event| match event {
                SessionEvent::ErrorOccurred(error) => Some(error.kind()),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![ErrorKind::DeviceError, ErrorKind::ResourceLost]);
        assert_eq!(events.last(), Some(&SessionEvent::ConnectionChanged(false)));
    }

    #[test]
    fn test_write_to_lost_device() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        session.open(&"/dev/loop0".into(), SessionConfig::default()).unwrap();
        let (events, observer) = recorder();
        session.subscribe(observer);

        wire.lock().unwrap().write_fault = Some(io::ErrorKind::BrokenPipe);
        let err = session.send("AT", LineEndingMode::Lf).unwrap_err();

        assert!(matches!(err, SessionError::WriteFailed(_)));
        assert!(!session.is_open());
        let events = events.lock().unwrap();
        assert_eq!(events[0], SessionEvent::ErrorOccurred(SessionError::ResourceLost("broken pipe".to_string())));
        assert_eq!(events[1], SessionEvent::ConnectionChanged(false));
    }

    #[test]
    fn test_write_error_on_healthy_device_keeps_session_open() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        session.open(&"/dev/loop0".into(), SessionConfig::default()).unwrap();

        wire.lock().unwrap().write_fault = Some(io::ErrorKind::InvalidInput);
        let err = session.send("AT", LineEndingMode::Lf).unwrap_err();

        assert!(matches!(err, SessionError::WriteFailed(_)));
        assert!(session.is_open());
    }

    #[test]
    fn test_callbacks_observer_and_unsubscribe() {
        let wire = new_wire();
        let mut session = ConnectionSession::with_opener(LoopbackOpener::new(Arc::clone(&wire)));
        let log = Arc::new(Mutex::new(Vec::<String>::new()));
        let (data_log, error_log, conn_log) = (Arc::clone(&log), Arc::clone(&log), Arc::clone(&log));

        let id = session.subscribe(callbacks(
            move |bytes: &[u8]| data_log.lock().unwrap().push(String::from_utf8_lossy(bytes).into_owned()),
            move |diagnostic: &str| error_log.lock().unwrap().push(format!("error {}", diagnostic)),
            move |connected: bool| conn_log.lock().unwrap().push(format!("connected {}", connected)),
        ));
        assert_eq!(session.subscriber_count(), 1);

        session.open(&"/dev/loop0".into(), SessionConfig::default()).unwrap();
        session.send("OK", LineEndingMode::None).unwrap();
        session.on_ready_read();

        assert!(session.unsubscribe(id));
        session.close();

        assert_eq!(*log.lock().unwrap(), vec!["connected true", "OK"]);
        assert_eq!(session.subscriber_count(), 0);
    }
}
