//! # Panel Session Tests
//!
//! End-to-end runs of the interpreter and the ST7796 driver against the
//! recording fakes. Each test checks the exact interleaving of pin changes,
//! chunk groups and delays a real panel would see.

use panelbus::PanelError;
use panelbus::interpreter::Interpreter;
use panelbus::mock::{BusEvent, EventLog, RecordingBus, RecordingDelay, RecordingPins};
use panelbus::ops::OpStream;
use panelbus::panel::St7796;
use panelbus::panel::st7796::{CASET, INIT_SEQUENCE, RAMWR, RASET};
use panelbus::pins::{Level, PanelPin};
use panelbus::render::{ColorOrder, Framebuffer, Rgb565};
use panelbus::transport::{BusSettings, ChunkedTransfer, MAX_CHUNK_SIZE, MAX_CHUNKS_PER_CALL};
use pretty_assertions::assert_eq;

type TestInterpreter = Interpreter<RecordingBus, RecordingPins, RecordingDelay>;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn interpreter(log: &EventLog, bus: RecordingBus, capacity: usize) -> TestInterpreter {
    let bus = ChunkedTransfer::open(bus, BusSettings::default(), capacity).unwrap();
    Interpreter::new(bus, RecordingPins::new(log), RecordingDelay::new(log))
}

fn panel(
    log: &EventLog,
    bus: RecordingBus,
    width: u16,
    height: u16,
) -> St7796<RecordingBus, RecordingPins, RecordingDelay> {
    let capacity = width as usize * height as usize * 2;
    St7796::new(interpreter(log, bus, capacity), width, height)
}

fn pin(pin: PanelPin, level: Level) -> BusEvent {
    BusEvent::Pin(pin, level)
}

fn submit(chunks: &[&[u8]]) -> BusEvent {
    BusEvent::Submit(chunks.iter().map(|c| c.to_vec()).collect())
}

// ============================================================================
// INTERPRETER
// ============================================================================

#[test]
fn test_session_trace() {
    let log = EventLog::new();
    let mut interp = interpreter(&log, RecordingBus::new(&log), 4096);

    let mut ops = OpStream::new();
    ops.begin()
        .command_data16(0x2A, 0x013F)
        .delay(5)
        .command16(0xABCD)
        .end();

    let report = interp.run(ops.as_bytes()).unwrap();

    assert_eq!(report.executed, 5);
    assert_eq!(
        log.events(),
        vec![
            pin(PanelPin::DataCommand, Level::High),
            pin(PanelPin::ChipSelect, Level::Low),
            pin(PanelPin::DataCommand, Level::Low),
            submit(&[&[0x2A]]),
            pin(PanelPin::DataCommand, Level::High),
            BusEvent::Delay(5),
            submit(&[&[0x01, 0x3F]]),
            pin(PanelPin::DataCommand, Level::Low),
            submit(&[&[0xAB, 0xCD]]),
            pin(PanelPin::DataCommand, Level::High),
            pin(PanelPin::ChipSelect, Level::High),
        ]
    );
}

#[test]
fn test_unknown_opcodes_do_not_disturb_neighbours() {
    let log = EventLog::new();
    let mut interp = interpreter(&log, RecordingBus::new(&log), 4096);

    let stream = [0x00, 0x04, 0x11, 0xEE, 0x04, 0x22, 0x0B];
    let report = interp.run(&stream).unwrap();

    assert_eq!(report.executed, 4);
    assert_eq!(report.unknown.len(), 1);
    assert_eq!(report.unknown[0].offset, 3);
    assert_eq!(report.unknown[0].opcode, 0xEE);
    assert_eq!(log.transfers(), vec![vec![0x11, 0x22]]);
}

#[test]
fn test_long_data_run_flushes_per_chunk() {
    let log = EventLog::new();
    let mut interp = interpreter(&log, RecordingBus::new(&log), 4096);

    let payload: Vec<u8> = (0..600u32).map(|i| i as u8).collect();
    let mut ops = OpStream::new();
    ops.begin().command(0x2C).data_bytes(&payload).end();

    interp.run(ops.as_bytes()).unwrap();

    let groups = log.groups();
    assert_eq!(groups.len(), 4);
    assert_eq!(groups[0], vec![vec![0x2C]]);
    assert_eq!(groups[1][0].len(), MAX_CHUNK_SIZE);
    assert_eq!(groups[2][0].len(), MAX_CHUNK_SIZE);
    assert_eq!(groups[3][0].len(), 600 - 2 * MAX_CHUNK_SIZE);
    assert_eq!(&log.sent_bytes()[1..], payload.as_slice());
}

#[test]
fn test_truncated_stream_sends_nothing_of_the_tail() {
    let log = EventLog::new();
    let mut interp = interpreter(&log, RecordingBus::new(&log), 4096);

    let result = interp.run(&[0x00, 0x04, 0x10, 0x08, 0x2A, 0x01]);

    assert!(matches!(
        result,
        Err(PanelError::TruncatedInstruction { offset: 3, opcode: 0x08 })
    ));
    assert!(log.groups().is_empty());
    assert_eq!(interp.pending(), &[0x10]);
}

// ============================================================================
// PANEL
// ============================================================================

#[test]
fn test_init_sequence_trace() {
    let log = EventLog::new();
    let mut panel = panel(&log, RecordingBus::new(&log), 320, 480);

    let report = panel.init().unwrap();

    assert!(report.is_clean());
    assert_eq!(report.executed, 26);

    let transfers = log.transfers();
    assert_eq!(transfers.len(), 29);
    assert_eq!(transfers[0], vec![0x3A]);
    assert_eq!(transfers[1], vec![0x55]);
    assert_eq!(transfers[10], vec![0xE8]);
    assert_eq!(
        transfers[11],
        vec![0x40, 0x8A, 0x00, 0x00, 0x29, 0x19, 0xA5, 0x33]
    );
    assert_eq!(&transfers[27..], &[vec![0x38], vec![0x29]]);

    let chip_select: Vec<Level> = log
        .pin_changes()
        .into_iter()
        .filter(|(pin, _)| *pin == PanelPin::ChipSelect)
        .map(|(_, level)| level)
        .collect();
    assert_eq!(
        chip_select,
        vec![Level::Low, Level::High, Level::Low, Level::High]
    );
}

#[test]
fn test_init_sequence_is_reusable_as_plain_stream() {
    let log = EventLog::new();
    let mut interp = interpreter(&log, RecordingBus::new(&log), 4096);

    let report = interp.run(INIT_SEQUENCE).unwrap();

    assert!(report.is_clean());
    assert_eq!(
        log.events()
            .iter()
            .filter(|e| matches!(e, BusEvent::Delay(120)))
            .count(),
        2
    );
}

#[test]
fn test_full_frame_is_grouped() {
    let log = EventLog::new();
    let mut panel = panel(&log, RecordingBus::new(&log), 320, 480);
    let frame = Framebuffer::bars(320, 480, ColorOrder::Bgr, Rgb565::BLUE, Rgb565::YELLOW);

    panel.push_framebuffer(&frame).unwrap();

    let groups = log.groups();
    let frame_chunks = (320 * 480 * 2usize).div_ceil(MAX_CHUNK_SIZE);
    let frame_groups = frame_chunks.div_ceil(MAX_CHUNKS_PER_CALL);
    assert_eq!(frame_chunks, 1200);
    assert_eq!(groups.len(), 5 + frame_groups);

    assert_eq!(groups[0], vec![vec![CASET]]);
    assert_eq!(groups[1], vec![vec![0x00, 0x00, 0x01, 0x3F]]);
    assert_eq!(groups[2], vec![vec![RASET]]);
    assert_eq!(groups[3], vec![vec![0x00, 0x00, 0x01, 0xDF]]);
    assert_eq!(groups[4], vec![vec![RAMWR]]);
    assert!(groups[5..]
        .iter()
        .all(|g| g.len() == MAX_CHUNKS_PER_CALL && g.iter().all(|c| c.len() == MAX_CHUNK_SIZE)));

    let sent = log.sent_bytes();
    assert_eq!(&sent[11..], frame.as_bytes());
}

#[test]
fn test_frame_failure_stops_remaining_groups() {
    let log = EventLog::new();
    let mut panel = panel(&log, RecordingBus::new(&log).fail_on_call(7), 64, 64);
    let frame = vec![0x5A; 64 * 64 * 2];

    let result = panel.push_frame(&frame);

    match result {
        Err(PanelError::TransferFailed { group, sent, .. }) => {
            assert_eq!(group, 1);
            assert_eq!(sent, MAX_CHUNKS_PER_CALL * MAX_CHUNK_SIZE);
        }
        other => panic!("expected TransferFailed, got {:?}", other),
    }

    assert_eq!(panel.interpreter_mut().bus().adapter().primitive().calls(), 7);
    assert_eq!(log.groups().len(), 6);
    assert_eq!(
        log.pin_changes().last(),
        Some(&(PanelPin::DataCommand, Level::High))
    );
}

#[test]
fn test_oversized_frame_rejected_before_bus_activity() {
    let log = EventLog::new();
    let mut interp = interpreter(&log, RecordingBus::new(&log), 1024);

    interp.begin_write();
    log.clear();

    let result = interp.write_pixels(&[0; 1025]);

    assert!(matches!(
        result,
        Err(PanelError::BufferTooLarge { len: 1025, capacity: 1024 })
    ));
    assert!(log.events().is_empty());
}

#[test]
fn test_shutdown_after_frame() {
    let log = EventLog::new();
    let mut panel = panel(&log, RecordingBus::new(&log), 8, 8);

    panel.push_frame(&[0xFF; 128]).unwrap();
    log.clear();
    let (bus, pins) = panel.shutdown();

    assert_eq!(log.events(), vec![pin(PanelPin::Backlight, Level::Low)]);
    assert_eq!(bus.calls(), 6);
    assert!(!pins.is_initialized());
}
