//! End-to-end emulation tests
//!
//! Drives the full scanner/screen/frame pipeline with realistic byte
//! streams and checks the published frames, plus property tests for
//! chunk-boundary handling.

use herminal::core::{Color, Frame, Style};
use herminal::{Emulator, Key, Scanner, TerminalEvent};

fn emulate(bytes: &[u8], cols: usize, rows: usize) -> Frame {
    let mut emulator = Emulator::new(cols, rows);
    emulator.feed(bytes);
    emulator.frame()
}

fn scan(bytes: &[u8]) -> Vec<TerminalEvent> {
    Scanner::new().feed(bytes)
}

#[test]
fn wrap_leaves_cursor_after_first_wrapped_char() {
    let mut emulator = Emulator::new(10, 5);
    emulator.feed(b"0123456789X");

    let frame = emulator.frame();
    assert_eq!(frame.cursor.row, 1);
    assert_eq!(frame.cursor.col, 1);
    assert_eq!(emulator.screen().cell(1, 0).map(|c| c.ch), Some('X'));
    assert_eq!(emulator.screen().row_text(0), "0123456789");
}

#[test]
fn scroll_region_never_touches_outside_rows() {
    let mut emulator = Emulator::new(20, 15);
    for row in 0..15 {
        emulator.feed(format!("\x1b[{};1Hrow-{}", row + 1, row).as_bytes());
    }

    // Region rows 5..=10 (0-indexed), then eight forced scrolls at its bottom
    emulator.feed(b"\x1b[6;11r\x1b[11;1H");
    for _ in 0..8 {
        emulator.feed(b"\n");
    }

    for row in 0..5 {
        assert_eq!(emulator.screen().row_text(row), format!("row-{row}"));
    }
    for row in 11..15 {
        assert_eq!(emulator.screen().row_text(row), format!("row-{row}"));
    }
    // Everything inside scrolled away
    for row in 5..11 {
        assert_eq!(emulator.screen().row_text(row), "");
    }
}

#[test]
fn sgr_reset_restores_default_style() {
    let mut emulator = Emulator::new(10, 2);
    emulator.feed(b"\x1b[1m\x1b[0mx");

    let cell = emulator.screen().cell(0, 0).unwrap();
    assert_eq!(cell.style, Style::default());
    assert_eq!(cell.fg, Color::Default);
    assert_eq!(cell.bg, Color::Default);
}

#[test]
fn recapture_without_feed_is_identical() {
    let mut emulator = Emulator::new(40, 10);
    emulator.feed(b"\x1b[2;3H\x1b[7msome \x1b[4mstyled\x1b[0m text\r\nmore");

    let first = emulator.frame();
    let second = emulator.frame();
    assert_eq!(first, second);
}

#[test]
fn red_hi_then_bye() {
    let mut emulator = Emulator::new(10, 3);
    emulator.feed(b"\x1b[31mhi\x1b[0m\n");
    emulator.feed(b"bye");

    let frame = emulator.frame();

    let row0 = &frame.lines[0];
    assert_eq!(row0[0].text, "hi");
    assert_eq!(row0[0].fg, Color::RED);
    assert_eq!(row0[0].style, Style::default());

    let row1 = &frame.lines[1];
    assert_eq!(row1[0].text.trim_end(), "bye");
    assert_eq!(row1[0].fg, Color::Default);

    assert_eq!(frame.cursor.row, 1);
    assert_eq!(frame.cursor.col, 3);
}

#[test]
fn erase_line_leaves_cursor_in_place() {
    let mut emulator = Emulator::new(12, 2);
    emulator.feed(b"\x1b[44mfilled line!\x1b[0m\x1b[1;6H\x1b[2K");

    let screen = emulator.screen();
    for col in 0..12 {
        assert!(screen.cell(0, col).unwrap().is_default());
    }
    assert_eq!(screen.cursor().row, 0);
    assert_eq!(screen.cursor().col, 5);
}

#[test]
fn shell_prompt_overwrite_sequence() {
    // A readline-style redraw: prompt, input, CR, rewritten line, erase tail
    let mut emulator = Emulator::new(30, 4);
    emulator.feed(b"$ lss");
    emulator.feed(b"\r$ ls \x1b[K");
    assert_eq!(emulator.screen().row_text(0), "$ ls");
}

#[test]
fn osc_title_never_reaches_grid() {
    let frame = emulate(b"\x1b]0;my fancy title\x07visible", 30, 2);
    assert_eq!(frame.to_text(), "visible\n");
}

#[test]
fn frame_json_is_stable() {
    let frame = emulate(b"\x1b[32mgreen\x1b[0m plain", 20, 2);
    let json = frame.to_json().expect("serialize");
    let restored = Frame::from_json(&json).expect("deserialize");
    assert_eq!(frame, restored);
}

#[test]
fn key_encoding_matches_documented_sequences() {
    let table: &[(Key, &[u8])] = &[
        (Key::Enter, b"\r"),
        (Key::Backspace, b"\x7f"),
        (Key::Up, b"\x1b[A"),
        (Key::Down, b"\x1b[B"),
        (Key::Right, b"\x1b[C"),
        (Key::Left, b"\x1b[D"),
        (Key::Home, b"\x1b[H"),
        (Key::End, b"\x1b[F"),
        (Key::Delete, b"\x1b[3~"),
        (Key::PageUp, b"\x1b[5~"),
        (Key::PageDown, b"\x1b[6~"),
        (Key::Ctrl('c'), &[0x03]),
    ];
    for (key, expected) in table {
        assert_eq!(&*key.encode(), *expected, "wrong encoding for {key:?}");
    }
}

#[test]
fn settings_roundtrip_through_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("settings.json");

    let mut settings = herminal::Settings::default();
    settings.font_size = 13;
    settings.apply_theme(herminal::config::theme_by_id("matrix").expect("theme"));
    settings.save(&path).expect("save");

    let restored = herminal::Settings::load(&path).expect("load");
    assert_eq!(settings, restored);
    assert_eq!(restored.background_color, "#000000");
}

#[cfg(unix)]
#[test]
fn pty_session_renders_command_output() {
    use herminal::Session;
    use std::time::{Duration, Instant};

    let session = Session::spawn("/bin/echo", &["session smoke"], 40, 10).expect("spawn");

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = false;
    let mut seq = 0;
    while Instant::now() < deadline {
        match session.frames().wait_next(seq) {
            Some((frame, new_seq)) => {
                seq = new_seq;
                if frame.to_text().contains("session smoke") {
                    seen = true;
                    break;
                }
            }
            None => break,
        }
    }
    if !seen {
        if let Some((frame, _)) = session.frames().latest() {
            seen = frame.to_text().contains("session smoke");
        }
    }
    assert!(seen, "command output never appeared in a frame");
}

mod chunk_boundaries {
    use super::*;
    use proptest::prelude::*;

    /// Fragments that exercise every scanner state
    fn fragment() -> impl Strategy<Value = Vec<u8>> {
        prop_oneof![
            "[ -~]{1,8}".prop_map(|s| s.into_bytes()),
            Just(b"\x1b[1;31m".to_vec()),
            Just(b"\x1b[2J".to_vec()),
            Just(b"\x1b[10;20H".to_vec()),
            Just(b"\x1b[K".to_vec()),
            Just(b"\x1b[?25l".to_vec()),
            Just(b"\x1b]0;title\x07".to_vec()),
            Just(b"\x1b]2;st-title\x1b\\".to_vec()),
            Just(b"\x1b7".to_vec()),
            Just(b"\x1bM".to_vec()),
            Just(b"\r\n".to_vec()),
            Just(b"\t".to_vec()),
            Just("中文🦀".as_bytes().to_vec()),
            Just(b"\x18\x1b[3".to_vec()),
        ]
    }

    fn stream() -> impl Strategy<Value = Vec<u8>> {
        proptest::collection::vec(fragment(), 1..12).prop_map(|frags| frags.concat())
    }

    proptest! {
        #[test]
        fn events_are_split_invariant(bytes in stream(), cut in any::<prop::sample::Index>()) {
            let whole = scan(&bytes);

            let cut = cut.index(bytes.len() + 1);
            let mut scanner = Scanner::new();
            let mut split = scanner.feed(&bytes[..cut]);
            split.extend(scanner.feed(&bytes[cut..]));

            prop_assert_eq!(whole, split);
        }

        #[test]
        fn frames_are_chunking_invariant(bytes in stream(), sizes in proptest::collection::vec(1usize..5, 1..8)) {
            let reference = emulate(&bytes, 20, 6);

            let mut emulator = Emulator::new(20, 6);
            let mut offset = 0;
            let mut i = 0;
            while offset < bytes.len() {
                let len = sizes[i % sizes.len()].min(bytes.len() - offset);
                emulator.feed(&bytes[offset..offset + len]);
                offset += len;
                i += 1;
            }

            prop_assert_eq!(reference, emulator.frame());
        }

        #[test]
        fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut emulator = Emulator::new(10, 4);
            emulator.feed(&bytes);
            let _ = emulator.frame();
        }
    }
}
