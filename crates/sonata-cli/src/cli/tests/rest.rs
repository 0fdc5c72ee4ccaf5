//! Tests for status, pause, resume, cancel, stop-all.

use super::parse;
use crate::cli::CliCommand;

#[test]
fn cli_parse_status() {
    match parse(&["sonata", "status"]) {
        CliCommand::Status { status } => assert!(status.is_none()),
        _ => panic!("expected Status"),
    }
}

#[test]
fn cli_parse_status_filtered() {
    match parse(&["sonata", "status", "--status", "failed"]) {
        CliCommand::Status { status } => assert_eq!(status.as_deref(), Some("failed")),
        _ => panic!("expected Status with --status"),
    }
}

#[test]
fn cli_parse_pause() {
    match parse(&["sonata", "pause", "track_42"]) {
        CliCommand::Pause { id } => assert_eq!(id, "track_42"),
        _ => panic!("expected Pause"),
    }
}

#[test]
fn cli_parse_resume() {
    match parse(&["sonata", "resume", "track_1"]) {
        CliCommand::Resume { id } => assert_eq!(id, "track_1"),
        _ => panic!("expected Resume"),
    }
}

#[test]
fn cli_parse_cancel() {
    match parse(&["sonata", "cancel", "album_99"]) {
        CliCommand::Cancel { id } => assert_eq!(id, "album_99"),
        _ => panic!("expected Cancel"),
    }
}

#[test]
fn cli_parse_stop_all() {
    match parse(&["sonata", "stop-all"]) {
        CliCommand::StopAll => {}
        _ => panic!("expected StopAll"),
    }
}
