//! Tests for add and run subcommands.

use super::parse;
use crate::cli::commands::AddKind;
use crate::cli::CliCommand;

#[test]
fn cli_parse_add_track() {
    match parse(&["sonata", "add", "track", "3135556"]) {
        CliCommand::Add { kind: AddKind::Track { id } } => assert_eq!(id, "3135556"),
        _ => panic!("expected Add Track"),
    }
}

#[test]
fn cli_parse_add_album() {
    match parse(&["sonata", "add", "album", "302127"]) {
        CliCommand::Add { kind: AddKind::Album { id } } => assert_eq!(id, "302127"),
        _ => panic!("expected Add Album"),
    }
}

#[test]
fn cli_parse_add_playlist() {
    match parse(&["sonata", "add", "playlist", "999"]) {
        CliCommand::Add { kind: AddKind::Playlist { id } } => assert_eq!(id, "999"),
        _ => panic!("expected Add Playlist"),
    }
}

#[test]
fn cli_parse_add_custom_playlist() {
    match parse(&[
        "sonata",
        "add",
        "custom-playlist",
        "mixtape",
        "--title",
        "Summer Mix",
        "--track",
        "1",
        "--track",
        "2",
        "--cover-url",
        "https://example.invalid/cover.jpg",
    ]) {
        CliCommand::Add {
            kind:
                AddKind::CustomPlaylist {
                    id,
                    title,
                    track_ids,
                    cover_url,
                },
        } => {
            assert_eq!(id, "mixtape");
            assert_eq!(title, "Summer Mix");
            assert_eq!(track_ids, vec!["1".to_string(), "2".to_string()]);
            assert_eq!(cover_url.as_deref(), Some("https://example.invalid/cover.jpg"));
        }
        _ => panic!("expected Add CustomPlaylist"),
    }
}

#[test]
fn cli_parse_run() {
    match parse(&["sonata", "run"]) {
        CliCommand::Run { jobs } => assert!(jobs.is_none()),
        _ => panic!("expected Run"),
    }
}

#[test]
fn cli_parse_run_jobs() {
    match parse(&["sonata", "run", "--jobs", "4"]) {
        CliCommand::Run { jobs } => assert_eq!(jobs, Some(4)),
        _ => panic!("expected Run with --jobs 4"),
    }
}
