//! End-to-end tests driving the bot through its public API and the
//! gateway wire format.

use dbseek::access::UserId;
use dbseek::bot::{Attachment, BotContext, Sender, Update};
use dbseek::config::Config;
use dbseek::server::protocol::{read_message, write_message, Request, Response};
use dbseek::server::daemon::GatewayServer;
use dbseek::store::MAX_RESULTS;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

const ADMIN: i64 = 100;

fn config() -> Config {
    Config {
        bot_token: "test-token".to_string(),
        bootstrap_admin: UserId(ADMIN),
        ..Config::default()
    }
}

fn update(id: i64, text: &str) -> Update {
    Update {
        sender: Sender {
            id: UserId(id),
            username: None,
            full_name: format!("User {}", id),
        },
        text: text.to_string(),
        attachment: None,
    }
}

fn upload(id: i64, file_name: &str, bytes: Vec<u8>) -> Update {
    Update {
        attachment: Some(Attachment {
            file_name: file_name.to_string(),
            bytes,
        }),
        ..update(id, "/add")
    }
}

fn zip_of(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn test_zip_upload_is_named_after_entry() {
    let ctx = BotContext::new(config());
    let bytes = zip_of(&[("readme.md", "ignore me"), ("data.csv", "a\nb\nc")]);
    let size = bytes.len();

    let reply = ctx.handle(&upload(1, "dump.zip", bytes));
    assert_eq!(
        reply,
        format!("✅ Database 'data.csv' loaded.\nLines: 3\nSize: {} bytes", size)
    );

    ctx.with_state(|state| {
        let all = state.store.all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name(), "data.csv");
        assert_eq!(all[0].lines(), ["a", "b", "c"]);
    });
}

#[test]
fn test_zip_without_text_is_reported() {
    let ctx = BotContext::new(config());
    let reply = ctx.handle(&upload(1, "pics.ZIP", zip_of(&[("a.png", "x")])));
    assert_eq!(reply, "❌ No txt or csv file in the ZIP archive");
}

#[test]
fn test_search_cap_and_order() {
    let ctx = BotContext::new(config());
    let body: String = (0..25).map(|i| format!("Smith {}\n", i)).collect();
    ctx.handle(&upload(1, "big.txt", body.into_bytes()));

    let reply = ctx.handle(&update(2, "/search smith"));
    let lines: Vec<&str> = reply.lines().collect();
    assert_eq!(lines.len(), MAX_RESULTS);
    assert_eq!(lines[0], "[big.txt] Smith 0");
    assert_eq!(lines[19], "[big.txt] Smith 19");

    // one more matching dataset changes nothing
    ctx.handle(&upload(1, "extra.txt", b"smith extra".to_vec()));
    assert_eq!(ctx.handle(&update(2, "/search SMITH")), reply);
}

#[test]
fn test_search_spans_datasets_in_upload_order() {
    let ctx = BotContext::new(config());
    ctx.handle(&upload(1, "a.csv", b"ivanov;1\npetrov;2".to_vec()));
    ctx.handle(&upload(1, "b.csv", b"IVANOV;3".to_vec()));

    assert_eq!(
        ctx.handle(&update(2, "/search Ivanov")),
        "[a.csv] ivanov;1\n[b.csv] IVANOV;3"
    );
}

#[test]
fn test_admin_grant_chain() {
    let ctx = BotContext::new(config());

    assert_eq!(
        ctx.handle(&update(7, "/setadmin 8")),
        "❌ Only an admin can appoint another admin."
    );
    assert!(!ctx.is_admin(UserId(8)));

    ctx.handle(&update(ADMIN, "/setadmin 7"));
    ctx.handle(&update(7, "/setadmin 8"));
    assert!(ctx.is_admin(UserId(7)));
    assert!(ctx.is_admin(UserId(8)));
    assert_eq!(ctx.status().admins, 3);
}

#[test]
fn test_roster_tracks_every_interaction() {
    let ctx = BotContext::new(config());
    ctx.handle(&update(1, "/support"));
    ctx.handle(&update(2, "/nonsense"));
    ctx.handle(&update(1, "/search x"));

    ctx.with_state(|state| {
        let roster: Vec<_> = state.roster.iter().collect();
        assert_eq!(roster, vec![(UserId(1), "User 1"), (UserId(2), "User 2")]);
    });
}

#[test]
fn test_gateway_request_over_wire() {
    let server = GatewayServer::new(config());

    let mut wire = Vec::new();
    write_message(
        &mut wire,
        &Request::Dispatch {
            token: "test-token".to_string(),
            update: upload(1, "people.txt", b"Anna Lee\n".to_vec()),
        },
    )
    .unwrap();

    let request: Request = read_message(&mut Cursor::new(wire)).unwrap();
    let response = server.handle_request(request);

    let mut wire = Vec::new();
    write_message(&mut wire, &response).unwrap();
    let response: Response = read_message(&mut Cursor::new(wire)).unwrap();
    match response {
        Response::Reply { text } => assert!(text.starts_with("✅ Database 'people.txt' loaded.")),
        other => panic!("unexpected response: {:?}", other),
    }

    match server.handle_request(Request::Status) {
        Response::Status(status) => {
            assert_eq!(status.datasets.count, 1);
            assert_eq!(status.datasets.total_lines, 1);
            assert_eq!(status.users, 1);
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

#[test]
fn test_upload_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.CSV");
    std::fs::write(&path, "name;phone\r\nAnna;123\r\n").unwrap();

    let bytes = std::fs::read(&path).unwrap();
    let dataset = dbseek::ingest::ingest(&bytes, "contacts.CSV").unwrap();
    assert_eq!(dataset.lines(), ["name;phone", "Anna;123"]);
    assert_eq!(dataset.size(), 22);
}
