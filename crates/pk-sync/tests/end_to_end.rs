//! End-to-end sync scenarios against real directories.

use std::fs::{self, File};
use std::io::Read;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use pk_core::Config;
use pk_sync::{Dispatcher, Outcome, run_with_shutdown};
use pk_watcher::{ChangeKind, FileEvent};
use serde_json::Value;
use tempfile::TempDir;

const MANIFEST: &str = r#"{
  "format_version": 2,
  "header": {
    "description": "Stone tools",
    "name": "stone-tools",
    "uuid": "00000000-0000-0000-0000-000000000001",
    "version": [1, 2, 0],
    "min_engine_version": [1, 20, 0]
  },
  "modules": [
    {"description": "Behaviour", "type": "data", "uuid": "00000000-0000-0000-0000-000000000002", "version": [1, 2, 0]},
    {"description": "Scripts", "type": "script", "uuid": "00000000-0000-0000-0000-000000000003", "version": [1, 2, 0]}
  ],
  "dependencies": [{"module_name": "@minecraft/server", "version": "1.8.0"}]
}"#;

struct Workspace {
    _src: TempDir,
    _out: TempDir,
    config: Config,
}

impl Workspace {
    fn new(zip: bool) -> Self {
        let src = TempDir::new().expect("Failed to create temp directory");
        let out = TempDir::new().expect("Failed to create temp directory");
        let root = src.path();
        fs::create_dir_all(root.join("items")).unwrap();
        fs::create_dir_all(root.join("scripts")).unwrap();
        fs::write(root.join("manifest.json"), MANIFEST).unwrap();
        fs::write(root.join("items/pick.json"), r#"{"id": "pick"}"#).unwrap();
        fs::write(root.join("scripts/main.js"), "export {};\n").unwrap();

        let config = Config {
            watch_dir: utf8(&src).to_owned(),
            zip_dir: utf8(&out).to_owned(),
            json_file: "manifest.json".to_owned(),
            zip_file_name: "stone-tools.mcpack".to_owned(),
            zip,
            recursive: false,
        };
        Self {
            _src: src,
            _out: out,
            config,
        }
    }

    fn manifest(&self) -> Value {
        let text = fs::read_to_string(self.config.manifest_path()).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    fn touch_event(&self, relative: &str) -> FileEvent {
        let path = self.config.watch_dir.join(relative);
        fs::write(&path, "changed").unwrap();
        FileEvent::new(path, ChangeKind::Write)
    }
}

fn utf8(dir: &TempDir) -> &Utf8Path {
    Utf8Path::from_path(dir.path()).expect("Invalid path")
}

fn uuids(manifest: &Value) -> Vec<String> {
    let mut ids = vec![manifest["header"]["uuid"].as_str().unwrap().to_owned()];
    for module in manifest["modules"].as_array().unwrap() {
        ids.push(module["uuid"].as_str().unwrap().to_owned());
    }
    ids
}

fn read_entry(archive: &mut zip::ZipArchive<File>, name: &str) -> String {
    let mut contents = String::new();
    archive
        .by_name(name)
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    contents
}

#[test]
fn test_zip_mode_regenerates_ids_and_archives_tree() {
    let ws = Workspace::new(true);
    let before = ws.manifest();
    let mut dispatcher = Dispatcher::new(ws.config.clone());

    let outcome = dispatcher.handle_event(&ws.touch_event("items/pick.json")).unwrap();
    assert!(matches!(outcome, Outcome::Exported(_)));

    let after = ws.manifest();
    let old_ids = uuids(&before);
    let new_ids = uuids(&after);
    assert_eq!(new_ids.len(), 3);
    for (old, new) in old_ids.iter().zip(&new_ids) {
        assert_ne!(old, new);
        assert_eq!(new.len(), 36);
    }
    assert_ne!(new_ids[0], new_ids[1]);
    assert_ne!(new_ids[1], new_ids[2]);

    // Everything but the identifiers is unchanged
    assert_eq!(after["header"]["version"], before["header"]["version"]);
    assert_eq!(after["header"]["min_engine_version"], before["header"]["min_engine_version"]);
    assert_eq!(after["modules"][1]["type"], "script");
    assert_eq!(after["dependencies"], before["dependencies"]);

    let file = File::open(ws.config.archive_path()).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<_> = archive.file_names().map(str::to_owned).collect();
    names.sort();
    assert_eq!(
        names,
        [
            "items/",
            "items/pick.json",
            "manifest.json",
            "scripts/",
            "scripts/main.js"
        ]
    );
    assert_eq!(read_entry(&mut archive, "items/pick.json"), "changed");

    let archived: Value = serde_json::from_str(&read_entry(&mut archive, "manifest.json")).unwrap();
    assert_eq!(uuids(&archived), new_ids);
}

#[test]
fn test_mirror_mode_replicates_tree() {
    let ws = Workspace::new(false);
    fs::write(ws.config.zip_dir.join("unrelated.txt"), "keep").unwrap();
    let mut dispatcher = Dispatcher::new(ws.config.clone());

    let outcome = dispatcher.handle_event(&ws.touch_event("scripts/main.js")).unwrap();
    assert!(matches!(outcome, Outcome::Exported(_)));

    let out = &ws.config.zip_dir;
    assert_eq!(fs::read_to_string(out.join("scripts/main.js")).unwrap(), "changed");
    assert_eq!(fs::read_to_string(out.join("items/pick.json")).unwrap(), r#"{"id": "pick"}"#);
    assert_eq!(
        fs::read_to_string(out.join("manifest.json")).unwrap(),
        fs::read_to_string(ws.config.manifest_path()).unwrap()
    );
    assert_eq!(fs::read_to_string(out.join("unrelated.txt")).unwrap(), "keep");
    assert!(!ws.config.archive_path().exists());
}

#[test]
fn test_archive_inside_watched_tree_is_not_archived() {
    let mut ws = Workspace::new(true);
    ws.config.zip_dir = ws.config.watch_dir.join("dist");
    let mut dispatcher = Dispatcher::new(ws.config.clone());

    let event = ws.touch_event("items/pick.json");
    dispatcher.handle_event(&event).unwrap();

    // A second sync runs with the archive already in place
    File::options()
        .write(true)
        .open(&event.path)
        .unwrap()
        .set_modified(dispatcher.context().last_modified() + Duration::from_secs(1))
        .unwrap();
    let outcome = dispatcher.handle_event(&event).unwrap();
    assert!(matches!(outcome, Outcome::Exported(_)));

    let archive_path = ws.config.archive_path();
    assert!(archive_path.is_file());
    let mut archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
    assert!(archive.by_name("dist/stone-tools.mcpack").is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_run_syncs_on_change_and_stops_on_shutdown() {
    let ws = Workspace::new(true);
    let config = ws.config.clone();
    let archive_path: Utf8PathBuf = config.archive_path();
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let task = tokio::spawn(run_with_shutdown(config, async move {
        let _ = stop_rx.await;
    }));

    // Give the watcher time to subscribe before changing anything
    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(ws.config.watch_dir.join("items/pick.json"), "changed").unwrap();

    let mut synced = false;
    for _ in 0..50 {
        if archive_path.is_file() {
            synced = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let _ = stop_tx.send(());
    let result = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("sync loop did not stop")
        .expect("sync task panicked");
    assert!(result.is_ok());

    assert!(synced, "no archive written within 5s of the change");
    assert_ne!(ws.manifest()["header"]["uuid"], "00000000-0000-0000-0000-000000000001");
}
