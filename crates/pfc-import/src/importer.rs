use crate::*;
use pfc_core::*;
use pfc_records::*;
use pfc_store::Store;
use std::path::Path;
use std::path::PathBuf;

/// Import the PGN headers of every game under `path` into the game file.
///
/// Games without a Result tag pair, or with a value other than a win,
/// draw, or loss, are ignored. Games already on the database, matched by
/// (file basename, game number), are skipped, so a rerun adds nothing.
/// Returns Ok(false) without committing the in-flight segment when `path`
/// is unusable or `stop` is set.
pub fn import_pgn_headers<S: Store>(
    store: &mut S,
    path: &Path,
    reporter: &mut dyn Reporter,
    stop: &Stop,
) -> Outcome<bool> {
    if !path.exists() {
        reporter.append_text_only("");
        reporter.append_text(&format!("{} does not exist", path.display()));
        return Ok(false);
    }
    if !path.is_dir() {
        reporter.append_text_only("");
        reporter.append_text(&format!("{} is not a directory", path.display()));
        return Ok(false);
    }
    store.start_transaction();
    match import_directory(store, path, reporter, stop) {
        Ok(true) => {
            store.commit()?;
            reporter.append_text_only("");
            Ok(true)
        }
        Ok(false) => {
            store.backout();
            Ok(false)
        }
        Err(fault) => {
            store.backout();
            Err(fault)
        }
    }
}

/// Directory entries in deterministic order: files first, then
/// subdirectories, each sorted by name.
fn partitioned_entries(directory: &Path) -> std::io::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut files = Vec::new();
    let mut directories = Vec::new();
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            directories.push(path);
        } else {
            files.push(path);
        }
    }
    files.sort();
    directories.sort();
    Ok((files, directories))
}

fn import_directory<S: Store>(
    store: &mut S,
    directory: &Path,
    reporter: &mut dyn Reporter,
    stop: &Stop,
) -> Outcome<bool> {
    reporter.append_text_only("");
    reporter.append_text(&format!("Processing files in {}", directory.display()));
    let (files, directories) = partitioned_entries(directory)?;
    for path in files {
        if !import_file(store, &path, reporter, stop)? {
            return Ok(false);
        }
    }
    for path in directories {
        if !import_directory(store, &path, reporter, stop)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn import_file<S: Store>(
    store: &mut S,
    path: &Path,
    reporter: &mut dyn Reporter,
    stop: &Stop,
) -> Outcome<bool> {
    if !is_pgn_file(path) {
        reporter.append_text_only("");
        reporter.append_text(&format!("{} is not a .pgn file", path.display()));
        return Ok(true);
    }
    let file = basename(path);
    reporter.append_text_only("");
    reporter.append_text(&format!("Extracting game headers from {}", file));
    let text = match read_pgn_file(path) {
        Ok(text) => text,
        Err(error) => {
            // Unreadable file: skip it and carry on with the rest.
            reporter.append_text_only("");
            reporter.append_text(&format!("Unable to read {}: {}", file, error));
            return Ok(true);
        }
    };
    let file_count = store
        .recordlist_key(GAME_FILE, GAME_PGNFILE_INDEX, &file)
        .count_records();
    if file_count > 0 {
        reporter.append_text_only("");
        reporter.append_text(&format!(
            "{} games from file {} already on database: only missing game numbers will be copied.",
            file_count, file
        ));
    }
    let mut game_number = 0usize;
    let mut copy_number = 0usize;
    let mut seen_number = 0usize;
    let mut game_offset = None;
    for collected in GameScanner::new(&text) {
        if stop.is_set() {
            reporter.append_text_only("");
            reporter.append_text("Copy stopped.");
            return Ok(false);
        }
        game_number += 1;
        game_offset = Some(collected.offset);
        let number = game_number.to_string();
        let file_games = store.recordlist_key(GAME_FILE, GAME_PGNFILE_INDEX, &file);
        if file_games.count_records() > 0 {
            let number_games = store.recordlist_key(GAME_FILE, GAME_NUMBER_INDEX, &number);
            if (&number_games & &file_games).count_records() > 0 {
                continue;
            }
        }
        seen_number += 1;
        let game = Game::new(&file, &number, collected.offset, collected.tags);
        match game.result() {
            Some(result) if WIN_DRAW_LOSS.contains(&result) => {
                copy_number += 1;
                let key = store.put_record(GAME_FILE, &game)?;
                if copy_number % SEGMENT_SIZE == 0 {
                    store.commit()?;
                    store.start_transaction();
                    reporter.append_text(&format!(
                        "Record {} is from game {} in {}",
                        key, number, file
                    ));
                }
            }
            Some(result) => {
                reporter.append_text_only(&format!(
                    "{} is result of game {} in {}",
                    result, number, file
                ));
            }
            None => {
                reporter.append_text_only(&format!("No result tag in game {} in {}", number, file));
            }
        }
    }
    if let Some(offset) = game_offset {
        reporter.append_text_only("");
        reporter.append_text(&format!(
            "{} games read from {} to character {}",
            game_number, file, offset
        ));
        reporter.append_text_only(&format!("{} games added to database.", copy_number));
        reporter.append_text_only(&format!("{} games already on database.", file_count));
        reporter.append_text_only(&format!(
            "{} games had errors and were not copied.",
            seen_number - copy_number
        ));
    }
    Ok(true)
}

/// Count the games under `path` without touching the store.
///
/// The file is read as ISO-8859-1 without the UTF-8 trial, so the count
/// can disagree with the importing pass on files with multi-byte
/// sequences. Returns Ok(None) when `path` is unusable or `stop` is set.
pub fn count_pgn_games(
    path: &Path,
    reporter: &mut dyn Reporter,
    stop: &Stop,
) -> Outcome<Option<usize>> {
    if !path.exists() {
        reporter.append_text_only("");
        reporter.append_text(&format!("{} does not exist", path.display()));
        return Ok(None);
    }
    if !path.is_dir() {
        reporter.append_text_only("");
        reporter.append_text(&format!("{} is not a directory", path.display()));
        return Ok(None);
    }
    let counted = count_directory(path, reporter, stop)?;
    reporter.append_text_only("");
    Ok(counted)
}

fn count_directory(
    directory: &Path,
    reporter: &mut dyn Reporter,
    stop: &Stop,
) -> Outcome<Option<usize>> {
    reporter.append_text_only("");
    reporter.append_text(&format!("Counting games in {}", directory.display()));
    let (files, directories) = partitioned_entries(directory)?;
    let mut total = 0usize;
    for path in files {
        match count_file(&path, reporter, stop)? {
            Some(count) => total += count,
            None => return Ok(None),
        }
    }
    for path in directories {
        match count_directory(&path, reporter, stop)? {
            Some(count) => total += count,
            None => return Ok(None),
        }
    }
    Ok(Some(total))
}

fn count_file(
    path: &Path,
    reporter: &mut dyn Reporter,
    stop: &Stop,
) -> Outcome<Option<usize>> {
    if !is_pgn_file(path) {
        return Ok(Some(0));
    }
    let file = basename(path);
    let text = match read_pgn_file_latin1(path) {
        Ok(text) => text,
        Err(error) => {
            reporter.append_text_only("");
            reporter.append_text(&format!("Unable to read {}: {}", file, error));
            return Ok(Some(0));
        }
    };
    let mut game_number = 0usize;
    let mut game_offset = None;
    for collected in GameScanner::new(&text) {
        if stop.is_set() {
            reporter.append_text_only("");
            reporter.append_text("Count stopped.");
            return Ok(None);
        }
        game_number += 1;
        game_offset = Some(collected.offset);
    }
    if let Some(offset) = game_offset {
        reporter.append_text_only("");
        reporter.append_text(&format!(
            "{} games read from {} to character {}",
            game_number, file, offset
        ));
    }
    Ok(Some(game_number))
}
